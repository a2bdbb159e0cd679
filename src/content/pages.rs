//! Page kinds of the site's content tree.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::blocks::{validate_stream, BlockKind, ContentBlock, ImageRef, RichText};
use super::validate::{self, Validate, ValidationResult};

pub const HOME_BLOCKS: &[BlockKind] = &[
    BlockKind::Hero,
    BlockKind::About,
    BlockKind::Portfolio,
    BlockKind::RichText,
    BlockKind::RawHtml,
];

pub const BLOG_BLOCKS: &[BlockKind] = &[
    BlockKind::Heading,
    BlockKind::Paragraph,
    BlockKind::Image,
    BlockKind::Code,
    BlockKind::Quote,
    BlockKind::Embed,
];

pub const PROJECT_BLOCKS: &[BlockKind] = &[
    BlockKind::Overview,
    BlockKind::Features,
    BlockKind::Gallery,
    BlockKind::CodeSnippet,
    BlockKind::Testimonial,
];

pub const DEFAULT_HERO_TITLE: &str = "Bennie Williams";

// ============================================================================
// Page
// ============================================================================

/// A node in the content tree. Common fields live here, kind-specific ones in `content`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub title: String,
    pub slug: String,
    pub live: bool,
    pub first_published_at: Option<DateTime<Utc>>,
    pub content: PageContent,
}

impl Page {
    pub fn kind(&self) -> PageKind {
        self.content.kind()
    }

    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Validate for Page {
    fn validate(&self) -> ValidationResult {
        validate::char_field("title", &self.title, 255)?;
        validate::slug("slug", &self.slug)?;
        if self.parent_id.is_some() && self.kind() == PageKind::Root {
            return Err(validate::ValidationError::new(
                "kind",
                "Only the tree root may be a root page",
            ));
        }
        self.content.validate()
    }
}

/// Fields for a page that has not been attached to the tree yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPage {
    pub title: String,
    pub slug: String,
    pub live: bool,
    pub content: PageContent,
}

impl NewPage {
    /// A published page, the way every seeded page is created.
    pub fn live(title: &str, slug: &str, content: PageContent) -> Self {
        Self {
            title: title.to_string(),
            slug: slug.to_string(),
            live: true,
            content,
        }
    }

    /// Turn into a stored page under `parent_id`.
    pub fn into_page(self, id: Uuid, parent_id: Uuid, now: DateTime<Utc>) -> Page {
        Page {
            id,
            parent_id: Some(parent_id),
            first_published_at: self.live.then_some(now),
            title: self.title,
            slug: self.slug,
            live: self.live,
            content: self.content,
        }
    }
}

// ============================================================================
// Page Kinds
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    Root,
    Home,
    BlogIndex,
    Blog,
    Project,
    About,
    Services,
    Contact,
}

impl PageKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageKind::Root => "root",
            PageKind::Home => "home",
            PageKind::BlogIndex => "blog_index",
            PageKind::Blog => "blog",
            PageKind::Project => "project",
            PageKind::About => "about",
            PageKind::Services => "services",
            PageKind::Contact => "contact",
        }
    }

    /// Human name used in seed status lines.
    pub fn label(&self) -> &'static str {
        match self {
            PageKind::Root => "Page",
            PageKind::Home => "HomePage",
            PageKind::BlogIndex => "BlogIndexPage",
            PageKind::Blog => "BlogPage",
            PageKind::Project => "ProjectPage",
            PageKind::About => "AboutPage",
            PageKind::Services => "ServicesPage",
            PageKind::Contact => "ContactPage",
        }
    }
}

impl std::fmt::Display for PageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageContent {
    Root,
    Home(HomePage),
    BlogIndex(BlogIndexPage),
    Blog(BlogPage),
    Project(ProjectPage),
    About(AboutPage),
    Services(ServicesPage),
    Contact(ContactPage),
}

impl PageContent {
    pub fn kind(&self) -> PageKind {
        match self {
            PageContent::Root => PageKind::Root,
            PageContent::Home(_) => PageKind::Home,
            PageContent::BlogIndex(_) => PageKind::BlogIndex,
            PageContent::Blog(_) => PageKind::Blog,
            PageContent::Project(_) => PageKind::Project,
            PageContent::About(_) => PageKind::About,
            PageContent::Services(_) => PageKind::Services,
            PageContent::Contact(_) => PageKind::Contact,
        }
    }
}

impl Validate for PageContent {
    fn validate(&self) -> ValidationResult {
        match self {
            PageContent::Root | PageContent::BlogIndex(_) => Ok(()),
            PageContent::Home(p) => p.validate(),
            PageContent::Blog(p) => p.validate(),
            PageContent::Project(p) => p.validate(),
            PageContent::About(p) => p.validate(),
            PageContent::Services(p) => p.validate(),
            PageContent::Contact(p) => p.validate(),
        }
    }
}

/// Landing page with hero, portfolio, and about sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HomePage {
    #[serde(default = "default_hero_title")]
    pub hero_title: String,
    #[serde(default)]
    pub hero_subtitle: String,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

fn default_hero_title() -> String {
    DEFAULT_HERO_TITLE.to_string()
}

impl Default for HomePage {
    fn default() -> Self {
        Self {
            hero_title: default_hero_title(),
            hero_subtitle: String::new(),
            content: Vec::new(),
        }
    }
}

impl Validate for HomePage {
    fn validate(&self) -> ValidationResult {
        validate::char_field("hero_title", &self.hero_title, 255)?;
        validate::max_len("hero_subtitle", &self.hero_subtitle, 500)?;
        validate_stream("content", &self.content, HOME_BLOCKS)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlogIndexPage {
    #[serde(default)]
    pub intro: RichText,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlogPage {
    pub date: NaiveDate,
    pub intro: String,
    #[serde(default)]
    pub body: Vec<ContentBlock>,
    /// Comma-separated tags.
    #[serde(default)]
    pub tags: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<ImageRef>,
}

impl BlogPage {
    pub fn tag_list(&self) -> Vec<String> {
        validate::split_list(&self.tags)
    }
}

impl Validate for BlogPage {
    fn validate(&self) -> ValidationResult {
        validate::char_field("intro", &self.intro, 250)?;
        validate::max_len("tags", &self.tags, 500)?;
        validate_stream("body", &self.body, BLOG_BLOCKS)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectPage {
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub client: String,
    #[serde(default)]
    pub project_url: String,
    #[serde(default)]
    pub github_url: String,
    /// Comma-separated technologies.
    #[serde(default)]
    pub technologies: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub featured_image: Option<ImageRef>,
    #[serde(default)]
    pub content: Vec<ContentBlock>,
}

impl ProjectPage {
    pub fn technology_list(&self) -> Vec<String> {
        validate::split_list(&self.technologies)
    }
}

impl Validate for ProjectPage {
    fn validate(&self) -> ValidationResult {
        validate::char_field("summary", &self.summary, 500)?;
        validate::max_len("client", &self.client, 255)?;
        validate::opt_url("project_url", Some(self.project_url.as_str()))?;
        validate::opt_url("github_url", Some(self.github_url.as_str()))?;
        validate_stream("content", &self.content, PROJECT_BLOCKS)
    }
}

/// About page with career timeline and expertise.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AboutPage {
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub profile_statement: String,
    #[serde(default)]
    pub career_timeline: Vec<ContentBlock>,
    #[serde(default)]
    pub expertise_areas: Vec<ContentBlock>,
    #[serde(default)]
    pub values: Vec<ContentBlock>,
}

impl Validate for AboutPage {
    fn validate(&self) -> ValidationResult {
        validate_stream("career_timeline", &self.career_timeline, &[BlockKind::Milestone])?;
        validate_stream("expertise_areas", &self.expertise_areas, &[BlockKind::Skill])?;
        validate_stream("values", &self.values, &[BlockKind::Value])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServicesPage {
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub services: Vec<ContentBlock>,
}

impl Validate for ServicesPage {
    fn validate(&self) -> ValidationResult {
        validate_stream("services", &self.services, &[BlockKind::Service])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContactPage {
    #[serde(default)]
    pub intro: RichText,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub social_links: Vec<ContentBlock>,
}

impl Validate for ContactPage {
    fn validate(&self) -> ValidationResult {
        validate::email("email", &self.email)?;
        validate::max_len("phone", &self.phone, 20)?;
        validate_stream("social_links", &self.social_links, &[BlockKind::Social])
    }
}
