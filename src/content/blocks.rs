//! Structured content blocks.
//!
//! A page field holding blocks is a *stream*: an ordered `Vec<ContentBlock>`
//! restricted to a fixed set of [`BlockKind`]s. Blocks serialize as
//! `{"type": "...", "value": ...}` entries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validate::{self, Validate, ValidationError, ValidationResult};

// ============================================================================
// Field Types
// ============================================================================

/// HTML produced by an editor. Sanitized whenever it is constructed or read back.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RichText(String);

impl RichText {
    pub fn new(html: &str) -> Self {
        Self(ammonia::clean(html))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl From<String> for RichText {
    fn from(html: String) -> Self {
        Self::new(&html)
    }
}

impl From<&str> for RichText {
    fn from(html: &str) -> Self {
        Self::new(html)
    }
}

impl From<RichText> for String {
    fn from(text: RichText) -> Self {
        text.0
    }
}

/// Opaque handle to an uploaded image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageRef(pub Uuid);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodeLanguage {
    Python,
    Javascript,
    Html,
    Bash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialPlatform {
    Github,
    Linkedin,
    Twitter,
    Instagram,
    Youtube,
}

// ============================================================================
// Struct Blocks
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeroBlock {
    pub heading: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subheading: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cta_link: Option<String>,
}

impl Validate for HeroBlock {
    fn validate(&self) -> ValidationResult {
        validate::char_field("heading", &self.heading, 200)?;
        validate::opt_char_field("subheading", self.subheading.as_deref(), 500)?;
        validate::opt_char_field("cta_text", self.cta_text.as_deref(), 100)?;
        validate::opt_url("cta_link", self.cta_link.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioItemBlock {
    pub title: String,
    pub description: RichText,
    pub image: ImageRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_link: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
}

impl Validate for PortfolioItemBlock {
    fn validate(&self) -> ValidationResult {
        validate::char_field("title", &self.title, 200)?;
        if self.description.is_empty() {
            return Err(ValidationError::new("description", "This field is required"));
        }
        validate::opt_url("project_link", self.project_link.as_deref())?;
        validate::opt_url("github_link", self.github_link.as_deref())?;
        validate::each("technologies", &self.technologies, |f, t| {
            validate::char_field(f, t, 50)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillLevel {
    pub name: String,
    pub level: i32,
}

impl Validate for SkillLevel {
    fn validate(&self) -> ValidationResult {
        validate::char_field("name", &self.name, 100)?;
        validate::int_range("level", self.level, 0, 100)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AboutBlock {
    pub heading: String,
    pub content: RichText,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageRef>,
    #[serde(default)]
    pub skills: Vec<SkillLevel>,
}

impl Validate for AboutBlock {
    fn validate(&self) -> ValidationResult {
        validate::char_field("heading", &self.heading, 200)?;
        validate::each("skills", &self.skills, |f, s| {
            s.validate().map_err(|e| e.nested(f))
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeSnippet {
    pub language: CodeLanguage,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Testimonial {
    pub quote: String,
    pub author: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Validate for Testimonial {
    fn validate(&self) -> ValidationResult {
        validate::required("quote", &self.quote)?;
        validate::char_field("author", &self.author, 255)?;
        validate::opt_char_field("role", self.role.as_deref(), 255)
    }
}

/// One entry of a career timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Milestone {
    pub year: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    pub description: String,
}

impl Validate for Milestone {
    fn validate(&self) -> ValidationResult {
        validate::char_field("year", &self.year, 50)?;
        validate::char_field("title", &self.title, 255)?;
        validate::opt_char_field("organization", self.organization.as_deref(), 255)?;
        validate::required("description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpertiseSkill {
    pub area: String,
    pub level: i32,
}

impl Validate for ExpertiseSkill {
    fn validate(&self) -> ValidationResult {
        validate::char_field("area", &self.area, 100)?;
        validate::int_range("level", self.level, 0, 100)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueStatement {
    pub icon: String,
    pub title: String,
    pub description: String,
}

impl Validate for ValueStatement {
    fn validate(&self) -> ValidationResult {
        validate::char_field("icon", &self.icon, 5)?;
        validate::char_field("title", &self.title, 100)?;
        validate::required("description", &self.description)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceOffering {
    pub icon: String,
    pub title: String,
    pub description: RichText,
    #[serde(default)]
    pub features: Vec<String>,
}

impl Validate for ServiceOffering {
    fn validate(&self) -> ValidationResult {
        validate::char_field("icon", &self.icon, 5)?;
        validate::char_field("title", &self.title, 200)?;
        validate::each("features", &self.features, |f, s| {
            validate::char_field(f, s, 255)
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLink {
    pub platform: SocialPlatform,
    pub url: String,
}

impl Validate for SocialLink {
    fn validate(&self) -> ValidationResult {
        validate::url("url", &self.url)
    }
}

// ============================================================================
// Content Block
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ContentBlock {
    Hero(HeroBlock),
    About(AboutBlock),
    Portfolio(Vec<PortfolioItemBlock>),
    RichText(RichText),
    RawHtml(String),
    Heading(String),
    Paragraph(RichText),
    Image(ImageRef),
    Code(String),
    Quote(String),
    Embed(String),
    Overview(RichText),
    Features(Vec<String>),
    Gallery(Vec<ImageRef>),
    CodeSnippet(CodeSnippet),
    Testimonial(Testimonial),
    Milestone(Milestone),
    Skill(ExpertiseSkill),
    Value(ValueStatement),
    Service(ServiceOffering),
    Social(SocialLink),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Hero,
    About,
    Portfolio,
    RichText,
    RawHtml,
    Heading,
    Paragraph,
    Image,
    Code,
    Quote,
    Embed,
    Overview,
    Features,
    Gallery,
    CodeSnippet,
    Testimonial,
    Milestone,
    Skill,
    Value,
    Service,
    Social,
}

impl BlockKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BlockKind::Hero => "hero",
            BlockKind::About => "about",
            BlockKind::Portfolio => "portfolio",
            BlockKind::RichText => "rich_text",
            BlockKind::RawHtml => "raw_html",
            BlockKind::Heading => "heading",
            BlockKind::Paragraph => "paragraph",
            BlockKind::Image => "image",
            BlockKind::Code => "code",
            BlockKind::Quote => "quote",
            BlockKind::Embed => "embed",
            BlockKind::Overview => "overview",
            BlockKind::Features => "features",
            BlockKind::Gallery => "gallery",
            BlockKind::CodeSnippet => "code_snippet",
            BlockKind::Testimonial => "testimonial",
            BlockKind::Milestone => "milestone",
            BlockKind::Skill => "skill",
            BlockKind::Value => "value",
            BlockKind::Service => "service",
            BlockKind::Social => "social",
        }
    }
}

impl ContentBlock {
    pub fn kind(&self) -> BlockKind {
        match self {
            ContentBlock::Hero(_) => BlockKind::Hero,
            ContentBlock::About(_) => BlockKind::About,
            ContentBlock::Portfolio(_) => BlockKind::Portfolio,
            ContentBlock::RichText(_) => BlockKind::RichText,
            ContentBlock::RawHtml(_) => BlockKind::RawHtml,
            ContentBlock::Heading(_) => BlockKind::Heading,
            ContentBlock::Paragraph(_) => BlockKind::Paragraph,
            ContentBlock::Image(_) => BlockKind::Image,
            ContentBlock::Code(_) => BlockKind::Code,
            ContentBlock::Quote(_) => BlockKind::Quote,
            ContentBlock::Embed(_) => BlockKind::Embed,
            ContentBlock::Overview(_) => BlockKind::Overview,
            ContentBlock::Features(_) => BlockKind::Features,
            ContentBlock::Gallery(_) => BlockKind::Gallery,
            ContentBlock::CodeSnippet(_) => BlockKind::CodeSnippet,
            ContentBlock::Testimonial(_) => BlockKind::Testimonial,
            ContentBlock::Milestone(_) => BlockKind::Milestone,
            ContentBlock::Skill(_) => BlockKind::Skill,
            ContentBlock::Value(_) => BlockKind::Value,
            ContentBlock::Service(_) => BlockKind::Service,
            ContentBlock::Social(_) => BlockKind::Social,
        }
    }
}

impl Validate for ContentBlock {
    fn validate(&self) -> ValidationResult {
        match self {
            ContentBlock::Hero(b) => b.validate(),
            ContentBlock::About(b) => b.validate(),
            ContentBlock::Portfolio(items) => {
                validate::each("items", items, |f, item| {
                    item.validate().map_err(|e| e.nested(f))
                })
            }
            ContentBlock::Heading(text) => validate::required("heading", text),
            ContentBlock::Embed(link) => validate::url("embed", link),
            ContentBlock::Features(features) => {
                validate::each("features", features, |f, s| {
                    validate::char_field(f, s, 255)
                })
            }
            ContentBlock::CodeSnippet(snippet) => validate::required("code", &snippet.code),
            ContentBlock::Testimonial(b) => b.validate(),
            ContentBlock::Milestone(b) => b.validate(),
            ContentBlock::Skill(b) => b.validate(),
            ContentBlock::Value(b) => b.validate(),
            ContentBlock::Service(b) => b.validate(),
            ContentBlock::Social(b) => b.validate(),
            ContentBlock::RichText(_)
            | ContentBlock::RawHtml(_)
            | ContentBlock::Paragraph(_)
            | ContentBlock::Image(_)
            | ContentBlock::Code(_)
            | ContentBlock::Quote(_)
            | ContentBlock::Overview(_)
            | ContentBlock::Gallery(_) => Ok(()),
        }
    }
}

/// Validate a stream field: every block must be one of `allowed` and valid itself.
pub fn validate_stream(
    field: &str,
    blocks: &[ContentBlock],
    allowed: &[BlockKind],
) -> ValidationResult {
    for (i, block) in blocks.iter().enumerate() {
        let kind = block.kind();
        let path = format!("{}[{}]", field, i);
        if !allowed.contains(&kind) {
            return Err(ValidationError::new(
                path,
                format!("Block type '{}' is not allowed here", kind.as_str()),
            ));
        }
        block
            .validate()
            .map_err(|e| e.nested(&format!("{}.{}", path, kind.as_str())))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hero(heading: &str) -> ContentBlock {
        ContentBlock::Hero(HeroBlock {
            heading: heading.to_string(),
            subheading: None,
            image: None,
            cta_text: Some("Book a consultation".to_string()),
            cta_link: Some("https://benniewilliams.com/contact/".to_string()),
        })
    }

    #[test]
    fn test_rich_text_is_sanitized() {
        let text = RichText::new("<p>Hello</p><script>alert(1)</script>");
        assert_eq!(text.as_str(), "<p>Hello</p>");

        let parsed: RichText = serde_json::from_str("\"<p onclick=\\\"x()\\\">Hi</p>\"").unwrap();
        assert_eq!(parsed.as_str(), "<p>Hi</p>");
    }

    #[test]
    fn test_block_serializes_as_type_value() {
        let json = serde_json::to_value(hero("Strategic Technology Leadership")).unwrap();
        assert_eq!(json["type"], "hero");
        assert_eq!(json["value"]["heading"], "Strategic Technology Leadership");
        assert!(json["value"].get("image").is_none());

        let snippet = ContentBlock::CodeSnippet(CodeSnippet {
            language: CodeLanguage::Bash,
            code: "terraform apply".to_string(),
        });
        let json = serde_json::to_value(&snippet).unwrap();
        assert_eq!(json["type"], "code_snippet");
        assert_eq!(json["value"]["language"], "bash");
    }

    #[test]
    fn test_unknown_enum_choice_is_rejected() {
        let raw = r#"{"type":"social","value":{"platform":"myspace","url":"https://myspace.com/x"}}"#;
        assert!(serde_json::from_str::<ContentBlock>(raw).is_err());
    }

    #[test]
    fn test_skill_level_out_of_range() {
        let block = ContentBlock::About(AboutBlock {
            heading: "About".to_string(),
            content: RichText::new("<p>Infrastructure leader</p>"),
            image: None,
            skills: vec![
                SkillLevel { name: "VMware".to_string(), level: 95 },
                SkillLevel { name: "FinOps".to_string(), level: 120 },
            ],
        });
        let err = validate_stream("content", &[block], &[BlockKind::About]).unwrap_err();
        assert_eq!(err.field, "content[0].about.skills[1].level");
    }

    #[test]
    fn test_stream_rejects_disallowed_kind() {
        let blocks = vec![hero("Welcome"), ContentBlock::Code("ls".to_string())];
        let err = validate_stream("content", &blocks, &[BlockKind::Hero]).unwrap_err();
        assert_eq!(err.field, "content[1]");
        assert!(err.message.contains("code"));
    }

    #[test]
    fn test_hero_heading_max_length() {
        let err = validate_stream("content", &[hero(&"h".repeat(201))], &[BlockKind::Hero])
            .unwrap_err();
        assert_eq!(err.field, "content[0].hero.heading");
    }

    #[test]
    fn test_portfolio_technology_max_length() {
        let item = PortfolioItemBlock {
            title: "Data center consolidation".to_string(),
            description: RichText::new("<p>17 sites</p>"),
            image: ImageRef(Uuid::new_v4()),
            project_link: None,
            github_link: Some("https://github.com/MDsniper".to_string()),
            technologies: vec!["VMware".to_string(), "x".repeat(51)],
        };
        let err = validate_stream(
            "content",
            &[ContentBlock::Portfolio(vec![item])],
            &[BlockKind::Portfolio],
        )
        .unwrap_err();
        assert_eq!(err.field, "content[0].portfolio.items[0].technologies[1]");
    }
}
