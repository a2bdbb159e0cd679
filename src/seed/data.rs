//! Literal content the seed commands bring the site to.

use crate::content::pages::{
    AboutPage, BlogIndexPage, BlogPage, ContactPage, HomePage, ProjectPage, ServicesPage,
};
use crate::content::{NewPage, PageContent, RichText};

use super::{parse_date, SeedError};

pub const HOME_TITLE: &str = "Bennie Williams Consulting";
pub const HOME_SLUG: &str = "home";
pub const HERO_TITLE: &str = "Strategic Technology Leadership & Innovation";
pub const HERO_SUBTITLE: &str = "Hi, I'm Bennie Williams. I help businesses navigate the complex landscape of modern technology, from AI and automation to cloud infrastructure and digital transformation.";

pub const CONTACT_EMAIL: &str = "consulting@benniewilliams.com";

pub struct BlogPostSeed {
    pub title: &'static str,
    pub slug: &'static str,
    pub intro: &'static str,
    pub date: &'static str,
    pub tags: &'static str,
}

pub const BLOG_POSTS: &[BlogPostSeed] = &[
    BlogPostSeed {
        title: "The Future of Enterprise AI: What Leaders Need to Know",
        slug: "future-of-enterprise-ai",
        intro: "Explore the transformative potential of AI in enterprise environments",
        date: "2024-01-15",
        tags: "AI Strategy, Enterprise, Digital Transformation",
    },
    BlogPostSeed {
        title: "Mastering Prompt Engineering for Business Applications",
        slug: "mastering-prompt-engineering",
        intro: "Discover advanced techniques for crafting effective prompts",
        date: "2024-01-10",
        tags: "AI Training, Prompt Engineering, LLM",
    },
    BlogPostSeed {
        title: "VMware vSphere 8.0: Key Features for Modern Infrastructure",
        slug: "vmware-vsphere-8",
        intro: "A comprehensive guide to the latest VMware vSphere features",
        date: "2024-01-05",
        tags: "Infrastructure, VMware, Virtualization",
    },
];

impl BlogPostSeed {
    pub fn to_new_page(&self) -> Result<NewPage, SeedError> {
        Ok(NewPage::live(
            self.title,
            self.slug,
            PageContent::Blog(BlogPage {
                date: parse_date(self.date)?,
                intro: self.intro.to_string(),
                body: Vec::new(),
                tags: self.tags.to_string(),
                featured_image: None,
            }),
        ))
    }
}

pub struct ProjectSeed {
    pub title: &'static str,
    pub slug: &'static str,
    pub summary: &'static str,
    pub technologies: &'static str,
    pub client: &'static str,
}

pub const PROJECTS: &[ProjectSeed] = &[
    ProjectSeed {
        title: "Healthcare Infrastructure Modernization",
        slug: "healthcare-infrastructure",
        summary: "Led the modernization of Children's National Hospital's data center infrastructure, improving efficiency by 40% and reducing operational costs.",
        technologies: "VMware vSphere, Cloud Architecture, Infrastructure as Code, Automation",
        client: "Children's National Hospital",
    },
    ProjectSeed {
        title: "Global Data Center Management at Accenture",
        slug: "accenture-global-dc",
        summary: "Managed 17 global data centers as VMware Subject Matter Expert, implementing FinOps initiatives that saved Fortune 500 clients millions in operational costs.",
        technologies: "VMware, FinOps, Cloud Cost Optimization, Global Team Leadership",
        client: "Accenture",
    },
];

impl ProjectSeed {
    pub fn to_new_page(&self) -> NewPage {
        NewPage::live(
            self.title,
            self.slug,
            PageContent::Project(ProjectPage {
                summary: self.summary.to_string(),
                start_date: None,
                end_date: None,
                client: self.client.to_string(),
                project_url: String::new(),
                github_url: String::new(),
                technologies: self.technologies.to_string(),
                featured_image: None,
                content: Vec::new(),
            }),
        )
    }
}

pub fn home_page() -> NewPage {
    NewPage::live(
        HOME_TITLE,
        HOME_SLUG,
        PageContent::Home(HomePage {
            hero_title: HERO_TITLE.to_string(),
            hero_subtitle: HERO_SUBTITLE.to_string(),
            content: Vec::new(),
        }),
    )
}

pub fn blog_index_page() -> NewPage {
    NewPage::live(
        "Blog & Insights",
        "blog",
        PageContent::BlogIndex(BlogIndexPage {
            intro: RichText::new("<p>Stay informed with practical insights on technology strategy, AI implementation, and digital transformation.</p>"),
        }),
    )
}

pub fn contact_page() -> NewPage {
    NewPage::live(
        "Contact",
        "contact",
        PageContent::Contact(ContactPage {
            intro: RichText::new("<p>Let's discuss how strategic technology solutions can drive your business forward. Schedule a consultation to explore the possibilities.</p>"),
            email: CONTACT_EMAIL.to_string(),
            ..Default::default()
        }),
    )
}

pub const INITIAL_PROFILE_STATEMENT: &str = "Currently providing senior infrastructure consulting through Oracle at Children's National Hospital. Previously served as IT Manager at CNH from 2018-2023, managing data center and system management teams. My journey from Navy service through Accenture's global infrastructure management has given me a unique perspective on solving complex technology challenges.";

pub fn about_page() -> NewPage {
    NewPage::live(
        "About",
        "about",
        PageContent::About(AboutPage {
            intro: RichText::new("<p>Learn about Bennie Williams, a technology consultant with a unique background in the Navy, healthcare IT, and a passion for helping businesses succeed through strategic technology.</p>"),
            profile_statement: INITIAL_PROFILE_STATEMENT.to_string(),
            ..Default::default()
        }),
    )
}

pub fn services_page() -> NewPage {
    NewPage::live(
        "Services",
        "services",
        PageContent::Services(ServicesPage {
            intro: RichText::new("<p>From strategic planning to implementation, I provide end-to-end technology solutions tailored to your unique business needs.</p>"),
            services: Vec::new(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PageKind, Validate};
    use uuid::Uuid;

    fn validate(page: NewPage) {
        let page = page.into_page(Uuid::new_v4(), Uuid::nil(), chrono::Utc::now());
        if let Err(e) = page.validate() {
            panic!("seed literal '{}' is invalid: {}", page.slug, e);
        }
    }

    #[test]
    fn test_every_literal_passes_validation() {
        validate(home_page());
        validate(blog_index_page());
        validate(contact_page());
        validate(about_page());
        validate(services_page());
        for post in BLOG_POSTS {
            validate(post.to_new_page().unwrap());
        }
        for project in PROJECTS {
            validate(project.to_new_page());
        }
    }

    #[test]
    fn test_literal_slugs_are_unique_per_parent() {
        let mut home_children: Vec<&str> = vec!["blog", "contact", "about", "services"];
        home_children.extend(PROJECTS.iter().map(|p| p.slug));
        let mut deduped = home_children.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), home_children.len());
    }

    #[test]
    fn test_contact_literal() {
        let contact = contact_page();
        assert_eq!(contact.title, "Contact");
        assert_eq!(contact.slug, "contact");
        assert_eq!(contact.content.kind(), PageKind::Contact);
    }
}
