//! Profile statement revisions for the about page.
//!
//! Unlike the other seed procedures these always overwrite.

use std::str::FromStr;

use super::{resolve_home, SeedError, SeedReport};
use crate::content::{Page, PageContent, PageKind};
use crate::store::PageStore;

const DIRECT_EMPLOYMENT: &str = "Currently serving as Senior Data Center Manager at Children's National Hospital (direct employment since 2023), managing data center and system management teams. Previously held the same role through Oracle contract (2018-2023). My journey from Navy service through Accenture's global infrastructure management has given me a unique perspective on solving complex technology challenges.";

const CONSULTING_PRACTICE: &str = "Currently serving as Senior Data Center Manager at Children's National Hospital while running an independent AI & Technology consulting practice. I specialize in helping businesses leverage AI, prompt engineering, and digital transformation strategies. My unique perspective combines enterprise infrastructure management with cutting-edge AI implementation, built on a foundation from Navy service through global data center management at Accenture and Oracle.";

pub const NO_ABOUT_MESSAGE: &str = "No AboutPage found";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileRevision {
    DirectEmployment,
    #[default]
    ConsultingPractice,
}

impl ProfileRevision {
    pub fn statement(&self) -> &'static str {
        match self {
            ProfileRevision::DirectEmployment => DIRECT_EMPLOYMENT,
            ProfileRevision::ConsultingPractice => CONSULTING_PRACTICE,
        }
    }

    fn status_line(&self) -> &'static str {
        match self {
            ProfileRevision::DirectEmployment => "Updated profile statement",
            ProfileRevision::ConsultingPractice => {
                "Updated profile statement to include consulting work"
            }
        }
    }
}

impl FromStr for ProfileRevision {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "direct" | "direct-employment" => Ok(ProfileRevision::DirectEmployment),
            "2" | "consulting" | "consulting-practice" => Ok(ProfileRevision::ConsultingPractice),
            other => Err(format!("unknown profile revision '{}'", other)),
        }
    }
}

/// The about page to update: the `about` child of the home page when there is
/// one, otherwise the oldest about page anywhere.
async fn find_about(store: &dyn PageStore) -> Result<Option<Page>, SeedError> {
    let total = store.count_of_kind(PageKind::About).await?;
    if total > 1 {
        tracing::warn!(count = total, "multiple about pages found");
    }

    if let Some(home) = resolve_home(store).await? {
        if let Some(page) = store.find_by_slug(home.id, "about").await? {
            if page.kind() == PageKind::About {
                return Ok(Some(page));
            }
        }
    }
    Ok(store.first_of_kind(PageKind::About).await?)
}

pub async fn update_profile(
    store: &dyn PageStore,
    revision: ProfileRevision,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::new();

    let Some(mut page) = find_about(store).await? else {
        report.note(NO_ABOUT_MESSAGE);
        return Ok(report);
    };

    if let PageContent::About(about) = &mut page.content {
        about.profile_statement = revision.statement().to_string();
    }
    store.update_page(&page).await?;
    report.updated(revision.status_line().to_string());

    Ok(report)
}
