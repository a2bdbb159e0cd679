//! Home page, blog, contact page and project pages.

use super::{data, ensure_child, resolve_home, SeedError, SeedReport};
use crate::store::PageStore;

/// Bring the home page and its blog, contact and project children to the
/// literal initial state.
///
/// Later steps run even when an earlier independent step fails; blog posts are
/// skipped when the blog index could not be resolved.
pub async fn populate_content(store: &dyn PageStore) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::new();

    let home = match resolve_home(store).await? {
        Some(home) => {
            report.existing(&home);
            home
        }
        None => {
            let root = store.root().await?;
            ensure_child(store, &root, data::home_page(), &mut report).await?
        }
    };

    let blog_index = match ensure_child(store, &home, data::blog_index_page(), &mut report).await {
        Ok(index) => Some(index),
        Err(e) => {
            report.failed("blog index", &e);
            None
        }
    };

    if let Some(index) = &blog_index {
        for post in data::BLOG_POSTS {
            let result = match post.to_new_page() {
                Ok(page) => ensure_child(store, index, page, &mut report).await,
                Err(e) => Err(e),
            };
            if let Err(e) = result {
                report.failed(post.slug, &e);
            }
        }
    } else {
        report.note("Skipping blog posts: blog index unavailable");
    }

    if let Err(e) = ensure_child(store, &home, data::contact_page(), &mut report).await {
        report.failed("contact page", &e);
    }

    for project in data::PROJECTS {
        if let Err(e) = ensure_child(store, &home, project.to_new_page(), &mut report).await {
            report.failed(project.slug, &e);
        }
    }

    Ok(report)
}
