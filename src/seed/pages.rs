//! About and services pages under the home page.

use super::{data, ensure_child, resolve_home, SeedError, SeedReport};
use crate::store::PageStore;

pub const NO_HOME_MESSAGE: &str = "No HomePage found. Please run populate-content first.";

pub async fn populate_pages(store: &dyn PageStore) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::new();

    let Some(home) = resolve_home(store).await? else {
        report.note(NO_HOME_MESSAGE);
        return Ok(report);
    };

    if let Err(e) = ensure_child(store, &home, data::about_page(), &mut report).await {
        report.failed("about page", &e);
    }
    if let Err(e) = ensure_child(store, &home, data::services_page(), &mut report).await {
        report.failed("services page", &e);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{PageContent, PageKind};
    use crate::seed::content::populate_content;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_requires_home() {
        let store = MemoryStore::new();
        let report = populate_pages(&store).await.unwrap();
        assert_eq!(report.lines, vec![NO_HOME_MESSAGE.to_string()]);
        assert_eq!(store.page_count().await, 1);
    }

    #[tokio::test]
    async fn test_creates_about_and_services() {
        let store = MemoryStore::new();
        populate_content(&store).await.unwrap();
        let report = populate_pages(&store).await.unwrap();
        assert_eq!(report.created, 2);

        let about = store.first_of_kind(PageKind::About).await.unwrap().unwrap();
        match about.content {
            PageContent::About(a) => {
                assert_eq!(a.profile_statement, data::INITIAL_PROFILE_STATEMENT)
            }
            other => panic!("unexpected content {:?}", other),
        }
        assert_eq!(store.count_of_kind(PageKind::Services).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_content_and_pages_twice_leave_tree_unchanged() {
        let store = MemoryStore::new();
        populate_content(&store).await.unwrap();
        populate_pages(&store).await.unwrap();
        let before = store.all_pages().await;

        populate_content(&store).await.unwrap();
        let report = populate_pages(&store).await.unwrap();
        assert_eq!(report.created, 0);
        assert_eq!(report.existing, 2);

        let after = store.all_pages().await;
        assert_eq!(after, before);

        let mut keys: Vec<_> = after.iter().map(|p| (p.parent_id, p.slug.clone())).collect();
        let total = keys.len();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), total);
    }
}
