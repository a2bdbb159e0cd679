//! In-process store. Used when no database is configured and throughout the tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    root_page, validate_site, NewSite, PageStore, Site, SiteStore, StoreError, StoreResult,
};
use crate::content::{NewPage, Page, PageKind, Validate};

#[derive(Debug, Default)]
struct Inner {
    /// Creation order is insertion order.
    pages: Vec<Page>,
    sites: Vec<Site>,
}

#[derive(Debug)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                pages: vec![root_page()],
                sites: Vec::new(),
            }),
        }
    }

    /// Total number of pages, root included.
    pub async fn page_count(&self) -> usize {
        self.inner.read().await.pages.len()
    }

    /// Snapshot of every page in creation order.
    pub async fn all_pages(&self) -> Vec<Page> {
        self.inner.read().await.pages.clone()
    }

    pub async fn all_sites(&self) -> Vec<Site> {
        self.inner.read().await.sites.clone()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn sibling_owns_slug(pages: &[Page], parent_id: Uuid, slug: &str, except: Option<Uuid>) -> bool {
    pages
        .iter()
        .any(|p| p.parent_id == Some(parent_id) && p.slug == slug && Some(p.id) != except)
}

#[async_trait]
impl PageStore for MemoryStore {
    async fn root(&self) -> StoreResult<Page> {
        let inner = self.inner.read().await;
        inner
            .pages
            .iter()
            .find(|p| p.is_root())
            .cloned()
            .ok_or_else(|| StoreError::NotFound("root page".to_string()))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Page>> {
        let inner = self.inner.read().await;
        Ok(inner.pages.iter().find(|p| p.id == id).cloned())
    }

    async fn find_by_slug(&self, parent_id: Uuid, slug: &str) -> StoreResult<Option<Page>> {
        let inner = self.inner.read().await;
        Ok(inner
            .pages
            .iter()
            .find(|p| p.parent_id == Some(parent_id) && p.slug == slug)
            .cloned())
    }

    async fn first_of_kind(&self, kind: PageKind) -> StoreResult<Option<Page>> {
        let inner = self.inner.read().await;
        Ok(inner.pages.iter().find(|p| p.kind() == kind).cloned())
    }

    async fn count_of_kind(&self, kind: PageKind) -> StoreResult<u64> {
        let inner = self.inner.read().await;
        Ok(inner.pages.iter().filter(|p| p.kind() == kind).count() as u64)
    }

    async fn children(&self, parent_id: Uuid) -> StoreResult<Vec<Page>> {
        let inner = self.inner.read().await;
        Ok(inner
            .pages
            .iter()
            .filter(|p| p.parent_id == Some(parent_id))
            .cloned()
            .collect())
    }

    async fn create_child(&self, parent_id: Uuid, page: NewPage) -> StoreResult<Page> {
        let page = page.into_page(Uuid::new_v4(), parent_id, Utc::now());
        page.validate()?;

        let mut inner = self.inner.write().await;
        if !inner.pages.iter().any(|p| p.id == parent_id) {
            return Err(StoreError::NotFound(format!("parent page {}", parent_id)));
        }
        if sibling_owns_slug(&inner.pages, parent_id, &page.slug, None) {
            return Err(StoreError::SlugCollision {
                parent: parent_id,
                slug: page.slug,
            });
        }

        inner.pages.push(page.clone());
        Ok(page)
    }

    async fn update_page(&self, page: &Page) -> StoreResult<Page> {
        page.validate()?;

        let mut inner = self.inner.write().await;
        let index = inner
            .pages
            .iter()
            .position(|p| p.id == page.id)
            .ok_or_else(|| StoreError::NotFound(format!("page {}", page.id)))?;

        let parent_id = inner.pages[index].parent_id;
        if let Some(parent_id) = parent_id {
            if sibling_owns_slug(&inner.pages, parent_id, &page.slug, Some(page.id)) {
                return Err(StoreError::SlugCollision {
                    parent: parent_id,
                    slug: page.slug.clone(),
                });
            }
        }

        let stored = &mut inner.pages[index];
        stored.title = page.title.clone();
        stored.slug = page.slug.clone();
        stored.live = page.live;
        stored.content = page.content.clone();
        if stored.live && stored.first_published_at.is_none() {
            stored.first_published_at = Some(Utc::now());
        }
        Ok(stored.clone())
    }
}

#[async_trait]
impl SiteStore for MemoryStore {
    async fn default_site(&self) -> StoreResult<Option<Site>> {
        let inner = self.inner.read().await;
        Ok(inner.sites.iter().find(|s| s.is_default).cloned())
    }

    async fn first_site(&self) -> StoreResult<Option<Site>> {
        let inner = self.inner.read().await;
        Ok(inner.sites.first().cloned())
    }

    async fn create_site(&self, site: NewSite) -> StoreResult<Site> {
        validate_site(&site.hostname, site.port)?;

        let mut inner = self.inner.write().await;
        if !inner.pages.iter().any(|p| p.id == site.root_page_id) {
            return Err(StoreError::NotFound(format!("root page {}", site.root_page_id)));
        }
        if site.is_default {
            inner.sites.iter_mut().for_each(|s| s.is_default = false);
        }

        let created = Site {
            id: Uuid::new_v4(),
            hostname: site.hostname,
            port: site.port,
            root_page_id: site.root_page_id,
            is_default: site.is_default,
        };
        inner.sites.push(created.clone());
        Ok(created)
    }

    async fn update_site(&self, site: &Site) -> StoreResult<Site> {
        validate_site(&site.hostname, site.port)?;

        let mut inner = self.inner.write().await;
        if !inner.pages.iter().any(|p| p.id == site.root_page_id) {
            return Err(StoreError::NotFound(format!("root page {}", site.root_page_id)));
        }
        let index = inner
            .sites
            .iter()
            .position(|s| s.id == site.id)
            .ok_or_else(|| StoreError::NotFound(format!("site {}", site.id)))?;

        if site.is_default {
            inner.sites.iter_mut().for_each(|s| s.is_default = false);
        }
        inner.sites[index] = site.clone();
        Ok(site.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::pages::{ContactPage, ServicesPage};
    use crate::content::PageContent;
    use crate::store::ROOT_PAGE_ID;

    fn services(title: &str, slug: &str) -> NewPage {
        NewPage::live(title, slug, PageContent::Services(ServicesPage::default()))
    }

    #[tokio::test]
    async fn test_new_store_has_single_root() {
        let store = MemoryStore::new();
        let root = store.root().await.unwrap();
        assert_eq!(root.id, ROOT_PAGE_ID);
        assert_eq!(store.page_count().await, 1);
        assert_eq!(store.count_of_kind(PageKind::Root).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_slug_under_same_parent_collides() {
        let store = MemoryStore::new();
        let first = store
            .create_child(ROOT_PAGE_ID, services("Services", "services"))
            .await
            .unwrap();

        let err = store
            .create_child(ROOT_PAGE_ID, services("Other Services", "services"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::SlugCollision { ref slug, .. } if slug == "services"));

        let kept = store.find_by_slug(ROOT_PAGE_ID, "services").await.unwrap().unwrap();
        assert_eq!(kept, first);
        assert_eq!(store.page_count().await, 2);
    }

    #[tokio::test]
    async fn test_same_slug_under_different_parents_is_allowed() {
        let store = MemoryStore::new();
        let a = store.create_child(ROOT_PAGE_ID, services("A", "a")).await.unwrap();
        let b = store.create_child(ROOT_PAGE_ID, services("B", "b")).await.unwrap();
        store.create_child(a.id, services("Team", "team")).await.unwrap();
        store.create_child(b.id, services("Team", "team")).await.unwrap();
        assert_eq!(store.children(a.id).await.unwrap().len(), 1);
        assert_eq!(store.children(b.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_child_requires_parent() {
        let store = MemoryStore::new();
        let err = store
            .create_child(Uuid::new_v4(), services("Orphan", "orphan"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_page_is_not_stored() {
        let store = MemoryStore::new();
        let contact = NewPage::live(
            "Contact",
            "contact",
            PageContent::Contact(ContactPage {
                phone: "0".repeat(21),
                ..Default::default()
            }),
        );
        let err = store.create_child(ROOT_PAGE_ID, contact).await.unwrap_err();
        match err {
            StoreError::Validation(e) => assert_eq!(e.field, "phone"),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(store.page_count().await, 1);
    }

    #[tokio::test]
    async fn test_second_root_is_rejected() {
        let store = MemoryStore::new();
        let err = store
            .create_child(ROOT_PAGE_ID, NewPage::live("Root", "root2", PageContent::Root))
            .await
            .unwrap_err();
        match err {
            StoreError::Validation(e) => assert_eq!(e.field, "kind"),
            other => panic!("unexpected error {:?}", other),
        }
        assert_eq!(store.count_of_kind(PageKind::Root).await.unwrap(), 1);

        let mut page = store.create_child(ROOT_PAGE_ID, services("A", "a")).await.unwrap();
        page.content = PageContent::Root;
        assert!(matches!(
            store.update_page(&page).await.unwrap_err(),
            StoreError::Validation(_)
        ));
        assert_eq!(store.count_of_kind(PageKind::Root).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_page_rejects_sibling_slug() {
        let store = MemoryStore::new();
        store.create_child(ROOT_PAGE_ID, services("A", "a")).await.unwrap();
        let mut b = store.create_child(ROOT_PAGE_ID, services("B", "b")).await.unwrap();

        b.slug = "a".to_string();
        assert!(matches!(
            store.update_page(&b).await.unwrap_err(),
            StoreError::SlugCollision { .. }
        ));

        b.slug = "b".to_string();
        b.title = "Renamed".to_string();
        let updated = store.update_page(&b).await.unwrap();
        assert_eq!(updated.title, "Renamed");
    }

    #[tokio::test]
    async fn test_only_one_default_site() {
        let store = MemoryStore::new();
        let first = store
            .create_site(NewSite {
                hostname: "localhost".to_string(),
                port: 8000,
                root_page_id: ROOT_PAGE_ID,
                is_default: true,
            })
            .await
            .unwrap();
        let second = store
            .create_site(NewSite {
                hostname: "benniewilliams.com".to_string(),
                port: 443,
                root_page_id: ROOT_PAGE_ID,
                is_default: true,
            })
            .await
            .unwrap();

        let default = store.default_site().await.unwrap().unwrap();
        assert_eq!(default.id, second.id);
        assert_eq!(store.first_site().await.unwrap().unwrap().id, first.id);
        assert!(!store.first_site().await.unwrap().unwrap().is_default);
    }
}
