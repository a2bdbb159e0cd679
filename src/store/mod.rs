//! Storage access for the content tree and the site binding.
//!
//! Seeders and routes only talk to [`PageStore`] / [`SiteStore`], so the same
//! logic runs against PostgreSQL in production and [`MemoryStore`] in tests.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::content::{NewPage, Page, PageContent, PageKind, ValidationError};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// The tree root has a fixed id so every store agrees on it.
pub const ROOT_PAGE_ID: Uuid = Uuid::nil();
pub const ROOT_SLUG: &str = "root";
pub const ROOT_TITLE: &str = "Root";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("slug '{slug}' is already in use under parent {parent}")]
    SlugCollision { parent: Uuid, slug: String },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

pub fn root_page() -> Page {
    Page {
        id: ROOT_PAGE_ID,
        parent_id: None,
        title: ROOT_TITLE.to_string(),
        slug: ROOT_SLUG.to_string(),
        live: true,
        first_published_at: None,
        content: PageContent::Root,
    }
}

#[async_trait]
pub trait PageStore: Send + Sync {
    async fn root(&self) -> StoreResult<Page>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<Page>>;

    /// Look up a direct child of `parent_id` by slug.
    async fn find_by_slug(&self, parent_id: Uuid, slug: &str) -> StoreResult<Option<Page>>;

    /// Oldest page of the given kind, anywhere in the tree.
    async fn first_of_kind(&self, kind: PageKind) -> StoreResult<Option<Page>>;

    async fn count_of_kind(&self, kind: PageKind) -> StoreResult<u64>;

    /// Direct children in creation order.
    async fn children(&self, parent_id: Uuid) -> StoreResult<Vec<Page>>;

    /// Validate and attach a new page under `parent_id`.
    ///
    /// Fails with [`StoreError::SlugCollision`] if a sibling already owns the slug
    /// and with [`StoreError::NotFound`] if the parent does not exist.
    async fn create_child(&self, parent_id: Uuid, page: NewPage) -> StoreResult<Page>;

    /// Validate and persist title, slug, live flag and content of an existing page.
    async fn update_page(&self, page: &Page) -> StoreResult<Page>;
}

/// Virtual host record pointing at a root page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: Uuid,
    pub hostname: String,
    pub port: u16,
    pub root_page_id: Uuid,
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSite {
    pub hostname: String,
    pub port: u16,
    pub root_page_id: Uuid,
    pub is_default: bool,
}

pub(crate) fn validate_site(hostname: &str, port: u16) -> Result<(), ValidationError> {
    crate::content::validate::char_field("hostname", hostname, 255)?;
    if port == 0 {
        return Err(ValidationError::new("port", "Port must be between 1 and 65535"));
    }
    Ok(())
}

#[async_trait]
pub trait SiteStore: Send + Sync {
    async fn default_site(&self) -> StoreResult<Option<Site>>;

    async fn first_site(&self) -> StoreResult<Option<Site>>;

    /// Marking the new record default clears the flag on every other record.
    async fn create_site(&self, site: NewSite) -> StoreResult<Site>;

    async fn update_site(&self, site: &Site) -> StoreResult<Site>;
}
