//! PostgreSQL-backed store. Kind-specific page fields live in a JSONB column.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::{validate_site, NewSite, PageStore, Site, SiteStore, StoreError, StoreResult};
use crate::content::{NewPage, Page, PageKind, Validate};
use crate::db::models::{PageRow, SiteRow, PAGE_COLUMNS, SITE_COLUMNS};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn slug_taken(&self, parent_id: Uuid, slug: &str, except: Option<Uuid>) -> StoreResult<bool> {
        let (taken,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM pages
                WHERE parent_id = $1 AND slug = $2 AND ($3::UUID IS NULL OR id <> $3)
            )
            "#,
        )
        .bind(parent_id)
        .bind(slug)
        .bind(except)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }
}

fn decode(row: Option<PageRow>) -> StoreResult<Option<Page>> {
    row.map(Page::try_from).transpose().map_err(StoreError::from)
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl PageStore for PgStore {
    async fn root(&self) -> StoreResult<Page> {
        let sql = format!("SELECT {} FROM pages WHERE parent_id IS NULL", PAGE_COLUMNS);
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        decode(row)?.ok_or_else(|| StoreError::NotFound("root page".to_string()))
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<Page>> {
        let sql = format!("SELECT {} FROM pages WHERE id = $1", PAGE_COLUMNS);
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        decode(row)
    }

    async fn find_by_slug(&self, parent_id: Uuid, slug: &str) -> StoreResult<Option<Page>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE parent_id = $1 AND slug = $2",
            PAGE_COLUMNS
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(parent_id)
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        decode(row)
    }

    async fn first_of_kind(&self, kind: PageKind) -> StoreResult<Option<Page>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE kind = $1 ORDER BY seq LIMIT 1",
            PAGE_COLUMNS
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(kind.as_str())
            .fetch_optional(&self.pool)
            .await?;
        decode(row)
    }

    async fn count_of_kind(&self, kind: PageKind) -> StoreResult<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM pages WHERE kind = $1")
            .bind(kind.as_str())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn children(&self, parent_id: Uuid) -> StoreResult<Vec<Page>> {
        let sql = format!(
            "SELECT {} FROM pages WHERE parent_id = $1 ORDER BY seq",
            PAGE_COLUMNS
        );
        let rows = sqlx::query_as::<_, PageRow>(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter()
            .map(|row| Page::try_from(row).map_err(StoreError::from))
            .collect()
    }

    async fn create_child(&self, parent_id: Uuid, page: NewPage) -> StoreResult<Page> {
        let page = page.into_page(Uuid::new_v4(), parent_id, chrono::Utc::now());
        page.validate()?;

        if self.get(parent_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("parent page {}", parent_id)));
        }
        if self.slug_taken(parent_id, &page.slug, None).await? {
            return Err(StoreError::SlugCollision {
                parent: parent_id,
                slug: page.slug,
            });
        }

        let content = serde_json::to_value(&page.content)?;
        let result = sqlx::query(
            r#"
            INSERT INTO pages (id, parent_id, slug, title, kind, live, first_published_at, content)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(page.id)
        .bind(parent_id)
        .bind(&page.slug)
        .bind(&page.title)
        .bind(page.kind().as_str())
        .bind(page.live)
        .bind(page.first_published_at)
        .bind(&content)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(page),
            // Lost a race with a concurrent insert of the same slug.
            Err(e) if is_unique_violation(&e) => Err(StoreError::SlugCollision {
                parent: parent_id,
                slug: page.slug,
            }),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_page(&self, page: &Page) -> StoreResult<Page> {
        page.validate()?;

        let existing = self
            .get(page.id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("page {}", page.id)))?;
        if let Some(parent_id) = existing.parent_id {
            if self.slug_taken(parent_id, &page.slug, Some(page.id)).await? {
                return Err(StoreError::SlugCollision {
                    parent: parent_id,
                    slug: page.slug.clone(),
                });
            }
        }

        let content = serde_json::to_value(&page.content)?;
        let sql = format!(
            r#"
            UPDATE pages
            SET title = $1, slug = $2, live = $3, content = $4,
                first_published_at = COALESCE(first_published_at, CASE WHEN $3 THEN now() END),
                updated_at = now()
            WHERE id = $5
            RETURNING {}
            "#,
            PAGE_COLUMNS
        );
        let row = sqlx::query_as::<_, PageRow>(&sql)
            .bind(&page.title)
            .bind(&page.slug)
            .bind(page.live)
            .bind(&content)
            .bind(page.id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("page {}", page.id)))?;

        Ok(Page::try_from(row)?)
    }
}

#[async_trait]
impl SiteStore for PgStore {
    async fn default_site(&self) -> StoreResult<Option<Site>> {
        let sql = format!("SELECT {} FROM sites WHERE is_default LIMIT 1", SITE_COLUMNS);
        let row = sqlx::query_as::<_, SiteRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Site::try_from).transpose()?)
    }

    async fn first_site(&self) -> StoreResult<Option<Site>> {
        let sql = format!("SELECT {} FROM sites ORDER BY seq LIMIT 1", SITE_COLUMNS);
        let row = sqlx::query_as::<_, SiteRow>(&sql)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(Site::try_from).transpose()?)
    }

    async fn create_site(&self, site: NewSite) -> StoreResult<Site> {
        validate_site(&site.hostname, site.port)?;
        if self.get(site.root_page_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("root page {}", site.root_page_id)));
        }

        let mut tx = self.pool.begin().await?;
        if site.is_default {
            sqlx::query("UPDATE sites SET is_default = false, updated_at = now() WHERE is_default")
                .execute(&mut *tx)
                .await?;
        }

        let sql = format!(
            r#"
            INSERT INTO sites (id, hostname, port, root_page_id, is_default)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            SITE_COLUMNS
        );
        let row = sqlx::query_as::<_, SiteRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&site.hostname)
            .bind(i32::from(site.port))
            .bind(site.root_page_id)
            .bind(site.is_default)
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;

        Ok(Site::try_from(row)?)
    }

    async fn update_site(&self, site: &Site) -> StoreResult<Site> {
        validate_site(&site.hostname, site.port)?;
        if self.get(site.root_page_id).await?.is_none() {
            return Err(StoreError::NotFound(format!("root page {}", site.root_page_id)));
        }

        let mut tx = self.pool.begin().await?;
        if site.is_default {
            sqlx::query(
                "UPDATE sites SET is_default = false, updated_at = now() WHERE is_default AND id <> $1",
            )
            .bind(site.id)
            .execute(&mut *tx)
            .await?;
        }

        let sql = format!(
            r#"
            UPDATE sites
            SET hostname = $1, port = $2, root_page_id = $3, is_default = $4, updated_at = now()
            WHERE id = $5
            RETURNING {}
            "#,
            SITE_COLUMNS
        );
        let row = sqlx::query_as::<_, SiteRow>(&sql)
            .bind(&site.hostname)
            .bind(i32::from(site.port))
            .bind(site.root_page_id)
            .bind(site.is_default)
            .bind(site.id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("site {}", site.id)))?;
        tx.commit().await?;

        Ok(Site::try_from(row)?)
    }
}
