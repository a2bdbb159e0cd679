//! Database Models - rows as they come back from sqlx, and their domain conversions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::content::Page;
use crate::store::Site;

/// Columns selected for every page query.
pub const PAGE_COLUMNS: &str = "id, parent_id, slug, title, live, first_published_at, content";

pub const SITE_COLUMNS: &str = "id, hostname, port, root_page_id, is_default";

/// Page row. `content` carries the kind tag and the kind-specific fields.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct PageRow {
    pub id: Uuid,
    pub parent_id: Option<Uuid>,
    pub slug: String,
    pub title: String,
    pub live: bool,
    pub first_published_at: Option<DateTime<Utc>>,
    pub content: serde_json::Value,
}

impl TryFrom<PageRow> for Page {
    type Error = serde_json::Error;

    fn try_from(row: PageRow) -> Result<Self, Self::Error> {
        Ok(Page {
            id: row.id,
            parent_id: row.parent_id,
            slug: row.slug,
            title: row.title,
            live: row.live,
            first_published_at: row.first_published_at,
            content: serde_json::from_value(row.content)?,
        })
    }
}

/// Site row
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SiteRow {
    pub id: Uuid,
    pub hostname: String,
    pub port: i32,
    pub root_page_id: Uuid,
    pub is_default: bool,
}

impl TryFrom<SiteRow> for Site {
    type Error = sqlx::Error;

    fn try_from(row: SiteRow) -> Result<Self, Self::Error> {
        let port = u16::try_from(row.port)
            .map_err(|_| sqlx::Error::Decode(format!("invalid site port {}", row.port).into()))?;
        Ok(Site {
            id: row.id,
            hostname: row.hostname,
            port,
            root_page_id: row.root_page_id,
            is_default: row.is_default,
        })
    }
}
