/**
 * Page Routes
 * Serves the content tree of the default site by URL path
 */
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::content::{Page, PageKind};
use crate::state::AppState;
use crate::store::{PageStore, StoreError};

// ============================================================================
// Response Types
// ============================================================================

/// Entry in a blog index listing
#[derive(Debug, Serialize, Deserialize)]
pub struct PageSummary {
    pub id: Uuid,
    pub title: String,
    pub slug: String,
    pub kind: PageKind,
    pub url_path: String,
    pub first_published_at: Option<DateTime<Utc>>,
}

/// Full page response
#[derive(Debug, Serialize, Deserialize)]
pub struct PageResponse {
    pub page: Page,
    pub url_path: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<PageSummary>,
}

/// Error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub type ApiError = (StatusCode, Json<ErrorResponse>);

fn not_found(path: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: "Page not found".to_string(),
            message: Some(format!("No live page at {}", path)),
        }),
    )
}

fn no_site() -> ApiError {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "No site configured".to_string(),
            message: Some("Run setup-site to bind the home page".to_string()),
        }),
    )
}

fn store_error(e: StoreError) -> ApiError {
    tracing::error!("Page lookup failed: {}", e);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
            message: None,
        }),
    )
}

// ============================================================================
// Resolution
// ============================================================================

/// Root page of the default site.
pub(crate) async fn site_root(state: &AppState) -> Result<Page, ApiError> {
    let site = state
        .sites
        .default_site()
        .await
        .map_err(store_error)?
        .ok_or_else(no_site)?;

    state
        .pages
        .get(site.root_page_id)
        .await
        .map_err(store_error)?
        .ok_or_else(no_site)
}

fn url_path(segments: &[&str]) -> String {
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}/", segments.join("/"))
    }
}

/// Path of `page` relative to the page with id `site_root`, walking up the parents.
pub(crate) async fn path_from(
    store: &dyn PageStore,
    page: &Page,
    site_root: Uuid,
) -> Result<String, StoreError> {
    let mut segments = Vec::new();
    let mut current = page.clone();
    while current.id != site_root {
        let Some(parent_id) = current.parent_id else {
            break;
        };
        segments.push(current.slug.clone());
        match store.get(parent_id).await? {
            Some(parent) => current = parent,
            None => break,
        }
    }
    segments.reverse();
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    Ok(url_path(&segments))
}

/// Live children, newest first. Unpublished dates sort last.
pub(crate) async fn live_children_newest_first(
    store: &dyn PageStore,
    parent_id: Uuid,
) -> Result<Vec<Page>, StoreError> {
    let mut children: Vec<Page> = store
        .children(parent_id)
        .await?
        .into_iter()
        .filter(|p| p.live)
        .collect();
    children.sort_by(|a, b| b.first_published_at.cmp(&a.first_published_at));
    Ok(children)
}

async fn render(state: &AppState, page: Page, segments: &[&str]) -> Result<PageResponse, ApiError> {
    let path = url_path(segments);

    let children = if page.kind() == PageKind::BlogIndex {
        live_children_newest_first(state.pages.as_ref(), page.id)
            .await
            .map_err(store_error)?
            .into_iter()
            .map(|child| {
                let mut child_segments = segments.to_vec();
                child_segments.push(&child.slug);
                PageSummary {
                    url_path: url_path(&child_segments),
                    id: child.id,
                    title: child.title.clone(),
                    slug: child.slug.clone(),
                    kind: child.kind(),
                    first_published_at: child.first_published_at,
                }
            })
            .collect()
    } else {
        Vec::new()
    };

    Ok(PageResponse {
        page,
        url_path: path,
        children,
    })
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/pages/ - Root page of the default site
pub async fn get_site_root(State(state): State<AppState>) -> Result<Json<PageResponse>, ApiError> {
    let root = site_root(&state).await?;
    if !root.live {
        return Err(not_found("/"));
    }
    Ok(Json(render(&state, root, &[]).await?))
}

/// GET /api/pages/{*path} - Page at a slug path below the site root
pub async fn get_page(
    State(state): State<AppState>,
    Path(path): Path<String>,
) -> Result<Json<PageResponse>, ApiError> {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut page = site_root(&state).await?;
    if !page.live {
        return Err(not_found(&url_path(&segments)));
    }

    for segment in &segments {
        page = match state.pages.find_by_slug(page.id, segment).await {
            Ok(Some(child)) if child.live => child,
            Ok(_) => return Err(not_found(&url_path(&segments))),
            Err(e) => return Err(store_error(e)),
        };
    }

    Ok(Json(render(&state, page, &segments).await?))
}
