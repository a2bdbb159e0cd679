use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use crate::content::{Page, PageContent, PageKind};
use crate::routes::pages::{live_children_newest_first, path_from};
use crate::state::AppState;
use crate::store::{StoreError, ROOT_PAGE_ID};

const FEED_LIMIT: usize = 50;

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn rfc822(dt: &DateTime<Utc>) -> String {
    dt.format("%a, %d %b %Y %H:%M:%S +0000").to_string()
}

struct FeedItem {
    title: String,
    url: String,
    description: String,
    categories: Vec<String>,
    published: Option<DateTime<Utc>>,
}

/// Live posts of the first blog index, newest first.
async fn feed_items(state: &AppState, base_url: &str) -> Result<(String, Vec<FeedItem>), StoreError> {
    let site_root = match state.sites.default_site().await? {
        Some(site) => site.root_page_id,
        None => ROOT_PAGE_ID,
    };

    let Some(index) = state.pages.first_of_kind(PageKind::BlogIndex).await? else {
        return Ok((format!("{}/", base_url), Vec::new()));
    };
    let index_url = format!("{}{}", base_url, path_from(state.pages.as_ref(), &index, site_root).await?);

    let posts: Vec<Page> = live_children_newest_first(state.pages.as_ref(), index.id)
        .await?
        .into_iter()
        .filter(|p| p.kind() == PageKind::Blog)
        .take(FEED_LIMIT)
        .collect();

    let mut items = Vec::with_capacity(posts.len());
    for post in posts {
        let url = format!("{}/{}/", index_url.trim_end_matches('/'), post.slug);
        let (description, categories) = match &post.content {
            PageContent::Blog(blog) => (blog.intro.clone(), blog.tag_list()),
            _ => (String::new(), Vec::new()),
        };
        items.push(FeedItem {
            title: post.title,
            url,
            description,
            categories,
            published: post.first_published_at,
        });
    }
    Ok((index_url, items))
}

pub async fn rss_feed(State(state): State<AppState>) -> Response {
    let config = &state.config;
    let base_url = config.site_url.trim_end_matches('/').to_string();

    let (blog_url, rows) = match feed_items(&state, &base_url).await {
        Ok(feed) => feed,
        Err(e) => {
            tracing::error!("Failed to build RSS feed: {}", e);
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                [(header::CONTENT_TYPE, "text/plain")],
                "Service unavailable",
            )
                .into_response();
        }
    };

    let mut items = String::new();
    for item in &rows {
        let categories: String = item
            .categories
            .iter()
            .map(|c| format!("      <category>{}</category>\n", escape_xml(c)))
            .collect();
        items.push_str(&format!(
            "    <item>\n\
                   <title>{}</title>\n\
                   <link>{}</link>\n\
                   <description>{}</description>\n\
                   <pubDate>{}</pubDate>\n\
                   <guid isPermaLink=\"true\">{}</guid>\n\
                 {}    </item>\n",
            escape_xml(&item.title),
            escape_xml(&item.url),
            escape_xml(&item.description),
            item.published.as_ref().map(rfc822).unwrap_or_default(),
            escape_xml(&item.url),
            categories,
        ));
    }

    let feed_url = format!("{}/rss.xml", base_url);

    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <title>{}</title>
    <link>{}</link>
    <description>{}</description>
    <language>en-us</language>
    <atom:link href="{}" rel="self" type="application/rss+xml"/>
    <lastBuildDate>{}</lastBuildDate>
{}  </channel>
</rss>"#,
        escape_xml(&config.site_title),
        escape_xml(&blog_url),
        escape_xml(&config.site_description),
        escape_xml(&feed_url),
        rows.iter()
            .find_map(|item| item.published.as_ref())
            .map(rfc822)
            .unwrap_or_default(),
        items,
    );

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/rss+xml; charset=utf-8"),
            (
                header::CACHE_CONTROL,
                "public, max-age=3600, stale-while-revalidate=600",
            ),
        ],
        xml,
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::seed::{content::populate_content, site::setup_site};
    use crate::store::MemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    async fn fetch(state: AppState) -> (StatusCode, String) {
        let app = Router::new().route("/rss.xml", get(rss_feed)).with_state(state);
        let res = app
            .oneshot(Request::get("/rss.xml").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[test]
    fn test_escape_xml() {
        assert_eq!(escape_xml("a & b"), "a &amp; b");
        assert_eq!(escape_xml("<title>"), "&lt;title&gt;");
        assert_eq!(escape_xml("\"quote\""), "&quot;quote&quot;");
    }

    #[test]
    fn test_rfc822_format() {
        use chrono::TimeZone;
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 12, 0, 0).unwrap();
        assert_eq!(rfc822(&dt), "Mon, 15 Jan 2024 12:00:00 +0000");
    }

    #[tokio::test]
    async fn test_empty_feed_without_blog() {
        let (status, xml) = fetch(AppState::in_memory(SiteConfig::default())).await;
        assert_eq!(status, StatusCode::OK);
        assert!(xml.contains("<rss version=\"2.0\""));
        assert!(!xml.contains("<item>"));
    }

    #[tokio::test]
    async fn test_feed_lists_seeded_posts() {
        let store = Arc::new(MemoryStore::new());
        populate_content(store.as_ref()).await.unwrap();
        setup_site(store.as_ref(), store.as_ref()).await.unwrap();

        let mut state = AppState::in_memory(SiteConfig::default());
        state.pages = store.clone();
        state.sites = store;

        let (status, xml) = fetch(state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(xml.matches("<item>").count(), 3);
        assert!(xml.contains("https://benniewilliams.com/blog/future-of-enterprise-ai/"));
        assert!(xml.contains("The Future of Enterprise AI: What Leaders Need to Know"));
        assert!(xml.contains("<category>AI Strategy</category>"));
        assert!(xml.contains("<category>Prompt Engineering</category>"));
        assert_eq!(xml.matches("<category>").count(), 9);
    }
}
