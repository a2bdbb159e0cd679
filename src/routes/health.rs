/**
 * Health Routes
 * Liveness and readiness probes for the load balancer and the deploy platform
 */
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};
use std::{fmt::Display, future::Future, path::Path, time::Duration};

use crate::cache::{Cache, CacheError};
use crate::state::AppState;

const HEALTH_CACHE_KEY: &str = "health_check";
const HEALTH_CACHE_VALUE: &str = "ok";
const READY_CACHE_KEY: &str = "readiness_check";
const READY_CACHE_VALUE: &str = "ready";
const CACHE_TTL: Duration = Duration::from_secs(10);

/// Health status of one dependency or of the whole process
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

impl From<bool> for HealthStatus {
    fn from(ok: bool) -> Self {
        if ok {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

/// Readiness of one dependency or of the whole process
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReadyStatus {
    Ready,
    NotReady,
}

impl From<bool> for ReadyStatus {
    fn from(ok: bool) -> Self {
        if ok {
            ReadyStatus::Ready
        } else {
            ReadyStatus::NotReady
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub database: HealthStatus,
    pub cache: HealthStatus,
    pub application: String,
}

/// Readiness checks
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessChecks {
    pub database: ReadyStatus,
    pub static_files: ReadyStatus,
    pub cache: ReadyStatus,
}

/// Readiness check response
#[derive(Debug, Serialize, Deserialize)]
pub struct ReadinessResponse {
    pub status: ReadyStatus,
    pub checks: ReadinessChecks,
    pub application: String,
}

// ============================================================================
// Probes
// ============================================================================

/// Run one probe under `limit`. Errors and timeouts are logged and count as failure.
async fn probe<F, E>(name: &str, limit: Duration, check: F) -> bool
where
    F: Future<Output = Result<bool, E>>,
    E: Display,
{
    match tokio::time::timeout(limit, check).await {
        Ok(Ok(passed)) => {
            if !passed {
                tracing::warn!(check = %name, "check did not pass");
            }
            passed
        }
        Ok(Err(e)) => {
            tracing::error!(check = %name, error = %e, "check failed");
            false
        }
        Err(_) => {
            tracing::error!(check = %name, timeout_ms = %limit.as_millis(), "check timed out");
            false
        }
    }
}

/// Write `value` under `key` and read it back.
async fn cache_round_trip(cache: &dyn Cache, key: &str, value: &str) -> Result<bool, CacheError> {
    cache.set(key, value, CACHE_TTL).await?;
    Ok(cache.get(key).await?.as_deref() == Some(value))
}

async fn static_root_exists(path: Option<&Path>) -> Result<bool, std::io::Error> {
    match path {
        Some(path) => match tokio::fs::metadata(path).await {
            Ok(metadata) => Ok(metadata.is_dir()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e),
        },
        None => Ok(false),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health/ - Database and cache liveness
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let limit = state.probe_timeout;

    let database = probe("database", limit, async {
        state.database.ping().await.map(|elapsed| {
            tracing::debug!(elapsed_ms = %elapsed.as_millis(), "database ping");
            true
        })
    })
    .await;

    let cache = probe(
        "cache",
        limit,
        cache_round_trip(state.cache.as_ref(), HEALTH_CACHE_KEY, HEALTH_CACHE_VALUE),
    )
    .await;

    let healthy = database && cache;
    let status = if healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = HealthResponse {
        status: healthy.into(),
        database: database.into(),
        cache: cache.into(),
        application: state.config.application_name.clone(),
    };

    (status, Json(response))
}

/// GET /ready/ - Database, static assets and cache readiness
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let limit = state.probe_timeout;

    let database = probe("database", limit, async {
        state.database.users_exist().await.map(|_| true)
    })
    .await;

    let static_files = probe(
        "static_files",
        limit,
        static_root_exists(state.config.static_root.as_deref()),
    )
    .await;

    let cache = probe(
        "cache",
        limit,
        cache_round_trip(state.cache.as_ref(), READY_CACHE_KEY, READY_CACHE_VALUE),
    )
    .await;

    let ready = database && static_files && cache;
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let response = ReadinessResponse {
        status: ready.into(),
        checks: ReadinessChecks {
            database: database.into(),
            static_files: static_files.into(),
            cache: cache.into(),
        },
        application: state.config.application_name.clone(),
    };

    (status, Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use crate::config::SiteConfig;
    use crate::db::DatabaseProbe;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use axum::routing::get;
    use axum::Router;
    use std::sync::Arc;
    use tower::ServiceExt;

    struct FakeDatabase;

    #[async_trait]
    impl DatabaseProbe for FakeDatabase {
        async fn ping(&self) -> Result<Duration, sqlx::Error> {
            Ok(Duration::from_millis(1))
        }

        async fn users_exist(&self) -> Result<bool, sqlx::Error> {
            Ok(false)
        }
    }

    struct HungDatabase;

    #[async_trait]
    impl DatabaseProbe for HungDatabase {
        async fn ping(&self) -> Result<Duration, sqlx::Error> {
            std::future::pending().await
        }

        async fn users_exist(&self) -> Result<bool, sqlx::Error> {
            std::future::pending().await
        }
    }

    struct DownCache;

    #[async_trait]
    impl Cache for DownCache {
        async fn set(&self, _: &str, _: &str, _: Duration) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }

        async fn get(&self, _: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("connection refused".to_string()))
        }
    }

    fn state(static_root: Option<&Path>) -> AppState {
        let config = SiteConfig {
            static_root: static_root.map(Path::to_path_buf),
            application_name: "benniewilliams-test".to_string(),
            ..Default::default()
        };
        let mut state = AppState::in_memory(config);
        state.database = Arc::new(FakeDatabase);
        state
    }

    fn test_router(state: AppState) -> Router {
        Router::new()
            .route("/health/", get(health_check))
            .route("/ready/", get(readiness_check))
            .with_state(state)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(app: Router, uri: &str) -> (StatusCode, T) {
        let req = Request::get(uri).body(Body::empty()).unwrap();
        let res = app.oneshot(req).await.unwrap();
        let status = res.status();
        let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        let value: T = serde_json::from_slice(&body).unwrap();
        (status, value)
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(serde_json::to_string(&HealthStatus::Healthy).unwrap(), "\"healthy\"");
        assert_eq!(serde_json::to_string(&ReadyStatus::NotReady).unwrap(), "\"not_ready\"");
    }

    #[tokio::test]
    async fn test_health_all_healthy() {
        let (status, body) = get_json::<HealthResponse>(test_router(state(None)), "/health/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, HealthStatus::Healthy);
        assert_eq!(body.database, HealthStatus::Healthy);
        assert_eq!(body.cache, HealthStatus::Healthy);
        assert_eq!(body.application, "benniewilliams-test");
    }

    #[tokio::test]
    async fn test_health_cache_down_keeps_database_healthy() {
        let mut state = state(None);
        state.cache = Arc::new(DownCache);
        let (status, body) = get_json::<HealthResponse>(test_router(state), "/health/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, HealthStatus::Unhealthy);
        assert_eq!(body.database, HealthStatus::Healthy);
        assert_eq!(body.cache, HealthStatus::Unhealthy);
    }

    #[tokio::test]
    async fn test_health_without_database() {
        let state = AppState::in_memory(SiteConfig::default());
        let (status, body) = get_json::<HealthResponse>(test_router(state), "/health/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.database, HealthStatus::Unhealthy);
        assert_eq!(body.cache, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_hung_database_times_out() {
        let mut state = state(None).with_probe_timeout(Duration::from_millis(50));
        state.database = Arc::new(HungDatabase);
        let (status, body) = get_json::<HealthResponse>(test_router(state), "/health/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.database, HealthStatus::Unhealthy);
        assert_eq!(body.cache, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn test_ready_all_ready() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) =
            get_json::<ReadinessResponse>(test_router(state(Some(dir.path()))), "/ready/").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, ReadyStatus::Ready);
        assert_eq!(body.checks.database, ReadyStatus::Ready);
        assert_eq!(body.checks.static_files, ReadyStatus::Ready);
        assert_eq!(body.checks.cache, ReadyStatus::Ready);
    }

    #[tokio::test]
    async fn test_ready_missing_static_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("staticfiles");
        let (status, body) =
            get_json::<ReadinessResponse>(test_router(state(Some(&missing))), "/ready/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, ReadyStatus::NotReady);
        assert_eq!(body.checks.static_files, ReadyStatus::NotReady);
        assert_eq!(body.checks.database, ReadyStatus::Ready);
        assert_eq!(body.checks.cache, ReadyStatus::Ready);
    }

    #[tokio::test]
    async fn test_static_root_missing_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("staticfiles");
        assert!(!static_root_exists(Some(missing.as_path())).await.unwrap());
        assert!(static_root_exists(Some(dir.path())).await.unwrap());

        let file = dir.path().join("collected.txt");
        std::fs::write(&file, "x").unwrap();
        assert!(!static_root_exists(Some(file.as_path())).await.unwrap());
    }

    #[tokio::test]
    async fn test_ready_unset_static_root() {
        let (status, body) = get_json::<ReadinessResponse>(test_router(state(None)), "/ready/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.checks.static_files, ReadyStatus::NotReady);
    }

    #[tokio::test]
    async fn test_ready_writes_cache_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = Arc::new(MemoryCache::new());
        let mut state = state(Some(dir.path()));
        state.cache = cache.clone();
        get_json::<ReadinessResponse>(test_router(state), "/ready/").await;
        assert_eq!(cache.get(READY_CACHE_KEY).await.unwrap().as_deref(), Some("ready"));
    }
}
