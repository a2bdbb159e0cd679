//! Shared handles for the HTTP handlers.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;

use crate::cache::{Cache, CacheBackend, DbCache, MemoryCache};
use crate::config::SiteConfig;
use crate::db::{DatabaseProbe, Unconfigured};
use crate::store::{MemoryStore, PageStore, PgStore, SiteStore};

/// Upper bound for a single health probe.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone)]
pub struct AppState {
    pub pages: Arc<dyn PageStore>,
    pub sites: Arc<dyn SiteStore>,
    pub database: Arc<dyn DatabaseProbe>,
    pub cache: Arc<dyn Cache>,
    pub config: Arc<SiteConfig>,
    pub probe_timeout: Duration,
}

impl AppState {
    /// Everything in process; the database probe always fails.
    pub fn in_memory(config: SiteConfig) -> Self {
        if config.resolved_cache_backend() == CacheBackend::Database {
            tracing::warn!("Database cache requested without DATABASE_URL, using memory cache");
        }
        let store = Arc::new(MemoryStore::new());
        Self {
            pages: store.clone(),
            sites: store,
            database: Arc::new(Unconfigured),
            cache: Arc::new(MemoryCache::new()),
            config: Arc::new(config),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_database(config: SiteConfig, pool: PgPool) -> Self {
        let cache: Arc<dyn Cache> = match config.resolved_cache_backend() {
            CacheBackend::Database => Arc::new(DbCache::new(pool.clone())),
            CacheBackend::Memory => Arc::new(MemoryCache::new()),
        };
        let store = Arc::new(PgStore::new(pool.clone()));
        Self {
            pages: store.clone(),
            sites: store,
            database: Arc::new(pool),
            cache,
            config: Arc::new(config),
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }
}
