//! Process configuration read from the environment (and `.env`, via dotenvy).

use std::path::PathBuf;

use crate::cache::CacheBackend;

pub const DEFAULT_APPLICATION_NAME: &str = "benniewilliams-site";

#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub environment: String,
    pub host: String,
    pub port: u16,
    /// Set when `DATABASE_URL` is present; otherwise the in-memory store is used.
    pub database_url: Option<String>,
    /// Collected static assets. Readiness fails when unset or missing.
    pub static_root: Option<PathBuf>,
    pub application_name: String,
    /// `None` picks the database cache when a database is configured.
    pub cache_backend: Option<CacheBackend>,
    pub site_url: String,
    pub site_title: String,
    pub site_description: String,
}

impl SiteConfig {
    pub fn from_env() -> Self {
        let static_root = match std::env::var("STATIC_ROOT") {
            Ok(s) if s.trim().is_empty() => None,
            Ok(s) => Some(PathBuf::from(s)),
            Err(_) => Some(PathBuf::from("staticfiles")),
        };

        let cache_backend = std::env::var("CACHE_BACKEND").ok().and_then(|s| {
            s.parse()
                .map_err(|e| tracing::warn!("Ignoring CACHE_BACKEND: {}", e))
                .ok()
        });

        Self {
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(8000),
            database_url: std::env::var("DATABASE_URL").ok().filter(|s| !s.is_empty()),
            static_root,
            application_name: std::env::var("APPLICATION_NAME")
                .unwrap_or_else(|_| DEFAULT_APPLICATION_NAME.to_string()),
            cache_backend,
            site_url: std::env::var("SITE_URL")
                .unwrap_or_else(|_| "https://benniewilliams.com".to_string()),
            site_title: std::env::var("SITE_TITLE")
                .unwrap_or_else(|_| "Bennie Williams Consulting".to_string()),
            site_description: std::env::var("SITE_DESCRIPTION").unwrap_or_else(|_| {
                "Practical insights on technology strategy, AI implementation, and digital transformation"
                    .to_string()
            }),
        }
    }

    pub fn resolved_cache_backend(&self) -> CacheBackend {
        match (self.cache_backend, &self.database_url) {
            (Some(backend), _) => backend,
            (None, Some(_)) => CacheBackend::Database,
            (None, None) => CacheBackend::Memory,
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            host: "127.0.0.1".to_string(),
            port: 8000,
            database_url: None,
            static_root: None,
            application_name: DEFAULT_APPLICATION_NAME.to_string(),
            cache_backend: None,
            site_url: "https://benniewilliams.com".to_string(),
            site_title: "Bennie Williams Consulting".to_string(),
            site_description: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_env_has_usable_defaults() {
        let config = SiteConfig::from_env();
        assert!(config.port > 0);
        assert!(!config.application_name.is_empty());
        assert!(!config.host.is_empty());
    }

    #[test]
    fn test_cache_backend_follows_database() {
        let mut config = SiteConfig::default();
        assert_eq!(config.resolved_cache_backend(), CacheBackend::Memory);

        config.database_url = Some("postgresql://localhost/benniewilliams".to_string());
        assert_eq!(config.resolved_cache_backend(), CacheBackend::Database);

        config.cache_backend = Some(CacheBackend::Memory);
        assert_eq!(config.resolved_cache_backend(), CacheBackend::Memory);
    }
}
