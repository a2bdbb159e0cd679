use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("unknown log level '{}'", other)),
        }
    }
}

/// How the subscriber is assembled for a process.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub production: bool,
    pub level: LogLevel,
    /// Daily-rolling `app.log` and `error.log` are written here.
    pub directory: PathBuf,
    /// Administrative commands print their own status lines, so they keep the
    /// console quiet and only log to files.
    pub console: bool,
}

impl LoggingConfig {
    pub fn from_env() -> Self {
        let production = std::env::var("ENVIRONMENT").is_ok_and(|e| e == "production");
        let level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(if production { LogLevel::Info } else { LogLevel::Debug });

        Self {
            production,
            level,
            directory: std::env::var("LOG_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("logs")),
            console: true,
        }
    }

    pub fn for_command() -> Self {
        Self {
            console: false,
            ..Self::from_env()
        }
    }

    /// Default directive when `RUST_LOG` is not set.
    pub fn filter_directive(&self) -> String {
        format!(
            "benniewilliams_site={},tower_http={},sqlx=warn",
            self.level,
            if self.production { "info" } else { "debug" }
        )
    }
}
