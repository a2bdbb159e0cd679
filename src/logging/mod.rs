/*!
 * Logging Module
 * Subscriber setup shared by the server and the administrative commands
 */
pub mod config;
pub mod middleware;

pub use config::{LogLevel, LoggingConfig};

use std::io;
use tracing_appender::{non_blocking, non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize the logging system.
///
/// The returned guards flush the background writers when dropped and must be
/// held until the process exits.
pub fn init(config: &LoggingConfig) -> Vec<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(&config.directory) {
        eprintln!("Cannot create log directory {:?}: {}", config.directory, e);
    }

    // File appender for all logs
    let (file_writer, file_guard) = non_blocking(rolling::daily(&config.directory, "app.log"));

    // File appender for errors only
    let (error_writer, error_guard) = non_blocking(rolling::daily(&config.directory, "error.log"));

    let (console_writer, console_guard) = non_blocking(io::stdout());

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directive()));

    let subscriber = tracing_subscriber::registry().with(env_filter);

    let result = if config.production {
        // JSON format for production
        let file_layer = fmt::layer()
            .json()
            .with_writer(file_writer)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = config.console.then(|| {
            fmt::layer()
                .json()
                .with_writer(console_writer)
                .with_target(false)
        });

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .try_init()
    } else {
        // Pretty format for development
        let file_layer = fmt::layer()
            .with_writer(file_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false);

        let error_layer = fmt::layer()
            .json()
            .with_writer(error_writer)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_filter(tracing_subscriber::filter::LevelFilter::ERROR);

        let console_layer = config.console.then(|| {
            fmt::layer()
                .with_writer(console_writer)
                .with_target(true)
                .pretty()
        });

        subscriber
            .with(file_layer)
            .with(error_layer)
            .with(console_layer)
            .try_init()
    };

    if let Err(e) = result {
        eprintln!("Logging already initialized: {}", e);
    }

    tracing::info!(
        production = config.production,
        level = %config.level,
        "Logging initialized"
    );

    vec![file_guard, error_guard, console_guard]
}
