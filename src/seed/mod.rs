//! Idempotent seed procedures for the content tree and the site binding.
//!
//! Every procedure looks pages up by slug under their parent and only creates
//! what is missing; existing rows are left untouched. The profile updates are
//! the exception and always overwrite.

pub mod content;
pub mod data;
pub mod pages;
pub mod profile;
pub mod site;

use std::future::Future;

use thiserror::Error;

use crate::content::{NewPage, Page, PageKind};
use crate::db;
use crate::store::{PageStore, PgStore, StoreError};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("slug '{slug}' belongs to a {found}, expected a {expected}")]
    KindMismatch {
        slug: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("invalid date literal '{value}': {source}")]
    InvalidDate {
        value: String,
        source: chrono::ParseError,
    },

    #[error("database unavailable: {0}")]
    Database(#[from] sqlx::Error),
}

// ============================================================================
// Report
// ============================================================================

/// Status lines and counters collected while a procedure runs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedReport {
    pub lines: Vec<String>,
    pub created: usize,
    pub existing: usize,
    pub updated: usize,
    pub failed: usize,
}

impl SeedReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn created(&mut self, page: &Page) {
        self.created += 1;
        self.push(format!("Created {}: {}", page.kind().label(), page.title));
    }

    pub fn existing(&mut self, page: &Page) {
        self.existing += 1;
        self.push(format!("{} already exists: {}", page.kind().label(), page.title));
    }

    pub fn updated(&mut self, line: String) {
        self.updated += 1;
        self.push(line);
    }

    pub fn failed(&mut self, step: &str, error: &SeedError) {
        self.failed += 1;
        tracing::error!(step = %step, error = %error, "seed step failed");
        self.lines.push(format!("Error seeding {}: {}", step, error));
    }

    /// Informational line that changes nothing.
    pub fn note(&mut self, line: impl Into<String>) {
        self.push(line.into());
    }

    fn push(&mut self, line: String) {
        tracing::info!("{}", line);
        self.lines.push(line);
    }

    pub fn summary(&self) -> String {
        format!(
            "{} created, {} already present, {} updated, {} failed",
            self.created, self.existing, self.updated, self.failed
        )
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Return the child of `parent` with the page's slug, creating it if absent.
///
/// An existing child is never modified. A child of a different kind under the
/// same slug is reported as [`SeedError::KindMismatch`].
pub async fn ensure_child(
    store: &dyn PageStore,
    parent: &Page,
    page: NewPage,
    report: &mut SeedReport,
) -> Result<Page, SeedError> {
    let expected = page.content.kind();

    if let Some(existing) = store.find_by_slug(parent.id, &page.slug).await? {
        let found = existing.kind();
        if found != expected {
            return Err(SeedError::KindMismatch {
                slug: existing.slug,
                expected: expected.label(),
                found: found.label(),
            });
        }
        report.existing(&existing);
        return Ok(existing);
    }

    let created = store.create_child(parent.id, page).await?;
    report.created(&created);
    Ok(created)
}

/// The site's home page: the oldest page of kind `home`.
pub async fn resolve_home(store: &dyn PageStore) -> Result<Option<Page>, SeedError> {
    Ok(store.first_of_kind(PageKind::Home).await?)
}

pub(crate) fn parse_date(value: &str) -> Result<chrono::NaiveDate, SeedError> {
    chrono::NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|source| SeedError::InvalidDate {
        value: value.to_string(),
        source,
    })
}

/// Connect with `DATABASE_URL` and make sure the schema exists.
pub async fn connect_store() -> Result<PgStore, SeedError> {
    let pool = db::init_pool(None).await?;
    db::run_migrations(&pool).await?;
    Ok(PgStore::new(pool))
}

/// Run one administrative command against the database.
///
/// Every error is caught here, logged and printed; the process still exits 0.
pub async fn run_command<F, Fut>(name: &str, command: F)
where
    F: FnOnce(PgStore) -> Fut,
    Fut: Future<Output = Result<SeedReport, SeedError>>,
{
    tracing::info!(command = %name, "starting");

    let result = match connect_store().await {
        Ok(store) => command(store).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(report) => {
            for line in &report.lines {
                println!("{}", line);
            }
            println!("\n{} complete: {}", name, report.summary());
            tracing::info!(command = %name, summary = %report.summary(), "finished");
        }
        Err(e) => {
            tracing::error!(command = %name, error = %e, "command failed");
            println!("Error {}: {}", name, e);
        }
    }
}
