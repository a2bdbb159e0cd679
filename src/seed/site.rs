//! Binds the default site record to the home page.

use super::{pages::NO_HOME_MESSAGE, resolve_home, SeedError, SeedReport};
use crate::store::{NewSite, PageStore, SiteStore};

pub const DEFAULT_HOSTNAME: &str = "localhost";
pub const DEFAULT_PORT: u16 = 8000;

pub async fn setup_site(
    pages: &dyn PageStore,
    sites: &dyn SiteStore,
) -> Result<SeedReport, SeedError> {
    let mut report = SeedReport::new();

    let Some(home) = resolve_home(pages).await? else {
        report.note(NO_HOME_MESSAGE);
        return Ok(report);
    };

    match sites.first_site().await? {
        None => {
            let site = sites
                .create_site(NewSite {
                    hostname: DEFAULT_HOSTNAME.to_string(),
                    port: DEFAULT_PORT,
                    root_page_id: home.id,
                    is_default: true,
                })
                .await?;
            report.created += 1;
            report.note(format!("Created new site: {}:{}", site.hostname, site.port));
        }
        Some(mut site) => {
            site.root_page_id = home.id;
            site.hostname = DEFAULT_HOSTNAME.to_string();
            site.port = DEFAULT_PORT;
            site.is_default = true;
            let site = sites.update_site(&site).await?;
            report.updated(format!(
                "Updated site: {}:{} -> {}",
                site.hostname, site.port, home.title
            ));
        }
    }

    Ok(report)
}
