//! Overwrites the about page's profile statement.
//!
//! Usage: update-profile [1|2]  (defaults to the latest revision)

use benniewilliams_site::seed::profile::{update_profile, ProfileRevision};
use benniewilliams_site::{logging, seed};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _log_guards = logging::init(&logging::LoggingConfig::for_command());

    let revision = match std::env::args().nth(1) {
        Some(arg) => match arg.parse::<ProfileRevision>() {
            Ok(revision) => revision,
            Err(e) => {
                eprintln!("{}", e);
                eprintln!("Usage: update-profile [1|2]");
                return;
            }
        },
        None => ProfileRevision::default(),
    };

    seed::run_command("update-profile", |store| async move {
        update_profile(&store, revision).await
    })
    .await;
}
