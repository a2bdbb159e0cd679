//! Points the default site record at the home page.

use benniewilliams_site::{logging, seed};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _log_guards = logging::init(&logging::LoggingConfig::for_command());

    seed::run_command("setup-site", |store| async move {
        seed::site::setup_site(&store, &store).await
    })
    .await;
}
