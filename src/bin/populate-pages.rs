//! Seeds the about and services pages under the home page.

use benniewilliams_site::{logging, seed};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _log_guards = logging::init(&logging::LoggingConfig::for_command());

    seed::run_command("populate-pages", |store| async move {
        seed::pages::populate_pages(&store).await
    })
    .await;
}
