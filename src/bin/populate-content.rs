//! Seeds the home page, blog, contact page and project pages.

use benniewilliams_site::{logging, seed};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _log_guards = logging::init(&logging::LoggingConfig::for_command());

    seed::run_command("populate-content", |store| async move {
        seed::content::populate_content(&store).await
    })
    .await;
}
