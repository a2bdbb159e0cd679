//! Deploys the site to Coolify.

use benniewilliams_site::{deploy, logging};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let _log_guards = logging::init(&logging::LoggingConfig::for_command());

    if deploy::run_command().await {
        println!("\nDeployment completed successfully!");
    } else {
        println!("\nDeployment failed. Please check the logs and try manually.");
    }
}
