//! Site server - binary entry point
//! Delegates to the library for all app logic.

#[tokio::main]
async fn main() -> std::io::Result<()> {
    benniewilliams_site::run().await
}
