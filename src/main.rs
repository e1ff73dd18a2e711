use ipam_reservation::allocation::AllocationEngine;
use ipam_reservation::api;
use ipam_reservation::config::Config;
use ipam_reservation::logging::init_logging;
use ipam_reservation::store::SqliteStore;
use std::error::Error;
use std::sync::Arc;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let config = Config::from_env()?;
    init_logging(&config.log_config)?;
    log::info!("#Start main() {config:?}");

    let store = SqliteStore::open(&config.database, config.busy_timeout)?;
    let engine = Arc::new(AllocationEngine::new(store));

    let listener = TcpListener::bind(config.listen_addr()).await?;
    api::serve(listener, engine).await?;

    Ok(())
}
