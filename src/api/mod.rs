//! HTTP boundary of the reservation service.
//!
//! - [`dto`] - request/response bodies
//! - [`build_router`] - axum handlers mapping requests onto the engine

pub mod dto;
mod routes;

pub use routes::{build_router, ApiError};

use crate::allocation::AllocationEngine;
use crate::store::ReservationStore;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Serve the API on `listener` until Ctrl-C.
pub async fn serve<S>(listener: TcpListener, engine: Arc<AllocationEngine<S>>) -> std::io::Result<()>
where
    S: ReservationStore + 'static,
{
    let router = build_router(engine);
    log::info!("Server running on {}", listener.local_addr()?);

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Shutting down reservation API server");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {e}");
        // Without a signal handler, keep serving.
        std::future::pending::<()>().await;
    }
}
