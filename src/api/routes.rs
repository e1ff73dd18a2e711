//! Route handlers of the reservation API.

use super::dto::{
    decode_json, ErrorResponse, ListQuery, ListResponse, ReleaseRequest, ReleaseResponse,
    ReserveRequest, ReserveResponse,
};
use crate::allocation::AllocationEngine;
use crate::error::IpamError;
use crate::store::{ReservationStore, StoreError};
use axum::body::Bytes;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use std::sync::Arc;

/// Build the router serving `/reserve-ip`, `/release-ip` and `/get-ips-in-subnet`.
pub fn build_router<S>(engine: Arc<AllocationEngine<S>>) -> Router
where
    S: ReservationStore + 'static,
{
    Router::new()
        .route("/reserve-ip", post(reserve_ip::<S>))
        .route("/release-ip", post(release_ip::<S>))
        .route("/get-ips-in-subnet", get(get_ips_in_subnet::<S>))
        .with_state(engine)
}

/// Engine error rendered as an HTTP response.
#[derive(Debug)]
pub struct ApiError(pub IpamError);

impl From<IpamError> for ApiError {
    fn from(e: IpamError) -> Self {
        ApiError(e)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            IpamError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            IpamError::NoAvailableAddress { .. } | IpamError::AlreadyReserved { .. } => {
                StatusCode::CONFLICT
            }
            IpamError::StoreFailure { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self.0);
        } else {
            log::warn!("{}", self.0);
        }
        let body = ErrorResponse {
            error: self.0.kind().to_string(),
            message: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Run a store bound engine call off the async workers.
async fn run_blocking<T, F>(block: String, f: F) -> Result<T, IpamError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, IpamError> + Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        let source = StoreError::Backend(e.to_string());
        IpamError::store("waiting for the store task", &block, None, None, source)
    })?
}

async fn reserve_ip<S: ReservationStore + 'static>(
    State(engine): State<Arc<AllocationEngine<S>>>,
    body: Bytes,
) -> Result<Json<ReserveResponse>, ApiError> {
    let request: ReserveRequest = decode_json(&body)?;
    let block = request.block()?;
    log::info!(
        "reserve-ip cidr={} tenant='{}' purpose='{}'",
        block,
        request.tenant_name,
        request.purpose
    );

    let address = run_blocking(block.to_string(), move || {
        engine.reserve(&block, &request.tenant_name, &request.purpose)
    })
    .await?;

    Ok(Json(ReserveResponse {
        ip_address: address.to_string(),
        reserved: true,
    }))
}

async fn release_ip<S: ReservationStore + 'static>(
    State(engine): State<Arc<AllocationEngine<S>>>,
    body: Bytes,
) -> Result<Json<ReleaseResponse>, ApiError> {
    let request: ReleaseRequest = decode_json(&body)?;
    let block = request.block()?;
    let address = request.address()?;
    log::info!(
        "release-ip cidr={} tenant='{}' ip={}",
        block,
        request.tenant_name,
        address
    );

    let success = run_blocking(block.to_string(), move || {
        engine.release(&block, &request.tenant_name, address)
    })
    .await?;

    Ok(Json(ReleaseResponse { success }))
}

async fn get_ips_in_subnet<S: ReservationStore + 'static>(
    State(engine): State<Arc<AllocationEngine<S>>>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> Result<Json<ListResponse>, ApiError> {
    let Query(query) =
        query.map_err(|rejection| IpamError::InvalidInput(rejection.body_text()))?;
    let subnet = match query.subnet.as_deref().map(str::trim) {
        Some(subnet) if !subnet.is_empty() => subnet.to_string(),
        _ => {
            return Err(IpamError::InvalidInput("subnet parameter is required".to_string()).into())
        }
    };
    log::debug!("get-ips-in-subnet subnet={subnet}");

    let ips = run_blocking(subnet.clone(), move || engine.list_addresses(&subnet)).await?;
    Ok(Json(ListResponse { ips }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::IpAddr;

    #[test]
    fn test_status_mapping() {
        let address: IpAddr = "10.0.0.1".parse().unwrap();
        let cases = vec![
            (IpamError::InvalidInput("x".to_string()), StatusCode::BAD_REQUEST),
            (
                IpamError::NoAvailableAddress {
                    block: "10.0.0.0/24".to_string(),
                    tenant: "acme".to_string(),
                },
                StatusCode::CONFLICT,
            ),
            (
                IpamError::AlreadyReserved {
                    block: "10.0.0.0/24".to_string(),
                    tenant: "acme".to_string(),
                    address,
                },
                StatusCode::CONFLICT,
            ),
            (
                IpamError::store(
                    "listing",
                    "10.0.0.0/24",
                    None,
                    None,
                    StoreError::Backend("gone".to_string()),
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError(err).status(), status);
        }
    }
}
