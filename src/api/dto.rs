//! Request and response bodies of the HTTP API.

use crate::error::IpamError;
use crate::models::{parse_addr, Block};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

/// Body of `POST /reserve-ip`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReserveRequest {
    pub cidr: String,
    pub tenant_name: String,
    pub purpose: String,
}

impl ReserveRequest {
    pub fn block(&self) -> Result<Block, IpamError> {
        Ok(Block::new(&self.cidr)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReserveResponse {
    pub ip_address: String,
    pub reserved: bool,
}

/// Body of `POST /release-ip`.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRequest {
    pub cidr: String,
    pub tenant_name: String,
    pub ip_address: String,
}

impl ReleaseRequest {
    pub fn block(&self) -> Result<Block, IpamError> {
        Ok(Block::new(&self.cidr)?)
    }

    pub fn address(&self) -> Result<IpAddr, IpamError> {
        Ok(parse_addr(&self.ip_address)?)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ReleaseResponse {
    pub success: bool,
}

/// Query string of `GET /get-ips-in-subnet`.
#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub subnet: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    pub ips: Vec<String>,
}

/// Payload of every non-2xx response.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Error class, see [`IpamError::kind`].
    pub error: String,
    pub message: String,
}

/// Decode a JSON body, naming the offending field on failure.
pub fn decode_json<T: DeserializeOwned>(body: &[u8]) -> Result<T, IpamError> {
    let mut deserializer = serde_json::Deserializer::from_slice(body);
    serde_path_to_error::deserialize(&mut deserializer).map_err(|e| {
        let path = e.path().to_string();
        IpamError::InvalidInput(format!("invalid request payload at '{path}': {}", e.inner()))
    })
}
