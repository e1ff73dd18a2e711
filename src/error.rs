//! Errors surfaced by the allocation engine.

use crate::models::BlockError;
use crate::store::StoreError;
use std::net::IpAddr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum IpamError {
    /// Malformed block descriptor, address or request field.
    #[error("invalid input: {0}")]
    InvalidInput(String),
    /// Every candidate address of the block is taken.
    #[error("no available IP in block {block} for tenant '{tenant}'")]
    NoAvailableAddress { block: String, tenant: String },
    /// The chosen address is held already (re-check or store constraint).
    #[error("IP {address} already reserved in block {block} for tenant '{tenant}'")]
    AlreadyReserved {
        block: String,
        tenant: String,
        address: IpAddr,
    },
    #[error("store failure while {operation} in block {block}{}: {source}", scope(.tenant, .address))]
    StoreFailure {
        operation: &'static str,
        block: String,
        tenant: Option<String>,
        address: Option<IpAddr>,
        #[source]
        source: StoreError,
    },
}

impl IpamError {
    /// Short machine readable name of the error class.
    pub fn kind(&self) -> &'static str {
        match self {
            IpamError::InvalidInput(_) => "invalid_input",
            IpamError::NoAvailableAddress { .. } => "no_available_address",
            IpamError::AlreadyReserved { .. } => "already_reserved",
            IpamError::StoreFailure { .. } => "store_failure",
        }
    }

    pub(crate) fn store(
        operation: &'static str,
        block: &str,
        tenant: Option<&str>,
        address: Option<IpAddr>,
        source: StoreError,
    ) -> Self {
        IpamError::StoreFailure {
            operation,
            block: block.to_string(),
            tenant: tenant.map(str::to_string),
            address,
            source,
        }
    }
}

fn scope(tenant: &Option<String>, address: &Option<IpAddr>) -> String {
    let mut scope = String::new();
    if let Some(tenant) = tenant {
        scope.push_str(&format!(" for tenant '{tenant}'"));
    }
    if let Some(address) = address {
        scope.push_str(&format!(" at {address}"));
    }
    scope
}

impl From<BlockError> for IpamError {
    fn from(e: BlockError) -> Self {
        IpamError::InvalidInput(e.to_string())
    }
}
