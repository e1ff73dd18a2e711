//! Durable reservation storage.
//!
//! - [`ReservationStore`] - the contract the engine talks to
//! - [`SqliteStore`] - the `ips` table in a SQLite database

mod sqlite;

use crate::models::{Block, Reservation};
use std::net::IpAddr;
use thiserror::Error;

pub use sqlite::{SqliteStore, DEFAULT_BUSY_TIMEOUT};

/// Store level failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The (block, tenant, address) uniqueness constraint rejected an insert.
    #[error("uniqueness constraint violated")]
    Conflict,
    /// Any other backend error.
    #[error("store backend failure: {0}")]
    Backend(String),
}

/// Persistence contract for reservations.
///
/// Blocks are matched by their descriptor text, never by address range.
pub trait ReservationStore: Send + Sync {
    /// Persist a reservation. Fails with [`StoreError::Conflict`] if the
    /// (block, tenant, address) triple is already present.
    fn insert(&self, reservation: &Reservation) -> Result<(), StoreError>;

    /// Remove the exact (block, tenant, address) row. Returns the number of rows
    /// removed; zero is not an error.
    fn delete(&self, block: &Block, tenant: &str, address: IpAddr) -> Result<usize, StoreError>;

    /// Is `address` reserved in `block` for `tenant`?
    ///
    /// An empty `tenant` widens the check to any tenant of the block.
    fn exists(&self, address: IpAddr, block: &Block, tenant: &str) -> Result<bool, StoreError>;

    /// Addresses reserved under the block string `block`, in insertion order.
    fn list_addresses(&self, block: &str) -> Result<Vec<String>, StoreError>;
}
