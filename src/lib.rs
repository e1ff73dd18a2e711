//! # IPAM reservation service
//!
//! Hands out IP addresses from tenant address blocks (CIDR ranges), one
//! address per request, and keeps the reservations in SQLite.
//!
//! - [`models`] - blocks, reservations and address arithmetic
//! - [`store`] - the reservation table and the store contract
//! - [`allocation`] - scanner and the reserve/release/list engine
//! - [`api`] - axum HTTP boundary
//! - [`client`] - reqwest client for the HTTP boundary
//! - [`config`] / [`logging`] - environment configuration and log4rs setup
//!
//! ```no_run
//! use ipam_reservation::allocation::AllocationEngine;
//! use ipam_reservation::models::Block;
//! use ipam_reservation::store::SqliteStore;
//!
//! let engine = AllocationEngine::new(SqliteStore::open_in_memory()?);
//! let block = Block::new("10.0.0.0/24")?;
//! let ip = engine.reserve(&block, "acme", "gateway")?;
//! assert_eq!(ip.to_string(), "10.0.0.1");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod allocation;
pub mod api;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod store;

pub use error::IpamError;
