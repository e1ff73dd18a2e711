//! Domain models for the reservation service.
//!
//! - [`Block`] - CIDR address block as supplied by a tenant
//! - [`Reservation`] - an address bound to a tenant within a block

mod block;
mod reservation;

// Re-export public types
pub use block::{
    increment_addr, normalize_subnet, parse_addr, single_host_prefix, Block, BlockError,
    V4_HOST_PREFIX, V6_HOST_PREFIX,
};
pub use reservation::Reservation;
