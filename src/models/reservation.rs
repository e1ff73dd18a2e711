//! Reservation data model.

use super::Block;
use std::fmt;
use std::net::IpAddr;

/// A single address of a block bound to one tenant for one purpose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reservation {
    /// Block the address was drawn from, as written by the tenant.
    pub block: Block,
    /// Tenant name (opaque).
    pub tenant: String,
    /// The reserved address.
    pub address: IpAddr,
    /// Free-form classification (host, gateway, dns, vip, ...).
    pub purpose: String,
}

impl fmt::Display for Reservation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} in {} for tenant '{}' ({})",
            self.address, self.block, self.tenant, self.purpose
        )
    }
}
