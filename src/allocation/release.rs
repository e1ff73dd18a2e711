//! Releasing reservations and querying blocks.

use super::AllocationEngine;
use crate::error::IpamError;
use crate::models::{normalize_subnet, Block};
use crate::store::ReservationStore;
use std::net::IpAddr;

impl<S: ReservationStore> AllocationEngine<S> {
    /// Delete the exact (block, tenant, address) reservation.
    ///
    /// Returns `false` when nothing matched; an address that was never reserved
    /// and one that is already released look the same.
    pub fn release(&self, block: &Block, tenant: &str, address: IpAddr) -> Result<bool, IpamError> {
        let _guard = self.mutation_guard();

        let removed = self
            .store
            .delete(block, tenant, address)
            .map_err(|e| {
                IpamError::store(
                    "releasing a reservation",
                    block.descriptor(),
                    Some(tenant),
                    Some(address),
                    e,
                )
            })?;

        if removed > 0 {
            log::info!("Released {address} in {block} for tenant '{tenant}'");
        } else {
            log::debug!("release of {address} in {block} for tenant '{tenant}' matched nothing");
        }
        Ok(removed > 0)
    }

    /// Addresses reserved under `subnet`, in reservation order.
    ///
    /// A bare address is read as a single-host block. The query uses the network
    /// form of the subnet and matches stored blocks by exact text, so a
    /// reservation made under `10.0.0.5/24` is not listed for `10.0.0.0/24`.
    pub fn list_addresses(&self, subnet: &str) -> Result<Vec<String>, IpamError> {
        let block = Block::new(&normalize_subnet(subnet)?)?;
        let canonical = block.canonical();
        let addresses = self
            .store
            .list_addresses(&canonical)
            .map_err(|e| IpamError::store("listing addresses", &canonical, None, None, e))?;
        log::debug!("{} address(es) reserved in {canonical}", addresses.len());
        Ok(addresses)
    }
}
