//! Address reservation.

use super::scanner::{scan, ScanOutcome};
use crate::error::IpamError;
use crate::models::{Block, Reservation};
use crate::store::{ReservationStore, StoreError};
use colored::Colorize;
use std::net::IpAddr;
use std::sync::{Mutex, MutexGuard};

/// Reserves, releases and lists addresses on top of a [`ReservationStore`].
///
/// Reserve and release are serialized through one lock owned by the engine, so
/// a scan never races a concurrent insert or delete. Listing does not take the
/// lock.
pub struct AllocationEngine<S> {
    pub(super) store: S,
    lock: Mutex<()>,
}

impl<S: ReservationStore> AllocationEngine<S> {
    pub fn new(store: S) -> Self {
        AllocationEngine {
            store,
            lock: Mutex::new(()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Held for the whole read-then-write of a mutating operation.
    pub(super) fn mutation_guard(&self) -> MutexGuard<'_, ()> {
        // The lock guards no data, so a poisoned lock is still usable.
        self.lock.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Reserve the lowest free address of `block` for `tenant`.
    ///
    /// Every successful call creates a new reservation; repeating a call that
    /// succeeded allocates a second address.
    pub fn reserve(&self, block: &Block, tenant: &str, purpose: &str) -> Result<IpAddr, IpamError> {
        let _guard = self.mutation_guard();

        let outcome = scan(block, |candidate| self.store.exists(candidate, block, tenant))
            .map_err(|e| {
                IpamError::store(
                    "scanning for a free address",
                    block.descriptor(),
                    Some(tenant),
                    None,
                    e,
                )
            })?;

        let address = match outcome {
            ScanOutcome::Free(address) => address,
            ScanOutcome::Exhausted => {
                log::warn!(
                    "{exhausted} block {block} for tenant '{tenant}'",
                    exhausted = "exhausted".on_red()
                );
                return Err(IpamError::NoAvailableAddress {
                    block: block.to_string(),
                    tenant: tenant.to_string(),
                });
            }
        };
        log::debug!("scan of {block} for tenant '{tenant}' found {address}");

        let already_reserved = || IpamError::AlreadyReserved {
            block: block.to_string(),
            tenant: tenant.to_string(),
            address,
        };

        let taken = self
            .store
            .exists(address, block, tenant)
            .map_err(|e| {
                IpamError::store(
                    "re-checking a candidate",
                    block.descriptor(),
                    Some(tenant),
                    Some(address),
                    e,
                )
            })?;
        if taken {
            log::warn!("candidate {address} in {block} was taken after the scan");
            return Err(already_reserved());
        }

        let reservation = Reservation {
            block: block.clone(),
            tenant: tenant.to_string(),
            address,
            purpose: purpose.to_string(),
        };
        match self.store.insert(&reservation) {
            Ok(()) => {
                log::info!("Reserved {reservation}");
                Ok(address)
            }
            Err(StoreError::Conflict) => {
                log::warn!(
                    "{conflict} inserting {reservation}",
                    conflict = "conflict".on_red()
                );
                Err(already_reserved())
            }
            Err(e) => Err(IpamError::store(
                "inserting a reservation",
                block.descriptor(),
                Some(tenant),
                Some(address),
                e,
            )),
        }
    }
}
