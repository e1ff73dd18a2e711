//! Free address scanning within a block.
//!
//! Walks the block in ascending address order starting right after the network
//! address and stops at the first address the oracle reports as free.

use crate::models::{increment_addr, Block};
use std::net::IpAddr;

/// Result of a scan over one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Lowest candidate the oracle reported as not taken.
    Free(IpAddr),
    /// No free address left in the block.
    Exhausted,
}

/// Find the lowest free address of `block`.
///
/// `is_taken` is only ever called with addresses inside the block: the step
/// past the last address (or a carry off the top of the address space) ends
/// the scan before the oracle sees it. Oracle errors abort the scan.
pub fn scan<E, F>(block: &Block, mut is_taken: F) -> Result<ScanOutcome, E>
where
    F: FnMut(IpAddr) -> Result<bool, E>,
{
    let mut candidate = block.first_candidate();
    while let Some(addr) = candidate {
        if !is_taken(addr)? {
            return Ok(ScanOutcome::Free(addr));
        }
        candidate = next_in_block(block, addr);
    }
    Ok(ScanOutcome::Exhausted)
}

fn next_in_block(block: &Block, addr: IpAddr) -> Option<IpAddr> {
    increment_addr(addr).filter(|next| block.contains(*next))
}
