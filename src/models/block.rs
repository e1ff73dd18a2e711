//! Address block (CIDR) descriptors and address arithmetic.
//!
//! Provides [`Block`] for representing a tenant address block in CIDR notation,
//! along with the byte-wise address increment the scanner walks blocks with.

use ipnet::IpNet;
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use thiserror::Error;

/// Prefix length of a single IPv4 host.
pub const V4_HOST_PREFIX: u8 = 32;
/// Prefix length of a single IPv6 host.
pub const V6_HOST_PREFIX: u8 = 128;

/// Errors raised while parsing block descriptors and addresses.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BlockError {
    #[error("invalid CIDR block '{0}'")]
    InvalidBlock(String),
    #[error("invalid IP address '{0}'")]
    InvalidAddress(String),
}

/// Increment an address by one, treating its octets as a big-endian integer.
///
/// The carry propagates from the last octet towards the first. Returns `None`
/// when the carry runs off the most significant octet, i.e. when `addr` is the
/// all-ones address of its family and the increment would wrap to all-zero.
pub fn increment_addr(addr: IpAddr) -> Option<IpAddr> {
    match addr {
        IpAddr::V4(v4) => {
            let mut octets = v4.octets();
            increment_octets(&mut octets).then(|| IpAddr::V4(Ipv4Addr::from(octets)))
        }
        IpAddr::V6(v6) => {
            let mut octets = v6.octets();
            increment_octets(&mut octets).then(|| IpAddr::V6(Ipv6Addr::from(octets)))
        }
    }
}

/// In-place carry increment. Returns false if the value wrapped.
fn increment_octets(octets: &mut [u8]) -> bool {
    for octet in octets.iter_mut().rev() {
        let (next, carry) = octet.overflowing_add(1);
        *octet = next;
        if !carry {
            return true;
        }
    }
    false
}

/// Prefix length that describes a single host of the address family.
pub fn single_host_prefix(addr: IpAddr) -> u8 {
    match addr {
        IpAddr::V4(_) => V4_HOST_PREFIX,
        IpAddr::V6(_) => V6_HOST_PREFIX,
    }
}

/// Turn a subnet query into CIDR form.
///
/// A bare address (no `/`) gets the single-host prefix length of its family
/// appended, e.g. `10.0.0.7` becomes `10.0.0.7/32` and `fd00::1` becomes
/// `fd00::1/128`. Anything else is returned trimmed but otherwise untouched.
///
/// # Examples
/// ```
/// use ipam_reservation::models::normalize_subnet;
/// assert_eq!(normalize_subnet("10.0.0.7").unwrap(), "10.0.0.7/32");
/// assert_eq!(normalize_subnet("10.0.0.0/24").unwrap(), "10.0.0.0/24");
/// ```
pub fn normalize_subnet(subnet: &str) -> Result<String, BlockError> {
    let subnet = subnet.trim();
    if subnet.contains('/') {
        return Ok(subnet.to_string());
    }
    let addr: IpAddr = subnet
        .parse()
        .map_err(|_| BlockError::InvalidAddress(subnet.to_string()))?;
    Ok(format!("{}/{}", subnet, single_host_prefix(addr)))
}

/// Parse a single address, e.g. the `ip_address` of a release request.
pub fn parse_addr(addr: &str) -> Result<IpAddr, BlockError> {
    let addr = addr.trim();
    addr.parse()
        .map_err(|_| BlockError::InvalidAddress(addr.to_string()))
}

/// An address block as supplied by a tenant (e.g. `"10.0.0.0/24"`).
///
/// The descriptor text is kept exactly as written (trimmed) because reservations
/// are keyed by it. [`Block::canonical`] gives the network form used by block
/// queries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Block {
    descriptor: String,
    net: IpNet,
}

impl Block {
    /// Create a new [`Block`] from a CIDR string (e.g. "10.0.0.0/24" or "fd00::/120").
    pub fn new(cidr: &str) -> Result<Block, BlockError> {
        let descriptor = cidr.trim();
        let parts: Vec<&str> = descriptor.split('/').collect();
        if parts.len() != 2 {
            return Err(BlockError::InvalidBlock(descriptor.to_string()));
        }
        let net: IpNet = descriptor
            .parse()
            .map_err(|_| BlockError::InvalidBlock(descriptor.to_string()))?;
        Ok(Block {
            descriptor: descriptor.to_string(),
            net,
        })
    }

    /// The descriptor as written by the caller.
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Network form of the block, e.g. `10.0.0.5/24` -> `10.0.0.0/24`.
    pub fn canonical(&self) -> String {
        self.net.trunc().to_string()
    }

    pub fn prefix_len(&self) -> u8 {
        self.net.prefix_len()
    }

    /// Get the lowest (network) address in the block.
    pub fn lo(&self) -> IpAddr {
        self.net.network()
    }

    /// Get the highest (broadcast) address in the block.
    pub fn hi(&self) -> IpAddr {
        self.net.broadcast()
    }

    pub fn contains(&self, addr: IpAddr) -> bool {
        self.net.contains(&addr)
    }

    /// First address eligible for allocation: the network address plus one.
    ///
    /// Returns `None` for single-host blocks (`/32`, `/128`) whose only address is
    /// the network address itself.
    pub fn first_candidate(&self) -> Option<IpAddr> {
        increment_addr(self.lo()).filter(|addr| self.contains(*addr))
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.descriptor)
    }
}
