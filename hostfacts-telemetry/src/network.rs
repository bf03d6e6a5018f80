//! Network address collection.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::debug;

/// Interface name prefixes that never carry the guest's own address.
const IGNORED_INTERFACE_PREFIXES: [&str; 4] = ["lo", "docker", "br-", "veth"];

/// An address bound to an interface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceAddress {
    pub interface: String,
    pub address: IpAddr,
}

/// Network information.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NetworkInfo {
    /// Address of the interface carrying the default route
    pub primary_ip: Option<IpAddr>,
    /// All non-loopback addresses on guest interfaces
    pub addresses: Vec<InterfaceAddress>,
}

impl NetworkInfo {
    /// Primary address, falling back to the first listed one.
    pub fn primary_or_first(&self) -> Option<IpAddr> {
        self.primary_ip
            .or_else(|| self.addresses.first().map(|a| a.address))
    }
}

/// Keep addresses on guest-facing interfaces only.
pub fn filter_addresses(entries: Vec<(String, IpAddr)>) -> Vec<InterfaceAddress> {
    entries
        .into_iter()
        .filter(|(name, addr)| {
            !addr.is_loopback()
                && !IGNORED_INTERFACE_PREFIXES
                    .iter()
                    .any(|prefix| name.starts_with(prefix))
        })
        .map(|(interface, address)| InterfaceAddress { interface, address })
        .collect()
}

/// Collect network addresses.
pub fn collect_network_info() -> NetworkInfo {
    let primary_ip = match local_ip_address::local_ip() {
        Ok(ip) => Some(ip),
        Err(e) => {
            debug!(error = %e, "No primary IP address");
            None
        }
    };

    let addresses = match local_ip_address::list_afinet_netifas() {
        Ok(entries) => filter_addresses(entries),
        Err(e) => {
            debug!(error = %e, "Failed to list interface addresses");
            Vec::new()
        }
    };

    NetworkInfo {
        primary_ip,
        addresses,
    }
}
