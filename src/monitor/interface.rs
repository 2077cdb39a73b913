// SPDX-License-Identifier: MPL-2.0

//! # Interface Selection
//!
//! Decides, once per cycle, which interface stands for "the" connection.
//!
//! ## Policy
//!
//! 1. The wireless interface, if it currently holds an IPv4 address
//! 2. The wired interface, under the same test
//! 3. The wireless name anyway
//!
//! Step 3 means the result may not resolve to real connectivity. Consumers
//! report "Not connected" or a zero rate in that case; selection itself never
//! fails. A query error (interface gone, sysinfo hiccup) counts as "no address".

use crate::error::{MonitorError, Result};
use std::net::{IpAddr, Ipv4Addr};
use sysinfo::{NetworkData, Networks};

// ============================================================================
// Address Query Collaborator
// ============================================================================

/// Read-only view of interface addresses.
pub trait AddressQuery {
    /// First usable IPv4 address bound to `name`.
    ///
    /// `Ok(None)` means the interface exists without an address;
    /// `Err(InterfaceMissing)` means it does not exist at all.
    fn interface_address(&mut self, name: &str) -> Result<Option<Ipv4Addr>>;

    /// The host's primary address: the first non-loopback IPv4 address,
    /// scanning interfaces in name order.
    fn primary_local_address(&mut self) -> Result<Option<Ipv4Addr>>;

    fn interface_has_address(&mut self, name: &str) -> bool {
        matches!(self.interface_address(name), Ok(Some(_)))
    }
}

/// Address queries backed by `sysinfo::Networks`.
pub struct SysinfoAddressQuery {
    networks: Networks,
}

impl SysinfoAddressQuery {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoAddressQuery {
    fn default() -> Self {
        Self::new()
    }
}

/// Skip loopback and link-local: neither is something worth showing.
fn usable_ipv4(data: &NetworkData) -> Option<Ipv4Addr> {
    data.ip_networks().iter().find_map(|network| match network.addr {
        IpAddr::V4(addr) if !addr.is_loopback() && !addr.is_link_local() => Some(addr),
        _ => None,
    })
}

impl AddressQuery for SysinfoAddressQuery {
    fn interface_address(&mut self, name: &str) -> Result<Option<Ipv4Addr>> {
        // Addresses come and go with DHCP leases, re-read them every time
        self.networks.refresh_list();

        let data = self
            .networks
            .list()
            .get(name)
            .ok_or_else(|| MonitorError::InterfaceMissing(name.to_string()))?;
        Ok(usable_ipv4(data))
    }

    fn primary_local_address(&mut self) -> Result<Option<Ipv4Addr>> {
        self.networks.refresh_list();

        let mut interfaces: Vec<(&String, &NetworkData)> = self.networks.list().iter().collect();
        interfaces.sort_by(|a, b| a.0.cmp(b.0));

        Ok(interfaces.into_iter().find_map(|(_, data)| usable_ipv4(data)))
    }
}

// ============================================================================
// Selector
// ============================================================================

pub struct InterfaceSelector {
    wireless: String,
    wired: String,
}

impl InterfaceSelector {
    pub fn new(wireless: impl Into<String>, wired: impl Into<String>) -> Self {
        Self {
            wireless: wireless.into(),
            wired: wired.into(),
        }
    }

    /// Pick the interface for this cycle. Never fails.
    pub fn select(&self, query: &mut impl AddressQuery) -> String {
        if query.interface_has_address(&self.wireless) {
            return self.wireless.clone();
        }
        if query.interface_has_address(&self.wired) {
            log::debug!("{} has no address, using {}", self.wireless, self.wired);
            return self.wired.clone();
        }

        log::debug!(
            "Neither {} nor {} has an address, defaulting to {}",
            self.wireless,
            self.wired,
            self.wireless
        );
        self.wireless.clone()
    }
}
