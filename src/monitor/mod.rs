// SPDX-License-Identifier: MPL-2.0

//! Network sampling: interface choice, throughput and addresses

pub mod address;
pub mod interface;
pub mod network;
#[cfg(test)]
pub(crate) mod testing;

pub use address::{AddressResolver, HttpTextClient, PublicAddressSource};
pub use interface::{AddressQuery, InterfaceSelector, SysinfoAddressQuery};
pub use network::{CounterSource, ProcNetDevCounters, SysinfoCounters, ThroughputSampler};

use std::time::Duration;

/// Blocking pause. The agent and the sampler never call
/// `std::thread::sleep` directly, so tests can observe every requested delay.
pub trait Sleeper {
    fn sleep(&mut self, duration: Duration);
}

/// The real thing
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}
