// SPDX-License-Identifier: MPL-2.0

//! Scripted collaborators for unit tests

use super::network::InterfaceCounters;
use super::{AddressQuery, CounterSource, PublicAddressSource, Sleeper};
use crate::error::{MonitorError, Result};
use std::collections::{HashMap, VecDeque};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Records pauses instead of blocking
#[derive(Default)]
pub struct RecordingSleeper {
    pub pauses: Vec<Duration>,
}

impl Sleeper for RecordingSleeper {
    fn sleep(&mut self, duration: Duration) {
        self.pauses.push(duration);
    }
}

/// Hands out queued snapshots in order; the last one repeats.
#[derive(Default)]
pub struct ScriptedCounters {
    pub snapshots: VecDeque<Result<HashMap<String, InterfaceCounters>>>,
    pub reads: usize,
    pub invalidations: usize,
}

impl ScriptedCounters {
    pub fn push(mut self, interface: &str, bytes_sent: u64, bytes_received: u64) -> Self {
        let mut snapshot = HashMap::new();
        snapshot.insert(
            interface.to_string(),
            InterfaceCounters {
                bytes_sent,
                bytes_received,
            },
        );
        self.snapshots.push_back(Ok(snapshot));
        self
    }

    pub fn push_error(mut self) -> Self {
        self.snapshots
            .push_back(Err(MonitorError::Counters("scripted failure".into())));
        self
    }
}

impl CounterSource for ScriptedCounters {
    fn counters(&mut self) -> Result<HashMap<String, InterfaceCounters>> {
        self.reads += 1;
        if self.snapshots.len() > 1 {
            return self.snapshots.pop_front().unwrap_or_else(|| Ok(HashMap::new()));
        }
        match self.snapshots.front() {
            Some(Ok(snapshot)) => Ok(snapshot.clone()),
            Some(Err(_)) => Err(MonitorError::Counters("scripted failure".into())),
            None => Ok(HashMap::new()),
        }
    }

    fn invalidate_cache(&mut self) {
        self.invalidations += 1;
    }
}

/// Fixed answers. Interfaces absent from `interfaces` are reported missing.
#[derive(Default)]
pub struct FakeAddressQuery {
    pub interfaces: HashMap<String, Option<Ipv4Addr>>,
    pub primary: Option<Ipv4Addr>,
    pub fail_primary: bool,
}

impl FakeAddressQuery {
    pub fn with(mut self, name: &str, addr: Option<Ipv4Addr>) -> Self {
        self.interfaces.insert(name.to_string(), addr);
        self
    }
}

impl AddressQuery for FakeAddressQuery {
    fn interface_address(&mut self, name: &str) -> Result<Option<Ipv4Addr>> {
        self.interfaces
            .get(name)
            .copied()
            .ok_or_else(|| MonitorError::InterfaceMissing(name.to_string()))
    }

    fn primary_local_address(&mut self) -> Result<Option<Ipv4Addr>> {
        if self.fail_primary {
            return Err(MonitorError::Counters("query failed".into()));
        }
        Ok(self.primary)
    }
}

/// Canned body, or a failure
pub struct FakeHttp {
    pub body: Option<String>,
    pub requests: Vec<(String, Duration)>,
}

impl FakeHttp {
    pub fn ok(body: &str) -> Self {
        Self {
            body: Some(body.to_string()),
            requests: Vec::new(),
        }
    }

    pub fn failing() -> Self {
        Self {
            body: None,
            requests: Vec::new(),
        }
    }
}

impl PublicAddressSource for FakeHttp {
    fn get_text(&mut self, url: &str, timeout: Duration) -> Result<String> {
        self.requests.push((url.to_string(), timeout));
        self.body
            .clone()
            .ok_or_else(|| MonitorError::Io(std::io::Error::from(std::io::ErrorKind::TimedOut)))
    }
}
