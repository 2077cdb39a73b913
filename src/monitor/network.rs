// SPDX-License-Identifier: MPL-2.0

//! Network throughput measurement

use super::Sleeper;
use crate::error::{MonitorError, Result};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use sysinfo::Networks;

/// Bytes per second
pub type Rate = f64;

/// Cumulative byte counters of one interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterfaceCounters {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Debug, Clone)]
pub struct CounterSample {
    pub interface: String,
    pub bytes_sent: u64,
    pub bytes_received: u64,
    pub taken_at: Instant,
}

/// Per-interface cumulative byte counters.
pub trait CounterSource {
    fn counters(&mut self) -> Result<HashMap<String, InterfaceCounters>>;

    /// Drop whatever view of the counters has been cached.
    fn invalidate_cache(&mut self);
}

// ============================================================================
// Counter sources
// ============================================================================

pub struct SysinfoCounters {
    networks: Networks,
}

impl SysinfoCounters {
    pub fn new() -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
        }
    }
}

impl Default for SysinfoCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for SysinfoCounters {
    fn counters(&mut self) -> Result<HashMap<String, InterfaceCounters>> {
        self.networks.refresh();

        let mut counters = HashMap::new();
        for (interface_name, network) in &self.networks {
            counters.insert(
                interface_name.clone(),
                InterfaceCounters {
                    bytes_sent: network.total_transmitted(),
                    bytes_received: network.total_received(),
                },
            );
        }
        Ok(counters)
    }

    fn invalidate_cache(&mut self) {
        // refresh() only updates interfaces already known; a rebuilt list
        // also picks up renamed or hot-plugged adapters
        self.networks = Networks::new_with_refreshed_list();
    }
}

/// Reads `/proc/net/dev` on every call.
pub struct ProcNetDevCounters {
    path: PathBuf,
}

impl ProcNetDevCounters {
    pub fn new() -> Self {
        Self {
            path: PathBuf::from("/proc/net/dev"),
        }
    }
}

impl Default for ProcNetDevCounters {
    fn default() -> Self {
        Self::new()
    }
}

impl CounterSource for ProcNetDevCounters {
    fn counters(&mut self) -> Result<HashMap<String, InterfaceCounters>> {
        let contents = std::fs::read_to_string(&self.path)
            .map_err(|e| MonitorError::Counters(format!("{}: {}", self.path.display(), e)))?;
        Ok(parse_proc_net_dev(&contents))
    }

    fn invalidate_cache(&mut self) {
        // Nothing cached
    }
}

/// Parse the `/proc/net/dev` table.
///
/// ```text
/// Inter-|   Receive                            |  Transmit
///  face |bytes    packets errs drop fifo frame compressed multicast|bytes ...
///   eth0: 1234 ...
/// ```
///
/// Each data line has 16 numeric fields: 8 receive, then 8 transmit. Lines
/// that don't parse are skipped.
pub fn parse_proc_net_dev(contents: &str) -> HashMap<String, InterfaceCounters> {
    let mut counters = HashMap::new();

    for line in contents.lines().skip(2) {
        let Some((name, fields)) = line.split_once(':') else {
            continue;
        };

        let values: Vec<u64> = fields
            .split_whitespace()
            .filter_map(|x| x.parse().ok())
            .collect();
        if values.len() != 16 {
            continue;
        }

        counters.insert(
            name.trim().to_string(),
            InterfaceCounters {
                bytes_received: values[0],
                bytes_sent: values[8],
            },
        );
    }

    counters
}

// ============================================================================
// Sampler
// ============================================================================

/// Force out-of-range rates to zero. Negative means a counter rollover or
/// interface reset, huge means a discontinuity; neither is real traffic.
pub fn clamp_rate(rate: f64, max_plausible_rate: Rate) -> Rate {
    if rate.is_finite() && (0.0..=max_plausible_rate).contains(&rate) {
        rate
    } else {
        0.0
    }
}

/// Measures upload/download over a fixed window.
///
/// The window sleep is the bulk of each cycle, so it also sets the
/// display refresh period.
pub struct ThroughputSampler {
    window: Duration,
    max_plausible_rate: Rate,
}

impl ThroughputSampler {
    pub fn new(window: Duration, max_plausible_rate: Rate) -> Self {
        Self {
            window,
            max_plausible_rate,
        }
    }

    fn sample(&self, source: &mut impl CounterSource, interface: &str) -> Result<CounterSample> {
        let counters = source.counters()?;
        let current = counters
            .get(interface)
            .ok_or_else(|| MonitorError::InterfaceMissing(interface.to_string()))?;

        Ok(CounterSample {
            interface: interface.to_string(),
            bytes_sent: current.bytes_sent,
            bytes_received: current.bytes_received,
            taken_at: Instant::now(),
        })
    }

    /// Returns `(upload, download)` in bytes per second.
    ///
    /// Never fails: a missing interface or a counter read error yields
    /// `(0, 0)`. A missing interface returns before the window sleep.
    pub fn measure(
        &self,
        source: &mut impl CounterSource,
        sleeper: &mut impl Sleeper,
        interface: &str,
    ) -> (Rate, Rate) {
        let first = match self.sample(source, interface) {
            Ok(sample) => sample,
            Err(MonitorError::InterfaceMissing(name)) => {
                log::debug!("{} not present, reporting zero throughput", name);
                return (0.0, 0.0);
            }
            Err(e) => {
                log::warn!("Throughput sample failed: {}", e);
                return (0.0, 0.0);
            }
        };

        sleeper.sleep(self.window);

        match self.sample(source, interface) {
            Ok(second) => self.rates(&first, &second),
            Err(e) => {
                log::warn!("Throughput sample failed after window: {}", e);
                (0.0, 0.0)
            }
        }
    }

    /// Rates between two samples, clamped.
    pub fn rates(&self, first: &CounterSample, second: &CounterSample) -> (Rate, Rate) {
        let secs = self.window.as_secs_f64();
        if first.interface != second.interface || secs <= 0.0 {
            return (0.0, 0.0);
        }
        log::trace!(
            "{}: {:?} between samples",
            first.interface,
            second.taken_at.saturating_duration_since(first.taken_at)
        );

        let upload = (second.bytes_sent as f64 - first.bytes_sent as f64) / secs;
        let download = (second.bytes_received as f64 - first.bytes_received as f64) / secs;

        (
            clamp_rate(upload, self.max_plausible_rate),
            clamp_rate(download, self.max_plausible_rate),
        )
    }
}
