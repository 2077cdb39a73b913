// SPDX-License-Identifier: MPL-2.0

//! # Sampling loop
//!
//! One cycle is select → measure → resolve → render. The throughput window
//! sleep dominates each cycle, so the loop needs no timer of its own.
//!
//! ## Failure tiers
//!
//! - Collaborator trouble (missing interface, address query, echo service)
//!   is absorbed where it happens and shows up as a placeholder value.
//! - Anything that still escapes the cycle body, in practice the panel
//!   itself, draws the error screen and backs off before the next cycle.
//!
//! Every N cycles the counter source is told to drop its cache. N counts
//! cycles, not seconds, so a slow echo service stretches the period.

use crate::config::Config;
use crate::display::{DisplayRenderer, DisplaySnapshot, Panel};
use crate::error::Result;
use crate::monitor::{
    AddressQuery, AddressResolver, CounterSource, InterfaceSelector, PublicAddressSource, Sleeper,
    ThroughputSampler,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Counts cycles up to a fixed period, then wraps to zero.
#[derive(Debug, Clone, Copy)]
pub struct CycleCounter {
    count: u32,
    period: u32,
}

impl CycleCounter {
    pub fn new(period: u32) -> Self {
        Self {
            count: 0,
            period: period.max(1),
        }
    }

    #[cfg(test)]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Record one completed cycle. True when the period has elapsed; the
    /// count is back at zero in that case.
    pub fn advance(&mut self) -> bool {
        self.count += 1;
        if self.count >= self.period {
            self.count = 0;
            return true;
        }
        false
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Rendered,
    Failed,
}

/// Loop-owned state and collaborators. Nothing here is shared; the loop
/// thread owns the bus handle and the counter source outright.
pub struct Agent<C, Q, H, P, S>
where
    C: CounterSource,
    Q: AddressQuery,
    H: PublicAddressSource,
    P: Panel,
    S: Sleeper,
{
    selector: InterfaceSelector,
    sampler: ThroughputSampler,
    resolver: AddressResolver,
    renderer: DisplayRenderer<P>,
    counters: C,
    addresses: Q,
    http: H,
    sleeper: S,
    cycles: CycleCounter,
    error_backoff: Duration,
}

impl<C, Q, H, P, S> Agent<C, Q, H, P, S>
where
    C: CounterSource,
    Q: AddressQuery,
    H: PublicAddressSource,
    P: Panel,
    S: Sleeper,
{
    pub fn new(config: &Config, counters: C, addresses: Q, http: H, panel: P, sleeper: S) -> Self {
        Self {
            selector: InterfaceSelector::new(&config.wireless_interface, &config.wired_interface),
            sampler: ThroughputSampler::new(config.sample_window(), config.max_plausible_rate),
            resolver: AddressResolver::new(&config.public_ip_url, config.public_ip_timeout()),
            renderer: DisplayRenderer::new(panel),
            counters,
            addresses,
            http,
            sleeper,
            cycles: CycleCounter::new(config.cache_reset_cycles),
            error_backoff: config.error_backoff(),
        }
    }

    fn run_cycle(&mut self) -> Result<()> {
        let interface = self.selector.select(&mut self.addresses);
        let (upload_rate, download_rate) =
            self.sampler.measure(&mut self.counters, &mut self.sleeper, &interface);
        let (local_address, public_address) =
            self.resolver.resolve(&mut self.addresses, &mut self.http, &interface);

        let snapshot = DisplaySnapshot {
            public_address,
            local_address,
            upload_rate,
            download_rate,
        };
        log::debug!("{}: {:?}", interface, snapshot);

        self.renderer.render(&snapshot)
    }

    /// Cycle body plus the failure tier and cache bookkeeping. The cycle's
    /// own error is handed back after the error screen and backoff.
    fn cycle(&mut self) -> Result<()> {
        let result = self.run_cycle();
        if let Err(e) = &result {
            log::error!("Cycle failed: {}", e);
            if let Err(render_err) = self.renderer.render_error(&e.to_string()) {
                log::error!("Error screen failed too: {}", render_err);
            }
            self.sleeper.sleep(self.error_backoff);
        }

        if self.cycles.advance() {
            log::info!("Resetting network counter cache");
            self.counters.invalidate_cache();
        }

        result
    }

    /// Run one cycle, including error screen and backoff on failure.
    pub fn tick(&mut self) -> CycleOutcome {
        match self.cycle() {
            Ok(()) => CycleOutcome::Rendered,
            Err(_) => CycleOutcome::Failed,
        }
    }

    /// A single cycle for bench checks. Unlike `tick`, a failed cycle is
    /// returned to the caller.
    pub fn run_once(&mut self) -> Result<()> {
        self.cycle()
    }

    /// Cycle until `shutdown` is raised, then blank the panel.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        log::info!("Sampling loop started");
        while !shutdown.load(Ordering::Relaxed) {
            self.tick();
        }
        log::info!("Shutting down");
        self.renderer.shutdown();
    }
}
