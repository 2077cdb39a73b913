// SPDX-License-Identifier: MPL-2.0

//! Network status agent for a 128×64 SSD1306 panel
//!
//! Shows the public and local address plus upload/download rates of the
//! active interface, refreshed roughly once per second.

mod agent;
mod config;
mod display;
mod error;
mod monitor;

use clap::Parser;
use config::Config;
use std::path::PathBuf;

/// Render host network status to an I2C OLED panel
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the JSON configuration file
    #[arg(short, long, default_value = "/etc/oled-netstat/config.json")]
    config: PathBuf,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,

    /// Run a single cycle, leave the frame on the panel and exit
    #[arg(long)]
    once: bool,
}

#[cfg(target_os = "linux")]
fn start(cli: &Cli, config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use agent::Agent;
    use config::CounterSourceKind;
    use display::{Panel, Ssd1306Panel};
    use monitor::{
        CounterSource, HttpTextClient, ProcNetDevCounters, SysinfoAddressQuery, SysinfoCounters,
        ThreadSleeper,
    };
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn run<C: CounterSource, P: Panel>(
        config: &Config,
        counters: C,
        panel: P,
        http: HttpTextClient,
        once: bool,
        shutdown: &AtomicBool,
    ) -> error::Result<()> {
        let mut agent = Agent::new(
            config,
            counters,
            SysinfoAddressQuery::new(),
            http,
            panel,
            ThreadSleeper,
        );
        if once {
            // Exit status reflects the cycle for bench checks
            agent.run_once()?;
        } else {
            agent.run(shutdown);
        }
        Ok(())
    }

    // Without a panel there is nothing to do; let the supervisor retry
    let panel = Ssd1306Panel::open(&config.display.i2c_bus, config.display.i2c_address)?;
    let http = HttpTextClient::new()?;

    let shutdown = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&shutdown);
    ctrlc::set_handler(move || flag.store(true, Ordering::Relaxed))?;

    log::info!(
        "Watching {} (fallback {}), counters from {:?}",
        config.wireless_interface,
        config.wired_interface,
        config.counter_source
    );

    match config.counter_source {
        CounterSourceKind::Sysinfo => {
            run(config, SysinfoCounters::new(), panel, http, cli.once, &shutdown)?
        }
        CounterSourceKind::Procfs => {
            run(config, ProcNetDevCounters::new(), panel, http, cli.once, &shutdown)?
        }
    }

    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn start(_cli: &Cli, _config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    Err(error::MonitorError::Display("I2C panels are only supported on Linux".into()).into())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stdout)
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    start(&cli, &config)
}
