//! symbscan - SymbCtrl Register Scanner
//!
//! Connects to one controller, waits for the first scan and prints every
//! readable register with its unit.
//!
//! Usage: `symbscan [IP_ADDRESS]`. Without an argument the first controller
//! from the configuration file is used.

use anyhow::{bail, Context, Result};
use std::time::{Duration, Instant};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use symbscan::config;
use symbscan::metrics;
use symbscan::Scanner;

const NAME_WIDTH: usize = 18;
const VALUE_WIDTH: usize = 16;

fn main() -> Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting symbscan v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = config::load_config()?;
    info!(
        "Configuration loaded: {} controllers configured",
        config.controllers.len()
    );

    let prometheus = if config.metrics_enabled {
        Some(metrics::init_metrics().context("Failed to install Prometheus recorder")?)
    } else {
        None
    };

    let address = match std::env::args().nth(1) {
        Some(address) => address,
        None => match config.controllers.first() {
            Some(controller) => {
                info!("Using controller {}", controller.name);
                controller.address.clone()
            }
            None => bail!("No controller address given and none configured"),
        },
    };

    let mut scanner = Scanner::with_config(config.scanner.clone());
    scanner.start(&address)?;

    // wait for data, bounded by the expiry window plus one scan
    let deadline = Instant::now() + config.scanner.data_expiry() + config.scanner.scan_interval();
    while !scanner.valid() && Instant::now() < deadline {
        std::thread::sleep(Duration::from_millis(100));
    }

    if scanner.valid() {
        println!("Controller {} at {}", scanner.controller_name(), address);
        for name in scanner.registers() {
            if scanner.mode(name).is_ok_and(|m| m.readable()) {
                println!(
                    "{:<width$} {}",
                    name,
                    scanner.text_value(name, VALUE_WIDTH, true),
                    width = NAME_WIDTH
                );
            }
        }
    } else if !scanner.connected() {
        warn!("No data from {}: {}", address, scanner.message());
    } else {
        warn!("No scan of {} completed in time", address);
    }

    if let Some(status) = scanner.snapshot() {
        info!("Scanner status: {}", serde_json::to_string(&status)?);
    }

    if let Some(handle) = prometheus {
        println!("{}", handle.render());
    }

    scanner.close()?;
    Ok(())
}
