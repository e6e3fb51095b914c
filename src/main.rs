//! Pickup Watch - Main Daemon
//!
//! Polls the Apple retail fulfillment API for the configured models at the
//! configured pickup location and pushes a notification for every store
//! that has one available.
//!
//! Usage:
//!   cargo run --release
//!
//! Environment:
//!   PICKUP_WATCH_CONFIG - path to the TOML config (default: pickup_watch.toml)
//!   RUST_LOG            - log filter (default: info)

use pickup_watch::config::{self, WatchConfig};
use pickup_watch::daemon::Daemon;

fn main() {
    println!("🍎 Pickup Watch");
    println!("===============\n");

    // Loads .env before anything reads the environment
    let config = match WatchConfig::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load {}: {}", config::config_path().display(), e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("   Location: {}", config.location);
    println!("   Models: {}", config.models.join(", "));
    println!("   Poll interval: {} seconds", config.search_interval_seconds);
    println!("   Notify endpoints: {}", config.notify_endpoints.len());
    println!("   Press Ctrl+C to stop\n");

    let mut daemon = match Daemon::new(config) {
        Ok(daemon) => daemon,
        Err(e) => {
            eprintln!("❌ Failed to build HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    daemon.run()
}
