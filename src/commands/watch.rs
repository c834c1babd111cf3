//! Watch command handler.
//!
//! Runs the live network monitor as a TUI dashboard, or as a JSON stream
//! for scripting.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::ArgMatches;

use crate::core::config::MonitorConfig;
use crate::core::net_monitor::{
    BandwidthSensor, IcmpProbe, LogSink, Scheduler, SysinfoCounters, ThresholdConfig,
};
use crate::ui::monitor_tui::run_monitor_app;

/// Execute the watch command
pub fn execute(matches: &ArgMatches) -> Result<()> {
    let config = build_config(matches);

    if matches.get_flag("json") {
        return run_json_output(config);
    }

    run_monitor_app(config).context("Failed to run network monitor")
}

fn build_config(matches: &ArgMatches) -> MonitorConfig {
    let defaults = MonitorConfig::default();
    let default_thresholds = ThresholdConfig::default();

    MonitorConfig {
        host: matches
            .get_one::<String>("host")
            .cloned()
            .unwrap_or(defaults.host),
        interface: matches.get_one::<String>("interface").cloned(),
        interval_ms: matches
            .get_one::<u64>("interval")
            .copied()
            .unwrap_or(defaults.interval_ms),
        probe_timeout_ms: matches
            .get_one::<u64>("timeout")
            .copied()
            .unwrap_or(defaults.probe_timeout_ms),
        window_capacity: matches
            .get_one::<usize>("window")
            .copied()
            .unwrap_or(defaults.window_capacity),
        thresholds: ThresholdConfig {
            latency_ms: matches
                .get_one::<f64>("latency-threshold")
                .copied()
                .unwrap_or(default_thresholds.latency_ms),
            packet_loss_fraction: matches
                .get_one::<f64>("loss-threshold")
                .copied()
                .unwrap_or(default_thresholds.packet_loss_fraction),
            bandwidth_bytes_per_sec: matches
                .get_one::<f64>("bandwidth-threshold")
                .copied()
                .unwrap_or(default_thresholds.bandwidth_bytes_per_sec),
        },
    }
}

/// Run in JSON output mode (for scripting): one sample per line on stdout
fn run_json_output(config: MonitorConfig) -> Result<()> {
    config.validate().context("Invalid monitor configuration")?;
    let target = config
        .resolve_host()
        .context("Failed to resolve target host")?;

    let probe = Box::new(IcmpProbe::new(target, config.probe_timeout()));
    let counters = SysinfoCounters::new(config.interface.clone());
    let bandwidth = BandwidthSensor::new(Box::new(counters));

    // Alerts go to the log so stdout stays parseable
    let mut scheduler = Scheduler::new(config.clone(), probe, bandwidth, Box::new(LogSink));
    scheduler
        .start()
        .context("Failed to start sampling scheduler")?;
    let feed = scheduler.feed();

    let running = Arc::new(AtomicBool::new(true));
    let handler_flag = Arc::clone(&running);
    ctrlc::set_handler(move || handler_flag.store(false, Ordering::SeqCst))
        .context("Failed to install Ctrl-C handler")?;

    let poll_interval = config.interval().min(Duration::from_millis(200));
    let mut last_tick = 0u64;

    while running.load(Ordering::SeqCst) {
        let snapshot = feed.latest();
        if snapshot.tick != last_tick {
            last_tick = snapshot.tick;
            if let Some(sample) = snapshot.latest() {
                println!("{}", serde_json::to_string(sample)?);
            }
        }
        std::thread::sleep(poll_interval);
    }

    scheduler.stop();
    Ok(())
}
