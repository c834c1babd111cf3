//! Threshold evaluation for fresh samples.
//!
//! Evaluates each sample against configured thresholds and generates alert
//! events. The evaluator is side-effect free; delivery happens in whatever
//! sink the caller configured.

use colored::Colorize;
use serde::{Deserialize, Serialize};

use super::sample::Sample;

/// Alert thresholds, fixed for the lifetime of a run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThresholdConfig {
    /// Round-trip latency threshold (ms)
    pub latency_ms: f64,
    /// Packet loss threshold as a fraction (0.1 = 10%)
    pub packet_loss_fraction: f64,
    /// Upload/download rate threshold (bytes/sec)
    pub bandwidth_bytes_per_sec: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            latency_ms: 100.0,
            packet_loss_fraction: 0.1,
            bandwidth_bytes_per_sec: 1e6,
        }
    }
}

/// An individual alert event.
///
/// Ephemeral: emitted to the configured sink and carried on the next
/// snapshot, never stored beyond that.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertEvent {
    pub kind: AlertKind,
    pub message: String,
    /// Measured value that breached
    pub value: f64,
    /// Threshold it breached
    pub threshold: f64,
    /// Unix timestamp of the sample that triggered the alert
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AlertKind {
    HighLatency,
    HostUnreachable,
    HighUpload,
    HighDownload,
}

/// Evaluate one sample and generate alert events.
///
/// Each metric family may breach independently, so a single sample can
/// produce up to four events. An unreachable host reports latency 0, so in
/// practice the unreachable and latency alerts are mutually exclusive, but
/// nothing here enforces that.
pub fn evaluate_thresholds(sample: &Sample, config: &ThresholdConfig) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    if sample.packet_loss_pct / 100.0 >= config.packet_loss_fraction {
        events.push(AlertEvent {
            kind: AlertKind::HostUnreachable,
            message: format!(
                "Host unreachable: packet loss at {:.0}% (threshold: {:.0}%)",
                sample.packet_loss_pct,
                config.packet_loss_fraction * 100.0
            ),
            value: sample.packet_loss_pct,
            threshold: config.packet_loss_fraction * 100.0,
            timestamp: sample.timestamp,
        });
    }

    if sample.latency_ms > config.latency_ms {
        events.push(AlertEvent {
            kind: AlertKind::HighLatency,
            message: format!(
                "High latency: {:.2} ms (threshold: {:.0} ms)",
                sample.latency_ms, config.latency_ms
            ),
            value: sample.latency_ms,
            threshold: config.latency_ms,
            timestamp: sample.timestamp,
        });
    }

    if sample.sent_bps > config.bandwidth_bytes_per_sec {
        events.push(AlertEvent {
            kind: AlertKind::HighUpload,
            message: format!(
                "High upload speed: {:.2} MB/s (threshold: {:.2} MB/s)",
                sample.sent_bps / 1e6,
                config.bandwidth_bytes_per_sec / 1e6
            ),
            value: sample.sent_bps,
            threshold: config.bandwidth_bytes_per_sec,
            timestamp: sample.timestamp,
        });
    }

    if sample.recv_bps > config.bandwidth_bytes_per_sec {
        events.push(AlertEvent {
            kind: AlertKind::HighDownload,
            message: format!(
                "High download speed: {:.2} MB/s (threshold: {:.2} MB/s)",
                sample.recv_bps / 1e6,
                config.bandwidth_bytes_per_sec / 1e6
            ),
            value: sample.recv_bps,
            threshold: config.bandwidth_bytes_per_sec,
            timestamp: sample.timestamp,
        });
    }

    events
}

/// Destination for alert events: console, log, or a UI surface.
pub trait AlertSink: Send {
    fn emit(&mut self, event: &AlertEvent);
}

/// Prints colored `[ALERT]` lines to stdout
#[derive(Debug, Default)]
pub struct ConsoleSink;

impl AlertSink for ConsoleSink {
    fn emit(&mut self, event: &AlertEvent) {
        println!("{} {}", "[ALERT]".red().bold(), event.message);
    }
}

/// Routes alert events into the structured log
#[derive(Debug, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn emit(&mut self, event: &AlertEvent) {
        log::warn!("{}", event.message);
    }
}
