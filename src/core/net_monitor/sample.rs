use std::time::Instant;

use serde::{Deserialize, Serialize};

/// One tick's aligned readings across all metrics.
///
/// Immutable once created; the scheduler is the only producer.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Sample {
    /// Unix timestamp of the tick
    pub timestamp: i64,
    /// Round-trip latency in milliseconds, 0 when the host was unreachable
    pub latency_ms: f64,
    /// Per-tick packet loss: 0.0 or 100.0 (single-probe binary outcome)
    pub packet_loss_pct: f64,
    /// Upload rate in bytes per second
    pub sent_bps: f64,
    /// Download rate in bytes per second
    pub recv_bps: f64,
}

impl Sample {
    /// Whether the latency probe saw the host at all this tick
    pub fn unreachable(&self) -> bool {
        self.packet_loss_pct >= 100.0
    }
}

/// Outcome of a single latency probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatencyReading {
    pub latency_ms: f64,
    pub unreachable: bool,
}

impl LatencyReading {
    pub fn reachable(latency_ms: f64) -> Self {
        Self {
            latency_ms,
            unreachable: false,
        }
    }

    /// Fallback reading: latency 0, full loss for this tick
    pub fn lost() -> Self {
        Self {
            latency_ms: 0.0,
            unreachable: true,
        }
    }

    pub fn packet_loss_pct(&self) -> f64 {
        if self.unreachable {
            100.0
        } else {
            0.0
        }
    }
}

/// Per-second transfer rates computed from counter deltas
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BandwidthReading {
    pub sent_bps: f64,
    pub recv_bps: f64,
}

/// Cumulative interface byte counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CounterTotals {
    pub bytes_sent: u64,
    pub bytes_recv: u64,
}

/// Counter totals plus the instant they were read.
///
/// Sensor-internal state between bandwidth ticks; replaced every tick.
#[derive(Debug, Clone, Copy)]
pub struct CounterSnapshot {
    pub totals: CounterTotals,
    pub taken_at: Instant,
}
