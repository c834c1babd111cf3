//! Network health monitoring core.
//!
//! This module provides the sampling engine: sensors for latency/loss and
//! bandwidth, the fixed-capacity sample window, the tick scheduler, the
//! threshold evaluator, and the read-only render feed.

pub mod alerts;
mod bandwidth;
mod feed;
mod probe;
mod sample;
mod scheduler;
mod window;

pub use alerts::{
    evaluate_thresholds, AlertEvent, AlertKind, AlertSink, ConsoleSink, LogSink, ThresholdConfig,
};
pub use bandwidth::{compute_rates, BandwidthSensor, CounterSource, SysinfoCounters};
pub use feed::{ChartView, RenderFeed};
pub use probe::{IcmpProbe, LatencyProbe};
pub use sample::{BandwidthReading, CounterSnapshot, CounterTotals, LatencyReading, Sample};
pub use scheduler::{MonitorSnapshot, Scheduler, SchedulerState};
pub use window::{SampleWindow, DEFAULT_WINDOW_CAPACITY};
