use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::sleep;
use std::time::Duration;

use netpulse::core::config::MonitorConfig;
use netpulse::core::net_monitor::{
    AlertEvent, AlertSink, BandwidthSensor, CounterSource, CounterTotals, LatencyProbe,
    LatencyReading, Scheduler, SchedulerState,
};

struct StaticProbe {
    reading: LatencyReading,
    calls: Arc<AtomicU64>,
}

impl LatencyProbe for StaticProbe {
    fn probe(&mut self) -> LatencyReading {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.reading
    }
}

struct SteppingCounters {
    current: CounterTotals,
    step: u64,
}

impl CounterSource for SteppingCounters {
    fn totals(&mut self) -> netpulse::Result<CounterTotals> {
        self.current.bytes_sent += self.step;
        self.current.bytes_recv += self.step;
        Ok(self.current)
    }
}

struct RecordingSink {
    events: Arc<std::sync::Mutex<Vec<AlertEvent>>>,
}

impl AlertSink for RecordingSink {
    fn emit(&mut self, event: &AlertEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn fast_config() -> MonitorConfig {
    MonitorConfig {
        interval_ms: 50,
        probe_timeout_ms: 50,
        ..Default::default()
    }
}

fn build_scheduler(
    reading: LatencyReading,
    probe_calls: Arc<AtomicU64>,
    events: Arc<std::sync::Mutex<Vec<AlertEvent>>>,
) -> Scheduler {
    Scheduler::new(
        fast_config(),
        Box::new(StaticProbe {
            reading,
            calls: probe_calls,
        }),
        BandwidthSensor::new(Box::new(SteppingCounters {
            current: CounterTotals::default(),
            step: 1_000,
        })),
        Box::new(RecordingSink { events }),
    )
}

#[test]
fn test_engine_collects_and_stops_cleanly() {
    let probe_calls = Arc::new(AtomicU64::new(0));
    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut scheduler =
        build_scheduler(LatencyReading::reachable(12.0), probe_calls.clone(), events);

    scheduler.start().unwrap();
    let feed = scheduler.feed();

    sleep(Duration::from_millis(500));
    scheduler.stop();
    assert_eq!(scheduler.state(), SchedulerState::Stopped);

    // Shutdown is observed within one interval; after a grace period the
    // tick count must not move again.
    sleep(Duration::from_millis(150));
    let ticks_after_stop = feed.latest().tick;
    sleep(Duration::from_millis(200));
    assert_eq!(feed.latest().tick, ticks_after_stop);

    // One probe invocation and one sample per tick, no duplication
    assert!(ticks_after_stop >= 2, "expected at least two ticks");
    assert_eq!(probe_calls.load(Ordering::SeqCst), ticks_after_stop);
    let snapshot = feed.latest();
    assert_eq!(snapshot.samples.len() as u64, ticks_after_stop);

    // Samples carry the probe's reading and stay in insertion order
    assert!(snapshot.samples.iter().all(|s| s.latency_ms == 12.0));
    let timestamps: Vec<i64> = snapshot.samples.iter().map(|s| s.timestamp).collect();
    let mut sorted = timestamps.clone();
    sorted.sort_unstable();
    assert_eq!(timestamps, sorted);
}

#[test]
fn test_unreachable_probe_degrades_and_alerts() {
    let probe_calls = Arc::new(AtomicU64::new(0));
    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut scheduler = build_scheduler(LatencyReading::lost(), probe_calls, events.clone());

    scheduler.start().unwrap();
    let feed = scheduler.feed();
    sleep(Duration::from_millis(300));
    scheduler.stop();
    sleep(Duration::from_millis(150));

    // Every tick still produced a sample with the fallback reading
    let snapshot = feed.latest();
    assert!(!snapshot.samples.is_empty());
    assert!(snapshot
        .samples
        .iter()
        .all(|s| s.latency_ms == 0.0 && s.packet_loss_pct == 100.0));

    // The sink saw one unreachable alert per tick
    let recorded = events.lock().unwrap();
    assert_eq!(recorded.len() as u64, snapshot.tick);
    assert!(!recorded.is_empty());
}

#[test]
fn test_feed_view_stays_aligned_with_window() {
    let probe_calls = Arc::new(AtomicU64::new(0));
    let events = Arc::new(std::sync::Mutex::new(Vec::new()));
    let mut scheduler =
        build_scheduler(LatencyReading::reachable(5.0), probe_calls, events);

    scheduler.start().unwrap();
    let feed = scheduler.feed();
    sleep(Duration::from_millis(300));
    scheduler.stop();
    sleep(Duration::from_millis(150));

    let snapshot = feed.latest();
    let view = feed.current_view();
    assert_eq!(view.len(), snapshot.samples.len());
    assert_eq!(view.timestamps.len(), view.latency_ms.len());
    assert_eq!(view.upload_mbps.len(), view.download_mbps.len());
    assert_eq!(view.len(), view.packet_loss_pct.len());
}

#[test]
fn test_start_requires_valid_config() {
    let mut scheduler = Scheduler::new(
        MonitorConfig {
            window_capacity: 0,
            ..Default::default()
        },
        Box::new(StaticProbe {
            reading: LatencyReading::lost(),
            calls: Arc::new(AtomicU64::new(0)),
        }),
        BandwidthSensor::new(Box::new(SteppingCounters {
            current: CounterTotals::default(),
            step: 0,
        })),
        Box::new(RecordingSink {
            events: Arc::new(std::sync::Mutex::new(Vec::new())),
        }),
    );

    assert!(scheduler.start().is_err());
    assert_eq!(scheduler.state(), SchedulerState::Idle);
}
