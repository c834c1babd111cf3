//! Tick scheduler driving the sampling cycle.
//!
//! A single loop owns the sample window (single-writer invariant) and
//! publishes immutable snapshots over a watch channel after every tick.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, info};
use tokio::sync::{broadcast, watch};
use tokio::time::MissedTickBehavior;

use crate::core::config::MonitorConfig;
use crate::error::{NetPulseError, Result};

use super::alerts::{evaluate_thresholds, AlertEvent, AlertSink, ThresholdConfig};
use super::bandwidth::BandwidthSensor;
use super::feed::RenderFeed;
use super::probe::LatencyProbe;
use super::sample::Sample;
use super::window::SampleWindow;

/// Scheduler lifecycle. `Stopped` is terminal; there is no restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
    Stopped,
}

/// Immutable view of the engine, published after every tick.
#[derive(Debug, Clone, Default)]
pub struct MonitorSnapshot {
    /// Window contents at publish time, oldest first
    pub samples: Vec<Sample>,
    /// Events raised by the newest sample; replaced on the next tick
    pub alerts: Vec<AlertEvent>,
    /// Number of ticks completed so far
    pub tick: u64,
}

impl MonitorSnapshot {
    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }
}

/// Everything the tick loop consumes; moved into the sampling task on start.
struct Sensors {
    probe: Box<dyn LatencyProbe>,
    bandwidth: BandwidthSensor,
    sink: Box<dyn AlertSink>,
}

/// Drives the fixed-interval sampling cycle on its own small runtime.
///
/// The scheduler is the sole writer of the sample window; readers subscribe
/// through [`RenderFeed`] and never contend with collection.
pub struct Scheduler {
    config: MonitorConfig,
    state: SchedulerState,
    sensors: Option<Sensors>,
    snapshot_tx: watch::Sender<Arc<MonitorSnapshot>>,
    snapshot_rx: watch::Receiver<Arc<MonitorSnapshot>>,
    shutdown_tx: broadcast::Sender<()>,
    _runtime: Option<tokio::runtime::Runtime>,
}

impl Scheduler {
    pub fn new(
        config: MonitorConfig,
        probe: Box<dyn LatencyProbe>,
        bandwidth: BandwidthSensor,
        sink: Box<dyn AlertSink>,
    ) -> Self {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(MonitorSnapshot::default()));
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            config,
            state: SchedulerState::Idle,
            sensors: Some(Sensors {
                probe,
                bandwidth,
                sink,
            }),
            snapshot_tx,
            snapshot_rx,
            shutdown_tx,
            _runtime: None,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Read-only handle for the display layer
    pub fn feed(&self) -> RenderFeed {
        RenderFeed::new(self.snapshot_rx.clone())
    }

    /// Validate the configuration and begin firing ticks.
    ///
    /// Configuration errors are the only fatal ones; they surface here,
    /// before the first tick.
    pub fn start(&mut self) -> Result<()> {
        match self.state {
            SchedulerState::Idle => {}
            SchedulerState::Running => {
                return Err(NetPulseError::scheduler("scheduler is already running"))
            }
            SchedulerState::Stopped => {
                return Err(NetPulseError::scheduler("scheduler is stopped and cannot restart"))
            }
        }

        self.config.validate()?;

        let sensors = self
            .sensors
            .take()
            .ok_or_else(|| NetPulseError::scheduler("sensors already consumed"))?;

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(2)
            .enable_time()
            .thread_name("netpulse-sampler")
            .build()?;

        runtime.spawn(tick_loop(
            self.config.interval(),
            self.config.window_capacity,
            self.config.thresholds.clone(),
            sensors,
            self.snapshot_tx.clone(),
            self.shutdown_tx.subscribe(),
        ));

        self._runtime = Some(runtime);
        self.state = SchedulerState::Running;
        Ok(())
    }

    /// Signal shutdown. The tick loop observes it within one interval and
    /// leaves the window whole; no further ticks fire afterwards.
    pub fn stop(&mut self) {
        if self.state == SchedulerState::Running {
            let _ = self.shutdown_tx.send(());
        }
        self.state = SchedulerState::Stopped;
    }
}

/// One scheduled execution of the full sampling cycle per interval.
///
/// Sensor failures degrade the reading; the tick itself always completes
/// and always appends exactly one sample.
async fn tick_loop(
    interval: Duration,
    capacity: usize,
    thresholds: ThresholdConfig,
    mut sensors: Sensors,
    snapshot_tx: watch::Sender<Arc<MonitorSnapshot>>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut window = SampleWindow::with_capacity(capacity);
    let mut tick: u64 = 0;

    let mut ticker = tokio::time::interval(interval);
    // A slow tick delays the next one; ticks never overlap
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                tick += 1;

                let latency = sensors.probe.probe();
                let bandwidth = sensors.bandwidth.sample();

                let sample = Sample {
                    timestamp: Utc::now().timestamp(),
                    latency_ms: latency.latency_ms,
                    packet_loss_pct: latency.packet_loss_pct(),
                    sent_bps: bandwidth.sent_bps,
                    recv_bps: bandwidth.recv_bps,
                };

                info!(
                    "Upload: {:.2} MB/s | Download: {:.2} MB/s",
                    sample.sent_bps / 1e6,
                    sample.recv_bps / 1e6
                );

                window.append(sample.clone());

                let alerts = evaluate_thresholds(&sample, &thresholds);
                for event in &alerts {
                    sensors.sink.emit(event);
                }

                // send() only fails when every receiver is gone, which is fine
                let _ = snapshot_tx.send(Arc::new(MonitorSnapshot {
                    samples: window.snapshot(),
                    alerts,
                    tick,
                }));
            }
            _ = shutdown.recv() => {
                debug!("tick loop shutting down after {} ticks", tick);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::net_monitor::alerts::LogSink;
    use crate::core::net_monitor::bandwidth::CounterSource;
    use crate::core::net_monitor::sample::{CounterTotals, LatencyReading};

    struct StaticProbe {
        reading: LatencyReading,
    }

    impl LatencyProbe for StaticProbe {
        fn probe(&mut self) -> LatencyReading {
            self.reading
        }
    }

    struct SteppingCounters {
        current: CounterTotals,
        step: u64,
    }

    impl CounterSource for SteppingCounters {
        fn totals(&mut self) -> crate::error::Result<CounterTotals> {
            self.current.bytes_sent += self.step;
            self.current.bytes_recv += self.step * 2;
            Ok(self.current)
        }
    }

    fn test_sensors() -> Sensors {
        Sensors {
            probe: Box::new(StaticProbe {
                reading: LatencyReading::reachable(10.0),
            }),
            bandwidth: BandwidthSensor::new(Box::new(SteppingCounters {
                current: CounterTotals::default(),
                step: 1_000,
            })),
            sink: Box::new(LogSink),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_one_sample_per_tick_and_clean_stop() {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(MonitorSnapshot::default()));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(tick_loop(
            Duration::from_secs(1),
            50,
            ThresholdConfig::default(),
            test_sensors(),
            snapshot_tx,
            shutdown_rx,
        ));

        // Ticks fire at t=0s, 1s, 2s, 3s on the paused clock
        tokio::time::sleep(Duration::from_millis(3_500)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        let snapshot = snapshot_rx.borrow();
        assert_eq!(snapshot.tick, 4);
        assert_eq!(snapshot.samples.len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_window_capacity_bounds_snapshot() {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(MonitorSnapshot::default()));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(tick_loop(
            Duration::from_secs(1),
            3,
            ThresholdConfig::default(),
            test_sensors(),
            snapshot_tx,
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(5_500)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();

        let snapshot = snapshot_rx.borrow();
        assert_eq!(snapshot.tick, 6);
        assert_eq!(snapshot.samples.len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_after_shutdown() {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(MonitorSnapshot::default()));
        let (shutdown_tx, shutdown_rx) = broadcast::channel(1);

        let handle = tokio::spawn(tick_loop(
            Duration::from_secs(1),
            50,
            ThresholdConfig::default(),
            test_sensors(),
            snapshot_tx,
            shutdown_rx,
        ));

        tokio::time::sleep(Duration::from_millis(1_500)).await;
        shutdown_tx.send(()).unwrap();
        handle.await.unwrap();
        let ticks_at_stop = snapshot_rx.borrow().tick;

        // The loop has exited; advancing time changes nothing
        tokio::time::sleep(Duration::from_secs(5)).await;
        assert_eq!(snapshot_rx.borrow().tick, ticks_at_stop);
        assert_eq!(ticks_at_stop, 2);
    }

    #[test]
    fn test_stop_is_terminal() {
        let mut scheduler = Scheduler::new(
            MonitorConfig::default(),
            Box::new(StaticProbe {
                reading: LatencyReading::reachable(5.0),
            }),
            BandwidthSensor::new(Box::new(SteppingCounters {
                current: CounterTotals::default(),
                step: 100,
            })),
            Box::new(LogSink),
        );

        assert_eq!(scheduler.state(), SchedulerState::Idle);
        scheduler.start().unwrap();
        assert_eq!(scheduler.state(), SchedulerState::Running);
        assert!(scheduler.start().is_err());

        scheduler.stop();
        assert_eq!(scheduler.state(), SchedulerState::Stopped);
        assert!(scheduler.start().is_err());
    }

    #[test]
    fn test_invalid_config_rejected_before_running() {
        let config = MonitorConfig {
            interval_ms: 0,
            ..Default::default()
        };
        let mut scheduler = Scheduler::new(
            config,
            Box::new(StaticProbe {
                reading: LatencyReading::lost(),
            }),
            BandwidthSensor::new(Box::new(SteppingCounters {
                current: CounterTotals::default(),
                step: 0,
            })),
            Box::new(LogSink),
        );

        assert!(scheduler.start().is_err());
        assert_eq!(scheduler.state(), SchedulerState::Idle);
    }
}
