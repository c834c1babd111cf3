use std::time::{Duration, Instant};

use log::warn;
use sysinfo::Networks;

use crate::error::{NetPulseError, Result};

use super::sample::{BandwidthReading, CounterSnapshot, CounterTotals};

/// Source of cumulative interface byte counters.
pub trait CounterSource: Send {
    fn totals(&mut self) -> Result<CounterTotals>;
}

/// Reads cumulative counters from the OS via sysinfo.
///
/// Without a filter the totals are summed across all non-loopback
/// interfaces; with one, only the named interface is counted.
pub struct SysinfoCounters {
    networks: Networks,
    interface: Option<String>,
}

impl SysinfoCounters {
    pub fn new(interface: Option<String>) -> Self {
        Self {
            networks: Networks::new_with_refreshed_list(),
            interface,
        }
    }
}

impl CounterSource for SysinfoCounters {
    fn totals(&mut self) -> Result<CounterTotals> {
        self.networks.refresh(true);

        let mut totals = CounterTotals::default();
        let mut matched = false;
        for (name, data) in self.networks.iter() {
            let selected = match &self.interface {
                Some(wanted) => name == wanted,
                None => !name.starts_with("lo"),
            };
            if !selected {
                continue;
            }
            matched = true;
            totals.bytes_sent += data.total_transmitted();
            totals.bytes_recv += data.total_received();
        }

        if !matched {
            return Err(NetPulseError::metric_collection(match &self.interface {
                Some(wanted) => format!("interface {} not found", wanted),
                None => "no network interfaces found".to_string(),
            }));
        }

        Ok(totals)
    }
}

/// Computes per-second transfer rates from consecutive counter snapshots.
///
/// Keeps the previous snapshot between ticks. A failed counter read, a
/// zero/negative elapsed time, or counters that went backwards all degrade
/// to a zero-rate reading; the sensor itself never fails a tick.
pub struct BandwidthSensor {
    source: Box<dyn CounterSource>,
    last: Option<CounterSnapshot>,
}

impl BandwidthSensor {
    pub fn new(source: Box<dyn CounterSource>) -> Self {
        Self { source, last: None }
    }

    pub fn sample(&mut self) -> BandwidthReading {
        let totals = match self.source.totals() {
            Ok(totals) => totals,
            Err(err) => {
                warn!("counter read failed, reporting zero rates: {}", err);
                return BandwidthReading::default();
            }
        };

        let now = Instant::now();
        let reading = match &self.last {
            // First read only establishes the baseline
            None => BandwidthReading::default(),
            Some(prev) => compute_rates(&prev.totals, &totals, now.duration_since(prev.taken_at)),
        };

        self.last = Some(CounterSnapshot {
            totals,
            taken_at: now,
        });
        reading
    }
}

/// Rate computation with explicit guards for the two degenerate cases:
/// zero elapsed time and counters that decreased (interface reset or
/// wraparound). Both return zero rates instead of dividing by zero or
/// producing negative values.
pub fn compute_rates(
    prev: &CounterTotals,
    current: &CounterTotals,
    elapsed: Duration,
) -> BandwidthReading {
    let elapsed_secs = elapsed.as_secs_f64();
    if elapsed_secs <= 0.0 {
        warn!("zero elapsed time between counter reads, reporting zero rates");
        return BandwidthReading::default();
    }

    if current.bytes_sent < prev.bytes_sent || current.bytes_recv < prev.bytes_recv {
        warn!("interface counters decreased (reset or wraparound), reporting zero rates");
        return BandwidthReading::default();
    }

    BandwidthReading {
        sent_bps: (current.bytes_sent - prev.bytes_sent) as f64 / elapsed_secs,
        recv_bps: (current.bytes_recv - prev.bytes_recv) as f64 / elapsed_secs,
    }
}
