use std::sync::Arc;

use tokio::sync::watch;

use super::scheduler::MonitorSnapshot;

const BYTES_PER_MB: f64 = 1e6;

/// Read-only handle the display layer polls on its own cadence.
///
/// Backed by the scheduler's watch channel: each read borrows the latest
/// published snapshot, so a view is always a whole number of ticks and
/// never observes a half-appended sample.
#[derive(Debug, Clone)]
pub struct RenderFeed {
    rx: watch::Receiver<Arc<MonitorSnapshot>>,
}

impl RenderFeed {
    pub(crate) fn new(rx: watch::Receiver<Arc<MonitorSnapshot>>) -> Self {
        Self { rx }
    }

    /// Latest published snapshot (samples, current-tick alerts, tick count)
    pub fn latest(&self) -> Arc<MonitorSnapshot> {
        self.rx.borrow().clone()
    }

    /// Chart-ready series derived from the latest snapshot
    pub fn current_view(&self) -> ChartView {
        ChartView::from_snapshot(&self.latest())
    }
}

/// Per-metric series in display units, aligned by index.
///
/// Bandwidth is stored as raw bytes/sec and converted to MB/s here, at read
/// time, so the window keeps full precision.
#[derive(Debug, Clone, Default)]
pub struct ChartView {
    pub timestamps: Vec<i64>,
    pub latency_ms: Vec<f64>,
    pub packet_loss_pct: Vec<f64>,
    pub upload_mbps: Vec<f64>,
    pub download_mbps: Vec<f64>,
}

impl ChartView {
    pub fn from_snapshot(snapshot: &MonitorSnapshot) -> Self {
        let mut view = ChartView {
            timestamps: Vec::with_capacity(snapshot.samples.len()),
            latency_ms: Vec::with_capacity(snapshot.samples.len()),
            packet_loss_pct: Vec::with_capacity(snapshot.samples.len()),
            upload_mbps: Vec::with_capacity(snapshot.samples.len()),
            download_mbps: Vec::with_capacity(snapshot.samples.len()),
        };

        for sample in &snapshot.samples {
            view.timestamps.push(sample.timestamp);
            view.latency_ms.push(sample.latency_ms);
            view.packet_loss_pct.push(sample.packet_loss_pct);
            view.upload_mbps.push(sample.sent_bps / BYTES_PER_MB);
            view.download_mbps.push(sample.recv_bps / BYTES_PER_MB);
        }

        view
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }
}
