use std::net::{IpAddr, ToSocketAddrs};
use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::core::net_monitor::{ThresholdConfig, DEFAULT_WINDOW_CAPACITY};
use crate::error::{NetPulseError, Result};

pub const DEFAULT_HOST: &str = "8.8.8.8";
pub const DEFAULT_INTERVAL_MS: u64 = 2_000;
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Monitor configuration, supplied at startup and immutable for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Reference host for the latency probe (IPv4 address or hostname)
    pub host: String,
    /// Restrict bandwidth counters to one interface; all non-loopback otherwise
    #[serde(default)]
    pub interface: Option<String>,
    /// Tick interval in milliseconds
    pub interval_ms: u64,
    /// Latency probe timeout in milliseconds
    pub probe_timeout_ms: u64,
    /// Number of samples kept in the sliding window
    pub window_capacity: usize,
    pub thresholds: ThresholdConfig,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            interface: None,
            interval_ms: DEFAULT_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            window_capacity: DEFAULT_WINDOW_CAPACITY,
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl MonitorConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    /// Fail fast on configurations the scheduler must never run with.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(NetPulseError::config("tick interval must be positive"));
        }
        if self.probe_timeout_ms == 0 {
            return Err(NetPulseError::config("probe timeout must be positive"));
        }
        if self.window_capacity == 0 {
            return Err(NetPulseError::config("window capacity must be positive"));
        }
        if self.thresholds.latency_ms <= 0.0 {
            return Err(NetPulseError::config("latency threshold must be positive"));
        }
        if self.thresholds.bandwidth_bytes_per_sec <= 0.0 {
            return Err(NetPulseError::config("bandwidth threshold must be positive"));
        }
        if self.thresholds.packet_loss_fraction <= 0.0 || self.thresholds.packet_loss_fraction > 1.0
        {
            return Err(NetPulseError::config(
                "packet loss threshold must be a fraction in (0, 1]",
            ));
        }

        self.resolve_host()?;

        if self.probe_timeout_ms > self.interval_ms {
            // Legal, but a slow probe then delays subsequent ticks
            warn!(
                "probe timeout ({} ms) exceeds the tick interval ({} ms)",
                self.probe_timeout_ms, self.interval_ms
            );
        }

        Ok(())
    }

    /// Resolve the configured host to an IPv4 address.
    pub fn resolve_host(&self) -> Result<IpAddr> {
        if let Ok(addr) = self.host.parse::<IpAddr>() {
            return match addr {
                IpAddr::V4(_) => Ok(addr),
                IpAddr::V6(_) => Err(NetPulseError::config(format!(
                    "host {} is IPv6; only IPv4 targets are supported",
                    self.host
                ))),
            };
        }

        let addrs = (self.host.as_str(), 0).to_socket_addrs().map_err(|err| {
            NetPulseError::config(format!("cannot resolve host {}: {}", self.host, err))
        })?;

        addrs
            .into_iter()
            .find(|addr| addr.is_ipv4())
            .map(|addr| addr.ip())
            .ok_or_else(|| {
                NetPulseError::config(format!("host {} has no IPv4 address", self.host))
            })
    }
}
