use std::io;
use thiserror::Error;

/// Custom error type for the NetPulse application
#[derive(Error, Debug)]
pub enum NetPulseError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Latency probe error: {0}")]
    Probe(String),

    #[error("Metric collection failed: {0}")]
    MetricCollection(String),

    #[error("Scheduler error: {0}")]
    Scheduler(String),

    #[error("TUI error: {0}")]
    Tui(String),
}

/// Result type alias for NetPulse
pub type Result<T> = std::result::Result<T, NetPulseError>;

impl NetPulseError {
    /// Create a config error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        NetPulseError::Config(msg.into())
    }

    /// Create a probe error
    pub fn probe<S: Into<String>>(msg: S) -> Self {
        NetPulseError::Probe(msg.into())
    }

    pub fn metric_collection<S: Into<String>>(msg: S) -> Self {
        NetPulseError::MetricCollection(msg.into())
    }

    pub fn scheduler<S: Into<String>>(msg: S) -> Self {
        NetPulseError::Scheduler(msg.into())
    }

    pub fn tui<S: Into<String>>(msg: S) -> Self {
        NetPulseError::Tui(msg.into())
    }
}
