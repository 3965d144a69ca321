//! Core data types for the lookout scanner
//!
//! - `ScanRequest` is normalised on construction (ports sorted, deduplicated)
//! - `ScanResult` and `ServiceRecord` are plain values handed back to callers
//! - builder-style methods consume `self` to avoid extra clones

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::time::Duration;
use uuid::Uuid;

use crate::error::{LookoutError, LookoutResult};

/// Service name used when neither the table nor the banner says otherwise.
pub const UNKNOWN_SERVICE: &str = "Unknown";

/// Port states returned by a connect probe.
///
/// Refused, reset and timed-out connections are all `Closed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortState {
    Open,
    Closed,
}

impl fmt::Display for PortState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PortState::Open => "open",
            PortState::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Single probe destination (address + TCP port).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Target {
    pub ip: IpAddr,
    pub port: u16,
}

impl Target {
    #[inline]
    #[must_use]
    pub fn new(ip: IpAddr, port: u16) -> Self {
        Self { ip, port }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.ip {
            IpAddr::V4(ip) => write!(f, "{}:{}", ip, self.port),
            IpAddr::V6(ip) => write!(f, "[{}]:{}", ip, self.port),
        }
    }
}

/// Outcome of probing one requested port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortOutcome {
    pub port: u16,
    pub open: bool,
}

impl PortOutcome {
    #[inline]
    #[must_use]
    pub fn new(port: u16, state: PortState) -> Self {
        Self {
            port,
            open: state == PortState::Open,
        }
    }
}

/// A single connect-scan request against one target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRequest {
    pub target: String,
    ports: Vec<u16>,
    pub timeout: Duration,
    pub workers: usize,
}

impl ScanRequest {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);
    pub const DEFAULT_WORKERS: usize = 100;

    /// Build a request; ports are sorted and deduplicated here.
    #[must_use]
    pub fn new<S: Into<String>>(target: S, ports: impl IntoIterator<Item = u16>) -> Self {
        let mut ports: Vec<u16> = ports.into_iter().collect();
        ports.sort_unstable();
        ports.dedup();
        Self {
            target: target.into(),
            ports,
            timeout: Self::DEFAULT_TIMEOUT,
            workers: Self::DEFAULT_WORKERS,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Ascending, duplicate-free port list.
    #[inline]
    #[must_use]
    pub fn ports(&self) -> &[u16] {
        &self.ports
    }

    /// Pool size actually used: never more workers than ports, never zero.
    #[inline]
    #[must_use]
    pub fn effective_workers(&self) -> usize {
        self.workers.min(self.ports.len()).max(1)
    }

    /// Reject requests that must not reach the network.
    pub fn validate(&self) -> LookoutResult<()> {
        if self.target.trim().is_empty() {
            return Err(LookoutError::Config("target must not be empty".into()));
        }
        if self.ports.first() == Some(&0) {
            return Err(LookoutError::Config("port 0 is not scannable".into()));
        }
        if self.timeout.is_zero() {
            return Err(LookoutError::Config("timeout must be positive".into()));
        }
        if self.workers == 0 {
            return Err(LookoutError::Config("worker budget must be at least 1".into()));
        }
        Ok(())
    }
}

/// Result of a completed connect scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    pub scan_id: Uuid,
    pub target: String,
    pub address: IpAddr,
    /// Ascending, duplicate-free, always a subset of the requested ports.
    pub open_ports: Vec<u16>,
    pub total_ports_scanned: usize,
    pub duration: Duration,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Static service table entry (`{"service": .., "description": ..}` on disk).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceEntry {
    #[serde(rename = "service")]
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl ServiceEntry {
    #[inline]
    #[must_use]
    pub fn new<N: Into<String>, D: Into<String>>(name: N, description: D) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }
}

/// Identification result for one open port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRecord {
    pub port: u16,
    #[serde(rename = "service")]
    pub name: String,
    pub description: String,
    pub banner: Option<String>,
}

impl ServiceRecord {
    /// Fresh record: `Unknown`, no description, no banner.
    #[inline]
    #[must_use]
    pub fn unknown(port: u16) -> Self {
        Self {
            port,
            name: UNKNOWN_SERVICE.to_string(),
            description: String::new(),
            banner: None,
        }
    }

    #[inline]
    #[must_use]
    pub fn with_entry(mut self, entry: &ServiceEntry) -> Self {
        self.name = entry.name.clone();
        self.description = entry.description.clone();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_banner(mut self, banner: String) -> Self {
        self.banner = Some(banner);
        self
    }

    #[inline]
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN_SERVICE
    }
}
