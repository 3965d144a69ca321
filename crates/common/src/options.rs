//! Scan behaviour tuning options.
//!
//! Keep fields `pub` so the CLI can overlay flags onto a preset.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{LookoutError, LookoutResult};
use crate::types::ScanRequest;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanOptions {
    /// Per-connection timeout for the connect scan.
    pub timeout: Duration,
    /// Worker budget for the connect scan.
    pub workers: usize,
    /// Connect/read timeout for banner probes.
    pub banner_timeout: Duration,
    /// Concurrent banner probes during identification (1 = sequential).
    pub identify_concurrency: usize,
    pub service_detection: bool,
    /// External service table; the built-in table is used when absent.
    pub services_db: Option<PathBuf>,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            timeout: ScanRequest::DEFAULT_TIMEOUT,
            workers: ScanRequest::DEFAULT_WORKERS,
            banner_timeout: Duration::from_secs(2),
            identify_concurrency: 1,
            service_detection: false,
            services_db: None,
        }
    }
}

impl ScanOptions {
    /// Fast preset: short timeouts, wide pool, parallel identification.
    #[inline]
    #[must_use]
    pub fn fast() -> Self {
        Self {
            timeout: Duration::from_millis(300),
            workers: 500,
            banner_timeout: Duration::from_millis(800),
            identify_concurrency: 16,
            ..Self::default()
        }
    }

    /// Accurate preset: patient timeouts for slow or distant hosts.
    #[inline]
    #[must_use]
    pub fn accurate() -> Self {
        Self {
            timeout: Duration::from_secs(3),
            workers: 50,
            banner_timeout: Duration::from_secs(5),
            identify_concurrency: 1,
            ..Self::default()
        }
    }

    /// Look up a preset by name.
    pub fn preset(name: &str) -> LookoutResult<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "" | "default" | "balanced" => Ok(Self::default()),
            "fast" => Ok(Self::fast()),
            "accurate" => Ok(Self::accurate()),
            other => Err(LookoutError::Config(format!("unknown preset '{}'", other))),
        }
    }

    /// Build a validated scan request. An empty port list is a configuration error.
    pub fn request<S: Into<String>>(&self, target: S, ports: &[u16]) -> LookoutResult<ScanRequest> {
        if ports.is_empty() {
            return Err(LookoutError::Config("no valid ports to scan".into()));
        }
        if self.banner_timeout.is_zero() {
            return Err(LookoutError::Config("banner timeout must be positive".into()));
        }
        if self.identify_concurrency == 0 {
            return Err(LookoutError::Config(
                "identification concurrency must be at least 1".into(),
            ));
        }
        let request = ScanRequest::new(target, ports.iter().copied())
            .with_timeout(self.timeout)
            .with_workers(self.workers);
        request.validate()?;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_cli_defaults() {
        let opts = ScanOptions::default();
        assert_eq!(opts.timeout, Duration::from_secs(1));
        assert_eq!(opts.workers, 100);
        assert_eq!(opts.banner_timeout, Duration::from_secs(2));
        assert_eq!(opts.identify_concurrency, 1);
        assert!(!opts.service_detection);
    }

    #[test]
    fn presets_by_name() {
        assert_eq!(ScanOptions::preset("fast").unwrap().workers, 500);
        assert_eq!(ScanOptions::preset("Accurate").unwrap().timeout, Duration::from_secs(3));
        assert_eq!(ScanOptions::preset("balanced").unwrap().workers, 100);
        assert!(ScanOptions::preset("stealth").is_err());
    }

    #[test]
    fn request_rejects_empty_ports() {
        let opts = ScanOptions::default();
        assert!(matches!(
            opts.request("127.0.0.1", &[]),
            Err(LookoutError::Config(_))
        ));
    }

    #[test]
    fn request_carries_options() {
        let opts = ScanOptions {
            timeout: Duration::from_millis(500),
            workers: 7,
            ..ScanOptions::default()
        };
        let req = opts.request("10.0.0.1", &[80, 22, 80]).unwrap();
        assert_eq!(req.ports(), &[22, 80]);
        assert_eq!(req.timeout, Duration::from_millis(500));
        assert_eq!(req.workers, 7);
    }

    #[test]
    fn request_rejects_zero_pool() {
        let opts = ScanOptions {
            workers: 0,
            ..ScanOptions::default()
        };
        assert!(opts.request("10.0.0.1", &[80]).is_err());

        let opts = ScanOptions {
            identify_concurrency: 0,
            ..ScanOptions::default()
        };
        assert!(opts.request("10.0.0.1", &[80]).is_err());
    }
}
