//! Progress tracking

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// Live counters for the current scan.
pub struct ProgressTracker {
    total: AtomicUsize,
    probed: AtomicUsize,
    open: AtomicUsize,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub total: usize,
    pub probed: usize,
    pub open: usize,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self {
            total: AtomicUsize::new(0),
            probed: AtomicUsize::new(0),
            open: AtomicUsize::new(0),
        }
    }

    pub fn reset(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.probed.store(0, Ordering::Relaxed);
        self.open.store(0, Ordering::Relaxed);
    }

    pub fn record_probe(&self) {
        self.probed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_open(&self) {
        self.open.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total: self.total.load(Ordering::Relaxed),
            probed: self.probed.load(Ordering::Relaxed),
            open: self.open.load(Ordering::Relaxed),
        }
    }

    pub fn log_summary(&self) {
        let s = self.snapshot();

        info!("Scan Summary:");
        info!("  Total ports: {}", s.total);
        info!("  Probed: {}", s.probed);
        info!("  Open: {}", s.open);
        if s.total > 0 {
            info!("  Completion: {:.1}%", (s.probed as f64 / s.total as f64) * 100.0);
        }
    }
}

impl Default for ProgressTracker {
    fn default() -> Self {
        Self::new()
    }
}
