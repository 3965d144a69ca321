//! Lookout Common - Shared types and traits
//!
//! This crate provides the data model, probe seams and error taxonomy
//! used across the lookout scanner crates.

pub mod error;
pub mod options;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{LookoutError, LookoutResult};
pub use options::ScanOptions;
pub use traits::{BannerProbe, Prober};
pub use types::{
    PortOutcome, PortState, ScanRequest, ScanResult, ServiceEntry, ServiceRecord, Target,
    UNKNOWN_SERVICE,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
