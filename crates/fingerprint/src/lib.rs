//! Fingerprint Engine - Service detection and identification
//!
//! This module provides service detection capabilities including:
//! - Port-based lookup against a static service table
//! - Banner-based reclassification
//! - The per-port identification pipeline combining both

mod identifier;
mod service_detector;
mod service_table;

pub use identifier::ServiceIdentifier;
pub use service_detector::{classify_banner, BANNER_MARKERS};
pub use service_table::{ServiceTable, DEFAULT_SERVICES_DB, SERVICES_DB_ENV};
