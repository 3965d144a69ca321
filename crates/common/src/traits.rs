//! Probe seams between the scan engines and the network
//!
//! The engines only talk to the network through these traits, so tests can
//! substitute deterministic fakes.

use crate::error::LookoutResult;
use crate::types::{PortState, Target};
use async_trait::async_trait;
use std::time::Duration;

/// Connect probe used by the scan engine.
#[async_trait]
pub trait Prober: Send + Sync {
    /// Attempt a full handshake with `target` within `timeout`.
    ///
    /// Ordinary connection failures are `Ok(PortState::Closed)`. An `Err`
    /// whose `is_fatal()` is true aborts the whole scan; any other `Err`
    /// is treated as closed.
    async fn probe(&self, target: &Target, timeout: Duration) -> LookoutResult<PortState>;

    /// Prober name/identifier
    fn name(&self) -> &str;
}

/// Banner probe used by service identification.
#[async_trait]
pub trait BannerProbe: Send + Sync {
    /// Best-effort banner; every failure collapses to `None`.
    async fn grab(&self, target: &Target) -> Option<String>;
}
