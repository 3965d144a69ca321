//! Target Resolver - turn a user-supplied host into a scannable address
//!
//! Accepted forms:
//! - IPv4 / IPv6 literal: "192.168.1.10", "::1"
//! - hostname: "example.com" (IPv4 answers preferred)

use std::net::IpAddr;
use tokio::net::lookup_host;
use tracing::debug;

use lookout_common::{LookoutError, LookoutResult};

pub struct TargetResolver;

impl TargetResolver {
    /// True when `target` is already an IP address.
    pub fn is_ip_literal(target: &str) -> bool {
        target.trim().parse::<IpAddr>().is_ok()
    }

    /// Resolve a single target to one address.
    ///
    /// IP literals are taken as-is; anything else goes through the system
    /// resolver once. A name that yields no address is `Unresolvable`.
    pub async fn resolve(target: &str) -> LookoutResult<IpAddr> {
        let t = target.trim();
        if t.is_empty() {
            return Err(LookoutError::Config("no target specified".into()));
        }

        if let Ok(ip) = t.parse::<IpAddr>() {
            return Ok(ip);
        }

        let addrs: Vec<IpAddr> = lookup_host((t, 0))
            .await
            .map_err(|e| LookoutError::Unresolvable(format!("{}: {}", t, e)))?
            .map(|a| a.ip())
            .collect();

        let ip = addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| LookoutError::Unresolvable(t.to_string()))?;

        debug!("Resolved {} to {}", t, ip);
        Ok(ip)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{Ipv4Addr, Ipv6Addr};

    #[tokio::test]
    async fn test_resolve_single_ip() {
        let ip = TargetResolver::resolve("8.8.8.8").await.unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(8, 8, 8, 8)));
    }

    #[tokio::test]
    async fn test_resolve_ipv6_literal() {
        let ip = TargetResolver::resolve(" ::1 ").await.unwrap();
        assert_eq!(ip, IpAddr::V6(Ipv6Addr::LOCALHOST));
    }

    #[tokio::test]
    async fn test_resolve_localhost_name() {
        let ip = TargetResolver::resolve("localhost").await.unwrap();
        assert!(ip.is_loopback());
    }

    #[tokio::test]
    async fn test_empty_target_rejected() {
        let err = TargetResolver::resolve("   ").await.unwrap_err();
        assert!(matches!(err, LookoutError::Config(_)));
    }

    #[tokio::test]
    async fn test_unresolvable_name_is_fatal() {
        let err = TargetResolver::resolve("no-such-host.invalid").await.unwrap_err();
        assert!(matches!(err, LookoutError::Unresolvable(_)));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_ip_literal_detection() {
        assert!(TargetResolver::is_ip_literal("10.0.0.1"));
        assert!(TargetResolver::is_ip_literal("fe80::1"));
        assert!(!TargetResolver::is_ip_literal("example.com"));
        assert!(!TargetResolver::is_ip_literal("999.1.1.1"));
    }
}
