// crates/scanner_tcp/src/scanner.rs
//! TCP connect prober implementation

use async_trait::async_trait;
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::trace;

use lookout_common::{LookoutResult, PortState, Prober, Target};

/// Full-handshake connect prober. One attempt per port, no retries.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpScanner;

impl TcpScanner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Prober for TcpScanner {
    /// Open means the handshake completed; the socket is closed right away.
    async fn probe(&self, target: &Target, connect_timeout: Duration) -> LookoutResult<PortState> {
        let addr = SocketAddr::new(target.ip, target.port);
        let start = Instant::now();

        match timeout(connect_timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                drop(stream);
                trace!("{} open in {:?}", target, start.elapsed());
                Ok(PortState::Open)
            }
            Ok(Err(e)) => {
                match e.kind() {
                    ErrorKind::ConnectionRefused => trace!("{} refused", target),
                    kind => trace!("{} connect failed ({:?}): {}", target, kind, e),
                }
                Ok(PortState::Closed)
            }
            Err(_) => {
                trace!("{} timed out after {:?}", target, connect_timeout);
                Ok(PortState::Closed)
            }
        }
    }

    fn name(&self) -> &str {
        "TCP Connect Scanner"
    }
}
