//! Banner grabbing functionality

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tracing::{debug, instrument};

use lookout_common::{BannerProbe, Target};

/// Protocol-agnostic request line; most text protocols answer it somehow.
pub const GENERIC_PROBE: &[u8] = b"HEAD / HTTP/1.0\r\n\r\n";

/// Upper bound on bytes read from a service.
pub const MAX_BANNER_BYTES: usize = 1024;

pub struct BannerGrabber {
    timeout: Duration,
}

impl BannerGrabber {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    #[instrument(skip(self))]
    /// Open a fresh connection and read whatever the service says first.
    pub async fn fetch(&self, target: &Target) -> Result<String> {
        let addr = SocketAddr::new(target.ip, target.port);
        let mut stream = timeout(self.timeout, TcpStream::connect(addr))
            .await
            .map_err(|_| anyhow!("connect timeout"))??;

        // Some services talk first and reject writes; reading still works.
        if let Err(e) = timeout(self.timeout, stream.write_all(GENERIC_PROBE)).await {
            debug!("Probe write timed out: {}", e);
        }

        let mut buf = vec![0u8; MAX_BANNER_BYTES];
        let n = match timeout(self.timeout, stream.read(&mut buf)).await {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                debug!("Read error: {}", e);
                return Err(anyhow::Error::from(e));
            }
            Err(_) => {
                debug!("Banner timeout");
                return Err(anyhow!("Banner timeout"));
            }
        };

        let banner = decode_banner(&buf[..n]);
        if banner.is_empty() {
            debug!("Empty response");
            return Err(anyhow!("Empty banner"));
        }
        debug!("Banner grab: {} bytes", n);
        Ok(banner)
    }
}

/// Keep the valid UTF-8 runs of a reply and drop everything else.
fn decode_banner(bytes: &[u8]) -> String {
    let text: String = bytes.utf8_chunks().map(|chunk| chunk.valid()).collect();
    text.trim().to_string()
}

#[async_trait]
impl BannerProbe for BannerGrabber {
    async fn grab(&self, target: &Target) -> Option<String> {
        self.fetch(target).await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};
    use tokio::net::TcpListener;

    async fn serve_once<F, Fut>(handler: F) -> u16
    where
        F: FnOnce(TcpStream) -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            if let Ok((stream, _)) = listener.accept().await {
                handler(stream).await;
            }
        });
        port
    }

    fn localhost(port: u16) -> Target {
        Target::new(IpAddr::V4(Ipv4Addr::LOCALHOST), port)
    }

    #[test]
    fn test_banner_grabber_creation() {
        let grabber = BannerGrabber::new(Duration::from_secs(2));
        assert_eq!(grabber.timeout(), Duration::from_secs(2));
    }

    #[tokio::test]
    async fn greeting_service_banner_is_trimmed() {
        let port = serve_once(|mut s| async move {
            let _ = s.write_all(b"SSH-2.0-OpenSSH_9.3\r\n").await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        })
        .await;

        let banner = BannerGrabber::new(Duration::from_secs(2)).grab(&localhost(port)).await;
        assert_eq!(banner.as_deref(), Some("SSH-2.0-OpenSSH_9.3"));
    }

    #[tokio::test]
    async fn request_response_service_answers_probe() {
        let port = serve_once(|mut s| async move {
            let mut req = vec![0u8; 64];
            let n = s.read(&mut req).await.unwrap_or(0);
            if req[..n].starts_with(b"HEAD / HTTP/1.0") {
                let _ = s.write_all(b"HTTP/1.1 200 OK\r\nServer: test\r\n\r\n").await;
            }
        })
        .await;

        let banner = BannerGrabber::new(Duration::from_secs(2))
            .grab(&localhost(port))
            .await
            .unwrap();
        assert!(banner.starts_with("HTTP/1.1 200 OK"));
    }

    #[tokio::test]
    async fn silent_service_yields_none() {
        let port = serve_once(|_s| async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
        })
        .await;

        let banner = BannerGrabber::new(Duration::from_millis(150))
            .grab(&localhost(port))
            .await;
        assert!(banner.is_none());
    }

    #[tokio::test]
    async fn closed_port_yields_none() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let banner = BannerGrabber::new(Duration::from_millis(300))
            .grab(&localhost(port))
            .await;
        assert!(banner.is_none());
    }

    #[test]
    fn invalid_bytes_are_dropped() {
        assert_eq!(decode_banner(b"220 \xff\xfeready\r\n"), "220 ready");
        assert_eq!(decode_banner(&[0xff, 0xfe, 0xfd, 0x80]), "");
    }

    #[tokio::test]
    async fn binary_reply_yields_none() {
        let port = serve_once(|mut s| async move {
            let _ = s.write_all(&[0xff, 0xfe, 0xfd, 0x80]).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        })
        .await;

        let banner = BannerGrabber::new(Duration::from_secs(2))
            .grab(&localhost(port))
            .await;
        assert!(banner.is_none());
    }

    #[tokio::test]
    async fn reads_are_bounded() {
        let port = serve_once(|mut s| async move {
            let _ = s.write_all(&vec![b'a'; 4096]).await;
            tokio::time::sleep(Duration::from_millis(200)).await;
        })
        .await;

        let banner = BannerGrabber::new(Duration::from_secs(2))
            .grab(&localhost(port))
            .await
            .unwrap();
        assert!(banner.len() <= MAX_BANNER_BYTES);
    }
}
