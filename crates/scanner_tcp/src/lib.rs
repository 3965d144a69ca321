//! TCP network layer: connect probing and banner grabbing over tokio sockets.

pub mod banner;
pub mod scanner;

pub use banner::{BannerGrabber, GENERIC_PROBE, MAX_BANNER_BYTES};
pub use scanner::TcpScanner;
