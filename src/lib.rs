//! viproxy: point-to-point TCP proxy between AF_INET and AF_VSOCK
//!
//! This library relays byte streams between ordinary IP sockets and
//! hypervisor-local virtual sockets (VSOCK), so a process that can only speak
//! one family (for example, code inside an enclave that is limited to VSOCK)
//! can talk to a peer that only speaks the other.
//!
//! # Main Features
//!
//! - Any number of forwarding pairs, each with its own listener
//! - TCP to VSOCK, VSOCK to TCP, and same-family forwarding
//! - Both directions torn down together when either side closes
//! - Runtime events reported through a pluggable [`EventSink`]
//!
//! # Example
//!
//! ```no_run
//! use viproxy::{ForwardingPair, Proxy, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     viproxy::common::init_logger("info");
//!
//!     // Listen on TCP, forward to port 8080 of the VM with context id 3
//!     let pair = ForwardingPair::parse("127.0.0.1:8080", "3:8080")?;
//!
//!     let mut proxy = Proxy::with_log_sink(vec![pair]);
//!     proxy.start().await?;
//!     proxy.wait().await;
//!
//!     Ok(())
//! }
//! ```

// Public modules
pub mod common;
pub mod config;
pub mod proxy;
pub mod transport;

// Re-export commonly used structures and functions for convenience
pub use common::{EventSink, LogSink, MemorySink, ProxyError, ProxyEvent, Result};
pub use proxy::{ForwardingPair, Proxy};
pub use transport::{Connection, Endpoint, Listener};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
