//! Transport module
//!
//! Address family abstraction over TCP and VSOCK: endpoint addresses,
//! listeners and connections.

mod connection;
mod endpoint;
mod listener;

pub use connection::Connection;
pub use endpoint::Endpoint;
pub use listener::Listener;
