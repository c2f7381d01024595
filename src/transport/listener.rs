//! Listening sockets

use std::io;

use tokio::net::TcpListener;
use tokio_vsock::VsockListener;

use super::{Connection, Endpoint};

/// Listener bound to an inbound [`Endpoint`]
///
/// Created by [`Endpoint::listen`]. The socket is closed when the value is dropped.
pub enum Listener {
    /// TCP listener
    Tcp(TcpListener),
    /// VSOCK listener
    Vsock(VsockListener),
}

impl Listener {
    /// Wait for the next inbound connection
    pub async fn accept(&mut self) -> io::Result<Connection> {
        match self {
            Self::Tcp(listener) => {
                let (stream, peer) = listener.accept().await?;
                Connection::tcp(stream, peer)
            }
            Self::Vsock(listener) => {
                let (stream, peer) = listener.accept().await?;
                Ok(Connection::vsock(stream, peer.into()))
            }
        }
    }

    /// Address the listener is actually bound to
    ///
    /// For a TCP listener bound to port 0 this reports the port the kernel picked.
    pub fn local_addr(&self) -> io::Result<Endpoint> {
        match self {
            Self::Tcp(listener) => listener.local_addr().map(Endpoint::from),
            Self::Vsock(listener) => listener.local_addr().map(Endpoint::from),
        }
    }
}

impl std::fmt::Debug for Listener {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.local_addr() {
            Ok(addr) => f.debug_tuple("Listener").field(&addr).finish(),
            Err(_) => f.debug_tuple("Listener").field(&"<unbound>").finish(),
        }
    }
}
