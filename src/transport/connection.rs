//! Byte-stream connections
//!
//! [`Connection`] hides whether a stream runs over TCP or VSOCK and remembers
//! the remote peer, so the relay can log both ends without asking the socket
//! again after it has been split.

use std::io;
use std::net::SocketAddr;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tokio_vsock::VsockStream;

use super::Endpoint;

enum Stream {
    Tcp(TcpStream),
    Vsock(VsockStream),
}

/// Established connection to a peer
pub struct Connection {
    stream: Stream,
    peer: Endpoint,
}

impl Connection {
    pub(crate) fn tcp(stream: TcpStream, peer: SocketAddr) -> io::Result<Self> {
        // Forwarded traffic is usually interactive; don't let Nagle hold it back.
        stream.set_nodelay(true)?;
        Ok(Self {
            stream: Stream::Tcp(stream),
            peer: Endpoint::Tcp(peer),
        })
    }

    pub(crate) fn vsock(stream: VsockStream, peer: Endpoint) -> Self {
        Self {
            stream: Stream::Vsock(stream),
            peer,
        }
    }

    /// Wrap an already established TCP stream
    pub fn from_tcp(stream: TcpStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        Self::tcp(stream, peer)
    }

    /// Wrap an already established VSOCK stream
    pub fn from_vsock(stream: VsockStream) -> io::Result<Self> {
        let peer = stream.peer_addr()?;
        Ok(Self::vsock(stream, peer.into()))
    }

    /// Remote end of this connection
    pub fn peer(&self) -> &Endpoint {
        &self.peer
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.stream {
            Stream::Tcp(_) => "tcp",
            Stream::Vsock(_) => "vsock",
        };
        f.debug_struct("Connection")
            .field("kind", &kind)
            .field("peer", &self.peer)
            .finish()
    }
}

impl AsyncRead for Connection {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match &mut self.get_mut().stream {
            Stream::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            Stream::Vsock(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Connection {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match &mut self.get_mut().stream {
            Stream::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            Stream::Vsock(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().stream {
            Stream::Tcp(s) => Pin::new(s).poll_flush(cx),
            Stream::Vsock(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match &mut self.get_mut().stream {
            Stream::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            Stream::Vsock(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}
