//! Endpoint addresses
//!
//! An [`Endpoint`] names either a TCP socket or a VSOCK socket and knows how
//! to listen on and dial itself, so the proxy never has to care which family
//! it is dealing with.

use std::fmt;
use std::io;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use tokio::net::{TcpListener, TcpStream};
use tokio_vsock::{VsockAddr, VsockListener, VsockStream};

use crate::common::{ProxyError, Result};
use super::{Connection, Listener};

/// Address of one side of a forwarding pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// AF_INET / AF_INET6 socket address
    Tcp(SocketAddr),
    /// AF_VSOCK address
    Vsock {
        /// Context id of the VM (or host)
        cid: u32,
        /// VSOCK port
        port: u32,
    },
}

impl Endpoint {
    /// Create a VSOCK endpoint
    pub fn vsock(cid: u32, port: u32) -> Self {
        Self::Vsock { cid, port }
    }

    /// Resolve address text into an endpoint
    ///
    /// IP literals (`127.0.0.1:8080`, `[::1]:8080`) are tried first. Text made
    /// of exactly two numeric fields (`3:8080`) is a VSOCK `cid:port`; both
    /// fields must fit in 32 bits. Anything else goes through the platform's
    /// name resolution as `host:port`.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::InvalidAddress`] when the text is neither form.
    pub fn parse(input: &str) -> Result<Self> {
        if let Ok(addr) = SocketAddr::from_str(input) {
            return Ok(Self::Tcp(addr));
        }

        // Unbracketed text with more than one colon is never a valid host:port.
        let (host, port) = match input.split_once(':') {
            Some((host, port)) if !port.contains(':') => (host, port),
            _ => return Err(ProxyError::invalid_address(input, "expected host:port or cid:port")),
        };
        if host.is_empty() || port.is_empty() {
            return Err(ProxyError::invalid_address(input, "missing host or port"));
        }

        if is_decimal(host) {
            // Never hand a bare number to the resolver: it would read "3" as 0.0.0.3.
            let cid = parse_u32(host)
                .ok_or_else(|| ProxyError::invalid_address(input, "context id does not fit in 32 bits"))?;
            let port = parse_u32(port)
                .ok_or_else(|| ProxyError::invalid_address(input, "port is not a 32-bit unsigned integer"))?;
            return Ok(Self::Vsock { cid, port });
        }

        match input.to_socket_addrs() {
            Ok(mut addrs) => addrs
                .next()
                .map(Self::Tcp)
                .ok_or_else(|| ProxyError::invalid_address(input, "host name resolved to no addresses")),
            Err(e) => Err(ProxyError::invalid_address(
                input,
                format!("neither host:port nor cid:port ({})", e),
            )),
        }
    }

    /// Whether this is a VSOCK endpoint
    pub fn is_vsock(&self) -> bool {
        matches!(self, Self::Vsock { .. })
    }

    /// Bind a listener on this address
    pub async fn listen(&self) -> io::Result<Listener> {
        match *self {
            Self::Tcp(addr) => Ok(Listener::Tcp(TcpListener::bind(addr).await?)),
            Self::Vsock { cid, port } => {
                Ok(Listener::Vsock(VsockListener::bind(VsockAddr::new(cid, port))?))
            }
        }
    }

    /// Open a connection to this address
    pub async fn dial(&self) -> io::Result<Connection> {
        match *self {
            Self::Tcp(addr) => {
                let stream = TcpStream::connect(addr).await?;
                Connection::tcp(stream, addr)
            }
            Self::Vsock { cid, port } => {
                let stream = VsockStream::connect(VsockAddr::new(cid, port)).await?;
                Ok(Connection::vsock(stream, *self))
            }
        }
    }
}

fn is_decimal(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

fn parse_u32(field: &str) -> Option<u32> {
    if is_decimal(field) {
        field.parse().ok()
    } else {
        None
    }
}

impl FromStr for Endpoint {
    type Err = ProxyError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(addr: SocketAddr) -> Self {
        Self::Tcp(addr)
    }
}

impl From<VsockAddr> for Endpoint {
    fn from(addr: VsockAddr) -> Self {
        Self::Vsock {
            cid: addr.cid(),
            port: addr.port(),
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tcp(addr) => write!(f, "{}", addr),
            Self::Vsock { cid, port } => write!(f, "vsock://{}:{}", cid, port),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ip_literals() {
        let endpoint = Endpoint::parse("127.0.0.1:8080").unwrap();
        assert_eq!(endpoint, Endpoint::Tcp("127.0.0.1:8080".parse().unwrap()));

        let endpoint = Endpoint::parse("[::1]:443").unwrap();
        assert_eq!(endpoint, Endpoint::Tcp("[::1]:443".parse().unwrap()));

        let endpoint = Endpoint::parse("0.0.0.0:0").unwrap();
        assert!(!endpoint.is_vsock());
    }

    #[test]
    fn test_parse_host_name() {
        match Endpoint::parse("localhost:8080") {
            Ok(Endpoint::Tcp(addr)) => {
                assert_eq!(addr.port(), 8080);
                assert!(addr.ip().is_loopback());
            }
            other => panic!("localhost should resolve to a TCP endpoint, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_vsock() {
        assert_eq!(Endpoint::parse("3:8080").unwrap(), Endpoint::vsock(3, 8080));
        assert_eq!(Endpoint::parse("0:0").unwrap(), Endpoint::vsock(0, 0));
        assert_eq!(
            Endpoint::parse("4294967295:4294967295").unwrap(),
            Endpoint::vsock(u32::MAX, u32::MAX)
        );
        // VSOCK ports are 32-bit, so values above 65535 are fine.
        assert_eq!(Endpoint::parse("16:70000").unwrap(), Endpoint::vsock(16, 70000));
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for input in [
            "",
            "3",
            "1:2:3",
            "3:",
            ":8080",
            "3:port",
            "3:-1",
            "3:+5",
            "4294967296:80",
            "3:4294967296",
            "localhost:port",
            "localhost:70000",
        ] {
            let result = Endpoint::parse(input);
            assert!(
                matches!(result, Err(ProxyError::InvalidAddress { .. })),
                "{:?} should be rejected, got {:?}",
                input,
                result
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Endpoint::vsock(3, 8080).to_string(), "vsock://3:8080");
        assert_eq!(Endpoint::parse("10.0.0.1:22").unwrap().to_string(), "10.0.0.1:22");
    }

    #[tokio::test]
    async fn test_tcp_listen_and_dial() {
        let endpoint = Endpoint::parse("127.0.0.1:0").unwrap();
        let mut listener = endpoint.listen().await.unwrap();
        let bound = listener.local_addr().unwrap();
        assert!(matches!(bound, Endpoint::Tcp(addr) if addr.port() != 0));

        let (dialed, accepted) = tokio::join!(bound.dial(), listener.accept());
        let dialed = dialed.unwrap();
        let accepted = accepted.unwrap();

        assert_eq!(*dialed.peer(), bound);
        assert!(matches!(accepted.peer(), Endpoint::Tcp(addr) if addr.ip().is_loopback()));
    }

    #[tokio::test]
    async fn test_tcp_dial_refused() {
        // Grab a free port, then release it so nothing is listening there.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        assert!(Endpoint::Tcp(addr).dial().await.is_err());
    }
}
