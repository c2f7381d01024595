//! Forwarding pairs

use std::fmt;

use crate::common::Result;
use crate::transport::Endpoint;

/// One relay route: listen on `inbound`, forward every accepted connection to `outbound`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ForwardingPair {
    /// Address to listen on
    pub inbound: Endpoint,
    /// Address to dial for each accepted connection
    pub outbound: Endpoint,
}

impl ForwardingPair {
    /// Create a pair from resolved endpoints
    pub fn new(inbound: impl Into<Endpoint>, outbound: impl Into<Endpoint>) -> Self {
        Self {
            inbound: inbound.into(),
            outbound: outbound.into(),
        }
    }

    /// Create a pair from address text
    ///
    /// # Errors
    ///
    /// Returns [`crate::ProxyError::InvalidAddress`] if either side fails to resolve.
    pub fn parse(inbound: &str, outbound: &str) -> Result<Self> {
        Ok(Self {
            inbound: Endpoint::parse(inbound)?,
            outbound: Endpoint::parse(outbound)?,
        })
    }
}

impl fmt::Display for ForwardingPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.inbound, self.outbound)
    }
}
