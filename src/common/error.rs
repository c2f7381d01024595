//! Error handling module
//!
//! This module defines the error types and result type aliases used in the application.
//! Only configuration and listener setup failures surface as errors; faults on
//! individual connections are reported through the event sink instead.

use thiserror::Error;
use std::io;

use crate::transport::Endpoint;

/// viproxy error type
#[derive(Error, Debug)]
pub enum ProxyError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Address text that is neither `host:port` nor `cid:port`
    #[error("Invalid address {input:?}: {reason}")]
    InvalidAddress {
        /// The text that failed to resolve
        input: String,
        /// Why it was rejected
        reason: String,
    },

    /// Listener could not be opened on an inbound address
    #[error("Failed to listen on {addr}: {source}")]
    Bind {
        /// The inbound address that failed
        addr: Endpoint,
        /// Underlying socket error
        #[source]
        source: io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    pub(crate) fn invalid_address(input: &str, reason: impl Into<String>) -> Self {
        Self::InvalidAddress {
            input: input.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias
///
/// This is a `Result` type alias that uses our custom `ProxyError`.
pub type Result<T> = std::result::Result<T, ProxyError>;
