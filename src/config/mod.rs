//! Configuration module
//!
//! The proxy core only needs a list of resolved forwarding pairs. This module
//! builds that list from the sources the command-line tool supports: a JSON
//! configuration file and a single `IN_ADDR`/`OUT_ADDR` pair given as flags or
//! environment variables.
//!
//! A configuration file looks like this:
//!
//! ```json
//! {
//!     "log_level": "debug",
//!     "pairs": [
//!         { "in": "127.0.0.1:8080", "out": "4:8080" },
//!         { "in": "3:1080", "out": "10.0.0.5:1080" }
//!     ]
//! }
//! ```

pub mod defaults;
mod loader;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::common::{ProxyError, Result};
use crate::proxy::ForwardingPair;

pub use defaults::{ENV_CONFIG_FILE, ENV_IN_ADDR, ENV_LOG_LEVEL, ENV_OUT_ADDR};

/// Unresolved forwarding pair as written in a configuration source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairConfig {
    /// Address to listen on
    #[serde(alias = "in")]
    pub in_addr: String,
    /// Address to forward to
    #[serde(alias = "out")]
    pub out_addr: String,
}

impl PairConfig {
    /// Create a pair from address text
    pub fn new(in_addr: impl Into<String>, out_addr: impl Into<String>) -> Self {
        Self {
            in_addr: in_addr.into(),
            out_addr: out_addr.into(),
        }
    }
}

/// Proxy configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProxyConfig {
    /// Log level (error, warn, info, debug, trace); unset means `info`
    pub log_level: Option<String>,
    /// Forwarding pairs, in the order their listeners are opened
    pub pairs: Vec<PairConfig>,
}

impl ProxyConfig {
    /// Merge another configuration into this one
    ///
    /// Pairs from `other` are appended. Its log level wins whenever it is set.
    pub fn merge(mut self, other: ProxyConfig) -> Self {
        if other.log_level.is_some() {
            self.log_level = other.log_level;
        }
        self.pairs.extend(other.pairs);
        self
    }

    /// Log level to initialize the logger with
    ///
    /// Unset and unknown levels fall back to the default.
    pub fn effective_log_level(&self) -> &str {
        match self.log_level.as_deref() {
            Some(level) if defaults::LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) => level,
            _ => defaults::LOG_LEVEL_STR,
        }
    }

    /// Validate the configuration and return the resolved forwarding pairs
    ///
    /// # Errors
    ///
    /// Fails if no pair is configured, an address does not resolve, or a pair
    /// would forward to its own listen address.
    pub fn validate(&self) -> Result<Vec<ForwardingPair>> {
        if let Some(level) = &self.log_level {
            if self.effective_log_level() != level {
                warn!("Invalid log level: {}. Using default: {}", level, defaults::LOG_LEVEL_STR);
            }
        }

        self.forwarding_pairs()
    }

    /// Resolve every configured pair
    pub fn forwarding_pairs(&self) -> Result<Vec<ForwardingPair>> {
        if self.pairs.is_empty() {
            return Err(ProxyError::Config(format!(
                "No forwarding pairs configured; set {} and {} or provide a configuration file",
                ENV_IN_ADDR, ENV_OUT_ADDR
            )));
        }

        self.pairs
            .iter()
            .map(|pair| {
                let resolved = ForwardingPair::parse(&pair.in_addr, &pair.out_addr)?;
                if resolved.inbound == resolved.outbound {
                    return Err(ProxyError::Config(format!(
                        "Pair {} forwards to its own listen address",
                        resolved
                    )));
                }
                Ok(resolved)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::Endpoint;

    #[test]
    fn test_merge_appends_pairs() {
        let base = ProxyConfig {
            log_level: Some("debug".to_string()),
            pairs: vec![PairConfig::new("127.0.0.1:1", "3:1")],
        };
        let other = ProxyConfig {
            log_level: None,
            pairs: vec![PairConfig::new("127.0.0.1:2", "3:2")],
        };

        let merged = base.merge(other);
        assert_eq!(merged.log_level.as_deref(), Some("debug"));
        assert_eq!(merged.pairs.len(), 2);
        assert_eq!(merged.pairs[1].in_addr, "127.0.0.1:2");
    }

    #[test]
    fn test_merge_explicit_default_level_wins() {
        let base = ProxyConfig {
            log_level: Some("debug".to_string()),
            ..ProxyConfig::default()
        };
        let other = ProxyConfig {
            log_level: Some("info".to_string()),
            ..ProxyConfig::default()
        };

        assert_eq!(base.merge(other).log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_effective_log_level() {
        let mut config = ProxyConfig::default();
        assert_eq!(config.effective_log_level(), "info");

        config.log_level = Some("TRACE".to_string());
        assert_eq!(config.effective_log_level(), "TRACE");

        config.log_level = Some("loud".to_string());
        assert_eq!(config.effective_log_level(), "info");
    }

    #[test]
    fn test_forwarding_pairs() {
        let config = ProxyConfig {
            pairs: vec![
                PairConfig::new("127.0.0.1:8080", "3:8080"),
                PairConfig::new("3:9000", "127.0.0.1:9000"),
            ],
            ..ProxyConfig::default()
        };

        let pairs = config.forwarding_pairs().unwrap();
        assert_eq!(pairs[0].outbound, Endpoint::vsock(3, 8080));
        assert_eq!(pairs[1].inbound, Endpoint::vsock(3, 9000));

        // Validation hands back the same resolved pairs.
        assert_eq!(config.validate().unwrap(), pairs);
    }

    #[test]
    fn test_validate_rejects_empty_and_loops() {
        assert!(matches!(ProxyConfig::default().validate(), Err(ProxyError::Config(_))));

        let config = ProxyConfig {
            pairs: vec![PairConfig::new("3:80", "3:80")],
            ..ProxyConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProxyError::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_address() {
        let config = ProxyConfig {
            pairs: vec![PairConfig::new("127.0.0.1:80", "3:eighty")],
            ..ProxyConfig::default()
        };
        assert!(matches!(config.validate(), Err(ProxyError::InvalidAddress { .. })));
    }
}
