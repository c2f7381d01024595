//! Configuration loading functionality
//!
//! Loading from a JSON file and from command-line/environment values.

use std::fs;
use std::path::Path;

use crate::common::{ProxyError, Result};
use super::{PairConfig, ProxyConfig};

impl ProxyConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_display = path.display();

        let content = fs::read_to_string(path)
            .map_err(|e| ProxyError::Config(format!("Failed to read config file {}: {}", path_display, e)))?;

        serde_json::from_str(&content)
            .map_err(|e| ProxyError::Config(format!("Failed to parse JSON config file {}: {}", path_display, e)))
    }

    /// Create configuration from command line arguments
    ///
    /// `in_addr` and `out_addr` must be given together; giving neither yields
    /// a configuration without pairs. A `log_level` given here overrides the
    /// level of any configuration it is merged into, even when it is `info`.
    pub fn from_args(in_addr: Option<&str>, out_addr: Option<&str>, log_level: Option<&str>) -> Result<Self> {
        let pairs = match (in_addr, out_addr) {
            (Some(in_addr), Some(out_addr)) => vec![PairConfig::new(in_addr, out_addr)],
            (None, None) => Vec::new(),
            (Some(_), None) => {
                return Err(ProxyError::Config("Inbound address given without an outbound address".to_string()));
            }
            (None, Some(_)) => {
                return Err(ProxyError::Config("Outbound address given without an inbound address".to_string()));
            }
        };

        Ok(Self {
            log_level: log_level.map(str::to_string),
            pairs,
        })
    }
}
