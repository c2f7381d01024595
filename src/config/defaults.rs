//! Default configuration values
//!
//! Single source of truth for defaults and the environment variable names
//! the command-line tool reads.

/// Environment variable holding the inbound (listen) address
pub const ENV_IN_ADDR: &str = "IN_ADDR";

/// Environment variable holding the outbound (dial) address
pub const ENV_OUT_ADDR: &str = "OUT_ADDR";

/// Environment variable holding the configuration file path
pub const ENV_CONFIG_FILE: &str = "VIPROXY_CONFIG";

/// Environment variable holding the log level
pub const ENV_LOG_LEVEL: &str = "VIPROXY_LOG_LEVEL";

/// Default log level as string
pub const LOG_LEVEL_STR: &str = "info";

/// Log levels accepted by the logger
pub const LOG_LEVELS: [&str; 6] = ["off", "error", "warn", "info", "debug", "trace"];
