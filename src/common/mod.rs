//! Common module
//!
//! This module contains the error type and the logging plumbing shared by the rest of the crate.

pub mod error;
pub mod log;

// Re-export commonly used types and functions
pub use self::error::{ProxyError, Result};
pub use self::log::{init_logger, EventSink, LogSink, MemorySink, ProxyEvent};
