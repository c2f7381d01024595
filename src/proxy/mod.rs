//! Proxy service module
//!
//! This module implements the core of the proxy: forwarding pairs, the engine
//! that listens for each pair, and the relay that moves bytes between an
//! accepted connection and its outbound counterpart.

mod forwarder;
mod handler;
mod pair;
pub mod server;

pub use forwarder::{relay, Relay};
pub use pair::ForwardingPair;
pub use server::Proxy;
