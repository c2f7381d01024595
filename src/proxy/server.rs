//! Proxy server module
//!
//! This module implements the proxy engine: it opens one listener per
//! forwarding pair and runs an accept loop for each of them.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::{self, JoinSet};

use crate::common::{EventSink, LogSink, ProxyError, ProxyEvent, Result};
use crate::transport::Endpoint;
use super::handler::AcceptLoop;
use super::pair::ForwardingPair;

/// Proxy engine
///
/// Owns the forwarding pairs and the accept loop task of every listener it
/// opened. Each accept loop in turn owns the relay tasks it spawned, so
/// dropping the `Proxy` aborts all of them.
pub struct Proxy {
    /// Configured routes, in the order listeners are opened
    pairs: Vec<ForwardingPair>,
    /// Where runtime events go
    sink: Arc<dyn EventSink>,
    /// Addresses listeners are actually bound to
    listening: Vec<Endpoint>,
    /// One task per bound listener
    accept_loops: JoinSet<()>,
    /// Listener address served by each accept loop task
    loop_addrs: HashMap<task::Id, Endpoint>,
}

impl Proxy {
    /// Create a new proxy instance
    ///
    /// # Parameters
    ///
    /// * `pairs` - Forwarding pairs; duplicates are allowed and handled independently
    /// * `sink` - Receiver of runtime events
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use viproxy::{ForwardingPair, LogSink, Proxy};
    /// # async fn run() -> viproxy::Result<()> {
    /// let pair = ForwardingPair::parse("127.0.0.1:8080", "3:8080")?;
    /// let mut proxy = Proxy::new(vec![pair], Arc::new(LogSink));
    /// proxy.start().await?;
    /// proxy.wait().await;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(pairs: Vec<ForwardingPair>, sink: Arc<dyn EventSink>) -> Self {
        Self {
            pairs,
            sink,
            listening: Vec::new(),
            accept_loops: JoinSet::new(),
            loop_addrs: HashMap::new(),
        }
    }

    /// Create a proxy that reports through the `log` facade
    pub fn with_log_sink(pairs: Vec<ForwardingPair>) -> Self {
        Self::new(pairs, Arc::new(LogSink))
    }

    /// Configured forwarding pairs
    pub fn pairs(&self) -> &[ForwardingPair] {
        &self.pairs
    }

    /// Start the proxy service
    ///
    /// Opens a listener for every pair, in order, and starts its accept loop.
    /// Returns once all listeners are set up. Call it once.
    ///
    /// # Errors
    ///
    /// Returns [`ProxyError::Bind`] for the first inbound address that cannot
    /// be listened on. Listeners opened before the failure stay open and keep
    /// accepting; pairs after it are not started.
    pub async fn start(&mut self) -> Result<()> {
        for pair in &self.pairs {
            let listener = pair.inbound.listen().await.map_err(|source| ProxyError::Bind {
                addr: pair.inbound,
                source,
            })?;
            let local = listener.local_addr().unwrap_or(pair.inbound);

            self.sink.emit(ProxyEvent::Listening { addr: local });
            self.listening.push(local);

            let accept_loop = AcceptLoop::new(listener, local, pair.outbound, Arc::clone(&self.sink));
            let handle = self.accept_loops.spawn(accept_loop.run());
            self.loop_addrs.insert(handle.id(), local);
        }

        Ok(())
    }

    /// Addresses of the listeners opened so far
    ///
    /// A TCP address bound with port 0 is reported with the port actually assigned.
    pub fn listen_addrs(&self) -> &[Endpoint] {
        &self.listening
    }

    /// Wait until every accept loop has ended
    ///
    /// Accept loops do not end on their own, so this only returns if one
    /// panics or nothing was started.
    pub async fn wait(&mut self) {
        while let Some(result) = self.accept_loops.join_next().await {
            if let Err(e) = result {
                if let Some(addr) = self.loop_addrs.remove(&e.id()) {
                    self.sink.emit(ProxyEvent::TaskFailed {
                        task: "accept",
                        addr,
                        error: e.to_string(),
                    });
                }
            }
        }
    }
}

impl std::fmt::Debug for Proxy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Proxy")
            .field("pairs", &self.pairs)
            .field("listening", &self.listening)
            .finish()
    }
}
