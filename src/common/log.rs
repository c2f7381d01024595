//! Logging
//!
//! Process-wide logger setup plus the event sink the proxy engine reports
//! through. The engine never logs its runtime events directly: it hands a
//! [`ProxyEvent`] to whatever [`EventSink`] it was built with, and
//! [`LogSink`] is the sink that forwards those events to the `log` facade.

use std::fmt;
use std::sync::Mutex;

use log::Level;

use crate::transport::Endpoint;

/// Initialize the logging system
///
/// # Parameters
///
/// * `level` - Log level, used unless `RUST_LOG` is set
pub fn init_logger(level: &str) {
    let env = env_logger::Env::default()
        .filter_or("RUST_LOG", level);

    // A second initialization (tests, embedding) is harmless.
    let _ = env_logger::Builder::from_env(env).try_init();
}

/// Runtime event emitted by the proxy engine and its relays
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyEvent {
    /// A listener is bound and its accept loop is running
    Listening {
        addr: Endpoint,
    },
    /// An inbound connection was accepted
    Accepted {
        listener: Endpoint,
        peer: Endpoint,
    },
    /// The outbound dial failed; the inbound connection was closed
    DialFailed {
        target: Endpoint,
        error: String,
    },
    /// Accepting on a listener failed; the loop keeps going
    AcceptFailed {
        listener: Endpoint,
        error: String,
    },
    /// A relay was spawned for an inbound/outbound pair
    Dispatched {
        inbound: Endpoint,
        outbound: Endpoint,
    },
    /// Copying from one peer to the other failed
    CopyFailed {
        from: Endpoint,
        to: Endpoint,
        error: String,
    },
    /// Both connections of a relay are closed
    Closed {
        inbound: Endpoint,
        outbound: Endpoint,
    },
    /// A proxy task panicked or was cancelled
    TaskFailed {
        /// Kind of task: `accept`, `relay` or `copy`
        task: &'static str,
        /// Listener or connection the task served
        addr: Endpoint,
        error: String,
    },
}

impl ProxyEvent {
    /// Log level this event is reported at
    pub fn level(&self) -> Level {
        match self {
            Self::Listening { .. } | Self::Accepted { .. } | Self::Closed { .. } => Level::Info,
            Self::DialFailed { .. } | Self::CopyFailed { .. } => Level::Warn,
            Self::AcceptFailed { .. } | Self::TaskFailed { .. } => Level::Error,
            Self::Dispatched { .. } => Level::Debug,
        }
    }
}

impl fmt::Display for ProxyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Listening { addr } =>
                write!(f, "Listening for incoming connections on {}", addr),
            Self::Accepted { listener, peer } =>
                write!(f, "Accepted incoming connection from {} on {}", peer, listener),
            Self::DialFailed { target, error } =>
                write!(f, "Failed to establish forwarding connection to {}: {}", target, error),
            Self::AcceptFailed { listener, error } =>
                write!(f, "Failed to accept incoming connection on {}: {}", listener, error),
            Self::Dispatched { inbound, outbound } =>
                write!(f, "Dispatched forwarders for {} <-> {}", inbound, outbound),
            Self::CopyFailed { from, to, error } =>
                write!(f, "Error while forwarding from {} to {}: {}", from, to, error),
            Self::Closed { inbound, outbound } =>
                write!(f, "Closed connection tuple for {} <-> {}", inbound, outbound),
            Self::TaskFailed { task, addr, error } =>
                write!(f, "The {} task for {} failed: {}", task, addr, error),
        }
    }
}

/// Destination for proxy runtime events
///
/// Implementations must be cheap to call from many tasks at once.
pub trait EventSink: Send + Sync + 'static {
    /// Record one event
    fn emit(&self, event: ProxyEvent);
}

/// Sink that writes every event through the `log` facade
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: ProxyEvent) {
        log::log!(target: "viproxy", event.level(), "{}", event);
    }
}

/// Sink that keeps every event in memory
///
/// Useful for embedding the proxy where events are inspected programmatically,
/// and for tests.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<ProxyEvent>>,
}

impl MemorySink {
    /// Create an empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events recorded so far, oldest first
    pub fn events(&self) -> Vec<ProxyEvent> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: ProxyEvent) {
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }
}
