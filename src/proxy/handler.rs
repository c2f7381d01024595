//! Accept loop
//!
//! One accept loop runs per forwarding pair. It accepts inbound connections,
//! dials the outbound address for each, and hands the pair to a relay task.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::common::{EventSink, ProxyEvent};
use crate::transport::{Connection, Endpoint, Listener};
use super::forwarder::Relay;

/// Pause after a failed accept so a listener stuck in an error state doesn't spin
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

/// Accept loop state for a single listener
pub(crate) struct AcceptLoop {
    /// Bound listener, owned for the lifetime of the loop
    listener: Listener,
    /// Address the listener is bound to
    local: Endpoint,
    /// Address dialed for every accepted connection
    outbound: Endpoint,
    sink: Arc<dyn EventSink>,
    /// Relay tasks spawned by this loop
    relays: JoinSet<()>,
}

impl AcceptLoop {
    pub(crate) fn new(
        listener: Listener,
        local: Endpoint,
        outbound: Endpoint,
        sink: Arc<dyn EventSink>,
    ) -> Self {
        Self {
            listener,
            local,
            outbound,
            sink,
            relays: JoinSet::new(),
        }
    }

    /// Accept connections forever
    ///
    /// Neither a failed accept nor a failed dial ends the loop.
    pub(crate) async fn run(mut self) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => {
                    match accepted {
                        Ok(inbound) => self.handle_connection(inbound).await,
                        Err(e) => {
                            self.sink.emit(ProxyEvent::AcceptFailed {
                                listener: self.local,
                                error: e.to_string(),
                            });
                            sleep(ACCEPT_ERROR_BACKOFF).await;
                        }
                    }
                }

                // Reap finished relays
                Some(result) = self.relays.join_next() => {
                    if let Err(e) = result {
                        self.sink.emit(ProxyEvent::TaskFailed {
                            task: "relay",
                            addr: self.local,
                            error: e.to_string(),
                        });
                    }
                }
            }
        }
    }

    /// Dial the outbound address for one accepted connection and start its relay
    async fn handle_connection(&mut self, inbound: Connection) {
        self.sink.emit(ProxyEvent::Accepted {
            listener: self.local,
            peer: *inbound.peer(),
        });

        match self.outbound.dial().await {
            Ok(outbound) => {
                let relay = Relay::new(inbound, outbound, Arc::clone(&self.sink));
                self.relays.spawn(relay.run());
                self.sink.emit(ProxyEvent::Dispatched {
                    inbound: self.local,
                    outbound: self.outbound,
                });
            }
            Err(e) => {
                drop(inbound);
                self.sink.emit(ProxyEvent::DialFailed {
                    target: self.outbound,
                    error: e.to_string(),
                });
            }
        }
    }
}
