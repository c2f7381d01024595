//! Data forwarding module
//!
//! This module relays bytes between an accepted inbound connection and the
//! outbound connection dialed for it.
//!
//! Each direction runs as its own task. Whichever direction finishes first
//! shuts down its write side and raises the relay's close flag, which stops the
//! other direction even if it is blocked waiting for a silent peer. The relay
//! returns once both tasks are gone, at which point every half of both
//! connections has been dropped and the sockets are closed.

use std::sync::Arc;

use log::debug;
use tokio::io::{self, AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::common::{EventSink, ProxyEvent};
use crate::transport::{Connection, Endpoint};

/// Bidirectional relay between two established connections
pub struct Relay {
    inbound: Connection,
    outbound: Connection,
    sink: Arc<dyn EventSink>,
}

impl Relay {
    /// Create a relay for an accepted connection and its dialed counterpart
    pub fn new(inbound: Connection, outbound: Connection, sink: Arc<dyn EventSink>) -> Self {
        Self {
            inbound,
            outbound,
            sink,
        }
    }

    /// Forward data in both directions until either side ends
    ///
    /// Returns after both directions have stopped and both connections are closed.
    pub async fn run(self) {
        let Relay { inbound, outbound, sink } = self;
        let inbound_peer = *inbound.peer();
        let outbound_peer = *outbound.peer();

        let (inbound_reader, inbound_writer) = io::split(inbound);
        let (outbound_reader, outbound_writer) = io::split(outbound);

        // Receivers are created before either task starts so neither can miss the flag.
        let (close_tx, close_rx) = watch::channel(false);
        let close_tx = Arc::new(close_tx);

        let mut copies = JoinSet::new();
        copies.spawn(copy_half(
            inbound_reader,
            outbound_writer,
            inbound_peer,
            outbound_peer,
            Arc::clone(&close_tx),
            close_rx.clone(),
            Arc::clone(&sink),
        ));
        copies.spawn(copy_half(
            outbound_reader,
            inbound_writer,
            outbound_peer,
            inbound_peer,
            close_tx,
            close_rx,
            Arc::clone(&sink),
        ));

        while let Some(result) = copies.join_next().await {
            if let Err(e) = result {
                sink.emit(ProxyEvent::TaskFailed {
                    task: "copy",
                    addr: inbound_peer,
                    error: e.to_string(),
                });
            }
        }

        sink.emit(ProxyEvent::Closed {
            inbound: inbound_peer,
            outbound: outbound_peer,
        });
    }
}

/// Forward data between two connections
///
/// # Parameters
///
/// * `inbound` - Connection accepted on the listener
/// * `outbound` - Connection dialed to the forwarding target
/// * `sink` - Where copy errors and the closing summary are reported
pub async fn relay(inbound: Connection, outbound: Connection, sink: Arc<dyn EventSink>) {
    Relay::new(inbound, outbound, sink).run().await
}

/// Copy one direction, then shut the relay down
async fn copy_half<R, W>(
    mut reader: R,
    mut writer: W,
    from: Endpoint,
    to: Endpoint,
    close_tx: Arc<watch::Sender<bool>>,
    mut close_rx: watch::Receiver<bool>,
    sink: Arc<dyn EventSink>,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let outcome = tokio::select! {
        result = io::copy(&mut reader, &mut writer) => Some(result),
        _ = close_rx.changed() => None,
    };

    let closed_by_relay = *close_rx.borrow();

    match outcome {
        Some(Ok(bytes)) => {
            debug!("{} -> {} reached end of stream after {} bytes", from, to, bytes);
        }
        // The other direction already tore the relay down; this error is our own doing.
        Some(Err(e)) if closed_by_relay => {
            debug!("{} -> {} stopped after relay close: {}", from, to, e);
        }
        Some(Err(e)) => {
            sink.emit(ProxyEvent::CopyFailed {
                from,
                to,
                error: e.to_string(),
            });
        }
        None => {
            debug!("{} -> {} stopped, other direction closed", from, to);
        }
    }

    if let Err(e) = writer.shutdown().await {
        debug!("Shutdown of write side towards {} failed: {}", to, e);
    }
    close_tx.send_replace(true);
}
