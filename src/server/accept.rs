//! Accept loop and per-connection handling.
//!
//! Each accepted socket gets its own task: TLS handshake (TLS mode only),
//! negotiation decision, dispatch, then the engine drives the connection.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tracing::instrument::WithSubscriber;
use tracing::Instrument;

use crate::dispatch::ConnectionContext;
use crate::error::ConnectionError;
use crate::events::ConnectionInfo;
use crate::negotiation::{decide_alpn, NegotiationOutcome};
use crate::net::{ConnectionId, ConnectionPermit, Listener, ListenerError, Transport};
use crate::server::Inner;

/// Pause after a failed accept (e.g. EMFILE) before trying again.
const ACCEPT_ERROR_BACKOFF: Duration = Duration::from_millis(50);

pub(crate) async fn accept_loop(
    inner: Arc<Inner>,
    listener: Listener,
    mut shutdown: broadcast::Receiver<()>,
) {
    tracing::info!("Accepting connections");

    loop {
        tokio::select! {
            biased;
            _ = shutdown.recv() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, peer_addr, permit)) => {
                    let connection_id = ConnectionId::new();
                    let span = tracing::info_span!(
                        "connection",
                        connection_id = %connection_id,
                        peer_addr = %peer_addr,
                    );
                    tokio::spawn(
                        handle_connection(Arc::clone(&inner), stream, peer_addr, connection_id, permit)
                            .instrument(span)
                            .with_subscriber(inner.config.log().clone()),
                    );
                }
                Err(ListenerError::LimitClosed) => break,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_ERROR_BACKOFF).await;
                }
            },
        }
    }

    drop(listener);
    inner.mark_closed();
}

async fn handle_connection(
    inner: Arc<Inner>,
    stream: TcpStream,
    peer_addr: SocketAddr,
    connection_id: ConnectionId,
    _permit: ConnectionPermit,
) {
    let Some(acceptor) = inner.acceptor.clone() else {
        // Plain TCP: nothing to negotiate, HTTP/2 with prior knowledge.
        route(&inner, stream, NegotiationOutcome::Multiplexed, connection_id, peer_addr).await;
        return;
    };

    let handshake = tokio::time::timeout(inner.config.handshake_timeout(), acceptor.accept(stream)).await;
    let tls = match handshake {
        Ok(Ok(tls)) => tls,
        Ok(Err(source)) => {
            inner.events.emit_error(ConnectionError::Handshake {
                connection_id,
                peer_addr,
                source,
            });
            return;
        }
        Err(_) => {
            inner.events.emit_error(ConnectionError::HandshakeTimeout {
                connection_id,
                peer_addr,
            });
            return;
        }
    };

    let alpn = tls.get_ref().1.alpn_protocol();
    let outcome = decide_alpn(alpn);
    tracing::debug!(
        alpn = ?alpn.map(String::from_utf8_lossy),
        outcome = %outcome,
        "TLS handshake complete"
    );

    route(&inner, tls, outcome, connection_id, peer_addr).await;
}

/// Dispatch `io` and drive the chosen engine until the connection ends.
async fn route<T: Transport>(
    inner: &Inner,
    io: T,
    outcome: NegotiationOutcome,
    connection_id: ConnectionId,
    peer_addr: SocketAddr,
) {
    let ctx = ConnectionContext {
        info: ConnectionInfo {
            connection_id,
            peer_addr,
            outcome,
        },
        events: inner.events.clone(),
    };

    let served = match inner.dispatcher.dispatch(io, outcome, ctx) {
        Ok(served) => served,
        Err(source) => {
            inner.events.emit_error(ConnectionError::Dispatch {
                connection_id,
                peer_addr,
                source,
            });
            return;
        }
    };

    if let Err(source) = served.await {
        inner.events.emit_error(ConnectionError::Engine {
            connection_id,
            peer_addr,
            source,
        });
    }
}
