//! Server events re-exposed to subscribers.
//!
//! Both engines publish into the same [`EventBus`], so subscribers see one
//! stream of `Request` events regardless of the protocol a connection speaks.

use std::net::SocketAddr;
use std::sync::Arc;

use hyper::{Method, Request, Uri, Version};
use tokio::sync::broadcast;

use crate::error::ConnectionError;
use crate::negotiation::NegotiationOutcome;
use crate::net::ConnectionId;

/// Default number of events buffered per subscriber before it lags.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Notifications published by a server.
#[derive(Debug, Clone)]
pub enum ServerEvent {
    /// An engine received a request.
    Request(RequestEvent),
    /// A single connection failed; the listener keeps running.
    Error(Arc<ConnectionError>),
    /// The listener closed. Published exactly once.
    Close,
}

/// Summary of an inbound request, identical for both engines.
#[derive(Debug, Clone)]
pub struct RequestEvent {
    pub connection_id: ConnectionId,
    pub peer_addr: SocketAddr,
    pub outcome: NegotiationOutcome,
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
}

impl RequestEvent {
    pub fn new<B>(info: &ConnectionInfo, request: &Request<B>) -> Self {
        Self {
            connection_id: info.connection_id,
            peer_addr: info.peer_addr,
            outcome: info.outcome,
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
        }
    }
}

/// Per-connection facts, also attached to every request as an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionInfo {
    pub connection_id: ConnectionId,
    pub peer_addr: SocketAddr,
    pub outcome: NegotiationOutcome,
}

/// Broadcast channel carrying [`ServerEvent`]s.
#[derive(Debug, Clone)]
pub struct EventBus {
    tx: broadcast::Sender<ServerEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.tx.subscribe()
    }

    /// Publish an event. Having no subscribers is not an error.
    pub fn emit(&self, event: ServerEvent) {
        let _ = self.tx.send(event);
    }

    pub fn emit_error(&self, error: ConnectionError) {
        tracing::warn!(connection_id = %error.connection_id(), error = %error, "Connection error");
        self.emit(ServerEvent::Error(Arc::new(error)));
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}
