//! Protocol engine entry point.

use futures_util::future::BoxFuture;

use crate::error::EngineError;
use crate::events::{ConnectionInfo, EventBus};
use crate::net::BoxedTransport;

/// What an engine learns about the connection it is handed.
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub info: ConnectionInfo,
    pub events: EventBus,
}

/// A protocol state machine that owns a connection once handed to it.
///
/// `serve` resolves when the connection closes. Request events are published
/// on `ctx.events` as they arrive.
pub trait Engine: Send + Sync + 'static {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    fn serve(&self, io: BoxedTransport, ctx: ConnectionContext) -> BoxFuture<'static, Result<(), EngineError>>;
}
