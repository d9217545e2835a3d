//! Hands a negotiated connection to exactly one engine.

use std::sync::Arc;

use futures_util::future::BoxFuture;

use crate::dispatch::engine::{ConnectionContext, Engine};
use crate::error::{DispatchError, EngineError};
use crate::negotiation::NegotiationOutcome;
use crate::net::Transport;

/// Engine future returned by a successful dispatch.
pub type Served = BoxFuture<'static, Result<(), EngineError>>;

/// Routes sockets to the HTTP/2 or the HTTP/1.x engine.
#[derive(Clone)]
pub struct Dispatcher {
    multiplexed: Arc<dyn Engine>,
    legacy: Arc<dyn Engine>,
}

impl Dispatcher {
    pub fn new(multiplexed: Arc<dyn Engine>, legacy: Arc<dyn Engine>) -> Self {
        Self { multiplexed, legacy }
    }

    /// The engine responsible for `outcome`.
    pub fn engine_for(&self, outcome: NegotiationOutcome) -> &Arc<dyn Engine> {
        match outcome {
            NegotiationOutcome::Multiplexed => &self.multiplexed,
            NegotiationOutcome::Legacy => &self.legacy,
        }
    }

    /// Transfer `io` to the engine selected by `outcome`.
    ///
    /// Returns the engine's connection future; the caller drives it. If the
    /// socket is already closed or errored, no engine is invoked and the
    /// socket is dropped.
    pub fn dispatch<T: Transport>(
        &self,
        io: T,
        outcome: NegotiationOutcome,
        ctx: ConnectionContext,
    ) -> Result<Served, DispatchError> {
        io.check().map_err(DispatchError::SocketUnusable)?;

        let engine = self.engine_for(outcome);
        tracing::debug!(
            connection_id = %ctx.info.connection_id,
            engine = engine.name(),
            outcome = %outcome,
            "Dispatching connection"
        );
        Ok(engine.serve(Box::new(io), ctx))
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("multiplexed", &self.multiplexed.name())
            .field("legacy", &self.legacy.name())
            .finish()
    }
}
