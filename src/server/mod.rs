//! Server lifecycle.
//!
//! # Data Flow
//! ```text
//! ServerOptions
//!     → options.rs (mode selection, policy freeze)
//!     → net::tls (rustls acceptor, TLS mode only)
//!     → Server (Constructing)
//!
//! listen(addr):
//!     → net::listener (bounded accept)
//!     → accept.rs (one task per connection:
//!         handshake → decide → dispatch → engine)
//!     → Server (Listening)
//!
//! close():
//!     → lifecycle::Shutdown → accept loop exits → Close event → Closed
//! ```
//!
//! # Design Decisions
//! - The server holds its engines and acceptor; a single accept handler
//!   performs negotiation and dispatch
//! - Per-connection failures become `Error` events; the listener keeps going
//! - `Closed` is terminal, there is no reopen

mod accept;
pub mod options;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use axum::Router;
use tokio::sync::{broadcast, watch};
use tokio_rustls::TlsAcceptor;
use tracing::instrument::WithSubscriber;
use tracing::Instrument;

use crate::dispatch::{Dispatcher, Engine};
use crate::error::{ConfigurationError, ServerError};
use crate::events::{EventBus, ServerEvent};
use crate::http::HttpEngine;
use crate::lifecycle::Shutdown;
use crate::net::{build_tls_acceptor, Listener};

pub use options::{ServerConfig, ServerMode, ServerOptions};

/// Lifecycle states. `Closed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerState {
    Constructing,
    Listening,
    Closing,
    Closed,
}

/// HTTP/2 server negotiating the protocol per connection.
///
/// Cheap to clone; clones share the same listener and event stream.
#[derive(Clone)]
pub struct Server {
    inner: Arc<Inner>,
}

pub(crate) struct Inner {
    config: ServerConfig,
    acceptor: Option<TlsAcceptor>,
    dispatcher: Dispatcher,
    events: EventBus,
    shutdown: Shutdown,
    state: watch::Sender<ServerState>,
    started: AtomicBool,
    local_addr: OnceLock<SocketAddr>,
}

impl Server {
    /// Build a server whose engines route requests into `router`.
    pub fn new(options: ServerOptions, router: Router) -> Result<Self, ConfigurationError> {
        let multiplexed = HttpEngine::h2(router.clone()).with_http2_settings(options.http2.clone());
        Self::with_engines(options, Arc::new(multiplexed), Arc::new(HttpEngine::http1(router)))
    }

    /// Build a server around caller-supplied engines.
    pub fn with_engines(
        options: ServerOptions,
        multiplexed: Arc<dyn Engine>,
        legacy: Arc<dyn Engine>,
    ) -> Result<Self, ConfigurationError> {
        let (config, material) = options.freeze()?;

        let acceptor = tracing::dispatcher::with_default(config.log(), || {
            match (config.mode(), material, config.tls_policy()) {
                (ServerMode::Tls, Some(material), Some(policy)) => {
                    tracing::info!(
                        protocols = ?policy.protocols,
                        honor_cipher_order = policy.honor_cipher_order,
                        "Creating HTTP/2 server over TLS"
                    );
                    build_tls_acceptor(&material, policy).map(Some)
                }
                _ => {
                    tracing::info!("Creating HTTP/2 server over plain TCP");
                    Ok(None)
                }
            }
        })?;

        let (state, _) = watch::channel(ServerState::Constructing);
        let events = EventBus::new(config.event_capacity());

        Ok(Self {
            inner: Arc::new(Inner {
                config,
                acceptor,
                dispatcher: Dispatcher::new(multiplexed, legacy),
                events,
                shutdown: Shutdown::new(),
                state,
                started: AtomicBool::new(false),
                local_addr: OnceLock::new(),
            }),
        })
    }

    /// Subscribe to request, error and close events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.inner.events.subscribe()
    }

    pub fn mode(&self) -> ServerMode {
        self.inner.config.mode()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    pub fn state(&self) -> ServerState {
        *self.inner.state.borrow()
    }

    /// Bound address, once listening.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.local_addr.get().copied()
    }

    /// Bind `addr` and start accepting connections in the background.
    ///
    /// Returns the bound address (useful with port 0).
    pub async fn listen(&self, addr: SocketAddr) -> Result<SocketAddr, ServerError> {
        let inner = &self.inner;
        if inner.started.swap(true, Ordering::SeqCst) {
            return Err(match self.state() {
                ServerState::Closing | ServerState::Closed => ServerError::Closed,
                _ => ServerError::AlreadyListening,
            });
        }
        if inner.shutdown.is_triggered() {
            return Err(ServerError::Closed);
        }

        // Subscribe before publishing `Listening` so a racing close() is seen.
        let shutdown_rx = inner.shutdown.subscribe();

        let listener = Listener::bind(addr, inner.config.max_connections())
            .with_subscriber(inner.config.log().clone())
            .await
            .inspect_err(|_| inner.started.store(false, Ordering::SeqCst))?;
        let local_addr = listener.local_addr().map_err(ServerError::LocalAddr)?;

        let listening = inner.state.send_if_modified(|state| {
            if *state == ServerState::Constructing {
                *state = ServerState::Listening;
                true
            } else {
                false
            }
        });
        if !listening {
            return Err(ServerError::Closed);
        }
        let _ = inner.local_addr.set(local_addr);

        let span = tracing::info_span!("server", component = "http", mode = %self.mode(), address = %local_addr);
        tokio::spawn(
            accept::accept_loop(Arc::clone(inner), listener, shutdown_rx)
                .instrument(span)
                .with_subscriber(inner.config.log().clone()),
        );

        Ok(local_addr)
    }

    /// Stop accepting connections. Idempotent; `Close` is published once.
    ///
    /// Connections already handed to an engine are left to finish.
    pub fn close(&self) {
        let inner = &self.inner;
        if !inner.shutdown.trigger() {
            return;
        }

        let mut closed_now = false;
        inner.state.send_if_modified(|state| match *state {
            ServerState::Constructing => {
                *state = ServerState::Closed;
                closed_now = true;
                true
            }
            ServerState::Listening => {
                *state = ServerState::Closing;
                true
            }
            ServerState::Closing | ServerState::Closed => false,
        });

        if closed_now {
            inner.mark_closed();
        }
    }

    /// Wait until the server reaches `Closed`.
    pub async fn closed(&self) {
        let mut rx = self.inner.state.subscribe();
        let _ = rx.wait_for(|state| *state == ServerState::Closed).await;
    }
}

impl Inner {
    /// Publish `Close` after the listener is gone.
    fn mark_closed(&self) {
        self.state.send_replace(ServerState::Closed);
        tracing::dispatcher::with_default(self.config.log(), || tracing::info!("Server closed"));
        self.events.emit(ServerEvent::Close);
    }
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("mode", &self.mode())
            .field("state", &self.state())
            .field("local_addr", &self.local_addr())
            .finish()
    }
}

/// Create a TLS server. Fails unless TLS material is supplied.
pub fn create_server(mut options: ServerOptions, router: Router) -> Result<Server, ConfigurationError> {
    if options.tls.is_none() {
        return Err(ConfigurationError::TlsMaterialRequired);
    }
    options.plain = false;
    Server::new(options, router)
}
