//! hyper-backed protocol engines.
//!
//! # Responsibilities
//! - Serve an owned connection as HTTP/2 or HTTP/1.x
//! - Publish a `Request` event for every inbound request
//! - Hand each request, tagged with its [`ConnectionInfo`], to the router

use axum::Router;
use futures_util::future::BoxFuture;
use hyper::body::Incoming;
use hyper::server::conn::{http1, http2};
use hyper::service::service_fn;
use hyper::Request;
use hyper_util::rt::{TokioExecutor, TokioIo};
use tower::ServiceExt;

use crate::dispatch::{ConnectionContext, Engine};
use crate::error::EngineError;
use crate::events::{RequestEvent, ServerEvent};
use crate::http::Http2Settings;
use crate::negotiation::NegotiationOutcome;
use crate::net::BoxedTransport;

/// Serves connections with hyper, routing requests into an axum [`Router`].
#[derive(Clone)]
pub struct HttpEngine {
    protocol: NegotiationOutcome,
    router: Router,
    http2: Http2Settings,
}

impl HttpEngine {
    /// HTTP/2 engine (prior knowledge, no upgrade).
    pub fn h2(router: Router) -> Self {
        Self {
            protocol: NegotiationOutcome::Multiplexed,
            router,
            http2: Http2Settings::default(),
        }
    }

    /// HTTP/1.0 and HTTP/1.1 engine.
    pub fn http1(router: Router) -> Self {
        Self {
            protocol: NegotiationOutcome::Legacy,
            router,
            http2: Http2Settings::default(),
        }
    }

    /// SETTINGS advertised on HTTP/2 connections. No effect on the HTTP/1.x engine.
    pub fn with_http2_settings(mut self, settings: Http2Settings) -> Self {
        self.http2 = settings;
        self
    }
}

impl Engine for HttpEngine {
    fn name(&self) -> &'static str {
        match self.protocol {
            NegotiationOutcome::Multiplexed => "hyper-h2",
            NegotiationOutcome::Legacy => "hyper-http1",
        }
    }

    fn serve(&self, io: BoxedTransport, ctx: ConnectionContext) -> BoxFuture<'static, Result<(), EngineError>> {
        let router = self.router.clone();
        let protocol = self.protocol;
        let settings = self.http2.clone();

        Box::pin(async move {
            let info = ctx.info;
            let events = ctx.events;
            let service = service_fn(move |mut request: Request<Incoming>| {
                events.emit(ServerEvent::Request(RequestEvent::new(&info, &request)));
                request.extensions_mut().insert(info);
                router.clone().oneshot(request)
            });

            let io = TokioIo::new(io);
            match protocol {
                NegotiationOutcome::Multiplexed => {
                    let mut builder = http2::Builder::new(TokioExecutor::new());
                    settings.apply(&mut builder);
                    builder.serve_connection(io, service).await?
                }
                NegotiationOutcome::Legacy => {
                    http1::Builder::new()
                        .serve_connection(io, service)
                        .await?
                }
            }

            tracing::trace!(connection_id = %info.connection_id, "Engine finished connection");
            Ok(())
        })
    }
}
