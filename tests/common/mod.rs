//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{routing::get, Extension, Router};
use h2_alpn_server::dispatch::{ConnectionContext, Engine, Served};
use h2_alpn_server::net::BoxedTransport;
use h2_alpn_server::{ConnectionInfo, NegotiationOutcome, ServerEvent, TlsMaterial};
use http_body_util::{BodyExt, Empty};
use hyper::body::Bytes;
use hyper::{header, Request, StatusCode, Version};
use hyper_util::rt::{TokioExecutor, TokioIo};
use rustls::pki_types::{CertificateDer, ServerName};
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio_rustls::client::TlsStream;
use tokio_rustls::TlsConnector;

pub const LOCALHOST: &str = "127.0.0.1:0";

/// Self-signed certificate for "localhost".
pub struct TestCert {
    pub cert_pem: String,
    pub key_pem: String,
    pub der: CertificateDer<'static>,
}

impl TestCert {
    pub fn generate() -> Self {
        let certified = rcgen::generate_simple_self_signed(vec!["localhost".to_string()]).unwrap();
        Self {
            cert_pem: certified.cert.pem(),
            key_pem: certified.key_pair.serialize_pem(),
            der: certified.cert.der().clone(),
        }
    }

    pub fn material(&self) -> TlsMaterial {
        TlsMaterial::Pem {
            cert: self.cert_pem.clone().into_bytes(),
            key: self.key_pem.clone().into_bytes(),
        }
    }
}

/// Router answering `/` with the protocol that served the request.
pub fn protocol_router() -> Router {
    Router::new().route(
        "/",
        get(|Extension(info): Extension<ConnectionInfo>| async move { info.outcome.as_str() }),
    )
}

pub fn addr() -> SocketAddr {
    LOCALHOST.parse().unwrap()
}

/// TLS client offering `alpn` (nothing at all when empty).
pub async fn connect_tls(addr: SocketAddr, cert: &TestCert, alpn: &[&str]) -> std::io::Result<TlsStream<TcpStream>> {
    let mut roots = rustls::RootCertStore::empty();
    roots.add(cert.der.clone()).unwrap();

    let mut config = rustls::ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(roots)
        .with_no_client_auth();
    config.alpn_protocols = alpn.iter().map(|p| p.as_bytes().to_vec()).collect();

    let tcp = TcpStream::connect(addr).await?;
    TlsConnector::from(Arc::new(config))
        .connect(ServerName::try_from("localhost").unwrap(), tcp)
        .await
}

/// ALPN identifier the client ended up with.
pub fn negotiated(stream: &TlsStream<TcpStream>) -> Option<String> {
    stream
        .get_ref()
        .1
        .alpn_protocol()
        .map(|p| String::from_utf8_lossy(p).into_owned())
}

/// GET `/` over HTTP/2.
pub async fn h2_get<I>(io: I) -> (StatusCode, Version, String)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http2::handshake(TokioExecutor::new(), TokioIo::new(io))
        .await
        .unwrap();
    tokio::spawn(conn);

    let request = Request::get("https://localhost/").body(Empty::<Bytes>::new()).unwrap();
    let response = sender.send_request(request).await.unwrap();
    read_response(response).await
}

/// GET `/` over HTTP/1.1.
pub async fn http1_get<I>(io: I) -> (StatusCode, Version, String)
where
    I: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(io)).await.unwrap();
    tokio::spawn(conn);

    let request = Request::get("/")
        .header(header::HOST, "localhost")
        .body(Empty::<Bytes>::new())
        .unwrap();
    let response = sender.send_request(request).await.unwrap();
    read_response(response).await
}

async fn read_response(response: hyper::Response<hyper::body::Incoming>) -> (StatusCode, Version, String) {
    let status = response.status();
    let version = response.version();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, version, String::from_utf8(body.to_vec()).unwrap())
}

/// Next event, failing the test if none arrives within 5 seconds.
pub async fn next_event(rx: &mut broadcast::Receiver<ServerEvent>) -> ServerEvent {
    tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for a server event")
        .expect("event channel closed")
}

/// Engine that only records which connections it was handed.
pub struct CountingEngine {
    name: &'static str,
    calls: AtomicUsize,
    seen: Mutex<Vec<(u64, NegotiationOutcome)>>,
}

impl CountingEngine {
    pub fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn connection_ids(&self) -> Vec<u64> {
        self.seen.lock().unwrap().iter().map(|(id, _)| *id).collect()
    }

    pub fn outcomes(&self) -> Vec<NegotiationOutcome> {
        self.seen.lock().unwrap().iter().map(|(_, outcome)| *outcome).collect()
    }
}

impl Engine for CountingEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn serve(&self, _io: BoxedTransport, ctx: ConnectionContext) -> Served {
        self.seen
            .lock()
            .unwrap()
            .push((ctx.info.connection_id.as_u64(), ctx.info.outcome));
        self.calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async { Ok(()) })
    }
}

/// Poll `condition` until it holds, failing after 5 seconds.
pub async fn eventually<F: Fn() -> bool>(condition: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(tokio::time::Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
