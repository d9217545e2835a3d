//! Every accepted connection reaches exactly one engine, exactly once.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::Notify;

use h2_alpn_server::dispatch::{ConnectionContext, Engine, Served};
use h2_alpn_server::net::BoxedTransport;
use h2_alpn_server::{ConnectionError, DispatchError, NegotiationOutcome, Server, ServerEvent, ServerOptions};

mod common;

use common::{connect_tls, eventually, next_event, CountingEngine, TestCert};

const CONNECTIONS: usize = 24;

#[tokio::test]
async fn test_plain_connections_dispatched_once_as_multiplexed() {
    let h2 = CountingEngine::new("h2");
    let h1 = CountingEngine::new("h1");
    let server = Server::with_engines(ServerOptions::plain(), h2.clone(), h1.clone()).unwrap();
    let addr = server.listen(common::addr()).await.unwrap();

    let mut clients = Vec::new();
    for _ in 0..CONNECTIONS {
        clients.push(tokio::spawn(async move { TcpStream::connect(addr).await.unwrap() }));
    }
    let mut streams = Vec::new();
    for client in clients {
        streams.push(client.await.unwrap());
    }

    eventually(|| h2.calls() == CONNECTIONS).await;
    assert_eq!(h1.calls(), 0);

    let ids: HashSet<u64> = h2.connection_ids().into_iter().collect();
    assert_eq!(ids.len(), CONNECTIONS);
    assert!(h2.outcomes().iter().all(|o| *o == NegotiationOutcome::Multiplexed));

    server.close();
    server.closed().await;
    assert_eq!(h2.calls() + h1.calls(), CONNECTIONS);
}

#[tokio::test]
async fn test_tls_connections_split_by_alpn() {
    let cert = TestCert::generate();
    let h2 = CountingEngine::new("h2");
    let h1 = CountingEngine::new("h1");
    let server = Server::with_engines(ServerOptions::tls(cert.material()), h2.clone(), h1.clone()).unwrap();
    let addr = server.listen(common::addr()).await.unwrap();

    let cert = std::sync::Arc::new(cert);
    let mut clients = Vec::new();
    for i in 0..CONNECTIONS {
        let cert = cert.clone();
        clients.push(tokio::spawn(async move {
            let alpn: &[&str] = match i % 3 {
                0 => &["h2", "http/1.1"],
                1 => &["http/1.1"],
                _ => &[],
            };
            connect_tls(addr, &cert, alpn).await.unwrap()
        }));
    }
    let mut streams = Vec::new();
    for client in clients {
        streams.push(client.await.unwrap());
    }

    eventually(|| h2.calls() + h1.calls() == CONNECTIONS).await;
    assert_eq!(h2.calls(), CONNECTIONS / 3);
    assert_eq!(h1.calls(), CONNECTIONS - CONNECTIONS / 3);

    let mut ids: Vec<u64> = h2.connection_ids();
    ids.extend(h1.connection_ids());
    let unique: HashSet<u64> = ids.iter().copied().collect();
    assert_eq!(unique.len(), CONNECTIONS);

    assert!(h2.outcomes().iter().all(|o| *o == NegotiationOutcome::Multiplexed));
    assert!(h1.outcomes().iter().all(|o| *o == NegotiationOutcome::Legacy));

    server.close();
}

/// Engine that keeps each connection open until released.
struct HoldingEngine {
    calls: AtomicUsize,
    release: Arc<Notify>,
}

impl Engine for HoldingEngine {
    fn name(&self) -> &'static str {
        "holding"
    }

    fn serve(&self, io: BoxedTransport, _ctx: ConnectionContext) -> Served {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let release = Arc::clone(&self.release);
        Box::pin(async move {
            release.notified().await;
            drop(io);
            Ok(())
        })
    }
}

#[tokio::test]
async fn test_reset_socket_reported_and_listener_keeps_accepting() {
    let engine = Arc::new(HoldingEngine {
        calls: AtomicUsize::new(0),
        release: Arc::new(Notify::new()),
    });
    let options = ServerOptions::plain().with_max_connections(1);
    let server = Server::with_engines(options, engine.clone(), CountingEngine::new("h1")).unwrap();
    let mut events = server.subscribe();
    let addr = server.listen(common::addr()).await.unwrap();

    // The only connection slot is taken, so the next socket waits in the backlog.
    let _first = TcpStream::connect(addr).await.unwrap();
    eventually(|| engine.calls.load(Ordering::SeqCst) == 1).await;

    let queued = TcpStream::connect(addr).await.unwrap();
    #[allow(deprecated)]
    queued.set_linger(Some(Duration::ZERO)).unwrap();
    drop(queued);
    tokio::time::sleep(Duration::from_millis(50)).await;

    engine.release.notify_one();
    match next_event(&mut events).await {
        ServerEvent::Error(error) => match &*error {
            ConnectionError::Dispatch { source, .. } => {
                assert!(matches!(source, DispatchError::SocketUnusable(_)))
            }
            other => panic!("expected a dispatch error, got {:?}", other),
        },
        other => panic!("expected an error event, got {:?}", other),
    }
    assert_eq!(engine.calls.load(Ordering::SeqCst), 1);

    let _third = TcpStream::connect(addr).await.unwrap();
    eventually(|| engine.calls.load(Ordering::SeqCst) == 2).await;

    engine.release.notify_one();
    server.close();
    server.closed().await;
}
