//! Server construction, listening and close behaviour.

use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::broadcast::error::TryRecvError;

use h2_alpn_server::config::{parse_config, server_options};
use h2_alpn_server::observability::dispatch_for;
use h2_alpn_server::{
    create_server, ConfigurationError, ConnectionError, Server, ServerEvent, ServerMode, ServerOptions, ServerState,
};

mod common;

use common::{connect_tls, http1_get, next_event, protocol_router, TestCert};

#[tokio::test]
async fn test_close_is_idempotent_and_emits_once() {
    let server = Server::new(ServerOptions::plain(), protocol_router()).unwrap();
    let mut events = server.subscribe();
    let addr = server.listen(common::addr()).await.unwrap();

    server.close();
    server.close();
    server.clone().close();
    server.closed().await;
    assert_eq!(server.state(), ServerState::Closed);

    assert!(matches!(next_event(&mut events).await, ServerEvent::Close));
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(matches!(events.try_recv(), Err(TryRecvError::Empty)));

    assert!(TcpStream::connect(addr).await.is_err());
}

#[test]
fn test_missing_tls_and_plain_fails_before_listening() {
    let err = Server::new(ServerOptions::default(), protocol_router()).unwrap_err();
    assert!(matches!(err, ConfigurationError::UpgradeNotSupported));
    assert!(err.to_string().contains("upgrade is not supported"));
}

#[test]
fn test_tls_material_takes_precedence_over_plain() {
    let cert = TestCert::generate();
    let options = ServerOptions {
        plain: true,
        ..ServerOptions::tls(cert.material())
    };
    let server = Server::new(options, protocol_router()).unwrap();
    assert_eq!(server.mode(), ServerMode::Tls);
    assert!(server.config().tls_policy().is_some());
}

#[test]
fn test_create_server_is_tls_only() {
    let err = create_server(ServerOptions::plain(), protocol_router()).unwrap_err();
    assert!(matches!(err, ConfigurationError::TlsMaterialRequired));

    let cert = TestCert::generate();
    let options = ServerOptions {
        plain: true,
        ..ServerOptions::tls(cert.material())
    };
    let server = create_server(options, protocol_router()).unwrap();
    assert_eq!(server.mode(), ServerMode::Tls);
}

#[test]
fn test_unusable_cipher_override_fails() {
    let cert = TestCert::generate();
    let options = ServerOptions::tls(cert.material()).with_cipher_suites(["RC4-SHA", "!RC4"]);
    let err = Server::new(options, protocol_router()).unwrap_err();
    assert!(matches!(err, ConfigurationError::NoCipherSuites));
}

#[tokio::test]
async fn test_bad_clients_do_not_stop_the_listener() {
    let cert = TestCert::generate();
    let server = Server::new(ServerOptions::tls(cert.material()), protocol_router()).unwrap();
    let mut events = server.subscribe();
    let addr = server.listen(common::addr()).await.unwrap();

    let mut garbage = TcpStream::connect(addr).await.unwrap();
    garbage.write_all(b"definitely not a TLS ClientHello").await.unwrap();

    match next_event(&mut events).await {
        ServerEvent::Error(error) => assert!(matches!(*error, ConnectionError::Handshake { .. })),
        other => panic!("expected a handshake error, got {:?}", other),
    }

    let stream = connect_tls(addr, &cert, &["http/1.1"]).await.unwrap();
    let (status, _, body) = http1_get(stream).await;
    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(body, "http/1.x");
    assert_eq!(server.state(), ServerState::Listening);

    server.close();
}

#[tokio::test]
async fn test_stalled_handshake_times_out() {
    let cert = TestCert::generate();
    let options = ServerOptions::tls(cert.material()).with_handshake_timeout(Duration::from_millis(100));
    let server = Server::new(options, protocol_router()).unwrap();
    let mut events = server.subscribe();
    let addr = server.listen(common::addr()).await.unwrap();

    let _silent = TcpStream::connect(addr).await.unwrap();
    match next_event(&mut events).await {
        ServerEvent::Error(error) => assert!(matches!(*error, ConnectionError::HandshakeTimeout { .. })),
        other => panic!("expected a timeout, got {:?}", other),
    }

    server.close();
}

#[tokio::test]
async fn test_server_from_config_file() {
    let config = parse_config(
        r#"
        plain = true

        [listener]
        bind_address = "127.0.0.1:0"
        max_connections = 4
        "#,
    )
    .unwrap();
    let server = Server::new(server_options(&config).unwrap(), protocol_router()).unwrap();
    assert_eq!(server.mode(), ServerMode::PlainTcp);
    assert_eq!(server.config().max_connections(), 4);

    let addr = server
        .listen(config.listener.bind_address.parse().unwrap())
        .await
        .unwrap();
    let (status, _, body) = common::h2_get(TcpStream::connect(addr).await.unwrap()).await;
    assert_eq!(status, hyper::StatusCode::OK);
    assert_eq!(body, "h2");

    server.close();
    server.closed().await;
}

#[tokio::test]
async fn test_server_logs_to_injected_dispatch() {
    let options = ServerOptions::plain().with_log(dispatch_for("debug"));
    let server = Server::new(options, protocol_router()).unwrap();
    let mut events = server.subscribe();
    let addr = server.listen(common::addr()).await.unwrap();

    let (status, _, _) = common::h2_get(TcpStream::connect(addr).await.unwrap()).await;
    assert_eq!(status, hyper::StatusCode::OK);
    assert!(matches!(next_event(&mut events).await, ServerEvent::Request(_)));

    server.close();
    server.closed().await;
}
