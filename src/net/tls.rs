//! TLS configuration and certificate loading.
//!
//! # Responsibilities
//! - Load the certificate chain and private key (pair or single bundle)
//! - Apply the cipher suite policy to the crypto provider
//! - Offer the ALPN protocol list and cipher order enforcement

use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use rustls::pki_types::{CertificateDer, PrivateKeyDer};
use rustls::ServerConfig;
use tokio_rustls::TlsAcceptor;

use crate::error::ConfigurationError;
use crate::negotiation::CipherPolicy;

/// Certificate material for TLS mode.
///
/// A PEM bundle is the single-file alternative to a separate chain and key.
#[derive(Clone)]
pub enum TlsMaterial {
    /// PEM certificate chain and PEM private key.
    Pem { cert: Vec<u8>, key: Vec<u8> },
    /// One PEM document holding both the chain and the key.
    Bundle(Vec<u8>),
}

impl std::fmt::Debug for TlsMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TlsMaterial::Pem { cert, .. } => f
                .debug_struct("Pem")
                .field("cert_len", &cert.len())
                .field("key", &"<redacted>")
                .finish(),
            TlsMaterial::Bundle(bytes) => f.debug_tuple("Bundle").field(&bytes.len()).finish(),
        }
    }
}

impl TlsMaterial {
    /// Read a certificate chain and key from PEM files.
    pub fn from_pem_files(cert_path: &Path, key_path: &Path) -> Result<Self, ConfigurationError> {
        let cert = read_file(cert_path).map_err(ConfigurationError::Certificate)?;
        let key = read_file(key_path).map_err(ConfigurationError::PrivateKey)?;
        Ok(TlsMaterial::Pem { cert, key })
    }

    /// Read a single PEM bundle file.
    pub fn from_bundle_file(path: &Path) -> Result<Self, ConfigurationError> {
        read_file(path)
            .map(TlsMaterial::Bundle)
            .map_err(ConfigurationError::Certificate)
    }

    /// Parse into DER certificate chain and private key.
    pub fn load(&self) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>), ConfigurationError> {
        let (cert_pem, key_pem) = match self {
            TlsMaterial::Pem { cert, key } => (cert.as_slice(), key.as_slice()),
            TlsMaterial::Bundle(bundle) => (bundle.as_slice(), bundle.as_slice()),
        };
        Ok((load_certs(cert_pem)?, load_key(key_pem)?))
    }
}

fn read_file(path: &Path) -> Result<Vec<u8>, String> {
    if !path.exists() {
        return Err(format!("file not found: {:?}", path));
    }
    std::fs::read(path).map_err(|e| format!("Failed to read {:?}: {}", path, e))
}

fn load_certs(pem: &[u8]) -> Result<Vec<CertificateDer<'static>>, ConfigurationError> {
    let mut reader = BufReader::new(pem);
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ConfigurationError::Certificate(format!("Failed to parse certificates: {}", e)))?;

    if certs.is_empty() {
        return Err(ConfigurationError::Certificate("no certificates found".to_string()));
    }
    Ok(certs)
}

fn load_key(pem: &[u8]) -> Result<PrivateKeyDer<'static>, ConfigurationError> {
    let mut reader = BufReader::new(pem);
    rustls_pemfile::private_key(&mut reader)
        .map_err(|e| ConfigurationError::PrivateKey(format!("Failed to parse key: {}", e)))?
        .ok_or_else(|| ConfigurationError::PrivateKey("no private key found".to_string()))
}

/// Handshake policy applied identically to every connection of a server.
#[derive(Debug, Clone)]
pub struct TlsPolicy {
    pub ciphers: CipherPolicy,
    pub protocols: Vec<String>,
    pub honor_cipher_order: bool,
}

/// Build the rustls server config: suites filtered by policy, ALPN offered.
pub fn build_server_config(
    material: &TlsMaterial,
    policy: &TlsPolicy,
) -> Result<ServerConfig, ConfigurationError> {
    let (certs, key) = material.load()?;

    let mut provider = rustls::crypto::ring::default_provider();
    provider.cipher_suites = policy.ciphers.resolve(&provider.cipher_suites)?;

    let mut config = ServerConfig::builder_with_provider(Arc::new(provider))
        .with_safe_default_protocol_versions()?
        .with_no_client_auth()
        .with_single_cert(certs, key)?;

    config.alpn_protocols = policy
        .protocols
        .iter()
        .map(|p| p.as_bytes().to_vec())
        .collect();
    config.ignore_client_order = policy.honor_cipher_order;

    Ok(config)
}

/// Build the acceptor shared by all handshakes of a server.
pub fn build_tls_acceptor(
    material: &TlsMaterial,
    policy: &TlsPolicy,
) -> Result<TlsAcceptor, ConfigurationError> {
    let config = build_server_config(material, policy)?;
    Ok(TlsAcceptor::from(Arc::new(config)))
}
