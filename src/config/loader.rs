//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::config::schema::Config;
use crate::config::validation::{validate_config, ValidationError};
use crate::error::ConfigurationError;
use crate::net::TlsMaterial;
use crate::server::ServerOptions;

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Validation(Vec<ValidationError>),
    Configuration(ConfigurationError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "IO error: {}", e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::Configuration(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigurationError> for ConfigError {
    fn from(e: ConfigurationError) -> Self {
        ConfigError::Configuration(e)
    }
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Turn a validated configuration into server options, reading TLS files.
pub fn server_options(config: &Config) -> Result<ServerOptions, ConfigError> {
    let tls = match &config.tls {
        Some(tls) => Some(match (&tls.cert_path, &tls.key_path, &tls.bundle_path) {
            (Some(cert), Some(key), None) => TlsMaterial::from_pem_files(Path::new(cert), Path::new(key))?,
            (None, None, Some(bundle)) => TlsMaterial::from_bundle_file(Path::new(bundle))?,
            _ => return Err(ConfigurationError::TlsMaterialRequired.into()),
        }),
        None => None,
    };

    Ok(ServerOptions {
        tls,
        plain: config.plain,
        cipher_suites: config.cipher_suites.clone(),
        protocols: config.protocols.clone(),
        honor_cipher_order: Some(config.honor_cipher_order),
        http2: config.http2.clone(),
        max_connections: config.listener.max_connections,
        handshake_timeout: Duration::from_secs(config.listener.handshake_timeout_secs),
        ..ServerOptions::default()
    })
}
