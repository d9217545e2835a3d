//! Cipher suite and ALPN protocol policy.
//!
//! # Responsibilities
//! - Provide the default cipher suite ranking and ALPN identifier list
//! - Resolve a cipher list (default or override) against the suites the
//!   crypto provider actually implements
//!
//! # Design Decisions
//! - Ranking follows the Mozilla server-side TLS guidance: forward-secret
//!   AEAD suites first, CBC suites last
//! - Entries starting with `!` are negative filters; they remove any suite
//!   whose `_`-separated name contains the token
//! - Overrides replace the defaults wholesale, nothing is merged

use rustls::SupportedCipherSuite;

use crate::error::ConfigurationError;

/// ALPN identifier of HTTP/2.
pub const H2: &str = "h2";

/// ALPN identifier of HTTP/1.1.
pub const HTTP_1_1: &str = "http/1.1";

/// ALPN identifier of HTTP/1.0.
pub const HTTP_1_0: &str = "http/1.0";

/// Offered ALPN identifiers, most preferred first. HTTP/1.x is the fallback.
pub const DEFAULT_PROTOCOLS: &[&str] = &[H2, HTTP_1_1, HTTP_1_0];

/// Default cipher suite ranking.
pub const DEFAULT_CIPHER_SUITES: &[&str] = &[
    "TLS13_AES_128_GCM_SHA256",
    "TLS13_AES_256_GCM_SHA384",
    "TLS13_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_128_GCM_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_ECDSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_RSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_ECDHE_ECDSA_WITH_CHACHA20_POLY1305_SHA256",
    "TLS_DHE_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_DHE_RSA_WITH_AES_256_GCM_SHA384",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA256",
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA256",
    "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA384",
    "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA384",
    "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
    "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
    "TLS_RSA_WITH_AES_128_GCM_SHA256",
    "TLS_RSA_WITH_AES_256_GCM_SHA384",
    "!NULL",
    "!EXPORT",
    "!DES",
    "!3DES",
    "!MD5",
    "!PSK",
    "!RC4",
];

/// Ordered cipher suite list, either the default or a caller override.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CipherPolicy {
    names: Vec<String>,
}

impl CipherPolicy {
    /// Policy from an explicit list.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The override if one was given, otherwise the defaults.
    pub fn from_override(names: Option<&[String]>) -> Self {
        match names {
            Some(names) => Self::new(names.iter().cloned()),
            None => Self::default(),
        }
    }

    /// The list as configured, exclusions included.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Select names from `available`, in policy order, honoring exclusions.
    pub fn resolve_names<'a>(&self, available: &[&'a str]) -> Vec<&'a str> {
        let (exclusions, selections): (Vec<&str>, Vec<&str>) = self
            .names
            .iter()
            .map(String::as_str)
            .partition(|name| name.starts_with('!'));
        let exclusions: Vec<&str> = exclusions.iter().map(|name| &name[1..]).collect();

        let mut resolved: Vec<&'a str> = Vec::new();
        for wanted in selections {
            let Some(found) = available.iter().find(|name| name.eq_ignore_ascii_case(wanted)) else {
                tracing::debug!(cipher_suite = %wanted, "Cipher suite not offered by the crypto provider");
                continue;
            };
            if is_excluded(found, &exclusions) {
                tracing::debug!(cipher_suite = %found, "Cipher suite removed by exclusion filter");
                continue;
            }
            if !resolved.contains(found) {
                resolved.push(*found);
            }
        }
        resolved
    }

    /// Resolve the policy against the suites a crypto provider implements.
    pub fn resolve(
        &self,
        available: &[SupportedCipherSuite],
    ) -> Result<Vec<SupportedCipherSuite>, ConfigurationError> {
        let named: Vec<(String, SupportedCipherSuite)> = available
            .iter()
            .map(|suite| (format!("{:?}", suite.suite()), *suite))
            .collect();
        let names: Vec<&str> = named.iter().map(|(name, _)| name.as_str()).collect();

        let suites: Vec<SupportedCipherSuite> = self
            .resolve_names(&names)
            .into_iter()
            .filter_map(|wanted| {
                named
                    .iter()
                    .find(|(name, _)| name == wanted)
                    .map(|(_, suite)| *suite)
            })
            .collect();

        if suites.is_empty() {
            return Err(ConfigurationError::NoCipherSuites);
        }
        Ok(suites)
    }
}

impl Default for CipherPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_CIPHER_SUITES.iter().copied())
    }
}

fn is_excluded(name: &str, exclusions: &[&str]) -> bool {
    name.split('_')
        .any(|token| exclusions.iter().any(|ex| token.eq_ignore_ascii_case(ex)))
}

/// The protocol list (override or default) as ALPN wire identifiers.
pub fn protocol_list(overrides: Option<&[String]>) -> Result<Vec<String>, ConfigurationError> {
    let protocols: Vec<String> = match overrides {
        Some(list) => list.to_vec(),
        None => DEFAULT_PROTOCOLS.iter().map(|p| p.to_string()).collect(),
    };
    if protocols.is_empty() || protocols.iter().any(|p| p.is_empty()) {
        return Err(ConfigurationError::EmptyProtocolList);
    }
    Ok(protocols)
}
