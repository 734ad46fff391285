//! Configuration types for the SOLIDserver provider
//!
//! This module defines the connection settings used to reach the appliance.

use serde::{Deserialize, Serialize};

/// Default HTTP timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// How requests authenticate against the appliance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthMode {
    /// `X-IPM-Username` / `X-IPM-Password` headers with base64 credentials
    #[default]
    Native,
    /// HTTP basic authentication
    Basic,
    /// `Authorization: Bearer <token>`
    Token,
}

impl std::str::FromStr for AuthMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(Self::Native),
            "basic" => Ok(Self::Basic),
            "token" | "bearer" => Ok(Self::Token),
            other => Err(crate::Error::config(format!(
                "Unknown authentication mode '{}'. Supported: native, basic, token",
                other
            ))),
        }
    }
}

/// Connection settings for a SOLIDserver appliance
///
/// The `Debug` implementation never prints the password or token.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Appliance host name or address (no scheme, no path)
    pub host: String,

    /// Account used by `native` and `basic` authentication
    #[serde(default)]
    pub username: String,

    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub password: String,

    /// Authentication mode
    #[serde(default)]
    pub auth: AuthMode,

    /// API token for `token` authentication
    /// ⚠️ NEVER log this value
    #[serde(default)]
    pub token: Option<String>,

    /// Verify the appliance TLS certificate
    #[serde(default = "default_ssl_verify")]
    pub ssl_verify: bool,

    /// PEM bundle of extra trusted root certificates
    #[serde(default)]
    pub additional_trust_certs_file: Option<String>,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Appliance version (e.g. 710); discovered from the appliance when unset
    #[serde(default)]
    pub version: Option<u32>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("host", &self.host)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("auth", &self.auth)
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .field("ssl_verify", &self.ssl_verify)
            .field("additional_trust_certs_file", &self.additional_trust_certs_file)
            .field("timeout_secs", &self.timeout_secs)
            .field("version", &self.version)
            .finish()
    }
}

impl ProviderConfig {
    /// Create a configuration using native authentication
    pub fn new(
        host: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            username: username.into(),
            password: password.into(),
            auth: AuthMode::Native,
            token: None,
            ssl_verify: default_ssl_verify(),
            additional_trust_certs_file: None,
            timeout_secs: default_timeout_secs(),
            version: None,
        }
    }

    /// Set the authentication mode
    pub fn with_auth(mut self, auth: AuthMode) -> Self {
        self.auth = auth;
        self
    }

    /// Set the API token (used by [`AuthMode::Token`])
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Enable or disable TLS certificate verification
    pub fn with_ssl_verify(mut self, ssl_verify: bool) -> Self {
        self.ssl_verify = ssl_verify;
        self
    }

    /// Pin the appliance version instead of discovering it
    pub fn with_version(mut self, version: u32) -> Self {
        self.version = Some(version);
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::config("SOLIDserver host cannot be empty"));
        }

        if self.host.contains("://") || self.host.contains('/') {
            return Err(crate::Error::config(format!(
                "SOLIDserver host must be a bare host name or address, got '{}'",
                self.host
            )));
        }

        match self.auth {
            AuthMode::Native | AuthMode::Basic => {
                if self.username.is_empty() || self.password.is_empty() {
                    return Err(crate::Error::config(
                        "username and password are required for native and basic authentication",
                    ));
                }
            }
            AuthMode::Token => {
                if self.token.as_ref().is_none_or(|t| t.is_empty()) {
                    return Err(crate::Error::config(
                        "an API token is required for token authentication",
                    ));
                }
            }
        }

        if self.timeout_secs == 0 {
            return Err(crate::Error::config("timeout must be > 0"));
        }

        Ok(())
    }

    /// Base URL of the appliance REST gateway
    pub fn base_url(&self) -> String {
        format!("https://{}", self.host)
    }
}

fn default_ssl_verify() -> bool {
    true
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}
