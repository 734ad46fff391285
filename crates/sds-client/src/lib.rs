// # SOLIDserver REST client
//
// This crate provides the reqwest-based `Transport` used to reach a
// SOLIDserver appliance.
//
// ## Behavior
//
// - One call, one HTTP request: no retries, no caching
// - Parameters are form-encoded into the query string for every verb
// - Any HTTP status is returned to the adapter; only failures of the
//   exchange itself become `Error::Transport`
// - The appliance version is discovered once at connect time, unless
//   configured explicitly
//
// ## Security Requirements
//
// - Password and token NEVER appear in logs or `Debug` output
// - TLS verification is on unless `ssl_verify` is false
//
// ## API Reference
//
// - Version discovery: GET `rest/member_list?WHERE=member_is_me='1'`
// - Native authentication: `X-IPM-Username` / `X-IPM-Password` headers,
//   base64-encoded

use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use sds_core::config::{AuthMode, ProviderConfig};
use sds_core::response::{field_str, parse_objects};
use sds_core::{Error, Method, Parameters, RawResponse, Result, Transport};

/// Service answering with the appliance's own member record
const MEMBER_LIST_PATH: &str = "rest/member_list";

/// SOLIDserver REST gateway client
///
/// # Security
///
/// The Debug implementation intentionally does NOT expose credentials.
pub struct SolidServer {
    /// Gateway root, e.g. `https://sds.example.com`
    base_url: String,

    auth: AuthMode,

    username: String,

    /// ⚠️ NEVER log this value
    password: String,

    /// ⚠️ NEVER log this value
    token: Option<String>,

    /// HTTP client carrying timeout and TLS settings
    client: reqwest::Client,

    /// Appliance version as an integer (`7.1.0` → 710), 0 when unknown
    version: u32,
}

// Custom Debug implementation that hides credentials
impl std::fmt::Debug for SolidServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SolidServer")
            .field("base_url", &self.base_url)
            .field("auth", &self.auth)
            .field("username", &self.username)
            .field("password", &"<REDACTED>")
            .field("token", &self.token.as_ref().map(|_| "<REDACTED>"))
            .field("version", &self.version)
            .finish()
    }
}

impl SolidServer {
    /// Create a client from validated configuration, without contacting
    /// the appliance
    ///
    /// The version is the configured one, or 0 until
    /// [`discover_version`](Self::discover_version) runs.
    ///
    /// # Returns
    ///
    /// - `Ok(SolidServer)`: Ready to issue requests
    /// - `Err(Error::Config)`: Invalid configuration or unreadable
    ///   certificate bundle
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        config.validate()?;

        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(!config.ssl_verify);

        if !config.ssl_verify {
            tracing::warn!("TLS certificate verification is disabled for {}", config.host);
        }

        if let Some(path) = &config.additional_trust_certs_file {
            for certificate in load_certificates(path)? {
                builder = builder.add_root_certificate(certificate);
            }
        }

        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url(),
            auth: config.auth,
            username: config.username.clone(),
            password: config.password.clone(),
            token: config.token.clone(),
            client,
            version: config.version.unwrap_or_default(),
        })
    }

    /// Create a client and make sure the appliance version is known
    pub async fn connect(config: &ProviderConfig) -> Result<Self> {
        let mut client = Self::new(config)?;
        if config.version.is_none() {
            client.discover_version().await?;
        }
        tracing::info!(
            "Connected to SOLIDserver {} (version {})",
            config.host,
            client.version
        );
        Ok(client)
    }

    /// Point the client at another gateway root (plain-HTTP test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Ask the appliance for its own version and remember it
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /rest/member_list?WHERE=member_is_me%3D%271%27
    /// ```
    pub async fn discover_version(&mut self) -> Result<u32> {
        let mut params = Parameters::new();
        params.add("WHERE", "member_is_me='1'");

        let response = self.request(Method::Get, MEMBER_LIST_PATH, &params).await?;
        if response.status != 200 {
            return Err(Error::transport(format!(
                "Unable to retrieve SOLIDserver version: status {}",
                response.status
            )));
        }

        let objects = parse_objects(&response.body);
        let raw = objects
            .first()
            .map(|member| field_str(member, "member_version"))
            .unwrap_or_default();

        let version = parse_version(raw).ok_or_else(|| {
            Error::transport(format!("Unable to parse SOLIDserver version '{}'", raw))
        })?;

        tracing::debug!("SOLIDserver version: {} ({})", raw, version);
        self.version = version;
        Ok(version)
    }

    fn url(&self, path: &str, params: &Parameters) -> String {
        let path = path.trim_start_matches('/');
        if params.is_empty() {
            format!("{}/{}", self.base_url, path)
        } else {
            format!("{}/{}?{}", self.base_url, path, params.encode())
        }
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.auth {
            AuthMode::Native => builder
                .header("X-IPM-Username", BASE64.encode(&self.username))
                .header("X-IPM-Password", BASE64.encode(&self.password)),
            AuthMode::Basic => builder.basic_auth(&self.username, Some(&self.password)),
            AuthMode::Token => builder.bearer_auth(self.token.as_deref().unwrap_or_default()),
        }
    }
}

#[async_trait]
impl Transport for SolidServer {
    async fn request(&self, method: Method, path: &str, params: &Parameters) -> Result<RawResponse> {
        let url = self.url(path, params);
        let builder = match method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };

        tracing::trace!("{} {}", method, path);

        let response = self
            .authorize(builder)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| Error::transport(format!("{} {} failed: {}", method, path, e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("Failed to read answer to {} {}: {}", method, path, e)))?;

        tracing::debug!("{} {} -> {}", method, path, status);
        Ok(RawResponse::new(status, body))
    }

    fn version(&self) -> u32 {
        self.version
    }
}

/// Convert an appliance version string to its integer form
///
/// The leading digits of the first three components are concatenated:
/// `"7.1.0"` → 710, `"8.0.1-p2"` → 801. Returns `None` when no digits are
/// found.
pub fn parse_version(raw: &str) -> Option<u32> {
    let digits: String = raw
        .trim()
        .split('.')
        .take(3)
        .map(|part| {
            part.chars()
                .take_while(char::is_ascii_digit)
                .collect::<String>()
        })
        .collect();

    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn load_certificates(path: &str) -> Result<Vec<reqwest::Certificate>> {
    let pem = std::fs::read(path).map_err(|e| {
        Error::config(format!("Failed to read trusted certificates {}: {}", path, e))
    })?;

    reqwest::Certificate::from_pem_bundle(&pem)
        .map_err(|e| Error::config(format!("Invalid certificate bundle {}: {}", path, e)))
}
