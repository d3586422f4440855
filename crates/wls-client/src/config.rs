//! Client configuration.
//!
//! [`ClientConfig`] can be built in code or loaded from TOML:
//!
//! ```toml
//! base_url = "http://api.whitelabelshopping.net"
//! public_key = "pub123"
//! private_key_env = "WLS_PRIVATE_KEY"
//! token_form = "full_url"
//! timeout_seconds = 10
//! user_agent = "my-shop/1.0"
//!
//! [headers]
//! Accept = "application/json"
//! ```
//!
//! Transport settings ([`TransportOptions`], [`RequestOptions`]) are passed
//! straight to the HTTP client and never affect signing.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use wls_signer::{Credential, CredentialConfig, TokenForm};

use crate::error::ClientError;

/// Default API endpoint.
pub const DEFAULT_BASE_URL: &str = "http://api.whitelabelshopping.net";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

/// Configuration for a [`crate::SearchClient`].
///
/// # Security
///
/// The `private_key` field uses `SecretString` and is never serialized.
/// Prefer `private_key_env` in files that are checked in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// API root; `/search` is appended to it.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Public key, sent as `dkey`.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Private key (stored securely).
    #[serde(skip_serializing, default)]
    pub private_key: Option<SecretString>,
    /// Environment variable to read the private key from when `private_key`
    /// is not set.
    #[serde(default)]
    pub private_key_env: Option<String>,
    /// What the signature covers.
    #[serde(default)]
    pub token_form: TokenForm,
    /// Total request timeout in seconds.
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
    /// Connection timeout in seconds.
    #[serde(default)]
    pub connect_timeout_seconds: Option<u64>,
    /// `User-Agent` header sent with every request.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            public_key: None,
            private_key: None,
            private_key_env: None,
            token_form: TokenForm::default(),
            timeout_seconds: None,
            connect_timeout_seconds: None,
            user_agent: None,
            headers: HashMap::new(),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration with both keys and the default endpoint.
    ///
    /// # Examples
    ///
    /// ```
    /// use wls_client::ClientConfig;
    ///
    /// let config = ClientConfig::new("pub123", "secret")
    ///     .with_base_url("https://api.example.com")
    ///     .with_timeout(10);
    /// assert_eq!(config.base_url, "https://api.example.com");
    /// ```
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self::default()
            .with_public_key(public_key)
            .with_private_key(private_key)
    }

    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigParseError`] if the document is invalid.
    pub fn from_toml_str(document: &str) -> Result<Self, ClientError> {
        Ok(toml::from_str(document)?)
    }

    /// Load a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ClientError::ConfigFileError {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Sets the API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the public key.
    #[must_use]
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    /// Sets the private key.
    #[must_use]
    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(SecretString::new(private_key.into().into()));
        self
    }

    /// Sets the token form.
    #[must_use]
    pub const fn with_token_form(mut self, token_form: TokenForm) -> Self {
        self.token_form = token_form;
        self
    }

    /// Sets the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = Some(timeout_seconds);
        self
    }

    /// Sets the `User-Agent` header.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    /// Adds a header sent with every request.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Resolve and validate the credential.
    ///
    /// An explicit `private_key` wins over `private_key_env`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingEnvVar`] if the named variable is unset and
    /// [`ClientError::ConfigurationError`] if either key is missing or empty.
    pub fn resolve_credential(&self) -> Result<Credential, ClientError> {
        self.resolve_credential_with(|var| std::env::var(var).ok())
    }

    /// Resolve the credential, reading `private_key_env` through `lookup`
    /// instead of the process environment.
    ///
    /// `lookup` is only called when no explicit `private_key` is set.
    ///
    /// # Errors
    ///
    /// As [`ClientConfig::resolve_credential`].
    pub fn resolve_credential_with<F>(&self, lookup: F) -> Result<Credential, ClientError>
    where
        F: FnOnce(&str) -> Option<String>,
    {
        let private_key = match (&self.private_key, &self.private_key_env) {
            (Some(key), _) => Some(key.clone()),
            (None, Some(var)) => {
                let value = lookup(var).ok_or_else(|| ClientError::MissingEnvVar(var.clone()))?;
                Some(SecretString::new(value.into()))
            }
            (None, None) => None,
        };

        let credential = CredentialConfig {
            public_key: self.public_key.clone(),
            private_key,
        }
        .validate()?;
        Ok(credential)
    }

    /// Transport settings derived from this configuration.
    #[must_use]
    pub fn transport(&self) -> TransportOptions {
        TransportOptions {
            timeout: self.timeout_seconds.map(Duration::from_secs),
            connect_timeout: self.connect_timeout_seconds.map(Duration::from_secs),
            user_agent: self.user_agent.clone(),
            headers: self.headers.clone(),
        }
    }
}

/// Per-client HTTP settings.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use wls_client::TransportOptions;
///
/// let options = TransportOptions::builder()
///     .timeout(Some(Duration::from_secs(5)))
///     .user_agent(Some("my-shop/1.0".to_string()))
///     .build();
/// assert!(options.connect_timeout.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct TransportOptions {
    /// Total request timeout; `None` means no timeout.
    #[builder(default)]
    pub timeout: Option<Duration>,
    /// Connection timeout.
    #[builder(default)]
    pub connect_timeout: Option<Duration>,
    /// `User-Agent` header.
    #[builder(default)]
    pub user_agent: Option<String>,
    /// Headers sent with every request.
    #[builder(default)]
    pub headers: HashMap<String, String>,
}

/// Per-call HTTP settings, layered over [`TransportOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, TypedBuilder)]
pub struct RequestOptions {
    /// Deadline for this call only.
    #[builder(default)]
    pub timeout: Option<Duration>,
    /// Headers for this call only.
    #[builder(default)]
    pub headers: HashMap<String, String>,
}
