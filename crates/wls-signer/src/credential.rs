//! API credentials.
//!
//! A [`Credential`] can only be obtained through validation, so every value of
//! the type carries both a public and a private key. The unvalidated form,
//! [`CredentialConfig`], is what configuration files deserialize into.
//!
//! # Security
//!
//! The private key is stored as a [`SecretString`]: it is redacted from
//! `Debug` output, zeroed on drop and never serialized.

use std::fmt;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Option name reported when the public key is missing.
pub const PUBLIC_KEY_OPTION: &str = "public_key";
/// Option name reported when the private key is missing.
pub const PRIVATE_KEY_OPTION: &str = "private_key";

/// Unvalidated credential options.
///
/// # Examples
///
/// ```
/// use wls_signer::CredentialConfig;
///
/// let credential = CredentialConfig::default()
///     .with_public_key("pub123")
///     .with_private_key("secret")
///     .validate()?;
///
/// assert_eq!(credential.public_key(), "pub123");
/// # Ok::<(), wls_signer::ConfigurationError>(())
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// Public key, transmitted as the `dkey` parameter.
    #[serde(default)]
    pub public_key: Option<String>,
    /// Private key, only ever used as hash input.
    ///
    /// Will not be serialized to prevent accidental exposure.
    #[serde(skip_serializing, default)]
    pub private_key: Option<SecretString>,
}

impl CredentialConfig {
    /// Sets the public key.
    #[must_use]
    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    /// Sets the private key.
    ///
    /// The key is stored securely using `SecretString`.
    #[must_use]
    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(SecretString::new(private_key.into().into()));
        self
    }

    /// Validate the options and produce a [`Credential`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::MissingOption`] if either key is absent and
    /// [`ConfigurationError::EmptyOption`] if either key is an empty string.
    /// The public key is checked first.
    pub fn validate(self) -> Result<Credential, ConfigurationError> {
        let public_key = self
            .public_key
            .ok_or(ConfigurationError::MissingOption(PUBLIC_KEY_OPTION))?;
        if public_key.is_empty() {
            return Err(ConfigurationError::EmptyOption(PUBLIC_KEY_OPTION));
        }

        let private_key = self
            .private_key
            .ok_or(ConfigurationError::MissingOption(PRIVATE_KEY_OPTION))?;
        if private_key.expose_secret().is_empty() {
            return Err(ConfigurationError::EmptyOption(PRIVATE_KEY_OPTION));
        }

        Ok(Credential {
            public_key,
            private_key,
        })
    }
}

/// A validated public/private key pair.
#[derive(Clone)]
pub struct Credential {
    public_key: String,
    private_key: SecretString,
}

// Custom Debug implementation to avoid exposing the private key
impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("public_key", &self.public_key)
            .field("private_key", &"[REDACTED]")
            .finish()
    }
}

impl Credential {
    /// Create a credential from both keys.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] if either key is empty.
    pub fn new(
        public_key: impl Into<String>,
        private_key: impl Into<String>,
    ) -> Result<Self, ConfigurationError> {
        CredentialConfig::default()
            .with_public_key(public_key)
            .with_private_key(private_key)
            .validate()
    }

    /// The public key sent with every request.
    #[must_use]
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub(crate) const fn private_key(&self) -> &SecretString {
        &self.private_key
    }
}

impl TryFrom<CredentialConfig> for Credential {
    type Error = ConfigurationError;

    fn try_from(config: CredentialConfig) -> Result<Self, Self::Error> {
        config.validate()
    }
}
