//! Error types for credential validation.

use thiserror::Error;

/// Errors raised while validating a credential.
///
/// These are always deterministic: retrying with the same input yields the
/// same error, so callers should fix the configuration instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum ConfigurationError {
    /// A required option was not supplied at all.
    #[error("Missing required option \"{0}\"")]
    MissingOption(&'static str),

    /// A required option was supplied but is empty.
    #[error("Required option \"{0}\" must not be empty")]
    EmptyOption(&'static str),
}

impl ConfigurationError {
    /// Name of the option that failed validation.
    #[must_use]
    pub const fn option(&self) -> &'static str {
        match self {
            Self::MissingOption(name) | Self::EmptyOption(name) => name,
        }
    }
}
