//! Error types for the client library.

use std::path::PathBuf;

use thiserror::Error;

pub use wls_signer::ConfigurationError;

/// Errors that can occur when searching.
///
/// Configuration problems, transport failures and undecodable responses are
/// distinct variants so callers can branch on the failure kind. Nothing here
/// is retried by the client.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ClientError {
    /// Missing or empty credential option.
    #[error("Configuration error: {0}")]
    ConfigurationError(#[from] ConfigurationError),

    /// The base URL cannot be used to build request URLs.
    #[error("Invalid base URL '{url}': {reason}")]
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A configured header name or value is not valid HTTP.
    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    /// The configuration file could not be read.
    #[error("Failed to read configuration file {}: {source}", path.display())]
    ConfigFileError {
        /// Path of the file.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for [`crate::ClientConfig`].
    #[error("Failed to parse configuration: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    /// The private key environment variable named in the configuration is unset.
    #[error("Environment variable {0} is not set")]
    MissingEnvVar(String),

    /// Network or HTTP request failure.
    ///
    /// Indicates issues like DNS resolution, connection failures, or socket errors.
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Middleware layer error.
    #[error("Middleware error: {0}")]
    MiddlewareError(#[from] reqwest_middleware::Error),

    /// The request exceeded its deadline.
    #[error("Timeout error")]
    TimeoutError,

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// Status code.
        status: u16,
        /// Response body, as text.
        body: String,
    },

    /// The response body is not valid JSON (or not the requested shape).
    #[error("Decode error: {0}")]
    DecodeError(#[from] serde_json::Error),
}

impl ClientError {
    /// Classify a transport failure, separating timeouts.
    pub(crate) fn from_transport(err: reqwest_middleware::Error) -> Self {
        match err {
            reqwest_middleware::Error::Reqwest(err) => Self::from_reqwest(err),
            other => Self::MiddlewareError(other),
        }
    }

    pub(crate) fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::TimeoutError
        } else {
            Self::NetworkError(err)
        }
    }

    /// Check if this error stems from invalid configuration.
    ///
    /// These errors are deterministic; retrying cannot help.
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::ConfigurationError(_)
                | Self::InvalidBaseUrl { .. }
                | Self::InvalidHeader(_)
                | Self::ConfigFileError { .. }
                | Self::ConfigParseError(_)
                | Self::MissingEnvVar(_)
        )
    }

    /// Check if the transport failed.
    pub const fn is_transport_error(&self) -> bool {
        matches!(
            self,
            Self::NetworkError(_) | Self::MiddlewareError(_) | Self::TimeoutError
        )
    }

    /// Check if the response body could not be decoded.
    pub const fn is_decode_error(&self) -> bool {
        matches!(self, Self::DecodeError(_))
    }

    /// The HTTP status, if the server answered with an error status.
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::HttpStatus { status, .. } => Some(*status),
            _ => None,
        }
    }
}
