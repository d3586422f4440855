//! # wls-client
//!
//! Async client for the White Label Shopping search API.
//!
//! Every request is signed with [`wls_signer`]: the caller's parameters are
//! sorted, the public key and current time are appended, and a hash over the
//! URL and the private key authenticates the request. This crate adds the
//! HTTP plumbing around that:
//!
//! - [`SearchClient`] issues `GET <base>/search` and returns the raw body
//! - [`decode`] / [`decode_as`] turn the body into JSON
//! - [`ClientConfig`] loads credentials and transport settings from TOML
//!
//! ## Example
//!
//! ```no_run
//! use wls_client::{ClientConfig, SearchClient};
//!
//! # async fn example() -> Result<(), wls_client::ClientError> {
//! let config = ClientConfig::new("your-public-key", "your-private-key")
//!     .with_timeout(10);
//!
//! let client = SearchClient::new(config)?;
//! let body = client.search([("q", "shoes")]).await?;
//! let value = wls_client::decode(&body)?;
//! println!("{value}");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod decode;
pub mod error;

pub use bytes::Bytes;
pub use client::{DEFAULT_USER_AGENT, SEARCH_PATH, SearchClient};
pub use config::{ClientConfig, DEFAULT_BASE_URL, RequestOptions, TransportOptions};
pub use decode::{decode, decode_as};
pub use error::{ClientError, ConfigurationError};

pub use wls_signer::{Clock, Credential, FixedClock, SystemClock, Timestamp, TokenForm, UrlSigner};
