//! Search API client.
//!
//! [`SearchClient`] turns caller parameters into a signed `GET /search`
//! request and hands back the raw response body.
//!
//! # Examples
//!
//! ```no_run
//! use wls_client::{ClientConfig, SearchClient};
//!
//! # async fn example() -> Result<(), wls_client::ClientError> {
//! let client = SearchClient::new(ClientConfig::new("pub123", "secret"))?;
//!
//! let results = client.search_json([("q", "shoes"), ("page", "2")]).await?;
//! println!("{results:#}");
//! # Ok(())
//! # }
//! ```
//!
//! # Security
//!
//! The private key lives inside a [`UrlSigner`] as a `SecretString`; it is
//! used as hash input only and never logged or sent.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use log::{debug, error, warn};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest_middleware::ClientWithMiddleware;
use serde::de::DeserializeOwned;
use serde_json::Value;
use wls_signer::{Clock, Credential, SystemClock, Timestamp, TokenForm, UrlSigner, encode_pairs};

use crate::config::{ClientConfig, RequestOptions, TransportOptions};
use crate::decode::{decode, decode_as};
use crate::error::ClientError;

/// Path of the search endpoint below the base URL.
pub const SEARCH_PATH: &str = "search";

/// `User-Agent` used when none is configured.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Client for the search API.
///
/// Cheap to clone; clones share the connection pool, credential and clock.
/// Concurrent searches are independent: each reads the clock once and builds
/// its own URL.
#[derive(Clone)]
pub struct SearchClient {
    http: ClientWithMiddleware,
    signer: Arc<UrlSigner>,
    base_url: String,
    clock: Arc<dyn Clock>,
}

// Custom Debug implementation to keep the transport out of the output
impl fmt::Debug for SearchClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchClient")
            .field("base_url", &self.base_url)
            .field("signer", &self.signer)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl SearchClient {
    /// Create a client from a configuration.
    ///
    /// The credential is validated here, before any request is made.
    ///
    /// # Errors
    ///
    /// Returns an error if either key is missing, the base URL is unusable, a
    /// configured header is invalid, or the HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, ClientError> {
        let credential = config.resolve_credential()?;
        let http = reqwest_middleware::ClientBuilder::new(build_http_client(&config.transport())?)
            .build();

        Ok(Self::with_http_client(&config.base_url, credential, http)?
            .with_token_form(config.token_form))
    }

    /// Create a client around an existing middleware stack.
    ///
    /// Use this to add middleware such as retries or tracing; the client
    /// itself adds none.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// `http`/`https` URL without query or fragment.
    pub fn with_http_client(
        base_url: &str,
        credential: Credential,
        http: ClientWithMiddleware,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            http,
            signer: Arc::new(UrlSigner::new(credential)),
            base_url: normalize_base_url(base_url)?,
            clock: Arc::new(SystemClock),
        })
    }

    /// Replace the clock used for signing timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Set what the signature covers.
    #[must_use]
    pub fn with_token_form(mut self, token_form: TokenForm) -> Self {
        let signer = UrlSigner::clone(&self.signer).with_token_form(token_form);
        self.signer = Arc::new(signer);
        self
    }

    /// The base URL as configured, without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The signer holding this client's credential.
    #[must_use]
    pub fn signer(&self) -> &UrlSigner {
        &self.signer
    }

    /// The unsigned search URL for `parameters`, in the order given.
    #[must_use]
    pub fn search_url<I, K, V>(&self, parameters: I) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        format!("{}/{SEARCH_PATH}?{}", self.base_url, encode_pairs(parameters))
    }

    /// The signed search URL for `parameters` at time `now`.
    #[must_use]
    pub fn signed_search_url<I, K, V>(&self, parameters: I, now: Timestamp) -> String
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.signer.sign(&self.search_url(parameters), now)
    }

    /// Sign an arbitrary URL with this client's credential and clock.
    #[must_use]
    pub fn sign_url(&self, url: &str) -> String {
        self.signer.sign_with_clock(url, self.clock.as_ref())
    }

    /// Run a search and return the raw response body.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the request fails and
    /// [`ClientError::HttpStatus`] if the server answers with a non-success
    /// status.
    pub async fn search<I, K, V>(&self, parameters: I) -> Result<Bytes, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        self.search_with(parameters, &RequestOptions::default())
            .await
    }

    /// Run a search with per-call transport options.
    ///
    /// # Errors
    ///
    /// As [`SearchClient::search`], plus [`ClientError::InvalidHeader`] for an
    /// invalid per-call header.
    pub async fn search_with<I, K, V>(
        &self,
        parameters: I,
        options: &RequestOptions,
    ) -> Result<Bytes, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let url = self.signed_search_url(parameters, self.clock.now());
        self.get(&url, options).await
    }

    /// Run a search and decode the body as generic JSON.
    ///
    /// # Errors
    ///
    /// As [`SearchClient::search`], plus [`ClientError::DecodeError`] if the
    /// body is not JSON.
    pub async fn search_json<I, K, V>(&self, parameters: I) -> Result<Value, ClientError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        decode(&self.search(parameters).await?)
    }

    /// Run a search and decode the body into `T`.
    ///
    /// # Errors
    ///
    /// As [`SearchClient::search_json`].
    pub async fn search_as<T, I, K, V>(&self, parameters: I) -> Result<T, ClientError>
    where
        T: DeserializeOwned,
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        decode_as(&self.search(parameters).await?)
    }

    async fn get(&self, url: &str, options: &RequestOptions) -> Result<Bytes, ClientError> {
        debug!("Sending signed request: {url}");

        let mut request = self.http.get(url);
        if !options.headers.is_empty() {
            request = request.headers(header_map(&options.headers)?);
        }
        if let Some(timeout) = options.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(ClientError::from_transport)?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.map_err(|e| {
                warn!("Failed to read error response body: {e}");
                ClientError::from_reqwest(e)
            })?;
            error!(
                "Search request failed with status {}: {}",
                status.as_u16(),
                body
            );
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.bytes().await.map_err(ClientError::from_reqwest)?;
        debug!("Received {} byte response", body.len());
        Ok(body)
    }
}

fn normalize_base_url(base_url: &str) -> Result<String, ClientError> {
    let invalid = |reason: &str| ClientError::InvalidBaseUrl {
        url: base_url.to_string(),
        reason: reason.to_string(),
    };

    let parsed = url::Url::parse(base_url).map_err(|e| invalid(&e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid("scheme must be http or https"));
    }
    if parsed.host_str().is_none() {
        return Err(invalid("missing host"));
    }
    if parsed.query().is_some() || parsed.fragment().is_some() {
        return Err(invalid("must not contain a query or fragment"));
    }

    Ok(base_url.trim().trim_end_matches('/').to_string())
}

fn build_http_client(options: &TransportOptions) -> Result<reqwest::Client, ClientError> {
    // None means no timeout
    let mut builder = reqwest::Client::builder().user_agent(
        options
            .user_agent
            .clone()
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
    );
    if let Some(timeout) = options.timeout {
        builder = builder.timeout(timeout);
    }
    if let Some(connect_timeout) = options.connect_timeout {
        builder = builder.connect_timeout(connect_timeout);
    }
    if !options.headers.is_empty() {
        builder = builder.default_headers(header_map(&options.headers)?);
    }
    Ok(builder.build()?)
}

fn header_map(headers: &HashMap<String, String>) -> Result<HeaderMap, ClientError> {
    let mut map = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        let header_name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| ClientError::InvalidHeader(name.clone()))?;
        let header_value =
            HeaderValue::from_str(value).map_err(|_| ClientError::InvalidHeader(name.clone()))?;
        map.insert(header_name, header_value);
    }
    Ok(map)
}
