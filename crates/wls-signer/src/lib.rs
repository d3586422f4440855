//! # wls-signer
//!
//! Canonical URL signing for the White Label Shopping search API.
//!
//! Every request to the API carries the caller's public key, the signing time
//! and a hash over the whole URL plus a shared private key. The server
//! recomputes the hash, so the transformation implemented here must be
//! byte-exact:
//!
//! 1. Query parameters are sorted by key and re-encoded.
//! 2. `dkey=<public key>&timestamp=<epoch seconds>` is appended.
//! 3. The MD5 of that URL followed by the private key is base64 encoded with a
//!    URL-safe alphabet and appended as `hash`.
//!
//! Signing is a pure function: it performs no I/O and the only hidden input,
//! the clock, is made explicit through [`Timestamp`] and [`Clock`].
//!
//! ## Example
//!
//! ```
//! use wls_signer::{Credential, Timestamp, UrlSigner};
//!
//! let signer = UrlSigner::new(Credential::new("pub123", "secret")?);
//! let signed = signer.sign(
//!     "http://api.example.com/search?q=shoes",
//!     Timestamp::from_secs(1_000_000_000),
//! );
//!
//! assert!(signed.starts_with(
//!     "http://api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000&hash="
//! ));
//! # Ok::<(), wls_signer::ConfigurationError>(())
//! ```

/// URL decomposition and canonical query strings.
pub mod canonical;
/// Validated credentials and their configuration form.
pub mod credential;
pub mod error;
/// The signing algorithm.
pub mod signer;
pub mod timestamp;

pub use canonical::{UrlParts, canonical_query, encode_pairs};
pub use credential::{Credential, CredentialConfig, PRIVATE_KEY_OPTION, PUBLIC_KEY_OPTION};
pub use error::ConfigurationError;
pub use signer::{
    PARAM_HASH, PARAM_PUBLIC_KEY, PARAM_TIMESTAMP, TokenForm, UrlSigner, sign, signed_hash,
};
pub use timestamp::{Clock, FixedClock, SystemClock, Timestamp};
