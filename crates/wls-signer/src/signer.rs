//! The URL signing algorithm.
//!
//! A signed URL has the form
//!
//! ```text
//! scheme://host/path?<sorted params>&dkey=<public key>&timestamp=<secs>&hash=<digest>
//! ```
//!
//! where `<digest>` is the MD5 of everything before `&hash=` followed by the
//! private key, base64 encoded with `+`, `/` and `=` replaced by `.`, `_` and
//! `-`. The server recomputes the digest, so every byte matters.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

use crate::canonical::UrlParts;
use crate::credential::Credential;
use crate::timestamp::{Clock, Timestamp};

/// Query parameter carrying the public key.
pub const PARAM_PUBLIC_KEY: &str = "dkey";
/// Query parameter carrying the signing time.
pub const PARAM_TIMESTAMP: &str = "timestamp";
/// Query parameter carrying the signature.
pub const PARAM_HASH: &str = "hash";

/// What gets hashed alongside the private key.
///
/// Only the signature depends on this; the returned URL is the same either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenForm {
    /// The URL exactly as sent.
    #[default]
    FullUrl,
    /// The URL with every `scheme://` and then every `//` removed, for servers
    /// that verify independently of the scheme they were reached on.
    WithoutScheme,
}

impl TokenForm {
    fn hash_token(self, unsigned: &str, private_key: &str, scheme: Option<&str>) -> String {
        let token = format!("{unsigned}{private_key}");
        match self {
            Self::FullUrl => token,
            Self::WithoutScheme => {
                let token = match scheme {
                    Some(scheme) => token.replace(&format!("{scheme}://"), ""),
                    None => token,
                };
                token.replace("//", "")
            }
        }
    }
}

/// Sign `url` with `credential` at time `now`.
///
/// Pure: the same inputs always produce the same output.
///
/// # Examples
///
/// ```
/// use wls_signer::{Credential, Timestamp, sign};
///
/// let credential = Credential::new("pub123", "secret")?;
/// let signed = sign(
///     "http://api.example.com/search?q=shoes",
///     &credential,
///     Timestamp::from_secs(1_000_000_000),
/// );
///
/// assert_eq!(
///     signed,
///     "http://api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000&hash=5xUez3cCLhDiUf0qQVYN7g--"
/// );
/// # Ok::<(), wls_signer::ConfigurationError>(())
/// ```
#[must_use]
pub fn sign(url: &str, credential: &Credential, now: Timestamp) -> String {
    sign_with(url, credential, now, TokenForm::FullUrl)
}

fn sign_with(url: &str, credential: &Credential, now: Timestamp, form: TokenForm) -> String {
    let parts = UrlParts::split(url);

    let mut signed = parts.canonical_prefix();
    signed.push_str(&format!(
        "{PARAM_PUBLIC_KEY}={}&{PARAM_TIMESTAMP}={now}",
        credential.public_key()
    ));

    let token = form.hash_token(
        &signed,
        credential.private_key().expose_secret(),
        parts.scheme,
    );
    signed.push_str(&format!("&{PARAM_HASH}={}", signed_hash(&token)));
    signed
}

/// MD5 `token` and encode the digest with the URL-safe alphabet.
///
/// The result is always 24 characters long and never contains `+`, `/` or `=`.
#[must_use]
pub fn signed_hash(token: &str) -> String {
    let digest = md5::compute(token.as_bytes());
    STANDARD
        .encode(digest.0)
        .chars()
        .map(|c| match c {
            '+' => '.',
            '/' => '_',
            '=' => '-',
            other => other,
        })
        .collect()
}

/// Signs URLs with a fixed credential.
///
/// # Examples
///
/// ```
/// use wls_signer::{Credential, FixedClock, Timestamp, TokenForm, UrlSigner};
///
/// let signer = UrlSigner::new(Credential::new("pub123", "secret")?)
///     .with_token_form(TokenForm::FullUrl);
///
/// let at = Timestamp::from_secs(1_000_000_000);
/// let first = signer.sign("http://api.example.com/search?b=2&a=1", at);
/// let second = signer.sign_with_clock("http://api.example.com/search?a=1&b=2", &FixedClock(at));
/// assert_eq!(first, second);
/// # Ok::<(), wls_signer::ConfigurationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct UrlSigner {
    credential: Credential,
    token_form: TokenForm,
}

impl UrlSigner {
    /// Creates a signer hashing the full URL.
    #[must_use]
    pub const fn new(credential: Credential) -> Self {
        Self {
            credential,
            token_form: TokenForm::FullUrl,
        }
    }

    /// Sets the token form.
    #[must_use]
    pub const fn with_token_form(mut self, token_form: TokenForm) -> Self {
        self.token_form = token_form;
        self
    }

    /// The credential used for signing.
    #[must_use]
    pub const fn credential(&self) -> &Credential {
        &self.credential
    }

    /// The token form used for signing.
    #[must_use]
    pub const fn token_form(&self) -> TokenForm {
        self.token_form
    }

    /// Sign `url` at time `now`.
    #[must_use]
    pub fn sign(&self, url: &str, now: Timestamp) -> String {
        sign_with(url, &self.credential, now, self.token_form)
    }

    /// Sign `url`, reading `clock` once.
    #[must_use]
    pub fn sign_with_clock(&self, url: &str, clock: &dyn Clock) -> String {
        self.sign(url, clock.now())
    }

    /// Sign `url` at the current wall-clock time.
    #[must_use]
    pub fn sign_now(&self, url: &str) -> String {
        self.sign(url, Timestamp::now())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;

    const AT: Timestamp = Timestamp::from_secs(1_000_000_000);

    fn credential() -> Credential {
        Credential::new("pub123", "secret").unwrap()
    }

    fn hash_of(signed: &str) -> &str {
        signed.rsplit_once("&hash=").unwrap().1
    }

    fn unsigned_part(signed: &str) -> &str {
        signed.rsplit_once("&hash=").unwrap().0
    }

    #[test]
    fn test_regression_vector() {
        let signed = sign("http://api.example.com/search?q=shoes", &credential(), AT);
        assert_eq!(
            unsigned_part(&signed),
            "http://api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000"
        );
        assert_eq!(
            signed,
            "http://api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000&hash=5xUez3cCLhDiUf0qQVYN7g--"
        );
    }

    #[test]
    fn test_hash_token_is_url_then_private_key() {
        let signed = sign("http://api.example.com/search?q=shoes", &credential(), AT);
        let token = format!("{}secret", unsigned_part(&signed));
        assert_eq!(hash_of(&signed), signed_hash(&token));
    }

    #[test]
    fn test_hex_then_pack_matches_raw_digest() {
        let token = "http://api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000secret";
        let digest = md5::compute(token.as_bytes());

        let hex_digest = format!("{digest:x}");
        assert_eq!(hex_digest.len(), 32);
        assert_eq!(hex_digest, hex_digest.to_lowercase());

        let packed = hex::decode(&hex_digest).unwrap();
        assert_eq!(packed.as_slice(), digest.0.as_slice());
        assert_eq!(STANDARD.encode(&packed), STANDARD.encode(digest.0));
    }

    #[test]
    fn test_no_query() {
        let signed = sign("http://api.example.com/search", &credential(), AT);
        assert_eq!(
            signed,
            "http://api.example.com/search?dkey=pub123&timestamp=1000000000&hash=7g1NxQTb65zXWlxfSyyrMg--"
        );
        assert_eq!(signed.matches('?').count(), 1);
        assert!(!signed.contains("?&"));
    }

    #[test]
    fn test_empty_query_behaves_like_no_query() {
        let with_mark = sign("http://api.example.com/search?", &credential(), AT);
        let without = sign("http://api.example.com/search", &credential(), AT);
        assert_eq!(with_mark, without);
    }

    #[test]
    fn test_parameters_sorted() {
        let signed = sign("http://api.example.com/search?b=2&a=1", &credential(), AT);
        assert_eq!(
            signed,
            "http://api.example.com/search?a=1&b=2&dkey=pub123&timestamp=1000000000&hash=3eB37HycQBhH6STH2yX5qw--"
        );
    }

    #[test]
    fn test_parameter_order_invariance() {
        let a = sign("http://api.example.com/search?q=x&brand=y&page=2", &credential(), AT);
        let b = sign("http://api.example.com/search?page=2&q=x&brand=y", &credential(), AT);
        let c = sign("http://api.example.com/search?brand=y&page=2&q=x", &credential(), AT);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_reencoded_values() {
        let signed = sign(
            "http://api.example.com/search?q=red%20shoes&brand=Acme+Co",
            &credential(),
            AT,
        );
        assert_eq!(
            signed,
            "http://api.example.com/search?brand=Acme+Co&q=red+shoes&dkey=pub123&timestamp=1000000000&hash=jgoZ1.MZD.ZPlzLjQAWjmw--"
        );
    }

    #[test]
    fn test_asterisk_signed_escaped() {
        let literal = sign("http://api.example.com/search?q=a*b", &credential(), AT);
        let escaped = sign("http://api.example.com/search?q=a%2Ab", &credential(), AT);
        assert_eq!(literal, escaped);
        assert_eq!(
            escaped,
            "http://api.example.com/search?q=a%2Ab&dkey=pub123&timestamp=1000000000&hash=Jyd.ioaXVK0VBGumuETzQQ--"
        );
    }

    #[test]
    fn test_auth_parameters_not_sorted_with_caller_parameters() {
        let signed = sign("http://api.example.com/search?z=1&a=2", &credential(), AT);
        assert!(signed.contains("?a=2&z=1&dkey=pub123&timestamp=1000000000&hash="));
    }

    #[test]
    fn test_private_key_only_changes_hash() {
        let other = Credential::new("pub123", "other").unwrap();
        let url = "http://api.example.com/search?q=shoes";

        let first = sign(url, &credential(), AT);
        let second = sign(url, &other, AT);

        assert_eq!(unsigned_part(&first), unsigned_part(&second));
        assert_ne!(hash_of(&first), hash_of(&second));
        assert_eq!(hash_of(&second), "bBt8txvXFy7aRL2SkwbsMw--");
    }

    #[test]
    fn test_timestamp_changes_hash() {
        let url = "http://api.example.com/search?q=shoes";
        let first = sign(url, &credential(), AT);
        let second = sign(url, &credential(), Timestamp::from_secs(1_000_000_001));
        assert_ne!(hash_of(&first), hash_of(&second));
        assert!(second.contains("&timestamp=1000000001&"));
    }

    #[test]
    fn test_deterministic() {
        let url = "http://api.example.com/search?q=shoes&page=3";
        let first = sign(url, &credential(), AT);
        for _ in 0..10 {
            assert_eq!(sign(url, &credential(), AT), first);
        }
    }

    #[test]
    fn test_private_key_never_in_url() {
        let credential = Credential::new("pub123", "very-private").unwrap();
        let signed = sign("http://api.example.com/search?q=1", &credential, AT);
        assert!(!signed.contains("very-private"));
    }

    #[test]
    fn test_signed_hash_shape() {
        let hash = signed_hash("anything");
        assert_eq!(hash.len(), 24);
        assert!(hash.ends_with("--"));
    }

    #[test]
    fn test_scheme_less_inputs_do_not_panic() {
        for url in [
            "",
            "?",
            "?q=1",
            "/search?q=1",
            "//api.example.com/search?q=1",
            "api.example.com/search?q=shoes",
            "http://",
            "http://?q=1",
            "#frag",
        ] {
            let signed = sign(url, &credential(), AT);
            assert!(signed.contains("dkey=pub123&timestamp=1000000000&hash="), "{url}");
        }
    }

    #[test]
    fn test_bare_path_omits_missing_components() {
        let signed = sign("/search?q=1", &credential(), AT);
        assert!(signed.starts_with("/search?q=1&dkey=pub123&timestamp=1000000000&hash="));

        let signed = sign("api.example.com/search?q=shoes", &credential(), AT);
        assert_eq!(
            signed,
            "api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000&hash=pyqJwqeOO8hsQIw5j8vvkA--"
        );
    }

    #[test]
    fn test_fragment_dropped() {
        let with_fragment = sign("http://api.example.com/search?q=shoes#top", &credential(), AT);
        let without = sign("http://api.example.com/search?q=shoes", &credential(), AT);
        assert_eq!(with_fragment, without);
    }

    #[test]
    fn test_without_scheme_token_form() {
        let signer = UrlSigner::new(credential()).with_token_form(TokenForm::WithoutScheme);
        let signed = signer.sign("http://api.example.com/search?q=shoes", AT);

        assert_eq!(
            unsigned_part(&signed),
            "http://api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000"
        );
        assert_eq!(
            hash_of(&signed),
            signed_hash("api.example.com/search?q=shoes&dkey=pub123&timestamp=1000000000secret")
        );
        assert_eq!(hash_of(&signed), "pyqJwqeOO8hsQIw5j8vvkA--");
    }

    #[test]
    fn test_without_scheme_is_scheme_insensitive() {
        let signer = UrlSigner::new(credential()).with_token_form(TokenForm::WithoutScheme);
        let http = signer.sign("http://api.example.com/search?q=shoes", AT);
        let https = signer.sign("https://api.example.com/search?q=shoes", AT);
        assert_eq!(hash_of(&http), hash_of(&https));
    }

    #[test]
    fn test_url_signer_matches_free_function() {
        let signer = UrlSigner::new(credential());
        assert_eq!(signer.token_form(), TokenForm::FullUrl);
        assert_eq!(signer.credential().public_key(), "pub123");

        let url = "http://api.example.com/search?q=shoes";
        assert_eq!(signer.sign(url, AT), sign(url, &credential(), AT));
        assert_eq!(
            signer.sign_with_clock(url, &crate::FixedClock(AT)),
            sign(url, &credential(), AT)
        );
    }

    #[test]
    fn test_sign_now_uses_current_time() {
        let signer = UrlSigner::new(credential());
        let before = Timestamp::now().as_secs();
        let signed = signer.sign_now("http://api.example.com/search");
        let after = Timestamp::now().as_secs();

        let stamp: i64 = signed
            .split("&timestamp=")
            .nth(1)
            .and_then(|rest| rest.split('&').next())
            .unwrap()
            .parse()
            .unwrap();
        assert!((before..=after).contains(&stamp));
    }

    #[test]
    fn test_token_form_serde() {
        assert_eq!(
            serde_json::to_string(&TokenForm::WithoutScheme).unwrap(),
            "\"without_scheme\""
        );
        let parsed: TokenForm = serde_json::from_str("\"full_url\"").unwrap();
        assert_eq!(parsed, TokenForm::FullUrl);
    }
}

#[cfg(test)]
mod proptests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::canonical::encode_pairs;
    use proptest::prelude::*;

    fn credential() -> Credential {
        Credential::new("pub123", "secret").unwrap()
    }

    proptest! {
        #[test]
        fn permutation_invariance(
            params in prop::collection::btree_map("[a-zA-Z0-9_]{1,8}", ".{0,12}", 0..8),
            seed in any::<u64>(),
            secs in 0i64..4_000_000_000,
        ) {
            let forward: Vec<_> = params.iter().collect();
            let mut shuffled = forward.clone();
            // Deterministic rotation driven by the seed
            if !shuffled.is_empty() {
                let by = usize::try_from(seed % shuffled.len() as u64).unwrap();
                shuffled.rotate_left(by);
                shuffled.reverse();
            }

            let at = Timestamp::from_secs(secs);
            let a = sign(&format!("http://api.example.com/search?{}", encode_pairs(forward)), &credential(), at);
            let b = sign(&format!("http://api.example.com/search?{}", encode_pairs(shuffled)), &credential(), at);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn hash_alphabet_is_url_safe(url in ".*", private_key in ".{1,32}", secs in any::<i64>()) {
            let credential = Credential::new("pub", private_key).unwrap();
            let signed = sign(&url, &credential, Timestamp::from_secs(secs));
            let hash = signed.rsplit_once("&hash=").unwrap().1;
            prop_assert_eq!(hash.len(), 24);
            prop_assert!(!hash.contains(['+', '/', '=']));
        }

        #[test]
        fn auth_parameters_follow_caller_parameters(
            params in prop::collection::btree_map("[a-z]{1,6}", "[a-z0-9]{0,6}", 1..6),
        ) {
            let query = encode_pairs(params.iter().rev());
            let signed = sign(&format!("http://h/p?{query}"), &credential(), Timestamp::from_secs(1));
            let expected = format!("http://h/p?{}&dkey=pub123&timestamp=1&hash=", encode_pairs(&params));
            prop_assert!(signed.starts_with(&expected));
        }
    }
}
