//! URL decomposition and canonical query strings.
//!
//! The splitter never fails and never normalizes: hosts keep their case, no
//! `/` path is inserted and nothing is re-escaped. Only the query is rewritten.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// The components of a URL relevant to signing.
///
/// Any fragment is dropped during splitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UrlParts<'a> {
    /// Scheme without the trailing `:`.
    pub scheme: Option<&'a str>,
    /// Host with optional userinfo and port, without the leading `//`.
    pub authority: Option<&'a str>,
    /// Path, possibly empty.
    pub path: &'a str,
    /// Raw query string without the leading `?`.
    pub query: Option<&'a str>,
}

impl<'a> UrlParts<'a> {
    /// Split `url` into its components.
    ///
    /// Inputs without a scheme or host are accepted; the missing components
    /// are reported as `None`.
    #[must_use]
    pub fn split(url: &'a str) -> Self {
        let url = url.split_once('#').map_or(url, |(before, _)| before);
        let (rest, query) = match url.split_once('?') {
            Some((rest, query)) => (rest, Some(query)),
            None => (url, None),
        };

        let (scheme, hierarchy) = match rest.split_once("://") {
            Some((scheme, after)) if is_scheme(scheme) => (Some(scheme), Some(after)),
            _ => (None, rest.strip_prefix("//")),
        };

        let (authority, path) = hierarchy.map_or((None, rest), |hierarchy| {
            let end = hierarchy.find('/').unwrap_or(hierarchy.len());
            (Some(&hierarchy[..end]), &hierarchy[end..])
        });

        Self {
            scheme,
            authority,
            path,
            query,
        }
    }

    /// Scheme, authority and path reassembled, without the query.
    #[must_use]
    pub fn base(&self) -> String {
        let mut base = String::new();
        if let Some(scheme) = self.scheme {
            base.push_str(scheme);
            base.push(':');
        }
        if let Some(authority) = self.authority {
            base.push_str("//");
            base.push_str(authority);
        }
        base.push_str(self.path);
        base
    }

    /// The URL rewritten so that the authentication parameters can be appended.
    ///
    /// With a non-empty query this is `base?sorted-query&`; otherwise it is
    /// `base?`.
    #[must_use]
    pub fn canonical_prefix(&self) -> String {
        let mut prefix = self.base();
        prefix.push('?');

        let query = self.query.map(canonical_query).unwrap_or_default();
        if !query.is_empty() {
            prefix.push_str(&query);
            prefix.push('&');
        }
        prefix
    }
}

/// Sort a query string by key.
///
/// The query is form-decoded, pairs with empty keys are dropped, later
/// duplicates replace earlier ones, keys are ordered byte-wise and the result
/// is form-encoded again.
///
/// # Examples
///
/// ```
/// use wls_signer::canonical_query;
///
/// assert_eq!(canonical_query("b=2&a=1&q=red%20shoes"), "a=1&b=2&q=red+shoes");
/// ```
#[must_use]
pub fn canonical_query(query: &str) -> String {
    let params: BTreeMap<String, String> = form_urlencoded::parse(query.as_bytes())
        .filter(|(key, _)| !key.is_empty())
        .map(|(key, value)| (key.into_owned(), value.into_owned()))
        .collect();

    encode_pairs(&params)
}

/// Form-encode key/value pairs in iteration order.
///
/// Only ASCII alphanumerics and `-`, `_`, `.` are left as-is; `*` is escaped
/// as `%2A` like every other reserved byte.
#[must_use]
pub fn encode_pairs<I, K, V>(pairs: I) -> String
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: AsRef<str>,
{
    let encoded = form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();

    // A literal `*` can only be one the serializer left unescaped
    if encoded.contains('*') {
        encoded.replace('*', "%2A")
    } else {
        encoded
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}
