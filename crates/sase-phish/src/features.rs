//! URL Feature Extraction
//!
//! Lexical and structural features derived from the raw URL string. Extraction
//! is total: components that cannot be found degrade to empty strings and the
//! features computed from them to zero.

use crate::schema::FeatureSchema;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::sync::OnceLock;

/// Feature names in the order [`extract_features`] produces them
pub const FEATURE_NAMES: [&str; 19] = [
    "url_length",
    "hostname_length",
    "path_length",
    "query_length",
    "uses_ip",
    "num_digits",
    "num_letters",
    "num_special_chars",
    "num_dots",
    "num_hyphens",
    "num_underscores",
    "num_slashes",
    "num_questionmarks",
    "num_equals",
    "num_ampersands",
    "num_at",
    "is_https",
    "has_redirect",
    "shortening_service",
];

/// Hostname fragments of known URL shortening services
pub const SHORTENER_DOMAINS: [&str; 5] = ["bit.ly", "goo.gl", "tinyurl", "t.co", "ow.ly"];

const COUNTED_CHARS: [(&str, char); 8] = [
    ("num_dots", '.'),
    ("num_hyphens", '-'),
    ("num_underscores", '_'),
    ("num_slashes", '/'),
    ("num_questionmarks", '?'),
    ("num_equals", '='),
    ("num_ampersands", '&'),
    ("num_at", '@'),
];

/// Ordered feature name → value mapping for one URL
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FeatureVector {
    entries: Vec<(String, u64)>,
}

impl FeatureVector {
    /// Build from ordered entries. Later duplicates of a name are ignored.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, u64)>,
        S: Into<String>,
    {
        let mut vector = Self::default();
        for (name, value) in entries {
            vector.push(name.into(), value);
        }
        vector
    }

    fn push(&mut self, name: String, value: u64) {
        if self.get(&name).is_none() {
            self.entries.push((name, value));
        }
    }

    /// Value for a feature name
    pub fn get(&self, name: &str) -> Option<u64> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| *v)
    }

    /// Number of features
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the vector has no features
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(name, value)` pairs in order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), *v))
    }

    /// Feature names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    /// Row aligned to `schema`: schema order, unknown names dropped, missing names 0
    pub fn aligned(&self, schema: &FeatureSchema) -> Vec<f64> {
        schema
            .names()
            .iter()
            .map(|name| self.get(name).unwrap_or(0) as f64)
            .collect()
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Components of a URL split along the generic URI syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UrlParts<'a> {
    /// Scheme as written, empty if absent
    pub scheme: &'a str,
    /// Authority after `//`, `None` if the URL has none
    pub authority: Option<&'a str>,
    /// Path, possibly empty
    pub path: &'a str,
    /// Query without the leading `?`
    pub query: &'a str,
    /// Fragment without the leading `#`
    pub fragment: &'a str,
}

impl<'a> UrlParts<'a> {
    /// Split a URL into components. Never fails.
    pub fn split(url: &'a str) -> Self {
        let mut parts = Self::default();
        let mut rest = url;

        if let Some(colon) = rest.find(':') {
            let candidate = &rest[..colon];
            if is_scheme(candidate) {
                parts.scheme = candidate;
                rest = &rest[colon + 1..];
            }
        }

        if let Some(after) = rest.strip_prefix("//") {
            let end = after
                .find(|c| matches!(c, '/' | '?' | '#'))
                .unwrap_or(after.len());
            parts.authority = Some(&after[..end]);
            rest = &after[end..];
        }

        let path_end = rest.find(|c| matches!(c, '?' | '#')).unwrap_or(rest.len());
        parts.path = &rest[..path_end];
        rest = &rest[path_end..];

        if let Some(after) = rest.strip_prefix('?') {
            let end = after.find('#').unwrap_or(after.len());
            parts.query = &after[..end];
            rest = &after[end..];
        }

        if let Some(after) = rest.strip_prefix('#') {
            parts.fragment = after;
        }

        parts
    }

    /// Lowercased hostname: userinfo, port and IPv6 brackets removed
    pub fn hostname(&self) -> String {
        let Some(authority) = self.authority else {
            return String::new();
        };
        let host_port = authority.rsplit('@').next().unwrap_or("");

        let host = if let Some(bracketed) = host_port.strip_prefix('[') {
            bracketed.split(']').next().unwrap_or("")
        } else {
            host_port.split(':').next().unwrap_or("")
        };
        host.to_lowercase()
    }
}

fn is_scheme(candidate: &str) -> bool {
    let mut chars = candidate.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() => {
            chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        }
        _ => false,
    }
}

fn ipv4_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").ok())
        .as_ref()
}

/// Dotted-quad check on a hostname. Lexical only: octets are not range-checked.
pub fn is_ip_host(hostname: &str) -> bool {
    ipv4_pattern()
        .map(|r| r.is_match(hostname))
        .unwrap_or(false)
}

/// Whether the hostname contains a known shortener domain
pub fn is_shortener_host(hostname: &str) -> bool {
    !hostname.is_empty() && SHORTENER_DOMAINS.iter().any(|s| hostname.contains(*s))
}

/// Extract the feature vector for a URL.
///
/// Scheme comparison is case-sensitive: `HTTPS://…` does not count as https.
pub fn extract_features(url: &str) -> FeatureVector {
    let parts = UrlParts::split(url);
    let hostname = parts.hostname();

    let mut entries: Vec<(&str, u64)> = Vec::with_capacity(FEATURE_NAMES.len());
    entries.push(("url_length", char_len(url)));
    entries.push(("hostname_length", char_len(&hostname)));
    entries.push(("path_length", char_len(parts.path)));
    entries.push(("query_length", char_len(parts.query)));
    entries.push(("uses_ip", flag(is_ip_host(&hostname))));

    entries.push(("num_digits", count(url, |c| c.is_ascii_digit())));
    entries.push(("num_letters", count(url, |c| c.is_alphabetic())));
    entries.push(("num_special_chars", count(url, |c| !c.is_alphanumeric())));
    for (name, ch) in COUNTED_CHARS {
        entries.push((name, count(url, |c| c == ch)));
    }

    entries.push(("is_https", flag(parts.scheme == "https")));
    entries.push(("has_redirect", flag(parts.path.contains("//"))));
    entries.push(("shortening_service", flag(is_shortener_host(&hostname))));

    FeatureVector::from_entries(entries)
}

fn char_len(s: &str) -> u64 {
    s.chars().count() as u64
}

fn count(s: &str, pred: impl Fn(char) -> bool) -> u64 {
    s.chars().filter(|&c| pred(c)).count() as u64
}

fn flag(condition: bool) -> u64 {
    u64::from(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn feature(url: &str, name: &str) -> u64 {
        extract_features(url).get(name).unwrap()
    }

    #[test]
    fn test_feature_order() {
        let v = extract_features("https://www.google.com");
        let names: Vec<&str> = v.names().collect();
        assert_eq!(names, FEATURE_NAMES.to_vec());
    }

    #[test]
    fn test_uses_ip() {
        assert_eq!(feature("http://142.251.16.100/search", "uses_ip"), 1);
        assert_eq!(feature("https://www.google.com", "uses_ip"), 0);
        // Lexical check only
        assert_eq!(feature("http://999.999.999.999/", "uses_ip"), 1);
        assert_eq!(feature("http://1.2.3/", "uses_ip"), 0);
    }

    #[test]
    fn test_shortening_service() {
        assert_eq!(feature("https://bit.ly/3abc", "shortening_service"), 1);
        assert_eq!(feature("http://www.tinyurl.com/xyz", "shortening_service"), 1);
        assert_eq!(feature("http://go.ow.ly/x", "shortening_service"), 1);
        assert_eq!(feature("https://www.google.com", "shortening_service"), 0);
        // Only the hostname is searched
        assert_eq!(feature("https://example.com/bit.ly", "shortening_service"), 0);
    }

    #[test]
    fn test_is_https_case_sensitive() {
        assert_eq!(feature("https://example.com", "is_https"), 1);
        assert_eq!(feature("http://example.com", "is_https"), 0);
        assert_eq!(feature("HTTPS://example.com", "is_https"), 0);
    }

    #[test]
    fn test_num_digits_ascii_only() {
        assert_eq!(feature("http://a.com/7½Ⅻ²", "num_digits"), 1);
    }

    #[test]
    fn test_component_lengths() {
        let v = extract_features("http://secure-bank-login.com?verify=account&user=1");
        assert_eq!(v.get("hostname_length"), Some(21));
        assert_eq!(v.get("path_length"), Some(0));
        assert_eq!(v.get("query_length"), Some(21));
        assert_eq!(v.get("num_equals"), Some(2));
        assert_eq!(v.get("num_ampersands"), Some(1));
        assert_eq!(v.get("num_questionmarks"), Some(1));

        let v = extract_features("http://paypal-security-update.com/login.php");
        assert_eq!(v.get("url_length"), Some(43));
        assert_eq!(v.get("hostname_length"), Some(26));
        assert_eq!(v.get("path_length"), Some(10));
        assert_eq!(v.get("num_hyphens"), Some(2));
        assert_eq!(v.get("num_slashes"), Some(3));
        assert_eq!(v.get("num_letters"), Some(35));
        assert_eq!(v.get("num_special_chars"), Some(8));
    }

    #[test]
    fn test_hostname_parsing() {
        assert_eq!(UrlParts::split("http://user:pw@Example.COM:8080/x").hostname(), "example.com");
        assert_eq!(UrlParts::split("http://[::1]:80/").hostname(), "::1");
        assert_eq!(UrlParts::split("example.com/login").hostname(), "");
    }

    #[test]
    fn test_has_redirect() {
        assert_eq!(feature("http://example.com//evil.com", "has_redirect"), 1);
        assert_eq!(feature("http://example.com/a/b", "has_redirect"), 0);
    }

    #[test]
    fn test_degenerate_inputs() {
        for url in ["", "example.com/login", "?only=query", "://", "#frag", "http://"] {
            let v = extract_features(url);
            assert_eq!(v.len(), FEATURE_NAMES.len());
            assert_eq!(v.get("hostname_length"), Some(0));
            assert_eq!(v.get("uses_ip"), Some(0));
            assert_eq!(v.get("shortening_service"), Some(0));
        }
        let v = extract_features("?only=query");
        assert_eq!(v.get("path_length"), Some(0));
        assert_eq!(v.get("query_length"), Some(10));
    }

    #[test]
    fn test_serialize_keeps_order() {
        let v = FeatureVector::from_entries([("b", 2), ("a", 1)]);
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"b":2,"a":1}"#);
    }

    proptest! {
        #[test]
        fn prop_extract_total_and_pure(url in ".*") {
            let a = extract_features(&url);
            let b = extract_features(&url);
            prop_assert_eq!(a.len(), FEATURE_NAMES.len());
            prop_assert_eq!(a, b);
        }

        #[test]
        fn prop_url_length_counts_chars(url in "[a-z:/?.=&-]{0,64}") {
            prop_assert_eq!(feature(&url, "url_length"), url.chars().count() as u64);
        }
    }
}
