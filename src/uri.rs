// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

//! URI references and the collaborator that validates and resolves them.

use crate::error::Result;
use crate::param::is_percent_escape;
use std::fmt::{self, Display};
use url::Url;

/// Used to check relative references, which `Url` cannot parse on their own.
const PLACEHOLDER_BASE: &str = "http://placeholder.invalid/";

/// A URI reference (RFC 3986 Section 4.1), either absolute or relative.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct UriRef(String);

impl UriRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for UriRef {
    fn from(s: String) -> Self {
        UriRef(s)
    }
}

impl From<&str> for UriRef {
    fn from(s: &str) -> Self {
        UriRef(s.to_string())
    }
}

impl AsRef<str> for UriRef {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for UriRef {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl PartialEq<str> for UriRef {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for UriRef {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// Validates and resolves URI references.
///
/// The parser never interprets URI grammar itself; it hands target and anchor
/// text to an implementation of this trait.
pub trait UriResolver {
    /// Whether `reference` is a valid URI reference.
    fn validate(&self, reference: &str) -> bool;

    /// Whether `base` can be used as a base URI, i.e. it is absolute.
    fn validate_base(&self, base: &str) -> bool;

    /// Resolves `reference` against `base` (RFC 3986 Section 5).
    fn resolve(&self, base: &str, reference: &str) -> Result<String>;
}

/// The default resolver, backed by the `url` crate.
///
/// ```
/// use http_link_header::uri::{UriResolver, UrlResolver};
///
/// let resolver = UrlResolver;
///
/// assert!(resolver.validate("../terms"));
/// assert!(!resolver.validate("http://exa mple.org"));
/// assert_eq!(
///     resolver.resolve("https://a/b/c/d;p?q", "../g").unwrap(),
///     "https://a/b/g"
/// );
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct UrlResolver;

impl UriResolver for UrlResolver {
    fn validate(&self, reference: &str) -> bool {
        if !has_reference_chars(reference) {
            return false;
        }

        match Url::parse(reference) {
            Ok(_) => true,
            Err(url::ParseError::RelativeUrlWithoutBase) => Url::parse(PLACEHOLDER_BASE)
                .and_then(|base| base.join(reference))
                .is_ok(),
            Err(_) => false,
        }
    }

    fn validate_base(&self, base: &str) -> bool {
        has_reference_chars(base) && Url::parse(base).is_ok()
    }

    fn resolve(&self, base: &str, reference: &str) -> Result<String> {
        let url = Url::parse(base)?.join(reference)?;

        Ok(url.into())
    }
}

/// Rejects characters that can never appear in a URI reference, whatever its
/// components. Non-ASCII characters are accepted so IRIs pass through.
fn has_reference_chars(text: &str) -> bool {
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'%' => {
                if !is_percent_escape(bytes, i) {
                    return false;
                }

                i += 3;
                continue;
            }
            b' ' | b'"' | b'<' | b'>' | b'\\' | b'^' | b'`' | b'{' | b'|' | b'}' => return false,
            b if b.is_ascii_control() => return false,
            _ => (),
        }

        i += 1;
    }

    true
}
