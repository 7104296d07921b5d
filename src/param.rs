// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

//! Link params and the decoding of their raw values.

use crate::error::ErrorKind;
use percent_encoding::{percent_decode_str, percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::borrow::Cow;
use std::fmt::{self, Display};

/// RFC8187 `attr-char`. Everything else is percent-encoded when serializing
/// an extended value.
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Charsets recognised in extended values, keyed by lowercase label.
const CHARSETS: &[(&str, Charset)] = &[
    ("utf-8", Charset::Utf8),
    ("iso-8859-1", Charset::Iso8859_1),
];

/// A link param pair.
///
/// The name is always lowercase. Extended params keep their trailing `*`, so
/// `title` and `title*` are different params.
///
/// ## Examples
///
/// ```
/// use http_link_header::param::{Param, Value};
///
/// let param = Param::new("Title", "next chapter");
///
/// assert_eq!(param.name(), "title");
/// assert_eq!(param.value(), &Value::Simple("next chapter".into()));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    name: String,
    value: Value,
}

impl Param {
    pub fn new(name: impl AsRef<str>, value: impl Into<Value>) -> Param {
        Param {
            name: name.as_ref().to_lowercase(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// Consumes the param and returns its value.
    pub fn into_value(self) -> Value {
        self.value
    }

    /// A star param e.g. "title*" is a param marked to identify that its value
    /// is an extended value.
    pub fn is_star(&self) -> bool {
        self.name.ends_with('*')
    }
}

impl Display for Param {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "{}={}", self.name, self.value)
    }
}

/// The character encoding of an extended value.
///
/// RFC8187 Section 3.2.1 names it as "charset" and defines it as:
///
/// ```abnf
/// charset = "UTF-8" / mime-charset
/// ```
///
/// Only UTF-8 and ISO-8859-1 (still required by RFC5987) are understood.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Charset {
    Utf8,
    Iso8859_1,
}

impl Charset {
    /// Looks up a charset label, ignoring case.
    pub fn from_label(label: &str) -> Option<Charset> {
        CHARSETS
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(label))
            .map(|(_, charset)| *charset)
    }

    fn decode(self, bytes: &[u8]) -> Result<String, ErrorKind> {
        match self {
            Charset::Utf8 => {
                String::from_utf8(bytes.to_vec()).map_err(|_| ErrorKind::InvalidPercentEncoding)
            }
            Charset::Iso8859_1 => Ok(bytes.iter().map(|&b| b as char).collect()),
        }
    }
}

impl Display for Charset {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Charset::Utf8 => write!(formatter, "UTF-8"),
            Charset::Iso8859_1 => write!(formatter, "ISO-8859-1"),
        }
    }
}

/// A decoded RFC8187 extended value.
///
/// ```
/// use http_link_header::param::{Charset, ExtendedValue};
///
/// let value = ExtendedValue {
///     charset: Charset::Utf8,
///     language: Some("en".into()),
///     text: "GBP (£)".into(),
/// };
///
/// assert_eq!(value.to_string(), "UTF-8'en'GBP%20%28%C2%A3%29");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExtendedValue {
    pub charset: Charset,
    pub language: Option<String>,
    pub text: String,
}

impl ExtendedValue {
    pub fn utf8(language: Option<&str>, text: impl Into<String>) -> ExtendedValue {
        ExtendedValue {
            charset: Charset::Utf8,
            language: language.map(Into::into),
            text: text.into(),
        }
    }

    /// Whether the language, if any, can be written back unquoted.
    pub(crate) fn has_language_tag_shape(&self) -> bool {
        self.language.as_ref().map_or(true, |tag| is_language_tag(tag))
    }
}

impl Display for ExtendedValue {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        let latin1: Option<Vec<u8>> = match self.charset {
            Charset::Iso8859_1 => self
                .text
                .chars()
                .map(|c| if (c as u32) <= 0xFF { Some(c as u8) } else { None })
                .collect(),
            Charset::Utf8 => None,
        };

        let (charset, bytes) = match &latin1 {
            Some(bytes) => (Charset::Iso8859_1, &bytes[..]),
            None => (Charset::Utf8, self.text.as_bytes()),
        };

        write!(
            formatter,
            "{}'{}'{}",
            charset,
            self.language.as_ref().map(String::as_str).unwrap_or(""),
            percent_encode(bytes, ATTR_CHAR)
        )
    }
}

/// A param value, either a simple text or an extended value carrying a
/// charset and optionally a language tag.
///
/// `Display` renders the value as it goes on the wire: simple values are
/// quoted when they are not a valid token.
///
/// ```
/// use http_link_header::param::Value;
///
/// assert_eq!(Value::from("next").to_string(), "next");
/// assert_eq!(Value::from("a, b").to_string(), r#""a, b""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Simple(String),
    Extended(ExtendedValue),
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Simple(s.into())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Simple(s)
    }
}

impl From<ExtendedValue> for Value {
    fn from(value: ExtendedValue) -> Value {
        Value::Extended(value)
    }
}

impl Value {
    /// Returns the text value from either simple or extended values.
    pub fn text(&self) -> &str {
        match self {
            Value::Simple(value) => value,
            Value::Extended(value) => &value.text,
        }
    }

    pub fn is_extended(&self) -> bool {
        match self {
            Value::Extended(_) => true,
            _ => false,
        }
    }

    pub fn is_simple(&self) -> bool {
        !self.is_extended()
    }
}

impl Display for Value {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Simple(value) => write!(formatter, "{}", quote_if_needed(value)),
            Value::Extended(value) => write!(formatter, "{}", value),
        }
    }
}

/// Decodes the raw text of a param value.
///
/// `raw` is the text between the quotes when `quoted` is true, the bare token
/// otherwise. Names ending in `*` are decoded as RFC8187 extended values.
///
/// ```
/// use http_link_header::param::{decode, ExtendedValue, Value};
///
/// let value = decode("title*", "UTF-8'en'%e2%82%ac%20rate", false).unwrap();
///
/// assert_eq!(value, Value::Extended(ExtendedValue::utf8(Some("en"), "€ rate")));
/// ```
pub fn decode(name: &str, raw: &str, quoted: bool) -> Result<Value, ErrorKind> {
    let text = if quoted {
        Cow::Owned(unescape(raw)?)
    } else {
        Cow::Borrowed(raw)
    };

    if name.ends_with('*') {
        decode_extended(&text).map(Value::Extended)
    } else {
        Ok(Value::Simple(text.into_owned()))
    }
}

/// Decodes `charset'[language]'value-chars` (RFC8187 Section 3.2.1).
///
/// The language must look like a RFC5646 tag: letters, digits and `-`.
pub fn decode_extended(raw: &str) -> Result<ExtendedValue, ErrorKind> {
    let mut fields = raw.splitn(3, '\'');

    let (label, language, encoded) = match (fields.next(), fields.next(), fields.next()) {
        (Some(label), Some(language), Some(encoded)) => (label, language, encoded),
        _ => return Err(ErrorKind::MalformedExtendedValue),
    };

    let charset = Charset::from_label(label).ok_or(ErrorKind::UnsupportedCharset)?;

    if !language.is_empty() && !is_language_tag(language) {
        return Err(ErrorKind::MalformedExtendedValue);
    }

    if !is_percent_encoded(encoded) {
        return Err(ErrorKind::InvalidPercentEncoding);
    }

    let bytes: Vec<u8> = percent_decode_str(encoded).collect();
    let language = if language.is_empty() {
        None
    } else {
        Some(language.to_string())
    };

    Ok(ExtendedValue {
        charset,
        language,
        text: charset.decode(&bytes)?,
    })
}

/// Removes quoted-pair escapes from the inside of a quoted string.
///
/// Only `\"` and `\\` are escapes, any other backslash is kept as is.
///
/// ```
/// use http_link_header::param::unescape;
///
/// assert_eq!(unescape(r#"one \"two\" three"#).unwrap(), r#"one "two" three"#);
/// assert!(unescape(r"dangling\").is_err());
/// ```
pub fn unescape(raw: &str) -> Result<String, ErrorKind> {
    let mut text = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            text.push(c);
            continue;
        }

        match chars.next() {
            Some(escaped @ '"') | Some(escaped @ '\\') => text.push(escaped),
            Some(other) => {
                text.push('\\');
                text.push(other);
            }
            None => return Err(ErrorKind::InvalidEscapeSequence),
        }
    }

    Ok(text)
}

/// Splits a `rel` value into lowercase relation types, dropping duplicates
/// but keeping the order in which they first appear.
///
/// ```
/// use http_link_header::param::split_relations;
///
/// assert_eq!(split_relations("next Next prev next"), vec!["next", "prev"]);
/// ```
pub fn split_relations(value: &str) -> Vec<String> {
    let mut relations: Vec<String> = Vec::new();

    for relation in value.split_whitespace() {
        let relation = relation.to_lowercase();

        if !relations.contains(&relation) {
            relations.push(relation);
        }
    }

    relations
}

/// Renders `value` as a token when possible, as a quoted string otherwise.
pub(crate) fn quote_if_needed(value: &str) -> Cow<str> {
    let needs_quotes = value.is_empty()
        || value
            .chars()
            .any(|c| ";,\"".contains(c) || c.is_whitespace());

    if needs_quotes {
        Cow::Owned(quote(value))
    } else {
        Cow::Borrowed(value)
    }
}

/// Wraps `value` in double quotes, escaping `"` and `\`.
pub(crate) fn quote(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');

    for c in value.chars() {
        if c == '"' || c == '\\' {
            quoted.push('\\');
        }
        quoted.push(c);
    }

    quoted.push('"');
    quoted
}

/// RFC7230 `token`, as used for param names.
pub(crate) fn is_token(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}

/// Whether `bytes[i]` starts a `%XX` escape.
pub(crate) fn is_percent_escape(bytes: &[u8], i: usize) -> bool {
    bytes.get(i) == Some(&b'%')
        && bytes.len() > i + 2
        && bytes[i + 1].is_ascii_hexdigit()
        && bytes[i + 2].is_ascii_hexdigit()
}

fn is_percent_encoded(text: &str) -> bool {
    let bytes = text.as_bytes();

    bytes
        .iter()
        .enumerate()
        .all(|(i, &b)| b != b'%' || is_percent_escape(bytes, i))
}

fn is_language_tag(text: &str) -> bool {
    !text.is_empty()
        && text
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-')
}
