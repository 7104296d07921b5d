// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

//! Link header parsing.
//!
//! A header value goes through three stages: [`split_entries`] finds the
//! link-values, [`parse_entry`] extracts the target and raw params of each one
//! with the RFC8288 grammar, and [`decode`] turns raw params into values. The
//! [`LinkParser`] glues them together and collects entry-local errors instead
//! of failing.

use crate::error::{ErrorKind, ParserError, Result};
use crate::header::{EntryError, LinkCollection};
use crate::link::Link;
use crate::param::{decode, is_token};
use crate::tokenizer::split_entries;
use crate::uri::{UriResolver, UrlResolver};
use pest::iterators::Pair;
use pest::Parser;
use tracing::{debug, trace};

#[derive(Parser)]
#[grammar = "rfc8288.pest"]
pub struct Rfc8288Parser;

type EntryResult<T> = ::std::result::Result<T, ErrorKind>;

/// A link-value split into its target and raw params, before any decoding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawEntry<'a> {
    pub target: &'a str,
    pub params: Vec<RawParam<'a>>,
}

/// A `name[=value]` param as written. `value` excludes the surrounding quotes
/// of a quoted string but keeps its escapes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawParam<'a> {
    pub name: &'a str,
    pub value: &'a str,
    pub quoted: bool,
    pub text: &'a str,
}

impl<'a> RawParam<'a> {
    fn from_rule(pair: Pair<'a, Rule>) -> RawParam<'a> {
        let text = pair.as_str();
        let mut name = "";
        let mut value = "";
        let mut quoted = false;

        for inner_pair in pair.into_inner() {
            match inner_pair.as_rule() {
                Rule::name => name = inner_pair.as_str(),

                Rule::token => value = inner_pair.as_str(),

                Rule::quoted_string => {
                    quoted = true;
                    value = inner_pair
                        .into_inner()
                        .next()
                        .map(|text| text.as_str())
                        .unwrap_or("");
                }

                _ => unreachable!(),
            }
        }

        RawParam {
            name,
            value,
            quoted,
            text,
        }
    }
}

/// Parses a single link-value.
///
/// ```
/// use http_link_header::parser::parse_entry;
///
/// let entry = parse_entry(r#"<https://example.org>; rel="next"; foo"#).unwrap();
///
/// assert_eq!(entry.target, "https://example.org");
/// assert_eq!(entry.params[0].name, "rel");
/// assert_eq!(entry.params[0].value, "next");
/// assert!(entry.params[0].quoted);
/// assert_eq!(entry.params[1].name, "foo");
/// ```
pub fn parse_entry(text: &str) -> EntryResult<RawEntry> {
    let pair = Rfc8288Parser::parse(Rule::link, text)
        .map_err(|err| {
            trace!(error = %err, "entry does not start with a target");
            ErrorKind::MalformedTarget
        })?
        .next()
        .ok_or(ErrorKind::MalformedTarget)?;

    if pair.as_span().end() != text.len() {
        return Err(ErrorKind::UnexpectedTrailingContent);
    }

    let mut target = "";
    let mut params = vec![];

    for inner_pair in pair.into_inner() {
        match inner_pair.as_rule() {
            Rule::target => target = inner_pair.as_str(),

            Rule::param => params.push(RawParam::from_rule(inner_pair)),

            _ => unreachable!(),
        }
    }

    Ok(RawEntry { target, params })
}

/// Parses a Link header value.
///
/// Targets are kept as written. Fails only when entry boundaries cannot be
/// found; every other problem is reported in [`LinkCollection::errors`].
///
/// ```
/// let header = http_link_header::parse(r#"</TheBook/chapter4>; rel="next""#).unwrap();
///
/// assert_eq!(header.links()[0].target(), "/TheBook/chapter4");
/// ```
pub fn parse(input: &str) -> Result<LinkCollection> {
    LinkParser::new().parse(input)
}

/// Parses a Link header value resolving targets and anchors against `base`.
///
/// Besides the splitting failures of [`parse`], this fails with
/// [`ParserError::InvalidBase`] when `base` is not an absolute URI.
///
/// ```
/// let header = http_link_header::parse_with_base(
///     r#"</index>; rel="index""#,
///     "https://example.com/docs/page",
/// )
/// .unwrap();
///
/// assert_eq!(header.links()[0].target(), "https://example.com/index");
/// ```
pub fn parse_with_base(input: &str, base: &str) -> Result<LinkCollection> {
    LinkParser::new().base(base).parse(input)
}

/// Parses several header field lines as a single Link header.
///
/// See [`LinkParser::parse_fields`].
pub fn parse_fields<I, S>(fields: I, base: Option<&str>) -> Result<LinkCollection>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let parser = match base {
        Some(base) => LinkParser::new().base(base),
        None => LinkParser::new(),
    };

    parser.parse_fields(fields)
}

/// A configurable Link header parser.
///
/// ```
/// use http_link_header::LinkParser;
///
/// let parser = LinkParser::new()
///     .base("https://example.org/a/b")
///     .require_relation(true);
///
/// let header = parser.parse(r#"<terms>; rel="copyright", <other>"#).unwrap();
///
/// assert_eq!(header.len(), 1);
/// assert_eq!(header.links()[0].target(), "https://example.org/a/terms");
/// assert_eq!(header.errors().len(), 1);
/// ```
#[derive(Clone, Debug, Default)]
pub struct LinkParser<R = UrlResolver> {
    base: Option<String>,
    require_relation: bool,
    resolver: R,
}

impl LinkParser<UrlResolver> {
    pub fn new() -> LinkParser<UrlResolver> {
        LinkParser::default()
    }
}

impl<R: UriResolver> LinkParser<R> {
    /// Resolves targets and anchors against `base`, which must be absolute.
    /// Otherwise [`LinkParser::parse`] fails with [`ParserError::InvalidBase`].
    pub fn base(mut self, base: impl Into<String>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// Drops link-values without a `rel` param instead of keeping them with a
    /// `MissingRelation` error.
    pub fn require_relation(mut self, require: bool) -> Self {
        self.require_relation = require;
        self
    }

    /// Replaces the URI collaborator.
    pub fn resolver<S: UriResolver>(self, resolver: S) -> LinkParser<S> {
        LinkParser {
            base: self.base,
            require_relation: self.require_relation,
            resolver,
        }
    }

    pub fn parse(&self, input: &str) -> Result<LinkCollection> {
        if let Some(base) = &self.base {
            if !self.resolver.validate_base(base) {
                debug!(base = %base, "rejecting header, base URI is not absolute");
                return Err(ParserError::InvalidBase(base.clone()).into());
            }
        }

        let entries = split_entries(input).map_err(|err| {
            debug!(error = %err, "rejecting header");
            err
        })?;

        let mut links = Vec::with_capacity(entries.len());
        let mut errors = Vec::new();

        for (index, entry) in entries.into_iter().enumerate() {
            trace!(index, offset = entry.offset, text = %entry.text, "parsing entry");

            match self.link_from_entry(index, &entry.text) {
                Ok((link, diagnostics)) => {
                    links.push(link);
                    errors.extend(diagnostics);
                }
                Err(kind) => {
                    debug!(index, offset = entry.offset, %kind, "dropping link entry");
                    errors.push(EntryError::new(index, kind, entry.text));
                }
            }
        }

        Ok(LinkCollection::with_errors(links, errors))
    }

    /// Parses several header field lines as a single Link header.
    ///
    /// A line is either a bare field value or `name: value`. Lines for fields
    /// other than `Link` are ignored. Values are combined as one list, so
    /// entry indices and offsets refer to the combined value.
    ///
    /// ```
    /// use http_link_header::LinkParser;
    ///
    /// let fields = [
    ///     r#"Link: <https://example.com/1>; rel="prev""#,
    ///     "Content-Type: text/html",
    ///     r#"<https://example.com/3>; rel="next""#,
    /// ];
    ///
    /// let header = LinkParser::new().parse_fields(&fields).unwrap();
    ///
    /// assert_eq!(header.len(), 2);
    /// ```
    pub fn parse_fields<I, S>(&self, fields: I) -> Result<LinkCollection>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let values: Vec<String> = fields
            .into_iter()
            .filter_map(|field| field_value(field.as_ref()).map(str::to_string))
            .collect();

        self.parse(&values.join(", "))
    }

    fn link_from_entry(&self, index: usize, text: &str) -> EntryResult<(Link, Vec<EntryError>)> {
        let raw = parse_entry(text)?;
        let mut builder = Link::builder(self.resolve_reference(raw.target)?);
        let mut diagnostics = Vec::new();

        for param in &raw.params {
            let outcome = decode(param.name, param.value, param.quoted)
                .and_then(|value| builder.insert(param.name, value));

            if let Err(kind) = outcome {
                trace!(index, %kind, param = param.text, "ignoring param");
                diagnostics.push(EntryError::new(index, kind, param.text));
            }
        }

        if !builder.has_rel() {
            if self.require_relation {
                return Err(ErrorKind::MissingRelation);
            }

            diagnostics.push(EntryError::new(index, ErrorKind::MissingRelation, text));
        }

        let context = match builder.anchor() {
            Some(anchor) => match self.resolve_reference(&anchor) {
                Ok(context) => Some(context),
                Err(kind) => {
                    diagnostics.push(EntryError::new(index, kind, anchor));
                    self.base.clone()
                }
            },
            None => self.base.clone(),
        };

        builder.set_context(context.map(Into::into));

        Ok((builder.build(), diagnostics))
    }

    fn resolve_reference(&self, reference: &str) -> EntryResult<String> {
        if !self.resolver.validate(reference) {
            return Err(ErrorKind::InvalidURIReference);
        }

        match &self.base {
            Some(base) => self.resolver.resolve(base, reference).map_err(|err| {
                trace!(error = %err, reference, "cannot resolve reference");
                ErrorKind::InvalidURIReference
            }),
            None => Ok(reference.to_string()),
        }
    }
}

/// The value of a `Link` field line, `None` for any other field.
fn field_value(line: &str) -> Option<&str> {
    let line = line.trim();

    match line.find(':') {
        Some(colon) if is_token(&line[..colon]) => {
            if line[..colon].eq_ignore_ascii_case("link") {
                Some(&line[colon + 1..])
            } else {
                None
            }
        }
        _ => Some(line),
    }
}
