// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

use crate::error::ErrorKind;
use crate::param::{is_token, quote, quote_if_needed, split_relations, ExtendedValue, Param, Value};
use crate::uri::UriRef;
use std::fmt::{self, Display};
use tracing::trace;

/// A link-value with its relation types, language tags and remaining params.
///
/// `rel` and `hreflang` are lifted out of the params: relation types are a
/// lowercase ordered set and `hreflang`, the only param allowed to repeat, is
/// an ordered set of language tags.
///
/// Links are built by the parser or with [`Link::builder`]:
///
/// ```
/// use http_link_header::link::Link;
///
/// let link = Link::builder("https://example.org/2")
///     .rel("next")
///     .param("title", "page two")
///     .build();
///
/// assert_eq!(
///     link.to_header_value(),
///     r#"<https://example.org/2>; rel="next"; title="page two""#
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
    target: UriRef,
    context: Option<UriRef>,
    relation_types: Vec<String>,
    language_tags: Vec<String>,
    params: Vec<Param>,
}

impl Link {
    pub fn builder(target: impl Into<UriRef>) -> LinkBuilder {
        LinkBuilder {
            link: Link {
                target: target.into(),
                context: None,
                relation_types: vec![],
                language_tags: vec![],
                params: vec![],
            },
            has_rel: false,
        }
    }

    pub fn target(&self) -> &UriRef {
        &self.target
    }

    /// The link context: the anchor or, failing that, the base URI.
    pub fn context(&self) -> Option<&UriRef> {
        self.context.as_ref()
    }

    pub fn relation_types(&self) -> &[String] {
        &self.relation_types
    }

    /// Whether the link has the given relation type, ignoring case.
    pub fn has_relation(&self, relation: &str) -> bool {
        let relation = relation.to_lowercase();

        self.relation_types.iter().any(|r| *r == relation)
    }

    pub fn language_tags(&self) -> &[String] {
        &self.language_tags
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Looks up a param by name, ignoring case.
    pub fn param(&self, name: &str) -> Option<&Value> {
        let name = name.to_lowercase();

        self.params
            .iter()
            .find(|param| param.name() == name)
            .map(Param::value)
    }

    /// The title, preferring `title*` over `title`.
    pub fn title(&self) -> Option<&str> {
        self.param("title*")
            .or_else(|| self.param("title"))
            .map(Value::text)
    }

    pub fn anchor(&self) -> Option<&str> {
        self.param("anchor").map(Value::text)
    }

    /// Renders the link as a Link header value.
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl Display for Link {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        write!(formatter, "<{}>", self.target)?;

        if !self.relation_types.is_empty() {
            write!(formatter, "; rel={}", quote(&self.relation_types.join(" ")))?;
        }

        for tag in &self.language_tags {
            write!(formatter, "; hreflang={}", quote_if_needed(tag))?;
        }

        for param in &self.params {
            write!(formatter, "; {}", param)?;
        }

        Ok(())
    }
}

/// Builds a [`Link`] keeping its invariants: names are lowercased, the first
/// occurrence of a param wins and `rel`/`hreflang` are lifted out of the
/// params.
#[derive(Clone, Debug)]
pub struct LinkBuilder {
    link: Link,
    has_rel: bool,
}

impl LinkBuilder {
    pub fn context(mut self, context: impl Into<UriRef>) -> Self {
        self.link.context = Some(context.into());
        self
    }

    /// Adds one or more whitespace-separated relation types.
    pub fn rel(mut self, value: &str) -> Self {
        self.has_rel = true;
        self.push_relations(split_relations(value));
        self
    }

    /// Adds a language tag. An empty tag is ignored.
    pub fn hreflang(mut self, tag: &str) -> Self {
        if let Err(kind) = self.push_language_tag(tag) {
            trace!(%kind, tag, "ignoring hreflang");
        }
        self
    }

    /// Adds a param, leaving it out when [`LinkBuilder::insert`] rejects it.
    ///
    /// ```
    /// use http_link_header::link::Link;
    ///
    /// let link = Link::builder("/")
    ///     .param("title*", "plain")
    ///     .param("my title", "dropped")
    ///     .build();
    ///
    /// assert_eq!(link.to_header_value(), "</>; title*=UTF-8''plain");
    /// ```
    pub fn param(mut self, name: &str, value: impl Into<Value>) -> Self {
        if let Err(kind) = self.insert(name, value.into()) {
            trace!(%kind, name, "ignoring param");
        }
        self
    }

    pub fn build(self) -> Link {
        self.link
    }

    /// Adds a param, reporting why it was not kept.
    ///
    /// The name must be a token; it is lowercased and its first occurrence
    /// wins. A name ending in `*` always holds an extended value: a simple
    /// value is taken as UTF-8 text, and an extended value under any other
    /// name is reduced to its text. An extended value whose language is not
    /// made of letters, digits and `-` is rejected.
    ///
    /// ```
    /// use http_link_header::error::ErrorKind;
    /// use http_link_header::link::Link;
    ///
    /// let mut builder = Link::builder("/");
    ///
    /// assert_eq!(builder.insert("rel", "next".into()), Ok(()));
    /// assert_eq!(builder.insert("my title", "x".into()), Err(ErrorKind::InvalidParameterName));
    /// ```
    pub fn insert(&mut self, name: &str, value: Value) -> Result<(), ErrorKind> {
        if !is_token(name) {
            return Err(ErrorKind::InvalidParameterName);
        }

        let name = name.to_lowercase();
        let value = match (name.ends_with('*'), value) {
            (true, Value::Simple(text)) => Value::Extended(ExtendedValue::utf8(None, text)),
            (false, Value::Extended(extended)) => Value::Simple(extended.text),
            (_, value) => value,
        };

        if let Value::Extended(extended) = &value {
            if !extended.has_language_tag_shape() {
                return Err(ErrorKind::MalformedExtendedValue);
            }
        }

        match name.as_str() {
            "rel" => {
                if self.has_rel {
                    return Err(ErrorKind::DuplicateParameter);
                }

                self.has_rel = true;
                let relations = split_relations(value.text());

                if relations.is_empty() {
                    return Err(ErrorKind::EmptyRelation);
                }

                self.push_relations(relations);
            }

            "hreflang" => self.push_language_tag(value.text())?,

            _ => {
                if self.link.params.iter().any(|param| param.name() == name) {
                    return Err(ErrorKind::DuplicateParameter);
                }

                self.link.params.push(Param::new(name, value));
            }
        }

        Ok(())
    }

    pub(crate) fn has_rel(&self) -> bool {
        self.has_rel
    }

    pub(crate) fn anchor(&self) -> Option<String> {
        self.link.anchor().map(str::to_string)
    }

    pub(crate) fn set_context(&mut self, context: Option<UriRef>) {
        self.link.context = context;
    }

    fn push_relations(&mut self, relations: Vec<String>) {
        for relation in relations {
            if !self.link.relation_types.contains(&relation) {
                self.link.relation_types.push(relation);
            }
        }
    }

    /// Repeated tags, ignoring case, are kept once.
    fn push_language_tag(&mut self, tag: &str) -> Result<(), ErrorKind> {
        let tag = tag.trim();

        if tag.is_empty() {
            return Err(ErrorKind::EmptyLanguageTag);
        }

        let known = self
            .link
            .language_tags
            .iter()
            .any(|known| known.eq_ignore_ascii_case(tag));

        if !known {
            self.link.language_tags.push(tag.to_string());
        }

        Ok(())
    }
}
