// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

use crate::error::ErrorKind;
use crate::link::Link;
use std::fmt::{self, Display};
use std::iter::FromIterator;
use std::slice;

/// A problem with one entry of a header.
///
/// `index` is the zero-based position of the entry in the header and `text`
/// is the offending entry, or the offending param when the link was kept.
#[derive(Clone, Debug, PartialEq, Eq, Fail)]
#[fail(display = "entry {}: {}: {}", index, kind, text)]
pub struct EntryError {
    pub index: usize,
    pub kind: ErrorKind,
    pub text: String,
}

impl EntryError {
    pub fn new(index: usize, kind: ErrorKind, text: impl Into<String>) -> EntryError {
        EntryError {
            index,
            kind,
            text: text.into(),
        }
    }
}

/// A collection of links, in header order, and the errors found while parsing
/// them.
///
/// ```
/// use http_link_header::header::LinkCollection;
/// use http_link_header::link::Link;
///
/// let header: LinkCollection = vec![
///     Link::builder("/1").rel("prev").build(),
///     Link::builder("/3").rel("next").build(),
/// ]
/// .into_iter()
/// .collect();
///
/// assert_eq!(header.to_header_value(), r#"</1>; rel="prev", </3>; rel="next""#);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LinkCollection {
    links: Vec<Link>,
    errors: Vec<EntryError>,
}

impl LinkCollection {
    pub fn new(links: Vec<Link>) -> LinkCollection {
        LinkCollection {
            links,
            errors: vec![],
        }
    }

    pub(crate) fn with_errors(links: Vec<Link>, errors: Vec<EntryError>) -> LinkCollection {
        LinkCollection { links, errors }
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Consumes the collection and returns its links.
    pub fn into_links(self) -> Vec<Link> {
        self.links
    }

    /// Dropped entries and non-fatal problems of kept links, in header order.
    pub fn errors(&self) -> &[EntryError] {
        &self.errors
    }

    /// The errors reported for the entry at `index`.
    pub fn errors_for(&self, index: usize) -> impl Iterator<Item = &EntryError> + '_ {
        self.errors.iter().filter(move |err| err.index == index)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn iter(&self) -> slice::Iter<Link> {
        self.links.iter()
    }

    /// The links having the given relation type, ignoring case.
    ///
    /// The returned iterator can be cloned to walk the matches again.
    ///
    /// ```
    /// let header = http_link_header::parse(
    ///     r#"</1>; rel="prev", </2>; rel="next", </3>; rel="Next""#,
    /// )
    /// .unwrap();
    ///
    /// let next = header.find_by_relation("NEXT");
    ///
    /// assert_eq!(next.clone().count(), 2);
    /// assert_eq!(next.map(|link| link.target().as_str()).collect::<Vec<_>>(), vec!["/2", "/3"]);
    /// ```
    pub fn find_by_relation<'a>(
        &'a self,
        relation: &str,
    ) -> impl Iterator<Item = &'a Link> + Clone + 'a {
        let relation = relation.to_lowercase();

        self.links
            .iter()
            .filter(move |link| link.relation_types().contains(&relation))
    }

    /// Every (relation type, link) pair, one per relation type of each link.
    pub fn relations(&self) -> impl Iterator<Item = (&str, &Link)> + '_ {
        self.links.iter().flat_map(|link| {
            link.relation_types()
                .iter()
                .map(move |relation| (relation.as_str(), link))
        })
    }

    /// Renders the links as a Link header value.
    pub fn to_header_value(&self) -> String {
        self.to_string()
    }
}

impl Display for LinkCollection {
    fn fmt(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        for (i, link) in self.links.iter().enumerate() {
            if i > 0 {
                write!(formatter, ", ")?;
            }

            write!(formatter, "{}", link)?;
        }

        Ok(())
    }
}

impl From<Vec<Link>> for LinkCollection {
    fn from(links: Vec<Link>) -> LinkCollection {
        LinkCollection::new(links)
    }
}

impl FromIterator<Link> for LinkCollection {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> LinkCollection {
        LinkCollection::new(iter.into_iter().collect())
    }
}

impl IntoIterator for LinkCollection {
    type Item = Link;
    type IntoIter = ::std::vec::IntoIter<Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.into_iter()
    }
}

impl<'a> IntoIterator for &'a LinkCollection {
    type Item = &'a Link;
    type IntoIter = slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.links.iter()
    }
}
