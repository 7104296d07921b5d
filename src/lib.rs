// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

//! Parser and serializer for the HTTP Link header field (RFC8288).
//!
//! ```
//! let header = http_link_header::parse(
//!     r#"<https://example.com/1>; rel="prev", <https://example.com/3>; rel="next"; title="a, b""#,
//! )
//! .unwrap();
//!
//! let next = header.find_by_relation("next").next().unwrap();
//!
//! assert_eq!(next.target(), "https://example.com/3");
//! assert_eq!(next.title(), Some("a, b"));
//! assert!(header.errors().is_empty());
//! ```
//!
//! Malformed entries are dropped and reported in [`LinkCollection::errors`]
//! alongside the links that could be parsed. Only a header whose entries
//! cannot be told apart, because of an unterminated quoted string or target,
//! fails as a whole.

#[macro_use]
extern crate failure;

extern crate pest;
#[macro_use]
extern crate pest_derive;

pub mod error;
pub mod header;
pub mod link;
pub mod param;
pub mod parser;
pub mod tokenizer;
pub mod uri;

pub use error::{ErrorKind, ParserError};
pub use header::{EntryError, LinkCollection};
pub use link::{Link, LinkBuilder};
pub use param::{Charset, ExtendedValue, Param, Value};
pub use parser::{parse, parse_fields, parse_with_base, LinkParser};
pub use uri::{UriRef, UriResolver, UrlResolver};

#[cfg(test)]
mod tests {
    use super::*;

    fn fatal_kind(input: &str) -> Option<ErrorKind> {
        let err = parse(input).expect_err("Expect a fatal error");

        err.downcast_ref::<ParserError>().map(ParserError::kind)
    }

    fn assert_round_trip(input: &str) {
        let first = parse(input).expect("Expect a valid header");
        let serialized = first.to_header_value();
        let second = parse(&serialized).expect("Expect a valid serialized header");

        assert_eq!(first.links(), second.links(), "round trip of {}", serialized);
    }

    #[test]
    fn empty_header() {
        let actual = parse("").expect("Expect a valid header");

        assert!(actual.is_empty());
        assert!(actual.errors().is_empty());
    }

    #[test]
    fn single_link() {
        let input = r#"<https://example.org>; rel=next"#;
        let expected = LinkCollection::new(vec![Link::builder("https://example.org")
            .rel("next")
            .build()]);

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual, expected);
    }

    #[test]
    fn multiple_links() {
        let input = r#"<https://example.com/1>; rel="next", <https://example.com/2>; rel="prev""#;
        let expected = LinkCollection::new(vec![
            Link::builder("https://example.com/1").rel("next").build(),
            Link::builder("https://example.com/2").rel("prev").build(),
        ]);

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual, expected);
    }

    #[test]
    fn comma_in_quoted_title() {
        let input = r#"<https://example.com>; rel="next"; title="a, b, c""#;

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.len(), 1);
        assert_eq!(actual.links()[0].param("title"), Some(&Value::from("a, b, c")));
    }

    #[test]
    fn extended_title() {
        let input = r#"<https://example.com>; rel="next"; title*=UTF-8'en'%e2%82%ac%20rate"#;
        let expected = ExtendedValue {
            charset: Charset::Utf8,
            language: Some("en".into()),
            text: "€ rate".into(),
        };

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(
            actual.links()[0].param("title*"),
            Some(&Value::Extended(expected))
        );
    }

    #[test]
    fn link_header_field_examples_1() {
        let input =
            r#"<http://example.com/TheBook/chapter2>; rel="previous"; title="previous chapter""#;
        let expected = Link::builder("http://example.com/TheBook/chapter2")
            .rel("previous")
            .param("title", "previous chapter")
            .build();

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.links(), &[expected]);
    }

    #[test]
    fn link_header_field_examples_2() {
        let input = r#"</>; rel="http://example.net/foo""#;

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.links()[0].target(), "/");
        assert_eq!(
            actual.links()[0].relation_types(),
            &["http://example.net/foo"]
        );
    }

    #[test]
    fn link_header_field_examples_3() {
        let input = "</terms>; rel=\"copyright\"; anchor=\"#foo\"";

        let actual = parse(input).expect("Expect a valid header");
        let link = &actual.links()[0];

        assert_eq!(link.context().map(UriRef::as_str), Some("#foo"));
        assert_eq!(link.anchor(), Some("#foo"));
    }

    #[test]
    fn link_header_field_examples_4() {
        let input = r#"</TheBook/chapter2>; rel="previous"; title*=UTF-8'de'letztes%20Kapitel, </TheBook/chapter4>; rel="next"; title*=UTF-8'de'n%c3%a4chstes%20Kapitel"#;
        let expected = vec![
            Link::builder("/TheBook/chapter2")
                .rel("previous")
                .param(
                    "title*",
                    ExtendedValue::utf8(Some("de"), "letztes Kapitel"),
                )
                .build(),
            Link::builder("/TheBook/chapter4")
                .rel("next")
                .param(
                    "title*",
                    ExtendedValue::utf8(Some("de"), "nächstes Kapitel"),
                )
                .build(),
        ];

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.links(), &expected[..]);
        assert_eq!(actual.links()[1].title(), Some("nächstes Kapitel"));
    }

    #[test]
    fn unicode_fest() {
        let input = "<http://example.org/\u{FE0F}>; rel=\"\u{1F383}\"";

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.links()[0].target(), "http://example.org/\u{FE0F}");
        assert_eq!(actual.links()[0].relation_types(), &["🎃"]);
    }

    #[test]
    fn relative_resolution() {
        let actual = parse_with_base(r#"</index>; rel="index""#, "https://example.com/docs/page")
            .expect("Expect a valid header");

        assert_eq!(actual.links()[0].target(), "https://example.com/index");
    }

    #[test]
    fn readme_resolution() {
        let actual = parse_with_base(
            r#"<terms>; rel="copyright", <../privacy>; rel="policy""#,
            "https://example.org/a/b",
        )
        .expect("Expect a valid header");
        let targets: Vec<&str> = actual.iter().map(|link| link.target().as_str()).collect();

        assert_eq!(
            targets,
            vec!["https://example.org/a/terms", "https://example.org/privacy"]
        );
    }

    #[test]
    fn duplicate_parameter() {
        let input = r#"<https://example.com>; rel="next"; title="a"; title="b""#;

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.links()[0].param("title"), Some(&Value::from("a")));
        assert_eq!(
            actual.errors(),
            &[EntryError::new(0, ErrorKind::DuplicateParameter, r#"title="b""#)]
        );
    }

    #[test]
    fn hreflang_may_repeat() {
        let input = r#"<https://example.com>; rel=alternate; hreflang=en; hreflang="de""#;

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.links()[0].language_tags(), &["en", "de"]);
        assert!(actual.errors().is_empty());
    }

    #[test]
    fn unterminated_quote_is_fatal() {
        let input = r#"<https://example.com/1>; rel="next", <https://example.com/2>; rel="prev"#;

        assert_eq!(fatal_kind(input), Some(ErrorKind::UnterminatedQuotedString));
    }

    #[test]
    fn unterminated_target_is_fatal() {
        let input = r#"<https://example.com/1>; rel="next", <https://example.com/2; rel="prev""#;

        assert_eq!(fatal_kind(input), Some(ErrorKind::UnterminatedTarget));
    }

    #[test]
    fn invalid_target_drops_only_its_entry() {
        let input = r#"<https://example.com/1>; rel="next", <http://exa mple.com>; rel="prev""#;

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.len(), 1);
        assert_eq!(actual.links()[0].target(), "https://example.com/1");
        assert_eq!(
            actual.errors(),
            &[EntryError::new(
                1,
                ErrorKind::InvalidURIReference,
                r#"<http://exa mple.com>; rel="prev""#
            )]
        );
    }

    #[test]
    fn relation_dedup() {
        let actual = parse(r#"<https://example.com>; rel="next next prev next""#)
            .expect("Expect a valid header");

        assert_eq!(actual.links()[0].relation_types(), &["next", "prev"]);
    }

    #[test]
    fn round_trip() {
        assert_round_trip(r#"<https://example.com>; rel="next"; title="a, b, c""#);
        assert_round_trip(
            r#"<https://example.com/1>; rel="next", <https://example.com/2>; REL=prev; type=text/html"#,
        );
        assert_round_trip(r#"<https://example.com>; rel="next"; title*=UTF-8'en'%e2%82%ac%20rate"#);
        assert_round_trip(r##"</terms>; rel="copyright"; anchor="#foo"; foo; bar="""##);
        assert_round_trip(r#"<a>; rel=a; title="say \"hi\" \\o/"; media="screen, print""#);
        assert_round_trip(r#"<a>; rel=alternate; hreflang=en; hreflang=de; x="a<b""#);
        assert_round_trip(r#"<a>; title*=iso-8859-1''%A3%20rates; title=plain"#);
        assert_round_trip("");
    }

    #[test]
    fn round_trip_drops_odd_extended_languages() {
        for input in &[
            r#"<https://example.com>; rel=next; title*="UTF-8'e n'abc""#,
            r#"<https://example.com>; rel=next; title*="UTF-8'a<b'abc""#,
        ] {
            let actual = parse(input).expect("Expect a valid header");

            assert_eq!(actual.len(), 1);
            assert_eq!(actual.links()[0].param("title*"), None);
            assert_eq!(
                actual.errors()[0].kind,
                ErrorKind::MalformedExtendedValue
            );
            assert_round_trip(input);
        }
    }

    #[test]
    fn angle_bracket_in_token() {
        let input = "<https://example.com/1>; rel=next; x=a<b, <https://example.com/2>; rel=prev";

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(actual.len(), 2);
        assert_eq!(actual.links()[0].param("x"), Some(&Value::from("a<b")));
        assert!(actual.errors().is_empty());
        assert_round_trip(input);
    }

    #[test]
    fn empty_hreflang_is_reported() {
        let input = r#"<https://example.com>; rel=alternate; hreflang="""#;

        let actual = parse(input).expect("Expect a valid header");

        assert!(actual.links()[0].language_tags().is_empty());
        assert_eq!(
            actual.errors(),
            &[EntryError::new(0, ErrorKind::EmptyLanguageTag, r#"hreflang="""#)]
        );
    }

    #[test]
    fn round_trip_with_base() {
        let base = "https://example.org/a/b";
        let first = parse_with_base(r##"<../terms>; rel="copyright"; anchor="#legal""##, base)
            .expect("Expect a valid header");
        let second = parse_with_base(&first.to_header_value(), base)
            .expect("Expect a valid serialized header");

        assert_eq!(first.links(), second.links());
    }

    #[test]
    fn serialize_is_canonical() {
        let input = r#"<https://example.com>;Title=plain ;  REL="Next  prev";type="text/html""#;

        let actual = parse(input).expect("Expect a valid header");

        assert_eq!(
            actual.to_header_value(),
            r#"<https://example.com>; rel="next prev"; title=plain; type=text/html"#
        );
    }
}
