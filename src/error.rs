// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

//! Error types and utilities.

pub use failure::Error;

/// Either `Ok(T)` or `Err(failure::Error)`.
pub type Result<T> = ::std::result::Result<T, failure::Error>;

/// The kind of problem found while parsing a header.
///
/// Only `UnterminatedQuotedString` and `UnterminatedTarget` abort a whole
/// header (see [`ParserError::Fatal`]). Every other kind is reported per entry
/// through [`EntryError`](crate::header::EntryError).
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug, Fail)]
pub enum ErrorKind {
    #[fail(display = "unterminated quoted string")]
    UnterminatedQuotedString,

    #[fail(display = "unterminated target")]
    UnterminatedTarget,

    #[fail(display = "target must be enclosed in '<' and '>'")]
    MalformedTarget,

    #[fail(display = "unexpected content after the link parameters")]
    UnexpectedTrailingContent,

    #[fail(display = "invalid URI reference")]
    InvalidURIReference,

    #[fail(display = "invalid escape sequence")]
    InvalidEscapeSequence,

    #[fail(display = "invalid percent encoding")]
    InvalidPercentEncoding,

    #[fail(display = "unsupported charset")]
    UnsupportedCharset,

    #[fail(display = "extended value must have the form charset'language'value")]
    MalformedExtendedValue,

    #[fail(display = "parameter name must be a token")]
    InvalidParameterName,

    #[fail(display = "empty relation type")]
    EmptyRelation,

    #[fail(display = "empty language tag")]
    EmptyLanguageTag,

    #[fail(display = "missing rel parameter")]
    MissingRelation,

    #[fail(display = "duplicate parameter")]
    DuplicateParameter,
}

impl ErrorKind {
    /// Whether this kind makes entry boundaries undecidable.
    pub fn is_fatal(self) -> bool {
        match self {
            ErrorKind::UnterminatedQuotedString | ErrorKind::UnterminatedTarget => true,
            _ => false,
        }
    }
}

/// A parser error that aborts the whole header.
#[derive(Clone, Eq, PartialEq, Debug, Fail)]
pub enum ParserError {
    /// The header cannot be split into entries.
    #[fail(display = "{} at byte {}", kind, offset)]
    Fatal { kind: ErrorKind, offset: usize },

    /// The base URI given to resolve targets is not an absolute URI.
    #[fail(display = "invalid base URI: {}", _0)]
    InvalidBase(String),
}

impl ParserError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParserError::Fatal { kind, .. } => *kind,
            ParserError::InvalidBase(_) => ErrorKind::InvalidURIReference,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_display() {
        let err = ParserError::Fatal {
            kind: ErrorKind::UnterminatedTarget,
            offset: 12,
        };

        assert_eq!(err.to_string(), "unterminated target at byte 12");
    }

    #[test]
    fn only_tokenizer_kinds_are_fatal() {
        assert!(ErrorKind::UnterminatedQuotedString.is_fatal());
        assert!(ErrorKind::UnterminatedTarget.is_fatal());
        assert!(!ErrorKind::DuplicateParameter.is_fatal());
        assert!(!ErrorKind::InvalidURIReference.is_fatal());
    }

    #[test]
    fn downcast_from_failure_error() {
        let err: Error = ParserError::InvalidBase("nope".into()).into();

        let actual = err.downcast_ref::<ParserError>().map(ParserError::kind);

        assert_eq!(actual, Some(ErrorKind::InvalidURIReference));
    }
}
