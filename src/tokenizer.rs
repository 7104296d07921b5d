// Copyright 2019 Arnau Siches
//
// Licensed under the MIT license <LICENSE or http://opensource.org/licenses/MIT>.
// This file may not be copied, modified, or distributed except
// according to those terms.

//! Splits a header field value into link-value entries.

use crate::error::{ErrorKind, ParserError, Result};
use tracing::trace;

/// One comma-separated link-value, trimmed, with the byte offset where it
/// starts in the header.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry {
    pub text: String,
    pub offset: usize,
}

#[derive(Clone, Copy)]
enum State {
    Plain,
    /// Inside a quoted string opened at the given offset.
    Quoted(usize),
    /// Inside `<…>` opened at the given offset, with the nesting depth.
    Target(usize, usize),
}

/// Splits `raw` on the commas that are neither inside a quoted string nor
/// inside angle brackets.
///
/// Only a `<` opening an entry starts a target; elsewhere it is plain text, as
/// in a `x=a<b` token.
///
/// Empty list elements are skipped. An unterminated quoted string or target
/// makes every entry boundary after it ambiguous, so it fails the whole split.
///
/// ```
/// use http_link_header::tokenizer::split_entries;
///
/// let entries = split_entries(r#"<a>; title="x, y", <b,c>"#).unwrap();
///
/// assert_eq!(entries.len(), 2);
/// assert_eq!(entries[1].text, "<b,c>");
/// assert_eq!(entries[1].offset, 19);
/// ```
pub fn split_entries(raw: &str) -> Result<Vec<Entry>> {
    let mut entries = Vec::new();
    let mut state = State::Plain;
    let mut start = 0;
    let mut entry_started = false;
    let mut chars = raw.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let at_entry_start = !entry_started;

        if !c.is_whitespace() {
            entry_started = true;
        }

        state = match (state, c) {
            (State::Plain, '"') => State::Quoted(i),
            (State::Plain, '<') if at_entry_start => State::Target(i, 1),
            (State::Plain, ',') => {
                push_entry(&mut entries, raw, start, i);
                start = i + 1;
                entry_started = false;
                State::Plain
            }
            (State::Quoted(_), '\\') => {
                if matches!(chars.peek(), Some(&(_, '"')) | Some(&(_, '\\'))) {
                    chars.next();
                }
                state
            }
            (State::Quoted(_), '"') => State::Plain,
            (State::Target(at, depth), '<') => State::Target(at, depth + 1),
            (State::Target(_, 1), '>') => State::Plain,
            (State::Target(at, depth), '>') => State::Target(at, depth - 1),
            (state, _) => state,
        };
    }

    match state {
        State::Plain => (),
        State::Quoted(offset) => {
            return Err(ParserError::Fatal {
                kind: ErrorKind::UnterminatedQuotedString,
                offset,
            }
            .into())
        }
        State::Target(offset, _) => {
            return Err(ParserError::Fatal {
                kind: ErrorKind::UnterminatedTarget,
                offset,
            }
            .into())
        }
    }

    push_entry(&mut entries, raw, start, raw.len());
    trace!(count = entries.len(), "split header into entries");

    Ok(entries)
}

fn push_entry(entries: &mut Vec<Entry>, raw: &str, start: usize, end: usize) {
    let slice = &raw[start..end];
    let text = slice.trim();

    if text.is_empty() {
        return;
    }

    let offset = start + (slice.len() - slice.trim_start().len());

    entries.push(Entry {
        text: text.to_string(),
        offset,
    });
}
