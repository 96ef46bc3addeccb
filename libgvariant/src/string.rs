//! Quoted string parser.

use crate::cursor::{Cursor, Parsed};
use crate::error::{ParseContext, ParseError, Result};
use crate::value::Value;

/// Single-character escapes and the characters they stand for.
const ESCAPES: &[(char, char)] = &[
    ('"', '"'),
    ('\'', '\''),
    ('\\', '\\'),
    ('a', '\x07'),
    ('b', '\x08'),
    ('f', '\x0c'),
    ('n', '\n'),
    ('r', '\r'),
    ('t', '\t'),
    ('v', '\x0b'),
];

/// Parse a string delimited by `'` or `"`. The closing quote must match the
/// opening one; the other quote character is literal inside.
pub fn parse_string<'a>(cur: Cursor<'a>, _ctx: &ParseContext, _depth: usize) -> Parsed<'a, Value> {
    let quote = match cur.peek() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(ParseError::NoAlternativeMatched(cur.offset())),
    };

    let mut out = String::new();
    let mut pos = cur.advance(1);
    loop {
        let (ch, next) = pos
            .next_char()
            .ok_or(ParseError::UnterminatedString(pos.offset()))?;
        if ch == quote {
            return Ok((Value::Text(out), next));
        }
        if ch == '\\' {
            let (decoded, after) = parse_escape(pos)?;
            out.push(decoded);
            pos = after;
        } else {
            out.push(ch);
            pos = next;
        }
    }
}

/// Decode the escape sequence whose backslash is at `cur`.
fn parse_escape(cur: Cursor<'_>) -> Result<(char, Cursor<'_>)> {
    let at = cur.offset();
    let after_backslash = cur.advance(1);
    let (esc, next) = after_backslash
        .next_char()
        .ok_or(ParseError::UnterminatedString(after_backslash.offset()))?;
    match esc {
        'u' => parse_code_point(next, 4, at),
        'U' => parse_code_point(next, 8, at),
        _ => ESCAPES
            .iter()
            .find(|&&(name, _)| name == esc)
            .map(|&(_, ch)| (ch, next))
            .ok_or(ParseError::InvalidEscape(at)),
    }
}

/// Exactly `width` hex digits naming a Unicode scalar value.
fn parse_code_point(cur: Cursor<'_>, width: usize, at: usize) -> Result<(char, Cursor<'_>)> {
    let hex = cur
        .rest()
        .get(..width)
        .filter(|h| h.chars().all(|c| c.is_ascii_hexdigit()))
        .ok_or(ParseError::InvalidEscape(at))?;
    let code = u32::from_str_radix(hex, 16).map_err(|_| ParseError::InvalidEscape(at))?;
    let ch = char::from_u32(code).ok_or(ParseError::InvalidEscape(at))?;
    Ok((ch, cur.advance(width)))
}
