//! Input cursor and whitespace/separator helpers.
//!
//! A `Cursor` is a position in the input text. It is `Copy` and every
//! operation returns a new cursor instead of mutating, so a failed parse
//! attempt leaves the caller's cursor exactly where it was. Backtracking is
//! simply continuing with the old value.

use crate::error::Result;

/// Outcome of a successful sub-parser: the product and the advanced cursor.
pub type Parsed<'a, T> = Result<(T, Cursor<'a>)>;

/// A position in the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// Create a cursor at the start of `src`.
    pub fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Byte offset from the start of the input.
    pub fn offset(&self) -> usize {
        self.pos
    }

    /// The unconsumed input.
    pub fn rest(&self) -> &'a str {
        &self.src[self.pos..]
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    /// Next character without consuming it.
    pub fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    /// Consume one character.
    pub fn next_char(self) -> Option<(char, Cursor<'a>)> {
        let ch = self.peek()?;
        Some((ch, self.advance(ch.len_utf8())))
    }

    /// Skip `len` bytes. `len` must land on a character boundary.
    pub fn advance(self, len: usize) -> Cursor<'a> {
        Cursor {
            src: self.src,
            pos: (self.pos + len).min(self.src.len()),
        }
    }

    /// Consume `expected` if it is the next character.
    pub fn eat(self, expected: char) -> Option<Cursor<'a>> {
        match self.peek() {
            Some(ch) if ch == expected => Some(self.advance(ch.len_utf8())),
            _ => None,
        }
    }

    /// Consume `literal` if the input continues with it.
    pub fn eat_str(self, literal: &str) -> Option<Cursor<'a>> {
        if self.rest().starts_with(literal) {
            Some(self.advance(literal.len()))
        } else {
            None
        }
    }

    /// Consume the longest run of characters matching `pred`.
    pub fn take_while(self, pred: impl Fn(char) -> bool) -> (&'a str, Cursor<'a>) {
        let rest = self.rest();
        let len = rest
            .char_indices()
            .find(|&(_, ch)| !pred(ch))
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        (&rest[..len], self.advance(len))
    }

    /// Skip ASCII whitespace.
    pub fn skip_whitespace(self) -> Cursor<'a> {
        self.take_while(|ch| ch.is_ascii_whitespace()).1
    }

    /// Consume `sep` with optional whitespace on either side.
    pub fn eat_separator(self, sep: char) -> Option<Cursor<'a>> {
        self.skip_whitespace()
            .eat(sep)
            .map(|cur| cur.skip_whitespace())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eat_does_not_move_on_mismatch() {
        let cur = Cursor::new("[1]");
        assert_eq!(cur.eat('('), None);
        assert_eq!(cur.offset(), 0);
        assert_eq!(cur.eat('[').map(|c| c.offset()), Some(1));
    }

    #[test]
    fn test_eat_str() {
        let cur = Cursor::new("0xff");
        assert_eq!(cur.eat_str("0x").map(|c| c.rest()), Some("ff"));
        assert_eq!(cur.eat_str("0X"), None);
    }

    #[test]
    fn test_take_while() {
        let (digits, rest) = Cursor::new("0123abc").take_while(|c| c.is_ascii_digit());
        assert_eq!(digits, "0123");
        assert_eq!(rest.rest(), "abc");
        let (none, same) = Cursor::new("abc").take_while(|c| c.is_ascii_digit());
        assert_eq!(none, "");
        assert_eq!(same.offset(), 0);
    }

    #[test]
    fn test_next_char_multibyte() {
        let (ch, rest) = Cursor::new("☃x").next_char().unwrap();
        assert_eq!(ch, '☃');
        assert_eq!(rest.offset(), 3);
        assert_eq!(rest.peek(), Some('x'));
        assert!(Cursor::new("").next_char().is_none());
    }

    #[test]
    fn test_eat_separator() {
        let cur = Cursor::new("  ,\t 2");
        let after = cur.eat_separator(',').unwrap();
        assert_eq!(after.rest(), "2");
        assert_eq!(Cursor::new(" : 2").eat_separator(','), None);
        assert_eq!(Cursor::new(",2").eat_separator(',').map(|c| c.rest()), Some("2"));
    }

    #[test]
    fn test_skip_whitespace_to_end() {
        let cur = Cursor::new(" \n\r\t").skip_whitespace();
        assert!(cur.is_at_end());
    }
}
