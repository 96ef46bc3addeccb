//! Boolean and numeric literal parsers.
//!
//! Numbers are tried as octal, then hexadecimal, then decimal. Each form
//! either matches a well-formed literal and returns the advanced cursor, or
//! fails at the starting offset so the next form can run.

use crate::cursor::{Cursor, Parsed};
use crate::error::{ParseContext, ParseError, Result};
use crate::value::Value;
use num_bigint::BigInt;
use num_traits::Num;

// ============================================================================
// Boolean Parsing
// ============================================================================

const BOOLEAN_KEYWORDS: &[(&str, bool)] = &[("true", true), ("false", false)];

/// Parse `true` or `false`. The keyword must not run into an identifier.
pub fn parse_boolean<'a>(cur: Cursor<'a>, _ctx: &ParseContext, _depth: usize) -> Parsed<'a, Value> {
    for &(keyword, value) in BOOLEAN_KEYWORDS {
        if let Some(end) = cur.eat_str(keyword) {
            if !end.peek().is_some_and(is_identifier_char) {
                return Ok((Value::Boolean(value), end));
            }
        }
    }
    Err(ParseError::NoAlternativeMatched(cur.offset()))
}

fn is_identifier_char(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_'
}

// ============================================================================
// Number Parsing
// ============================================================================

type NumberForm = for<'a> fn(Cursor<'a>) -> Parsed<'a, Value>;

const NUMBER_FORMS: &[NumberForm] = &[parse_octal, parse_hex, parse_decimal];

/// Parse an octal, hexadecimal, or decimal literal.
pub fn parse_number<'a>(cur: Cursor<'a>, _ctx: &ParseContext, _depth: usize) -> Parsed<'a, Value> {
    let mut failure = ParseError::NoAlternativeMatched(cur.offset());
    for form in NUMBER_FORMS {
        match form(cur) {
            Ok(parsed) => return Ok(parsed),
            Err(e) => failure = failure.furthest(e),
        }
    }
    Err(failure)
}

/// Consume an optional `+` or `-`. Returns whether the number is negative.
fn parse_sign(cur: Cursor<'_>) -> (bool, Cursor<'_>) {
    if let Some(next) = cur.eat('-') {
        (true, next)
    } else if let Some(next) = cur.eat('+') {
        (false, next)
    } else {
        (false, cur)
    }
}

/// `[+-]?0[0-7]+`
fn parse_octal(cur: Cursor<'_>) -> Parsed<'_, Value> {
    let start = cur.offset();
    let (negative, after_sign) = parse_sign(cur);
    let after_zero = after_sign
        .eat('0')
        .ok_or(ParseError::NoAlternativeMatched(start))?;
    let (digits, end) = after_zero.take_while(|c| c.is_digit(8));
    if digits.is_empty() {
        return Err(ParseError::NoAlternativeMatched(start));
    }
    let n = to_integer(digits, 8, negative, literal(cur, end), start)?;
    Ok((Value::Integer(n), end))
}

/// `[+-]?0x[0-9a-fA-F]+`
fn parse_hex(cur: Cursor<'_>) -> Parsed<'_, Value> {
    let start = cur.offset();
    let (negative, after_sign) = parse_sign(cur);
    let after_prefix = after_sign
        .eat_str("0x")
        .ok_or(ParseError::NoAlternativeMatched(start))?;
    let (digits, end) = after_prefix.take_while(|c| c.is_ascii_hexdigit());
    if digits.is_empty() {
        return Err(ParseError::NoAlternativeMatched(start));
    }
    let n = to_integer(digits, 16, negative, literal(cur, end), start)?;
    Ok((Value::Integer(n), end))
}

/// `[+-]?(\d+\.\d*|\.\d+|[1-9]\d*|0)([eE]-?\d+)?`
///
/// Produces a `Float` when a `.` or exponent is present, else an `Integer`.
fn parse_decimal(cur: Cursor<'_>) -> Parsed<'_, Value> {
    let start = cur.offset();
    let no_match = || ParseError::NoAlternativeMatched(start);
    let (negative, after_sign) = parse_sign(cur);
    let (int_digits, after_int) = after_sign.take_while(|c| c.is_ascii_digit());

    let (fraction, after_mantissa) = match after_int.eat('.') {
        Some(after_dot) => {
            let (frac_digits, after_frac) = after_dot.take_while(|c| c.is_ascii_digit());
            if int_digits.is_empty() && frac_digits.is_empty() {
                return Err(no_match());
            }
            (Some(frac_digits), after_frac)
        }
        None => {
            let leading_zero = int_digits.len() > 1 && int_digits.starts_with('0');
            if int_digits.is_empty() || leading_zero {
                return Err(no_match());
            }
            (None, after_int)
        }
    };

    let (exponent, end) = match parse_exponent(after_mantissa) {
        Some((exp, end)) => (Some(exp), end),
        None => (None, after_mantissa),
    };
    let text = literal(cur, end);

    if fraction.is_none() && exponent.is_none() {
        let n = to_integer(int_digits, 10, negative, text, start)?;
        return Ok((Value::Integer(n), end));
    }

    // Rebuild in a shape the float parser always accepts ("5." and ".5" included).
    let canonical = format!(
        "{}{}.{}e{}",
        if negative { "-" } else { "" },
        digits_or_zero(int_digits),
        digits_or_zero(fraction.unwrap_or("")),
        exponent.unwrap_or("0"),
    );
    let f = canonical
        .parse::<f64>()
        .map_err(|_| ParseError::InvalidNumber(text.to_string(), start))?;
    Ok((Value::Float(f), end))
}

/// `[eE]-?\d+`, returning the exponent text after the marker.
/// An `e` without digits is left unconsumed.
fn parse_exponent(cur: Cursor<'_>) -> Option<(&str, Cursor<'_>)> {
    let after_marker = cur.eat('e').or_else(|| cur.eat('E'))?;
    let after_sign = after_marker.eat('-').unwrap_or(after_marker);
    let (digits, end) = after_sign.take_while(|c| c.is_ascii_digit());
    if digits.is_empty() {
        return None;
    }
    Some((literal(after_marker, end), end))
}

fn digits_or_zero(digits: &str) -> &str {
    if digits.is_empty() {
        "0"
    } else {
        digits
    }
}

/// The input text between two cursors.
fn literal<'a>(from: Cursor<'a>, to: Cursor<'a>) -> &'a str {
    &from.rest()[..to.offset() - from.offset()]
}

fn to_integer(digits: &str, radix: u32, negative: bool, text: &str, start: usize) -> Result<BigInt> {
    let n = BigInt::from_str_radix(digits, radix)
        .map_err(|_| ParseError::InvalidNumber(text.to_string(), start))?;
    Ok(if negative { -n } else { n })
}
