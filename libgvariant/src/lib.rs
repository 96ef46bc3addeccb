//! GVariant text format parser.
//!
//! Parses the human-readable GVariant notation (as printed by
//! `g_variant_print` or typed at `gdbus call`) into a typed [`Value`] tree:
//! booleans, big integers, floats, strings, arrays, tuples and dictionaries.
//!
//! # Parsing Pipeline
//!
//! There is no separate lexer. The parser walks the text directly:
//!
//! 1. **Cursor**: An immutable position in the input. Sub-parsers take it by
//!    value and return an advanced copy, so backtracking costs nothing.
//!
//! 2. **Scalars and Strings**: Booleans, octal/hex/decimal numbers and quoted
//!    strings with escape decoding.
//!
//! 3. **Value Parser**: Ordered choice over every value shape, recursing into
//!    containers. When nothing matches, the failure that got furthest into
//!    the input is reported.
//!
//! Type annotations such as `uint32 7` or `@a{sv} {}` are accepted and
//! discarded; the value is built from the literal alone.

mod cursor;
mod error;
mod parser;
mod scalar;
mod string;
mod value;

pub use error::{Limits, Location, ParseError, Result};
pub use value::Value;

/// Parse one GVariant text value, with default [`Limits`].
///
/// Leading and trailing whitespace is allowed; anything else after the
/// value is an error.
///
/// # Example
///
/// ```
/// use libgvariant::{parse_value, Value};
///
/// let value = parse_value("[1, 2]").unwrap();
/// assert_eq!(value, Value::Array(vec![Value::from(1), Value::from(2)]));
/// ```
pub fn parse_value(input: &str) -> Result<Value> {
    parse_value_with_limits(input, Limits::default())
}

/// Parse one GVariant text value under explicit resource limits.
pub fn parse_value_with_limits(input: &str, limits: Limits) -> Result<Value> {
    let ctx = error::ParseContext::new(limits);
    parser::parse_root(input, &ctx)
}
