//! Value parser
//!
//! Recursive descent over the input text with ordered-choice backtracking.
//! It handles:
//! - Type prefixes: `uint32 12`, `@as []` (consumed and discarded)
//! - Scalars: booleans, numbers, strings
//! - Containers: arrays, tuples
//! - Dictionaries: `{k: v, ...}` and `[{k, v}, ...]`
//!
//! Every sub-parser takes a cursor by value and either returns the value
//! with an advanced cursor or fails, so trying the next alternative needs no
//! cleanup. Each value is parsed at most once per position: `[` is handled
//! by a single parser that tells arrays from entry lists by their first
//! element.

use crate::cursor::{Cursor, Parsed};
use crate::error::{ParseContext, ParseError, Result};
use crate::scalar::{parse_boolean, parse_number};
use crate::string::parse_string;
use crate::value::Value;

/// Signature shared by every alternative the dispatcher can try.
type ValueParser = for<'a> fn(Cursor<'a>, &ParseContext, usize) -> Parsed<'a, Value>;

/// Value shapes in the order they are tried. Only one shape can start with
/// each delimiter.
const VALUE_SHAPES: &[ValueParser] = &[
    parse_boolean,
    parse_number,
    parse_string,
    parse_array,
    parse_tuple,
    parse_mapping,
];

/// Primitive type names accepted as a prefix.
const TYPE_KEYWORDS: &[&str] = &[
    "boolean",
    "byte",
    "int16",
    "uint16",
    "int32",
    "uint32",
    "int64",
    "uint64",
    "handle",
    "double",
    "string",
    "objectpath",
    "signature",
];

/// Characters allowed in an `@`-prefixed type string.
const TYPE_ALPHABET: &str = "bynqiuxthdsogvamr(){}*?";

/// Parse a complete input: one value, optionally surrounded by whitespace.
pub fn parse_root(input: &str, ctx: &ParseContext) -> Result<Value> {
    if input.len() > ctx.limits.max_input_size {
        return Err(ParseError::InputTooLarge(input.len()));
    }
    let cur = Cursor::new(input).skip_whitespace();
    let (value, next) = parse_value(cur, ctx, 0)?;
    ensure_at_end(value, next)
}

/// Verify no content remains after parsing.
fn ensure_at_end(value: Value, cur: Cursor<'_>) -> Result<Value> {
    let cur = cur.skip_whitespace();
    if !cur.is_at_end() {
        return Err(ParseError::TrailingInput(cur.offset()));
    }
    Ok(value)
}

// ============================================================================
// Dispatcher
// ============================================================================

/// Parse one value at `cur`, skipping any type prefix first.
pub fn parse_value<'a>(cur: Cursor<'a>, ctx: &ParseContext, depth: usize) -> Parsed<'a, Value> {
    let cur = skip_type_prefix(cur);
    first_of(cur, ctx, depth, VALUE_SHAPES)
}

/// Try each alternative at `cur` and return the first success.
///
/// When all fail, the failure that reached furthest into the input is
/// reported. Fatal errors stop the search immediately.
fn first_of<'a>(
    cur: Cursor<'a>,
    ctx: &ParseContext,
    depth: usize,
    alternatives: &[ValueParser],
) -> Parsed<'a, Value> {
    let mut failure = ParseError::NoAlternativeMatched(cur.offset());
    for alternative in alternatives {
        match alternative(cur, ctx, depth) {
            Ok(parsed) => return Ok(parsed),
            Err(e) if e.is_fatal() => return Err(e),
            Err(e) => failure = failure.furthest(e),
        }
    }
    Err(failure)
}

/// Consume a type keyword or `@type` token followed by spaces.
/// Returns `cur` unchanged when there is none.
fn skip_type_prefix(cur: Cursor<'_>) -> Cursor<'_> {
    let token_end = TYPE_KEYWORDS
        .iter()
        .find_map(|keyword| cur.eat_str(keyword))
        .or_else(|| {
            let after_at = cur.eat('@')?;
            let (type_string, end) = after_at.take_while(|c| TYPE_ALPHABET.contains(c));
            (!type_string.is_empty()).then_some(end)
        });
    let Some(end) = token_end else {
        return cur;
    };
    let (spaces, after) = end.take_while(|c| c == ' ');
    if spaces.is_empty() {
        cur
    } else {
        after
    }
}

/// Account for one more open container.
fn enter(cur: Cursor<'_>, ctx: &ParseContext, depth: usize) -> Result<usize> {
    if depth >= ctx.limits.max_nesting_depth {
        return Err(ParseError::NestingTooDeep(cur.offset()));
    }
    Ok(depth + 1)
}

// ============================================================================
// Sequences
// ============================================================================

/// `open item (, item)* close`, or `open close`. No trailing comma.
fn parse_sequence<'a, T>(
    cur: Cursor<'a>,
    ctx: &ParseContext,
    depth: usize,
    open: char,
    close: char,
    item: impl Fn(Cursor<'a>, usize) -> Parsed<'a, T>,
) -> Parsed<'a, Vec<T>> {
    let after_open = cur
        .eat(open)
        .ok_or(ParseError::NoAlternativeMatched(cur.offset()))?;
    let depth = enter(cur, ctx, depth)?;

    let pos = after_open.skip_whitespace();
    if let Some(end) = pos.eat(close) {
        return Ok((Vec::new(), end));
    }
    let (first, next) = item(pos, depth)?;
    finish_sequence(vec![first], next, depth, close, item)
}

/// Continue a sequence whose items so far are `items`, ending at `cur`:
/// `(, item)* close`.
fn finish_sequence<'a, T>(
    mut items: Vec<T>,
    mut cur: Cursor<'a>,
    depth: usize,
    close: char,
    item: impl Fn(Cursor<'a>, usize) -> Parsed<'a, T>,
) -> Parsed<'a, Vec<T>> {
    while let Some(after_comma) = cur.eat_separator(',') {
        let (value, next) = item(after_comma, depth)?;
        items.push(value);
        cur = next;
    }
    let cur = cur.skip_whitespace();
    match cur.eat(close) {
        Some(end) => Ok((items, end)),
        None => Err(ParseError::UnterminatedContainer(close, cur.offset())),
    }
}

fn parse_tuple<'a>(cur: Cursor<'a>, ctx: &ParseContext, depth: usize) -> Parsed<'a, Value> {
    let (items, end) = parse_sequence(cur, ctx, depth, '(', ')', |pos, depth| {
        parse_value(pos, ctx, depth)
    })?;
    Ok((Value::Tuple(items), end))
}

/// `{key: value, ...}`
fn parse_mapping<'a>(cur: Cursor<'a>, ctx: &ParseContext, depth: usize) -> Parsed<'a, Value> {
    let (pairs, end) = parse_sequence(cur, ctx, depth, '{', '}', |pos, depth| {
        parse_pair(pos, ctx, depth, ':')
    })?;
    Ok((Value::DictEntries(pairs), end))
}

/// `key sep value`, with whitespace allowed around `sep`.
fn parse_pair<'a>(
    cur: Cursor<'a>,
    ctx: &ParseContext,
    depth: usize,
    sep: char,
) -> Parsed<'a, (Value, Value)> {
    let (key, after_key) = parse_value(cur, ctx, depth)?;
    let before_value = after_key
        .eat_separator(sep)
        .ok_or_else(|| ParseError::ExpectedSeparator(sep, after_key.skip_whitespace().offset()))?;
    let (value, end) = parse_value(before_value, ctx, depth)?;
    Ok(((key, value), end))
}

// ============================================================================
// Arrays and Entry Lists
// ============================================================================

/// First element of a `[...]`, which fixes what the brackets hold.
enum ArrayHead {
    /// A plain value: the brackets are an array.
    Element(Value),
    /// A `{key, value}` entry: the brackets are a dictionary.
    Entry(Value, Value),
}

/// `[value, ...]` as an `Array`, or `[{key, value}, ...]` as `DictEntries`.
///
/// The first element decides. Later elements must have the same shape.
fn parse_array<'a>(cur: Cursor<'a>, ctx: &ParseContext, depth: usize) -> Parsed<'a, Value> {
    let after_open = cur
        .eat('[')
        .ok_or(ParseError::NoAlternativeMatched(cur.offset()))?;
    let depth = enter(cur, ctx, depth)?;

    let pos = after_open.skip_whitespace();
    if let Some(end) = pos.eat(']') {
        return Ok((Value::Array(Vec::new()), end));
    }

    match parse_array_head(pos, ctx, depth)? {
        (ArrayHead::Element(first), next) => {
            let (items, end) = finish_sequence(vec![first], next, depth, ']', |pos, depth| {
                parse_value(pos, ctx, depth)
            })?;
            Ok((Value::Array(items), end))
        }
        (ArrayHead::Entry(key, value), next) => {
            let (pairs, end) =
                finish_sequence(vec![(key, value)], next, depth, ']', |pos, depth| {
                    parse_dict_entry(pos, ctx, depth)
                })?;
            Ok((Value::DictEntries(pairs), end))
        }
    }
}

/// Parse the first element of a `[...]`. A bare `{` is read up to the
/// separator after its first key: `:` makes it a mapping, `,` an entry.
fn parse_array_head<'a>(
    cur: Cursor<'a>,
    ctx: &ParseContext,
    depth: usize,
) -> Parsed<'a, ArrayHead> {
    let Some(after_open) = cur.eat('{') else {
        let (value, next) = parse_value(cur, ctx, depth)?;
        return Ok((ArrayHead::Element(value), next));
    };
    let depth = enter(cur, ctx, depth)?;

    let pos = after_open.skip_whitespace();
    if let Some(end) = pos.eat('}') {
        return Ok((ArrayHead::Element(Value::DictEntries(Vec::new())), end));
    }

    let (key, after_key) = parse_value(pos, ctx, depth)?;
    if let Some(before_value) = after_key.eat_separator(':') {
        let (value, next) = parse_value(before_value, ctx, depth)?;
        let (pairs, end) = finish_sequence(vec![(key, value)], next, depth, '}', |pos, depth| {
            parse_pair(pos, ctx, depth, ':')
        })?;
        return Ok((ArrayHead::Element(Value::DictEntries(pairs)), end));
    }

    let before_value = after_key
        .eat_separator(',')
        .ok_or_else(|| ParseError::ExpectedSeparator(':', after_key.skip_whitespace().offset()))?;
    let (value, next) = parse_value(before_value, ctx, depth)?;
    let end = close_dict_entry(next)?;
    Ok((ArrayHead::Entry(key, value), end))
}

/// `{key, value}`
fn parse_dict_entry<'a>(
    cur: Cursor<'a>,
    ctx: &ParseContext,
    depth: usize,
) -> Parsed<'a, (Value, Value)> {
    let after_open = cur
        .eat('{')
        .ok_or(ParseError::NoAlternativeMatched(cur.offset()))?;
    let depth = enter(cur, ctx, depth)?;
    let (pair, next) = parse_pair(after_open.skip_whitespace(), ctx, depth, ',')?;
    Ok((pair, close_dict_entry(next)?))
}

fn close_dict_entry(cur: Cursor<'_>) -> Result<Cursor<'_>> {
    let cur = cur.skip_whitespace();
    cur.eat('}')
        .ok_or(ParseError::UnterminatedContainer('}', cur.offset()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Limits;

    fn parse(s: &str) -> Result<Value> {
        parse_root(s, &ParseContext::new(Limits::default()))
    }

    fn text(s: &str) -> Value {
        Value::from(s)
    }

    #[test]
    fn test_skip_type_prefix() {
        assert_eq!(skip_type_prefix(Cursor::new("uint32 12")).rest(), "12");
        assert_eq!(skip_type_prefix(Cursor::new("string  'x'")).rest(), "'x'");
        assert_eq!(skip_type_prefix(Cursor::new("@as []")).rest(), "[]");
        assert_eq!(skip_type_prefix(Cursor::new("@a{sv} {}")).rest(), "{}");
        // No trailing space: not a prefix.
        assert_eq!(skip_type_prefix(Cursor::new("int32")).rest(), "int32");
        assert_eq!(skip_type_prefix(Cursor::new("@as[]")).rest(), "@as[]");
        assert_eq!(skip_type_prefix(Cursor::new("@ []")).rest(), "@ []");
        assert_eq!(skip_type_prefix(Cursor::new("true")).rest(), "true");
    }

    #[test]
    fn test_prefix_does_not_change_value() {
        assert_eq!(parse("uint32 12").unwrap(), parse("12").unwrap());
        assert_eq!(parse("int32 12").unwrap(), Value::from(12));
        assert_eq!(parse("double 12").unwrap(), Value::from(12));
        assert_eq!(parse("boolean true").unwrap(), Value::Boolean(true));
        assert_eq!(
            parse("[uint16 1, int64 2]").unwrap(),
            Value::Array(vec![Value::from(1), Value::from(2)])
        );
    }

    #[test]
    fn test_arrays_and_tuples() {
        assert_eq!(parse("[]").unwrap(), Value::Array(vec![]));
        assert_eq!(parse("[ ]").unwrap(), Value::Array(vec![]));
        assert_eq!(parse("()").unwrap(), Value::Tuple(vec![]));
        assert_eq!(
            parse("[ 'foo' ,'bar' ]").unwrap(),
            Value::Array(vec![text("foo"), text("bar")])
        );
        assert_eq!(
            parse("('a', 1, [3], [])").unwrap(),
            Value::Tuple(vec![
                text("a"),
                Value::from(1),
                Value::Array(vec![Value::from(3)]),
                Value::Array(vec![]),
            ])
        );
        assert_eq!(
            parse("[(1, true), (2, false)]").unwrap(),
            Value::Array(vec![
                Value::Tuple(vec![Value::from(1), Value::Boolean(true)]),
                Value::Tuple(vec![Value::from(2), Value::Boolean(false)]),
            ])
        );
    }

    #[test]
    fn test_mapping_form() {
        assert_eq!(
            parse("{'a': 'aa', 'b': 'bb'}").unwrap(),
            Value::DictEntries(vec![(text("a"), text("aa")), (text("b"), text("bb"))])
        );
        assert_eq!(parse("{}").unwrap(), Value::DictEntries(vec![]));
        assert_eq!(
            parse("{1 : [2], 'k' :{}}").unwrap(),
            Value::DictEntries(vec![
                (Value::from(1), Value::Array(vec![Value::from(2)])),
                (text("k"), Value::DictEntries(vec![])),
            ])
        );
    }

    #[test]
    fn test_entries_array_form() {
        assert_eq!(
            parse("[{1, \"one\"}, {2, \"two\"}]").unwrap(),
            Value::DictEntries(vec![
                (Value::from(1), text("one")),
                (Value::from(2), text("two")),
            ])
        );
        // Keys are full values, not just scalars.
        assert_eq!(
            parse("[{(1, 2), {'x': 1}}]").unwrap(),
            Value::DictEntries(vec![(
                Value::Tuple(vec![Value::from(1), Value::from(2)]),
                Value::DictEntries(vec![(text("x"), Value::from(1))]),
            )])
        );
    }

    #[test]
    fn test_array_of_mappings_stays_an_array() {
        assert_eq!(
            parse("[{'a': 1}, {}]").unwrap(),
            Value::Array(vec![
                Value::DictEntries(vec![(text("a"), Value::from(1))]),
                Value::DictEntries(vec![]),
            ])
        );
    }

    #[test]
    fn test_mixed_entries_and_values_fail() {
        assert!(parse("[{1, 'a'}, 2]").is_err());
        assert!(parse("[1, {2, 'b'}]").is_err());
    }

    #[test]
    fn test_nested_entry_keys_parse_in_one_pass() {
        let mut input = String::from("1");
        for i in 0..40 {
            input = format!("[{{{}, {}}}]", input, i);
        }
        let value = parse(&input).unwrap();
        let mut level = &value;
        for i in (0..40).rev() {
            let pairs = level.as_dict_entries().unwrap();
            assert_eq!(pairs.len(), 1);
            assert_eq!(pairs[0].1, Value::from(i));
            level = &pairs[0].0;
        }
        assert_eq!(level, &Value::from(1));
    }

    #[test]
    fn test_nested_mapping_keys_parse_in_one_pass() {
        let mut input = String::from("'x'");
        for i in 0..40 {
            input = format!("[{{{}: {}}}]", input, i);
        }
        let value = parse(&input).unwrap();
        let mut level = &value;
        for i in (0..40).rev() {
            let items = level.as_array().unwrap();
            let pairs = items[0].as_dict_entries().unwrap();
            assert_eq!(pairs[0].1, Value::from(i));
            level = &pairs[0].0;
        }
        assert_eq!(level, &text("x"));
    }

    #[test]
    fn test_first_element_decides_bracket_shape() {
        assert!(parse("[{}, {1, 2}]").is_err());
        assert_eq!(
            parse("[{1, 2}, {3, 4}]").unwrap(),
            Value::DictEntries(vec![
                (Value::from(1), Value::from(2)),
                (Value::from(3), Value::from(4)),
            ])
        );
        assert_eq!(
            parse("[@a{sv} {'k': 1}]").unwrap(),
            Value::Array(vec![Value::DictEntries(vec![(text("k"), Value::from(1))])])
        );
    }

    #[test]
    fn test_error_reports_furthest_failure() {
        assert_eq!(parse(""), Err(ParseError::NoAlternativeMatched(0)));
        assert_eq!(parse("nope"), Err(ParseError::NoAlternativeMatched(0)));
        assert_eq!(parse("[1, 2"), Err(ParseError::UnterminatedContainer(']', 5)));
        assert_eq!(parse("[1 2]"), Err(ParseError::UnterminatedContainer(']', 3)));
        assert_eq!(parse("[1, ]"), Err(ParseError::NoAlternativeMatched(4)));
        assert_eq!(parse("{1, 2}"), Err(ParseError::ExpectedSeparator(':', 2)));
        assert_eq!(parse("[{1 2}]"), Err(ParseError::ExpectedSeparator(':', 4)));
        assert_eq!(parse("[{1, 2, 3}]"), Err(ParseError::UnterminatedContainer('}', 6)));
        assert_eq!(parse("['a', '\\q']"), Err(ParseError::InvalidEscape(7)));
    }

    #[test]
    fn test_trailing_input() {
        assert_eq!(parse("  [1]  ").unwrap(), Value::Array(vec![Value::from(1)]));
        assert_eq!(parse("[1]]"), Err(ParseError::TrailingInput(3)));
        assert_eq!(parse("true false"), Err(ParseError::TrailingInput(5)));
        assert_eq!(parse("123abc"), Err(ParseError::TrailingInput(3)));
    }

    #[test]
    fn test_nesting_limit() {
        let limits = Limits {
            max_nesting_depth: 2,
            ..Limits::default()
        };
        let ctx = ParseContext::new(limits);
        assert!(parse_root("[[1]]", &ctx).is_ok());
        assert!(parse_root("[{1, [2]}]", &ctx).is_err());
        assert_eq!(
            parse_root("[[[1]]]", &ctx),
            Err(ParseError::NestingTooDeep(2))
        );
        assert_eq!(
            parse_root("{'a': ([1], 2)}", &ctx),
            Err(ParseError::NestingTooDeep(7))
        );
    }

    #[test]
    fn test_input_size_limit() {
        let limits = Limits {
            max_input_size: 4,
            ..Limits::default()
        };
        let ctx = ParseContext::new(limits);
        assert!(parse_root("1234", &ctx).is_ok());
        assert_eq!(parse_root("12345", &ctx), Err(ParseError::InputTooLarge(5)));
    }
}
