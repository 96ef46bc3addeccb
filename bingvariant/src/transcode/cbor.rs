//! CBOR output: write GVariant values as CBOR and render CBOR diagnostics.
//!
//! Mapping from GVariant to CBOR:
//!   - Value::Boolean     -> simple value 20/21
//!   - Value::Integer     -> major 0/1, smallest argument that fits
//!   - Value::Float       -> float64 (major 7, info 27), never shortened
//!   - Value::Text        -> text string
//!   - Value::Array       -> array
//!   - Value::Tuple       -> array
//!   - Value::DictEntries -> map, keys of any kind, in source order
//!
//! Integers outside CBOR's native range (-2^64 to 2^64-1) are rejected
//! rather than wrapped in bignum tags.

use ciborium::value::Value as CborValue;
use libgvariant::Value;
use num_bigint::{BigInt, Sign};
use num_traits::ToPrimitive;
use std::fmt::{self, Write as FmtWrite};

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

// ---------------------------------------------------------------------------
// Encode
//
// Bytes are written by hand: ciborium's serializer shrinks floats to
// float16/float32 whenever the value survives the narrowing.
// ---------------------------------------------------------------------------

/// Encode a value as CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), String> {
    match value {
        Value::Boolean(b) => buf.push(if *b { 0xf5 } else { 0xf4 }),
        Value::Integer(n) => write_integer(buf, n)?,
        Value::Float(f) => {
            buf.push(0xfb);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::Text(s) => {
            write_head(buf, MAJOR_TEXT, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Array(items) | Value::Tuple(items) => {
            write_head(buf, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::DictEntries(pairs) => {
            write_head(buf, MAJOR_MAP, pairs.len() as u64);
            for (key, value) in pairs {
                write_value(buf, key)?;
                write_value(buf, value)?;
            }
        }
    }
    Ok(())
}

/// Major type in the top 3 bits; argument inline below 24, else in the
/// following 1, 2, 4 or 8 bytes.
fn write_head(buf: &mut Vec<u8>, major: u8, arg: u64) {
    let high = major << 5;
    if let Ok(small) = u8::try_from(arg) {
        if small < 24 {
            buf.push(high | small);
        } else {
            buf.extend_from_slice(&[high | 24, small]);
        }
    } else if let Ok(short) = u16::try_from(arg) {
        buf.push(high | 25);
        buf.extend_from_slice(&short.to_be_bytes());
    } else if let Ok(word) = u32::try_from(arg) {
        buf.push(high | 26);
        buf.extend_from_slice(&word.to_be_bytes());
    } else {
        buf.push(high | 27);
        buf.extend_from_slice(&arg.to_be_bytes());
    }
}

/// Major 0 carries n; major 1 carries -1 - n.
fn write_integer(buf: &mut Vec<u8>, n: &BigInt) -> Result<(), String> {
    let (major, arg) = if n.sign() == Sign::Minus {
        (MAJOR_NEGATIVE, (-n - 1u32).to_u64())
    } else {
        (MAJOR_UNSIGNED, n.to_u64())
    };
    let arg = arg.ok_or_else(|| {
        format!(
            "integer {} exceeds CBOR's native integer range (-2^64 to 2^64-1)",
            n
        )
    })?;
    write_head(buf, major, arg);
    Ok(())
}

// ---------------------------------------------------------------------------
// Diagnostic notation (RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes in diagnostic notation.
///
/// Works from the encoded bytes, so the output shows what is actually on
/// the wire.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &cbor, 0).map_err(|e| e.to_string())?;
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, val: &CborValue, indent: usize) -> fmt::Result {
    match val {
        CborValue::Null => out.push_str("null"),
        CborValue::Bool(b) => write!(out, "{}", b)?,
        CborValue::Integer(i) => write!(out, "{}", i128::from(*i))?,
        CborValue::Float(f) => diag_float(out, *f)?,
        CborValue::Text(s) => diag_text(out, s)?,
        CborValue::Bytes(bytes) => {
            out.push_str("h'");
            for byte in bytes {
                write!(out, "{:02x}", byte)?;
            }
            out.push('\'');
        }
        CborValue::Array(items) => diag_array(out, items, indent)?,
        CborValue::Map(pairs) => diag_map(out, pairs, indent)?,
        CborValue::Tag(tag, inner) => {
            write!(out, "{}(", tag)?;
            diag_value(out, inner, indent)?;
            out.push(')');
        }
        other => write!(out, "<?unknown {:?}>", other)?,
    }
    Ok(())
}

fn diag_float(out: &mut String, f: f64) -> fmt::Result {
    if f.is_nan() {
        out.push_str("NaN");
    } else if f.is_infinite() {
        out.push_str(if f > 0.0 { "Infinity" } else { "-Infinity" });
    } else if f.fract() == 0.0 && f.abs() < 1e18 {
        write!(out, "{:.1}", f)?;
    } else {
        // Debug keeps a decimal point or exponent on every finite value.
        write!(out, "{:?}", f)?;
    }
    Ok(())
}

fn diag_text(out: &mut String, s: &str) -> fmt::Result {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
            c => out.push(c),
        }
    }
    out.push('"');
    Ok(())
}

fn pad(out: &mut String, indent: usize) {
    out.extend(std::iter::repeat(' ').take(indent));
}

fn diag_array(out: &mut String, items: &[CborValue], indent: usize) -> fmt::Result {
    if items.is_empty() {
        out.push_str("[]");
        return Ok(());
    }
    // Short runs of scalars stay on one line.
    if items.len() <= 5 && items.iter().all(is_scalar) {
        out.push('[');
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            diag_value(out, item, indent)?;
        }
        out.push(']');
        return Ok(());
    }
    out.push_str("[\n");
    for (i, item) in items.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, item, indent + 2)?;
        if i + 1 < items.len() {
            out.push(',');
        }
        out.push('\n');
    }
    pad(out, indent);
    out.push(']');
    Ok(())
}

fn diag_map(out: &mut String, pairs: &[(CborValue, CborValue)], indent: usize) -> fmt::Result {
    if pairs.is_empty() {
        out.push_str("{}");
        return Ok(());
    }
    out.push_str("{\n");
    for (i, (key, value)) in pairs.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, key, indent + 2)?;
        out.push_str(": ");
        diag_value(out, value, indent + 2)?;
        if i + 1 < pairs.len() {
            out.push(',');
        }
        out.push('\n');
    }
    pad(out, indent);
    out.push('}');
    Ok(())
}

fn is_scalar(val: &CborValue) -> bool {
    matches!(
        val,
        CborValue::Null
            | CborValue::Bool(_)
            | CborValue::Integer(_)
            | CborValue::Float(_)
            | CborValue::Text(_)
            | CborValue::Bytes(_)
    )
}
