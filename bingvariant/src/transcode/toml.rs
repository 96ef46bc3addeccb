//! TOML output: convert GVariant values to TOML text.
//!
//! Mapping from GVariant to TOML:
//!   - Value::Boolean     -> TOML boolean
//!   - Value::Integer     -> TOML integer (must fit in i64)
//!   - Value::Float       -> TOML float
//!   - Value::Text        -> TOML string
//!   - Value::Array       -> TOML array
//!   - Value::Tuple       -> TOML array
//!   - Value::DictEntries -> TOML table (inline table inside arrays)
//!
//! Lossy edges:
//!   - The top-level value must be a dictionary.
//!   - Dictionary keys must be text; TOML keys are always strings.
//!   - A key that appears twice in one dictionary is an error.
//!   - Integers beyond i64 are an error.

use libgvariant::Value;
use num_bigint::BigInt;
use num_traits::ToPrimitive;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table};

/// Encode a value as a TOML document.
pub fn encode(value: &Value) -> Result<String, String> {
    let pairs = value.as_dict_entries().ok_or_else(|| {
        format!(
            "TOML requires the top-level value to be a dictionary, got {}",
            value.kind()
        )
    })?;
    let mut doc = DocumentMut::new();
    fill_table(doc.as_table_mut(), pairs)?;
    Ok(doc.to_string())
}

fn table_key(key: &Value) -> Result<&str, String> {
    key.as_str()
        .ok_or_else(|| format!("TOML keys must be text, got {} {:?}", key.kind(), key))
}

fn fill_table(table: &mut Table, pairs: &[(Value, Value)]) -> Result<(), String> {
    for (key, value) in pairs {
        let key = table_key(key)?;
        if table.contains_key(key) {
            return Err(format!("duplicate key \"{}\"", key));
        }
        table.insert(key, value_to_item(value)?);
    }
    Ok(())
}

/// Item in table position: dictionaries become sub-tables.
fn value_to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::DictEntries(pairs) => {
            let mut table = Table::new();
            fill_table(&mut table, pairs)?;
            Ok(Item::Table(table))
        }
        other => Ok(Item::Value(value_to_inline(other)?)),
    }
}

/// Value in inline position: inside arrays or inline tables.
fn value_to_inline(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Boolean(b) => Ok((*b).into()),
        Value::Integer(n) => Ok(to_i64(n)?.into()),
        Value::Float(f) => Ok((*f).into()),
        Value::Text(s) => Ok(s.as_str().into()),
        Value::Array(items) | Value::Tuple(items) => {
            let mut array = Array::new();
            for item in items {
                array.push(value_to_inline(item)?);
            }
            Ok(toml_edit::Value::Array(array))
        }
        Value::DictEntries(pairs) => {
            let mut inline = InlineTable::new();
            for (key, value) in pairs {
                let key = table_key(key)?;
                if inline.contains_key(key) {
                    return Err(format!("duplicate key \"{}\"", key));
                }
                inline.insert(key, value_to_inline(value)?);
            }
            Ok(toml_edit::Value::InlineTable(inline))
        }
    }
}

fn to_i64(n: &BigInt) -> Result<i64, String> {
    n.to_i64()
        .ok_or_else(|| format!("TOML integers must fit in i64; {} is too large", n))
}
