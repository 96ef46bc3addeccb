//! YAML output: convert GVariant values to YAML text.
//!
//! Mapping from GVariant to YAML:
//!   - Value::Boolean     -> YAML bool
//!   - Value::Integer     -> YAML integer (string when beyond i64/u64)
//!   - Value::Float       -> YAML float (including .nan, .inf, -.inf)
//!   - Value::Text        -> YAML string
//!   - Value::Array       -> YAML sequence
//!   - Value::Tuple       -> YAML sequence
//!   - Value::DictEntries -> YAML mapping, in source order
//!
//! Dictionary keys may be any value. A key that appears twice is an error,
//! since a YAML mapping cannot hold it.

use libgvariant::Value;
use num_traits::ToPrimitive;

/// Encode a value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value)?;
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> Result<serde_yaml::Value, String> {
    match value {
        Value::Boolean(b) => Ok(serde_yaml::Value::Bool(*b)),
        Value::Integer(n) => {
            if let Some(i) = n.to_i64() {
                Ok(serde_yaml::Value::Number(i.into()))
            } else if let Some(u) = n.to_u64() {
                Ok(serde_yaml::Value::Number(u.into()))
            } else {
                // No arbitrary-precision integers in YAML.
                Ok(serde_yaml::Value::String(n.to_string()))
            }
        }
        Value::Float(f) => Ok(serde_yaml::Value::Number((*f).into())),
        Value::Text(s) => Ok(serde_yaml::Value::String(s.clone())),
        Value::Array(items) | Value::Tuple(items) => {
            let items: Result<Vec<serde_yaml::Value>, String> =
                items.iter().map(value_to_yaml).collect();
            Ok(serde_yaml::Value::Sequence(items?))
        }
        Value::DictEntries(pairs) => {
            let mut map = serde_yaml::Mapping::new();
            for (key, value) in pairs {
                let key = value_to_yaml(key)?;
                if map.contains_key(&key) {
                    return Err(format!("duplicate mapping key {:?}", key));
                }
                map.insert(key, value_to_yaml(value)?);
            }
            Ok(serde_yaml::Value::Mapping(map))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use libgvariant::parse_value;

    fn yaml(input: &str) -> serde_yaml::Value {
        let text = encode(&parse_value(input).unwrap()).unwrap();
        serde_yaml::from_str(&text).unwrap()
    }

    #[test]
    fn test_dictionary_becomes_mapping() {
        let doc = yaml("{'name': 'demo', 'ports': [80, 443], 'enabled': true}");
        assert_eq!(doc["name"].as_str(), Some("demo"));
        assert_eq!(doc["ports"][1].as_i64(), Some(443));
        assert_eq!(doc["enabled"].as_bool(), Some(true));
    }

    #[test]
    fn test_tuples_and_integer_keys() {
        let doc = yaml("[{1, ('a', 2.5)}]");
        let key = serde_yaml::Value::Number(1.into());
        let entry = doc.as_mapping().unwrap().get(&key).unwrap();
        assert_eq!(entry[0].as_str(), Some("a"));
        assert_eq!(entry[1].as_f64(), Some(2.5));
    }

    #[test]
    fn test_big_integer_becomes_string() {
        let doc = yaml("[0xffffffffffffffffffff]");
        assert_eq!(doc[0].as_str(), Some("1208925819614629174706175"));
    }

    #[test]
    fn test_duplicate_keys_rejected() {
        let value = parse_value("{'a': 1, 'a': 2}").unwrap();
        assert!(encode(&value).is_err());
    }
}
