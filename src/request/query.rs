//! Query string flattening
//!
//! Options structs are serialised through serde_json and flattened:
//! `key=value` for scalars, `key[]=value` for arrays, `key[sub]=value` for
//! nested objects. `null` (an unset `Option`) is dropped entirely.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use url::form_urlencoded;

/// Serialise an options value into ordered query pairs
pub fn encode_query<T: Serialize + ?Sized>(opts: &T) -> Result<Vec<(String, String)>> {
    let value = serde_json::to_value(opts).map_err(|e| Error::encode(e.to_string()))?;
    value_to_pairs(&value)
}

/// Flatten an already serialised options value
pub fn value_to_pairs(value: &Value) -> Result<Vec<(String, String)>> {
    match value {
        Value::Null => Ok(Vec::new()),
        Value::Object(map) => {
            let mut pairs = Vec::new();
            for (key, value) in map {
                flatten(key, value, &mut pairs);
            }
            Ok(pairs)
        }
        other => Err(Error::encode(format!(
            "options must serialize to an object, got {other}"
        ))),
    }
}

fn flatten(key: &str, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((key.to_string(), b.to_string())),
        Value::Number(n) => out.push((key.to_string(), n.to_string())),
        Value::String(s) => out.push((key.to_string(), s.clone())),
        Value::Array(items) => {
            let key = format!("{key}[]");
            for item in items {
                flatten(&key, item, out);
            }
        }
        Value::Object(map) => {
            for (sub, value) in map {
                flatten(&format!("{key}[{sub}]"), value, out);
            }
        }
    }
}

/// Render pairs as an `application/x-www-form-urlencoded` string
pub fn to_query_string(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish()
}
