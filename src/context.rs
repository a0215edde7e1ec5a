//! Data mappings: the resolved variable values of one run, and the ways a
//! caller can supply them up front.

use std::io::Read;

use indexmap::IndexMap;
use log::debug;

use crate::error::{Error, Result};

/// Variable name to value, in insertion order.
pub type DataMapping = IndexMap<String, String>;

/// Parses one `key=value` pair given on the command line.
pub fn parse_key_value(pair: &str) -> std::result::Result<(String, String), String> {
    match pair.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("invalid key=value pair: '{pair}'")),
    }
}

/// Converts a JSON object of answers into a data mapping.
///
/// Strings are taken as-is, `null` becomes an empty string and other values
/// use their JSON text.
pub fn answers_from_json(value: serde_json::Value) -> Result<DataMapping> {
    let serde_json::Value::Object(object) = value else {
        return Err(Error::ConfigError("answers must be a JSON object".to_string()));
    };
    Ok(object
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            (key, value)
        })
        .collect())
}

/// Reads a JSON object of answers from `reader`.
pub fn load_answers<R: Read>(mut reader: R) -> Result<DataMapping> {
    let mut buffer = String::new();
    reader.read_to_string(&mut buffer)?;
    let buffer = buffer.trim();
    if buffer.is_empty() {
        debug!("No answers supplied on stdin");
        return Ok(DataMapping::new());
    }
    answers_from_json(serde_json::from_str(buffer)?)
}

/// Combines answers from stdin with `--data` pairs; pairs win on conflict.
///
/// Returns `None` when nothing was supplied, which means variables have to be
/// discovered and collected.
pub fn supplied_data(pairs: Vec<(String, String)>, answers: Option<DataMapping>) -> Option<DataMapping> {
    let mut data = answers.unwrap_or_default();
    data.extend(pairs);
    if data.is_empty() {
        None
    } else {
        Some(data)
    }
}
