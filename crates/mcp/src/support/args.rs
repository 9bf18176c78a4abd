#![forbid(unsafe_code)]

use serde_json::Value;
use ttaat_core::StatementIndex;

use crate::tools::invalid_input;

pub(crate) fn require_str<'a>(args: &'a Value, key: &str) -> Result<&'a str, Value> {
    match args.get(key).and_then(|v| v.as_str()) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        Some(_) => Err(invalid_input(&format!("{key} must not be empty"))),
        None => Err(invalid_input(&format!("{key} must be a string"))),
    }
}

pub(crate) fn require_i64(args: &Value, key: &str) -> Result<i64, Value> {
    args.get(key)
        .and_then(|v| v.as_i64())
        .ok_or_else(|| invalid_input(&format!("{key} must be an integer")))
}

pub(crate) fn require_index(args: &Value, key: &str) -> Result<StatementIndex, Value> {
    let raw = require_i64(args, key)?;
    StatementIndex::try_new(raw)
        .map_err(|err| invalid_input(&format!("{key}: {}", err.message())))
}
