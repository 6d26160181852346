//! The per-request name-to-value bag a caller builds from an incoming
//! message's fields, plus the `optional`/`required` accessors that every
//! handler uses to pull fields back out with length and pattern
//! validation baked in.
//!
//! A message's values all arrive, and are stored, as strings: a field's
//! real type (int, timestamp, blob, ...) is only decided once a handler
//! asks for it and hands it to the field codec. `Transfer` itself never
//! interprets a value, it just remembers what came in under which name.

use poolcore_core::PoolError;
use regex::Regex;
use serde_json::Value;
use std::collections::HashMap;

/// A flattened `{name -> value}` view of one incoming request.
///
/// Values that arrived as JSON strings are stored verbatim; non-string
/// JSON scalars (numbers, bools) are rendered with their natural text
/// form so a handler can still run them through the field codec. Nested
/// objects and arrays have no place in this protocol and are dropped with
/// a warning rather than rejecting the whole message over one stray field.
#[derive(Debug, Default, Clone)]
pub struct Transfer {
    fields: HashMap<String, String>,
}

impl Transfer {
    pub fn new() -> Self {
        Self { fields: HashMap::new() }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Builds a `Transfer` from a parsed JSON object, typically the body
    /// of one line-delimited client message.
    pub fn from_json_object(value: &Value) -> Self {
        let mut transfer = Self::new();
        let Value::Object(map) = value else {
            tracing::warn!("transfer payload is not a JSON object, ignoring");
            return transfer;
        };
        for (name, v) in map {
            match v {
                Value::String(s) => transfer.insert(name.clone(), s.clone()),
                Value::Number(n) => transfer.insert(name.clone(), n.to_string()),
                Value::Bool(b) => transfer.insert(name.clone(), b.to_string()),
                Value::Null => transfer.insert(name.clone(), String::new()),
                Value::Array(_) | Value::Object(_) => {
                    tracing::warn!(field = %name, "ignoring nested JSON field in transfer payload");
                }
            }
        }
        transfer
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Looks up `name`, returning `Ok(None)` if it is simply absent, and an
    /// `Err` carrying a `failed.*` reply string if it is present but fails
    /// the minimum-length or pattern check.
    pub fn optional(
        &self,
        name: &str,
        min_len: usize,
        pattern: Option<&str>,
    ) -> Result<Option<&str>, PoolError> {
        let Some(value) = self.get(name) else {
            return Ok(None);
        };
        validate(name, value, min_len, pattern).map(Some)
    }

    /// Looks up `name`, returning an `Err` carrying a `failed.missing`
    /// reply string if it is absent, in addition to the same length and
    /// pattern checks `optional` performs.
    pub fn required(
        &self,
        name: &str,
        min_len: usize,
        pattern: Option<&str>,
    ) -> Result<&str, PoolError> {
        let Some(value) = self.get(name) else {
            tracing::warn!(field = name, "required transfer field missing");
            return Err(PoolError::TransferMissing(name.to_string()));
        };
        validate(name, value, min_len, pattern)
    }
}

fn validate<'a>(
    name: &str,
    value: &'a str,
    min_len: usize,
    pattern: Option<&str>,
) -> Result<&'a str, PoolError> {
    if value.len() < min_len {
        return Err(PoolError::TransferTooShort(name.to_string()));
    }

    if let Some(patt) = pattern {
        let re = Regex::new(patt).map_err(|_| PoolError::TransferBadRegex(name.to_string()))?;
        if !re.is_match(value) {
            return Err(PoolError::TransferInvalid(name.to_string()));
        }
    }

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_absent_field_is_none_not_an_error() {
        let t = Transfer::new();
        assert!(t.optional("workername", 1, None).unwrap().is_none());
    }

    #[test]
    fn required_absent_field_fails_missing() {
        let t = Transfer::new();
        let err = t.required("workername", 1, None).unwrap_err();
        assert!(matches!(err, PoolError::TransferMissing(ref n) if n == "workername"));
    }

    #[test]
    fn too_short_field_fails_short() {
        let mut t = Transfer::new();
        t.insert("workername", "x");
        let err = t.required("workername", 3, None).unwrap_err();
        assert!(matches!(err, PoolError::TransferTooShort(_)));
    }

    #[test]
    fn pattern_mismatch_fails_invalid() {
        let mut t = Transfer::new();
        t.insert("height", "not-a-number");
        let err = t.required("height", 1, Some(r"^[0-9]+$")).unwrap_err();
        assert!(matches!(err, PoolError::TransferInvalid(_)));
    }

    #[test]
    fn valid_field_passes_through() {
        let mut t = Transfer::new();
        t.insert("height", "123");
        assert_eq!(t.required("height", 1, Some(r"^[0-9]+$")).unwrap(), "123");
    }

    #[test]
    fn from_json_object_flattens_scalars_and_skips_nested() {
        let json: Value = serde_json::from_str(
            r#"{"workername":"alice.1","diff":512,"solo":false,"nested":{"a":1}}"#,
        )
        .unwrap();
        let t = Transfer::from_json_object(&json);
        assert_eq!(t.get("workername"), Some("alice.1"));
        assert_eq!(t.get("diff"), Some("512"));
        assert_eq!(t.get("solo"), Some("false"));
        assert!(t.get("nested").is_none());
    }
}
