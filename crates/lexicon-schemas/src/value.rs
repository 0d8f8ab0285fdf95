//! Typed access to decoded generic values
//!
//! Lexicon documents arrive as `serde_json::Value`. Node constructors never poke at
//! the raw value directly; they go through [`Fields`], whose accessors fail with
//! [`ParseError::InvalidFieldType`] or [`ParseError::MissingRequiredField`] instead of
//! trusting whatever shape the input happens to have.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::parser::error::{ParseError, ParseResult};
use serde::Serialize;
use serde_json::{Map, Number, Value};
use std::fmt;

/// Kind of a generic JSON value, as far as lexicon field typing cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValueKind {
    Null,
    Boolean,
    Integer,
    /// Only ever used as an expectation; found values report `Integer`
    UnsignedInteger,
    Number,
    String,
    Array,
    Object,
}

impl ValueKind {
    /// Classify a value
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => ValueKind::Integer,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Array(_) => ValueKind::Array,
            Value::Object(_) => ValueKind::Object,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ValueKind::Null => "null",
            ValueKind::Boolean => "boolean",
            ValueKind::Integer => "integer",
            ValueKind::UnsignedInteger => "non-negative integer",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Array => "array",
            ValueKind::Object => "object",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed view over the members of a JSON object
#[derive(Debug, Clone, Copy)]
pub struct Fields<'a> {
    map: &'a Map<String, Value>,
    path: &'a str,
}

impl<'a> Fields<'a> {
    /// View `value` as an object; `field` names it in the error when it is not one
    pub fn new(value: &'a Value, path: &'a str, field: &str) -> ParseResult<Self> {
        match value {
            Value::Object(map) => Ok(Self { map, path }),
            other => Err(ParseError::invalid_type(
                path,
                field,
                ValueKind::Object,
                ValueKind::of(other),
            )),
        }
    }

    /// Wrap an already-matched object
    pub fn from_map(map: &'a Map<String, Value>, path: &'a str) -> Self {
        Self { map, path }
    }

    /// Location of this object inside the document
    pub fn path(&self) -> &'a str {
        self.path
    }

    pub fn contains(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&'a Value> {
        self.map.get(name)
    }

    /// The `type` tag of a schema fragment
    pub fn tag(&self) -> ParseResult<&'a str> {
        self.required_str("type")
    }

    pub fn required(&self, name: &str) -> ParseResult<&'a Value> {
        self.map
            .get(name)
            .ok_or_else(|| ParseError::missing_field(self.path, name))
    }

    pub fn required_str(&self, name: &str) -> ParseResult<&'a str> {
        let value = self.required(name)?;
        self.expect_str(name, value)
    }

    pub fn optional_str(&self, name: &str) -> ParseResult<Option<&'a str>> {
        self.map
            .get(name)
            .map(|value| self.expect_str(name, value))
            .transpose()
    }

    pub fn optional_string(&self, name: &str) -> ParseResult<Option<String>> {
        Ok(self.optional_str(name)?.map(str::to_string))
    }

    pub fn optional_bool(&self, name: &str) -> ParseResult<Option<bool>> {
        match self.map.get(name) {
            None => Ok(None),
            Some(Value::Bool(b)) => Ok(Some(*b)),
            Some(other) => Err(self.mismatch(name, ValueKind::Boolean, other)),
        }
    }

    pub fn optional_i64(&self, name: &str) -> ParseResult<Option<i64>> {
        self.map
            .get(name)
            .map(|value| {
                value
                    .as_i64()
                    .ok_or_else(|| self.mismatch(name, ValueKind::Integer, value))
            })
            .transpose()
    }

    /// Any JSON number, integral or not
    pub fn optional_number(&self, name: &str) -> ParseResult<Option<Number>> {
        match self.map.get(name) {
            None => Ok(None),
            Some(Value::Number(n)) => Ok(Some(n.clone())),
            Some(other) => Err(self.mismatch(name, ValueKind::Number, other)),
        }
    }

    pub fn optional_u64(&self, name: &str) -> ParseResult<Option<u64>> {
        self.map
            .get(name)
            .map(|value| {
                value
                    .as_u64()
                    .ok_or_else(|| self.mismatch(name, ValueKind::UnsignedInteger, value))
            })
            .transpose()
    }

    pub fn optional_string_list(&self, name: &str) -> ParseResult<Option<Vec<String>>> {
        let Some(value) = self.map.get(name) else {
            return Ok(None);
        };
        let items = self.expect_array(name, value)?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_str().map(str::to_string).ok_or_else(|| {
                    ParseError::invalid_type(
                        self.path,
                        format!("{}[{}]", name, i),
                        ValueKind::String,
                        ValueKind::of(item),
                    )
                })
            })
            .collect::<ParseResult<Vec<_>>>()
            .map(Some)
    }

    /// A list of strings that defaults to empty when absent
    pub fn string_list(&self, name: &str) -> ParseResult<Vec<String>> {
        Ok(self.optional_string_list(name)?.unwrap_or_default())
    }

    pub fn optional_i64_list(&self, name: &str) -> ParseResult<Option<Vec<i64>>> {
        let Some(value) = self.map.get(name) else {
            return Ok(None);
        };
        let items = self.expect_array(name, value)?;
        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                item.as_i64().ok_or_else(|| {
                    ParseError::invalid_type(
                        self.path,
                        format!("{}[{}]", name, i),
                        ValueKind::Integer,
                        ValueKind::of(item),
                    )
                })
            })
            .collect::<ParseResult<Vec<_>>>()
            .map(Some)
    }

    pub fn required_array(&self, name: &str) -> ParseResult<&'a Vec<Value>> {
        let value = self.required(name)?;
        self.expect_array(name, value)
    }

    pub fn optional_array(&self, name: &str) -> ParseResult<Option<&'a Vec<Value>>> {
        self.map
            .get(name)
            .map(|value| self.expect_array(name, value))
            .transpose()
    }

    pub fn required_object(&self, name: &str) -> ParseResult<&'a Map<String, Value>> {
        let value = self.required(name)?;
        self.expect_object(name, value)
    }

    pub fn optional_object(&self, name: &str) -> ParseResult<Option<&'a Map<String, Value>>> {
        self.map
            .get(name)
            .map(|value| self.expect_object(name, value))
            .transpose()
    }

    fn expect_str(&self, name: &str, value: &'a Value) -> ParseResult<&'a str> {
        value
            .as_str()
            .ok_or_else(|| self.mismatch(name, ValueKind::String, value))
    }

    fn expect_array(&self, name: &str, value: &'a Value) -> ParseResult<&'a Vec<Value>> {
        value
            .as_array()
            .ok_or_else(|| self.mismatch(name, ValueKind::Array, value))
    }

    fn expect_object(&self, name: &str, value: &'a Value) -> ParseResult<&'a Map<String, Value>> {
        value
            .as_object()
            .ok_or_else(|| self.mismatch(name, ValueKind::Object, value))
    }

    fn mismatch(&self, name: &str, expected: ValueKind, found: &Value) -> ParseError {
        ParseError::invalid_type(self.path, name, expected, ValueKind::of(found))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_kind_classification() {
        assert_eq!(ValueKind::of(&json!(null)), ValueKind::Null);
        assert_eq!(ValueKind::of(&json!(3)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(-3)), ValueKind::Integer);
        assert_eq!(ValueKind::of(&json!(1.5)), ValueKind::Number);
        assert_eq!(ValueKind::of(&json!("x")), ValueKind::String);
        assert_eq!(ValueKind::of(&json!([])), ValueKind::Array);
        assert_eq!(ValueKind::of(&json!({})), ValueKind::Object);
    }

    #[test]
    fn test_fields_rejects_non_object() {
        let value = json!([1, 2]);
        let err = Fields::new(&value, "$.defs", "main").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFieldType {
                expected: ValueKind::Object,
                found: ValueKind::Array,
                ..
            }
        ));
    }

    #[test]
    fn test_required_and_optional_access() {
        let value = json!({
            "type": "string",
            "maxLength": 10,
            "knownValues": ["a", "b"],
            "flag": true
        });
        let fields = Fields::new(&value, "$", "root").unwrap();

        assert_eq!(fields.tag().unwrap(), "string");
        assert_eq!(fields.optional_u64("maxLength").unwrap(), Some(10));
        assert_eq!(fields.optional_u64("minLength").unwrap(), None);
        assert_eq!(fields.optional_bool("flag").unwrap(), Some(true));
        assert_eq!(
            fields.optional_string_list("knownValues").unwrap(),
            Some(vec!["a".to_string(), "b".to_string()])
        );
        assert!(fields.string_list("required").unwrap().is_empty());
    }

    #[test]
    fn test_missing_required_field() {
        let value = json!({});
        let fields = Fields::new(&value, "$.defs.main", "main").unwrap();
        let err = fields.required_str("type").unwrap_err();
        assert!(matches!(
            err,
            ParseError::MissingRequiredField { ref field, ref path } if field == "type" && path == "$.defs.main"
        ));
    }

    #[test]
    fn test_negative_length_is_rejected() {
        let value = json!({"maxLength": -1});
        let fields = Fields::new(&value, "$", "root").unwrap();
        let err = fields.optional_u64("maxLength").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFieldType {
                expected: ValueKind::UnsignedInteger,
                found: ValueKind::Integer,
                ..
            }
        ));
    }

    #[test]
    fn test_list_element_type_is_reported_with_index() {
        let value = json!({"accept": ["image/png", 7]});
        let fields = Fields::new(&value, "$", "root").unwrap();
        let err = fields.optional_string_list("accept").unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFieldType { ref field, .. } if field == "accept[1]"
        ));
    }
}
