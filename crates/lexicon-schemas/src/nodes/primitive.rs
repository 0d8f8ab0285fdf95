//! Leaf schema nodes
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::formats::StringFormat;
use crate::parser::error::{ParseError, ParseResult};
use crate::value::Fields;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<bool>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<bool>,
}

impl BooleanNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            default: fields.optional_bool("default")?,
            const_value: fields.optional_bool("const")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IntegerNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<i64>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<i64>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<i64>,
}

impl IntegerNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            minimum: fields.optional_i64("minimum")?,
            maximum: fields.optional_i64("maximum")?,
            enum_values: fields.optional_i64_list("enum")?,
            default: fields.optional_i64("default")?,
            const_value: fields.optional_i64("const")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StringNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<StringFormat>,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<String>>,
    #[serde(rename = "const", skip_serializing_if = "Option::is_none")]
    pub const_value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub known_values: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_graphemes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_graphemes: Option<u64>,
}

impl StringNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        let format = fields
            .optional_str("format")?
            .map(|name| {
                StringFormat::from_name(name).ok_or_else(|| {
                    ParseError::invalid_value(
                        fields.path(),
                        "format",
                        format!("unknown string format '{}'", name),
                    )
                })
            })
            .transpose()?;

        Ok(Self {
            description: fields.optional_string("description")?,
            format,
            enum_values: fields.optional_string_list("enum")?,
            const_value: fields.optional_string("const")?,
            default: fields.optional_string("default")?,
            known_values: fields.optional_string_list("knownValues")?,
            min_length: fields.optional_u64("minLength")?,
            max_length: fields.optional_u64("maxLength")?,
            min_graphemes: fields.optional_u64("minGraphemes")?,
            max_graphemes: fields.optional_u64("maxGraphemes")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BytesNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl BytesNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            min_length: fields.optional_u64("minLength")?,
            max_length: fields.optional_u64("maxLength")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlobNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME patterns; `image/*` style wildcards allowed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accept: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_size: Option<u64>,
}

impl BlobNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            accept: fields.optional_string_list("accept")?,
            max_size: fields.optional_u64("maxSize")?,
        })
    }
}

macro_rules! marker_node {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
        pub struct $name {
            #[serde(skip_serializing_if = "Option::is_none")]
            pub description: Option<String>,
        }

        impl $name {
            pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
                Ok(Self {
                    description: fields.optional_string("description")?,
                })
            }
        }
    };
}

marker_node!(
    /// Link to content by CID
    CidLinkNode
);
marker_node!(
    /// A named symbol with no data of its own
    TokenNode
);
marker_node!(
    /// Any data object
    UnknownNode
);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: &serde_json::Value) -> Fields<'_> {
        Fields::new(value, "$.defs.main", "main").unwrap()
    }

    #[test]
    fn test_string_constraints() {
        let raw = json!({
            "type": "string",
            "format": "datetime",
            "maxLength": 64,
            "knownValues": ["a", "b"]
        });
        let node = StringNode::construct(&fields(&raw)).unwrap();
        assert_eq!(node.format, Some(StringFormat::Datetime));
        assert_eq!(node.max_length, Some(64));
        assert_eq!(node.known_values.as_deref().map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_unknown_string_format() {
        let raw = json!({"type": "string", "format": "email"});
        let err = StringNode::construct(&fields(&raw)).unwrap_err();
        assert!(matches!(
            err,
            ParseError::InvalidFieldValue { ref field, .. } if field == "format"
        ));
    }

    #[test]
    fn test_integer_wrong_kind() {
        let raw = json!({"type": "integer", "minimum": "0"});
        let err = IntegerNode::construct(&fields(&raw)).unwrap_err();
        assert!(matches!(err, ParseError::InvalidFieldType { ref field, .. } if field == "minimum"));
    }

    #[test]
    fn test_blob_and_markers() {
        let raw = json!({"type": "blob", "accept": ["image/*"], "maxSize": 1000000});
        let node = BlobNode::construct(&fields(&raw)).unwrap();
        assert_eq!(node.max_size, Some(1_000_000));

        let raw = json!({"type": "token", "description": "A marker"});
        let node = TokenNode::construct(&fields(&raw)).unwrap();
        assert_eq!(node.description.as_deref(), Some("A marker"));
    }

    #[test]
    fn test_serialization_uses_wire_names() {
        let node = IntegerNode {
            description: None,
            minimum: Some(1),
            maximum: Some(100),
            enum_values: None,
            default: Some(50),
            const_value: None,
        };
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"minimum": 1, "maximum": 100, "default": 50})
        );
    }
}
