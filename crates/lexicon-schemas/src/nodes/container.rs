//! Schema nodes that hold other schemas
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use super::FieldSchema;
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::ParseContext;
use crate::value::Fields;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrayNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub items: Box<FieldSchema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
}

impl ArrayNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        let raw_items = fields.required("items")?;
        let items = ctx.nested("items")?.field_schema(raw_items, "items")?;

        Ok(Self {
            description: fields.optional_string("description")?,
            items: Box::new(items),
            min_length: fields.optional_u64("minLength")?,
            max_length: fields.optional_u64("maxLength")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub nullable: Vec<String>,
    pub properties: IndexMap<String, FieldSchema>,
}

impl ObjectNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            required: fields.string_list("required")?,
            nullable: fields.string_list("nullable")?,
            properties: construct_properties(fields.optional_object("properties")?, ctx)?,
        })
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }

    pub fn is_nullable(&self, name: &str) -> bool {
        self.nullable.iter().any(|n| n == name)
    }
}

/// Query-string parameters of a method
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParamsNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<String>,
    pub properties: IndexMap<String, FieldSchema>,
}

impl ParamsNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        let tag = fields.tag()?;
        if tag != "params" {
            return Err(ParseError::invalid_value(
                fields.path(),
                "type",
                format!("parameters must be of type 'params', found '{}'", tag),
            ));
        }

        Ok(Self {
            description: fields.optional_string("description")?,
            required: fields.string_list("required")?,
            properties: construct_properties(fields.optional_object("properties")?, ctx)?,
        })
    }

    pub fn is_required(&self, name: &str) -> bool {
        self.required.iter().any(|r| r == name)
    }
}

fn construct_properties(
    raw: Option<&Map<String, Value>>,
    ctx: &ParseContext<'_>,
) -> ParseResult<IndexMap<String, FieldSchema>> {
    let mut properties = IndexMap::new();
    for (name, raw_property) in raw.into_iter().flatten() {
        let child = ctx.nested(&format!("properties.{}", name))?;
        properties.insert(name.clone(), child.field_schema(raw_property, name)?);
    }
    Ok(properties)
}
