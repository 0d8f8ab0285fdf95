//! Primary definitions: records and XRPC methods
//!
//! These kinds describe a whole endpoint or a stored record type and, after
//! validation, only ever appear as a document's `main` definition.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use super::{serialize_object, serialize_params, FieldSchema, ObjectNode, ParamsNode, SchemaNode};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::ParseContext;
use crate::value::Fields;
use serde::{Serialize, Serializer};
use std::fmt;

/// Request or response body of a method
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Body {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// MIME type, `*/*` and `type/*` wildcards allowed
    pub encoding: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Box<FieldSchema>>,
}

impl Body {
    fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        let schema = fields
            .get("schema")
            .map(|raw| ctx.nested("schema")?.field_schema(raw, "schema"))
            .transpose()?
            .map(Box::new);

        Ok(Self {
            description: fields.optional_string("description")?,
            encoding: fields.required_str("encoding")?.to_string(),
            schema,
        })
    }

    /// Whether a concrete content type satisfies this body's encoding
    pub fn accepts(&self, content_type: &str) -> bool {
        encoding_matches(&self.encoding, content_type)
    }
}

/// Match a concrete MIME type against a pattern with `*/*` or `type/*` wildcards
pub fn encoding_matches(pattern: &str, content_type: &str) -> bool {
    let essence = |mime: &str| {
        mime.split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    };
    let pattern = essence(pattern);
    let content_type = essence(content_type);

    if pattern == "*/*" || pattern == content_type {
        return true;
    }
    match pattern.strip_suffix("/*") {
        Some(prefix) => content_type
            .split_once('/')
            .is_some_and(|(kind, _)| kind == prefix),
        None => false,
    }
}

/// Schema of a subscription's messages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub schema: Box<FieldSchema>,
}

impl MessageBody {
    fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        let raw = fields.required("schema")?;
        Ok(Self {
            description: fields.optional_string("description")?,
            schema: Box::new(ctx.nested("schema")?.field_schema(raw, "schema")?),
        })
    }
}

/// A named error a method may return
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorDef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_params"
    )]
    pub parameters: Option<ParamsNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Body>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDef>,
}

impl QueryNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            parameters: construct_parameters(fields, ctx)?,
            output: construct_body(fields, ctx, "output")?,
            errors: construct_errors(fields, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcedureNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_params"
    )]
    pub parameters: Option<ParamsNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<Body>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<Body>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDef>,
}

impl ProcedureNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        Ok(Self {
            description: fields.optional_string("description")?,
            parameters: construct_parameters(fields, ctx)?,
            input: construct_body(fields, ctx, "input")?,
            output: construct_body(fields, ctx, "output")?,
            errors: construct_errors(fields, ctx)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubscriptionNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_params"
    )]
    pub parameters: Option<ParamsNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MessageBody>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ErrorDef>,
}

impl SubscriptionNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        let message = match fields.get("message") {
            Some(raw) => {
                let child = ctx.nested("message")?;
                let message_fields = Fields::new(raw, child.path(), "message")?;
                Some(MessageBody::construct(&message_fields, &child)?)
            }
            None => None,
        };

        Ok(Self {
            description: fields.optional_string("description")?,
            parameters: construct_parameters(fields, ctx)?,
            message,
            errors: construct_errors(fields, ctx)?,
        })
    }
}

/// How the keys of a record collection are formed
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordKey {
    Tid,
    Nsid,
    Any,
    Literal(String),
}

impl RecordKey {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "tid" => Some(RecordKey::Tid),
            "nsid" => Some(RecordKey::Nsid),
            "any" => Some(RecordKey::Any),
            other => other
                .strip_prefix("literal:")
                .filter(|literal| !literal.is_empty())
                .map(|literal| RecordKey::Literal(literal.to_string())),
        }
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKey::Tid => f.write_str("tid"),
            RecordKey::Nsid => f.write_str("nsid"),
            RecordKey::Any => f.write_str("any"),
            RecordKey::Literal(literal) => write!(f, "literal:{}", literal),
        }
    }
}

impl Serialize for RecordKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub key: RecordKey,
    #[serde(serialize_with = "serialize_object")]
    pub record: ObjectNode,
}

impl RecordNode {
    pub fn construct(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Self> {
        let raw_key = fields.required_str("key")?;
        let key = RecordKey::parse(raw_key).ok_or_else(|| {
            ParseError::invalid_value(
                fields.path(),
                "key",
                format!(
                    "'{}' is not one of tid, nsid, any or literal:<value>",
                    raw_key
                ),
            )
        })?;

        let raw_record = fields.required("record")?;
        let record = match ctx.nested("record")?.schema_node(raw_record, "record")? {
            SchemaNode::Object(object) => object,
            other => {
                return Err(ParseError::invalid_value(
                    fields.path(),
                    "record",
                    format!("record schema must be an object, found '{}'", other.kind()),
                ))
            }
        };

        Ok(Self {
            description: fields.optional_string("description")?,
            key,
            record,
        })
    }
}

fn construct_parameters(
    fields: &Fields<'_>,
    ctx: &ParseContext<'_>,
) -> ParseResult<Option<ParamsNode>> {
    let Some(raw) = fields.get("parameters") else {
        return Ok(None);
    };
    let child = ctx.nested("parameters")?;
    let params_fields = Fields::new(raw, child.path(), "parameters")?;
    ParamsNode::construct(&params_fields, &child).map(Some)
}

fn construct_body(
    fields: &Fields<'_>,
    ctx: &ParseContext<'_>,
    name: &str,
) -> ParseResult<Option<Body>> {
    let Some(raw) = fields.get(name) else {
        return Ok(None);
    };
    let child = ctx.child(name);
    let body_fields = Fields::new(raw, child.path(), name)?;
    Body::construct(&body_fields, &child).map(Some)
}

fn construct_errors(fields: &Fields<'_>, ctx: &ParseContext<'_>) -> ParseResult<Vec<ErrorDef>> {
    let Some(raw_errors) = fields.optional_array("errors")? else {
        return Ok(Vec::new());
    };

    let mut errors = Vec::with_capacity(raw_errors.len());
    for (index, raw) in raw_errors.iter().enumerate() {
        let child = ctx.child(&format!("errors[{}]", index));
        let error_fields = Fields::new(raw, child.path(), "errors")?;
        errors.push(ErrorDef {
            name: error_fields.required_str("name")?.to_string(),
            description: error_fields.optional_string("description")?,
        });
    }
    Ok(errors)
}
