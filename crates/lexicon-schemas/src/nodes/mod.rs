//! Schema node model
//!
//! [`SchemaNode`] is the closed sum of the fourteen definition kinds. Positions that
//! hold a nested schema (object properties, array items, body and message schemas)
//! use [`FieldSchema`], which additionally admits a [`RefNode`] or a [`UnionNode`].
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

pub mod container;
pub mod method;
pub mod primitive;

pub use container::{ArrayNode, ObjectNode, ParamsNode};
pub use method::{Body, ErrorDef, MessageBody, ProcedureNode, QueryNode, RecordKey, RecordNode, SubscriptionNode};
pub use primitive::{
    BlobNode, BooleanNode, BytesNode, CidLinkNode, IntegerNode, StringNode, TokenNode,
    UnknownNode,
};

use crate::parser::error::{ParseError, ParseResult};
use crate::registry::NodeKind;
use crate::value::Fields;
use serde::{Serialize, Serializer};

/// One definition in a lexicon document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SchemaNode {
    Array(ArrayNode),
    Blob(BlobNode),
    Boolean(BooleanNode),
    Bytes(BytesNode),
    CidLink(CidLinkNode),
    Integer(IntegerNode),
    Object(ObjectNode),
    Procedure(ProcedureNode),
    Query(QueryNode),
    Record(RecordNode),
    String(StringNode),
    Subscription(SubscriptionNode),
    Token(TokenNode),
    Unknown(UnknownNode),
}

impl SchemaNode {
    pub fn kind(&self) -> NodeKind {
        match self {
            SchemaNode::Array(_) => NodeKind::Array,
            SchemaNode::Blob(_) => NodeKind::Blob,
            SchemaNode::Boolean(_) => NodeKind::Boolean,
            SchemaNode::Bytes(_) => NodeKind::Bytes,
            SchemaNode::CidLink(_) => NodeKind::CidLink,
            SchemaNode::Integer(_) => NodeKind::Integer,
            SchemaNode::Object(_) => NodeKind::Object,
            SchemaNode::Procedure(_) => NodeKind::Procedure,
            SchemaNode::Query(_) => NodeKind::Query,
            SchemaNode::Record(_) => NodeKind::Record,
            SchemaNode::String(_) => NodeKind::String,
            SchemaNode::Subscription(_) => NodeKind::Subscription,
            SchemaNode::Token(_) => NodeKind::Token,
            SchemaNode::Unknown(_) => NodeKind::Unknown,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            SchemaNode::Array(node) => node.description.as_deref(),
            SchemaNode::Blob(node) => node.description.as_deref(),
            SchemaNode::Boolean(node) => node.description.as_deref(),
            SchemaNode::Bytes(node) => node.description.as_deref(),
            SchemaNode::CidLink(node) => node.description.as_deref(),
            SchemaNode::Integer(node) => node.description.as_deref(),
            SchemaNode::Object(node) => node.description.as_deref(),
            SchemaNode::Procedure(node) => node.description.as_deref(),
            SchemaNode::Query(node) => node.description.as_deref(),
            SchemaNode::Record(node) => node.description.as_deref(),
            SchemaNode::String(node) => node.description.as_deref(),
            SchemaNode::Subscription(node) => node.description.as_deref(),
            SchemaNode::Token(node) => node.description.as_deref(),
            SchemaNode::Unknown(node) => node.description.as_deref(),
        }
    }

    /// Record, procedure, query or subscription
    pub fn is_primary(&self) -> bool {
        self.kind().is_primary()
    }
}

/// A schema in a nested position
#[derive(Debug, Clone, PartialEq)]
pub enum FieldSchema {
    Node(SchemaNode),
    Ref(RefNode),
    Union(UnionNode),
}

impl FieldSchema {
    /// The `type` tag as written in the document
    pub fn tag(&self) -> &'static str {
        match self {
            FieldSchema::Node(node) => node.kind().tag(),
            FieldSchema::Ref(_) => "ref",
            FieldSchema::Union(_) => "union",
        }
    }

    pub fn as_node(&self) -> Option<&SchemaNode> {
        match self {
            FieldSchema::Node(node) => Some(node),
            _ => None,
        }
    }

    pub fn description(&self) -> Option<&str> {
        match self {
            FieldSchema::Node(node) => node.description(),
            FieldSchema::Ref(node) => node.description.as_deref(),
            FieldSchema::Union(node) => node.description.as_deref(),
        }
    }
}

impl Serialize for FieldSchema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldSchema::Node(node) => node.serialize(serializer),
            FieldSchema::Ref(node) => Tagged::Ref(node).serialize(serializer),
            FieldSchema::Union(node) => Tagged::Union(node).serialize(serializer),
        }
    }
}

/// Tagged views of the shapes that are written with a `type` but are not definitions
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub(crate) enum Tagged<'a> {
    Object(&'a ObjectNode),
    Params(&'a ParamsNode),
    Ref(&'a RefNode),
    Union(&'a UnionNode),
}

/// Cross-reference to another definition
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RefNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "ref")]
    pub target: String,
}

impl RefNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        let target = fields.required_str("ref")?;
        if target.is_empty() {
            return Err(ParseError::invalid_value(
                fields.path(),
                "ref",
                "reference target is empty",
            ));
        }
        Ok(Self {
            description: fields.optional_string("description")?,
            target: target.to_string(),
        })
    }

    pub fn target(&self) -> RefTarget<'_> {
        RefTarget::parse(&self.target)
    }
}

/// Parsed form of a reference target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefTarget<'a> {
    /// `#fragment`, a definition in the same document
    Local(&'a str),
    /// `nsid` or `nsid#fragment`; a bare NSID points at its `main`
    External { nsid: &'a str, def: &'a str },
}

impl<'a> RefTarget<'a> {
    pub fn parse(raw: &'a str) -> Self {
        match raw.split_once('#') {
            Some(("", fragment)) => RefTarget::Local(fragment),
            Some((nsid, fragment)) => RefTarget::External {
                nsid,
                def: fragment,
            },
            None => RefTarget::External {
                nsid: raw,
                def: "main",
            },
        }
    }

    /// Absolute `(nsid, def)` pair, resolving local targets against `document_id`
    pub fn absolute(&self, document_id: &'a str) -> (&'a str, &'a str) {
        match *self {
            RefTarget::Local(def) => (document_id, def),
            RefTarget::External { nsid, def } => (nsid, def),
        }
    }
}

/// A choice between several referenced definitions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionNode {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub refs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed: Option<bool>,
}

impl UnionNode {
    pub fn construct(fields: &Fields<'_>) -> ParseResult<Self> {
        fields.required("refs")?;
        Ok(Self {
            description: fields.optional_string("description")?,
            refs: fields.string_list("refs")?,
            closed: fields.optional_bool("closed")?,
        })
    }

    pub fn is_closed(&self) -> bool {
        self.closed.unwrap_or(false)
    }
}

pub(crate) fn serialize_params<S: Serializer>(
    params: &Option<ParamsNode>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    match params {
        Some(params) => Tagged::Params(params).serialize(serializer),
        None => serializer.serialize_none(),
    }
}

pub(crate) fn serialize_object<S: Serializer>(
    object: &ObjectNode,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    Tagged::Object(object).serialize(serializer)
}
