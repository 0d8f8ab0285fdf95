//! Type registry
//!
//! Maps every schema node kind to the function that builds it from a raw definition.
//! The table is assembled once by [`TypeRegistry::standard`] and has no mutating
//! methods, so a single instance can be shared behind an `Arc` by any number of
//! parsers on any number of threads.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::nodes::{
    ArrayNode, BlobNode, BooleanNode, BytesNode, CidLinkNode, IntegerNode, ObjectNode,
    ProcedureNode, QueryNode, RecordNode, SchemaNode, StringNode, SubscriptionNode, TokenNode,
    UnknownNode,
};
use crate::parser::error::{ParseError, ParseResult};
use crate::parser::ParseContext;
use crate::value::Fields;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Builds one kind of schema node from its raw fields
pub type NodeConstructor = fn(&Fields<'_>, &ParseContext<'_>) -> ParseResult<SchemaNode>;

/// The registered schema node kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Array,
    Blob,
    Boolean,
    Bytes,
    CidLink,
    Integer,
    Object,
    Procedure,
    Query,
    Record,
    String,
    Subscription,
    Token,
    Unknown,
}

impl NodeKind {
    pub const ALL: [NodeKind; 14] = [
        NodeKind::Array,
        NodeKind::Blob,
        NodeKind::Boolean,
        NodeKind::Bytes,
        NodeKind::CidLink,
        NodeKind::Integer,
        NodeKind::Object,
        NodeKind::Procedure,
        NodeKind::Query,
        NodeKind::Record,
        NodeKind::String,
        NodeKind::Subscription,
        NodeKind::Token,
        NodeKind::Unknown,
    ];

    /// The `type` tag this kind is written as
    pub fn tag(&self) -> &'static str {
        match self {
            NodeKind::Array => "array",
            NodeKind::Blob => "blob",
            NodeKind::Boolean => "boolean",
            NodeKind::Bytes => "bytes",
            NodeKind::CidLink => "cid-link",
            NodeKind::Integer => "integer",
            NodeKind::Object => "object",
            NodeKind::Procedure => "procedure",
            NodeKind::Query => "query",
            NodeKind::Record => "record",
            NodeKind::String => "string",
            NodeKind::Subscription => "subscription",
            NodeKind::Token => "token",
            NodeKind::Unknown => "unknown",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }

    /// Kinds that may only appear as a document's `main` definition
    pub fn is_primary(&self) -> bool {
        matches!(
            self,
            NodeKind::Record | NodeKind::Procedure | NodeKind::Query | NodeKind::Subscription
        )
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// Immutable table from node kind to constructor
#[derive(Clone)]
pub struct TypeRegistry {
    constructors: BTreeMap<NodeKind, NodeConstructor>,
}

impl TypeRegistry {
    /// The registry of all fourteen lexicon node kinds
    pub fn standard() -> Self {
        let mut constructors: BTreeMap<NodeKind, NodeConstructor> = BTreeMap::new();

        constructors.insert(NodeKind::Array, |fields, ctx| {
            ArrayNode::construct(fields, ctx).map(SchemaNode::Array)
        });
        constructors.insert(NodeKind::Blob, |fields, _| {
            BlobNode::construct(fields).map(SchemaNode::Blob)
        });
        constructors.insert(NodeKind::Boolean, |fields, _| {
            BooleanNode::construct(fields).map(SchemaNode::Boolean)
        });
        constructors.insert(NodeKind::Bytes, |fields, _| {
            BytesNode::construct(fields).map(SchemaNode::Bytes)
        });
        constructors.insert(NodeKind::CidLink, |fields, _| {
            CidLinkNode::construct(fields).map(SchemaNode::CidLink)
        });
        constructors.insert(NodeKind::Integer, |fields, _| {
            IntegerNode::construct(fields).map(SchemaNode::Integer)
        });
        constructors.insert(NodeKind::Object, |fields, ctx| {
            ObjectNode::construct(fields, ctx).map(SchemaNode::Object)
        });
        constructors.insert(NodeKind::Procedure, |fields, ctx| {
            ProcedureNode::construct(fields, ctx).map(SchemaNode::Procedure)
        });
        constructors.insert(NodeKind::Query, |fields, ctx| {
            QueryNode::construct(fields, ctx).map(SchemaNode::Query)
        });
        constructors.insert(NodeKind::Record, |fields, ctx| {
            RecordNode::construct(fields, ctx).map(SchemaNode::Record)
        });
        constructors.insert(NodeKind::String, |fields, _| {
            StringNode::construct(fields).map(SchemaNode::String)
        });
        constructors.insert(NodeKind::Subscription, |fields, ctx| {
            SubscriptionNode::construct(fields, ctx).map(SchemaNode::Subscription)
        });
        constructors.insert(NodeKind::Token, |fields, _| {
            TokenNode::construct(fields).map(SchemaNode::Token)
        });
        constructors.insert(NodeKind::Unknown, |fields, _| {
            UnknownNode::construct(fields).map(SchemaNode::Unknown)
        });

        Self { constructors }
    }

    /// Find the constructor for a `type` tag
    ///
    /// `path` only locates the failure; lookup depends on `tag` alone.
    pub fn resolve(&self, tag: &str, path: &str) -> ParseResult<(NodeKind, NodeConstructor)> {
        NodeKind::from_tag(tag)
            .and_then(|kind| self.constructors.get(&kind).map(|ctor| (kind, *ctor)))
            .ok_or_else(|| ParseError::unknown_kind(path, tag))
    }

    /// Registered kinds, in tag order
    pub fn kinds(&self) -> impl Iterator<Item = NodeKind> + '_ {
        self.constructors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    pub fn contains(&self, tag: &str) -> bool {
        NodeKind::from_tag(tag).is_some_and(|kind| self.constructors.contains_key(&kind))
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("kinds", &self.constructors.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_has_every_kind() {
        let registry = TypeRegistry::standard();
        assert_eq!(registry.len(), 14);
        for kind in NodeKind::ALL {
            assert!(registry.contains(kind.tag()), "missing {}", kind);
        }
        assert_eq!(registry.kinds().count(), NodeKind::ALL.len());
    }

    #[test]
    fn test_resolve_unknown_tag() {
        let registry = TypeRegistry::standard();
        let err = registry.resolve("float", "$.defs.main").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnknownTypeKind { ref tag, ref path } if tag == "float" && path == "$.defs.main"
        ));
    }

    #[test]
    fn test_ref_and_union_are_not_standalone_kinds() {
        let registry = TypeRegistry::standard();
        assert!(!registry.contains("ref"));
        assert!(!registry.contains("union"));
        assert!(!registry.contains("params"));
    }

    #[test]
    fn test_tag_round_trip() {
        for kind in NodeKind::ALL {
            assert_eq!(NodeKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(NodeKind::CidLink.tag(), "cid-link");
    }

    #[test]
    fn test_primary_kinds() {
        let primary: Vec<_> = NodeKind::ALL.into_iter().filter(NodeKind::is_primary).collect();
        assert_eq!(
            primary,
            vec![
                NodeKind::Procedure,
                NodeKind::Query,
                NodeKind::Record,
                NodeKind::Subscription
            ]
        );
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TypeRegistry>();
    }
}
