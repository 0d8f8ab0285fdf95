//! The parsed lexicon document
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::nodes::SchemaNode;
use crate::nsid::{Nsid, NsidError};
use crate::registry::NodeKind;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Number;

/// Version of the lexicon language this crate understands
pub const LEXICON_VERSION: u64 = 1;

/// A fully typed lexicon document
///
/// Only [`DocumentParser`](crate::parser::DocumentParser) builds documents; once built
/// they are read-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    lexicon: u64,
    id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    revision: Option<Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    defs: IndexMap<String, SchemaNode>,
}

impl Document {
    pub(crate) fn from_parts(
        id: String,
        revision: Option<Number>,
        description: Option<String>,
        defs: IndexMap<String, SchemaNode>,
    ) -> Self {
        Self {
            lexicon: LEXICON_VERSION,
            id,
            revision,
            description,
            defs,
        }
    }

    pub fn lexicon(&self) -> u64 {
        self.lexicon
    }

    /// The document id as written; see [`Document::nsid`] for the checked form
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn nsid(&self) -> Result<Nsid, NsidError> {
        Nsid::new(self.id.as_str())
    }

    /// The revision exactly as written; any JSON number is accepted
    pub fn revision(&self) -> Option<&Number> {
        self.revision.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Definitions in source order
    pub fn defs(&self) -> &IndexMap<String, SchemaNode> {
        &self.defs
    }

    pub fn def(&self, name: &str) -> Option<&SchemaNode> {
        self.defs.get(name)
    }

    pub fn main(&self) -> Option<&SchemaNode> {
        self.def("main")
    }

    pub fn main_kind(&self) -> Option<NodeKind> {
        self.main().map(SchemaNode::kind)
    }

    /// Serialize back to the generic value form
    pub fn to_value(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
