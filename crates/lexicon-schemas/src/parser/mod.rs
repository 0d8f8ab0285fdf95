//! Document parsing
//!
//! [`DocumentParser`] checks the document envelope, then hands every entry of `defs`
//! to the constructor the [`TypeRegistry`] holds for its `type` tag. Constructors
//! recurse into nested schemas through [`ParseContext`], which tracks the JSON path
//! used in error messages and bounds the nesting depth.
//!
//! # Example Usage
//!
//! ```rust
//! use lexicon_schemas::parser::DocumentParser;
//! use serde_json::json;
//!
//! let parser = DocumentParser::standard();
//! let doc = parser.parse(json!({
//!     "lexicon": 1,
//!     "id": "com.example.getStatus",
//!     "defs": { "main": { "type": "query" } }
//! }))?;
//! assert_eq!(doc.id(), "com.example.getStatus");
//! # Ok::<(), lexicon_schemas::ParseError>(())
//! ```
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

pub mod error;

pub use error::{ParseError, ParseResult};

use crate::document::{Document, LEXICON_VERSION};
use crate::nodes::{FieldSchema, RefNode, SchemaNode, UnionNode};
use crate::registry::TypeRegistry;
use crate::value::Fields;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, instrument, trace};

/// Default bound on schema nesting
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Parser configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Deepest allowed nesting of schema positions, counting each definition as 1
    pub max_depth: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl ParserConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Anything a document can be parsed from
#[derive(Debug, Clone)]
pub enum LexiconInput {
    /// Already parsed; returned unchanged
    Document(Document),
    /// Decoded generic value
    Value(Value),
    /// Raw JSON text
    Text(String),
}

impl From<Document> for LexiconInput {
    fn from(document: Document) -> Self {
        LexiconInput::Document(document)
    }
}

impl From<Value> for LexiconInput {
    fn from(value: Value) -> Self {
        LexiconInput::Value(value)
    }
}

impl From<&Value> for LexiconInput {
    fn from(value: &Value) -> Self {
        LexiconInput::Value(value.clone())
    }
}

impl From<String> for LexiconInput {
    fn from(text: String) -> Self {
        LexiconInput::Text(text)
    }
}

impl From<&str> for LexiconInput {
    fn from(text: &str) -> Self {
        LexiconInput::Text(text.to_string())
    }
}

/// Position of a constructor inside the document being parsed
#[derive(Debug, Clone)]
pub struct ParseContext<'r> {
    registry: &'r TypeRegistry,
    path: String,
    depth: usize,
    max_depth: usize,
}

impl<'r> ParseContext<'r> {
    /// A context at the document root
    pub fn new(registry: &'r TypeRegistry, max_depth: usize) -> Self {
        Self {
            registry,
            path: "$".to_string(),
            depth: 0,
            max_depth,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn registry(&self) -> &'r TypeRegistry {
        self.registry
    }

    /// Same depth, longer path; for envelopes such as `output` that are not schemas
    pub fn child(&self, segment: &str) -> Self {
        Self {
            registry: self.registry,
            path: join_path(&self.path, segment),
            depth: self.depth,
            max_depth: self.max_depth,
        }
    }

    /// One schema level deeper
    pub fn nested(&self, segment: &str) -> ParseResult<Self> {
        let path = join_path(&self.path, segment);
        let depth = self.depth + 1;
        if depth > self.max_depth {
            return Err(ParseError::RecursionLimit {
                path,
                limit: self.max_depth,
            });
        }
        Ok(Self {
            registry: self.registry,
            path,
            depth,
            max_depth: self.max_depth,
        })
    }

    /// Build one of the registered node kinds from `raw`
    pub fn schema_node(&self, raw: &Value, field: &str) -> ParseResult<SchemaNode> {
        let fields = Fields::new(raw, &self.path, field)?;
        let tag = fields.tag()?;
        let (kind, constructor) = self.registry.resolve(tag, &self.path)?;
        trace!(path = %self.path, %kind, "constructing node");
        constructor(&fields, self)
    }

    /// Build a nested schema: a registered node, a `ref` or a `union`
    pub fn field_schema(&self, raw: &Value, field: &str) -> ParseResult<FieldSchema> {
        let fields = Fields::new(raw, &self.path, field)?;
        match fields.tag()? {
            "ref" => RefNode::construct(&fields).map(FieldSchema::Ref),
            "union" => UnionNode::construct(&fields).map(FieldSchema::Union),
            _ => self.schema_node(raw, field).map(FieldSchema::Node),
        }
    }
}

fn join_path(base: &str, segment: &str) -> String {
    if segment.starts_with('[') {
        format!("{}{}", base, segment)
    } else {
        format!("{}.{}", base, segment)
    }
}

/// Turns raw lexicon input into a [`Document`]
#[derive(Debug, Clone)]
pub struct DocumentParser {
    registry: Arc<TypeRegistry>,
    config: ParserConfig,
}

impl DocumentParser {
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_config(registry, ParserConfig::default())
    }

    pub fn with_config(registry: Arc<TypeRegistry>, config: ParserConfig) -> Self {
        Self { registry, config }
    }

    /// A parser over a fresh standard registry
    pub fn standard() -> Self {
        Self::new(Arc::new(TypeRegistry::standard()))
    }

    pub fn registry(&self) -> &Arc<TypeRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Parse a document from any supported input
    #[instrument(skip_all)]
    pub fn parse(&self, input: impl Into<LexiconInput>) -> ParseResult<Document> {
        match input.into() {
            LexiconInput::Document(document) => {
                debug!(nsid = document.id(), "document input passed through");
                Ok(document)
            }
            LexiconInput::Value(value) => self.parse_value(&value),
            LexiconInput::Text(text) => self.parse_str(&text),
        }
    }

    /// Parse raw JSON text
    pub fn parse_str(&self, text: &str) -> ParseResult<Document> {
        let value: Value = serde_json::from_str(text).map_err(ParseError::malformed)?;
        self.parse_value(&value)
    }

    /// Parse a decoded generic value
    pub fn parse_value(&self, raw: &Value) -> ParseResult<Document> {
        let root = Fields::new(raw, "$", "document")?;

        match root.get("lexicon") {
            Some(version) if version.as_u64() == Some(LEXICON_VERSION) => {}
            other => return Err(ParseError::unsupported_version(other)),
        }

        let id = root.required_str("id")?;
        let raw_defs = root.required_object("defs")?;
        let revision = root.optional_number("revision")?;
        let description = root.optional_string("description")?;

        let ctx = ParseContext::new(&self.registry, self.config.max_depth);
        let mut defs = IndexMap::with_capacity(raw_defs.len());
        for (name, raw_def) in raw_defs {
            let def_ctx = ctx.nested(&format!("defs.{}", name))?;
            let node = def_ctx.schema_node(raw_def, name)?;
            trace!(nsid = id, def = %name, kind = %node.kind(), "parsed definition");
            defs.insert(name.clone(), node);
        }

        debug!(nsid = id, defs = defs.len(), "parsed lexicon document");
        Ok(Document::from_parts(
            id.to_string(),
            revision,
            description,
            defs,
        ))
    }
}

impl Default for DocumentParser {
    fn default() -> Self {
        Self::standard()
    }
}
