//! Lexicon Schemas - document model, typed parser and structural validator
//!
//! This crate turns loosely-typed Lexicon documents (decoded JSON or YAML) into a
//! strongly-typed model of RPC method signatures, record shapes and primitive
//! constraints, then checks the rules that span a whole document.
//!
//! ## Features
//!
//! - **Tag Dispatch**: a closed set of 14 node kinds resolved through an immutable [`TypeRegistry`]
//! - **Typed Field Access**: every JSON read goes through [`value::Fields`] and reports its path
//! - **Recursion Guard**: nesting depth is bounded by [`ParserConfig::max_depth`]
//! - **Validation Modes**: Basic, Partial and Strict, fail-fast or exhaustive
//! - **Loading**: JSON and YAML files, whole directories, and a [`LexiconCatalog`] keyed by NSID
//!
//! ## Quick Start
//!
//! ```rust
//! use lexicon_schemas::{parse, validate, NodeKind};
//! use serde_json::json;
//!
//! let document = parse(json!({
//!     "lexicon": 1,
//!     "id": "com.example.getProfile",
//!     "defs": {
//!         "main": {
//!             "type": "query",
//!             "parameters": {
//!                 "type": "params",
//!                 "required": ["actor"],
//!                 "properties": {"actor": {"type": "string", "format": "at-identifier"}}
//!             },
//!             "output": {"encoding": "application/json"}
//!         }
//!     }
//! }))?;
//!
//! assert_eq!(document.main_kind(), Some(NodeKind::Query));
//! validate(&document)?;
//! # Ok::<(), lexicon_schemas::Error>(())
//! ```
//!
//! ## Validation Rules
//!
//! - The document id must be a well-formed NSID
//! - `main`, when present, must be a record, procedure, query or subscription
//! - Object `required` and `nullable` entries must name declared properties
//! - Numeric and length bounds must be ordered, defaults and constants must satisfy them
//! - Parameters are limited to boolean, integer, string, unknown and arrays of those
//! - Union refs must be non-empty and error names unique
//! - Primary kinds may only appear as `main`, local refs must resolve
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

pub mod document;
pub mod error;
pub mod formats;
pub mod loader;
pub mod nodes;
pub mod nsid;
pub mod parser;
pub mod registry;
pub mod validation;
pub mod value;

// Re-export commonly used types for convenience
pub use document::{Document, LEXICON_VERSION};
pub use error::{Error, Result};
pub use formats::StringFormat;
pub use loader::{LexiconCatalog, LexiconLoader, LoaderConfig, LoaderError};
pub use nodes::{FieldSchema, RefTarget, SchemaNode};
pub use nsid::{Nsid, NsidError};
pub use parser::{DocumentParser, LexiconInput, ParseError, ParseResult, ParserConfig};
pub use registry::{NodeKind, TypeRegistry};
pub use validation::{
    validate, validate_documents_batch, DocumentValidator, SchemaValidator, ValidationConfig,
    ValidationError, ValidationErrors, ValidationMode, MAIN_KIND_MESSAGE,
};

/// Parse a document with the standard registry and default configuration
pub fn parse(input: impl Into<LexiconInput>) -> ParseResult<Document> {
    DocumentParser::standard().parse(input)
}

/// Parse a document and run every check of `config` on it
pub fn parse_and_validate(
    input: impl Into<LexiconInput>,
    config: &ValidationConfig,
) -> Result<Document> {
    let document = parse(input)?;
    DocumentValidator::new(config.clone()).validate_all(&document)?;
    Ok(document)
}
