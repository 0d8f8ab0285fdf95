//! A set of loaded documents indexed by id
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::document::Document;
use crate::loader::error::{LoaderError, LoaderResult};
use crate::nodes::{RefTarget, SchemaNode};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

/// A definition found by following a reference
#[derive(Debug, Clone)]
pub struct ResolvedRef<'c> {
    pub document: &'c Arc<Document>,
    pub def: &'c str,
    pub node: &'c SchemaNode,
}

impl ResolvedRef<'_> {
    /// `nsid#def` form of the resolved target
    pub fn qualified_name(&self) -> String {
        format!("{}#{}", self.document.id(), self.def)
    }
}

/// Documents keyed by their id
#[derive(Debug, Clone, Default)]
pub struct LexiconCatalog {
    documents: BTreeMap<String, Arc<Document>>,
    sources: BTreeMap<String, PathBuf>,
}

impl LexiconCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document; a second document with the same id is rejected
    pub fn insert(&mut self, document: Document, source: Option<PathBuf>) -> LoaderResult<Arc<Document>> {
        let id = document.id().to_string();
        if self.documents.contains_key(&id) {
            let first = self.sources.get(&id).cloned().unwrap_or_default();
            return Err(LoaderError::duplicate_id(
                id,
                source.unwrap_or_default(),
                first,
            ));
        }

        let document = Arc::new(document);
        if let Some(source) = source {
            self.sources.insert(id.clone(), source);
        }
        self.documents.insert(id, Arc::clone(&document));
        Ok(document)
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Document>> {
        self.documents.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.documents.contains_key(id)
    }

    /// File a document was loaded from, when it came from disk
    pub fn source(&self, id: &str) -> Option<&PathBuf> {
        self.sources.get(id)
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Document ids in sorted order
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.documents.keys().map(String::as_str)
    }

    pub fn documents(&self) -> impl Iterator<Item = &Arc<Document>> {
        self.documents.values()
    }

    /// Follow `target` as written inside the document `from`
    pub fn resolve_ref(&self, from: &str, target: &str) -> Option<ResolvedRef<'_>> {
        let (nsid, def) = RefTarget::parse(target).absolute(from);
        let document = self.documents.get(nsid)?;
        let (def, node) = document.defs().get_key_value(def)?;
        Some(ResolvedRef {
            document,
            def: def.as_str(),
            node,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse;
    use crate::registry::NodeKind;
    use serde_json::json;

    fn catalog() -> LexiconCatalog {
        let mut catalog = LexiconCatalog::new();
        catalog
            .insert(
                parse(json!({
                    "lexicon": 1,
                    "id": "com.example.defs",
                    "defs": {
                        "label": {"type": "string"},
                        "main": {"type": "record", "key": "tid", "record": {"type": "object"}}
                    }
                }))
                .unwrap(),
                Some(PathBuf::from("defs.json")),
            )
            .unwrap();
        catalog
    }

    #[test]
    fn test_resolve_forms() {
        let catalog = catalog();

        let local = catalog.resolve_ref("com.example.defs", "#label").unwrap();
        assert_eq!(local.node.kind(), NodeKind::String);
        assert_eq!(local.qualified_name(), "com.example.defs#label");

        let external = catalog.resolve_ref("com.other.thing", "com.example.defs#label").unwrap();
        assert_eq!(external.def, "label");

        let main = catalog.resolve_ref("com.other.thing", "com.example.defs").unwrap();
        assert_eq!(main.node.kind(), NodeKind::Record);

        assert!(catalog.resolve_ref("com.other.thing", "#label").is_none());
        assert!(catalog.resolve_ref("com.example.defs", "#missing").is_none());
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut catalog = catalog();
        let again = parse(json!({"lexicon": 1, "id": "com.example.defs", "defs": {}})).unwrap();
        let err = catalog.insert(again, Some(PathBuf::from("other.json"))).unwrap_err();
        assert!(matches!(err, LoaderError::DuplicateId { ref first, .. } if first == &PathBuf::from("defs.json")));
        assert_eq!(catalog.len(), 1);
    }
}
