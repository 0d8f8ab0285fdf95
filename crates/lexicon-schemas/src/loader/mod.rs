//! Loading lexicon documents from disk
//!
//! This module provides:
//! - JSON and YAML lexicon files
//! - recursive directory loading with extension filtering
//! - optional validation of every loaded document
//! - a [`LexiconCatalog`] indexing documents by id, with reference resolution
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use lexicon_schemas::loader::LexiconLoader;
//! use std::path::Path;
//!
//! let loader = LexiconLoader::new();
//! let catalog = loader.load_dir(Path::new("lexicons"))?;
//! for id in catalog.ids() {
//!     println!("{}", id);
//! }
//! # Ok::<(), lexicon_schemas::loader::LoaderError>(())
//! ```
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

pub mod catalog;
pub mod error;
pub mod source;

pub use catalog::{LexiconCatalog, ResolvedRef};
pub use error::{LoaderError, LoaderResult};
pub use source::{Format, SourceDecoder};

use crate::document::Document;
use crate::parser::{DocumentParser, ParserConfig};
use crate::registry::TypeRegistry;
use crate::validation::{DocumentValidator, ValidationConfig};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

/// Configuration for loader behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    pub parser: ParserConfig,
    /// Validate every document as it is loaded
    pub validate_on_load: bool,
    pub validation: ValidationConfig,
    /// File extensions picked up when walking directories
    pub extensions: Vec<String>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            parser: ParserConfig::default(),
            validate_on_load: true,
            validation: ValidationConfig::default(),
            extensions: vec!["json".to_string(), "yaml".to_string(), "yml".to_string()],
        }
    }
}

impl LoaderConfig {
    pub fn without_validation(mut self) -> Self {
        self.validate_on_load = false;
        self
    }

    fn accepts(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| self.extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
    }
}

/// Loads and optionally validates lexicon files
#[derive(Debug, Clone)]
pub struct LexiconLoader {
    config: LoaderConfig,
    decoder: SourceDecoder,
    parser: DocumentParser,
    validator: DocumentValidator,
}

impl LexiconLoader {
    pub fn new() -> Self {
        Self::with_config(LoaderConfig::default())
    }

    pub fn with_config(config: LoaderConfig) -> Self {
        Self::with_registry(Arc::new(TypeRegistry::standard()), config)
    }

    /// Share an existing registry
    pub fn with_registry(registry: Arc<TypeRegistry>, config: LoaderConfig) -> Self {
        Self {
            decoder: SourceDecoder::new(),
            parser: DocumentParser::with_config(registry, config.parser.clone()),
            validator: DocumentValidator::new(config.validation.clone()),
            config,
        }
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    pub fn parser(&self) -> &DocumentParser {
        &self.parser
    }

    /// Load one file
    #[instrument(skip_all, fields(path = %path.display()))]
    pub fn load_file(&self, path: &Path) -> LoaderResult<Document> {
        let value = self.decoder.decode_file(path)?;
        let document = self.build(&value, path)?;
        debug!(nsid = document.id(), "loaded lexicon");
        Ok(document)
    }

    /// Load in-memory content; `path` only names the source in errors
    pub fn load_content(&self, content: &str, format: Format, path: &Path) -> LoaderResult<Document> {
        let value = self.decoder.decode_content(content, format, path)?;
        self.build(&value, path)
    }

    fn build(&self, value: &serde_json::Value, path: &Path) -> LoaderResult<Document> {
        let document = self
            .parser
            .parse_value(value)
            .map_err(|e| LoaderError::document_error(path.to_path_buf(), e))?;

        if self.config.validate_on_load {
            self.validator
                .validate_all(&document)
                .map_err(|e| LoaderError::validation_failed(path.to_path_buf(), e))?;
        }
        Ok(document)
    }

    /// Lexicon files under `root`, in a stable order
    pub fn discover(&self, root: &Path) -> LoaderResult<Vec<PathBuf>> {
        if root.is_file() {
            return Ok(vec![root.to_path_buf()]);
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
            let entry = entry.map_err(|e| LoaderError::walk_error(root.to_path_buf(), e))?;
            if entry.file_type().is_file() && self.config.accepts(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Load each path independently, keeping every outcome
    pub fn load_paths(&self, paths: &[PathBuf]) -> LoaderResult<Vec<(PathBuf, LoaderResult<Document>)>> {
        let mut results = Vec::new();
        for root in paths {
            for file in self.discover(root)? {
                let outcome = self.load_file(&file);
                if let Err(error) = &outcome {
                    warn!(path = %file.display(), %error, "failed to load lexicon");
                }
                results.push((file, outcome));
            }
        }
        Ok(results)
    }

    /// Load every lexicon under `root` into a catalog, failing on the first bad file
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn load_dir(&self, root: &Path) -> LoaderResult<LexiconCatalog> {
        let mut catalog = LexiconCatalog::new();
        for file in self.discover(root)? {
            let document = self.load_file(&file)?;
            catalog.insert(document, Some(file))?;
        }
        info!(documents = catalog.len(), "lexicon catalog loaded");
        Ok(catalog)
    }

    /// Load several roots into one catalog
    pub fn load_catalog(&self, roots: &[PathBuf]) -> LoaderResult<LexiconCatalog> {
        let mut catalog = LexiconCatalog::new();
        for root in roots {
            for file in self.discover(root)? {
                let document = self.load_file(&file)?;
                catalog.insert(document, Some(file))?;
            }
        }
        Ok(catalog)
    }
}

impl Default for LexiconLoader {
    fn default() -> Self {
        Self::new()
    }
}
