//! Inspect command handler

use super::utils;
use crate::cli::InspectArgs;
use crate::config::Config;
use crate::error::Result;
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use lexicon_schemas::{Document, NodeKind};
use serde::Serialize;
use tracing::{debug, instrument};

/// One row of the definitions table
#[derive(Debug, Serialize)]
pub struct DefSummary {
    pub name: String,
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Document header plus its definitions
#[derive(Debug, Serialize)]
pub struct DocumentSummary {
    pub id: String,
    pub lexicon: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<serde_json::Number>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub defs: Vec<DefSummary>,
}

impl From<&Document> for DocumentSummary {
    fn from(document: &Document) -> Self {
        Self {
            id: document.id().to_string(),
            lexicon: document.lexicon(),
            revision: document.revision().cloned(),
            description: document.description().map(str::to_string),
            defs: document
                .defs()
                .iter()
                .map(|(name, node)| DefSummary {
                    name: name.clone(),
                    kind: node.kind(),
                    description: node.description().map(str::to_string),
                })
                .collect(),
        }
    }
}

/// Handle the inspect command
#[instrument(skip_all, fields(file = %args.file.display()))]
pub async fn handle_inspect(args: InspectArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::new("inspect_command");
    utils::ensure_exists(std::slice::from_ref(&args.file))?;

    let document = utils::loader(config.parser.clone()).load_file(&args.file)?;
    debug!(nsid = document.id(), defs = document.defs().len(), "document loaded");

    if args.normalized {
        return output.data(&document);
    }

    let summary = DocumentSummary::from(&document);
    if !output.is_human() {
        return output.data(&summary);
    }

    output.section(&summary.id)?;
    output.info(&format!("Lexicon version: {}", summary.lexicon))?;
    if let Some(revision) = &summary.revision {
        output.info(&format!("Revision: {}", revision))?;
    }
    if let Some(description) = &summary.description {
        output.info(description)?;
    }
    output.writeln("")?;

    let rows = summary
        .defs
        .iter()
        .map(|def| {
            vec![
                def.name.clone(),
                def.kind.to_string(),
                def.description.clone().unwrap_or_default(),
            ]
        })
        .collect();
    output.table(&["Name", "Kind", "Description"], rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::error::Error;
    use crate::output::capture::writer;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::tempdir;

    fn post_lexicon(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("post.json");
        std::fs::write(
            &path,
            json!({
                "lexicon": 1,
                "id": "com.example.post",
                "revision": 2,
                "description": "A short post",
                "defs": {
                    "main": {
                        "type": "record",
                        "key": "tid",
                        "description": "Record holding a post",
                        "record": {"type": "object", "properties": {"text": {"type": "string"}}}
                    },
                    "tag": {"type": "string", "maxLength": 64}
                }
            })
            .to_string(),
        )
        .unwrap();
        path
    }

    #[tokio::test]
    async fn test_summary_json() {
        let dir = tempdir().unwrap();
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        let args = InspectArgs {
            file: post_lexicon(&dir),
            normalized: false,
        };
        handle_inspect(args, &Config::default(), &mut out).await.unwrap();

        let summary: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(
            summary,
            json!({
                "id": "com.example.post",
                "lexicon": 1,
                "revision": 2,
                "description": "A short post",
                "defs": [
                    {"name": "main", "kind": "record", "description": "Record holding a post"},
                    {"name": "tag", "kind": "string"}
                ]
            })
        );
    }

    #[tokio::test]
    async fn test_summary_table() {
        let dir = tempdir().unwrap();
        let (mut out, buffer) = writer(OutputFormat::Human, false);
        let args = InspectArgs {
            file: post_lexicon(&dir),
            normalized: false,
        };
        handle_inspect(args, &Config::default(), &mut out).await.unwrap();

        let text = buffer.contents();
        assert!(text.contains("=== com.example.post ==="));
        assert!(text.contains("INFO: Revision: 2"));
        assert!(text.contains("main │ record │ Record holding a post"));
    }

    #[tokio::test]
    async fn test_normalized_document() {
        let dir = tempdir().unwrap();
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        let args = InspectArgs {
            file: post_lexicon(&dir),
            normalized: true,
        };
        handle_inspect(args, &Config::default(), &mut out).await.unwrap();

        let document: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(document["defs"]["tag"], json!({"type": "string", "maxLength": 64}));
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (mut out, _) = writer(OutputFormat::Human, false);
        let args = InspectArgs {
            file: PathBuf::from("/nonexistent/lexicon.json"),
            normalized: false,
        };
        let err = handle_inspect(args, &Config::default(), &mut out).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }
}
