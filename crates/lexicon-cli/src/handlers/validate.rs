//! Validation command handler

use super::utils;
use crate::cli::ValidateArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use lexicon_schemas::loader::LoaderResult;
use lexicon_schemas::{
    Document, DocumentValidator, ValidationConfig, ValidationError, ValidationErrors, ValidationMode,
};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{debug, info, instrument, warn};

/// Outcome for one lexicon file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub valid: bool,
    /// Why the file could not be read or parsed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub violations: Vec<ValidationError>,
}

/// Outcome for a whole `validate` run
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub mode: ValidationMode,
    pub files: usize,
    pub valid: usize,
    pub invalid: usize,
    pub results: Vec<FileReport>,
}

impl FileReport {
    fn check(path: PathBuf, loaded: LoaderResult<Document>, validator: &DocumentValidator) -> Self {
        let document = match loaded {
            Ok(document) => document,
            Err(error) => {
                return Self {
                    path,
                    id: None,
                    valid: false,
                    error: Some(error.to_string()),
                    violations: Vec::new(),
                }
            }
        };

        let violations = match validator.validate_all(&document) {
            Ok(()) => Vec::new(),
            Err(errors) => errors.errors,
        };
        debug!(path = %path.display(), nsid = document.id(), violations = violations.len(), "checked document");

        Self {
            path,
            id: Some(document.id().to_string()),
            valid: violations.is_empty(),
            error: None,
            violations,
        }
    }
}

/// Validation settings after command-line overrides
fn validation_config(args: &ValidateArgs, config: &Config) -> ValidationConfig {
    let mut validation = config.validation.clone();
    if let Some(mode) = args.mode {
        validation = validation.with_mode(mode.into());
    }
    if args.collect_all {
        validation = validation.with_collect_all();
    }
    if let Some(max_errors) = args.max_errors {
        validation = validation.with_collect_all().with_max_errors(max_errors);
    }
    validation
}

/// Handle the validate command
#[instrument(skip_all, fields(paths = args.paths.len()))]
pub async fn handle_validate(args: ValidateArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("validate_command", &format!("{} path(s)", args.paths.len()));
    utils::ensure_exists(&args.paths)?;

    let validation = validation_config(&args, config);
    let parser = match args.max_depth {
        Some(0) => return Err(Error::invalid_args("--max-depth must be at least 1")),
        Some(depth) => config.parser.clone().with_max_depth(depth),
        None => config.parser.clone(),
    };
    debug!(mode = %validation.mode, fail_fast = validation.fail_fast, max_depth = parser.max_depth, "validation settings");

    let loader = utils::loader(parser);
    let paths = args.paths.clone();
    let loaded = tokio::task::spawn_blocking(move || loader.load_paths(&paths))
        .await
        .map_err(|e| Error::other(format!("Loading task failed: {}", e)))??;

    if loaded.is_empty() {
        return Err(Error::NoLexicons { paths: args.paths });
    }

    let validator = DocumentValidator::new(validation.clone());
    let progress = output.progress_bar(loaded.len() as u64, "Validating lexicons");
    let mut results = Vec::with_capacity(loaded.len());
    for (path, outcome) in loaded {
        results.push(FileReport::check(path, outcome, &validator));
        if let Some(pb) = &progress {
            pb.inc(1);
        }
    }
    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    let invalid = results.iter().filter(|report| !report.valid).count();
    let report = ValidationReport {
        mode: validation.mode,
        files: results.len(),
        valid: results.len() - invalid,
        invalid,
        results,
    };
    write_report(&report, output)?;

    if invalid > 0 {
        warn!(invalid, files = report.files, elapsed_ms = timer.elapsed().as_millis() as u64, "validation failed");
        return Err(Error::ValidationFailed {
            failed: invalid,
            total: report.files,
        });
    }

    info!(files = report.files, elapsed_ms = timer.elapsed().as_millis() as u64, "validation succeeded");
    Ok(())
}

fn write_report(report: &ValidationReport, output: &mut OutputWriter) -> Result<()> {
    if !output.is_human() {
        return output.data(report);
    }

    for result in &report.results {
        let label = match &result.id {
            Some(id) => format!("{} ({})", result.path.display(), id),
            None => result.path.display().to_string(),
        };

        if result.valid {
            output.success(&format!("✓ {}", label))?;
            continue;
        }

        output.error(&format!("✗ {}", label))?;
        if let Some(error) = &result.error {
            output.writeln(&format!("   {}", error))?;
        }
        if !result.violations.is_empty() {
            output.validation_errors(&ValidationErrors::from(result.violations.clone()))?;
        }
    }

    output.section("Summary")?;
    output.info(&format!(
        "{} file(s) checked in {} mode: {} valid, {} invalid",
        report.files, report.mode, report.valid, report.invalid
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{ModeArg, OutputFormat};
    use crate::output::capture::writer;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    const VALID: &str = r#"{"lexicon": 1, "id": "com.example.ping", "defs": {"main": {"type": "query"}}}"#;
    const OBJECT_MAIN: &str = r#"{"lexicon": 1, "id": "com.example.bad", "defs": {"main": {"type": "object"}}}"#;
    const TWO_BAD_DEFS: &str = r#"
lexicon: 1
id: com.example.bounds
defs:
  a:
    type: integer
    minimum: 10
    maximum: 1
  b:
    type: string
    minLength: 5
    maxLength: 2
"#;

    fn args(paths: Vec<PathBuf>) -> ValidateArgs {
        ValidateArgs {
            paths,
            mode: None,
            collect_all: false,
            max_errors: None,
            max_depth: None,
        }
    }

    #[tokio::test]
    async fn test_validate_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("com/example")).unwrap();
        fs::write(dir.path().join("com/example/ping.json"), VALID).unwrap();
        fs::write(dir.path().join("com/example/bad.json"), OBJECT_MAIN).unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let (mut out, buffer) = writer(OutputFormat::Json, false);
        let err = handle_validate(args(vec![dir.path().to_path_buf()]), &Config::default(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ValidationFailed { failed: 1, total: 2 }));

        let report: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(report["files"], 2);
        assert_eq!(report["mode"], "basic");
        let bad = &report["results"][0];
        assert_eq!(bad["id"], "com.example.bad");
        assert_eq!(bad["violations"][0]["rule"], "main-kind");
        assert_eq!(report["results"][1]["valid"], true);
    }

    #[tokio::test]
    async fn test_collect_all_and_modes() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bounds.yaml");
        fs::write(&path, TWO_BAD_DEFS).unwrap();

        let (mut out, buffer) = writer(OutputFormat::Json, false);
        let mut collect = args(vec![path.clone()]);
        collect.mode = Some(ModeArg::Partial);
        collect.collect_all = true;
        assert!(handle_validate(collect, &Config::default(), &mut out).await.is_err());
        let report: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(report["results"][0]["violations"].as_array().unwrap().len(), 2);

        let (mut out, _) = writer(OutputFormat::Json, false);
        assert!(handle_validate(args(vec![path]), &Config::default(), &mut out).await.is_ok());
    }

    #[tokio::test]
    async fn test_unparseable_file_is_reported() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("broken.json");
        fs::write(&path, r#"{"lexicon": 1, "id": "com.example.x", "defs": {"main": {"type": "mystery"}}}"#).unwrap();

        let (mut out, buffer) = writer(OutputFormat::Human, false);
        let err = handle_validate(args(vec![path]), &Config::default(), &mut out)
            .await
            .unwrap_err();
        assert_eq!(err.exit_code(), 7);

        let text = buffer.contents();
        assert!(text.contains("ERROR: ✗"));
        assert!(text.contains("mystery"));
        assert!(text.contains("0 valid, 1 invalid"));
    }

    #[tokio::test]
    async fn test_missing_and_empty_paths() {
        let dir = tempdir().unwrap();
        let (mut out, _) = writer(OutputFormat::Human, false);

        let err = handle_validate(args(vec![dir.path().join("nope")]), &Config::default(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));

        let err = handle_validate(args(vec![dir.path().to_path_buf()]), &Config::default(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NoLexicons { .. }));

        let mut zero_depth = args(vec![dir.path().to_path_buf()]);
        zero_depth.max_depth = Some(0);
        let err = handle_validate(zero_depth, &Config::default(), &mut out)
            .await
            .unwrap_err();
        assert!(err.should_show_help());
    }

    #[test]
    fn test_max_errors_implies_collect_all() {
        let mut validate = args(vec![]);
        validate.max_errors = Some(3);
        let config = validation_config(&validate, &Config::default());
        assert!(!config.fail_fast);
        assert_eq!(config.max_errors, 3);
    }
}
