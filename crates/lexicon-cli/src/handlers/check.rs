//! Request check command handler

use super::utils;
use crate::cli::CheckArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use lexicon_xrpc::{Call, DispatchConfig, Dispatcher, HandlerResult, HttpMethod, Payload, XrpcRequest};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, instrument};

/// Result of checking one request
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub nsid: String,
    pub method: HttpMethod,
    pub valid: bool,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Handle the check command
#[instrument(skip_all, fields(nsid = %args.nsid))]
pub async fn handle_check(args: CheckArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let _timer = Timer::with_details("check_command", &args.nsid);

    let dirs = utils::lexicon_dirs(&args.lexicons, config);
    utils::ensure_exists(&dirs)?;
    let catalog = utils::loader(config.parser.clone()).load_catalog(&dirs)?;
    debug!(documents = catalog.len(), "catalog loaded");

    let dispatcher = Dispatcher::builder()
        .with_config(DispatchConfig {
            max_depth: config.parser.max_depth,
            validation: config.validation.clone(),
        })
        .with_catalog(Arc::new(catalog))
        .bind(&args.nsid, |_: Call| -> HandlerResult { Ok(None) })?
        .build();
    let method = dispatcher
        .method(&args.nsid)
        .map(|method| method.kind().http_method())
        .ok_or_else(|| Error::other(format!("Method {} was not bound", args.nsid)))?;

    let mut request = XrpcRequest::new(method, args.nsid.as_str());
    for (name, value) in args.params {
        request = request.with_param(name, value);
    }
    if let Some(path) = &args.input {
        let body = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::FileNotFound { path: path.clone() },
            _ => Error::Io(e),
        })?;
        let encoding = args
            .encoding
            .clone()
            .unwrap_or_else(|| utils::guess_encoding(path).to_string());
        request = request.with_input(Payload::bytes(encoding, body));
    }

    let outcome = dispatcher.check(request);
    let report = match &outcome {
        Ok(()) => CheckReport {
            nsid: args.nsid.clone(),
            method,
            valid: true,
            status: 200,
            error: None,
            message: None,
        },
        Err(error) => {
            let response = error.to_response();
            CheckReport {
                nsid: args.nsid.clone(),
                method,
                valid: false,
                status: response.status,
                error: response.error_name().map(str::to_string),
                message: response.error_message().map(str::to_string),
            }
        }
    };

    if output.is_human() {
        if report.valid {
            output.success(&format!("✓ {} request to {} is valid", method, report.nsid))?;
        } else {
            output.error(&format!(
                "✗ {} request to {} rejected with {} {}",
                method,
                report.nsid,
                report.status,
                report.error.as_deref().unwrap_or_default()
            ))?;
        }
    } else {
        output.data(&report)?;
    }

    outcome.map_err(Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use crate::output::capture::writer;
    use lexicon_xrpc::XrpcError;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn lexicons() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("search.json"),
            json!({
                "lexicon": 1,
                "id": "com.example.search",
                "defs": {
                    "main": {
                        "type": "query",
                        "parameters": {
                            "type": "params",
                            "required": ["q"],
                            "properties": {
                                "q": {"type": "string"},
                                "limit": {"type": "integer", "minimum": 1, "maximum": 100}
                            }
                        }
                    }
                }
            })
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            dir.path().join("create.yaml"),
            "lexicon: 1\nid: com.example.create\ndefs:\n  main:\n    type: procedure\n    input:\n      encoding: application/json\n      schema:\n        type: object\n        required: [name]\n        properties:\n          name:\n            type: string\n",
        )
        .unwrap();
        dir
    }

    fn args(dir: &TempDir, nsid: &str, params: &[(&str, &str)]) -> CheckArgs {
        CheckArgs {
            nsid: nsid.to_string(),
            lexicons: vec![dir.path().to_path_buf()],
            params: params
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            input: None,
            encoding: None,
        }
    }

    #[tokio::test]
    async fn test_valid_query() {
        let dir = lexicons();
        let (mut out, buffer) = writer(OutputFormat::Human, false);
        handle_check(
            args(&dir, "com.example.search", &[("q", "rust"), ("limit", "10")]),
            &Config::default(),
            &mut out,
        )
        .await
        .unwrap();
        assert_eq!(buffer.contents(), "✓ GET request to com.example.search is valid\n");
    }

    #[tokio::test]
    async fn test_rejected_query() {
        let dir = lexicons();
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        let err = handle_check(
            args(&dir, "com.example.search", &[("limit", "1000")]),
            &Config::default(),
            &mut out,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Xrpc(XrpcError::InvalidRequest { .. })));

        let report: serde_json::Value = serde_json::from_str(&buffer.contents()).unwrap();
        assert_eq!(report["valid"], false);
        assert_eq!(report["status"], 400);
        assert_eq!(report["method"], "GET");
        assert_eq!(report["error"], "InvalidRequest");
    }

    #[tokio::test]
    async fn test_procedure_input() {
        let dir = lexicons();
        let bodies = tempfile::tempdir().unwrap();
        let body = bodies.path().join("body.json");
        std::fs::write(&body, r#"{"name": "thing"}"#).unwrap();

        let (mut out, _) = writer(OutputFormat::Human, false);
        let mut good = args(&dir, "com.example.create", &[]);
        good.input = Some(body.clone());
        handle_check(good, &Config::default(), &mut out).await.unwrap();

        let mut wrong_encoding = args(&dir, "com.example.create", &[]);
        wrong_encoding.input = Some(body);
        wrong_encoding.encoding = Some("text/plain".to_string());
        assert!(handle_check(wrong_encoding, &Config::default(), &mut out).await.is_err());

        let mut missing = args(&dir, "com.example.create", &[]);
        missing.input = Some(PathBuf::from("/nonexistent/body.json"));
        let err = handle_check(missing, &Config::default(), &mut out).await.unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[tokio::test]
    async fn test_unknown_method() {
        let dir = lexicons();
        let (mut out, _) = writer(OutputFormat::Human, false);
        let err = handle_check(args(&dir, "com.example.nothing", &[]), &Config::default(), &mut out)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Xrpc(XrpcError::UnknownLexicon { .. })));
    }
}
