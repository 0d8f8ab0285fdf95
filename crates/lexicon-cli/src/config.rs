//! Configuration management for the CLI
//!
//! Configuration is resolved in this order, later sources winning:
//! - Default values
//! - The first configuration file found (`--config`, then `.lexicon.{toml,yaml,yml,json}`
//!   in the working directory, then the user config directory)
//! - `LEXICON_*` environment variables
//! - Command-line arguments
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::{Error, Result};
use clap::ValueEnum;
use lexicon_schemas::{ParserConfig, ValidationConfig, ValidationMode};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Project configuration file written by `config init`
pub const PROJECT_CONFIG_FILE: &str = ".lexicon.toml";

/// Environment variables the CLI reads
pub const ENV_VARS: &[&str] = &[
    "LEXICON_CONFIG",
    "LEXICON_DIRS",
    "LEXICON_MAX_DEPTH",
    "LEXICON_VALIDATION_MODE",
    "LEXICON_FAIL_FAST",
    "LEXICON_MAX_ERRORS",
    "LEXICON_OUTPUT_FORMAT",
    "LEXICON_OUTPUT_COLOR",
    "LEXICON_LOG_LEVEL",
    "LEXICON_LOG_FORMAT",
    "LEXICON_LOG_FILE",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directories searched for lexicon documents
    pub lexicon_dirs: Vec<PathBuf>,

    pub parser: ParserConfig,

    pub validation: ValidationConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingSettings,
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format: human, json, json-pretty, yaml
    pub format: String,

    /// Use colored output by default
    pub color: bool,

    /// Show progress indicators
    pub progress: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level used when no verbosity flag is given
    pub level: Option<String>,

    /// Log format (compact, full, json)
    pub format: Option<String>,

    /// Log file path
    pub file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lexicon_dirs: vec![PathBuf::from("lexicons")],
            parser: ParserConfig::default(),
            validation: ValidationConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "human".to_string(),
            color: true,
            progress: true,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config = match extension(path) {
            Some("yaml") | Some("yml") => serde_yaml::from_str(&content)?,
            Some("toml") => toml::from_str(&content)?,
            _ => serde_json::from_str(&content)?,
        };

        debug!(path = %path.display(), "configuration file loaded");
        Ok(config)
    }

    /// Load from a specific file or the default locations, then apply the environment
    pub fn load_with_file(file: Option<&Path>) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::load()?,
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        for path in Self::default_config_paths() {
            if path.exists() {
                match Self::from_file(&path) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                    }
                }
            }
        }

        Ok(Self::default())
    }

    /// Candidate configuration files, most specific first
    fn default_config_paths() -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = [".lexicon.toml", ".lexicon.yaml", ".lexicon.yml", ".lexicon.json"]
            .iter()
            .map(PathBuf::from)
            .collect();

        if let Some(config_dir) = dirs::config_dir() {
            let lexicon_dir = config_dir.join("lexicon");
            paths.push(lexicon_dir.join("config.toml"));
            paths.push(lexicon_dir.join("config.yaml"));
            paths.push(lexicon_dir.join("config.json"));
        }

        paths
    }

    /// User configuration file path
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lexicon").join("config.toml"))
    }

    /// Project configuration file in the working directory, if any
    pub fn find_project_config() -> Option<PathBuf> {
        Self::default_config_paths()
            .into_iter()
            .take(4)
            .find(|path| path.exists())
    }

    /// Apply `LEXICON_*` environment variables
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|name| std::env::var(name).ok());
    }

    /// Apply overrides from any variable source; unparseable values are skipped with a warning
    pub fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dirs) = lookup("LEXICON_DIRS") {
            self.lexicon_dirs = std::env::split_paths(&dirs).collect();
        }
        if let Some(depth) = lookup("LEXICON_MAX_DEPTH") {
            match depth.parse() {
                Ok(depth) => self.parser.max_depth = depth,
                Err(_) => warn!(value = %depth, "invalid LEXICON_MAX_DEPTH"),
            }
        }
        if let Some(mode) = lookup("LEXICON_VALIDATION_MODE") {
            match mode.parse::<ValidationMode>() {
                Ok(mode) => self.validation.mode = mode,
                Err(_) => warn!(value = %mode, "invalid LEXICON_VALIDATION_MODE"),
            }
        }
        if let Some(fail_fast) = lookup("LEXICON_FAIL_FAST") {
            self.validation.fail_fast = parse_flag(&fail_fast);
        }
        if let Some(max_errors) = lookup("LEXICON_MAX_ERRORS") {
            match max_errors.parse() {
                Ok(max_errors) => self.validation.max_errors = max_errors,
                Err(_) => warn!(value = %max_errors, "invalid LEXICON_MAX_ERRORS"),
            }
        }
        if let Some(format) = lookup("LEXICON_OUTPUT_FORMAT") {
            self.output.format = format;
        }
        if let Some(color) = lookup("LEXICON_OUTPUT_COLOR") {
            self.output.color = parse_flag(&color);
        }
        if let Some(level) = lookup("LEXICON_LOG_LEVEL") {
            self.logging.level = Some(level);
        }
    }

    /// The configured output format
    pub fn output_format(&self) -> Result<OutputFormat> {
        OutputFormat::from_str(&self.output.format, true)
            .map_err(|_| Error::config(format!("Unknown output format '{}'", self.output.format)))
    }

    /// Check values that serde alone cannot
    pub fn validate(&self) -> Result<()> {
        if self.parser.max_depth == 0 {
            return Err(Error::config("parser.max_depth must be at least 1"));
        }
        self.output_format()?;

        if let Some(level) = &self.logging.level {
            if !["trace", "debug", "info", "warn", "error"].contains(&level.to_lowercase().as_str()) {
                return Err(Error::config(format!("Unknown log level '{}'", level)));
            }
        }
        if let Some(format) = &self.logging.format {
            if !["compact", "full", "json"].contains(&format.to_lowercase().as_str()) {
                return Err(Error::config(format!("Unknown log format '{}'", format)));
            }
        }
        Ok(())
    }

    /// Look up a value by dotted key, e.g. `validation.mode`
    pub fn get_value(&self, key: &str) -> Result<serde_json::Value> {
        let mut current = serde_json::to_value(self)?;
        for segment in key.split('.') {
            current = match current {
                serde_json::Value::Object(mut map) => map.remove(segment),
                _ => None,
            }
            .ok_or_else(|| Error::config(format!("Unknown configuration key: {}", key)))?;
        }
        Ok(current)
    }

    /// Save configuration to a file, choosing the format by extension
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = match extension(path) {
            Some("yaml") | Some("yml") => serde_yaml::to_string(self)?,
            Some("json") => serde_json::to_string_pretty(self)?,
            _ => toml::to_string_pretty(self)?,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, content)?;
        Ok(())
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

fn parse_flag(value: &str) -> bool {
    matches!(value.to_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.parser.max_depth, 32);
        assert_eq!(config.validation.mode, ValidationMode::Basic);
        assert!(config.validation.fail_fast);
        assert_eq!(config.output_format().unwrap(), OutputFormat::Human);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_file_formats() {
        let dir = tempdir().unwrap();

        let toml_path = dir.path().join("config.toml");
        std::fs::write(
            &toml_path,
            "lexicon_dirs = [\"schemas\"]\n\n[validation]\nmode = \"partial\"\nfail_fast = false\n\n[parser]\nmax_depth = 8\n",
        )
        .unwrap();
        let config = Config::from_file(&toml_path).unwrap();
        assert_eq!(config.lexicon_dirs, vec![PathBuf::from("schemas")]);
        assert_eq!(config.validation.mode, ValidationMode::Partial);
        assert!(!config.validation.fail_fast);
        assert_eq!(config.parser.max_depth, 8);
        assert_eq!(config.output.format, "human");

        let yaml_path = dir.path().join("config.yaml");
        std::fs::write(&yaml_path, "output:\n  format: json\n").unwrap();
        assert_eq!(
            Config::from_file(&yaml_path).unwrap().output_format().unwrap(),
            OutputFormat::Json
        );

        let json_path = dir.path().join("config.json");
        std::fs::write(&json_path, r#"{"validation": {"mode": "basic"}}"#).unwrap();
        assert_eq!(
            Config::from_file(&json_path).unwrap().validation.mode,
            ValidationMode::Basic
        );
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.validation.max_errors = 4;
        config.logging.format = Some("json".to_string());

        for name in ["nested/config.toml", "config.yaml", "config.json"] {
            let path = dir.path().join(name);
            config.save(&path).unwrap();
            assert_eq!(Config::from_file(&path).unwrap(), config);
        }
    }

    #[test]
    fn test_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("LEXICON_MAX_DEPTH", "12"),
            ("LEXICON_VALIDATION_MODE", "basic"),
            ("LEXICON_FAIL_FAST", "false"),
            ("LEXICON_MAX_ERRORS", "not-a-number"),
            ("LEXICON_OUTPUT_FORMAT", "yaml"),
            ("LEXICON_LOG_LEVEL", "debug"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides_from(|name| vars.get(name).map(|value| value.to_string()));

        assert_eq!(config.parser.max_depth, 12);
        assert_eq!(config.validation.mode, ValidationMode::Basic);
        assert!(!config.validation.fail_fast);
        assert_eq!(config.validation.max_errors, 0);
        assert_eq!(config.output_format().unwrap(), OutputFormat::Yaml);
        assert_eq!(config.logging.level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_get_value() {
        let config = Config::default();
        assert_eq!(config.get_value("validation.mode").unwrap(), "basic");
        assert_eq!(config.get_value("parser.max_depth").unwrap(), 32);
        assert!(config.get_value("validation.nope").is_err());
        assert!(config.get_value("parser.max_depth.deeper").is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.output.format = "xml".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.parser.max_depth = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.logging.level = Some("loud".to_string());
        assert!(config.validate().is_err());
    }
}
