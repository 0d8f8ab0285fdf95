//! Shared utilities for command handlers

use crate::config::Config;
use crate::error::{Error, Result};
use lexicon_schemas::{LexiconLoader, LoaderConfig, ParserConfig};
use std::path::{Path, PathBuf};

/// Loader using the configured parser settings, without validation on load
pub fn loader(parser: ParserConfig) -> LexiconLoader {
    LexiconLoader::with_config(LoaderConfig {
        parser,
        ..LoaderConfig::default()
    }
    .without_validation())
}

/// Fail with `FileNotFound` for the first path that does not exist
pub fn ensure_exists(paths: &[PathBuf]) -> Result<()> {
    match paths.iter().find(|path| !path.exists()) {
        Some(path) => Err(Error::FileNotFound { path: path.clone() }),
        None => Ok(()),
    }
}

/// Directories named on the command line, or the configured ones
pub fn lexicon_dirs(explicit: &[PathBuf], config: &Config) -> Vec<PathBuf> {
    if explicit.is_empty() {
        config.lexicon_dirs.clone()
    } else {
        explicit.to_vec()
    }
}

/// Encoding assumed for a body file when none is given
pub fn guess_encoding(path: &Path) -> &'static str {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => "application/json",
        Some("txt") => "text/plain",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("car") => "application/vnd.ipld.car",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guess_encoding() {
        assert_eq!(guess_encoding(Path::new("body.json")), "application/json");
        assert_eq!(guess_encoding(Path::new("repo.car")), "application/vnd.ipld.car");
        assert_eq!(guess_encoding(Path::new("blob")), "application/octet-stream");
    }

    #[test]
    fn test_lexicon_dirs_prefers_explicit() {
        let config = Config::default();
        assert_eq!(lexicon_dirs(&[], &config), vec![PathBuf::from("lexicons")]);
        assert_eq!(
            lexicon_dirs(&[PathBuf::from("other")], &config),
            vec![PathBuf::from("other")]
        );
    }
}
