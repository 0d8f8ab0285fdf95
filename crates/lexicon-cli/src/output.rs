//! Output formatting and writing utilities
//!
//! Machine formats (JSON, YAML) serialize report values as-is; the human format
//! renders them with colors, sections and tables.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use lexicon_schemas::{ValidationError, ValidationErrors};
use serde::Serialize;
use std::io::{self, IsTerminal, Write};
use tracing::trace;

/// Formatting of serializable values and validation errors
pub trait OutputFormatter {
    /// Format a serializable value
    fn format<T: Serialize>(&self, value: &T) -> Result<String>;

    /// Format validation errors with one entry per violation
    fn format_validation_errors(&self, errors: &ValidationErrors) -> Result<String>;
}

impl OutputFormatter for OutputFormat {
    fn format<T: Serialize>(&self, value: &T) -> Result<String> {
        match self {
            OutputFormat::Json => Ok(serde_json::to_string(value)?),
            OutputFormat::JsonPretty | OutputFormat::Human => Ok(serde_json::to_string_pretty(value)?),
            OutputFormat::Yaml => Ok(serde_yaml::to_string(value)?),
        }
    }

    fn format_validation_errors(&self, errors: &ValidationErrors) -> Result<String> {
        match self {
            OutputFormat::Human => Ok(format_validation_errors_human(errors)),
            _ => self.format(errors),
        }
    }
}

/// Output writer that handles different output formats and colors
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    show_progress: bool,
    quiet: bool,
    writer: Box<dyn Write>,
}

impl OutputWriter {
    /// Create a new output writer on stdout
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool, progress: bool) -> Self {
        Self {
            format,
            use_color,
            show_progress: progress && !quiet && io::stdout().is_terminal(),
            quiet,
            writer: Box::new(io::stdout()),
        }
    }

    /// Create an output writer with a custom writer
    pub fn with_writer(format: OutputFormat, use_color: bool, quiet: bool, writer: Box<dyn Write>) -> Self {
        Self {
            format,
            use_color,
            show_progress: false,
            quiet,
            writer,
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Write a line of output
    pub fn writeln(&mut self, content: &str) -> Result<()> {
        writeln!(self.writer, "{}", content)?;
        self.writer.flush()?;
        Ok(())
    }

    /// Write an info message
    pub fn info(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&format!("{} {}", "ℹ".blue(), message))
        } else {
            self.writeln(&format!("INFO: {}", message))
        }
    }

    /// Write a success message
    pub fn success(&mut self, message: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.green().to_string())
        } else {
            self.writeln(message)
        }
    }

    /// Write a warning message
    pub fn warning(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.yellow().to_string())
        } else {
            self.writeln(&format!("WARNING: {}", message))
        }
    }

    /// Write an error message
    pub fn error(&mut self, message: &str) -> Result<()> {
        if !self.is_human() {
            return Ok(());
        }

        if self.use_color {
            self.writeln(&message.red().to_string())
        } else {
            self.writeln(&format!("ERROR: {}", message))
        }
    }

    /// Write a section header
    pub fn section(&mut self, title: &str) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        self.writeln("")?;
        if self.use_color {
            self.writeln(&format!("═══ {} ═══", title).bright_blue().to_string())
        } else {
            self.writeln(&format!("=== {} ===", title))
        }
    }

    /// Write data in the configured format; human output falls back to pretty JSON
    pub fn data<T: Serialize>(&mut self, value: &T) -> Result<()> {
        let formatted = self.format.format(value)?;
        trace!(bytes = formatted.len(), "writing data");
        self.writeln(formatted.trim_end())
    }

    /// Write validation errors with specialized formatting
    pub fn validation_errors(&mut self, errors: &ValidationErrors) -> Result<()> {
        let formatted = self.format.format_validation_errors(errors)?;
        self.writeln(formatted.trim_end())
    }

    /// Create a progress bar for long operations
    pub fn progress_bar(&self, length: u64, message: &str) -> Option<ProgressBar> {
        if !self.show_progress {
            return None;
        }

        let pb = ProgressBar::new(length);
        pb.set_style(default_progress_style());
        pb.set_message(message.to_string());
        Some(pb)
    }

    /// Write a table (human format only)
    pub fn table(&mut self, headers: &[&str], rows: Vec<Vec<String>>) -> Result<()> {
        if self.quiet || !self.is_human() {
            return Ok(());
        }

        let mut widths = headers.iter().map(|h| h.chars().count()).collect::<Vec<_>>();
        for row in &rows {
            for (i, cell) in row.iter().enumerate() {
                if i < widths.len() {
                    widths[i] = widths[i].max(cell.chars().count());
                }
            }
        }

        let header_row = pad_row(headers.iter().map(|h| h.to_string()), &widths);
        if self.use_color {
            self.writeln(&header_row.bold().to_string())?;
        } else {
            self.writeln(&header_row)?;
        }

        let separator = widths
            .iter()
            .map(|w| "─".repeat(*w))
            .collect::<Vec<_>>()
            .join("─┼─");
        self.writeln(&separator)?;

        for row in rows {
            self.writeln(&pad_row(row.into_iter(), &widths))?;
        }

        Ok(())
    }
}

fn pad_row(cells: impl Iterator<Item = String>, widths: &[usize]) -> String {
    cells
        .enumerate()
        .map(|(i, cell)| match widths.get(i) {
            Some(width) => format!("{:width$}", cell, width = width),
            None => cell,
        })
        .collect::<Vec<_>>()
        .join(" │ ")
        .trim_end()
        .to_string()
}

/// Helper function to create a progress bar style
pub fn default_progress_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// Format validation errors for human reading
fn format_validation_errors_human(errors: &ValidationErrors) -> String {
    let mut output = String::new();

    for (i, error) in errors.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", i + 1, format_validation_error_human(error)));
    }

    output
}

/// Format a single validation error for human reading
fn format_validation_error_human(error: &ValidationError) -> String {
    format!("[{}] {}: {}", error.rule(), error.path(), error.message())
}

/// In-memory writer for handler tests
#[cfg(test)]
pub(crate) mod capture {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    pub struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl SharedBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    /// A colorless writer and the buffer it fills
    pub fn writer(format: OutputFormat, quiet: bool) -> (OutputWriter, SharedBuffer) {
        let buffer = SharedBuffer::default();
        (
            OutputWriter::with_writer(format, false, quiet, Box::new(buffer.clone())),
            buffer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use capture::writer;

    fn errors() -> ValidationErrors {
        ValidationErrors::from(vec![
            ValidationError::violation("$.defs.main", "main-kind", "main must be record/procedure/query/subscription"),
            ValidationError::violation("$.defs.thing", "bounds", "minimum 5 is greater than maximum 1"),
        ])
    }

    #[test]
    fn test_human_validation_errors() {
        let formatted = OutputFormat::Human.format_validation_errors(&errors()).unwrap();
        assert_eq!(
            formatted,
            "1. [main-kind] $.defs.main: main must be record/procedure/query/subscription\n\
             2. [bounds] $.defs.thing: minimum 5 is greater than maximum 1\n"
        );
    }

    #[test]
    fn test_machine_validation_errors() {
        let formatted = OutputFormat::Json.format_validation_errors(&errors()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&formatted).unwrap();
        assert_eq!(value["errors"][0]["kind"], "rule-violation");
        assert_eq!(value["errors"][1]["rule"], "bounds");

        let yaml = OutputFormat::Yaml.format_validation_errors(&errors()).unwrap();
        assert!(yaml.contains("rule: main-kind"));
    }

    #[test]
    fn test_messages_are_human_only() {
        let (mut out, buffer) = writer(OutputFormat::Json, false);
        out.info("hello").unwrap();
        out.success("done").unwrap();
        out.data(&serde_json::json!({"ok": true})).unwrap();
        assert_eq!(buffer.contents(), "{\"ok\":true}\n");

        let (mut out, buffer) = writer(OutputFormat::Human, false);
        out.info("hello").unwrap();
        out.warning("careful").unwrap();
        assert_eq!(buffer.contents(), "INFO: hello\nWARNING: careful\n");
    }

    #[test]
    fn test_quiet_keeps_errors() {
        let (mut out, buffer) = writer(OutputFormat::Human, true);
        out.info("hello").unwrap();
        out.section("Section").unwrap();
        out.error("broken").unwrap();
        assert_eq!(buffer.contents(), "ERROR: broken\n");
    }

    #[test]
    fn test_table() {
        let (mut out, buffer) = writer(OutputFormat::Human, false);
        out.table(
            &["Name", "Kind"],
            vec![
                vec!["main".to_string(), "query".to_string()],
                vec!["record".to_string(), "object".to_string()],
            ],
        )
        .unwrap();

        assert_eq!(
            buffer.contents(),
            "Name   │ Kind\n───────┼───────\nmain   │ query\nrecord │ object\n"
        );
    }

    #[test]
    fn test_no_progress_with_custom_writer() {
        let (out, _) = writer(OutputFormat::Human, false);
        assert!(out.progress_bar(10, "loading").is_none());
    }
}
