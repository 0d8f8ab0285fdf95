//! Command-line interface argument parsing and definitions
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand, ValueEnum};
use lexicon_schemas::ValidationMode;
use std::io::IsTerminal;
use std::path::PathBuf;

/// Lexicon CLI - parse, validate and inspect Lexicon schema documents
///
/// Validates lexicon files against the document rules, lists their definitions,
/// and checks XRPC requests against method schemas.
#[derive(Parser, Debug)]
#[command(
    name = "lexicon",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "LEXICON_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results (defaults to the configured format)
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate lexicon files or directories
    Validate(ValidateArgs),

    /// Show the definitions of a lexicon document
    Inspect(InspectArgs),

    /// Check an XRPC request against a method schema without executing it
    Check(CheckArgs),

    /// Manage configuration files and settings
    Config(ConfigArgs),

    /// Generate shell completions for the specified shell
    Completions(CompletionsArgs),
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Lexicon files or directories (JSON or YAML, searched recursively)
    #[arg(value_name = "PATH", required = true, num_args = 1..)]
    pub paths: Vec<PathBuf>,

    /// Validation mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Report every violation instead of stopping at the first
    #[arg(long)]
    pub collect_all: bool,

    /// Stop after this many violations per document (implies --collect-all)
    #[arg(long, value_name = "N")]
    pub max_errors: Option<usize>,

    /// Deepest allowed schema nesting
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
}

/// Arguments for the inspect command
#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Lexicon file to inspect
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the whole normalized document instead of a summary
    #[arg(long)]
    pub normalized: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// NSID of the method to check against
    #[arg(value_name = "NSID")]
    pub nsid: String,

    /// Directories holding lexicon documents (defaults to the configured directories)
    #[arg(short, long = "lexicons", value_name = "DIR")]
    pub lexicons: Vec<PathBuf>,

    /// Query parameter as key=value (repeat for arrays)
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// File holding the request body
    #[arg(short, long, value_name = "FILE")]
    pub input: Option<PathBuf>,

    /// Encoding of the request body (guessed from the input file extension if absent)
    #[arg(short, long, value_name = "MIME", requires = "input")]
    pub encoding: Option<String>,
}

/// Arguments for the config command
#[derive(Parser, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Configuration management actions
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration values
    Show(ConfigShowArgs),

    /// Get a configuration value by dotted key
    Get(ConfigGetArgs),

    /// Write a configuration file with default values
    Init(ConfigInitArgs),

    /// Validate current configuration
    Validate,
}

/// Arguments for config show
#[derive(Parser, Debug)]
pub struct ConfigShowArgs {
    /// Show configuration in specified format
    #[arg(short, long, value_enum, default_value = "toml")]
    pub format: ConfigFormat,
}

/// Arguments for config get
#[derive(Parser, Debug)]
pub struct ConfigGetArgs {
    /// Configuration key (e.g., validation.mode, parser.max_depth)
    pub key: String,
}

/// Arguments for config init
#[derive(Parser, Debug)]
pub struct ConfigInitArgs {
    /// Write the user config instead of the project config (.lexicon.toml)
    #[arg(long)]
    pub user: bool,

    /// Force overwrite existing config files
    #[arg(long)]
    pub force: bool,
}

/// Configuration file formats
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigFormat {
    Toml,
    Json,
    Yaml,
}

/// Arguments for generating shell completions
#[derive(Parser, Debug)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

/// Validation mode as accepted on the command line
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Every rule, including primary kind placement and reference targets
    Strict,
    /// Per-definition structure without placement and reference checks
    Partial,
    /// Identifier and main kind only
    Basic,
}

/// Supported shells for completion generation
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}

impl From<ModeArg> for ValidationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Strict => ValidationMode::Strict,
            ModeArg::Partial => ValidationMode::Partial,
            ModeArg::Basic => ValidationMode::Basic,
        }
    }
}

impl Shell {
    /// Convert to clap_complete shell type
    pub fn to_clap_shell(self) -> clap_complete::Shell {
        match self {
            Shell::Bash => clap_complete::Shell::Bash,
            Shell::Zsh => clap_complete::Shell::Zsh,
            Shell::Fish => clap_complete::Shell::Fish,
            Shell::PowerShell => clap_complete::Shell::PowerShell,
            Shell::Elvish => clap_complete::Shell::Elvish,
        }
    }
}

/// Split `key=value`; the value may itself contain `=`
fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}
