//! Command handlers for CLI subcommands
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

mod check;
mod completions;
mod config;
mod inspect;
mod utils;
mod validate;

pub use check::handle_check;
pub use completions::handle_completions;
pub use config::handle_config;
pub use inspect::handle_inspect;
pub use validate::handle_validate;
