//! Validation demonstration example
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use lexicon_schemas::{parse, DocumentValidator, ValidationConfig, ValidationMode};
use serde_json::json;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Lexicon Validation Demo ===\n");

    let document = parse(json!({
        "lexicon": 1,
        "id": "com.example.feed.getTimeline",
        "defs": {
            "main": {
                "type": "query",
                "parameters": {
                    "type": "params",
                    "required": ["actor"],
                    "properties": {
                        "limit": {"type": "integer", "minimum": 100, "maximum": 1}
                    }
                },
                "output": {"encoding": "application/json", "schema": {"type": "string"}}
            },
            "post": {"type": "record", "key": "tid", "record": {"type": "object"}}
        }
    }))?;

    println!("Parsed {} with {} definitions", document.id(), document.defs().len());
    for (name, node) in document.defs() {
        println!("  {:<8} {}", name, node.kind());
    }
    println!();

    for mode in [ValidationMode::Basic, ValidationMode::Partial, ValidationMode::Strict] {
        let config = ValidationConfig::default().with_mode(mode).with_collect_all();
        match DocumentValidator::new(config).validate_all(&document) {
            Ok(()) => println!("[{}] valid", mode),
            Err(errors) => {
                println!("[{}] {} problem(s):", mode, errors.len());
                for error in errors.iter() {
                    println!("  - {} ({})", error, error.rule());
                }
            }
        }
    }

    Ok(())
}
