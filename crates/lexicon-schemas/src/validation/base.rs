//! Base validation trait and common utilities
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use crate::validation::error::{ValidationError, ValidationErrors, ValidationResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

/// How many rules a validation run applies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Every rule, including placement of primary kinds and reference targets
    Strict,
    /// Identifier and main-kind rules plus per-definition structure
    Partial,
    /// Identifier and main-kind rules only
    Basic,
}

impl ValidationMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidationMode::Strict => "strict",
            ValidationMode::Partial => "partial",
            ValidationMode::Basic => "basic",
        }
    }

    /// Whether per-definition structural rules run
    pub fn checks_structure(&self) -> bool {
        !matches!(self, ValidationMode::Basic)
    }

    /// Whether cross-definition rules run
    pub fn checks_references(&self) -> bool {
        matches!(self, ValidationMode::Strict)
    }
}

impl fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ValidationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(ValidationMode::Strict),
            "partial" => Ok(ValidationMode::Partial),
            "basic" => Ok(ValidationMode::Basic),
            other => Err(format!(
                "unknown validation mode '{}', expected strict, partial or basic",
                other
            )),
        }
    }
}

/// Where in the document a rule is being checked
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Current JSON path
    pub path: String,
    pub mode: ValidationMode,
}

impl ValidationContext {
    pub fn new(mode: ValidationMode) -> Self {
        Self {
            path: "$".to_string(),
            mode,
        }
    }

    /// Create a child context with updated path
    pub fn child<P: AsRef<str>>(&self, path_segment: P) -> Self {
        Self {
            path: format!("{}.{}", self.path, path_segment.as_ref()),
            mode: self.mode,
        }
    }

    /// Create a child context for an array index
    pub fn child_index(&self, index: usize) -> Self {
        Self {
            path: format!("{}[{}]", self.path, index),
            mode: self.mode,
        }
    }

    /// A violation of `rule` located at this context
    pub fn violation(&self, rule: &str, message: impl Into<String>) -> ValidationError {
        ValidationError::violation(&self.path, rule, message)
    }
}

/// Base trait for validators
pub trait SchemaValidator {
    /// The type being validated
    type Input;

    /// Validate with every rule
    fn validate(&self, input: &Self::Input) -> ValidationResult<()> {
        let context = ValidationContext::new(ValidationMode::Strict);
        self.validate_with_context(input, &context)
    }

    /// Validate with a specific context and mode, stopping at the first violation
    fn validate_with_context(
        &self,
        input: &Self::Input,
        context: &ValidationContext,
    ) -> ValidationResult<()>;

    fn validate_partial(&self, input: &Self::Input) -> ValidationResult<()> {
        let context = ValidationContext::new(ValidationMode::Partial);
        self.validate_with_context(input, &context)
    }

    fn validate_basic(&self, input: &Self::Input) -> ValidationResult<()> {
        let context = ValidationContext::new(ValidationMode::Basic);
        self.validate_with_context(input, &context)
    }

    /// Collect validation errors without failing
    fn collect_errors(&self, input: &Self::Input) -> ValidationErrors {
        let mut errors = ValidationErrors::new();
        if let Err(error) = self.validate(input) {
            errors.add(error);
        }
        errors
    }
}

/// Checks shared by several rules
pub struct ValidationHelpers;

impl ValidationHelpers {
    /// `min <= max` when both are present
    pub fn validate_bounds<T>(
        min: Option<T>,
        max: Option<T>,
        min_name: &str,
        max_name: &str,
        context: &ValidationContext,
    ) -> ValidationResult<()>
    where
        T: PartialOrd + fmt::Display,
    {
        match (min, max) {
            (Some(min), Some(max)) if min > max => Err(context.violation(
                "bounds",
                format!(
                    "{} ({}) is greater than {} ({})",
                    min_name, min, max_name, max
                ),
            )),
            _ => Ok(()),
        }
    }

    /// `value` lies inside `[min, max]`
    pub fn validate_in_range(
        value: i64,
        min: Option<i64>,
        max: Option<i64>,
        field_name: &str,
        context: &ValidationContext,
    ) -> ValidationResult<()> {
        let below = min.is_some_and(|min| value < min);
        let above = max.is_some_and(|max| value > max);
        if below || above {
            Err(context.violation(
                "bounds",
                format!("{} {} is outside the declared range", field_name, value),
            ))
        } else {
            Ok(())
        }
    }

    /// `value` is one of `allowed` when an enumeration is declared
    pub fn validate_enum_member<T>(
        value: &T,
        allowed: Option<&[T]>,
        field_name: &str,
        context: &ValidationContext,
    ) -> ValidationResult<()>
    where
        T: PartialEq + fmt::Display,
    {
        match allowed {
            Some(allowed) if !allowed.contains(value) => Err(context.violation(
                "bounds",
                format!("{} {} is not one of the enum values", field_name, value),
            )),
            _ => Ok(()),
        }
    }

    /// Every name in `names` is a declared property
    pub fn validate_declared(
        names: &[String],
        mut is_declared: impl FnMut(&str) -> bool,
        rule: &str,
        list_name: &str,
        context: &ValidationContext,
    ) -> ValidationResult<()> {
        match names.iter().find(|name| !is_declared(name)) {
            Some(name) => Err(context.violation(
                rule,
                format!("'{}' is listed in {} but is not a property", name, list_name),
            )),
            None => Ok(()),
        }
    }

    /// No name appears twice
    pub fn validate_unique<'a>(
        names: impl IntoIterator<Item = &'a str>,
        rule: &str,
        what: &str,
        context: &ValidationContext,
    ) -> ValidationResult<()> {
        let mut seen = HashSet::new();
        for name in names {
            if !seen.insert(name) {
                return Err(context.violation(rule, format!("{} '{}' is declared twice", what, name)));
            }
        }
        Ok(())
    }

    pub fn validate_non_empty<T>(
        list: &[T],
        rule: &str,
        field_name: &str,
        context: &ValidationContext,
    ) -> ValidationResult<()> {
        if list.is_empty() {
            Err(context.violation(rule, format!("{} cannot be empty", field_name)))
        } else {
            Ok(())
        }
    }
}
