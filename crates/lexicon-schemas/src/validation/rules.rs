//! Document rules
//!
//! Rules run in a fixed order: identifier, main kind, then every definition in source
//! order. Which definition rules apply depends on the [`ValidationMode`](super::base::ValidationMode).
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use super::base::{SchemaValidator, ValidationContext, ValidationHelpers};
use super::error::{ValidationError, ValidationErrors, ValidationResult};
use super::ValidationConfig;
use crate::document::Document;
use crate::nodes::{
    Body, ErrorDef, FieldSchema, ObjectNode, ParamsNode, RefNode, RefTarget, SchemaNode,
    UnionNode,
};
use crate::nsid;
use crate::registry::NodeKind;
use std::ops::ControlFlow;
use tracing::{debug, instrument};

/// Rule names as they appear in [`ValidationError::rule`]
pub mod names {
    pub const IDENTIFIER: &str = "identifier";
    pub const MAIN_KIND: &str = "main-kind";
    pub const REQUIRED_PROPERTY: &str = "required-property";
    pub const NULLABLE_PROPERTY: &str = "nullable-property";
    pub const BOUNDS: &str = "bounds";
    pub const PARAMS_PROPERTY: &str = "params-property";
    pub const BODY_SCHEMA: &str = "body-schema";
    pub const UNION_REFS: &str = "union-refs";
    pub const UNIQUE_ERRORS: &str = "unique-errors";
    pub const PRIMARY_KIND_PLACEMENT: &str = "primary-kind-placement";
    pub const REF_TARGET: &str = "ref-target";
}

/// Message of the main-kind rule
pub const MAIN_KIND_MESSAGE: &str = "main must be record/procedure/query/subscription";

type Flow = ControlFlow<()>;

/// Accumulates violations until the configured limit is reached
struct Collector {
    errors: ValidationErrors,
    limit: Option<usize>,
}

impl Collector {
    fn new(config: &ValidationConfig) -> Self {
        let limit = if config.fail_fast {
            Some(1)
        } else if config.max_errors > 0 {
            Some(config.max_errors)
        } else {
            None
        };
        Self {
            errors: ValidationErrors::new(),
            limit,
        }
    }

    fn check(&mut self, result: ValidationResult<()>) -> Flow {
        if let Err(error) = result {
            self.errors.add(error);
            if self.limit.is_some_and(|limit| self.errors.len() >= limit) {
                return ControlFlow::Break(());
            }
        }
        ControlFlow::Continue(())
    }
}

/// Validates parsed documents
#[derive(Debug, Clone, Default)]
pub struct DocumentValidator {
    config: ValidationConfig,
}

impl DocumentValidator {
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Run the configured rules and return everything collected
    ///
    /// With `fail_fast` (the default) at most one error is returned.
    #[instrument(skip_all, fields(nsid = document.id(), mode = %self.config.mode))]
    pub fn validate_all(&self, document: &Document) -> Result<(), ValidationErrors> {
        let mut collector = Collector::new(&self.config);
        let context = ValidationContext::new(self.config.mode);
        let _ = check_document(document, &context, &mut collector);

        debug!(errors = collector.errors.len(), "validation finished");
        collector.errors.into_result()
    }
}

impl SchemaValidator for DocumentValidator {
    type Input = Document;

    fn validate_with_context(
        &self,
        input: &Document,
        context: &ValidationContext,
    ) -> ValidationResult<()> {
        let config = self.config.clone().with_fail_fast();
        let mut collector = Collector::new(&config);
        let _ = check_document(input, context, &mut collector);
        match collector.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn collect_errors(&self, input: &Document) -> ValidationErrors {
        let config = ValidationConfig {
            fail_fast: false,
            ..self.config.clone()
        };
        DocumentValidator::new(config)
            .validate_all(input)
            .err()
            .unwrap_or_default()
    }
}

fn check_document(document: &Document, context: &ValidationContext, out: &mut Collector) -> Flow {
    out.check(
        nsid::validate(document.id())
            .map_err(|reason| ValidationError::invalid_identifier(document.id(), reason)),
    )?;

    let defs = context.child("defs");
    if let Some(main) = document.main() {
        if !main.is_primary() {
            out.check(Err(defs.child("main").violation(names::MAIN_KIND, MAIN_KIND_MESSAGE)))?;
        }
    }

    if !context.mode.checks_structure() {
        return ControlFlow::Continue(());
    }

    for (name, node) in document.defs() {
        let def = defs.child(name);
        if context.mode.checks_references() && name != "main" && node.is_primary() {
            out.check(Err(def.violation(
                names::PRIMARY_KIND_PLACEMENT,
                format!("{} definitions may only appear as main", node.kind()),
            )))?;
        }
        check_node(document, node, &def, out)?;
    }

    ControlFlow::Continue(())
}

fn check_node(document: &Document, node: &SchemaNode, ctx: &ValidationContext, out: &mut Collector) -> Flow {
    match node {
        SchemaNode::Array(array) => {
            out.check(ValidationHelpers::validate_bounds(
                array.min_length,
                array.max_length,
                "minLength",
                "maxLength",
                ctx,
            ))?;
            check_field(document, &array.items, &ctx.child("items"), out)?;
        }
        SchemaNode::Bytes(bytes) => {
            out.check(ValidationHelpers::validate_bounds(
                bytes.min_length,
                bytes.max_length,
                "minLength",
                "maxLength",
                ctx,
            ))?;
        }
        SchemaNode::Integer(integer) => {
            out.check(ValidationHelpers::validate_bounds(
                integer.minimum,
                integer.maximum,
                "minimum",
                "maximum",
                ctx,
            ))?;
            for (field, value) in [("default", integer.default), ("const", integer.const_value)] {
                if let Some(value) = value {
                    out.check(ValidationHelpers::validate_in_range(
                        value,
                        integer.minimum,
                        integer.maximum,
                        field,
                        ctx,
                    ))?;
                    out.check(ValidationHelpers::validate_enum_member(
                        &value,
                        integer.enum_values.as_deref(),
                        field,
                        ctx,
                    ))?;
                }
            }
        }
        SchemaNode::String(string) => {
            out.check(ValidationHelpers::validate_bounds(
                string.min_length,
                string.max_length,
                "minLength",
                "maxLength",
                ctx,
            ))?;
            out.check(ValidationHelpers::validate_bounds(
                string.min_graphemes,
                string.max_graphemes,
                "minGraphemes",
                "maxGraphemes",
                ctx,
            ))?;
            for (field, value) in [("default", &string.default), ("const", &string.const_value)] {
                if let Some(value) = value {
                    out.check(ValidationHelpers::validate_enum_member(
                        value,
                        string.enum_values.as_deref(),
                        field,
                        ctx,
                    ))?;
                }
            }
        }
        SchemaNode::Object(object) => check_object(document, object, ctx, out)?,
        SchemaNode::Record(record) => check_object(document, &record.record, &ctx.child("record"), out)?,
        SchemaNode::Query(query) => {
            check_params(document, query.parameters.as_ref(), ctx, out)?;
            check_body(document, query.output.as_ref(), &ctx.child("output"), out)?;
            check_errors(&query.errors, ctx, out)?;
        }
        SchemaNode::Procedure(procedure) => {
            check_params(document, procedure.parameters.as_ref(), ctx, out)?;
            check_body(document, procedure.input.as_ref(), &ctx.child("input"), out)?;
            check_body(document, procedure.output.as_ref(), &ctx.child("output"), out)?;
            check_errors(&procedure.errors, ctx, out)?;
        }
        SchemaNode::Subscription(subscription) => {
            check_params(document, subscription.parameters.as_ref(), ctx, out)?;
            if let Some(message) = &subscription.message {
                let message_ctx = ctx.child("message").child("schema");
                out.check(check_body_schema_kind(&message.schema, &message_ctx))?;
                check_field(document, &message.schema, &message_ctx, out)?;
            }
            check_errors(&subscription.errors, ctx, out)?;
        }
        SchemaNode::Blob(_)
        | SchemaNode::Boolean(_)
        | SchemaNode::CidLink(_)
        | SchemaNode::Token(_)
        | SchemaNode::Unknown(_) => {}
    }
    ControlFlow::Continue(())
}

fn check_field(document: &Document, field: &FieldSchema, ctx: &ValidationContext, out: &mut Collector) -> Flow {
    match field {
        FieldSchema::Node(node) => check_node(document, node, ctx, out),
        FieldSchema::Ref(reference) => check_ref(document, reference, ctx, out),
        FieldSchema::Union(union) => check_union(document, union, ctx, out),
    }
}

fn check_object(document: &Document, object: &ObjectNode, ctx: &ValidationContext, out: &mut Collector) -> Flow {
    out.check(ValidationHelpers::validate_declared(
        &object.required,
        |name| object.properties.contains_key(name),
        names::REQUIRED_PROPERTY,
        "required",
        ctx,
    ))?;
    out.check(ValidationHelpers::validate_declared(
        &object.nullable,
        |name| object.properties.contains_key(name),
        names::NULLABLE_PROPERTY,
        "nullable",
        ctx,
    ))?;

    let properties = ctx.child("properties");
    for (name, property) in &object.properties {
        check_field(document, property, &properties.child(name), out)?;
    }
    ControlFlow::Continue(())
}

fn check_params(
    document: &Document,
    params: Option<&ParamsNode>,
    ctx: &ValidationContext,
    out: &mut Collector,
) -> Flow {
    let Some(params) = params else {
        return ControlFlow::Continue(());
    };
    let ctx = ctx.child("parameters");

    out.check(ValidationHelpers::validate_declared(
        &params.required,
        |name| params.properties.contains_key(name),
        names::REQUIRED_PROPERTY,
        "required",
        &ctx,
    ))?;

    let properties = ctx.child("properties");
    for (name, property) in &params.properties {
        let property_ctx = properties.child(name);
        out.check(check_params_property_kind(property, &property_ctx))?;
        check_field(document, property, &property_ctx, out)?;
    }
    ControlFlow::Continue(())
}

fn is_params_scalar(field: &FieldSchema) -> bool {
    matches!(
        field.as_node().map(SchemaNode::kind),
        Some(NodeKind::Boolean | NodeKind::Integer | NodeKind::String | NodeKind::Unknown)
    )
}

fn check_params_property_kind(property: &FieldSchema, ctx: &ValidationContext) -> ValidationResult<()> {
    let allowed = match property {
        FieldSchema::Node(SchemaNode::Array(array)) => is_params_scalar(&array.items),
        other => is_params_scalar(other),
    };
    if allowed {
        Ok(())
    } else {
        Err(ctx.violation(
            names::PARAMS_PROPERTY,
            format!(
                "parameters must be boolean, integer, string, unknown or arrays of those, found {}",
                property.tag()
            ),
        ))
    }
}

fn check_body(document: &Document, body: Option<&Body>, ctx: &ValidationContext, out: &mut Collector) -> Flow {
    let Some(schema) = body.and_then(|body| body.schema.as_deref()) else {
        return ControlFlow::Continue(());
    };
    let schema_ctx = ctx.child("schema");
    out.check(check_body_schema_kind(schema, &schema_ctx))?;
    check_field(document, schema, &schema_ctx, out)
}

fn check_body_schema_kind(schema: &FieldSchema, ctx: &ValidationContext) -> ValidationResult<()> {
    match schema {
        FieldSchema::Node(SchemaNode::Object(_)) | FieldSchema::Ref(_) | FieldSchema::Union(_) => Ok(()),
        FieldSchema::Node(other) => Err(ctx.violation(
            names::BODY_SCHEMA,
            format!("body schema must be an object, ref or union, found {}", other.kind()),
        )),
    }
}

fn check_errors(errors: &[ErrorDef], ctx: &ValidationContext, out: &mut Collector) -> Flow {
    out.check(ValidationHelpers::validate_unique(
        errors.iter().map(|error| error.name.as_str()),
        names::UNIQUE_ERRORS,
        "error",
        &ctx.child("errors"),
    ))
}

fn check_union(document: &Document, union: &UnionNode, ctx: &ValidationContext, out: &mut Collector) -> Flow {
    out.check(ValidationHelpers::validate_non_empty(
        &union.refs,
        names::UNION_REFS,
        "refs",
        ctx,
    ))?;
    if ctx.mode.checks_references() {
        for (index, target) in union.refs.iter().enumerate() {
            out.check(check_ref_target(document, target, &ctx.child("refs").child_index(index)))?;
        }
    }
    ControlFlow::Continue(())
}

fn check_ref(document: &Document, reference: &RefNode, ctx: &ValidationContext, out: &mut Collector) -> Flow {
    if ctx.mode.checks_references() {
        out.check(check_ref_target(document, &reference.target, &ctx.child("ref")))?;
    }
    ControlFlow::Continue(())
}

/// Local targets must name an existing definition; external ones must be well formed
fn check_ref_target(document: &Document, target: &str, ctx: &ValidationContext) -> ValidationResult<()> {
    match RefTarget::parse(target) {
        RefTarget::Local(def) if def.is_empty() => Err(ctx.violation(
            names::REF_TARGET,
            format!("reference '{}' has an empty fragment", target),
        )),
        RefTarget::Local(def) if document.def(def).is_none() => Err(ctx.violation(
            names::REF_TARGET,
            format!("reference '{}' does not name a definition in {}", target, document.id()),
        )),
        RefTarget::Local(_) => Ok(()),
        RefTarget::External { nsid, def } => {
            if let Err(reason) = nsid::validate(nsid) {
                return Err(ctx.violation(
                    names::REF_TARGET,
                    format!("reference '{}' has an invalid NSID: {}", target, reason),
                ));
            }
            if def.is_empty() {
                return Err(ctx.violation(
                    names::REF_TARGET,
                    format!("reference '{}' has an empty fragment", target),
                ));
            }
            Ok(())
        }
    }
}

/// Validate a document's identifier and `main` kind, stopping at the first violation
///
/// Other definitions are not inspected; use a [`DocumentValidator`] in Partial or Strict
/// mode for per-definition rules.
pub fn validate(document: &Document) -> ValidationResult<()> {
    DocumentValidator::default().validate_basic(document)
}
