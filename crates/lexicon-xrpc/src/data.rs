//! Checking JSON data against Lexicon schemas
//!
//! Data follows the atproto data model: `bytes` travel as `{"$bytes": base64}`,
//! links as `{"$link": cid}`, blobs as `{"$type": "blob", ...}` and union members
//! name their definition in `$type`. References are followed through the document
//! being checked first and the catalog second.
//!
//! Copyright (c) 2025 Lexicon Toolkit Team
//! Licensed under the Apache-2.0 license

use lexicon_schemas::nodes::method::encoding_matches;
use lexicon_schemas::nodes::{
    ArrayNode, BlobNode, BooleanNode, BytesNode, IntegerNode, ObjectNode, StringNode, UnionNode,
};
use lexicon_schemas::parser::DEFAULT_MAX_DEPTH;
use lexicon_schemas::{Document, FieldSchema, LexiconCatalog, RefTarget, SchemaNode, StringFormat};
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use base64::Engine;
use ipld_core::cid::Cid;
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::trace;
use unicode_segmentation::UnicodeSegmentation;

/// A value that does not match its schema
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{path}: {message}")]
pub struct DataError {
    pub path: String,
    pub message: String,
}

impl DataError {
    fn new(path: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

pub type DataResult = Result<(), DataError>;

/// Validates values against schemas, following references
#[derive(Debug, Clone, Copy)]
pub struct DataValidator<'c> {
    catalog: Option<&'c LexiconCatalog>,
    max_depth: usize,
}

impl<'c> DataValidator<'c> {
    pub fn new(catalog: Option<&'c LexiconCatalog>) -> Self {
        Self {
            catalog,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Check `value` against a nested schema of `document`
    pub fn validate_field(
        &self,
        document: &Document,
        schema: &FieldSchema,
        value: &Value,
        path: &str,
    ) -> DataResult {
        self.field(document, schema, value, path, 0)
    }

    /// Check `value` against a definition of `document`
    pub fn validate_node(
        &self,
        document: &Document,
        node: &SchemaNode,
        value: &Value,
        path: &str,
    ) -> DataResult {
        self.node(document, node, value, path, 0)
    }

    fn field(
        &self,
        document: &Document,
        schema: &FieldSchema,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> DataResult {
        if depth > self.max_depth {
            return Err(DataError::new(
                path,
                format!("data nesting exceeds the maximum depth of {}", self.max_depth),
            ));
        }

        match schema {
            FieldSchema::Node(node) => self.node(document, node, value, path, depth),
            FieldSchema::Ref(reference) => {
                let (target_document, target) = self.resolve(document, &reference.target, path)?;
                trace!(path, target = %reference.target, "following reference");
                self.node(target_document, target, value, path, depth + 1)
            }
            FieldSchema::Union(union) => self.union(document, union, value, path, depth),
        }
    }

    fn node(
        &self,
        document: &Document,
        node: &SchemaNode,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> DataResult {
        match node {
            SchemaNode::Boolean(boolean) => check_boolean(boolean, value, path),
            SchemaNode::Integer(integer) => check_integer(integer, value, path),
            SchemaNode::String(string) => check_string(string, value, path),
            SchemaNode::Bytes(bytes) => check_bytes(bytes, value, path),
            SchemaNode::CidLink(_) => check_cid_link(value, path),
            SchemaNode::Blob(blob) => check_blob(blob, value, path),
            SchemaNode::Unknown(_) => expect_object(value, path).map(|_| ()),
            SchemaNode::Array(array) => self.array(document, array, value, path, depth),
            SchemaNode::Object(object) => self.object(document, object, value, path, depth),
            SchemaNode::Record(record) => self.object(document, &record.record, value, path, depth),
            SchemaNode::Token(_) => Err(DataError::new(path, "a token does not describe data")),
            SchemaNode::Query(_) | SchemaNode::Procedure(_) | SchemaNode::Subscription(_) => Err(
                DataError::new(path, format!("a {} does not describe data", node.kind())),
            ),
        }
    }

    fn array(
        &self,
        document: &Document,
        array: &ArrayNode,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> DataResult {
        let items = value
            .as_array()
            .ok_or_else(|| DataError::new(path, "expected an array"))?;
        check_length(items.len() as u64, array.min_length, array.max_length, "items", path)?;

        for (index, item) in items.iter().enumerate() {
            let item_path = format!("{}[{}]", path, index);
            self.field(document, &array.items, item, &item_path, depth + 1)?;
        }
        Ok(())
    }

    fn object(
        &self,
        document: &Document,
        object: &ObjectNode,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> DataResult {
        let map = expect_object(value, path)?;

        for name in &object.required {
            if !map.contains_key(name) {
                return Err(DataError::new(path, format!("required property '{}' is missing", name)));
            }
        }

        for (name, schema) in &object.properties {
            let property_path = format!("{}.{}", path, name);
            match map.get(name) {
                None => {}
                Some(Value::Null) if object.is_nullable(name) => {}
                Some(Value::Null) => {
                    return Err(DataError::new(&property_path, "null is not allowed here"));
                }
                Some(property) => self.field(document, schema, property, &property_path, depth + 1)?,
            }
        }
        Ok(())
    }

    fn union(
        &self,
        document: &Document,
        union: &UnionNode,
        value: &Value,
        path: &str,
        depth: usize,
    ) -> DataResult {
        let map = expect_object(value, path)?;
        let type_name = map
            .get("$type")
            .and_then(Value::as_str)
            .ok_or_else(|| DataError::new(path, "union members must carry a $type"))?;
        let wanted = qualified(document.id(), type_name);

        let member = union
            .refs
            .iter()
            .find(|candidate| qualified(document.id(), candidate) == wanted);
        match member {
            Some(target) => {
                let (target_document, node) = self.resolve(document, target, path)?;
                self.node(target_document, node, value, path, depth + 1)
            }
            None if union.is_closed() => Err(DataError::new(
                path,
                format!("$type '{}' is not one of {}", type_name, union.refs.join(", ")),
            )),
            None => Ok(()),
        }
    }

    /// Find a reference target in `document` or the catalog
    fn resolve<'a>(
        &'a self,
        document: &'a Document,
        target: &'a str,
        path: &str,
    ) -> Result<(&'a Document, &'a SchemaNode), DataError> {
        let (nsid, def) = RefTarget::parse(target).absolute(document.id());
        let found = if nsid == document.id() {
            document.def(def).map(|node| (document, node))
        } else {
            self.catalog
                .and_then(|catalog| catalog.get(nsid))
                .and_then(|other| other.def(def).map(|node| (other.as_ref(), node)))
        };
        found.ok_or_else(|| DataError::new(path, format!("unresolved reference '{}'", target)))
    }
}

/// `nsid#def` with an implicit `#main` removed
fn qualified(document_id: &str, target: &str) -> String {
    match RefTarget::parse(target).absolute(document_id) {
        (nsid, "main") => nsid.to_string(),
        (nsid, def) => format!("{}#{}", nsid, def),
    }
}

fn expect_object<'v>(value: &'v Value, path: &str) -> Result<&'v Map<String, Value>, DataError> {
    value
        .as_object()
        .ok_or_else(|| DataError::new(path, "expected an object"))
}

fn check_length(len: u64, min: Option<u64>, max: Option<u64>, unit: &str, path: &str) -> DataResult {
    if let Some(min) = min.filter(|min| len < *min) {
        return Err(DataError::new(path, format!("must have at least {} {}", min, unit)));
    }
    if let Some(max) = max.filter(|max| len > *max) {
        return Err(DataError::new(path, format!("must have at most {} {}", max, unit)));
    }
    Ok(())
}

fn check_boolean(node: &BooleanNode, value: &Value, path: &str) -> DataResult {
    let value = value
        .as_bool()
        .ok_or_else(|| DataError::new(path, "expected a boolean"))?;
    match node.const_value {
        Some(expected) if expected != value => {
            Err(DataError::new(path, format!("must be {}", expected)))
        }
        _ => Ok(()),
    }
}

fn check_integer(node: &IntegerNode, value: &Value, path: &str) -> DataResult {
    let value = value
        .as_i64()
        .ok_or_else(|| DataError::new(path, "expected an integer"))?;

    if let Some(expected) = node.const_value.filter(|expected| *expected != value) {
        return Err(DataError::new(path, format!("must be {}", expected)));
    }
    if let Some(allowed) = node.enum_values.as_ref().filter(|allowed| !allowed.contains(&value)) {
        return Err(DataError::new(path, format!("must be one of {:?}", allowed)));
    }
    if let Some(minimum) = node.minimum.filter(|minimum| value < *minimum) {
        return Err(DataError::new(path, format!("can not be less than {}", minimum)));
    }
    if let Some(maximum) = node.maximum.filter(|maximum| value > *maximum) {
        return Err(DataError::new(path, format!("can not be greater than {}", maximum)));
    }
    Ok(())
}

fn check_string(node: &StringNode, value: &Value, path: &str) -> DataResult {
    let value = value
        .as_str()
        .ok_or_else(|| DataError::new(path, "expected a string"))?;

    if let Some(expected) = node.const_value.as_ref().filter(|expected| *expected != value) {
        return Err(DataError::new(path, format!("must be '{}'", expected)));
    }
    if let Some(allowed) = node.enum_values.as_ref() {
        if !allowed.iter().any(|candidate| candidate == value) {
            return Err(DataError::new(path, format!("must be one of {}", allowed.join(", "))));
        }
    }
    // Lengths count UTF-8 bytes
    check_length(value.len() as u64, node.min_length, node.max_length, "bytes", path)?;
    if node.min_graphemes.is_some() || node.max_graphemes.is_some() {
        let graphemes = value.graphemes(true).count() as u64;
        check_length(graphemes, node.min_graphemes, node.max_graphemes, "graphemes", path)?;
    }

    if let Some(format) = node.format {
        check_format(format, value, path)?;
    }
    Ok(())
}

fn check_format(format: StringFormat, value: &str, path: &str) -> DataResult {
    format.check(value).map_err(|reason| DataError::new(path, reason))
}

fn check_bytes(node: &BytesNode, value: &Value, path: &str) -> DataResult {
    let encoded = expect_object(value, path)?
        .get("$bytes")
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::new(path, "expected {\"$bytes\": <base64>}"))?;
    // Padding is optional in the data model
    let decoded = if encoded.ends_with('=') {
        STANDARD.decode(encoded)
    } else {
        STANDARD_NO_PAD.decode(encoded)
    }
    .map_err(|e| DataError::new(path, format!("$bytes is not base64: {}", e)))?;

    check_length(decoded.len() as u64, node.min_length, node.max_length, "bytes", path)
}

fn check_cid_link(value: &Value, path: &str) -> DataResult {
    let link = expect_object(value, path)?
        .get("$link")
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::new(path, "expected {\"$link\": <cid>}"))?;
    Cid::try_from(link)
        .map(|_| ())
        .map_err(|e| DataError::new(path, format!("$link is not a CID: {}", e)))
}

fn check_blob(node: &BlobNode, value: &Value, path: &str) -> DataResult {
    let map = expect_object(value, path)?;
    let mime_type = map
        .get("mimeType")
        .and_then(Value::as_str)
        .ok_or_else(|| DataError::new(path, "blob is missing mimeType"))?;

    if map.get("$type").and_then(Value::as_str) == Some("blob") {
        let link = map
            .get("ref")
            .ok_or_else(|| DataError::new(path, "blob is missing ref"))?;
        check_cid_link(link, &format!("{}.ref", path))?;

        let size = map
            .get("size")
            .and_then(Value::as_u64)
            .ok_or_else(|| DataError::new(path, "blob size must be a non-negative integer"))?;
        if let Some(max_size) = node.max_size.filter(|max| size > *max) {
            return Err(DataError::new(
                path,
                format!("blob is {} bytes, larger than {}", size, max_size),
            ));
        }
    } else {
        // legacy blob reference
        map.get("cid")
            .and_then(Value::as_str)
            .ok_or_else(|| DataError::new(path, "expected a blob"))?;
    }

    if let Some(accept) = &node.accept {
        if !accept.iter().any(|pattern| encoding_matches(pattern, mime_type)) {
            return Err(DataError::new(
                path,
                format!("mimeType {} is not one of {}", mime_type, accept.join(", ")),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicon_schemas::parse;
    use serde_json::json;

    const CID: &str = "bafyreie5737gdxlw5i64vzichcalba3z2v5n6icifvx5xytvske7mr3hpm";

    fn document() -> Document {
        parse(json!({
            "lexicon": 1,
            "id": "com.example.post",
            "defs": {
                "main": {
                    "type": "record",
                    "key": "tid",
                    "record": {
                        "type": "object",
                        "required": ["text", "createdAt"],
                        "nullable": ["reply"],
                        "properties": {
                            "text": {"type": "string", "maxLength": 10},
                            "createdAt": {"type": "string", "format": "datetime"},
                            "reply": {"type": "ref", "ref": "#replyRef"},
                            "langs": {"type": "array", "maxLength": 2, "items": {"type": "string", "format": "language"}},
                            "embed": {"type": "union", "refs": ["#images", "com.example.external"], "closed": true},
                            "likes": {"type": "integer", "minimum": 0},
                            "avatar": {"type": "blob", "accept": ["image/*"], "maxSize": 1000}
                        }
                    }
                },
                "replyRef": {
                    "type": "object",
                    "required": ["root"],
                    "properties": {"root": {"type": "cid-link"}}
                },
                "images": {
                    "type": "object",
                    "properties": {"alt": {"type": "string", "enum": ["a", "b"]}}
                }
            }
        }))
        .unwrap()
    }

    fn check(value: Value) -> DataResult {
        let document = document();
        let main = document.main().unwrap().clone();
        DataValidator::new(None).validate_node(&document, &main, &value, "$")
    }

    #[test]
    fn test_valid_record() {
        check(json!({
            "text": "hello",
            "createdAt": "2024-01-01T00:00:00Z",
            "reply": {"root": {"$link": CID}},
            "langs": ["en"],
            "embed": {"$type": "com.example.post#images", "alt": "a"},
            "avatar": {"$type": "blob", "ref": {"$link": CID}, "mimeType": "image/png", "size": 10}
        }))
        .unwrap();
    }

    #[test]
    fn test_required_and_nullable() {
        let err = check(json!({"text": "hi"})).unwrap_err();
        assert!(err.message.contains("createdAt"));

        check(json!({"text": "hi", "createdAt": "2024-01-01T00:00:00Z", "reply": null})).unwrap();

        let err = check(json!({"text": null, "createdAt": "2024-01-01T00:00:00Z"})).unwrap_err();
        assert_eq!(err.path, "$.text");
    }

    #[test]
    fn test_string_constraints() {
        let err = check(json!({"text": "far too long here", "createdAt": "2024-01-01T00:00:00Z"}))
            .unwrap_err();
        assert_eq!(err.path, "$.text");

        let err = check(json!({"text": "hi", "createdAt": "yesterday"})).unwrap_err();
        assert_eq!(err.path, "$.createdAt");
    }

    #[test]
    fn test_array_and_integer_constraints() {
        let base = |extra: Value| {
            let mut value = json!({"text": "hi", "createdAt": "2024-01-01T00:00:00Z"});
            value.as_object_mut().unwrap().extend(extra.as_object().unwrap().clone());
            check(value)
        };

        assert_eq!(base(json!({"langs": ["en", "fr", "de"]})).unwrap_err().path, "$.langs");
        assert_eq!(base(json!({"langs": ["en", 3]})).unwrap_err().path, "$.langs[1]");
        assert_eq!(base(json!({"likes": -1})).unwrap_err().path, "$.likes");
        assert_eq!(base(json!({"likes": 1.5})).unwrap_err().message, "expected an integer");
    }

    #[test]
    fn test_closed_union() {
        let base = |embed: Value| {
            check(json!({"text": "hi", "createdAt": "2024-01-01T00:00:00Z", "embed": embed}))
        };

        assert!(base(json!({"$type": "com.example.post#images", "alt": "c"})).is_err());
        assert!(base(json!({"$type": "com.example.video"})).is_err());
        assert!(base(json!({"alt": "a"})).is_err());

        // listed but not in the catalog
        let err = base(json!({"$type": "com.example.external"})).unwrap_err();
        assert!(err.message.contains("unresolved reference"));
    }

    #[test]
    fn test_blob_rules() {
        let base = |avatar: Value| {
            check(json!({"text": "hi", "createdAt": "2024-01-01T00:00:00Z", "avatar": avatar}))
        };

        assert!(base(json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "video/mp4", "size": 10})).is_err());
        assert!(base(json!({"$type": "blob", "ref": {"$link": CID}, "mimeType": "image/png", "size": 5000})).is_err());
        assert!(base(json!({"cid": CID, "mimeType": "image/jpeg"})).is_ok());
    }

    #[test]
    fn test_bytes() {
        let document = parse(json!({
            "lexicon": 1,
            "id": "com.example.bytes",
            "defs": {"data": {"type": "bytes", "maxLength": 4}}
        }))
        .unwrap();
        let node = document.def("data").unwrap();
        let validator = DataValidator::new(None);

        let check = |encoded: &str| validator.validate_node(&document, node, &json!({"$bytes": encoded}), "$");

        assert!(check("AQID").is_ok());
        assert!(check("AQIDBA==").is_ok());
        assert!(check("AQIDBA").is_ok());
        assert!(check("AQIDBAUG").is_err());
        assert!(validator.validate_node(&document, node, &json!("AQID"), "$").is_err());

        for malformed in ["=A=", "A", "AB=C", "A===="] {
            let err = check(malformed).unwrap_err();
            assert!(err.message.starts_with("$bytes is not base64"), "{}: {}", malformed, err);
        }
    }

    #[test]
    fn test_links_must_be_cids() {
        let document = parse(json!({
            "lexicon": 1,
            "id": "com.example.link",
            "defs": {"target": {"type": "cid-link"}}
        }))
        .unwrap();
        let node = document.def("target").unwrap();
        let validator = DataValidator::new(None);

        assert!(validator.validate_node(&document, node, &json!({"$link": CID}), "$").is_ok());
        let err = validator
            .validate_node(&document, node, &json!({"$link": "bafy+not=a=cid"}), "$")
            .unwrap_err();
        assert!(err.message.starts_with("$link is not a CID"));
    }

    #[test]
    fn test_grapheme_bounds() {
        let document = parse(json!({
            "lexicon": 1,
            "id": "com.example.status",
            "defs": {"emoji": {"type": "string", "minGraphemes": 1, "maxGraphemes": 2}}
        }))
        .unwrap();
        let node = document.def("emoji").unwrap();
        let validator = DataValidator::new(None);
        let check = |text: &str| validator.validate_node(&document, node, &json!(text), "$");

        // A family and a toned thumbs-up: seven code points, two clusters
        assert!(check("\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}\u{1F44D}\u{1F3FD}").is_ok());
        assert!(check("e\u{301}").is_ok());
        assert_eq!(check("").unwrap_err().message, "must have at least 1 graphemes");
        assert_eq!(check("abc").unwrap_err().message, "must have at most 2 graphemes");
    }

    #[test]
    fn test_format_message_names_format_once() {
        let document = parse(json!({
            "lexicon": 1,
            "id": "com.example.when",
            "defs": {"at": {"type": "string", "format": "datetime"}}
        }))
        .unwrap();
        let node = document.def("at").unwrap();
        let err = DataValidator::new(None)
            .validate_node(&document, node, &json!("yesterday"), "$.at")
            .unwrap_err();
        assert_eq!(err.to_string(), "$.at: 'yesterday' is not a valid datetime");
    }

    #[test]
    fn test_depth_bound() {
        let document = parse(json!({
            "lexicon": 1,
            "id": "com.example.tree",
            "defs": {
                "node": {
                    "type": "object",
                    "properties": {"child": {"type": "ref", "ref": "#node"}}
                }
            }
        }))
        .unwrap();
        let mut value = json!({});
        for _ in 0..10 {
            value = json!({"child": value});
        }

        let node = document.def("node").unwrap();
        assert!(DataValidator::new(None).validate_node(&document, node, &value, "$").is_ok());
        let err = DataValidator::new(None)
            .with_max_depth(10)
            .validate_node(&document, node, &value, "$")
            .unwrap_err();
        assert!(err.message.contains("maximum depth"));
    }
}
