//! Typed JSON Schema node model, decoded from a generic `serde_json::Value`.
//!
//! Only the keys that drive type inference are modeled; anything else in the
//! document is ignored. Decoding fails fast on the first malformed field and
//! reports the JSON-pointer path to it.
use std::fmt;
use std::str::FromStr;

use indexmap::{IndexMap, IndexSet};
use serde_json::{Map, Value};

// ------------------------------- Model ------------------------------------ //

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum JsonType {
    Object,
    Array,
    Boolean,
    String,
    Null,
    Integer,
    Number,
}

const JSON_TYPE_NAMES: &[(&str, JsonType)] = &[
    ("object", JsonType::Object),
    ("array", JsonType::Array),
    ("boolean", JsonType::Boolean),
    ("string", JsonType::String),
    ("null", JsonType::Null),
    ("integer", JsonType::Integer),
    ("number", JsonType::Number),
];

impl JsonType {
    pub fn as_str(self) -> &'static str {
        match self {
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Boolean => "boolean",
            JsonType::String => "string",
            JsonType::Null => "null",
            JsonType::Integer => "integer",
            JsonType::Number => "number",
        }
    }
}

impl FromStr for JsonType {
    type Err = String;
    fn from_str(key: &str) -> Result<Self, Self::Err> {
        JSON_TYPE_NAMES
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, t)| *t)
            .ok_or_else(|| key.to_string())
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// The `type` keyword: one token or a set of them (duplicates collapse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeSpec {
    Single(JsonType),
    Set(IndexSet<JsonType>),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdditionalProperties {
    Allowed(bool),
    Schema(Box<SchemaNode>),
}

impl Default for AdditionalProperties {
    fn default() -> Self { AdditionalProperties::Allowed(true) }
}

/// A split `$ref`; never empty, the last segment names the target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRef {
    raw: String,
    segments: Vec<String>,
}

impl SchemaRef {
    pub fn parse(raw: &str) -> Self {
        let segments = raw.split('/').map(unescape_pointer).collect();
        Self { raw: raw.to_string(), segments }
    }
    pub fn raw(&self) -> &str { &self.raw }
    pub fn segments(&self) -> &[String] { &self.segments }
    pub fn name_hint(&self) -> &str {
        // split always yields at least one segment
        self.segments.last().map(String::as_str).unwrap_or_default()
    }
}

fn unescape_pointer(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaNode {
    pub definitions: Option<IndexMap<String, SchemaNode>>,
    pub reference: Option<SchemaRef>,
    pub types: Option<TypeSpec>,
    pub one_of: Option<Vec<SchemaNode>>,
    pub properties: Option<IndexMap<String, SchemaNode>>,
    pub additional_properties: AdditionalProperties,
    pub items: Option<Box<SchemaNode>>,
    pub required: Option<Vec<String>>,
    pub title: Option<String>,
}

// ------------------------------- Errors ----------------------------------- //

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Unexpected enum key `{key}` at {path}")]
    UnexpectedEnumKey { path: String, key: String },
    #[error("Expected {expected} at {path}, found {found}")]
    UnexpectedKind { path: String, expected: &'static str, found: &'static str },
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn unexpected(path: &str, expected: &'static str, found: &Value) -> DecodeError {
    DecodeError::UnexpectedKind { path: path.to_string(), expected, found: kind_name(found) }
}

// ------------------------------- Decode ----------------------------------- //

impl SchemaNode {
    pub fn from_value(value: &Value) -> Result<Self, DecodeError> {
        decode_node(value, "")
    }
}

/// Look up `key`; absent ⇒ `default`, present ⇒ decode or fail.
fn field_or<T>(
    obj: &Map<String, Value>,
    path: &str,
    key: &str,
    default: T,
    decode: impl FnOnce(&Value, &str) -> Result<T, DecodeError>,
) -> Result<T, DecodeError> {
    match obj.get(key) {
        None => Ok(default),
        Some(v) => decode(v, &format!("{path}/{}", key.replace('~', "~0").replace('/', "~1"))),
    }
}

fn decode_node(value: &Value, path: &str) -> Result<SchemaNode, DecodeError> {
    let Value::Object(obj) = value else {
        return Err(unexpected(display_path(path), "object", value));
    };
    Ok(SchemaNode {
        definitions: field_or(obj, path, "definitions", None, |v, p| decode_schema_map(v, p).map(Some))?,
        reference: field_or(obj, path, "$ref", None, |v, p| decode_string(v, p).map(|s| Some(SchemaRef::parse(&s))))?,
        types: field_or(obj, path, "type", None, |v, p| decode_type_spec(v, p).map(Some))?,
        one_of: field_or(obj, path, "oneOf", None, |v, p| decode_schema_list(v, p).map(Some))?,
        properties: field_or(obj, path, "properties", None, |v, p| decode_schema_map(v, p).map(Some))?,
        additional_properties: field_or(obj, path, "additionalProperties", AdditionalProperties::default(), |v, p| match v {
            Value::Bool(b) => Ok(AdditionalProperties::Allowed(*b)),
            other => decode_node(other, p).map(|n| AdditionalProperties::Schema(Box::new(n))),
        })?,
        items: field_or(obj, path, "items", None, |v, p| decode_node(v, p).map(|n| Some(Box::new(n))))?,
        required: field_or(obj, path, "required", None, |v, p| decode_string_list(v, p).map(Some))?,
        title: field_or(obj, path, "title", None, |v, p| decode_string(v, p).map(Some))?,
    })
}

fn display_path(path: &str) -> &str {
    if path.is_empty() { "/" } else { path }
}

fn decode_string(v: &Value, path: &str) -> Result<String, DecodeError> {
    v.as_str().map(str::to_string).ok_or_else(|| unexpected(path, "string", v))
}

fn decode_json_type(v: &Value, path: &str) -> Result<JsonType, DecodeError> {
    let key = decode_string(v, path)?;
    key.parse().map_err(|key| DecodeError::UnexpectedEnumKey { path: path.to_string(), key })
}

fn decode_type_spec(v: &Value, path: &str) -> Result<TypeSpec, DecodeError> {
    match v {
        Value::String(_) => decode_json_type(v, path).map(TypeSpec::Single),
        Value::Array(xs) => xs
            .iter()
            .enumerate()
            .map(|(i, x)| decode_json_type(x, &format!("{path}/{i}")))
            .collect::<Result<IndexSet<_>, _>>()
            .map(TypeSpec::Set),
        other => Err(unexpected(path, "string or array", other)),
    }
}

fn decode_string_list(v: &Value, path: &str) -> Result<Vec<String>, DecodeError> {
    let Value::Array(xs) = v else { return Err(unexpected(path, "array", v)) };
    xs.iter().enumerate().map(|(i, x)| decode_string(x, &format!("{path}/{i}"))).collect()
}

fn decode_schema_list(v: &Value, path: &str) -> Result<Vec<SchemaNode>, DecodeError> {
    let Value::Array(xs) = v else { return Err(unexpected(path, "array", v)) };
    xs.iter().enumerate().map(|(i, x)| decode_node(x, &format!("{path}/{i}"))).collect()
}

fn decode_schema_map(v: &Value, path: &str) -> Result<IndexMap<String, SchemaNode>, DecodeError> {
    let Value::Object(m) = v else { return Err(unexpected(path, "object", v)) };
    m.iter()
        .map(|(k, x)| {
            let child = format!("{path}/{}", k.replace('~', "~0").replace('/', "~1"));
            decode_node(x, &child).map(|n| (k.clone(), n))
        })
        .collect()
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn decode(v: Value) -> Result<SchemaNode, DecodeError> { SchemaNode::from_value(&v) }

    #[test]
    fn empty_object_has_defaults() {
        let node = decode(json!({})).unwrap();
        assert_eq!(node.types, None);
        assert_eq!(node.additional_properties, AdditionalProperties::Allowed(true));
        assert!(node.properties.is_none() && node.reference.is_none() && node.title.is_none());
    }

    #[test]
    fn type_single_and_set() {
        let node = decode(json!({"type": "string"})).unwrap();
        assert_eq!(node.types, Some(TypeSpec::Single(JsonType::String)));

        let node = decode(json!({"type": ["string", "null", "string"]})).unwrap();
        let Some(TypeSpec::Set(set)) = node.types else { panic!("expected a type set") };
        assert_eq!(set.into_iter().collect::<Vec<_>>(), vec![JsonType::String, JsonType::Null]);
    }

    #[test]
    fn unknown_type_token_is_rejected() {
        let err = decode(json!({"type": "date"})).unwrap_err();
        assert_eq!(err, DecodeError::UnexpectedEnumKey { path: "/type".into(), key: "date".into() });
        assert!(err.to_string().starts_with("Unexpected enum key"));
    }

    #[test]
    fn wrong_kind_for_type_names_the_kind() {
        let err = decode(json!({"type": 5})).unwrap_err();
        assert_eq!(err.to_string(), "Expected string or array at /type, found number");
    }

    #[test]
    fn additional_properties_forms() {
        let node = decode(json!({"additionalProperties": false})).unwrap();
        assert_eq!(node.additional_properties, AdditionalProperties::Allowed(false));

        let node = decode(json!({"additionalProperties": {"type": "integer"}})).unwrap();
        let AdditionalProperties::Schema(inner) = node.additional_properties else { panic!("expected schema") };
        assert_eq!(inner.types, Some(TypeSpec::Single(JsonType::Integer)));
    }

    #[test]
    fn ref_is_split_and_unescaped() {
        let node = decode(json!({"$ref": "#/definitions/a~1b"})).unwrap();
        let r = node.reference.unwrap();
        assert_eq!(r.segments(), ["#", "definitions", "a/b"]);
        assert_eq!(r.name_hint(), "a/b");
        assert_eq!(r.raw(), "#/definitions/a~1b");
        assert_eq!(SchemaRef::parse("#").segments(), ["#"]);
    }

    #[test]
    fn nested_errors_carry_their_path() {
        let err = decode(json!({"properties": {"a": {"items": {"title": 3}}}})).unwrap_err();
        assert_eq!(err.to_string(), "Expected string at /properties/a/items/title, found number");
        let err = decode(json!(true)).unwrap_err();
        assert_eq!(err.to_string(), "Expected object at /, found boolean");
    }

    #[test]
    fn property_order_follows_the_document() {
        let node = decode(json!({"properties": {"z": {}, "a": {}, "m": {}}, "required": ["z"]})).unwrap();
        let keys: Vec<_> = node.properties.unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
        assert_eq!(node.required, Some(vec!["z".to_string()]));
    }

    #[test]
    fn decoding_is_deterministic() {
        let doc = json!({"definitions": {"A": {"type": ["object", "null"]}}, "oneOf": [{"$ref": "#/definitions/A"}]});
        assert_eq!(decode(doc.clone()), decode(doc.clone()));
        let bad = json!({"oneOf": [{"type": "nope"}]});
        assert_eq!(decode(bad.clone()), decode(bad));
    }
}
