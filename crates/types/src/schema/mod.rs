// Path: crates/types/src/schema/mod.rs

//! A strongly-typed tree for the subset of JSON Schema that document schemas use.
//!
//! Contract payloads arrive as loosely-typed JSON. They are lowered once into a
//! [`SchemaNode`] so that structural checks and compatibility diffs are exhaustive
//! pattern matches rather than ad hoc property probing. Annotation keywords
//! (`description`, `$comment`, ...) are accepted and dropped: they never change
//! which instances a schema accepts.

use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// Prefix every local `$ref` must start with.
pub const DEFS_REF_PREFIX: &str = "#/$defs/";

const ANNOTATION_KEYWORDS: &[&str] = &[
    "description",
    "$comment",
    "title",
    "examples",
    "position",
];

/// The JSON Schema instance types that a document schema may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum InstanceType {
    /// `"object"`
    Object,
    /// `"array"`
    Array,
    /// `"string"`
    String,
    /// `"number"`
    Number,
    /// `"integer"`
    Integer,
    /// `"boolean"`
    Boolean,
    /// `"null"`
    Null,
}

impl InstanceType {
    fn parse(s: &str) -> Option<Self> {
        Some(match s {
            "object" => Self::Object,
            "array" => Self::Array,
            "string" => Self::String,
            "number" => Self::Number,
            "integer" => Self::Integer,
            "boolean" => Self::Boolean,
            "null" => Self::Null,
            _ => return None,
        })
    }

    /// The keyword spelling of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

/// A parsed schema construct.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// `type: object`
    Object(ObjectSchema),
    /// `type: array`
    Array(ArraySchema),
    /// `type: string` without `enum`
    String(StringSchema),
    /// `type: number` or `type: integer` without `enum`
    Number(NumberSchema),
    /// `type: boolean`
    Boolean,
    /// Any schema carrying an `enum` list.
    Enum(EnumSchema),
    /// Any schema carrying a `const` value.
    Const(Value),
    /// A local reference into `$defs`.
    Ref(String),
}

/// Object constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectSchema {
    /// Declared properties.
    pub properties: BTreeMap<String, SchemaNode>,
    /// Names listed under `required`.
    pub required: BTreeSet<String>,
    /// `additionalProperties` as written; `None` when the keyword is absent.
    pub additional_properties: Option<bool>,
    /// `minProperties`
    pub min_properties: Option<u64>,
    /// `maxProperties`
    pub max_properties: Option<u64>,
}

/// Array constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ArraySchema {
    /// `items`
    pub items: Option<Box<SchemaNode>>,
    /// `minItems`
    pub min_items: Option<u64>,
    /// `maxItems`
    pub max_items: Option<u64>,
    /// `uniqueItems`
    pub unique_items: bool,
    /// `byteArray` marks an array of octets.
    pub byte_array: bool,
    /// `contentMediaType`
    pub content_media_type: Option<String>,
}

/// String constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StringSchema {
    /// `minLength`
    pub min_length: Option<u64>,
    /// `maxLength`
    pub max_length: Option<u64>,
    /// `pattern`
    pub pattern: Option<String>,
    /// `format`
    pub format: Option<String>,
}

/// Numeric constraints.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NumberSchema {
    /// True for `type: integer`.
    pub integer: bool,
    /// `minimum`
    pub minimum: Option<f64>,
    /// `maximum`
    pub maximum: Option<f64>,
    /// `exclusiveMinimum`
    pub exclusive_minimum: Option<f64>,
    /// `exclusiveMaximum`
    pub exclusive_maximum: Option<f64>,
    /// `multipleOf`
    pub multiple_of: Option<f64>,
}

/// A closed set of permitted values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumSchema {
    /// The declared `type`, if any.
    pub base: Option<InstanceType>,
    /// Permitted values, in declaration order.
    pub values: Vec<Value>,
}

/// A schema that could not be lowered into a [`SchemaNode`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid schema at '{path}': {message}")]
pub struct SchemaParseError {
    /// JSON pointer of the offending schema location.
    pub path: String,
    /// What was wrong.
    pub message: String,
    /// The JSON Schema keyword involved, if any.
    pub keyword: String,
}

impl SchemaParseError {
    fn new(path: &str, keyword: &str, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            keyword: keyword.to_string(),
        }
    }
}

impl SchemaNode {
    /// Lowers a raw JSON schema into a typed tree.
    pub fn parse(value: &Value) -> Result<Self, SchemaParseError> {
        parse_node(value, "")
    }

    /// A short name for the construct, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Object(_) => "object",
            Self::Array(a) if a.byte_array => "byteArray",
            Self::Array(_) => "array",
            Self::String(_) => "string",
            Self::Number(n) if n.integer => "integer",
            Self::Number(_) => "number",
            Self::Boolean => "boolean",
            Self::Enum(_) => "enum",
            Self::Const(_) => "const",
            Self::Ref(_) => "$ref",
        }
    }

    /// Follows a `$ref` through the given definitions. Non-references resolve to themselves.
    pub fn resolve<'a>(&'a self, defs: &'a BTreeMap<String, SchemaNode>) -> Option<&'a SchemaNode> {
        let mut current = self;
        // Bounded so that a cycle of references cannot loop forever.
        for _ in 0..=defs.len() {
            match current {
                Self::Ref(reference) => {
                    let name = reference.strip_prefix(DEFS_REF_PREFIX)?;
                    current = defs.get(name)?;
                }
                other => return Some(other),
            }
        }
        None
    }

    /// Visits every `$ref` string in this tree.
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Ref(r) => out.push(r),
            Self::Object(o) => o.properties.values().for_each(|p| p.collect_refs(out)),
            Self::Array(a) => {
                if let Some(items) = &a.items {
                    items.collect_refs(out);
                }
            }
            Self::String(_) | Self::Number(_) | Self::Boolean | Self::Enum(_) | Self::Const(_) => {}
        }
    }
}

impl ObjectSchema {
    /// Whether undeclared properties validate; JSON Schema defaults to `true`.
    pub fn allows_additional_properties(&self) -> bool {
        self.additional_properties.unwrap_or(true)
    }

    /// Looks up a (possibly dotted) property path such as `address.city`.
    pub fn property_by_path<'a>(
        &'a self,
        path: &str,
        defs: &'a BTreeMap<String, SchemaNode>,
    ) -> Option<&'a SchemaNode> {
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut node = self.properties.get(first)?.resolve(defs)?;
        for segment in segments {
            match node {
                SchemaNode::Object(obj) => node = obj.properties.get(segment)?.resolve(defs)?,
                _ => return None,
            }
        }
        Some(node)
    }
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>, SchemaParseError> {
    value
        .as_object()
        .ok_or_else(|| SchemaParseError::new(path, "type", "schema must be an object"))
}

fn check_keywords(
    map: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
) -> Result<(), SchemaParseError> {
    for key in map.keys() {
        if !allowed.contains(&key.as_str()) && !ANNOTATION_KEYWORDS.contains(&key.as_str()) {
            return Err(SchemaParseError::new(
                path,
                key,
                format!("unsupported keyword '{}'", key),
            ));
        }
    }
    Ok(())
}

fn opt_u64(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<u64>, SchemaParseError> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_u64()
            .map(Some)
            .ok_or_else(|| SchemaParseError::new(path, key, "must be a non-negative integer")),
    }
}

fn opt_f64(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<f64>, SchemaParseError> {
    match map.get(key) {
        None => Ok(None),
        Some(v) => v
            .as_f64()
            .map(Some)
            .ok_or_else(|| SchemaParseError::new(path, key, "must be a number")),
    }
}

fn opt_string(
    map: &Map<String, Value>,
    key: &str,
    path: &str,
) -> Result<Option<String>, SchemaParseError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(_) => Err(SchemaParseError::new(path, key, "must be a string")),
    }
}

fn opt_bool(map: &Map<String, Value>, key: &str, path: &str) -> Result<Option<bool>, SchemaParseError> {
    match map.get(key) {
        None => Ok(None),
        Some(Value::Bool(b)) => Ok(Some(*b)),
        Some(_) => Err(SchemaParseError::new(path, key, "must be a boolean")),
    }
}

fn parse_node(value: &Value, path: &str) -> Result<SchemaNode, SchemaParseError> {
    let map = as_object(value, path)?;

    if let Some(reference) = map.get("$ref") {
        check_keywords(map, &["$ref"], path)?;
        let reference = reference
            .as_str()
            .ok_or_else(|| SchemaParseError::new(path, "$ref", "must be a string"))?;
        return Ok(SchemaNode::Ref(reference.to_string()));
    }

    let declared_type = match map.get("type") {
        None => None,
        Some(Value::String(s)) => Some(InstanceType::parse(s).ok_or_else(|| {
            SchemaParseError::new(path, "type", format!("unknown type '{}'", s))
        })?),
        Some(_) => {
            return Err(SchemaParseError::new(
                path,
                "type",
                "type must be a single string",
            ))
        }
    };

    if let Some(constant) = map.get("const") {
        check_keywords(map, &["const", "type"], path)?;
        return Ok(SchemaNode::Const(constant.clone()));
    }

    if let Some(values) = map.get("enum") {
        check_keywords(
            map,
            &["enum", "type", "maxLength", "minLength", "minimum", "maximum"],
            path,
        )?;
        let values = values
            .as_array()
            .filter(|v| !v.is_empty())
            .ok_or_else(|| SchemaParseError::new(path, "enum", "must be a non-empty array"))?;
        return Ok(SchemaNode::Enum(EnumSchema {
            base: declared_type,
            values: values.clone(),
        }));
    }

    let Some(instance_type) = declared_type else {
        return Err(SchemaParseError::new(path, "type", "type is required"));
    };

    match instance_type {
        InstanceType::Object => {
            check_keywords(
                map,
                &[
                    "type",
                    "properties",
                    "required",
                    "additionalProperties",
                    "minProperties",
                    "maxProperties",
                ],
                path,
            )?;
            let mut properties = BTreeMap::new();
            if let Some(props) = map.get("properties") {
                let props = props.as_object().ok_or_else(|| {
                    SchemaParseError::new(path, "properties", "must be an object")
                })?;
                for (name, sub) in props {
                    let sub_path = format!("{}/properties/{}", path, name);
                    properties.insert(name.clone(), parse_node(sub, &sub_path)?);
                }
            }
            let mut required = BTreeSet::new();
            if let Some(req) = map.get("required") {
                let req = req
                    .as_array()
                    .ok_or_else(|| SchemaParseError::new(path, "required", "must be an array"))?;
                for name in req {
                    let name = name.as_str().ok_or_else(|| {
                        SchemaParseError::new(path, "required", "entries must be strings")
                    })?;
                    required.insert(name.to_string());
                }
            }
            Ok(SchemaNode::Object(ObjectSchema {
                properties,
                required,
                additional_properties: opt_bool(map, "additionalProperties", path)?,
                min_properties: opt_u64(map, "minProperties", path)?,
                max_properties: opt_u64(map, "maxProperties", path)?,
            }))
        }
        InstanceType::Array => {
            check_keywords(
                map,
                &[
                    "type",
                    "items",
                    "minItems",
                    "maxItems",
                    "uniqueItems",
                    "byteArray",
                    "contentMediaType",
                ],
                path,
            )?;
            let items = match map.get("items") {
                None => None,
                Some(sub) => Some(Box::new(parse_node(sub, &format!("{}/items", path))?)),
            };
            let byte_array = opt_bool(map, "byteArray", path)?.unwrap_or(false);
            if byte_array && items.is_some() {
                return Err(SchemaParseError::new(
                    path,
                    "byteArray",
                    "byteArray may not be combined with items",
                ));
            }
            Ok(SchemaNode::Array(ArraySchema {
                items,
                min_items: opt_u64(map, "minItems", path)?,
                max_items: opt_u64(map, "maxItems", path)?,
                unique_items: opt_bool(map, "uniqueItems", path)?.unwrap_or(false),
                byte_array,
                content_media_type: opt_string(map, "contentMediaType", path)?,
            }))
        }
        InstanceType::String => {
            check_keywords(
                map,
                &["type", "minLength", "maxLength", "pattern", "format"],
                path,
            )?;
            Ok(SchemaNode::String(StringSchema {
                min_length: opt_u64(map, "minLength", path)?,
                max_length: opt_u64(map, "maxLength", path)?,
                pattern: opt_string(map, "pattern", path)?,
                format: opt_string(map, "format", path)?,
            }))
        }
        InstanceType::Number | InstanceType::Integer => {
            check_keywords(
                map,
                &[
                    "type",
                    "minimum",
                    "maximum",
                    "exclusiveMinimum",
                    "exclusiveMaximum",
                    "multipleOf",
                ],
                path,
            )?;
            Ok(SchemaNode::Number(NumberSchema {
                integer: instance_type == InstanceType::Integer,
                minimum: opt_f64(map, "minimum", path)?,
                maximum: opt_f64(map, "maximum", path)?,
                exclusive_minimum: opt_f64(map, "exclusiveMinimum", path)?,
                exclusive_maximum: opt_f64(map, "exclusiveMaximum", path)?,
                multiple_of: opt_f64(map, "multipleOf", path)?,
            }))
        }
        InstanceType::Boolean => {
            check_keywords(map, &["type"], path)?;
            Ok(SchemaNode::Boolean)
        }
        InstanceType::Null => Err(SchemaParseError::new(
            path,
            "type",
            "null-typed properties are not supported",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_profile_schema() {
        let raw = json!({
            "type": "object",
            "properties": {
                "displayName": { "type": "string", "maxLength": 25 },
                "avatar": { "type": "array", "byteArray": true, "maxItems": 32 },
                "age": { "type": "integer", "minimum": 0 },
                "kind": { "type": "string", "enum": ["a", "b"] },
                "address": { "$ref": "#/$defs/address" }
            },
            "required": ["displayName"],
            "additionalProperties": false,
            "description": "a profile"
        });

        let SchemaNode::Object(obj) = SchemaNode::parse(&raw).unwrap() else {
            panic!("expected object");
        };
        assert_eq!(obj.additional_properties, Some(false));
        assert!(!obj.allows_additional_properties());
        assert!(obj.required.contains("displayName"));
        assert_eq!(
            obj.properties.get("displayName"),
            Some(&SchemaNode::String(StringSchema {
                max_length: Some(25),
                ..Default::default()
            }))
        );
        assert!(matches!(obj.properties.get("kind"), Some(SchemaNode::Enum(_))));
        assert!(matches!(obj.properties.get("address"), Some(SchemaNode::Ref(_))));
    }

    #[test]
    fn rejects_unsupported_keywords() {
        let err = SchemaNode::parse(&json!({ "type": "string", "default": "x" })).unwrap_err();
        assert_eq!(err.keyword, "default");

        let err = SchemaNode::parse(&json!({ "type": ["string", "null"] })).unwrap_err();
        assert_eq!(err.keyword, "type");
    }

    #[test]
    fn resolves_refs_and_dotted_paths() {
        let mut defs = BTreeMap::new();
        defs.insert(
            "address".to_string(),
            SchemaNode::parse(&json!({
                "type": "object",
                "properties": { "city": { "type": "string", "maxLength": 40 } },
                "additionalProperties": false
            }))
            .unwrap(),
        );
        let SchemaNode::Object(root) = SchemaNode::parse(&json!({
            "type": "object",
            "properties": { "address": { "$ref": "#/$defs/address" } }
        }))
        .unwrap() else {
            panic!("expected object");
        };

        let city = root.property_by_path("address.city", &defs).unwrap();
        assert_eq!(city.type_name(), "string");
        assert!(root.property_by_path("address.zip", &defs).is_none());
    }

    #[test]
    fn self_referencing_defs_do_not_loop() {
        let mut defs = BTreeMap::new();
        defs.insert("a".to_string(), SchemaNode::Ref("#/$defs/a".into()));
        assert!(SchemaNode::Ref("#/$defs/a".into()).resolve(&defs).is_none());
    }
}
