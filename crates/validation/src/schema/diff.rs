// Path: crates/validation/src/schema/diff.rs

//! Backward-compatibility check between two revisions of a document schema.
//!
//! A revision is compatible when every instance the old schema accepts is still
//! accepted by the new one. Each narrowing is reported as one [`SchemaDiff`]
//! whose path is a JSON pointer into the document schema.

use platform_types::codec::canonical_eq;
use platform_types::schema::{
    ArraySchema, EnumSchema, NumberSchema, ObjectSchema, SchemaNode, StringSchema,
};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt::Display;

type Defs = BTreeMap<String, SchemaNode>;

/// The shape of an incompatible change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffOperation {
    /// A constraint or property was introduced.
    Add,
    /// A property or accepted value disappeared.
    Remove,
    /// A constraint was tightened or a construct swapped for another.
    Replace,
}

impl DiffOperation {
    /// The wire name carried by `IncompatibleDataContractSchemaError`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Remove => "remove",
            Self::Replace => "replace",
        }
    }
}

/// One incompatible change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDiff {
    /// What kind of change.
    pub operation: DiffOperation,
    /// Where in the schema.
    pub path: String,
    /// Why it rejects previously valid instances.
    pub reason: String,
}

/// Lists every change from `old` to `new` that narrows the set of accepted documents.
pub fn incompatible_changes<'a>(
    old: &'a ObjectSchema,
    old_defs: &'a Defs,
    new: &'a ObjectSchema,
    new_defs: &'a Defs,
) -> Vec<SchemaDiff> {
    let mut differ = Differ {
        old_defs,
        new_defs,
        following: Vec::new(),
        changes: Vec::new(),
    };
    differ.object(old, new, "");
    differ.changes
}

struct Differ<'a> {
    old_defs: &'a Defs,
    new_defs: &'a Defs,
    // Reference pairs currently being followed; guards recursive definitions.
    following: Vec<(&'a str, &'a str)>,
    changes: Vec<SchemaDiff>,
}

fn join(path: &str, segment: &str) -> String {
    format!("{}/{}", path, segment)
}

fn reference(node: &SchemaNode) -> &str {
    match node {
        SchemaNode::Ref(r) => r,
        _ => "",
    }
}

impl<'a> Differ<'a> {
    fn push(&mut self, operation: DiffOperation, path: String, reason: impl Into<String>) {
        self.changes.push(SchemaDiff {
            operation,
            path,
            reason: reason.into(),
        });
    }

    fn node(&mut self, old: &'a SchemaNode, new: &'a SchemaNode, path: &str) {
        if matches!(old, SchemaNode::Ref(_)) || matches!(new, SchemaNode::Ref(_)) {
            self.follow(old, new, path);
            return;
        }

        match (old, new) {
            (SchemaNode::Object(o), SchemaNode::Object(n)) => self.object(o, n, path),
            (SchemaNode::Array(o), SchemaNode::Array(n)) => self.array(o, n, path),
            (SchemaNode::String(o), SchemaNode::String(n)) => self.string(o, n, path),
            (SchemaNode::Number(o), SchemaNode::Number(n)) => self.number(o, n, path),
            (SchemaNode::Boolean, SchemaNode::Boolean) => {}
            (SchemaNode::Enum(o), _) => self.closed_set(&o.values, new, path, "enum"),
            (SchemaNode::Const(c), _) => {
                self.closed_set(std::slice::from_ref(c), new, path, "const")
            }
            (_, SchemaNode::Enum(EnumSchema { .. })) => self.push(
                DiffOperation::Add,
                join(path, "enum"),
                "values restricted to a closed set",
            ),
            (_, SchemaNode::Const(_)) => self.push(
                DiffOperation::Add,
                join(path, "const"),
                "values restricted to a single constant",
            ),
            _ => self.push(
                DiffOperation::Replace,
                join(path, "type"),
                format!("type changed from {} to {}", old.type_name(), new.type_name()),
            ),
        }
    }

    fn follow(&mut self, old: &'a SchemaNode, new: &'a SchemaNode, path: &str) {
        let pair = (reference(old), reference(new));
        if self.following.contains(&pair) {
            return;
        }
        let Some(old_target) = old.resolve(self.old_defs) else {
            // Nothing was accepted through an unresolvable reference.
            return;
        };
        let Some(new_target) = new.resolve(self.new_defs) else {
            self.push(
                DiffOperation::Replace,
                join(path, "$ref"),
                format!("reference '{}' does not resolve", pair.1),
            );
            return;
        };
        self.following.push(pair);
        self.node(old_target, new_target, path);
        self.following.pop();
    }

    fn object(&mut self, old: &'a ObjectSchema, new: &'a ObjectSchema, path: &str) {
        for (name, old_property) in &old.properties {
            let property_path = format!("{}/properties/{}", path, name);
            match new.properties.get(name) {
                Some(new_property) => self.node(old_property, new_property, &property_path),
                None => self.push(DiffOperation::Remove, property_path, "property removed"),
            }
        }

        // The keyword is frozen once a contract is registered, whatever its value.
        match (old.additional_properties, new.additional_properties) {
            (None, Some(n)) => self.push(
                DiffOperation::Add,
                join(path, "additionalProperties"),
                format!("additionalProperties {} added", n),
            ),
            (Some(o), None) => self.push(
                DiffOperation::Remove,
                join(path, "additionalProperties"),
                format!("additionalProperties {} removed", o),
            ),
            (Some(o), Some(n)) if o != n => self.push(
                DiffOperation::Replace,
                join(path, "additionalProperties"),
                format!("additionalProperties changed from {} to {}", o, n),
            ),
            _ => {}
        }

        if old.allows_additional_properties() {
            for name in new.properties.keys().filter(|n| !old.properties.contains_key(*n)) {
                self.push(
                    DiffOperation::Add,
                    format!("{}/properties/{}", path, name),
                    "new property constrains values previously accepted as additional",
                );
            }
        }

        for name in new.required.difference(&old.required) {
            self.push(
                DiffOperation::Add,
                join(path, "required"),
                format!("property '{}' became required", name),
            );
        }

        self.lower_bound(path, "minProperties", old.min_properties, new.min_properties);
        self.upper_bound(path, "maxProperties", old.max_properties, new.max_properties);
    }

    fn array(&mut self, old: &'a ArraySchema, new: &'a ArraySchema, path: &str) {
        if old.byte_array != new.byte_array {
            self.push(
                DiffOperation::Replace,
                join(path, "byteArray"),
                "byte array flag changed",
            );
        }

        match (&old.items, &new.items) {
            (Some(o), Some(n)) => self.node(o, n, &join(path, "items")),
            (None, Some(_)) => {
                self.push(DiffOperation::Add, join(path, "items"), "item schema added")
            }
            _ => {}
        }

        self.lower_bound(path, "minItems", old.min_items, new.min_items);
        self.upper_bound(path, "maxItems", old.max_items, new.max_items);

        if !old.unique_items && new.unique_items {
            self.push(
                DiffOperation::Add,
                join(path, "uniqueItems"),
                "items must now be unique",
            );
        }
        self.restriction(
            path,
            "contentMediaType",
            &old.content_media_type,
            &new.content_media_type,
        );
    }

    fn string(&mut self, old: &StringSchema, new: &StringSchema, path: &str) {
        self.lower_bound(path, "minLength", old.min_length, new.min_length);
        self.upper_bound(path, "maxLength", old.max_length, new.max_length);
        self.restriction(path, "pattern", &old.pattern, &new.pattern);
        self.restriction(path, "format", &old.format, &new.format);
    }

    fn number(&mut self, old: &NumberSchema, new: &NumberSchema, path: &str) {
        if !old.integer && new.integer {
            self.push(
                DiffOperation::Replace,
                join(path, "type"),
                "number narrowed to integer",
            );
        }
        self.lower_bound(path, "minimum", old.minimum, new.minimum);
        self.lower_bound(
            path,
            "exclusiveMinimum",
            old.exclusive_minimum,
            new.exclusive_minimum,
        );
        self.upper_bound(path, "maximum", old.maximum, new.maximum);
        self.upper_bound(
            path,
            "exclusiveMaximum",
            old.exclusive_maximum,
            new.exclusive_maximum,
        );

        // Multiples of `old` stay multiples of `new` only if `new` divides `old`.
        match (old.multiple_of, new.multiple_of) {
            (None, Some(n)) => self.push(
                DiffOperation::Add,
                join(path, "multipleOf"),
                format!("multipleOf {} added", n),
            ),
            (Some(o), Some(n)) if n == 0.0 || (o / n).fract() != 0.0 => self.push(
                DiffOperation::Replace,
                join(path, "multipleOf"),
                format!("multipleOf changed from {} to {}", o, n),
            ),
            _ => {}
        }
    }

    fn closed_set(&mut self, values: &[Value], new: &SchemaNode, path: &str, keyword: &str) {
        for value in values.iter().filter(|v| !accepts(new, v)) {
            self.push(
                DiffOperation::Remove,
                join(path, keyword),
                format!("value {} is no longer accepted", value),
            );
        }
    }

    fn lower_bound<T: PartialOrd + Display + Copy>(
        &mut self,
        path: &str,
        keyword: &str,
        old: Option<T>,
        new: Option<T>,
    ) {
        match (old, new) {
            (None, Some(n)) => self.push(
                DiffOperation::Add,
                join(path, keyword),
                format!("{} {} added", keyword, n),
            ),
            (Some(o), Some(n)) if n > o => self.push(
                DiffOperation::Replace,
                join(path, keyword),
                format!("{} raised from {} to {}", keyword, o, n),
            ),
            _ => {}
        }
    }

    fn upper_bound<T: PartialOrd + Display + Copy>(
        &mut self,
        path: &str,
        keyword: &str,
        old: Option<T>,
        new: Option<T>,
    ) {
        match (old, new) {
            (None, Some(n)) => self.push(
                DiffOperation::Add,
                join(path, keyword),
                format!("{} {} added", keyword, n),
            ),
            (Some(o), Some(n)) if n < o => self.push(
                DiffOperation::Replace,
                join(path, keyword),
                format!("{} lowered from {} to {}", keyword, o, n),
            ),
            _ => {}
        }
    }

    fn restriction(
        &mut self,
        path: &str,
        keyword: &str,
        old: &Option<String>,
        new: &Option<String>,
    ) {
        match (old, new) {
            (None, Some(n)) => self.push(
                DiffOperation::Add,
                join(path, keyword),
                format!("{} '{}' added", keyword, n),
            ),
            (Some(o), Some(n)) if o != n => self.push(
                DiffOperation::Replace,
                join(path, keyword),
                format!("{} changed from '{}' to '{}'", keyword, o, n),
            ),
            _ => {}
        }
    }
}

/// Whether `node` accepts `value`. Answers `false` whenever it cannot tell.
fn accepts(node: &SchemaNode, value: &Value) -> bool {
    match (node, value) {
        (SchemaNode::String(s), Value::String(text)) => {
            let len = text.chars().count() as u64;
            s.pattern.is_none()
                && s.format.is_none()
                && s.min_length.map_or(true, |m| len >= m)
                && s.max_length.map_or(true, |m| len <= m)
        }
        (SchemaNode::Number(n), Value::Number(number)) => {
            let Some(x) = number.as_f64() else {
                return false;
            };
            (!n.integer || x.fract() == 0.0)
                && n.minimum.map_or(true, |m| x >= m)
                && n.maximum.map_or(true, |m| x <= m)
                && n.exclusive_minimum.map_or(true, |m| x > m)
                && n.exclusive_maximum.map_or(true, |m| x < m)
                && n.multiple_of.map_or(true, |m| m != 0.0 && (x / m).fract() == 0.0)
        }
        (SchemaNode::Boolean, Value::Bool(_)) => true,
        (SchemaNode::Enum(e), v) => e.values.iter().any(|x| canonical_eq(x, v)),
        (SchemaNode::Const(c), v) => canonical_eq(c, v),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(raw: Value) -> ObjectSchema {
        match SchemaNode::parse(&raw).unwrap() {
            SchemaNode::Object(o) => o,
            other => panic!("expected object schema, got {}", other.type_name()),
        }
    }

    fn diff(old: Value, new: Value) -> Vec<SchemaDiff> {
        let defs = Defs::new();
        incompatible_changes(&object(old), &defs, &object(new), &defs)
    }

    fn profile(display_name: Value) -> Value {
        json!({
            "type": "object",
            "properties": { "displayName": display_name },
            "additionalProperties": false
        })
    }

    #[test]
    fn adding_an_optional_property_is_compatible() {
        let old = profile(json!({ "type": "string", "maxLength": 25 }));
        let new = json!({
            "type": "object",
            "properties": {
                "displayName": { "type": "string", "maxLength": 25 },
                "publicMessage": { "type": "string", "maxLength": 256 }
            },
            "additionalProperties": false
        });
        assert!(diff(old, new).is_empty());
    }

    #[test]
    fn widening_and_narrowing_bounds() {
        let old = profile(json!({ "type": "string", "maxLength": 25 }));
        assert!(diff(old.clone(), profile(json!({ "type": "string" }))).is_empty());

        let changes = diff(old, profile(json!({ "type": "string", "maxLength": 10 })));
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].operation, DiffOperation::Replace);
        assert_eq!(changes[0].path, "/properties/displayName/maxLength");
    }

    #[test]
    fn removed_and_newly_required_properties() {
        let old = json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "integer" } },
            "required": ["a"],
            "additionalProperties": false
        });
        let new = json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "c": { "type": "integer" } },
            "required": ["a", "c"],
            "additionalProperties": false
        });
        let changes = diff(old, new);
        let ops: Vec<_> = changes.iter().map(|c| (c.operation, c.path.as_str())).collect();
        assert_eq!(
            ops,
            vec![
                (DiffOperation::Remove, "/properties/b"),
                (DiffOperation::Add, "/required"),
            ]
        );
    }

    #[test]
    fn type_and_enum_narrowing() {
        let changes = diff(
            profile(json!({ "type": "number" })),
            profile(json!({ "type": "integer" })),
        );
        assert_eq!(changes[0].path, "/properties/displayName/type");

        let changes = diff(
            profile(json!({ "type": "string", "enum": ["a", "b"] })),
            profile(json!({ "type": "string", "enum": ["a"] })),
        );
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].operation, DiffOperation::Remove);

        // An enum may be relaxed into the plain type it enumerates.
        assert!(diff(
            profile(json!({ "type": "string", "enum": ["a", "b"] })),
            profile(json!({ "type": "string", "maxLength": 5 })),
        )
        .is_empty());

        let changes = diff(
            profile(json!({ "type": "string" })),
            profile(json!({ "type": "boolean" })),
        );
        assert_eq!(changes[0].reason, "type changed from string to boolean");
    }

    #[test]
    fn references_are_compared_by_target() {
        let raw = json!({
            "type": "object",
            "properties": { "address": { "$ref": "#/$defs/address" } },
            "additionalProperties": false
        });
        let address = |max: u64| {
            SchemaNode::parse(&json!({
                "type": "object",
                "properties": { "city": { "type": "string", "maxLength": max } },
                "additionalProperties": false
            }))
            .unwrap()
        };
        let old_defs = Defs::from([("address".to_string(), address(32))]);
        let wide_defs = Defs::from([("address".to_string(), address(64))]);
        let narrow_defs = Defs::from([("address".to_string(), address(16))]);

        let schema = object(raw);
        assert!(incompatible_changes(&schema, &old_defs, &schema, &wide_defs).is_empty());

        let changes = incompatible_changes(&schema, &old_defs, &schema, &narrow_defs);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].path, "/properties/address/properties/city/maxLength");
    }

    #[test]
    fn recursive_definitions_terminate() {
        let raw = json!({
            "type": "object",
            "properties": { "node": { "$ref": "#/$defs/node" } },
            "additionalProperties": false
        });
        let node = SchemaNode::parse(&json!({
            "type": "object",
            "properties": { "child": { "$ref": "#/$defs/node" } },
            "additionalProperties": false
        }))
        .unwrap();
        let defs = Defs::from([("node".to_string(), node)]);
        let schema = object(raw);
        assert!(incompatible_changes(&schema, &defs, &schema, &defs).is_empty());
    }

    #[test]
    fn any_change_to_additional_properties_is_incompatible() {
        let with = |flag: Option<bool>| {
            let mut raw = json!({ "type": "object", "properties": {} });
            if let Some(flag) = flag {
                raw["additionalProperties"] = json!(flag);
            }
            raw
        };
        let cases = [
            (Some(false), Some(true), DiffOperation::Replace),
            (Some(true), Some(false), DiffOperation::Replace),
            (Some(true), None, DiffOperation::Remove),
            (Some(false), None, DiffOperation::Remove),
            (None, Some(false), DiffOperation::Add),
            (None, Some(true), DiffOperation::Add),
        ];
        for (old, new, operation) in cases {
            let changes = diff(with(old), with(new));
            assert_eq!(changes.len(), 1, "{:?} -> {:?}", old, new);
            assert_eq!(changes[0].operation, operation);
            assert_eq!(changes[0].path, "/additionalProperties");
        }
        assert!(diff(with(None), with(None)).is_empty());
        assert!(diff(with(Some(true)), with(Some(true))).is_empty());
    }

    #[test]
    fn removing_an_optional_property_of_an_open_object_is_incompatible() {
        let document = |address: Value| {
            json!({
                "type": "object",
                "properties": { "addr": address },
                "additionalProperties": false
            })
        };
        let old = document(json!({
            "type": "object",
            "properties": { "city": { "type": "string" }, "zip": { "type": "string" } }
        }));
        let new = document(json!({
            "type": "object",
            "properties": { "city": { "type": "string" } }
        }));
        let changes = diff(old, new);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].operation, DiffOperation::Remove);
        assert_eq!(changes[0].path, "/properties/addr/properties/zip");
    }

    #[test]
    fn numeric_bounds_compare_per_keyword() {
        let exclusive = profile(json!({ "type": "number", "exclusiveMinimum": 5 }));
        let inclusive = profile(json!({ "type": "number", "minimum": 5 }));
        let changes = diff(exclusive, inclusive);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].operation, DiffOperation::Add);
        assert_eq!(changes[0].path, "/properties/displayName/minimum");

        let changes = diff(
            profile(json!({ "type": "number", "minimum": 5 })),
            profile(json!({ "type": "number" })),
        );
        assert!(changes.is_empty());
    }
}
