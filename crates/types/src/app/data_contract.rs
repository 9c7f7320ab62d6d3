// Path: crates/types/src/app/data_contract.rs

//! The in-memory data contract.
//!
//! A contract arrives as raw JSON. [`DataContract::from_value`] lowers it into typed
//! document types (a [`SchemaNode`] tree per type plus its declared indices) while
//! keeping the raw form around: the raw form is what the structural validator and
//! the canonical base-data comparison operate on.

use super::identifier::Identifier;
use crate::error::BasicError;
use crate::schema::{ObjectSchema, SchemaNode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Root property holding the dialect tag.
pub const SCHEMA_PROPERTY: &str = "$schema";
/// Root property holding the contract identifier.
pub const ID_PROPERTY: &str = "$id";
/// Root property holding the owner identifier.
pub const OWNER_ID_PROPERTY: &str = "ownerId";
/// Root property holding the contract version.
pub const VERSION_PROPERTY: &str = "version";
/// Root property holding the document schemas.
pub const DOCUMENTS_PROPERTY: &str = "documents";
/// Root property holding reusable schema fragments.
pub const DEFS_PROPERTY: &str = "$defs";
/// Root property holding the protocol version.
pub const PROTOCOL_VERSION_PROPERTY: &str = "protocolVersion";
/// Document schema property holding the declared indices.
pub const INDICES_PROPERTY: &str = "indices";

/// Sort direction of one indexed property.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum IndexDirection {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

/// One `{property: direction}` entry of an index.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(
    try_from = "BTreeMap<String, IndexDirection>",
    into = "BTreeMap<String, IndexDirection>"
)]
pub struct IndexProperty {
    /// The indexed property, possibly dotted (`address.city`) or a system property (`$ownerId`).
    pub name: String,
    /// Sort direction.
    pub direction: IndexDirection,
}

impl TryFrom<BTreeMap<String, IndexDirection>> for IndexProperty {
    type Error = String;

    fn try_from(map: BTreeMap<String, IndexDirection>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((name, direction)), None) => Ok(Self { name, direction }),
            _ => Err("an index property must have exactly one entry".to_string()),
        }
    }
}

impl From<IndexProperty> for BTreeMap<String, IndexDirection> {
    fn from(p: IndexProperty) -> Self {
        BTreeMap::from([(p.name, p.direction)])
    }
}

/// An index declared on a document type.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Index {
    /// Unique within the document type.
    pub name: String,
    /// Indexed properties in order.
    pub properties: Vec<IndexProperty>,
    /// Whether the combination of values must be unique.
    #[serde(default)]
    pub unique: bool,
}

impl Index {
    /// True for indices spanning more than one property.
    pub fn is_compound(&self) -> bool {
        self.properties.len() > 1
    }

    /// The property names in declaration order.
    pub fn property_names(&self) -> Vec<String> {
        self.properties.iter().map(|p| p.name.clone()).collect()
    }
}

/// A document type of a contract.
#[derive(Clone, Debug, PartialEq)]
pub struct DocumentType {
    /// The document type name.
    pub name: String,
    /// The raw schema without its `indices` entry.
    pub raw_schema: Value,
    /// The typed schema tree.
    pub schema: ObjectSchema,
    /// Declared indices.
    pub indices: Vec<Index>,
}

/// A reusable schema fragment from `$defs`.
#[derive(Clone, Debug, PartialEq)]
pub struct SchemaDefinition {
    /// The raw fragment.
    pub raw: Value,
    /// The typed fragment.
    pub node: SchemaNode,
}

/// A versioned set of document schemas owned by an identity.
#[derive(Clone, Debug, PartialEq)]
pub struct DataContract {
    /// Protocol version the contract was written against.
    pub protocol_version: u32,
    /// Dialect tag (`$schema`).
    pub schema: String,
    /// Content-derived identifier (`$id`).
    pub id: Identifier,
    /// The owning identity.
    pub owner_id: Identifier,
    /// Starts at 1 and increases by exactly one per accepted update.
    pub version: u32,
    /// Document types by name.
    pub documents: BTreeMap<String, DocumentType>,
    /// Reusable fragments by name.
    pub defs: BTreeMap<String, SchemaDefinition>,
    raw: Value,
}

fn invalid_schema(path: &str, keyword: &str, message: impl Into<String>) -> BasicError {
    BasicError::JsonSchemaError {
        keyword: keyword.to_string(),
        instance_path: path.to_string(),
        schema_path: String::new(),
        message: message.into(),
    }
}

fn required<'a>(root: &'a Map<String, Value>, key: &str) -> Result<&'a Value, BasicError> {
    root.get(key)
        .ok_or_else(|| invalid_schema("", "required", format!("missing property '{}'", key)))
}

fn identifier(root: &Map<String, Value>, key: &str) -> Result<Identifier, BasicError> {
    serde_json::from_value(required(root, key)?.clone()).map_err(|e| {
        BasicError::InvalidIdentifierError {
            identifier_name: key.to_string(),
            message: e.to_string(),
        }
    })
}

fn uint(root: &Map<String, Value>, key: &str) -> Result<u32, BasicError> {
    required(root, key)?
        .as_u64()
        .and_then(|v| u32::try_from(v).ok())
        .ok_or_else(|| invalid_schema(&format!("/{}", key), "type", "must be an unsigned integer"))
}

impl DataContract {
    /// Lowers a raw contract into its typed form.
    ///
    /// The raw form is expected to have passed the contract meta-schema already; any
    /// remaining shape problem is reported as the first offending [`BasicError`].
    pub fn from_value(raw: &Value) -> Result<Self, BasicError> {
        let root = raw
            .as_object()
            .ok_or_else(|| invalid_schema("", "type", "data contract must be an object"))?;

        let schema = required(root, SCHEMA_PROPERTY)?
            .as_str()
            .ok_or_else(|| invalid_schema("/$schema", "type", "must be a string"))?
            .to_string();

        let mut defs = BTreeMap::new();
        if let Some(raw_defs) = root.get(DEFS_PROPERTY) {
            let raw_defs = raw_defs
                .as_object()
                .ok_or_else(|| invalid_schema("/$defs", "type", "must be an object"))?;
            for (name, fragment) in raw_defs {
                let node = SchemaNode::parse(fragment).map_err(|e| {
                    invalid_schema(&format!("/$defs/{}{}", name, e.path), &e.keyword, e.message)
                })?;
                defs.insert(
                    name.clone(),
                    SchemaDefinition {
                        raw: fragment.clone(),
                        node,
                    },
                );
            }
        }

        let raw_documents = required(root, DOCUMENTS_PROPERTY)?
            .as_object()
            .ok_or_else(|| invalid_schema("/documents", "type", "must be an object"))?;
        let mut documents = BTreeMap::new();
        for (name, doc_schema) in raw_documents {
            documents.insert(name.clone(), DocumentType::from_value(name, doc_schema)?);
        }

        Ok(Self {
            protocol_version: uint(root, PROTOCOL_VERSION_PROPERTY)?,
            schema,
            id: identifier(root, ID_PROPERTY)?,
            owner_id: identifier(root, OWNER_ID_PROPERTY)?,
            version: uint(root, VERSION_PROPERTY)?,
            documents,
            defs,
            raw: raw.clone(),
        })
    }

    /// The raw JSON this contract was parsed from.
    pub fn as_value(&self) -> &Value {
        &self.raw
    }

    /// Looks up a document type.
    pub fn document_type(&self, name: &str) -> Option<&DocumentType> {
        self.documents.get(name)
    }

    /// Typed `$defs`, as needed for resolving references.
    pub fn def_nodes(&self) -> BTreeMap<String, SchemaNode> {
        self.defs
            .iter()
            .map(|(name, def)| (name.clone(), def.node.clone()))
            .collect()
    }

    /// A self-contained JSON schema for one document type, with `$defs` attached
    /// so that local references resolve.
    pub fn document_json_schema(&self, name: &str) -> Option<Value> {
        let doc = self.documents.get(name)?;
        let mut schema = doc.raw_schema.clone();
        if let (Some(obj), Some(defs)) = (schema.as_object_mut(), self.raw.get(DEFS_PROPERTY)) {
            obj.insert(DEFS_PROPERTY.to_string(), defs.clone());
        }
        Some(schema)
    }

    /// The raw contract with the mutable parts (`$defs`, `documents`, `version`) removed.
    pub fn base_data(raw: &Value) -> Value {
        let mut base = raw.clone();
        if let Some(obj) = base.as_object_mut() {
            obj.remove(DEFS_PROPERTY);
            obj.remove(DOCUMENTS_PROPERTY);
            obj.remove(VERSION_PROPERTY);
        }
        base
    }
}

impl DocumentType {
    /// Parses one entry of the contract's `documents` map.
    pub fn from_value(name: &str, raw: &Value) -> Result<Self, BasicError> {
        let path = format!("/documents/{}", name);
        let mut raw_schema = raw.clone();
        let indices = match raw_schema.as_object_mut() {
            Some(obj) => match obj.remove(INDICES_PROPERTY) {
                Some(indices) => serde_json::from_value::<Vec<Index>>(indices).map_err(|e| {
                    invalid_schema(&format!("{}/indices", path), "indices", e.to_string())
                })?,
                None => Vec::new(),
            },
            None => return Err(invalid_schema(&path, "type", "document schema must be an object")),
        };

        let schema = match SchemaNode::parse(&raw_schema) {
            Ok(SchemaNode::Object(obj)) => obj,
            Ok(other) => {
                return Err(invalid_schema(
                    &path,
                    "type",
                    format!("document schema must be an object, got {}", other.type_name()),
                ))
            }
            Err(e) => {
                return Err(invalid_schema(
                    &format!("{}{}", path, e.path),
                    &e.keyword,
                    e.message,
                ))
            }
        };

        Ok(Self {
            name: name.to_string(),
            raw_schema,
            schema,
            indices,
        })
    }

    /// Declared indices that span more than one property and require uniqueness.
    pub fn compound_unique_indices(&self) -> impl Iterator<Item = &Index> {
        self.indices.iter().filter(|i| i.unique && i.is_compound())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw_contract() -> Value {
        json!({
            "protocolVersion": 1,
            "$schema": "https://schema.platform.org/meta/data-contract",
            "$id": vec![1u8; 32],
            "ownerId": vec![2u8; 32],
            "version": 1,
            "documents": {
                "profile": {
                    "type": "object",
                    "indices": [
                        {
                            "name": "ownerName",
                            "properties": [{ "$ownerId": "asc" }, { "displayName": "desc" }],
                            "unique": true
                        }
                    ],
                    "properties": {
                        "displayName": { "type": "string", "maxLength": 25 },
                        "address": { "$ref": "#/$defs/address" }
                    },
                    "additionalProperties": false
                }
            },
            "$defs": {
                "address": {
                    "type": "object",
                    "properties": { "city": { "type": "string", "maxLength": 40 } },
                    "additionalProperties": false
                }
            }
        })
    }

    #[test]
    fn parses_documents_indices_and_defs() {
        let contract = DataContract::from_value(&raw_contract()).unwrap();
        assert_eq!(contract.version, 1);
        assert_eq!(contract.owner_id, Identifier([2u8; 32]));

        let profile = contract.document_type("profile").unwrap();
        assert!(profile.raw_schema.get("indices").is_none());
        assert_eq!(profile.indices.len(), 1);
        assert_eq!(
            profile.indices[0].property_names(),
            vec!["$ownerId".to_string(), "displayName".to_string()]
        );
        assert_eq!(profile.compound_unique_indices().count(), 1);
        assert!(contract.defs.contains_key("address"));

        let schema = contract.document_json_schema("profile").unwrap();
        assert!(schema.get("$defs").is_some());
    }

    #[test]
    fn bad_identifier_is_reported() {
        let mut raw = raw_contract();
        raw["ownerId"] = json!([1, 2, 3]);
        let err = DataContract::from_value(&raw).unwrap_err();
        assert!(matches!(err, BasicError::InvalidIdentifierError { .. }));
    }

    #[test]
    fn base_data_drops_mutable_parts() {
        let base = DataContract::base_data(&raw_contract());
        let obj = base.as_object().unwrap();
        assert!(obj.contains_key("ownerId"));
        assert!(!obj.contains_key("documents"));
        assert!(!obj.contains_key("$defs"));
        assert!(!obj.contains_key("version"));
    }

    #[test]
    fn index_property_needs_single_entry() {
        let err = serde_json::from_value::<IndexProperty>(json!({ "a": "asc", "b": "asc" }));
        assert!(err.is_err());
    }
}
