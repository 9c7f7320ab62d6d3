// Path: crates/types/src/codec.rs

//! Defines the canonical, deterministic binary codec for all consensus-critical data.
//!
//! Typed values go through `parity-scale-codec` (SCALE) directly. Loosely-typed JSON
//! trees (raw data contracts, schema fragments) are first lowered into a
//! [`CanonicalValue`], whose maps are ordered, so two semantically equal trees always
//! produce the same bytes no matter in which order their properties were inserted.
//! Byte-exact comparisons between "before" and "after" contract snapshots rely on this.

use parity_scale_codec::{Decode, DecodeAll, Encode, Input, Output};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Encodes a value into a deterministic, canonical byte representation using SCALE codec.
///
/// This function should be used for all data that is included in a hash for signing
/// or compared byte-for-byte during consensus validation.
pub fn to_bytes_canonical<T: Encode>(v: &T) -> Result<Vec<u8>, String> {
    Ok(v.encode())
}

/// Decodes a value from a canonical byte representation using SCALE codec.
///
/// This function fails fast on any decoding error, returning a descriptive string.
pub fn from_bytes_canonical<T: Decode>(b: &[u8]) -> Result<T, String> {
    T::decode_all(&mut &*b).map_err(|e| format!("canonical decode failed: {}", e))
}

/// An order-independent mirror of a JSON value tree.
///
/// Floats are carried as their IEEE-754 bit pattern because SCALE has no float encoding.
#[derive(Encode, Decode, Debug, Clone, PartialEq)]
pub enum CanonicalValue {
    /// JSON `null`.
    Null,
    /// JSON boolean.
    Bool(bool),
    /// A non-negative integer.
    U64(u64),
    /// A negative integer.
    I64(i64),
    /// A floating point number, stored as `f64::to_bits`.
    F64(u64),
    /// A string.
    Text(String),
    /// An ordered array.
    Array(Vec<CanonicalValue>),
    /// An object with lexicographically ordered keys.
    Map(BTreeMap<String, CanonicalValue>),
}

impl From<&Value> for CanonicalValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => {
                if let Some(u) = n.as_u64() {
                    Self::U64(u)
                } else if let Some(i) = n.as_i64() {
                    Self::I64(i)
                } else {
                    Self::F64(n.as_f64().unwrap_or(f64::NAN).to_bits())
                }
            }
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::Array(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<&CanonicalValue> for Value {
    fn from(value: &CanonicalValue) -> Self {
        match value {
            CanonicalValue::Null => Value::Null,
            CanonicalValue::Bool(b) => Value::Bool(*b),
            CanonicalValue::U64(u) => Value::from(*u),
            CanonicalValue::I64(i) => Value::from(*i),
            CanonicalValue::F64(bits) => serde_json::Number::from_f64(f64::from_bits(*bits))
                .map(Value::Number)
                .unwrap_or(Value::Null),
            CanonicalValue::Text(s) => Value::String(s.clone()),
            CanonicalValue::Array(items) => Value::Array(items.iter().map(Value::from).collect()),
            CanonicalValue::Map(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

/// A JSON tree embedded in a SCALE-encoded structure.
///
/// Serializes to JSON unchanged; its SCALE form is the [`CanonicalValue`] encoding, so
/// structures carrying raw contract or document data still have deterministic signable bytes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(transparent)]
pub struct CanonicalJson(pub Value);

impl CanonicalJson {
    /// Looks up a top-level property when the tree is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.as_object().and_then(|m| m.get(key))
    }

    /// Returns the inner tree.
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl From<Value> for CanonicalJson {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl Encode for CanonicalJson {
    fn encode_to<O: Output + ?Sized>(&self, dest: &mut O) {
        CanonicalValue::from(&self.0).encode_to(dest)
    }
}

impl Decode for CanonicalJson {
    fn decode<I: Input>(input: &mut I) -> Result<Self, parity_scale_codec::Error> {
        let value = CanonicalValue::decode(input)?;
        Ok(Self(Value::from(&value)))
    }
}

/// Canonically encodes a JSON value tree.
pub fn encode_value(value: &Value) -> Vec<u8> {
    CanonicalValue::from(value).encode()
}

/// Returns true if two JSON trees have byte-identical canonical encodings.
pub fn canonical_eq(a: &Value, b: &Value) -> bool {
    encode_value(a) == encode_value(b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeSet;

    #[derive(Encode, Decode, Debug, PartialEq, Eq)]
    struct TestStruct {
        id: u32,
        name: String,
        tags: Vec<u8>,
    }

    #[test]
    fn test_canonical_codec_roundtrip() {
        let original_struct = TestStruct {
            id: 42,
            name: "test-data".to_string(),
            tags: vec![1, 2, 3],
        };

        let encoded = to_bytes_canonical(&original_struct).unwrap();
        assert!(!encoded.is_empty());

        let decoded = from_bytes_canonical::<TestStruct>(&encoded).unwrap();
        assert_eq!(original_struct, decoded);

        let mut original_set = BTreeSet::new();
        original_set.insert([1u8; 32]);
        original_set.insert([2u8; 32]);

        let encoded_set = to_bytes_canonical(&original_set).unwrap();
        let decoded_set = from_bytes_canonical::<BTreeSet<[u8; 32]>>(&encoded_set).unwrap();
        assert_eq!(original_set, decoded_set);
    }

    #[test]
    fn test_canonical_decode_failure() {
        let original_struct = TestStruct {
            id: 99,
            name: "another-test".to_string(),
            tags: vec![10, 20, 30, 40, 50],
        };

        let mut encoded = to_bytes_canonical(&original_struct).unwrap();
        encoded.pop();
        encoded.pop();

        let error_msg = from_bytes_canonical::<TestStruct>(&encoded).unwrap_err();
        assert!(error_msg.contains("canonical decode failed"));
    }

    #[test]
    fn test_value_encoding_ignores_insertion_order() {
        let mut a = serde_json::Map::new();
        a.insert("ownerId".into(), json!([1, 2, 3]));
        a.insert("$schema".into(), json!("https://schema.example/v1"));
        let mut b = serde_json::Map::new();
        b.insert("$schema".into(), json!("https://schema.example/v1"));
        b.insert("ownerId".into(), json!([1, 2, 3]));

        assert_eq!(
            encode_value(&Value::Object(a)),
            encode_value(&Value::Object(b))
        );
    }

    #[test]
    fn test_canonical_json_scale_roundtrip() {
        let original = CanonicalJson(json!({"b": [1, -2, 2.5], "a": {"x": null, "y": true}}));
        let bytes = to_bytes_canonical(&original).unwrap();
        let decoded: CanonicalJson = from_bytes_canonical(&bytes).unwrap();
        assert!(canonical_eq(original.as_value(), decoded.as_value()));
        assert_eq!(decoded.get("b"), Some(&json!([1, -2, 2.5])));
    }

    #[test]
    fn test_value_encoding_distinguishes_values() {
        assert!(!canonical_eq(&json!({"a": 1}), &json!({"a": 2})));
        assert!(!canonical_eq(&json!({"a": 1}), &json!({"a": -1})));
        assert!(!canonical_eq(&json!([1, 2]), &json!([2, 1])));
        assert!(canonical_eq(&json!({"a": [1.5, "x"]}), &json!({"a": [1.5, "x"]})));
    }
}
