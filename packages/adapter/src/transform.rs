//! Wire <-> in-memory conversions, one per attribute type.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use restmap_store::Value;

use crate::Error;

/// A bidirectional conversion for one attribute type.
pub trait Transform: Send + Sync {
    /// Wire value to in-memory value.
    fn deserialize(&self, serialized: &JsonValue) -> Value;

    /// In-memory value to wire value.
    fn serialize(&self, deserialized: &Value) -> JsonValue;
}

pub struct StringTransform;

impl Transform for StringTransform {
    fn deserialize(&self, serialized: &JsonValue) -> Value {
        match serialized {
            JsonValue::Null => Value::Null,
            JsonValue::String(s) => Value::String(s.clone()),
            other => Value::String(other.to_string()),
        }
    }

    fn serialize(&self, deserialized: &Value) -> JsonValue {
        match deserialized {
            Value::Null => JsonValue::Null,
            Value::String(s) => JsonValue::String(s.clone()),
            other => JsonValue::String(other.to_json().to_string()),
        }
    }
}

pub struct NumberTransform;

impl NumberTransform {
    fn parse(s: &str) -> Value {
        let s = s.trim();
        if let Ok(i) = s.parse::<i64>() {
            Value::Integer(i)
        } else if let Ok(u) = s.parse::<u64>() {
            Value::UInt(u)
        } else if let Ok(f) = s.parse::<f64>() {
            Value::Float(f)
        } else {
            Value::Null
        }
    }
}

impl Transform for NumberTransform {
    fn deserialize(&self, serialized: &JsonValue) -> Value {
        match serialized {
            JsonValue::Number(_) => Value::from_json(serialized),
            JsonValue::String(s) => Self::parse(s),
            JsonValue::Bool(b) => Value::Integer(i64::from(*b)),
            _ => Value::Null,
        }
    }

    fn serialize(&self, deserialized: &Value) -> JsonValue {
        match deserialized {
            Value::Integer(_) | Value::UInt(_) | Value::Float(_) => deserialized.to_json(),
            Value::String(s) => Self::parse(s).to_json(),
            Value::Bool(b) => JsonValue::from(i64::from(*b)),
            _ => JsonValue::Null,
        }
    }
}

pub struct BooleanTransform;

impl BooleanTransform {
    fn truthy(value: &Value) -> bool {
        match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Integer(i) => *i == 1,
            Value::UInt(_) => false,
            Value::Float(f) => *f == 1.0,
            Value::String(s) => matches!(s.to_ascii_lowercase().as_str(), "true" | "t" | "1"),
            Value::Array(_) | Value::Map(_) => true,
        }
    }
}

impl Transform for BooleanTransform {
    fn deserialize(&self, serialized: &JsonValue) -> Value {
        Value::Bool(Self::truthy(&Value::from_json(serialized)))
    }

    fn serialize(&self, deserialized: &Value) -> JsonValue {
        JsonValue::Bool(Self::truthy(deserialized))
    }
}

/// Plain JSON sequences on the wire, growable `Value::Array` in memory.
///
/// Null stays null in both directions. A scalar is treated as a one-element
/// sequence.
pub struct ArrayTransform;

impl Transform for ArrayTransform {
    fn deserialize(&self, serialized: &JsonValue) -> Value {
        match serialized {
            JsonValue::Null => Value::Null,
            JsonValue::Array(items) => Value::Array(items.iter().map(Value::from_json).collect()),
            other => Value::Array(vec![Value::from_json(other)]),
        }
    }

    fn serialize(&self, deserialized: &Value) -> JsonValue {
        match deserialized {
            Value::Null => JsonValue::Null,
            Value::Array(items) => JsonValue::Array(items.iter().map(Value::to_json).collect()),
            other => JsonValue::Array(vec![other.to_json()]),
        }
    }
}

/// Transforms by attribute type name.
#[derive(Clone, Default)]
pub struct TransformRegistry {
    transforms: BTreeMap<String, Arc<dyn Transform>>,
}

impl TransformRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The base transforms: `string`, `number` and `boolean`.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("string", StringTransform);
        registry.register("number", NumberTransform);
        registry.register("boolean", BooleanTransform);
        registry
    }

    /// Register (or replace) the transform for an attribute type.
    pub fn register(&mut self, kind: impl Into<String>, transform: impl Transform + 'static) {
        self.transforms.insert(kind.into(), Arc::new(transform));
    }

    pub fn get(&self, kind: &str) -> Result<&dyn Transform, Error> {
        self.transforms
            .get(kind)
            .map(|t| t.as_ref())
            .ok_or_else(|| Error::UnknownTransform {
                kind: kind.to_string(),
            })
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.transforms.contains_key(kind)
    }
}

impl std::fmt::Debug for TransformRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.transforms.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn array_round_trip_preserves_order() {
        let cases = [
            Value::from(vec!["b", "a", "c"]),
            Value::array(),
            Value::Null,
            Value::Array(vec![Value::Integer(3), Value::from("x"), Value::Bool(false)]),
            Value::Array(vec![
                Value::UInt(u64::MAX),
                Value::Integer(9_007_199_254_740_993),
                Value::Integer(i64::MIN),
                Value::Float(0.5),
            ]),
        ];

        for original in cases {
            let wire = ArrayTransform.serialize(&original);
            assert_eq!(ArrayTransform.deserialize(&wire), original);
        }
    }

    #[test]
    fn array_keeps_large_integers_exact() {
        let wire = json!([18446744073709551615u64, 9007199254740993i64]);
        let value = ArrayTransform.deserialize(&wire);
        assert_eq!(
            value,
            Value::Array(vec![Value::UInt(u64::MAX), Value::Integer(9_007_199_254_740_993)])
        );
        assert_eq!(ArrayTransform.serialize(&value), wire);
    }

    #[test]
    fn array_null_maps_to_null() {
        assert_eq!(ArrayTransform.deserialize(&JsonValue::Null), Value::Null);
        assert_eq!(ArrayTransform.serialize(&Value::Null), JsonValue::Null);
    }

    #[test]
    fn array_deserializes_into_mutable_container() {
        let mut value = ArrayTransform.deserialize(&json!(["red"]));
        value.as_array_mut().unwrap().push(Value::from("blue"));
        assert_eq!(ArrayTransform.serialize(&value), json!(["red", "blue"]));
    }

    #[test]
    fn array_wraps_scalars() {
        assert_eq!(
            ArrayTransform.deserialize(&json!("solo")),
            Value::from(vec!["solo"])
        );
    }

    #[test]
    fn number_parses_strings() {
        assert_eq!(NumberTransform.deserialize(&json!("12")), Value::Integer(12));
        assert_eq!(NumberTransform.deserialize(&json!("1.5")), Value::Float(1.5));
        assert_eq!(NumberTransform.deserialize(&json!("")), Value::Null);
        assert_eq!(NumberTransform.serialize(&Value::Integer(7)), json!(7));
        assert_eq!(
            NumberTransform.deserialize(&json!("18446744073709551615")),
            Value::UInt(u64::MAX)
        );
    }

    #[test]
    fn boolean_accepts_common_spellings() {
        for truthy in [json!(true), json!("true"), json!("T"), json!("1"), json!(1)] {
            assert_eq!(BooleanTransform.deserialize(&truthy), Value::Bool(true));
        }
        for falsy in [json!(false), json!("no"), json!(0), JsonValue::Null] {
            assert_eq!(BooleanTransform.deserialize(&falsy), Value::Bool(false));
        }
    }

    #[test]
    fn string_stringifies_numbers() {
        assert_eq!(StringTransform.deserialize(&json!(5)), Value::from("5"));
        assert_eq!(StringTransform.serialize(&Value::Null), JsonValue::Null);
    }

    #[test]
    fn registry_reports_unknown_types() {
        let registry = TransformRegistry::with_defaults();
        assert!(registry.contains("string"));
        assert!(!registry.contains("array"));
        assert!(matches!(
            registry.get("date"),
            Err(Error::UnknownTransform { kind }) if kind == "date"
        ));
    }
}
