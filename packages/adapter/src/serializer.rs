//! The generic REST serializer the convention translator builds on.
//!
//! Owns the transform registry and the key naming rules. It knows nothing
//! about result envelopes, pagination or read-only attributes.

use serde_json::{Map, Value as JsonValue};

use restmap_store::{AttributeDef, Record, Value};

use crate::transform::{Transform, TransformRegistry};
use crate::Error;

const PRIMARY_KEY: &str = "id";

#[derive(Debug, Clone)]
pub struct RestSerializer {
    transforms: TransformRegistry,
}

impl Default for RestSerializer {
    fn default() -> Self {
        Self::new(TransformRegistry::with_defaults())
    }
}

impl RestSerializer {
    pub fn new(transforms: TransformRegistry) -> Self {
        Self { transforms }
    }

    pub fn transforms(&self) -> &TransformRegistry {
        &self.transforms
    }

    pub fn register_transform(&mut self, kind: impl Into<String>, transform: impl Transform + 'static) {
        self.transforms.register(kind, transform);
    }

    pub fn primary_key(&self) -> &'static str {
        PRIMARY_KEY
    }

    /// Wire key for an attribute: `firstName` becomes `first_name`.
    pub fn key_for_attribute_name(&self, name: &str) -> String {
        decamelize(name)
    }

    /// The id carried by a representation, stringified if numeric.
    pub fn extract_id(&self, representation: &JsonValue) -> Option<String> {
        match representation.get(PRIMARY_KEY)? {
            JsonValue::String(s) => Some(s.clone()),
            JsonValue::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn add_id(&self, data: &mut Map<String, JsonValue>, id: &str) {
        data.insert(PRIMARY_KEY.to_string(), JsonValue::String(id.to_string()));
    }

    pub fn serialize_value(&self, value: &Value, kind: &str) -> Result<JsonValue, Error> {
        Ok(self.transforms.get(kind)?.serialize(value))
    }

    pub fn deserialize_value(&self, value: &JsonValue, kind: &str) -> Result<Value, Error> {
        Ok(self.transforms.get(kind)?.deserialize(value))
    }

    /// Write one attribute of `record` into `data`. Unset attributes go out as
    /// the transform's view of null.
    pub fn add_attribute(
        &self,
        data: &mut Map<String, JsonValue>,
        record: &Record,
        attribute: &AttributeDef,
    ) -> Result<(), Error> {
        let value = record.get(&attribute.name).unwrap_or(&Value::Null);
        let wire = self.serialize_value(value, &attribute.kind)?;
        data.insert(self.key_for_attribute_name(&attribute.name), wire);
        Ok(())
    }
}

fn decamelize(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut prev_lower_or_digit = false;
    for c in name.chars() {
        if c.is_uppercase() && prev_lower_or_digit {
            out.push('_');
        }
        prev_lower_or_digit = c.is_lowercase() || c.is_ascii_digit();
        out.extend(c.to_lowercase());
    }
    out
}
