//! Payload extraction and record serialization for a DRF-style backend.
//!
//! Responses are flat: a single record is a bare object, a collection is
//! either a bare array or `{"results": [...], "next": ...}`. Nothing is ever
//! sideloaded, so every representation maps to exactly one reference.

use serde_json::{Map, Value as JsonValue};

use restmap_store::{
    ClientId, Loader, Record, RecordData, Reference, RelationKind, RelationValue, TypeDescriptor,
};

use crate::serializer::RestSerializer;
use crate::transform::{ArrayTransform, Transform, TransformRegistry};
use crate::Error;

const RESULTS_KEY: &str = "results";

/// Default key carrying the pagination cursor.
pub const DEFAULT_SINCE_KEY: &str = "next";

/// Options for [`RecordTranslator::serialize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Emit the record's id. Only set for creates.
    pub include_id: bool,
}

/// Converts between wire payloads and store records.
#[derive(Debug, Clone)]
pub struct RecordTranslator {
    base: RestSerializer,
    since_key: String,
}

impl Default for RecordTranslator {
    fn default() -> Self {
        Self::new(TransformRegistry::with_defaults(), DEFAULT_SINCE_KEY)
    }
}

impl RecordTranslator {
    /// Build a translator over `transforms`, adding the `array` transform.
    pub fn new(transforms: TransformRegistry, since_key: impl Into<String>) -> Self {
        let mut base = RestSerializer::new(transforms);
        base.register_transform("array", ArrayTransform);
        Self {
            base,
            since_key: since_key.into(),
        }
    }

    pub fn base(&self) -> &RestSerializer {
        &self.base
    }

    pub fn register_transform(&mut self, kind: impl Into<String>, transform: impl Transform + 'static) {
        self.base.register_transform(kind, transform);
    }

    pub fn since_key(&self) -> &str {
        &self.since_key
    }

    /// Extract one record from a payload.
    ///
    /// An absent or null payload is a no-op. When `record` is given the
    /// representation is materialized into that record, taking its server id
    /// from the payload if there is one.
    pub fn extract<L: Loader + ?Sized>(
        &self,
        loader: &mut L,
        payload: Option<&JsonValue>,
        type_: &TypeDescriptor,
        record: Option<ClientId>,
    ) -> Result<Option<Reference>, Error> {
        let Some(payload) = payload.filter(|p| !p.is_null()) else {
            return Ok(None);
        };

        self.extract_meta(loader, type_, payload);

        self.extract_record_representation(loader, type_, payload, record)
            .map(Some)
    }

    /// Extract a collection from a payload.
    ///
    /// The representations are `payload.results` when present, otherwise the
    /// payload itself if it is an array. An empty object or empty bare array
    /// extracts nothing and registers no result set. When `records` is given,
    /// representation `i` is materialized into `records[i]`; a length
    /// mismatch is rejected before anything is loaded.
    pub fn extract_many<L: Loader + ?Sized>(
        &self,
        loader: &mut L,
        payload: Option<&JsonValue>,
        type_: &TypeDescriptor,
        records: Option<&[ClientId]>,
    ) -> Result<Vec<Reference>, Error> {
        let Some(payload) = payload else {
            return Ok(Vec::new());
        };

        self.extract_meta(loader, type_, payload);

        let representations: &[JsonValue] = match payload {
            JsonValue::Null => return Ok(Vec::new()),
            JsonValue::Array(items) if items.is_empty() => return Ok(Vec::new()),
            JsonValue::Array(items) => items.as_slice(),
            JsonValue::Object(map) => match map.get(RESULTS_KEY) {
                Some(JsonValue::Array(results)) => results.as_slice(),
                Some(other) if !other.is_null() => {
                    return Err(Error::malformed(format!(
                        "'{}' must be an array, got {}",
                        RESULTS_KEY, other
                    )));
                }
                _ if map.is_empty() => return Ok(Vec::new()),
                _ => {
                    log::warn!(
                        "{} collection payload has no '{}' list; treating it as an empty page",
                        type_.name(),
                        RESULTS_KEY
                    );
                    &[]
                }
            },
            other => {
                return Err(Error::malformed(format!(
                    "expected a list of {} records, got {}",
                    type_.name(),
                    other
                )));
            }
        };

        if let Some(records) = records {
            if records.len() != representations.len() {
                return Err(Error::RecordCountMismatch {
                    expected: records.len(),
                    actual: representations.len(),
                });
            }
        }

        let mut references = Vec::with_capacity(representations.len());
        for (i, representation) in representations.iter().enumerate() {
            let record = records.map(|r| r[i]);
            references.push(self.extract_record_representation(
                loader,
                type_,
                representation,
                record,
            )?);
        }

        loader.populate_array(type_.name(), references.clone());
        Ok(references)
    }

    /// Hand the pagination cursor to the store if the payload carries one.
    pub fn extract_meta<L: Loader + ?Sized>(
        &self,
        loader: &mut L,
        type_: &TypeDescriptor,
        payload: &JsonValue,
    ) {
        let Some(cursor) = payload.as_object().and_then(|m| m.get(&self.since_key)) else {
            return;
        };
        let since = match cursor {
            JsonValue::Null => None,
            JsonValue::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        };
        loader.meta_for_type(type_.name(), since);
    }

    fn extract_record_representation<L: Loader + ?Sized>(
        &self,
        loader: &mut L,
        type_: &TypeDescriptor,
        representation: &JsonValue,
        record: Option<ClientId>,
    ) -> Result<Reference, Error> {
        let data = self.materialize(type_, representation)?;
        match record {
            Some(record) => Ok(loader.load_into(record, data)?),
            None => Ok(loader.load(type_.name(), data)),
        }
    }

    /// Run every attribute and relation of one representation through its
    /// transform. Read-only attributes are included.
    pub fn materialize(
        &self,
        type_: &TypeDescriptor,
        representation: &JsonValue,
    ) -> Result<RecordData, Error> {
        let Some(map) = representation.as_object() else {
            return Err(Error::malformed(format!(
                "expected a {} object, got {}",
                type_.name(),
                representation
            )));
        };

        let mut data = RecordData {
            id: self.base.extract_id(representation),
            ..Default::default()
        };

        for attribute in type_.attributes() {
            let key = self.base.key_for_attribute_name(&attribute.name);
            if let Some(wire) = map.get(&key) {
                let value = self.base.deserialize_value(wire, &attribute.kind)?;
                data.attributes.insert(attribute.name.clone(), value);
            }
        }

        for relation in type_.relations() {
            let value = match relation.kind {
                RelationKind::BelongsTo => {
                    let Some(wire) = map.get(&self.key_for_belongs_to(&relation.name)) else {
                        continue;
                    };
                    RelationValue::One(id_of(wire))
                }
                RelationKind::HasMany => {
                    let key = self.base.key_for_attribute_name(&relation.name);
                    let Some(wire) = map.get(&key) else {
                        continue;
                    };
                    let ids: Vec<String> = wire
                        .as_array()
                        .map(|items| items.iter().filter_map(id_of).collect())
                        .unwrap_or_default();
                    RelationValue::Many(ids)
                }
            };
            data.relations.insert(relation.name.clone(), value);
        }

        Ok(data)
    }

    /// `belongsTo` keys are plain attribute keys, without an `_id` suffix.
    pub fn key_for_belongs_to(&self, name: &str) -> String {
        self.base.key_for_attribute_name(name)
    }

    /// Serialize a record into a flat write payload.
    pub fn serialize(
        &self,
        record: &Record,
        type_: &TypeDescriptor,
        options: SerializeOptions,
    ) -> Result<Map<String, JsonValue>, Error> {
        let mut data = Map::new();

        if options.include_id {
            if let Some(id) = record.id() {
                self.base.add_id(&mut data, id);
            }
        }

        self.add_attributes(&mut data, record, type_)?;

        for relation in type_.relations() {
            if relation.kind == RelationKind::BelongsTo {
                let id = record
                    .belongs_to(&relation.name)
                    .map(|id| JsonValue::String(id.to_string()))
                    .unwrap_or(JsonValue::Null);
                data.insert(self.key_for_belongs_to(&relation.name), id);
            }
        }

        Ok(data)
    }

    /// Serialize only the writable attributes of a record.
    pub fn serialize_attributes(
        &self,
        record: &Record,
        type_: &TypeDescriptor,
    ) -> Result<Map<String, JsonValue>, Error> {
        let mut data = Map::new();
        self.add_attributes(&mut data, record, type_)?;
        Ok(data)
    }

    fn add_attributes(
        &self,
        data: &mut Map<String, JsonValue>,
        record: &Record,
        type_: &TypeDescriptor,
    ) -> Result<(), Error> {
        for attribute in type_.attributes() {
            if attribute.read_only {
                continue;
            }
            self.base.add_attribute(data, record, attribute)?;
        }
        Ok(())
    }
}

fn id_of(wire: &JsonValue) -> Option<String> {
    match wire {
        JsonValue::String(s) => Some(s.clone()),
        JsonValue::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use restmap_store::{AttributeDef, InMemoryStore, RecordState, Value};
    use serde_json::json;

    fn widget_type() -> TypeDescriptor {
        TypeDescriptor::new("App.Widget")
            .attribute(AttributeDef::new("name", "string"))
            .attribute(AttributeDef::new("tags", "array"))
            .attribute(AttributeDef::new("createdAt", "string").read_only())
            .belongs_to("owner", "App.User")
            .has_many("parts", "App.Part")
    }

    #[test]
    fn extract_single_yields_reference_with_payload_id() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();

        let reference = translator
            .extract(
                &mut store,
                Some(&json!({"id": 12, "name": "gear"})),
                &widget_type(),
                None,
            )
            .unwrap()
            .unwrap();

        assert_eq!(reference.id.as_deref(), Some("12"));
        let record = store.lookup("App.Widget", "12").unwrap();
        assert_eq!(record.get("name"), Some(&Value::from("gear")));
    }

    #[test]
    fn extract_absent_payload_is_noop() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();

        assert_eq!(translator.extract(&mut store, None, &widget_type(), None).unwrap(), None);
        assert_eq!(
            translator
                .extract(&mut store, Some(&JsonValue::Null), &widget_type(), None)
                .unwrap(),
            None
        );
        assert!(store.is_empty());
    }

    #[test]
    fn extract_updates_existing_record_identity() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let local = store.create_record("App.Widget", [("name", Value::from("gear"))]);

        let reference = translator
            .extract(
                &mut store,
                Some(&json!({"id": 3, "name": "gear", "created_at": "2024-01-01"})),
                &widget_type(),
                Some(local),
            )
            .unwrap()
            .unwrap();

        assert_eq!(reference.client_id, local);
        let record = store.record(local).unwrap();
        assert_eq!(record.id(), Some("3"));
        assert_eq!(record.get("createdAt"), Some(&Value::from("2024-01-01")));
        assert_eq!(record.state(), RecordState::Saved);
    }

    #[test]
    fn extract_many_keeps_results_order() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();

        let payload = json!({
            "count": 3,
            "next": null,
            "results": [{"id": 3}, {"id": 1}, {"id": 2}]
        });
        let references = translator
            .extract_many(&mut store, Some(&payload), &widget_type(), None)
            .unwrap();

        let ids: Vec<_> = references.iter().map(|r| r.id.clone().unwrap()).collect();
        assert_eq!(ids, vec!["3", "1", "2"]);
        assert_eq!(store.result_set("App.Widget").unwrap(), references.as_slice());
        assert_eq!(store.since("App.Widget"), Some(None));
    }

    #[test]
    fn extract_many_accepts_bare_array() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();

        let references = translator
            .extract_many(
                &mut store,
                Some(&json!([{"id": 1}, {"id": 2}])),
                &widget_type(),
                None,
            )
            .unwrap();

        assert_eq!(references.len(), 2);
        assert_eq!(store.since("App.Widget"), None);
    }

    #[test]
    fn extract_many_empty_object_extracts_nothing() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();

        let references = translator
            .extract_many(&mut store, Some(&json!({})), &widget_type(), None)
            .unwrap();

        assert!(references.is_empty());
        assert!(store.result_set("App.Widget").is_none());
    }

    #[test]
    fn extract_many_empty_page_still_hands_over_cursor() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();

        let references = translator
            .extract_many(
                &mut store,
                Some(&json!({"results": [], "next": "cursor123"})),
                &widget_type(),
                None,
            )
            .unwrap();

        assert!(references.is_empty());
        assert_eq!(store.since("App.Widget"), Some(Some("cursor123")));
        assert_eq!(store.result_set("App.Widget"), Some(&[][..]));
    }

    #[test]
    fn extract_many_zips_existing_records_positionally() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let a = store.create_record("App.Widget", [("name", Value::from("a"))]);
        let b = store.create_record("App.Widget", [("name", Value::from("b"))]);

        let references = translator
            .extract_many(
                &mut store,
                Some(&json!([{"id": 10, "name": "a"}, {"id": 11, "name": "b"}])),
                &widget_type(),
                Some(&[a, b]),
            )
            .unwrap();

        assert_eq!(references[0].client_id, a);
        assert_eq!(references[1].client_id, b);
        assert_eq!(store.record(b).unwrap().id(), Some("11"));
    }

    #[test]
    fn extract_into_record_without_payload_id() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let local = store.create_record("App.Widget", [("name", Value::from("gear"))]);

        let reference = translator
            .extract(
                &mut store,
                Some(&json!({"name": "server-name"})),
                &widget_type(),
                Some(local),
            )
            .unwrap()
            .unwrap();

        assert_eq!(reference.client_id, local);
        assert_eq!(store.len(), 1);
        assert_eq!(
            store.record(local).unwrap().get("name"),
            Some(&Value::from("server-name"))
        );
    }

    #[test]
    fn extract_many_zips_records_without_payload_ids() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let a = store.create_record("App.Widget", [("name", Value::from("a"))]);
        let b = store.create_record("App.Widget", [("name", Value::from("b"))]);

        let references = translator
            .extract_many(
                &mut store,
                Some(&json!([{"name": "first"}, {"name": "second"}])),
                &widget_type(),
                Some(&[a, b]),
            )
            .unwrap();

        assert_eq!(references[0].client_id, a);
        assert_eq!(references[1].client_id, b);
        assert_eq!(store.len(), 2);
        assert_eq!(store.record(a).unwrap().get("name"), Some(&Value::from("first")));
        assert_eq!(store.record(b).unwrap().get("name"), Some(&Value::from("second")));
        assert_eq!(store.result_set("App.Widget").unwrap(), references.as_slice());
    }

    #[test]
    fn extract_many_rejects_length_mismatch_before_loading() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let a = store.create_record("App.Widget", [("name", Value::from("a"))]);

        let err = translator
            .extract_many(
                &mut store,
                Some(&json!([{"id": 10}, {"id": 11}])),
                &widget_type(),
                Some(&[a]),
            )
            .unwrap_err();

        assert!(matches!(
            err,
            Error::RecordCountMismatch {
                expected: 1,
                actual: 2
            }
        ));
        assert_eq!(store.len(), 1);
        assert_eq!(store.record(a).unwrap().id(), None);
    }

    #[test]
    fn extract_many_rejects_non_list_results() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let err = translator
            .extract_many(&mut store, Some(&json!({"results": 5})), &widget_type(), None)
            .unwrap_err();
        assert!(matches!(err, Error::MalformedResponse { .. }));
    }

    #[test]
    fn read_only_attributes_load_but_are_not_written() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let ty = widget_type();

        let reference = translator
            .extract(
                &mut store,
                Some(&json!({"id": 1, "name": "gear", "created_at": "2024-05-01"})),
                &ty,
                None,
            )
            .unwrap()
            .unwrap();

        let record = store.record(reference.client_id).unwrap();
        assert_eq!(record.get("createdAt"), Some(&Value::from("2024-05-01")));

        let payload = translator
            .serialize(record, &ty, SerializeOptions::default())
            .unwrap();
        assert!(!payload.contains_key("created_at"));
        assert_eq!(payload["name"], json!("gear"));
    }

    #[test]
    fn serialize_includes_id_only_when_asked_and_present() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let ty = widget_type();
        let local = store.create_record("App.Widget", [("name", Value::from("gear"))]);

        let new_payload = translator
            .serialize(store.record(local).unwrap(), &ty, SerializeOptions { include_id: true })
            .unwrap();
        assert!(!new_payload.contains_key("id"));

        store.update_id(local, "8").unwrap();
        let record = store.record(local).unwrap();
        let with_id = translator
            .serialize(record, &ty, SerializeOptions { include_id: true })
            .unwrap();
        let without_id = translator
            .serialize(record, &ty, SerializeOptions::default())
            .unwrap();
        assert_eq!(with_id["id"], json!("8"));
        assert!(!without_id.contains_key("id"));
    }

    #[test]
    fn belongs_to_uses_plain_key() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let ty = widget_type();

        let reference = translator
            .extract(
                &mut store,
                Some(&json!({"id": 1, "owner": 44, "parts": [5, 6]})),
                &ty,
                None,
            )
            .unwrap()
            .unwrap();

        let record = store.record(reference.client_id).unwrap();
        assert_eq!(record.belongs_to("owner"), Some("44"));
        assert_eq!(
            record.relation("parts"),
            Some(&RelationValue::Many(vec!["5".to_string(), "6".to_string()]))
        );

        let payload = translator
            .serialize(record, &ty, SerializeOptions::default())
            .unwrap();
        assert_eq!(payload["owner"], json!("44"));
        assert!(!payload.contains_key("owner_id"));
        assert!(!payload.contains_key("parts"));
    }

    #[test]
    fn serialize_attributes_applies_array_transform() {
        let translator = RecordTranslator::default();
        let mut store = InMemoryStore::new();
        let ty = widget_type();
        let local = store.create_record(
            "App.Widget",
            [
                ("name", Value::from("gear")),
                ("tags", Value::from(vec!["b", "a"])),
                ("createdAt", Value::from("ignored")),
            ],
        );

        let data = translator
            .serialize_attributes(store.record(local).unwrap(), &ty)
            .unwrap();

        assert_eq!(
            JsonValue::Object(data),
            json!({"name": "gear", "tags": ["b", "a"]})
        );
    }

    #[test]
    fn custom_since_key() {
        let translator = RecordTranslator::new(TransformRegistry::with_defaults(), "cursor");
        let mut store = InMemoryStore::new();

        translator
            .extract_many(
                &mut store,
                Some(&json!({"results": [], "cursor": 42, "next": "ignored"})),
                &widget_type(),
                None,
            )
            .unwrap();

        assert_eq!(store.since("App.Widget"), Some(Some("42")));
    }
}
