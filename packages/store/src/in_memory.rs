//! In-memory record store.

use std::collections::{BTreeMap, HashMap};

use crate::{ClientId, Error, Loader, Record, RecordData, RecordState, Reference, Value};

/// A record store held entirely in memory.
///
/// Keeps an identity map from `(type, id)` to the store-local record, the
/// latest result set per type and the latest pagination cursor per type.
///
/// # Example
///
/// ```rust
/// use restmap_store::{InMemoryStore, Loader, RecordState};
///
/// let mut store = InMemoryStore::new();
/// let widget = store.create_record("App.Widget", [("name", "gear".into())]);
///
/// assert_eq!(store.record(widget).unwrap().state(), RecordState::New);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    next_client_id: u64,
    records: BTreeMap<ClientId, Record>,
    identity: HashMap<(String, String), ClientId>,
    result_sets: HashMap<String, Vec<Reference>>,
    since: HashMap<String, Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn allocate(&mut self) -> ClientId {
        self.next_client_id += 1;
        ClientId(self.next_client_id)
    }

    /// Create a new, unsaved record with the given attributes.
    pub fn create_record<K, I>(&mut self, type_name: &str, attributes: I) -> ClientId
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let client_id = self.allocate();
        let mut record = Record::new(client_id, type_name);
        for (name, value) in attributes {
            record.set(name, value);
        }
        self.records.insert(client_id, record);
        client_id
    }

    pub fn record_mut(&mut self, record: ClientId) -> Option<&mut Record> {
        self.records.get_mut(&record)
    }

    /// Find a loaded record by type and server id.
    pub fn lookup(&self, type_name: &str, id: &str) -> Option<&Record> {
        let client_id = self
            .identity
            .get(&(type_name.to_string(), id.to_string()))?;
        self.records.get(client_id)
    }

    /// The last result set registered for a type.
    pub fn result_set(&self, type_name: &str) -> Option<&[Reference]> {
        self.result_sets.get(type_name).map(Vec::as_slice)
    }

    /// The last pagination cursor registered for a type.
    ///
    /// `None` if no metadata was ever seen, `Some(None)` if the backend said
    /// there is no next page.
    pub fn since(&self, type_name: &str) -> Option<Option<&str>> {
        self.since.get(type_name).map(Option::as_deref)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn set_state(&mut self, record: ClientId, state: RecordState) {
        match self.records.get_mut(&record) {
            Some(r) => r.set_state(state),
            None => log::warn!("Ignoring state change to {:?} for unknown record {}", state, record),
        }
    }
}

impl Loader for InMemoryStore {
    fn record(&self, record: ClientId) -> Option<&Record> {
        self.records.get(&record)
    }

    fn update_id(&mut self, record: ClientId, id: &str) -> Result<(), Error> {
        let target = self
            .records
            .get_mut(&record)
            .ok_or(Error::UnknownRecord(record))?;
        let key = (target.type_name().to_string(), id.to_string());

        match self.identity.get(&key).copied() {
            Some(existing) if existing != record => Err(Error::IdConflict {
                type_name: key.0,
                id: key.1,
                record,
                existing,
            }),
            _ => {
                if let Some(previous) = target.id().filter(|previous| *previous != id) {
                    self.identity
                        .remove(&(key.0.clone(), previous.to_string()));
                }
                target.set_id(id);
                self.identity.insert(key, record);
                Ok(())
            }
        }
    }

    fn load(&mut self, type_name: &str, data: RecordData) -> Reference {
        let existing = data
            .id
            .as_ref()
            .and_then(|id| self.identity.get(&(type_name.to_string(), id.clone())))
            .copied();

        let client_id = match existing {
            Some(client_id) => client_id,
            None => {
                let client_id = self.allocate();
                self.records
                    .insert(client_id, Record::new(client_id, type_name));
                if let Some(id) = &data.id {
                    self.identity
                        .insert((type_name.to_string(), id.clone()), client_id);
                }
                client_id
            }
        };

        let id = data.id.clone();
        if let Some(record) = self.records.get_mut(&client_id) {
            record.materialize(data);
        }
        Reference::new(type_name, id, client_id)
    }

    fn load_into(&mut self, record: ClientId, data: RecordData) -> Result<Reference, Error> {
        if let Some(id) = &data.id {
            self.update_id(record, id)?;
        }
        let target = self
            .records
            .get_mut(&record)
            .ok_or(Error::UnknownRecord(record))?;
        target.materialize(data);
        Ok(Reference::new(
            target.type_name(),
            target.id().map(str::to_owned),
            record,
        ))
    }

    fn populate_array(&mut self, type_name: &str, references: Vec<Reference>) {
        log::debug!("Loaded {} {} records", references.len(), type_name);
        self.result_sets.insert(type_name.to_string(), references);
    }

    fn meta_for_type(&mut self, type_name: &str, since: Option<String>) {
        self.since.insert(type_name.to_string(), since);
    }

    fn record_was_invalid(&mut self, record: ClientId, errors: serde_json::Value) {
        if let Some(r) = self.records.get_mut(&record) {
            r.set_errors(Some(errors));
        }
        self.set_state(record, RecordState::Invalid);
    }

    fn record_was_error(&mut self, record: ClientId) {
        self.set_state(record, RecordState::Error);
    }

    fn did_create_record(&mut self, record: ClientId) {
        self.did_save_record(record);
    }

    fn did_save_record(&mut self, record: ClientId) {
        if let Some(r) = self.records.get_mut(&record) {
            r.set_errors(None);
        }
        self.set_state(record, RecordState::Saved);
    }

    fn did_delete_record(&mut self, record: ClientId) {
        if let Some(r) = self.records.get(&record) {
            if let Some(id) = r.id() {
                self.identity
                    .remove(&(r.type_name().to_string(), id.to_string()));
            }
        }
        self.set_state(record, RecordState::Deleted);
    }
}
