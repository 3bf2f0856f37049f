//! Records and the data extracted for them.

use std::collections::BTreeMap;
use std::fmt;

use crate::Value;

/// Store-local identity of a record. Assigned on creation, stable for the
/// lifetime of the store, independent of the server id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(pub u64);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle state of a record as seen by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordState {
    /// Created locally, never saved.
    New,
    /// Matches the last state acknowledged by the backend.
    Saved,
    /// Modified locally since the last save or load.
    Dirty,
    /// The backend rejected the last write with validation errors.
    Invalid,
    /// The last write failed for any other reason.
    Error,
    Deleted,
}

/// The value of a relation on a record: related ids, never related records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationValue {
    One(Option<String>),
    Many(Vec<String>),
}

/// Attributes and relations materialized from one record representation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordData {
    pub id: Option<String>,
    pub attributes: BTreeMap<String, Value>,
    pub relations: BTreeMap<String, RelationValue>,
}

/// An application record owned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    client_id: ClientId,
    type_name: String,
    id: Option<String>,
    url: Option<String>,
    attributes: BTreeMap<String, Value>,
    relations: BTreeMap<String, RelationValue>,
    state: RecordState,
    errors: Option<serde_json::Value>,
}

impl Record {
    pub fn new(client_id: ClientId, type_name: impl Into<String>) -> Self {
        Self {
            client_id,
            type_name: type_name.into(),
            id: None,
            url: None,
            attributes: BTreeMap::new(),
            relations: BTreeMap::new(),
            state: RecordState::New,
            errors: None,
        }
    }

    pub fn client_id(&self) -> ClientId {
        self.client_id
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Server-assigned id, absent until the first successful save.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// Resource path set on this instance only.
    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.url = Some(url.into());
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Mutable access to an attribute. Marks a saved record dirty.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
        let value = self.attributes.get_mut(name)?;
        if self.state != RecordState::New {
            self.state = RecordState::Dirty;
        }
        Some(value)
    }

    /// Set an attribute. Marks a saved record dirty.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.attributes.insert(name.into(), value.into());
        if self.state != RecordState::New {
            self.state = RecordState::Dirty;
        }
    }

    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }

    pub fn relation(&self, name: &str) -> Option<&RelationValue> {
        self.relations.get(name)
    }

    /// Id of the record a `belongsTo` relation points at.
    pub fn belongs_to(&self, name: &str) -> Option<&str> {
        match self.relations.get(name) {
            Some(RelationValue::One(id)) => id.as_deref(),
            _ => None,
        }
    }

    pub fn set_belongs_to(&mut self, name: impl Into<String>, id: Option<String>) {
        self.relations.insert(name.into(), RelationValue::One(id));
        if self.state != RecordState::New {
            self.state = RecordState::Dirty;
        }
    }

    pub fn state(&self) -> RecordState {
        self.state
    }

    pub fn set_state(&mut self, state: RecordState) {
        self.state = state;
    }

    pub fn is_dirty(&self) -> bool {
        matches!(self.state, RecordState::New | RecordState::Dirty)
    }

    /// Validation errors from the last rejected write, verbatim from the backend.
    pub fn errors(&self) -> Option<&serde_json::Value> {
        self.errors.as_ref()
    }

    pub fn set_errors(&mut self, errors: Option<serde_json::Value>) {
        self.errors = errors;
    }

    /// Merge extracted data into this record and mark it saved.
    pub fn materialize(&mut self, data: RecordData) {
        if let Some(id) = data.id {
            self.id = Some(id);
        }
        self.attributes.extend(data.attributes);
        self.relations.extend(data.relations);
        self.state = RecordState::Saved;
        self.errors = None;
    }
}
