//! The store mutation interface the adapter drives.

use crate::{ClientId, Error, Record, RecordData, Reference};

/// Entry points a record store exposes to the adapter.
///
/// These are the only ways the adapter touches store state. Every call made
/// while handling one response happens under a single lock on the store, so
/// implementations never observe a half-applied response.
///
/// # Object Safety
///
/// This trait is object-safe: you can use `Box<dyn Loader>`.
pub trait Loader: Send {
    /// Look up a record by its store-local id.
    fn record(&self, record: ClientId) -> Option<&Record>;

    /// Assign the server id of an existing record.
    fn update_id(&mut self, record: ClientId, id: &str) -> Result<(), Error>;

    /// Materialize or update the record described by `data`.
    fn load(&mut self, type_name: &str, data: RecordData) -> Reference;

    /// Materialize `data` into an existing record.
    ///
    /// The record keeps its store-local identity whether or not `data`
    /// carries a server id; when it does, the id is assigned first as with
    /// [`update_id`](Loader::update_id).
    fn load_into(&mut self, record: ClientId, data: RecordData) -> Result<Reference, Error>;

    /// Register an ordered result set for a type.
    fn populate_array(&mut self, type_name: &str, references: Vec<Reference>);

    /// Record the pagination cursor for a type. `None` means the collection
    /// is exhausted.
    fn meta_for_type(&mut self, type_name: &str, since: Option<String>);

    /// The backend rejected a write with validation errors.
    fn record_was_invalid(&mut self, record: ClientId, errors: serde_json::Value);

    /// A write failed for a reason other than validation.
    fn record_was_error(&mut self, record: ClientId);

    fn did_create_record(&mut self, record: ClientId);

    fn did_save_record(&mut self, record: ClientId);

    fn did_delete_record(&mut self, record: ClientId);
}

impl<T: Loader + ?Sized> Loader for Box<T> {
    fn record(&self, record: ClientId) -> Option<&Record> {
        self.as_ref().record(record)
    }

    fn update_id(&mut self, record: ClientId, id: &str) -> Result<(), Error> {
        self.as_mut().update_id(record, id)
    }

    fn load(&mut self, type_name: &str, data: RecordData) -> Reference {
        self.as_mut().load(type_name, data)
    }

    fn load_into(&mut self, record: ClientId, data: RecordData) -> Result<Reference, Error> {
        self.as_mut().load_into(record, data)
    }

    fn populate_array(&mut self, type_name: &str, references: Vec<Reference>) {
        self.as_mut().populate_array(type_name, references)
    }

    fn meta_for_type(&mut self, type_name: &str, since: Option<String>) {
        self.as_mut().meta_for_type(type_name, since)
    }

    fn record_was_invalid(&mut self, record: ClientId, errors: serde_json::Value) {
        self.as_mut().record_was_invalid(record, errors)
    }

    fn record_was_error(&mut self, record: ClientId) {
        self.as_mut().record_was_error(record)
    }

    fn did_create_record(&mut self, record: ClientId) {
        self.as_mut().did_create_record(record)
    }

    fn did_save_record(&mut self, record: ClientId) {
        self.as_mut().did_save_record(record)
    }

    fn did_delete_record(&mut self, record: ClientId) {
        self.as_mut().did_delete_record(record)
    }
}
