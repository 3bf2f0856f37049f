//! The convention adapter: URLs, network calls and outcome routing.
//!
//! Every operation follows the same shape. Under a short lock on the store,
//! read what the request needs. Issue the request without holding the lock.
//! When it settles, take the lock once more and apply the whole response
//! before releasing it.

use std::sync::{Mutex, MutexGuard};

use serde_json::Value as JsonValue;

use restmap_http::{HttpRequest, HttpResponse, Transport};
use restmap_store::{ClientId, Loader, Record, Reference, TypeDescriptor};

use crate::config::AdapterConfig;
use crate::fence::WriteFence;
use crate::naming::{self, UrlBuilder};
use crate::outcome::{CommitOutcome, CommitState};
use crate::translator::{RecordTranslator, SerializeOptions};
use crate::transform::TransformRegistry;
use crate::Error;

/// Status the backend uses to report validation errors.
pub const VALIDATION_STATUS: u16 = 400;

const FIND_MANY_KEY: &str = "ids[]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriteOp {
    Create,
    Update,
    Delete,
}

/// Talks to a DRF-style backend on behalf of a record store.
///
/// # Example
///
/// ```ignore
/// use std::sync::Mutex;
/// use restmap_adapter::{AdapterConfig, ConventionAdapter};
/// use restmap_store::{AttributeDef, InMemoryStore, TypeDescriptor};
///
/// let config = AdapterConfig::from_path("restmap.json")?;
/// let adapter = ConventionAdapter::new(config.transport()?, &config);
/// let store = Mutex::new(InMemoryStore::new());
/// let widget = TypeDescriptor::new("App.Widget").attribute(AttributeDef::new("name", "string"));
///
/// let page = adapter.find_all(&store, &widget, None).await?;
/// ```
pub struct ConventionAdapter<T> {
    transport: T,
    translator: RecordTranslator,
    urls: UrlBuilder,
    fence: WriteFence,
}

impl<T: Transport> ConventionAdapter<T> {
    pub fn new(transport: T, config: &AdapterConfig) -> Self {
        Self {
            transport,
            translator: RecordTranslator::new(TransformRegistry::with_defaults(), config.since.clone()),
            urls: config.url_builder(),
            fence: WriteFence::default(),
        }
    }

    /// Replace the translator, e.g. to register extra transforms.
    pub fn with_translator(mut self, translator: RecordTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn translator(&self) -> &RecordTranslator {
        &self.translator
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Records are always committed one request at a time.
    pub fn supports_bulk_commit(&self) -> bool {
        false
    }

    pub fn root_for_type(&self, type_: &TypeDescriptor, record: Option<&Record>) -> String {
        naming::root_for_type(type_, record)
    }

    pub fn pluralize(&self, name: &str) -> String {
        self.urls.pluralizer().pluralize(name)
    }

    pub fn build_url(&self, root: &str, suffix: Option<&str>) -> String {
        self.urls.build_url(root, suffix)
    }

    /// `Some(CommitState::Pending)` while a write for `record` is in flight.
    pub fn write_state(&self, record: ClientId) -> Option<CommitState> {
        self.fence.is_pending(record).then_some(CommitState::Pending)
    }

    /// Fetch one record by id.
    pub async fn find<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        id: &str,
    ) -> Result<Option<Reference>, Error> {
        let root = self.root_for_type(type_, None);
        let request = HttpRequest::get(self.build_url(&root, Some(id)));
        let payload = self.fetch(request).await?;

        let mut loader = lock(store)?;
        self.translator
            .extract(&mut *loader, payload.as_ref(), type_, None)
    }

    /// Fetch a page of a collection, continuing from `since` if given.
    pub async fn find_all<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        since: Option<&str>,
    ) -> Result<Vec<Reference>, Error> {
        let root = self.root_for_type(type_, None);
        let mut request = HttpRequest::get(self.build_url(&root, None));
        if let Some(since) = since {
            request = request.with_query(self.translator.since_key(), since);
        }
        self.fetch_many(store, type_, request).await
    }

    /// Fetch a collection filtered by arbitrary query parameters.
    pub async fn find_query<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        query: &[(&str, &str)],
    ) -> Result<Vec<Reference>, Error> {
        let root = self.root_for_type(type_, None);
        let request = query.iter().fold(
            HttpRequest::get(self.build_url(&root, None)),
            |request, (name, value)| request.with_query(*name, *value),
        );
        self.fetch_many(store, type_, request).await
    }

    /// Fetch several records by id in one request.
    pub async fn find_many<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        ids: &[&str],
    ) -> Result<Vec<Reference>, Error> {
        let root = self.root_for_type(type_, None);
        let request = ids.iter().fold(
            HttpRequest::get(self.build_url(&root, None)),
            |request, id| request.with_query(FIND_MANY_KEY, *id),
        );
        self.fetch_many(store, type_, request).await
    }

    /// POST a new record to its collection URL.
    pub async fn create_record<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        record: ClientId,
    ) -> Result<CommitOutcome, Error> {
        self.commit(store, type_, record, WriteOp::Create).await
    }

    /// PUT an existing record to its resource URL.
    pub async fn update_record<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        record: ClientId,
    ) -> Result<CommitOutcome, Error> {
        self.commit(store, type_, record, WriteOp::Update).await
    }

    /// DELETE an existing record's resource URL.
    pub async fn delete_record<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        record: ClientId,
    ) -> Result<CommitOutcome, Error> {
        self.commit(store, type_, record, WriteOp::Delete).await
    }

    async fn fetch(&self, request: HttpRequest) -> Result<Option<JsonValue>, Error> {
        log::debug!("{} {}", request.method, request.path);
        let response = self.transport.execute(request).await?;

        if !response.is_success() {
            log::error!("Unhandled server error with status code: {}", response.status);
            return Err(Error::Status {
                status: response.status,
                body: response.body_text,
            });
        }

        response
            .json()
            .map_err(|e| Error::malformed(e.to_string()))
    }

    async fn fetch_many<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        request: HttpRequest,
    ) -> Result<Vec<Reference>, Error> {
        let payload = self.fetch(request).await?;

        let mut loader = lock(store)?;
        self.translator
            .extract_many(&mut *loader, payload.as_ref(), type_, None)
    }

    fn write_request(
        &self,
        record: &Record,
        type_: &TypeDescriptor,
        op: WriteOp,
    ) -> Result<HttpRequest, Error> {
        let root = self.root_for_type(type_, Some(record));

        if op == WriteOp::Create {
            let data = self
                .translator
                .serialize(record, type_, SerializeOptions { include_id: true })?;
            return Ok(HttpRequest::post(self.build_url(&root, None))
                .with_json_body(JsonValue::Object(data)));
        }

        let id = record
            .id()
            .ok_or_else(|| Error::MissingId(record.client_id()))?;
        let url = self.build_url(&root, Some(id));

        Ok(match op {
            WriteOp::Update => {
                let data = self
                    .translator
                    .serialize(record, type_, SerializeOptions::default())?;
                HttpRequest::put(url).with_json_body(JsonValue::Object(data))
            }
            _ => HttpRequest::delete(url),
        })
    }

    async fn commit<L: Loader>(
        &self,
        store: &Mutex<L>,
        type_: &TypeDescriptor,
        record: ClientId,
        op: WriteOp,
    ) -> Result<CommitOutcome, Error> {
        let request = {
            let loader = lock(store)?;
            let snapshot = loader.record(record).ok_or(Error::UnknownRecord(record))?;
            self.write_request(snapshot, type_, op)?
        };

        let ticket = self.fence.issue(record)?;
        log::debug!("{} {} for {} {}", request.method, request.path, type_.name(), record);
        let result = self.transport.execute(request).await;

        let mut loader = lock(store)?;
        if !ticket.settle()? {
            log::warn!(
                "Discarding stale {:?} response for {} {}: a newer write was issued",
                op,
                type_.name(),
                record
            );
            return Ok(CommitOutcome::Superseded);
        }

        match result {
            Ok(response) if response.is_success() => {
                self.did_commit(&mut *loader, type_, record, op, &response)
            }
            Ok(response) => self.did_error(&mut *loader, record, &response),
            Err(error) => {
                log::error!("Request for {} {} failed: {}", type_.name(), record, error);
                loader.record_was_error(record);
                Ok(CommitOutcome::Failed { status: None })
            }
        }
    }

    fn did_commit<L: Loader + ?Sized>(
        &self,
        loader: &mut L,
        type_: &TypeDescriptor,
        record: ClientId,
        op: WriteOp,
        response: &HttpResponse,
    ) -> Result<CommitOutcome, Error> {
        if op == WriteOp::Delete {
            loader.did_delete_record(record);
            return Ok(CommitOutcome::Succeeded);
        }

        let payload = match response.json() {
            Ok(payload) => payload,
            Err(e) => {
                loader.record_was_error(record);
                return Err(Error::malformed(e.to_string()));
            }
        };

        if let Err(e) = self
            .translator
            .extract(&mut *loader, payload.as_ref(), type_, Some(record))
        {
            loader.record_was_error(record);
            return Err(e);
        }

        match op {
            WriteOp::Create => loader.did_create_record(record),
            _ => loader.did_save_record(record),
        }
        Ok(CommitOutcome::Succeeded)
    }

    /// Route a non-success write response.
    ///
    /// A validation status hands the parsed body to the store as the record's
    /// errors. Anything else marks the record as errored and is logged.
    fn did_error<L: Loader + ?Sized>(
        &self,
        loader: &mut L,
        record: ClientId,
        response: &HttpResponse,
    ) -> Result<CommitOutcome, Error> {
        if response.status == VALIDATION_STATUS {
            return match serde_json::from_str::<JsonValue>(&response.body_text) {
                Ok(errors) => {
                    loader.record_was_invalid(record, errors.clone());
                    Ok(CommitOutcome::ValidationRejected(errors))
                }
                Err(e) => {
                    loader.record_was_error(record);
                    Err(Error::malformed(format!(
                        "validation error body is not JSON: {}",
                        e
                    )))
                }
            };
        }

        loader.record_was_error(record);
        log::error!("Unhandled server error with status code: {}", response.status);
        Ok(CommitOutcome::Failed {
            status: Some(response.status),
        })
    }
}

impl ConventionAdapter<restmap_http::ReqwestTransport> {
    /// An adapter over a reqwest transport built from `config`.
    pub fn from_config(config: &AdapterConfig) -> Result<Self, Error> {
        Ok(Self::new(config.transport()?, config))
    }
}

fn lock<L>(store: &Mutex<L>) -> Result<MutexGuard<'_, L>, Error> {
    store.lock().map_err(|_| Error::StorePoisoned)
}
