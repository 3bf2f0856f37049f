//! # restmap-adapter
//!
//! Maps store records onto a Django REST Framework style backend.
//!
//! Two pieces do the work:
//! - [`RecordTranslator`] turns response payloads into store references and
//!   records into write payloads. It understands the `{"results": [...],
//!   "next": ...}` page envelope, the `array` attribute type and read-only
//!   attributes.
//! - [`ConventionAdapter`] decides URLs (pluralized resource names with a
//!   trailing slash on collections), issues requests through a
//!   [`Transport`](restmap_http::Transport), and routes the outcome of each
//!   write back into the store. A `400` is a validation failure; anything else
//!   non-2xx is a generic error.
//!
//! ```ignore
//! use std::sync::Mutex;
//! use restmap_adapter::{AdapterConfig, CommitOutcome, ConventionAdapter};
//! use restmap_store::{AttributeDef, InMemoryStore, TypeDescriptor, Value};
//!
//! let config = AdapterConfig::from_json_str(r#"{"base_url": "http://localhost:8000", "namespace": "api"}"#)?;
//! let adapter = ConventionAdapter::from_config(&config)?;
//! let store = Mutex::new(InMemoryStore::new());
//!
//! let widget = TypeDescriptor::new("App.Widget").attribute(AttributeDef::new("name", "string"));
//! let record = store.lock().unwrap().create_record("App.Widget", [("name", Value::from("gear"))]);
//!
//! match adapter.create_record(&store, &widget, record).await? {
//!     CommitOutcome::ValidationRejected(errors) => eprintln!("invalid: {}", errors),
//!     outcome => println!("{:?}", outcome),
//! }
//! ```

pub mod adapter;
pub mod config;
pub mod error;
mod fence;
pub mod naming;
pub mod outcome;
pub mod serializer;
pub mod transform;
pub mod translator;

pub use adapter::{ConventionAdapter, VALIDATION_STATUS};
pub use config::AdapterConfig;
pub use error::Error;
pub use naming::{root_for_type, Pluralizer, UrlBuilder};
pub use outcome::{CommitOutcome, CommitState};
pub use serializer::RestSerializer;
pub use transform::{
    ArrayTransform, BooleanTransform, NumberTransform, StringTransform, Transform,
    TransformRegistry,
};
pub use translator::{RecordTranslator, SerializeOptions, DEFAULT_SINCE_KEY};
