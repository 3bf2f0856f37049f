//! # restmap-store
//!
//! The record side of restmap:
//! - `Record`: an application entity with a store-local id, an optional
//!   server id, attributes and relations
//! - `TypeDescriptor`: static per-type metadata (attributes, read-only flags,
//!   relations, resource path overrides)
//! - `Value`: the in-memory form of an attribute after its transform ran
//! - `Reference`: a (type, id) handle produced by extraction
//! - `Loader`: the mutation interface the adapter drives
//!
//! `InMemoryStore` implements `Loader` for applications and tests that do not
//! bring their own store.

mod error;
mod in_memory;
mod loader;
mod record;
mod reference;
mod schema;
mod value;

pub use error::Error;
pub use in_memory::InMemoryStore;
pub use loader::Loader;
pub use record::{ClientId, Record, RecordData, RecordState, RelationValue};
pub use reference::Reference;
pub use schema::{AttributeDef, RelationDef, RelationKind, TypeDescriptor};
pub use value::Value;
