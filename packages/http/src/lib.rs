//! # restmap-http
//!
//! The transport layer for restmap.
//!
//! The adapter describes each network call as an [`HttpRequest`] and hands it
//! to a [`Transport`], which resolves to an [`HttpResponse`] carrying the status
//! and raw body. Status classification and body parsing are the adapter's job.
//!
//! ```ignore
//! use restmap_http::{HttpRequest, ReqwestTransport, Transport};
//!
//! let transport = ReqwestTransport::with_default_timeout("https://api.example.com")?;
//! let response = transport.execute(HttpRequest::get("/api/widgets/")).await?;
//! ```
//!
//! With the `test-utils` feature, [`MockTransport`] returns canned responses
//! and records every request.

pub mod error;
pub mod transport;
pub mod types;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

pub use error::Error;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockTransport;
pub use transport::{ReqwestTransport, Transport};
pub use types::{HttpRequest, HttpResponse, Method};
