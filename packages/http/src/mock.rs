//! Mock transport for testing.
//!
//! Returns predefined responses based on request matching and records every
//! request it sees.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::Error;
use crate::transport::Transport;
use crate::types::{HttpRequest, HttpResponse, Method};

/// A mock transport that returns predefined responses.
///
/// Clones share state, so a test can hand one clone to the adapter and keep
/// another to inspect recorded requests.
#[derive(Clone, Default)]
pub struct MockTransport {
    /// Responses keyed by method and request path.
    responses: Arc<Mutex<HashMap<(Method, String), HttpResponse>>>,
    /// Default response when no match found.
    default_response: Arc<Mutex<Option<HttpResponse>>>,
    /// Recorded requests for verification.
    recorded_requests: Arc<Mutex<Vec<HttpRequest>>>,
    /// Error message returned for every request, if set.
    failure: Arc<Mutex<Option<String>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a response for a specific method and path.
    pub fn with_response(
        self,
        method: Method,
        path: impl Into<String>,
        response: HttpResponse,
    ) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert((method, path.into()), response);
        self
    }

    /// Set a default response when no path matches.
    pub fn with_default_response(self, response: HttpResponse) -> Self {
        *self.default_response.lock().unwrap() = Some(response);
        self
    }

    /// Configure to fail all requests without a response.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        *self.failure.lock().unwrap() = Some(message.into());
        self
    }

    /// Get all recorded requests.
    pub fn recorded_requests(&self) -> Vec<HttpRequest> {
        self.recorded_requests.lock().unwrap().clone()
    }

    pub fn clear_recorded(&self) {
        self.recorded_requests.lock().unwrap().clear();
    }

    /// A 200 response with a JSON body.
    pub fn success_response(body: serde_json::Value) -> HttpResponse {
        HttpResponse::json_body(200, &body)
    }

    /// A 201 response with a JSON body.
    pub fn created_response(body: serde_json::Value) -> HttpResponse {
        HttpResponse::json_body(201, &body)
    }

    pub fn error_response(status: u16, body: serde_json::Value) -> HttpResponse {
        HttpResponse::json_body(status, &body)
    }

    pub fn not_found() -> HttpResponse {
        HttpResponse::json_body(404, &serde_json::json!({"detail": "Not found."}))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, Error> {
        self.recorded_requests.lock().unwrap().push(request.clone());

        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(Error::Transport { message });
        }

        let key = (request.method, request.path);
        if let Some(response) = self.responses.lock().unwrap().get(&key) {
            return Ok(response.clone());
        }

        if let Some(ref response) = *self.default_response.lock().unwrap() {
            return Ok(response.clone());
        }

        Ok(Self::not_found())
    }
}
