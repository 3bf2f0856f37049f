use restmap_store::ClientId;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("HTTP error: {0}")]
    Http(#[from] restmap_http::Error),

    #[error("Store error: {0}")]
    Store(#[from] restmap_store::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    #[error("Expected {expected} representations to match the supplied records, got {actual}")]
    RecordCountMismatch { expected: usize, actual: usize },

    #[error("No transform registered for attribute type '{kind}'")]
    UnknownTransform { kind: String },

    #[error("Record {0} has no server id")]
    MissingId(ClientId),

    #[error("Record {0} is not loaded in the store")]
    UnknownRecord(ClientId),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Store lock poisoned")]
    StorePoisoned,

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Error::MalformedResponse {
            message: message.into(),
        }
    }
}
