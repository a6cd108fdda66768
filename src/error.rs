use thiserror::Error;

#[derive(Error, Debug)]
pub enum DataError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("Server responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Malformed response: {0}. Raw response: {1}")]
    MalformedResponse(#[source] serde_json::Error, String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    #[error("Mock transport error: {0}")]
    Mock(String),
}
