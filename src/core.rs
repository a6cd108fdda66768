//! Core plumbing shared by the data components: the transport abstraction the
//! components fetch through, and the events they emit once a fetch completes.
//!
//! Quick start:
//! - Fetch GraphQL data with `DataGql::fetch()` (see `crate::gql`)
//! - Fetch plain JSON with `DataRest::fetch()` (see `crate::rest`)
//! - Subscribe to `DataEvent`s with `subscribe()` on either component

use crate::envelope::ResponseEnvelope;
use crate::error::{DataError, TransportError};
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Debug;
use tokio::sync::broadcast;
use tracing::error;

/// Capacity of the event channel each component owns.
///
/// A subscriber that falls more than this many events behind gets
/// `RecvError::Lagged` and loses the oldest events.
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A single HTTP GET to issue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Fully serialized URL, query string included
    pub url: String,
    /// Bearer token for the `Authorization` header
    pub bearer: Option<String>,
}

impl TransportRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self { url: url.into(), bearer: None }
    }

    #[must_use]
    pub fn with_bearer(mut self, token: Option<String>) -> Self {
        self.bearer = token;
        self
    }
}

/// What came back from the server: status plus the raw body, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Option<String>,
}

impl TransportResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self { status: 200, body: Some(body.into()) }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON. An absent body or a literal `null` yields `None`.
    pub fn json(&self) -> Result<Option<Value>, DataError> {
        let Some(raw) = self.body.as_deref() else {
            return Ok(None);
        };
        match serde_json::from_str::<Value>(raw) {
            Ok(Value::Null) => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                error!(error = %e, body_len = raw.len(), "Response body is not valid JSON");
                Err(DataError::MalformedResponse(e, raw.to_string()))
            }
        }
    }
}

/// HTTP transport abstraction.
///
/// Implementors issue exactly one GET per call. There is no retry and no
/// timeout policy beyond whatever the implementation defaults to.
#[async_trait]
pub trait Transport: Send + Sync + Debug {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;

    /// Clone this transport into a boxed trait object
    fn clone_box(&self) -> Box<dyn Transport>;
}

impl Clone for Box<dyn Transport> {
    fn clone(&self) -> Self {
        self.clone_box()
    }
}

#[async_trait]
impl Transport for Box<dyn Transport> {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.as_ref().get(request).await
    }

    fn clone_box(&self) -> Box<dyn Transport> {
        self.as_ref().clone_box()
    }
}

/// Notification emitted by a data component.
#[derive(Debug, Clone, PartialEq)]
pub enum DataEvent {
    /// A fetch completed and produced a new envelope
    Changed(ResponseEnvelope),
    /// A fetch failed; only emitted by the REST component
    Failed { url: String, message: String },
}

impl DataEvent {
    pub fn envelope(&self) -> Option<&ResponseEnvelope> {
        match self {
            DataEvent::Changed(envelope) => Some(envelope),
            DataEvent::Failed { .. } => None,
        }
    }
}

/// Sending half of a component's event channel.
#[derive(Debug, Clone)]
pub(crate) struct EventSender {
    tx: broadcast::Sender<DataEvent>,
}

impl EventSender {
    pub(crate) fn new() -> Self {
        let (tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { tx }
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.tx.subscribe()
    }

    /// Send an event; having no subscribers is fine
    pub(crate) fn emit(&self, event: DataEvent) {
        let _ = self.tx.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_range() {
        assert!(TransportResponse::ok("{}").is_success());
        assert!(TransportResponse { status: 204, body: None }.is_success());
        assert!(!TransportResponse { status: 404, body: None }.is_success());
        assert!(!TransportResponse { status: 500, body: None }.is_success());
    }

    #[test]
    fn json_body_parsing() {
        assert_eq!(TransportResponse { status: 200, body: None }.json().unwrap(), None);
        assert_eq!(TransportResponse::ok("null").json().unwrap(), None);
        assert_eq!(
            TransportResponse::ok(r#"{"a":1}"#).json().unwrap(),
            Some(serde_json::json!({ "a": 1 }))
        );
        match TransportResponse::ok("<html>").json() {
            Err(DataError::MalformedResponse(_, raw)) => assert_eq!(raw, "<html>"),
            other => panic!("expected malformed response, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn slow_subscriber_sees_a_full_burst() {
        let events = EventSender::new();
        let mut rx = events.subscribe();
        for i in 0..64 {
            events.emit(DataEvent::Failed { url: "u".into(), message: i.to_string() });
        }
        for i in 0..64 {
            match rx.recv().await.unwrap() {
                DataEvent::Failed { message, .. } => assert_eq!(message, i.to_string()),
                other => panic!("unexpected event: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn emit_without_subscribers_is_silent() {
        let events = EventSender::new();
        events.emit(DataEvent::Failed { url: "u".into(), message: "m".into() });

        let mut rx = events.subscribe();
        events.emit(DataEvent::Failed { url: "u".into(), message: "again".into() });
        match rx.recv().await.unwrap() {
            DataEvent::Failed { message, .. } => assert_eq!(message, "again"),
            other => panic!("unexpected event: {:?}", other),
        }
    }
}
