use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::core::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;

/// A canned answer for the mock transport.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Respond with this status and body
    Reply(TransportResponse),
    /// Fail as if the connection broke
    Fail(String),
}

impl MockResponse {
    pub fn json(body: impl Into<String>) -> Self {
        Self::Reply(TransportResponse::ok(body))
    }

    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Reply(TransportResponse { status, body: Some(body.into()) })
    }

    pub fn empty() -> Self {
        Self::Reply(TransportResponse { status: 200, body: None })
    }
}

/// Shared control over a [`MockTransport`]: queue responses, inspect requests.
#[derive(Debug, Default)]
pub struct MockHandle {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<TransportRequest>>,
    fallback: Mutex<Option<MockResponse>>,
}

impl MockHandle {
    pub fn push(&self, response: MockResponse) {
        self.responses.lock().unwrap_or_else(|e| e.into_inner()).push_back(response);
    }

    /// Answer with `response` whenever the queue is empty
    pub fn set_fallback(&self, response: MockResponse) {
        *self.fallback.lock().unwrap_or_else(|e| e.into_inner()) = Some(response);
    }

    /// Requests received so far, in order
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// URLs requested so far, in order
    pub fn urls(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.url).collect()
    }

    fn next(&self, request: TransportRequest) -> Option<MockResponse> {
        self.requests.lock().unwrap_or_else(|e| e.into_inner()).push(request);
        let queued = self.responses.lock().unwrap_or_else(|e| e.into_inner()).pop_front();
        queued.or_else(|| self.fallback.lock().unwrap_or_else(|e| e.into_inner()).clone())
    }
}

/// Transport for tests and offline runs. Answers with queued responses in
/// FIFO order and records every request it sees.
#[derive(Debug, Clone)]
pub struct MockTransport {
    handle: Arc<MockHandle>,
}

impl MockTransport {
    pub fn new() -> (Self, Arc<MockHandle>) {
        Self::with_responses(Vec::new())
    }

    pub fn with_responses(responses: Vec<MockResponse>) -> (Self, Arc<MockHandle>) {
        let handle = Arc::new(MockHandle::default());
        for response in responses {
            handle.push(response);
        }
        (Self { handle: handle.clone() }, handle)
    }

    /// Mock for offline runs: every request gets an empty JSON object back
    pub fn offline() -> Self {
        let (mock, handle) = Self::new();
        handle.set_fallback(MockResponse::json("{}"));
        mock
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        match self.handle.next(request) {
            Some(MockResponse::Reply(response)) => Ok(response),
            Some(MockResponse::Fail(message)) => Err(TransportError::Mock(message)),
            None => Err(TransportError::Mock("no mock response queued".to_string())),
        }
    }

    fn clone_box(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}
