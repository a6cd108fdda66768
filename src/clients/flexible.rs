use crate::core::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;
use async_trait::async_trait;
use std::env;
use std::str::FromStr;
use std::sync::{Arc, Mutex};

use super::http::HttpTransport;
use super::mock::{MockHandle, MockTransport};

/// Environment variable selecting the transport kind.
pub const TRANSPORT_ENV: &str = "DATA_TRANSPORT";

/// Transport kind for lazy construction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportKind {
    #[default]
    Http,
    Mock,
}

impl TransportKind {
    /// Read the kind from `DATA_TRANSPORT`, falling back to HTTP
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        env::var(TRANSPORT_ENV)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for TransportKind {
    type Err = String;

    /// Case insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "http" => Ok(Self::Http),
            "mock" => Ok(Self::Mock),
            _ => Err(format!("Unknown transport: '{}'. Supported: http, mock", s)),
        }
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportKind::Http => write!(f, "http"),
            TransportKind::Mock => write!(f, "mock"),
        }
    }
}

impl From<TransportKind> for Box<dyn Transport> {
    fn from(kind: TransportKind) -> Self {
        match kind {
            TransportKind::Http => Box::new(HttpTransport::new()),
            // Offline runs; use FlexibleTransport::mock() to script responses
            TransportKind::Mock => Box::new(MockTransport::offline()),
        }
    }
}

/// Transport that wraps any boxed transport chosen at runtime
#[derive(Debug, Clone)]
pub struct FlexibleTransport {
    inner: Arc<Mutex<Box<dyn Transport>>>,
}

impl FlexibleTransport {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self { inner: Arc::new(Mutex::new(transport)) }
    }

    pub fn from_kind(kind: TransportKind) -> Self {
        Self::new(kind.into())
    }

    pub fn http() -> Self {
        Self::new(Box::new(HttpTransport::new()))
    }

    /// Create a mock-backed transport and return the handle controlling it
    pub fn mock() -> (Self, Arc<MockHandle>) {
        let (mock, handle) = MockTransport::new();
        (Self::new(Box::new(mock)), handle)
    }

    /// Swap the wrapped transport; clones of this value see the change
    pub fn replace(&self, transport: Box<dyn Transport>) {
        *self.inner.lock().unwrap_or_else(|e| e.into_inner()) = transport;
    }
}

#[async_trait]
impl Transport for FlexibleTransport {
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        // Clone the transport so the mutex is not held across await
        let transport = {
            let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            inner.as_ref().clone_box()
        };

        transport.get(request).await
    }

    fn clone_box(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}
