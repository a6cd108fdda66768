//! GraphQL data component.
//!
//! Sends a query document, its variables and an optional operation name to a
//! GraphQL server over HTTP GET and returns the result as an immutable
//! [`ResponseEnvelope`] with data, errors, an in-band schema and fetch metadata.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};
use tokio::sync::broadcast;
use tracing::{debug, error, info, instrument};

use crate::config::DataConfig;
use crate::core::{DataEvent, EventSender, Transport, TransportRequest};
use crate::envelope::{Meta, ResponseEnvelope};
use crate::error::DataError;
use crate::interceptors::{intercept, Interceptor};
use crate::schema::make_schema_for_data;

/// Everything needed to issue one GraphQL query.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryRequest {
    /// URL of the GraphQL server
    pub server_url: String,
    /// GraphQL query document
    pub query_text: String,
    /// Values for the variables referenced by the document
    pub variables: Map<String, Value>,
    /// Operation to execute; only meaningful when the document defines several
    pub operation_name: Option<String>,
    /// Bearer token sent with the request
    pub credential: Option<String>,
}

impl QueryRequest {
    pub fn new(server_url: impl Into<String>, query_text: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            query_text: query_text.into(),
            variables: Map::new(),
            operation_name: None,
            credential: None,
        }
    }

    /// Build a request against the server URL configured in `config`
    pub fn from_config(config: &DataConfig, query_text: impl Into<String>) -> Result<Self, DataError> {
        let url = config
            .url
            .clone()
            .ok_or_else(|| DataError::InvalidRequest("no server URL configured".to_string()))?;
        let mut request = Self::new(url, query_text);
        request.credential = config.credential.clone();
        Ok(request)
    }

    #[must_use]
    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_operation_name(mut self, operation_name: impl Into<String>) -> Self {
        self.operation_name = Some(operation_name.into());
        self
    }

    #[must_use]
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

/// Serialize a request into the GET URL: `query`, `variables` (as JSON) and,
/// when set, `operationName` are appended as URL-escaped query parameters.
pub fn serialize_query_to_url(request: &QueryRequest) -> Result<String, DataError> {
    if request.server_url.trim().is_empty() {
        return Err(DataError::InvalidRequest("server URL must not be empty".to_string()));
    }
    if request.query_text.trim().is_empty() {
        return Err(DataError::InvalidRequest("query text must not be empty".to_string()));
    }

    let mut url = reqwest::Url::parse(&request.server_url)
        .map_err(|e| DataError::InvalidRequest(format!("invalid server URL '{}': {}", request.server_url, e)))?;
    let variables = serde_json::to_string(&request.variables)
        .map_err(|e| DataError::InvalidRequest(format!("variables are not serializable: {}", e)))?;

    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("query", &request.query_text);
        pairs.append_pair("variables", &variables);
        if let Some(op) = &request.operation_name {
            pairs.append_pair("operationName", op);
        }
    }

    Ok(url.into())
}

/// Turn a parsed response body into an envelope.
///
/// `data`, `errors` and `extensions` are taken verbatim from the body when
/// present. A missing or null body leaves them absent. The schema holds one
/// entry for the first key of `data`, or is absent when `data` has no keys.
pub fn normalize_response(request: &QueryRequest, raw: Option<Value>) -> ResponseEnvelope {
    let mut body = match raw {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let data = body.remove("data").filter(|v| !v.is_null());
    let errors = match body.remove("errors") {
        None | Some(Value::Null) => None,
        Some(Value::Array(items)) => Some(items),
        Some(other) => Some(vec![other]),
    };
    let extensions = body.remove("extensions").filter(|v| !v.is_null());
    let schema = data.as_ref().and_then(make_schema_for_data);

    ResponseEnvelope::new(data, errors, extensions, schema, Meta::new(request.server_url.clone(), Utc::now()))
}

/// GraphQL fetcher over any [`Transport`].
///
/// Every call to [`fetch`](Self::fetch) is independent: one GET, no retry, no
/// de-duplication of concurrent calls. Each completed fetch emits exactly one
/// [`DataEvent::Changed`] to subscribers.
#[derive(Debug, Clone)]
pub struct DataGql<T: Transport> {
    transport: T,
    config: DataConfig,
    events: EventSender,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<T: Transport> DataGql<T> {
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, DataConfig::default())
    }

    pub fn with_config(transport: T, config: DataConfig) -> Self {
        Self { transport, config, events: EventSender::new(), interceptor: None }
    }

    #[must_use]
    pub fn with_interceptor(mut self, interceptor: Arc<dyn Interceptor>) -> Self {
        self.interceptor = Some(interceptor);
        self
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn config(&self) -> &DataConfig {
        &self.config
    }

    /// Receive a [`DataEvent::Changed`] for every completed fetch
    ///
    /// Events are buffered up to [`EVENT_CHANNEL_CAPACITY`](crate::core::EVENT_CHANNEL_CAPACITY);
    /// a receiver that falls further behind gets `RecvError::Lagged` and misses
    /// the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.events.subscribe()
    }

    /// Query the server and normalize its answer.
    ///
    /// Fails with [`DataError::Transport`] when the request cannot be
    /// delivered, [`DataError::Status`] on a non-2xx answer and
    /// [`DataError::MalformedResponse`] when the body is not JSON. No envelope
    /// and no event are produced on failure.
    #[instrument(target = "data_components::gql", skip(self, request), fields(url = %request.server_url, op = ?request.operation_name))]
    pub async fn fetch(&self, request: &QueryRequest) -> Result<ResponseEnvelope, DataError> {
        let url = serialize_query_to_url(request)?;
        if self.config.logging {
            match &request.operation_name {
                Some(op) => info!("Querying GQL server at {} for op {}", request.server_url, op),
                None => info!("Querying GQL server at {}", request.server_url),
            }
        }

        let transport_request = TransportRequest::get(url).with_bearer(request.credential.clone());
        let response = self.transport.get(transport_request).await.map_err(|e| {
            error!(error = %e, "Error while querying server");
            DataError::from(e)
        })?;

        if self.config.logging {
            debug!(status = response.status, "Received response from server");
        }

        if !response.is_success() {
            error!(status = response.status, "GQL server answered with an error status");
            return Err(DataError::Status { status: response.status, body: response.body.unwrap_or_default() });
        }

        let body = response.json()?;
        if self.config.logging {
            debug!(has_body = body.is_some(), "Transforming response into an immutable envelope");
        }

        let envelope = normalize_response(request, body);
        if self.config.logging {
            debug!(
                fetched_from = envelope.meta().fetched_from(),
                fetched_at = %envelope.meta().fetched_at().to_rfc3339(),
                has_data = envelope.data().is_some(),
                error_count = envelope.errors().map_or(0, |e| e.len()),
                "Fetched data"
            );
        }

        intercept(self.interceptor.as_deref(), &request.server_url, &envelope).await;
        self.events.emit(DataEvent::Changed(envelope.clone()));
        Ok(envelope)
    }
}
