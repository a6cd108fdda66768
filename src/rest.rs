//! REST data component: fetches a JSON body and wraps it, untouched, in the
//! same envelope the GraphQL component produces. No schema is derived.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::broadcast;
use tracing::{debug, error, instrument};

use crate::config::DataConfig;
use crate::core::{DataEvent, EventSender, Transport, TransportRequest};
use crate::envelope::{Meta, ResponseEnvelope};
use crate::error::DataError;
use crate::interceptors::{intercept, Interceptor};

#[derive(Debug, Clone)]
pub struct DataRest<T: Transport> {
    transport: T,
    config: DataConfig,
    events: EventSender,
    interceptor: Option<Arc<dyn Interceptor>>,
}

impl<T: Transport> DataRest<T> {
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

    /// Receive `Changed` on every completed fetch and `Failed` on every failed one
    ///
    /// Events are buffered up to [`EVENT_CHANNEL_CAPACITY`](crate::core::EVENT_CHANNEL_CAPACITY);
    /// a receiver that falls further behind gets `RecvError::Lagged` and misses
    /// the oldest ones.
    pub fn subscribe(&self) -> broadcast::Receiver<DataEvent> {
        self.events.subscribe()
    }

    /// GET `url` with `params` appended and wrap the JSON body.
    ///
    /// A null or empty body gives an envelope without data.
    #[instrument(target = "data_components::rest", skip(self, params), fields(param_count = params.len()))]
    pub async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<ResponseEnvelope, DataError> {
        match self.try_fetch(url, params).await {
            Ok(envelope) => {
                intercept(self.interceptor.as_deref(), url, &envelope).await;
                self.events.emit(DataEvent::Changed(envelope.clone()));
                Ok(envelope)
            }
            Err(e) => {
                error!(error = %e, "REST fetch failed");
                self.events.emit(DataEvent::Failed { url: url.to_string(), message: e.to_string() });
                Err(e)
            }
        }
    }

    async fn try_fetch(&self, url: &str, params: &[(&str, &str)]) -> Result<ResponseEnvelope, DataError> {
        let mut full_url = reqwest::Url::parse(url)
            .map_err(|e| DataError::InvalidRequest(format!("invalid URL '{}': {}", url, e)))?;
        if !params.is_empty() {
            full_url.query_pairs_mut().extend_pairs(params);
        }

        let request = TransportRequest::get(full_url).with_bearer(self.config.rest_credential.clone());
        let response = self.transport.get(request).await?;
        if self.config.logging {
            debug!(status = response.status, "Received response");
        }

        if !response.is_success() {
            return Err(DataError::Status { status: response.status, body: response.body.unwrap_or_default() });
        }

        let data = response.json()?;
        if self.config.logging {
            debug!(has_data = data.is_some(), "Computing envelope from last response");
        }

        Ok(ResponseEnvelope::new(data, None, None, None, Meta::new(url, Utc::now())))
    }
}
