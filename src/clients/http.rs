use crate::core::{Transport, TransportRequest, TransportResponse};
use crate::error::TransportError;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, AUTHORIZATION};
use reqwest::Client;
use tracing::{debug, error, instrument};

/// Transport backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self { client: Client::new() }
    }

    /// Use a preconfigured `reqwest::Client` (proxies, timeouts, TLS)
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(target = "data_components::transport", skip(self, request), fields(url = %request.url))]
    async fn get(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let url = reqwest::Url::parse(&request.url).map_err(|e| {
            error!(error = %e, "Refusing to send request to invalid URL");
            TransportError::InvalidUrl(format!("{}: {}", request.url, e))
        })?;

        let mut builder = self.client.get(url).header(ACCEPT, "application/json");
        if let Some(token) = &request.bearer {
            builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
        }

        debug!("Sending GET request");
        let response = builder.send().await.map_err(|e| {
            error!(error = %e, "HTTP request failed");
            TransportError::Http(e.to_string())
        })?;

        let status = response.status().as_u16();
        debug!(status, "Received response");

        let text = response.text().await.map_err(|e| {
            error!(error = %e, "Failed to read response body");
            TransportError::Http(e.to_string())
        })?;

        let body = if text.trim().is_empty() { None } else { Some(text) };
        Ok(TransportResponse { status, body })
    }

    fn clone_box(&self) -> Box<dyn Transport> {
        Box::new(self.clone())
    }
}
