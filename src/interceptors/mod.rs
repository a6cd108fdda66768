use async_trait::async_trait;
use std::fmt::Debug;

use crate::envelope::ResponseEnvelope;

/// Hook that sees every envelope a component produces.
#[async_trait]
pub trait Interceptor: Send + Sync + Debug {
    async fn save(&self, url: &str, envelope: &ResponseEnvelope) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

pub mod file;
pub use file::FileInterceptor;

/// Hand an envelope to the interceptor, if any. Failures are logged, never returned.
pub(crate) async fn intercept(interceptor: Option<&dyn Interceptor>, url: &str, envelope: &ResponseEnvelope) {
    if let Some(interceptor) = interceptor {
        if let Err(e) = interceptor.save(url, envelope).await {
            tracing::warn!(error = %e, url, "Interceptor failed to save envelope");
        }
    }
}
