use super::Interceptor;
use async_trait::async_trait;
use chrono::Utc;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::envelope::ResponseEnvelope;

/// Writes each envelope to `<base_path>/response_<timestamp>_<seq>.json`.
///
/// The sequence number keeps names unique within one interceptor; an existing
/// file is never overwritten.
#[derive(Debug)]
pub struct FileInterceptor {
    base_path: PathBuf,
    seq: AtomicU64,
}

impl FileInterceptor {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path, seq: AtomicU64::new(0) }
    }
}

#[async_trait]
impl Interceptor for FileInterceptor {
    async fn save(&self, url: &str, envelope: &ResponseEnvelope) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let timestamp = Utc::now();
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let filename = format!("response_{}_{:06}.json", timestamp.format("%Y%m%d_%H%M%S_%9f"), seq);
        let file_path = self.base_path.join(filename);

        fs::create_dir_all(&self.base_path).await?;

        let content = serde_json::to_string_pretty(&serde_json::json!({
            "url": url,
            "envelope": envelope,
        }))?;

        let mut file = fs::OpenOptions::new().write(true).create_new(true).open(&file_path).await?;
        file.write_all(content.as_bytes()).await?;
        file.flush().await?;

        Ok(())
    }
}
