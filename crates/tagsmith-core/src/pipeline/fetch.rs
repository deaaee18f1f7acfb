//! Downloading URL inputs.

use std::time::Duration;

use crate::config::LimitsConfig;
use crate::error::{PipelineError, PipelineResult};

const BYTES_PER_MB: u64 = 1024 * 1024;

/// HTTP fetcher with a per-request timeout and a body size cap.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: reqwest::Client,
    timeout: Duration,
    max_bytes: u64,
}

impl Fetcher {
    pub fn new(limits: &LimitsConfig) -> Self {
        Self::with_limits(
            Duration::from_millis(limits.fetch_timeout_ms),
            limits.max_file_size_mb * BYTES_PER_MB,
        )
    }

    pub fn with_limits(timeout: Duration, max_bytes: u64) -> Self {
        Self {
            client: reqwest::Client::new(),
            timeout,
            max_bytes,
        }
    }

    /// Download `url` and return the response body.
    ///
    /// Non-2xx responses, timeouts, and bodies larger than the size cap are
    /// errors. The cap is enforced while streaming, so an oversized body is
    /// never held in memory in full.
    pub async fn fetch(&self, url: &str) -> PipelineResult<Vec<u8>> {
        let fetch_err = |message: String| PipelineError::Fetch {
            url: url.to_string(),
            message,
        };

        let mut response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    self.timeout_error(url)
                } else {
                    fetch_err(e.to_string())
                }
            })?
            .error_for_status()
            .map_err(|e| fetch_err(e.to_string()))?;

        if let Some(len) = response.content_length() {
            if len > self.max_bytes {
                return Err(self.too_large(url, len));
            }
        }

        let mut body = Vec::new();
        while let Some(chunk) = response.chunk().await.map_err(|e| {
            if e.is_timeout() {
                self.timeout_error(url)
            } else {
                fetch_err(e.to_string())
            }
        })? {
            body.extend_from_slice(&chunk);
            if body.len() as u64 > self.max_bytes {
                return Err(self.too_large(url, body.len() as u64));
            }
        }

        tracing::debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    fn too_large(&self, url: &str, size: u64) -> PipelineError {
        PipelineError::FileTooLarge {
            input: url.to_string(),
            size_mb: size / BYTES_PER_MB,
            max_mb: self.max_bytes / BYTES_PER_MB,
        }
    }

    fn timeout_error(&self, url: &str) -> PipelineError {
        PipelineError::Timeout {
            input: url.to_string(),
            stage: "fetch".to_string(),
            timeout_ms: self.timeout.as_millis() as u64,
        }
    }
}
