// src/repository/client.rs

//! HTTP client for update-center operations
//!
//! Thin wrapper around a blocking reqwest client. Every request is a single
//! attempt; a failure is returned as [`Error::FetchError`] and callers decide
//! what to do with it.

use crate::error::{Error, Result};
use crate::installer::Fetcher;
use indicatif::ProgressBar;
use reqwest::blocking::Client;
use std::io::Read;
use std::time::Duration;
use tracing::debug;

/// Default timeout for HTTP requests (30 seconds)
pub const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffer size for streaming downloads (8 KB)
const STREAM_BUFFER_SIZE: usize = 8192;

/// Blocking HTTP fetcher
pub struct HttpFetcher {
    client: Client,
    progress: Option<ProgressBar>,
}

impl HttpFetcher {
    /// Create a fetcher with the default timeout
    pub fn new() -> Result<Self> {
        Self::with_timeout(HTTP_TIMEOUT)
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("jpm/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| Error::FetchError(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            progress: None,
        })
    }

    /// Report downloaded bytes on `progress` (for single large downloads)
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    /// GET `url` and return the body
    pub fn download_to_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::FetchError(format!("failed to fetch {url}: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::FetchError(format!(
                "HTTP {} from {}",
                response.status(),
                url
            )));
        }

        let total = response.content_length().unwrap_or(0);
        if let Some(pb) = &self.progress {
            if total > 0 {
                pb.set_length(total);
            }
        }

        let mut body = Vec::with_capacity(total as usize);
        let mut buffer = [0u8; STREAM_BUFFER_SIZE];
        loop {
            let read = response
                .read(&mut buffer)
                .map_err(|e| Error::FetchError(format!("failed to read response from {url}: {e}")))?;
            if read == 0 {
                break;
            }
            body.extend_from_slice(&buffer[..read]);
            if let Some(pb) = &self.progress {
                pb.set_position(body.len() as u64);
            }
        }

        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.download_to_bytes(url)
    }
}
