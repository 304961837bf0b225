use async_trait::async_trait;
use reqwest::Client;
use std::io;
use std::time::Duration;

use super::{ArchiveBytes, ByteSource};
use crate::error::{Result, ZipError};

/// Archive fetched in full from an HTTP(S) URL
pub struct HttpSource {
    client: Client,
    url: String,
    max_retry: u32,
}

impl HttpSource {
    /// Create a new HTTP source with a 30 second request timeout
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(into_io)?;

        Ok(Self {
            client,
            url: url.into(),
            max_retry: 3,
        })
    }

    /// Number of attempts for connect and timeout failures
    pub fn with_max_retry(mut self, max_retry: u32) -> Self {
        self.max_retry = max_retry.max(1);
        self
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn fetch_once(&self) -> reqwest::Result<reqwest::Response> {
        self.client.get(&self.url).send().await
    }
}

#[async_trait]
impl ByteSource for HttpSource {
    async fn read_all(self) -> Result<ArchiveBytes> {
        let mut retry_count = 0;

        let resp = loop {
            match self.fetch_once().await {
                Ok(resp) => break resp,
                Err(e) if e.is_timeout() || e.is_connect() => {
                    retry_count += 1;
                    if retry_count >= self.max_retry {
                        return Err(into_io(e));
                    }
                    log::warn!(
                        "Connection error, retry {}/{}: {}",
                        retry_count,
                        self.max_retry,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(500 * retry_count as u64)).await;
                }
                Err(e) => return Err(into_io(e)),
            }
        };

        if !resp.status().is_success() {
            return Err(ZipError::Io(io::Error::other(format!(
                "HTTP request failed with status: {}",
                resp.status()
            ))));
        }

        let declared = resp.content_length();
        let body = resp.bytes().await.map_err(into_io)?;

        // A short body means the transfer was cut off; never hand out partial data.
        if let Some(expected) = declared {
            if expected != body.len() as u64 {
                return Err(ZipError::Io(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!(
                        "received {} of {} bytes from {}",
                        body.len(),
                        expected,
                        self.url
                    ),
                )));
            }
        }

        log::debug!("fetched {} bytes from {}", body.len(), self.url);
        Ok(ArchiveBytes::from(body.to_vec()))
    }
}

fn into_io(e: reqwest::Error) -> ZipError {
    ZipError::Io(io::Error::other(e))
}
