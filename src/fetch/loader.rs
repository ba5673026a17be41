use crate::config::VisualizerConfig;
use crate::fetch::error::FetchError;
use crate::fetch::ReadingSource;
use crate::types::reading::ReadingBatch;
use log::{debug, info, warn};
use reqwest::Client;
use std::time::Duration;

/// Downloads the latest reading batch from the humidity endpoint.
#[derive(Debug, Clone)]
pub struct HumidityClient {
    url: String,
    download_client: Client,
}

impl HumidityClient {
    /// Creates a client for `url` whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::ClientBuild`] if the underlying HTTP client cannot be set up
    /// (e.g. the TLS backend fails to initialize).
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let download_client = Client::builder()
            .timeout(timeout)
            .gzip(true)
            .build()
            .map_err(FetchError::ClientBuild)?;
        Ok(Self {
            url: url.into(),
            download_client,
        })
    }

    pub fn from_config(config: &VisualizerConfig) -> Result<Self, FetchError> {
        Self::new(config.url.clone(), config.request_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetches the endpoint once and reshapes the payload into a [`ReadingBatch`].
    pub async fn fetch_batch(&self) -> Result<ReadingBatch, FetchError> {
        let body = self.download().await?;
        let batch = ReadingBatch::from_payload_bytes(&body)?;
        info!(
            "Fetched {} station readings for {}",
            batch.len(),
            batch.timestamp
        );
        Ok(batch)
    }

    async fn download(&self) -> Result<Vec<u8>, FetchError> {
        debug!("Downloading readings from {}", self.url);

        let response = self
            .download_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| FetchError::NetworkRequest(self.url.clone(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", self.url, e);
                return Err(if let Some(status) = e.status() {
                    FetchError::HttpStatus {
                        url: self.url.clone(),
                        status,
                        source: e,
                    }
                } else {
                    FetchError::NetworkRequest(self.url.clone(), e)
                });
            }
        };

        let bytes = response
            .bytes()
            .await
            .map_err(|e| FetchError::ResponseBody(self.url.clone(), e))?;
        debug!("Received {} bytes from {}", bytes.len(), self.url);
        Ok(bytes.to_vec())
    }
}

impl ReadingSource for HumidityClient {
    async fn fetch(&self) -> Result<ReadingBatch, FetchError> {
        self.fetch_batch().await
    }
}
