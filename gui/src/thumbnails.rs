use listentothis_core::CoreError;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

const THUMBNAIL_TIMEOUT: Duration = Duration::from_secs(15);

/// Downloads thumbnail images for display.
#[derive(Debug, Clone)]
pub struct ThumbnailLoader {
    http_client: Client,
}

impl ThumbnailLoader {
    pub fn new(user_agent: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(THUMBNAIL_TIMEOUT)
            .build()?;
        Ok(Self { http_client })
    }

    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>, CoreError> {
        let response = self.http_client.get(url).send().await?.error_for_status()?;
        Ok(response.bytes().await?.to_vec())
    }

    /// Fetches each URL in turn. Failed downloads are skipped.
    pub async fn fetch_all(&self, urls: Vec<String>) -> Vec<(String, Vec<u8>)> {
        let mut images = Vec::with_capacity(urls.len());
        for url in urls {
            match self.fetch(&url).await {
                Ok(bytes) => {
                    debug!("Loaded thumbnail {} ({} bytes)", url, bytes.len());
                    images.push((url, bytes));
                }
                Err(e) => warn!("Skipping thumbnail {}: {}", url, e),
            }
        }
        images
    }
}
