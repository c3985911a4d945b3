//! Status publisher: media upload followed by a status update
//!
//! The publish step is deliberately thin. Credentials come in via
//! configuration at construction; nothing is retried here. A failed publish
//! fails the run, and the next scheduled trigger produces a fresh post.

use async_trait::async_trait;
use herdbot_common::{HerdBotError, Result};
use reqwest::{multipart, Client};
use serde::Deserialize;
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, instrument};

/// Configuration for the status publisher
#[derive(Debug, Clone)]
pub struct PublisherConfig {
    /// Media upload endpoint
    pub upload_url: String,
    /// Status update endpoint
    pub post_url: String,
    /// Account access token
    pub access_token: String,
    /// Request timeout in seconds (default: 30)
    pub timeout_secs: u64,
}

impl PublisherConfig {
    /// Create a configuration with the default Twitter endpoints
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            upload_url: "https://upload.twitter.com/1.1/media/upload.json".to_string(),
            post_url: "https://api.twitter.com/2/tweets".to_string(),
            access_token: access_token.into(),
            timeout_secs: 30,
        }
    }

    /// Override the media upload endpoint
    pub fn with_upload_url(mut self, url: impl Into<String>) -> Self {
        self.upload_url = url.into();
        self
    }

    /// Override the status update endpoint
    pub fn with_post_url(mut self, url: impl Into<String>) -> Self {
        self.post_url = url.into();
        self
    }

    /// Set the request timeout
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Trait for posting a caption + image to an external account
#[async_trait]
pub trait StatusPublisher: Send + Sync {
    /// Publish the given text with the attached PNG image.
    async fn publish(&self, text: &str, image_png: &[u8]) -> Result<()>;
}

/// Response of the media upload endpoint
#[derive(Debug, Deserialize)]
struct MediaUploadResponse {
    media_id_string: String,
}

/// Publisher for a Twitter-style API: upload the media first, then post the
/// status referencing it.
#[derive(Debug, Clone)]
pub struct TwitterPublisher {
    client: Client,
    config: PublisherConfig,
}

impl TwitterPublisher {
    /// Create a new publisher with the given configuration
    pub fn new(config: PublisherConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(HerdBotError::config("publisher access token is empty"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| HerdBotError::publish_with_cause("Failed to create HTTP client", e))?;

        Ok(Self { client, config })
    }

    /// Upload the image and return the media id to attach to the status.
    async fn upload_media(&self, image_png: &[u8]) -> Result<String> {
        let part = multipart::Part::bytes(image_png.to_vec())
            .file_name("daily_vacs.png")
            .mime_str("image/png")
            .map_err(|e| HerdBotError::publish_with_cause("Invalid media part", e))?;
        let form = multipart::Form::new().part("media", part);

        let response = self
            .client
            .post(&self.config.upload_url)
            .bearer_auth(&self.config.access_token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| HerdBotError::publish_with_cause("Media upload request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HerdBotError::publish_with_status(
                format!("media upload returned {}", status),
                status.as_u16(),
            ));
        }

        let body: MediaUploadResponse = response
            .json()
            .await
            .map_err(|e| HerdBotError::publish_with_cause("Malformed media upload response", e))?;

        debug!(media_id = %body.media_id_string, "Media uploaded");
        Ok(body.media_id_string)
    }
}

#[async_trait]
impl StatusPublisher for TwitterPublisher {
    #[instrument(skip(self, text, image_png), fields(image_bytes = image_png.len()))]
    async fn publish(&self, text: &str, image_png: &[u8]) -> Result<()> {
        let media_id = self.upload_media(image_png).await?;

        let payload = json!({
            "text": text,
            "media": { "media_ids": [media_id] },
        });

        let response = self
            .client
            .post(&self.config.post_url)
            .bearer_auth(&self.config.access_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| HerdBotError::publish_with_cause("Status update request failed", e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(HerdBotError::publish_with_status(
                format!("status update returned {}", status),
                status.as_u16(),
            ));
        }

        info!("Status published");
        Ok(())
    }
}

/// Publisher that accepts everything and posts nothing. Used for dry runs
/// and in pipeline tests.
#[derive(Debug, Default)]
pub struct NullPublisher {
    published: AtomicUsize,
}

impl NullPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// How many posts this publisher has swallowed
    pub fn published_count(&self) -> usize {
        self.published.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl StatusPublisher for NullPublisher {
    async fn publish(&self, text: &str, image_png: &[u8]) -> Result<()> {
        info!(
            chars = text.len(),
            image_bytes = image_png.len(),
            "Dry run: skipping publish"
        );
        self.published.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = PublisherConfig::new("token")
            .with_upload_url("http://localhost:9999/upload")
            .with_post_url("http://localhost:9999/post")
            .with_timeout(5);
        assert_eq!(config.upload_url, "http://localhost:9999/upload");
        assert_eq!(config.post_url, "http://localhost:9999/post");
        assert_eq!(config.timeout_secs, 5);
    }

    #[test]
    fn test_empty_token_rejected() {
        let err = TwitterPublisher::new(PublisherConfig::new("")).unwrap_err();
        assert!(matches!(err, HerdBotError::Config { .. }));
    }

    #[test]
    fn test_media_response_parsing() {
        let body = r#"{"media_id": 710511363345354753, "media_id_string": "710511363345354753"}"#;
        let parsed: MediaUploadResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.media_id_string, "710511363345354753");
    }

    #[tokio::test]
    async fn test_null_publisher_counts_posts() {
        let publisher = NullPublisher::new();
        publisher.publish("caption", &[1, 2, 3]).await.unwrap();
        publisher.publish("caption", &[1, 2, 3]).await.unwrap();
        assert_eq!(publisher.published_count(), 2);
    }
}
