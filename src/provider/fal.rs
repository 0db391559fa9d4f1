//! Fal HTTP client implementation

use async_trait::async_trait;
use reqwest::{header::AUTHORIZATION, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::ProviderConfig;
use crate::error::{AppError, Result};
use crate::provider::traits::{GeneratedImage, GenerationParams, ImageProvider};

/// Message returned when no credential is available
pub const MISSING_KEY_MESSAGE: &str = "Fal AI key is not configured";

/// Client for Fal's synchronous run endpoint (`{base_url}/{model}`)
pub struct FalClient {
    client: Client,
    api_key: Option<String>,
    endpoint: String,
}

/// Request payload accepted by Fal text-to-image models
#[derive(Debug, Serialize)]
struct FalRequest<'a> {
    prompt: &'a str,
    num_images: u32,
    guidance_scale: f32,
    num_inference_steps: u32,
    expand_prompt: bool,
}

/// Response payload; only the image URLs are used
#[derive(Debug, Deserialize)]
struct FalResponse {
    #[serde(default)]
    images: Vec<FalImage>,
}

#[derive(Debug, Deserialize)]
struct FalImage {
    #[serde(default)]
    url: Option<String>,
}

impl FalClient {
    /// Create a new Fal client from configuration
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string);

        let endpoint = format!(
            "{}/{}",
            config.base_url.trim_end_matches('/'),
            config.model.trim_start_matches('/')
        );

        Ok(Self {
            client,
            api_key,
            endpoint,
        })
    }

    /// Full URL requests are posted to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ImageProvider for FalClient {
    fn name(&self) -> &str {
        "fal"
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn generate(&self, params: GenerationParams) -> Result<Vec<GeneratedImage>> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| AppError::Configuration(MISSING_KEY_MESSAGE.to_string()))?;

        debug!(endpoint = %self.endpoint, "Sending generate request");

        let payload = FalRequest {
            prompt: &params.prompt,
            num_images: params.num_images,
            guidance_scale: params.guidance_scale,
            num_inference_steps: params.num_inference_steps,
            expand_prompt: params.expand_prompt,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Key {}", api_key))
            .json(&payload)
            .send()
            .await
            .map_err(|e| AppError::Provider(format!("Fal request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
            warn!(endpoint = %self.endpoint, status = %status, "Fal returned an error status");
            return Err(AppError::Provider(format!("Fal returned {}: {}", status, body)));
        }

        let body = response
            .json::<FalResponse>()
            .await
            .map_err(|e| AppError::Provider(format!("Failed to parse Fal response: {}", e)))?;

        let images: Vec<GeneratedImage> = body
            .images
            .into_iter()
            .filter_map(|img| img.url)
            .filter(|url| !url.trim().is_empty())
            .map(|url| GeneratedImage { url })
            .collect();

        debug!(count = images.len(), "Fal returned images");
        Ok(images)
    }
}
