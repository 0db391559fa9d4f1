//! Common traits and types for image generation providers

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Parameters sent to the provider for one generation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// The prompt to generate images from
    pub prompt: String,

    /// Number of images to generate
    pub num_images: u32,

    /// Guidance scale / CFG scale
    pub guidance_scale: f32,

    /// Number of inference steps
    pub num_inference_steps: u32,

    /// Let the provider rewrite the prompt before inference
    pub expand_prompt: bool,
}

impl GenerationParams {
    /// The fixed parameter set used by the generation endpoint
    pub fn for_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            num_images: 1,
            guidance_scale: 3.5,
            num_inference_steps: 50,
            expand_prompt: true,
        }
    }
}

/// One image returned by the provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// URL to the image
    pub url: String,
}

/// Trait for text-to-image providers
#[async_trait]
pub trait ImageProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &str;

    /// Whether a credential is available for this provider
    fn is_configured(&self) -> bool;

    /// Generate images; an empty vector means the provider produced nothing
    async fn generate(&self, params: GenerationParams) -> Result<Vec<GeneratedImage>>;
}
