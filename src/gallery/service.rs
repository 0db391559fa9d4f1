//! Generation and listing orchestration

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{AppError, Result};
use crate::provider::fal::MISSING_KEY_MESSAGE;
use crate::provider::{GenerationParams, ImageProvider};
use crate::store::{GenerationRecord, NewGenerationRecord, RecordStore};

pub const PROMPT_REQUIRED: &str = "Prompt is required";
pub const NO_IMAGE_GENERATED: &str = "No image was generated";
pub const SAVE_FAILED: &str = "Failed to save image";
pub const FETCH_FAILED: &str = "Failed to fetch images";

/// Ties the image provider to the record store
#[derive(Clone)]
pub struct GalleryService {
    provider: Arc<dyn ImageProvider>,
    store: Arc<dyn RecordStore>,
}

impl GalleryService {
    pub fn new(provider: Arc<dyn ImageProvider>, store: Arc<dyn RecordStore>) -> Self {
        Self { provider, store }
    }

    /// Generate one image for `prompt`, persist it and return its URL.
    ///
    /// The store is only written after the provider returned an image.
    pub async fn generate(&self, prompt: Option<&str>) -> Result<String> {
        let prompt = match prompt {
            Some(p) if !p.trim().is_empty() => p,
            _ => return Err(AppError::Validation(PROMPT_REQUIRED.to_string())),
        };

        if !self.provider.is_configured() {
            return Err(AppError::Configuration(MISSING_KEY_MESSAGE.to_string()));
        }

        debug!(provider = %self.provider.name(), "Requesting image generation");
        let images = self
            .provider
            .generate(GenerationParams::for_prompt(prompt))
            .await?;

        let url = match images.into_iter().next() {
            Some(image) => image.url,
            None => {
                warn!(provider = %self.provider.name(), "Provider returned no images");
                return Err(AppError::Provider(NO_IMAGE_GENERATED.to_string()));
            }
        };

        let stored = self
            .store
            .insert(NewGenerationRecord::new(url.as_str(), prompt))
            .await
            .map_err(|e| AppError::persistence(SAVE_FAILED, e))?;

        info!(id = stored.id, store = %self.store.name(), "Saved generated image");
        Ok(url)
    }

    /// All generations, newest first
    pub async fn list(&self) -> Result<Vec<GenerationRecord>> {
        self.store
            .list_recent()
            .await
            .map_err(|e| AppError::persistence(FETCH_FAILED, e))
    }
}
