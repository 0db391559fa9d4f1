//! Text-to-Image Gallery
//!
//! A small web service that forwards prompts to a hosted text-to-image
//! provider, records every generated image URL in a managed database and
//! serves a gallery page over the history.

pub mod api;
pub mod config;
pub mod error;
pub mod gallery;
pub mod middleware;
pub mod provider;
pub mod store;
pub mod ui;

pub use error::{AppError, Result};

use std::sync::Arc;

use gallery::GalleryService;
use provider::{FalClient, ImageProvider};
use store::RecordStore;
use ui::SimulatedProgress;

/// Application state shared across all handlers
pub struct AppState {
    pub settings: Arc<config::Settings>,
    pub gallery: GalleryService,
    /// Rendered gallery page
    pub index_page: String,
}

impl AppState {
    /// Assemble state from already constructed collaborators
    pub fn new(
        settings: config::Settings,
        provider: Arc<dyn ImageProvider>,
        store: Arc<dyn RecordStore>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            gallery: GalleryService::new(provider, store),
            index_page: ui::render_index(&SimulatedProgress::default()),
        }
    }

    /// Construct the Fal client and the configured record store
    pub fn from_settings(settings: config::Settings) -> Result<Self> {
        let provider: Arc<dyn ImageProvider> = Arc::new(FalClient::new(&settings.provider)?);
        let store = store::from_config(&settings.store)?;
        Ok(Self::new(settings, provider, store))
    }
}
