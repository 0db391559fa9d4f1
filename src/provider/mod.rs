//! Provider module - Image generation traits and the Fal HTTP client

pub mod fal;
pub mod traits;

pub use fal::FalClient;
pub use traits::{GeneratedImage, GenerationParams, ImageProvider};
