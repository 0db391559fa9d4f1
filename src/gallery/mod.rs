//! Gallery module - The generate-then-persist flow and history listing

pub mod service;

pub use service::GalleryService;
