//! API module - Handlers and routing

pub mod handlers;
pub mod routes;

pub use routes::create_router;
