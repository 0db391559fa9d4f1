//! Middleware module

pub mod rate_limit;

pub use rate_limit::RateLimitLayer;
