//! UI module - The embedded gallery page and its progress simulation

pub mod page;
pub mod progress;

pub use page::render_index;
pub use progress::SimulatedProgress;
