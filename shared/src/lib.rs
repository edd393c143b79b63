//! Form Coach Shared Library
//!
//! Domain types and pure display/reward rules shared by the async client
//! and the WASM module.

pub mod activities;
pub mod errors;
pub mod formatting;
pub mod models;
pub mod rewards;

// Re-export commonly used items
pub use activities::Activity;
pub use errors::*;
pub use formatting::format_metrics_for_display;
pub use models::*;
pub use rewards::{coins_for_posture, derive_posture, RewardPolicy};
