//! Form Coach client library
//!
//! Uploads workout videos to the analysis backend, watches its health, and
//! drives the processing view from upload to a saved history record.

pub mod api;
pub mod config;
pub mod error;
pub mod health;
pub mod history;
pub mod processor;
pub mod progress;
pub mod state;
pub mod telemetry;
pub mod upload;

pub use api::{WorkoutBackend, WorkoutClient};
pub use error::{ClientError, ClientResult};
pub use health::{ConnectionStatus, HealthMonitor};
pub use history::HistoryStore;
pub use processor::{ProcessingHandle, ProcessingResult, VideoProcessor, ViewEvent, ViewSnapshot};
pub use state::AppState;
pub use upload::VideoUpload;
