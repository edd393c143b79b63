//! Remote analysis backend
//!
//! [`WorkoutBackend`] is the seam between the views and the network so the
//! processing flow can run against the real [`WorkoutClient`] or a test
//! double.

use async_trait::async_trait;
use form_coach_shared::{ProcessingMode, WorkoutResult};

use crate::error::ClientResult;
use crate::upload::VideoUpload;

mod client;

pub use client::{absolute_url, CsvLog, WorkoutClient, DEFAULT_PROCESSING_ERROR};

/// Operations the app needs from the analysis backend
#[async_trait]
pub trait WorkoutBackend: Send + Sync {
    /// True iff the backend answered its health endpoint with a success status.
    /// Never fails: unreachable counts as unhealthy.
    async fn check_health(&self) -> bool;

    /// Upload a video for analysis and wait for the shaped result
    async fn process_workout(
        &self,
        video: VideoUpload,
        activity_name: &str,
        mode: ProcessingMode,
    ) -> ClientResult<WorkoutResult>;
}
