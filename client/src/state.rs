//! Application state management
//!
//! Shared resources built once at startup and handed to each view.
//!
//! # Design Principles
//!
//! 1. **Build once**: the HTTP client (and its connection pool) is created at startup
//! 2. **Cheap cloning**: all fields are Arc'd or already Clone-cheap
//! 3. **One history writer**: every view gets a clone of the same [`HistoryStore`]

use std::sync::Arc;

use crate::api::WorkoutClient;
use crate::config::AppConfig;
use crate::error::ClientResult;
use crate::health::HealthMonitor;
use crate::history::HistoryStore;
use crate::processor::{VideoProcessor, ViewTiming};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Analysis backend client
    pub client: Arc<WorkoutClient>,
    /// Local workout history
    pub history: HistoryStore,
}

impl AppState {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let client = WorkoutClient::from_config(&config.backend)?;
        let history = HistoryStore::new(config.history.path.clone());

        Ok(Self {
            config: Arc::new(config),
            client: Arc::new(client),
            history,
        })
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Get a reference to the backend client
    #[inline]
    pub fn client(&self) -> &WorkoutClient {
        &self.client
    }

    /// Get a reference to the history store
    #[inline]
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Processing views configured with this state's timings
    pub fn processor(&self) -> VideoProcessor<WorkoutClient> {
        VideoProcessor::new(Arc::clone(&self.client), self.history.clone())
            .with_timing(ViewTiming::from(&self.config.processing))
    }

    /// Start polling backend health at the configured interval
    pub fn health_monitor(&self) -> HealthMonitor {
        HealthMonitor::spawn(Arc::clone(&self.client), self.config.health.poll_interval())
    }
}
