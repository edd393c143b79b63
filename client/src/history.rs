//! Local workout history
//!
//! Submitted workouts are appended to a single JSON array on disk. Entries
//! are never edited or removed. All appends in a process go through one
//! lock, and the file is replaced atomically so a reader never observes a
//! half-written list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use form_coach_shared::WorkoutHistoryRecord;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};
use crate::telemetry;

/// Append-only store of submitted workouts.
///
/// Clones share the same writer lock.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    path: Arc<PathBuf>,
    writer: Arc<Mutex<()>>,
}

impl HistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            writer: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// All readable records, oldest first.
    ///
    /// Entries written by other tools in a shape this crate does not know
    /// are skipped, not treated as corruption.
    pub async fn load_all(&self) -> ClientResult<Vec<WorkoutHistoryRecord>> {
        let entries = self.read_entries().await?;
        let mut records = Vec::with_capacity(entries.len());

        for (index, entry) in entries.into_iter().enumerate() {
            match serde_json::from_value::<WorkoutHistoryRecord>(entry) {
                Ok(record) => records.push(record),
                Err(e) => warn!(index, error = %e, "skipping unreadable history entry"),
            }
        }

        Ok(records)
    }

    /// Append `record`, returning the number of entries now stored
    pub async fn append(&self, record: &WorkoutHistoryRecord) -> ClientResult<usize> {
        let _guard = self.writer.lock().await;

        let mut entries = self.read_entries().await?;
        let entry = serde_json::to_value(record)
            .map_err(|e| ClientError::Storage(format!("Failed to encode record: {}", e)))?;
        entries.push(entry);

        self.write_entries(&entries).await?;
        metrics::counter!(telemetry::WORKOUTS_SUBMITTED_TOTAL).increment(1);

        info!(
            id = record.id,
            activity = %record.activity_name,
            coins = record.coins_earned,
            total = entries.len(),
            "workout saved to history"
        );
        Ok(entries.len())
    }

    /// Coins earned across every stored workout
    pub async fn total_coins(&self) -> ClientResult<u64> {
        Ok(self
            .load_all()
            .await?
            .iter()
            .map(|r| u64::from(r.coins_earned))
            .sum())
    }

    async fn read_entries(&self) -> ClientResult<Vec<Value>> {
        let bytes = match tokio::fs::read(self.path.as_path()).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no history file yet");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Vec::new());
        }

        serde_json::from_slice(&bytes).map_err(|e| {
            ClientError::Storage(format!(
                "History file {} is not a JSON list: {}",
                self.path.display(),
                e
            ))
        })
    }

    async fn write_entries(&self, entries: &[Value]) -> ClientResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let body = serde_json::to_vec_pretty(entries)
            .map_err(|e| ClientError::Storage(format!("Failed to encode history: {}", e)))?;

        let mut tmp = self.path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, self.path.as_path()).await?;
        Ok(())
    }
}
