//! HTTP client for the workout analysis backend

use async_trait::async_trait;
use form_coach_shared::{ProcessingMode, WorkoutResult};
use reqwest::multipart::Form;
use reqwest::{Client, Response};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::WorkoutBackend;
use crate::config::{normalize_base_url, BackendConfig};
use crate::error::{ClientError, ClientResult};
use crate::telemetry;
use crate::upload::VideoUpload;

/// Message used when the backend rejects a video without explaining why
pub const DEFAULT_PROCESSING_ERROR: &str = "Failed to process workout";

const HEALTH_PATH: &str = "/api/health";
const PROCESS_PATH: &str = "/api/process-workout";

/// Upper bound on a single health request
const HEALTH_TIMEOUT: Duration = Duration::from_secs(5);

/// Error body returned by the backend on failure
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<Value>,
}

/// Parsed per-session CSV log
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvLog {
    pub headers: Vec<String>,
    pub rows: Vec<BTreeMap<String, String>>,
}

impl CsvLog {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Values of one column, in row order
    pub fn column<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.rows
            .iter()
            .filter_map(move |row| row.get(name).map(String::as_str))
    }
}

/// Client for the analysis backend.
///
/// Cloning is cheap: the connection pool and base URL are shared.
#[derive(Debug, Clone)]
pub struct WorkoutClient {
    http: Client,
    base_url: Arc<str>,
}

impl WorkoutClient {
    pub fn new(base_url: &str) -> ClientResult<Self> {
        let http = Client::builder()
            .user_agent(concat!("form-coach/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: Arc::from(normalize_base_url(base_url)),
        })
    }

    pub fn from_config(config: &BackendConfig) -> ClientResult<Self> {
        Self::new(&config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a backend-relative path against the base URL
    pub fn absolute_url(&self, path: &str) -> String {
        absolute_url(&self.base_url, path)
    }

    /// Download and parse the CSV log for a processed session.
    ///
    /// Accepts either the absolute URL handed out in a [`WorkoutResult`] or a
    /// backend-relative path.
    pub async fn fetch_csv_log(&self, csv_url: &str) -> ClientResult<CsvLog> {
        let url = self.absolute_url(csv_url);
        debug!(url = %url, "fetching csv log");

        let response = self.http.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(backend_error(response, "Failed to fetch workout log").await);
        }

        let body = response.bytes().await?;
        parse_csv_log(&body)
    }

    async fn submit(
        &self,
        video: VideoUpload,
        activity_name: &str,
        mode: ProcessingMode,
    ) -> ClientResult<WorkoutResult> {
        if mode != ProcessingMode::Video {
            return Err(ClientError::UnsupportedMode(mode));
        }

        info!(
            activity = activity_name,
            file = video.file_name(),
            bytes = video.len(),
            "submitting workout video"
        );

        let form = Form::new()
            .part("video", video.into_part()?)
            .text("activity", activity_name.to_string())
            .text("mode", mode.as_str());

        let response = self
            .http
            .post(self.absolute_url(PROCESS_PATH))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(backend_error(response, DEFAULT_PROCESSING_ERROR).await);
        }

        let body = response.bytes().await?;
        let mut result: WorkoutResult =
            serde_json::from_slice(&body).map_err(|e| ClientError::Decode(e.to_string()))?;

        result.annotated_video_url = self.absolute_url(&result.annotated_video_url);
        result.csv_url = self.absolute_url(&result.csv_url);

        info!(
            session_id = %result.session_id,
            status = %result.status,
            metrics = result.metrics.len(),
            "workout processed"
        );
        Ok(result)
    }
}

#[async_trait]
impl WorkoutBackend for WorkoutClient {
    async fn check_health(&self) -> bool {
        let request = self
            .http
            .get(self.absolute_url(HEALTH_PATH))
            .timeout(HEALTH_TIMEOUT);
        let healthy = match request.send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "health check request failed");
                false
            }
        };

        metrics::counter!(
            telemetry::HEALTH_CHECKS_TOTAL,
            "outcome" => if healthy { "healthy" } else { "unhealthy" }
        )
        .increment(1);

        healthy
    }

    async fn process_workout(
        &self,
        video: VideoUpload,
        activity_name: &str,
        mode: ProcessingMode,
    ) -> ClientResult<WorkoutResult> {
        let result = self.submit(video, activity_name, mode).await;

        let outcome = if result.is_ok() { "success" } else { "failure" };
        metrics::counter!(telemetry::PROCESSING_REQUESTS_TOTAL, "outcome" => outcome).increment(1);

        result
    }
}

/// Join `path` onto `base_url`. Paths that are already absolute URLs are
/// returned unchanged, so rewriting twice is harmless.
pub fn absolute_url(base_url: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let base = base_url.trim_end_matches('/');
    if path.starts_with('/') {
        format!("{}{}", base, path)
    } else {
        format!("{}/{}", base, path)
    }
}

/// Turn a non-success response into a [`ClientError::Backend`] carrying the
/// backend's `detail`, or `fallback` when there is none.
async fn backend_error(response: Response, fallback: &str) -> ClientError {
    let status = response.status().as_u16();
    let body = response.bytes().await.unwrap_or_default();

    let detail = serde_json::from_slice::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.detail)
        .and_then(|d| match d {
            Value::String(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        });

    let message = detail.unwrap_or_else(|| fallback.to_string());
    warn!(status, message = %message, "backend rejected request");

    ClientError::Backend { status, message }
}

fn parse_csv_log(body: &[u8]) -> ClientResult<CsvLog> {
    let mut reader = csv::Reader::from_reader(body);
    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ClientError::Decode(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ClientError::Decode(e.to_string()))?;
        let row: BTreeMap<String, String> = headers
            .iter()
            .cloned()
            .zip(record.iter().map(str::to_string))
            .collect();
        rows.push(row);
    }

    Ok(CsvLog { headers, rows })
}
