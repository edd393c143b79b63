//! Observable state of the video processing view

use form_coach_shared::rewards::{coins_caption, posture_caption, result_tiles};
use form_coach_shared::{FormattedMetric, Posture, WorkoutHistoryRecord, WorkoutMetrics};

/// What the backend told us about a successfully processed video
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisOutcome {
    pub session_id: String,
    pub posture: Posture,
    pub metrics: WorkoutMetrics,
    pub formatted_metrics: Vec<FormattedMetric>,
    pub video_url: String,
    pub csv_url: String,
}

impl AnalysisOutcome {
    /// Metric tiles for the results screen
    pub fn tiles(&self) -> Vec<FormattedMetric> {
        result_tiles(&self.formatted_metrics, self.posture)
    }

    pub fn caption(&self) -> &'static str {
        posture_caption(self.posture)
    }
}

/// Outcome of one processing attempt
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingResult {
    Good(AnalysisOutcome),
    Bad(AnalysisOutcome),
    /// The video could not be processed
    Poor { message: String },
    /// Flagged externally; only retry or exit are offered
    Anomaly { message: String },
}

impl ProcessingResult {
    pub fn from_outcome(outcome: AnalysisOutcome) -> Self {
        match outcome.posture {
            Posture::Good => ProcessingResult::Good(outcome),
            Posture::Bad => ProcessingResult::Bad(outcome),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ProcessingResult::Good(_) => "good",
            ProcessingResult::Bad(_) => "bad",
            ProcessingResult::Poor { .. } => "poor",
            ProcessingResult::Anomaly { .. } => "anomaly",
        }
    }

    /// The analysis, for the two states that can be submitted
    pub fn outcome(&self) -> Option<&AnalysisOutcome> {
        match self {
            ProcessingResult::Good(outcome) | ProcessingResult::Bad(outcome) => Some(outcome),
            _ => None,
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ProcessingResult::Poor { message } | ProcessingResult::Anomaly { message } => {
                Some(message)
            }
            _ => None,
        }
    }
}

/// Reward overlays currently on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewardOverlay {
    pub badge_visible: bool,
    pub coins_visible: bool,
}

impl RewardOverlay {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.badge_visible || self.coins_visible
    }
}

/// Everything a renderer needs to draw the view
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub activity_name: String,
    /// Decorative until the result arrives, then 100
    pub progress: u8,
    /// `None` while processing
    pub result: Option<ProcessingResult>,
    pub overlay: RewardOverlay,
}

impl ViewSnapshot {
    pub fn processing(activity_name: impl Into<String>) -> Self {
        Self {
            activity_name: activity_name.into(),
            progress: 0,
            result: None,
            overlay: RewardOverlay::hidden(),
        }
    }

    pub fn is_processing(&self) -> bool {
        self.result.is_none()
    }

    pub fn is_settled(&self) -> bool {
        self.result.is_some()
    }

    /// Results screen is showing and the workout can be submitted
    pub fn can_submit(&self) -> bool {
        self.result.as_ref().and_then(ProcessingResult::outcome).is_some()
    }

    pub fn processing_caption(&self) -> String {
        format!("AI is analyzing your {}...", self.activity_name)
    }

    pub fn progress_caption(&self) -> String {
        format!("{}% complete", self.progress)
    }

    /// Text of the coins overlay for the current result
    pub fn coins_caption(&self, coins: u32) -> Option<String> {
        (self.overlay.coins_visible && self.can_submit()).then(|| coins_caption(coins))
    }
}

/// One-shot effects the host UI should perform
#[derive(Debug, Clone, PartialEq)]
pub enum ViewEvent {
    /// Show a transient error notification
    Toast(String),
    /// Return to the upload screen
    Retry,
    /// Leave the workout
    Back,
    /// A workout was submitted and saved
    Completed(WorkoutHistoryRecord),
}
