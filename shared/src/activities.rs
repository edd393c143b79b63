//! Recognized workout activities and the metrics each one reports
//!
//! Activity names are matched exactly as the app presents them
//! (e.g. `Push-ups`, `Sit & Reach`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::DomainError;

/// Metric key whose value is rendered as a percentage
pub const FORM_ACCURACY_KEY: &str = "form_accuracy_percent";

/// Ordered (metric key, label) pairs for a family of activities
pub type MetricTable = &'static [(&'static str, &'static str)];

const REPETITION_METRICS: MetricTable = &[
    ("reps_completed", "Reps Completed"),
    ("correct_reps", "Correct Reps"),
    ("incorrect_reps", "Incorrect Reps"),
    ("time_sec", "Time (s)"),
    (FORM_ACCURACY_KEY, "Form Accuracy"),
    ("avg_rep_duration_sec", "Avg Rep Duration (s)"),
];

const VERTICAL_JUMP_METRICS: MetricTable = &[
    ("jump_height_m", "Jump Height (m)"),
    ("avg_jump_height_m", "Avg Jump Height (m)"),
    ("air_time_s", "Air Time (s)"),
    ("total_jumps", "Total Jumps"),
];

const SHUTTLE_RUN_METRICS: MetricTable = &[
    ("distance_m", "Total Distance (m)"),
    ("time_sec", "Time Taken (s)"),
    ("laps_completed", "Laps Completed"),
    ("avg_split_time_sec", "Avg Split Time (s)"),
];

const SIT_AND_REACH_METRICS: MetricTable = &[
    ("reach_cm", "Best Reach (cm)"),
    ("time_sec", "Attempt Time (s)"),
];

const BROAD_JUMP_METRICS: MetricTable = &[
    ("max_distance_m", "Max Distance (m)"),
    ("avg_distance_m", "Avg Distance (m)"),
    ("total_jumps", "Total Jumps"),
];

/// A workout activity the analysis backend knows how to score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Activity {
    #[serde(rename = "Push-ups")]
    PushUps,
    #[serde(rename = "Pull-ups")]
    PullUps,
    #[serde(rename = "Sit-ups")]
    SitUps,
    #[serde(rename = "Vertical Jump")]
    VerticalJump,
    #[serde(rename = "Shuttle Run")]
    ShuttleRun,
    #[serde(rename = "Sit & Reach")]
    SitAndReach,
    #[serde(rename = "Standing Broad Jump")]
    StandingBroadJump,
}

impl Activity {
    pub const ALL: [Activity; 7] = [
        Activity::PushUps,
        Activity::PullUps,
        Activity::SitUps,
        Activity::VerticalJump,
        Activity::ShuttleRun,
        Activity::SitAndReach,
        Activity::StandingBroadJump,
    ];

    /// Display name, as sent to the backend in the `activity` form field
    pub fn name(&self) -> &'static str {
        match self {
            Activity::PushUps => "Push-ups",
            Activity::PullUps => "Pull-ups",
            Activity::SitUps => "Sit-ups",
            Activity::VerticalJump => "Vertical Jump",
            Activity::ShuttleRun => "Shuttle Run",
            Activity::SitAndReach => "Sit & Reach",
            Activity::StandingBroadJump => "Standing Broad Jump",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|a| a.name() == name)
    }

    /// Metrics shown for this activity, in render order
    pub fn metric_table(&self) -> MetricTable {
        match self {
            Activity::PushUps | Activity::PullUps | Activity::SitUps => REPETITION_METRICS,
            Activity::VerticalJump => VERTICAL_JUMP_METRICS,
            Activity::ShuttleRun => SHUTTLE_RUN_METRICS,
            Activity::SitAndReach => SIT_AND_REACH_METRICS,
            Activity::StandingBroadJump => BROAD_JUMP_METRICS,
        }
    }
}

impl fmt::Display for Activity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Activity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| DomainError::UnknownActivity(s.to_string()))
    }
}
