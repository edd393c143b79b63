//! Posture verdict and reward rules
//!
//! A workout is judged on form accuracy alone. Missing accuracy counts as
//! good form: several activities (jumps, runs) never report it.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::activities::FORM_ACCURACY_KEY;
use crate::models::{DisplayValue, FormattedMetric, Posture, WorkoutHistoryRecord, WorkoutMetrics};

/// Minimum form accuracy (inclusive) for a good posture verdict
pub const GOOD_FORM_THRESHOLD_PERCENT: f64 = 70.0;

/// Maximum number of metric tiles on the results screen
pub const MAX_RESULT_TILES: usize = 6;

pub const FORM_ANALYZER_BADGE: &str = "Form Analyzer";
pub const CONSISTENCY_CHAMPION_BADGE: &str = "Consistency Champion";

/// Derive the posture verdict from the reported metrics
pub fn derive_posture(metrics: &WorkoutMetrics) -> Posture {
    match metrics.get_f64(FORM_ACCURACY_KEY) {
        Some(accuracy) if accuracy < GOOD_FORM_THRESHOLD_PERCENT => Posture::Bad,
        _ => Posture::Good,
    }
}

/// Coins credited for a submitted workout under the default policy
pub fn coins_for_posture(posture: Posture) -> u32 {
    RewardPolicy::default().coins_for(posture)
}

/// Rewards granted when a workout is submitted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewardPolicy {
    pub badges: Vec<String>,
    pub good_form_coins: u32,
    pub needs_work_coins: u32,
}

impl Default for RewardPolicy {
    fn default() -> Self {
        Self {
            badges: vec![
                FORM_ANALYZER_BADGE.to_string(),
                CONSISTENCY_CHAMPION_BADGE.to_string(),
            ],
            good_form_coins: 50,
            needs_work_coins: 25,
        }
    }
}

impl RewardPolicy {
    pub fn coins_for(&self, posture: Posture) -> u32 {
        match posture {
            Posture::Good => self.good_form_coins,
            Posture::Bad => self.needs_work_coins,
        }
    }

    /// Badge shown in the unlock overlay
    pub fn headline_badge(&self) -> &str {
        self.badges
            .first()
            .map(String::as_str)
            .unwrap_or(FORM_ANALYZER_BADGE)
    }

    /// Build the history entry for a workout submitted at `submitted_at`
    pub fn history_record(
        &self,
        activity_name: &str,
        posture: Posture,
        metrics: &WorkoutMetrics,
        formatted_metrics: &[FormattedMetric],
        video_url: &str,
        submitted_at: DateTime<Utc>,
    ) -> WorkoutHistoryRecord {
        WorkoutHistoryRecord {
            id: submitted_at.timestamp_millis(),
            activity_name: activity_name.to_string(),
            posture,
            metrics: metrics.clone(),
            formatted_metrics: formatted_metrics.to_vec(),
            timestamp: submitted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            video_url: video_url.to_string(),
            badges_earned: self.badges.clone(),
            coins_earned: self.coins_for(posture),
        }
    }
}

/// Caption of the posture badge on the results screen
pub fn posture_caption(posture: Posture) -> &'static str {
    match posture {
        Posture::Good => "✅ Excellent Form",
        Posture::Bad => "⚠️ Form Needs Work",
    }
}

/// Text of the coins overlay
pub fn coins_caption(coins: u32) -> String {
    format!("+{} coins", coins)
}

/// Tiles to render on the results screen.
///
/// At most [`MAX_RESULT_TILES`] metrics are shown; with nothing to show a
/// single `Result` tile carries the posture verdict instead.
pub fn result_tiles(formatted: &[FormattedMetric], posture: Posture) -> Vec<FormattedMetric> {
    if formatted.is_empty() {
        return vec![FormattedMetric::new(
            "Result",
            DisplayValue::Text(posture.as_str().to_string()),
        )];
    }
    formatted.iter().take(MAX_RESULT_TILES).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rstest::rstest;
    use serde_json::Number;

    #[rstest]
    #[case(Some(69.0), Posture::Bad)]
    #[case(Some(69.99), Posture::Bad)]
    #[case(Some(70.0), Posture::Good)]
    #[case(Some(100.0), Posture::Good)]
    #[case(Some(0.0), Posture::Bad)]
    #[case(None, Posture::Good)]
    fn test_posture_threshold(#[case] accuracy: Option<f64>, #[case] expected: Posture) {
        let mut metrics = WorkoutMetrics::new().with("reps_completed", 12);
        if let Some(a) = accuracy {
            metrics = metrics.with_f64(FORM_ACCURACY_KEY, a);
        }
        assert_eq!(derive_posture(&metrics), expected);
    }

    #[rstest]
    #[case(Posture::Good, 50)]
    #[case(Posture::Bad, 25)]
    fn test_coins(#[case] posture: Posture, #[case] coins: u32) {
        assert_eq!(coins_for_posture(posture), coins);
    }

    #[test]
    fn test_badges_are_fixed() {
        let policy = RewardPolicy::default();
        assert_eq!(policy.badges, vec!["Form Analyzer", "Consistency Champion"]);
        assert_eq!(policy.headline_badge(), "Form Analyzer");
    }

    #[test]
    fn test_history_record_fields() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).unwrap();
        let metrics = WorkoutMetrics::new().with(FORM_ACCURACY_KEY, 60);
        let formatted = vec![FormattedMetric::new("Form Accuracy", "60%".to_string())];

        let record = RewardPolicy::default().history_record(
            "Pull-ups",
            Posture::Bad,
            &metrics,
            &formatted,
            "http://localhost:8000/api/video/s1/annotated",
            at,
        );

        assert_eq!(record.id, at.timestamp_millis());
        assert_eq!(record.timestamp, "2024-03-01T08:30:00.000Z");
        assert_eq!(record.coins_earned, 25);
        assert_eq!(record.badges_earned.len(), 2);
        assert_eq!(record.formatted_metrics, formatted);
    }

    #[test]
    fn test_result_tiles_fallback() {
        let tiles = result_tiles(&[], Posture::Good);
        assert_eq!(tiles.len(), 1);
        assert_eq!(tiles[0].to_string(), "Result: Good");
    }

    #[test]
    fn test_result_tiles_capped() {
        let formatted: Vec<_> = (0..8)
            .map(|i| FormattedMetric::new(format!("m{}", i), Number::from(i)))
            .collect();
        let tiles = result_tiles(&formatted, Posture::Bad);
        assert_eq!(tiles.len(), MAX_RESULT_TILES);
        assert_eq!(tiles[5].label, "m5");
    }

    #[test]
    fn test_captions() {
        assert_eq!(posture_caption(Posture::Good), "✅ Excellent Form");
        assert_eq!(posture_caption(Posture::Bad), "⚠️ Form Needs Work");
        assert_eq!(coins_caption(50), "+50 coins");
    }
}
