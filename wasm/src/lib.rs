//! Form Coach WASM Module
//!
//! WebAssembly bindings for the display and reward rules so a browser
//! shell renders results exactly like the native client.

use form_coach_shared::{
    coins_for_posture, derive_posture, format_metrics_for_display, Posture, WorkoutMetrics,
};
use wasm_bindgen::prelude::*;

/// Format a JSON metrics object for `activity_name`.
///
/// Returns a JSON array of `{label, value}` objects. Malformed input yields
/// an empty array.
#[wasm_bindgen]
pub fn format_metrics_json(metrics_json: &str, activity_name: &str) -> String {
    let metrics: WorkoutMetrics = serde_json::from_str(metrics_json).unwrap_or_default();
    let formatted = format_metrics_for_display(&metrics, activity_name);
    serde_json::to_string(&formatted).unwrap_or_else(|_| "[]".to_string())
}

/// `"Good"` or `"Bad"` for a JSON metrics object
#[wasm_bindgen]
pub fn derive_posture_label(metrics_json: &str) -> String {
    let metrics: WorkoutMetrics = serde_json::from_str(metrics_json).unwrap_or_default();
    derive_posture(&metrics).to_string()
}

/// Coins credited on submission for a posture label; unknown labels earn none
#[wasm_bindgen]
pub fn coins_for_posture_label(posture: &str) -> u32 {
    match posture {
        "Good" => coins_for_posture(Posture::Good),
        "Bad" => coins_for_posture(Posture::Bad),
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_metrics_json() {
        let json = format_metrics_json(
            r#"{"reps_completed": 10, "form_accuracy_percent": 80}"#,
            "Push-ups",
        );
        assert_eq!(
            json,
            r#"[{"label":"Reps Completed","value":10},{"label":"Form Accuracy","value":"80%"}]"#
        );
    }

    #[test]
    fn test_whole_float_accuracy() {
        let json = format_metrics_json(r#"{"form_accuracy_percent": 80.0}"#, "Sit-ups");
        assert_eq!(json, r#"[{"label":"Form Accuracy","value":"80%"}]"#);
    }

    #[test]
    fn test_malformed_metrics() {
        assert_eq!(format_metrics_json("not json", "Push-ups"), "[]");
        assert_eq!(derive_posture_label("not json"), "Good");
    }

    #[test]
    fn test_posture_and_coins() {
        assert_eq!(derive_posture_label(r#"{"form_accuracy_percent": 69}"#), "Bad");
        assert_eq!(derive_posture_label(r#"{"form_accuracy_percent": 70}"#), "Good");
        assert_eq!(coins_for_posture_label("Good"), 50);
        assert_eq!(coins_for_posture_label("Bad"), 25);
        assert_eq!(coins_for_posture_label("meh"), 0);
    }
}
