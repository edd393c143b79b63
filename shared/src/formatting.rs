//! Metric formatting for the results screen

use crate::activities::{Activity, FORM_ACCURACY_KEY};
use crate::models::{display_number, DisplayValue, FormattedMetric, WorkoutMetrics};

/// Select and label the metrics relevant to `activity_name`.
///
/// Entries follow the activity's fixed order; metrics the backend did not
/// report are skipped. Form accuracy is rendered with a `%` suffix, every
/// other value is passed through untouched. Unrecognized activities yield
/// an empty list.
pub fn format_metrics_for_display(
    metrics: &WorkoutMetrics,
    activity_name: &str,
) -> Vec<FormattedMetric> {
    let Some(activity) = Activity::from_name(activity_name) else {
        return Vec::new();
    };

    activity
        .metric_table()
        .iter()
        .filter_map(|&(key, label)| {
            let value = metrics.number(key)?;
            let value = if key == FORM_ACCURACY_KEY {
                DisplayValue::Text(format!("{}%", display_number(value)))
            } else {
                DisplayValue::Number(value.clone())
            };
            Some(FormattedMetric::new(label, value))
        })
        .collect()
}
