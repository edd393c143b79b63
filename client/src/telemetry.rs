//! Logging setup and metric names

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Health checks issued, labelled by `outcome`
pub const HEALTH_CHECKS_TOTAL: &str = "form_coach_health_checks_total";
/// Processing requests issued, labelled by `outcome`
pub const PROCESSING_REQUESTS_TOTAL: &str = "form_coach_processing_requests_total";
/// Workouts appended to the local history
pub const WORKOUTS_SUBMITTED_TOTAL: &str = "form_coach_workouts_submitted_total";

/// Initialize tracing/logging
///
/// JSON output in production, pretty output otherwise. `RUST_LOG` overrides
/// the default filter.
pub fn init_tracing(production: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if production {
            "form_coach_client=info".into()
        } else {
            "form_coach_client=debug,form_coach=debug,reqwest=warn".into()
        }
    });

    let subscriber = tracing_subscriber::registry().with(env_filter);

    if production {
        // JSON logging for production (better for log aggregation)
        subscriber
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
            .init();
    }
}
