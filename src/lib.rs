pub mod core;
pub mod domain;
pub mod engine;
pub mod providers;

#[cfg(test)]
mod test_support;

pub use crate::core::config::Settings;
pub use crate::domain::{
    CohortSubmission, CollusionReport, IntegrityCheckResult, ProctoringSession, RiskLevel,
    SubmissionCheckInput,
};
pub use crate::engine::IntegrityEngine;

use crate::core::telemetry;

/// Loads configuration from the environment, initializes tracing and
/// metrics, and wires up an engine backed by the configured HTTP providers.
pub async fn bootstrap() -> anyhow::Result<IntegrityEngine> {
    dotenvy::dotenv().ok();

    let settings = Settings::load()?;
    telemetry::init_tracing(&settings)?;
    core::metrics::init(&settings)?;

    let engine = IntegrityEngine::from_settings(&settings)?;

    tracing::info!(
        environment = %settings.runtime().environment.as_str(),
        "Veritas integrity engine ready"
    );

    Ok(engine)
}
