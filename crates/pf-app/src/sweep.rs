//! Parallel sweeps over the state-feedback poles gain.

use pf_project::schema::{ControlDef, Scenario};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AppError, AppResult};
use crate::report::FinalValues;
use crate::run_service::run_scenario;

/// Outcome of one sweep run; a failed design does not stop the sweep.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    pub poles_gain: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_values: Option<FinalValues>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diverged_at: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Run the scenario once per poles gain, in parallel across runs.
///
/// Points come back in the order of `gains`.
pub fn sweep_poles_gain(scenario: &Scenario, gains: &[f64]) -> AppResult<Vec<SweepPoint>> {
    if matches!(scenario.control, ControlDef::OpenLoop) {
        return Err(AppError::InvalidInput(
            "poles gain sweep needs a scenario with state feedback".to_string(),
        ));
    }
    if gains.is_empty() {
        return Err(AppError::InvalidInput(
            "poles gain sweep needs at least one gain".to_string(),
        ));
    }
    info!(scenario = %scenario.name, runs = gains.len(), "starting poles gain sweep");

    let points = gains
        .par_iter()
        .map(|&gain| {
            let mut variant = scenario.clone();
            variant.control = scenario.control.with_poles_gain(gain);
            match run_scenario(&variant) {
                Ok(report) => SweepPoint {
                    poles_gain: gain,
                    final_values: Some(report.final_values),
                    diverged_at: report.divergence.map(|d| d.t),
                    error: None,
                },
                Err(e) => {
                    warn!(poles_gain = gain, error = %e, "sweep run failed");
                    SweepPoint {
                        poles_gain: gain,
                        final_values: None,
                        diverged_at: None,
                        error: Some(e.to_string()),
                    }
                }
            }
        })
        .collect();
    Ok(points)
}
