//! Serializable run report: gains, diagnostics, pole maps and time series.

use nalgebra::{Complex, DMatrix};
use pf_controls::PolePlacement;
use pf_model::{OutputProjector, PlantReadout};
use pf_sim::SimulationTrace;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub scenario: String,
    pub law: String,
    pub diagnostics: Diagnostics,
    pub gains: Gains,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub pole_maps: Vec<PoleMap>,
    pub series: Series,
    pub final_values: FinalValues,
    /// First sample holding a non-finite value, if the run diverged.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub divergence: Option<Divergence>,
}

/// Structural checks; `None` when the check was not requested.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub controllable: Option<bool>,
    pub observable: Option<bool>,
    /// Observability from the measured mass position alone (estimator runs).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observable_from_position: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub k: Option<Vec<f64>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<Vec<f64>>,
}

impl Gains {
    pub fn row(m: &DMatrix<f64>) -> Vec<f64> {
        m.iter().copied().collect()
    }
}

/// Open-loop poles next to the placed ones, as `[re, im]` pairs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoleMap {
    pub gain: String,
    pub original: Vec<[f64; 2]>,
    pub placed: Vec<[f64; 2]>,
}

impl PoleMap {
    pub fn from_placement(gain: &str, placement: &PolePlacement) -> Self {
        Self {
            gain: gain.to_string(),
            original: placement.original_poles.iter().map(pair).collect(),
            placed: placement.placed_poles().iter().map(pair).collect(),
        }
    }
}

fn pair(c: &Complex<f64>) -> [f64; 2] {
    [c.re, c.im]
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub t: Vec<f64>,
    pub mass_position: Vec<f64>,
    pub mass_speed: Vec<f64>,
    pub tank_height: Vec<f64>,
    pub input_flow: Vec<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated: Option<EstimatedSeries>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EstimatedSeries {
    pub mass_position: Vec<f64>,
    pub mass_speed: Vec<f64>,
    pub tank_height: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinalValues {
    pub t: f64,
    pub mass_position: f64,
    pub mass_speed: f64,
    pub tank_height: f64,
    pub input_flow: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Divergence {
    pub sample: usize,
    pub t: f64,
}

impl Series {
    /// `None` when a sample does not hold the three plant states.
    pub fn from_trace(trace: &SimulationTrace, projector: &OutputProjector) -> Option<Self> {
        let mut series = Series {
            t: trace.times(),
            input_flow: trace.inputs(),
            ..Series::default()
        };
        let mut estimated = EstimatedSeries::default();
        let mut has_estimate = false;

        for sample in trace.samples() {
            push_readout(
                &mut series.mass_position,
                &mut series.mass_speed,
                &mut series.tank_height,
                projector.project(&sample.x)?,
            );
            if let Some(x_est) = &sample.x_est {
                has_estimate = true;
                push_readout(
                    &mut estimated.mass_position,
                    &mut estimated.mass_speed,
                    &mut estimated.tank_height,
                    projector.project(x_est)?,
                );
            }
        }

        if has_estimate {
            series.estimated = Some(estimated);
        }
        Some(series)
    }
}

fn push_readout(
    position: &mut Vec<f64>,
    speed: &mut Vec<f64>,
    height: &mut Vec<f64>,
    readout: PlantReadout,
) {
    position.push(readout.mass_position);
    speed.push(readout.mass_speed);
    height.push(readout.tank_height);
}

impl FinalValues {
    /// Values at the last sample; `None` for an empty trace or a state that
    /// cannot be projected.
    pub fn from_trace(trace: &SimulationTrace, projector: &OutputProjector) -> Option<Self> {
        let last = trace.last()?;
        let readout = projector.project(&last.x)?;
        Some(FinalValues {
            t: last.t,
            mass_position: readout.mass_position,
            mass_speed: readout.mass_speed,
            tank_height: readout.tank_height,
            input_flow: last.u,
        })
    }
}

impl RunReport {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
