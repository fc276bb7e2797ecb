//! Scenario execution: model, diagnostics, gain design, integration, report.

use std::path::Path;
use std::time::Instant;

use nalgebra::{DMatrix, DVector};
use pf_controls::{
    ControlLaw, is_controllable, is_observable, observer_gain, reference_gain, state_feedback_gain,
};
use pf_model::{OutputProjector, StateSpaceModel};
use pf_project::schema::{ChecksDef, ControlDef, Scenario};
use pf_sim::{ClosedLoopPlant, Estimator, run_closed_loop};
use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::project_service;
use crate::report::{Diagnostics, Divergence, FinalValues, Gains, PoleMap, RunReport, Series};
use crate::scenario_compile::{ScenarioRuntime, compile_scenario};

/// Control law, optional estimator and the gains behind them.
#[derive(Debug, Clone)]
pub struct ControlDesign {
    pub law: ControlLaw,
    pub estimator: Option<Estimator>,
    pub gains: Gains,
    pub pole_maps: Vec<PoleMap>,
}

/// Load, validate and run a scenario file.
pub fn run_scenario_file(path: &Path) -> AppResult<RunReport> {
    let scenario = project_service::load_scenario(path)?;
    run_scenario(&scenario)
}

/// Run one scenario end to end.
///
/// Gain synthesis failures abort before integration. Divergence does not: it
/// is reported in [`RunReport::divergence`] and logged.
pub fn run_scenario(scenario: &Scenario) -> AppResult<RunReport> {
    let started = Instant::now();
    info!(scenario = %scenario.name, "running scenario");

    let runtime = compile_scenario(scenario)?;
    let diagnostics = run_diagnostics(&scenario.checks, &scenario.control, &runtime.model)?;
    let design = design_control(&scenario.control, &runtime)?;

    let mut plant = ClosedLoopPlant::new(
        &runtime.model,
        design.law.clone(),
        runtime.initial_state.clone(),
        design.estimator.clone(),
    )?;
    let trace = run_closed_loop(&mut plant, &runtime.options)?;

    let divergence = trace.first_non_finite().map(|(sample, t)| {
        warn!(sample, t, "simulation diverged: non-finite values in trace");
        Divergence { sample, t }
    });

    let projector = OutputProjector::new(&runtime.params);
    let final_values = FinalValues::from_trace(&trace, &projector)
        .ok_or_else(|| AppError::InvalidInput("simulation produced no samples".to_string()))?;
    let series = Series::from_trace(&trace, &projector).ok_or_else(|| {
        AppError::InvalidInput("trace states do not match the plant readout".to_string())
    })?;
    info!(
        scenario = %scenario.name,
        mass_position = final_values.mass_position,
        tank_height = final_values.tank_height,
        elapsed_s = started.elapsed().as_secs_f64(),
        "scenario finished"
    );

    Ok(RunReport {
        scenario: scenario.name.clone(),
        law: design.law.name().to_string(),
        diagnostics,
        gains: design.gains,
        pole_maps: design.pole_maps,
        series,
        final_values,
        divergence,
    })
}

/// Controllability and observability, as requested by the scenario.
pub fn run_diagnostics(
    checks: &ChecksDef,
    control: &ControlDef,
    model: &StateSpaceModel,
) -> AppResult<Diagnostics> {
    let mut diagnostics = Diagnostics::default();
    if checks.controllability {
        diagnostics.controllable = Some(is_controllable(model.a(), model.b())?);
    }
    if checks.observability {
        diagnostics.observable = Some(is_observable(model.a(), model.c())?);
        if matches!(control, ControlDef::EstimatedReferenceTracking { .. }) {
            diagnostics.observable_from_position =
                Some(is_observable(model.a(), &model.tracked_output())?);
        }
    }
    info!(
        controllable = ?diagnostics.controllable,
        observable = ?diagnostics.observable,
        "structural diagnostics"
    );
    Ok(diagnostics)
}

/// Synthesize K, N and L as the control definition requires.
pub fn design_control(control: &ControlDef, runtime: &ScenarioRuntime) -> AppResult<ControlDesign> {
    let model = &runtime.model;
    let mut gains = Gains::default();
    let mut pole_maps = Vec::new();

    let (law, estimator) = match control {
        ControlDef::OpenLoop => (ControlLaw::OpenLoop, None),
        ControlDef::StateFeedback { poles_gain } => {
            let k = feedback_gain(model, *poles_gain, &mut gains, &mut pole_maps)?;
            (ControlLaw::state_feedback(&k)?, None)
        }
        ControlDef::ReferenceTracking {
            poles_gain,
            reference_m,
        } => {
            let k = feedback_gain(model, *poles_gain, &mut gains, &mut pole_maps)?;
            let n = feedforward_gain(model, &k, &mut gains)?;
            let r = DVector::from_element(1, *reference_m);
            (ControlLaw::reference_tracking(&k, &n, &r)?, None)
        }
        ControlDef::EstimatedReferenceTracking {
            poles_gain,
            observer_poles_gain,
            reference_m,
            initial_estimate,
        } => {
            let k = feedback_gain(model, *poles_gain, &mut gains, &mut pole_maps)?;
            let n = feedforward_gain(model, &k, &mut gains)?;

            // The estimator measures the tracked output only.
            let c = model.tracked_output();
            let placement = observer_gain(model.a(), &c, *observer_poles_gain)?;
            debug!(l = ?placement.gain.as_slice(), target = %placement.target_pole, "observer gain");
            gains.l = Some(Gains::row(&placement.gain));
            pole_maps.push(PoleMap::from_placement("L", &placement));

            let initial = match initial_estimate {
                Some(x) => DVector::from_row_slice(x),
                None => runtime.initial_state.clone(),
            };
            let r = DVector::from_element(1, *reference_m);
            (
                ControlLaw::estimated_reference_tracking(&k, &n, &r)?,
                Some(Estimator {
                    l: placement.gain,
                    c,
                    initial,
                }),
            )
        }
    };

    info!(law = law.name(), "control designed");
    Ok(ControlDesign {
        law,
        estimator,
        gains,
        pole_maps,
    })
}

fn feedback_gain(
    model: &StateSpaceModel,
    poles_gain: f64,
    gains: &mut Gains,
    pole_maps: &mut Vec<PoleMap>,
) -> AppResult<DMatrix<f64>> {
    let placement = state_feedback_gain(model.a(), model.b(), poles_gain)?;
    debug!(k = ?placement.gain.as_slice(), target = %placement.target_pole, "state feedback gain");
    gains.k = Some(Gains::row(&placement.gain));
    pole_maps.push(PoleMap::from_placement("K", &placement));
    Ok(placement.gain)
}

fn feedforward_gain(
    model: &StateSpaceModel,
    k: &DMatrix<f64>,
    gains: &mut Gains,
) -> AppResult<DMatrix<f64>> {
    let n = reference_gain(
        model.a(),
        model.b(),
        &model.tracked_output(),
        &model.tracked_feedthrough(),
        k,
    )?
    .n;
    debug!(n = n[(0, 0)], "reference gain");
    gains.n = Some(n[(0, 0)]);
    Ok(n)
}
