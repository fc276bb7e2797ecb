//! Integration test: closed-loop runs on the mercury-filled reference plant.
//!
//! Checks that demonstrate:
//! - The open-loop trace matches a hand-written Euler loop
//! - Euler error halves with the step on a decoupled plant
//! - State feedback drives the plant to rest, reference tracking to r
//! - The estimator converges from a wrong initial guess

use nalgebra::{DMatrix, DVector};
use pf_controls::{ControlLaw, observer_gain, reference_gain, state_feedback_gain};
use pf_core::constants::{GRAVITY, MERCURY_DENSITY};
use pf_model::{ObservedOutputs, PhysicalParameters, StateSpaceModel};
use pf_sim::{ClosedLoopPlant, Estimator, SimError, SimOptions, run_closed_loop};

fn mercury_plant() -> PhysicalParameters {
    PhysicalParameters {
        tank_fluid_density: MERCURY_DENSITY,
        pipe_fluid_density: MERCURY_DENSITY,
        gravity: GRAVITY,
        tank_area: 0.05,
        pipe_length: 10.0,
        pipe_section_area: 0.00125664,
        piston_area: 0.00125664,
        mass: 5.0,
        spring_constant: 500.0,
        damping_constant: 40.0,
    }
}

fn model() -> StateSpaceModel {
    StateSpaceModel::derive(&mercury_plant(), ObservedOutputs::FullState).unwrap()
}

fn window(t_end: f64, dt: f64) -> SimOptions {
    SimOptions {
        t0: 0.0,
        t_end,
        dt,
        record_every: 1,
        ..SimOptions::default()
    }
}

#[test]
fn open_loop_matches_hand_written_euler() {
    let m = model();
    let x0 = [2.0, 0.0, GRAVITY * MERCURY_DENSITY];
    let mut plant =
        ClosedLoopPlant::new(&m, ControlLaw::OpenLoop, DVector::from_row_slice(&x0), None)
            .unwrap();
    let opts = window(50.0, 1e-3);
    let trace = run_closed_loop(&mut plant, &opts).unwrap();
    assert_eq!(trace.len(), 50_001);

    let a: Vec<[f64; 3]> = (0..3)
        .map(|i| [m.a()[(i, 0)], m.a()[(i, 1)], m.a()[(i, 2)]])
        .collect();
    let mut x = x0;
    for (k, sample) in trace.samples().iter().enumerate() {
        for i in 0..3 {
            let tol = 1e-6 * x[i].abs() + 1e-6;
            assert!(
                (sample.x[i] - x[i]).abs() <= tol,
                "step {k}, component {i}: {} vs {}",
                sample.x[i],
                x[i]
            );
        }
        assert_eq!(sample.u, 0.0);
        let dx: Vec<f64> = a
            .iter()
            .map(|row| row[0] * x[0] + row[1] * x[1] + row[2] * x[2])
            .collect();
        for i in 0..3 {
            x[i] += dx[i] * 1e-3;
        }
    }

    let last = trace.last().unwrap();
    assert!((last.t - 50.0).abs() < 1e-9);
    assert!(trace.first_non_finite().is_none());
}

#[test]
fn euler_error_halves_with_step() {
    let rates: [f64; 3] = [1.0, 2.0, 0.5];
    let a = DMatrix::from_diagonal(&DVector::from_iterator(3, rates.iter().map(|r| -r)));
    let m = StateSpaceModel::from_matrices(
        a,
        DMatrix::zeros(3, 1),
        DMatrix::identity(3, 3),
        DMatrix::zeros(3, 1),
    )
    .unwrap();

    let error_at = |dt: f64| {
        let mut plant =
            ClosedLoopPlant::new(&m, ControlLaw::OpenLoop, DVector::from_element(3, 1.0), None)
                .unwrap();
        let trace = run_closed_loop(&mut plant, &window(1.0, dt)).unwrap();
        let last = trace.last().unwrap();
        rates
            .iter()
            .enumerate()
            .map(|(i, r)| (last.x[i] - (-r * last.t).exp()).abs())
            .fold(0.0, f64::max)
    };

    let coarse = error_at(0.01);
    let fine = error_at(0.005);
    let ratio = coarse / fine;
    assert!(ratio > 1.8 && ratio < 2.2, "ratio {ratio}");

    // Decoupled decay never changes sign at these steps.
    let mut plant =
        ClosedLoopPlant::new(&m, ControlLaw::OpenLoop, DVector::from_element(3, 1.0), None)
            .unwrap();
    let trace = run_closed_loop(&mut plant, &window(5.0, 0.01)).unwrap();
    for pair in trace.samples().windows(2) {
        for i in 0..3 {
            assert!(pair[1].x[i] < pair[0].x[i] && pair[1].x[i] > 0.0);
        }
    }
}

#[test]
fn state_feedback_brings_plant_to_rest() {
    let m = model();
    let k = state_feedback_gain(m.a(), m.b(), 10.0).unwrap().gain;
    let law = ControlLaw::state_feedback(&k).unwrap();
    let x0 = DVector::from_vec(vec![-2.0, 0.0, GRAVITY * MERCURY_DENSITY]);
    let mut plant = ClosedLoopPlant::new(&m, law, x0, None).unwrap();
    let trace = run_closed_loop(&mut plant, &window(50.0, 1e-3)).unwrap();

    let last = trace.last().unwrap();
    assert!(last.x[0].abs() < 1e-3, "position {}", last.x[0]);
    assert!(last.x[1].abs() < 1e-3, "speed {}", last.x[1]);
    assert!(last.u.abs() < 1e-3 * trace.inputs()[1].abs().max(1.0));
}

#[test]
fn reference_tracking_settles_on_reference() {
    let m = model();
    let k = state_feedback_gain(m.a(), m.b(), 10.0).unwrap().gain;
    let n = reference_gain(m.a(), m.b(), &m.tracked_output(), &m.tracked_feedthrough(), &k)
        .unwrap()
        .n;
    let r = DVector::from_element(1, 5.0);
    let law = ControlLaw::reference_tracking(&k, &n, &r).unwrap();

    let params = mercury_plant();
    let h0 = params.spring_balanced_tank_height(2.0);
    let x0 = DVector::from_vec(vec![2.0, 0.0, params.pressure_for_tank_height(h0)]);
    let mut plant = ClosedLoopPlant::new(&m, law, x0, None).unwrap();
    let trace = run_closed_loop(&mut plant, &window(50.0, 1e-3)).unwrap();

    let last = trace.last().unwrap();
    assert!((last.x[0] - 5.0).abs() < 1e-3, "position {}", last.x[0]);
    assert!(last.x[1].abs() < 1e-3);
    // Steady state needs no flow: the tank stops moving.
    assert!(last.u.abs() < 1e-6, "input {}", last.u);
}

#[test]
fn estimator_converges_and_tracks() {
    let m = model();
    let position_only = m.with_outputs(ObservedOutputs::MassPosition);
    let k = state_feedback_gain(m.a(), m.b(), 10.0).unwrap().gain;
    let n = reference_gain(m.a(), m.b(), &m.tracked_output(), &m.tracked_feedthrough(), &k)
        .unwrap()
        .n;
    let l = observer_gain(position_only.a(), position_only.c(), 20.0)
        .unwrap()
        .gain;
    let r = DVector::from_element(1, 3.0);
    let law = ControlLaw::estimated_reference_tracking(&k, &n, &r).unwrap();

    let estimator = Estimator {
        l,
        c: position_only.c().clone(),
        initial: DVector::from_vec(vec![1.0, 0.0, 0.0]),
    };
    let x0 = DVector::from_vec(vec![2.0, 0.0, 0.0]);
    let mut plant = ClosedLoopPlant::new(&m, law, x0, Some(estimator)).unwrap();
    let trace = run_closed_loop(&mut plant, &window(50.0, 1e-3)).unwrap();

    let errors = trace.estimation_error_norms();
    assert_eq!(errors.len(), trace.len());
    assert!((errors[0] - 1.0).abs() < 1e-12);
    // t = 5 s, well before the error reaches rounding level.
    let early = errors[5_000];
    let end = errors[errors.len() - 1];
    assert!(end < early, "error grew from {early} to {end}");
    assert!(end < 1e-6, "final estimation error {end}");

    let last = trace.last().unwrap();
    assert!((last.x[0] - 3.0).abs() < 1e-3, "position {}", last.x[0]);
}

#[test]
fn decimated_trace_keeps_start_and_end() {
    let m = model();
    let mut plant = ClosedLoopPlant::new(
        &m,
        ControlLaw::OpenLoop,
        DVector::from_vec(vec![1.0, 0.0, 0.0]),
        None,
    )
    .unwrap();
    let opts = SimOptions {
        record_every: 3,
        ..window(1.0, 0.1)
    };
    let trace = run_closed_loop(&mut plant, &opts).unwrap();
    // Steps 0, 3, 6, 9 and the final step 10.
    assert_eq!(trace.len(), 5);
    assert_eq!(trace.samples()[0].t, 0.0);
    assert!((trace.last().unwrap().t - 1.0).abs() < 1e-12);
}

#[test]
fn bad_setup_is_rejected() {
    let m = model();
    let mut plant = ClosedLoopPlant::new(&m, ControlLaw::OpenLoop, DVector::zeros(3), None).unwrap();
    let err = run_closed_loop(&mut plant, &window(1.0, -0.1)).unwrap_err();
    assert!(matches!(err, SimError::InvalidArg { .. }));

    let nan = DVector::from_vec(vec![f64::NAN, 0.0, 0.0]);
    assert!(ClosedLoopPlant::new(&m, ControlLaw::OpenLoop, nan, None).is_err());
}

#[test]
fn recorded_input_is_the_one_that_drove_the_step() {
    let m = model();
    let k = state_feedback_gain(m.a(), m.b(), 10.0).unwrap().gain;
    let law = ControlLaw::state_feedback(&k).unwrap();
    let x0 = DVector::from_vec(vec![-2.0, 0.0, GRAVITY * MERCURY_DENSITY]);
    let mut plant = ClosedLoopPlant::new(&m, law.clone(), x0, None).unwrap();
    let trace = run_closed_loop(&mut plant, &window(3e-3 + 1e-12, 1e-3)).unwrap();

    let samples = trace.samples();
    assert_eq!(samples.len(), 4);
    assert_eq!(samples[0].u, 0.0);
    for pair in samples.windows(2) {
        assert_eq!(pair[1].u, law.input(&pair[0].x));
    }
    assert_ne!(samples[1].u, 0.0);
}

#[test]
fn empty_window_fails_before_integrating() {
    let m = model();
    let mut plant = ClosedLoopPlant::new(&m, ControlLaw::OpenLoop, DVector::zeros(3), None).unwrap();
    let opts = SimOptions {
        t0: 2.0,
        t_end: 2.0,
        ..SimOptions::default()
    };
    assert!(matches!(
        run_closed_loop(&mut plant, &opts),
        Err(SimError::InvalidArg { .. })
    ));
}
