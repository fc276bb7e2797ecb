use pf_project::{ControlDef, InitialStateDef, LATEST_VERSION, OutputsDef};
use std::path::Path;

#[test]
fn bundled_scenarios_load_and_validate() {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../scenarios");
    let scenarios = [
        "01_open_loop.yaml",
        "02_state_feedback.yaml",
        "03_reference_tracking.yaml",
        "04_estimated_reference_tracking.yaml",
    ];

    for name in scenarios {
        let path = root.join(name);
        let scenario =
            pf_project::load(&path).unwrap_or_else(|e| panic!("Failed to load {}: {}", name, e));
        pf_project::validate_scenario(&scenario)
            .unwrap_or_else(|e| panic!("Failed to validate {}: {}", name, e));
        assert_eq!(scenario.version, LATEST_VERSION);
        assert_eq!(scenario.outputs, OutputsDef::FullState);
    }
}

#[test]
fn estimator_scenario_keeps_both_gains() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../scenarios/04_estimated_reference_tracking.yaml");
    let scenario = pf_project::load_yaml(&path).unwrap();
    match scenario.control {
        ControlDef::EstimatedReferenceTracking {
            poles_gain,
            observer_poles_gain,
            reference_m,
            initial_estimate,
        } => {
            assert_eq!(poles_gain, 10.0);
            assert_eq!(observer_poles_gain, 20.0);
            assert_eq!(reference_m, 3.0);
            assert_eq!(initial_estimate, Some([2.0, 0.0, 0.0]));
        }
        other => panic!("unexpected control {other:?}"),
    }
    assert_eq!(
        scenario.initial_state,
        InitialStateDef::Explicit {
            x: [2.0, 0.0, 0.0]
        }
    );
}
