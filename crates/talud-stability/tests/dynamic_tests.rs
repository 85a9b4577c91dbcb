//! Tests for the moving-load dynamic analysis

use talud_stability::{
    AnalysisOptionsUpdate, DynamicOutcome, LineLoad, Material, Slope,
};

const LOAD_MAGNITUDE: f64 = 50.0;

fn cohesive_slope() -> Slope {
    let mut s = Slope::new(1.0, None, Some(1.0)).unwrap();

    s.set_materials(vec![
        Material::new(20.0, 35.0, 6.0, 1.0).unwrap(),
        Material::new(18.0, 30.0, 4.0, 5.0).unwrap(),
    ])
    .unwrap();

    s.update_analysis_options(AnalysisOptionsUpdate {
        iterations: Some(500),
        ..Default::default()
    })
    .unwrap();

    s
}

/// Static minimum FOS with the line load fixed at `offset`
fn static_fos_with_load_at(offset: f64) -> f64 {
    let mut s = cohesive_slope();
    s.set_line_loads(vec![LineLoad::new(LOAD_MAGNITUDE, offset).unwrap()])
        .unwrap();
    s.analyse_slope(None).unwrap();
    s.min_fos().unwrap()
}

fn dynamic_slope() -> Slope {
    let mut s = cohesive_slope();
    s.set_line_loads(vec![LineLoad::new(LOAD_MAGNITUDE, 0.0)
        .unwrap()
        .with_dynamic_offset()])
        .unwrap();
    s
}

#[test]
fn load_at_crest_is_worse_than_load_far_away() {
    let near = static_fos_with_load_at(0.0);
    let far = static_fos_with_load_at(0.99);

    assert!(near < far, "near {near:.3} should be below far {far:.3}");
}

#[test]
fn converges_to_an_intermediate_offset() {
    let near = static_fos_with_load_at(0.0);
    let far = static_fos_with_load_at(0.99);
    let target = (near + far) / 2.0;

    let mut s = dynamic_slope();
    let outcome = s.analyse_dynamic(target).unwrap();

    assert_eq!(outcome, DynamicOutcome::Converged);

    // two endpoint checks plus at most ten bisection steps
    let results = s.dynamic_results();
    assert!(results.len() >= 3 && results.len() <= 12);

    for &(offset, fos) in results {
        assert!(offset.is_finite() && offset >= 0.0);
        assert!(fos.is_finite() && fos > 0.0);
    }

    // the record is sorted ascending by factor of safety
    for pair in results.windows(2) {
        assert!(pair[0].1 <= pair[1].1);
    }
}

#[test]
fn safe_slope_returns_immediately() {
    let near = static_fos_with_load_at(0.0);

    let mut s = dynamic_slope();
    let outcome = s.analyse_dynamic(near / 2.0).unwrap();

    assert_eq!(outcome, DynamicOutcome::AlreadyStable);
    assert_eq!(s.dynamic_results().len(), 1);
}

#[test]
fn unreachable_target_detected_at_far_end() {
    let far = static_fos_with_load_at(0.99);

    let mut s = dynamic_slope();
    let outcome = s.analyse_dynamic(far + 1.0).unwrap();

    assert_eq!(outcome, DynamicOutcome::TargetUnreachable);
    assert_eq!(s.dynamic_results().len(), 2);
}

#[test]
fn rerunning_resets_previous_results() {
    let near = static_fos_with_load_at(0.0);

    let mut s = dynamic_slope();
    s.analyse_dynamic(near / 2.0).unwrap();
    assert_eq!(s.dynamic_results().len(), 1);

    s.analyse_dynamic(near / 2.0).unwrap();
    assert_eq!(s.dynamic_results().len(), 1);
}
