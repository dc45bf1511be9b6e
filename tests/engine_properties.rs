//! Property sweeps over the generic engine: membership bounds, aggregation
//! monotonicity and maximum-based defuzzification tie-breaks.

use mi_fuzzy_core::defuzz::{largest_of_maximum, mean_of_maximum, smallest_of_maximum};
use mi_fuzzy_core::engine::AggregatedSet;
use mi_fuzzy_core::rule::is;
use mi_fuzzy_core::{
    DefuzzMethod, InferenceSystem, LinguisticVariable, MembershipFunction, Rule, TermRef, Universe,
};

// ─── helpers ─────────────────────────────────────────────────────────────────

fn shapes() -> Vec<MembershipFunction> {
    vec![
        MembershipFunction::trapezoid(0.0, 0.0, 0.035, 0.060).unwrap(),
        MembershipFunction::trapezoid(0.045, 0.055, 0.065, 0.080).unwrap(),
        MembershipFunction::trapezoid(-0.4, -0.4, -0.03, -0.02).unwrap(),
        MembershipFunction::triangle(-0.03, 0.0, 0.03).unwrap(),
        MembershipFunction::triangle(-1.0, -1.0, 0.0).unwrap(),
        // degenerate: a spike and a vertical-edged box
        MembershipFunction::triangle(0.5, 0.5, 0.5).unwrap(),
        MembershipFunction::trapezoid(0.2, 0.2, 0.4, 0.4).unwrap(),
    ]
}

/// One input `x` on `[0, 1]` with a single falling term, driving one output term.
fn single_rule_system(method: DefuzzMethod) -> InferenceSystem {
    let x = LinguisticVariable::antecedent("x", Universe::new(0.0, 1.0, 0.05).unwrap())
        .with_term("low", MembershipFunction::triangle(0.0, 0.0, 1.0).unwrap())
        .unwrap();
    let y = LinguisticVariable::consequent("y", Universe::new(-1.0, 1.0, 0.25).unwrap(), method)
        .with_term("up", MembershipFunction::triangle(-1.0, 1.0, 1.0).unwrap())
        .unwrap();
    InferenceSystem::builder()
        .input(x)
        .output(y)
        .rule(Rule::new(is("x", "low"), TermRef::new("y", "up")))
        .build()
        .unwrap()
}

fn aggregate(system: &InferenceSystem, x: f64) -> AggregatedSet {
    let mut s = system.session();
    s.fuzzify(&[x]).unwrap();
    s.evaluate_rules().unwrap();
    s.aggregate().unwrap();
    s.output_set().clone()
}

fn degree_at(set: &AggregatedSet, x: f64) -> f64 {
    set.iter().find(|&(sx, _)| sx == x).map(|(_, d)| d).unwrap()
}

// ─── membership ──────────────────────────────────────────────────────────────

#[test]
fn degrees_stay_in_unit_interval() {
    for mf in shapes() {
        for i in -2000..=2000 {
            let x = i as f64 * 0.001;
            let d = mf.evaluate(x);
            assert!((0.0..=1.0).contains(&d), "{:?} at {} -> {}", mf, x, d);
        }
        for x in [f64::INFINITY, f64::NEG_INFINITY, f64::MAX, f64::MIN] {
            assert!((0.0..=1.0).contains(&mf.evaluate(x)));
        }
        assert_eq!(mf.evaluate(f64::NAN), 0.0);
    }
}

#[test]
fn zero_outside_support_one_on_core() {
    for mf in shapes() {
        let (lo, hi) = mf.support();
        let (c0, c1) = mf.core();
        assert_eq!(mf.evaluate(lo - 0.01), 0.0, "{:?}", mf);
        assert_eq!(mf.evaluate(hi + 0.01), 0.0, "{:?}", mf);
        assert_eq!(mf.evaluate(c0), 1.0, "{:?}", mf);
        assert_eq!(mf.evaluate(c1), 1.0, "{:?}", mf);
        assert_eq!(mf.evaluate((c0 + c1) / 2.0), 1.0, "{:?}", mf);
    }
}

// ─── aggregation ─────────────────────────────────────────────────────────────

#[test]
fn aggregation_is_monotonic_in_firing_strength() {
    let sys = single_rule_system(DefuzzMethod::Centroid);
    let samples = sys.output().universe().samples().to_vec();

    // x falling → firing strength rising
    let mut prev = aggregate(&sys, 1.0);
    assert!(prev.is_empty_set());
    for i in (0..20).rev() {
        let next = aggregate(&sys, i as f64 * 0.05);
        for &s in &samples {
            assert!(
                degree_at(&next, s) >= degree_at(&prev, s) - 1e-12,
                "degree at {} dropped when strength rose",
                s
            );
        }
        assert!(next.peak() >= prev.peak());
        prev = next;
    }
    assert_eq!(prev.peak(), 1.0);
}

#[test]
fn output_axis_is_strictly_increasing() {
    let sys = single_rule_system(DefuzzMethod::LargestOfMaximum);
    for i in 0..=20 {
        let set = aggregate(&sys, i as f64 * 0.05);
        assert!(set.xs().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(set.xs().len(), set.degrees().len());
        assert!(set.degrees().iter().all(|d| (0.0..=1.0).contains(d)));
    }
}

#[test]
fn clipped_plateau_is_found_exactly() {
    // strength 0.5 on `up` = tri(-1, 1, 1): curve crosses 0.5 at x = 0
    let sys = single_rule_system(DefuzzMethod::SmallestOfMaximum);
    let v = sys.infer(&[0.5]).unwrap();
    assert!(v.abs() < 1e-12, "som = {}", v);

    let lom = single_rule_system(DefuzzMethod::LargestOfMaximum).infer(&[0.5]).unwrap();
    assert_eq!(lom, 1.0);
}

// ─── defuzzification ─────────────────────────────────────────────────────────

#[test]
fn maximum_ties_resolve_by_method() {
    let xs = [-1.0, -0.5, 0.0, 0.5, 1.0];
    let ys = [0.3, 0.7, 0.2, 0.7, 0.1];
    assert_eq!(largest_of_maximum(&xs, &ys), Some(0.5));
    assert_eq!(smallest_of_maximum(&xs, &ys), Some(-0.5));
    assert_eq!(mean_of_maximum(&xs, &ys), Some(0.0));
}

#[test]
fn every_method_rejects_an_empty_set() {
    let xs = [0.0, 0.5, 1.0];
    let ys = [0.0; 3];
    for m in [
        DefuzzMethod::Centroid,
        DefuzzMethod::Bisector,
        DefuzzMethod::MeanOfMaximum,
        DefuzzMethod::SmallestOfMaximum,
        DefuzzMethod::LargestOfMaximum,
    ] {
        assert_eq!(m.apply(&xs, &ys), None, "{}", m);
    }
}

#[test]
fn symmetric_peak_defuzzifies_to_its_centre() {
    let xs = [-1.0, -0.5, 0.0, 0.5, 1.0];
    let ys = [0.0, 0.4, 1.0, 0.4, 0.0];
    for m in ["centroid", "bisector", "mom", "som", "lom"] {
        let method: DefuzzMethod = m.parse().unwrap();
        let v = method.apply(&xs, &ys).unwrap();
        assert!(v.abs() < 1e-9, "{} of a symmetric peak -> {}", m, v);
    }
}
