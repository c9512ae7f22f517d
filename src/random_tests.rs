#![cfg(test)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::analysis::{analyze, weak_duality_holds, Scenario};
use crate::builder::Outcome;
use crate::duality::{CanonicalLp, Parameters, Sense};
use crate::settings::Settings;

fn random_parameters(rng: &mut StdRng, allow_negative: bool) -> Parameters {
    let coeff = |rng: &mut StdRng| {
        if allow_negative {
            rng.gen_range(-5.0..5.0)
        } else {
            rng.gen_range(0.1..5.0)
        }
    };
    Parameters {
        sense: if rng.gen() { Sense::Maximize } else { Sense::Minimize },
        c1: rng.gen_range(-5.0..5.0),
        c2: rng.gen_range(-5.0..5.0),
        a1: coeff(rng),
        b1: coeff(rng),
        d1: if allow_negative { rng.gen_range(-10.0..10.0) } else { rng.gen_range(1.0..10.0) },
        a2: coeff(rng),
        b2: coeff(rng),
        d2: if allow_negative { rng.gen_range(-10.0..10.0) } else { rng.gen_range(1.0..10.0) },
    }
}

// Best objective over the vertices of the feasible region, found by
// intersecting every pair of boundary lines.
fn best_vertex(lp: &CanonicalLp) -> Option<f64> {
    let lines = [
        (lp.matrix[0], lp.rhs[0]),
        (lp.matrix[1], lp.rhs[1]),
        ([1.0, 0.0], 0.0),
        ([0.0, 1.0], 0.0),
    ];
    let mut best: Option<f64> = None;
    for i in 0..lines.len() {
        for j in i + 1..lines.len() {
            let ([p, q], e) = lines[i];
            let ([r, s], f) = lines[j];
            let det = p * s - q * r;
            if det.abs() < 1e-12 {
                continue;
            }
            let v = [(e * s - q * f) / det, (p * f - e * r) / det];
            let feasible = v[0] >= -1e-9 && v[1] >= -1e-9
                && (0..2).all(|row| lp.slack(row, v) >= -1e-9);
            if !feasible {
                continue;
            }
            let value = lp.evaluate(v);
            best = match best {
                Some(b) if lp.sense.at_least_as_good(b, value) => Some(b),
                _ => Some(value),
            };
        }
    }
    best
}

#[test]
fn strong_duality_on_slider_ranges() {
    let mut rng = StdRng::seed_from_u64(13_37_58_23);
    let settings = Settings::default();
    for _ in 0..200 {
        let params = random_parameters(&mut rng, false);
        let report = analyze(&params, &settings).expect("Analysis should not fail");
        match report.scenario {
            Scenario::StrongDuality | Scenario::UnboundedPrimal => {},
            other => panic!("{:?} for {:?}", other, params),
        }
        if let (Some(p), Some(d)) = (report.primal.objective(), report.dual.objective()) {
            assert!((p - d).abs() < 1e-6, "gap {} for {:?}", (p - d).abs(), params);
        }
    }
}

#[test]
fn outcomes_pair_up_with_negative_coefficients() {
    let mut rng = StdRng::seed_from_u64(1);
    let settings = Settings::default();
    for _ in 0..300 {
        let params = random_parameters(&mut rng, true);
        let report = analyze(&params, &settings).expect("Analysis should not fail");
        match (&report.primal, &report.dual) {
            (&Outcome::Optimal(_), &Outcome::Optimal(_)) => {
                assert_eq!(report.scenario, Scenario::StrongDuality, "{:?}", params);
            },
            (&Outcome::Unbounded, dual) => assert_eq!(*dual, Outcome::Infeasible),
            (primal, &Outcome::Unbounded) => assert_eq!(*primal, Outcome::Infeasible),
            (&Outcome::Infeasible, &Outcome::Infeasible) => {},
            (primal, dual) => panic!("{:?} / {:?} for {:?}", primal, dual, params),
        }
    }
}

#[test]
fn simplex_matches_vertex_enumeration() {
    let mut rng = StdRng::seed_from_u64(42);
    let settings = Settings::default();
    for _ in 0..300 {
        let params = random_parameters(&mut rng, true);
        let lp = params.primal();
        let outcome = lp.to_problem().solve(&settings).expect("Solve should not fail");
        match outcome {
            Outcome::Optimal(solution) => {
                let best = best_vertex(&lp).expect("An optimum is attained at a vertex");
                assert!((solution.objective - best).abs() < 1e-6,
                        "simplex {} vs vertex {} for {:?}", solution.objective, best, params);
                assert!(lp.slack(0, [solution.values[0], solution.values[1]]) > -1e-9);
                assert!(lp.slack(1, [solution.values[0], solution.values[1]]) > -1e-9);
            },
            Outcome::Infeasible => assert!(best_vertex(&lp).is_none(), "{:?}", params),
            Outcome::Unbounded => {},
        }
    }
}

#[test]
fn weak_duality_on_random_feasible_points() {
    let mut rng = StdRng::seed_from_u64(7);
    let settings = Settings::default();
    let mut checked = 0;
    for _ in 0..200 {
        let params = random_parameters(&mut rng, false);
        let primal = params.primal();
        let dual = params.dual();
        for _ in 0..20 {
            let x = [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)];
            let lambda = [rng.gen_range(0.0..10.0), rng.gen_range(0.0..10.0)];
            if primal.is_feasible(x) && dual.is_feasible(lambda) {
                assert!(weak_duality_holds(params.sense, primal.evaluate(x),
                                           dual.evaluate(lambda), settings.weak_duality_tol));
                checked += 1;
            }
        }
    }
    assert!(checked > 0);
}
