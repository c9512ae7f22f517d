//! Solves a primal problem and its dual and compares the two.

use log::{info, warn};
use serde::Serialize;

use crate::builder::Outcome;
use crate::duality::{CanonicalLp, Parameters, Sense};
use crate::error::Error;
use crate::settings::Settings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    /// Both optimal with equal objective values
    StrongDuality,
    /// Both optimal but the objectives differ by more than the tolerance
    DualityGap,
    /// Primal objective grows without bound, dual has no feasible point
    UnboundedPrimal,
    /// Primal has no feasible point
    InfeasiblePrimal,
    /// Any pairing the duality theorems rule out
    Inconsistent,
}

impl Scenario {
    fn classify(primal: &Outcome, dual: &Outcome, strong: Option<bool>) -> Scenario {
        match (primal, dual, strong) {
            (&Outcome::Optimal(_), &Outcome::Optimal(_), Some(true)) => Scenario::StrongDuality,
            (&Outcome::Optimal(_), &Outcome::Optimal(_), _) => Scenario::DualityGap,
            (&Outcome::Unbounded, &Outcome::Infeasible, _) => Scenario::UnboundedPrimal,
            (&Outcome::Infeasible, &Outcome::Unbounded, _) |
            (&Outcome::Infeasible, &Outcome::Infeasible, _) => Scenario::InfeasiblePrimal,
            _ => Scenario::Inconsistent,
        }
    }

    pub fn title(&self) -> &'static str {
        match *self {
            Scenario::StrongDuality => "Strong duality",
            Scenario::DualityGap => "Duality gap",
            Scenario::UnboundedPrimal => "Unbounded primal - infeasible dual",
            Scenario::InfeasiblePrimal => "Infeasible primal",
            Scenario::Inconsistent => "Inconsistent solver results",
        }
    }
}

/// Economic reading of one dual variable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShadowPrice {
    pub constraint: usize,
    pub price: f64,
    pub binding: bool,
    pub rhs: f64,
    pub relaxed_rhs: f64,
    /// Predicted change of the primal optimum for one more unit of rhs
    pub objective_change: f64,
    /// Room left in the primal constraint at the optimum
    pub primal_slack: f64,
    /// `λ_i (d_i - A_i x)`, zero at a primal-dual optimal pair
    pub complementary_slackness: f64,
    /// The same price read off the primal simplex basis
    pub simplex_multiplier: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DualityReport {
    pub parameters: Parameters,
    pub primal_problem: CanonicalLp,
    pub dual_problem: CanonicalLp,
    pub primal: Outcome,
    pub dual: Outcome,
    pub gap: Option<f64>,
    pub strong_duality: Option<bool>,
    pub weak_duality_holds: Option<bool>,
    pub shadow_prices: Option<Vec<ShadowPrice>>,
    pub scenario: Scenario,
}

impl DualityReport {
    pub fn primal_point(&self) -> Option<[f64; 2]> {
        self.primal.solution().map(|s| [s.values[0], s.values[1]])
    }

    pub fn dual_point(&self) -> Option<[f64; 2]> {
        self.dual.solution().map(|s| [s.values[0], s.values[1]])
    }
}

/// `primal ≤ dual` for a maximization, `primal ≥ dual` for a
/// minimization, up to `tol`.
pub fn weak_duality_holds(sense: Sense, primal_obj: f64, dual_obj: f64, tol: f64) -> bool {
    match sense {
        Sense::Maximize => primal_obj <= dual_obj + tol,
        Sense::Minimize => primal_obj >= dual_obj - tol,
    }
}

fn shadow_prices(primal_lp: &CanonicalLp, primal: &Outcome, dual: &Outcome,
                 settings: &Settings) -> Option<Vec<ShadowPrice>> {
    let primal_solution = primal.solution()?;
    let dual_solution = dual.solution()?;
    let x = [primal_solution.values[0], primal_solution.values[1]];

    let prices = (0..2).map(|i| {
        let price = dual_solution.values[i];
        let rhs = primal_lp.rhs[i];
        let residual = rhs - primal_lp.row_activity(i, x);
        ShadowPrice {
            constraint: i + 1,
            price: price,
            binding: price > settings.binding_tol,
            rhs: rhs,
            relaxed_rhs: rhs + 1.0,
            objective_change: price,
            primal_slack: primal_lp.slack(i, x),
            complementary_slackness: price * residual,
            simplex_multiplier: primal_solution.multipliers[i],
        }
    }).collect();
    Some(prices)
}

pub fn analyze(params: &Parameters, settings: &Settings) -> Result<DualityReport, Error> {
    params.validate()?;
    let primal_lp = params.primal();
    let dual_lp = primal_lp.dual();

    let primal = primal_lp.to_problem().solve(settings)?;
    let dual = dual_lp.to_problem().solve(settings)?;

    let (gap, strong, weak) = match (primal.objective(), dual.objective()) {
        (Some(p), Some(d)) => {
            let gap = (p - d).abs();
            let strong = gap < settings.strong_duality_tol;
            if !strong {
                warn!("duality gap {:e} between primal {} and dual {}", gap, p, d);
            }
            let weak = weak_duality_holds(params.sense, p, d, settings.weak_duality_tol);
            (Some(gap), Some(strong), Some(weak))
        },
        _ => (None, None, None),
    };

    let scenario = Scenario::classify(&primal, &dual, strong);
    info!("primal {}, dual {}: {}", primal.status(), dual.status(), scenario.title());

    Ok(DualityReport {
        parameters: *params,
        primal_problem: primal_lp,
        dual_problem: dual_lp,
        shadow_prices: shadow_prices(&primal_lp, &primal, &dual, settings),
        primal: primal,
        dual: dual,
        gap: gap,
        strong_duality: strong,
        weak_duality_holds: weak,
        scenario: scenario,
    })
}

#[cfg(test)]
use float_eq::assert_float_eq;

#[test]
fn default_problem_has_strong_duality() {
    let report = analyze(&Parameters::default(), &Settings::default())
        .expect("Analysis should not fail");
    assert_eq!(report.scenario, Scenario::StrongDuality);

    let x = report.primal_point().expect("Primal should be optimal");
    assert_float_eq!(x, [2.0, 2.0], abs_all <= 1e-9);
    let lambda = report.dual_point().expect("Dual should be optimal");
    assert_float_eq!(lambda, [1.0, 1.0], abs_all <= 1e-9);

    assert_float_eq!(report.primal.objective().unwrap(), 10.0, abs <= 1e-9);
    assert_float_eq!(report.dual.objective().unwrap(), 10.0, abs <= 1e-9);
    assert!(report.gap.unwrap() < 1e-9);
    assert_eq!(report.strong_duality, Some(true));
    assert_eq!(report.weak_duality_holds, Some(true));
}

#[test]
fn shadow_prices_of_default_problem() {
    let report = analyze(&Parameters::default(), &Settings::default())
        .expect("Analysis should not fail");
    let prices = report.shadow_prices.expect("Both problems are optimal");
    assert_eq!(prices.len(), 2);
    for price in prices.iter() {
        assert!(price.binding);
        assert_float_eq!(price.price, 1.0, abs <= 1e-9);
        assert_float_eq!(price.simplex_multiplier, 1.0, abs <= 1e-9);
        assert_float_eq!(price.complementary_slackness, 0.0, abs <= 1e-9);
        assert_float_eq!(price.relaxed_rhs, price.rhs + 1.0, abs <= 1e-12);
    }
    assert_eq!(prices[0].constraint, 1);
    assert_float_eq!(prices[1].rhs, 6.0, abs <= 1e-12);
}

#[test]
fn non_binding_constraint_has_zero_price() {
    // The second constraint is loose at the optimum (0, 4)
    let params = Parameters {
        c1: 1.0,
        c2: 3.0,
        ..Parameters::default()
    };
    let report = analyze(&params, &Settings::default())
        .expect("Analysis should not fail");
    assert_eq!(report.scenario, Scenario::StrongDuality);
    assert_float_eq!(report.primal_point().unwrap(), [0.0, 4.0], abs_all <= 1e-9);
    let prices = report.shadow_prices.unwrap();
    assert!(prices[0].binding);
    assert_float_eq!(prices[0].price, 3.0, abs <= 1e-9);
    assert!(!prices[1].binding);
    assert_float_eq!(prices[1].primal_slack, 2.0, abs <= 1e-9);
}

#[test]
fn minimization_has_strong_duality() {
    let params = Parameters {
        sense: Sense::Minimize,
        ..Parameters::default()
    };
    let report = analyze(&params, &Settings::default())
        .expect("Analysis should not fail");
    assert_eq!(report.scenario, Scenario::StrongDuality);
    // minimize 3x1 + 2x2 s.t. x1 + x2 >= 4, 2x1 + x2 >= 6 -> (2, 2), 10
    assert_float_eq!(report.primal_point().unwrap(), [2.0, 2.0], abs_all <= 1e-9);
    assert_float_eq!(report.primal.objective().unwrap(), 10.0, abs <= 1e-9);
    assert_float_eq!(report.dual.objective().unwrap(), 10.0, abs <= 1e-9);
    assert_eq!(report.weak_duality_holds, Some(true));
}

#[test]
fn unbounded_primal_has_infeasible_dual() {
    let params = Parameters {
        sense: Sense::Minimize,
        c1: -1.0,
        ..Parameters::default()
    };
    let report = analyze(&params, &Settings::default())
        .expect("Analysis should not fail");
    assert_eq!(report.primal, Outcome::Unbounded);
    assert_eq!(report.dual, Outcome::Infeasible);
    assert_eq!(report.scenario, Scenario::UnboundedPrimal);
    assert_eq!(report.gap, None);
    assert!(report.shadow_prices.is_none());
}

#[test]
fn infeasible_primal_has_unbounded_dual() {
    let params = Parameters {
        a2: -1.0,
        b2: -1.0,
        d2: -6.0,
        ..Parameters::default()
    };
    let report = analyze(&params, &Settings::default())
        .expect("Analysis should not fail");
    assert_eq!(report.primal, Outcome::Infeasible);
    assert_eq!(report.dual, Outcome::Unbounded);
    assert_eq!(report.scenario, Scenario::InfeasiblePrimal);
}

#[test]
fn weak_duality_sign_check() {
    assert!(weak_duality_holds(Sense::Maximize, 9.0, 10.0, 1e-10));
    assert!(!weak_duality_holds(Sense::Maximize, 10.1, 10.0, 1e-10));
    assert!(weak_duality_holds(Sense::Minimize, 10.0, 9.0, 1e-10));
    assert!(!weak_duality_holds(Sense::Minimize, 9.0, 10.0, 1e-10));
    assert!(weak_duality_holds(Sense::Maximize, 10.0 + 1e-11, 10.0, 1e-10));
}

#[test]
fn classify_pairs() {
    assert_eq!(Scenario::classify(&Outcome::Unbounded, &Outcome::Unbounded, None),
               Scenario::Inconsistent);
    assert_eq!(Scenario::classify(&Outcome::Infeasible, &Outcome::Infeasible, None),
               Scenario::InfeasiblePrimal);
}
