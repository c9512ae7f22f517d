//! The two-variable, two-constraint primal problem and its dual.
//!
//! A maximization is always paired with `≤` constraints and a
//! minimization with `≥` constraints; every variable is non-negative.
//! Under that convention the dual is obtained by transposing the
//! constraint matrix, swapping the objective with the right-hand side and
//! flipping the sense, whichever sense the primal has.

use std::cmp::Ordering;
use std::fmt;

use clap::ValueEnum;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::builder::{Constraint, Objective, ObjectiveDirection, Problem, VariableType};
use crate::error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Sense {
    #[value(alias = "max")]
    Maximize,
    #[value(alias = "min")]
    Minimize,
}

impl Sense {
    pub fn flip(self) -> Sense {
        match self {
            Sense::Maximize => Sense::Minimize,
            Sense::Minimize => Sense::Maximize,
        }
    }

    /// Direction of every constraint paired with this sense.
    pub fn relation(self) -> Ordering {
        match self {
            Sense::Maximize => Ordering::Less,
            Sense::Minimize => Ordering::Greater,
        }
    }

    pub fn word(self) -> &'static str {
        match self {
            Sense::Maximize => "maximize",
            Sense::Minimize => "minimize",
        }
    }

    // a is no worse than b under this sense
    pub fn at_least_as_good(self, a: f64, b: f64) -> bool {
        match self {
            Sense::Maximize => a >= b,
            Sense::Minimize => a <= b,
        }
    }
}

impl fmt::Display for Sense {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Sense::Maximize => write!(f, "Maximize"),
            Sense::Minimize => write!(f, "Minimize"),
        }
    }
}

impl From<Sense> for ObjectiveDirection {
    fn from(sense: Sense) -> ObjectiveDirection {
        match sense {
            Sense::Maximize => ObjectiveDirection::Maximize,
            Sense::Minimize => ObjectiveDirection::Minimize,
        }
    }
}

/// Inclusive slider domain of one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range {
    pub min: f64,
    pub max: f64,
}

impl Range {
    pub fn contains(&self, v: f64) -> bool {
        v >= self.min && v <= self.max
    }
}

pub const OBJECTIVE_RANGE: Range = Range { min: -5.0, max: 5.0 };
pub const COEFFICIENT_RANGE: Range = Range { min: 0.1, max: 5.0 };
pub const RHS_RANGE: Range = Range { min: 1.0, max: 10.0 };

/// The user-facing knobs of the primal problem
///
/// ```text
/// sense  c1 x1 + c2 x2
/// s.t.   a1 x1 + b1 x2 (≤|≥) d1
///        a2 x1 + b2 x2 (≤|≥) d2
///        x1, x2 ≥ 0
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Parameters {
    pub sense: Sense,
    pub c1: f64,
    pub c2: f64,
    pub a1: f64,
    pub b1: f64,
    pub d1: f64,
    pub a2: f64,
    pub b2: f64,
    pub d2: f64,
}

impl Default for Parameters {
    fn default() -> Parameters {
        Parameters {
            sense: Sense::Maximize,
            c1: 3.0,
            c2: 2.0,
            a1: 1.0,
            b1: 1.0,
            d1: 4.0,
            a2: 2.0,
            b2: 1.0,
            d2: 6.0,
        }
    }
}

impl Parameters {
    fn named(&self) -> [(&'static str, f64, Range); 8] {
        [
            ("c1", self.c1, OBJECTIVE_RANGE),
            ("c2", self.c2, OBJECTIVE_RANGE),
            ("a1", self.a1, COEFFICIENT_RANGE),
            ("b1", self.b1, COEFFICIENT_RANGE),
            ("d1", self.d1, RHS_RANGE),
            ("a2", self.a2, COEFFICIENT_RANGE),
            ("b2", self.b2, COEFFICIENT_RANGE),
            ("d2", self.d2, RHS_RANGE),
        ]
    }

    /// Rejects non-finite values. Values outside the slider ranges are
    /// allowed but logged, since some experiments need them.
    pub fn validate(&self) -> Result<(), Error> {
        for &(name, value, range) in self.named().iter() {
            if !value.is_finite() {
                return Err(Error::InvalidParameter { name: name, value: value });
            }
            if !range.contains(value) {
                warn!("{} = {} is outside the usual range [{}, {}]",
                      name, value, range.min, range.max);
            }
        }
        Ok(())
    }

    pub fn primal(&self) -> CanonicalLp {
        CanonicalLp {
            sense: self.sense,
            objective: [self.c1, self.c2],
            matrix: [[self.a1, self.b1], [self.a2, self.b2]],
            rhs: [self.d1, self.d2],
        }
    }

    pub fn dual(&self) -> CanonicalLp {
        self.primal().dual()
    }
}

/// A 2x2 linear program in canonical form: `sense objective·v` subject to
/// `matrix v (≤ for max, ≥ for min) rhs`, `v ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanonicalLp {
    pub sense: Sense,
    pub objective: [f64; 2],
    /// Row `i` holds the coefficients of constraint `i`.
    pub matrix: [[f64; 2]; 2],
    pub rhs: [f64; 2],
}

impl CanonicalLp {
    pub fn relation(&self) -> Ordering {
        self.sense.relation()
    }

    pub fn dual(&self) -> CanonicalLp {
        let m = self.matrix;
        CanonicalLp {
            sense: self.sense.flip(),
            objective: self.rhs,
            matrix: [[m[0][0], m[1][0]], [m[0][1], m[1][1]]],
            rhs: self.objective,
        }
    }

    pub fn evaluate(&self, v: [f64; 2]) -> f64 {
        self.objective[0] * v[0] + self.objective[1] * v[1]
    }

    pub fn row_activity(&self, row: usize, v: [f64; 2]) -> f64 {
        self.matrix[row][0] * v[0] + self.matrix[row][1] * v[1]
    }

    /// Signed room left in constraint `row`: `rhs - activity` for `≤`,
    /// `activity - rhs` for `≥`. Negative means violated.
    pub fn slack(&self, row: usize, v: [f64; 2]) -> f64 {
        let activity = self.row_activity(row, v);
        match self.relation() {
            Ordering::Greater => activity - self.rhs[row],
            _ => self.rhs[row] - activity,
        }
    }

    pub fn is_feasible(&self, v: [f64; 2]) -> bool {
        v[0] >= 0.0 && v[1] >= 0.0 && (0..2).all(|row| self.slack(row, v) >= 0.0)
    }

    pub fn to_problem(&self) -> Problem {
        let mut problem = Problem::new();
        let vars = [
            problem.new_variable(VariableType::Positive),
            problem.new_variable(VariableType::Positive),
        ];
        for row in self.matrix.iter().zip(self.rhs.iter()) {
            let (coeffs, &rhs) = row;
            problem.add_constraint(Constraint::new()
                .add(vars[0], coeffs[0])
                .add(vars[1], coeffs[1])
                .value(self.relation(), rhs));
        }
        problem.set_objective(Objective::new()
            .add(vars[0], self.objective[0])
            .add(vars[1], self.objective[1])
            .direction(self.sense.into()));
        problem
    }
}

#[test]
fn dual_of_maximization() {
    let dual = Parameters::default().dual();
    assert_eq!(dual.sense, Sense::Minimize);
    assert_eq!(dual.relation(), Ordering::Greater);
    assert_eq!(dual.objective, [4.0, 6.0]);
    assert_eq!(dual.matrix, [[1.0, 2.0], [1.0, 1.0]]);
    assert_eq!(dual.rhs, [3.0, 2.0]);
}

#[test]
fn dual_of_minimization() {
    let params = Parameters {
        sense: Sense::Minimize,
        c1: 1.5,
        c2: -2.0,
        a1: 0.5,
        b1: 3.0,
        d1: 7.0,
        a2: 4.0,
        b2: 0.2,
        d2: 2.5,
    };
    let dual = params.dual();
    assert_eq!(dual.sense, Sense::Maximize);
    assert_eq!(dual.relation(), Ordering::Less);
    assert_eq!(dual.objective, [7.0, 2.5]);
    assert_eq!(dual.matrix, [[0.5, 4.0], [3.0, 0.2]]);
    assert_eq!(dual.rhs, [1.5, -2.0]);
}

#[test]
fn dual_is_an_involution() {
    let primal = Parameters::default().primal();
    assert_eq!(primal.dual().dual(), primal);
    let mut params = Parameters::default();
    params.sense = Sense::Minimize;
    assert_eq!(params.primal().dual().dual(), params.primal());
}

#[test]
fn feasibility_follows_sense() {
    let primal = Parameters::default().primal();
    assert!(primal.is_feasible([2.0, 2.0]));
    assert!(primal.is_feasible([0.0, 0.0]));
    assert!(!primal.is_feasible([3.0, 1.0]));
    assert!(!primal.is_feasible([-1.0, 0.0]));
    assert_eq!(primal.slack(0, [1.0, 1.0]), 2.0);

    let dual = primal.dual();
    assert!(dual.is_feasible([1.0, 1.0]));
    assert!(!dual.is_feasible([0.0, 0.0]));
    assert_eq!(dual.slack(1, [1.0, 1.0]), 0.0);
}

#[test]
fn validate_rejects_non_finite() {
    let mut params = Parameters::default();
    assert!(params.validate().is_ok());
    // Out of slider range is only a warning
    params.d2 = -6.0;
    assert!(params.validate().is_ok());
    params.b1 = f64::INFINITY;
    match params.validate() {
        Err(Error::InvalidParameter { name, .. }) => assert_eq!(name, "b1"),
        other => panic!("Expected invalid parameter, got {:?}", other),
    }
}

#[test]
fn to_problem_keeps_coefficients() {
    let problem = Parameters::default().dual().to_problem();
    assert_eq!(problem.num_variables(), 2);
    assert_eq!(problem.objective_direction(), ObjectiveDirection::Minimize);
    let constraints = problem.constraints();
    assert_eq!(constraints[0].coefficient(1), 2.0);
    assert_eq!(constraints[1].rhs(), 2.0);
    assert_eq!(constraints[1].direction(), Ordering::Greater);
}
