use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::vec::Vec;

use log::info;
use rulinalg::matrix::Matrix;
#[cfg(test)]
use rulinalg::matrix::BaseMatrix;
use rulinalg::vector::Vector;
use serde::Serialize;

use crate::error::Error;
use crate::problem::*;
use crate::settings::Settings;
use crate::simplex;

#[derive(Debug, Clone)]
pub struct Constraint {
    coefficients: BTreeMap<usize, f64>,
    direction: Ordering,
    value: f64,
}

impl Constraint {
    pub fn new() -> Constraint {
        Constraint {
            coefficients: BTreeMap::new(),
            direction: Ordering::Equal,
            value: 0.0,
        }
    }

    pub fn add(mut self, var_index: usize, coeff: f64) -> Constraint {
        match self.coefficients.entry(var_index) {
            Entry::Occupied(ent) => {
                *ent.into_mut() += coeff;
            },
            Entry::Vacant(ent) => {
                ent.insert(coeff);
            },
        }
        self
    }

    pub fn value(mut self, dir: Ordering, val: f64) -> Constraint {
        self.direction = dir;
        self.value = val;
        self
    }

    pub fn coefficient(&self, var_index: usize) -> f64 {
        self.coefficients.get(&var_index).cloned().unwrap_or(0.0)
    }

    pub fn direction(&self) -> Ordering {
        self.direction
    }

    pub fn rhs(&self) -> f64 {
        self.value
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveDirection {
    Maximize,
    Minimize,
}

#[derive(Debug, Clone)]
pub struct Objective {
    coefficients: BTreeMap<usize, f64>,
    direction: ObjectiveDirection,
}

impl Objective {
    pub fn new() -> Objective {
        Objective {
            coefficients: BTreeMap::new(),
            direction: ObjectiveDirection::Maximize,
        }
    }

    pub fn add(mut self, var_index: usize, coeff: f64) -> Objective {
        match self.coefficients.entry(var_index) {
            Entry::Occupied(ent) => {
                *ent.into_mut() += coeff;
            },
            Entry::Vacant(ent) => {
                ent.insert(coeff);
            },
        }
        self
    }

    pub fn direction(mut self, dir: ObjectiveDirection) -> Objective {
        self.direction = dir;
        self
    }

    // Sign that turns this objective into a minimization
    fn sign(&self) -> f64 {
        match self.direction {
            ObjectiveDirection::Maximize => -1.0,
            ObjectiveDirection::Minimize => 1.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableType {
    Unbounded,
    Positive,
}

#[derive(Debug, Clone)]
pub struct Problem {
    variables: Vec<VariableType>,
    constraints: Vec<Constraint>,
    objective: Objective,
}

// Mapping from specified problem to standard form problem
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariableMapping {
    Direct(usize),
    Difference(usize, usize),
}

impl VariableMapping {
    fn value(&self, x: &Vector<f64>) -> f64 {
        match *self {
            VariableMapping::Direct(i) => x[i],
            VariableMapping::Difference(pos, neg) => x[pos] - x[neg],
        }
    }
}

/// Optimal point of a [`Problem`], in the problem's own terms.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Solution {
    pub values: Vec<f64>,
    pub objective: f64,
    /// Rate of change of the optimal objective per unit increase of each
    /// constraint's right-hand side.
    pub multipliers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Outcome {
    Optimal(Solution),
    Infeasible,
    Unbounded,
}

impl Outcome {
    pub fn solution(&self) -> Option<&Solution> {
        match *self {
            Outcome::Optimal(ref s) => Some(s),
            _ => None,
        }
    }

    pub fn objective(&self) -> Option<f64> {
        self.solution().map(|s| s.objective)
    }

    pub fn status(&self) -> &'static str {
        match *self {
            Outcome::Optimal(_) => "optimal",
            Outcome::Infeasible => "infeasible",
            Outcome::Unbounded => "unbounded",
        }
    }
}

impl Problem {
    pub fn new() -> Problem {
        Problem {
            variables: Vec::new(),
            constraints: Vec::new(),
            objective: Objective::new(),
        }
    }

    pub fn new_variable(&mut self, var_type: VariableType) -> usize {
        let result = self.variables.len();
        self.variables.push(var_type);
        result
    }

    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn set_objective(&mut self, objective: Objective) {
        self.objective = objective;
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective_direction(&self) -> ObjectiveDirection {
        self.objective.direction
    }

    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.coefficients
            .iter()
            .map(|(&var, &coeff)| coeff * values[var])
            .sum()
    }

    pub fn standard_form(&self) -> (StandardForm, Vec<VariableMapping>) {
        let mut var_count: usize = 0;
        let mut var_mapping: Vec<VariableMapping> = Vec::new();
        let mut slack_variables: Vec<Option<usize>> = Vec::new();

        for &var_type in self.variables.iter() {
            match var_type {
                VariableType::Positive => {
                    let var_index = var_count;
                    var_count += 1;
                    var_mapping.push(VariableMapping::Direct(var_index));
                },
                VariableType::Unbounded => {
                    let pos_var = var_count;
                    var_count += 1;
                    let neg_var = var_count;
                    var_count += 1;
                    var_mapping.push(VariableMapping::Difference(pos_var, neg_var));
                },
            }
        }

        for constraint in self.constraints.iter() {
            match constraint.direction {
                Ordering::Less | Ordering::Greater => {
                    let slack_var = var_count;
                    var_count += 1;
                    slack_variables.push(Some(slack_var));
                },
                Ordering::Equal => {
                    slack_variables.push(None);
                },
            }
        }

        let mut a_data = Vec::new();
        let mut b_data = Vec::new();
        let mut c_data = Vec::new();

        for (constraint, slack) in self.constraints.iter().zip(slack_variables.iter()) {
            let mut constraint_row = vec![0.0; var_count];
            for (&var, &coeff) in &constraint.coefficients {
                match var_mapping[var] {
                    VariableMapping::Direct(std_var) => {
                        constraint_row[std_var] = coeff;
                    },
                    VariableMapping::Difference(pos_var, neg_var) => {
                        constraint_row[pos_var] = coeff;
                        constraint_row[neg_var] = -coeff;
                    },
                }
            }
            match (constraint.direction, *slack) {
                (Ordering::Less, Some(slack_var)) => {
                    constraint_row[slack_var] = 1.0;
                },
                (Ordering::Greater, Some(slack_var)) => {
                    constraint_row[slack_var] = -1.0;
                },
                _ => {},
            }

            a_data.extend(constraint_row.iter());
            b_data.push(constraint.value);
        }

        c_data.resize(var_count, 0.0);
        let sign = self.objective.sign();
        for (&var, &coeff) in &self.objective.coefficients {
            match var_mapping[var] {
                VariableMapping::Direct(std_var) => {
                    c_data[std_var] = sign * coeff;
                },
                VariableMapping::Difference(pos_var, neg_var) => {
                    c_data[pos_var] = sign * coeff;
                    c_data[neg_var] = -sign * coeff;
                },
            }
        }

        let standard_form = StandardForm {
            a: Matrix::new(self.constraints.len(), var_count, a_data),
            b: Vector::new(b_data),
            c: Vector::new(c_data),
        };

        (standard_form, var_mapping)
    }

    pub fn solve(&self, settings: &Settings) -> Result<Outcome, Error> {
        let (standard_form, mapping) = self.standard_form();
        let outcome = match simplex::solve(standard_form, settings)? {
            LPResult::Infeasible => Outcome::Infeasible,
            LPResult::Unbounded => Outcome::Unbounded,
            LPResult::Optimum(vertex) => {
                let values: Vec<f64> = mapping.iter()
                    .map(|m| m.value(&vertex.x))
                    .collect();
                // y prices the minimization, undo the sign flip
                let sign = self.objective.sign();
                let multipliers = vertex.y.iter().map(|y| sign * y).collect();
                Outcome::Optimal(Solution {
                    objective: self.objective_value(&values),
                    values: values,
                    multipliers: multipliers,
                })
            },
        };
        info!("solved {}x{} problem: {}",
              self.constraints.len(), self.variables.len(), outcome.status());
        Ok(outcome)
    }
}

#[cfg(test)]
fn mixed_problem() -> Problem {
    let mut problem = Problem::new();
    let var1 = problem.new_variable(VariableType::Positive);
    let var2 = problem.new_variable(VariableType::Unbounded);
    let constraint1 = Constraint::new()
        .add(var1, 1.0)
        .add(var2, 2.0)
        .value(Ordering::Less, 5.0);
    problem.add_constraint(constraint1);
    let constraint2 = Constraint::new()
        .add(var1, 5.0)
        .add(var2, 3.0)
        .value(Ordering::Less, 10.0);
    problem.add_constraint(constraint2);
    let constraint3 = Constraint::new()
        .add(var2, 1.0)
        .value(Ordering::Greater, 2.0);
    problem.add_constraint(constraint3);
    let objective = Objective::new()
        .add(var1, 1.0)
        .add(var2, 1.0)
        .direction(ObjectiveDirection::Maximize);
    problem.set_objective(objective);
    problem
}

#[test]
fn build_constraint() {
    let constraint = Constraint::new()
        .add(0, 1.0)
        .add(1, 2.0)
        .add(0, -3.0)
        .value(Ordering::Less, 5.0);
    assert_eq!(constraint.coefficients.len(), 2);
    assert_eq!(constraint.coefficient(0), -2.0);
    assert_eq!(constraint.coefficient(1), 2.0);
    assert_eq!(constraint.coefficient(7), 0.0);
    assert_eq!(constraint.direction(), Ordering::Less);
    assert_eq!(constraint.rhs(), 5.0);
}

#[test]
fn build_problem() {
    let problem = mixed_problem();
    assert_eq!(problem.num_variables(), 2);
    assert_eq!(problem.constraints().len(), 3);
    assert_eq!(problem.objective_direction(), ObjectiveDirection::Maximize);
}

#[test]
fn standard_form() {
    let (standard_form, mapping) = mixed_problem().standard_form();
    assert_eq!(standard_form.a.data(),
               &vec![1.0, 2.0, -2.0, 1.0, 0.0, 0.0,
                     5.0, 3.0, -3.0, 0.0, 1.0, 0.0,
                     0.0, 1.0, -1.0, 0.0, 0.0, -1.0]);
    assert_eq!(standard_form.a.rows(), 3);
    assert_eq!(standard_form.a.cols(), 6);
    assert_eq!(standard_form.b.data(),
               &vec![5.0, 10.0, 2.0]);
    // Maximization is negated into minimization
    assert_eq!(standard_form.c.data(),
               &vec![-1.0, -1.0, 1.0, 0.0, 0.0, 0.0]);
    assert_eq!(mapping[0], VariableMapping::Direct(0));
    assert_eq!(mapping[1], VariableMapping::Difference(1, 2));
}

#[test]
fn solve_mixed_problem() {
    // Optimum at x1 = 5/7, x2 = 15/7 where the first two constraints
    // are tight.
    let outcome = mixed_problem().solve(&Settings::default())
        .expect("Solve should not fail");
    let solution = outcome.solution().expect("Expected optimum");
    assert!((solution.values[0] - 5.0 / 7.0).abs() < 1e-9);
    assert!((solution.values[1] - 15.0 / 7.0).abs() < 1e-9);
    assert!((solution.objective - 20.0 / 7.0).abs() < 1e-9);
    assert!(solution.multipliers[2].abs() < 1e-9);
}

#[test]
fn solve_minimize() {
    // minimize x1 + x2 s.t. x1 + 2 x2 >= 4, x >= 0
    let mut problem = Problem::new();
    let x1 = problem.new_variable(VariableType::Positive);
    let x2 = problem.new_variable(VariableType::Positive);
    problem.add_constraint(Constraint::new()
        .add(x1, 1.0)
        .add(x2, 2.0)
        .value(Ordering::Greater, 4.0));
    problem.set_objective(Objective::new()
        .add(x1, 1.0)
        .add(x2, 1.0)
        .direction(ObjectiveDirection::Minimize));
    let outcome = problem.solve(&Settings::default())
        .expect("Solve should not fail");
    let solution = outcome.solution().expect("Expected optimum");
    assert!((solution.objective - 2.0).abs() < 1e-9);
    // Raising the requirement by one costs half a unit
    assert!((solution.multipliers[0] - 0.5).abs() < 1e-9);
}
