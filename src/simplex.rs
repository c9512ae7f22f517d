use std::collections::HashSet;
use std::vec::Vec;

use log::debug;
use rulinalg::matrix::BaseMatrix;
use rulinalg::vector::Vector;
use rulinalg::matrix::Matrix;

use crate::error::Error;
use crate::problem::*;
use crate::settings::Settings;

#[derive(Debug, Clone)]
struct SimplexState {
    basis: Vec<usize>,
    x_b: Vector<f64>,
    problem: StandardForm,
}

#[derive(Debug, Clone)]
enum PivotResult {
    Done(LPResult),
    Pivoted(SimplexState),
}

impl SimplexState {
    // Implementation following https://en.wikipedia.org/wiki/Revised_simplex_method
    fn from_basis(problem: StandardForm, basis: &[usize])
        -> Result<SimplexState, Error> {
        let mat_b = problem.a.select_cols(basis.iter());

        let x_b = mat_b.solve(problem.b.clone())?;

        Ok(
            SimplexState{
                basis: basis.to_vec(),
                x_b: x_b,
                problem: problem,
            }
        )
    }

    fn nonbasis(&self) -> Vec<usize> {
        let basis_indices : HashSet<usize> = self.basis.iter().cloned().collect();
        (0..self.problem.a.cols())
            .filter(|i| !basis_indices.contains(i))
            .collect()
    }

    fn multipliers(&self) -> Result<Vector<f64>, Error> {
        let c_b = self.problem.c.select(&self.basis);
        let mat_b = self.problem.a.select_cols(self.basis.iter());
        Ok(mat_b.transpose().solve(c_b)?)
    }

    // Column q expressed in the current basis, B^-1 a_q
    fn direction(&self, q: usize) -> Result<Vector<f64>, Error> {
        let mat_b = self.problem.a.select_cols(self.basis.iter());
        let a_q = self.problem.a.col(q).into();
        Ok(mat_b.solve(a_q)?)
    }

    fn vertex(&self) -> Vector<f64> {
        let mut x = vec![0.0; self.problem.a.cols()];
        for (i, &idx) in self.basis.iter().enumerate() {
            // Clamp round-off below zero
            x[idx] = self.x_b[i].max(0.0);
        }
        Vector::new(x)
    }

    fn pivot(self, tol: f64) -> Result<PivotResult, Error> {
        let nonbasis_indices = self.nonbasis();

        let c_n = self.problem.c.select(&nonbasis_indices);
        let mat_n = self.problem.a.select_cols(nonbasis_indices.iter());
        let lambda = self.multipliers()?;
        let s_n = c_n - mat_n.transpose() * &lambda;

        // Bland's rule: lowest index with negative reduced cost enters
        let entering_index = nonbasis_indices
            .iter()
            .enumerate()
            .find(|&(i, _)| s_n[i] < -tol)
            .map(|(_, &idx)| idx);

        let q = match entering_index {
            Some(q) => q,
            None => {
                return Ok(PivotResult::Done(LPResult::Optimum(BasicSolution {
                    x: self.vertex(),
                    y: lambda,
                    basis: self.basis,
                })));
            },
        };

        let d = self.direction(q)?;

        // Ratio test, ties go to the lowest basic variable index
        let mut leaving: Option<(usize, f64)> = None;
        for (i, &var) in self.basis.iter().enumerate() {
            if d[i] > tol {
                let ratio = self.x_b[i].max(0.0) / d[i];
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((j, r)) => {
                        if ratio < r - tol || (ratio <= r + tol && var < self.basis[j]) {
                            Some((i, ratio))
                        } else {
                            Some((j, r))
                        }
                    },
                };
            }
        }

        let (i_p, x_q) = match leaving {
            None => return Ok(PivotResult::Done(LPResult::Unbounded)),
            Some(l) => l,
        };

        let mut new_x_b = self.x_b - d * x_q;
        let mut new_basis = self.basis;

        new_basis[i_p] = q;
        new_x_b[i_p] = x_q;

        Ok(PivotResult::Pivoted(SimplexState {
            basis: new_basis,
            x_b: new_x_b,
            problem: self.problem,
        }))
    }

    // Pivot until no reduced cost is negative. Returns the final state
    // together with the result it reached.
    fn optimize(self, settings: &Settings) -> Result<(SimplexState, LPResult), Error> {
        let mut state = self;
        for _ in 0..settings.max_iter {
            match state.clone().pivot(settings.pivot_tol)? {
                PivotResult::Done(result) => {
                    return Ok((state, result));
                },
                PivotResult::Pivoted(new_state) => {
                    state = new_state;
                },
            }
        }
        Err(Error::IterationLimit { limit: settings.max_iter })
    }
}

// One artificial variable per row, signed so that the artificial basis
// starts at |b|.
fn phase1_start(problem: &StandardForm) -> Result<SimplexState, Error> {
    let num_rows = problem.a.rows();
    let num_cols = problem.a.cols();

    let mut phase1_a_data = Vec::with_capacity(num_rows * (num_cols + num_rows));
    for (i, row) in problem.a.row_iter().enumerate() {
        phase1_a_data.extend_from_slice(row.raw_slice());
        let mut z_coeffs = vec![0.0; num_rows];
        z_coeffs[i] = if problem.b[i] < 0.0 { -1.0 } else { 1.0 };
        phase1_a_data.extend(z_coeffs);
    }

    let mut phase1_c_data = vec![0.0; num_cols];
    phase1_c_data.resize(num_cols + num_rows, 1.0);

    let phase1_problem = StandardForm {
        a: Matrix::new(num_rows, num_cols + num_rows, phase1_a_data),
        b: problem.b.clone(),
        c: Vector::new(phase1_c_data),
    };

    let phase1_basis: Vec<usize> = (num_cols..num_cols + num_rows).collect();

    SimplexState::from_basis(phase1_problem, &phase1_basis)
}

// Replace artificial variables that remain basic at level zero with
// original columns.
fn drive_out_artificials(state: SimplexState, num_cols: usize, tol: f64)
    -> Result<SimplexState, Error> {
    let mut state = state;
    for row in 0..state.basis.len() {
        if state.basis[row] < num_cols {
            continue;
        }
        let mut replacement = None;
        for j in state.nonbasis().into_iter().filter(|&j| j < num_cols) {
            let d = state.direction(j)?;
            if d[row].abs() > tol {
                replacement = Some(j);
                break;
            }
        }
        let j = replacement.ok_or(Error::DegenerateBasis { row: row })?;
        let mut basis = state.basis.clone();
        basis[row] = j;
        state = SimplexState::from_basis(state.problem, &basis)?;
    }
    Ok(state)
}

pub fn solve(problem: StandardForm, settings: &Settings) -> Result<LPResult, Error> {
    let num_cols = problem.a.cols();
    let phase1_start = phase1_start(&problem)?;
    let (phase1_optimized, phase1_result) = phase1_start.optimize(settings)?;

    let infeasibility = match phase1_result {
        LPResult::Optimum(ref vertex) => phase1_optimized.problem.objective(&vertex.x),
        // Phase 1 is bounded below by zero
        _ => return Ok(LPResult::Infeasible),
    };
    let scale = problem.b.iter().fold(1.0_f64, |m, v| m.max(v.abs()));
    debug!("phase 1 finished with infeasibility {:e}", infeasibility);
    if infeasibility > settings.pivot_tol * scale {
        return Ok(LPResult::Infeasible);
    }

    let feasible = drive_out_artificials(phase1_optimized, num_cols, settings.pivot_tol)?;
    let phase2_start = SimplexState::from_basis(problem, &feasible.basis)?;
    let (_, result) = phase2_start.optimize(settings)?;
    debug!("phase 2 finished: {:?}", result);
    Ok(result)
}

#[cfg(test)]
fn example_problem() -> StandardForm {
    StandardForm {
        a: Matrix::new(2, 5,vec![
            3.0, 2.0, 1.0, 1.0, 0.0,
            2.0, 5.0, 3.0, 0.0, 1.0,
        ]),
        b: Vector::new(vec![10.0, 15.0]),
        c: Vector::new(vec![-2.0, -3.0, -4.0, 0.0, 0.0]),
    }
}

#[test]
fn test_simplex() {
    let state =
        SimplexState::from_basis(example_problem(), &[3, 4])
            .expect("This basis is valid");
    assert_eq!(state.x_b.data(), &vec![10.0, 15.0]);

    let (_, simplex_result) = state.optimize(&Settings::default())
        .expect("Optimize should not fail");
    let expected_result = vec![0.0, 0.0, 5.0, 5.0, 0.0];

    match simplex_result {
        LPResult::Unbounded => panic!("Expected optimum, got unbounded"),
        LPResult::Infeasible => panic!("Expected optimum, got infeasible"),
        LPResult::Optimum(vertex) => {
            for (i, v) in vertex.x.iter().enumerate() {
                assert!((v - expected_result[i]).abs() < 1.0e-9);
            }
        }
    }
}

#[test]
fn test_feasible_phase1() {
    let problem = example_problem();
    let phase1_start = phase1_start(&problem)
        .expect("Phase 1 basis should always be valid");
    let (phase1_optimized, _) = phase1_start.optimize(&Settings::default())
        .expect("Optimizing phase 1 should not fail");
    // Test example is feasible
    for i in phase1_optimized.basis {
        assert!(i < problem.a.cols());
    }
}

#[test]
fn test_solve() {
    let result = solve(example_problem(), &Settings::default())
        .expect("Solve should not fail");
    let expected_result = [0.0, 0.0, 5.0, 5.0, 0.0];
    match result {
        LPResult::Unbounded => panic!("Expected optimum, got unbounded"),
        LPResult::Infeasible => panic!("Expected optimum, got infeasible"),
        LPResult::Optimum(vertex) => {
            for (i, v) in vertex.x.iter().enumerate() {
                assert!((v - expected_result[i]).abs() < 1.0e-9);
            }
            // Optimal objective is -20, and b^Ty must match it
            assert!((vertex.y.dot(&Vector::new(vec![10.0, 15.0])) + 20.0).abs() < 1.0e-9);
        }
    }
}

#[test]
fn test_solve_infeasible() {
    let problem = StandardForm {
        a: Matrix::new(3, 3, vec![
            1.0, 1.0, 0.0,
            0.0, -1.0, 1.0,
            1.0, 0.0, 1.0,
        ]),
        b: Vector::new(vec![5.0, 10.0, 12.0]),
        c: Vector::new(vec![-1.0, -1.0, -1.0]),
    };
    let result = solve(problem, &Settings::default())
        .expect("Solve should not fail");
    assert_eq!(result, LPResult::Infeasible);
}

#[test]
fn test_solve_unbounded() {
    let problem = StandardForm {
        a: Matrix::new(1, 2, vec![
            1.0, -2.0,
        ]),
        b: Vector::new(vec![5.0]),
        c: Vector::new(vec![-1.0, -1.0]),
    };
    let result = solve(problem, &Settings::default())
        .expect("Solve should not fail");
    assert_eq!(result, LPResult::Unbounded);
}

#[test]
fn test_solve_zero_rhs() {
    // x1 - x2 = 0, x1 + x2 + s = 2; minimize -x1
    let problem = StandardForm {
        a: Matrix::new(2, 3, vec![
            1.0, -1.0, 0.0,
            1.0, 1.0, 1.0,
        ]),
        b: Vector::new(vec![0.0, 2.0]),
        c: Vector::new(vec![-1.0, 0.0, 0.0]),
    };
    let result = solve(problem, &Settings::default())
        .expect("Solve should not fail");
    match result {
        LPResult::Optimum(vertex) => {
            assert!((vertex.x[0] - 1.0).abs() < 1.0e-9);
            assert!((vertex.x[1] - 1.0).abs() < 1.0e-9);
            assert!(vertex.basis.iter().all(|&i| i < 3));
        },
        other => panic!("Expected optimum, got {:?}", other),
    }
}

#[test]
fn test_iteration_limit() {
    let settings = crate::settings::SettingsBuilder::default()
        .max_iter(1)
        .build()
        .expect("Valid settings");
    match solve(example_problem(), &settings) {
        Err(Error::IterationLimit { limit }) => assert_eq!(limit, 1),
        other => panic!("Expected iteration limit, got {:?}", other),
    }
}
