use rulinalg::matrix::Matrix;
use rulinalg::vector::Vector;

#[derive(Debug, Clone)]
pub struct StandardForm {
    // Standard form linear program:
    // Minimize c^Tx
    // subject to Ax = b
    // and x >= 0
    pub a: Matrix<f64>,
    pub b: Vector<f64>,
    pub c: Vector<f64>,
}

/// A vertex reached by the simplex method.
#[derive(Debug, Clone, PartialEq)]
pub struct BasicSolution {
    pub x: Vector<f64>,
    // Simplex multipliers, B^Ty = c_B
    pub y: Vector<f64>,
    pub basis: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LPResult {
    Unbounded,
    Infeasible,
    Optimum(BasicSolution),
}

impl StandardForm {
    pub fn objective(&self, x: &Vector<f64>) -> f64 {
        self.c.dot(x)
    }
}

#[test]
fn standard_form_objective() {
    let problem = StandardForm {
        a: Matrix::new(1, 3, vec![1.0, 1.0, 1.0]),
        b: Vector::new(vec![4.0]),
        c: Vector::new(vec![-3.0, -2.0, 0.0]),
    };
    let x = Vector::new(vec![2.0, 2.0, 0.0]);
    assert_eq!(problem.objective(&x), -10.0);
}
