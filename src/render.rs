//! Text and LaTeX views of the problems and of a [`DualityReport`].

use std::cmp::Ordering;
use std::fmt;

use clap::ValueEnum;

use crate::analysis::{DualityReport, Scenario};
use crate::builder::Outcome;
use crate::duality::{CanonicalLp, Sense};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Symbol {
    X,
    Lambda,
}

impl Symbol {
    fn latex(self, i: usize) -> String {
        match self {
            Symbol::X => format!("x_{}", i),
            Symbol::Lambda => format!("\\lambda_{}", i),
        }
    }

    fn plain(self, i: usize) -> String {
        let sub = if i == 1 { '₁' } else { '₂' };
        match self {
            Symbol::X => format!("x{}", sub),
            Symbol::Lambda => format!("λ{}", sub),
        }
    }
}

// "3.0x_1 + 2.0x_2", with the sign folded into the operator
fn linear_terms<F>(coeffs: [f64; 2], var: F) -> String
    where F: Fn(usize) -> String
{
    let mut out = format!("{:.1}{}", coeffs[0], var(1));
    if coeffs[1] < 0.0 {
        out.push_str(&format!(" - {:.1}{}", -coeffs[1], var(2)));
    } else {
        out.push_str(&format!(" + {:.1}{}", coeffs[1], var(2)));
    }
    out
}

fn latex_relation(relation: Ordering) -> &'static str {
    match relation {
        Ordering::Less => "\\leq",
        Ordering::Greater => "\\geq",
        Ordering::Equal => "=",
    }
}

fn plain_relation(relation: Ordering) -> &'static str {
    match relation {
        Ordering::Less => "≤",
        Ordering::Greater => "≥",
        Ordering::Equal => "=",
    }
}

/// `align*` block for a 2x2 problem, coefficients to one decimal.
pub fn latex(lp: &CanonicalLp, symbol: Symbol) -> String {
    let var = |i| symbol.latex(i);
    let rel = latex_relation(lp.relation());
    let mut out = String::from("\\begin{align*}\n");
    out.push_str(&format!("\\text{{{}}} & \\quad {} \\\\\n",
                          lp.sense.word(), linear_terms(lp.objective, &var)));
    for row in 0..2 {
        let lead = if row == 0 { "\\text{subject to} " } else { "" };
        out.push_str(&format!("{}& \\quad {} {} {:.1} \\\\\n",
                              lead, linear_terms(lp.matrix[row], &var), rel, lp.rhs[row]));
    }
    out.push_str(&format!("& \\quad {}, {} \\geq 0\n", var(1), var(2)));
    out.push_str("\\end{align*}");
    out
}

/// Plain-text rendering of a 2x2 problem.
pub struct Formulation<'a> {
    pub lp: &'a CanonicalLp,
    pub symbol: Symbol,
}

impl<'a> fmt::Display for Formulation<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let var = |i| self.symbol.plain(i);
        let rel = plain_relation(self.lp.relation());
        writeln!(f, "{:<11} {}", self.lp.sense.word(), linear_terms(self.lp.objective, &var))?;
        for row in 0..2 {
            let lead = if row == 0 { "subject to" } else { "" };
            writeln!(f, "{:<11} {} {} {:.1}",
                     lead, linear_terms(self.lp.matrix[row], &var), rel, self.lp.rhs[row])?;
        }
        write!(f, "{:<11} {}, {} ≥ 0", "", var(1), var(2))
    }
}

fn write_outcome(f: &mut fmt::Formatter, outcome: &Outcome, symbol: Symbol) -> fmt::Result {
    match *outcome {
        Outcome::Optimal(ref s) => {
            writeln!(f, "  {}* = {:.3}", symbol.plain(1), s.values[0])?;
            writeln!(f, "  {}* = {:.3}", symbol.plain(2), s.values[1])?;
            writeln!(f, "  Objective Value = {:.3}", s.objective)
        },
        Outcome::Infeasible => writeln!(f, "  No feasible solution found (infeasible)"),
        Outcome::Unbounded => writeln!(f, "  No finite optimum (unbounded)"),
    }
}

/// The full dashboard as text.
pub struct Report<'a>(pub &'a DualityReport);

impl<'a> Report<'a> {
    fn write_analysis(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Duality Analysis")?;
        let gap = match report.gap {
            Some(gap) => gap,
            None => {
                return writeln!(f, "  Duality gap undefined: {} primal, {} dual",
                                report.primal.status(), report.dual.status());
            },
        };
        writeln!(f, "  Duality Gap = {:.6}", gap)?;
        if report.strong_duality == Some(true) {
            writeln!(f, "  Strong Duality achieved!")?;
            writeln!(f, "  Primal and dual optimal values are equal")?;
        } else {
            writeln!(f, "  Weak Duality only")?;
            writeln!(f, "  Gap exists between primal and dual")?;
        }
        if report.weak_duality_holds == Some(true) {
            let statement = match report.parameters.sense {
                Sense::Maximize => "Primal ≤ Dual",
                Sense::Minimize => "Primal ≥ Dual",
            };
            writeln!(f, "  Weak duality condition satisfied: {}", statement)?;
        }
        Ok(())
    }

    fn write_shadow_prices(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let prices = match self.0.shadow_prices {
            Some(ref prices) => prices,
            None => return Ok(()),
        };
        let effect = match self.0.parameters.sense {
            Sense::Maximize => "improve",
            Sense::Minimize => "rise",
        };
        writeln!(f, "Shadow Prices")?;
        for p in prices.iter() {
            writeln!(f, "  {}* = {:.3} (Constraint {})",
                     Symbol::Lambda.plain(p.constraint), p.price, p.constraint)?;
        }
        for p in prices.iter() {
            writeln!(f, "  Changing constraint {} by one unit (from {:.1} to {:.1}), \
                         the objective would {} by approximately {:.3}",
                     p.constraint, p.rhs, p.relaxed_rhs, effect, p.objective_change)?;
        }
        for p in prices.iter() {
            if p.binding {
                writeln!(f, "  Constraint {} is binding (shadow price = {:.3})",
                         p.constraint, p.price)?;
            } else {
                writeln!(f, "  Constraint {} is not binding (shadow price = 0)", p.constraint)?;
            }
        }
        Ok(())
    }
}

impl<'a> fmt::Display for Report<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let report = self.0;
        writeln!(f, "Primal Problem")?;
        writeln!(f, "{}", Formulation { lp: &report.primal_problem, symbol: Symbol::X })?;
        writeln!(f)?;
        writeln!(f, "Dual Problem")?;
        writeln!(f, "{}", Formulation { lp: &report.dual_problem, symbol: Symbol::Lambda })?;
        writeln!(f)?;
        writeln!(f, "Primal Solution")?;
        write_outcome(f, &report.primal, Symbol::X)?;
        writeln!(f, "Dual Solution")?;
        write_outcome(f, &report.dual, Symbol::Lambda)?;
        writeln!(f)?;
        self.write_analysis(f)?;
        writeln!(f)?;
        self.write_shadow_prices(f)?;
        write!(f, "Scenario: {}", scenario_summary(report.scenario))
    }
}

pub fn scenario_summary(scenario: Scenario) -> &'static str {
    match scenario {
        Scenario::StrongDuality =>
            "both problems are optimal with equal objective values",
        Scenario::DualityGap =>
            "both problems are optimal but their objective values differ",
        Scenario::UnboundedPrimal =>
            "the primal objective improves without limit and the dual is infeasible",
        Scenario::InfeasiblePrimal =>
            "the primal constraints contradict each other; the dual cannot have a finite optimum",
        Scenario::Inconsistent =>
            "the solver results do not form a valid primal/dual pairing",
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Topic {
    StrongDuality,
    FailureCases,
    Theorems,
    ElectricityMarkets,
    Experiments,
}

const STRONG_DUALITY: &str = "\
Strong Duality

Strong duality occurs when both primal and dual problems have optimal
solutions and their objective values are equal:

    f* = g*    (duality gap = 0)

When does strong duality hold?
  - Linear programs with bounded feasible regions
  - Convex optimization problems satisfying constraint qualifications
  - Both primal and dual have finite optimal solutions";

const FAILURE_CASES: &str = "\
Cases Where Strong Duality Fails

Case 1: Unbounded Primal
  - Primal objective -> +inf (max) or -inf (min)
  - Dual problem becomes infeasible
  - No finite optimal solutions exist
  Example: the unbounded-primal experiment

Case 2: Infeasible Primal
  - Primal has no feasible solution
  - Dual becomes unbounded
  - Constraints are contradictory
  Example: the infeasible-primal experiment";

const ELECTRICITY_MARKETS: &str = "\
Connection to Electricity Markets

In electricity markets, duality theory provides the foundation for pricing:
  - Primal Problem: Economic dispatch (minimize generation cost)
  - Dual Variables: Locational Marginal Prices (LMPs)
  - Shadow Prices: Value of transmission capacity, generation limits
  - Strong Duality: Ensures market clearing prices exist

Key Applications:
  1. LMP Calculation: Dual variables of power balance constraints
  2. Congestion Pricing: Shadow prices of transmission limits
  3. Reserve Pricing: Dual variables of reserve requirements
  4. Capacity Markets: Shadow prices of reliability constraints";

const EXPERIMENTS: &str = "\
Try these experiments:
  1. Strong Duality: use the standard-lp preset to see equal objective values
  2. Constraint Binding: change d1 or d2 and observe shadow price changes
  3. Unbounded Problems: use negative coefficients to create unbounded cases
  4. Infeasible Problems: create contradictory constraints";

fn theorems(sense: Sense) -> String {
    let weak = match sense {
        Sense::Maximize => "c^T x <= b^T λ    (maximization problems)",
        Sense::Minimize => "c^T x >= b^T λ    (minimization problems)",
    };
    format!("\
Fundamental Duality Theorems

Weak Duality Theorem:
For any feasible solutions x (primal) and λ (dual):

    {}

Strong Duality Theorem:
If both problems have optimal solutions, then:

    f* = g*

Complementary Slackness:
At optimality, either a constraint is tight OR its dual variable is zero:

    λ_i* (b_i - A_i x*) = 0    for all i", weak)
}

pub fn topic_text(topic: Topic, sense: Sense) -> String {
    match topic {
        Topic::StrongDuality => STRONG_DUALITY.to_string(),
        Topic::FailureCases => FAILURE_CASES.to_string(),
        Topic::Theorems => theorems(sense),
        Topic::ElectricityMarkets => ELECTRICITY_MARKETS.to_string(),
        Topic::Experiments => EXPERIMENTS.to_string(),
    }
}

#[cfg(test)]
use crate::analysis::analyze;
#[cfg(test)]
use crate::duality::Parameters;
#[cfg(test)]
use crate::settings::Settings;

#[test]
fn latex_primal_maximize() {
    let latex = latex(&Parameters::default().primal(), Symbol::X);
    assert_eq!(latex, "\\begin{align*}\n\
                       \\text{maximize} & \\quad 3.0x_1 + 2.0x_2 \\\\\n\
                       \\text{subject to} & \\quad 1.0x_1 + 1.0x_2 \\leq 4.0 \\\\\n\
                       & \\quad 2.0x_1 + 1.0x_2 \\leq 6.0 \\\\\n\
                       & \\quad x_1, x_2 \\geq 0\n\
                       \\end{align*}");
}

#[test]
fn latex_dual_of_minimize() {
    let params = Parameters {
        sense: Sense::Minimize,
        c2: -2.0,
        ..Parameters::default()
    };
    let latex = latex(&params.dual(), Symbol::Lambda);
    assert!(latex.contains("\\text{maximize} & \\quad 4.0\\lambda_1 + 6.0\\lambda_2"));
    assert!(latex.contains("1.0\\lambda_1 + 2.0\\lambda_2 \\leq 3.0"));
    assert!(latex.contains("1.0\\lambda_1 + 1.0\\lambda_2 \\leq -2.0"));
    assert!(latex.contains("\\lambda_1, \\lambda_2 \\geq 0"));
}

#[test]
fn plain_formulation() {
    let text = Formulation { lp: &Parameters::default().dual(), symbol: Symbol::Lambda }
        .to_string();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "minimize    4.0λ₁ + 6.0λ₂");
    assert_eq!(lines[1], "subject to  1.0λ₁ + 2.0λ₂ ≥ 3.0");
    assert_eq!(lines[3].trim(), "λ₁, λ₂ ≥ 0");
}

#[test]
fn negative_coefficients_fold_into_operator() {
    let params = Parameters { c2: -2.5, ..Parameters::default() };
    let text = Formulation { lp: &params.primal(), symbol: Symbol::X }.to_string();
    assert!(text.starts_with("maximize    3.0x₁ - 2.5x₂"));
}

#[test]
fn report_text_for_default_problem() {
    let report = analyze(&Parameters::default(), &Settings::default())
        .expect("Analysis should not fail");
    let text = Report(&report).to_string();
    assert!(text.contains("x₁* = 2.000"));
    assert!(text.contains("λ₂* = 1.000"));
    assert!(text.contains("Objective Value = 10.000"));
    assert!(text.contains("Duality Gap = 0.000000"));
    assert!(text.contains("Strong Duality achieved!"));
    assert!(text.contains("Weak duality condition satisfied: Primal ≤ Dual"));
    assert!(text.contains("from 4.0 to 5.0"));
    assert!(text.contains("Constraint 2 is binding (shadow price = 1.000)"));
}

#[test]
fn report_text_for_unbounded_problem() {
    let params = Parameters { sense: Sense::Minimize, c1: -1.0, ..Parameters::default() };
    let report = analyze(&params, &Settings::default())
        .expect("Analysis should not fail");
    let text = Report(&report).to_string();
    assert!(text.contains("No finite optimum (unbounded)"));
    assert!(text.contains("No feasible solution found (infeasible)"));
    assert!(text.contains("Duality gap undefined"));
    assert!(!text.contains("Shadow Prices"));
}

#[test]
fn theorems_follow_sense() {
    assert!(topic_text(Topic::Theorems, Sense::Maximize).contains("c^T x <= b^T λ"));
    assert!(topic_text(Topic::Theorems, Sense::Minimize).contains("c^T x >= b^T λ"));
    assert!(topic_text(Topic::ElectricityMarkets, Sense::Maximize).contains("LMP"));
}
