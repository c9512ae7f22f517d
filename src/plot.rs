//! 3D scene of the objective surface over the primal feasible region.

use std::path::Path;

use log::debug;
use plotters::prelude::*;
use serde::Serialize;

use crate::builder::Outcome;
use crate::duality::Parameters;
use crate::error::Error;
use crate::settings::Settings;

pub const TITLE: &str = "3D Visualization: Objective Function and Feasible Region";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConstraintLine {
    pub label: String,
    /// `(x1, x2, objective)` triples
    pub points: Vec<[f64; 3]>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimalPoint {
    pub label: String,
    pub position: [f64; 3],
}

/// Plot data in meshgrid layout: `objective[j][i]` is the objective at
/// `(axis[i], axis[j])`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlotScene {
    pub title: String,
    /// `c1, c2`
    pub coefficients: [f64; 2],
    pub axis: Vec<f64>,
    pub objective: Vec<Vec<f64>>,
    /// The objective where the primal is feasible, `None` elsewhere
    pub feasible: Vec<Vec<Option<f64>>>,
    pub constraint_lines: Vec<ConstraintLine>,
    pub optimum: Option<OptimalPoint>,
}

fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![start; n];
    }
    let step = (end - start) / (n - 1) as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

impl PlotScene {
    pub fn build(params: &Parameters, primal: &Outcome, settings: &Settings) -> PlotScene {
        let lp = params.primal();
        let extent = settings.plot_extent;
        let axis = linspace(0.0, extent, settings.grid_points);

        let objective: Vec<Vec<f64>> = axis.iter()
            .map(|&x2| axis.iter().map(|&x1| lp.evaluate([x1, x2])).collect::<Vec<_>>())
            .collect();
        let feasible: Vec<Vec<Option<f64>>> = axis.iter()
            .zip(objective.iter())
            .map(|(&x2, row)| {
                axis.iter().zip(row.iter())
                    .map(|(&x1, &z)| if lp.is_feasible([x1, x2]) { Some(z) } else { None })
                    .collect::<Vec<_>>()
            })
            .collect();

        let samples = linspace(0.0, extent, settings.line_samples);
        let mut constraint_lines = Vec::new();
        for (row, (coeffs, &rhs)) in lp.matrix.iter().zip(lp.rhs.iter()).enumerate() {
            let (a, b) = (coeffs[0], coeffs[1]);
            if b == 0.0 {
                continue;
            }
            let points = samples.iter()
                .map(|&x1| (x1, (rhs - a * x1) / b))
                .filter(|&(_, x2)| x2 >= 0.0 && x2 <= extent)
                .map(|(x1, x2)| [x1, x2, lp.evaluate([x1, x2])])
                .collect();
            constraint_lines.push(ConstraintLine {
                label: format!("Constraint {}: {:.1}x₁ + {:.1}x₂ = {:.1}", row + 1, a, b, rhs),
                points: points,
            });
        }

        let optimum = primal.solution().map(|s| {
            let (x1, x2) = (s.values[0], s.values[1]);
            OptimalPoint {
                label: format!("Optimal Point ({:.2}, {:.2})", x1, x2),
                position: [x1, x2, lp.evaluate([x1, x2])],
            }
        });

        PlotScene {
            title: TITLE.to_string(),
            coefficients: lp.objective,
            axis: axis,
            objective: objective,
            feasible: feasible,
            constraint_lines: constraint_lines,
            optimum: optimum,
        }
    }

    pub fn objective_range(&self) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for &z in self.objective.iter().flat_map(|row| row.iter()) {
            lo = lo.min(z);
            hi = hi.max(z);
        }
        if let Some(ref opt) = self.optimum {
            lo = lo.min(opt.position[2]);
            hi = hi.max(opt.position[2]);
        }
        if hi - lo < 1e-9 {
            // Flat surface, e.g. c = 0
            (lo - 1.0, hi + 1.0)
        } else {
            (lo, hi)
        }
    }

    /// Upper bound of both horizontal axes: the grid extent, widened to
    /// keep the optimum in view.
    pub fn view_extent(&self) -> f64 {
        let mut hi = self.axis.last().cloned().unwrap_or(0.0);
        if let Some(ref opt) = self.optimum {
            hi = hi.max(opt.position[0]).max(opt.position[1]);
        }
        hi
    }

    // Grid cells whose four corners are all feasible
    fn feasible_cells(&self) -> Vec<Vec<(f64, f64, f64)>> {
        let n = self.axis.len();
        let mut cells = Vec::new();
        for j in 0..n.saturating_sub(1) {
            for i in 0..n.saturating_sub(1) {
                let corners = [(j, i), (j, i + 1), (j + 1, i + 1), (j + 1, i)];
                let polygon: Option<Vec<(f64, f64, f64)>> = corners.iter()
                    .map(|&(r, c)| self.feasible[r][c].map(|z| (self.axis[c], z, self.axis[r])))
                    .collect();
                if let Some(polygon) = polygon {
                    cells.push(polygon);
                }
            }
        }
        cells
    }

    pub fn to_json(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn plot_error<E: std::fmt::Display>(e: E) -> Error {
    Error::Plot(e.to_string())
}

/// Draw the scene as SVG. The vertical axis carries the objective value.
pub fn render_svg<P: AsRef<Path>>(scene: &PlotScene, path: P, settings: &Settings)
    -> Result<(), Error> {
    settings.check()?;
    let extent = scene.view_extent();
    let (z_lo, z_hi) = scene.objective_range();

    let area = SVGBackend::new(path.as_ref(), (settings.plot_width, settings.plot_height))
        .into_drawing_area();
    area.fill(&WHITE).map_err(plot_error)?;

    let mut chart = ChartBuilder::on(&area)
        .caption(&scene.title, ("sans-serif", 20))
        .margin(30)
        .build_cartesian_3d(0.0..extent, z_lo..z_hi, 0.0..extent)
        .map_err(plot_error)?;

    chart.with_projection(|mut pb| {
        pb.yaw = 0.8;
        pb.pitch = 0.4;
        pb.scale = 0.8;
        pb.into_matrix()
    });

    chart.configure_axes()
        .x_labels(5)
        .y_labels(5)
        .z_labels(5)
        .draw()
        .map_err(plot_error)?;

    let c = scene.coefficients;
    chart.draw_series(
        SurfaceSeries::xoz(
            scene.axis.iter().cloned(),
            scene.axis.iter().cloned(),
            move |x1: f64, x2: f64| c[0] * x1 + c[1] * x2,
        )
        .style(BLUE.mix(0.3).filled()),
    ).map_err(plot_error)?
        .label("Objective Function Surface")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], BLUE.mix(0.3).filled()));

    chart.draw_series(
        scene.feasible_cells().into_iter()
            .map(|cell| Polygon::new(cell, RED.mix(0.6).filled())),
    ).map_err(plot_error)?
        .label("Feasible Region Surface")
        .legend(|(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], RED.mix(0.6).filled()));

    let orange = RGBColor(255, 165, 0);
    let line_colors = [RED, orange];
    for (line, &color) in scene.constraint_lines.iter().zip(line_colors.iter()) {
        chart.draw_series(LineSeries::new(
            line.points.iter().map(|p| (p[0], p[2], p[1])),
            color.stroke_width(3),
        )).map_err(plot_error)?
            .label(line.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(3)));
    }

    if let Some(ref opt) = scene.optimum {
        let gold = RGBColor(255, 215, 0);
        let p = opt.position;
        chart.draw_series(PointSeries::of_element(
            [(p[0], p[2], p[1])],
            8,
            gold.filled(),
            &|coord, size, style| {
                EmptyElement::at(coord) + Circle::new((0, 0), size, style)
            },
        )).map_err(plot_error)?
            .label(opt.label.as_str())
            .legend(move |(x, y)| Circle::new((x + 10, y), 5, gold.filled()));
    }

    chart.configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(plot_error)?;

    area.present().map_err(plot_error)?;
    debug!("wrote plot with {} constraint lines", scene.constraint_lines.len());
    Ok(())
}

#[cfg(test)]
use crate::analysis::analyze;
#[cfg(test)]
use crate::duality::Sense;

#[test]
fn scene_of_default_problem() {
    let params = Parameters::default();
    let settings = Settings::default();
    let report = analyze(&params, &settings).expect("Analysis should not fail");
    let scene = PlotScene::build(&params, &report.primal, &settings);

    assert_eq!(scene.axis.len(), 50);
    assert_eq!(scene.axis[0], 0.0);
    assert!((scene.axis[49] - 8.0).abs() < 1e-12);
    assert_eq!(scene.objective.len(), 50);
    assert!(scene.objective.iter().all(|row| row.len() == 50));
    // objective[j][i] at (axis[i], axis[j])
    let (i, j) = (10, 3);
    let expected = 3.0 * scene.axis[i] + 2.0 * scene.axis[j];
    assert!((scene.objective[j][i] - expected).abs() < 1e-12);

    // Origin is feasible, the far corner is not
    assert_eq!(scene.feasible[0][0], Some(0.0));
    assert_eq!(scene.feasible[49][49], None);

    let optimum = scene.optimum.expect("Default problem is optimal");
    assert_eq!(optimum.label, "Optimal Point (2.00, 2.00)");
    assert!((optimum.position[2] - 10.0).abs() < 1e-9);
}

#[test]
fn constraint_lines_stay_in_view() {
    let params = Parameters::default();
    let settings = Settings::default();
    let scene = PlotScene::build(&params, &Outcome::Infeasible, &settings);
    assert!(scene.optimum.is_none());
    assert_eq!(scene.constraint_lines.len(), 2);
    assert_eq!(scene.constraint_lines[0].label, "Constraint 1: 1.0x₁ + 1.0x₂ = 4.0");
    assert_eq!(scene.constraint_lines[1].label, "Constraint 2: 2.0x₁ + 1.0x₂ = 6.0");
    for line in scene.constraint_lines.iter() {
        assert!(!line.points.is_empty());
        for p in line.points.iter() {
            assert!(p[1] >= 0.0 && p[1] <= 8.0);
            assert!((p[2] - (3.0 * p[0] + 2.0 * p[1])).abs() < 1e-9);
        }
    }
    // x1 + x2 = 4 leaves the positive quadrant after x1 = 4
    assert!(scene.constraint_lines[0].points.iter().all(|p| p[0] <= 4.0 + 1e-9));
}

#[test]
fn vertical_constraint_has_no_line() {
    let params = Parameters { b2: 0.0, ..Parameters::default() };
    let scene = PlotScene::build(&params, &Outcome::Infeasible, &Settings::default());
    assert_eq!(scene.constraint_lines.len(), 1);
}

#[test]
fn feasible_region_follows_sense() {
    let params = Parameters { sense: Sense::Minimize, ..Parameters::default() };
    let scene = PlotScene::build(&params, &Outcome::Infeasible, &Settings::default());
    assert_eq!(scene.feasible[0][0], None);
    assert!(scene.feasible[49][49].is_some());
    assert!(!scene.feasible_cells().is_empty());
}

#[test]
fn flat_objective_range_is_padded() {
    let params = Parameters { c1: 0.0, c2: 0.0, ..Parameters::default() };
    let scene = PlotScene::build(&params, &Outcome::Infeasible, &Settings::default());
    assert_eq!(scene.objective_range(), (-1.0, 1.0));
}

#[test]
fn render_default_scene_to_svg() {
    let params = Parameters::default();
    let settings = Settings::default();
    let report = analyze(&params, &settings).expect("Analysis should not fail");
    let scene = PlotScene::build(&params, &report.primal, &settings);
    let path = std::env::temp_dir().join("lp_duality_render_default.svg");
    render_svg(&scene, &path, &settings).expect("Rendering should not fail");
    let svg = std::fs::read_to_string(&path).expect("SVG should be written");
    assert!(svg.contains("<svg"));
    let _ = std::fs::remove_file(&path);
}

#[test]
fn unvalidated_grid_does_not_panic() {
    let settings = Settings { grid_points: 0, line_samples: 1, ..Settings::default() };
    let scene = PlotScene::build(&Parameters::default(), &Outcome::Infeasible, &settings);
    assert!(scene.axis.is_empty());
    assert!(scene.feasible_cells().is_empty());

    let path = std::env::temp_dir().join("lp_duality_render_empty.svg");
    match render_svg(&scene, &path, &settings) {
        Err(Error::Settings(_)) => {},
        other => panic!("Expected settings error, got {:?}", other),
    }
}

#[test]
fn distant_optimum_widens_view() {
    // Optimum at (100, 0), far past the grid
    let params = Parameters {
        a1: 0.1,
        b1: 1.0,
        d1: 10.0,
        a2: 0.1,
        b2: 2.0,
        d2: 20.0,
        ..Parameters::default()
    };
    let settings = Settings::default();
    let report = analyze(&params, &settings).expect("Analysis should not fail");
    let scene = PlotScene::build(&params, &report.primal, &settings);
    let optimum = scene.optimum.clone().expect("Problem is optimal");
    assert!((optimum.position[0] - 100.0).abs() < 1e-6);
    assert!((scene.view_extent() - 100.0).abs() < 1e-6);

    let (_, z_hi) = scene.objective_range();
    assert!((z_hi - 300.0).abs() < 1e-6);

    let bounded = PlotScene::build(&Parameters::default(), &Outcome::Infeasible, &settings);
    assert!((bounded.view_extent() - 8.0).abs() < 1e-12);
}
