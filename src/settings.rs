use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Tolerances, solver limits and plot geometry.
///
/// Build with [`SettingsBuilder`] or load from JSON with
/// [`Settings::from_json_file`]; fields left out take their defaults.
#[derive(Builder, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[builder(build_fn(validate = "Self::validate"))]
#[serde(default)]
pub struct Settings {
    ///duality gap below which strong duality is reported
    #[builder(default = "1e-5")]
    pub strong_duality_tol: f64,

    ///slack allowed in the weak duality sign check
    #[builder(default = "1e-10")]
    pub weak_duality_tol: f64,

    ///shadow price above which a constraint counts as binding
    #[builder(default = "1e-6")]
    pub binding_tol: f64,

    ///reduced cost and ratio test tolerance
    #[builder(default = "1e-9")]
    pub pivot_tol: f64,

    ///maximum simplex pivots per phase
    #[builder(default = "1000")]
    pub max_iter: u32,

    ///upper bound of both plot axes
    #[builder(default = "8.0")]
    pub plot_extent: f64,

    ///grid points per axis for the surfaces
    #[builder(default = "50")]
    pub grid_points: usize,

    ///samples along each constraint line
    #[builder(default = "100")]
    pub line_samples: usize,

    #[builder(default = "900")]
    pub plot_width: u32,

    #[builder(default = "700")]
    pub plot_height: u32,
}

impl Default for Settings {
    fn default() -> Settings {
        SettingsBuilder::default().build().unwrap()
    }
}

impl Settings {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Settings, Error> {
        let reader = BufReader::new(File::open(path)?);
        let settings: Settings = serde_json::from_reader(reader)?;
        settings.check()?;
        Ok(settings)
    }

    /// Validate an already constructed value, e.g. one read from disk.
    pub fn check(&self) -> Result<(), Error> {
        let builder = SettingsBuilder::default()
            .strong_duality_tol(self.strong_duality_tol)
            .weak_duality_tol(self.weak_duality_tol)
            .binding_tol(self.binding_tol)
            .pivot_tol(self.pivot_tol)
            .max_iter(self.max_iter)
            .plot_extent(self.plot_extent)
            .grid_points(self.grid_points)
            .line_samples(self.line_samples)
            .plot_width(self.plot_width)
            .plot_height(self.plot_height)
            .clone();
        builder.validate().map_err(Error::Settings)
    }
}

impl SettingsBuilder {
    fn validate(&self) -> Result<(), String> {
        let tolerances = [
            ("strong_duality_tol", self.strong_duality_tol),
            ("weak_duality_tol", self.weak_duality_tol),
            ("binding_tol", self.binding_tol),
            ("pivot_tol", self.pivot_tol),
        ];
        for (name, value) in tolerances.iter() {
            if let Some(v) = value {
                if !(v.is_finite() && *v > 0.0) {
                    return Err(format!("{} must be positive and finite", name));
                }
            }
        }
        if let Some(0) = self.max_iter {
            return Err("max_iter must be positive".to_string());
        }
        if let Some(extent) = self.plot_extent {
            if !(extent.is_finite() && extent > 0.0) {
                return Err("plot_extent must be positive and finite".to_string());
            }
        }
        if let Some(n) = self.grid_points {
            if n < 2 {
                return Err("grid_points must be at least 2".to_string());
            }
        }
        if let Some(n) = self.line_samples {
            if n < 2 {
                return Err("line_samples must be at least 2".to_string());
            }
        }
        if self.plot_width == Some(0) || self.plot_height == Some(0) {
            return Err("plot size must be nonzero".to_string());
        }
        Ok(())
    }
}

#[test]
fn default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.strong_duality_tol, 1e-5);
    assert_eq!(settings.weak_duality_tol, 1e-10);
    assert_eq!(settings.binding_tol, 1e-6);
    assert_eq!(settings.grid_points, 50);
    assert_eq!(settings.line_samples, 100);
    assert_eq!(settings.plot_extent, 8.0);
}

#[test]
fn builder_rejects_bad_values() {
    assert!(SettingsBuilder::default().grid_points(1).build().is_err());
    assert!(SettingsBuilder::default().pivot_tol(-1.0).build().is_err());
    assert!(SettingsBuilder::default().plot_extent(f64::NAN).build().is_err());
    assert!(SettingsBuilder::default().max_iter(0).build().is_err());
    let settings = SettingsBuilder::default()
        .grid_points(10)
        .build()
        .expect("Valid settings should build");
    assert_eq!(settings.grid_points, 10);
    assert_eq!(settings.line_samples, 100);
}

#[test]
fn partial_json_takes_defaults() {
    let settings: Settings = serde_json::from_str(r#"{"grid_points": 20}"#)
        .expect("Partial settings should parse");
    assert_eq!(settings.grid_points, 20);
    assert_eq!(settings.strong_duality_tol, 1e-5);
    assert!(settings.check().is_ok());

    let bad: Settings = serde_json::from_str(r#"{"line_samples": 0}"#)
        .expect("Settings should parse before validation");
    assert!(bad.check().is_err());
}
