//! Primal/dual explorer for two-variable linear programs.
//!
//! [`analysis::analyze`] derives the dual of a [`duality::Parameters`]
//! problem, solves both with the two-phase simplex method in [`simplex`]
//! and reports the duality gap and shadow prices. [`render`] and [`plot`]
//! turn the result into text, LaTeX and an SVG scene.

pub mod error;
pub mod settings;
pub mod builder;
pub mod problem;
pub mod simplex;
pub mod duality;
pub mod analysis;
pub mod experiments;
pub mod render;
pub mod plot;

mod random_tests;

pub use analysis::{analyze, DualityReport, Scenario};
pub use duality::{CanonicalLp, Parameters, Sense};
pub use error::Error;
pub use settings::{Settings, SettingsBuilder};
