use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("linear algebra failure: {0}")]
    RulinalgError(#[from] rulinalg::error::Error),

    /// Simplex did not terminate within the configured number of pivots
    #[error("simplex exceeded {limit} pivots")]
    IterationLimit { limit: u32 },

    /// An artificial variable could not be pivoted out of the phase 1 basis
    #[error("artificial variable stuck in basis at row {row}")]
    DegenerateBasis { row: usize },

    #[error("parameter {name} must be finite (got {value})")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("invalid settings: {0}")]
    Settings(String),

    #[error("plot rendering failed: {0}")]
    Plot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
