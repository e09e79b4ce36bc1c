//! Error taxonomy shared by the kinetics, calibration and optimization
//! modules.
//!
//! Only genuinely invalid input or a broken forward simulation is an error.
//! Expected non-convergence of a fit or a search is reported through a
//! `converged: bool` flag on the outcome record instead, so a caller can
//! still use the best estimate found.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum KineticsError {
    /// Physically or structurally invalid input, detected before any
    /// expensive computation. Always fatal to the call.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// A required field or stage of a staged workflow was skipped.
    #[error("Missing data: {0}")]
    MissingData(String),
    /// The ODE solver could not produce a valid trajectory (no result,
    /// NaN in the solution, or concentrations negative beyond tolerance).
    #[error("Integration failed: {0}")]
    IntegrationFailure(String),
    #[error("Calibration error: {0}")]
    Calibration(String),
    #[error("Optimization error: {0}")]
    Optimization(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
