// ─────────────────────────────────────────────────────────────────────
// SCPN Discharge Core — Error
// © 1998–2026 Miroslav Šotek. All rights reserved.
// Contact: www.anulum.li | protoscience@anulum.li
// ORCID: https://orcid.org/0009-0009-3560-0851
// License: GNU AGPL v3 | Commercial licensing available
// ─────────────────────────────────────────────────────────────────────
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DischargeError {
    #[error("Solver setup failed: {0}")]
    SolverSetupFailed(String),

    #[error("Solver not ready: {0}")]
    SolverNotReady(String),

    #[error("Shape mismatch in {context}: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        context: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },

    #[error("Precondition violated: {0}")]
    PreconditionViolated(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type DischargeResult<T> = Result<T, DischargeError>;
