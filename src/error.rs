use pyo3::exceptions::PyRuntimeError;
use pyo3::PyErr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Data not loaded: {0}")]
    NotLoaded(String),

    #[error("Missing configuration key: {0}")]
    MissingConfig(String),

    #[error("Missing product parameters: {0}")]
    MissingProduct(String),

    #[error("Missing product parameter: {0}")]
    MissingParameter(String),

    #[error("Unknown track label: {0}")]
    UnknownTrack(String),

    #[error("Missing column: {0}")]
    MissingColumn(String),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Distribution: {0}")]
    Distribution(String),

    #[error("Validation: {0}")]
    Validation(String),

    #[error("{0}")]
    General(String),
}

impl From<PlanError> for PyErr {
    fn from(err: PlanError) -> PyErr {
        PyRuntimeError::new_err(err.to_string())
    }
}

impl From<PyErr> for PlanError {
    fn from(err: PyErr) -> Self {
        PlanError::General(err.to_string())
    }
}
