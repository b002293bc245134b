use thiserror::Error;

pub type Result<T> = std::result::Result<T, RiskError>;

/// Errors surfaced by the risk engine
///
/// Missing optional data is never an error: it becomes a fallback value with a
/// flag on the result. Only structurally invalid input and batch-level failures
/// reach the caller through this type.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("batch contains no units")]
    EmptyBatch,

    #[error("hazard {hazard_id} has unresolvable coordinates ({lat}, {lng})")]
    InvalidCoordinates { hazard_id: String, lat: f64, lng: f64 },

    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("weight profile '{profile}' is invalid: weights sum to {sum}")]
    InvalidWeights { profile: String, sum: f64 },

    #[error("unit '{unit_id}' has invalid input: {reason}")]
    InvalidInput { unit_id: String, reason: String },

    #[error("failed to load dataset: {0}")]
    DatasetLoad(String),

    #[error("failed to parse dataset: {0}")]
    DatasetParse(String),

    #[error("configuration error: {0}")]
    Config(String),
}
