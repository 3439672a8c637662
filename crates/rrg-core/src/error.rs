use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RotationError {
    #[error("Fetch failed: {0}")]
    FetchFailed(String),

    #[error("No data available")]
    EmptyDataset,

    #[error("Non-finite RS value for {entity_id}")]
    NonFiniteValue { entity_id: String },

    #[error("Export error: {0}")]
    Export(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type RotationResult<T> = Result<T, RotationError>;
