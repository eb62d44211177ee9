use thiserror::Error;

#[derive(Error, Debug)]
pub enum AlgoError {
    #[error("Policy received invalid parameters: {0}")]
    InvalidParameters(String),

    #[error("Malformed policy setting: {0}")]
    Setting(#[from] serde_json::Error),
}
