use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Contract not found for symbol '{0}'")]
    ContractNotFound(String),

    #[error("Invalid start request: {0}")]
    InvalidRequest(String),

    #[error("Policy error: {0}")]
    Algo(#[from] algos::AlgoError),
}
