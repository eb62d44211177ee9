use thiserror::Error;

#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Order rejected by venue: {0}")]
    Rejected(String),
}
