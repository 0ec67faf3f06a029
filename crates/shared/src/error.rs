use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unknown order status `{0}`")]
    UnknownStatus(String),
    #[error("invalid order id `{0}`")]
    InvalidOrderId(String),
    #[error("unknown order schema `{0}`")]
    UnknownSchema(String),
    #[error("malformed order payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
