use reqwest::StatusCode;
use shared::{domain::OrderId, error::SchemaError};
use thiserror::Error;

/// Read-path failure. Never carries partial data.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("order fetch transport failure: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("order fetch returned HTTP {0}")]
    Status(StatusCode),
    #[error("order fetch payload could not be decoded: {0}")]
    Decode(#[from] SchemaError),
}

#[derive(Debug, Error)]
pub enum UpdateError {
    #[error("status update for order {order_id} failed: {source}")]
    Transport {
        order_id: OrderId,
        source: reqwest::Error,
    },
    #[error("status update for order {order_id} rejected with HTTP {status}")]
    Rejected { order_id: OrderId, status: StatusCode },
}

impl UpdateError {
    pub fn order_id(&self) -> OrderId {
        match self {
            UpdateError::Transport { order_id, .. } | UpdateError::Rejected { order_id, .. } => {
                *order_id
            }
        }
    }
}

/// Failures the calling surface must act on. Remote read/write failures are
/// absorbed into banners and reported through outcomes instead.
#[derive(Debug, Error)]
pub enum ControllerError {
    #[error("no stored operator identity; sign-in required")]
    Unauthenticated,
    #[error("failed to read operator identity: {source}")]
    IdentityStore { source: anyhow::Error },
    #[error("order screen has been unmounted")]
    Disposed,
}
