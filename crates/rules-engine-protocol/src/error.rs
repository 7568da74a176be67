use thiserror::Error;

/// Webhook bodies rejected before resolution.
#[derive(Debug, Error)]
pub enum PayloadError {
    #[error("invalid JSON body: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("missing field: {0}")]
    MissingField(&'static str),
}
