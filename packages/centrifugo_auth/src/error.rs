//! Error types for token issuance and inspection.

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("signing secret is empty")]
    EmptySecret,

    #[error("malformed token: expected 3 segments, found {0}")]
    SegmentCount(usize),

    #[error("invalid base64 in token segment: {0}")]
    Encoding(#[from] data_encoding::DecodeError),

    #[error("invalid JSON in token segment: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid signature")]
    InvalidSignature,
}
