//! Error types for the CoA pipeline.

use thiserror::Error;

/// Why a wire payload was rejected
#[derive(Error, Debug)]
pub enum CoaError {
    #[error("Malformed snapshot payload: {0}")]
    Payload(#[from] serde_json::Error),

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_error_converts_from_serde() {
        let err: CoaError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("Malformed snapshot payload"));
    }
}
