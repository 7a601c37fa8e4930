use thiserror::Error;

/// Why a hex string was rejected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HexFault {
    #[error("hex string length {0} is odd")]
    OddLength(usize),

    #[error("invalid hex character pair {pair:?} at offset {offset}")]
    InvalidPair { pair: String, offset: usize },
}

/// Fatal errors of the telegram decode pipeline.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected exactly 2 arguments, got {0}")]
    Usage(usize),

    #[error("invalid hex encoding in {field}: {fault}")]
    InvalidEncoding { field: &'static str, fault: HexFault },

    #[error("AES-128 key must be {expected} bytes, got {actual}")]
    InvalidKeySize { expected: usize, actual: usize },

    #[error("AES decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("report serialization failed: {0}")]
    Format(String),
}

impl From<serde_json::Error> for DecodeError {
    fn from(e: serde_json::Error) -> Self {
        DecodeError::Format(e.to_string())
    }
}
