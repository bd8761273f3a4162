use common::ErrorLocation;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum CodecError {
    #[error("Encode Error: {message} {location}")]
    Encode {
        message: String,
        location: ErrorLocation,
    },

    /// The reply payload does not match the shape the call site declared:
    /// absent where a payload was required, wrong byte length for a
    /// fixed-size shape, or invalid UTF-8 for a text shape.
    #[error("Malformed Response: {message} {location}")]
    Malformed {
        message: String,
        location: ErrorLocation,
    },
}

impl From<serde_json::Error> for CodecError {
    #[track_caller]
    fn from(error: serde_json::Error) -> Self {
        CodecError::Encode {
            message: error.to_string(),
            location: ErrorLocation::capture(),
        }
    }
}
