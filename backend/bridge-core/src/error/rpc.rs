use crate::error::channel::ChannelError;
use crate::error::codec::CodecError;

use common::ErrorLocation;

use thiserror::Error as ThisError;

/// The only error kinds an RPC caller ever sees.
///
/// None of these are retried or masked inside the bridge; a failed call
/// never yields a default-typed result in their place.
#[derive(Debug, ThisError)]
pub enum RpcError {
    #[error("Not Connected: {message} {location}")]
    NotConnected {
        message: String,
        location: ErrorLocation,
    },

    #[error("Transport Failure: {message} {location}")]
    Transport {
        message: String,
        location: ErrorLocation,
    },

    #[error("Malformed Response: {message} {location}")]
    MalformedResponse {
        message: String,
        location: ErrorLocation,
    },
}

impl From<ChannelError> for RpcError {
    #[track_caller]
    fn from(error: ChannelError) -> Self {
        RpcError::Transport {
            message: error.to_string(),
            location: ErrorLocation::capture(),
        }
    }
}

impl From<CodecError> for RpcError {
    #[track_caller]
    fn from(error: CodecError) -> Self {
        match error {
            // A request that never serialized never reached the wire, which
            // callers observe as the send not completing.
            CodecError::Encode { .. } => RpcError::Transport {
                message: error.to_string(),
                location: ErrorLocation::capture(),
            },
            CodecError::Malformed { .. } => RpcError::MalformedResponse {
                message: error.to_string(),
                location: ErrorLocation::capture(),
            },
        }
    }
}
