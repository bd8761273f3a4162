pub mod channel;
pub mod codec;
pub mod config;
pub mod logger;
pub mod rpc;
pub mod state;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Rpc(#[from] rpc::RpcError),

    #[error(transparent)]
    Channel(#[from] channel::ChannelError),

    #[error(transparent)]
    Codec(#[from] codec::CodecError),

    #[error(transparent)]
    Config(#[from] config::ConfigError),

    #[error(transparent)]
    State(#[from] state::StateError),

    #[error(transparent)]
    Logger(#[from] logger::LoggerError),
}
