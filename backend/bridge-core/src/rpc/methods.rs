//! The closed set of remote methods the control process understands.
//!
//! Wire names and argument keys are a protocol contract shared with the
//! control process: adding a method is additive, renaming one or changing
//! its result shape is a breaking change. Nothing outside this table may
//! introduce a method name.

use crate::codec::ResultShape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    IsAlive,
    AsyncTestDelay,
    ChangeProxy,
    CoreInit,
    CloseAllConnections,
    CloseConnection,
    GetAllConnections,
    GetConfig,
    GetConfigs,
    GetProviders,
    GetProxies,
    GetTraffic,
    GetTunMode,
    IsConfigValid,
    ParseOptions,
    SetConfig,
    SetHomeDir,
    SetTunMode,
    StartLog,
    StopLog,
}

impl Method {
    /// Name as it appears in the request envelope.
    #[must_use]
    pub const fn wire_name(self) -> &'static str {
        match self {
            Method::IsAlive => "isAlive",
            Method::AsyncTestDelay => "asyncTestDelay",
            Method::ChangeProxy => "changeProxy",
            Method::CoreInit => "coreInit",
            Method::CloseAllConnections => "closeAllConnections",
            Method::CloseConnection => "closeConnection",
            Method::GetAllConnections => "getAllConnections",
            Method::GetConfig => "getConfig",
            Method::GetConfigs => "getConfigs",
            Method::GetProviders => "getProviders",
            Method::GetProxies => "getProxies",
            Method::GetTraffic => "getTraffic",
            Method::GetTunMode => "getTunMode",
            Method::IsConfigValid => "isConfigValid",
            Method::ParseOptions => "parseOptions",
            Method::SetConfig => "setConfig",
            Method::SetHomeDir => "setHomeDir",
            Method::SetTunMode => "setTunMode",
            Method::StartLog => "startLog",
            Method::StopLog => "stopLog",
        }
    }

    /// How this method's reply payload must be decoded.
    #[must_use]
    pub const fn result_shape(self) -> ResultShape {
        match self {
            Method::IsAlive | Method::CloseConnection | Method::ParseOptions => ResultShape::Bool,

            Method::ChangeProxy
            | Method::CoreInit
            | Method::IsConfigValid
            | Method::SetConfig
            | Method::SetHomeDir => ResultShape::Int,

            Method::GetAllConnections
            | Method::GetConfig
            | Method::GetConfigs
            | Method::GetProviders
            | Method::GetProxies
            | Method::GetTraffic
            | Method::GetTunMode => ResultShape::Text,

            Method::AsyncTestDelay
            | Method::CloseAllConnections
            | Method::SetTunMode
            | Method::StartLog
            | Method::StopLog => ResultShape::Void,
        }
    }
}
