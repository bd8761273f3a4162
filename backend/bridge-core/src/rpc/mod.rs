//! Typed RPC client for the tunnel-control process.
//!
//! One public operation per remote method, each a thin statically-typed
//! wrapper fixing the wire name, the argument keys, and the expected result
//! shape. Everything funnels through [`TunnelClient::invoke`]: look up the
//! channel handle, encode, send, decode. Business meaning enters the bridge
//! here and nowhere else — the transport and codec are method-agnostic.
//!
//! Error contract (see [`RpcError`]): `NotConnected` when no channel handle
//! is installed (no bytes are issued), `Transport` when the send/receive
//! round trip does not complete, `MalformedResponse` when the reply does
//! not decode as the method's declared shape. Nothing is retried and no
//! default value is ever substituted for a failed call.

pub mod methods;

pub use methods::Method;

use crate::codec::{self, ArgMap, TypedResult};
use crate::error::rpc::RpcError;
use crate::state::BridgeState;

use common::ErrorLocation;

use serde_json::{Value, json};

/// Client half of the bridge. Cheap to clone; all clones observe the same
/// channel handle through [`BridgeState`].
#[derive(Debug, Clone)]
pub struct TunnelClient {
    state: BridgeState,
}

impl TunnelClient {
    #[must_use]
    pub fn new(state: BridgeState) -> Self {
        Self { state }
    }

    /// The shared send-and-decode primitive.
    ///
    /// Suspends the calling task until the control process replies; only one
    /// logical request is in flight per call. Concurrent callers are fine,
    /// but reply ordering across independent calls is whatever the channel
    /// delivers.
    async fn invoke(&self, method: Method, args: ArgMap) -> Result<TypedResult, RpcError> {
        let Some(channel) = self.state.channel().await else {
            return Err(RpcError::NotConnected {
                message: format!("no control channel for {}", method.wire_name()),
                location: ErrorLocation::capture(),
            });
        };

        let request = codec::encode_request(method.wire_name(), &args)?;
        let reply = channel.send(request).await?;
        Ok(codec::decode_response(reply.as_deref(), method.result_shape())?)
    }

    /// Liveness probe. `true` means the control process answered and claims
    /// to be serving; see [`crate::gate::TransportGate`] for the full
    /// reachability check.
    pub async fn is_alive(&self) -> Result<bool, RpcError> {
        Ok(self.invoke(Method::IsAlive, ArgMap::new()).await?.into_bool()?)
    }

    /// Kick off an asynchronous delay test; the measurement comes back later
    /// as a [`crate::events::PushEvent::DelayUpdate`].
    pub async fn async_test_delay(
        &self,
        proxy_name: &str,
        url: &str,
        timeout: i64,
    ) -> Result<(), RpcError> {
        self.invoke(
            Method::AsyncTestDelay,
            args([
                ("proxyName", json!(proxy_name)),
                ("url", json!(url)),
                ("timeout", json!(timeout)),
            ]),
        )
        .await?;
        Ok(())
    }

    /// Select `proxy_name` inside the selector group `selector_name`.
    /// Returns the control process's status code (0 = ok).
    pub async fn change_proxy(
        &self,
        selector_name: &str,
        proxy_name: &str,
    ) -> Result<i64, RpcError> {
        Ok(self
            .invoke(
                Method::ChangeProxy,
                args([
                    ("selectorName", json!(selector_name)),
                    ("proxyName", json!(proxy_name)),
                ]),
            )
            .await?
            .into_int()?)
    }

    /// Initialize the core with its working directory. Must run before any
    /// configuration call after a fresh process start.
    pub async fn core_init(&self, home_dir: &str) -> Result<i64, RpcError> {
        Ok(self
            .invoke(Method::CoreInit, args([("homeDir", json!(home_dir))]))
            .await?
            .into_int()?)
    }

    pub async fn close_all_connections(&self) -> Result<(), RpcError> {
        self.invoke(Method::CloseAllConnections, ArgMap::new()).await?;
        Ok(())
    }

    /// `true` if the connection existed and was torn down.
    pub async fn close_connection(&self, connection_id: &str) -> Result<bool, RpcError> {
        Ok(self
            .invoke(
                Method::CloseConnection,
                args([("connectionId", json!(connection_id))]),
            )
            .await?
            .into_bool()?)
    }

    /// JSON document describing every tracked connection.
    pub async fn get_all_connections(&self) -> Result<String, RpcError> {
        Ok(self
            .invoke(Method::GetAllConnections, ArgMap::new())
            .await?
            .into_text()?)
    }

    /// The active configuration as a JSON document.
    pub async fn get_config(&self) -> Result<String, RpcError> {
        Ok(self.invoke(Method::GetConfig, ArgMap::new()).await?.into_text()?)
    }

    /// Every known configuration, active or not.
    pub async fn get_configs(&self) -> Result<String, RpcError> {
        Ok(self.invoke(Method::GetConfigs, ArgMap::new()).await?.into_text()?)
    }

    /// Provider list with per-provider proxy health.
    pub async fn get_providers(&self) -> Result<String, RpcError> {
        Ok(self
            .invoke(Method::GetProviders, ArgMap::new())
            .await?
            .into_text()?)
    }

    /// Proxy groups and their current selections.
    pub async fn get_proxies(&self) -> Result<String, RpcError> {
        Ok(self.invoke(Method::GetProxies, ArgMap::new()).await?.into_text()?)
    }

    /// Up/down byte counters since process start.
    pub async fn get_traffic(&self) -> Result<String, RpcError> {
        Ok(self.invoke(Method::GetTraffic, ArgMap::new()).await?.into_text()?)
    }

    pub async fn get_tun_mode(&self) -> Result<String, RpcError> {
        Ok(self.invoke(Method::GetTunMode, ArgMap::new()).await?.into_text()?)
    }

    /// Validate a configuration file without activating it. Returns the
    /// control process's status code (0 = valid).
    pub async fn is_config_valid(&self, config_path: &str) -> Result<i64, RpcError> {
        Ok(self
            .invoke(
                Method::IsConfigValid,
                args([("configPath", json!(config_path))]),
            )
            .await?
            .into_int()?)
    }

    pub async fn parse_options(&self) -> Result<bool, RpcError> {
        Ok(self
            .invoke(Method::ParseOptions, ArgMap::new())
            .await?
            .into_bool()?)
    }

    /// Activate the configuration at `config_path`. Returns the control
    /// process's status code (0 = ok).
    pub async fn set_config(&self, config_path: &str) -> Result<i64, RpcError> {
        Ok(self
            .invoke(Method::SetConfig, args([("configPath", json!(config_path))]))
            .await?
            .into_int()?)
    }

    pub async fn set_home_dir(&self, home: &str) -> Result<i64, RpcError> {
        Ok(self
            .invoke(Method::SetHomeDir, args([("home", json!(home))]))
            .await?
            .into_int()?)
    }

    pub async fn set_tun_mode(&self, mode: &str) -> Result<(), RpcError> {
        self.invoke(Method::SetTunMode, args([("s", json!(mode))])).await?;
        Ok(())
    }

    /// Start streaming core log lines as [`crate::events::PushEvent::Log`].
    pub async fn start_log(&self) -> Result<(), RpcError> {
        self.invoke(Method::StartLog, ArgMap::new()).await?;
        Ok(())
    }

    pub async fn stop_log(&self) -> Result<(), RpcError> {
        self.invoke(Method::StopLog, ArgMap::new()).await?;
        Ok(())
    }
}

/// Build the flat argument map for a request. Parameter names here must
/// match the control process's documented names exactly.
fn args<const N: usize>(pairs: [(&str, Value); N]) -> ArgMap {
    let mut map = ArgMap::new();
    for (key, value) in pairs {
        map.insert(key.to_string(), value);
    }
    map
}
