//! Client configuration: connection target/source addressing and session policy.

use crate::errors::ClientError;
use serde::{Deserialize, Serialize};
use tcads_core::ams::{AmsNetId, AmsPort};

/// Default AMS router TCP port.
pub const DEFAULT_TCP_PORT: u16 = 48898;
/// Default source AMS port used when the caller doesn't pin one.
pub const DEFAULT_SOURCE_AMS_PORT: AmsPort = 800;
/// Default delay between a dropped connection and the next reconnect attempt.
pub const DEFAULT_RECONNECT_INTERVAL_MS: u64 = 5000;

/// Identifies the PLC runtime to connect to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Hostname or IP address of the target.
    pub host: String,
    /// TCP port of the target's AMS router. Defaults to [`DEFAULT_TCP_PORT`].
    #[serde(default = "default_tcp_port")]
    pub port: u16,
    /// AMS NetID of the target. Defaults to `host.1.1` if the host is an IPv4 literal.
    pub net_id: Option<AmsNetId>,
    /// AMS port of the target runtime (e.g. 851 for PLC runtime 1). Required.
    pub ams_port: AmsPort,
}

fn default_tcp_port() -> u16 {
    DEFAULT_TCP_PORT
}

/// Identifies this client on the AMS network.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceConfig {
    /// AMS NetID to present as this client's source. Defaults to the local IP
    /// rendered as `A.B.C.D.1.1` once the TCP connection is established.
    pub net_id: Option<AmsNetId>,
    /// AMS port to present as this client's source. Defaults to [`DEFAULT_SOURCE_AMS_PORT`].
    pub ams_port: Option<AmsPort>,
}

/// Top-level client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    pub target: TargetConfig,
    #[serde(default)]
    pub source: SourceConfig,
    /// Whether to automatically reconnect after the transport closes. Default `true`.
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// Delay, in milliseconds, before each reconnect attempt. Default 5000.
    #[serde(default = "default_reconnect_interval_ms")]
    pub reconnect_interval_ms: u64,
    /// Preload the symbol table on connect. Default `true`.
    #[serde(default = "default_true")]
    pub load_symbols: bool,
    /// Preload the data-type table on connect. Default `true`.
    #[serde(default = "default_true")]
    pub load_data_types: bool,
}

fn default_true() -> bool {
    true
}

fn default_reconnect_interval_ms() -> u64 {
    DEFAULT_RECONNECT_INTERVAL_MS
}

impl ClientConfig {
    /// Creates a minimal configuration for `host`/`ams_port`, with every other
    /// option set to its documented default.
    pub fn new(host: impl Into<String>, ams_port: AmsPort) -> Self {
        Self {
            target: TargetConfig {
                host: host.into(),
                port: DEFAULT_TCP_PORT,
                net_id: None,
                ams_port,
            },
            source: SourceConfig::default(),
            reconnect: true,
            reconnect_interval_ms: DEFAULT_RECONNECT_INTERVAL_MS,
            load_symbols: true,
            load_data_types: true,
        }
    }

    /// Validates required fields, returning [`ClientError::ConfigInvalid`] on failure.
    pub fn validate(&self) -> Result<(), ClientError> {
        if self.target.host.trim().is_empty() {
            return Err(ClientError::ConfigInvalid("target.host is required".into()));
        }
        if self.target.ams_port == 0 {
            return Err(ClientError::ConfigInvalid(
                "target.ams_port is required".into(),
            ));
        }
        Ok(())
    }
}
