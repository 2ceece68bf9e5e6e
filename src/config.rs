use std::net::{SocketAddr, ToSocketAddrs};
use std::path::Path;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::protocol::TransportConfig;

/// Resolved, validated connection settings for one controller.
///
/// Built once at the boundary from [`RawConfig`]; everything downstream
/// works with this struct and never re-probes key aliases.
#[derive(Debug, Clone)]
pub struct NanonisConfig {
    pub host: String,
    pub port: u16,
    /// Controller software version; selects the device-error layout for
    /// every response and is fixed for the life of the client.
    pub protocol_version: u32,
    pub transport: TransportConfig,
    /// Client-side bias ceiling in volts; `set_bias` beyond this is refused
    /// before any frame is sent.
    pub bias_limit_v: f32,
}

/// Configuration as it appears in files and the environment, before alias
/// resolution. Legacy config dialects spelled the host key four different
/// ways; all are accepted here and nowhere else.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RawConfig {
    pub host: Option<String>,
    pub tcp_ip: Option<String>,
    pub ip: Option<String>,
    pub ip_address: Option<String>,
    pub nanonis_ip: Option<String>,
    pub port: Option<u16>,
    pub protocol_version: Option<u32>,
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
    #[serde(default = "default_write_timeout_ms")]
    pub write_timeout_ms: u64,
    #[serde(default = "default_long_timeout_ms")]
    pub long_timeout_ms: u64,
    #[serde(default = "default_reconnect_grace_ms")]
    pub reconnect_grace_ms: u64,
    #[serde(default = "default_bias_limit_v")]
    pub bias_limit_v: f32,
}

fn default_connect_timeout_ms() -> u64 {
    2000
}

fn default_read_timeout_ms() -> u64 {
    5000
}

fn default_write_timeout_ms() -> u64 {
    5000
}

fn default_long_timeout_ms() -> u64 {
    60_000
}

fn default_reconnect_grace_ms() -> u64 {
    50
}

fn default_bias_limit_v() -> f32 {
    10.0
}

impl NanonisConfig {
    /// Load from an optional TOML file with `STM_RIG_*` environment
    /// overrides layered on top, then resolve and validate eagerly.
    /// Configuration problems surface here, at startup, not at first use.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }
        let settings = builder
            .add_source(Environment::with_prefix("STM_RIG"))
            .build()?;
        let raw: RawConfig = settings.try_deserialize()?;
        Self::resolve(raw)
    }

    /// Resolve key aliases and validate a raw configuration.
    pub fn resolve(raw: RawConfig) -> Result<Self, ConfigError> {
        // Host alias precedence: the modern key wins over legacy spellings.
        let host = raw
            .host
            .or(raw.tcp_ip)
            .or(raw.ip)
            .or(raw.ip_address)
            .or(raw.nanonis_ip)
            .ok_or(ConfigError::Missing("host"))?;
        if host.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "host",
                reason: "empty host name".to_string(),
            });
        }

        let port = raw.port.ok_or(ConfigError::Missing("port"))?;
        let protocol_version = raw
            .protocol_version
            .ok_or(ConfigError::Missing("protocol_version"))?;

        if !raw.bias_limit_v.is_finite() || raw.bias_limit_v <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "bias_limit_v",
                reason: format!("must be a positive voltage, got {}", raw.bias_limit_v),
            });
        }

        Ok(Self {
            host,
            port,
            protocol_version,
            transport: TransportConfig {
                connect_timeout: Duration::from_millis(raw.connect_timeout_ms),
                read_timeout: Duration::from_millis(raw.read_timeout_ms),
                write_timeout: Duration::from_millis(raw.write_timeout_ms),
                long_timeout: Duration::from_millis(raw.long_timeout_ms),
                reconnect_grace: Duration::from_millis(raw.reconnect_grace_ms),
            },
            bias_limit_v: raw.bias_limit_v,
        })
    }

    /// Resolve `host:port` to a socket address, failing fast on names that
    /// do not resolve.
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .map_err(|e| ConfigError::Invalid {
                field: "host",
                reason: format!("`{}:{}` does not resolve: {e}", self.host, self.port),
            })?
            .next()
            .ok_or(ConfigError::Invalid {
                field: "host",
                reason: format!("`{}:{}` resolved to no addresses", self.host, self.port),
            })
    }
}
