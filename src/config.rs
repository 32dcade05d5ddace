use std::net::{Ipv4Addr, SocketAddr};

use crate::upstream::DEFAULT_API_BASE;

/// Default TCP port for the `tcp` transport.
const DEFAULT_TCP_PORT: u16 = 3000;

/// Channel the server speaks JSON-RPC over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    Stdio,
    Tcp { port: u16 },
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("MCP_TRANSPORT must be \"stdio\" or \"tcp\", got {0:?}")]
    InvalidTransport(String),
    #[error("MCP_TCP_PORT must be an integer between 0 and 65535, got {0:?}")]
    InvalidPort(String),
}

/// Server configuration loaded from environment variables.
///
/// The upstream base is fixed to the public API; only the transport is
/// selectable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub api_base: String,
    pub transport: Transport,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            transport: Transport::Stdio,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment.
    ///
    /// - `MCP_TRANSPORT` (optional, default `stdio`) — `stdio` or `tcp`
    /// - `MCP_TCP_PORT` (optional, default 3000) — listen port for `tcp`
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`ServerConfig::from_env`] with an injectable variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let port = match lookup("MCP_TCP_PORT") {
            Some(val) => val
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(val))?,
            None => DEFAULT_TCP_PORT,
        };

        let transport = match lookup("MCP_TRANSPORT").as_deref().map(str::trim) {
            None | Some("") | Some("stdio") => Transport::Stdio,
            Some("tcp") => Transport::Tcp { port },
            Some(other) => return Err(ConfigError::InvalidTransport(other.to_string())),
        };

        Ok(Self {
            api_base: DEFAULT_API_BASE.to_string(),
            transport,
        })
    }
}

impl Transport {
    /// Listen address for the TCP transport.
    pub fn listen_addr(port: u16) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))
    }
}
