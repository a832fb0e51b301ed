//! Tool server transport configuration

use serde::{Deserialize, Serialize};

/// How the tool server talks to its client
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Newline-delimited JSON-RPC over stdin/stdout
    #[default]
    Stdio,
    /// Streamable HTTP at `/mcp`
    Http,
}

/// Tool server settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Transport the server listens on
    #[serde(default)]
    pub transport: TransportMode,
    /// Bind address for HTTP mode
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Port for HTTP mode
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: TransportMode::default(),
            bind: default_bind(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// `bind:port` socket address string
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }
}
