//! # graphkb configuration
//!
//! Static configuration for the knowledge-graph retrieval core and the tool
//! server that exposes it. Values are read once at startup and handed to the
//! core as plain structs; nothing here is process-wide mutable state.
//!
//! ## Sources
//!
//! Later sources override earlier ones:
//!
//! 1. Built-in defaults (DBpedia public endpoint, 10 second timeout)
//! 2. TOML file (`--config <path>` or `<config_dir>/graphkb/config.toml`)
//! 3. Environment (`GRAPHKB_ENDPOINT_URL`, `GRAPHKB_DEFAULT_GRAPH`, `GRAPHKB_TIMEOUT_SECS`)
//!
//! ```toml
//! [endpoint]
//! url = "https://dbpedia.org/sparql"
//! default_graph = "http://dbpedia.org"
//! timeout_secs = 10
//!
//! [server]
//! transport = "stdio"
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod endpoint;
mod loader;
mod server;

pub use endpoint::{EndpointConfig, DEFAULT_ENDPOINT_URL, DEFAULT_GRAPH};
pub use loader::{ConfigError, KbConfig, ENV_DEFAULT_GRAPH, ENV_ENDPOINT_URL, ENV_TIMEOUT_SECS};
pub use server::{ServerConfig, TransportMode};
