//! Remote graph endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public DBpedia SPARQL endpoint.
pub const DEFAULT_ENDPOINT_URL: &str = "https://dbpedia.org/sparql";

/// Named graph DBpedia serves its dataset under.
pub const DEFAULT_GRAPH: &str = "http://dbpedia.org";

/// Where queries are sent and how long a single round trip may take.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Absolute HTTP(S) URL of the SPARQL query service
    #[serde(default = "default_url")]
    pub url: String,
    /// Default graph IRI sent as `default-graph-uri`; empty means none
    #[serde(default = "default_graph")]
    pub default_graph: Option<String>,
    /// Execution timeout for one query, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// User-Agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_url() -> String {
    DEFAULT_ENDPOINT_URL.to_string()
}

#[allow(clippy::unnecessary_wraps)]
fn default_graph() -> Option<String> {
    Some(DEFAULT_GRAPH.to_string())
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("graphkb/{} (knowledge-graph retrieval)", env!("CARGO_PKG_VERSION"))
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            default_graph: default_graph(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl EndpointConfig {
    /// Create a config for `url` with default timeout and no default graph
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            default_graph: None,
            ..Default::default()
        }
    }

    /// Execution timeout as a `Duration`
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Default graph, treating an empty string as unset
    #[must_use]
    pub fn default_graph(&self) -> Option<&str> {
        self.default_graph
            .as_deref()
            .map(str::trim)
            .filter(|g| !g.is_empty())
    }
}
