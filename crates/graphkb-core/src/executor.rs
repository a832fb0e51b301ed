//! Query execution against a remote SPARQL endpoint

use crate::error::{KbError, Result};
use crate::row::RowCursor;
use async_trait::async_trait;
use graphkb_config::EndpointConfig;
use reqwest::header::ACCEPT;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, info};

/// Media type of SPARQL 1.1 JSON results
pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";

/// Longest slice of an error body kept in `EndpointError` messages
const MAX_ERROR_BODY: usize = 512;

/// Anything that can run a SPARQL SELECT and hand back its rows
///
/// Implementations hold no per-call state; concurrent calls are independent.
#[async_trait]
pub trait SparqlExecutor: Send + Sync {
    /// Run `query` and return a cursor over its solutions
    async fn execute(&self, query: &str) -> Result<RowCursor>;
}

/// SPARQL protocol client over HTTP
///
/// Each call performs one `GET` with the query in the `query` parameter and
/// reads the response body to the end before returning. Idle connections are
/// not pooled, so nothing outlives the call that opened it. The whole round
/// trip is bounded by the configured timeout; dropping the returned future
/// aborts the request.
#[derive(Clone)]
pub struct HttpSparqlExecutor {
    client: Client,
    endpoint: String,
    default_graph: Option<String>,
    timeout: Duration,
}

impl HttpSparqlExecutor {
    /// Create an executor for the configured endpoint
    pub fn new(config: &EndpointConfig) -> Result<Self> {
        let client = Client::builder()
            .pool_max_idle_per_host(0)
            .connect_timeout(config.timeout())
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| KbError::EndpointUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: config.url.clone(),
            default_graph: config.default_graph().map(str::to_string),
            timeout: config.timeout(),
        })
    }

    /// Override the execution timeout
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Endpoint URL queries are sent to
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }

    async fn round_trip(&self, query: &str) -> Result<RowCursor> {
        let timeout_ms = self.timeout_ms();

        let mut params = vec![("query", query)];
        if let Some(graph) = &self.default_graph {
            params.push(("default-graph-uri", graph.as_str()));
        }

        let response = self
            .client
            .get(&self.endpoint)
            .query(&params)
            .header(ACCEPT, SPARQL_RESULTS_JSON)
            .send()
            .await
            .map_err(|e| KbError::from_transport(&e, timeout_ms))?;

        let status = response.status();
        // Drain the body on every path so the connection is released here.
        let body = response
            .bytes()
            .await
            .map_err(|e| KbError::from_transport(&e, timeout_ms))?;

        if !status.is_success() {
            return Err(KbError::EndpointError {
                status: status.as_u16(),
                message: truncate(&String::from_utf8_lossy(&body)),
            });
        }

        RowCursor::from_json(&body).map_err(|e| KbError::EndpointError {
            status: status.as_u16(),
            message: format!("malformed results: {e}"),
        })
    }
}

#[async_trait]
impl SparqlExecutor for HttpSparqlExecutor {
    async fn execute(&self, query: &str) -> Result<RowCursor> {
        debug!(endpoint = %self.endpoint, "Executing SPARQL query:\n{query}");
        let started = Instant::now();

        let cursor = tokio::time::timeout(self.timeout, self.round_trip(query))
            .await
            .map_err(|_| KbError::Timeout {
                timeout_ms: self.timeout_ms(),
            })??;

        info!(
            rows = cursor.remaining(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Query returned {} results",
            cursor.remaining()
        );
        Ok(cursor)
    }
}

fn truncate(body: &str) -> String {
    let body = body.trim();
    match body.char_indices().nth(MAX_ERROR_BODY) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
