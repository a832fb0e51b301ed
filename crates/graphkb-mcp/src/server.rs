//! rmcp service exposing the retrieval facade as tools

use graphkb_core::{KbError, KnowledgeRetriever, RetrievalDocument};
use rmcp::{
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo, Tool},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

fn default_limit() -> i64 {
    10
}

/// Arguments for `get_entity_info`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct GetEntityInfoArgs {
    /// Name (or part of the name) of the entity, e.g. "California"
    pub entity_name: String,
}

/// Arguments for `search_entities`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchEntitiesArgs {
    /// Text to look for in English entity labels
    pub query: String,
    /// Maximum number of entities (1-100)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Arguments for `find_related_entities`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FindRelatedArgs {
    /// Resource name in DBpedia format, e.g. "Albert_Einstein"
    pub entity_name: String,
    /// Maximum number of relations (1-100)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Arguments for `search_by_category`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SearchByCategoryArgs {
    /// Category name in DBpedia format, e.g. "Nobel_laureates_in_Physics"
    pub category: String,
    /// Maximum number of entities (1-100)
    #[serde(default = "default_limit")]
    pub limit: i64,
}

/// Arguments for `execute_sparql`
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteSparqlArgs {
    /// A complete SPARQL SELECT query
    pub query: String,
}

/// MCP server over a [`KnowledgeRetriever`]
#[derive(Clone)]
pub struct KnowledgeServer {
    retriever: KnowledgeRetriever,
    endpoint: String,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl KnowledgeServer {
    /// Create a server; `endpoint` is only used in the server instructions
    pub fn new(retriever: KnowledgeRetriever, endpoint: impl Into<String>) -> Self {
        Self {
            retriever,
            endpoint: endpoint.into(),
            tool_router: Self::tool_router(),
        }
    }

    /// Tool definitions as advertised to clients
    #[must_use]
    pub fn list_tools(&self) -> Vec<Tool> {
        self.tool_router.list_all()
    }

    /// Number of registered tools
    #[must_use]
    pub fn tool_count(&self) -> usize {
        self.tool_router.list_all().len()
    }

    #[tool(description = "Get information about a specific entity from DBpedia: description and properties of the best label match")]
    pub async fn get_entity_info(
        &self,
        Parameters(GetEntityInfoArgs { entity_name }): Parameters<GetEntityInfoArgs>,
    ) -> Result<CallToolResult, McpError> {
        let docs = self
            .retriever
            .describe_entity(&entity_name)
            .await
            .map_err(to_mcp_error)?;
        Ok(text_result(&docs, || format!("No information found for entity: {entity_name}")))
    }

    #[tool(description = "Search DBpedia for entities whose English label contains the query text")]
    pub async fn search_entities(
        &self,
        Parameters(SearchEntitiesArgs { query, limit }): Parameters<SearchEntitiesArgs>,
    ) -> Result<CallToolResult, McpError> {
        let docs = self
            .retriever
            .find_entity(&query, limit)
            .await
            .map_err(to_mcp_error)?;
        Ok(text_result(&docs, || format!("No entities found matching: {query}")))
    }

    #[tool(description = "Find entities related to a specific entity in DBpedia. Entity should be in DBpedia resource format (e.g. 'Albert_Einstein')")]
    pub async fn find_related_entities(
        &self,
        Parameters(FindRelatedArgs { entity_name, limit }): Parameters<FindRelatedArgs>,
    ) -> Result<CallToolResult, McpError> {
        let docs = self
            .retriever
            .related_entities(&entity_name, limit)
            .await
            .map_err(to_mcp_error)?;
        Ok(text_result(&docs, || format!("No related entities found for: {entity_name}")))
    }

    #[tool(description = "Search for entities by category in DBpedia. Category should be in DBpedia format (e.g. 'Nobel_laureates_in_Physics')")]
    pub async fn search_by_category(
        &self,
        Parameters(SearchByCategoryArgs { category, limit }): Parameters<SearchByCategoryArgs>,
    ) -> Result<CallToolResult, McpError> {
        let docs = self
            .retriever
            .search_by_category(&category, limit)
            .await
            .map_err(to_mcp_error)?;
        Ok(text_result(&docs, || format!("No entities found in category: {category}")))
    }

    #[tool(description = "Run a raw SPARQL SELECT query against the knowledge graph and return the rows as JSON. Endpoint failures are reported as errors")]
    pub async fn execute_sparql(
        &self,
        Parameters(ExecuteSparqlArgs { query }): Parameters<ExecuteSparqlArgs>,
    ) -> Result<CallToolResult, McpError> {
        let rows = self
            .retriever
            .execute_query(&query)
            .await
            .map_err(to_mcp_error)?;
        let json: Vec<serde_json::Value> = rows.iter().map(|row| row.to_json()).collect();
        let text = serde_json::to_string_pretty(&json)
            .map_err(|e| McpError::internal_error(format!("Failed to encode rows: {e}"), None))?;
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }
}

#[tool_handler]
impl ServerHandler for KnowledgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "graphkb-mcp".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: Some("Knowledge Graph MCP Server".to_string()),
                ..Implementation::from_build_env()
            },
            instructions: Some(format!(
                "Retrieves facts about real-world entities from the SPARQL knowledge graph at {}. \
                 Use search_entities or get_entity_info for free-text names, \
                 find_related_entities and search_by_category with DBpedia resource names \
                 (underscores instead of spaces).",
                self.endpoint
            )),
            ..Default::default()
        }
    }
}

/// Newline-joined document contents, or the `empty` sentinel
fn text_result(docs: &[RetrievalDocument], empty: impl FnOnce() -> String) -> CallToolResult {
    let text = if docs.is_empty() {
        empty()
    } else {
        docs.iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    };
    debug!("Tool returned {} documents", docs.len());
    CallToolResult::success(vec![Content::text(text)])
}

fn to_mcp_error(err: KbError) -> McpError {
    match err {
        KbError::InvalidParameter { .. } => McpError::invalid_params(err.to_string(), None),
        other => McpError::internal_error(other.to_string(), None),
    }
}
