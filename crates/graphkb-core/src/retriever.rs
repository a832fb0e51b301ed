//! Retrieval facade: the single entry point for callers
//!
//! Convenience operations (`find_entity`, `related_entities`,
//! `search_by_category`, `describe_entity`) are best-effort: endpoint failures
//! are logged and produce no documents. Only rejected input surfaces as an
//! error. The raw `execute_query` path propagates every failure so callers can
//! tell "no data" from "could not ask".

use crate::document::{DocumentAssembler, RetrievalDocument};
use crate::error::{KbError, Result};
use crate::executor::{HttpSparqlExecutor, SparqlExecutor};
use crate::mapper::{
    map_entities, map_properties, map_relations, prefixed_resource, EntityInfo, PropertyValue,
};
use crate::query;
use crate::row::{ResultRow, RowCursor};
use graphkb_config::EndpointConfig;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Orchestrates query building, execution, mapping and document assembly
#[derive(Clone)]
pub struct KnowledgeRetriever {
    executor: Arc<dyn SparqlExecutor>,
    assembler: DocumentAssembler,
}

impl KnowledgeRetriever {
    /// Create a retriever over any executor
    pub fn new(executor: Arc<dyn SparqlExecutor>) -> Self {
        Self {
            assembler: DocumentAssembler::new(Arc::clone(&executor)),
            executor,
        }
    }

    /// Create a retriever talking HTTP to the configured endpoint
    pub fn from_config(config: &EndpointConfig) -> Result<Self> {
        Ok(Self::new(Arc::new(HttpSparqlExecutor::new(config)?)))
    }

    /// Entities whose English label contains `term`, each enriched with its properties
    pub async fn find_entity(&self, term: &str, limit: i64) -> Result<Vec<RetrievalDocument>> {
        let sparql = query::entity_lookup(term, limit)?;
        let rows = self.best_effort("find_entity", &sparql).await;

        let mut documents = Vec::new();
        for entity in map_entities(rows, EntityInfo::from_lookup_row)
            .iter()
            .take(max_records(limit))
        {
            documents.push(self.assembler.assemble_entity(entity).await);
        }
        Ok(documents)
    }

    /// Best single match for `name`
    pub async fn describe_entity(&self, name: &str) -> Result<Vec<RetrievalDocument>> {
        self.find_entity(name, 1).await
    }

    /// Outgoing edges from the resource `dbr:<entity_id>`
    pub async fn related_entities(
        &self,
        entity_id: &str,
        limit: i64,
    ) -> Result<Vec<RetrievalDocument>> {
        let sparql = query::traversal(entity_id, limit)?;
        let subject = prefixed_resource(&query::resource_token("entity", entity_id)?);
        let rows = self.best_effort("related_entities", &sparql).await;

        Ok(map_relations(rows, &subject)
            .iter()
            .take(max_records(limit))
            .map(|relation| self.assembler.assemble_relation(relation))
            .collect())
    }

    /// Members of the category `dbc:<category>`, each enriched with its properties
    pub async fn search_by_category(
        &self,
        category: &str,
        limit: i64,
    ) -> Result<Vec<RetrievalDocument>> {
        let sparql = query::category_members(category, limit)?;
        let rows = self.best_effort("search_by_category", &sparql).await;

        let mut documents = Vec::new();
        for entity in map_entities(rows, EntityInfo::from_category_row)
            .iter()
            .take(max_records(limit))
        {
            documents.push(self.assembler.assemble_entity(entity).await);
        }
        Ok(documents)
    }

    /// Outgoing property/value pairs of an entity IRI
    pub async fn entity_properties(&self, uri: &str, limit: i64) -> Result<Vec<PropertyValue>> {
        let sparql = query::entity_properties(uri, limit)?;
        let rows = self.best_effort("entity_properties", &sparql).await;
        Ok(map_properties(rows))
    }

    /// Run a caller-supplied query, propagating endpoint failures
    pub async fn execute_query(&self, sparql: &str) -> Result<Vec<ResultRow>> {
        if sparql.trim().is_empty() {
            return Err(KbError::InvalidParameter {
                name: "query",
                reason: "must not be empty".to_string(),
            });
        }
        debug!("execute_query:\n{sparql}");

        let rows: Vec<ResultRow> = self.executor.execute(sparql).await?.collect();
        info!(operation = "execute_query", rows = rows.len(), "Query completed");
        Ok(rows)
    }

    async fn best_effort(&self, operation: &str, sparql: &str) -> RowCursor {
        debug!(operation, "Issuing query:\n{sparql}");
        match self.executor.execute(sparql).await {
            Ok(rows) => {
                info!(operation, rows = rows.remaining(), "Query completed");
                rows
            }
            Err(e) => {
                warn!(operation, "Query failed, returning no results: {e}");
                RowCursor::empty()
            }
        }
    }
}

fn max_records(limit: i64) -> usize {
    query::clamp_limit(limit).map_or(0, |l| l as usize)
}
