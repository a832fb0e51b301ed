//! Retrieval documents: flattened text plus provenance metadata

use crate::executor::SparqlExecutor;
use crate::mapper::{map_properties, EntityInfo, PropertyValue, Relation};
use crate::query::{self, PROPERTY_LIMIT};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::sync::Arc;
use tracing::{debug, warn};

/// Value of the `source` metadata key on every document
pub const SOURCE: &str = "SPARQL Knowledge Base";

/// Metadata key holding the resource IRI
pub const META_ENTITY_URI: &str = "entityUri";
/// Metadata key holding the display label
pub const META_LABEL: &str = "label";
/// Metadata key identifying the knowledge base
pub const META_SOURCE: &str = "source";

/// Text body plus provenance, produced per retrieval call and never stored
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalDocument {
    pub content: String,
    /// Always carries `entityUri`, `label` and `source`
    pub metadata: BTreeMap<String, String>,
}

impl RetrievalDocument {
    fn new(content: String, entity_uri: &str, label: &str) -> Self {
        let mut metadata = BTreeMap::new();
        metadata.insert(META_ENTITY_URI.to_string(), entity_uri.to_string());
        metadata.insert(META_LABEL.to_string(), label.to_string());
        metadata.insert(META_SOURCE.to_string(), SOURCE.to_string());
        Self { content, metadata }
    }

    /// Metadata value by key
    #[must_use]
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }
}

/// Render an entity.
///
/// ```text
/// Entity: <label>
/// Description: <description>      (only when non-empty)
/// Properties:                      (only when `properties` is Some)
/// - <propertyLocalName>: <value>
/// ```
#[must_use]
pub fn render_entity(entity: &EntityInfo, properties: Option<&[PropertyValue]>) -> String {
    let mut content = String::new();
    let _ = writeln!(content, "Entity: {}", entity.label);

    if !entity.description.trim().is_empty() {
        let _ = writeln!(content, "Description: {}", entity.description);
    }

    if let Some(properties) = properties {
        content.push_str("Properties:\n");
        for property in properties {
            let name = property.name();
            if name.is_empty() || property.value.is_empty() {
                continue;
            }
            let _ = writeln!(content, "- {name}: {}", property.value);
        }
    }

    content
}

/// Render a relation as `<subject> -> <predicate> -> <object>`
#[must_use]
pub fn render_relation(relation: &Relation) -> String {
    format!("{} -> {} -> {}", relation.subject, relation.predicate, relation.object)
}

/// Document for an entity with already-fetched properties
#[must_use]
pub fn entity_document(entity: &EntityInfo, properties: Option<&[PropertyValue]>) -> RetrievalDocument {
    let mut doc = RetrievalDocument::new(render_entity(entity, properties), &entity.uri, &entity.label);
    if !entity.types.is_empty() {
        doc.metadata.insert("types".to_string(), entity.types.join(", "));
    }
    doc
}

/// Document for a relation; provenance points at the related resource
#[must_use]
pub fn relation_document(relation: &Relation) -> RetrievalDocument {
    let mut doc = RetrievalDocument::new(render_relation(relation), &relation.object_uri, &relation.object);
    doc.metadata.insert("subject".to_string(), relation.subject.clone());
    doc.metadata.insert("predicate".to_string(), relation.predicate.clone());
    doc
}

/// Turns records into documents, enriching entities with their properties
#[derive(Clone)]
pub struct DocumentAssembler {
    executor: Arc<dyn SparqlExecutor>,
}

impl DocumentAssembler {
    pub fn new(executor: Arc<dyn SparqlExecutor>) -> Self {
        Self { executor }
    }

    /// Assemble an entity document.
    ///
    /// Entities with a URI get a `Properties:` section from a secondary
    /// property query. Enrichment is best-effort: a failed property query
    /// leaves the section empty.
    pub async fn assemble_entity(&self, entity: &EntityInfo) -> RetrievalDocument {
        let properties = if entity.uri.is_empty() {
            None
        } else {
            self.fetch_properties(&entity.uri).await
        };
        entity_document(entity, properties.as_deref())
    }

    /// Assemble a relation document; no remote call is made
    #[must_use]
    pub fn assemble_relation(&self, relation: &Relation) -> RetrievalDocument {
        relation_document(relation)
    }

    /// `None` when the URI cannot be addressed in a query
    async fn fetch_properties(&self, uri: &str) -> Option<Vec<PropertyValue>> {
        let sparql = match query::entity_properties(uri, i64::from(PROPERTY_LIMIT)) {
            Ok(sparql) => sparql,
            Err(e) => {
                debug!("Not enriching {uri}: {e}");
                return None;
            }
        };

        match self.executor.execute(&sparql).await {
            Ok(rows) => Some(map_properties(rows)),
            Err(e) => {
                warn!("Property query for {uri} failed: {e}");
                Some(Vec::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn california(description: &str) -> EntityInfo {
        EntityInfo {
            uri: "http://dbpedia.org/resource/California".to_string(),
            label: "California".to_string(),
            description: description.to_string(),
            types: Vec::new(),
        }
    }

    fn prop(property: &str, value: &str) -> PropertyValue {
        PropertyValue {
            property: property.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_render_entity_full_layout() {
        let properties = [
            prop("http://dbpedia.org/ontology/capital", "Sacramento"),
            prop("http://xmlns.com/foaf/0.1/nick", "The Golden State"),
        ];
        let content = render_entity(&california("A state..."), Some(&properties));

        assert_eq!(
            content,
            "Entity: California\n\
             Description: A state...\n\
             Properties:\n\
             - capital: Sacramento\n\
             - nick: The Golden State\n"
        );
    }

    #[test]
    fn test_empty_description_omits_line() {
        let content = render_entity(&california(""), None);
        assert_eq!(content, "Entity: California\n");
        assert!(!content.contains("Description:"));
    }

    #[test]
    fn test_properties_with_empty_side_are_skipped() {
        let properties = [
            prop("http://dbpedia.org/ontology/", "dangling"),
            prop("http://dbpedia.org/ontology/motto", ""),
            prop("http://dbpedia.org/ontology/capital", "Sacramento"),
        ];
        let content = render_entity(&california(""), Some(&properties));
        assert_eq!(content, "Entity: California\nProperties:\n- capital: Sacramento\n");
    }

    #[test]
    fn test_entity_metadata() {
        let mut entity = california("");
        entity.types = vec!["http://dbpedia.org/ontology/Place".to_string()];
        let doc = entity_document(&entity, None);

        assert_eq!(doc.meta(META_ENTITY_URI), Some("http://dbpedia.org/resource/California"));
        assert_eq!(doc.meta(META_LABEL), Some("California"));
        assert_eq!(doc.meta(META_SOURCE), Some(SOURCE));
        assert_eq!(doc.meta("types"), Some("http://dbpedia.org/ontology/Place"));
    }

    #[test]
    fn test_relation_document() {
        let relation = Relation {
            subject: "dbr:Albert_Einstein".to_string(),
            predicate: "birthPlace".to_string(),
            object: "Ulm".to_string(),
            object_uri: "http://dbpedia.org/resource/Ulm".to_string(),
        };
        let doc = relation_document(&relation);

        assert_eq!(doc.content, "dbr:Albert_Einstein -> birthPlace -> Ulm");
        assert_eq!(doc.meta(META_ENTITY_URI), Some("http://dbpedia.org/resource/Ulm"));
        assert_eq!(doc.meta(META_LABEL), Some("Ulm"));
        assert_eq!(doc.meta("predicate"), Some("birthPlace"));
        assert_eq!(doc.meta(META_SOURCE), Some(SOURCE));
    }
}
