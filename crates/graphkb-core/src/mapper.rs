//! Mapping result rows into typed records
//!
//! Each record type has a validating constructor that returns `None` when a
//! required column is missing or blank. Mapping a sequence is a `filter_map`
//! over those constructors, so emitted records always have their required
//! fields populated and arrive in endpoint order.

use crate::query::{RESOURCE_NS, TYPE_SEPARATOR};
use crate::row::ResultRow;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A resource found by label lookup or category search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInfo {
    pub uri: String,
    pub label: String,
    /// English abstract, empty when the resource has none
    pub description: String,
    /// DBpedia ontology classes, in endpoint order
    pub types: Vec<String>,
}

impl EntityInfo {
    /// From a lookup row (`uri`, `label`, optional `abstract` and `types`)
    #[must_use]
    pub fn from_lookup_row(row: &ResultRow) -> Option<Self> {
        Self::from_columns(row, "uri").map(|mut entity| {
            entity.types = row.non_empty("types").map(split_types).unwrap_or_default();
            entity
        })
    }

    /// From a category row (`entity`, `label`, optional `abstract`); no types
    #[must_use]
    pub fn from_category_row(row: &ResultRow) -> Option<Self> {
        Self::from_columns(row, "entity")
    }

    fn from_columns(row: &ResultRow, uri_column: &str) -> Option<Self> {
        Some(Self {
            uri: row.non_empty(uri_column)?.to_string(),
            label: row.non_empty("label")?.to_string(),
            description: row.get("abstract").unwrap_or_default().to_string(),
            types: Vec::new(),
        })
    }
}

/// One outgoing edge discovered by traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// Prefixed subject, e.g. `dbr:Albert_Einstein`
    pub subject: String,
    /// Local name of the predicate, e.g. `birthPlace`
    pub predicate: String,
    /// English label of the object resource
    pub object: String,
    /// Full IRI of the object resource
    pub object_uri: String,
}

impl Relation {
    /// From a traversal row (`predicate`, `object`, `objectLabel`)
    #[must_use]
    pub fn from_traversal_row(subject: &str, row: &ResultRow) -> Option<Self> {
        Some(Self {
            subject: subject.to_string(),
            predicate: local_name(row.non_empty("predicate")?).to_string(),
            object: row.non_empty("objectLabel")?.to_string(),
            object_uri: row.non_empty("object")?.to_string(),
        })
    }
}

/// One `?property ?value` pair of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyValue {
    /// Full predicate IRI
    pub property: String,
    pub value: String,
}

impl PropertyValue {
    /// From a property row; both columns must be bound and non-empty
    #[must_use]
    pub fn from_row(row: &ResultRow) -> Option<Self> {
        Some(Self {
            property: row.get("property").filter(|p| !p.is_empty())?.to_string(),
            value: row.get("value").filter(|v| !v.is_empty())?.to_string(),
        })
    }

    /// Short display name of the property
    #[must_use]
    pub fn name(&self) -> &str {
        local_name(&self.property)
    }
}

/// Which query produced a batch of rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryShape {
    Lookup,
    Traversal,
    Category,
}

/// Records produced by [`map_rows`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Records {
    Entities(Vec<EntityInfo>),
    Relations(Vec<Relation>),
}

/// Map rows of the given shape; `subject` is only used for traversal rows
pub fn map_rows<I>(rows: I, shape: QueryShape, subject: &str) -> Records
where
    I: IntoIterator<Item = ResultRow>,
{
    match shape {
        QueryShape::Lookup => Records::Entities(map_entities(rows, EntityInfo::from_lookup_row)),
        QueryShape::Category => {
            Records::Entities(map_entities(rows, EntityInfo::from_category_row))
        }
        QueryShape::Traversal => Records::Relations(map_relations(rows, subject)),
    }
}

/// Map entity rows with `build`, skipping rows it rejects
pub fn map_entities<I, F>(rows: I, build: F) -> Vec<EntityInfo>
where
    I: IntoIterator<Item = ResultRow>,
    F: Fn(&ResultRow) -> Option<EntityInfo>,
{
    filter_map_logged(rows, build, "entity")
}

/// Map traversal rows from `subject`
pub fn map_relations<I>(rows: I, subject: &str) -> Vec<Relation>
where
    I: IntoIterator<Item = ResultRow>,
{
    filter_map_logged(rows, |row| Relation::from_traversal_row(subject, row), "relation")
}

/// Map property rows
pub fn map_properties<I>(rows: I) -> Vec<PropertyValue>
where
    I: IntoIterator<Item = ResultRow>,
{
    filter_map_logged(rows, PropertyValue::from_row, "property")
}

fn filter_map_logged<I, T, F>(rows: I, build: F, kind: &str) -> Vec<T>
where
    I: IntoIterator<Item = ResultRow>,
    F: Fn(&ResultRow) -> Option<T>,
{
    let mut skipped = 0usize;
    let records: Vec<T> = rows
        .into_iter()
        .filter_map(|row| {
            let record = build(&row);
            if record.is_none() {
                skipped += 1;
            }
            record
        })
        .collect();
    if skipped > 0 {
        debug!("Skipped {skipped} {kind} rows missing required columns");
    }
    records
}

/// Trailing segment of an IRI after its last `#` or `/`.
///
/// Strings containing neither are returned unchanged.
#[must_use]
pub fn local_name(iri: &str) -> &str {
    match iri.rfind(|c: char| c == '#' || c == '/') {
        Some(idx) => &iri[idx + 1..],
        None => iri,
    }
}

/// `dbr:`-prefixed display form of a resource local name or IRI
#[must_use]
pub fn prefixed_resource(name: &str) -> String {
    format!("dbr:{}", name.strip_prefix(RESOURCE_NS).unwrap_or(name))
}

fn split_types(types: &str) -> Vec<String> {
    types
        .split(TYPE_SEPARATOR)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
