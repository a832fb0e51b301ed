//! SPARQL query construction
//!
//! Every builder is a pure function of its arguments. Caller-supplied values
//! reach the query text through exactly two doors:
//!
//! - [`escape_literal`] for values inside a `"..."` string literal
//! - [`resource_token`] / [`absolute_iri`] for values inside an IRI, which are
//!   validated against a closed character set and rejected otherwise
//!
//! Nothing is interpolated anywhere else, so a crafted value cannot close a
//! filter or add clauses.

use crate::error::{KbError, Result};

/// DBpedia resource namespace
pub const RESOURCE_NS: &str = "http://dbpedia.org/resource/";
/// DBpedia ontology namespace; type lists are restricted to it
pub const ONTOLOGY_NS: &str = "http://dbpedia.org/ontology/";
/// DBpedia category namespace
pub const CATEGORY_NS: &str = "http://dbpedia.org/resource/Category:";

/// Largest number of rows any builder will request
pub const MAX_LIMIT: u32 = 100;
/// Property rows fetched per entity when enriching documents
pub const PROPERTY_LIMIT: u32 = 20;
/// Separator used by `GROUP_CONCAT` for the type list
pub const TYPE_SEPARATOR: &str = ", ";

const PREFIXES: &str = "\
PREFIX rdf: <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX dbo: <http://dbpedia.org/ontology/>
PREFIX dct: <http://purl.org/dc/terms/>
";

/// Validate a requested row limit, capping it at [`MAX_LIMIT`].
///
/// Zero and negative limits are rejected rather than defaulted.
pub fn clamp_limit(limit: i64) -> Result<u32> {
    if limit <= 0 {
        return Err(KbError::invalid("limit", format!("must be positive, got {limit}")));
    }
    Ok(u32::try_from(limit).map_or(MAX_LIMIT, |l| l.min(MAX_LIMIT)))
}

/// Escape a value for a double- or single-quoted SPARQL string literal
#[must_use]
pub fn escape_literal(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len() + 8);
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '"' => escaped.push_str("\\\""),
            '\'' => escaped.push_str("\\'"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Normalize and validate a resource local name such as `Albert_Einstein`.
///
/// Surrounding whitespace is trimmed and interior whitespace runs become `_`.
/// What remains must be non-empty and consist only of ASCII letters, digits,
/// `_` and `-`.
pub fn resource_token(name: &'static str, value: &str) -> Result<String> {
    let token = value.split_whitespace().collect::<Vec<_>>().join("_");
    if token.is_empty() {
        return Err(KbError::invalid(name, "must not be empty"));
    }
    if let Some(bad) = token
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(KbError::invalid(
            name,
            format!("character {bad:?} is not allowed in a resource name"),
        ));
    }
    Ok(token)
}

/// Validate an absolute HTTP(S) IRI for use inside `<...>`
pub fn absolute_iri(value: &str) -> Result<&str> {
    let value = value.trim();
    if let Some(bad) = value
        .chars()
        .find(|c| c.is_whitespace() || c.is_control() || "<>\"{}|^`\\".contains(*c))
    {
        return Err(KbError::invalid("uri", format!("character {bad:?} is not allowed in an IRI")));
    }
    let parsed = url::Url::parse(value).map_err(|e| KbError::invalid("uri", e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(KbError::invalid("uri", format!("unsupported scheme {}", parsed.scheme())));
    }
    Ok(value)
}

/// Entities whose English label contains `term`, case-insensitively.
///
/// One row per resource: `?uri ?label ?abstract ?types`, where `?types` is the
/// `", "`-joined list of DBpedia ontology classes.
pub fn entity_lookup(term: &str, limit: i64) -> Result<String> {
    let limit = clamp_limit(limit)?;
    let term = term.trim();
    if term.is_empty() {
        return Err(KbError::invalid("term", "must not be empty"));
    }
    let term = escape_literal(term);

    Ok(format!(
        r#"{PREFIXES}
SELECT ?uri ?label (SAMPLE(?abs) AS ?abstract) (GROUP_CONCAT(DISTINCT STR(?type); SEPARATOR="{TYPE_SEPARATOR}") AS ?types)
WHERE {{
  ?uri rdfs:label ?label .
  FILTER(LANG(?label) = "en")
  FILTER(CONTAINS(LCASE(STR(?label)), LCASE("{term}")))
  OPTIONAL {{ ?uri dbo:abstract ?abs . FILTER(LANG(?abs) = "en") }}
  OPTIONAL {{ ?uri rdf:type ?type . FILTER(STRSTARTS(STR(?type), "{ONTOLOGY_NS}")) }}
}}
GROUP BY ?uri ?label
LIMIT {limit}
"#
    ))
}

/// Outgoing edges from `dbr:<entity>` to labelled DBpedia resources.
///
/// Columns: `?predicate ?object ?objectLabel`.
pub fn traversal(entity: &str, limit: i64) -> Result<String> {
    let limit = clamp_limit(limit)?;
    let entity = resource_token("entity", entity)?;

    Ok(format!(
        r#"{PREFIXES}
SELECT ?predicate ?object ?objectLabel
WHERE {{
  <{RESOURCE_NS}{entity}> ?predicate ?object .
  FILTER(isIRI(?object))
  FILTER(STRSTARTS(STR(?object), "{RESOURCE_NS}"))
  ?object rdfs:label ?objectLabel .
  FILTER(LANG(?objectLabel) = "en")
}}
LIMIT {limit}
"#
    ))
}

/// Resources filed under `dbc:<category>` via `dct:subject`.
///
/// Columns: `?entity ?label ?abstract`.
pub fn category_members(category: &str, limit: i64) -> Result<String> {
    let limit = clamp_limit(limit)?;
    let category = resource_token("category", category)?;

    Ok(format!(
        r#"{PREFIXES}
SELECT DISTINCT ?entity ?label ?abstract
WHERE {{
  ?entity dct:subject <{CATEGORY_NS}{category}> .
  ?entity rdfs:label ?label .
  FILTER(LANG(?label) = "en")
  OPTIONAL {{ ?entity dbo:abstract ?abstract . FILTER(LANG(?abstract) = "en") }}
}}
LIMIT {limit}
"#
    ))
}

/// All outgoing `?property ?value` pairs of an entity IRI.
///
/// Language-tagged literals other than English are filtered out.
pub fn entity_properties(uri: &str, limit: i64) -> Result<String> {
    let limit = clamp_limit(limit)?;
    let uri = absolute_iri(uri)?;

    Ok(format!(
        r#"SELECT ?property ?value
WHERE {{
  <{uri}> ?property ?value .
  FILTER(!isLiteral(?value) || LANG(?value) = "" || LANGMATCHES(LANG(?value), "en"))
}}
LIMIT {limit}
"#
    ))
}
