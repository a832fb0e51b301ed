//! Tabular query results

use serde::Deserialize;
use std::collections::HashMap;

/// One solution from a SELECT query
///
/// Columns keep the order the endpoint declared them in. An unbound variable
/// is `None`, which is distinct from a bound empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultRow {
    columns: Vec<(String, Option<String>)>,
}

impl ResultRow {
    /// Build a row from `(column, value)` pairs
    pub fn new<I, K>(columns: I) -> Self
    where
        I: IntoIterator<Item = (K, Option<String>)>,
        K: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    /// Value of a bound column; `None` when absent or unbound
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .and_then(|(_, value)| value.as_deref())
    }

    /// Value of a bound, non-blank column
    #[must_use]
    pub fn non_empty(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.trim().is_empty())
    }

    /// Whether the row declares `column`, bound or not
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|(name, _)| name == column)
    }

    /// Iterate columns in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.columns
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_deref()))
    }

    /// Number of declared columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when the row declares no columns
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// JSON object with unbound columns as `null`
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .columns
            .iter()
            .map(|(name, value)| {
                let value = value
                    .as_ref()
                    .map_or(serde_json::Value::Null, |v| serde_json::Value::String(v.clone()));
                (name.clone(), value)
            })
            .collect();
        serde_json::Value::Object(map)
    }
}

/// Forward-only, produce-once sequence of rows from one query
///
/// The HTTP body behind a cursor has already been read to the end, so the
/// connection is released before the cursor is handed out. Rows are decoded
/// from the parsed bindings one at a time as the cursor advances. Dropping a
/// cursor part-way discards the remaining bindings.
#[derive(Debug)]
pub struct RowCursor {
    vars: Vec<String>,
    bindings: std::vec::IntoIter<HashMap<String, RdfTerm>>,
}

impl RowCursor {
    /// Cursor that yields nothing
    #[must_use]
    pub fn empty() -> Self {
        Self {
            vars: Vec::new(),
            bindings: Vec::new().into_iter(),
        }
    }

    /// Cursor over already-materialized rows, mainly for stub executors
    #[must_use]
    pub fn from_rows(rows: Vec<ResultRow>) -> Self {
        let vars = rows
            .first()
            .map(|r| r.iter().map(|(name, _)| name.to_string()).collect())
            .unwrap_or_default();
        let bindings = rows
            .into_iter()
            .map(|row| {
                row.columns
                    .into_iter()
                    .filter_map(|(name, value)| value.map(|v| (name, RdfTerm::literal(v))))
                    .collect()
            })
            .collect::<Vec<_>>();
        Self {
            vars,
            bindings: bindings.into_iter(),
        }
    }

    /// Decode a SPARQL 1.1 JSON results document.
    ///
    /// A document without `head`/`results` decodes to an empty cursor.
    pub fn from_json(body: &[u8]) -> Result<Self, serde_json::Error> {
        let doc: SparqlResults = serde_json::from_slice(body)?;
        Ok(Self {
            vars: doc.head.vars,
            bindings: doc.results.bindings.into_iter(),
        })
    }

    /// Column names declared by the query
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.vars
    }

    /// Rows not yet consumed
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.bindings.len()
    }
}

impl Iterator for RowCursor {
    type Item = ResultRow;

    fn next(&mut self) -> Option<ResultRow> {
        let mut binding = self.bindings.next()?;
        let columns = self
            .vars
            .iter()
            .map(|var| (var.clone(), binding.remove(var).map(|term| term.value)))
            .collect();
        Some(ResultRow { columns })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bindings.size_hint()
    }
}

impl ExactSizeIterator for RowCursor {}

#[derive(Debug, Default, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    head: Head,
    #[serde(default)]
    results: Bindings,
}

#[derive(Debug, Default, Deserialize)]
struct Head {
    #[serde(default)]
    vars: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Bindings {
    #[serde(default)]
    bindings: Vec<HashMap<String, RdfTerm>>,
}

/// One bound RDF term; only its lexical value is surfaced
#[derive(Debug, Clone, Deserialize)]
struct RdfTerm {
    #[serde(rename = "type", default)]
    #[allow(dead_code)]
    kind: String,
    value: String,
}

impl RdfTerm {
    fn literal(value: String) -> Self {
        Self {
            kind: "literal".to_string(),
            value,
        }
    }
}
