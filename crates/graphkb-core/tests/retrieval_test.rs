//! Retrieval facade behavior against scripted executors and a stub endpoint

use async_trait::async_trait;
use graphkb_config::EndpointConfig;
use graphkb_core::document::{META_ENTITY_URI, META_LABEL, META_SOURCE};
use graphkb_core::{
    HttpSparqlExecutor, KbError, KnowledgeRetriever, ResultRow, RowCursor, SparqlExecutor, SOURCE,
};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

/// Answers each query with the rows of the first script entry whose needle it contains
struct ScriptedExecutor {
    script: Vec<(&'static str, Vec<ResultRow>)>,
    queries: Mutex<Vec<String>>,
}

impl ScriptedExecutor {
    fn new(script: Vec<(&'static str, Vec<ResultRow>)>) -> Arc<Self> {
        Arc::new(Self {
            script,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SparqlExecutor for ScriptedExecutor {
    async fn execute(&self, query: &str) -> graphkb_core::Result<RowCursor> {
        self.queries.lock().unwrap().push(query.to_string());
        let rows = self
            .script
            .iter()
            .find(|(needle, _)| query.contains(needle))
            .map(|(_, rows)| rows.clone())
            .unwrap_or_default();
        Ok(RowCursor::from_rows(rows))
    }
}

/// Fails every query with the given error kind
struct FailingExecutor(fn() -> KbError);

#[async_trait]
impl SparqlExecutor for FailingExecutor {
    async fn execute(&self, _query: &str) -> graphkb_core::Result<RowCursor> {
        Err((self.0)())
    }
}

fn row(columns: &[(&str, Option<&str>)]) -> ResultRow {
    ResultRow::new(columns.iter().map(|(k, v)| (*k, (*v).map(str::to_string))))
}

fn california_row() -> ResultRow {
    row(&[
        ("uri", Some("http://dbpedia.org/resource/California")),
        ("label", Some("California")),
        ("abstract", Some("A state...")),
        ("types", Some("")),
    ])
}

#[tokio::test]
async fn test_find_entity_renders_description_and_properties() {
    let executor = ScriptedExecutor::new(vec![
        (
            "?property ?value",
            vec![row(&[
                ("property", Some("http://dbpedia.org/ontology/capital")),
                ("value", Some("http://dbpedia.org/resource/Sacramento,_California")),
            ])],
        ),
        ("GROUP BY ?uri ?label", vec![california_row()]),
    ]);
    let retriever = KnowledgeRetriever::new(executor.clone());

    let docs = retriever.find_entity("California", 5).await.unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(
        docs[0].content,
        "Entity: California\n\
         Description: A state...\n\
         Properties:\n\
         - capital: http://dbpedia.org/resource/Sacramento,_California\n"
    );
    assert_eq!(docs[0].metadata[META_ENTITY_URI], "http://dbpedia.org/resource/California");
    assert_eq!(docs[0].metadata[META_SOURCE], SOURCE);

    let queries = executor.queries();
    assert_eq!(queries.len(), 2);
    assert!(queries[1].contains("<http://dbpedia.org/resource/California> ?property ?value"));
    assert!(queries[1].trim_end().ends_with("LIMIT 20"));
}

#[tokio::test]
async fn test_find_entity_respects_limit_and_labels() {
    let rows: Vec<ResultRow> = (0..8)
        .map(|i| {
            let uri = format!("http://dbpedia.org/resource/Entity_{i}");
            let label = if i == 3 { String::new() } else { format!("Entity {i}") };
            ResultRow::new([("uri", Some(uri)), ("label", Some(label))])
        })
        .collect();
    let retriever = KnowledgeRetriever::new(ScriptedExecutor::new(vec![("GROUP BY", rows)]));

    for limit in [1_i64, 3, 5, 100] {
        let docs = retriever.find_entity("Entity", limit).await.unwrap();
        assert!(docs.len() as i64 <= limit);
        assert!(docs.iter().all(|d| !d.metadata[META_LABEL].is_empty()));
    }
}

#[tokio::test]
async fn test_related_entities_empty_result_is_not_an_error() {
    let executor = ScriptedExecutor::new(vec![]);
    let retriever = KnowledgeRetriever::new(executor.clone());

    let docs = retriever.related_entities("Albert_Einstein", 2).await.unwrap();

    assert!(docs.is_empty());
    let queries = executor.queries();
    assert_eq!(queries.len(), 1);
    assert!(queries[0].trim_end().ends_with("LIMIT 2"));
}

#[tokio::test]
async fn test_related_entities_render_edges() {
    let executor = ScriptedExecutor::new(vec![(
        "?objectLabel",
        vec![
            row(&[
                ("predicate", Some("http://dbpedia.org/ontology/birthPlace")),
                ("object", Some("http://dbpedia.org/resource/Ulm")),
                ("objectLabel", Some("Ulm")),
            ]),
            row(&[
                ("predicate", Some("http://dbpedia.org/ontology/award")),
                ("object", Some("http://dbpedia.org/resource/Nobel_Prize_in_Physics")),
                ("objectLabel", None),
            ]),
        ],
    )]);
    let retriever = KnowledgeRetriever::new(executor);

    let docs = retriever.related_entities("Albert Einstein", 5).await.unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "dbr:Albert_Einstein -> birthPlace -> Ulm");
}

#[tokio::test]
async fn test_search_by_category_maps_entity_column() {
    let executor = ScriptedExecutor::new(vec![(
        "dct:subject",
        vec![row(&[
            ("entity", Some("http://dbpedia.org/resource/Marie_Curie")),
            ("label", Some("Marie Curie")),
            ("abstract", None),
        ])],
    )]);
    let retriever = KnowledgeRetriever::new(executor);

    let docs = retriever
        .search_by_category("Nobel_laureates_in_Physics", 3)
        .await
        .unwrap();

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].content, "Entity: Marie Curie\nProperties:\n");
}

#[tokio::test]
async fn test_invalid_parameters_rejected_before_any_call() {
    let executor = ScriptedExecutor::new(vec![]);
    let retriever = KnowledgeRetriever::new(executor.clone());

    assert!(matches!(
        retriever.find_entity("California", 0).await,
        Err(KbError::InvalidParameter { .. })
    ));
    assert!(matches!(
        retriever.related_entities("Einstein> ?p ?o", 5).await,
        Err(KbError::InvalidParameter { .. })
    ));
    assert!(matches!(
        retriever.search_by_category("Physics", -1).await,
        Err(KbError::InvalidParameter { .. })
    ));
    assert!(matches!(
        retriever.execute_query("   ").await,
        Err(KbError::InvalidParameter { .. })
    ));
    assert!(executor.queries().is_empty());
}

#[tokio::test]
async fn test_failures_degrade_on_convenience_paths_but_propagate_on_raw_path() {
    let unreachable = || KbError::EndpointUnreachable("connection refused".to_string());
    let retriever = KnowledgeRetriever::new(Arc::new(FailingExecutor(unreachable)));

    assert!(retriever.find_entity("California", 5).await.unwrap().is_empty());
    assert!(retriever.related_entities("Albert_Einstein", 5).await.unwrap().is_empty());
    assert!(retriever.search_by_category("Physics", 5).await.unwrap().is_empty());
    assert!(retriever
        .entity_properties("http://dbpedia.org/resource/California", 5)
        .await
        .unwrap()
        .is_empty());

    let err = retriever.execute_query("SELECT * { ?s ?p ?o }").await.unwrap_err();
    assert!(matches!(err, KbError::EndpointUnreachable(_)));
}

#[tokio::test]
async fn test_execute_query_returns_generic_rows() {
    let executor = ScriptedExecutor::new(vec![(
        "SELECT",
        vec![row(&[("s", Some("http://dbpedia.org/resource/Berlin")), ("o", None)])],
    )]);
    let retriever = KnowledgeRetriever::new(executor);

    let rows = retriever.execute_query("SELECT ?s ?o { ?s ?p ?o }").await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("s"), Some("http://dbpedia.org/resource/Berlin"));
    assert!(rows[0].has_column("o"));
}

// ===== Stub HTTP endpoint =====

fn query_param(request: &Request) -> String {
    request
        .url
        .query_pairs()
        .find(|(k, _)| k == "query")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default()
}

#[tokio::test]
async fn test_california_end_to_end_over_http() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(|request: &Request| query_param(request).contains("?property ?value"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{"head": {"vars": ["property", "value"]}, "results": {"bindings": []}}"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(|request: &Request| query_param(request).contains("GROUP BY ?uri ?label"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"{
                "head": {"vars": ["uri", "label", "abstract", "types"]},
                "results": {"bindings": [{
                    "uri": {"type": "uri", "value": "http://dbpedia.org/resource/California"},
                    "label": {"type": "literal", "xml:lang": "en", "value": "California"},
                    "abstract": {"type": "literal", "xml:lang": "en", "value": "A state..."},
                    "types": {"type": "literal", "value": ""}
                }]}
            }"#,
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = EndpointConfig::new(format!("{}/sparql", mock_server.uri()));
    let retriever = KnowledgeRetriever::from_config(&config).unwrap();

    let docs = retriever.find_entity("California", 1).await.unwrap();

    assert_eq!(docs.len(), 1);
    assert!(docs[0]
        .content
        .starts_with("Entity: California\nDescription: A state...\n"));
    assert_eq!(docs[0].metadata[META_LABEL], "California");
}

#[tokio::test]
async fn test_unresponsive_endpoint_times_out_on_both_paths() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(r#"{"head": {"vars": []}, "results": {"bindings": []}}"#)
                .set_delay(Duration::from_secs(60)),
        )
        .mount(&mock_server)
        .await;

    let config = EndpointConfig::new(format!("{}/sparql", mock_server.uri()));
    let executor = HttpSparqlExecutor::new(&config)
        .unwrap()
        .with_timeout(Duration::from_millis(1));
    let retriever = KnowledgeRetriever::new(Arc::new(executor));

    let started = Instant::now();
    let err = retriever.execute_query("SELECT * { ?s ?p ?o }").await.unwrap_err();
    assert!(matches!(err, KbError::Timeout { .. }));

    let docs = retriever.find_entity("California", 5).await.unwrap();
    assert!(docs.is_empty());

    assert!(started.elapsed() < Duration::from_secs(5));
}
