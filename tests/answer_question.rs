//! End-to-end question answering over a replay gateway

mod common;

use common::{
    disease, gene, gene_to_disease_set, gene_treats_disease, one_hop_columns, one_hop_row,
    replaying, shared_gene_rows,
};
use qgraph::answer::Attribute;
use qgraph::{
    AnswerOptions, FixtureGateway, GatewayError, MapError, QueryGraph, QuestionAnswerer,
    QuestionError, ResultSet,
};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn answerer(gateway: &Arc<FixtureGateway>) -> QuestionAnswerer {
    QuestionAnswerer::new(gateway.clone(), AnswerOptions::new())
}

#[tokio::test]
async fn executes_exactly_the_compiled_query_once() {
    let gateway = Arc::new(replaying(shared_gene_rows()));
    let answerer = answerer(&gateway);
    let graph = QueryGraph::from_request(&gene_treats_disease()).unwrap();

    answerer.answer(&graph).await.unwrap();

    assert_eq!(gateway.executed(), vec![answerer.compile(&graph).unwrap()]);
}

#[tokio::test]
async fn shared_entities_are_deduplicated_but_bound_per_row() {
    let gateway = Arc::new(replaying(shared_gene_rows()));
    let response = answerer(&gateway)
        .answer_request(&gene_treats_disease())
        .await
        .unwrap();

    assert_eq!(response.knowledge_graph.nodes.len(), 3);
    assert_eq!(response.knowledge_graph.edges.len(), 2);
    assert_eq!(response.results.len(), 2);
    for row in &response.results {
        assert_eq!(row.node_ids("n0"), vec!["X:1"]);
    }

    let gene = &response.knowledge_graph.nodes["X:1"];
    assert_eq!(gene.name, "BRCA1");
    assert_eq!(gene.categories, vec!["Gene"]);
    assert_eq!(gene.attributes, vec![Attribute::untyped("taxon", json!("NCBITaxon:9606"))]);
}

#[tokio::test]
async fn response_echoes_the_query_graph() {
    let gateway = Arc::new(replaying(shared_gene_rows()));
    let graph = QueryGraph::from_request(&gene_treats_disease()).unwrap();
    let response = answerer(&gateway).answer(&graph).await.unwrap();

    assert_eq!(response.query_graph, graph);
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["query_graph"]["edges"]["e0"]["subject"], json!("n0"));
    assert_eq!(body["results"][1]["node_bindings"]["n1"], json!([{ "id": "D:2" }]));
    assert_eq!(body["knowledge_graph"]["edges"]["E:1"]["predicate"], json!("treats"));
}

#[tokio::test]
async fn set_node_binds_every_match_in_one_row() {
    let rows = one_hop_columns().with_row(vec![
        json!({ "id": "NCBIGene:672", "name": "BRCA1" }),
        json!([{ "id": "MONDO:1", "name": "a" }, { "id": "MONDO:2", "name": "b" }]),
        json!([{ "id": "E:1" }, { "id": "E:2" }]),
        json!(["biolink.Gene"]),
        json!([["biolink.Disease"], ["biolink.Disease"]]),
        json!([
            "biolink.gene_associated_with_condition",
            "biolink.gene_associated_with_condition"
        ]),
        json!([["NCBIGene:672", "MONDO:1"], ["NCBIGene:672", "MONDO:2"]]),
    ]);
    let gateway = Arc::new(replaying(rows));
    let response = answerer(&gateway)
        .answer_request(&gene_to_disease_set())
        .await
        .unwrap();

    assert_eq!(response.results.len(), 1);
    assert_eq!(response.results[0].node_ids("n1"), vec!["MONDO:1", "MONDO:2"]);
    assert_eq!(response.results[0].edge_ids("e0"), vec!["E:1", "E:2"]);

    let edge = &response.knowledge_graph.edges["E:2"];
    assert_eq!(edge.subject, "NCBIGene:672");
    assert_eq!(edge.object, "MONDO:2");
    assert_eq!(edge.predicate, "biolink:gene_associated_with_condition");
    assert_eq!(
        response.knowledge_graph.nodes["MONDO:1"].categories,
        vec!["biolink:Disease"]
    );
}

#[tokio::test]
async fn record_without_identity_fails_the_whole_answer() {
    let rows = shared_gene_rows().with_row(one_hop_row(
        gene("X:1", "BRCA1"),
        json!({ "name": "anonymous disease" }),
        "E:3",
        "treats",
    ));
    let gateway = Arc::new(replaying(rows));
    let err = answerer(&gateway)
        .answer_request(&gene_treats_disease())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        QuestionError::Map(MapError::MissingRecordIdentity { ref qgid, row: 2 }) if qgid == "n1"
    ));
}

#[tokio::test]
async fn missing_derived_column_is_a_shape_error() {
    let rows = ResultSet::new(["n0", "n1", "e0"]).with_row(vec![
        gene("X:1", "BRCA1"),
        disease("D:1", "breast cancer"),
        json!([]),
    ]);
    let gateway = Arc::new(replaying(rows));
    let err = answerer(&gateway)
        .answer_request(&gene_treats_disease())
        .await
        .unwrap_err();
    assert!(matches!(err, QuestionError::Map(MapError::InconsistentRowShape { .. })));
}

#[tokio::test]
async fn gateway_errors_pass_through_unchanged() {
    let gateway = Arc::new(FixtureGateway::new());
    let err = answerer(&gateway)
        .answer_request(&gene_treats_disease())
        .await
        .unwrap_err();
    assert!(matches!(err, QuestionError::Execution(GatewayError::Query(_))));
}

#[tokio::test]
async fn timeout_is_handed_to_the_gateway() {
    let gateway = Arc::new(replaying(shared_gene_rows()).with_latency(Duration::from_millis(500)));
    let options = AnswerOptions::new().with_timeout(Duration::from_millis(20));
    let answerer = QuestionAnswerer::new(gateway.clone(), options);

    let err = answerer
        .answer_request(&gene_treats_disease())
        .await
        .unwrap_err();
    assert!(matches!(err, QuestionError::Execution(GatewayError::Timeout(_))));
}

#[tokio::test]
async fn empty_result_set_is_an_empty_answer() {
    let gateway = Arc::new(replaying(one_hop_columns()));
    let response = answerer(&gateway)
        .answer_request(&gene_treats_disease())
        .await
        .unwrap();
    assert!(response.results.is_empty());
    assert!(response.knowledge_graph.nodes.is_empty());
}

#[tokio::test]
async fn independent_questions_run_concurrently() {
    let gateway = Arc::new(replaying(shared_gene_rows()));
    let answerer = answerer(&gateway);

    let first_request = gene_treats_disease();
    let second_request = gene_treats_disease();
    let (first, second) = tokio::join!(
        answerer.answer_request(&first_request),
        answerer.answer_request(&second_request)
    );
    assert_eq!(first.unwrap(), second.unwrap());
    assert_eq!(gateway.executed().len(), 2);
}

#[tokio::test]
async fn shut_down_answerer_reports_unavailable() {
    let gateway = Arc::new(replaying(shared_gene_rows()));
    let answerer = answerer(&gateway);
    answerer.shutdown().await.unwrap();

    let err = answerer
        .answer_request(&gene_treats_disease())
        .await
        .unwrap_err();
    assert!(matches!(err, QuestionError::Execution(GatewayError::Unavailable(_))));
}
