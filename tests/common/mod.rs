//! Shared fixtures for the qgraph integration tests
//!
//! Requests are written the way callers send them (JSON keyed by
//! query-graph id); result sets are shaped like the projection the compiled
//! query returns.

#![allow(dead_code)]

use qgraph::{FixtureGateway, ResultSet};
use serde_json::{json, Value};

/// Gene (bound to two curies) treats Disease
pub fn gene_treats_disease() -> Value {
    json!({
        "message": {
            "query_graph": {
                "nodes": {
                    "n0": { "categories": ["Gene"], "ids": ["X:1", "X:2"] },
                    "n1": { "categories": ["Disease"] }
                },
                "edges": {
                    "e0": { "subject": "n0", "object": "n1", "predicates": ["treats"] }
                }
            }
        }
    })
}

/// One biolink gene, linked to a set of diseases
pub fn gene_to_disease_set() -> Value {
    json!({
        "nodes": {
            "n0": { "category": "biolink:Gene", "id": "NCBIGene:672" },
            "n1": { "category": "biolink:Disease", "is_set": true }
        },
        "edges": {
            "e0": { "subject": "n0", "object": "n1", "predicate": "biolink:gene_associated_with_condition" }
        }
    })
}

/// Columns projected for an n0 -e0-> n1 query graph
pub fn one_hop_columns() -> ResultSet {
    ResultSet::new(["n0", "n1", "e0", "type__n0", "type__n1", "type__e0", "id_pairs__e0"])
}

pub fn gene(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name, "taxon": "NCBITaxon:9606" })
}

pub fn disease(id: &str, name: &str) -> Value {
    json!({ "id": id, "name": name })
}

/// One row of a scalar n0 -e0-> n1 match
pub fn one_hop_row(gene: Value, disease: Value, edge_id: &str, predicate: &str) -> Vec<Value> {
    let pair = json!([gene["id"].clone(), disease["id"].clone()]);
    vec![
        gene,
        disease,
        json!([{ "id": edge_id, "publications": ["PMID:1"] }]),
        json!(["Gene"]),
        json!(["Disease"]),
        json!([predicate]),
        json!([pair]),
    ]
}

/// Two rows sharing gene X:1
pub fn shared_gene_rows() -> ResultSet {
    one_hop_columns()
        .with_row(one_hop_row(gene("X:1", "BRCA1"), disease("D:1", "breast cancer"), "E:1", "treats"))
        .with_row(one_hop_row(gene("X:1", "BRCA1"), disease("D:2", "ovarian cancer"), "E:2", "treats"))
}

/// Gateway that replays `rows` for whatever query it receives
pub fn replaying(rows: ResultSet) -> FixtureGateway {
    FixtureGateway::new().with_fallback(rows)
}
