//! Answer structures: the deduplicated knowledge graph and per-row bindings

use crate::graph::QueryGraph;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Attribute type reported when the store carries no type information
pub const UNSPECIFIED_ATTRIBUTE_TYPE: &str = "NA";

/// One property of a matched node or edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "type")]
    pub attribute_type: String,
    pub name: String,
    pub value: Value,
}

impl Attribute {
    /// Attribute with an unspecified type
    pub fn untyped(name: impl Into<String>, value: Value) -> Self {
        Self {
            attribute_type: UNSPECIFIED_ATTRIBUTE_TYPE.to_string(),
            name: name.into(),
            value,
        }
    }
}

/// A matched node, as first seen in the result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,
    pub attributes: Vec<Attribute>,
}

/// A matched edge, as first seen in the result set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub subject: String,
    pub object: String,
    pub predicate: String,
    pub attributes: Vec<Attribute>,
}

/// Every distinct matched entity and relation, keyed by store id
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeGraph {
    pub nodes: BTreeMap<String, NodeRecord>,
    pub edges: BTreeMap<String, EdgeRecord>,
}

/// Reference to a knowledge-graph entry from an answer row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub id: String,
}

impl Binding {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// One matching subgraph: query-graph id -> store ids bound in that match
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnswerRow {
    pub node_bindings: BTreeMap<String, Vec<Binding>>,
    pub edge_bindings: BTreeMap<String, Vec<Binding>>,
}

impl AnswerRow {
    /// Store ids bound to a node pattern in this row
    pub fn node_ids(&self, qgid: &str) -> Vec<&str> {
        ids(&self.node_bindings, qgid)
    }

    /// Store ids bound to an edge pattern in this row
    pub fn edge_ids(&self, qgid: &str) -> Vec<&str> {
        ids(&self.edge_bindings, qgid)
    }
}

fn ids<'a>(bindings: &'a BTreeMap<String, Vec<Binding>>, qgid: &str) -> Vec<&'a str> {
    bindings
        .get(qgid)
        .map(|b| b.iter().map(|binding| binding.id.as_str()).collect())
        .unwrap_or_default()
}

/// Output of mapping one result set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Answer {
    pub knowledge_graph: KnowledgeGraph,
    pub results: Vec<AnswerRow>,
}

/// Full response to a question: the answer plus the query graph it answers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub query_graph: QueryGraph,
    pub knowledge_graph: KnowledgeGraph,
    pub results: Vec<AnswerRow>,
}

impl Response {
    pub fn new(query_graph: QueryGraph, answer: Answer) -> Self {
        Self {
            query_graph,
            knowledge_graph: answer.knowledge_graph,
            results: answer.results,
        }
    }
}
