//! QueryGraph: the declarative request

use super::edge::EdgePattern;
use super::error::{json_type_name, CompileError, CompileResult};
use super::node::NodePattern;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Typed node and edge patterns, kept in declaration order
///
/// Serializes to (and parses from) the request shape
/// `{"nodes": {id: {...}}, "edges": {id: {...}}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct QueryGraph {
    nodes: Vec<NodePattern>,
    edges: Vec<EdgePattern>,
}

impl QueryGraph {
    /// Create an empty query graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node pattern, replacing any pattern with the same id
    pub fn with_node(mut self, node: NodePattern) -> Self {
        match self.nodes.iter_mut().find(|n| n.id == node.id) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
        self
    }

    /// Add an edge pattern, replacing any pattern with the same id
    pub fn with_edge(mut self, edge: EdgePattern) -> Self {
        match self.edges.iter_mut().find(|e| e.id == edge.id) {
            Some(existing) => *existing = edge,
            None => self.edges.push(edge),
        }
        self
    }

    pub fn nodes(&self) -> &[NodePattern] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgePattern] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&NodePattern> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgePattern> {
        self.edges.iter().find(|e| e.id == id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Node patterns referenced by no edge pattern
    pub fn orphaned_nodes(&self) -> Vec<&NodePattern> {
        let referenced: HashSet<&str> = self
            .edges
            .iter()
            .flat_map(|e| [e.subject.as_str(), e.object.as_str()])
            .collect();
        self.nodes
            .iter()
            .filter(|n| !referenced.contains(n.id.as_str()))
            .collect()
    }

    /// Check structural well-formedness before compilation
    pub fn validate(&self) -> CompileResult<()> {
        if self.is_empty() {
            return Err(CompileError::EmptyQueryGraph);
        }
        for edge in &self.edges {
            // Node and edge ids share one variable namespace in the query
            if self.node(&edge.id).is_some() {
                return Err(CompileError::DuplicatePatternId(edge.id.clone()));
            }
            for (role, node) in [("subject", &edge.subject), ("object", &edge.object)] {
                if self.node(node).is_none() {
                    return Err(CompileError::DanglingEdgeReference {
                        edge: edge.id.clone(),
                        role,
                        node: node.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Parse a query graph from a request body
    ///
    /// Accepts a bare `{nodes, edges}` object, or one wrapped in
    /// `query_graph` / `message.query_graph`.
    pub fn from_request(request: &Value) -> CompileResult<Self> {
        let graph = request
            .pointer("/message/query_graph")
            .or_else(|| request.get("query_graph"))
            .unwrap_or(request);
        Self::from_json(graph)
    }

    /// Parse a bare `{nodes, edges}` object
    pub fn from_json(value: &Value) -> CompileResult<Self> {
        let Value::Object(fields) = value else {
            return Err(CompileError::MalformedQueryGraph(format!(
                "query graph must be an object, found {}",
                json_type_name(value)
            )));
        };

        let mut graph = QueryGraph::new();
        for (id, node) in section(fields, "nodes")? {
            graph.nodes.push(NodePattern::from_json(id, node)?);
        }
        for (id, edge) in section(fields, "edges")? {
            graph.edges.push(EdgePattern::from_json(id, edge)?);
        }
        Ok(graph)
    }
}

fn section<'a>(
    fields: &'a Map<String, Value>,
    key: &str,
) -> CompileResult<Box<dyn Iterator<Item = (&'a String, &'a Value)> + 'a>> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(Box::new(std::iter::empty())),
        Some(Value::Object(entries)) => Ok(Box::new(entries.iter())),
        Some(other) => Err(CompileError::MalformedQueryGraph(format!(
            "`{}` must be an object keyed by query-graph id, found {}",
            key,
            json_type_name(other)
        ))),
    }
}

impl TryFrom<Value> for QueryGraph {
    type Error = CompileError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(&value)
    }
}

impl From<QueryGraph> for Value {
    fn from(graph: QueryGraph) -> Self {
        let nodes: Map<String, Value> = graph
            .nodes
            .iter()
            .map(|n| (n.id.clone(), n.to_json()))
            .collect();
        let edges: Map<String, Value> = graph
            .edges
            .iter()
            .map(|e| (e.id.clone(), e.to_json()))
            .collect();

        let mut fields = Map::new();
        fields.insert("nodes".into(), Value::Object(nodes));
        fields.insert("edges".into(), Value::Object(edges));
        Value::Object(fields)
    }
}
