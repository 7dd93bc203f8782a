//! Match-fragment assembly: MATCH/WHERE clauses for a whole query graph

use super::edge_ref::EdgeRef;
use super::node_ref::NodeRef;
use crate::graph::{CompileError, CompileResult, EdgePattern, QueryGraph};
use std::collections::{HashMap, HashSet};

/// Variables already declared in the query being assembled
#[derive(Debug, Default)]
struct Declared {
    nodes: HashSet<String>,
    edges: HashSet<String>,
}

impl Declared {
    fn node(&mut self, node: &NodeRef) -> String {
        if node.is_anonymous() || self.nodes.insert(node.name().to_string()) {
            node.declaration()
        } else {
            node.reference()
        }
    }

    fn edge(&mut self, edge: &EdgeRef) -> String {
        if edge.name().is_empty() || self.edges.insert(edge.name().to_string()) {
            edge.declaration()
        } else {
            edge.reference()
        }
    }
}

/// Build the MATCH/WHERE text matching every pattern of the query graph
///
/// Orphaned nodes are matched alone first, then identifier-bound nodes (each
/// followed by a `WITH` carrying everything matched so far), then one clause
/// per edge in declaration order. `max_connectivity` caps the degree of the
/// endpoint each edge reaches second, unless that endpoint is bound to
/// identifiers.
pub fn match_fragment(graph: &QueryGraph, max_connectivity: Option<u64>) -> CompileResult<String> {
    graph.validate()?;

    let mut refs: HashMap<&str, NodeRef> = HashMap::new();
    for node in graph.nodes() {
        refs.insert(node.id.as_str(), NodeRef::compile(node)?);
    }

    let mut declared = Declared::default();
    let mut clauses = Vec::new();
    let mut matched: Vec<&str> = Vec::new();

    for node in graph.orphaned_nodes() {
        let node_ref = &refs[node.id.as_str()];
        clauses.push(format!("MATCH ({})", declared.node(node_ref)));
        if !node_ref.filters().is_empty() {
            clauses.push(format!("WHERE {}", node_ref.filters()));
        }
        matched.push(&node.id);
    }

    for node in graph.nodes() {
        if !node.is_bound() || matched.contains(&node.id.as_str()) {
            continue;
        }
        let node_ref = &refs[node.id.as_str()];
        clauses.push(format!("MATCH ({})", declared.node(node_ref)));
        if !node_ref.filters().is_empty() {
            clauses.push(format!("WHERE {}", node_ref.filters()));
        }
        matched.push(&node.id);
        clauses.push(format!("WITH {}", matched.join(", ")));
    }

    for edge in graph.edges() {
        let subject = endpoint(&refs, edge, "subject", &edge.subject)?;
        let object = endpoint(&refs, edge, "object", &edge.object)?;
        let edge_ref = EdgeRef::compile(edge, subject, object);

        let (first, second) = if edge_ref.is_reversed() {
            (object, subject)
        } else {
            (subject, object)
        };
        let first_text = declared.node(first);
        let edge_text = declared.edge(&edge_ref);
        let second_text = declared.node(second);
        clauses.push(format!("MATCH ({}){}({})", first_text, edge_text, second_text));

        let mut groups: Vec<String> = [subject.filters(), object.filters(), edge_ref.filters()]
            .into_iter()
            .filter(|f| !f.is_empty())
            .map(|f| format!("({})", f))
            .collect();
        // Identifier-bound endpoints are never capped
        if let Some(bound) = max_connectivity.filter(|_| !second.is_bound()) {
            groups.push(format!(
                "((indegree({0}) + outdegree({0})) < {1})",
                second.name(),
                bound
            ));
        }
        if !groups.is_empty() {
            clauses.push(format!("WHERE {}", groups.join(" AND ")));
        }
    }

    Ok(clauses.join("\n"))
}

fn endpoint<'a>(
    refs: &'a HashMap<&str, NodeRef>,
    edge: &EdgePattern,
    role: &'static str,
    node: &str,
) -> CompileResult<&'a NodeRef> {
    refs.get(node).ok_or_else(|| CompileError::DanglingEdgeReference {
        edge: edge.id.clone(),
        role,
        node: node.to_string(),
    })
}
