//! Projection: the WITH/RETURN stage the result mapper reads

use crate::graph::QueryGraph;
use serde::{Deserialize, Serialize};

/// Column prefix for the labels matched by a pattern
pub const TYPE_PREFIX: &str = "type__";

/// Column prefix for the `[subject, object]` store ids of each matched edge
pub const ID_PAIRS_PREFIX: &str = "id_pairs__";

/// Skip/limit applied to the answer rows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub skip: Option<u64>,
    pub limit: Option<u64>,
}

impl Pagination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Build the WITH/RETURN text for a query graph
///
/// Set nodes and every edge are collected into lists; the derived `type__`
/// and `id_pairs__` columns keep per-element labels and true endpoint ids
/// available after collection.
pub fn projection(graph: &QueryGraph, pagination: &Pagination) -> String {
    let mut carried = Vec::new();
    let mut returns = Vec::new();
    let mut types = Vec::new();
    let mut id_pairs = Vec::new();

    for node in graph.nodes() {
        let var = &node.id;
        returns.push(var.clone());
        if node.is_set {
            carried.push(format!("collect({0}) AS {0}", var));
            types.push(format!("[node in {0} | labels(node)] AS {1}{0}", var, TYPE_PREFIX));
        } else {
            carried.push(format!("{0} AS {0}", var));
            types.push(format!("labels({0}) AS {1}{0}", var, TYPE_PREFIX));
        }
    }

    for edge in graph.edges() {
        let var = &edge.id;
        returns.push(var.clone());
        carried.push(format!("collect({0}) AS {0}", var));
        types.push(format!("[edge in {0} | type(edge)] AS {1}{0}", var, TYPE_PREFIX));
        id_pairs.push(format!(
            "[edge in {0} | [startNode(edge).id, endNode(edge).id]] AS {1}{0}",
            var, ID_PAIRS_PREFIX
        ));
    }

    if carried.is_empty() {
        return String::new();
    }

    returns.extend(types);
    returns.extend(id_pairs);

    let mut text = format!("WITH {}\nRETURN {}", carried.join(", "), returns.join(", "));
    if let Some(skip) = pagination.skip {
        text.push_str(&format!(" SKIP {}", skip));
    }
    if let Some(limit) = pagination.limit {
        text.push_str(&format!(" LIMIT {}", limit));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{EdgePattern, NodePattern};

    fn graph() -> QueryGraph {
        QueryGraph::new()
            .with_node(NodePattern::new("n0").with_category("x").with_id("y"))
            .with_node(NodePattern::new("n1").with_category("y").as_set())
            .with_edge(EdgePattern::new("e0", "n0", "n1").with_predicates(["a", "b"]))
    }

    #[test]
    fn sets_and_edges_are_collected() {
        let text = projection(&graph(), &Pagination::new());
        let with_line = text.lines().next().unwrap();
        assert_eq!(with_line, "WITH n0 AS n0, collect(n1) AS n1, collect(e0) AS e0");
    }

    #[test]
    fn return_carries_derived_columns() {
        let text = projection(&graph(), &Pagination::new());
        let return_line = text.lines().nth(1).unwrap();
        let expected = [
            "n0",
            "n1",
            "e0",
            "labels(n0) AS type__n0",
            "[node in n1 | labels(node)] AS type__n1",
            "[edge in e0 | type(edge)] AS type__e0",
            "[edge in e0 | [startNode(edge).id, endNode(edge).id]] AS id_pairs__e0",
        ]
        .join(", ");
        assert_eq!(return_line, format!("RETURN {}", expected));
    }

    #[test]
    fn pagination_is_appended() {
        let text = projection(&graph(), &Pagination::new().skip(20).limit(10));
        assert!(text.ends_with(" SKIP 20 LIMIT 10"));

        let text = projection(&graph(), &Pagination::new().limit(5));
        assert!(text.ends_with("AS id_pairs__e0 LIMIT 5"));
    }

    #[test]
    fn empty_graph_projects_nothing() {
        assert_eq!(projection(&QueryGraph::new(), &Pagination::new()), "");
    }
}
