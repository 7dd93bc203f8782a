//! Compiled edge patterns

use super::label::to_store_label;
use super::literal::{quote_double, quote_identifier};
use super::node_ref::NodeRef;
use crate::graph::EdgePattern;

/// An edge pattern compiled into its textual forms and filters
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRef {
    name: String,
    /// Relationship types annotated on the declaration, as alternatives
    labels: Vec<String>,
    filters: String,
    directed: bool,
    reversed: bool,
}

impl EdgeRef {
    /// Compile an edge pattern between its compiled endpoints
    ///
    /// The match is anchored on the object when only the object is bound to
    /// identifiers; the pattern is then written object-first with the arrow
    /// flipped.
    pub fn compile(edge: &EdgePattern, subject: &NodeRef, object: &NodeRef) -> Self {
        Self::build(edge, edge.id.clone(), subject, object)
    }

    /// Compile an edge pattern without a variable name
    ///
    /// Several predicates are written as alternatives on the declaration
    /// (`[:A|B]`) since there is no variable for a filter to refer to.
    pub fn compile_anonymous(edge: &EdgePattern, subject: &NodeRef, object: &NodeRef) -> Self {
        Self::build(edge, String::new(), subject, object)
    }

    fn build(edge: &EdgePattern, name: String, subject: &NodeRef, object: &NodeRef) -> Self {
        let (labels, filters) = match edge.predicates.as_slice() {
            [] => (Vec::new(), String::new()),
            [predicate] => (vec![to_store_label(predicate)], String::new()),
            predicates if name.is_empty() => (
                predicates.iter().map(|p| to_store_label(p)).collect(),
                String::new(),
            ),
            predicates => {
                let terms: Vec<String> = predicates
                    .iter()
                    .map(|p| format!("type({}) = {}", name, quote_double(&to_store_label(p))))
                    .collect();
                (Vec::new(), terms.join(" OR "))
            }
        };

        Self {
            name,
            labels,
            filters,
            directed: edge.directed,
            reversed: object.is_bound() && !subject.is_bound(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the pattern is written object-first
    pub fn is_reversed(&self) -> bool {
        self.reversed
    }

    /// Filter text for a `WHERE` clause; empty when anonymous or at most one
    /// predicate
    pub fn filters(&self) -> &str {
        &self.filters
    }

    /// First-mention form, including the relationship type annotation
    pub fn declaration(&self) -> String {
        let innards = if self.labels.is_empty() {
            self.name.clone()
        } else {
            let labels: Vec<String> = self.labels.iter().map(|l| quote_identifier(l)).collect();
            format!("{}:{}", self.name, labels.join("|"))
        };
        self.arrow(&innards)
    }

    /// Subsequent-mention form: the bare variable between arrow tokens
    pub fn reference(&self) -> String {
        self.arrow(&self.name)
    }

    fn arrow(&self, innards: &str) -> String {
        match (self.directed, self.reversed) {
            (true, false) => format!("-[{}]->", innards),
            (true, true) => format!("<-[{}]-", innards),
            (false, _) => format!("-[{}]-", innards),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::NodePattern;

    fn endpoints(subject_bound: bool, object_bound: bool) -> (NodeRef, NodeRef) {
        let mut subject = NodePattern::new("n0");
        if subject_bound {
            subject = subject.with_id("X:1");
        }
        let mut object = NodePattern::new("n1");
        if object_bound {
            object = object.with_id("Y:1");
        }
        (
            NodeRef::compile(&subject).unwrap(),
            NodeRef::compile(&object).unwrap(),
        )
    }

    #[test]
    fn single_predicate_is_an_inline_annotation() {
        let (s, o) = endpoints(false, false);
        let edge = EdgePattern::new("e0", "n0", "n1").with_predicate("biolink:some_edge");
        let compiled = EdgeRef::compile(&edge, &s, &o);

        assert_eq!(compiled.declaration(), "-[e0:`biolink.some_edge`]->");
        assert_eq!(compiled.reference(), "-[e0]->");
        assert_eq!(compiled.filters(), "");
    }

    #[test]
    fn several_predicates_become_an_or_group() {
        let (s, o) = endpoints(false, false);
        let edge = EdgePattern::new("e0", "n0", "n1")
            .with_predicates(["biolink:some_edge", "biolink:other_type"]);
        let compiled = EdgeRef::compile(&edge, &s, &o);

        assert_eq!(compiled.declaration(), "-[e0]->");
        assert_eq!(compiled.reference(), "-[e0]->");
        assert_eq!(
            compiled.filters(),
            "type(e0) = \"biolink.some_edge\" OR type(e0) = \"biolink.other_type\""
        );
    }

    #[test]
    fn untyped_edge_is_undirected() {
        let (s, o) = endpoints(false, false);
        let compiled = EdgeRef::compile(&EdgePattern::new("e0", "n0", "n1"), &s, &o);
        assert_eq!(compiled.declaration(), "-[e0]-");
    }

    #[test]
    fn untyped_edge_may_be_forced_directed() {
        let (s, o) = endpoints(false, false);
        let edge = EdgePattern::new("e0", "n0", "n1").directed(true);
        assert_eq!(EdgeRef::compile(&edge, &s, &o).declaration(), "-[e0]->");
    }

    #[test]
    fn bound_object_with_unbound_subject_reverses() {
        let (s, o) = endpoints(false, true);
        let edge = EdgePattern::new("e0", "n0", "n1").with_predicate("treats");
        let compiled = EdgeRef::compile(&edge, &s, &o);
        assert!(compiled.is_reversed());
        assert_eq!(compiled.declaration(), "<-[e0:`treats`]-");
    }

    #[test]
    fn other_binding_combinations_keep_orientation() {
        let edge = EdgePattern::new("e0", "n0", "n1").with_predicate("treats");
        for (subject_bound, object_bound) in [(true, true), (false, false), (true, false)] {
            let (s, o) = endpoints(subject_bound, object_bound);
            assert!(!EdgeRef::compile(&edge, &s, &o).is_reversed());
        }
    }

    #[test]
    fn reversed_undirected_edge_has_no_arrow() {
        let (s, o) = endpoints(false, true);
        let compiled = EdgeRef::compile(&EdgePattern::new("e0", "n0", "n1"), &s, &o);
        assert!(compiled.is_reversed());
        assert_eq!(compiled.declaration(), "-[e0]-");
    }

    #[test]
    fn anonymous_edge_renders_without_a_name() {
        let (s, o) = endpoints(false, false);
        let edge = EdgePattern::new("e0", "n0", "n1").with_predicate("treats");
        let compiled = EdgeRef::compile_anonymous(&edge, &s, &o);
        assert_eq!(compiled.name(), "");
        assert_eq!(compiled.declaration(), "-[:`treats`]->");
    }

    #[test]
    fn anonymous_edge_writes_predicates_as_alternatives() {
        let (s, o) = endpoints(false, false);
        let edge = EdgePattern::new("e0", "n0", "n1").with_predicates(["treats", "biolink:causes"]);
        let compiled = EdgeRef::compile_anonymous(&edge, &s, &o);
        assert_eq!(compiled.filters(), "");
        assert_eq!(compiled.declaration(), "-[:`treats`|`biolink.causes`]->");
    }
}
