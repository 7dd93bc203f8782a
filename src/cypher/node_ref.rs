//! Compiled node patterns

use super::label::to_store_label;
use super::literal::{property_map, property_value, quote_identifier, quote_string};
use crate::graph::{is_reserved_key, CompileResult, NodePattern};

/// Property holding a record's identity in the store
pub const ID_FIELD: &str = "id";

/// A node pattern compiled into its textual forms and filters
///
/// The first mention of a node in a query must carry its label and inline
/// properties (`declaration`); every later mention is the bare variable
/// (`reference`).
#[derive(Debug, Clone, PartialEq)]
pub struct NodeRef {
    name: String,
    label: Option<String>,
    properties: String,
    filters: String,
    bound: bool,
}

impl NodeRef {
    /// Compile a node pattern, naming its variable after the pattern id
    pub fn compile(node: &NodePattern) -> CompileResult<Self> {
        Self::build(node, node.id.clone())
    }

    /// Compile a node pattern without a variable name
    ///
    /// Filters need a variable to refer to, so an anonymous ref has none:
    /// only its declaration (first category, a single inline identifier and
    /// properties) constrains the match.
    pub fn compile_anonymous(node: &NodePattern) -> CompileResult<Self> {
        Self::build(node, String::new())
    }

    fn build(node: &NodePattern, name: String) -> CompileResult<Self> {
        let pattern = format!("node {}", node.id);
        let mut entries = Vec::new();
        let mut id_terms = Vec::new();

        match node.ids.as_slice() {
            [] => {}
            // A single curie goes inline where the store can use its index
            [curie] => entries.push((ID_FIELD.to_string(), quote_string(curie))),
            curies => {
                id_terms = curies
                    .iter()
                    .map(|curie| format!("{}.{} = {}", name, ID_FIELD, quote_string(curie)))
                    .collect();
            }
        }

        for (key, value) in &node.properties {
            if is_reserved_key(key) {
                continue;
            }
            entries.push((key.clone(), property_value(&pattern, key, value)?));
        }

        let label_terms: Vec<String> = node
            .categories
            .iter()
            .map(|c| format!("{} IN labels({})", quote_string(&to_store_label(c)), name))
            .collect();

        let groups: Vec<String> = [id_terms, label_terms]
            .into_iter()
            .filter(|terms| !terms.is_empty())
            .map(|terms| format!("({})", terms.join(" OR ")))
            .collect();

        let filters = if name.is_empty() {
            String::new()
        } else {
            groups.join(" AND ")
        };

        Ok(Self {
            name,
            label: node.categories.first().map(|c| to_store_label(c)),
            properties: property_map(&entries),
            filters,
            bound: node.is_bound(),
        })
    }

    /// Variable name (empty when anonymous)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_anonymous(&self) -> bool {
        self.name.is_empty()
    }

    /// Whether the pattern is anchored to known identifiers
    pub fn is_bound(&self) -> bool {
        self.bound
    }

    /// Filter text for a `WHERE` clause; empty when unconstrained
    pub fn filters(&self) -> &str {
        &self.filters
    }

    /// First-mention form: variable, label annotation and inline properties
    pub fn declaration(&self) -> String {
        let label = self
            .label
            .as_deref()
            .map(|l| format!(":{}", quote_identifier(l)))
            .unwrap_or_default();
        format!("{}{}{}", self.name, label, self.properties)
    }

    /// Subsequent-mention form: the bare variable
    pub fn reference(&self) -> String {
        self.name.clone()
    }
}
