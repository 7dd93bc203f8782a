//! Query-graph to Cypher compilation
//!
//! Node and edge patterns compile to reusable references, the fragment
//! assembler turns them into MATCH/WHERE clauses, and the projection stage
//! adds the WITH/RETURN columns the result mapper consumes.

mod edge_ref;
mod fragment;
mod label;
mod literal;
mod node_ref;
mod projection;

pub use edge_ref::EdgeRef;
pub use fragment::match_fragment;
pub use label::{to_public_label, to_store_label};
pub(crate) use literal::quote_string;
pub use node_ref::{NodeRef, ID_FIELD};
pub use projection::{projection, Pagination, ID_PAIRS_PREFIX, TYPE_PREFIX};

use crate::graph::{CompileResult, QueryGraph};

/// Options for one compilation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompileOptions {
    /// Upper bound (exclusive) on in+out degree of each edge's far endpoint
    pub max_connectivity: Option<u64>,
    pub pagination: Pagination,
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_connectivity(mut self, bound: u64) -> Self {
        self.max_connectivity = Some(bound);
        self
    }

    pub fn with_pagination(mut self, pagination: Pagination) -> Self {
        self.pagination = pagination;
        self
    }
}

/// Compile a query graph into complete query text
///
/// Fails before producing any text if the graph is empty, references an
/// unknown node, or carries an unsupported property value.
pub fn compile_query(graph: &QueryGraph, options: &CompileOptions) -> CompileResult<String> {
    let fragment = match_fragment(graph, options.max_connectivity)?;
    let projection = projection(graph, &options.pagination);
    Ok(format!("{}\n{}", fragment, projection))
}
