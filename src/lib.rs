//! qgraph: query-graph compiler and answer mapper
//!
//! Turns a declarative query graph (node and edge patterns with category,
//! identifier, and predicate constraints) into a single Cypher query, and
//! maps the tabular rows that query returns back into a deduplicated
//! knowledge graph plus one binding set per match.
//!
//! # Core Concepts
//!
//! - **Query graph**: node patterns and edge patterns, in declaration order
//! - **Compilation**: pure and deterministic; the same graph always yields
//!   byte-identical query text
//! - **Answer**: the knowledge graph (every distinct matched node and edge,
//!   keyed by store id) and results (one binding set per row)
//!
//! # Example
//!
//! ```
//! use qgraph::{compile_query, CompileOptions, EdgePattern, NodePattern, QueryGraph};
//!
//! let graph = QueryGraph::new()
//!     .with_node(NodePattern::new("n0").with_category("biolink:Gene").with_id("NCBIGene:672"))
//!     .with_node(NodePattern::new("n1").with_category("biolink:Disease"))
//!     .with_edge(EdgePattern::new("e0", "n0", "n1"));
//!
//! let query = compile_query(&graph, &CompileOptions::new()).unwrap();
//! assert!(query.starts_with("MATCH"));
//! ```

pub mod answer;
pub mod api;
pub mod config;
pub mod cypher;
pub mod gateway;
mod graph;
pub mod lookup;
pub mod ontology;
pub mod schema;

pub use answer::{map_results, Answer, AnswerRow, KnowledgeGraph, MapError, Response};
pub use api::{AnswerOptions, QuestionAnswerer, QuestionError};
pub use config::{Config, ConfigError};
pub use cypher::{compile_query, CompileOptions, Pagination};
pub use gateway::{ExecutionGateway, FixtureGateway, GatewayError, ResultSet};
pub use graph::{CompileError, CompileResult, EdgePattern, NodePattern, QueryGraph};
pub use lookup::{LookupError, Triplet};
pub use ontology::{most_specific, Ontology, OntologyError, StaticOntology};
pub use schema::{
    build_schema, question_templates, GraphSchema, GraphSummary, LabelSummary, SchemaError,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
