//! Errors raised while parsing or compiling a query graph

use thiserror::Error;

/// Errors that abort compilation before any query text is produced
#[derive(Debug, Error, PartialEq)]
pub enum CompileError {
    #[error("Unsupported property type for `{key}` on {pattern}: {found}")]
    UnsupportedPropertyType {
        pattern: String,
        key: String,
        found: &'static str,
    },

    #[error("Edge {edge} references unknown {role} node: {node}")]
    DanglingEdgeReference {
        edge: String,
        role: &'static str,
        node: String,
    },

    #[error("Field `{field}` on {pattern} must be a string or a list of strings")]
    MalformedIdentifierOrPredicateList { pattern: String, field: String },

    #[error("Edge id {0} is also a node id")]
    DuplicatePatternId(String),

    #[error("Malformed query graph: {0}")]
    MalformedQueryGraph(String),

    #[error("Query graph has no nodes or edges")]
    EmptyQueryGraph,
}

/// Result type for compilation
pub type CompileResult<T> = Result<T, CompileError>;

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "list",
        serde_json::Value::Object(_) => "object",
    }
}
