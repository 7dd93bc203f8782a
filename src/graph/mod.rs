//! Query graph model: the declarative request

mod edge;
mod error;
mod node;
mod query_graph;


pub use edge::EdgePattern;
pub use error::{CompileError, CompileResult};
pub use node::NodePattern;
pub use query_graph::QueryGraph;

pub(crate) use error::json_type_name;
pub(crate) use node::is_reserved_key;
