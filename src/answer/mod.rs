//! Answer mapping: result sets back into a knowledge graph and bindings

mod mapper;
mod types;

pub use mapper::{map_results, MapError, MapResult};
pub use types::{
    Answer, AnswerRow, Attribute, Binding, EdgeRecord, KnowledgeGraph, NodeRecord, Response,
    UNSPECIFIED_ATTRIBUTE_TYPE,
};
