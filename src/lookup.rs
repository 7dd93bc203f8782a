//! Direct node and one-hop lookups by identifier
//!
//! These bypass the query-graph compiler: a lookup is always one anchored
//! node, optionally with its immediate neighbours of one category.

use crate::cypher::NodeRef;
use crate::gateway::ResultSet;
use crate::graph::{json_type_name, CompileError, CompileResult, NodePattern};
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("Lookup result is missing column {0}")]
    MissingColumn(&'static str),

    #[error("Invalid lookup record {row}: {reason}")]
    InvalidRecord { row: usize, reason: String },

    #[error(transparent)]
    Compile(#[from] CompileError),
}

pub type LookupResult<T> = Result<T, LookupError>;

/// One matched edge with both endpoints, oriented source to target
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Triplet {
    pub source: Value,
    pub edge: Value,
    pub target: Value,
}

fn declaration(name: &str, category: &str, curie: Option<&str>) -> CompileResult<String> {
    let mut pattern = NodePattern::new(name).with_category(category);
    if let Some(curie) = curie {
        pattern = pattern.with_id(curie);
    }
    Ok(NodeRef::compile(&pattern)?.declaration())
}

/// Every node of `category` with identifier `curie`
pub fn node_query(category: &str, curie: &str) -> CompileResult<String> {
    Ok(format!("MATCH ({})\nRETURN c", declaration("c", category, Some(curie))?))
}

/// Outgoing then incoming one-hop queries from the node `curie` of
/// `source_category` to neighbours of `target_category`
///
/// Both return `c` (the anchor), `e` and `b` (the neighbour).
pub fn one_hop_queries(
    source_category: &str,
    target_category: &str,
    curie: &str,
) -> CompileResult<[String; 2]> {
    let anchor = declaration("c", source_category, Some(curie))?;
    let neighbour = declaration("b", target_category, None)?;
    Ok([
        format!("MATCH ({})-[e]->({})\nRETURN DISTINCT c, e, b", anchor, neighbour),
        format!("MATCH ({})<-[e]-({})\nRETURN DISTINCT c, e, b", anchor, neighbour),
    ])
}

/// Property bags of the `c` column
pub fn node_records(results: &ResultSet) -> LookupResult<Vec<Map<String, Value>>> {
    if results.column_index("c").is_none() {
        return Err(LookupError::MissingColumn("c"));
    }
    results
        .records()
        .into_iter()
        .enumerate()
        .map(|(row, mut record)| match record.remove("c") {
            Some(Value::Object(node)) => Ok(node),
            Some(other) => Err(LookupError::InvalidRecord {
                row,
                reason: format!("node must be an object, found {}", json_type_name(&other)),
            }),
            None => Err(LookupError::InvalidRecord {
                row,
                reason: "record has no node".to_string(),
            }),
        })
        .collect()
}

/// Triplets from the rows of a one-hop query
///
/// `outgoing` orients each triplet from the anchor `c` to the neighbour `b`;
/// otherwise from `b` to `c`.
pub fn triplets(results: &ResultSet, outgoing: bool) -> LookupResult<Vec<Triplet>> {
    for column in ["c", "e", "b"] {
        if results.column_index(column).is_none() {
            return Err(LookupError::MissingColumn(column));
        }
    }
    results
        .records()
        .into_iter()
        .enumerate()
        .map(|(row, mut record)| {
            let mut take = |column: &str| {
                record.remove(column).ok_or_else(|| LookupError::InvalidRecord {
                    row,
                    reason: format!("record has no {}", column),
                })
            };
            let (anchor, edge, neighbour) = (take("c")?, take("e")?, take("b")?);
            let (source, target) = if outgoing {
                (anchor, neighbour)
            } else {
                (neighbour, anchor)
            };
            Ok(Triplet {
                source,
                edge,
                target,
            })
        })
        .collect()
}
