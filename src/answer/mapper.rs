//! Result mapping: tabular rows back into a deduplicated answer

use super::types::{Answer, AnswerRow, Attribute, Binding, EdgeRecord, NodeRecord};
use crate::cypher::{to_public_label, ID_FIELD, ID_PAIRS_PREFIX, TYPE_PREFIX};
use crate::gateway::ResultSet;
use crate::graph::{json_type_name, QueryGraph};
use serde_json::{Map, Value};
use std::collections::HashMap;
use thiserror::Error;

/// Node property holding the display name
const NAME_FIELD: &str = "name";

/// Edge properties that would collide with the edge record's own fields
const EDGE_RESERVED: [&str; 3] = ["subject", "object", "predicate"];

/// Errors that abort mapping; no partial answer is ever returned
#[derive(Debug, Error, PartialEq)]
pub enum MapError {
    #[error("Record matched by {qgid} in row {row} has no identity field")]
    MissingRecordIdentity { qgid: String, row: usize },

    #[error("Inconsistent shape in row {row}: {reason}")]
    InconsistentRowShape { row: usize, reason: String },
}

/// Result type for mapping
pub type MapResult<T> = Result<T, MapError>;

/// Map a result set produced by a compiled query graph
///
/// Every distinct store id lands in the knowledge graph once, with the
/// attributes of its first sighting. Each row becomes one answer row whose
/// bindings keep the row's order and multiplicity.
pub fn map_results(graph: &QueryGraph, results: &ResultSet) -> MapResult<Answer> {
    let columns: HashMap<&str, usize> = results
        .columns
        .iter()
        .enumerate()
        .map(|(i, c)| (c.as_str(), i))
        .collect();

    let mut answer = Answer::default();
    for (row_no, row) in results.rows.iter().enumerate() {
        let row = Row {
            number: row_no,
            cells: row,
            columns: &columns,
        };
        if row.cells.len() != results.columns.len() {
            return Err(row.shape(format!(
                "{} values for {} columns",
                row.cells.len(),
                results.columns.len()
            )));
        }
        let mapped = map_row(graph, &row, &mut answer)?;
        answer.results.push(mapped);
    }

    tracing::debug!(
        rows = answer.results.len(),
        nodes = answer.knowledge_graph.nodes.len(),
        edges = answer.knowledge_graph.edges.len(),
        "mapped result set"
    );
    Ok(answer)
}

fn map_row(graph: &QueryGraph, row: &Row<'_>, answer: &mut Answer) -> MapResult<AnswerRow> {
    let mut answer_row = AnswerRow::default();

    for node in graph.nodes() {
        let qgid = node.id.as_str();
        let (records, labels) = row.parallel(qgid, &format!("{}{}", TYPE_PREFIX, qgid))?;

        let mut bindings = Vec::with_capacity(records.len());
        for (record, labels) in records.into_iter().zip(labels) {
            let fields = row.record(qgid, record)?;
            let store_id = row.identity(qgid, fields)?;
            if !answer.knowledge_graph.nodes.contains_key(&store_id) {
                let categories = row.labels(qgid, labels)?;
                answer
                    .knowledge_graph
                    .nodes
                    .insert(store_id.clone(), node_record(fields, categories));
            }
            bindings.push(Binding::new(store_id));
        }
        answer_row.node_bindings.insert(qgid.to_string(), bindings);
    }

    for edge in graph.edges() {
        let qgid = edge.id.as_str();
        let (records, predicates) = row.parallel(qgid, &format!("{}{}", TYPE_PREFIX, qgid))?;
        let pairs = row.list(&format!("{}{}", ID_PAIRS_PREFIX, qgid))?;
        if pairs.len() != records.len() {
            return Err(row.shape(format!(
                "{} has {} endpoint pairs for {} edges",
                qgid,
                pairs.len(),
                records.len()
            )));
        }

        let mut bindings = Vec::with_capacity(records.len());
        for ((record, predicate), pair) in records.into_iter().zip(predicates).zip(pairs) {
            let fields = row.record(qgid, record)?;
            let store_id = row.identity(qgid, fields)?;
            if !answer.knowledge_graph.edges.contains_key(&store_id) {
                let (subject, object) = row.endpoints(qgid, pair)?;
                let predicate = match predicate {
                    Value::String(p) => to_public_label(p),
                    other => {
                        return Err(row.shape(format!(
                            "{} predicate must be a string, found {}",
                            qgid,
                            json_type_name(other)
                        )))
                    }
                };
                answer.knowledge_graph.edges.insert(
                    store_id.clone(),
                    EdgeRecord {
                        subject,
                        object,
                        predicate,
                        attributes: attributes(fields, &EDGE_RESERVED),
                    },
                );
            }
            bindings.push(Binding::new(store_id));
        }
        answer_row.edge_bindings.insert(qgid.to_string(), bindings);
    }

    Ok(answer_row)
}

fn node_record(fields: &Map<String, Value>, categories: Vec<String>) -> NodeRecord {
    let name = match fields.get(NAME_FIELD) {
        Some(Value::String(name)) => name.clone(),
        None | Some(Value::Null) => String::new(),
        Some(other) => other.to_string(),
    };
    NodeRecord {
        name,
        categories,
        attributes: attributes(fields, &[NAME_FIELD]),
    }
}

/// Every field except the identity and `reserved`, in record order
fn attributes(fields: &Map<String, Value>, reserved: &[&str]) -> Vec<Attribute> {
    fields
        .iter()
        .filter(|(key, _)| key.as_str() != ID_FIELD && !reserved.contains(&key.as_str()))
        .map(|(key, value)| Attribute::untyped(key.clone(), value.clone()))
        .collect()
}

/// Store ids are strings or integers
fn store_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) => Some(id.clone()),
        Value::Number(id) => Some(id.to_string()),
        _ => None,
    }
}

/// One result row with column lookup
struct Row<'a> {
    number: usize,
    cells: &'a [Value],
    columns: &'a HashMap<&'a str, usize>,
}

impl<'a> Row<'a> {
    fn shape(&self, reason: String) -> MapError {
        MapError::InconsistentRowShape {
            row: self.number,
            reason,
        }
    }

    fn cell(&self, column: &str) -> MapResult<&'a Value> {
        self.columns
            .get(column)
            .and_then(|&i| self.cells.get(i))
            .ok_or_else(|| self.shape(format!("missing column {}", column)))
    }

    fn list(&self, column: &str) -> MapResult<&'a [Value]> {
        match self.cell(column)? {
            Value::Array(items) => Ok(items),
            other => Err(self.shape(format!(
                "{} must be a list, found {}",
                column,
                json_type_name(other)
            ))),
        }
    }

    /// A pattern's matches and their parallel `type__` entries
    ///
    /// Scalar matches are wrapped so both sides are always lists.
    fn parallel(
        &self,
        qgid: &str,
        types_column: &str,
    ) -> MapResult<(Vec<&'a Value>, Vec<&'a Value>)> {
        let (records, types) = match self.cell(qgid)? {
            Value::Array(records) => (
                records.iter().collect::<Vec<_>>(),
                self.list(types_column)?.iter().collect(),
            ),
            record => (vec![record], vec![self.cell(types_column)?]),
        };
        if records.len() != types.len() {
            return Err(self.shape(format!(
                "{} has {} matches but {} has {} entries",
                qgid,
                records.len(),
                types_column,
                types.len()
            )));
        }
        Ok((records, types))
    }

    fn record(&self, qgid: &str, value: &'a Value) -> MapResult<&'a Map<String, Value>> {
        match value {
            Value::Object(fields) => Ok(fields),
            Value::Null => Err(MapError::MissingRecordIdentity {
                qgid: qgid.to_string(),
                row: self.number,
            }),
            other => Err(self.shape(format!(
                "{} must hold records, found {}",
                qgid,
                json_type_name(other)
            ))),
        }
    }

    fn identity(&self, qgid: &str, fields: &Map<String, Value>) -> MapResult<String> {
        match fields.get(ID_FIELD) {
            None | Some(Value::Null) => Err(MapError::MissingRecordIdentity {
                qgid: qgid.to_string(),
                row: self.number,
            }),
            Some(value) => store_id(value).ok_or_else(|| {
                self.shape(format!(
                    "{} identity must be a string or integer, found {}",
                    qgid,
                    json_type_name(value)
                ))
            }),
        }
    }

    /// Labels of one node match, in public form
    fn labels(&self, qgid: &str, value: &Value) -> MapResult<Vec<String>> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::String(label) => Ok(vec![to_public_label(label)]),
            Value::Array(labels) => labels
                .iter()
                .map(|l| {
                    l.as_str()
                        .map(to_public_label)
                        .ok_or_else(|| self.shape(format!("{} labels must be strings", qgid)))
                })
                .collect(),
            other => Err(self.shape(format!(
                "{} labels must be a list, found {}",
                qgid,
                json_type_name(other)
            ))),
        }
    }

    fn endpoints(&self, qgid: &str, pair: &Value) -> MapResult<(String, String)> {
        match pair.as_array().map(Vec::as_slice) {
            Some([subject, object]) => match (store_id(subject), store_id(object)) {
                (Some(subject), Some(object)) => Ok((subject, object)),
                _ => Err(self.shape(format!("{} endpoint ids must be strings or integers", qgid))),
            },
            _ => Err(self.shape(format!("{} endpoint pair must be [subject, object]", qgid))),
        }
    }
}
