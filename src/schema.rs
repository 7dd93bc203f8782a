//! Graph schema summary and question templates
//!
//! The schema is read from the store with [`SCHEMA_QUERY`] and summarised as
//! `subject label -> object label -> predicates`. Each (subject, object) pair
//! becomes a two-node template query graph.
//!
//! The graph summary counts nodes per distinct label set
//! ([`LABEL_COUNT_QUERY`]) and, for each set, outgoing edges by type and
//! target label set ([`edge_count_query`]).

use crate::cypher::{quote_string, to_public_label};
use crate::gateway::ResultSet;
use crate::graph::{json_type_name, EdgePattern, NodePattern, QueryGraph};
use crate::ontology::{most_specific, Ontology, OntologyError};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use thiserror::Error;

/// Every distinct (source labels, predicate, target labels) triple in the store
pub const SCHEMA_QUERY: &str = "MATCH (a)-[x]->(b)\n\
RETURN DISTINCT labels(a) AS source_labels, type(x) AS predicate, labels(b) AS target_labels";

/// Label carried by every node; says nothing about what a node is
pub const GENERIC_LABEL: &str = "biolink:NamedThing";

/// subject label -> object label -> predicates in first-seen order
pub type GraphSchema = BTreeMap<String, BTreeMap<String, Vec<String>>>;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Schema result is missing column {0}")]
    MissingColumn(&'static str),

    #[error("Invalid schema row {row}: {reason}")]
    InvalidRow { row: usize, reason: String },

    #[error(transparent)]
    Ontology(#[from] OntologyError),
}

pub type SchemaResult<T> = Result<T, SchemaError>;

/// Summarise the rows returned by [`SCHEMA_QUERY`]
///
/// Labels are translated to public form and the generic label is dropped.
/// With an ontology, each label set is further collapsed to its most
/// specific members.
pub async fn build_schema(
    results: &ResultSet,
    ontology: Option<Arc<dyn Ontology>>,
) -> SchemaResult<GraphSchema> {
    let source_col = column(results, "source_labels")?;
    let predicate_col = column(results, "predicate")?;
    let target_col = column(results, "target_labels")?;

    let mut leaves: HashMap<Vec<String>, Vec<String>> = HashMap::new();
    let mut schema = GraphSchema::new();

    for (row_no, row) in results.rows.iter().enumerate() {
        let cell = |i: usize| cell(results, row_no, row, i);
        let predicate = match cell(predicate_col)? {
            Value::String(p) => to_public_label(p),
            other => {
                return Err(invalid(
                    row_no,
                    format!("predicate must be a string, found {}", json_type_name(other)),
                ))
            }
        };
        let sources = label_set(row_no, cell(source_col)?)?;
        let targets = label_set(row_no, cell(target_col)?)?;

        let sources = specific(&mut leaves, ontology.as_ref(), sources).await?;
        let targets = specific(&mut leaves, ontology.as_ref(), targets).await?;

        for source in &sources {
            for target in &targets {
                let predicates = schema
                    .entry(source.clone())
                    .or_default()
                    .entry(target.clone())
                    .or_default();
                if !predicates.contains(&predicate) {
                    predicates.push(predicate.clone());
                }
            }
        }
    }

    tracing::info!(subjects = schema.len(), "schema built");
    Ok(schema)
}

/// One template query graph per (subject, object) pair in the schema
///
/// Nodes are `n1` (subject) and `n2` (object), with one directed edge
/// `e<i>` per predicate.
pub fn question_templates(schema: &GraphSchema) -> Vec<QueryGraph> {
    schema
        .iter()
        .flat_map(|(subject, objects)| {
            objects.iter().map(move |(object, predicates)| {
                predicates.iter().enumerate().fold(
                    QueryGraph::new()
                        .with_node(NodePattern::new("n1").with_category(subject.as_str()))
                        .with_node(NodePattern::new("n2").with_category(object.as_str())),
                    |graph, (i, predicate)| {
                        graph.with_edge(
                            EdgePattern::new(format!("e{}", i), "n1", "n2")
                                .with_predicate(predicate.as_str()),
                        )
                    },
                )
            })
        })
        .collect()
}

/// Node count per distinct label set
pub const LABEL_COUNT_QUERY: &str = "MATCH (c)\n\
RETURN DISTINCT labels(c) AS types, count(c) AS count";

/// A label set as stored, with the number of nodes carrying exactly it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelCount {
    pub labels: Vec<String>,
    pub count: u64,
}

/// Counts for one label set: its nodes, and its outgoing edges keyed by
/// target summary key then edge type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LabelSummary {
    pub nodes_count: u64,
    #[serde(flatten)]
    pub targets: BTreeMap<String, BTreeMap<String, u64>>,
}

/// summary key -> counts for that label set
pub type GraphSummary = BTreeMap<String, LabelSummary>;

/// Read the rows returned by [`LABEL_COUNT_QUERY`]
pub fn label_counts(results: &ResultSet) -> SchemaResult<Vec<LabelCount>> {
    let types_col = column(results, "types")?;
    let count_col = column(results, "count")?;
    results
        .rows
        .iter()
        .enumerate()
        .map(|(row_no, row)| {
            Ok(LabelCount {
                labels: stored_labels(row_no, cell(results, row_no, row, types_col)?)?,
                count: count(row_no, cell(results, row_no, row, count_col)?)?,
            })
        })
        .collect()
}

/// Outgoing edge counts by type and target label set, for nodes carrying
/// exactly `labels` (store form, in the order the store returned them)
pub fn edge_count_query(labels: &[String]) -> String {
    let labels: Vec<String> = labels.iter().map(|l| quote_string(l)).collect();
    format!(
        "MATCH (n)-[e]->(b)\nWHERE labels(n) = [{}]\nWITH DISTINCT e, b\n\
         RETURN type(e) AS edge_types, count(e) AS edge_counts, labels(b) AS target_labels",
        labels.join(", ")
    )
}

/// Read the rows returned by [`edge_count_query`] as
/// `target summary key -> edge type -> count`
///
/// Edge types are translated to public form; repeated pairs are summed.
pub fn edge_counts(results: &ResultSet) -> SchemaResult<BTreeMap<String, BTreeMap<String, u64>>> {
    let type_col = column(results, "edge_types")?;
    let count_col = column(results, "edge_counts")?;
    let target_col = column(results, "target_labels")?;

    let mut targets: BTreeMap<String, BTreeMap<String, u64>> = BTreeMap::new();
    for (row_no, row) in results.rows.iter().enumerate() {
        let cell = |i: usize| cell(results, row_no, row, i);
        let edge_type = match cell(type_col)? {
            Value::String(t) => to_public_label(t),
            other => {
                return Err(invalid(
                    row_no,
                    format!("edge type must be a string, found {}", json_type_name(other)),
                ))
            }
        };
        let edges = count(row_no, cell(count_col)?)?;
        let target = summary_key(&stored_labels(row_no, cell(target_col)?)?);
        *targets
            .entry(target)
            .or_default()
            .entry(edge_type)
            .or_default() += edges;
    }
    Ok(targets)
}

/// Public-form labels joined with `:`
pub fn summary_key(labels: &[String]) -> String {
    labels
        .iter()
        .map(|l| to_public_label(l))
        .collect::<Vec<_>>()
        .join(":")
}

fn column(results: &ResultSet, name: &'static str) -> SchemaResult<usize> {
    results
        .column_index(name)
        .ok_or(SchemaError::MissingColumn(name))
}

fn cell<'a>(
    results: &ResultSet,
    row_no: usize,
    row: &'a [Value],
    i: usize,
) -> SchemaResult<&'a Value> {
    row.get(i).ok_or_else(|| {
        invalid(
            row_no,
            format!("{} values for {} columns", row.len(), results.columns.len()),
        )
    })
}

fn invalid(row: usize, reason: String) -> SchemaError {
    SchemaError::InvalidRow { row, reason }
}

fn count(row: usize, value: &Value) -> SchemaResult<u64> {
    value.as_u64().ok_or_else(|| {
        invalid(
            row,
            format!("count must be a non-negative integer, found {}", value),
        )
    })
}

/// Labels of one cell as the store returned them: a single label or a list
fn stored_labels(row: usize, value: &Value) -> SchemaResult<Vec<String>> {
    match value {
        Value::String(label) => Ok(vec![label.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|v| {
                v.as_str()
                    .map(str::to_string)
                    .ok_or_else(|| invalid(row, "labels must be strings".to_string()))
            })
            .collect(),
        other => Err(invalid(
            row,
            format!("labels must be a list, found {}", json_type_name(other)),
        )),
    }
}

/// Public-form labels of one schema cell, without the generic label
fn label_set(row: usize, value: &Value) -> SchemaResult<Vec<String>> {
    let mut set: Vec<String> = Vec::new();
    for label in stored_labels(row, value)?.iter().map(|l| to_public_label(l)) {
        if label != GENERIC_LABEL && !set.contains(&label) {
            set.push(label);
        }
    }
    Ok(set)
}

/// Most specific members of a label set, memoised per distinct set
async fn specific(
    cache: &mut HashMap<Vec<String>, Vec<String>>,
    ontology: Option<&Arc<dyn Ontology>>,
    labels: Vec<String>,
) -> SchemaResult<Vec<String>> {
    let Some(ontology) = ontology else {
        return Ok(labels);
    };
    if let Some(hit) = cache.get(&labels) {
        return Ok(hit.clone());
    }
    let leaves = most_specific(Arc::clone(ontology), &labels).await?;
    cache.insert(labels, leaves.clone());
    Ok(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ontology::StaticOntology;
    use serde_json::json;

    fn schema_rows() -> ResultSet {
        ResultSet::new(["source_labels", "predicate", "target_labels"])
            .with_row(vec![
                json!(["biolink.Gene", "biolink.BiologicalEntity", "biolink.NamedThing"]),
                json!("biolink.related_to"),
                json!(["biolink.Disease", "biolink.NamedThing"]),
            ])
            .with_row(vec![
                json!(["biolink.Gene", "biolink.NamedThing"]),
                json!("biolink.treats"),
                json!("biolink.Disease"),
            ])
            .with_row(vec![
                json!(["biolink.Gene"]),
                json!("biolink.related_to"),
                json!(["biolink.Disease"]),
            ])
    }

    fn ontology() -> Arc<dyn Ontology> {
        Arc::new(StaticOntology::new().with_parent("biolink:Gene", "biolink:BiologicalEntity"))
    }

    #[tokio::test]
    async fn schema_collapses_labels_to_leaves() {
        let schema = build_schema(&schema_rows(), Some(ontology())).await.unwrap();
        assert_eq!(schema.len(), 1);
        assert_eq!(
            schema["biolink:Gene"]["biolink:Disease"],
            vec!["biolink:related_to", "biolink:treats"]
        );
    }

    #[tokio::test]
    async fn without_ontology_every_label_is_kept() {
        let schema = build_schema(&schema_rows(), None).await.unwrap();
        assert!(schema.contains_key("biolink:BiologicalEntity"));
        assert!(!schema.contains_key(GENERIC_LABEL));
    }

    #[tokio::test]
    async fn missing_column_is_reported() {
        let rows = ResultSet::new(["source_labels", "predicate"]);
        let err = build_schema(&rows, None).await.unwrap_err();
        assert!(matches!(err, SchemaError::MissingColumn("target_labels")));
    }

    #[tokio::test]
    async fn non_string_predicate_is_rejected() {
        let rows = ResultSet::new(["source_labels", "predicate", "target_labels"])
            .with_row(vec![json!(["Gene"]), json!(3), json!(["Disease"])]);
        let err = build_schema(&rows, None).await.unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRow { row: 0, .. }));
    }

    #[test]
    fn templates_pair_subjects_with_objects() {
        let mut schema = GraphSchema::new();
        schema
            .entry("biolink:Gene".into())
            .or_default()
            .insert(
                "biolink:Disease".into(),
                vec!["biolink:related_to".into(), "biolink:treats".into()],
            );

        let templates = question_templates(&schema);
        assert_eq!(templates.len(), 1);

        let graph = &templates[0];
        assert_eq!(graph.node("n1").unwrap().categories, vec!["biolink:Gene"]);
        assert_eq!(graph.node("n2").unwrap().categories, vec!["biolink:Disease"]);
        assert_eq!(graph.edges().len(), 2);
        assert_eq!(graph.edge("e1").unwrap().predicates, vec!["biolink:treats"]);
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn label_counts_keep_store_labels() {
        let rows = ResultSet::new(["types", "count"])
            .with_row(vec![json!(["biolink.Gene", "biolink.NamedThing"]), json!(12)])
            .with_row(vec![json!("biolink.Disease"), json!(3)]);
        let counts = label_counts(&rows).unwrap();
        assert_eq!(
            counts,
            vec![
                LabelCount {
                    labels: vec!["biolink.Gene".into(), "biolink.NamedThing".into()],
                    count: 12,
                },
                LabelCount {
                    labels: vec!["biolink.Disease".into()],
                    count: 3,
                },
            ]
        );
    }

    #[test]
    fn negative_count_is_rejected() {
        let rows = ResultSet::new(["types", "count"]).with_row(vec![json!(["Gene"]), json!(-1)]);
        let err = label_counts(&rows).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRow { row: 0, .. }));
    }

    #[test]
    fn edge_count_query_matches_exact_label_set() {
        let query = edge_count_query(&["biolink.Gene".into(), "O'Brien".into()]);
        assert_eq!(
            query,
            "MATCH (n)-[e]->(b)\n\
             WHERE labels(n) = ['biolink.Gene', 'O\\'Brien']\n\
             WITH DISTINCT e, b\n\
             RETURN type(e) AS edge_types, count(e) AS edge_counts, labels(b) AS target_labels"
        );
    }

    #[test]
    fn edge_counts_group_by_target_and_type() {
        let rows = ResultSet::new(["edge_types", "edge_counts", "target_labels"])
            .with_row(vec![
                json!("biolink.treats"),
                json!(2),
                json!(["biolink.Disease", "biolink.NamedThing"]),
            ])
            .with_row(vec![
                json!("biolink.related_to"),
                json!(5),
                json!(["biolink.Disease", "biolink.NamedThing"]),
            ])
            .with_row(vec![
                json!("biolink.treats"),
                json!(1),
                json!(["biolink.Disease", "biolink.NamedThing"]),
            ]);
        let counts = edge_counts(&rows).unwrap();
        let disease = &counts["biolink:Disease:biolink:NamedThing"];
        assert_eq!(disease["biolink:treats"], 3);
        assert_eq!(disease["biolink:related_to"], 5);
    }

    #[test]
    fn label_summary_flattens_targets() {
        let mut summary = LabelSummary {
            nodes_count: 4,
            ..LabelSummary::default()
        };
        summary
            .targets
            .entry("biolink:Disease".into())
            .or_default()
            .insert("biolink:treats".into(), 2);
        assert_eq!(
            serde_json::to_value(&summary).unwrap(),
            json!({ "nodes_count": 4, "biolink:Disease": { "biolink:treats": 2 } })
        );
    }
}
