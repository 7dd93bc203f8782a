//! Question answering service
//!
//! `QuestionAnswerer` is the single entry point for answering a question:
//! compile the query graph, execute the text once through the gateway, and
//! map the rows into a response. The CLI and embedding callers go through it
//! rather than calling the compiler, gateway, and mapper separately.
//!
//! The same service reads the graph schema and summary, looks up nodes and
//! their one-hop neighbourhoods by identifier, and passes raw query text
//! through to the gateway.

use std::sync::Arc;
use std::time::Duration;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::answer::{map_results, MapError, Response};
use crate::cypher::{compile_query, CompileOptions};
use crate::gateway::{ExecutionGateway, GatewayError, ResultSet};
use crate::graph::{CompileError, QueryGraph};
use crate::lookup::{self, LookupError, Triplet};
use crate::ontology::Ontology;
use crate::schema::{
    self, build_schema, edge_count_query, edge_counts, label_counts, summary_key, GraphSchema,
    GraphSummary, LabelSummary, SchemaError, LABEL_COUNT_QUERY, SCHEMA_QUERY,
};

/// Errors from answering a question, passed through from the failing stage
#[derive(Debug, Error)]
pub enum QuestionError {
    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Map(#[from] MapError),

    #[error(transparent)]
    Execution(#[from] GatewayError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Lookup(#[from] LookupError),
}

/// Per-service compile and execution settings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AnswerOptions {
    pub compile: CompileOptions,
    /// Passed to the gateway with every query
    pub timeout: Option<Duration>,
}

impl AnswerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_compile(mut self, compile: CompileOptions) -> Self {
        self.compile = compile;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Answers questions against one graph backend
#[derive(Clone)]
pub struct QuestionAnswerer {
    gateway: Arc<dyn ExecutionGateway>,
    options: AnswerOptions,
    ontology: Option<Arc<dyn Ontology>>,
}

impl QuestionAnswerer {
    pub fn new(gateway: Arc<dyn ExecutionGateway>, options: AnswerOptions) -> Self {
        Self {
            gateway,
            options,
            ontology: None,
        }
    }

    /// Collapse schema labels to their most specific members
    pub fn with_ontology(mut self, ontology: Arc<dyn Ontology>) -> Self {
        self.ontology = Some(ontology);
        self
    }

    pub fn options(&self) -> &AnswerOptions {
        &self.options
    }

    /// Query text for a question, without executing it
    pub fn compile(&self, graph: &QueryGraph) -> Result<String, CompileError> {
        compile_query(graph, &self.options.compile)
    }

    /// Answer a question
    ///
    /// Executes exactly one query. Nothing is executed when compilation
    /// fails, and no partial response is returned when mapping fails.
    pub async fn answer(&self, graph: &QueryGraph) -> Result<Response, QuestionError> {
        info!(
            nodes = graph.nodes().len(),
            edges = graph.edges().len(),
            "answering question"
        );
        let query = self.compile(graph)?;
        debug!(%query, "compiled query");

        let results = self.run_query(&query).await?;
        let answer = map_results(graph, &results)?;
        info!(
            results = answer.results.len(),
            nodes = answer.knowledge_graph.nodes.len(),
            edges = answer.knowledge_graph.edges.len(),
            "question answered"
        );
        Ok(Response::new(graph.clone(), answer))
    }

    /// Answer a request body: `{"message": {"query_graph": ...}}`,
    /// `{"query_graph": ...}`, or a bare query graph
    pub async fn answer_request(&self, request: &Value) -> Result<Response, QuestionError> {
        let graph = QueryGraph::from_request(request)?;
        self.answer(&graph).await
    }

    /// Summarise which labels the store connects, and with which predicates
    pub async fn schema(&self) -> Result<GraphSchema, QuestionError> {
        info!("reading graph schema");
        let results = self.run_query(SCHEMA_QUERY).await?;
        Ok(build_schema(&results, self.ontology.clone()).await?)
    }

    /// One template question per connected label pair in the schema
    pub async fn question_templates(&self) -> Result<Vec<QueryGraph>, QuestionError> {
        Ok(schema::question_templates(&self.schema().await?))
    }

    /// Node count per label set, and outgoing edge counts per target label
    /// set and edge type
    ///
    /// Runs one query for the label sets, then one per label set.
    pub async fn summary(&self) -> Result<GraphSummary, QuestionError> {
        info!("reading graph summary");
        let mut summary = GraphSummary::new();
        for label_set in label_counts(&self.run_query(LABEL_COUNT_QUERY).await?)? {
            let edges = self.run_query(&edge_count_query(&label_set.labels)).await?;
            summary.insert(
                summary_key(&label_set.labels),
                LabelSummary {
                    nodes_count: label_set.count,
                    targets: edge_counts(&edges)?,
                },
            );
        }
        info!(label_sets = summary.len(), "summary built");
        Ok(summary)
    }

    /// Every stored node of `category` with identifier `curie`
    pub async fn node(
        &self,
        category: &str,
        curie: &str,
    ) -> Result<Vec<Map<String, Value>>, QuestionError> {
        let query = lookup::node_query(category, curie)?;
        Ok(lookup::node_records(&self.run_query(&query).await?)?)
    }

    /// Edges between the node `curie` and neighbours of `target_category`,
    /// outgoing triplets first
    pub async fn one_hops(
        &self,
        source_category: &str,
        target_category: &str,
        curie: &str,
    ) -> Result<Vec<Triplet>, QuestionError> {
        let [outgoing, incoming] =
            lookup::one_hop_queries(source_category, target_category, curie)?;
        let mut triplets = lookup::triplets(&self.run_query(&outgoing).await?, true)?;
        triplets.extend(lookup::triplets(&self.run_query(&incoming).await?, false)?);
        debug!(triplets = triplets.len(), %curie, "one-hop lookup");
        Ok(triplets)
    }

    /// Execute query text as given, with the configured timeout
    pub async fn run_query(&self, query: &str) -> Result<ResultSet, GatewayError> {
        let results = self
            .gateway
            .execute(query, self.options.timeout)
            .await
            .inspect_err(|e| warn!(error = %e, "query execution failed"))?;
        debug!(rows = results.len(), "query returned");
        Ok(results)
    }

    /// Release the gateway
    pub async fn shutdown(&self) -> Result<(), GatewayError> {
        info!("shutting down");
        self.gateway.close().await
    }
}
