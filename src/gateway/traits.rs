//! Execution gateway trait definitions

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;
use thiserror::Error;

/// Errors raised by the backend executing query text
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Graph backend unavailable: {0}")]
    Unavailable(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for gateway operations
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Tabular result of one query: named columns and ordered rows
///
/// Matched nodes and edges arrive as JSON objects (their property bags),
/// aggregated matches as lists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    pub columns: Vec<String>,
    #[serde(default)]
    pub rows: Vec<Vec<Value>>,
}

impl ResultSet {
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Append a row (builder style)
    pub fn with_row(mut self, row: Vec<Value>) -> Self {
        self.rows.push(row);
        self
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column by name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Rows as column-name -> value maps
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.rows
            .iter()
            .map(|row| {
                self.columns
                    .iter()
                    .cloned()
                    .zip(row.iter().cloned())
                    .collect()
            })
            .collect()
    }
}

/// Backend that executes query text against a graph store
///
/// Implementations must be thread-safe (Send + Sync); one instance is shared
/// by every question answered through a service.
#[async_trait]
pub trait ExecutionGateway: Send + Sync {
    /// Execute read-only query text, honouring `timeout` when given
    async fn execute(&self, query: &str, timeout: Option<Duration>) -> GatewayResult<ResultSet>;

    /// Release backend resources; later calls to `execute` may fail
    async fn close(&self) -> GatewayResult<()> {
        Ok(())
    }
}
