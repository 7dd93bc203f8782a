//! Replay gateway: answers queries from recorded result sets
//!
//! Stands in for a live graph backend in tests and in the CLI's offline
//! `answer` command.

use super::traits::{ExecutionGateway, GatewayError, GatewayResult, ResultSet};
use async_trait::async_trait;
use dashmap::DashMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

/// On-disk fixture: either a bare result set (served for every query) or
/// per-query responses with an optional fallback
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FixtureFile {
    Single(ResultSet),
    Recorded {
        #[serde(default)]
        responses: Vec<RecordedResponse>,
        #[serde(default)]
        fallback: Option<ResultSet>,
    },
}

#[derive(Debug, Deserialize)]
struct RecordedResponse {
    query: String,
    result: ResultSet,
}

/// Gateway replaying canned result sets
#[derive(Debug, Default)]
pub struct FixtureGateway {
    responses: DashMap<String, ResultSet>,
    fallback: Option<ResultSet>,
    latency: Option<Duration>,
    executed: Mutex<Vec<String>>,
    closed: AtomicBool,
}

impl FixtureGateway {
    /// Create a gateway with no recorded responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `result` whenever exactly `query` is executed
    pub fn with_response(self, query: impl Into<String>, result: ResultSet) -> Self {
        self.responses.insert(query.into(), result);
        self
    }

    /// Serve `result` for any query without a recorded response
    pub fn with_fallback(mut self, result: ResultSet) -> Self {
        self.fallback = Some(result);
        self
    }

    /// Delay every execution, as a slow backend would
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Load recorded responses from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> GatewayResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let gateway = match serde_json::from_str::<FixtureFile>(&text)? {
            FixtureFile::Single(result) => Self::new().with_fallback(result),
            FixtureFile::Recorded {
                responses,
                fallback,
            } => {
                let gateway = Self {
                    fallback,
                    ..Self::default()
                };
                for recorded in responses {
                    gateway.responses.insert(recorded.query, recorded.result);
                }
                gateway
            }
        };
        Ok(gateway)
    }

    /// Every query executed so far, in order
    pub fn executed(&self) -> Vec<String> {
        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ExecutionGateway for FixtureGateway {
    async fn execute(&self, query: &str, timeout: Option<Duration>) -> GatewayResult<ResultSet> {
        if self.is_closed() {
            return Err(GatewayError::Unavailable("gateway has been closed".to_string()));
        }

        self.executed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.to_string());

        if let Some(latency) = self.latency {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, tokio::time::sleep(latency))
                    .await
                    .map_err(|_| GatewayError::Timeout(limit))?,
                None => tokio::time::sleep(latency).await,
            }
        }

        if let Some(result) = self.responses.get(query) {
            return Ok(result.clone());
        }
        self.fallback
            .clone()
            .ok_or_else(|| GatewayError::Query("no recorded result for query".to_string()))
    }

    async fn close(&self) -> GatewayResult<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}
