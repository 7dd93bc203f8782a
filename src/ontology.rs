//! Ontology lookups and most-specific concept selection
//!
//! The ontology itself lives elsewhere; this module only needs ancestor
//! lookups. `most_specific` fans those lookups out concurrently, one task per
//! concept, and joins them all before answering.

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet, VecDeque};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

/// Errors from ontology lookups
#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("Ancestor lookup for {concept} failed: {reason}")]
    Lookup { concept: String, reason: String },

    #[error("Ancestor lookup task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid ontology file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type OntologyResult<T> = Result<T, OntologyError>;

/// Source of concept ancestry
#[async_trait]
pub trait Ontology: Send + Sync {
    /// Every ancestor of `concept`, excluding the concept itself
    async fn ancestors(&self, concept: &str) -> OntologyResult<Vec<String>>;
}

/// Keep only the concepts that are not an ancestor of another input concept
///
/// Input order is preserved and duplicates collapse to their first
/// occurrence. One lookup runs per distinct concept and every lookup
/// completes (or the first failure aborts the rest) before the result is
/// computed.
pub async fn most_specific(
    ontology: Arc<dyn Ontology>,
    concepts: &[String],
) -> OntologyResult<Vec<String>> {
    let mut seen = HashSet::new();
    let distinct: Vec<String> = concepts
        .iter()
        .filter(|c| seen.insert(c.as_str()))
        .cloned()
        .collect();

    let mut lookups: JoinSet<OntologyResult<Vec<String>>> = JoinSet::new();
    for concept in &distinct {
        let ontology = Arc::clone(&ontology);
        let concept = concept.clone();
        lookups.spawn(async move { ontology.ancestors(&concept).await });
    }

    let mut ancestors = HashSet::new();
    while let Some(joined) = lookups.join_next().await {
        ancestors.extend(joined??);
    }

    tracing::debug!(
        concepts = distinct.len(),
        ancestors = ancestors.len(),
        "resolved most specific concepts"
    );
    Ok(distinct
        .into_iter()
        .filter(|c| !ancestors.contains(c))
        .collect())
}

/// In-memory ontology over a concept -> direct parents table
///
/// Loaded from YAML of the form:
///
/// ```yaml
/// biolink:Gene:
///   - biolink:BiologicalEntity
/// biolink:BiologicalEntity:
///   - biolink:NamedThing
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct StaticOntology {
    parents: BTreeMap<String, Vec<String>>,
}

impl StaticOntology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `parent` as a direct parent of `concept`
    pub fn with_parent(mut self, concept: impl Into<String>, parent: impl Into<String>) -> Self {
        self.parents.entry(concept.into()).or_default().push(parent.into());
        self
    }

    pub fn from_yaml(text: &str) -> OntologyResult<Self> {
        Ok(serde_yaml::from_str(text)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> OntologyResult<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }

    /// Transitive closure over the parent table, breadth first
    fn closure(&self, concept: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut visited: HashSet<&str> = HashSet::from([concept]);
        let mut queue: VecDeque<&str> = VecDeque::from([concept]);

        while let Some(current) = queue.pop_front() {
            for parent in self.parents.get(current).into_iter().flatten() {
                if visited.insert(parent.as_str()) {
                    found.push(parent.clone());
                    queue.push_back(parent.as_str());
                }
            }
        }
        found
    }
}

#[async_trait]
impl Ontology for StaticOntology {
    async fn ancestors(&self, concept: &str) -> OntologyResult<Vec<String>> {
        Ok(self.closure(concept))
    }
}
