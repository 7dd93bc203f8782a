//! Edge patterns of a query graph

use super::error::{json_type_name, CompileError, CompileResult};
use super::node::{first_present, string_list};
use serde_json::{Map, Value};

/// A typed edge pattern between two node patterns
#[derive(Debug, Clone, PartialEq)]
pub struct EdgePattern {
    /// Query-graph id (also the variable name in compiled text)
    pub id: String,
    /// Query-graph id of the subject node pattern
    pub subject: String,
    /// Query-graph id of the object node pattern
    pub object: String,
    /// Relation labels, any of which may match
    pub predicates: Vec<String>,
    /// Whether the match respects subject -> object direction
    pub directed: bool,
}

impl EdgePattern {
    /// Create an untyped, undirected edge pattern
    pub fn new(
        id: impl Into<String>,
        subject: impl Into<String>,
        object: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            object: object.into(),
            predicates: Vec::new(),
            directed: false,
        }
    }

    /// Add a predicate; typed edges become directed
    pub fn with_predicate(mut self, predicate: impl Into<String>) -> Self {
        self.predicates.push(predicate.into());
        self.directed = true;
        self
    }

    /// Add several predicates; typed edges become directed
    pub fn with_predicates<I, S>(mut self, predicates: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.predicates.extend(predicates.into_iter().map(Into::into));
        self.directed = !self.predicates.is_empty();
        self
    }

    /// Override the direction inferred from the predicates
    pub fn directed(mut self, directed: bool) -> Self {
        self.directed = directed;
        self
    }

    /// Parse one entry of the request's `edges` object
    pub(crate) fn from_json(id: &str, value: &Value) -> CompileResult<Self> {
        let Value::Object(fields) = value else {
            return Err(CompileError::MalformedQueryGraph(format!(
                "edge {} must be an object, found {}",
                id,
                json_type_name(value)
            )));
        };
        let pattern = format!("edge {}", id);

        let subject = endpoint(fields, &pattern, &["subject", "source_id"])?;
        let object = endpoint(fields, &pattern, &["object", "target_id"])?;
        let predicates = match first_present(fields, &["predicates", "predicate"]) {
            Some((field, value)) => string_list(&pattern, field, value)?,
            None => Vec::new(),
        };
        let directed = match fields.get("directed") {
            None | Some(Value::Null) => !predicates.is_empty(),
            Some(Value::Bool(flag)) => *flag,
            Some(other) => {
                return Err(CompileError::MalformedQueryGraph(format!(
                    "{}: `directed` must be a bool, found {}",
                    pattern,
                    json_type_name(other)
                )))
            }
        };

        Ok(Self {
            id: id.to_string(),
            subject,
            object,
            predicates,
            directed,
        })
    }

    /// Request-shaped JSON for this pattern (without its id)
    pub(crate) fn to_json(&self) -> Value {
        let mut fields = Map::new();
        fields.insert("subject".into(), self.subject.clone().into());
        fields.insert("object".into(), self.object.clone().into());
        if !self.predicates.is_empty() {
            fields.insert("predicates".into(), self.predicates.clone().into());
        }
        fields.insert("directed".into(), Value::Bool(self.directed));
        Value::Object(fields)
    }
}

fn endpoint(
    fields: &Map<String, Value>,
    pattern: &str,
    keys: &[&'static str],
) -> CompileResult<String> {
    match first_present(fields, keys) {
        Some((_, Value::String(node))) => Ok(node.clone()),
        Some((field, other)) => Err(CompileError::MalformedQueryGraph(format!(
            "{}: `{}` must be a node id, found {}",
            pattern,
            field,
            json_type_name(other)
        ))),
        None => Err(CompileError::MalformedQueryGraph(format!(
            "{}: missing `{}`",
            pattern, keys[0]
        ))),
    }
}
