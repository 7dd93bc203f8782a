//! Node patterns of a query graph

use super::error::{json_type_name, CompileError, CompileResult};
use serde_json::{Map, Value};

/// Request keys with a fixed meaning on a node pattern (never extra properties)
const RESERVED_KEYS: [&str; 7] = ["ids", "id", "categories", "category", "is_set", "isSet", "name"];

/// A typed node pattern, optionally bound to specific entity identifiers
#[derive(Debug, Clone, PartialEq, Default)]
pub struct NodePattern {
    /// Query-graph id (also the variable name in compiled text)
    pub id: String,
    /// Type labels, any of which may match
    pub categories: Vec<String>,
    /// Curies the matched entity must carry, any of which may match
    pub ids: Vec<String>,
    /// Aggregate every match into one list instead of one row per match
    pub is_set: bool,
    /// Extra equality constraints, in declaration order
    pub properties: Map<String, Value>,
}

impl NodePattern {
    /// Create an unconstrained node pattern
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn with_id(mut self, curie: impl Into<String>) -> Self {
        self.ids.push(curie.into());
        self
    }

    pub fn with_ids<I, S>(mut self, curies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ids.extend(curies.into_iter().map(Into::into));
        self
    }

    /// Mark this pattern as a set node
    pub fn as_set(mut self) -> Self {
        self.is_set = true;
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Whether the pattern is anchored to known identifiers
    pub fn is_bound(&self) -> bool {
        !self.ids.is_empty()
    }

    /// Parse one entry of the request's `nodes` object
    pub(crate) fn from_json(id: &str, value: &Value) -> CompileResult<Self> {
        let Value::Object(fields) = value else {
            return Err(CompileError::MalformedQueryGraph(format!(
                "node {} must be an object, found {}",
                id,
                json_type_name(value)
            )));
        };

        let mut node = NodePattern::new(id);
        let pattern = format!("node {}", id);

        if let Some((field, value)) = first_present(fields, &["categories", "category"]) {
            node.categories = string_list(&pattern, field, value)?;
        }
        if let Some((field, value)) = first_present(fields, &["ids", "id"]) {
            node.ids = string_list(&pattern, field, value)?;
        }
        if let Some((field, value)) = first_present(fields, &["is_set", "isSet"]) {
            node.is_set = match value {
                Value::Bool(flag) => *flag,
                Value::Null => false,
                other => {
                    return Err(CompileError::MalformedQueryGraph(format!(
                        "{}: `{}` must be a bool, found {}",
                        pattern,
                        field,
                        json_type_name(other)
                    )))
                }
            };
        }

        for (key, value) in fields {
            if is_reserved_key(key) || value.is_null() {
                continue;
            }
            node.properties.insert(key.clone(), value.clone());
        }

        Ok(node)
    }

    /// Request-shaped JSON for this pattern (without its id)
    pub(crate) fn to_json(&self) -> Value {
        let mut fields = Map::new();
        if !self.categories.is_empty() {
            fields.insert("categories".into(), self.categories.clone().into());
        }
        if !self.ids.is_empty() {
            fields.insert("ids".into(), self.ids.clone().into());
        }
        if self.is_set {
            fields.insert("is_set".into(), Value::Bool(true));
        }
        for (key, value) in &self.properties {
            fields.insert(key.clone(), value.clone());
        }
        Value::Object(fields)
    }
}

/// Whether `key` has a fixed meaning on a node pattern
pub(crate) fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// First of `keys` present with a non-null value
pub(super) fn first_present<'a>(
    fields: &'a Map<String, Value>,
    keys: &[&'static str],
) -> Option<(&'static str, &'a Value)> {
    keys.iter()
        .find_map(|key| fields.get(*key).filter(|v| !v.is_null()).map(|v| (*key, v)))
}

/// Normalize a scalar-or-list field to a list of strings
pub(super) fn string_list(pattern: &str, field: &str, value: &Value) -> CompileResult<Vec<String>> {
    let malformed = || CompileError::MalformedIdentifierOrPredicateList {
        pattern: pattern.to_string(),
        field: field.to_string(),
    };

    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        Value::Array(items) => items
            .iter()
            .map(|item| item.as_str().map(str::to_string).ok_or_else(malformed))
            .collect(),
        _ => Err(malformed()),
    }
}
