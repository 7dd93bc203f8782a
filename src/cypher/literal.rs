//! Cypher literal rendering

use crate::graph::{json_type_name, CompileError, CompileResult};
use serde_json::Value;

/// Single-quoted string literal
pub fn quote_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('\'', "\\'");
    format!("'{}'", escaped)
}

/// Double-quoted string literal (used for relationship type comparisons)
pub fn quote_double(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{}\"", escaped)
}

/// Backtick-quoted identifier (labels, relationship types, property keys)
pub fn quote_identifier(name: &str) -> String {
    format!("`{}`", name.replace('`', "``"))
}

/// Render a property value; only booleans and strings are supported
pub fn property_value(pattern: &str, key: &str, value: &Value) -> CompileResult<String> {
    match value {
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::String(s) => Ok(quote_string(s)),
        other => Err(CompileError::UnsupportedPropertyType {
            pattern: pattern.to_string(),
            key: key.to_string(),
            found: json_type_name(other),
        }),
    }
}

/// Render an inline property map, e.g. `` {`id`: 'X:1'}``
///
/// Returns an empty string for no entries.
pub fn property_map(entries: &[(String, String)]) -> String {
    if entries.is_empty() {
        return String::new();
    }
    let body: Vec<String> = entries
        .iter()
        .map(|(key, value)| format!("{}: {}", quote_identifier(key), value))
        .collect();
    format!(" {{{}}}", body.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booleans_render_bare() {
        assert_eq!(property_value("n", "k", &json!(true)).unwrap(), "true");
        assert_eq!(property_value("n", "k", &json!(false)).unwrap(), "false");
    }

    #[test]
    fn strings_render_single_quoted() {
        assert_eq!(property_value("n", "k", &json!("abc")).unwrap(), "'abc'");
    }

    #[test]
    fn quotes_inside_strings_are_escaped() {
        assert_eq!(quote_string("O'Brien"), "'O\\'Brien'");
        assert_eq!(quote_double("say \"hi\""), "\"say \\\"hi\\\"\"");
    }

    #[test]
    fn numbers_are_unsupported() {
        let err = property_value("node n0", "score", &json!(3)).unwrap_err();
        assert_eq!(
            err,
            CompileError::UnsupportedPropertyType {
                pattern: "node n0".into(),
                key: "score".into(),
                found: "number",
            }
        );
    }

    #[test]
    fn property_map_formats_entries() {
        let entries = vec![
            ("id".to_string(), "'X:1'".to_string()),
            ("flag".to_string(), "true".to_string()),
        ];
        assert_eq!(property_map(&entries), " {`id`: 'X:1', `flag`: true}");
        assert_eq!(property_map(&[]), "");
    }

    #[test]
    fn backticks_in_identifiers_are_doubled() {
        assert_eq!(quote_identifier("we`ird"), "`we``ird`");
    }
}
