//! Decoding of the engine's `text/plain` statement output.
//!
//! The generated scripts print `json.dumps([row.asDict() ...])`, so a
//! successful payload is a JSON array of flat objects. Column order is
//! preserved as emitted.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;

use crate::error::CoreError;

/// One result row: column name to value, in engine column order.
pub type Record = IndexMap<String, Value>;

/// Ordered rows returned by a query run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResultSet {
    pub rows: Vec<Record>,
}

impl ResultSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Parse a statement payload into a [`ResultSet`].
///
/// Fails with [`CoreError::MalformedResult`] when the text is not JSON,
/// is not an array, or contains a non-object element.
pub fn decode_result(payload: &str) -> Result<ResultSet, CoreError> {
    let text = payload.trim();
    serde_json::from_str::<Vec<Record>>(text)
        .map(|rows| ResultSet { rows })
        .map_err(|e| CoreError::MalformedResult(describe_failure(text, &e)))
}

/// Explain why `text` is not an array of records, in caller terms.
fn describe_failure(text: &str, err: &serde_json::Error) -> String {
    match serde_json::from_str::<Value>(text) {
        Err(_) => format!("invalid JSON: {err}"),
        Ok(Value::Array(items)) => match items.iter().position(|item| !item.is_object()) {
            Some(idx) => format!(
                "record {idx} is {}, expected an object",
                json_kind(&items[idx])
            ),
            None => err.to_string(),
        },
        Ok(other) => format!(
            "expected a JSON array of records, got {}",
            json_kind(&other)
        ),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn decodes_platform_rows() {
        let payload =
            r#"[{"platform":"web","total_units_sold":100,"transaction_count":5}]"#;
        let result = decode_result(payload).unwrap();

        assert_eq!(result.len(), 1);
        let row = &result.rows[0];
        assert_eq!(row["platform"], json!("web"));
        assert_eq!(row["total_units_sold"], json!(100));
        assert_eq!(row["transaction_count"], json!(5));
    }

    #[test]
    fn trailing_newline_from_print_is_ignored() {
        let result = decode_result("[{\"category\":\"toys\",\"average_price\":9.5}]\n").unwrap();
        assert_eq!(result.rows[0]["average_price"], json!(9.5));
    }

    #[test]
    fn empty_array_is_an_empty_result() {
        let result = decode_result("[]").unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn null_values_are_preserved() {
        let result = decode_result(r#"[{"category":"misc","average_rating":null}]"#).unwrap();
        assert!(result.rows[0]["average_rating"].is_null());
    }

    #[test]
    fn object_payload_is_malformed() {
        let err = decode_result(r#"{"platform":"web"}"#).unwrap_err();
        assert!(matches!(err, CoreError::MalformedResult(ref m) if m.contains("an object")));
    }

    #[test]
    fn non_object_row_is_malformed() {
        let err = decode_result(r#"[{"a":1}, 2]"#).unwrap_err();
        assert!(matches!(err, CoreError::MalformedResult(ref m) if m.contains("record 1")));
    }

    #[test]
    fn python_repr_is_malformed() {
        // What a script printing the raw list (not json.dumps) would emit.
        let err = decode_result("[Row(platform='web')]").unwrap_err();
        assert!(matches!(err, CoreError::MalformedResult(_)));
    }

    #[test]
    fn serializes_as_plain_array() {
        let result = decode_result(r#"[{"b":1,"a":2}]"#).unwrap();
        let text = serde_json::to_string(&result).unwrap();
        assert_eq!(text, r#"[{"b":1,"a":2}]"#);
    }
}
