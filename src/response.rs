//! The single result shape every request produces

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::error::GraphQLError;

/// Data payload plus ordered errors, as returned to the caller.
///
/// A non-empty `errors` list signals degraded or failed execution whether or
/// not `data` is present; callers should inspect both.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QueryResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<GraphQLError>,
}

impl QueryResult {
    pub fn from_data(data: JsonValue) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    /// A result with no data, used when a request never reaches execution
    pub fn from_errors(errors: Vec<GraphQLError>) -> Self {
        Self { data: None, errors }
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn to_json(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or(JsonValue::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_only_result() {
        let result = QueryResult::from_data(json!({"hero": {"name": "R2-D2"}}));

        assert!(!result.has_errors());
        assert_eq!(result.to_json(), json!({"data": {"hero": {"name": "R2-D2"}}}));
    }

    #[test]
    fn test_errors_only_result_omits_data() {
        let result = QueryResult::from_errors(vec![GraphQLError::new("Must provide an operation.")]);

        assert!(result.has_errors());
        assert_eq!(
            result.to_json(),
            json!({"errors": [{"message": "Must provide an operation."}]})
        );
    }

    #[test]
    fn test_null_data_is_kept() {
        let mut result = QueryResult::from_data(JsonValue::Null);
        result.errors.push(GraphQLError::new("Cannot return null for non-nullable field Query.a."));

        let wire = result.to_json();
        assert_eq!(wire["data"], JsonValue::Null);
        assert!(wire.as_object().expect("object").contains_key("data"));
        assert_eq!(wire["errors"].as_array().map(Vec::len), Some(1));
    }
}
