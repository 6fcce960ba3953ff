// Raw actions (dispatch input) and applied operations (log entries).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Scope;

/// A dispatch request: operation name, schema-validated input, and target scope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    #[serde(rename = "type")]
    pub action_type: String,
    #[serde(default = "empty_input")]
    pub input: Value,
    #[serde(default)]
    pub scope: Scope,
    /// Caller-supplied timestamp. The engine stamps `Utc::now()` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl Action {
    pub fn new(action_type: impl Into<String>, input: Value) -> Self {
        Self { action_type: action_type.into(), input, scope: Scope::Global, timestamp: None }
    }

    pub fn local(action_type: impl Into<String>, input: Value) -> Self {
        Self::new(action_type, input).with_scope(Scope::Local)
    }

    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn at(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }
}

/// One applied, immutable, indexed log entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// 0-based, monotonic within its scope.
    pub index: u64,
    #[serde(rename = "type")]
    pub action_type: String,
    pub input: Value,
    pub timestamp: DateTime<Utc>,
}

fn empty_input() -> Value {
    Value::Object(Default::default())
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use super::{Action, Operation};
    use crate::types::Scope;

    #[test]
    fn action_defaults_to_global_scope_and_empty_input() {
        let action: Action =
            serde_json::from_value(json!({ "type": "UPDATE_STATUS" })).expect("decode");
        assert_eq!(action.scope, Scope::Global);
        assert_eq!(action.input, json!({}));
        assert!(action.timestamp.is_none());
    }

    #[test]
    fn operation_uses_type_key_on_the_wire() {
        let op = Operation {
            index: 3,
            action_type: "DELETE_MILESTONE".into(),
            input: json!({ "id": "m1" }),
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).single().expect("valid"),
        };
        let encoded = serde_json::to_value(&op).expect("encode");
        assert_eq!(encoded["type"], "DELETE_MILESTONE");
        assert_eq!(encoded["index"], 3);
    }
}
