use serde::Deserialize;

/// Loose scalar field: these APIs return strings and bare numbers
/// interchangeably for the same field ("4.50" vs 4.5), and null for absent.
#[derive(Debug, Default, Clone, PartialEq, Deserialize)]
#[serde(from = "serde_json::Value")]
pub(crate) struct Text(pub String);

impl From<serde_json::Value> for Text {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => Text(s),
            serde_json::Value::Null => Text(String::new()),
            other => Text(other.to_string()),
        }
    }
}
