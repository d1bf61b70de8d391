use serde_json::Value;

use crate::error::CoreError;

/// Raw submitted form: field name to value.
///
/// Values are usually strings (HTML form posts) but typed JSON values are
/// accepted where the field kind allows them.
pub type FormData = serde_json::Map<String, Value>;

/// Take a JSON payload as form data. Only objects are accepted.
pub fn form_data_from_json(value: Value) -> Result<FormData, CoreError> {
    match value {
        Value::Object(map) => Ok(map),
        other => Err(CoreError::MalformedInput(format!(
            "Form data must be a JSON object, got {}",
            json_type_name(&other)
        ))),
    }
}

/// Build form data from decoded `key=value` pairs.
///
/// A key submitted more than once keeps its last value.
pub fn form_data_from_pairs<I, K, V>(pairs: I) -> FormData
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), Value::String(v.into())))
        .collect()
}

pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_payload_is_accepted() {
        let data = form_data_from_json(json!({"name": "pool-1"})).unwrap();
        assert_eq!(data["name"], "pool-1");
    }

    #[test]
    fn non_object_payload_is_rejected() {
        let err = form_data_from_json(json!(["name"])).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput(ref msg) if msg.contains("array")));
    }

    #[test]
    fn pairs_last_value_wins() {
        let data = form_data_from_pairs([("name", "first"), ("size", "10"), ("name", "second")]);
        assert_eq!(data.len(), 2);
        assert_eq!(data["name"], "second");
        assert_eq!(data["size"], "10");
    }
}
