// LogInspector - core/extract.rs
//
// First-value extraction over raw log messages.
//
// Each message is decoded as JSON when possible and otherwise wrapped as
// {"message": <raw>}, so one query expression works across structured and
// plain-text sources. The scan stops at the first message whose result is
// non-empty after normalisation.

use crate::core::query::{is_empty_value, QueryEvaluator};
use crate::util::constants::RAW_MESSAGE_FIELD;
use crate::util::error::{InspectorError, Result};
use serde_json::{Map, Value};

/// Return the first non-empty value `expression` yields over `messages`.
///
/// `Ok(None)` means no message produced a value. An invalid expression is
/// an `InspectorError::Evaluation` and stops the scan at once.
pub fn extract_first<I, S>(
    evaluator: &dyn QueryEvaluator,
    messages: I,
    expression: &str,
) -> Result<Option<String>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    for (index, message) in messages.into_iter().enumerate() {
        let subject = decode_subject(message.as_ref());
        let result = evaluator.evaluate(expression, &subject)?;

        if let Some(value) = normalize(result)? {
            tracing::debug!(index, expression, "Extracted value");
            return Ok(Some(value));
        }
    }

    tracing::debug!(expression, "No message yielded a value");
    Ok(None)
}

/// Decode a raw message into an evaluation subject.
pub fn decode_subject(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(decoded) => decoded,
        Err(_) => {
            let mut wrapper = Map::with_capacity(1);
            wrapper.insert(RAW_MESSAGE_FIELD.to_string(), Value::String(raw.to_string()));
            Value::Object(wrapper)
        }
    }
}

/// Reduce an evaluation result to a non-empty string, or `None` to skip.
fn normalize(result: Value) -> Result<Option<String>> {
    if is_empty_value(&result) {
        return Ok(None);
    }

    let value = match result {
        Value::Array(items) => match items.into_iter().next() {
            Some(first) if !is_empty_value(&first) => first,
            _ => return Ok(None),
        },
        other => other,
    };

    // Strings are used verbatim; only their emptiness matters.
    if let Value::String(s) = value {
        return Ok((!s.is_empty()).then_some(s));
    }

    let text = serde_json::to_string(&value).map_err(InspectorError::Serialization)?;
    if matches!(text.as_str(), "null" | "[]" | "{}") {
        return Ok(None);
    }
    Ok(Some(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::query::JmespathEvaluator;
    use crate::util::error::EvaluationError;

    fn extract(messages: &[&str], expr: &str) -> Result<Option<String>> {
        extract_first(&JmespathEvaluator, messages.iter().copied(), expr)
    }

    #[test]
    fn test_json_field() {
        let got = extract(&[r#"{"user":{"id":"123"}}"#], "user.id").unwrap();
        assert_eq!(got.as_deref(), Some("123"));
    }

    #[test]
    fn test_plain_text_wrapped_as_message() {
        let got = extract(&["WARN: something"], "message").unwrap();
        assert_eq!(got.as_deref(), Some("WARN: something"));
    }

    #[test]
    fn test_array_takes_first_element() {
        let got = extract(&[r#"{"ids":["a","b"]}"#], "ids").unwrap();
        assert_eq!(got.as_deref(), Some("a"));
    }

    #[test]
    fn test_empty_first_element_continues_to_next_message() {
        let got = extract(&[r#"{"names":[""]}"#, r#"{"names":["ok"]}"#], "names").unwrap();
        assert_eq!(got.as_deref(), Some("ok"));
    }

    #[test]
    fn test_number_canonicalised() {
        let got = extract(&[r#"{"n":42}"#], "n").unwrap();
        assert_eq!(got.as_deref(), Some("42"));
    }

    #[test]
    fn test_string_spelling_json_literal_is_value() {
        for literal in ["null", "[]", "{}"] {
            let message = serde_json::json!({"s": literal}).to_string();
            let got = extract(&[message.as_str()], "s").unwrap();
            assert_eq!(got.as_deref(), Some(literal));
        }
    }

    #[test]
    fn test_array_of_literal_string_is_value() {
        let got = extract(&[r#"{"a":["null","x"]}"#], "a").unwrap();
        assert_eq!(got.as_deref(), Some("null"));
    }

    #[test]
    fn test_object_canonicalised_compact() {
        let got = extract(&[r#"{"o": {"k": [1, 2]}}"#], "o").unwrap();
        assert_eq!(got.as_deref(), Some(r#"{"k":[1,2]}"#));
    }

    #[test]
    fn test_empty_object_not_found() {
        let got = extract(&[r#"{"user":{}}"#], "user.id").unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn test_nested_empty_array_skipped() {
        let got = extract(&[r#"{"a":[[]]}"#, r#"{"a":[{}]}"#, r#"{"a":[false]}"#], "a").unwrap();
        assert_eq!(got.as_deref(), Some("false"));
    }

    #[test]
    fn test_empty_raw_message_not_found() {
        let got = extract(&[""], "message").unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn test_no_messages_not_found() {
        let got = extract(&[], "message").unwrap();
        assert_eq!(got, None);
    }

    #[test]
    fn test_invalid_expression_is_error() {
        let err = extract(&[r#"{"a":1}"#, r#"{"a":2}"#], "user.[").unwrap_err();
        assert!(matches!(
            err,
            InspectorError::Evaluation(EvaluationError::InvalidExpression { .. })
        ));
    }

    #[test]
    fn test_json_scalar_message_is_subject() {
        // A message that is itself a JSON string decodes to that string.
        let got = extract(&[r#""just text""#], "@").unwrap();
        assert_eq!(got.as_deref(), Some("just text"));
    }

    #[test]
    fn test_decode_subject_wraps_invalid_json() {
        let subject = decode_subject("{broken");
        assert_eq!(subject, serde_json::json!({"message": "{broken"}));
    }
}
