// LogInspector - core/filter_builder.rs
//
// Builds the second-phase filter pattern from an extracted value.
//
// Two steps, composed by the caller:
//   1. `substitute_placeholder` splices the value into the template as a
//      JSON string literal, so quotes or braces in the value cannot break
//      out of their literal position.
//   2. `build_filter` evaluates the result as a query expression against
//      {"value": <extracted>}. If it does not evaluate, the text is used
//      as a literal filter pattern.

use crate::core::query::{self, QueryEvaluator};
use crate::util::constants::NEXT_FILTER_VALUE_FIELD;
use crate::util::error::{InspectorError, Result};
use serde_json::{Map, Value};

/// Replace every `{{name}}` in `expression` with `value` as a quoted JSON literal.
///
/// An empty `name` leaves the expression untouched.
pub fn substitute_placeholder(expression: &str, name: &str, value: &str) -> String {
    if name.is_empty() {
        return expression.to_string();
    }
    let needle = format!("{{{{{name}}}}}");
    if !expression.contains(&needle) {
        return expression.to_string();
    }
    expression.replace(&needle, &quote_literal(value))
}

/// JSON-quote `value`, escaping quotes, backslashes, and control characters.
fn quote_literal(value: &str) -> String {
    // Serialising a &str cannot fail.
    serde_json::to_string(value).unwrap_or_else(|_| format!("\"{}\"", value.escape_default()))
}

/// Evaluate `expression` against `{"value": extracted}` to produce a filter.
///
/// Evaluation failure is not an error: the expression is returned as-is.
/// A string result is returned verbatim; anything else as compact JSON.
pub fn build_filter(
    evaluator: &dyn QueryEvaluator,
    expression: &str,
    extracted: &str,
) -> Result<String> {
    let mut subject = Map::with_capacity(1);
    subject.insert(
        NEXT_FILTER_VALUE_FIELD.to_string(),
        Value::String(extracted.to_string()),
    );

    match evaluator.evaluate(expression, &Value::Object(subject)) {
        Ok(result) => query::to_text(&result).map_err(InspectorError::Serialization),
        Err(e) => {
            tracing::debug!(error = %e, "Next filter is not a query expression; using it literally");
            Ok(expression.to_string())
        }
    }
}
