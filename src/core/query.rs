// LogInspector - core/query.rs
//
// Query-expression evaluation seam. The core never interprets query
// expressions itself; it hands them to a `QueryEvaluator` together with a
// `serde_json::Value` subject and works on the returned value.
//
// `serde_json::Value` is the tagged union for decoded JSON (null, bool,
// number, string, array, object), so emptiness and canonicalisation are
// plain functions over it.

use crate::util::error::EvaluationError;
use serde_json::Value;

/// Evaluates a query expression against a JSON subject.
pub trait QueryEvaluator {
    /// Evaluate `expression` against `subject`.
    ///
    /// A syntactically invalid expression is an error, not an empty result.
    fn evaluate(&self, expression: &str, subject: &Value) -> Result<Value, EvaluationError>;
}

/// JMESPath evaluator backed by the `jmespath` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct JmespathEvaluator;

impl QueryEvaluator for JmespathEvaluator {
    fn evaluate(&self, expression: &str, subject: &Value) -> Result<Value, EvaluationError> {
        let compiled =
            jmespath::compile(expression).map_err(|e| EvaluationError::InvalidExpression {
                expression: expression.to_string(),
                source: Box::new(e),
            })?;

        let result = compiled
            .search(subject)
            .map_err(|e| EvaluationError::InvalidExpression {
                expression: expression.to_string(),
                source: Box::new(e),
            })?;

        serde_json::to_value(&*result).map_err(|e| EvaluationError::ResultConversion {
            expression: expression.to_string(),
            source: e,
        })
    }
}

/// True for null, the empty string, and empty arrays/objects.
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Render a value as text: strings verbatim, anything else as compact JSON.
pub fn to_text(value: &Value) -> Result<String, serde_json::Error> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => serde_json::to_string(other),
    }
}
