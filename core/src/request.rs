use serde_json::Value;

use crate::errors::PayloadError;
use crate::operation::Operation;

/// One invocation's worth of input, lifted out of the raw event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub operation: Operation,
    pub id: Option<String>,
    pub name: Option<String>,
}

impl Request {
    /// A request with nothing set. Routes to the unknown-operation path.
    pub fn empty() -> Self {
        Self {
            operation: Operation::Unknown(None),
            id: None,
            name: None,
        }
    }

    /// Extracts the request from the event's `body` field.
    ///
    /// `body` is normally a JSON document encoded as a string; an already
    /// decoded object is accepted as well. An event without `body` yields
    /// [`Request::empty`].
    pub fn from_event(event: &Value) -> Result<Self, PayloadError> {
        let Some(body) = event.get("body") else {
            return Ok(Self::empty());
        };

        let decoded;
        let fields = match body {
            Value::String(text) => {
                decoded = serde_json::from_str::<Value>(text)?;
                decoded.as_object().ok_or(PayloadError::NotAnObject {
                    kind: kind_of(&decoded),
                })?
            }
            Value::Object(fields) => fields,
            other => {
                return Err(PayloadError::InvalidBody {
                    kind: kind_of(other),
                });
            }
        };

        let operation = text_field(fields, "operation")?;
        Ok(Self {
            operation: Operation::parse(operation.as_deref()),
            id: text_field(fields, "id")?,
            name: text_field(fields, "name")?,
        })
    }
}

/// Reads a field as text. Absent and explicit `null` both come back as `None`.
fn text_field(
    fields: &serde_json::Map<String, Value>,
    field: &'static str,
) -> Result<Option<String>, PayloadError> {
    match fields.get(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text.clone())),
        Some(Value::Number(number)) => integer_text(number)
            .map(Some)
            .ok_or(PayloadError::InexactNumber { field }),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(PayloadError::NotScalar {
            field,
            kind: kind_of(other),
        }),
    }
}

/// Only integers that fit in 64 bits keep their exact digits once decoded;
/// anything wider or fractional would be re-rendered and address a different record.
fn integer_text(number: &serde_json::Number) -> Option<String> {
    number
        .as_i64()
        .map(|n| n.to_string())
        .or_else(|| number.as_u64().map(|n| n.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
