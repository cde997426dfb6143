//! DynamoDB attribute conversion functions.
//!
//! Pure functions between `AttributeValue` maps and the JSON shapes the
//! dispatcher works with. Testable without DynamoDB access.

use std::collections::HashMap;

use aws_sdk_dynamodb::types::AttributeValue;
use serde_json::{Number, Value};

use super::{ID_ATTRIBUTE, Item, NAME_ATTRIBUTE, Record};
use crate::errors::StoreError;

/// Convert a Record to a DynamoDB item.
pub fn record_to_item(record: &Record) -> HashMap<String, AttributeValue> {
    let mut item = HashMap::new();
    item.insert(
        ID_ATTRIBUTE.to_string(),
        AttributeValue::S(record.id.clone()),
    );
    item.insert(
        NAME_ATTRIBUTE.to_string(),
        AttributeValue::S(record.name.clone()),
    );
    item
}

/// Convert a DynamoDB item to its JSON attributes.
pub fn item_to_json(item: &HashMap<String, AttributeValue>) -> Result<Item, StoreError> {
    item.iter()
        .map(|(key, value)| Ok((key.clone(), attribute_to_json(key, value)?)))
        .collect()
}

fn attribute_to_json(key: &str, value: &AttributeValue) -> Result<Value, StoreError> {
    let json = match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => number_to_json(n),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(_) => Value::Null,
        AttributeValue::Ss(values) => values.iter().cloned().map(Value::String).collect(),
        AttributeValue::Ns(values) => values.iter().map(|n| number_to_json(n)).collect(),
        AttributeValue::L(values) => values
            .iter()
            .map(|v| attribute_to_json(key, v))
            .collect::<Result<Vec<_>, _>>()?
            .into(),
        AttributeValue::M(map) => Value::Object(item_to_json(map)?),
        _ => {
            return Err(StoreError::InvalidData(format!(
                "attribute '{}' has a type that cannot be rendered as JSON",
                key
            )));
        }
    };
    Ok(json)
}

/// DynamoDB numbers are strings on the wire. Values outside what JSON numbers
/// can hold are kept as strings.
fn number_to_json(n: &str) -> Value {
    n.parse::<Number>()
        .map(Value::Number)
        .unwrap_or_else(|_| Value::String(n.to_string()))
}
