use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// A single attribute value held by the store.
///
/// Items carry no fixed schema, so every attribute is one of these tagged
/// variants. Serialized untagged so HTTP payloads stay plain JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<AttributeValue>),
    Map(BTreeMap<String, AttributeValue>),
}

/// An arbitrary attribute map belonging to a named table.
pub type Item = BTreeMap<String, AttributeValue>;

/// The subset of an item that addresses it: key attribute name -> value.
pub type KeyMap = BTreeMap<String, AttributeValue>;

impl AttributeValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Null and the empty string count as "no value" for key attributes.
    pub fn is_blank(&self) -> bool {
        match self {
            AttributeValue::Null => true,
            AttributeValue::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Text form used when building item identifiers.
    pub fn to_key_string(&self) -> String {
        match self {
            AttributeValue::Null => String::new(),
            AttributeValue::Bool(b) => b.to_string(),
            AttributeValue::Number(n) => n.to_string(),
            AttributeValue::String(s) => s.clone(),
            AttributeValue::List(_) | AttributeValue::Map(_) => {
                serde_json::to_string(self).unwrap_or_default()
            }
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::String(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::String(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Number(value.into())
    }
}

impl From<u64> for AttributeValue {
    fn from(value: u64) -> Self {
        AttributeValue::Number(value.into())
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(b),
            Value::Number(n) => AttributeValue::Number(n),
            Value::String(s) => AttributeValue::String(s),
            Value::Array(arr) => AttributeValue::List(arr.into_iter().map(Into::into).collect()),
            Value::Object(map) => {
                AttributeValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

impl From<AttributeValue> for Value {
    fn from(value: AttributeValue) -> Self {
        match value {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(b),
            AttributeValue::Number(n) => Value::Number(n),
            AttributeValue::String(s) => Value::String(s),
            AttributeValue::List(items) => Value::Array(items.into_iter().map(Into::into).collect()),
            AttributeValue::Map(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, v.into())).collect())
            }
        }
    }
}

/// Scalar type of a key attribute, as declared in the table definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum KeyAttributeType {
    #[default]
    #[serde(rename = "S")]
    String,
    #[serde(rename = "N")]
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyAttribute {
    pub name: String,
    #[serde(rename = "type", default)]
    pub attribute_type: KeyAttributeType,
}

impl KeyAttribute {
    pub fn string(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: KeyAttributeType::String,
        }
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attribute_type: KeyAttributeType::Number,
        }
    }
}

/// Primary-key structure of a table: one partition attribute, optional sort attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeySchema {
    pub partition_key: KeyAttribute,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_key: Option<KeyAttribute>,
}

impl KeySchema {
    pub fn simple(partition_key: KeyAttribute) -> Self {
        Self {
            partition_key,
            sort_key: None,
        }
    }

    pub fn composite(partition_key: KeyAttribute, sort_key: KeyAttribute) -> Self {
        Self {
            partition_key,
            sort_key: Some(sort_key),
        }
    }

    /// Key attributes in declaration order (partition first).
    pub fn attributes(&self) -> impl Iterator<Item = &KeyAttribute> {
        std::iter::once(&self.partition_key).chain(self.sort_key.iter())
    }
}
