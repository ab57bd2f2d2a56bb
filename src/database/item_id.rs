//! Opaque item identifiers.
//!
//! An id is the partition value alone, or `partition::sort` when the table
//! has a sort key. Segments are not escaped: a partition value that itself
//! contains `::` will not decode back to the same key.

use thiserror::Error;

use crate::store::{AttributeValue, Item, KeyAttribute, KeyAttributeType, KeyMap, KeySchema};

pub const ID_SEPARATOR: &str = "::";

/// Attribute name the computed id is exposed under in API payloads
pub const ID_FIELD: &str = "__id";

#[derive(Debug, Error, PartialEq)]
pub enum CodecError {
    #[error("Malformed item id segment for '{attribute}': {value}")]
    MalformedSegment { attribute: String, value: String },
}

/// Build the id for `item`.
///
/// An item without a partition value yields `""` (unidentifiable, not an
/// error). A missing sort value leaves the id as the partition segment.
pub fn encode(item: &Item, schema: &KeySchema) -> String {
    let segment = |attr: &KeyAttribute| {
        item.get(&attr.name)
            .map(AttributeValue::to_key_string)
            .unwrap_or_default()
    };

    let partition = segment(&schema.partition_key);
    if partition.is_empty() {
        return String::new();
    }

    match schema.sort_key.as_ref().map(segment) {
        Some(sort) if !sort.is_empty() => format!("{}{}{}", partition, ID_SEPARATOR, sort),
        _ => partition,
    }
}

/// Turn an id back into a key map for point lookups and deletes.
///
/// Splits on the first separator. The right segment is ignored when the
/// schema has no sort key, and a sort key with no right segment is left out.
pub fn decode(item_id: &str, schema: &KeySchema) -> Result<KeyMap, CodecError> {
    let (left, right) = match item_id.split_once(ID_SEPARATOR) {
        Some((left, right)) => (left, Some(right)),
        None => (item_id, None),
    };

    let mut key = KeyMap::new();
    key.insert(
        schema.partition_key.name.clone(),
        typed_segment(&schema.partition_key, left)?,
    );

    if let (Some(sort_attr), Some(right)) = (&schema.sort_key, right) {
        key.insert(sort_attr.name.clone(), typed_segment(sort_attr, right)?);
    }

    Ok(key)
}

/// Annotate an item with its computed id under [`ID_FIELD`].
pub fn with_id(mut item: Item, schema: &KeySchema) -> Item {
    let id = encode(&item, schema);
    item.insert(ID_FIELD.to_string(), AttributeValue::String(id));
    item
}

fn typed_segment(attr: &KeyAttribute, segment: &str) -> Result<AttributeValue, CodecError> {
    match attr.attribute_type {
        KeyAttributeType::String => Ok(AttributeValue::String(segment.to_string())),
        KeyAttributeType::Number => segment
            .parse::<serde_json::Number>()
            .map(AttributeValue::Number)
            .map_err(|_| CodecError::MalformedSegment {
                attribute: attr.name.clone(),
                value: segment.to_string(),
            }),
    }
}
