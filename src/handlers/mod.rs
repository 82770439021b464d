// src/handlers/mod.rs

pub mod admin;
pub mod assignments;
pub mod auth;
pub mod catalog;
pub mod reports;
pub mod submissions;

use serde_json::Value;

use crate::store::Record;

/// Flattens a record into one JSON object with `id` and `createdAt`
/// alongside the stored fields, the shape list endpoints return.
pub(crate) fn with_meta(record: Record) -> Value {
    let mut fields = record.fields;
    if let Some(object) = fields.as_object_mut() {
        object.insert("id".to_string(), Value::String(record.id));
        object.insert(
            "createdAt".to_string(),
            Value::String(record.created_at.to_rfc3339()),
        );
    }
    fields
}
