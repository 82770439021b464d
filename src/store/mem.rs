// src/store/mem.rs

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{field_at, BatchOp, DocumentStore, Record, StoreError};

/// In-memory `DocumentStore` used by the test suites. Records are kept in
/// insertion order per partition, matching the Postgres backend's
/// `ORDER BY created_at, id` scans.
pub struct MemStore {
    partitions: RwLock<HashMap<String, Vec<Record>>>,
    compound_filters: bool,
}

impl MemStore {
    pub fn new() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            compound_filters: true,
        }
    }

    /// A store whose `get_by_filters` always reports `UnsupportedFilter`,
    /// forcing callers onto the client-side fallback tier.
    pub fn without_compound_filters() -> Self {
        Self {
            partitions: RwLock::new(HashMap::new()),
            compound_filters: false,
        }
    }

    fn matches(record: &Record, field: &str, value: &Value) -> bool {
        field_at(&record.fields, field).is_some_and(|actual| actual == value)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemStore {
    async fn get_all(&self, partition: &str) -> Result<Vec<Record>, StoreError> {
        let guard = self.partitions.read().await;
        Ok(guard.get(partition).cloned().unwrap_or_default())
    }

    async fn get_by_equality(
        &self,
        partition: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError> {
        let guard = self.partitions.read().await;
        Ok(guard
            .get(partition)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| Self::matches(r, field, value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn get_by_filters(
        &self,
        partition: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Record>, StoreError> {
        if !self.compound_filters {
            return Err(StoreError::UnsupportedFilter(
                "compound filters disabled".to_string(),
            ));
        }
        let guard = self.partitions.read().await;
        Ok(guard
            .get(partition)
            .map(|records| {
                records
                    .iter()
                    .filter(|r| filters.iter().all(|(f, v)| Self::matches(r, f, v)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn append_record(&self, partition: &str, fields: Value) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.put_record(partition, &id, fields).await?;
        Ok(id)
    }

    async fn put_record(
        &self,
        partition: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.partitions.write().await;
        let records = guard.entry(partition.to_string()).or_default();
        let record = Record {
            id: id.to_string(),
            fields,
            created_at: chrono::Utc::now(),
        };
        match records.iter_mut().find(|r| r.id == id) {
            Some(existing) => existing.fields = record.fields,
            None => records.push(record),
        }
        Ok(())
    }

    async fn update_fields(
        &self,
        partition: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let mut guard = self.partitions.write().await;
        let record = guard
            .get_mut(partition)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| StoreError::Backend(format!("no record {partition}/{id}")))?;
        if let (Some(target), Some(updates)) = (record.fields.as_object_mut(), fields.as_object())
        {
            for (key, value) in updates {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn get_single(&self, partition: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let guard = self.partitions.read().await;
        Ok(guard
            .get(partition)
            .and_then(|records| records.iter().find(|r| r.id == id).cloned()))
    }

    async fn count(&self, partition: &str) -> Result<i64, StoreError> {
        let guard = self.partitions.read().await;
        Ok(guard.get(partition).map_or(0, |records| records.len() as i64))
    }

    async fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        // Single lock acquisition keeps the batch atomic against readers.
        let mut guard = self.partitions.write().await;
        for op in ops {
            let (partition, id, fields) = match op {
                BatchOp::Put {
                    partition,
                    id,
                    fields,
                } => (partition, id, fields),
                BatchOp::Append { partition, fields } => {
                    (partition, uuid::Uuid::new_v4().to_string(), fields)
                }
            };
            let records = guard.entry(partition).or_default();
            match records.iter_mut().find(|r| r.id == id) {
                Some(existing) => existing.fields = fields,
                None => records.push(Record {
                    id,
                    fields,
                    created_at: chrono::Utc::now(),
                }),
            }
        }
        Ok(())
    }
}
