// src/store/pg.rs

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::PgPool;

use super::{BatchOp, DocumentStore, Record, StoreError};

/// Postgres-backed `DocumentStore`. All partitions share one `documents`
/// table; `fields` is a JSONB column, equality lookups use `#>>` path
/// extraction and compound filters use `@>` containment (GIN-indexed).
#[derive(Clone)]
pub struct PgDocStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct DocRow {
    id: String,
    fields: Value,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<DocRow> for Record {
    fn from(row: DocRow) -> Self {
        Record {
            id: row.id,
            fields: row.fields,
            created_at: row.created_at,
        }
    }
}

impl PgDocStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Text form a JSONB `#>>` extraction produces for a scalar.
fn text_form(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Builds the containment object for `@>` from dotted filter paths, e.g.
/// `[("status", "assigned"), ("test.name", "T")]` becomes
/// `{"status": "assigned", "test": {"name": "T"}}`.
fn containment(filters: &[(&str, Value)]) -> Value {
    let mut root = Map::new();
    for (path, value) in filters {
        let mut target = &mut root;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            if segments.peek().is_none() {
                target.insert(segment.to_string(), value.clone());
            } else {
                target = target
                    .entry(segment.to_string())
                    .or_insert_with(|| Value::Object(Map::new()))
                    .as_object_mut()
                    .expect("containment path segments are objects");
            }
        }
    }
    Value::Object(root)
}

fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

#[async_trait]
impl DocumentStore for PgDocStore {
    async fn get_all(&self, partition: &str) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, DocRow>(
            "SELECT id, fields, created_at FROM documents \
             WHERE partition = $1 ORDER BY created_at, id",
        )
        .bind(partition)
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn get_by_equality(
        &self,
        partition: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError> {
        let path: Vec<String> = field.split('.').map(String::from).collect();
        let rows = sqlx::query_as::<_, DocRow>(
            "SELECT id, fields, created_at FROM documents \
             WHERE partition = $1 AND fields #>> $2 = $3 ORDER BY created_at, id",
        )
        .bind(partition)
        .bind(&path)
        .bind(text_form(value))
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn get_by_filters(
        &self,
        partition: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Record>, StoreError> {
        let rows = sqlx::query_as::<_, DocRow>(
            "SELECT id, fields, created_at FROM documents \
             WHERE partition = $1 AND fields @> $2 ORDER BY created_at, id",
        )
        .bind(partition)
        .bind(containment(filters))
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(rows.into_iter().map(Record::from).collect())
    }

    async fn append_record(&self, partition: &str, fields: Value) -> Result<String, StoreError> {
        let id = uuid::Uuid::new_v4().to_string();
        sqlx::query("INSERT INTO documents (id, partition, fields) VALUES ($1, $2, $3)")
            .bind(&id)
            .bind(partition)
            .bind(fields)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;
        Ok(id)
    }

    async fn put_record(
        &self,
        partition: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO documents (id, partition, fields) VALUES ($1, $2, $3) \
             ON CONFLICT (id) DO UPDATE SET partition = EXCLUDED.partition, \
             fields = EXCLUDED.fields",
        )
        .bind(id)
        .bind(partition)
        .bind(fields)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(())
    }

    async fn update_fields(
        &self,
        partition: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET fields = fields || $3 WHERE partition = $1 AND id = $2",
        )
        .bind(partition)
        .bind(id)
        .bind(fields)
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Backend(format!("no record {partition}/{id}")));
        }
        Ok(())
    }

    async fn get_single(&self, partition: &str, id: &str) -> Result<Option<Record>, StoreError> {
        let row = sqlx::query_as::<_, DocRow>(
            "SELECT id, fields, created_at FROM documents WHERE partition = $1 AND id = $2",
        )
        .bind(partition)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;
        Ok(row.map(Record::from))
    }

    async fn count(&self, partition: &str) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM documents WHERE partition = $1")
            .bind(partition)
            .fetch_one(&self.pool)
            .await
            .map_err(backend_err)
    }

    async fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await.map_err(backend_err)?;
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
            sqlx::query(
                "INSERT INTO documents (id, partition, fields) VALUES ($1, $2, $3) \
                 ON CONFLICT (id) DO UPDATE SET partition = EXCLUDED.partition, \
                 fields = EXCLUDED.fields",
            )
            .bind(&id)
            .bind(&partition)
            .bind(&fields)
            .execute(&mut *tx)
            .await
            .map_err(backend_err)?;
        }
        tx.commit().await.map_err(backend_err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn containment_nests_dotted_paths() {
        let object = containment(&[
            ("status", json!("assigned")),
            ("test.category", json!("Matematik")),
            ("test.name", json!("Deneme-1")),
        ]);
        assert_eq!(
            object,
            json!({
                "status": "assigned",
                "test": {"category": "Matematik", "name": "Deneme-1"}
            })
        );
    }

    #[test]
    fn text_form_matches_jsonb_extraction() {
        assert_eq!(text_form(&json!("abc")), "abc");
        assert_eq!(text_form(&json!(5)), "5");
        assert_eq!(text_form(&json!(true)), "true");
    }
}
