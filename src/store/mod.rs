// src/store/mod.rs

use async_trait::async_trait;
use serde_json::Value;
use std::fmt;

pub mod mem;
pub mod pg;

/// Well-known partition names. These are a schema-in-data convention shared
/// with the legacy data set and must not change.
pub mod partitions {
    /// Standard test category listing. Each record is `{name}`.
    pub const TEST_CATEGORIES: &str = "kategoriAdlari";
    /// Special ("yayın") test category listing. Each record is `{name}`.
    pub const SPECIAL_CATEGORIES: &str = "ozelKategoriler";
    /// Slide category listing. Each record is `{name, grade}`.
    pub const SLIDE_CATEGORIES: &str = "slaytKategoriAdlari";
    /// Student profiles, keyed by the stable auth user id.
    pub const STUDENTS: &str = "students";
    /// Per-student name index, one record per student (`{uid, fullname}`).
    pub const STUDENT_NAMES: &str = "ogrenciAdlari";

    /// Assignment partition for a student's name key.
    pub fn assignments(name_key: &str) -> String {
        format!("{name_key}_odevler")
    }
}

/// A single document fetched from a partition.
#[derive(Debug, Clone)]
pub struct Record {
    pub id: String,
    pub fields: Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl Record {
    /// Resolves a dotted field path (e.g. `"test.category"`) to a string value.
    pub fn str_field(&self, path: &str) -> Option<&str> {
        field_at(&self.fields, path).and_then(Value::as_str)
    }
}

/// Resolves a dotted path inside a JSON object.
pub fn field_at<'a>(fields: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(fields, |value, segment| value.get(segment))
}

#[derive(Debug)]
pub enum StoreError {
    /// The backend cannot execute the requested compound filter. Callers are
    /// expected to fall back to a broader fetch plus client-side filtering.
    UnsupportedFilter(String),
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::UnsupportedFilter(msg) => write!(f, "unsupported filter: {}", msg),
            StoreError::Backend(msg) => write!(f, "store backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// A single operation inside an atomic batch write.
#[derive(Debug, Clone)]
pub enum BatchOp {
    Put {
        partition: String,
        id: String,
        fields: Value,
    },
    Append {
        partition: String,
        fields: Value,
    },
}

/// Partition-addressed document storage.
///
/// Partitions are plain string keys and materialize implicitly on first
/// write. All list operations return records in insertion order; the
/// category resolver relies on that for its scan-order guarantee.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All records of a partition, insertion-ordered.
    async fn get_all(&self, partition: &str) -> Result<Vec<Record>, StoreError>;

    /// Records whose field at `field` (dotted path) equals `value`.
    async fn get_by_equality(
        &self,
        partition: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Record>, StoreError>;

    /// Records matching every equality filter at once. May fail with
    /// `StoreError::UnsupportedFilter`; see `reconcile` for the fallback tier.
    async fn get_by_filters(
        &self,
        partition: &str,
        filters: &[(&str, Value)],
    ) -> Result<Vec<Record>, StoreError>;

    /// Appends a new record with a generated id.
    async fn append_record(&self, partition: &str, fields: Value) -> Result<String, StoreError>;

    /// Writes a record under a caller-chosen id, replacing any existing one.
    async fn put_record(&self, partition: &str, id: &str, fields: Value)
        -> Result<(), StoreError>;

    /// Shallow-merges `fields` into an existing record.
    async fn update_fields(
        &self,
        partition: &str,
        id: &str,
        fields: Value,
    ) -> Result<(), StoreError>;

    async fn get_single(&self, partition: &str, id: &str) -> Result<Option<Record>, StoreError>;

    async fn count(&self, partition: &str) -> Result<i64, StoreError>;

    /// Applies all operations atomically.
    async fn write_batch(&self, ops: Vec<BatchOp>) -> Result<(), StoreError>;
}
