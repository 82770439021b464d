// src/catalog.rs

use serde_json::Value;

use crate::models::test::{SlideDoc, TestDoc, TestRow};
use crate::store::{partitions, DocumentStore, StoreError};

/// A test located by name, together with the category partition it lives in.
#[derive(Debug, Clone)]
pub struct ResolvedTest {
    pub category: String,
    pub id: String,
    pub test: TestDoc,
}

/// Trimmed, non-empty category names of a listing partition, in the order
/// the categories were created. Resolution priority depends on this order.
pub async fn category_names(
    store: &dyn DocumentStore,
    listing: &str,
) -> Result<Vec<String>, StoreError> {
    Ok(store
        .get_all(listing)
        .await?
        .iter()
        .filter_map(|record| record.str_field("name"))
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect())
}

/// Looks a test up by exact name inside a single category partition.
/// At most one record is considered; the first match wins.
pub async fn find_in_category(
    store: &dyn DocumentStore,
    category: &str,
    test_name: &str,
) -> Result<Option<ResolvedTest>, StoreError> {
    let hits = store
        .get_by_equality(category, "name", &Value::String(test_name.to_string()))
        .await?;
    Ok(hits.into_iter().next().and_then(|record| {
        let test: TestDoc = serde_json::from_value(record.fields).ok()?;
        Some(ResolvedTest {
            category: category.to_string(),
            id: record.id,
            test,
        })
    }))
}

/// Locates the category a named test belongs to.
///
/// A hinted category is tried first; otherwise every standard category is
/// scanned before any special category, each group in listing order, and
/// the first hit across the whole scan wins. Linear in the number of
/// categories, which stays small in practice.
pub async fn resolve_test(
    store: &dyn DocumentStore,
    test_name: &str,
    hint: Option<&str>,
) -> Result<Option<ResolvedTest>, StoreError> {
    if let Some(hinted) = hint {
        if let Some(hit) = find_in_category(store, hinted, test_name).await? {
            return Ok(Some(hit));
        }
    }

    for listing in [partitions::TEST_CATEGORIES, partitions::SPECIAL_CATEGORIES] {
        for category in category_names(store, listing).await? {
            if let Some(hit) = find_in_category(store, &category, test_name).await? {
                return Ok(Some(hit));
            }
        }
    }

    Ok(None)
}

async fn category_records(
    store: &dyn DocumentStore,
    category: &str,
    grade: Option<i64>,
) -> Result<Vec<crate::store::Record>, StoreError> {
    match grade {
        Some(g) => {
            store
                .get_by_equality(category, "grade", &Value::from(g))
                .await
        }
        None => store.get_all(category).await,
    }
}

/// Aggregates test rows across all standard and special categories,
/// standard group first, optionally filtered by grade.
pub async fn collect_tests(
    store: &dyn DocumentStore,
    grade: Option<i64>,
) -> Result<Vec<TestRow>, StoreError> {
    let mut rows = Vec::new();
    for (listing, is_special) in [
        (partitions::TEST_CATEGORIES, false),
        (partitions::SPECIAL_CATEGORIES, true),
    ] {
        for category in category_names(store, listing).await? {
            for record in category_records(store, &category, grade).await? {
                let Ok(test) = serde_json::from_value::<TestDoc>(record.fields) else {
                    continue;
                };
                rows.push(TestRow {
                    uid: format!("{category}__{}", record.id),
                    id: record.id,
                    name: test.name,
                    category: category.clone(),
                    grade: test.grade,
                    link: test.link,
                    question_count: test.question_count,
                    is_special,
                });
            }
        }
    }
    Ok(rows)
}

/// A slide with its category, for the student catalog.
#[derive(Debug, serde::Serialize)]
pub struct SlideRow {
    pub id: String,
    pub category: String,
    #[serde(flatten)]
    pub slide: SlideDoc,
}

/// Aggregates slides across slide categories, optionally by grade.
pub async fn collect_slides(
    store: &dyn DocumentStore,
    grade: Option<i64>,
) -> Result<Vec<SlideRow>, StoreError> {
    let mut rows = Vec::new();
    for category in category_names(store, partitions::SLIDE_CATEGORIES).await? {
        for record in category_records(store, &category, grade).await? {
            let Ok(slide) = serde_json::from_value::<SlideDoc>(record.fields) else {
                continue;
            };
            rows.push(SlideRow {
                id: record.id,
                category: category.clone(),
                slide,
            });
        }
    }
    Ok(rows)
}
