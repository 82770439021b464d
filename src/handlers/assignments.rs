// src/handlers/assignments.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    catalog,
    error::AppError,
    models::assignment::{
        AssignRequest, AssignmentDoc, DOC_TYPE_ASSIGNMENT, STATUS_ASSIGNED, TestSnapshot,
    },
    models::test::TestDoc,
    name_key::name_key,
    state::AppState,
    store::partitions,
    submit::student_display_name,
    utils::jwt::Claims,
};

/// Admin bulk-assign: one assignment document per student × test pair,
/// appended to each student's `<nameKey>_odevler` partition.
pub async fn assign_tests(
    State(state): State<AppState>,
    Json(payload): Json<AssignRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let store = state.store.as_ref();
    let special_categories =
        catalog::category_names(store, partitions::SPECIAL_CATEGORIES).await?;

    // Resolve every test reference up front so a bad id fails the request
    // before any assignment is written.
    let mut snapshots = Vec::with_capacity(payload.tests.len());
    for test_ref in &payload.tests {
        let record = store
            .get_single(&test_ref.category, &test_ref.id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!(
                    "Test '{}' not found in category '{}'",
                    test_ref.id, test_ref.category
                ))
            })?;
        let test: TestDoc = serde_json::from_value(record.fields)?;
        snapshots.push(TestSnapshot {
            id: test_ref.id.clone(),
            name: test.name,
            category: test_ref.category.clone(),
            grade: test.grade,
            link: test.link,
            question_count: test.question_count,
            is_special: special_categories.contains(&test_ref.category),
        });
    }

    let mut written = 0usize;
    for student in &payload.students {
        let key = name_key(student);
        let partition = partitions::assignments(&key);
        for snapshot in &snapshots {
            let doc = AssignmentDoc::new(snapshot.clone());
            store
                .append_record(&partition, serde_json::to_value(&doc)?)
                .await?;
            written += 1;
        }
    }

    tracing::info!(
        students = payload.students.len(),
        tests = snapshots.len(),
        written,
        "assignments written"
    );

    Ok(Json(json!({ "assigned": written })))
}

/// The current student's pending assignments. Primary tier filters on
/// type + status at once; on failure the broader type-only fetch is
/// filtered client-side, treating records without a status as pending.
pub async fn my_assignments(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let display = student_display_name(store, &claims.sub, Some(&claims.email)).await?;
    let partition = partitions::assignments(&name_key(&display));

    let records = match store
        .get_by_filters(
            &partition,
            &[
                ("type", json!(DOC_TYPE_ASSIGNMENT)),
                ("status", json!(STATUS_ASSIGNED)),
            ],
        )
        .await
    {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!(partition, %e, "falling back to type-only assignment fetch");
            store
                .get_by_equality(&partition, "type", &json!(DOC_TYPE_ASSIGNMENT))
                .await?
                .into_iter()
                .filter(|record| {
                    record
                        .str_field("status")
                        .is_none_or(|status| status == STATUS_ASSIGNED)
                })
                .collect()
        }
    };

    let rows: Vec<_> = records.into_iter().map(super::with_meta).collect();
    Ok(Json(rows))
}
