// src/handlers/reports.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use serde_json::json;

use crate::{
    error::AppError,
    models::submission::DOC_TYPE_SUBMISSION,
    name_key::name_key,
    state::AppState,
    store::{DocumentStore, Record, partitions},
};

async fn student_submissions(
    store: &dyn DocumentStore,
    key: &str,
) -> Result<Vec<Record>, AppError> {
    Ok(store
        .get_by_equality(key, "type", &json!(DOC_TYPE_SUBMISSION))
        .await?)
}

/// Per-student submission aggregates for every student in the name index.
pub async fn list_reports(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let mut rows = Vec::new();
    for entry in store.get_all(partitions::STUDENT_NAMES).await? {
        let Some(fullname) = entry.str_field("fullname") else {
            continue;
        };
        let key = name_key(fullname);

        let submissions = student_submissions(store, &key).await?;
        let (mut correct, mut wrong, mut blank) = (0u64, 0u64, 0u64);
        for record in &submissions {
            let scoring = &record.fields["scoring"];
            correct += scoring["correctCount"].as_u64().unwrap_or(0);
            wrong += scoring["wrongCount"].as_u64().unwrap_or(0);
            blank += scoring["blankCount"].as_u64().unwrap_or(0);
        }
        rows.push(json!({
            "nameKey": key,
            "submissions": submissions.len(),
            "correct": correct,
            "wrong": wrong,
            "blank": blank,
        }));
    }
    Ok(Json(rows))
}

/// Every submission of one student, scoring detail included.
pub async fn student_report(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    // Re-normalize so callers can pass either the raw name or the key.
    let key = name_key(&key);
    let records = student_submissions(state.store.as_ref(), &key).await?;
    let rows: Vec<_> = records.into_iter().map(super::with_meta).collect();
    Ok(Json(rows))
}
