// src/handlers/submissions.rs

use axum::{Extension, Json, extract::State, response::IntoResponse};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::submission::{DOC_TYPE_SUBMISSION, Scoring, SubmitRequest},
    name_key::name_key,
    state::AppState,
    submit::{AnswerSheet, Submitter, student_display_name, submit_answer_sheet},
    utils::jwt::Claims,
};

/// Student submits a scored answer sheet. Runs the whole pipeline: name
/// key, category resolution, scoring, durable submission write, best-effort
/// assignment reconciliation.
pub async fn submit(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<SubmitRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let store = state.store.as_ref();
    let display = student_display_name(store, &claims.sub, Some(&claims.email)).await?;
    let submitter = Submitter {
        uid: claims.sub.clone(),
        email: Some(claims.email.clone()),
        name: display,
    };
    let sheet = AnswerSheet {
        test_name: payload.test_name,
        test_id: payload.test_id,
        category_hint: payload.category_hint,
        grade: payload.grade,
        link: payload.link,
        count: payload.count,
        answers: payload.answers,
    };

    let outcome = submit_answer_sheet(store, &submitter, &sheet).await?;

    let message = match &outcome.scoring {
        Scoring::Ok { result, .. } => format!(
            "Answers saved. Correct: {}, wrong: {}, blank: {}.",
            result.correct_count, result.wrong_count, result.blank_count
        ),
        Scoring::MissingKey => {
            "Answers saved, but no answer key was found; the result could not be computed."
                .to_string()
        }
    };

    Ok(Json(json!({
        "submissionId": outcome.submission_id,
        "nameKey": outcome.name_key,
        "category": outcome.category,
        "scoring": outcome.scoring,
        "completedAssignments": outcome.completed_assignments,
        "warning": outcome.warning,
        "message": message,
    })))
}

/// The current student's submission history, stored documents returned verbatim.
pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let display = student_display_name(store, &claims.sub, Some(&claims.email)).await?;
    let partition = name_key(&display);

    let records = store
        .get_by_equality(&partition, "type", &json!(DOC_TYPE_SUBMISSION))
        .await?;
    let rows: Vec<_> = records.into_iter().map(super::with_meta).collect();
    Ok(Json(rows))
}

/// Aggregate totals over the student's scored submissions.
pub async fn summary(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let display = student_display_name(store, &claims.sub, Some(&claims.email)).await?;
    let partition = name_key(&display);

    let records = store
        .get_by_equality(&partition, "type", &json!(DOC_TYPE_SUBMISSION))
        .await?;

    let mut solved = 0u64;
    let (mut compared, mut correct, mut wrong, mut blank) = (0u64, 0u64, 0u64, 0u64);
    for record in &records {
        solved += 1;
        let scoring = &record.fields["scoring"];
        if scoring["status"] == "ok" {
            compared += scoring["compared"].as_u64().unwrap_or(0);
            correct += scoring["correctCount"].as_u64().unwrap_or(0);
            wrong += scoring["wrongCount"].as_u64().unwrap_or(0);
            blank += scoring["blankCount"].as_u64().unwrap_or(0);
        }
    }

    Ok(Json(json!({
        "solved": solved,
        "compared": compared,
        "correct": correct,
        "wrong": wrong,
        "blank": blank,
    })))
}
