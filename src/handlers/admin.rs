// src/handlers/admin.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    catalog,
    error::AppError,
    models::category::{CategoryGroup, CreateCategoryRequest},
    models::test::{CreateSlideRequest, CreateTestRequest, SlideDoc, TestDoc},
    models::user::CreateStudentRequest,
    name_key::name_key,
    state::AppState,
    store::{BatchOp, partitions},
    utils::hash::hash_password,
};

/// System counters for the admin dashboard header. Tests are counted
/// across every standard and special category partition.
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let store = state.store.as_ref();
    let students = store.count(partitions::STUDENTS).await?;

    let mut tests = 0i64;
    for listing in [partitions::TEST_CATEGORIES, partitions::SPECIAL_CATEGORIES] {
        for category in catalog::category_names(store, listing).await? {
            tests += store.count(&category).await?;
        }
    }

    Ok(Json(json!({ "students": students, "tests": tests })))
}

/// Creates a student: credential row first, then profile document and
/// name-index row in one atomic batch. The profile is keyed by the stable
/// user id; the name key is only a derived projection.
pub async fn create_student(
    State(state): State<AppState>,
    Json(payload): Json<CreateStudentRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let email = payload.email.to_lowercase();
    let hashed_password = hash_password(&payload.password)?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (email, password, role) VALUES ($1, $2, 'student') RETURNING id",
    )
    .bind(&email)
    .bind(&hashed_password)
    .fetch_one(&state.pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("unique constraint") || e.to_string().contains("23505") {
            AppError::Conflict(format!("Email '{}' already exists", email))
        } else {
            tracing::error!("Failed to create student: {:?}", e);
            AppError::from(e)
        }
    })?;

    let uid = id.to_string();
    let key = name_key(&format!("{} {}", payload.first_name, payload.last_name));

    state
        .store
        .write_batch(vec![
            BatchOp::Put {
                partition: partitions::STUDENTS.to_string(),
                id: uid.clone(),
                fields: json!({
                    "email": email,
                    "firstName": payload.first_name,
                    "lastName": payload.last_name,
                }),
            },
            BatchOp::Put {
                partition: partitions::STUDENT_NAMES.to_string(),
                id: uid.clone(),
                fields: json!({ "uid": uid, "fullname": key }),
            },
        ])
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "uid": uid, "nameKey": key })),
    ))
}

/// Lists the per-student name-index rows.
pub async fn list_students(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let records = state.store.get_all(partitions::STUDENT_NAMES).await?;
    let rows: Vec<_> = records.into_iter().map(super::with_meta).collect();
    Ok(Json(rows))
}

fn group_from_path(segment: &str) -> Result<CategoryGroup, AppError> {
    CategoryGroup::from_segment(segment)
        .ok_or_else(|| AppError::NotFound(format!("Unknown category group '{}'", segment)))
}

/// Lists the categories of one group.
pub async fn list_categories(
    State(state): State<AppState>,
    Path(group): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let group = group_from_path(&group)?;
    let records = state.store.get_all(group.partition()).await?;
    let rows: Vec<_> = records.into_iter().map(super::with_meta).collect();
    Ok(Json(rows))
}

/// Creates a category in one group. Slide categories carry a grade, the
/// test groups must not.
pub async fn create_category(
    State(state): State<AppState>,
    Path(group): Path<String>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl IntoResponse, AppError> {
    let group = group_from_path(&group)?;
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let fields = match group {
        CategoryGroup::Slides => {
            let grade = payload.grade.ok_or_else(|| {
                AppError::BadRequest("Slide categories require a grade".to_string())
            })?;
            json!({ "name": payload.name, "grade": grade })
        }
        CategoryGroup::Tests | CategoryGroup::Special => {
            if payload.grade.is_some() {
                return Err(AppError::BadRequest(
                    "Test categories do not carry a grade".to_string(),
                ));
            }
            json!({ "name": payload.name })
        }
    };

    let id = state.store.append_record(group.partition(), fields).await?;
    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

async fn ensure_category_listed(
    state: &AppState,
    listings: &[&str],
    category: &str,
) -> Result<(), AppError> {
    for listing in listings {
        let names = catalog::category_names(state.store.as_ref(), listing).await?;
        if names.iter().any(|name| name == category) {
            return Ok(());
        }
    }
    Err(AppError::BadRequest(format!(
        "Category '{}' does not exist",
        category
    )))
}

/// Creates a test inside a (standard or special) category partition. The
/// answer key alphabet and key-length == question-count invariants are
/// enforced here, not by the store.
pub async fn create_test(
    State(state): State<AppState>,
    Json(payload): Json<CreateTestRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_category_listed(
        &state,
        &[partitions::TEST_CATEGORIES, partitions::SPECIAL_CATEGORIES],
        &payload.category,
    )
    .await?;

    let doc = TestDoc {
        name: payload.name,
        grade: Some(payload.grade),
        link: payload.link,
        question_count: Some(payload.question_count),
        answer_key: Some(payload.answer_key.to_uppercase()),
    };
    let id = state
        .store
        .append_record(&payload.category, serde_json::to_value(&doc)?)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// Creates a slide inside a slide-category partition.
pub async fn create_slide(
    State(state): State<AppState>,
    Json(payload): Json<CreateSlideRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    ensure_category_listed(&state, &[partitions::SLIDE_CATEGORIES], &payload.category).await?;

    let doc = SlideDoc {
        name: payload.name,
        grade: payload.grade,
        link: payload.link,
    };
    let id = state
        .store
        .append_record(&payload.category, serde_json::to_value(&doc)?)
        .await?;

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

#[derive(Debug, Deserialize)]
pub struct GradeFilter {
    pub grade: Option<i64>,
}

/// Aggregated test listing across all categories for the assign screen.
pub async fn list_tests(
    State(state): State<AppState>,
    Query(filter): Query<GradeFilter>,
) -> Result<impl IntoResponse, AppError> {
    let rows = catalog::collect_tests(state.store.as_ref(), filter.grade).await?;
    Ok(Json(rows))
}
