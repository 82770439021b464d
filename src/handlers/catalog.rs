// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};

use crate::{catalog, error::AppError, handlers::admin::GradeFilter, state::AppState};

/// Grade-filtered test listing for the student dashboard.
pub async fn list_tests(
    State(state): State<AppState>,
    Query(filter): Query<GradeFilter>,
) -> Result<impl IntoResponse, AppError> {
    let rows = catalog::collect_tests(state.store.as_ref(), filter.grade).await?;
    Ok(Json(rows))
}

/// Grade-filtered slide listing for the student dashboard.
pub async fn list_slides(
    State(state): State<AppState>,
    Query(filter): Query<GradeFilter>,
) -> Result<impl IntoResponse, AppError> {
    let rows = catalog::collect_slides(state.store.as_ref(), filter.grade).await?;
    Ok(Json(rows))
}
