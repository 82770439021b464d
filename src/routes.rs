// src/routes.rs

use std::sync::Arc;

use axum::{
    Router, http::Method, middleware,
    routing::{get, post},
};
use tower_governor::{
    GovernorLayer, governor::GovernorConfigBuilder, key_extractor::SmartIpKeyExtractor,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{admin, assignments, auth, catalog, reports, submissions},
    state::AppState,
    utils::jwt::{admin_middleware, auth_middleware},
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, catalog, assignments, submissions, admin).
/// * Applies global middleware (Trace, CORS) and a login rate limit.
/// * Injects global state (store, pool, config).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        "http://localhost:3000".parse().unwrap(),
        "http://127.0.0.1:3000".parse().unwrap(),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ]);

    let governor_conf = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .per_second(2)
        .burst_size(5)
        .finish()
        .expect("valid rate limit configuration");
    let governor_conf = Arc::new(governor_conf);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .layer(GovernorLayer::new(governor_conf));

    let student_routes = Router::new()
        .route("/catalog/tests", get(catalog::list_tests))
        .route("/catalog/slides", get(catalog::list_slides))
        .route("/assignments", get(assignments::my_assignments))
        .route(
            "/submissions",
            post(submissions::submit).get(submissions::history),
        )
        .route("/submissions/summary", get(submissions::summary))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let admin_routes = Router::new()
        .route("/stats", get(admin::stats))
        .route(
            "/students",
            get(admin::list_students).post(admin::create_student),
        )
        .route(
            "/categories/{group}",
            get(admin::list_categories).post(admin::create_category),
        )
        .route("/tests", get(admin::list_tests).post(admin::create_test))
        .route("/slides", post(admin::create_slide))
        .route("/assignments", post(assignments::assign_tests))
        .route("/reports", get(reports::list_reports))
        .route("/reports/{name_key}", get(reports::student_report))
        // Double middleware protection: Auth first, then Admin check
        .layer(middleware::from_fn(admin_middleware))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let api = Router::new()
        .nest("/auth", auth_routes)
        .nest("/admin", admin_routes)
        .merge(student_routes);

    Router::new()
        .nest("/api", api)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
