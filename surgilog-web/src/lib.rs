//! surgilog-web library - HTTP service for the surgical training logbook
//!
//! Exposes the router and application state so integration tests can drive
//! the service without binding a socket.

pub mod api;
pub mod db;
pub mod error;

pub use crate::error::{ApiError, ApiResult};

use axum::Router;
use sqlx::SqlitePool;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }
}

/// Build application router
///
/// Protected routes sit behind the session auth middleware; the login
/// endpoint, health check and static UI are public.
pub fn build_router(state: AppState) -> Router {
    use axum::middleware;
    use axum::routing::{get, post};

    // Protected routes (require a valid session)
    let protected = Router::new()
        .route("/api/logout", post(api::auth::logout))
        .route("/api/me", get(api::auth::current_user))
        .route("/api/users", get(api::users::list_users).post(api::users::create_user))
        .route(
            "/api/users/:guid",
            get(api::users::get_user)
                .put(api::users::update_user)
                .delete(api::users::delete_user),
        )
        .route("/api/areas", get(api::areas::list_areas).post(api::areas::create_area))
        .route(
            "/api/areas/:guid",
            get(api::areas::get_area)
                .put(api::areas::update_area)
                .delete(api::areas::delete_area),
        )
        .route("/api/areas/:guid/residents", post(api::areas::add_resident))
        .route("/api/areas/:guid/teachers", post(api::areas::add_teacher))
        .route(
            "/api/residents",
            get(api::residents::list_residents).post(api::residents::create_resident),
        )
        .route(
            "/api/residents/:guid",
            get(api::residents::get_resident)
                .put(api::residents::update_resident)
                .delete(api::residents::delete_resident),
        )
        .route("/api/residents/:guid/move", post(api::residents::move_resident))
        .route("/api/residents/:guid/records", get(api::records::list_by_resident))
        .route(
            "/api/teachers",
            get(api::teachers::list_teachers).post(api::teachers::create_teacher),
        )
        .route(
            "/api/teachers/:guid",
            get(api::teachers::get_teacher)
                .put(api::teachers::update_teacher)
                .delete(api::teachers::delete_teacher),
        )
        .route("/api/teachers/:guid/records", get(api::records::list_by_teacher))
        .route(
            "/api/surgeries",
            get(api::surgeries::list_surgeries).post(api::surgeries::create_surgery),
        )
        .route(
            "/api/surgeries/:guid",
            get(api::surgeries::get_surgery)
                .put(api::surgeries::update_surgery)
                .delete(api::surgeries::delete_surgery),
        )
        .route(
            "/api/records",
            get(api::records::list_records).post(api::records::create_record),
        )
        .route(
            "/api/records/:guid",
            get(api::records::get_record)
                .put(api::records::update_record)
                .delete(api::records::delete_record),
        )
        .route("/api/records/:guid/complete", post(api::records::complete_record))
        .route("/api/records/:guid/review", post(api::records::review_record))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::auth::auth_middleware,
        ));

    // Public routes (no authentication)
    let public = Router::new()
        .route("/", get(api::ui::serve_index))
        .route("/static/app.js", get(api::ui::serve_app_js))
        .route("/api/login", post(api::auth::login))
        .merge(api::health::health_routes());

    Router::new()
        .merge(protected)
        .merge(public)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}
