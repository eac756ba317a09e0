use std::io::Cursor;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use super::domain::{NewActivity, NewGroup, NewMoment};
use super::repository::SportRepository;
use super::service::{DashboardServiceError, SportDashService};
use super::status::NewStatus;
use super::window::WindowQuery;

/// Evaluation instant override; defaults to the current time.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct AtQuery {
    #[serde(default)]
    pub(crate) at: Option<DateTime<Utc>>,
}

impl AtQuery {
    fn instant(&self) -> DateTime<Utc> {
        self.at.unwrap_or_else(Utc::now)
    }
}

/// Router builder exposing the dashboard endpoints.
pub fn dashboard_router<R>(service: Arc<SportDashService<R>>) -> Router
where
    R: SportRepository + 'static,
{
    Router::new()
        .route(
            "/api/v1/groups",
            post(register_group_handler::<R>).get(list_groups_handler::<R>),
        )
        .route("/api/v1/statuses", post(record_status_handler::<R>))
        .route(
            "/api/v1/statuses/import",
            post(import_statuses_handler::<R>),
        )
        .route(
            "/api/v1/groups/:group/status",
            get(group_status_handler::<R>),
        )
        .route("/api/v1/status/overview", get(overview_handler::<R>))
        .route("/api/v1/moments", post(log_moment_handler::<R>))
        .route(
            "/api/v1/priority/extra-sport",
            get(priority_handler::<R>),
        )
        .route(
            "/api/v1/activities",
            post(schedule_activity_handler::<R>).get(list_activities_handler::<R>),
        )
        .with_state(service)
}

fn failure(error: DashboardServiceError) -> Response {
    let status = error.status_code();
    if status.is_server_error() {
        error!(%error, "dashboard request failed");
    }
    let payload = json!({
        "error": error.to_string(),
    });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn register_group_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    axum::Json(new_group): axum::Json<NewGroup>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.register_group(new_group) {
        Ok(group) => (StatusCode::CREATED, axum::Json(group)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn list_groups_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.groups() {
        Ok(groups) => (StatusCode::OK, axum::Json(groups)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn record_status_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    axum::Json(new_status): axum::Json<NewStatus>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.record_status(new_status) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn import_statuses_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    body: String,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.import_legacy_statuses(Cursor::new(body.into_bytes())) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn group_status_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    Path(group): Path<String>,
    Query(at): Query<AtQuery>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.group_status(&group, at.instant()) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn overview_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    Query(at): Query<AtQuery>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.status_overview(at.instant()) {
        Ok(overview) => (StatusCode::OK, axum::Json(overview)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn log_moment_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    axum::Json(new_moment): axum::Json<NewMoment>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.log_moment(new_moment) {
        Ok(moment) => (StatusCode::CREATED, axum::Json(moment)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn priority_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    Query(at): Query<AtQuery>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.extra_sport_priority(at.instant()) {
        Ok(entries) => (StatusCode::OK, axum::Json(entries)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn schedule_activity_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    axum::Json(new_activity): axum::Json<NewActivity>,
) -> Response
where
    R: SportRepository + 'static,
{
    match service.schedule_activity(new_activity) {
        Ok(activity) => (StatusCode::CREATED, axum::Json(activity)).into_response(),
        Err(error) => failure(error),
    }
}

pub(crate) async fn list_activities_handler<R>(
    State(service): State<Arc<SportDashService<R>>>,
    Query(query): Query<WindowQuery>,
) -> Response
where
    R: SportRepository + 'static,
{
    let result = service
        .window_from_query(&query)
        .and_then(|window| service.activities(&window).map(|activities| (window, activities)));

    match result {
        Ok((window, activities)) => (
            StatusCode::OK,
            axum::Json(json!({
                "window": window,
                "activities": activities,
            })),
        )
            .into_response(),
        Err(error) => failure(error),
    }
}
