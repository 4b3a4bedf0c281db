//! HTTP routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::json;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::auth::AdminUser;
use crate::error::{ApiError, PageError};
use crate::state::AppState;
use crate::templates;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(dashboard))
        .route("/team/{team_id}", get(team_page))
        .route("/health", get(health))
        .route("/api/teams", get(api_teams))
        .route("/api/teams/{team_id}", get(api_team_detail))
        .route("/api/rosters", get(api_rosters))
        .route("/api/league", get(api_league))
        .route("/refresh", post(refresh))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Footer line for pages, e.g. "data cached 3 minutes ago".
async fn cache_footer(state: &AppState) -> Option<String> {
    let status = state.cache.status().await;
    status.age_display.map(|age| format!("data cached {}", age))
}

// ===== Pages =====

async fn dashboard(State(state): State<AppState>) -> Result<Html<String>, PageError> {
    let page_error = |e| PageError::new(&state.settings.app_title, e);

    let snapshot = state.cache.snapshot().await.map_err(page_error)?;
    let requirement = snapshot.requirement_for_week(&snapshot.meta.current_week);
    let teams = snapshot.teams_with_rosters();

    let content = templates::dashboard_content(&snapshot.meta, requirement, &teams);
    let footer = cache_footer(&state).await;
    Ok(Html(templates::base_template(
        &snapshot.meta.league_name,
        &state.settings.app_title,
        &content,
        footer.as_deref(),
    )))
}

async fn team_page(
    State(state): State<AppState>,
    Path(team_id): Path<u32>,
) -> Result<Html<String>, PageError> {
    let page_error = |e| PageError::new(&state.settings.app_title, e);

    let detail = state.cache.get_team_detail(team_id).await.map_err(page_error)?;
    let history = state
        .cache
        .get_rosters(Some(team_id))
        .await
        .map_err(page_error)?;

    let content = templates::team_content(&detail, &history);
    let footer = cache_footer(&state).await;
    Ok(Html(templates::base_template(
        detail.team.display_name(),
        &state.settings.app_title,
        &content,
        footer.as_deref(),
    )))
}

// ===== JSON =====

async fn health(State(state): State<AppState>) -> Response {
    match state.cache.get_league_meta().await {
        Ok(meta) => {
            let cache = state.cache.status().await;
            Json(json!({
                "status": "healthy",
                "league": meta.league_name,
                "week": meta.current_week,
                "cache": cache,
            }))
            .into_response()
        }
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

async fn api_teams(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let teams = state.cache.get_teams().await?;
    Ok(Json(json!({ "teams": teams })))
}

async fn api_team_detail(
    State(state): State<AppState>,
    WithRejection(Path(team_id), _): WithRejection<Path<u32>, ApiError>,
) -> Result<Json<playoffpurge_core::TeamDetail>, ApiError> {
    Ok(Json(state.cache.get_team_detail(team_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct RosterQuery {
    pub team_id: Option<u32>,
}

async fn api_rosters(
    State(state): State<AppState>,
    WithRejection(Query(query), _): WithRejection<Query<RosterQuery>, ApiError>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let rosters = state.cache.get_rosters(query.team_id).await?;
    Ok(Json(json!({ "rosters": rosters })))
}

async fn api_league(State(state): State<AppState>) -> Result<Json<serde_json::Value>, ApiError> {
    let snapshot = state.cache.snapshot().await?;
    Ok(Json(json!({
        "league": snapshot.meta,
        "roster_requirements": snapshot.requirements,
    })))
}

/// Drop the cached league and reload it from the sheet.
async fn refresh(State(state): State<AppState>, admin: AdminUser) -> Response {
    info!(username = %admin.username, "Manual cache refresh requested");
    state.cache.invalidate().await;

    match state.cache.refresh().await {
        Ok(snapshot) => Json(json!({
            "status": "success",
            "message": "Cache refreshed from Google Sheets.",
            "teams": snapshot.teams.len(),
        }))
        .into_response(),
        Err(e) => {
            error!(error = %e, kind = e.kind(), "Manual refresh failed");
            (
                StatusCode::BAD_GATEWAY,
                Json(json!({
                    "error": e.to_string(),
                    "kind": e.kind(),
                })),
            )
                .into_response()
        }
    }
}
