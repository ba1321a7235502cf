//! Dashboard API endpoints - JSON and SVG

use crate::chart::render_svg;
use crate::error::ApiError;
use crate::session::SESSION_COOKIE;
use crate::AppState;
use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Json;
use axum_extra::extract::cookie::CookieJar;
use axum_extra::extract::Query;
use salesdash_core::{build_loaded_view, CoreError, Dataset, FilterOptions, LoadedView, Selection, SelectionRequest};
use std::sync::Arc;

/// Dataset of an unlocked session, or the reason there is none
async fn session_dataset(state: &AppState, jar: &CookieJar) -> Result<Arc<Dataset>, ApiError> {
    let Some(session_id) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) else {
        return Err(ApiError::Unauthorized);
    };
    let session = state.sessions.get(&session_id).await;
    if !session.access.is_unlocked() {
        return Err(ApiError::Unauthorized);
    }
    session
        .upload
        .dataset()
        .cloned()
        .ok_or(ApiError::Core(CoreError::NotLoaded))
}

fn resolve(state: &AppState, request: &SelectionRequest, dataset: &Dataset) -> Selection {
    Selection::resolve(request, dataset, state.config.charts.default_chart_type)
}

/// Filter options for the session's dataset and the requested years
pub async fn api_options(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(request): Query<SelectionRequest>,
) -> Result<Json<FilterOptions>, ApiError> {
    let dataset = session_dataset(&state, &jar).await?;
    let selection = resolve(&state, &request, &dataset);
    Ok(Json(dataset.filter_options(&selection.years)))
}

/// Aggregated table, headline total and chart series for the query
pub async fn api_summary(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(request): Query<SelectionRequest>,
) -> Result<Json<LoadedView>, ApiError> {
    let dataset = session_dataset(&state, &jar).await?;
    let selection = resolve(&state, &request, &dataset);
    Ok(Json(build_loaded_view(&dataset, selection)))
}

/// Chart for the query as an SVG image
pub async fn chart_svg(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(request): Query<SelectionRequest>,
) -> Result<Response, ApiError> {
    let dataset = session_dataset(&state, &jar).await?;
    let selection = resolve(&state, &request, &dataset);
    let view = build_loaded_view(&dataset, selection);
    let svg = render_svg(&view.chart, &state.chart_style).map_err(|message| ApiError::InternalError { message })?;
    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg).into_response())
}
