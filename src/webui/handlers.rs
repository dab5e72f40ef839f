use super::{AppState, error::AppError, page};
use axum::{
    Json,
    extract::{Path, Query, State},
    response::Html,
};
use serde::Deserialize;
use sheetwise_core::{Group, Report, Section};
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct TabQuery {
    pub tab: Option<String>,
}

/// # GET /
/// The dashboard page. `?tab=<group>` picks the visible section.
pub async fn index(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TabQuery>,
) -> Result<Html<String>, AppError> {
    let report = state.build_report().await?;
    let active = query
        .tab
        .as_deref()
        .and_then(|t| Group::from_str(t).ok())
        .filter(|g| report.section(*g).is_some())
        .or_else(|| report.sections.first().map(|s| s.group));
    Ok(Html(page::render_page(&report, active)))
}

/// # GET /api/report
pub async fn report_json(State(state): State<Arc<AppState>>) -> Result<Json<Report>, AppError> {
    Ok(Json(state.build_report().await?))
}

/// # GET /api/sections/:group
pub async fn section_json(
    Path(group): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Section>, AppError> {
    let group = Group::from_str(&group)
        .map_err(|_| AppError::NotFound(format!("no dataset group named {group}")))?;
    let mut report = state.build_report().await?;
    let index = report
        .sections
        .iter()
        .position(|s| s.group == group)
        .ok_or_else(|| AppError::NotFound(format!("{group} is not configured")))?;
    Ok(Json(report.sections.swap_remove(index)))
}
