//! Reports handlers

use axum::{extract::{Query, State}, Json};

use crate::{AppState, AppResult};
use crate::models::{Report, ReportFilter};
use crate::middleware::auth::AdminContext;

/// Report history, newest first
pub async fn list(
    State(state): State<AppState>,
    admin: AdminContext,
    Query(filter): Query<ReportFilter>,
) -> AppResult<Json<Vec<Report>>> {
    let reports = state.reports.list_recent(&filter).await?;
    tracing::debug!("Admin {} ({}) fetched {} reports", admin.email, admin.admin_id, reports.len());
    Ok(Json(reports))
}
