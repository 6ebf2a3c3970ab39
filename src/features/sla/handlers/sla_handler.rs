use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::sla::dtos::{SlaCheckResponseDto, SlaStatusResponseDto};
use crate::features::sla::services::SlaService;
use crate::features::sla::workers::{SlaMonitor, SweepSummary};
use crate::shared::types::ApiResponse;

/// State for SLA handlers
#[derive(Clone)]
pub struct SlaState {
    pub sla_service: Arc<SlaService>,
    pub monitor: Arc<SlaMonitor>,
}

#[utoipa::path(
    get,
    path = "/api/admin/sla/status",
    responses(
        (status = 200, description = "SLA statistics and monitor state", body = ApiResponse<SlaStatusResponseDto>)
    ),
    tag = "sla"
)]
pub async fn get_sla_status(
    State(state): State<SlaState>,
) -> Result<Json<ApiResponse<SlaStatusResponseDto>>> {
    let sla = state.sla_service.stats(Utc::now()).await?;
    Ok(Json(ApiResponse::success(
        Some(SlaStatusResponseDto {
            sla,
            is_monitoring_active: state.monitor.is_running(),
            check_interval_secs: state.monitor.check_interval().as_secs(),
        }),
        None,
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/sla/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "SLA check result", body = ApiResponse<SlaCheckResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "sla"
)]
pub async fn check_report_sla(
    State(state): State<SlaState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SlaCheckResponseDto>>> {
    let (report, evaluation) = state.sla_service.check_report(id, Utc::now()).await?;
    Ok(Json(ApiResponse::success(
        Some(SlaCheckResponseDto::new(&report, &evaluation)),
        None,
        None,
    )))
}

/// Run one sweep now instead of waiting for the next tick
#[utoipa::path(
    post,
    path = "/api/admin/sla/sweep",
    responses(
        (status = 200, description = "Sweep completed", body = ApiResponse<SweepSummary>),
        (status = 409, description = "A sweep is already running")
    ),
    tag = "sla"
)]
pub async fn run_sla_sweep(
    State(state): State<SlaState>,
) -> Result<Json<ApiResponse<SweepSummary>>> {
    let summary = state
        .monitor
        .sweep(Utc::now())
        .await?
        .ok_or_else(|| AppError::Conflict("SLA sweep already in progress".to_string()))?;

    let message = format!(
        "{} breached, {} alerts sent, {} failed",
        summary.breached, summary.alerted, summary.failed
    );
    Ok(Json(ApiResponse::success(Some(summary), Some(message), None)))
}
