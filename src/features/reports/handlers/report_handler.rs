use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use uuid::Uuid;

use crate::core::error::Result;
use crate::core::extractor::ValidatedJson;
use crate::features::reports::dtos::{
    BulkUpdateDto, BulkUpdateResponseDto, CloseReportDto, ReportDetailResponseDto,
    ReportListQuery, ReportResponseDto, SubmitReportDto, SubmitReportResponseDto,
    UpdateStatusDto,
};
use crate::features::reports::services::{ReportService, SubmissionOutcome};
use crate::shared::types::{ApiResponse, Meta};

/// Submit a new report
///
/// Returns 200 with the existing report when the submission duplicates an open one nearby.
#[utoipa::path(
    post,
    path = "/api/reports/submit",
    request_body = SubmitReportDto,
    responses(
        (status = 201, description = "Report created", body = ApiResponse<SubmitReportResponseDto>),
        (status = 200, description = "Duplicate of an existing open report", body = ApiResponse<SubmitReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 502, description = "Photo storage unavailable")
    ),
    tag = "reports"
)]
pub async fn submit_report(
    State(service): State<Arc<ReportService>>,
    ValidatedJson(dto): ValidatedJson<SubmitReportDto>,
) -> Result<(StatusCode, Json<ApiResponse<SubmitReportResponseDto>>)> {
    let outcome = service.submit(dto.into(), Utc::now()).await?;

    let response = match outcome {
        SubmissionOutcome::Created(report) => {
            let message = format!("Report {} submitted", report.ticket_number);
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    Some(SubmitReportResponseDto {
                        is_duplicate: false,
                        report: Some(report.into()),
                        existing_report: None,
                        similarity_score: None,
                        distance_meters: None,
                    }),
                    Some(message),
                    None,
                )),
            )
        }
        SubmissionOutcome::Duplicate {
            existing,
            similarity,
            distance_meters,
        } => {
            let message = format!(
                "A similar report ({}) is already open nearby",
                existing.ticket_number
            );
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    Some(SubmitReportResponseDto {
                        is_duplicate: true,
                        report: None,
                        existing_report: Some(existing.into()),
                        similarity_score: Some(similarity),
                        distance_meters: Some(distance_meters),
                    }),
                    Some(message),
                    None,
                )),
            )
        }
    };

    Ok(response)
}

#[utoipa::path(
    get,
    path = "/api/reports/list",
    params(ReportListQuery),
    responses(
        (status = 200, description = "Reports, newest first", body = ApiResponse<Vec<ReportResponseDto>>)
    ),
    tag = "reports"
)]
pub async fn list_reports(
    State(service): State<Arc<ReportService>>,
    Query(query): Query<ReportListQuery>,
) -> Result<Json<ApiResponse<Vec<ReportResponseDto>>>> {
    let pagination = query.pagination();
    let (reports, total) = service
        .list(&query.filter(), pagination.offset(), pagination.limit())
        .await?;

    let dtos: Vec<ReportResponseDto> = reports.into_iter().map(Into::into).collect();
    Ok(Json(ApiResponse::success(
        Some(dtos),
        None,
        Some(Meta::new(&pagination, total)),
    )))
}

#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ApiResponse<ReportDetailResponseDto>),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn get_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<ReportDetailResponseDto>>> {
    let (report, timeline) = service.get_detail(id).await?;
    let dto = ReportDetailResponseDto {
        report: report.into(),
        timeline: timeline.into_iter().map(Into::into).collect(),
    };
    Ok(Json(ApiResponse::success(Some(dto), None, None)))
}

#[utoipa::path(
    put,
    path = "/api/reports/update/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = UpdateStatusDto,
    responses(
        (status = 200, description = "Status updated", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn update_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<UpdateStatusDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.update_status(id, dto.into()).await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report updated successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    put,
    path = "/api/reports/close/{id}",
    params(
        ("id" = Uuid, Path, description = "Report ID")
    ),
    request_body = CloseReportDto,
    responses(
        (status = 200, description = "Report closed", body = ApiResponse<ReportResponseDto>),
        (status = 400, description = "Validation error"),
        (status = 404, description = "Report not found")
    ),
    tag = "reports"
)]
pub async fn close_report(
    State(service): State<Arc<ReportService>>,
    Path(id): Path<Uuid>,
    ValidatedJson(dto): ValidatedJson<CloseReportDto>,
) -> Result<Json<ApiResponse<ReportResponseDto>>> {
    let report = service.close(id, dto.into(), Utc::now()).await?;
    Ok(Json(ApiResponse::success(
        Some(report.into()),
        Some("Report closed successfully".to_string()),
        None,
    )))
}

#[utoipa::path(
    put,
    path = "/api/admin/reports/bulk-update",
    request_body = BulkUpdateDto,
    responses(
        (status = 200, description = "Per-report outcome counts", body = ApiResponse<BulkUpdateResponseDto>),
        (status = 400, description = "Validation error")
    ),
    tag = "admin"
)]
pub async fn bulk_update_reports(
    State(service): State<Arc<ReportService>>,
    ValidatedJson(dto): ValidatedJson<BulkUpdateDto>,
) -> Result<Json<ApiResponse<BulkUpdateResponseDto>>> {
    let outcome = service.bulk_update(dto.into()).await?;
    let message = format!(
        "{} of {} reports updated",
        outcome.successful, outcome.requested
    );
    Ok(Json(ApiResponse::success(
        Some(outcome.into()),
        Some(message),
        None,
    )))
}
