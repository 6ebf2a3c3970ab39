use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;

use crate::core::error::Result;
use crate::features::analytics::dtos::{
    AnalyticsQuery, DepartmentsResponseDto, HotspotQuery, HotspotsResponseDto, WardsResponseDto,
};
use crate::features::analytics::services::{AnalyticsService, DashboardAnalytics};
use crate::shared::types::ApiResponse;

#[utoipa::path(
    get,
    path = "/api/admin/analytics",
    params(AnalyticsQuery),
    responses(
        (status = 200, description = "Dashboard analytics", body = ApiResponse<DashboardAnalytics>),
        (status = 400, description = "Invalid period")
    ),
    tag = "admin"
)]
pub async fn get_analytics(
    State(service): State<Arc<AnalyticsService>>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<ApiResponse<DashboardAnalytics>>> {
    let analytics = service
        .dashboard(query.period, query.department, query.ward, Utc::now())
        .await?;
    Ok(Json(ApiResponse::success(Some(analytics), None, None)))
}

/// Report clusters for the map view
#[utoipa::path(
    get,
    path = "/api/admin/hotspots",
    params(HotspotQuery),
    responses(
        (status = 200, description = "Hotspots, largest first", body = ApiResponse<HotspotsResponseDto>)
    ),
    tag = "admin"
)]
pub async fn get_hotspots(
    State(service): State<Arc<AnalyticsService>>,
    Query(query): Query<HotspotQuery>,
) -> Result<Json<ApiResponse<HotspotsResponseDto>>> {
    let hotspots = service
        .hotspots(query.category, query.timeframe, query.min_reports, Utc::now())
        .await?;

    Ok(Json(ApiResponse::success(
        Some(HotspotsResponseDto {
            total_hotspots: hotspots.len(),
            hotspots,
            timeframe: query.timeframe,
            min_reports: query.min_reports,
        }),
        None,
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/departments/stats",
    responses(
        (status = 200, description = "Per-department performance", body = ApiResponse<DepartmentsResponseDto>)
    ),
    tag = "admin"
)]
pub async fn get_department_stats(
    State(service): State<Arc<AnalyticsService>>,
) -> Result<Json<ApiResponse<DepartmentsResponseDto>>> {
    let departments = service.department_stats().await?;
    Ok(Json(ApiResponse::success(
        Some(DepartmentsResponseDto {
            total_departments: departments.len(),
            departments,
        }),
        None,
        None,
    )))
}

#[utoipa::path(
    get,
    path = "/api/admin/wards/performance",
    responses(
        (status = 200, description = "Per-ward performance", body = ApiResponse<WardsResponseDto>)
    ),
    tag = "admin"
)]
pub async fn get_ward_performance(
    State(service): State<Arc<AnalyticsService>>,
) -> Result<Json<ApiResponse<WardsResponseDto>>> {
    let wards = service.ward_performance().await?;
    Ok(Json(ApiResponse::success(
        Some(WardsResponseDto {
            total_wards: wards.len(),
            wards,
        }),
        None,
        None,
    )))
}
