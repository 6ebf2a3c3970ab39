use utoipa::{Modify, OpenApi};

use crate::features::analytics::{
    dtos as analytics_dtos, handlers as analytics_handlers, services as analytics_services,
};
use crate::features::reports::{
    dtos as reports_dtos, handlers as reports_handlers, models as reports_models,
};
use crate::features::sla::{
    dtos as sla_dtos, handlers as sla_handlers, services as sla_services, workers as sla_workers,
};
use crate::features::users::{handlers as users_handlers, services as users_services};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Reports
        reports_handlers::submit_report,
        reports_handlers::list_reports,
        reports_handlers::get_report,
        reports_handlers::update_report,
        reports_handlers::close_report,
        reports_handlers::bulk_update_reports,
        // Analytics
        analytics_handlers::get_analytics,
        analytics_handlers::get_hotspots,
        analytics_handlers::get_department_stats,
        analytics_handlers::get_ward_performance,
        // SLA
        sla_handlers::get_sla_status,
        sla_handlers::check_report_sla,
        sla_handlers::run_sla_sweep,
        // Users
        users_handlers::get_user_dashboard,
    ),
    components(
        schemas(
            Meta,
            // Report models
            reports_models::ReportCategory,
            reports_models::ReportSeverity,
            reports_models::ReportPriority,
            reports_models::ReportStatus,
            reports_models::RiskLevel,
            reports_models::ReportLocation,
            reports_models::GeoPoint,
            // Report DTOs
            reports_dtos::SubmitLocationDto,
            reports_dtos::SubmitReportDto,
            reports_dtos::UpdateStatusDto,
            reports_dtos::CloseReportDto,
            reports_dtos::BulkUpdateDto,
            reports_dtos::ReportResponseDto,
            reports_dtos::TimelineEntryDto,
            reports_dtos::ReportDetailResponseDto,
            reports_dtos::SubmitReportResponseDto,
            reports_dtos::BulkUpdateResponseDto,
            ApiResponse<reports_dtos::SubmitReportResponseDto>,
            ApiResponse<Vec<reports_dtos::ReportResponseDto>>,
            ApiResponse<reports_dtos::ReportResponseDto>,
            ApiResponse<reports_dtos::ReportDetailResponseDto>,
            ApiResponse<reports_dtos::BulkUpdateResponseDto>,
            // Analytics
            analytics_services::AnalyticsPeriod,
            analytics_services::AnalyticsSummary,
            analytics_services::Breakdown,
            analytics_services::ResolutionMetrics,
            analytics_services::TrendPoint,
            analytics_services::Hotspot,
            analytics_services::DepartmentStats,
            analytics_services::WardStats,
            analytics_services::DashboardAnalytics,
            analytics_dtos::HotspotsResponseDto,
            analytics_dtos::DepartmentsResponseDto,
            analytics_dtos::WardsResponseDto,
            ApiResponse<analytics_services::DashboardAnalytics>,
            ApiResponse<analytics_dtos::HotspotsResponseDto>,
            ApiResponse<analytics_dtos::DepartmentsResponseDto>,
            ApiResponse<analytics_dtos::WardsResponseDto>,
            // SLA
            sla_services::SlaStats,
            sla_workers::SweepSummary,
            sla_dtos::SlaStatusResponseDto,
            sla_dtos::SlaCheckResponseDto,
            ApiResponse<sla_dtos::SlaStatusResponseDto>,
            ApiResponse<sla_dtos::SlaCheckResponseDto>,
            ApiResponse<sla_workers::SweepSummary>,
            // Users
            users_services::UserStatistics,
            users_services::RecentReport,
            users_services::UserDashboard,
            ApiResponse<users_services::UserDashboard>,
        )
    ),
    tags(
        (name = "reports", description = "Citizen report submission and lifecycle"),
        (name = "admin", description = "Admin analytics and bulk operations"),
        (name = "sla", description = "SLA statistics and breach monitoring"),
        (name = "users", description = "Citizen dashboard"),
    ),
    info(
        title = "Civic Report API",
        version = "0.1.0",
        description = "API documentation for the civic issue reporting backend",
    )
)]
pub struct ApiDoc;

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_every_route() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/reports/submit",
            "/api/reports/list",
            "/api/reports/{id}",
            "/api/reports/update/{id}",
            "/api/reports/close/{id}",
            "/api/admin/reports/bulk-update",
            "/api/admin/analytics",
            "/api/admin/hotspots",
            "/api/admin/departments/stats",
            "/api/admin/wards/performance",
            "/api/admin/sla/status",
            "/api/admin/sla/reports/{id}",
            "/api/admin/sla/sweep",
            "/api/users/dashboard/{email}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }

    #[test]
    fn test_info_modifier() {
        let mut doc = ApiDoc::openapi();
        SwaggerInfoModifier {
            title: "Ward Desk".to_string(),
            version: "2.0.0".to_string(),
            description: "Internal".to_string(),
        }
        .modify(&mut doc);
        assert_eq!(doc.info.title, "Ward Desk");
        assert_eq!(doc.info.description.as_deref(), Some("Internal"));
    }
}
