use std::sync::Arc;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::features::reports::handlers;
use crate::features::reports::services::ReportService;

/// Citizen-facing report routes plus the admin bulk update
pub fn routes(report_service: Arc<ReportService>) -> Router {
    Router::new()
        .route("/api/reports/submit", post(handlers::submit_report))
        .route("/api/reports/list", get(handlers::list_reports))
        .route("/api/reports/{id}", get(handlers::get_report))
        .route("/api/reports/update/{id}", put(handlers::update_report))
        .route("/api/reports/close/{id}", put(handlers::close_report))
        .route(
            "/api/admin/reports/bulk-update",
            put(handlers::bulk_update_reports),
        )
        .with_state(report_service)
}
