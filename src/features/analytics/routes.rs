use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::analytics::handlers;
use crate::features::analytics::services::AnalyticsService;

/// Read-only admin dashboard routes
pub fn routes(analytics_service: Arc<AnalyticsService>) -> Router {
    Router::new()
        .route("/api/admin/analytics", get(handlers::get_analytics))
        .route("/api/admin/hotspots", get(handlers::get_hotspots))
        .route(
            "/api/admin/departments/stats",
            get(handlers::get_department_stats),
        )
        .route(
            "/api/admin/wards/performance",
            get(handlers::get_ward_performance),
        )
        .with_state(analytics_service)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::reports::models::{ReportCategory, ReportStatus};
    use crate::shared::test_helpers::{ReportBuilder, TestContext};

    fn seeded() -> TestContext {
        TestContext::with_reports(vec![
            ReportBuilder::new(ReportCategory::Garbage).ward("Ward 4").build(),
            ReportBuilder::new(ReportCategory::Garbage)
                .ward("Ward 4")
                .status(ReportStatus::Resolved)
                .build(),
            ReportBuilder::new(ReportCategory::Water).ward("Ward 9").build(),
        ])
    }

    #[tokio::test]
    async fn test_analytics_dashboard() {
        let ctx = seeded();
        let server = TestServer::new(ctx.router()).unwrap();

        let response = server
            .get("/api/admin/analytics")
            .add_query_param("period", "7d")
            .await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["summary"]["total_reports"], 3);
        assert_eq!(body["data"]["breakdown"]["by_category"]["garbage"], 2);
        assert_eq!(body["data"]["trends"].as_array().unwrap().len(), 7);
        assert_eq!(body["data"]["sla"]["total_active"], 2);
    }

    #[tokio::test]
    async fn test_unknown_period_is_rejected() {
        let ctx = seeded();
        let server = TestServer::new(ctx.router()).unwrap();
        server
            .get("/api/admin/analytics")
            .add_query_param("period", "90d")
            .await
            .assert_status_bad_request();
    }

    #[tokio::test]
    async fn test_hotspots_min_reports() {
        let ctx = seeded();
        let server = TestServer::new(ctx.router()).unwrap();

        let body: Value = server.get("/api/admin/hotspots").await.json();
        assert_eq!(body["data"]["total_hotspots"], 1);
        assert_eq!(body["data"]["hotspots"][0]["count"], 3);

        let body: Value = server
            .get("/api/admin/hotspots")
            .add_query_param("min_reports", 4)
            .await
            .json();
        assert_eq!(body["data"]["total_hotspots"], 0);
    }

    #[tokio::test]
    async fn test_departments_and_wards() {
        let ctx = seeded();
        let server = TestServer::new(ctx.router()).unwrap();

        let body: Value = server.get("/api/admin/departments/stats").await.json();
        assert_eq!(body["data"]["total_departments"], 2);
        assert_eq!(body["data"]["departments"][0]["name"], "Sanitation Department");
        assert_eq!(body["data"]["departments"][0]["resolution_rate"], 50);

        let body: Value = server.get("/api/admin/wards/performance").await.json();
        assert_eq!(body["data"]["wards"][0]["name"], "Ward 4");
        assert_eq!(body["data"]["wards"][0]["pending"], 1);
    }
}
