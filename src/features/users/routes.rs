use std::sync::Arc;

use axum::{routing::get, Router};

use crate::features::users::handlers;
use crate::features::users::services::UserDashboardService;

pub fn routes(user_dashboard_service: Arc<UserDashboardService>) -> Router {
    Router::new()
        .route(
            "/api/users/dashboard/{email}",
            get(handlers::get_user_dashboard),
        )
        .with_state(user_dashboard_service)
}

#[cfg(test)]
mod tests {
    use axum_test::TestServer;
    use serde_json::Value;

    use crate::features::reports::models::{ReportCategory, ReportStatus};
    use crate::shared::test_helpers::{ReportBuilder, TestContext};

    #[tokio::test]
    async fn test_user_dashboard() {
        let ctx = TestContext::with_reports(vec![
            ReportBuilder::new(ReportCategory::Streetlight)
                .reported_by("asha@example.org")
                .build(),
            ReportBuilder::new(ReportCategory::Garbage)
                .reported_by("asha@example.org")
                .status(ReportStatus::Resolved)
                .build(),
            ReportBuilder::new(ReportCategory::Garbage)
                .reported_by("ravi@example.org")
                .build(),
        ]);
        let server = TestServer::new(ctx.router()).unwrap();

        let response = server.get("/api/users/dashboard/asha@example.org").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["data"]["email"], "asha@example.org");
        assert_eq!(body["data"]["statistics"]["total_reports"], 2);
        assert_eq!(body["data"]["statistics"]["resolved"], 1);
        assert_eq!(body["data"]["statistics"]["pending"], 1);
        assert_eq!(body["data"]["recent_reports"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_user_dashboard_bad_email() {
        let ctx = TestContext::new();
        let server = TestServer::new(ctx.router()).unwrap();
        server
            .get("/api/users/dashboard/nobody")
            .await
            .assert_status_bad_request();
    }
}
