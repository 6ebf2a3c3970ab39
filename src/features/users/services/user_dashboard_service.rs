use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use validator::ValidateEmail;

use crate::core::error::{AppError, Result};
use crate::features::analytics::services::metrics;
use crate::features::reports::models::{
    Report, ReportCategory, ReportPriority, ReportStatus,
};
use crate::features::reports::services::ReportRepository;

const RECENT_REPORTS: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct UserStatistics {
    pub total_reports: i64,
    pub resolved: i64,
    /// Reports still waiting in `submitted`
    pub pending: i64,
    pub in_progress: i64,
    pub avg_resolution_hours: i64,
    pub last_report_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RecentReport {
    pub ticket_number: String,
    pub category: ReportCategory,
    pub status: ReportStatus,
    pub priority: ReportPriority,
    pub address: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<&Report> for RecentReport {
    fn from(report: &Report) -> Self {
        Self {
            ticket_number: report.ticket_number.clone(),
            category: report.category,
            status: report.status,
            priority: report.priority,
            address: report.location.address.clone(),
            created_at: report.created_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserDashboard {
    pub email: String,
    pub statistics: UserStatistics,
    pub recent_reports: Vec<RecentReport>,
}

/// Builds the dashboard from one reporter's reports, given newest first
fn build_dashboard(email: &str, reports: &[Report]) -> UserDashboard {
    let summary = metrics::summary(reports);
    let resolution = metrics::resolution_metrics(reports);

    UserDashboard {
        email: email.to_string(),
        statistics: UserStatistics {
            total_reports: summary.total_reports,
            resolved: summary.resolved,
            pending: summary.submitted,
            in_progress: summary.in_progress,
            avg_resolution_hours: resolution.avg_resolution_hours,
            last_report_at: reports.iter().map(|r| r.created_at).max(),
        },
        recent_reports: reports
            .iter()
            .take(RECENT_REPORTS)
            .map(RecentReport::from)
            .collect(),
    }
}

/// Per-citizen view over the reports they filed
pub struct UserDashboardService {
    repository: Arc<dyn ReportRepository>,
}

impl UserDashboardService {
    pub fn new(repository: Arc<dyn ReportRepository>) -> Self {
        Self { repository }
    }

    /// A reporter with no reports gets a zeroed dashboard
    pub async fn dashboard(&self, email: &str) -> Result<UserDashboard> {
        let email = email.trim();
        if !email.validate_email() {
            return Err(AppError::BadRequest(format!(
                "Invalid reporter email: {}",
                email
            )));
        }

        let reports = self.repository.list_by_reporter(email).await?;
        tracing::debug!("Dashboard for {} covers {} reports", email, reports.len());

        Ok(build_dashboard(email, &reports))
    }
}
