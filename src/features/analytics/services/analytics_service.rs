use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::metrics::{
    self, AnalyticsSummary, Breakdown, DepartmentStats, Hotspot, ResolutionMetrics, TrendPoint,
    WardStats,
};
use crate::core::error::Result;
use crate::features::reports::models::{ReportCategory, ReportFilter};
use crate::features::reports::services::ReportRepository;
use crate::features::sla::services::{SlaService, SlaStats};

/// Look-back window for dashboard queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum AnalyticsPeriod {
    #[serde(rename = "7d")]
    SevenDays,
    #[serde(rename = "30d")]
    ThirtyDays,
}

impl AnalyticsPeriod {
    pub fn duration(&self) -> Duration {
        match self {
            AnalyticsPeriod::SevenDays => Duration::days(7),
            AnalyticsPeriod::ThirtyDays => Duration::days(30),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct DashboardAnalytics {
    pub summary: AnalyticsSummary,
    pub breakdown: Breakdown,
    pub performance: ResolutionMetrics,
    pub trends: Vec<TrendPoint>,
    pub sla: SlaStats,
    pub generated_at: DateTime<Utc>,
}

pub struct AnalyticsService {
    repository: Arc<dyn ReportRepository>,
    sla_service: Arc<SlaService>,
}

impl AnalyticsService {
    pub fn new(repository: Arc<dyn ReportRepository>, sla_service: Arc<SlaService>) -> Self {
        Self {
            repository,
            sla_service,
        }
    }

    /// Dashboard over reports created within `period`, optionally narrowed to
    /// one department and/or ward. SLA stats always cover every open report.
    pub async fn dashboard(
        &self,
        period: AnalyticsPeriod,
        department: Option<String>,
        ward: Option<String>,
        now: DateTime<Utc>,
    ) -> Result<DashboardAnalytics> {
        let filter = ReportFilter {
            department,
            ward,
            ..Default::default()
        };

        let reports: Vec<_> = self
            .repository
            .list_created_since(Some(now - period.duration()))
            .await?
            .into_iter()
            .filter(|r| filter.matches(r))
            .collect();

        tracing::debug!("Computing analytics over {} reports", reports.len());

        Ok(DashboardAnalytics {
            summary: metrics::summary(&reports),
            breakdown: metrics::breakdown(&reports),
            performance: metrics::resolution_metrics(&reports),
            trends: metrics::trend(&reports, now),
            sla: self.sla_service.stats(now).await?,
            generated_at: now,
        })
    }

    pub async fn hotspots(
        &self,
        category: Option<ReportCategory>,
        timeframe: AnalyticsPeriod,
        min_reports: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<Hotspot>> {
        let reports = self
            .repository
            .list_created_since(Some(now - timeframe.duration()))
            .await?;

        Ok(metrics::hotspots(
            &metrics::filter_category(reports, category),
            min_reports.max(1),
        ))
    }

    /// Per-department stats over all reports, busiest first
    pub async fn department_stats(&self) -> Result<Vec<DepartmentStats>> {
        let reports = self.repository.list_created_since(None).await?;
        Ok(metrics::department_stats(&reports))
    }

    /// Per-ward stats over all reports, busiest first
    pub async fn ward_performance(&self) -> Result<Vec<WardStats>> {
        let reports = self.repository.list_created_since(None).await?;
        Ok(metrics::ward_stats(&reports))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::AppError;
    use crate::features::reports::models::{ReportPriority, ReportStatus};
    use crate::shared::test_helpers::{InMemoryReportRepository, ReportBuilder};

    fn service(repository: Arc<InMemoryReportRepository>) -> AnalyticsService {
        let sla = Arc::new(SlaService::new(repository.clone()));
        AnalyticsService::new(repository, sla)
    }

    #[tokio::test]
    async fn test_dashboard_respects_period_and_filters() {
        let now = Utc::now();
        let repository = Arc::new(InMemoryReportRepository::with_reports(vec![
            ReportBuilder::new(ReportCategory::Water)
                .ward("Ward 1")
                .created_at(now - Duration::days(2))
                .build(),
            ReportBuilder::new(ReportCategory::Water)
                .ward("Ward 2")
                .created_at(now - Duration::days(3))
                .build(),
            ReportBuilder::new(ReportCategory::Water)
                .ward("Ward 1")
                .created_at(now - Duration::days(20))
                .build(),
        ]));
        let service = service(repository);

        let week = service
            .dashboard(AnalyticsPeriod::SevenDays, None, None, now)
            .await
            .unwrap();
        assert_eq!(week.summary.total_reports, 2);

        let month_ward = service
            .dashboard(
                AnalyticsPeriod::ThirtyDays,
                None,
                Some("Ward 1".to_string()),
                now,
            )
            .await
            .unwrap();
        assert_eq!(month_ward.summary.total_reports, 2);
        assert_eq!(month_ward.trends.len(), 7);
        assert_eq!(month_ward.sla.total_active, 3);
    }

    #[tokio::test]
    async fn test_dashboard_includes_sla_breaches() {
        let now = Utc::now();
        let repository = Arc::new(InMemoryReportRepository::with_reports(vec![
            ReportBuilder::new(ReportCategory::Water)
                .priority(ReportPriority::Critical)
                .created_at(now - Duration::hours(5))
                .build(),
            ReportBuilder::new(ReportCategory::Water)
                .status(ReportStatus::Resolved)
                .build(),
        ]));

        let analytics = service(repository)
            .dashboard(AnalyticsPeriod::ThirtyDays, None, None, now)
            .await
            .unwrap();
        assert_eq!(analytics.sla.breach, 1);
        assert_eq!(analytics.sla.compliance_rate, 0);
        assert_eq!(analytics.summary.resolution_rate, 50);
    }

    #[tokio::test]
    async fn test_hotspots_filter_category_and_window() {
        let now = Utc::now();
        let repository = Arc::new(InMemoryReportRepository::with_reports(vec![
            ReportBuilder::new(ReportCategory::Garbage).created_at(now).build(),
            ReportBuilder::new(ReportCategory::Garbage).created_at(now).build(),
            ReportBuilder::new(ReportCategory::Pothole).created_at(now).build(),
            ReportBuilder::new(ReportCategory::Garbage)
                .created_at(now - Duration::days(10))
                .build(),
        ]));
        let service = service(repository);

        let all = service
            .hotspots(None, AnalyticsPeriod::SevenDays, 2, now)
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].count, 3);

        let garbage_month = service
            .hotspots(Some(ReportCategory::Garbage), AnalyticsPeriod::ThirtyDays, 2, now)
            .await
            .unwrap();
        assert_eq!(garbage_month[0].count, 3);
        assert_eq!(garbage_month[0].categories.len(), 1);
    }

    #[tokio::test]
    async fn test_repository_failure_propagates() {
        let repository = Arc::new(InMemoryReportRepository::new());
        repository.set_failing(true);
        let result = service(repository).department_stats().await;
        assert!(matches!(result, Err(AppError::Internal(_))));
    }

    #[test]
    fn test_period_wire_format() {
        let period: AnalyticsPeriod = serde_json::from_str("\"7d\"").unwrap();
        assert_eq!(period, AnalyticsPeriod::SevenDays);
        assert!(serde_json::from_str::<AnalyticsPeriod>("\"90d\"").is_err());
    }
}
