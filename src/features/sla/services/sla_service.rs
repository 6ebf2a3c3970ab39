use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::sla_policy::{evaluate, SlaEvaluation, SlaSubject};
use crate::core::error::{AppError, Result};
use crate::features::reports::models::Report;
use crate::features::reports::services::ReportRepository;

/// SLA counts over a set of open reports
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct SlaStats {
    /// Open and within deadline; always equal to `pending`
    pub compliant: i64,
    pub breach: i64,
    pub pending: i64,
    pub total_active: i64,
    /// Percentage of active reports not in breach, 100 when nothing is active
    pub compliance_rate: i64,
}

impl SlaStats {
    /// Pure computation; closed and resolved reports in `reports` are ignored
    pub fn compute(reports: &[Report], now: DateTime<Utc>) -> Self {
        let (breach, pending) = reports
            .iter()
            .filter(|r| r.status.is_open())
            .fold((0i64, 0i64), |(breach, pending), report| {
                if evaluate(&SlaSubject::from(report), now).breached {
                    (breach + 1, pending)
                } else {
                    (breach, pending + 1)
                }
            });

        let total_active = breach + pending;
        let compliance_rate = if total_active == 0 {
            100
        } else {
            (((total_active - breach) as f64 / total_active as f64) * 100.0).round() as i64
        };

        Self {
            compliant: pending,
            breach,
            pending,
            total_active,
            compliance_rate,
        }
    }
}

pub struct SlaService {
    repository: Arc<dyn ReportRepository>,
}

impl SlaService {
    pub fn new(repository: Arc<dyn ReportRepository>) -> Self {
        Self { repository }
    }

    /// Stats across every open report
    pub async fn stats(&self, now: DateTime<Utc>) -> Result<SlaStats> {
        let open = self.repository.list_open().await?;
        Ok(SlaStats::compute(&open, now))
    }

    /// On-demand check of one stored report
    pub async fn check_report(&self, id: Uuid, now: DateTime<Utc>) -> Result<(Report, SlaEvaluation)> {
        let report = self
            .repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))?;

        let evaluation = evaluate(&SlaSubject::from(&report), now);
        Ok((report, evaluation))
    }

    /// Open reports past their deadline, oldest first
    pub async fn breached_reports(&self, now: DateTime<Utc>) -> Result<Vec<(Report, SlaEvaluation)>> {
        let open = self.repository.list_open().await?;

        Ok(open
            .into_iter()
            .filter_map(|report| {
                let evaluation = evaluate(&SlaSubject::from(&report), now);
                evaluation.breached.then_some((report, evaluation))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::features::reports::models::{ReportCategory, ReportPriority, ReportStatus};
    use crate::shared::test_helpers::{InMemoryReportRepository, ReportBuilder};

    fn aged(priority: ReportPriority, status: ReportStatus, hours: i64) -> Report {
        ReportBuilder::new(ReportCategory::Pothole)
            .priority(priority)
            .status(status)
            .created_at(Utc::now() - Duration::hours(hours))
            .build()
    }

    #[test]
    fn test_stats_with_no_active_reports() {
        let stats = SlaStats::compute(&[], Utc::now());
        assert_eq!(stats.total_active, 0);
        assert_eq!(stats.compliance_rate, 100);
    }

    #[test]
    fn test_stats_counts_and_rate() {
        let now = Utc::now();
        let reports = vec![
            aged(ReportPriority::Critical, ReportStatus::Submitted, 5),
            aged(ReportPriority::High, ReportStatus::InProgress, 2),
            aged(ReportPriority::Low, ReportStatus::Acknowledged, 10),
            aged(ReportPriority::Critical, ReportStatus::Resolved, 50),
        ];

        let stats = SlaStats::compute(&reports, now);
        assert_eq!(stats.breach, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.compliant, stats.pending);
        assert_eq!(stats.total_active, 3);
        // 2/3 -> 66.67 -> 67
        assert_eq!(stats.compliance_rate, 67);
    }

    #[tokio::test]
    async fn test_breached_reports_skips_closed_and_fresh() {
        let breached = aged(ReportPriority::Critical, ReportStatus::Submitted, 6);
        let repo = Arc::new(InMemoryReportRepository::with_reports(vec![
            breached.clone(),
            aged(ReportPriority::Critical, ReportStatus::Closed, 6),
            aged(ReportPriority::Critical, ReportStatus::Submitted, 1),
        ]));
        let service = SlaService::new(repo);

        let found = service.breached_reports(Utc::now()).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].0.id, breached.id);
        assert_eq!(found[0].1.deadline_hours, 4);
    }

    #[tokio::test]
    async fn test_check_report_not_found() {
        let service = SlaService::new(Arc::new(InMemoryReportRepository::new()));
        let result = service.check_report(Uuid::now_v7(), Utc::now()).await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
