use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::reports::models::{Report, ReportStatus};
use crate::features::sla::services::SlaEvaluation;

/// Outbound notifications about report lifecycle events
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Confirmation to the reporter after a successful submission
    async fn report_submitted(&self, report: &Report) -> Result<()>;

    /// Alert to supervisors when a new report is classified critical
    async fn critical_report(&self, report: &Report) -> Result<()>;

    /// Tell the reporter their report moved from `previous` to its current status
    async fn status_updated(&self, report: &Report, previous: ReportStatus, note: &str)
        -> Result<()>;

    /// Escalation for an open report past its SLA deadline
    async fn sla_breach(&self, report: &Report, evaluation: &SlaEvaluation) -> Result<()>;
}

/// Used when no email provider is configured; every notification becomes a log line
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn report_submitted(&self, report: &Report) -> Result<()> {
        tracing::info!(
            "[notification] report {} submitted by {}",
            report.ticket_number,
            report.reported_by
        );
        Ok(())
    }

    async fn critical_report(&self, report: &Report) -> Result<()> {
        tracing::warn!(
            "[notification] CRITICAL {} report {} routed to {}",
            report.category,
            report.ticket_number,
            report.assigned_department
        );
        Ok(())
    }

    async fn status_updated(
        &self,
        report: &Report,
        previous: ReportStatus,
        note: &str,
    ) -> Result<()> {
        tracing::info!(
            "[notification] report {} status {} -> {}: {}",
            report.ticket_number,
            previous,
            report.status,
            note
        );
        Ok(())
    }

    async fn sla_breach(&self, report: &Report, evaluation: &SlaEvaluation) -> Result<()> {
        tracing::warn!(
            "[notification] SLA breach on {} ({} priority): {:.1}h elapsed, limit {}h",
            report.ticket_number,
            report.priority,
            evaluation.hours_elapsed,
            evaluation.deadline_hours
        );
        Ok(())
    }
}
