use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::features::reports::models::{Report, ReportPriority, ReportStatus};
use crate::features::sla::services::{SlaEvaluation, SlaStats};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlaStatusResponseDto {
    pub sla: SlaStats,
    pub is_monitoring_active: bool,
    pub check_interval_secs: u64,
}

/// SLA position of one report at request time
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SlaCheckResponseDto {
    pub report_id: Uuid,
    pub ticket_number: String,
    pub priority: ReportPriority,
    pub status: ReportStatus,
    pub breached: bool,
    pub hours_elapsed: f64,
    pub deadline_hours: i64,
    /// Negative once the deadline has passed
    pub hours_remaining: f64,
    pub deadline: DateTime<Utc>,
}

impl SlaCheckResponseDto {
    pub fn new(report: &Report, evaluation: &SlaEvaluation) -> Self {
        Self {
            report_id: report.id,
            ticket_number: report.ticket_number.clone(),
            priority: report.priority,
            status: report.status,
            breached: evaluation.breached,
            hours_elapsed: evaluation.hours_elapsed,
            deadline_hours: evaluation.deadline_hours,
            hours_remaining: evaluation.hours_remaining(),
            deadline: evaluation.deadline,
        }
    }
}
