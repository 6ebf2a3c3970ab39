//! SLA deadline table and the breach predicate.

use chrono::{DateTime, Duration, Utc};

use crate::features::reports::models::{Report, ReportPriority, ReportStatus};

const CRITICAL_DEADLINE_HOURS: i64 = 4;
const HIGH_DEADLINE_HOURS: i64 = 24;
const MEDIUM_DEADLINE_HOURS: i64 = 72;
const LOW_DEADLINE_HOURS: i64 = 168;

/// Resolution deadline for a priority; unknown priority falls back to medium
pub fn deadline_hours(priority: Option<ReportPriority>) -> i64 {
    match priority {
        Some(ReportPriority::Critical) => CRITICAL_DEADLINE_HOURS,
        Some(ReportPriority::High) => HIGH_DEADLINE_HOURS,
        Some(ReportPriority::Medium) | None => MEDIUM_DEADLINE_HOURS,
        Some(ReportPriority::Low) => LOW_DEADLINE_HOURS,
    }
}

/// Human-readable deadline stored on the report as `estimated_resolution`
pub fn estimated_resolution(priority: ReportPriority) -> &'static str {
    match priority {
        ReportPriority::Critical => "4 hours",
        ReportPriority::High => "24 hours",
        ReportPriority::Medium => "72 hours",
        ReportPriority::Low => "7 days",
    }
}

/// The three report fields the predicate reads
#[derive(Debug, Clone, Copy)]
pub struct SlaSubject {
    pub priority: Option<ReportPriority>,
    pub status: ReportStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&Report> for SlaSubject {
    fn from(report: &Report) -> Self {
        Self {
            priority: Some(report.priority),
            status: report.status,
            created_at: report.created_at,
        }
    }
}

/// Outcome of checking one report against its deadline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlaEvaluation {
    pub breached: bool,
    pub hours_elapsed: f64,
    pub deadline_hours: i64,
    pub deadline: DateTime<Utc>,
}

impl SlaEvaluation {
    /// Negative once the deadline has passed
    pub fn hours_remaining(&self) -> f64 {
        self.deadline_hours as f64 - self.hours_elapsed
    }
}

fn hours_between(from: DateTime<Utc>, to: DateTime<Utc>) -> f64 {
    (to - from).num_milliseconds() as f64 / 3_600_000.0
}

/// Closed and resolved reports never breach; open ones breach once the elapsed
/// time is strictly greater than their deadline.
pub fn is_breached(subject: &SlaSubject, now: DateTime<Utc>) -> bool {
    evaluate(subject, now).breached
}

pub fn evaluate(subject: &SlaSubject, now: DateTime<Utc>) -> SlaEvaluation {
    let deadline_hours = deadline_hours(subject.priority);
    let hours_elapsed = hours_between(subject.created_at, now);

    SlaEvaluation {
        breached: subject.status.is_open() && hours_elapsed > deadline_hours as f64,
        hours_elapsed,
        deadline_hours,
        deadline: subject.created_at + Duration::hours(deadline_hours),
    }
}
