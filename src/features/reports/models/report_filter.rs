use chrono::{DateTime, Utc};

use super::{Report, ReportCategory, ReportPriority, ReportStatus};

/// Listing filter; every `None` field matches everything
#[derive(Debug, Clone, Default)]
pub struct ReportFilter {
    pub status: Option<ReportStatus>,
    pub category: Option<ReportCategory>,
    pub priority: Option<ReportPriority>,
    pub department: Option<String>,
    pub reported_by: Option<String>,
    pub ward: Option<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

impl ReportFilter {
    /// In-memory equivalent of the SQL filter built by the repository
    pub fn matches(&self, report: &Report) -> bool {
        self.status.is_none_or(|s| report.status == s)
            && self.category.is_none_or(|c| report.category == c)
            && self.priority.is_none_or(|p| report.priority == p)
            && self
                .department
                .as_deref()
                .is_none_or(|d| report.assigned_department == d)
            && self
                .reported_by
                .as_deref()
                .is_none_or(|r| report.reported_by == r)
            && self
                .ward
                .as_deref()
                .is_none_or(|w| report.location.ward.as_deref() == Some(w))
            && self.start_date.is_none_or(|start| report.created_at >= start)
            && self.end_date.is_none_or(|end| report.created_at <= end)
    }
}
