use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

use super::ReportStatus;

/// One status-history row; appended on submission and on every status change
#[derive(Debug, Clone, FromRow)]
pub struct ReportTimelineEntry {
    pub id: Uuid,
    pub report_id: Uuid,
    pub status: ReportStatus,
    pub note: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
}
