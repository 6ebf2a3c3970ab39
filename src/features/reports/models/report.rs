use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{ReportCategory, ReportLocation};

/// Report lifecycle status matching database enum
///
/// submitted -> acknowledged -> in-progress -> resolved | closed | rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_status", rename_all = "kebab-case")]
#[serde(rename_all = "kebab-case")]
pub enum ReportStatus {
    Submitted,
    Acknowledged,
    InProgress,
    Resolved,
    Closed,
    Rejected,
}

impl ReportStatus {
    /// Resolved and closed reports drop out of duplicate detection and SLA tracking.
    /// Rejected reports stay open.
    pub fn is_open(&self) -> bool {
        !matches!(self, ReportStatus::Resolved | ReportStatus::Closed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Submitted => "submitted",
            ReportStatus::Acknowledged => "acknowledged",
            ReportStatus::InProgress => "in-progress",
            ReportStatus::Resolved => "resolved",
            ReportStatus::Closed => "closed",
            ReportStatus::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// User-declared severity, an input to priority scoring
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema,
)]
#[sqlx(type_name = "report_severity", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportSeverity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl std::fmt::Display for ReportSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReportSeverity::Low => write!(f, "low"),
            ReportSeverity::Medium => write!(f, "medium"),
            ReportSeverity::High => write!(f, "high"),
            ReportSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Computed priority; written once at submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "report_priority", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl ReportPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPriority::Critical => "critical",
            ReportPriority::High => "high",
            ReportPriority::Medium => "medium",
            ReportPriority::Low => "low",
        }
    }

    /// Hex colour used by notification templates
    pub fn color(&self) -> &'static str {
        match self {
            ReportPriority::Critical => "#dc2626",
            ReportPriority::High => "#f59e0b",
            ReportPriority::Medium => "#3b82f6",
            ReportPriority::Low => "#10b981",
        }
    }
}

impl std::fmt::Display for ReportPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Risk tag derived from the analytics score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type, ToSchema)]
#[sqlx(type_name = "risk_level", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Database model for report
#[derive(Debug, Clone, FromRow)]
pub struct Report {
    pub id: Uuid,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub priority: ReportPriority,
    pub status: ReportStatus,
    #[sqlx(flatten)]
    pub location: ReportLocation,
    pub reported_by: String,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub is_anonymous: bool,
    pub assigned_department: String,
    pub assigned_to: Option<String>,
    pub resolution: Option<String>,
    pub photo_url: Option<String>,
    pub after_photo_url: Option<String>,
    pub priority_score: i32,
    pub risk_level: RiskLevel,
    pub estimated_resolution: String,
    pub rating: Option<i16>,
    pub feedback: Option<String>,
    pub closed_at: Option<DateTime<Utc>>,
    pub closed_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Report {
    /// Name shown to admins; hides the reporter for anonymous submissions
    pub fn display_reporter(&self) -> &str {
        if self.is_anonymous {
            "Anonymous"
        } else {
            self.reporter_name.as_deref().unwrap_or(&self.reported_by)
        }
    }
}

/// Data for creating a new report
#[derive(Debug, Clone)]
pub struct CreateReport {
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub priority: ReportPriority,
    pub location: ReportLocation,
    pub reported_by: String,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub is_anonymous: bool,
    pub assigned_department: String,
    pub photo_url: Option<String>,
    pub priority_score: i32,
    pub risk_level: RiskLevel,
    pub estimated_resolution: String,
}

/// Extra fields written when a report is closed
#[derive(Debug, Clone)]
pub struct ClosingDetails {
    pub rating: Option<i16>,
    pub feedback: Option<String>,
    pub closed_by: String,
    pub closed_at: DateTime<Utc>,
}

/// A status transition plus the fields that travel with it
#[derive(Debug, Clone)]
pub struct StatusChange {
    /// `None` keeps whatever status the row holds when the update runs
    pub status: Option<ReportStatus>,
    pub note: String,
    pub updated_by: String,
    pub assigned_to: Option<String>,
    pub resolution: Option<String>,
    pub after_photo_url: Option<String>,
    pub closing: Option<ClosingDetails>,
}
