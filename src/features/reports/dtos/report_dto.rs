use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::features::reports::models::{
    Report, ReportCategory, ReportFilter, ReportLocation, ReportPriority, ReportSeverity,
    ReportStatus, ReportTimelineEntry, RiskLevel,
};
use crate::features::reports::services::{
    BulkUpdate, BulkUpdateOutcome, CloseRequest, NewReport, StatusUpdate,
};
use crate::shared::constants::DEFAULT_PAGE_SIZE;
use crate::shared::types::PaginationQuery;
use crate::shared::validation::PINCODE_REGEX;

// =============================================================================
// REQUEST DTOs
// =============================================================================

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct SubmitLocationDto {
    #[validate(range(min = -90.0, max = 90.0, message = "Latitude must be between -90 and 90"))]
    pub latitude: f64,

    #[validate(range(
        min = -180.0,
        max = 180.0,
        message = "Longitude must be between -180 and 180"
    ))]
    pub longitude: f64,

    #[validate(length(max = 200, message = "Address must not exceed 200 characters"))]
    pub address: Option<String>,

    #[validate(length(max = 50, message = "Ward must not exceed 50 characters"))]
    pub ward: Option<String>,

    #[validate(regex(path = *PINCODE_REGEX, message = "Pincode must be 6 digits"))]
    pub pincode: Option<String>,
}

impl From<SubmitLocationDto> for ReportLocation {
    fn from(dto: SubmitLocationDto) -> Self {
        Self {
            latitude: dto.latitude,
            longitude: dto.longitude,
            address: dto.address,
            ward: dto.ward,
            pincode: dto.pincode,
        }
    }
}

fn validate_category_present(dto: &SubmitReportDto) -> Result<(), ValidationError> {
    if dto.resolved_category().is_none() {
        let mut err = ValidationError::new("category_required");
        err.message = Some("Either category or issueType is required".into());
        return Err(err);
    }
    Ok(())
}

/// Citizen submission payload
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[validate(schema(function = "validate_category_present"))]
pub struct SubmitReportDto {
    #[validate(length(min = 5, max = 100, message = "Title must be 5-100 characters"))]
    pub title: Option<String>,

    #[validate(length(
        min = 10,
        max = 1000,
        message = "Description must be 10-1000 characters"
    ))]
    pub description: String,

    pub category: Option<ReportCategory>,

    /// Alias of `category` kept for older clients
    #[serde(rename = "issueType", alias = "issue_type")]
    pub issue_type: Option<ReportCategory>,

    pub severity: Option<ReportSeverity>,

    #[validate(nested)]
    pub location: SubmitLocationDto,

    /// Base64 image, optionally as a `data:` URL
    pub photo: Option<String>,

    #[validate(email(message = "Invalid email format"))]
    pub reported_by: String,

    #[validate(length(min = 2, max = 50, message = "Name must be 2-50 characters"))]
    pub reporter_name: Option<String>,

    #[validate(length(min = 7, max = 20, message = "Phone must be 7-20 characters"))]
    pub reporter_phone: Option<String>,

    #[serde(default)]
    pub is_anonymous: bool,
}

impl SubmitReportDto {
    /// `category` wins when both are present
    pub fn resolved_category(&self) -> Option<ReportCategory> {
        self.category.or(self.issue_type)
    }
}

impl From<SubmitReportDto> for NewReport {
    fn from(dto: SubmitReportDto) -> Self {
        let category = dto.resolved_category().unwrap_or(ReportCategory::Other);
        Self {
            title: dto.title,
            description: dto.description,
            category,
            severity: dto.severity,
            location: dto.location.into(),
            photo: dto.photo,
            reported_by: dto.reported_by,
            reporter_name: dto.reporter_name,
            reporter_phone: dto.reporter_phone,
            is_anonymous: dto.is_anonymous,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct UpdateStatusDto {
    pub status: ReportStatus,

    #[validate(length(max = 500, message = "Note must not exceed 500 characters"))]
    pub note: Option<String>,

    #[validate(length(min = 1, max = 100, message = "updated_by must be 1-100 characters"))]
    pub updated_by: Option<String>,

    #[validate(length(max = 100, message = "assigned_to must not exceed 100 characters"))]
    pub assigned_to: Option<String>,

    #[validate(length(max = 1000, message = "Resolution must not exceed 1000 characters"))]
    pub resolution: Option<String>,

    /// Base64 photo of the completed work
    pub after_photo: Option<String>,
}

impl From<UpdateStatusDto> for StatusUpdate {
    fn from(dto: UpdateStatusDto) -> Self {
        Self {
            status: dto.status,
            note: dto.note,
            updated_by: dto.updated_by,
            assigned_to: dto.assigned_to,
            resolution: dto.resolution,
            after_photo: dto.after_photo,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate, ToSchema)]
pub struct CloseReportDto {
    #[validate(length(max = 1000, message = "Resolution must not exceed 1000 characters"))]
    pub resolution: Option<String>,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: Option<i16>,

    #[validate(length(max = 1000, message = "Feedback must not exceed 1000 characters"))]
    pub feedback: Option<String>,

    #[validate(length(min = 1, max = 100, message = "closed_by must be 1-100 characters"))]
    pub closed_by: Option<String>,
}

impl From<CloseReportDto> for CloseRequest {
    fn from(dto: CloseReportDto) -> Self {
        Self {
            resolution: dto.resolution,
            rating: dto.rating,
            feedback: dto.feedback,
            closed_by: dto.closed_by,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BulkUpdateDto {
    #[validate(length(min = 1, message = "Report IDs are required"))]
    pub report_ids: Vec<Uuid>,

    pub status: Option<ReportStatus>,

    #[validate(length(max = 500, message = "Note must not exceed 500 characters"))]
    pub note: Option<String>,

    pub updated_by: Option<String>,
}

impl From<BulkUpdateDto> for BulkUpdate {
    fn from(dto: BulkUpdateDto) -> Self {
        Self {
            report_ids: dto.report_ids,
            status: dto.status,
            note: dto.note,
            updated_by: dto.updated_by,
        }
    }
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

/// Query params for listing reports
#[derive(Debug, Clone, Deserialize, IntoParams)]
pub struct ReportListQuery {
    /// Page number (1-indexed)
    #[serde(default = "default_page")]
    #[param(minimum = 1)]
    pub page: i64,
    /// Items per page
    #[serde(default = "default_page_size")]
    #[param(minimum = 1, maximum = 100)]
    pub page_size: i64,
    pub status: Option<ReportStatus>,
    pub category: Option<ReportCategory>,
    pub priority: Option<ReportPriority>,
    /// Exact department name
    pub department: Option<String>,
    pub reported_by: Option<String>,
    pub ward: Option<String>,
    /// Created at or after (RFC 3339)
    pub start_date: Option<DateTime<Utc>>,
    /// Created at or before (RFC 3339)
    pub end_date: Option<DateTime<Utc>>,
}

impl ReportListQuery {
    pub fn pagination(&self) -> PaginationQuery {
        PaginationQuery {
            page: self.page,
            page_size: self.page_size,
        }
    }

    pub fn filter(&self) -> ReportFilter {
        ReportFilter {
            status: self.status,
            category: self.category,
            priority: self.priority,
            department: self.department.clone(),
            reported_by: self.reported_by.clone(),
            ward: self.ward.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
        }
    }
}

// =============================================================================
// RESPONSE DTOs
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportResponseDto {
    pub id: Uuid,
    pub ticket_number: String,
    pub title: String,
    pub description: String,
    pub category: ReportCategory,
    pub severity: ReportSeverity,
    pub priority: ReportPriority,
    pub status: ReportStatus,
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

impl From<Report> for ReportResponseDto {
    fn from(r: Report) -> Self {
        Self {
            id: r.id,
            ticket_number: r.ticket_number,
            title: r.title,
            description: r.description,
            category: r.category,
            severity: r.severity,
            priority: r.priority,
            status: r.status,
            location: r.location,
            reported_by: r.reported_by,
            reporter_name: r.reporter_name,
            reporter_phone: r.reporter_phone,
            is_anonymous: r.is_anonymous,
            assigned_department: r.assigned_department,
            assigned_to: r.assigned_to,
            resolution: r.resolution,
            photo_url: r.photo_url,
            after_photo_url: r.after_photo_url,
            priority_score: r.priority_score,
            risk_level: r.risk_level,
            estimated_resolution: r.estimated_resolution,
            rating: r.rating,
            feedback: r.feedback,
            closed_at: r.closed_at,
            closed_by: r.closed_by,
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TimelineEntryDto {
    pub status: ReportStatus,
    pub note: String,
    pub updated_by: String,
    pub created_at: DateTime<Utc>,
}

impl From<ReportTimelineEntry> for TimelineEntryDto {
    fn from(t: ReportTimelineEntry) -> Self {
        Self {
            status: t.status,
            note: t.note,
            updated_by: t.updated_by,
            created_at: t.created_at,
        }
    }
}

/// Report with its status history, oldest entry first
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ReportDetailResponseDto {
    #[serde(flatten)]
    pub report: ReportResponseDto,
    pub timeline: Vec<TimelineEntryDto>,
}

/// Outcome of a submission. Exactly one of `report` and `existing_report` is set.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponseDto {
    pub is_duplicate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReportResponseDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub existing_report: Option<ReportResponseDto>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkUpdateResponseDto {
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
}

impl From<BulkUpdateOutcome> for BulkUpdateResponseDto {
    fn from(o: BulkUpdateOutcome) -> Self {
        Self {
            requested: o.requested,
            successful: o.successful,
            failed: o.failed,
        }
    }
}
