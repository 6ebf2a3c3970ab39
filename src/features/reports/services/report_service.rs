use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use uuid::Uuid;

use super::duplicate_detector::{find_duplicate, DuplicateCandidate};
use super::photo::{decode_photo, PhotoKind, PhotoStorage};
use super::priority_classifier::{analytics_score, classify, risk_level, ClassificationInput};
use super::report_repository::ReportRepository;
use crate::core::error::{AppError, Result};
use crate::features::notifications::Notifier;
use crate::features::reports::models::{
    ClosingDetails, CreateReport, Report, ReportCategory, ReportFilter, ReportLocation,
    ReportPriority, ReportSeverity, ReportStatus, ReportTimelineEntry, StatusChange,
};
use crate::features::sla::services::estimated_resolution;
use crate::shared::constants::DESCRIPTION_EXCERPT_CHARS;

const DEFAULT_UPDATED_BY: &str = "system";
const DEFAULT_BULK_UPDATED_BY: &str = "admin";
const DEFAULT_CLOSE_RESOLUTION: &str = "Report closed";

/// A validated citizen submission
#[derive(Debug, Clone)]
pub struct NewReport {
    pub title: Option<String>,
    pub description: String,
    pub category: ReportCategory,
    pub severity: Option<ReportSeverity>,
    pub location: ReportLocation,
    /// Base64 or data URL
    pub photo: Option<String>,
    pub reported_by: String,
    pub reporter_name: Option<String>,
    pub reporter_phone: Option<String>,
    pub is_anonymous: bool,
}

/// Fields an operator may change together with the status
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub status: ReportStatus,
    pub note: Option<String>,
    pub updated_by: Option<String>,
    pub assigned_to: Option<String>,
    pub resolution: Option<String>,
    /// Base64 or data URL of the completed work
    pub after_photo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CloseRequest {
    pub resolution: Option<String>,
    pub rating: Option<i16>,
    pub feedback: Option<String>,
    pub closed_by: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BulkUpdate {
    pub report_ids: Vec<Uuid>,
    pub status: Option<ReportStatus>,
    pub note: Option<String>,
    pub updated_by: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BulkUpdateOutcome {
    pub requested: usize,
    pub successful: usize,
    pub failed: usize,
}

/// Result of a submission: either a new report or the open report it duplicates
#[derive(Debug, Clone)]
pub enum SubmissionOutcome {
    Created(Report),
    Duplicate {
        existing: Report,
        similarity: u8,
        distance_meters: f64,
    },
}

fn default_title(category: ReportCategory, description: &str) -> String {
    let excerpt: String = description.chars().take(DESCRIPTION_EXCERPT_CHARS).collect();
    format!("{} report - {}...", category, excerpt)
}

/// Service for report operations
pub struct ReportService {
    repository: Arc<dyn ReportRepository>,
    notifier: Arc<dyn Notifier>,
    photos: Arc<dyn PhotoStorage>,
}

impl ReportService {
    pub fn new(
        repository: Arc<dyn ReportRepository>,
        notifier: Arc<dyn Notifier>,
        photos: Arc<dyn PhotoStorage>,
    ) -> Self {
        Self {
            repository,
            notifier,
            photos,
        }
    }

    /// Classify, check for duplicates and persist a submission.
    ///
    /// Duplicates are checked against open reports of the same category,
    /// newest first, so the most recent qualifying report is returned.
    pub async fn submit(&self, input: NewReport, now: DateTime<Utc>) -> Result<SubmissionOutcome> {
        let photo = input.photo.as_deref().map(decode_photo).transpose()?;

        let classification_input = ClassificationInput {
            title: input.title.as_deref(),
            description: &input.description,
            category: input.category,
            severity: input.severity,
        };
        let classification = classify(&classification_input);
        let priority_score = analytics_score(&classification_input);

        let peers = self
            .repository
            .list_open_by_category(input.category)
            .await?;
        let candidate = DuplicateCandidate {
            category: input.category,
            point: input.location.point(),
            description: &input.description,
        };

        if let Some(found) = find_duplicate(&candidate, &peers, now) {
            tracing::info!(
                "Submission duplicates report {} (similarity {}, {:.0}m away)",
                found.report.ticket_number,
                found.similarity,
                found.distance_meters
            );
            return Ok(SubmissionOutcome::Duplicate {
                existing: found.report.clone(),
                similarity: found.similarity,
                distance_meters: found.distance_meters,
            });
        }

        let ticket_number = self.repository.next_ticket_number().await?;

        let photo_url = match photo {
            Some(photo) => Some(
                self.photos
                    .store(&ticket_number, PhotoKind::Before, photo)
                    .await?,
            ),
            None => None,
        };

        let title = input
            .title
            .unwrap_or_else(|| default_title(input.category, &input.description));

        let inserted = self
            .repository
            .insert(CreateReport {
                ticket_number,
                title,
                description: input.description,
                category: input.category,
                severity: input.severity.unwrap_or_default(),
                priority: classification.priority,
                location: input.location,
                reported_by: input.reported_by,
                reporter_name: input.reporter_name,
                reporter_phone: input.reporter_phone,
                is_anonymous: input.is_anonymous,
                assigned_department: input.category.department().to_string(),
                photo_url: photo_url.clone(),
                priority_score,
                risk_level: risk_level(priority_score),
                estimated_resolution: estimated_resolution(classification.priority).to_string(),
            })
            .await;

        let report = match inserted {
            Ok(report) => report,
            Err(e) => {
                if let Some(url) = &photo_url {
                    self.discard_photo(url).await;
                }
                return Err(e);
            }
        };

        self.notify_submitted(&report).await;

        Ok(SubmissionOutcome::Created(report))
    }

    /// Best-effort removal of a photo whose report write failed
    async fn discard_photo(&self, url: &str) {
        match self.photos.remove(url).await {
            Ok(()) => tracing::warn!("Removed photo {} after failed report write", url),
            Err(e) => tracing::error!("Orphaned photo {} could not be removed: {:?}", url, e),
        }
    }

    /// Notification failures are logged and never fail the submission
    async fn notify_submitted(&self, report: &Report) {
        if let Err(e) = self.notifier.report_submitted(report).await {
            tracing::warn!(
                "Failed to send confirmation for {}: {:?}",
                report.ticket_number,
                e
            );
        }

        if report.priority == ReportPriority::Critical {
            if let Err(e) = self.notifier.critical_report(report).await {
                tracing::warn!(
                    "Failed to send critical alert for {}: {:?}",
                    report.ticket_number,
                    e
                );
            }
        }
    }

    pub async fn list(
        &self,
        filter: &ReportFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Report>, i64)> {
        self.repository.list(filter, offset, limit).await
    }

    async fn get_by_id(&self, id: Uuid) -> Result<Report> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    /// Report plus its status history
    pub async fn get_detail(&self, id: Uuid) -> Result<(Report, Vec<ReportTimelineEntry>)> {
        let report = self.get_by_id(id).await?;
        let timeline = self.repository.timeline(id).await?;
        Ok((report, timeline))
    }

    async fn apply(&self, id: Uuid, change: &StatusChange) -> Result<Report> {
        self.repository
            .apply_status_change(id, change)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Report {} not found", id)))
    }

    async fn notify_status(&self, report: &Report, previous: ReportStatus, note: &str) {
        if let Err(e) = self.notifier.status_updated(report, previous, note).await {
            tracing::warn!(
                "Failed to send status update for {}: {:?}",
                report.ticket_number,
                e
            );
        }
    }

    pub async fn update_status(&self, id: Uuid, update: StatusUpdate) -> Result<Report> {
        let existing = self.get_by_id(id).await?;
        let previous = existing.status;

        let after_photo_url = match update.after_photo.as_deref() {
            Some(raw) => {
                let photo = decode_photo(raw)?;
                Some(
                    self.photos
                        .store(&existing.ticket_number, PhotoKind::After, photo)
                        .await?,
                )
            }
            None => None,
        };

        let note = update
            .note
            .unwrap_or_else(|| format!("Status changed from {} to {}", previous, update.status));

        let change = StatusChange {
            status: Some(update.status),
            note,
            updated_by: update
                .updated_by
                .unwrap_or_else(|| DEFAULT_UPDATED_BY.to_string()),
            assigned_to: update.assigned_to,
            resolution: update.resolution,
            after_photo_url,
            closing: None,
        };

        let report = match self.apply(id, &change).await {
            Ok(report) => report,
            Err(e) => {
                if let Some(url) = &change.after_photo_url {
                    self.discard_photo(url).await;
                }
                return Err(e);
            }
        };
        self.notify_status(&report, previous, &change.note).await;

        Ok(report)
    }

    pub async fn close(&self, id: Uuid, request: CloseRequest, now: DateTime<Utc>) -> Result<Report> {
        let existing = self.get_by_id(id).await?;

        if let Some(rating) = request.rating {
            if !(1..=5).contains(&rating) {
                return Err(AppError::Validation(
                    "rating: Rating must be between 1 and 5".to_string(),
                ));
            }
        }

        let resolution = request
            .resolution
            .unwrap_or_else(|| DEFAULT_CLOSE_RESOLUTION.to_string());
        let closed_by = request
            .closed_by
            .unwrap_or_else(|| DEFAULT_UPDATED_BY.to_string());

        let change = StatusChange {
            status: Some(ReportStatus::Closed),
            note: format!("Report closed. Resolution: {}", resolution),
            updated_by: closed_by.clone(),
            assigned_to: None,
            resolution: Some(resolution),
            after_photo_url: None,
            closing: Some(ClosingDetails {
                rating: request.rating,
                feedback: request.feedback,
                closed_by,
                closed_at: now,
            }),
        };

        let report = self.apply(id, &change).await?;
        self.notify_status(&report, existing.status, &change.note)
            .await;

        Ok(report)
    }

    /// Update each report independently; one failure never affects the others
    pub async fn bulk_update(&self, request: BulkUpdate) -> Result<BulkUpdateOutcome> {
        if request.report_ids.is_empty() {
            return Err(AppError::BadRequest("Report IDs are required".to_string()));
        }

        let updated_by = request
            .updated_by
            .unwrap_or_else(|| DEFAULT_BULK_UPDATED_BY.to_string());
        let note = request
            .note
            .unwrap_or_else(|| format!("Bulk update by {}", updated_by));

        let status = request.status;
        let results = join_all(request.report_ids.iter().map(|&id| {
            let note = note.clone();
            let updated_by = updated_by.clone();
            async move {
                let change = StatusChange {
                    status,
                    note,
                    updated_by,
                    assigned_to: None,
                    resolution: None,
                    after_photo_url: None,
                    closing: None,
                };
                self.apply(id, &change).await
            }
        }))
        .await;

        let mut successful = 0;
        for (id, result) in request.report_ids.iter().zip(results) {
            match result {
                Ok(_) => successful += 1,
                Err(e) => tracing::error!("Failed to update report {}: {:?}", id, e),
            }
        }

        let requested = request.report_ids.len();
        tracing::info!("Bulk update: {}/{} reports updated", successful, requested);

        Ok(BulkUpdateOutcome {
            requested,
            successful,
            failed: requested - successful,
        })
    }
}
