//! In-memory collaborators and builders shared by service, worker and router tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::Router;
use chrono::{DateTime, Utc};
use fake::faker::internet::en::SafeEmail;
use fake::faker::lorem::en::Sentence;
use fake::Fake;
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::analytics::AnalyticsService;
use crate::features::notifications::Notifier;
use crate::features::reports::models::{
    CreateReport, Report, ReportCategory, ReportFilter, ReportLocation, ReportPriority,
    ReportSeverity, ReportStatus, ReportTimelineEntry, RiskLevel, StatusChange,
};
use crate::features::reports::services::{
    PhotoKind, PhotoStorage, PhotoUpload, ReportRepository, ReportService,
};
use crate::features::sla::services::{InMemoryAlertStore, SlaEvaluation, SlaService};
use crate::features::sla::workers::SlaMonitor;
use crate::features::users::UserDashboardService;
use crate::shared::constants::TICKET_PREFIX;

static NEXT_TICKET: AtomicI64 = AtomicI64::new(1);

/// Builds a persisted-looking `Report` with sensible defaults
pub struct ReportBuilder {
    report: Report,
}

impl ReportBuilder {
    pub fn new(category: ReportCategory) -> Self {
        let now = Utc::now();
        let description: String = Sentence(6..12).fake();
        let seq = NEXT_TICKET.fetch_add(1, Ordering::Relaxed);

        Self {
            report: Report {
                id: Uuid::now_v7(),
                ticket_number: format!("{}{:06}", TICKET_PREFIX, seq),
                title: format!("{} report", category),
                description,
                category,
                severity: ReportSeverity::Medium,
                priority: ReportPriority::Medium,
                status: ReportStatus::Submitted,
                location: ReportLocation {
                    latitude: 12.9716,
                    longitude: 77.5946,
                    address: None,
                    ward: None,
                    pincode: None,
                },
                reported_by: SafeEmail().fake(),
                reporter_name: None,
                reporter_phone: None,
                is_anonymous: false,
                assigned_department: category.department().to_string(),
                assigned_to: None,
                resolution: None,
                photo_url: None,
                after_photo_url: None,
                priority_score: 50,
                risk_level: RiskLevel::Low,
                estimated_resolution: "72 hours".to_string(),
                rating: None,
                feedback: None,
                closed_at: None,
                closed_by: None,
                created_at: now,
                updated_at: now,
            },
        }
    }

    pub fn at(mut self, latitude: f64, longitude: f64) -> Self {
        self.report.location.latitude = latitude;
        self.report.location.longitude = longitude;
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.report.description = description.to_string();
        self
    }

    pub fn status(mut self, status: ReportStatus) -> Self {
        self.report.status = status;
        self
    }

    pub fn priority(mut self, priority: ReportPriority) -> Self {
        self.report.priority = priority;
        self
    }

    pub fn ward(mut self, ward: &str) -> Self {
        self.report.location.ward = Some(ward.to_string());
        self
    }

    pub fn department(mut self, department: &str) -> Self {
        self.report.assigned_department = department.to_string();
        self
    }

    pub fn reported_by(mut self, reported_by: &str) -> Self {
        self.report.reported_by = reported_by.to_string();
        self
    }

    /// Also moves `updated_at` so the report looks untouched since creation
    pub fn created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.report.created_at = created_at;
        self.report.updated_at = created_at;
        self
    }

    pub fn updated_at(mut self, updated_at: DateTime<Utc>) -> Self {
        self.report.updated_at = updated_at;
        self
    }

    pub fn build(self) -> Report {
        self.report
    }
}

/// Vec-backed repository mirroring the Postgres semantics
#[derive(Default)]
pub struct InMemoryReportRepository {
    reports: Mutex<Vec<Report>>,
    timeline: Mutex<Vec<ReportTimelineEntry>>,
    sequence: AtomicI64,
    failing: AtomicBool,
    failing_inserts: AtomicBool,
    interleaved_status: Mutex<Option<ReportStatus>>,
}

impl InMemoryReportRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reports(reports: Vec<Report>) -> Self {
        let repo = Self::new();
        *repo.reports.lock().unwrap() = reports;
        repo
    }

    /// Make every call fail with a database-style error
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make only `insert` fail
    pub fn set_failing_inserts(&self, failing: bool) {
        self.failing_inserts.store(failing, Ordering::SeqCst);
    }

    /// Another writer sets `status` on the target row right before the next status change lands
    pub fn interleave_status_write(&self, status: ReportStatus) {
        *self.interleaved_status.lock().unwrap() = Some(status);
    }

    pub fn all(&self) -> Vec<Report> {
        self.reports.lock().unwrap().clone()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            Err(AppError::Internal("repository unavailable".to_string()))
        } else {
            Ok(())
        }
    }

    fn push_timeline(&self, report_id: Uuid, status: ReportStatus, note: &str, updated_by: &str) {
        self.timeline.lock().unwrap().push(ReportTimelineEntry {
            id: Uuid::now_v7(),
            report_id,
            status,
            note: note.to_string(),
            updated_by: updated_by.to_string(),
            created_at: Utc::now(),
        });
    }
}

fn newest_first(mut reports: Vec<Report>) -> Vec<Report> {
    reports.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    reports
}

#[async_trait]
impl ReportRepository for InMemoryReportRepository {
    async fn next_ticket_number(&self) -> Result<String> {
        self.check()?;
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("{}{:06}", TICKET_PREFIX, seq))
    }

    async fn insert(&self, data: CreateReport) -> Result<Report> {
        self.check()?;
        if self.failing_inserts.load(Ordering::SeqCst) {
            return Err(AppError::Internal("insert rejected".to_string()));
        }
        let now = Utc::now();
        let report = Report {
            id: Uuid::now_v7(),
            ticket_number: data.ticket_number,
            title: data.title,
            description: data.description,
            category: data.category,
            severity: data.severity,
            priority: data.priority,
            status: ReportStatus::Submitted,
            location: data.location,
            reported_by: data.reported_by,
            reporter_name: data.reporter_name,
            reporter_phone: data.reporter_phone,
            is_anonymous: data.is_anonymous,
            assigned_department: data.assigned_department,
            assigned_to: None,
            resolution: None,
            photo_url: data.photo_url,
            after_photo_url: None,
            priority_score: data.priority_score,
            risk_level: data.risk_level,
            estimated_resolution: data.estimated_resolution,
            rating: None,
            feedback: None,
            closed_at: None,
            closed_by: None,
            created_at: now,
            updated_at: now,
        };

        self.reports.lock().unwrap().push(report.clone());
        self.push_timeline(
            report.id,
            ReportStatus::Submitted,
            "Report submitted",
            &report.reported_by,
        );
        Ok(report)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        self.check()?;
        Ok(self.all().into_iter().find(|r| r.id == id))
    }

    async fn list(
        &self,
        filter: &ReportFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Report>, i64)> {
        self.check()?;
        let matching = newest_first(
            self.all()
                .into_iter()
                .filter(|r| filter.matches(r))
                .collect(),
        );
        let total = matching.len() as i64;
        let page = matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_open_by_category(&self, category: ReportCategory) -> Result<Vec<Report>> {
        self.check()?;
        Ok(newest_first(
            self.all()
                .into_iter()
                .filter(|r| r.category == category && r.status.is_open())
                .collect(),
        ))
    }

    async fn list_open(&self) -> Result<Vec<Report>> {
        self.check()?;
        let mut open: Vec<Report> = self.all().into_iter().filter(|r| r.status.is_open()).collect();
        open.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(open)
    }

    async fn list_created_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Report>> {
        self.check()?;
        Ok(newest_first(
            self.all()
                .into_iter()
                .filter(|r| since.is_none_or(|s| r.created_at >= s))
                .collect(),
        ))
    }

    async fn list_by_reporter(&self, reported_by: &str) -> Result<Vec<Report>> {
        self.check()?;
        Ok(newest_first(
            self.all()
                .into_iter()
                .filter(|r| r.reported_by == reported_by)
                .collect(),
        ))
    }

    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> Result<Option<Report>> {
        self.check()?;
        let updated = {
            let mut reports = self.reports.lock().unwrap();
            let Some(report) = reports.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };

            if let Some(status) = self.interleaved_status.lock().unwrap().take() {
                report.status = status;
            }
            if let Some(status) = change.status {
                report.status = status;
            }
            if let Some(assigned_to) = &change.assigned_to {
                report.assigned_to = Some(assigned_to.clone());
            }
            if let Some(resolution) = &change.resolution {
                report.resolution = Some(resolution.clone());
            }
            if let Some(url) = &change.after_photo_url {
                report.after_photo_url = Some(url.clone());
            }
            if let Some(closing) = &change.closing {
                report.rating = closing.rating.or(report.rating);
                report.feedback = closing.feedback.clone().or(report.feedback.take());
                report.closed_by = Some(closing.closed_by.clone());
                report.closed_at = Some(closing.closed_at);
            }
            report.updated_at = Utc::now();
            report.clone()
        };

        self.push_timeline(id, updated.status, &change.note, &change.updated_by);
        Ok(Some(updated))
    }

    async fn timeline(&self, report_id: Uuid) -> Result<Vec<ReportTimelineEntry>> {
        self.check()?;
        Ok(self
            .timeline
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.report_id == report_id)
            .cloned()
            .collect())
    }
}

/// What a notifier was asked to send
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    Submitted(Uuid),
    Critical(Uuid),
    StatusUpdated {
        report_id: Uuid,
        previous: ReportStatus,
        current: ReportStatus,
        note: String,
    },
    SlaBreach(Uuid),
}

/// Records every notification; can be told to fail for specific reports
#[derive(Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<NotificationEvent>>,
    fail_for: Mutex<HashSet<Uuid>>,
    fail_all: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<NotificationEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn breach_alerts(&self) -> Vec<Uuid> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                NotificationEvent::SlaBreach(id) => Some(id),
                _ => None,
            })
            .collect()
    }

    pub fn fail_for(&self, report_id: Uuid) {
        self.fail_for.lock().unwrap().insert(report_id);
    }

    pub fn recover(&self, report_id: Uuid) {
        self.fail_for.lock().unwrap().remove(&report_id);
    }

    pub fn fail_all(&self) {
        self.fail_all.store(true, Ordering::SeqCst);
    }

    fn record(&self, report_id: Uuid, event: NotificationEvent) -> Result<()> {
        if self.fail_all.load(Ordering::SeqCst) || self.fail_for.lock().unwrap().contains(&report_id)
        {
            return Err(AppError::ExternalServiceError(
                "email provider unavailable".to_string(),
            ));
        }
        self.events.lock().unwrap().push(event);
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn report_submitted(&self, report: &Report) -> Result<()> {
        self.record(report.id, NotificationEvent::Submitted(report.id))
    }

    async fn critical_report(&self, report: &Report) -> Result<()> {
        self.record(report.id, NotificationEvent::Critical(report.id))
    }

    async fn status_updated(
        &self,
        report: &Report,
        previous: ReportStatus,
        note: &str,
    ) -> Result<()> {
        self.record(
            report.id,
            NotificationEvent::StatusUpdated {
                report_id: report.id,
                previous,
                current: report.status,
                note: note.to_string(),
            },
        )
    }

    async fn sla_breach(&self, report: &Report, _evaluation: &SlaEvaluation) -> Result<()> {
        self.record(report.id, NotificationEvent::SlaBreach(report.id))
    }
}

/// Keeps uploaded photos in memory and hands back `memory://` URLs
#[derive(Default)]
pub struct InMemoryPhotoStorage {
    stored: Mutex<Vec<(String, PhotoKind, PhotoUpload)>>,
    failing: AtomicBool,
}

impl InMemoryPhotoStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored_count(&self) -> usize {
        self.stored.lock().unwrap().len()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl PhotoStorage for InMemoryPhotoStorage {
    async fn store(
        &self,
        ticket_number: &str,
        kind: PhotoKind,
        photo: PhotoUpload,
    ) -> Result<String> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::ExternalServiceError(
                "storage unavailable".to_string(),
            ));
        }
        let key = photo.object_key("test", ticket_number, kind);
        self.stored
            .lock()
            .unwrap()
            .push((key.clone(), kind, photo));
        Ok(format!("memory://{}", key))
    }

    async fn remove(&self, url: &str) -> Result<()> {
        let key = url
            .strip_prefix("memory://")
            .ok_or_else(|| AppError::BadRequest(format!("Unknown photo url {}", url)))?;
        self.stored.lock().unwrap().retain(|(stored, _, _)| stored != key);
        Ok(())
    }
}

/// Everything a router or service test needs, wired against in-memory fakes
pub struct TestContext {
    pub repository: Arc<InMemoryReportRepository>,
    pub notifier: Arc<RecordingNotifier>,
    pub photos: Arc<InMemoryPhotoStorage>,
    pub report_service: Arc<ReportService>,
    pub sla_service: Arc<SlaService>,
    pub analytics_service: Arc<AnalyticsService>,
    pub user_dashboard_service: Arc<UserDashboardService>,
    pub monitor: Arc<SlaMonitor>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_reports(Vec::new())
    }

    pub fn with_reports(reports: Vec<Report>) -> Self {
        let repository = Arc::new(InMemoryReportRepository::with_reports(reports));
        let notifier = Arc::new(RecordingNotifier::new());
        let photos = Arc::new(InMemoryPhotoStorage::new());

        let report_service = Arc::new(ReportService::new(
            repository.clone(),
            notifier.clone(),
            photos.clone(),
        ));
        let sla_service = Arc::new(SlaService::new(repository.clone()));
        let analytics_service = Arc::new(AnalyticsService::new(
            repository.clone(),
            sla_service.clone(),
        ));
        let user_dashboard_service = Arc::new(UserDashboardService::new(repository.clone()));
        let monitor = Arc::new(SlaMonitor::new(
            sla_service.clone(),
            notifier.clone(),
            Arc::new(InMemoryAlertStore::new()),
            std::time::Duration::from_secs(1800),
        ));

        Self {
            repository,
            notifier,
            photos,
            report_service,
            sla_service,
            analytics_service,
            user_dashboard_service,
            monitor,
        }
    }

    /// Full application router (without swagger) over the in-memory fakes
    pub fn router(&self) -> Router {
        crate::features::reports::routes(self.report_service.clone())
            .merge(crate::features::analytics::routes(
                self.analytics_service.clone(),
            ))
            .merge(crate::features::sla::routes(
                self.sla_service.clone(),
                self.monitor.clone(),
            ))
            .merge(crate::features::users::routes(
                self.user_dashboard_service.clone(),
            ))
    }
}
