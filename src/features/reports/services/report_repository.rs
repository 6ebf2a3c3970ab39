use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::core::error::{AppError, Result};
use crate::features::reports::models::{
    CreateReport, Report, ReportCategory, ReportFilter, ReportTimelineEntry, StatusChange,
};
use crate::shared::constants::TICKET_PREFIX;

/// Persistence seam for reports and their status timeline
#[async_trait]
pub trait ReportRepository: Send + Sync {
    /// Next ticket number, e.g. `CE000042`
    async fn next_ticket_number(&self) -> Result<String>;

    /// Insert a report together with its initial `submitted` timeline entry
    async fn insert(&self, data: CreateReport) -> Result<Report>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>>;

    /// One page of reports matching `filter`, newest first, plus the total match count
    async fn list(&self, filter: &ReportFilter, offset: i64, limit: i64)
        -> Result<(Vec<Report>, i64)>;

    /// Open reports of one category, newest first
    async fn list_open_by_category(&self, category: ReportCategory) -> Result<Vec<Report>>;

    /// Every open report, oldest first
    async fn list_open(&self) -> Result<Vec<Report>>;

    /// Reports created at or after `since` (all when `None`), newest first
    async fn list_created_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Report>>;

    /// Reports filed by one reporter, newest first
    async fn list_by_reporter(&self, reported_by: &str) -> Result<Vec<Report>>;

    /// Apply a status change and append the matching timeline entry.
    /// Returns `None` when the report does not exist.
    async fn apply_status_change(&self, id: Uuid, change: &StatusChange)
        -> Result<Option<Report>>;

    /// Timeline entries of a report, oldest first
    async fn timeline(&self, report_id: Uuid) -> Result<Vec<ReportTimelineEntry>>;
}

const REPORT_COLUMNS: &str = r#"
    id, ticket_number, title, description, category, severity, priority, status,
    latitude, longitude, address, ward, pincode,
    reported_by, reporter_name, reporter_phone, is_anonymous,
    assigned_department, assigned_to, resolution, photo_url, after_photo_url,
    priority_score, risk_level, estimated_resolution,
    rating, feedback, closed_at, closed_by, created_at, updated_at
"#;

const OPEN_STATUS_CLAUSE: &str = "status NOT IN ('resolved', 'closed')";

/// PostgreSQL-backed report repository
pub struct PgReportRepository {
    pool: PgPool,
}

impl PgReportRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn push_filters<'a>(builder: &mut QueryBuilder<'a, Postgres>, filter: &'a ReportFilter) {
        if let Some(status) = filter.status {
            builder.push(" AND status = ").push_bind(status);
        }
        if let Some(category) = filter.category {
            builder.push(" AND category = ").push_bind(category);
        }
        if let Some(priority) = filter.priority {
            builder.push(" AND priority = ").push_bind(priority);
        }
        if let Some(department) = filter.department.as_deref() {
            builder
                .push(" AND assigned_department = ")
                .push_bind(department);
        }
        if let Some(reported_by) = filter.reported_by.as_deref() {
            builder.push(" AND reported_by = ").push_bind(reported_by);
        }
        if let Some(ward) = filter.ward.as_deref() {
            builder.push(" AND ward = ").push_bind(ward);
        }
        if let Some(start) = filter.start_date {
            builder.push(" AND created_at >= ").push_bind(start);
        }
        if let Some(end) = filter.end_date {
            builder.push(" AND created_at <= ").push_bind(end);
        }
    }
}

#[async_trait]
impl ReportRepository for PgReportRepository {
    async fn next_ticket_number(&self) -> Result<String> {
        let seq: i64 = sqlx::query_scalar("SELECT nextval('report_ticket_seq')")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get next ticket sequence value: {:?}", e);
                AppError::Database(e)
            })?;

        Ok(format!("{}{:06}", TICKET_PREFIX, seq))
    }

    async fn insert(&self, data: CreateReport) -> Result<Report> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let sql = format!(
            r#"
            INSERT INTO reports (
                ticket_number, title, description, category, severity, priority, status,
                latitude, longitude, address, ward, pincode,
                reported_by, reporter_name, reporter_phone, is_anonymous,
                assigned_department, photo_url, priority_score, risk_level, estimated_resolution
            )
            VALUES ($1, $2, $3, $4, $5, $6, 'submitted', $7, $8, $9, $10, $11,
                    $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let report = sqlx::query_as::<_, Report>(&sql)
            .bind(&data.ticket_number)
            .bind(&data.title)
            .bind(&data.description)
            .bind(data.category)
            .bind(data.severity)
            .bind(data.priority)
            .bind(data.location.latitude)
            .bind(data.location.longitude)
            .bind(&data.location.address)
            .bind(&data.location.ward)
            .bind(&data.location.pincode)
            .bind(&data.reported_by)
            .bind(&data.reporter_name)
            .bind(&data.reporter_phone)
            .bind(data.is_anonymous)
            .bind(&data.assigned_department)
            .bind(&data.photo_url)
            .bind(data.priority_score)
            .bind(data.risk_level)
            .bind(&data.estimated_resolution)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to create report: {:?}", e);
                AppError::Database(e)
            })?;

        sqlx::query(
            r#"
            INSERT INTO report_timeline (report_id, status, note, updated_by)
            VALUES ($1, 'submitted', 'Report submitted', $2)
            "#,
        )
        .bind(report.id)
        .bind(&report.reported_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to create timeline entry: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit report creation: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!(
            "Created report: {} (ticket: {}, priority: {})",
            report.id,
            report.ticket_number,
            report.priority
        );

        Ok(report)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Report>> {
        let sql = format!("SELECT {} FROM reports WHERE id = $1", REPORT_COLUMNS);

        sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to get report: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list(
        &self,
        filter: &ReportFilter,
        offset: i64,
        limit: i64,
    ) -> Result<(Vec<Report>, i64)> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM reports WHERE 1=1");
        Self::push_filters(&mut count_query, filter);

        let total: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to count reports: {:?}", e);
                AppError::Database(e)
            })?;

        let mut query = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM reports WHERE 1=1",
            REPORT_COLUMNS
        ));
        Self::push_filters(&mut query, filter);
        query
            .push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let reports = query
            .build_query_as::<Report>()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports: {:?}", e);
                AppError::Database(e)
            })?;

        Ok((reports, total))
    }

    async fn list_open_by_category(&self, category: ReportCategory) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports WHERE category = $1 AND {} ORDER BY created_at DESC",
            REPORT_COLUMNS, OPEN_STATUS_CLAUSE
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(category)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list open reports by category: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_open(&self) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports WHERE {} ORDER BY created_at ASC",
            REPORT_COLUMNS, OPEN_STATUS_CLAUSE
        );

        sqlx::query_as::<_, Report>(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list open reports: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_created_since(&self, since: Option<DateTime<Utc>>) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports WHERE ($1::timestamptz IS NULL OR created_at >= $1) \
             ORDER BY created_at DESC",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(since)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports for analytics: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn list_by_reporter(&self, reported_by: &str) -> Result<Vec<Report>> {
        let sql = format!(
            "SELECT {} FROM reports WHERE reported_by = $1 ORDER BY created_at DESC",
            REPORT_COLUMNS
        );

        sqlx::query_as::<_, Report>(&sql)
            .bind(reported_by)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to list reports by reporter: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn apply_status_change(
        &self,
        id: Uuid,
        change: &StatusChange,
    ) -> Result<Option<Report>> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            tracing::error!("Failed to begin transaction: {:?}", e);
            AppError::Database(e)
        })?;

        let closing = change.closing.as_ref();
        let sql = format!(
            r#"
            UPDATE reports
            SET status = COALESCE($2, status),
                assigned_to = COALESCE($3, assigned_to),
                resolution = COALESCE($4, resolution),
                after_photo_url = COALESCE($5, after_photo_url),
                rating = COALESCE($6, rating),
                feedback = COALESCE($7, feedback),
                closed_by = COALESCE($8, closed_by),
                closed_at = COALESCE($9, closed_at),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            REPORT_COLUMNS
        );

        let updated = sqlx::query_as::<_, Report>(&sql)
            .bind(id)
            .bind(change.status)
            .bind(&change.assigned_to)
            .bind(&change.resolution)
            .bind(&change.after_photo_url)
            .bind(closing.and_then(|c| c.rating))
            .bind(closing.and_then(|c| c.feedback.clone()))
            .bind(closing.map(|c| c.closed_by.clone()))
            .bind(closing.map(|c| c.closed_at))
            .fetch_optional(&mut *tx)
            .await
            .map_err(|e| {
                tracing::error!("Failed to update report status: {:?}", e);
                AppError::Database(e)
            })?;

        let Some(report) = updated else {
            return Ok(None);
        };

        sqlx::query(
            r#"
            INSERT INTO report_timeline (report_id, status, note, updated_by)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(id)
        .bind(report.status)
        .bind(&change.note)
        .bind(&change.updated_by)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!("Failed to append timeline entry: {:?}", e);
            AppError::Database(e)
        })?;

        tx.commit().await.map_err(|e| {
            tracing::error!("Failed to commit status change: {:?}", e);
            AppError::Database(e)
        })?;

        tracing::info!("Updated report {} status to {}", id, report.status);
        Ok(Some(report))
    }

    async fn timeline(&self, report_id: Uuid) -> Result<Vec<ReportTimelineEntry>> {
        sqlx::query_as::<_, ReportTimelineEntry>(
            r#"
            SELECT id, report_id, status, note, updated_by, created_at
            FROM report_timeline
            WHERE report_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(report_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to get report timeline: {:?}", e);
            AppError::Database(e)
        })
    }
}
