use async_trait::async_trait;
use minijinja::context;

use super::templates::{self, TemplateError};
use super::Notifier;
use crate::core::error::{AppError, Result};
use crate::features::reports::models::{Report, ReportStatus};
use crate::features::sla::services::SlaEvaluation;
use crate::modules::email::{EmailError, EmailMessage, ResendClient};
use crate::shared::constants::ALERT_EXCERPT_CHARS;

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        AppError::Internal(e.to_string())
    }
}

impl From<EmailError> for AppError {
    fn from(e: EmailError) -> Self {
        AppError::ExternalServiceError(e.to_string())
    }
}

/// Reporter address, when `reported_by` holds one
fn reporter_email(report: &Report) -> Option<&str> {
    Some(report.reported_by.as_str()).filter(|r| r.contains('@'))
}

fn reporter_name(report: &Report) -> &str {
    report.reporter_name.as_deref().unwrap_or("Citizen")
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > ALERT_EXCERPT_CHARS {
        format!("{}...", text.chars().take(ALERT_EXCERPT_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

fn submitted_email(report: &Report, to: &str) -> Result<EmailMessage> {
    let html = templates::render(
        "report_submitted.html.jinja",
        context! {
            ticket_number => &report.ticket_number,
            reporter_name => reporter_name(report),
            title => &report.title,
            category => report.category.as_str(),
            department => &report.assigned_department,
            priority => report.priority.as_str(),
            priority_color => report.priority.color(),
            estimated_resolution => &report.estimated_resolution,
            address => &report.location.address,
        },
    )?;

    Ok(EmailMessage {
        to: vec![to.to_string()],
        subject: format!("Report {} received", report.ticket_number),
        html,
    })
}

fn critical_email(report: &Report, to: &str) -> Result<EmailMessage> {
    let html = templates::render(
        "critical_report.html.jinja",
        context! {
            header_color => report.priority.color(),
            ticket_number => &report.ticket_number,
            category => report.category.as_str(),
            title => &report.title,
            excerpt => excerpt(&report.description),
            department => &report.assigned_department,
            reporter => report.display_reporter(),
            latitude => report.location.latitude,
            longitude => report.location.longitude,
            address => &report.location.address,
            photo_url => &report.photo_url,
            priority_color => report.priority.color(),
            estimated_resolution => &report.estimated_resolution,
        },
    )?;

    Ok(EmailMessage {
        to: vec![to.to_string()],
        subject: format!(
            "CRITICAL: {} report {} needs immediate attention",
            report.category, report.ticket_number
        ),
        html,
    })
}

fn status_email(
    report: &Report,
    previous: ReportStatus,
    note: &str,
    to: &str,
) -> Result<EmailMessage> {
    let html = templates::render(
        "status_updated.html.jinja",
        context! {
            ticket_number => &report.ticket_number,
            reporter_name => reporter_name(report),
            title => &report.title,
            previous_status => previous.as_str(),
            status => report.status.as_str(),
            note => note,
            resolution => &report.resolution,
            after_photo_url => &report.after_photo_url,
        },
    )?;

    Ok(EmailMessage {
        to: vec![to.to_string()],
        subject: format!("Report {} is now {}", report.ticket_number, report.status),
        html,
    })
}

fn breach_email(report: &Report, evaluation: &SlaEvaluation, to: &str) -> Result<EmailMessage> {
    let hours_elapsed = format!("{:.1}", evaluation.hours_elapsed);
    let html = templates::render(
        "sla_breach.html.jinja",
        context! {
            header_color => "#dc2626",
            ticket_number => &report.ticket_number,
            priority => report.priority.as_str(),
            priority_color => report.priority.color(),
            hours_elapsed => &hours_elapsed,
            deadline_hours => evaluation.deadline_hours,
            title => &report.title,
            excerpt => excerpt(&report.description),
            status => report.status.as_str(),
            department => &report.assigned_department,
            deadline => evaluation.deadline.format("%Y-%m-%d %H:%M UTC").to_string(),
        },
    )?;

    Ok(EmailMessage {
        to: vec![to.to_string()],
        subject: format!(
            "SLA breach: report {} open for {}h (limit {}h)",
            report.ticket_number, hours_elapsed, evaluation.deadline_hours
        ),
        html,
    })
}

/// Sends notifications as HTML email through Resend
pub struct EmailNotifier {
    client: ResendClient,
    alert_recipient: String,
}

impl EmailNotifier {
    pub fn new(client: ResendClient, alert_recipient: String) -> Self {
        Self {
            client,
            alert_recipient,
        }
    }

    async fn deliver(&self, message: EmailMessage) -> Result<()> {
        self.client.send(&message).await?;
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn report_submitted(&self, report: &Report) -> Result<()> {
        let Some(to) = reporter_email(report) else {
            tracing::debug!(
                "No reporter email for {}, skipping confirmation",
                report.ticket_number
            );
            return Ok(());
        };
        self.deliver(submitted_email(report, to)?).await
    }

    async fn critical_report(&self, report: &Report) -> Result<()> {
        self.deliver(critical_email(report, &self.alert_recipient)?)
            .await
    }

    async fn status_updated(
        &self,
        report: &Report,
        previous: ReportStatus,
        note: &str,
    ) -> Result<()> {
        let Some(to) = reporter_email(report) else {
            return Ok(());
        };
        self.deliver(status_email(report, previous, note, to)?).await
    }

    async fn sla_breach(&self, report: &Report, evaluation: &SlaEvaluation) -> Result<()> {
        self.deliver(breach_email(report, evaluation, &self.alert_recipient)?)
            .await
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::features::reports::models::{ReportCategory, ReportPriority};
    use crate::features::sla::services::{evaluate, SlaSubject};
    use crate::shared::test_helpers::ReportBuilder;

    #[test]
    fn test_submitted_email() {
        let report = ReportBuilder::new(ReportCategory::Streetlight)
            .reported_by("asha@example.org")
            .build();
        let to = reporter_email(&report).unwrap();
        let message = submitted_email(&report, to).unwrap();

        assert_eq!(message.to, vec!["asha@example.org".to_string()]);
        assert!(message.subject.contains(&report.ticket_number));
        assert!(message.html.contains("Electricity Department"));
    }

    #[test]
    fn test_critical_email_uses_priority_colour_and_excerpt() {
        let long = "water main burst ".repeat(20);
        let report = ReportBuilder::new(ReportCategory::Water)
            .priority(ReportPriority::Critical)
            .description(&long)
            .build();
        let message = critical_email(&report, "ops@example.org").unwrap();

        assert!(message.subject.starts_with("CRITICAL: water report"));
        assert!(message.html.contains("#dc2626"));
        assert!(!message.html.contains(long.trim()));
    }

    #[test]
    fn test_breach_email_reports_hours() {
        let now = Utc::now();
        let report = ReportBuilder::new(ReportCategory::Pothole)
            .priority(ReportPriority::High)
            .created_at(now - Duration::hours(30))
            .build();
        let evaluation = evaluate(&SlaSubject::from(&report), now);
        let message = breach_email(&report, &evaluation, "ops@example.org").unwrap();

        assert_eq!(
            message.subject,
            format!(
                "SLA breach: report {} open for 30.0h (limit 24h)",
                report.ticket_number
            )
        );
        assert!(message.html.contains("past its 24 hour limit"));
    }

    #[test]
    fn test_reporter_email_requires_address() {
        let report = ReportBuilder::new(ReportCategory::Other)
            .reported_by("anonymous")
            .build();
        assert!(reporter_email(&report).is_none());
    }

    #[test]
    fn test_excerpt_truncates_on_chars() {
        let text = "é".repeat(ALERT_EXCERPT_CHARS + 5);
        let cut = excerpt(&text);
        assert_eq!(cut.chars().count(), ALERT_EXCERPT_CHARS + 3);
        assert_eq!(excerpt("short"), "short");
    }
}
