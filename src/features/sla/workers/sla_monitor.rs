use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tokio::time::{interval, MissedTickBehavior};
use utoipa::ToSchema;

use crate::core::error::Result;
use crate::features::notifications::Notifier;
use crate::features::sla::services::{AlertDedupStore, SlaService};

/// Outcome of one sweep
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct SweepSummary {
    /// Open reports past their deadline
    pub breached: usize,
    /// Alerts delivered in this sweep
    pub alerted: usize,
    /// Breached reports skipped because an earlier sweep alerted them
    pub already_alerted: usize,
    /// Alerts that failed; they are retried on the next sweep
    pub failed: usize,
}

/// Periodically alerts on open reports that have breached their SLA
pub struct SlaMonitor {
    sla_service: Arc<SlaService>,
    notifier: Arc<dyn Notifier>,
    alert_store: Arc<dyn AlertDedupStore>,
    check_interval: Duration,
    sweep_lock: Mutex<()>,
    running: AtomicBool,
}

impl SlaMonitor {
    pub fn new(
        sla_service: Arc<SlaService>,
        notifier: Arc<dyn Notifier>,
        alert_store: Arc<dyn AlertDedupStore>,
        check_interval: Duration,
    ) -> Self {
        Self {
            sla_service,
            notifier,
            alert_store,
            check_interval,
            sweep_lock: Mutex::new(()),
            running: AtomicBool::new(false),
        }
    }

    /// Whether the background loop is currently active
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    pub fn check_interval(&self) -> Duration {
        self.check_interval
    }

    /// Run sweeps on a fixed interval until `shutdown` flips to `true`.
    /// A sweep in progress always completes; shutdown is observed between sweeps.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("SLA monitor already running");
            return;
        }

        tracing::info!(
            "Starting SLA monitor - checking every {} seconds",
            self.check_interval.as_secs()
        );

        let mut ticker = interval(self.check_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.run_cycle().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("SLA monitor stopped");
    }

    async fn run_cycle(&self) {
        match self.sweep(Utc::now()).await {
            Ok(Some(summary)) if summary.alerted > 0 || summary.failed > 0 => {
                tracing::info!(
                    "SLA check completed: {} breached, {} alerts sent, {} failed",
                    summary.breached,
                    summary.alerted,
                    summary.failed
                );
            }
            Ok(Some(summary)) => {
                tracing::info!(
                    "SLA check completed: no new breaches ({} already alerted)",
                    summary.already_alerted
                );
            }
            Ok(None) => {}
            Err(e) => tracing::error!("SLA monitor error: {:?}", e),
        }
    }

    /// Run one sweep at `now`. Returns `None` when another sweep holds the lock.
    ///
    /// Each breached report is handled independently: a failed alert is logged
    /// and counted, and the report stays unmarked so the next sweep retries it.
    pub async fn sweep(&self, now: DateTime<Utc>) -> Result<Option<SweepSummary>> {
        let Ok(_guard) = self.sweep_lock.try_lock() else {
            tracing::warn!("SLA sweep already in progress, skipping");
            return Ok(None);
        };

        tracing::debug!("Checking for SLA breaches");

        let breached = self.sla_service.breached_reports(now).await?;
        let mut summary = SweepSummary {
            breached: breached.len(),
            ..Default::default()
        };

        for (report, evaluation) in &breached {
            if self.alert_store.was_alerted(report.id).await {
                summary.already_alerted += 1;
                continue;
            }

            match self.notifier.sla_breach(report, evaluation).await {
                Ok(()) => {
                    self.alert_store.mark_alerted(report.id).await;
                    summary.alerted += 1;
                    tracing::info!(
                        "SLA alert sent for {} ({:.1}h elapsed, limit {}h)",
                        report.ticket_number,
                        evaluation.hours_elapsed,
                        evaluation.deadline_hours
                    );
                }
                Err(e) => {
                    summary.failed += 1;
                    tracing::error!(
                        "Failed to send SLA alert for {}: {:?}",
                        report.ticket_number,
                        e
                    );
                }
            }
        }

        Ok(Some(summary))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration as ChronoDuration;
    use tokio_test::{assert_err, assert_ok};

    use super::*;
    use crate::features::reports::models::{Report, ReportCategory, ReportPriority, ReportStatus};
    use crate::features::sla::services::InMemoryAlertStore;
    use crate::shared::test_helpers::{InMemoryReportRepository, RecordingNotifier, ReportBuilder};

    fn breached_report() -> Report {
        ReportBuilder::new(ReportCategory::Water)
            .priority(ReportPriority::Critical)
            .created_at(Utc::now() - ChronoDuration::hours(6))
            .build()
    }

    fn monitor_for(
        reports: Vec<Report>,
    ) -> (SlaMonitor, Arc<InMemoryReportRepository>, Arc<RecordingNotifier>) {
        let repository = Arc::new(InMemoryReportRepository::with_reports(reports));
        let notifier = Arc::new(RecordingNotifier::new());
        let monitor = SlaMonitor::new(
            Arc::new(SlaService::new(repository.clone())),
            notifier.clone(),
            Arc::new(InMemoryAlertStore::new()),
            Duration::from_millis(20),
        );
        (monitor, repository, notifier)
    }

    #[tokio::test]
    async fn test_alerts_once_per_report() {
        let report = breached_report();
        let (monitor, _, notifier) = monitor_for(vec![report.clone()]);

        let first = monitor.sweep(Utc::now()).await.unwrap().unwrap();
        assert_eq!(first.alerted, 1);

        let second = monitor.sweep(Utc::now()).await.unwrap().unwrap();
        assert_eq!(second.alerted, 0);
        assert_eq!(second.already_alerted, 1);

        assert_eq!(notifier.breach_alerts(), vec![report.id]);
    }

    #[tokio::test]
    async fn test_failed_alert_does_not_stop_sweep_and_is_retried() {
        let failing = breached_report();
        let healthy = breached_report();
        let (monitor, _, notifier) = monitor_for(vec![failing.clone(), healthy.clone()]);
        notifier.fail_for(failing.id);

        let summary = monitor.sweep(Utc::now()).await.unwrap().unwrap();
        assert_eq!(summary.breached, 2);
        assert_eq!(summary.alerted, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(notifier.breach_alerts(), vec![healthy.id]);

        notifier.recover(failing.id);
        let retry = monitor.sweep(Utc::now()).await.unwrap().unwrap();
        assert_eq!(retry.alerted, 1);
        assert_eq!(retry.already_alerted, 1);
        assert_eq!(notifier.breach_alerts(), vec![healthy.id, failing.id]);
    }

    #[tokio::test]
    async fn test_closed_and_fresh_reports_are_not_alerted() {
        let closed = ReportBuilder::new(ReportCategory::Water)
            .priority(ReportPriority::Critical)
            .status(ReportStatus::Closed)
            .created_at(Utc::now() - ChronoDuration::hours(100))
            .build();
        let fresh = ReportBuilder::new(ReportCategory::Water)
            .priority(ReportPriority::Low)
            .created_at(Utc::now() - ChronoDuration::hours(100))
            .build();
        let (monitor, _, notifier) = monitor_for(vec![closed, fresh]);

        let summary = monitor.sweep(Utc::now()).await.unwrap().unwrap();
        assert_eq!(summary, SweepSummary::default());
        assert!(notifier.events().is_empty());
    }

    #[tokio::test]
    async fn test_overlapping_sweep_is_skipped() {
        let (monitor, _, _) = monitor_for(vec![breached_report()]);

        let _held = monitor.sweep_lock.lock().await;
        assert_eq!(assert_ok!(monitor.sweep(Utc::now()).await), None);
    }

    #[tokio::test]
    async fn test_repository_failure_is_an_error_not_a_panic() {
        let (monitor, repository, _) = monitor_for(vec![breached_report()]);
        repository.set_failing(true);
        assert_err!(monitor.sweep(Utc::now()).await);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let report = breached_report();
        let (monitor, _, notifier) = monitor_for(vec![report.clone()]);
        let monitor = Arc::new(monitor);
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn({
            let monitor = monitor.clone();
            async move { monitor.run(rx).await }
        });

        // First tick fires immediately
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(monitor.is_running());

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("monitor should stop")
            .unwrap();

        assert!(!monitor.is_running());
        assert_eq!(notifier.breach_alerts(), vec![report.id]);
    }
}
