//! Engine: runs monitoring cycles over all targets and dispatches alerts

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::check::{CheckOutcome, TargetChecker};
use crate::config::MonitorTarget;
use crate::notifier::{Notification, NotificationRecord, Notifier};
use crate::WatchError;

/// What happened to one target during a cycle
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: MonitorTarget,
    /// `None` when the check failed
    pub outcome: Option<CheckOutcome>,
    pub error: Option<String>,
    pub notifications: Vec<NotificationRecord>,
}

impl TargetReport {
    /// Whether the count reached the target's threshold
    pub fn alerted(&self) -> bool {
        self.outcome
            .as_ref()
            .is_some_and(|o| threshold_reached(o.final_count, o.target.threshold))
    }
}

/// The engine checks targets one after another and notifies on threshold hits
pub struct Engine {
    checker: Arc<dyn TargetChecker>,
    notifiers: Vec<Arc<dyn Notifier>>,
    targets: Vec<MonitorTarget>,
    inter_target_pause: Duration,
    cancel: CancellationToken,
}

impl Engine {
    pub fn new(
        checker: Arc<dyn TargetChecker>,
        notifiers: Vec<Arc<dyn Notifier>>,
        targets: Vec<MonitorTarget>,
        inter_target_pause: Duration,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            checker,
            notifiers,
            targets,
            inter_target_pause,
            cancel,
        }
    }

    /// Send the start-up announcement to every notifier
    pub async fn announce_startup(&self, keyword: &str, interval_minutes: u64) {
        let notification = Notification::startup(&self.targets, keyword, interval_minutes);
        dispatch_notification("startup", &notification, &self.notifiers).await;
    }

    /// Check every target once, in order. A failing target never stops the
    /// cycle; it is logged and recorded on its report.
    pub async fn run_cycle(&self) -> Vec<TargetReport> {
        tracing::info!("Monitoring cycle started ({} targets)", self.targets.len());

        let mut reports = Vec::with_capacity(self.targets.len());
        for target in &self.targets {
            let report = match self.check_isolated(target).await {
                Ok(outcome) => self.handle_outcome(outcome).await,
                Err(e) => {
                    tracing::error!("{}", e);
                    TargetReport {
                        target: target.clone(),
                        outcome: None,
                        error: Some(e.to_string()),
                        notifications: Vec::new(),
                    }
                }
            };
            reports.push(report);

            tokio::time::sleep(self.inter_target_pause).await;
        }

        tracing::info!("Monitoring cycle finished");
        reports
    }

    /// Run cycles every `interval` until cancelled. A cycle in progress
    /// always completes.
    pub async fn run(&self, interval: Duration) {
        loop {
            self.run_cycle().await;

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = self.cancel.cancelled() => {
                    tracing::debug!("Monitoring loop cancelled");
                    break;
                }
            }
        }
    }

    /// Run the check on its own task so a panic stays with this target
    async fn check_isolated(&self, target: &MonitorTarget) -> crate::Result<CheckOutcome> {
        let checker = Arc::clone(&self.checker);
        let owned = target.clone();
        let joined = tokio::spawn(async move { checker.check(&owned).await }).await;

        let reason = match joined {
            Ok(Ok(outcome)) => return Ok(outcome),
            Ok(Err(e)) => e.to_string(),
            Err(e) => format!("check task aborted: {}", e),
        };
        Err(WatchError::TargetCritical {
            target: target.name.clone(),
            reason,
        })
    }

    async fn handle_outcome(&self, outcome: CheckOutcome) -> TargetReport {
        let target = &outcome.target;
        let notifications = if threshold_reached(outcome.final_count, target.threshold) {
            tracing::info!(
                "Threshold reached for '{}' ({} >= {})",
                target.name,
                outcome.final_count,
                target.threshold
            );
            let notification = Notification::threshold_alert(target, outcome.final_count);
            dispatch_notification(&target.name, &notification, &self.notifiers).await
        } else {
            tracing::info!(
                "No alert for '{}' ({} < {})",
                target.name,
                outcome.final_count,
                target.threshold
            );
            Vec::new()
        };

        TargetReport {
            target: target.clone(),
            outcome: Some(outcome),
            error: None,
            notifications,
        }
    }
}

/// Inclusive threshold comparison
pub fn threshold_reached(count: usize, threshold: u32) -> bool {
    count >= threshold as usize
}

/// Send a notification to every notifier. Failures are logged and recorded,
/// never retried.
pub async fn dispatch_notification(
    target_name: &str,
    notification: &Notification,
    notifiers: &[Arc<dyn Notifier>],
) -> Vec<NotificationRecord> {
    let mut records = Vec::with_capacity(notifiers.len());
    for notifier in notifiers {
        tracing::debug!(
            "Dispatching to '{}' for '{}'",
            notifier.type_name(),
            target_name
        );

        let result = notifier.notify(notification).await;
        if let Err(e) = &result {
            tracing::warn!(
                "Notification via '{}' for '{}' failed: {}",
                notifier.type_name(),
                target_name,
                e
            );
        }

        records.push(NotificationRecord {
            target_name: target_name.to_string(),
            notifier_type: notifier.type_name().to_string(),
            success: result.is_ok(),
            error: result.as_ref().err().map(|e| e.to_string()),
        });
    }
    records
}
