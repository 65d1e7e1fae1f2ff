//! Restart Operation Implementation

use crate::RestartTarget;
use chrono::{DateTime, Utc};
use fleet_registry::MiningDevice;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{error, info, warn};

/// Aggregated result of the most recent batch
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RestartSummary {
    /// When the batch started, `None` before the first run
    pub started_at: Option<DateTime<Utc>>,
    /// Batch wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Targets that restarted successfully
    pub successful: usize,
    /// Targets that failed, errored, or panicked
    pub failed: usize,
}

/// Batch restart over a selected set of targets
///
/// Holds the counters of the last run. Runs take `&mut self`, so one
/// instance never has two batches in flight. Separate instances sharing
/// devices are not coordinated; callers serialize those themselves.
pub struct RestartOperation {
    selected: Vec<Arc<dyn RestartTarget>>,
    started_at: Option<DateTime<Utc>>,
    duration: Duration,
    successful: usize,
    failed: usize,
}

impl RestartOperation {
    /// Create an operation over `targets`
    pub fn new(targets: Vec<Arc<dyn RestartTarget>>) -> Self {
        Self {
            selected: targets,
            started_at: None,
            duration: Duration::ZERO,
            successful: 0,
            failed: 0,
        }
    }

    /// Replace the selected targets. Counters from the previous run are kept
    /// until the next `execute_restart`.
    pub fn select_machines(&mut self, targets: Vec<Arc<dyn RestartTarget>>) {
        self.selected = targets;
    }

    /// Select registry devices
    pub fn select_devices(&mut self, devices: &[Arc<MiningDevice>]) {
        self.selected = devices
            .iter()
            .map(|d| Arc::clone(d) as Arc<dyn RestartTarget>)
            .collect();
    }

    /// Number of selected targets
    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    /// Restart every selected target concurrently and wait for all of them.
    ///
    /// An error or panic from one target counts as a failure and never stops
    /// the others. Duration spans the whole batch, so it tracks the slowest
    /// target. There is no per-target timeout.
    pub async fn execute_restart(&mut self) -> RestartSummary {
        info!("Executing restart for {} selected machines", self.selected.len());
        self.started_at = Some(Utc::now());
        let start = Instant::now();

        let mut tasks = JoinSet::new();
        for target in &self.selected {
            let target = Arc::clone(target);
            tasks.spawn(async move {
                let label = target.label();
                let outcome = target.restart().await;
                (label, outcome)
            });
        }

        let mut successful = 0;
        let mut failed = 0;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((_, Ok(true))) => successful += 1,
                Ok((label, Ok(false))) => {
                    warn!("Restart of {} did not succeed", label);
                    failed += 1;
                }
                Ok((label, Err(e))) => {
                    error!("Error restarting {}: {}", label, e);
                    failed += 1;
                }
                Err(e) => {
                    error!("Restart task aborted: {}", e);
                    failed += 1;
                }
            }
        }

        self.duration = start.elapsed();
        self.successful = successful;
        self.failed = failed;

        metrics::counter!("fleet_restart_success_total").increment(successful as u64);
        metrics::counter!("fleet_restart_failure_total").increment(failed as u64);
        metrics::histogram!("fleet_restart_batch_seconds").record(self.duration.as_secs_f64());

        info!(
            "Restart batch finished: {} succeeded, {} failed in {:.2}s",
            successful,
            failed,
            self.duration.as_secs_f64()
        );
        self.summary()
    }

    /// Counters of the last run
    pub fn summary(&self) -> RestartSummary {
        RestartSummary {
            started_at: self.started_at,
            duration_ms: u64::try_from(self.duration.as_millis()).unwrap_or(u64::MAX),
            successful: self.successful,
            failed: self.failed,
        }
    }

    /// One-line report of the last run
    pub fn provide_feedback(&self) -> String {
        let time = self
            .started_at
            .map(Self::format_date)
            .unwrap_or_else(|| "N/A".to_string());

        format!(
            "Restart completed at {}. Successful: {}, Failed: {}, Duration: {:.2} seconds.",
            time,
            self.successful,
            self.failed,
            self.duration.as_secs_f64()
        )
    }

    /// Format a timestamp as en-US local time in UTC, e.g. `2/18/2025, 12:34:56 PM`
    pub fn format_date(date: DateTime<Utc>) -> String {
        date.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RestartError;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use fleet_registry::{DeviceStatus, RestartPolicy};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Clone, Copy)]
    enum Outcome {
        Succeed,
        Fail,
        Error,
        Panic,
    }

    struct MockTarget {
        name: &'static str,
        delay: Duration,
        outcome: Outcome,
        calls: AtomicUsize,
    }

    impl MockTarget {
        fn new(name: &'static str, delay_ms: u64, outcome: Outcome) -> Arc<Self> {
            Arc::new(Self {
                name,
                delay: Duration::from_millis(delay_ms),
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl RestartTarget for MockTarget {
        fn label(&self) -> String {
            self.name.to_string()
        }

        async fn restart(&self) -> Result<bool, RestartError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            match self.outcome {
                Outcome::Succeed => Ok(true),
                Outcome::Fail => Ok(false),
                Outcome::Error => Err(RestartError::Unreachable(self.name.to_string())),
                Outcome::Panic => panic!("{} blew up", self.name),
            }
        }
    }

    fn targets(mocks: &[Arc<MockTarget>]) -> Vec<Arc<dyn RestartTarget>> {
        mocks.iter().map(|m| m.clone() as Arc<dyn RestartTarget>).collect()
    }

    #[test]
    fn test_feedback_before_any_run() {
        let op = RestartOperation::new(Vec::new());
        assert_eq!(
            op.provide_feedback(),
            "Restart completed at N/A. Successful: 0, Failed: 0, Duration: 0.00 seconds."
        );
        assert_eq!(op.summary().started_at, None);
    }

    #[test]
    fn test_format_date() {
        let date = Utc.with_ymd_and_hms(2025, 2, 18, 12, 34, 56).unwrap();
        assert_eq!(RestartOperation::format_date(date), "2/18/2025, 12:34:56 PM");
        let date = Utc.with_ymd_and_hms(2025, 11, 3, 7, 5, 9).unwrap();
        assert_eq!(RestartOperation::format_date(date), "11/3/2025, 7:05:09 AM");
    }

    #[tokio::test(start_paused = true)]
    async fn test_counts_independent_of_completion_order() {
        let mocks = vec![
            MockTarget::new("A", 30, Outcome::Succeed),
            MockTarget::new("B", 10, Outcome::Succeed),
            MockTarget::new("C", 20, Outcome::Fail),
        ];
        let mut op = RestartOperation::new(targets(&mocks));

        let summary = op.execute_restart().await;

        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 1);
        for mock in &mocks {
            assert_eq!(mock.calls.load(Ordering::SeqCst), 1);
        }
        let feedback = op.provide_feedback();
        assert!(feedback.contains("Successful: 2"));
        assert!(feedback.contains("Failed: 1"));
        assert!(!feedback.contains("N/A"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_duration_tracks_slowest_target() {
        let mocks = vec![
            MockTarget::new("A", 300, Outcome::Succeed),
            MockTarget::new("B", 200, Outcome::Succeed),
            MockTarget::new("C", 100, Outcome::Succeed),
        ];
        let mut op = RestartOperation::new(targets(&mocks));

        let summary = op.execute_restart().await;

        assert!(summary.duration_ms >= 300);
        assert!(summary.duration_ms < 600);
        assert!(op.provide_feedback().ends_with("Duration: 0.30 seconds."));
    }

    #[tokio::test(start_paused = true)]
    async fn test_faults_are_isolated() {
        let mocks = vec![
            MockTarget::new("A", 10, Outcome::Succeed),
            MockTarget::new("B", 5, Outcome::Error),
            MockTarget::new("C", 1, Outcome::Panic),
            MockTarget::new("D", 20, Outcome::Succeed),
        ];
        let mut op = RestartOperation::new(targets(&mocks));

        let summary = op.execute_restart().await;

        assert_eq!(summary.successful, 2);
        assert_eq!(summary.failed, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_select_keeps_counters_until_next_run() {
        let mut op = RestartOperation::new(targets(&[
            MockTarget::new("A", 10, Outcome::Succeed),
            MockTarget::new("B", 10, Outcome::Fail),
        ]));
        op.execute_restart().await;

        op.select_machines(targets(&[MockTarget::new("C", 10, Outcome::Fail)]));
        assert_eq!(op.selected_count(), 1);
        assert!(op.provide_feedback().contains("Successful: 1, Failed: 1"));

        op.execute_restart().await;
        assert!(op.provide_feedback().contains("Successful: 0, Failed: 1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_batch() {
        let mut op = RestartOperation::new(Vec::new());
        let summary = op.execute_restart().await;
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.failed, 0);
        assert!(summary.started_at.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn test_restarts_registry_devices() {
        let good = Arc::new(
            MiningDevice::new("192.168.1.101", "Antminer S19", 85.0, 90.0, DeviceStatus::Active)
                .with_restart_policy(RestartPolicy::AlwaysSucceed),
        );
        let bad = Arc::new(
            MiningDevice::new("192.168.1.102", "Whatsminer M30S", 90.0, 80.0, DeviceStatus::Active)
                .with_restart_policy(RestartPolicy::AlwaysFail),
        );

        let mut op = RestartOperation::new(Vec::new());
        op.select_devices(&[good.clone(), bad.clone()]);
        let summary = op.execute_restart().await;

        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(good.status(), DeviceStatus::Operational);
        assert_eq!(bad.status(), DeviceStatus::Failed);
        assert!(summary.duration_ms >= 2000);
    }

    #[test]
    fn test_summary_duration_saturates() {
        let mut op = RestartOperation::new(Vec::new());
        op.duration = Duration::MAX;
        assert_eq!(op.summary().duration_ms, u64::MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_summary_serializes() {
        let mut op = RestartOperation::new(targets(&[MockTarget::new("A", 10, Outcome::Succeed)]));
        op.execute_restart().await;
        let json = serde_json::to_value(op.summary()).unwrap();
        assert_eq!(json["successful"], 1);
        assert_eq!(json["failed"], 0);
    }
}
