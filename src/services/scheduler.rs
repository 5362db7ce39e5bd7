//! Periodic reconciliation of every guild member.
//!
//! One pass at startup (configurable), then one pass per interval. Passes run
//! inline in the loop, so they never overlap; a slow pass delays the next
//! tick instead of queueing a burst.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::{Notify, RwLock};
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{error, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::member_sync::{MemberOutcome, MemberSyncService};
use crate::domain::errors::DomainResult;
use crate::domain::models::SchedulerConfig;
use crate::domain::ports::GuildDirectory;

/// Summary of one reconciliation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Correlates the pass's log lines.
    pub run_id: Uuid,
    pub pass_number: u64,
    pub members_seen: usize,
    pub reconciled: usize,
    pub skipped: usize,
    pub unresolved: usize,
    /// Members whose activity history could not be read in full.
    pub incomplete: usize,
    pub excluded: usize,
    pub roles_added: usize,
    pub roles_removed: usize,
    pub failed_mutations: usize,
    pub duration_ms: u64,
}

impl PassReport {
    fn record(&mut self, outcome: &MemberOutcome) {
        match outcome {
            MemberOutcome::Skipped { .. } => self.skipped += 1,
            MemberOutcome::Unresolved { .. } => self.unresolved += 1,
            MemberOutcome::Incomplete { .. } => self.incomplete += 1,
            MemberOutcome::Reconciled { report, .. } => {
                self.reconciled += 1;
                self.roles_added += report.added.len();
                self.roles_removed += report.removed.len();
                self.failed_mutations += report.failed.len();
            }
        }
    }
}

/// Status of the scheduler.
#[derive(Debug, Clone, Default)]
pub struct SchedulerStatus {
    pub running: bool,
    pub total_passes: u64,
    pub successful_passes: u64,
    pub failed_passes: u64,
    pub last_pass: Option<Instant>,
    pub last_report: Option<PassReport>,
}

/// Handle to control a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
    status: Arc<RwLock<SchedulerStatus>>,
}

impl SchedulerHandle {
    /// Request the scheduler to stop. A pass in progress finishes first.
    pub fn stop(&self) {
        self.stop_flag.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop_flag.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> SchedulerStatus {
        self.status.read().await.clone()
    }
}

/// Runs reconciliation passes over the whole guild.
pub struct ReconciliationScheduler {
    sync: Arc<MemberSyncService>,
    guild: Arc<dyn GuildDirectory>,
    interval: Duration,
    run_on_startup: bool,
    excluded: HashSet<String>,
    status: Arc<RwLock<SchedulerStatus>>,
    stop_flag: Arc<AtomicBool>,
    wake: Arc<Notify>,
}

impl ReconciliationScheduler {
    pub fn new(
        sync: Arc<MemberSyncService>,
        guild: Arc<dyn GuildDirectory>,
        config: &SchedulerConfig,
    ) -> Self {
        Self {
            sync,
            guild,
            interval: Duration::from_secs(config.interval_secs),
            run_on_startup: config.run_on_startup,
            excluded: config.excluded_members.iter().cloned().collect(),
            status: Arc::new(RwLock::new(SchedulerStatus::default())),
            stop_flag: Arc::new(AtomicBool::new(false)),
            wake: Arc::new(Notify::new()),
        }
    }

    pub fn handle(&self) -> SchedulerHandle {
        SchedulerHandle {
            stop_flag: self.stop_flag.clone(),
            wake: self.wake.clone(),
            status: self.status.clone(),
        }
    }

    /// Run passes until stopped. Failed passes are logged and the loop goes on.
    pub async fn run(self) {
        self.status.write().await.running = true;
        info!(interval_secs = self.interval.as_secs(), "Scheduler started");

        let mut ticker = interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The first tick completes immediately.
        ticker.tick().await;
        if self.run_on_startup {
            self.run_cycle().await;
        }

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                () = self.wake.notified() => {}
            }

            if self.stop_flag.load(Ordering::Acquire) {
                break;
            }

            self.run_cycle().await;
        }

        self.status.write().await.running = false;
        info!("Scheduler stopped");
    }

    async fn run_cycle(&self) {
        let pass_number = {
            let mut status = self.status.write().await;
            status.total_passes += 1;
            status.total_passes
        };

        let span = info_span!("reconciliation_pass", pass = pass_number);
        let result = self.run_pass(pass_number).instrument(span).await;

        let mut status = self.status.write().await;
        status.last_pass = Some(Instant::now());
        match result {
            Ok(report) => {
                status.successful_passes += 1;
                status.last_report = Some(report);
            }
            Err(err) => {
                error!(pass = pass_number, error = %err, "Reconciliation pass failed");
                status.failed_passes += 1;
            }
        }
    }

    /// One pass over every current guild member.
    ///
    /// Members and roles are listed once; failing to list them fails the
    /// pass. Members are then processed one at a time, and nothing a single
    /// member does can abort the pass.
    pub async fn run_pass(&self, pass_number: u64) -> DomainResult<PassReport> {
        let start = Instant::now();
        let run_id = Uuid::new_v4();
        let members = self.guild.members().await?;
        let roles = self.guild.roles().await?;
        info!(%run_id, members = members.len(), roles = roles.len(), "Reconciliation pass started");

        let mut report = PassReport {
            run_id,
            pass_number,
            members_seen: members.len(),
            ..PassReport::default()
        };

        for mut member in members {
            if member
                .nickname
                .as_ref()
                .is_some_and(|nickname| self.excluded.contains(nickname))
            {
                info!(member = %member.display_name(), "Member excluded; skipping");
                report.excluded += 1;
                continue;
            }

            let outcome = self.sync.sync_member(&mut member, &roles).await;
            report.record(&outcome);
        }

        report.duration_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);
        if report.failed_mutations > 0 {
            warn!(failed = report.failed_mutations, "Some role mutations failed");
        }
        info!(
            reconciled = report.reconciled,
            skipped = report.skipped,
            unresolved = report.unresolved,
            incomplete = report.incomplete,
            added = report.roles_added,
            removed = report.roles_removed,
            duration_ms = report.duration_ms,
            "Reconciliation pass completed"
        );
        Ok(report)
    }
}
