use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;
use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::domain::simulation::vehicle_event::ScheduledEvent;
use crate::domain::submission::event_submitter::SharedEventSubmitter;
use crate::domain::submission::notification::{Notification, SharedNotificationSink};
use crate::domain::utils::id::SimulationRunId;
use crate::domain::utils::statistics::ANALYTICS_TARGET;
use crate::error::{Error, Result};

/// Counts of one run, as far as it has progressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulationReport {
    pub run_id: String,
    pub armed: usize,
    pub dispatched: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl SimulationReport {
    /// Timers that neither fired nor were cancelled yet.
    pub fn pending(&self) -> usize {
        self.armed.saturating_sub(self.dispatched + self.cancelled)
    }
}

#[derive(Debug, Default)]
struct RunCounters {
    dispatched: AtomicUsize,
    succeeded: AtomicUsize,
    failed: AtomicUsize,
    cancelled: AtomicUsize,
}

#[derive(Debug)]
struct ActiveRun {
    run_id: SimulationRunId,
    armed: usize,
    token: CancellationToken,
    tracker: TaskTracker,
    counters: Arc<RunCounters>,
}

impl ActiveRun {
    fn report(&self) -> SimulationReport {
        SimulationReport {
            run_id: self.run_id.to_string(),
            armed: self.armed,
            dispatched: self.counters.dispatched.load(Ordering::SeqCst),
            succeeded: self.counters.succeeded.load(Ordering::SeqCst),
            failed: self.counters.failed.load(Ordering::SeqCst),
            cancelled: self.counters.cancelled.load(Ordering::SeqCst),
        }
    }
}

/// Dispatches a pre-built schedule: one single-shot timer per event, measured from `start`.
///
/// A fired timer hands the event to the submitter on its own task and is done; it never
/// waits for the backend. Failures go to the notification sink only and do not touch
/// sibling timers. Must be used from within a Tokio runtime. Dropping the scheduler
/// cancels whatever has not fired yet.
#[derive(Debug)]
pub struct Scheduler {
    submitter: SharedEventSubmitter,
    notifier: SharedNotificationSink,
    run: Option<ActiveRun>,
}

impl Scheduler {
    pub fn new(submitter: SharedEventSubmitter, notifier: SharedNotificationSink) -> Self {
        Scheduler { submitter, notifier, run: None }
    }

    /// True while the current run has timers outstanding and has not been stopped.
    ///
    /// Submissions of a stopped run may still be draining; they do not block a new run.
    pub fn is_running(&self) -> bool {
        self.run.as_ref().is_some_and(|run| !run.token.is_cancelled() && !run.tracker.is_empty())
    }

    pub fn start(&mut self, events: Vec<ScheduledEvent>) -> Result<SimulationRunId> {
        self.start_run(SimulationRunId::generate(), events)
    }

    /// Like [`Scheduler::start`], under a caller-chosen id so sinks can be tagged before the first timer fires.
    pub fn start_run(&mut self, run_id: SimulationRunId, events: Vec<ScheduledEvent>) -> Result<SimulationRunId> {
        if self.is_running() {
            return Err(Error::SchedulerAlreadyRunning);
        }

        let token = CancellationToken::new();
        let tracker = TaskTracker::new();
        let counters = Arc::new(RunCounters::default());
        let started_at = Instant::now();
        let armed = events.len();

        for scheduled in events {
            let deadline = started_at + scheduled.delay();
            tracker.spawn(fire(
                scheduled,
                deadline,
                token.clone(),
                tracker.clone(),
                self.submitter.clone(),
                self.notifier.clone(),
                counters.clone(),
            ));
        }
        tracker.close();

        self.notifier.notify(Notification::info(format!("Simulation run {} started with {} scheduled events.", run_id, armed)));
        tracing::info!(target: ANALYTICS_TARGET, RunId = %run_id, Armed = armed, LogDescription = "Simulation started");

        self.run = Some(ActiveRun { run_id: run_id.clone(), armed, token, tracker, counters });
        Ok(run_id)
    }

    /// Cancels every timer that has not fired yet. Already dispatched events are left alone.
    pub fn stop(&self) {
        if let Some(run) = &self.run {
            if !run.token.is_cancelled() {
                run.token.cancel();
                let pending = run.report().pending();
                self.notifier.notify(Notification::info(format!("Simulation run {} stopped; {} events were still pending.", run.run_id, pending)));
            }
        }
    }

    pub fn report(&self) -> Option<SimulationReport> {
        self.run.as_ref().map(ActiveRun::report)
    }

    /// Resolves once every timer has fired or been cancelled and every submission has returned.
    pub async fn wait(&self) -> Option<SimulationReport> {
        let run = self.run.as_ref()?;
        run.tracker.wait().await;

        let report = run.report();
        tracing::info!(
            target: ANALYTICS_TARGET,
            RunId = %run.run_id,
            Dispatched = report.dispatched,
            Succeeded = report.succeeded,
            Failed = report.failed,
            Cancelled = report.cancelled,
            LogDescription = "Simulation finished",
        );
        Some(report)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        if let Some(run) = &self.run {
            run.token.cancel();
        }
    }
}

async fn fire(
    scheduled: ScheduledEvent,
    deadline: Instant,
    token: CancellationToken,
    tracker: TaskTracker,
    submitter: SharedEventSubmitter,
    notifier: SharedNotificationSink,
    counters: Arc<RunCounters>,
) {
    tokio::select! {
        biased;

        _ = token.cancelled() => {
            counters.cancelled.fetch_add(1, Ordering::SeqCst);
        }
        _ = sleep_until(deadline) => {
            counters.dispatched.fetch_add(1, Ordering::SeqCst);
            let ScheduledEvent { event, delay_ms } = scheduled;
            log::trace!("Dispatching {} {} at +{} ms", event.license_plate, event.event_type(), delay_ms);

            tracker.spawn(async move {
                match submitter.submit(&event).await {
                    Ok(receipt) => {
                        counters.succeeded.fetch_add(1, Ordering::SeqCst);
                        notifier.notify(Notification::submitted(event, delay_ms, receipt.message));
                    }
                    Err(e) => {
                        counters.failed.fetch_add(1, Ordering::SeqCst);
                        notifier.notify(Notification::failed(event, delay_ms, e.to_string()));
                    }
                }
            });
        }
    }
}
