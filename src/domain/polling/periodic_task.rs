use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PollStats {
    /// Interval ticks plus manual refetches.
    pub triggers: u64,
    /// Triggers that actually started the job.
    pub runs: u64,
    /// Triggers dropped because the previous run was still in flight.
    pub skipped: u64,
}

type Job = Arc<dyn Fn() -> BoxFuture<'static, ()> + Send + Sync>;

#[derive(Default)]
struct PollState {
    in_flight: AtomicBool,
    triggers: AtomicU64,
    runs: AtomicU64,
    skipped: AtomicU64,
}

/// Runs a job every `period` until stopped, never more than one execution at a time.
///
/// The first run starts immediately. Ticks that arrive while a run is still in flight
/// are skipped rather than queued.
pub struct PeriodicTask {
    name: String,
    period: Duration,
    job: Job,
    state: Arc<PollState>,
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for PeriodicTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PeriodicTask").field("name", &self.name).field("period", &self.period).field("stats", &self.stats()).finish()
    }
}

impl PeriodicTask {
    pub fn start<F, Fut>(name: impl Into<String>, period: Duration, job: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let job: Job = Arc::new(move || job().boxed());
        let state = Arc::new(PollState::default());
        let token = CancellationToken::new();

        let handle = {
            let name = name.clone();
            let job = job.clone();
            let state = state.clone();
            let token = token.clone();

            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

                loop {
                    tokio::select! {
                        biased;

                        _ = token.cancelled() => break,
                        _ = ticker.tick() => {
                            trigger(&name, &job, &state, &token);
                        }
                    }
                }
                log::debug!("Poller '{}' stopped.", name);
            })
        };

        log::info!("Poller '{}' started with a period of {:?}.", name, period);
        PeriodicTask { name, period, job, state, token, handle: Some(handle) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the job now unless a run is already in flight. Returns whether it started.
    pub fn refetch(&self) -> bool {
        trigger(&self.name, &self.job, &self.state, &self.token)
    }

    pub fn is_in_flight(&self) -> bool {
        self.state.in_flight.load(Ordering::SeqCst)
    }

    pub fn stats(&self) -> PollStats {
        PollStats {
            triggers: self.state.triggers.load(Ordering::SeqCst),
            runs: self.state.runs.load(Ordering::SeqCst),
            skipped: self.state.skipped.load(Ordering::SeqCst),
        }
    }

    /// Stops ticking and waits for the ticker loop to exit. An in-flight run is cancelled.
    pub async fn stop(mut self) -> PollStats {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
        self.stats()
    }
}

impl Drop for PeriodicTask {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

fn trigger(name: &str, job: &Job, state: &Arc<PollState>, token: &CancellationToken) -> bool {
    if token.is_cancelled() {
        return false;
    }
    state.triggers.fetch_add(1, Ordering::SeqCst);

    if state.in_flight.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err() {
        state.skipped.fetch_add(1, Ordering::SeqCst);
        log::debug!("Poller '{}' skipped a tick: previous request still in flight.", name);
        return false;
    }

    state.runs.fetch_add(1, Ordering::SeqCst);
    let run = job();
    let state = state.clone();
    let token = token.clone();

    tokio::spawn(async move {
        tokio::select! {
            _ = token.cancelled() => {}
            _ = run => {}
        }
        state.in_flight.store(false, Ordering::SeqCst);
    });

    true
}
