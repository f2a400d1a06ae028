//! Polled queries: a [`QueryCache`] driven by tokio tasks.
//!
//! A [`PolledQuery`] owns exactly one interval timer task. The timer only
//! produces ticks; fetches run as short-lived tasks and report back through
//! the same channel. Nothing touches the cache outside the owner's calls to
//! [`PolledQuery::pump`] or [`PolledQuery::process_next`], so the owner's event
//! loop stays the single writer.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::cache::{Completion, FetchTicket, QueryCache, QueryView};
use crate::errors::ApiResult;

/// A remote resource that can be fetched for a key.
#[async_trait]
pub trait QuerySource: Send + Sync + 'static {
    type Key: Clone + PartialEq + fmt::Debug + Send + Sync + 'static;
    type Output: Send + 'static;

    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn fetch(&self, key: &Self::Key) -> ApiResult<Self::Output>;
}

enum PollEvent<K, T> {
    Tick,
    Done(FetchTicket<K>, ApiResult<T>),
}

/// What a batch of processed events changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PumpReport {
    pub applied: usize,
    pub failed: usize,
    pub retried: usize,
    pub discarded: usize,
    /// Scheduled ticks that issued a request.
    pub polled: usize,
    pub unauthorized: bool,
}

impl PumpReport {
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.applied > 0 || self.failed > 0 || self.polled > 0 || self.retried > 0
    }
}

/// Owned handle to a query's interval timer task.
struct PollTimer {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl PollTimer {
    fn spawn<K, T>(runtime: &Handle, period: Duration, tx: mpsc::UnboundedSender<PollEvent<K, T>>) -> Self
    where
        K: Send + 'static,
        T: Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();

        let task = runtime.spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {
                        if tx.send(PollEvent::Tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });

        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancel the timer task. Later calls are no-ops.
    fn stop(&mut self) -> bool {
        if self.task.take().is_some() {
            self.cancel.cancel();
            true
        } else {
            false
        }
    }

    const fn is_running(&self) -> bool {
        self.task.is_some()
    }
}

impl Drop for PollTimer {
    fn drop(&mut self) {
        self.stop();
    }
}

/// A query that refreshes itself on a fixed interval and on key changes.
pub struct PolledQuery<S: QuerySource> {
    source: Arc<S>,
    cache: QueryCache<S::Key, S::Output>,
    runtime: Handle,
    tx: mpsc::UnboundedSender<PollEvent<S::Key, S::Output>>,
    rx: mpsc::UnboundedReceiver<PollEvent<S::Key, S::Output>>,
    timer: PollTimer,
}

impl<S: QuerySource> PolledQuery<S> {
    /// Start polling `source` for `key`: issues the first fetch immediately
    /// and spawns the interval timer on `runtime`.
    pub fn start(source: Arc<S>, key: S::Key, period: Duration, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let timer = PollTimer::spawn(&runtime, period, tx.clone());

        tracing::debug!(
            source = source.name(),
            period_ms = u64::try_from(period.as_millis()).unwrap_or(u64::MAX),
            "Polling started"
        );

        let mut query = Self {
            source,
            cache: QueryCache::new(key),
            runtime,
            tx,
            rx,
            timer,
        };
        let ticket = query.cache.start();
        query.dispatch(ticket);
        query
    }

    pub fn view(&self) -> QueryView<'_, S::Output> {
        self.cache.view()
    }

    pub const fn key(&self) -> &S::Key {
        self.cache.key()
    }

    /// Change the key; fetches immediately when it differs.
    pub fn set_key(&mut self, key: S::Key) {
        if let Some(ticket) = self.cache.set_key(key) {
            self.dispatch(ticket);
        }
    }

    /// Fetch now, outside the timer schedule. The timer keeps its cadence.
    pub fn refetch(&mut self) {
        let ticket = self.cache.refetch();
        self.dispatch(ticket);
    }

    /// Apply every event that is ready without waiting.
    pub fn pump(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        while let Ok(event) = self.rx.try_recv() {
            self.handle(event, &mut report);
        }
        report
    }

    /// Wait for the next event and apply it.
    pub async fn process_next(&mut self) -> PumpReport {
        let mut report = PumpReport::default();
        if let Some(event) = self.rx.recv().await {
            self.handle(event, &mut report);
        }
        report
    }

    /// Stop the interval timer. Pending fetches still report back but no new
    /// ticks are produced. Returns `false` if already stopped.
    pub fn shutdown(&mut self) -> bool {
        let stopped = self.timer.stop();
        if stopped {
            tracing::debug!(source = self.source.name(), "Polling stopped");
        }
        stopped
    }

    pub const fn is_polling(&self) -> bool {
        self.timer.is_running()
    }

    fn handle(&mut self, event: PollEvent<S::Key, S::Output>, report: &mut PumpReport) {
        match event {
            PollEvent::Tick => {
                if let Some(ticket) = self.cache.poll() {
                    report.polled += 1;
                    self.dispatch(ticket);
                }
            }
            PollEvent::Done(ticket, result) => match self.cache.complete(&ticket, result) {
                Completion::Applied => report.applied += 1,
                Completion::Failed => {
                    report.failed += 1;
                    if let Some(err) = self.cache.view().error {
                        tracing::warn!(source = self.source.name(), error = %err, "Query failed");
                    }
                }
                Completion::Retry(retry) => {
                    report.retried += 1;
                    tracing::debug!(source = self.source.name(), "Retrying after transient failure");
                    self.dispatch(retry);
                }
                Completion::Unauthorized => {
                    report.unauthorized = true;
                    tracing::warn!(source = self.source.name(), "Query rejected: session invalid");
                }
                Completion::Discarded => report.discarded += 1,
            },
        }
    }

    fn dispatch(&self, ticket: FetchTicket<S::Key>) {
        let source = Arc::clone(&self.source);
        let tx = self.tx.clone();

        tracing::trace!(
            source = source.name(),
            key = ?ticket.key(),
            attempt = ticket.attempt(),
            "Dispatching fetch"
        );

        self.runtime.spawn(async move {
            let result = source.fetch(ticket.key()).await;
            // The receiver is gone once the query was dropped.
            let _ = tx.send(PollEvent::Done(ticket, result));
        });
    }
}
