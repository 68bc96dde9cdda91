//! Keeps listings in sync with case changes.
//!
//! Each live listing that cares about case events gets one task, started by
//! [subscribe]. The task is owned by the returned [Subscription] and stops
//! when that is dropped, when the case closes, or when the listing is gone.
use std::sync::Weak;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, instrument, trace, warn, Instrument};

use casetree_casestore::{Case, CaseEvent};

/// Something that can be refreshed in reaction to case events.
#[async_trait]
pub trait Refresher: Send + Sync + 'static {
    fn is_refresh_required(&self, event: &CaseEvent) -> bool;

    async fn refresh_from_event(&self);
}

/// Coalesces bursts of events into few refreshes.
///
/// A refresh is due no earlier than `interval` after the previous one.
/// Events arriving while a refresh is pending don't schedule another.
#[derive(Debug, Clone)]
pub struct RefreshThrottler {
    interval: Duration,
    last_refresh: Instant,
    pending: Option<Instant>,
}

impl RefreshThrottler {
    /// `now` counts as a refresh: the listing was just computed.
    pub fn new(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            last_refresh: now,
            pending: None,
        }
    }

    /// Records a qualifying event and returns when the refresh is due.
    pub fn schedule(&mut self, now: Instant) -> Instant {
        if let Some(due) = self.pending {
            return due;
        }
        let due = std::cmp::max(now, self.last_refresh + self.interval);
        self.pending = Some(due);
        due
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending
    }

    pub fn refreshed(&mut self, now: Instant) {
        self.last_refresh = now;
        self.pending = None;
    }
}

/// Owns the listener task of one listing. Dropping it stops the task.
#[derive(Debug)]
pub struct Subscription {
    handle: JoinHandle<()>,
}

impl Subscription {
    /// Whether the listener stopped by itself (case closed, target gone).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Listens for events on `case` and refreshes `target` when it asks for it,
/// at most once per `interval`.
#[instrument(skip_all, fields(case.name = case.name()))]
pub fn subscribe<R: Refresher>(case: &Case, target: Weak<R>, interval: Duration) -> Subscription {
    // subscribe before spawning, so nothing published from now on is missed.
    let mut rx = case.events().subscribe();
    let case = case.clone();

    let span = tracing::Span::current();
    let handle = tokio::spawn(
        async move {
            let mut throttler = RefreshThrottler::new(interval, Instant::now());
            loop {
                let deadline = throttler.deadline();
                tokio::select! {
                    res = rx.recv() => match res {
                        Ok(CaseEvent::CurrentCaseChanged { open: false }) => {
                            debug!("case closed, stopping");
                            break;
                        }
                        Ok(event) => {
                            let Some(target) = target.upgrade() else {
                                break;
                            };
                            if target.is_refresh_required(&event) {
                                let due = throttler.schedule(Instant::now());
                                trace!(event = event.name(), ?due, "refresh scheduled");
                            }
                        }
                        Err(RecvError::Lagged(missed)) => {
                            warn!(missed, "missed case events, refreshing");
                            throttler.schedule(Instant::now());
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                        // events can still arrive for a case that already closed
                        if !case.is_open() {
                            debug!("no current case, stopping");
                            break;
                        }
                        let Some(target) = target.upgrade() else {
                            break;
                        };
                        target.refresh_from_event().await;
                        throttler.refreshed(Instant::now());
                    }
                }
            }
        }
        .instrument(span),
    );

    Subscription { handle }
}
