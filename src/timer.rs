//! Cancelable delayed callbacks for computer turns.
//!
//! A scheduler hands out a [`TimerHandle`] and later delivers the matching
//! [`TimerTicket`] back to whoever drives the session. The session only acts
//! on a ticket if it still matches the handle held by the live phase, so a
//! ticket that outlived its phase is dropped.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use log::trace;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::AbortHandle;

/// Identifies one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerTicket(u64);

impl TimerTicket {
    pub fn id(self) -> u64 {
        self.0
    }
}

/// A scheduled callback that has not fired yet.
#[derive(Debug)]
pub struct TimerHandle {
    ticket: TimerTicket,
    abort: Option<AbortHandle>,
}

impl TimerHandle {
    pub fn ticket(&self) -> TimerTicket {
        self.ticket
    }

    /// Stop the callback from being delivered, where the scheduler supports
    /// it. Stale tickets are rejected by the session either way.
    pub fn cancel(self) {
        trace!("cancelling timer {}", self.ticket.0);
        if let Some(abort) = self.abort {
            abort.abort();
        }
    }
}

/// Source of delayed callbacks.
pub trait Scheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle;
}

/// Sleeps on the tokio runtime and sends fired tickets down a channel.
///
/// Must be used from within a runtime.
#[derive(Debug)]
pub struct TokioScheduler {
    next: u64,
    tx: UnboundedSender<TimerTicket>,
}

impl TokioScheduler {
    pub fn new() -> (Self, UnboundedReceiver<TimerTicket>) {
        let (tx, rx) = unbounded_channel();
        (Self { next: 0, tx }, rx)
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let ticket = TimerTicket(self.next);
        self.next += 1;
        let tx = self.tx.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(ticket);
        });
        TimerHandle {
            ticket,
            abort: Some(task.abort_handle()),
        }
    }
}

/// Scheduler that only queues tickets. The owner decides when they fire.
///
/// Clones share the same queue, so a test can keep one clone while the
/// session owns another.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    inner: Rc<RefCell<ManualQueue>>,
}

#[derive(Debug, Default)]
struct ManualQueue {
    next: u64,
    queue: VecDeque<(TimerTicket, Duration)>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the oldest queued ticket.
    pub fn pop(&self) -> Option<TimerTicket> {
        self.inner.borrow_mut().queue.pop_front().map(|(t, _)| t)
    }

    /// Tickets queued so far, with the delay they were scheduled for.
    pub fn pending(&self) -> Vec<(TimerTicket, Duration)> {
        self.inner.borrow().queue.iter().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().queue.is_empty()
    }
}

impl Scheduler for ManualScheduler {
    fn schedule(&mut self, delay: Duration) -> TimerHandle {
        let mut inner = self.inner.borrow_mut();
        let ticket = TimerTicket(inner.next);
        inner.next += 1;
        inner.queue.push_back((ticket, delay));
        TimerHandle {
            ticket,
            abort: None,
        }
    }
}
