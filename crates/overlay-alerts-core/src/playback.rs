//! Playback queue engine.
//!
//! Guarantees in-order, timed display of each unacknowledged [`Alert`] for
//! one overlay identity. The engine is an explicit finite-state machine that
//! owns its own deadlines; a driver feeds it merged fetch batches and calls
//! [`PlaybackQueue::tick`] with the current instant, so it is testable
//! without timers or a rendering surface.
//!
//! Phases: `idle` (no current alert) → `showing` (alert visible for the
//! configured duration) → `removing` (fixed exit-animation window) → back to
//! `idle`, promoting the next backlog entry in the same tick so there is no
//! gap frame between consecutive alerts.

use std::collections::{HashSet, VecDeque};
use std::time::{Duration, Instant};

use crate::models::Alert;

/// Fixed exit-animation window, independent of the configured duration.
pub const REMOVE_ANIMATION: Duration = Duration::from_millis(800);

/// Stage of one alert's display lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Showing,
    Removing,
}

/// State transition produced by [`PlaybackQueue::tick`], for the driver to
/// publish to the renderer-facing bridge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// An alert was promoted from the backlog and is now visible.
    Shown(Alert),
    /// The duration elapsed; the exit animation started.
    RemovalStarted(String),
    /// The exit animation finished; the slot is clear and an acknowledgement
    /// for this id is pending.
    Cleared(String),
}

/// Ordered, deduplicated backlog plus the single "now playing" slot.
#[derive(Debug)]
pub struct PlaybackQueue {
    backlog: VecDeque<Alert>,
    current: Option<Alert>,
    phase: Phase,
    deadline: Option<Instant>,
    /// Duration applied to the next promotion; an in-flight display is never
    /// retimed when this changes.
    message_duration: Duration,
    /// Ids whose display lifecycle completed locally. Suppresses re-enqueue
    /// while an acknowledgement is in flight or the store lags behind it.
    acknowledged: HashSet<String>,
    /// Completed ids awaiting an acknowledgement request by the driver.
    pending_acks: Vec<String>,
}

impl PlaybackQueue {
    #[must_use]
    pub fn new(message_duration: Duration) -> Self {
        Self {
            backlog: VecDeque::new(),
            current: None,
            phase: Phase::Idle,
            deadline: None,
            message_duration,
            acknowledged: HashSet::new(),
            pending_acks: Vec::new(),
        }
    }

    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// The alert currently occupying the "now playing" slot.
    #[must_use]
    pub const fn current(&self) -> Option<&Alert> {
        self.current.as_ref()
    }

    /// Exit flag for the renderer: true from the removing transition until
    /// the slot clears.
    #[must_use]
    pub fn is_removing(&self) -> bool {
        self.phase == Phase::Removing
    }

    #[must_use]
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Whether an id is held anywhere in the engine (backlog or slot).
    #[must_use]
    pub fn contains(&self, id: &str) -> bool {
        self.current.as_ref().is_some_and(|a| a.id == id)
            || self.backlog.iter().any(|a| a.id == id)
    }

    /// Duration applied from the next promotion onward.
    pub fn set_message_duration(&mut self, duration: Duration) {
        self.message_duration = duration;
    }

    /// Merge newly observed alerts into the backlog.
    ///
    /// Alerts already flagged acknowledged are dropped, as is any id already
    /// present in the backlog, the slot, or the local acknowledged set (an
    /// acknowledgement may be in flight before the store reflects it).
    /// Within one batch, alerts are ordered by `(created_at, id)`; across
    /// batches, insertion is discovery-order at the tail; the backlog is
    /// never re-sorted retroactively.
    ///
    /// Returns the number of alerts enqueued.
    pub fn merge(&mut self, mut batch: Vec<Alert>) -> usize {
        batch.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });

        let mut enqueued = 0;
        for alert in batch {
            if alert.acknowledged
                || self.acknowledged.contains(&alert.id)
                || self.contains(&alert.id)
            {
                continue;
            }
            self.backlog.push_back(alert);
            enqueued += 1;
        }
        if enqueued > 0 {
            tracing::debug!(enqueued, backlog = self.backlog.len(), "merged alerts");
        }
        enqueued
    }

    /// Drain the ids whose display lifecycle completed since the last call.
    /// The driver issues one acknowledgement request per id, fire-and-forget.
    pub fn take_pending_acks(&mut self) -> Vec<String> {
        std::mem::take(&mut self.pending_acks)
    }

    /// Forget a locally acknowledged id after its acknowledgement request
    /// failed, so the next poll re-observes the still-unacknowledged alert.
    /// This re-display window is the accepted at-least-once tradeoff.
    pub fn forget_acknowledged(&mut self, id: &str) {
        self.acknowledged.remove(id);
    }

    /// Advance the state machine to `now`, returning the transitions that
    /// occurred. Promotion out of idle happens in the same tick a slot
    /// clears, so consecutive alerts play back-to-back.
    pub fn tick(&mut self, now: Instant) -> Vec<Transition> {
        let mut transitions = Vec::new();

        loop {
            match self.phase {
                Phase::Idle => {
                    let Some(next) = self.backlog.pop_front() else {
                        break;
                    };
                    self.deadline = Some(now + self.message_duration);
                    self.phase = Phase::Showing;
                    transitions.push(Transition::Shown(next.clone()));
                    self.current = Some(next);
                }
                Phase::Showing => {
                    if !self.deadline_passed(now) {
                        break;
                    }
                    self.deadline = Some(now + REMOVE_ANIMATION);
                    self.phase = Phase::Removing;
                    if let Some(alert) = &self.current {
                        transitions.push(Transition::RemovalStarted(alert.id.clone()));
                    }
                }
                Phase::Removing => {
                    if !self.deadline_passed(now) {
                        break;
                    }
                    self.deadline = None;
                    self.phase = Phase::Idle;
                    if let Some(alert) = self.current.take() {
                        self.acknowledged.insert(alert.id.clone());
                        self.pending_acks.push(alert.id.clone());
                        transitions.push(Transition::Cleared(alert.id));
                    }
                }
            }
        }

        transitions
    }

    fn deadline_passed(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}
