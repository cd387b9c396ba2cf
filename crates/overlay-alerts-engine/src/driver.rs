//! Background playback driver.
//!
//! Owns one [`PlaybackQueue`] on a dedicated thread: polls the source on the
//! configured interval, ticks the state machine every `TICK`, publishes the
//! current alert + exit flag into [`OverlayState`], and issues one
//! acknowledgement request per completed alert. All queue mutation happens
//! on this single thread. Deadlines are absolute instants, so a slow fetch
//! delays event publication but never the timing bookkeeping itself.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use overlay_alerts_core::{Config, PlaybackQueue, Transition};

use crate::source::AlertSource;
use crate::state::{OverlayState, PlaybackEvent};

/// State machine tick cadence; also the shutdown responsiveness bound.
const TICK: Duration = Duration::from_millis(100);

/// Drives one overlay's playback. Call [`Self::start`] to spawn the thread.
pub struct PlaybackDriver {
    state: Arc<OverlayState>,
    source: Box<dyn AlertSource>,
    overlay_id: String,
    poll_interval: Duration,
    fallback_duration: Duration,
    stop: Arc<AtomicBool>,
}

/// Handle returned by [`PlaybackDriver::start`].
pub struct PlaybackDriverHandle {
    join: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl PlaybackDriver {
    #[must_use]
    pub fn new(
        state: Arc<OverlayState>,
        source: Box<dyn AlertSource>,
        overlay_id: impl Into<String>,
        config: &Config,
    ) -> Self {
        Self {
            state,
            source,
            overlay_id: overlay_id.into(),
            poll_interval: config.playback_poll_interval(),
            fallback_duration: Duration::from_secs_f64(config.default_message_duration_secs),
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Override the polling interval (for tests).
    #[must_use]
    pub const fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Spawn the background playback thread.
    #[must_use]
    pub fn start(self) -> PlaybackDriverHandle {
        let stop = Arc::clone(&self.stop);
        let join = thread::Builder::new()
            .name("overlay-playback".into())
            .spawn(move || self.run())
            .expect("spawn overlay-playback thread");
        PlaybackDriverHandle {
            join: Some(join),
            stop,
        }
    }

    /// Main playback loop.
    fn run(self) {
        let initial_duration = self
            .state
            .settings()
            .map_or(self.fallback_duration, |s| s.message_duration());
        let mut queue = PlaybackQueue::new(initial_duration);
        let mut last_poll: Option<Instant> = None;

        while !self.stop.load(Ordering::Relaxed) {
            // Poll for newly observed unacknowledged alerts. A failed fetch
            // leaves the backlog unchanged and retries on the next interval.
            let due = last_poll.is_none_or(|at| at.elapsed() >= self.poll_interval);
            if due {
                match self.source.fetch_unacknowledged(&self.overlay_id) {
                    Ok(batch) => {
                        queue.merge(batch);
                    }
                    Err(err) => {
                        tracing::debug!(overlay_id = %self.overlay_id, "fetch failed: {err}");
                    }
                }
                last_poll = Some(Instant::now());
            }

            // Settings changes apply from the next promotion onward.
            if let Some(settings) = self.state.settings() {
                queue.set_message_duration(settings.message_duration());
            }

            let transitions = queue.tick(Instant::now());
            for transition in transitions {
                self.state.push_event(match transition {
                    Transition::Shown(alert) => PlaybackEvent::Shown { alert },
                    Transition::RemovalStarted(alert_id) => {
                        PlaybackEvent::RemovalStarted { alert_id }
                    }
                    Transition::Cleared(alert_id) => PlaybackEvent::Cleared { alert_id },
                });
            }
            self.state
                .update_current(queue.current().cloned(), queue.is_removing());

            // Fire-and-forget acknowledgements. A failure never blocks
            // advancement; forgetting the id lets the next poll re-observe
            // the alert (accepted at-least-once re-display window).
            for alert_id in queue.take_pending_acks() {
                match self.source.acknowledge(&alert_id) {
                    Ok(()) => {
                        self.state.push_event(PlaybackEvent::Acknowledged { alert_id });
                    }
                    Err(err) => {
                        tracing::warn!(
                            overlay_id = %self.overlay_id,
                            alert_id = %alert_id,
                            "acknowledge failed, alert may replay: {err}"
                        );
                        queue.forget_acknowledged(&alert_id);
                        self.state
                            .push_event(PlaybackEvent::AcknowledgeFailed { alert_id });
                    }
                }
            }

            // Sleep in small increments so we notice shutdown quickly.
            let mut remaining = TICK;
            let chunk = Duration::from_millis(20);
            while remaining > Duration::ZERO && !self.stop.load(Ordering::Relaxed) {
                let sleep = remaining.min(chunk);
                thread::sleep(sleep);
                remaining = remaining.saturating_sub(sleep);
            }
        }
    }
}

impl PlaybackDriverHandle {
    /// Signal the driver to stop and wait for the thread to exit.
    pub fn stop(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }

    /// Signal stop without waiting.
    pub fn signal_stop(&self) {
        self.stop.store(true, Ordering::Relaxed);
    }

    /// Wait for the thread to exit (call after `signal_stop`).
    pub fn join(&mut self) {
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for PlaybackDriverHandle {
    fn drop(&mut self) {
        self.stop();
    }
}
