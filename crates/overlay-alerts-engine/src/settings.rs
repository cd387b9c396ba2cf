//! Settings change watcher.
//!
//! Models the realtime settings push channel as a cancellable subscription:
//! [`subscribe`] spawns a watcher that re-reads one overlay's settings
//! document and invokes the callback whenever the revision stamp moves (and
//! once for the initial document). The returned handle owns cancellation and
//! releases the thread on drop, so no callback ever fires after teardown.
//! A failed read keeps the previously delivered settings in effect.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use overlay_alerts_core::OverlaySettings;
use overlay_alerts_db::AlertStore;

/// Subscribe to settings changes for one overlay identity.
pub fn subscribe(
    database_url: impl Into<String>,
    overlay_id: impl Into<String>,
    interval: Duration,
    on_change: impl Fn(OverlaySettings) + Send + 'static,
) -> SettingsSubscription {
    let database_url = database_url.into();
    let overlay_id = overlay_id.into();
    let stop = Arc::new(AtomicBool::new(false));
    let thread_stop = Arc::clone(&stop);

    let join = thread::Builder::new()
        .name("overlay-settings-watch".into())
        .spawn(move || {
            watch(&database_url, &overlay_id, interval, &thread_stop, on_change);
        })
        .expect("spawn overlay-settings-watch thread");

    SettingsSubscription {
        join: Some(join),
        stop,
    }
}

fn watch(
    database_url: &str,
    overlay_id: &str,
    interval: Duration,
    stop: &AtomicBool,
    on_change: impl Fn(OverlaySettings),
) {
    let mut last_revision: Option<i64> = None;

    while !stop.load(Ordering::Relaxed) {
        match AlertStore::open_url(database_url).and_then(|store| store.get_settings(overlay_id)) {
            Ok(snapshot) => {
                if last_revision != Some(snapshot.updated_at) {
                    last_revision = Some(snapshot.updated_at);
                    on_change(snapshot.settings);
                }
            }
            Err(err) => {
                // Previously delivered settings stay in effect.
                tracing::debug!(overlay_id, "settings read failed: {err}");
            }
        }

        // Sleep in small increments so we notice cancellation quickly.
        let mut remaining = interval;
        let chunk = Duration::from_millis(50);
        while remaining > Duration::ZERO && !stop.load(Ordering::Relaxed) {
            let sleep = remaining.min(chunk);
            thread::sleep(sleep);
            remaining = remaining.saturating_sub(sleep);
        }
    }
}

/// Cancellable handle for one settings subscription.
pub struct SettingsSubscription {
    join: Option<JoinHandle<()>>,
    stop: Arc<AtomicBool>,
}

impl SettingsSubscription {
    /// Cancel the subscription and wait for the watcher to exit.
    pub fn cancel(&mut self) {
        self.stop.store(true, Ordering::Relaxed);
        if let Some(join) = self.join.take() {
            let _ = join.join();
        }
    }
}

impl Drop for SettingsSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}
