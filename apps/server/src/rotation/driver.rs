//! Tokio host for an [`AdRotator`].
//!
//! The driver owns the rotation timer. Every transition made through the
//! driver wakes the timer task so the countdown restarts from the new state,
//! and every entry into `Displaying` is reported to the [`EventTracker`] as
//! exactly one impression. The displayed ad is captured under the same lock
//! as the transition and delivered after the lock is released.

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::engine::{AdRotator, RotationError, RotationState};
use crate::models::{Ad, GlobalTracking};
use crate::tracking::EventTracker;

/// Ad entered by a transition, with the rotator's tracking fallback
type Impression = (Ad, Option<GlobalTracking>);

fn displayed(rotator: &AdRotator, entered: Option<usize>) -> Option<Impression> {
    let ad = rotator.ads().get(entered?)?;
    Some((ad.clone(), rotator.global_tracking().cloned()))
}

struct Shared {
    rotator: Mutex<AdRotator>,
    tracker: Arc<EventTracker>,
    wake: Notify,
}

impl Shared {
    fn rotator(&self) -> MutexGuard<'_, AdRotator> {
        // A panic mid-transition leaves a valid state behind; keep going
        self.rotator.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn impression(&self, shown: Option<Impression>) {
        if let Some((ad, global)) = shown {
            log::debug!("Displaying ad {} ({})", ad.id, ad.title);
            self.tracker.track_impression(&ad, global.as_ref());
        }
    }

    fn rearm(&self) {
        self.wake.notify_one();
    }
}

/// Runs a rotator on the tokio runtime until dropped
pub struct RotationDriver {
    shared: Arc<Shared>,
    task: JoinHandle<()>,
}

impl RotationDriver {
    /// Spawns the timer task and fires the impression for the initial ad.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(rotator: AdRotator, tracker: Arc<EventTracker>) -> Self {
        let initial = displayed(&rotator, rotator.current_index());
        let shared = Arc::new(Shared {
            rotator: Mutex::new(rotator),
            tracker,
            wake: Notify::new(),
        });

        shared.impression(initial);
        let task = tokio::spawn(run(shared.clone()));

        Self { shared, task }
    }

    pub fn state(&self) -> RotationState {
        self.shared.rotator().state()
    }

    pub fn current_index(&self) -> Option<usize> {
        self.shared.rotator().current_index()
    }

    pub fn current_ad(&self) -> Option<Ad> {
        self.shared.rotator().current_ad().cloned()
    }

    pub fn pointer_enter(&self) -> bool {
        let paused = self.shared.rotator().pointer_enter();
        if paused {
            self.shared.rearm();
        }
        paused
    }

    pub fn pointer_leave(&self) -> Option<usize> {
        let (entered, shown) = {
            let mut rotator = self.shared.rotator();
            let entered = rotator.pointer_leave();
            (entered, displayed(&rotator, entered))
        };
        self.transitioned(entered, shown)
    }

    pub fn navigate(&self, index: usize) -> Result<usize, RotationError> {
        let (entered, shown) = {
            let mut rotator = self.shared.rotator();
            let entered = rotator.navigate(index)?;
            (entered, displayed(&rotator, Some(entered)))
        };
        self.transitioned(Some(entered), shown);
        Ok(entered)
    }

    /// Replaces the ad list, re-filtering eligibility at `now`
    pub fn set_ads(&self, ads: &[Ad], now: DateTime<Utc>) -> Option<usize> {
        let (entered, shown) = {
            let mut rotator = self.shared.rotator();
            let entered = rotator.set_ads(ads, now);
            (entered, displayed(&rotator, entered))
        };
        self.shared.rearm();
        self.shared.impression(shown);
        entered
    }

    /// Reports a click on the ad currently shown
    pub fn click(&self) -> bool {
        let snapshot = {
            let rotator = self.shared.rotator();
            rotator
                .current_ad()
                .cloned()
                .map(|ad| (ad, rotator.global_tracking().cloned()))
        };

        match snapshot {
            Some((ad, global)) => {
                self.shared.tracker.track_click(&ad, global.as_ref());
                true
            }
            None => false,
        }
    }

    fn transitioned(&self, entered: Option<usize>, shown: Option<Impression>) -> Option<usize> {
        if entered.is_some() {
            self.shared.rearm();
            self.shared.impression(shown);
        }
        entered
    }
}

impl Drop for RotationDriver {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn run(shared: Arc<Shared>) {
    loop {
        let (armed, interval) = {
            let rotator = shared.rotator();
            (rotator.timer_armed(), rotator.interval())
        };

        if !armed {
            shared.wake.notified().await;
            continue;
        }

        tokio::select! {
            _ = tokio::time::sleep(interval) => {
                let shown = {
                    let mut rotator = shared.rotator();
                    let entered = rotator.tick();
                    displayed(&rotator, entered)
                };
                shared.impression(shown);
            }
            _ = shared.wake.notified() => {}
        }
    }
}
