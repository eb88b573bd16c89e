//! Timer adapter that drives a [`PlaybackController`] on a Tokio runtime.
//!
//! At most one timer task exists per driver. Pausing, seeking, resetting,
//! stepping and dropping cancel it; a speed change while playing replaces it.
//! Every state change is published on a `watch` channel while the controller
//! lock is held, so the channel never lags behind a concurrent command.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use super::controller::{PlaybackController, PlaybackState};
use crate::config::PlaybackConfig;

const MIN_PERIOD: Duration = Duration::from_millis(1);

struct Shared {
    controller: PlaybackController,
    /// Bumped on every cancel; a timer task only ticks while its epoch is current.
    epoch: u64,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    shared.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Usable `(min, max)` speed range: non-positive or non-finite bounds take
/// the defaults and a reversed range is swapped.
fn speed_bounds(config: &PlaybackConfig) -> (f32, f32) {
    let defaults = PlaybackConfig::default();
    let usable = |value: f32, fallback: f32| {
        if value.is_finite() && value > 0.0 {
            value
        } else {
            fallback
        }
    };
    let min = usable(config.min_speed, defaults.min_speed);
    let max = usable(config.max_speed, defaults.max_speed);
    (min.min(max), min.max(max))
}

fn publish(tx: &watch::Sender<PlaybackState>, state: PlaybackState) {
    tx.send_if_modified(|current| {
        if *current == state {
            false
        } else {
            *current = state;
            true
        }
    });
}

pub struct PlaybackDriver {
    shared: Arc<Mutex<Shared>>,
    state_tx: Arc<watch::Sender<PlaybackState>>,
    base_interval: Duration,
    speed: f32,
    min_speed: f32,
    max_speed: f32,
    timer: Option<JoinHandle<()>>,
}

impl PlaybackDriver {
    /// `base_interval` is the tick period at 1x speed.
    pub fn new(
        controller: PlaybackController,
        base_interval: Duration,
        config: &PlaybackConfig,
    ) -> Self {
        let (state_tx, _) = watch::channel(controller.state());
        let (min_speed, max_speed) = speed_bounds(config);
        Self {
            shared: Arc::new(Mutex::new(Shared { controller, epoch: 0 })),
            state_tx: Arc::new(state_tx),
            base_interval,
            speed: 1.0,
            min_speed,
            max_speed,
            timer: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.state_tx.subscribe()
    }

    pub fn state(&self) -> PlaybackState {
        lock(&self.shared).controller.state()
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Current tick period, `base_interval / speed`, never below 1 ms.
    pub fn period(&self) -> Duration {
        self.base_interval.div_f64(f64::from(self.speed)).max(MIN_PERIOD)
    }

    /// Whether a timer task is alive.
    pub fn has_timer(&self) -> bool {
        self.timer.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Start or resume. Must be called from within a Tokio runtime.
    pub fn play(&mut self) -> PlaybackState {
        let state = {
            let mut guard = lock(&self.shared);
            let state = guard.controller.play();
            publish(&self.state_tx, state);
            state
        };
        if matches!(state, PlaybackState::Playing(_)) && !self.has_timer() {
            self.spawn_timer();
        }
        state
    }

    pub fn pause(&mut self) -> PlaybackState {
        self.apply(PlaybackController::pause)
    }

    pub fn seek(&mut self, position: i64) -> PlaybackState {
        self.apply(|controller| controller.seek(position))
    }

    pub fn reset(&mut self) -> PlaybackState {
        self.apply(PlaybackController::reset)
    }

    pub fn step_forward(&mut self) -> PlaybackState {
        self.apply(PlaybackController::step_forward)
    }

    pub fn step_back(&mut self) -> PlaybackState {
        self.apply(PlaybackController::step_back)
    }

    /// Clamp to the configured range; a running timer is replaced.
    pub fn set_speed(&mut self, speed: f32) -> f32 {
        let speed = if speed.is_finite() { speed } else { 1.0 };
        self.speed = speed.clamp(self.min_speed, self.max_speed);

        if self.has_timer() {
            self.cancel_timer();
            if lock(&self.shared).controller.is_playing() {
                self.spawn_timer();
            }
        }
        tracing::debug!(
            speed = self.speed,
            period_ms = self.period().as_millis() as u64,
            "playback speed set"
        );
        self.speed
    }

    fn apply(&mut self, f: impl FnOnce(&mut PlaybackController) -> PlaybackState) -> PlaybackState {
        self.cancel_timer();
        let mut guard = lock(&self.shared);
        let state = f(&mut guard.controller);
        publish(&self.state_tx, state);
        state
    }

    fn cancel_timer(&mut self) {
        lock(&self.shared).epoch += 1;
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }

    fn spawn_timer(&mut self) {
        let shared = Arc::clone(&self.shared);
        let tx = Arc::clone(&self.state_tx);
        let period = self.period();
        let epoch = lock(&self.shared).epoch;

        self.timer = Some(tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let state = {
                    let mut guard = lock(&shared);
                    if guard.epoch != epoch {
                        break;
                    }
                    let state = guard.controller.tick();
                    publish(&tx, state);
                    state
                };
                if !matches!(state, PlaybackState::Playing(_)) {
                    break;
                }
            }
        }));
    }
}

impl Drop for PlaybackDriver {
    fn drop(&mut self) {
        self.cancel_timer();
    }
}
