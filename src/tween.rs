//! Value tweening: a time-bounded interpolation advanced by discrete steps.

use crate::easing::Easing;
use crate::error::{Result, TempolineError};
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

/// Values a tween can interpolate.
pub trait Lerp: Copy + Send + Sync + 'static {
    fn lerp(self, other: Self, t: f64) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t as f32
    }
}

impl Lerp for f64 {
    fn lerp(self, other: Self, t: f64) -> Self {
        self + (other - self) * t
    }
}

/// Tween lifecycle. `Completed` and `Cancelled` are terminal: a finished
/// tween is never reused, a new one is constructed to animate the same
/// target again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TweenState {
    Idle,
    Playing,
    Paused,
    Completed,
    Cancelled,
}

impl TweenState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TweenState::Completed | TweenState::Cancelled)
    }
}

type UpdateFn<V> = Arc<dyn Fn(V) + Send + Sync>;
type CompleteFn<V> = Box<dyn FnOnce(V) + Send>;

struct TweenInner<V: Lerp> {
    duration: f64,
    elapsed: f64,
    easing: Easing,
    start: V,
    end: V,
    state: TweenState,
    value: V,
    on_update: Option<UpdateFn<V>>,
    on_complete: Option<CompleteFn<V>>,
}

/// A cheaply cloneable handle to one interpolation.
///
/// All handles share the same state behind a mutex, so caller threads and
/// the driver thread observe a serialized state machine: a `pause` or
/// `cancel` issued from another thread takes effect no later than the next
/// driver tick.
///
/// Callbacks registered with [`Tween::on_update`] and [`Tween::on_complete`]
/// are invoked synchronously on the step that produced the value, after the
/// internal lock has been released, so they may query the tween freely.
/// They run on whichever thread drives the step (the background driver for
/// driver-registered tweens).
pub struct Tween<V: Lerp = f32> {
    id: Uuid,
    inner: Arc<Mutex<TweenInner<V>>>,
}

impl<V: Lerp> Clone for Tween<V> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Lerp> Tween<V> {
    /// Creates an idle tween from `start` to `end` over `duration` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::InvalidDuration`] if `duration` is not a
    /// positive finite number.
    pub fn new(start: V, end: V, duration: f64, easing: Easing) -> Result<Self> {
        if !duration.is_finite() || duration <= 0.0 {
            return Err(TempolineError::InvalidDuration(duration));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            inner: Arc::new(Mutex::new(TweenInner {
                duration,
                elapsed: 0.0,
                easing,
                start,
                end,
                state: TweenState::Idle,
                value: start,
                on_update: None,
                on_complete: None,
            })),
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    fn lock(&self) -> MutexGuard<'_, TweenInner<V>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Registers a callback invoked with the freshly interpolated value on
    /// every effective `step` or `seek`. Replaces any previous callback.
    pub fn on_update(&self, callback: impl Fn(V) + Send + Sync + 'static) {
        self.lock().on_update = Some(Arc::new(callback));
    }

    /// Registers a callback invoked exactly once, on the step that reaches
    /// the full duration. A cancelled tween never completes.
    pub fn on_complete(&self, callback: impl FnOnce(V) + Send + 'static) {
        self.lock().on_complete = Some(Box::new(callback));
    }

    /// Idle/Paused -> Playing. No effect in any other state.
    pub fn play(&self) {
        let mut inner = self.lock();
        if matches!(inner.state, TweenState::Idle | TweenState::Paused) {
            inner.state = TweenState::Playing;
        }
    }

    /// Playing -> Paused; elapsed time is frozen. No effect otherwise.
    pub fn pause(&self) {
        let mut inner = self.lock();
        if inner.state == TweenState::Playing {
            inner.state = TweenState::Paused;
        }
    }

    /// Advances elapsed time by `delta` seconds, clamped to the duration,
    /// and recomputes the eased output value. A no-op unless Playing; in
    /// particular, stepping a cancelled tween does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::InvalidDelta`] for negative or non-finite
    /// deltas. Rewinding goes through [`Tween::seek`] instead, keeping
    /// stepped time monotonic.
    pub fn step(&self, delta: f64) -> Result<()> {
        if !delta.is_finite() || delta < 0.0 {
            return Err(TempolineError::InvalidDelta(delta));
        }
        let (value, update, complete) = {
            let mut inner = self.lock();
            if inner.state != TweenState::Playing {
                return Ok(());
            }
            inner.elapsed = (inner.elapsed + delta).min(inner.duration);
            let fraction = inner.easing.apply(inner.elapsed / inner.duration);
            inner.value = inner.start.lerp(inner.end, fraction);
            let finished = inner.elapsed >= inner.duration;
            if finished {
                inner.state = TweenState::Completed;
            }
            let complete = if finished { inner.on_complete.take() } else { None };
            (inner.value, inner.on_update.clone(), complete)
        };
        if let Some(update) = update {
            update(value);
        }
        if let Some(complete) = complete {
            log::debug!("tween {} completed", self.id);
            complete(value);
        }
        Ok(())
    }

    /// Sets elapsed time directly, clamped to `[0, duration]`, and
    /// recomputes the output value. Does not change state; a no-op on
    /// terminal tweens.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::InvalidDelta`] for non-finite positions.
    pub fn seek(&self, seconds: f64) -> Result<()> {
        if !seconds.is_finite() {
            return Err(TempolineError::InvalidDelta(seconds));
        }
        let (value, update) = {
            let mut inner = self.lock();
            if inner.state.is_terminal() {
                return Ok(());
            }
            inner.elapsed = seconds.clamp(0.0, inner.duration);
            let fraction = inner.easing.apply(inner.elapsed / inner.duration);
            inner.value = inner.start.lerp(inner.end, fraction);
            (inner.value, inner.on_update.clone())
        };
        if let Some(update) = update {
            update(value);
        }
        Ok(())
    }

    /// Cancels the tween and returns its last computed output value, the
    /// continuity read a superseding transition starts from. Subsequent
    /// steps are no-ops and the completion callback will never fire. On an
    /// already terminal tween this just returns the final value.
    pub fn cancel(&self) -> V {
        let mut inner = self.lock();
        if !inner.state.is_terminal() {
            inner.state = TweenState::Cancelled;
            inner.on_complete = None;
            log::debug!("tween {} cancelled at {:.4}s", self.id, inner.elapsed);
        }
        inner.value
    }

    pub fn state(&self) -> TweenState {
        self.lock().state
    }

    /// Last computed output value.
    pub fn value(&self) -> V {
        self.lock().value
    }

    pub fn elapsed(&self) -> f64 {
        self.lock().elapsed
    }

    pub fn duration(&self) -> f64 {
        self.lock().duration
    }

    /// Linear progress fraction in `[0, 1]`, before easing.
    pub fn progress(&self) -> f64 {
        let inner = self.lock();
        inner.elapsed / inner.duration
    }
}
