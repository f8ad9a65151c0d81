//! Tween stepping strategies: a dedicated periodic-timer thread, or an
//! externally pumped loop. The strategy is selected at construction.

use crate::error::{Result, TempolineError};
use crate::tween::{Lerp, Tween};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Anything the driver can advance with a time delta.
pub trait Steppable: Send + Sync {
    /// Advances by `delta` seconds. Driver deltas are always non-negative.
    fn drive(&self, delta: f64);

    /// Terminal entries are dropped from the driver after the tick that
    /// observed them.
    fn is_terminal(&self) -> bool;
}

impl<V: Lerp> Steppable for Tween<V> {
    fn drive(&self, delta: f64) {
        // Delta validity is the driver's invariant; a failure here would
        // mean a negative wall-clock measurement.
        if let Err(err) = self.step(delta) {
            log::error!("tween {} rejected driver step: {}", self.id(), err);
        }
    }

    fn is_terminal(&self) -> bool {
        self.state().is_terminal()
    }
}

struct DriverShared {
    active: Mutex<Vec<Arc<dyn Steppable>>>,
    shutdown: AtomicBool,
}

impl DriverShared {
    fn lock_active(&self) -> MutexGuard<'_, Vec<Arc<dyn Steppable>>> {
        self.active.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Owns the set of active tweens and steps them, decoupled from any render
/// or physics loop.
///
/// [`TweenDriver::background`] steps on a dedicated timer thread: every
/// `step_interval` it measures the wall time actually elapsed since its
/// previous tick and drives each registered tween with that delta. The
/// thread is spawned lazily when the first tween registers and joined on
/// drop. One background driver per world is the intended shape.
///
/// [`TweenDriver::manual`] spawns nothing; the owner advances time itself
/// with [`TweenDriver::pump`].
///
/// A tick snapshots the registered handles, steps them with the registry
/// lock released, then prunes terminal entries, so tween callbacks can
/// register new tweens without deadlocking and concurrent registration or
/// cancellation takes effect at the next tick boundary.
pub struct TweenDriver {
    interval: Duration,
    background: bool,
    shared: Arc<DriverShared>,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl TweenDriver {
    /// A driver stepped by its own timer thread at `step_interval`.
    pub fn background(step_interval: Duration) -> Self {
        Self {
            interval: step_interval,
            background: true,
            shared: Arc::new(DriverShared {
                active: Mutex::new(Vec::new()),
                shutdown: AtomicBool::new(false),
            }),
            thread: Mutex::new(None),
        }
    }

    /// A driver advanced by the caller's own loop via [`TweenDriver::pump`].
    pub fn manual() -> Self {
        Self {
            interval: Duration::ZERO,
            background: false,
            shared: Arc::new(DriverShared {
                active: Mutex::new(Vec::new()),
                shutdown: AtomicBool::new(false),
            }),
            thread: Mutex::new(None),
        }
    }

    /// Hands a steppable to the driver. For a background driver this starts
    /// the timer thread if it is not running yet.
    pub fn register(&self, steppable: Arc<dyn Steppable>) {
        self.shared.lock_active().push(steppable);
        if self.background {
            self.ensure_thread();
        }
    }

    /// Registers a tween and starts it playing.
    pub fn animate<V: Lerp>(&self, tween: &Tween<V>) {
        self.register(Arc::new(tween.clone()));
        tween.play();
    }

    /// Advances every registered tween by `delta` seconds. Only available
    /// on a manually pumped driver.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::Driver`] on a background driver and
    /// [`TempolineError::InvalidDelta`] for negative or non-finite deltas.
    pub fn pump(&self, delta: f64) -> Result<()> {
        if self.background {
            return Err(TempolineError::Driver(
                "pump() is only available on a manually pumped driver".into(),
            ));
        }
        if !delta.is_finite() || delta < 0.0 {
            return Err(TempolineError::InvalidDelta(delta));
        }
        tick(&self.shared, delta);
        Ok(())
    }

    /// Number of non-terminal entries the driver currently owns.
    pub fn active_count(&self) -> usize {
        self.shared
            .lock_active()
            .iter()
            .filter(|steppable| !steppable.is_terminal())
            .count()
    }

    fn ensure_thread(&self) {
        let mut slot = self.thread.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if slot.is_some() {
            return;
        }
        let shared = Arc::clone(&self.shared);
        let interval = self.interval;
        match thread::Builder::new()
            .name("tempoline-tween-driver".into())
            .spawn(move || run_driver(shared, interval))
        {
            Ok(handle) => {
                log::debug!("tween driver thread started, interval {:?}", interval);
                *slot = Some(handle);
            }
            Err(err) => log::error!("failed to spawn tween driver thread: {}", err),
        }
    }
}

impl Drop for TweenDriver {
    fn drop(&mut self) {
        self.shared.shutdown.store(true, Ordering::Release);
        let handle = self
            .thread
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = handle {
            let _ = handle.join();
            log::debug!("tween driver thread stopped");
        }
    }
}

fn run_driver(shared: Arc<DriverShared>, interval: Duration) {
    let mut last = Instant::now();
    while !shared.shutdown.load(Ordering::Acquire) {
        thread::sleep(interval);
        let now = Instant::now();
        let delta = now.duration_since(last).as_secs_f64();
        last = now;
        tick(&shared, delta);
    }
}

fn tick(shared: &DriverShared, delta: f64) {
    let snapshot: Vec<Arc<dyn Steppable>> = shared.lock_active().clone();
    if snapshot.is_empty() {
        return;
    }
    let mut any_terminal = false;
    for steppable in &snapshot {
        steppable.drive(delta);
        if steppable.is_terminal() {
            any_terminal = true;
        }
    }
    if any_terminal {
        shared
            .lock_active()
            .retain(|steppable| !steppable.is_terminal());
    }
}
