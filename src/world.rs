//! World facade wiring the shared clock, the tween driver, and the event
//! queue together.

use crate::clock::OffsetStopwatch;
use crate::config::TempolineConfig;
use crate::crossfade::CrossfadeSession;
use crate::driver::TweenDriver;
use crate::error::Result;
use crate::events::{EventBus, TempolineEvent};
use crate::interactive::Interactive;
use crate::output::AudioOutput;
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// Central object for one player session.
///
/// Owns the session [`OffsetStopwatch`], the background [`TweenDriver`],
/// and the event queue. Interactives created through the world share the
/// clock by reference; crossfade sessions share the driver. The world (and
/// with it the driver thread) lives for the session and is torn down on
/// drop.
pub struct TempolineWorld {
    config: TempolineConfig,
    clock: Arc<OffsetStopwatch>,
    driver: Arc<TweenDriver>,
    events: EventBus,
}

impl TempolineWorld {
    pub fn new(config: TempolineConfig) -> Self {
        let driver = Arc::new(TweenDriver::background(config.step_interval));
        Self {
            config,
            clock: Arc::new(OffsetStopwatch::new()),
            driver,
            events: EventBus::new(),
        }
    }

    pub fn config(&self) -> &TempolineConfig {
        &self.config
    }

    /// The session clock. Reads are safe from any thread; run-state
    /// mutation belongs to the session owner.
    pub fn clock(&self) -> &Arc<OffsetStopwatch> {
        &self.clock
    }

    pub fn driver(&self) -> &Arc<TweenDriver> {
        &self.driver
    }

    /// Queued activation and transition events, drained by the host.
    pub fn events(&self) -> &Receiver<TempolineEvent> {
        self.events.receiver()
    }

    /// Creates an interactive bound to the session clock and wired to the
    /// event queue.
    ///
    /// # Errors
    ///
    /// Binding a freshly created interactive cannot fail in practice; the
    /// `Result` mirrors [`Interactive::bind_to`].
    pub fn interactive(&self) -> Result<Interactive> {
        let mut interactive = Interactive::new().with_events(self.events.sender());
        interactive.bind_to(Arc::clone(&self.clock))?;
        Ok(interactive)
    }

    /// Creates a crossfade session on the shared driver with the session
    /// defaults for transition time and easing.
    pub fn crossfade_session(&self, output: Arc<dyn AudioOutput>) -> CrossfadeSession {
        CrossfadeSession::new(
            output,
            Arc::clone(&self.driver),
            self.config.transition_time,
            self.config.easing,
        )
        .with_events(self.events.sender())
    }
}

impl Default for TempolineWorld {
    fn default() -> Self {
        Self::new(TempolineConfig::default())
    }
}
