//! Zone transition policy: crossfading between concurrently available
//! audio sources as the listener's selection changes.

use crate::driver::TweenDriver;
use crate::easing::Easing;
use crate::error::{Result, TempolineError};
use crate::events::TempolineEvent;
use crate::output::{AudioOutput, SourceId};
use crate::tween::Tween;
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

struct Ramp {
    source: SourceId,
    tween: Tween<f32>,
}

/// One logical output mixing slot (e.g. "current zone music").
///
/// The session tracks the most recently selected source, at most one
/// incoming ramp, and every live fade-out keyed by source. A new selection
/// never stacks on an in-flight transition: the in-flight ramps for the
/// sources involved are cancelled, their last sampled levels become the
/// new ramps' start values, and the handoff stays click-free in both
/// directions — including reclaiming a source that was still draining from
/// an earlier retarget. Selection arrives in entry order, so the most
/// recently entered zone always wins.
///
/// Level updates and source stop/start are applied through the
/// [`AudioOutput`] collaborator from the driver's ticks.
pub struct CrossfadeSession {
    output: Arc<dyn AudioOutput>,
    driver: Arc<TweenDriver>,
    events: Option<Sender<TempolineEvent>>,
    transition_time: Duration,
    easing: Easing,
    selected: Option<SourceId>,
    incoming: Option<Ramp>,
    fading_out: HashMap<SourceId, Tween<f32>>,
}

impl CrossfadeSession {
    pub fn new(
        output: Arc<dyn AudioOutput>,
        driver: Arc<TweenDriver>,
        transition_time: Duration,
        easing: Easing,
    ) -> Self {
        Self {
            output,
            driver,
            events: None,
            transition_time,
            easing,
            selected: None,
            incoming: None,
            fading_out: HashMap::new(),
        }
    }

    /// Wires transition notifications onto an event channel.
    pub fn with_events(mut self, sender: Sender<TempolineEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    /// The most recently selected source, if any.
    pub fn selected(&self) -> Option<SourceId> {
        self.selected
    }

    /// Whether any ramp of this session is still in flight, draining
    /// fade-outs from earlier retargets included.
    pub fn is_transitioning(&self) -> bool {
        self.incoming
            .as_ref()
            .is_some_and(|ramp| !ramp.tween.state().is_terminal())
            || self
                .fading_out
                .values()
                .any(|tween| !tween.state().is_terminal())
    }

    /// Handles a selection change using the session defaults.
    /// See [`CrossfadeSession::select_with`].
    pub fn select(&mut self, target: Option<SourceId>) -> Result<()> {
        self.select_with(target, None, None)
    }

    /// Handles a selection change to `target` (`None` means no source is
    /// selected, e.g. the listener left all zones). Per-request duration
    /// and easing take precedence over the session defaults.
    ///
    /// In-flight ramps are cancelled and their last sampled levels carry
    /// over: a reversal before the previous transition completes resumes
    /// from the exact current levels rather than restarting from silence.
    ///
    /// The outgoing fade starts before the new target is asked to play, so
    /// a start failure still silences the previous source (fail-soft): no
    /// incoming ramp is created, the selection becomes `None`, and the
    /// failure is returned once.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::InvalidDuration`] for a zero duration
    /// override, or the [`AudioOutput::play`] error when the target cannot
    /// start.
    pub fn select_with(
        &mut self,
        target: Option<SourceId>,
        transition_time: Option<Duration>,
        easing: Option<Easing>,
    ) -> Result<()> {
        if target == self.selected {
            return Ok(());
        }
        let duration = transition_time.unwrap_or(self.transition_time).as_secs_f64();
        if duration <= 0.0 {
            return Err(TempolineError::InvalidDuration(duration));
        }
        let easing = easing.unwrap_or(self.easing);
        let from = self.selected;

        // Capture in-flight levels before anything else so the new ramps
        // start exactly where the old ones left off.
        let superseded = self
            .incoming
            .take()
            .map(|ramp| (ramp.source, ramp.tween.cancel()));

        self.fading_out
            .retain(|_, tween| !tween.state().is_terminal());

        // Reclaim the target if it is still fading out, no matter how many
        // retargets ago that fade started: cancelling returns its current
        // level and clears the completion callback, so the old ramp can no
        // longer stop the source we are about to raise. Other fade-outs
        // keep draining on the driver and stop their sources at zero.
        let mut target_level = 0.0f32;
        if let Some(tween) = target.and_then(|source| self.fading_out.remove(&source)) {
            target_level = tween.cancel();
        }

        // The audible side to fade out: the superseded incoming source at
        // its captured level, or the settled selection at full level.
        let fade_out = superseded.or_else(|| from.map(|source| (source, 1.0)));

        if let Some((source, level)) = fade_out {
            let tween = Tween::new(level, 0.0, duration, easing)?;
            let output = Arc::clone(&self.output);
            tween.on_update(move |v| output.set_level(source, v.clamp(0.0, 1.0)));
            let output = Arc::clone(&self.output);
            let events = self.events.clone();
            tween.on_complete(move |_| {
                output.set_level(source, 0.0);
                output.stop(source);
                if let Some(events) = events {
                    let _ = events.send(TempolineEvent::FadeOutCompleted { source });
                }
            });
            self.driver.animate(&tween);
            self.fading_out.insert(source, tween);
        }

        if let Some(source) = target {
            if let Err(err) = self.output.play(source) {
                log::warn!("crossfade target {} failed to start: {}", source, err);
                self.selected = None;
                return Err(err);
            }
            // Pin the start level before the first driver tick so the
            // source never pops in at full volume.
            self.output.set_level(source, target_level.clamp(0.0, 1.0));
            let tween = Tween::new(target_level, 1.0, duration, easing)?;
            let output = Arc::clone(&self.output);
            tween.on_update(move |v| output.set_level(source, v.clamp(0.0, 1.0)));
            let events = self.events.clone();
            tween.on_complete(move |_| {
                if let Some(events) = events {
                    let _ = events.send(TempolineEvent::TransitionCompleted { to: source });
                }
            });
            self.driver.animate(&tween);
            self.incoming = Some(Ramp { source, tween });
        }

        self.selected = target;
        log::debug!(
            "crossfade {:?} -> {:?} over {:.3}s ({})",
            from,
            target,
            duration,
            easing
        );
        if let Some(events) = &self.events {
            let _ = events.send(TempolineEvent::TransitionStarted { from, to: target });
        }
        Ok(())
    }
}
