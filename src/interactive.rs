//! Timeline bindings: scripted-object behavior expressed as a function of
//! clock time plus metadata, never of wall time.

use crate::clock::OffsetStopwatch;
use crate::error::{Result, TempolineError};
use crate::events::TempolineEvent;
use crossbeam_channel::Sender;
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// Metadata key: timeline second at/after which the interactive is active.
/// Defaults to 0 when absent.
pub const META_ACTIVATE_AT: &str = "activate_at";
/// Metadata key: timeline second at/after which the interactive goes back
/// to inactive. No deadline when absent.
pub const META_DEACTIVATE_AT: &str = "deactivate_at";
/// Metadata key: `"false"` forces the interactive inactive regardless of
/// time. Anything else (or absence) leaves it time-driven.
pub const META_ENABLED: &str = "enabled";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActivationState {
    Active,
    Inactive,
}

/// A scripted world object bound to a shared [`OffsetStopwatch`].
///
/// Activation is derived purely from the clock reading and the metadata
/// map, so evaluating while the clock is paused always yields the frozen
/// state, and evaluating twice with nothing changed yields the same state
/// with no duplicate event.
///
/// Rewinding the clock re-evaluates forward from the new position: a
/// binding may transition again (and emit again); earlier emissions are
/// never retracted.
pub struct Interactive {
    id: Uuid,
    clock: Option<Arc<OffsetStopwatch>>,
    metadata: HashMap<String, String>,
    state: ActivationState,
    events: Option<Sender<TempolineEvent>>,
}

impl Interactive {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            clock: None,
            metadata: HashMap::new(),
            state: ActivationState::Inactive,
            events: None,
        }
    }

    /// Wires activation transitions onto an event channel.
    pub fn with_events(mut self, sender: Sender<TempolineEvent>) -> Self {
        self.events = Some(sender);
        self
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Sets one metadata entry. Recognized keys are validated here, at the
    /// call that introduces them; unrecognized keys are stored opaquely.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::InvalidMetadata`] when a recognized key
    /// carries an unparseable value.
    pub fn set_metadata(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<()> {
        let key = key.into();
        let value = value.into();
        match key.as_str() {
            META_ACTIVATE_AT | META_DEACTIVATE_AT => {
                let parsed = value.parse::<f64>().ok().filter(|v| v.is_finite());
                if parsed.is_none() {
                    return Err(TempolineError::InvalidMetadata { key, value });
                }
            }
            META_ENABLED => {
                if value != "true" && value != "false" {
                    return Err(TempolineError::InvalidMetadata { key, value });
                }
            }
            _ => {}
        }
        self.metadata.insert(key, value);
        Ok(())
    }

    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).map(String::as_str)
    }

    /// Associates the binding with exactly one clock. Rebinding requires an
    /// explicit [`Interactive::unbind`] first.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::AlreadyBound`] if a clock is bound.
    pub fn bind_to(&mut self, clock: Arc<OffsetStopwatch>) -> Result<()> {
        if self.clock.is_some() {
            return Err(TempolineError::AlreadyBound);
        }
        self.clock = Some(clock);
        Ok(())
    }

    pub fn unbind(&mut self) {
        self.clock = None;
    }

    pub fn is_bound(&self) -> bool {
        self.clock.is_some()
    }

    /// Last derived activation state, without re-evaluating.
    pub fn activation_state(&self) -> ActivationState {
        self.state
    }

    /// Derives the activation state from the bound clock's current time and
    /// the metadata. Idempotent: repeated calls with no clock advance and
    /// no metadata change return the same state and emit nothing new; a
    /// transition emits [`TempolineEvent::ActivationChanged`] exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`TempolineError::NotBound`] when no clock is bound.
    pub fn evaluate(&mut self) -> Result<ActivationState> {
        let clock = self.clock.as_ref().ok_or(TempolineError::NotBound)?;
        let time = clock.current_time();
        let next = self.derive_state(time);
        if next != self.state {
            self.state = next;
            log::debug!("interactive {} -> {:?} at t={:.3}s", self.id, next, time);
            if let Some(events) = &self.events {
                let _ = events.send(TempolineEvent::ActivationChanged {
                    interactive_id: self.id,
                    state: next,
                });
            }
        }
        Ok(next)
    }

    fn derive_state(&self, time: f64) -> ActivationState {
        if self.metadata.get(META_ENABLED).map(String::as_str) == Some("false") {
            return ActivationState::Inactive;
        }
        let activate_at = self.meta_seconds(META_ACTIVATE_AT).unwrap_or(0.0);
        if time < activate_at {
            return ActivationState::Inactive;
        }
        if let Some(deactivate_at) = self.meta_seconds(META_DEACTIVATE_AT) {
            if time >= deactivate_at {
                return ActivationState::Inactive;
            }
        }
        ActivationState::Active
    }

    fn meta_seconds(&self, key: &str) -> Option<f64> {
        self.metadata.get(key)?.parse().ok()
    }
}

impl Default for Interactive {
    fn default() -> Self {
        Self::new()
    }
}
