//! Event types for Tempoline.
//!
//! Events are sent on the tick (or call) that caused the transition and
//! queued on an unbounded channel; the consumer drains them at its own
//! cadence. Senders never block.

use crate::interactive::ActivationState;
use crate::output::SourceId;
use crossbeam_channel::{Receiver, Sender, unbounded};
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TempolineEvent {
    /// An interactive's activation state changed; emitted exactly once per
    /// transition.
    ActivationChanged {
        interactive_id: Uuid,
        state: ActivationState,
    },
    /// A crossfade selection change was accepted and its ramps started.
    TransitionStarted {
        from: Option<SourceId>,
        to: Option<SourceId>,
    },
    /// The incoming ramp of a transition reached full level.
    TransitionCompleted { to: SourceId },
    /// An outgoing ramp reached zero; the source has been stopped.
    FadeOutCompleted { source: SourceId },
}

impl TempolineEvent {
    pub fn is_transition(&self) -> bool {
        matches!(
            self,
            Self::TransitionStarted { .. }
                | Self::TransitionCompleted { .. }
                | Self::FadeOutCompleted { .. }
        )
    }

    pub fn source_id(&self) -> Option<SourceId> {
        match self {
            Self::TransitionCompleted { to } => Some(*to),
            Self::FadeOutCompleted { source } => Some(*source),
            Self::TransitionStarted { to, .. } => *to,
            Self::ActivationChanged { .. } => None,
        }
    }
}

/// One queue shared by every component of a world: interactives and
/// crossfade sessions push, the host drains.
pub struct EventBus {
    sender: Sender<TempolineEvent>,
    receiver: Receiver<TempolineEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    pub fn sender(&self) -> Sender<TempolineEvent> {
        self.sender.clone()
    }

    pub fn receiver(&self) -> &Receiver<TempolineEvent> {
        &self.receiver
    }

    /// Drains every queued event without blocking.
    pub fn try_drain(&self) -> Vec<TempolineEvent> {
        self.receiver.try_iter().collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}
