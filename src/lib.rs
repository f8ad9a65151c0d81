//! # Tempoline
//!
//! A time synchronization and interpolation engine for game audio: a shared
//! pausable monotonic timeline, a value-tweening engine stepped by its own
//! background timer independent of any render loop, timeline bindings for
//! scripted world objects, and a crossfade scheduler that hands playback off
//! between zone audio sources without audible pops.
//!
//! ## Quick Start
//!
//! ```no_run
//! use tempoline::*;
//! use std::sync::Arc;
//!
//! struct Speakers;
//! impl AudioOutput for Speakers {
//!     fn play(&self, _source: SourceId) -> Result<()> { Ok(()) }
//!     fn stop(&self, _source: SourceId) {}
//!     fn set_level(&self, _source: SourceId, _level: f32) {}
//! }
//!
//! // One world per player session.
//! let world = TempolineWorld::new(TempolineConfig::default());
//!
//! // Crossfade between zone music sources as the listener moves.
//! let mut session = world.crossfade_session(Arc::new(Speakers));
//! let cavern = SourceId::new_v4();
//! let meadow = SourceId::new_v4();
//! session.select(Some(cavern))?;
//! // ... listener crosses a zone boundary ...
//! session.select(Some(meadow))?;
//!
//! // Scripted objects follow the pausable timeline, not wall time.
//! let mut door = world.interactive()?;
//! door.set_metadata(interactive::META_ACTIVATE_AT, "3.5")?;
//! world.clock().pause();
//! door.evaluate()?; // frozen while paused
//!
//! // Drain activation/transition events at your own cadence.
//! for event in world.events().try_iter() {
//!     match event {
//!         TempolineEvent::TransitionCompleted { to } => {
//!             println!("now hearing {:?}", to);
//!         }
//!         _ => {}
//!     }
//! }
//! # Ok::<(), TempolineError>(())
//! ```
//!
//! ## Key Components
//!
//! - **[`OffsetStopwatch`]**: pausable, offsettable monotonic clock; the
//!   single source of truth for scripted/audio timing
//! - **[`Tween`]**: time-bounded interpolation shaped by an [`Easing`] curve
//! - **[`TweenDriver`]**: steps active tweens on a dedicated timer thread,
//!   or is pumped manually by the caller's own loop
//! - **[`Interactive`]**: scripted-object behavior as a pure function of
//!   clock time plus metadata
//! - **[`CrossfadeSession`]**: single-active-source transition policy with
//!   continuity-preserving cancellation
//! - **[`TempolineEvent`]**: activation and transition events, queued for
//!   the host to drain

pub mod clock;
pub mod config;
pub mod crossfade;
pub mod driver;
pub mod easing;
pub mod error;
pub mod events;
pub mod interactive;
pub mod output;
pub mod tween;
pub mod world;

pub use clock::OffsetStopwatch;
pub use config::TempolineConfig;
pub use crossfade::CrossfadeSession;
pub use driver::{Steppable, TweenDriver};
pub use easing::Easing;
pub use error::{Result, TempolineError};
pub use events::{EventBus, TempolineEvent};
pub use interactive::{ActivationState, Interactive};
pub use output::{AudioOutput, SourceId};
pub use tween::{Lerp, Tween, TweenState};
pub use world::TempolineWorld;
