//! External audio playback collaborator.

use crate::error::Result;
use uuid::Uuid;

/// Handle for one playable audio source.
pub type SourceId = Uuid;

/// The playback surface the crossfade scheduler drives.
///
/// Tempoline never decodes or owns audio buffers; implementations bridge to
/// whatever actually produces sound. Levels arrive already clamped to
/// `[0, 1]`. Implementations must be callable from the driver thread, so
/// `set_level` and `stop` should be cheap and non-blocking.
pub trait AudioOutput: Send + Sync {
    /// Brings the source into a playable state. Called before its level is
    /// raised.
    ///
    /// # Errors
    ///
    /// Returns [`crate::TempolineError::Output`] if the source cannot
    /// start; the scheduler treats this as recoverable and fails soft.
    fn play(&self, source: SourceId) -> Result<()>;

    /// Releases the source. Called once its outgoing fade reaches zero.
    fn stop(&self, source: SourceId);

    /// Sets the output level of the source, `level` in `[0, 1]`.
    fn set_level(&self, source: SourceId, level: f32);
}
