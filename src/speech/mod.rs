//! Speech synthesis driver.
//!
//! Wraps a platform speech capability behind the [`SpeechSynthesizer`] trait
//! and filters its asynchronous callbacks by utterance identity, so that
//! events trailing in after a stop (or belonging to a replaced utterance) are
//! discarded instead of corrupting highlight state.

mod driver;
mod types;

pub use driver::SpeechDriver;
pub use types::{EngineEvent, SpeechOptions, SpokenWordEvent, UtteranceId, VoiceInfo};

use crate::error::Result;

/// The platform text-to-speech capability, as this crate requires it.
///
/// Implementations bridge to the real engine (e.g. a browser's speech
/// synthesis API or a native TTS service). All calls return immediately;
/// progress is reported back asynchronously as [`EngineEvent`]s which the
/// embedder feeds into [`SpeechDriver::handle_event`].
pub trait SpeechSynthesizer {
    /// Whether speech synthesis is actually available on this platform.
    fn supported(&self) -> bool;

    /// Begin speaking `text` from the start, tagged with `utterance`.
    ///
    /// The engine must tag every event it later reports for this submission
    /// with the same utterance id.
    fn speak(&mut self, utterance: UtteranceId, text: &str, options: &SpeechOptions)
        -> Result<()>;

    /// Suspend the current utterance without losing position.
    fn pause(&mut self);

    /// Continue a paused utterance.
    fn resume(&mut self);

    /// Halt the current utterance immediately.
    fn cancel(&mut self);

    /// List the voices the platform offers.
    fn voices(&self) -> Vec<VoiceInfo>;
}
