//! Data types shared between the speech driver and its consumers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of one utterance submission.
///
/// Owned and allocated by the [`SpeechDriver`](super::SpeechDriver) instance
/// (not a process-wide counter), so multiple independent reader instances
/// never cross-talk. Every platform event carries the id of the utterance it
/// belongs to; events whose id no longer matches the driver's current
/// utterance are discarded on arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UtteranceId(pub u64);

impl fmt::Display for UtteranceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "utterance#{}", self.0)
    }
}

/// Playback parameters for one utterance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechOptions {
    /// Speaking rate multiplier (1.0 = normal).
    pub rate: f32,
    /// Voice pitch multiplier (1.0 = normal).
    pub pitch: f32,
    /// Output volume in `[0.0, 1.0]`.
    pub volume: f32,
    /// Platform voice identifier; `None` selects the platform default.
    pub voice: Option<String>,
}

impl Default for SpeechOptions {
    fn default() -> Self {
        Self {
            rate: 1.0,
            pitch: 1.0,
            volume: 1.0,
            voice: None,
        }
    }
}

/// One voice offered by the platform engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceInfo {
    /// Platform identifier, usable in [`SpeechOptions::voice`].
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// BCP 47 language tag.
    pub language: String,
    /// Whether the platform considers this its default voice.
    pub default: bool,
}

/// Raw callback from the platform engine, tagged with utterance identity.
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Audio output for the utterance has begun.
    Started {
        /// The utterance this event belongs to.
        utterance: UtteranceId,
    },
    /// The engine reached a word boundary while speaking.
    WordBoundary {
        /// The utterance this event belongs to.
        utterance: UtteranceId,
        /// The word being spoken at this instant.
        word: String,
        /// Approximate character offset into the submitted text. A hint
        /// only; engines differ in offset fidelity.
        char_offset: usize,
    },
    /// The utterance finished speaking normally.
    Finished {
        /// The utterance this event belongs to.
        utterance: UtteranceId,
    },
    /// The engine aborted the utterance.
    Error {
        /// The utterance this event belongs to.
        utterance: UtteranceId,
        /// Engine-reported reason.
        message: String,
    },
}

impl EngineEvent {
    /// The utterance identity this event is tagged with.
    pub fn utterance(&self) -> UtteranceId {
        match self {
            EngineEvent::Started { utterance }
            | EngineEvent::WordBoundary { utterance, .. }
            | EngineEvent::Finished { utterance }
            | EngineEvent::Error { utterance, .. } => *utterance,
        }
    }
}

/// The word currently being spoken, as reported by the engine and vetted by
/// the driver. Ephemeral; consumed by the word resolver and never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpokenWordEvent {
    /// Word text as reported by the engine at this instant.
    pub word: String,
    /// Engine-reported approximate character offset into the spoken text.
    pub char_offset: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = SpeechOptions::default();
        assert_eq!(options.rate, 1.0);
        assert_eq!(options.pitch, 1.0);
        assert_eq!(options.volume, 1.0);
        assert!(options.voice.is_none());
    }

    #[test]
    fn test_engine_event_utterance_accessor() {
        let id = UtteranceId(9);
        let event = EngineEvent::WordBoundary {
            utterance: id,
            word: "hello".to_string(),
            char_offset: 0,
        };
        assert_eq!(event.utterance(), id);
        assert_eq!(EngineEvent::Finished { utterance: id }.utterance(), id);
    }

    #[test]
    fn test_utterance_id_display() {
        assert_eq!(format!("{}", UtteranceId(3)), "utterance#3");
    }
}
