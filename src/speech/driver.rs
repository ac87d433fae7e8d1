//! The speech driver: utterance lifecycle and stale-event filtering.

use super::types::{EngineEvent, SpeechOptions, SpokenWordEvent, UtteranceId, VoiceInfo};
use super::SpeechSynthesizer;
use crate::error::Result;

/// Drives a platform speech engine and vets its asynchronous callbacks.
///
/// The driver tags each submission with a fresh [`UtteranceId`] and discards
/// any incoming event whose id does not match the current utterance. Clearing
/// the current id *before* cancelling the engine is what makes [`stop`]
/// airtight: platform implementations are allowed to deliver trailing events
/// after a cancel, and those arrive already stale.
///
/// When the platform capability is absent (`supported() == false`), every
/// operation is a no-op and `speaking()` stays false; the embedding UI
/// surfaces this as a disabled control rather than an error.
///
/// [`stop`]: SpeechDriver::stop
pub struct SpeechDriver {
    engine: Box<dyn SpeechSynthesizer>,
    supported: bool,
    speaking: bool,
    paused: bool,
    current: Option<UtteranceId>,
    next_utterance: u64,
}

impl SpeechDriver {
    /// Wrap a platform engine.
    pub fn new(engine: Box<dyn SpeechSynthesizer>) -> Self {
        let supported = engine.supported();
        if !supported {
            log::warn!("Speech synthesis unsupported; driver will run in degraded no-op mode");
        }
        Self {
            engine,
            supported,
            speaking: false,
            paused: false,
            current: None,
            next_utterance: 0,
        }
    }

    /// Whether speech synthesis is available at all.
    pub fn supported(&self) -> bool {
        self.supported
    }

    /// Whether an utterance is currently active (possibly paused).
    pub fn speaking(&self) -> bool {
        self.speaking
    }

    /// Whether the active utterance is paused.
    pub fn paused(&self) -> bool {
        self.paused
    }

    /// Voices the platform offers; empty when unsupported.
    pub fn voices(&self) -> Vec<VoiceInfo> {
        if !self.supported {
            return Vec::new();
        }
        self.engine.voices()
    }

    /// Begin speaking `text` from the start.
    ///
    /// Returns immediately; speech proceeds on the platform's own schedule.
    /// Any active utterance is stopped first. No-op when unsupported.
    pub fn speak(&mut self, text: &str, options: &SpeechOptions) -> Result<()> {
        if !self.supported {
            log::debug!("speak() ignored: speech synthesis unsupported");
            return Ok(());
        }
        if self.current.is_some() {
            self.stop();
        }

        let id = UtteranceId(self.next_utterance);
        self.next_utterance += 1;
        self.current = Some(id);

        match self.engine.speak(id, text, options) {
            Ok(()) => {
                self.speaking = true;
                self.paused = false;
                log::debug!("Submitted {} ({} chars)", id, text.chars().count());
                Ok(())
            },
            Err(err) => {
                self.current = None;
                self.speaking = false;
                self.paused = false;
                Err(err)
            },
        }
    }

    /// Suspend the current utterance. No-op if nothing is speaking.
    pub fn pause(&mut self) {
        if self.speaking && !self.paused {
            self.engine.pause();
            self.paused = true;
        }
    }

    /// Continue a paused utterance. No-op if not paused.
    pub fn resume(&mut self) {
        if self.speaking && self.paused {
            self.engine.resume();
            self.paused = false;
        }
    }

    /// Halt speech immediately.
    ///
    /// The current utterance id is invalidated before the engine cancel is
    /// issued, so trailing events for it are discarded on arrival.
    pub fn stop(&mut self) {
        if let Some(id) = self.current.take() {
            log::debug!("Stopping {}", id);
        }
        self.speaking = false;
        self.paused = false;
        if self.supported {
            self.engine.cancel();
        }
    }

    /// Vet one raw platform event.
    ///
    /// Returns the spoken-word event for in-date word boundaries; everything
    /// else (lifecycle events, stale events) is absorbed into driver state.
    pub fn handle_event(&mut self, event: EngineEvent) -> Option<SpokenWordEvent> {
        let id = event.utterance();
        if self.current != Some(id) {
            log::trace!("Discarding stale event for {}", id);
            return None;
        }

        match event {
            EngineEvent::Started { .. } => None,
            EngineEvent::WordBoundary {
                word, char_offset, ..
            } => Some(SpokenWordEvent { word, char_offset }),
            EngineEvent::Finished { .. } => {
                log::debug!("{} finished", id);
                self.current = None;
                self.speaking = false;
                self.paused = false;
                None
            },
            EngineEvent::Error { message, .. } => {
                log::warn!("{} aborted by engine: {}", id, message);
                self.current = None;
                self.speaking = false;
                self.paused = false;
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records engine calls so tests can assert on driver behavior.
    #[derive(Default)]
    struct EngineLog {
        spoken: Vec<(UtteranceId, String)>,
        cancels: usize,
        pauses: usize,
        resumes: usize,
    }

    struct FakeEngine {
        supported: bool,
        fail_speak: bool,
        log: Rc<RefCell<EngineLog>>,
    }

    impl FakeEngine {
        fn new(supported: bool) -> (Self, Rc<RefCell<EngineLog>>) {
            let log = Rc::new(RefCell::new(EngineLog::default()));
            (
                Self {
                    supported,
                    fail_speak: false,
                    log: Rc::clone(&log),
                },
                log,
            )
        }
    }

    impl SpeechSynthesizer for FakeEngine {
        fn supported(&self) -> bool {
            self.supported
        }

        fn speak(
            &mut self,
            utterance: UtteranceId,
            text: &str,
            _options: &SpeechOptions,
        ) -> Result<()> {
            if self.fail_speak {
                return Err(Error::Speech("engine refused".to_string()));
            }
            self.log
                .borrow_mut()
                .spoken
                .push((utterance, text.to_string()));
            Ok(())
        }

        fn pause(&mut self) {
            self.log.borrow_mut().pauses += 1;
        }

        fn resume(&mut self) {
            self.log.borrow_mut().resumes += 1;
        }

        fn cancel(&mut self) {
            self.log.borrow_mut().cancels += 1;
        }

        fn voices(&self) -> Vec<VoiceInfo> {
            vec![VoiceInfo {
                id: "v1".to_string(),
                name: "Test Voice".to_string(),
                language: "en-US".to_string(),
                default: true,
            }]
        }
    }

    #[test]
    fn test_speak_assigns_fresh_utterance_ids() {
        let (engine, log) = FakeEngine::new(true);
        let mut driver = SpeechDriver::new(Box::new(engine));

        driver.speak("one", &SpeechOptions::default()).unwrap();
        driver.speak("two", &SpeechOptions::default()).unwrap();

        let log = log.borrow();
        assert_eq!(log.spoken.len(), 2);
        assert_ne!(log.spoken[0].0, log.spoken[1].0);
        // Second speak stops the first utterance.
        assert_eq!(log.cancels, 1);
    }

    #[test]
    fn test_word_boundary_passes_through_for_current_utterance() {
        let (engine, log) = FakeEngine::new(true);
        let mut driver = SpeechDriver::new(Box::new(engine));
        driver.speak("hello world", &SpeechOptions::default()).unwrap();
        let id = log.borrow().spoken[0].0;

        let event = driver.handle_event(EngineEvent::WordBoundary {
            utterance: id,
            word: "hello".to_string(),
            char_offset: 0,
        });
        let event = event.expect("in-date boundary should pass through");
        assert_eq!(event.word, "hello");
        assert_eq!(event.char_offset, 0);
    }

    #[test]
    fn test_stale_events_discarded_after_stop() {
        let (engine, log) = FakeEngine::new(true);
        let mut driver = SpeechDriver::new(Box::new(engine));
        driver.speak("hello", &SpeechOptions::default()).unwrap();
        let id = log.borrow().spoken[0].0;

        driver.stop();
        assert!(!driver.speaking());

        let event = driver.handle_event(EngineEvent::WordBoundary {
            utterance: id,
            word: "hello".to_string(),
            char_offset: 0,
        });
        assert!(event.is_none(), "pre-stop utterance events must be inert");
    }

    #[test]
    fn test_finished_clears_speaking_state() {
        let (engine, log) = FakeEngine::new(true);
        let mut driver = SpeechDriver::new(Box::new(engine));
        driver.speak("hello", &SpeechOptions::default()).unwrap();
        let id = log.borrow().spoken[0].0;

        assert!(driver.speaking());
        driver.handle_event(EngineEvent::Finished { utterance: id });
        assert!(!driver.speaking());
        assert!(!driver.paused());
    }

    #[test]
    fn test_pause_resume_are_conditional_no_ops() {
        let (engine, log) = FakeEngine::new(true);
        let mut driver = SpeechDriver::new(Box::new(engine));

        // Not speaking: both no-ops.
        driver.pause();
        driver.resume();
        assert_eq!(log.borrow().pauses, 0);
        assert_eq!(log.borrow().resumes, 0);

        driver.speak("hello", &SpeechOptions::default()).unwrap();
        driver.resume(); // not paused, no-op
        driver.pause();
        driver.pause(); // already paused, no-op
        driver.resume();
        assert_eq!(log.borrow().pauses, 1);
        assert_eq!(log.borrow().resumes, 1);
    }

    #[test]
    fn test_unsupported_engine_is_inert() {
        let (engine, log) = FakeEngine::new(false);
        let mut driver = SpeechDriver::new(Box::new(engine));

        assert!(!driver.supported());
        driver.speak("hello", &SpeechOptions::default()).unwrap();
        assert!(!driver.speaking());
        assert!(log.borrow().spoken.is_empty());
        assert!(driver.voices().is_empty());
    }

    #[test]
    fn test_speak_failure_leaves_driver_idle() {
        let (mut engine, _log) = FakeEngine::new(true);
        engine.fail_speak = true;
        let mut driver = SpeechDriver::new(Box::new(engine));

        let result = driver.speak("hello", &SpeechOptions::default());
        assert!(result.is_err());
        assert!(!driver.speaking());

        // A later event for the failed utterance id is stale.
        let event = driver.handle_event(EngineEvent::WordBoundary {
            utterance: UtteranceId(0),
            word: "hello".to_string(),
            char_offset: 0,
        });
        assert!(event.is_none());
    }
}
