//! The read-aloud session: document lifecycle, playback, and highlighting.
//!
//! [`Reader`] ties the pieces together. Loading a document is a cancellation
//! trigger: active speech stops, the content version is bumped, and the word
//! index is rebuilt from scratch; nothing built for an earlier version may
//! touch the new one. Engine callbacks flow through the speech driver's
//! stale-event filter, then through the word resolver, and finally into the
//! host renderer via [`HighlightSink`].
//!
//! Everything here runs on a single thread; the only "race" in the design is
//! a post-render element attachment arriving after a document swap, which the
//! content-version check discards as an expected benign stale write.

use crate::config::ReaderConfig;
use crate::error::{Error, Result};
use crate::index::{ElementHandle, WordIndex, WordIndexBuilder};
use crate::resolver::WordResolver;
use crate::scroll::ScrollCoordinator;
use crate::speech::{
    EngineEvent, SpeechDriver, SpeechOptions, SpeechSynthesizer, SpokenWordEvent, VoiceInfo,
};
use std::time::Instant;

/// Host-renderer callbacks for presenting highlight and scroll state.
///
/// The renderer owns the actual visual elements; the reader only refers to
/// them through the [`ElementHandle`]s the renderer registered via
/// [`Reader::attach_element`].
pub trait HighlightSink {
    /// Toggle the highlighted presentation state of one word element.
    fn set_highlighted(&mut self, element: &ElementHandle, highlighted: bool);

    /// Bring one word element into view.
    fn scroll_to(&mut self, element: &ElementHandle);
}

/// A word-synchronized read-aloud session.
pub struct Reader {
    builder: WordIndexBuilder,
    driver: SpeechDriver,
    resolver: WordResolver,
    scroll: ScrollCoordinator,
    options: SpeechOptions,
    index: Option<WordIndex>,
    content_version: u64,
    highlighted: Option<usize>,
}

impl Reader {
    /// Create a session over a platform speech engine.
    pub fn new(config: ReaderConfig, engine: Box<dyn SpeechSynthesizer>) -> Self {
        Self {
            builder: WordIndexBuilder::new(&config),
            driver: SpeechDriver::new(engine),
            resolver: WordResolver::new(config.proximity_tolerance_chars),
            scroll: ScrollCoordinator::new(config.scroll_debounce),
            options: SpeechOptions::default(),
            index: None,
            content_version: 0,
            highlighted: None,
        }
    }

    /// Load new content, replacing any previous document.
    ///
    /// Stops active speech first, bumps the content version, and rebuilds the
    /// word index. The title is prepended as its own readable block so its
    /// words are spoken and highlighted like body words. Returns the fresh
    /// index; its `markup` is what the host should render.
    pub fn load_document(
        &mut self,
        title: &str,
        body: &str,
        sink: &mut dyn HighlightSink,
    ) -> &WordIndex {
        self.stop(sink);
        self.content_version += 1;

        let markup = if title.trim().is_empty() {
            body.to_string()
        } else {
            format!("<h1>{}</h1> {}", quick_xml::escape::escape(title), body)
        };
        let index = self.builder.build(self.content_version, &markup);
        log::info!(
            "Loaded document version {} ({} words)",
            self.content_version,
            index.word_count()
        );
        self.index.insert(index)
    }

    /// Bind a rendered element to a word of a specific document version.
    ///
    /// Attachments for any version other than the current one are discarded:
    /// a slow post-render callback must never mutate a newer document's
    /// index. Returns whether the binding was applied.
    pub fn attach_element(
        &mut self,
        version: u64,
        word_index: usize,
        handle: ElementHandle,
    ) -> bool {
        match self.index.as_mut() {
            Some(index) if index.version == version => index.attach(word_index, handle),
            Some(index) => {
                log::debug!(
                    "Discarding stale element attach for version {} (current {})",
                    version,
                    index.version
                );
                false
            },
            None => {
                log::debug!("Discarding element attach for version {}: no document", version);
                false
            },
        }
    }

    /// Start speaking the loaded document from the beginning.
    pub fn play(&mut self) -> Result<()> {
        let index = self.index.as_ref().ok_or(Error::NoDocument)?;
        self.driver.speak(&index.speech_text, &self.options)
    }

    /// Suspend speech without losing position.
    pub fn pause(&mut self) {
        self.driver.pause();
    }

    /// Continue paused speech.
    pub fn resume(&mut self) {
        self.driver.resume();
    }

    /// Start over from the top: clears all highlight state, then plays again.
    pub fn restart(&mut self, sink: &mut dyn HighlightSink) -> Result<()> {
        self.stop(sink);
        self.play()
    }

    /// Halt speech and clear all highlight state synchronously.
    pub fn stop(&mut self, sink: &mut dyn HighlightSink) {
        self.driver.stop();
        self.clear_highlight(sink);
        self.resolver.reset();
        self.scroll.cancel();
    }

    /// Feed one raw platform event through the driver and resolver.
    ///
    /// In-date word boundaries move the highlight; utterance end (normal or
    /// aborted) clears it, since a highlight only exists while speech is
    /// active.
    pub fn handle_engine_event(
        &mut self,
        event: EngineEvent,
        now: Instant,
        sink: &mut dyn HighlightSink,
    ) {
        match self.driver.handle_event(event) {
            Some(spoken) => self.apply_highlight(&spoken, now, sink),
            None => {
                if !self.driver.speaking() {
                    self.clear_highlight(sink);
                    self.resolver.reset();
                    self.scroll.cancel();
                }
            },
        }
    }

    /// Release a due scroll request, if any, to the sink.
    pub fn pump_scroll(&mut self, now: Instant, sink: &mut dyn HighlightSink) {
        if let Some(handle) = self.scroll.poll(now) {
            sink.scroll_to(&handle);
        }
    }

    /// Set the speaking rate for subsequent playback.
    pub fn set_rate(&mut self, rate: f32) {
        self.options.rate = rate;
    }

    /// Set the voice pitch for subsequent playback.
    pub fn set_pitch(&mut self, pitch: f32) {
        self.options.pitch = pitch;
    }

    /// Set the output volume for subsequent playback.
    pub fn set_volume(&mut self, volume: f32) {
        self.options.volume = volume;
    }

    /// Select a platform voice; `None` restores the platform default.
    pub fn set_voice(&mut self, voice: Option<String>) {
        self.options.voice = voice;
    }

    /// Current playback options.
    pub fn options(&self) -> &SpeechOptions {
        &self.options
    }

    /// Voices the platform offers.
    pub fn voices(&self) -> Vec<VoiceInfo> {
        self.driver.voices()
    }

    /// Whether speech synthesis is available.
    pub fn supported(&self) -> bool {
        self.driver.supported()
    }

    /// Whether an utterance is active.
    pub fn speaking(&self) -> bool {
        self.driver.speaking()
    }

    /// Whether the active utterance is paused.
    pub fn paused(&self) -> bool {
        self.driver.paused()
    }

    /// The current word index, if a document is loaded.
    pub fn index(&self) -> Option<&WordIndex> {
        self.index.as_ref()
    }

    /// The current content version.
    pub fn content_version(&self) -> u64 {
        self.content_version
    }

    /// The index of the currently highlighted word, if any.
    pub fn highlighted_word(&self) -> Option<usize> {
        self.highlighted
    }

    fn apply_highlight(&mut self, spoken: &SpokenWordEvent, now: Instant, sink: &mut dyn HighlightSink) {
        let Some(index) = self.index.as_ref() else {
            return;
        };
        let Some(matched) = self.resolver.observe(index, spoken) else {
            return;
        };
        if self.highlighted == Some(matched) {
            return;
        }

        if let Some(prev) = self.highlighted.take() {
            if let Some(handle) = index.words.get(prev).and_then(|w| w.element) {
                sink.set_highlighted(&handle, false);
            }
        }
        self.highlighted = Some(matched);
        if let Some(handle) = index.words.get(matched).and_then(|w| w.element) {
            sink.set_highlighted(&handle, true);
            self.scroll.request(handle, now);
        }
    }

    fn clear_highlight(&mut self, sink: &mut dyn HighlightSink) {
        if let Some(prev) = self.highlighted.take() {
            if let Some(handle) = self
                .index
                .as_ref()
                .and_then(|index| index.words.get(prev))
                .and_then(|w| w.element)
            {
                sink.set_highlighted(&handle, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NullSink;

    impl HighlightSink for NullSink {
        fn set_highlighted(&mut self, _element: &ElementHandle, _highlighted: bool) {}
        fn scroll_to(&mut self, _element: &ElementHandle) {}
    }

    struct NoEngine;

    impl SpeechSynthesizer for NoEngine {
        fn supported(&self) -> bool {
            false
        }
        fn speak(&mut self, _: crate::speech::UtteranceId, _: &str, _: &SpeechOptions) -> Result<()> {
            unreachable!("unsupported engine must never be asked to speak")
        }
        fn pause(&mut self) {}
        fn resume(&mut self) {}
        fn cancel(&mut self) {}
        fn voices(&self) -> Vec<VoiceInfo> {
            Vec::new()
        }
    }

    #[test]
    fn test_play_without_document_is_an_error() {
        let mut reader = Reader::new(ReaderConfig::new(), Box::new(NoEngine));
        assert!(matches!(reader.play(), Err(Error::NoDocument)));
    }

    #[test]
    fn test_load_document_bumps_version() {
        let mut reader = Reader::new(ReaderConfig::new(), Box::new(NoEngine));
        let mut sink = NullSink;
        let v1 = reader.load_document("Title", "<p>one</p>", &mut sink).version;
        let v2 = reader.load_document("Title", "<p>two</p>", &mut sink).version;
        assert!(v2 > v1);
    }

    #[test]
    fn test_title_words_are_indexed_first() {
        let mut reader = Reader::new(ReaderConfig::new(), Box::new(NoEngine));
        let mut sink = NullSink;
        let index = reader.load_document("My Title", "<p>body</p>", &mut sink);
        let raw: Vec<&str> = index.words.iter().map(|w| w.raw_text.as_str()).collect();
        assert_eq!(raw, vec!["My", "Title", "body"]);
        assert_eq!(index.speech_text, "My Title body");
    }

    #[test]
    fn test_unsupported_platform_play_is_inert() {
        let mut reader = Reader::new(ReaderConfig::new(), Box::new(NoEngine));
        let mut sink = NullSink;
        reader.load_document("", "<p>hello</p>", &mut sink);
        assert!(!reader.supported());
        reader.play().expect("degraded-mode play must not fail");
        assert!(!reader.speaking());
    }

    #[test]
    fn test_option_setters() {
        let mut reader = Reader::new(ReaderConfig::new(), Box::new(NoEngine));
        reader.set_rate(1.5);
        reader.set_pitch(0.9);
        reader.set_volume(0.5);
        reader.set_voice(Some("v2".to_string()));
        let options = reader.options();
        assert_eq!(options.rate, 1.5);
        assert_eq!(options.pitch, 0.9);
        assert_eq!(options.volume, 0.5);
        assert_eq!(options.voice.as_deref(), Some("v2"));
    }
}
