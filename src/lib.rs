//! # read_along
//!
//! A word-synchronized read-aloud engine (the core of an "immersive reader"):
//! it turns rich-text markup into speakable text plus a word-indexed
//! document, drives an external speech synthesizer, and resolves the engine's
//! asynchronous spoken-word reports back to specific rendered words so the
//! host UI can highlight along with the voice.
//!
//! ## Pipeline
//!
//! ```text
//! Rich-text markup (title + body)
//!     ↓
//! [normalizer] flat speech text        [index] wrapped markup + DocumentWord[]
//!     ↓                                    ↓ (rendered by the host, elements
//! [speech] SpeechDriver                      attached back by version)
//!     ↓ SpokenWordEvent (word + approximate char offset)
//! [resolver] proximity → forward → any-match fallback
//!     ↓
//! [reader] highlight exactly one word, [scroll] debounced follow
//! ```
//!
//! The platform speech engine and the renderer are external collaborators:
//! the engine is reached through the [`SpeechSynthesizer`] trait, the
//! renderer through [`HighlightSink`] and opaque [`ElementHandle`]s. No
//! networking, persistence, or threading lives in this crate; everything runs
//! on the embedder's single UI thread, with stale asynchronous callbacks
//! (trailing speech events, late element attachments) filtered by utterance
//! identity and content version respectively.
//!
//! ## Quick start
//!
//! ```ignore
//! use read_along::{Reader, ReaderConfig};
//!
//! let mut reader = Reader::new(ReaderConfig::default(), Box::new(platform_engine));
//! let index = reader.load_document("Chapter 1", body_markup, &mut sink);
//! render(&index.markup); // host renders, then attaches elements by version
//! reader.play()?;
//! // platform callbacks: reader.handle_engine_event(event, Instant::now(), &mut sink);
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Markup flattening and word indexing
pub mod index;
pub mod normalizer;

// Speech synthesis driver
pub mod speech;

// Spoken-word resolution and presentation
pub mod reader;
pub mod resolver;
pub mod scroll;

pub use config::ReaderConfig;
pub use error::{Error, Result};
pub use index::{normalize_word, DocumentWord, ElementHandle, WordIndex, WordIndexBuilder};
pub use reader::{HighlightSink, Reader};
pub use resolver::WordResolver;
pub use scroll::ScrollCoordinator;
pub use speech::{
    EngineEvent, SpeechDriver, SpeechOptions, SpeechSynthesizer, SpokenWordEvent, UtteranceId,
    VoiceInfo,
};
