//! Spoken-word to document-word resolution.
//!
//! The speech engine reports each spoken word with an approximate character
//! offset. Offsets are usually accurate enough for a cheap proximity match to
//! resolve ambiguity, but engines vary in offset fidelity, so two fallback
//! tiers privilege forward motion over positional accuracy.
//!
//! Tiers, highest priority first:
//!
//! 1. **Proximity**: words with an attached element whose offset lies within
//!    the tolerance window of the reported offset, preferring textual matches
//!    and then the smallest offset difference.
//! 2. **Forward**: first textual match strictly after the last highlighted
//!    index.
//! 3. **Any**: first textual match anywhere.
//!
//! A word that resolves to nothing produces no highlight change; filler
//! words and engine noise are expected.

use crate::index::{normalize_word, WordIndex};
use crate::speech::SpokenWordEvent;

/// Resolves spoken-word events against a word index.
///
/// Owns the monotonic "last highlighted index" pointer, which regresses only
/// through [`reset`](WordResolver::reset) (stop or document replacement) or
/// when the proximity tier explicitly selects an earlier word.
#[derive(Debug)]
pub struct WordResolver {
    tolerance: usize,
    last_highlighted: Option<usize>,
}

impl WordResolver {
    /// Create a resolver with the given proximity tolerance in characters.
    pub fn new(tolerance: usize) -> Self {
        Self {
            tolerance,
            last_highlighted: None,
        }
    }

    /// The index of the most recently resolved word, if any.
    pub fn last_highlighted(&self) -> Option<usize> {
        self.last_highlighted
    }

    /// Forget all match history. Called on stop and on document replacement.
    pub fn reset(&mut self) {
        self.last_highlighted = None;
    }

    /// Resolve one spoken-word event to a document word index.
    ///
    /// On a match the last-highlighted pointer advances to the matched index.
    /// `None` means no highlight change for this event.
    pub fn observe(&mut self, index: &WordIndex, event: &SpokenWordEvent) -> Option<usize> {
        let spoken = normalize_word(&event.word);
        let matched = self
            .proximity_match(index, event.char_offset, &spoken)
            .or_else(|| self.forward_match(index, &spoken))
            .or_else(|| self.any_match(index, &spoken));

        match matched {
            Some(idx) => {
                self.last_highlighted = Some(idx);
                Some(idx)
            },
            None => {
                log::trace!("No document word for spoken {:?} @ {}", event.word, event.char_offset);
                None
            },
        }
    }

    /// Tier 1: offset proximity among words with attached elements.
    ///
    /// When any tolerance candidate also matches the spoken word textually,
    /// non-matching candidates are discarded before the smallest-difference
    /// tie-break.
    fn proximity_match(&self, index: &WordIndex, offset: usize, spoken: &str) -> Option<usize> {
        let mut candidates: Vec<(usize, usize, bool)> = index
            .words
            .iter()
            .filter(|w| w.element.is_some())
            .filter_map(|w| {
                let diff = w.char_offset.abs_diff(offset);
                (diff < self.tolerance).then(|| {
                    (w.index, diff, texts_match(&w.normalized_text, spoken))
                })
            })
            .collect();

        if candidates.iter().any(|&(_, _, matched)| matched) {
            candidates.retain(|&(_, _, matched)| matched);
        }

        let (idx, diff, _) = candidates.into_iter().min_by_key(|&(_, diff, _)| diff)?;
        log::trace!("Proximity match: word {} (offset diff {})", idx, diff);
        Some(idx)
    }

    /// Tier 2: first textual match strictly after the last highlighted index.
    fn forward_match(&self, index: &WordIndex, spoken: &str) -> Option<usize> {
        let floor = self.last_highlighted;
        let word = index.words.iter().find(|w| {
            floor.map_or(true, |last| w.index > last) && texts_match(&w.normalized_text, spoken)
        })?;
        log::trace!("Forward match: word {}", word.index);
        Some(word.index)
    }

    /// Tier 3: first textual match anywhere in the document.
    fn any_match(&self, index: &WordIndex, spoken: &str) -> Option<usize> {
        let word = index
            .words
            .iter()
            .find(|w| texts_match(&w.normalized_text, spoken))?;
        log::trace!("Any match: word {}", word.index);
        Some(word.index)
    }
}

/// Normalized-text comparison: equal, contains, or contained-by.
///
/// Empty strings never match; tokens that normalize to nothing (bare
/// punctuation) and empty engine reports must not latch onto arbitrary words.
fn texts_match(word: &str, spoken: &str) -> bool {
    !word.is_empty()
        && !spoken.is_empty()
        && (word == spoken || word.contains(spoken) || spoken.contains(word))
}
