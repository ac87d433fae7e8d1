//! Word index construction.
//!
//! Walks the rich-text markup tree and rewrites it with one wrapper `<span>`
//! per whitespace-delimited token, producing the ordered [`DocumentWord`]
//! list alongside. Each word carries a sequential index, its exact raw text
//! (attached punctuation included), a normalized form for fuzzy matching, and
//! its character offset into the flattened speech text.
//!
//! A fresh index is built every time source content changes; the embedding
//! session tags each index with a content version so asynchronous element
//! attachments for an older document can be recognized and discarded.

use crate::config::ReaderConfig;
use crate::error::Result;
use crate::normalizer::{is_skipped_element, FlatCursor};
use lazy_static::lazy_static;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    /// Token boundary: any contiguous run of non-whitespace characters.
    static ref RE_TOKEN: Regex = Regex::new(r"\S+").unwrap();
    /// Tag shapes for the literal-text fallback path.
    static ref RE_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Opaque handle to a rendered word element, assigned by the host renderer.
///
/// Non-owning by construction: the handle is only meaningful to the
/// [`HighlightSink`](crate::reader::HighlightSink) that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub u64);

/// Indexed metadata for one whitespace-delimited token of the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentWord {
    /// Sequential position in document order, 0-based and contiguous.
    pub index: usize,

    /// The exact substring as it appeared, case and punctuation included.
    pub raw_text: String,

    /// Lower-cased, punctuation-stripped form used for fuzzy matching.
    pub normalized_text: String,

    /// Offset of this word's first character in the flattened speech text.
    pub char_offset: usize,

    /// Rendered element for this word, populated by the post-render attach
    /// pass. `None` before rendering completes or after the document is
    /// replaced.
    #[serde(skip)]
    pub element: Option<ElementHandle>,
}

/// The complete word index for one version of the document content.
#[derive(Debug, Clone)]
pub struct WordIndex {
    /// Content version this index was built for.
    pub version: u64,

    /// Words in document order.
    pub words: Vec<DocumentWord>,

    /// Flattened plain text, safe for submission to a speech engine.
    pub speech_text: String,

    /// Rewritten markup with per-word wrapper spans.
    pub markup: String,
}

impl WordIndex {
    /// Number of indexed words.
    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Whether the document produced no readable words.
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Bind a rendered element to the word at `word_index`.
    ///
    /// Returns false when the index is out of range. Version checking is the
    /// caller's responsibility (see [`Reader::attach_element`]).
    ///
    /// [`Reader::attach_element`]: crate::reader::Reader::attach_element
    pub fn attach(&mut self, word_index: usize, handle: ElementHandle) -> bool {
        match self.words.get_mut(word_index) {
            Some(word) => {
                word.element = Some(handle);
                true
            },
            None => false,
        }
    }

    /// Serialize the word list (without element handles) for the host
    /// renderer.
    pub fn words_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.words)?)
    }

    fn empty(version: u64) -> Self {
        Self {
            version,
            words: Vec::new(),
            speech_text: String::new(),
            markup: String::new(),
        }
    }
}

/// Normalize a raw token for matching: lowercase, then keep only letters and
/// digits. Idempotent, and applied identically at index-build and match time.
pub fn normalize_word(raw: &str) -> String {
    raw.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

/// Builds a [`WordIndex`] from rich-text markup.
#[derive(Debug)]
pub struct WordIndexBuilder {
    skipped_elements: Vec<String>,
    wrapper_class: String,
}

impl WordIndexBuilder {
    /// Create a builder using the element skip list and wrapper class from
    /// `config`.
    pub fn new(config: &ReaderConfig) -> Self {
        Self {
            skipped_elements: config.skipped_elements.clone(),
            wrapper_class: config.wrapper_class.clone(),
        }
    }

    /// Build the index for one document version.
    ///
    /// Never fails: malformed markup degrades to tokenizing the tag-stripped
    /// literal text, and in the worst case an empty index is produced.
    pub fn build(&self, version: u64, markup: &str) -> WordIndex {
        match self.walk_markup(version, markup) {
            Ok(index) => index,
            Err(err) => {
                log::warn!("Word index markup walk failed ({err}), using literal text fallback");
                let stripped = RE_TAG.replace_all(markup, " ");
                match self.wrap_literal(version, &stripped) {
                    Ok(index) => index,
                    Err(err) => {
                        log::error!("Literal fallback failed ({err}); producing empty index");
                        WordIndex::empty(version)
                    },
                }
            },
        }
    }

    /// Structured walk: copy markup through, wrapping each readable token.
    fn walk_markup(&self, version: u64, markup: &str) -> quick_xml::Result<WordIndex> {
        let mut reader = Reader::from_str(markup);
        reader.check_end_names(false);

        let mut writer = Writer::new(Vec::new());
        let mut cursor = FlatCursor::new();
        let mut words = Vec::new();
        let mut skip_depth = 0usize;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    if skip_depth > 0 {
                        skip_depth += 1;
                    } else if is_skipped_element(e.name().as_ref(), &self.skipped_elements) {
                        // A skipped subtree separates the readable text
                        // around it.
                        cursor.mark_whitespace();
                        skip_depth = 1;
                    }
                    writer.write_event(Event::Start(e.into_owned()))?;
                },
                Event::End(e) => {
                    if skip_depth == 1 {
                        cursor.mark_whitespace();
                    }
                    skip_depth = skip_depth.saturating_sub(1);
                    writer.write_event(Event::End(e.into_owned()))?;
                },
                Event::Text(e) => {
                    let raw = match e.unescape() {
                        Ok(text) => text.into_owned(),
                        Err(_) => String::from_utf8_lossy(e.as_ref()).into_owned(),
                    };
                    if skip_depth > 0 {
                        writer.write_event(Event::Text(BytesText::new(&raw)))?;
                    } else {
                        self.emit_tokens(&raw, &mut writer, &mut cursor, &mut words)?;
                    }
                },
                Event::CData(e) => {
                    let raw = String::from_utf8_lossy(e.as_ref()).into_owned();
                    if skip_depth > 0 {
                        writer.write_event(Event::CData(e.into_owned()))?;
                    } else {
                        self.emit_tokens(&raw, &mut writer, &mut cursor, &mut words)?;
                    }
                },
                Event::Eof => break,
                other => {
                    writer.write_event(other.into_owned())?;
                },
            }
        }

        Ok(WordIndex {
            version,
            words,
            speech_text: cursor.finish(),
            markup: String::from_utf8_lossy(&writer.into_inner()).into_owned(),
        })
    }

    /// Fallback: treat the whole payload as one readable text run.
    fn wrap_literal(&self, version: u64, text: &str) -> quick_xml::Result<WordIndex> {
        let mut writer = Writer::new(Vec::new());
        let mut cursor = FlatCursor::new();
        let mut words = Vec::new();
        self.emit_tokens(text, &mut writer, &mut cursor, &mut words)?;
        Ok(WordIndex {
            version,
            words,
            speech_text: cursor.finish(),
            markup: String::from_utf8_lossy(&writer.into_inner()).into_owned(),
        })
    }

    /// Split one readable text run into tokens, writing a wrapper span per
    /// token and preserving the whitespace between them unchanged.
    fn emit_tokens(
        &self,
        raw: &str,
        writer: &mut Writer<Vec<u8>>,
        cursor: &mut FlatCursor,
        words: &mut Vec<DocumentWord>,
    ) -> quick_xml::Result<()> {
        let mut last_end = 0usize;
        for m in RE_TOKEN.find_iter(raw) {
            if m.start() > last_end {
                cursor.mark_whitespace();
                writer.write_event(Event::Text(BytesText::new(&raw[last_end..m.start()])))?;
            }

            let raw_word = m.as_str();
            let normalized = normalize_word(raw_word);
            let char_offset = cursor.push_word(raw_word);
            let index = words.len();

            let mut span = BytesStart::new("span");
            span.push_attribute(("class", self.wrapper_class.as_str()));
            span.push_attribute(("data-word-index", index.to_string().as_str()));
            span.push_attribute(("data-raw", raw_word));
            span.push_attribute(("data-normalized", normalized.as_str()));
            span.push_attribute(("data-char-offset", char_offset.to_string().as_str()));
            writer.write_event(Event::Start(span))?;
            writer.write_event(Event::Text(BytesText::new(raw_word)))?;
            writer.write_event(Event::End(BytesEnd::new("span")))?;

            words.push(DocumentWord {
                index,
                raw_text: raw_word.to_string(),
                normalized_text: normalized,
                char_offset,
                element: None,
            });

            last_end = m.end();
        }

        if last_end < raw.len() {
            cursor.mark_whitespace();
            writer.write_event(Event::Text(BytesText::new(&raw[last_end..])))?;
        }
        Ok(())
    }
}
