//! Text normalization: rich-text markup to flat speech text.
//!
//! The flattened string is what gets submitted to the speech engine, so it
//! must read naturally: all markup stripped, whitespace runs (newlines, tabs,
//! indentation) collapsed to single spaces, and script/style/preformatted
//! subtrees excluded so markup syntax is never spoken aloud.
//!
//! The word index (see [`crate::index`]) computes its character offsets with
//! the same collapsing rules, so the flat text and the indexed words stay
//! addressable by one coordinate system.

use crate::config::DEFAULT_SKIPPED_ELEMENTS;
use lazy_static::lazy_static;
use quick_xml::events::Event;
use quick_xml::Reader;
use regex::Regex;

lazy_static! {
    /// Matches any markup tag for the literal-text fallback path.
    static ref RE_TAG: Regex = Regex::new(r"<[^>]*>").unwrap();
}

/// Whitespace-collapsing text accumulator.
///
/// Implements the single shared collapsing rule: any run of whitespace,
/// including runs spanning node boundaries, becomes exactly one space, and
/// leading/trailing whitespace is dropped. The word index builder uses the
/// same cursor so its `char_offset` values address the flattened string.
#[derive(Debug, Default)]
pub(crate) struct FlatCursor {
    text: String,
    chars: usize,
    pending_space: bool,
}

impl FlatCursor {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Append a chunk of raw text, collapsing whitespace as it goes.
    pub(crate) fn push_chunk(&mut self, chunk: &str) {
        for ch in chunk.chars() {
            if ch.is_whitespace() {
                self.pending_space = true;
            } else {
                self.push_char(ch);
            }
        }
    }

    /// Append a single whitespace-free token, returning its character offset
    /// in the flattened text.
    pub(crate) fn push_word(&mut self, word: &str) -> usize {
        self.resolve_pending_space();
        let offset = self.chars;
        for ch in word.chars() {
            self.text.push(ch);
            self.chars += 1;
        }
        offset
    }

    /// Record that whitespace occurred without appending it yet.
    pub(crate) fn mark_whitespace(&mut self) {
        self.pending_space = true;
    }

    pub(crate) fn finish(self) -> String {
        self.text
    }

    fn push_char(&mut self, ch: char) {
        self.resolve_pending_space();
        self.text.push(ch);
        self.chars += 1;
    }

    fn resolve_pending_space(&mut self) {
        if self.pending_space && !self.text.is_empty() {
            self.text.push(' ');
            self.chars += 1;
        }
        self.pending_space = false;
    }
}

/// Check whether an element name is excluded from reading.
pub(crate) fn is_skipped_element(name: &[u8], skipped: &[String]) -> bool {
    let name = String::from_utf8_lossy(name);
    let local = name.rsplit(':').next().unwrap_or(&name);
    skipped.iter().any(|s| s.eq_ignore_ascii_case(local))
}

/// Flatten rich-text markup to a single plain-text string with the default
/// skip list.
///
/// See [`flatten_with`] for the full contract.
pub fn flatten(markup: &str) -> String {
    let skipped: Vec<String> = DEFAULT_SKIPPED_ELEMENTS
        .iter()
        .map(|s| s.to_string())
        .collect();
    flatten_with(markup, &skipped)
}

/// Flatten rich-text markup to a single plain-text string.
///
/// Strips all tags, collapses whitespace runs to single spaces, trims leading
/// and trailing whitespace, and excludes the subtrees of elements named in
/// `skipped`. Never fails: malformed markup degrades to best-effort literal
/// text extraction.
pub fn flatten_with(markup: &str, skipped: &[String]) -> String {
    let mut reader = Reader::from_str(markup);
    reader.check_end_names(false);

    let mut cursor = FlatCursor::new();
    let mut skip_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if skip_depth > 0 {
                    skip_depth += 1;
                } else if is_skipped_element(e.name().as_ref(), skipped) {
                    // A skipped subtree separates the readable text around it.
                    cursor.mark_whitespace();
                    skip_depth = 1;
                }
            },
            Ok(Event::End(_)) => {
                if skip_depth == 1 {
                    cursor.mark_whitespace();
                }
                skip_depth = skip_depth.saturating_sub(1);
            },
            Ok(Event::Text(e)) if skip_depth == 0 => {
                match e.unescape() {
                    Ok(text) => cursor.push_chunk(&text),
                    // Unknown entities are kept verbatim rather than dropped.
                    Err(_) => cursor.push_chunk(&String::from_utf8_lossy(e.as_ref())),
                }
            },
            Ok(Event::CData(e)) if skip_depth == 0 => {
                cursor.push_chunk(&String::from_utf8_lossy(e.as_ref()));
            },
            Ok(Event::Eof) => break,
            Ok(_) => {},
            Err(err) => {
                log::warn!("Markup parse error, falling back to literal text: {err}");
                return flatten_literal(markup);
            },
        }
    }

    cursor.finish()
}

/// Best-effort fallback for markup the structured walk cannot handle: strip
/// anything tag-shaped, then collapse whitespace.
pub(crate) fn flatten_literal(markup: &str) -> String {
    let stripped = RE_TAG.replace_all(markup, " ");
    let mut cursor = FlatCursor::new();
    cursor.push_chunk(&stripped);
    cursor.finish()
}
