//! Word index construction properties: contiguity, offset monotonicity,
//! normalization idempotence, and the documented worked example.

use proptest::prelude::*;
use read_along::{normalize_word, ReaderConfig, WordIndexBuilder};

fn builder() -> WordIndexBuilder {
    WordIndexBuilder::new(&ReaderConfig::new())
}

#[test]
fn test_worked_example_document() {
    let index = builder().build(1, "The quick brown fox jumps.");

    let expected = [
        (0usize, "The", 0usize),
        (1, "quick", 4),
        (2, "brown", 10),
        (3, "fox", 16),
        (4, "jumps.", 20),
    ];
    assert_eq!(index.word_count(), 5);
    for (i, raw, offset) in expected {
        let word = &index.words[i];
        assert_eq!(word.index, i);
        assert_eq!(word.raw_text, raw);
        assert_eq!(word.char_offset, offset);
        assert_eq!(word.normalized_text, normalize_word(raw));
        assert!(word.element.is_none(), "elements attach only after render");
    }
}

#[test]
fn test_structured_document_contiguity() {
    let markup = r#"
        <article>
          <h2>A  heading</h2>
          <p>First paragraph, with <em>emphasis</em> and tail.</p>
          <script>not.read("aloud")</script>
          <p>Second paragraph.</p>
        </article>
    "#;
    let index = builder().build(7, markup);

    assert!(index.word_count() > 0);
    for (i, word) in index.words.iter().enumerate() {
        assert_eq!(word.index, i, "indices must be contiguous from 0");
    }
    for pair in index.words.windows(2) {
        assert!(
            pair[1].char_offset >= pair[0].char_offset,
            "offsets must be non-decreasing in index order"
        );
    }
    assert!(
        !index.speech_text.contains("aloud"),
        "script content must not reach the speech text"
    );
    assert_eq!(index.version, 7);
}

#[test]
fn test_one_word_per_whitespace_delimited_token() {
    let index = builder().build(1, "<p>Well, that's... interesting - isn't it?</p>");
    let raw: Vec<&str> = index.words.iter().map(|w| w.raw_text.as_str()).collect();
    assert_eq!(
        raw,
        vec!["Well,", "that's...", "interesting", "-", "isn't", "it?"]
    );
}

#[test]
fn test_rewritten_markup_round_trips_word_count() {
    let first = builder().build(1, "<p>alpha beta gamma</p>");
    // The wrapped markup is itself valid markup; re-indexing it finds the
    // same words at the same offsets.
    let second = builder().build(2, &first.markup);
    assert_eq!(first.word_count(), second.word_count());
    for (a, b) in first.words.iter().zip(second.words.iter()) {
        assert_eq!(a.raw_text, b.raw_text);
        assert_eq!(a.char_offset, b.char_offset);
    }
    assert_eq!(first.speech_text, second.speech_text);
}

proptest! {
    #[test]
    fn prop_indices_contiguous_and_offsets_monotonic(
        words in proptest::collection::vec("[A-Za-z0-9,.'!?-]{1,12}", 0..40),
        gaps in proptest::collection::vec(" |  |\n|\t| \n ", 0..40),
    ) {
        let mut doc = String::from("<p>");
        for (i, word) in words.iter().enumerate() {
            doc.push_str(word);
            doc.push_str(gaps.get(i).map(|g| g.as_str()).unwrap_or(" "));
        }
        doc.push_str("</p>");

        let index = builder().build(1, &doc);
        prop_assert_eq!(index.word_count(), words.len());
        for (i, word) in index.words.iter().enumerate() {
            prop_assert_eq!(word.index, i);
            if i > 0 {
                prop_assert!(word.char_offset > index.words[i - 1].char_offset);
            }
        }
        // Every offset addresses its own raw text in the flat string.
        let flat: Vec<char> = index.speech_text.chars().collect();
        for word in &index.words {
            let chunk: String = flat[word.char_offset..]
                .iter()
                .take(word.raw_text.chars().count())
                .collect();
            prop_assert_eq!(&chunk, &word.raw_text);
        }
    }

    #[test]
    fn prop_normalization_is_idempotent(raw in "\\PC{0,24}") {
        let once = normalize_word(&raw);
        let twice = normalize_word(&once);
        prop_assert_eq!(once, twice);
    }
}
