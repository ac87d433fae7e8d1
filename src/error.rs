//! Error types for the read-aloud engine.
//!
//! Most failure modes in this crate are absorbed locally: malformed
//! markup degrades to literal text extraction, stale element attachments are
//! silently discarded, and spoken words that resolve to no document word leave
//! the highlight unchanged. Only conditions that genuinely abort an operation
//! surface through this type.

/// Result type alias for read-aloud engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while driving the reader.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The platform speech engine rejected an utterance submission.
    #[error("Speech engine error: {0}")]
    Speech(String),

    /// A playback operation was requested before any document was loaded.
    #[error("No document loaded")]
    NoDocument,

    /// Serialization of the word index for the host renderer failed.
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speech_error_message() {
        let err = Error::Speech("synthesis backend unavailable".to_string());
        let msg = format!("{}", err);
        assert!(msg.contains("Speech engine error"));
        assert!(msg.contains("synthesis backend unavailable"));
    }

    #[test]
    fn test_no_document_message() {
        let msg = format!("{}", Error::NoDocument);
        assert!(msg.contains("No document loaded"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Error>();
    }
}
