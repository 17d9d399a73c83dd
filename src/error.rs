use thiserror::Error;

/// Failures that terminate a generation session.
///
/// Per-chunk repair failures never appear here; the session silently keeps
/// its last good candidate. Only transport trouble and "the stream ended and
/// nothing was ever usable" cross the component boundary, and they reach the
/// consumer as a single human-readable string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    /// The transport failed while the stream was being read. The message is
    /// the transport's own, surfaced verbatim.
    #[error("{0}")]
    Transport(String),
    /// A chunk contained a byte sequence that can never form valid UTF-8.
    #[error("generator stream is not valid UTF-8")]
    InvalidUtf8,
    /// The stream ended without any parse attempt ever succeeding.
    #[error("generator output never produced a usable recipe draft")]
    NoUsableDraft,
}
