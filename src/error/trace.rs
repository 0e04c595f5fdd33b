use thiserror::Error;

/// Rejection reasons for literal traffic traces.
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("Trace contains no rows.")]
    Empty,
    #[error("Line {line}: expected 'tag time size', got '{content}'.")]
    MalformedRow { line: usize, content: String },
    #[error("Line {line}: invalid time '{value}'.")]
    InvalidTime { line: usize, value: String },
    #[error("Line {line}: invalid size '{value}'.")]
    InvalidSize { line: usize, value: String },
    #[error("Line {line}: time goes backwards.")]
    OutOfOrder { line: usize },
}
