use std::fmt;

/// Errors from the wire codec's hot path. Kept as a small typed enum rather
/// than `anyhow`, since these are checked in tight loops and the caller
/// branches on the kind, not just the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    /// A required tag was absent from a message that must carry it.
    MissingTag(u32),
    /// A field's bytes could not be parsed as the requested type.
    MalformedField { tag: u32, value: String },
    /// The message type did not match what the caller expected.
    UnexpectedMessageType { expected: &'static str, got: String },
}

impl fmt::Display for WireError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WireError::MissingTag(tag) => write!(f, "missing required tag {tag}"),
            WireError::MalformedField { tag, value } => {
                write!(f, "malformed value for tag {tag}: {value:?}")
            }
            WireError::UnexpectedMessageType { expected, got } => {
                write!(f, "expected MsgType {expected}, got {got}")
            }
        }
    }
}

impl std::error::Error for WireError {}
