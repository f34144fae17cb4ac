//! The typed failure taxonomy for every mutating operation.
//!
//! Every error is returned to the caller before any part of the
//! mutation is applied; a failed operation leaves the project
//! untouched.

use cantata_types::{NodeId, SignalKind};

#[derive(Debug, Clone, PartialEq)]
pub enum DomainError {
    /// Malformed input: negative duration, out-of-range pitch,
    /// non-finite value, wrong port direction, and the like.
    Validation(String),
    /// Adding the connection would create a directed cycle.
    Cycle { source: NodeId, dest: NodeId },
    /// Source and destination port signal kinds differ.
    TypeMismatch { source: SignalKind, dest: SignalKind },
    /// The clip would overlap another clip on the same track.
    Overlap { track: NodeId, clip: String },
    /// Undo or redo was requested with an empty history stack.
    EmptyHistory,
    /// A macro was begun while another macro was still open, or
    /// undo/redo was requested mid-macro.
    MacroInProgress,
    /// A referenced id no longer exists.
    NotFound(String),
}

impl std::fmt::Display for DomainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DomainError::Validation(msg) => write!(f, "validation failed: {}", msg),
            DomainError::Cycle { source, dest } => write!(
                f,
                "connection {} -> {} would create a cycle",
                source, dest
            ),
            DomainError::TypeMismatch { source, dest } => {
                write!(f, "port types do not match: {} -> {}", source, dest)
            }
            DomainError::Overlap { track, clip } => {
                write!(f, "clip {} would overlap on track {}", clip, track)
            }
            DomainError::EmptyHistory => write!(f, "nothing to undo or redo"),
            DomainError::MacroInProgress => write!(f, "a macro is already in progress"),
            DomainError::NotFound(what) => write!(f, "not found: {}", what),
        }
    }
}

impl std::error::Error for DomainError {}

impl DomainError {
    pub fn not_found(what: impl std::fmt::Display) -> Self {
        DomainError::NotFound(what.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }
}
