//! Commands: every externally visible mutation, as data.
//!
//! A [`Command`] describes what the caller wants. Resolving it against
//! the project validates everything up front and produces a concrete
//! [`Change`](change::Change) record carrying the ids and undo payload;
//! applying a change is deterministic, so undo/redo replay changes
//! rather than re-resolving commands.

mod change;
mod history;

pub use history::CommandManager;

use cantata_types::{
    AutomationPoint, ClipContent, ClipId, ConnectionId, NodeId, NodeKind, Note, ParamValue,
    Parameter, PortRef, SendTap,
};

/// One invertible mutation request. Immutable once created.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddNode {
        name: String,
        kind: NodeKind,
        /// Extra parameters beyond the kind's defaults (plugin
        /// parameter sets, mostly).
        params: Vec<Parameter>,
    },
    RemoveNode {
        node: NodeId,
    },
    RenameNode {
        node: NodeId,
        name: String,
    },
    Connect {
        source: PortRef,
        dest: PortRef,
        tap: SendTap,
    },
    Disconnect {
        connection: ConnectionId,
    },
    SetParam {
        node: NodeId,
        param: String,
        value: ParamValue,
    },
    SetTempo {
        bpm: f64,
    },
    SetTimeSignature {
        numerator: u8,
        denominator: u8,
    },
    AddClip {
        track: NodeId,
        name: String,
        start_beat: f64,
        duration_beats: f64,
        content: ClipContent,
    },
    RemoveClip {
        track: NodeId,
        clip: ClipId,
    },
    MoveClip {
        track: NodeId,
        clip: ClipId,
        new_start_beat: f64,
    },
    AddNotes {
        track: NodeId,
        clip: ClipId,
        notes: Vec<Note>,
    },
    RemoveNotes {
        track: NodeId,
        clip: ClipId,
        notes: Vec<Note>,
    },
    AddAutomationPoint {
        node: NodeId,
        param: String,
        point: AutomationPoint,
    },
    RemoveAutomationPoint {
        node: NodeId,
        param: String,
        beat: f64,
    },
}

impl Command {
    /// Short human-readable description for history listings.
    pub fn description(&self) -> String {
        match self {
            Command::AddNode { name, kind, .. } => format!("add {} '{}'", kind.name(), name),
            Command::RemoveNode { node } => format!("remove node {}", node),
            Command::RenameNode { node, name } => format!("rename node {} to '{}'", node, name),
            Command::Connect { source, dest, .. } => format!("connect {} -> {}", source, dest),
            Command::Disconnect { connection } => format!("disconnect {}", connection),
            Command::SetParam { node, param, value } => {
                format!("set {}.{} = {}", node, param, value)
            }
            Command::SetTempo { bpm } => format!("set tempo {}", bpm),
            Command::SetTimeSignature {
                numerator,
                denominator,
            } => format!("set time signature {}/{}", numerator, denominator),
            Command::AddClip { track, name, .. } => format!("add clip '{}' on {}", name, track),
            Command::RemoveClip { track, clip } => format!("remove clip {} on {}", clip, track),
            Command::MoveClip {
                clip,
                new_start_beat,
                ..
            } => format!("move clip {} to beat {}", clip, new_start_beat),
            Command::AddNotes { clip, notes, .. } => {
                format!("add {} notes to clip {}", notes.len(), clip)
            }
            Command::RemoveNotes { clip, notes, .. } => {
                format!("remove {} notes from clip {}", notes.len(), clip)
            }
            Command::AddAutomationPoint { node, param, point } => {
                format!("automate {}.{} at beat {}", node, param, point.beat)
            }
            Command::RemoveAutomationPoint { node, param, beat } => {
                format!("remove automation on {}.{} at beat {}", node, param, beat)
            }
        }
    }
}
