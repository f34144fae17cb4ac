//! Updates shipped over the queue to the engine endpoint.

use cantata_types::{
    AutomationPoint, Clip, ClipId, Connection, ConnectionId, Node, NodeId, Note,
};

/// Identifies one automatable parameter across the queue boundary.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParamKey {
    pub node: NodeId,
    pub param: String,
}

/// One engine-side state change.
///
/// Structural updates describe topology and content edits; they are
/// delivered exactly once, in order. Parameter updates are continuous
/// control data and may be coalesced under backpressure (last value
/// wins per parameter).
#[derive(Debug, Clone, PartialEq)]
pub enum EngineUpdate {
    AddNode {
        node: Node,
    },
    RemoveNode {
        node_id: NodeId,
    },
    AddConnection {
        connection: Connection,
    },
    RemoveConnection {
        connection_id: ConnectionId,
    },
    SetRenderOrder {
        order: Vec<NodeId>,
    },
    SetParam {
        node_id: NodeId,
        param: String,
        value: f64,
    },
    AddClip {
        track_id: NodeId,
        clip: Clip,
    },
    RemoveClip {
        track_id: NodeId,
        clip_id: ClipId,
    },
    MoveClip {
        track_id: NodeId,
        clip_id: ClipId,
        start_beat: f64,
    },
    AddNotes {
        track_id: NodeId,
        clip_id: ClipId,
        notes: Vec<Note>,
    },
    RemoveNotes {
        track_id: NodeId,
        clip_id: ClipId,
        notes: Vec<Note>,
    },
    SetAutomationPoint {
        node_id: NodeId,
        param: String,
        point: AutomationPoint,
    },
    RemoveAutomationPoint {
        node_id: NodeId,
        param: String,
        beat: f64,
    },
    SetTempo {
        bpm: f64,
    },
    SetTimeSignature {
        numerator: u8,
        denominator: u8,
    },
}

impl EngineUpdate {
    /// Whether this update must be delivered exactly once. Everything
    /// except parameter values is structural.
    pub fn is_structural(&self) -> bool {
        !matches!(self, EngineUpdate::SetParam { .. })
    }
}
