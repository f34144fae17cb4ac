//! Domain events: immutable records of completed state changes.
//!
//! Every mutation publishes exactly one event (or one per affected
//! object, for cascades). Events carry enough data for a subscriber to
//! reconstruct the change without re-querying the project.

use serde::{Deserialize, Serialize};

use crate::automation::AutomationPoint;
use crate::clip::{Clip, Note};
use crate::node::Node;
use crate::param::ParamValue;
use crate::routing::Connection;
use crate::{ClipId, NodeId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Event {
    NodeAdded {
        node: Node,
    },
    NodeRemoved {
        node_id: NodeId,
    },
    NodeRenamed {
        node_id: NodeId,
        old_name: String,
        new_name: String,
    },
    ConnectionAdded {
        connection: Connection,
    },
    ConnectionRemoved {
        connection: Connection,
    },
    ParamChanged {
        node_id: NodeId,
        param: String,
        value: ParamValue,
    },
    ClipAdded {
        track_id: NodeId,
        clip: Clip,
    },
    ClipRemoved {
        track_id: NodeId,
        clip_id: ClipId,
    },
    ClipMoved {
        track_id: NodeId,
        clip_id: ClipId,
        old_start_beat: f64,
        new_start_beat: f64,
    },
    NotesAdded {
        track_id: NodeId,
        clip_id: ClipId,
        notes: Vec<Note>,
    },
    NotesRemoved {
        track_id: NodeId,
        clip_id: ClipId,
        notes: Vec<Note>,
    },
    AutomationPointAdded {
        node_id: NodeId,
        param: String,
        point: AutomationPoint,
        /// The point previously at the same beat, if any.
        replaced: Option<AutomationPoint>,
    },
    AutomationPointRemoved {
        node_id: NodeId,
        param: String,
        point: AutomationPoint,
    },
    TempoChanged {
        bpm: f64,
    },
    TimeSignatureChanged {
        numerator: u8,
        denominator: u8,
    },
    /// Published after any change to the graph topology, carrying the
    /// freshly computed deterministic render order.
    RenderOrderChanged {
        order: Vec<NodeId>,
    },
}

/// Discriminant of [`Event`], used as the subscription key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    NodeAdded,
    NodeRemoved,
    NodeRenamed,
    ConnectionAdded,
    ConnectionRemoved,
    ParamChanged,
    ClipAdded,
    ClipRemoved,
    ClipMoved,
    NotesAdded,
    NotesRemoved,
    AutomationPointAdded,
    AutomationPointRemoved,
    TempoChanged,
    TimeSignatureChanged,
    RenderOrderChanged,
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::NodeAdded { .. } => EventKind::NodeAdded,
            Event::NodeRemoved { .. } => EventKind::NodeRemoved,
            Event::NodeRenamed { .. } => EventKind::NodeRenamed,
            Event::ConnectionAdded { .. } => EventKind::ConnectionAdded,
            Event::ConnectionRemoved { .. } => EventKind::ConnectionRemoved,
            Event::ParamChanged { .. } => EventKind::ParamChanged,
            Event::ClipAdded { .. } => EventKind::ClipAdded,
            Event::ClipRemoved { .. } => EventKind::ClipRemoved,
            Event::ClipMoved { .. } => EventKind::ClipMoved,
            Event::NotesAdded { .. } => EventKind::NotesAdded,
            Event::NotesRemoved { .. } => EventKind::NotesRemoved,
            Event::AutomationPointAdded { .. } => EventKind::AutomationPointAdded,
            Event::AutomationPointRemoved { .. } => EventKind::AutomationPointRemoved,
            Event::TempoChanged { .. } => EventKind::TempoChanged,
            Event::TimeSignatureChanged { .. } => EventKind::TimeSignatureChanged,
            Event::RenderOrderChanged { .. } => EventKind::RenderOrderChanged,
        }
    }

    /// Whether this event describes a change to the graph topology.
    pub fn is_topology_change(&self) -> bool {
        matches!(
            self.kind(),
            EventKind::NodeAdded
                | EventKind::NodeRemoved
                | EventKind::ConnectionAdded
                | EventKind::ConnectionRemoved
        )
    }
}
