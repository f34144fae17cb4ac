//! The project: root aggregate owning all domain state.
//!
//! Created empty, mutated only through commands, and fully
//! serializable — `snapshot()` on the facade hands a clone of this
//! struct to external serializers.

use serde::{Deserialize, Serialize};

use cantata_types::{
    ClipId, Connection, ConnectionId, Node, NodeId, Port, PortRef,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    /// Nodes in insertion order. Order matters: it breaks ties in the
    /// render order and keeps snapshots reproducible.
    nodes: Vec<Node>,
    /// Connections in insertion order.
    connections: Vec<Connection>,
    bpm: f64,
    time_signature: (u8, u8),
    next_node_id: u32,
    next_connection_id: u32,
    next_clip_id: u32,
}

impl Project {
    pub fn new(name: impl Into<String>, bpm: f64, time_signature: (u8, u8)) -> Self {
        Self {
            name: name.into(),
            nodes: Vec::new(),
            connections: Vec::new(),
            bpm,
            time_signature,
            next_node_id: 0,
            next_connection_id: 0,
            next_clip_id: 0,
        }
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }

    pub fn node_position(&self, id: NodeId) -> Option<usize> {
        self.nodes.iter().position(|n| n.id == id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.id == id)
    }

    pub fn connection_position(&self, id: ConnectionId) -> Option<usize> {
        self.connections.iter().position(|c| c.id == id)
    }

    /// Resolve a port reference against the node set.
    pub fn port(&self, port_ref: PortRef) -> Option<&Port> {
        self.node(port_ref.node)?.port(port_ref.port)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn time_signature(&self) -> (u8, u8) {
        self.time_signature
    }

    pub(crate) fn set_bpm(&mut self, bpm: f64) {
        self.bpm = bpm;
    }

    pub(crate) fn set_time_signature(&mut self, numerator: u8, denominator: u8) {
        self.time_signature = (numerator, denominator);
    }

    // Id allocation. Resolution allocates only after validation has
    // passed, and the history records the counter values around each
    // step and restores them on undo/redo, so a snapshot taken before
    // an edit round-trips exactly.

    pub(crate) fn allocate_node_id(&mut self) -> NodeId {
        let id = NodeId::new(self.next_node_id);
        self.next_node_id += 1;
        id
    }

    pub(crate) fn allocate_connection_id(&mut self) -> ConnectionId {
        let id = ConnectionId::new(self.next_connection_id);
        self.next_connection_id += 1;
        id
    }

    pub(crate) fn allocate_clip_id(&mut self) -> ClipId {
        let id = ClipId::new(self.next_clip_id);
        self.next_clip_id += 1;
        id
    }

    pub(crate) fn id_counters(&self) -> (u32, u32, u32) {
        (self.next_node_id, self.next_connection_id, self.next_clip_id)
    }

    pub(crate) fn restore_id_counters(&mut self, counters: (u32, u32, u32)) {
        self.next_node_id = counters.0;
        self.next_connection_id = counters.1;
        self.next_clip_id = counters.2;
    }

    // Structural mutation helpers, used only by change application.

    pub(crate) fn insert_node(&mut self, index: usize, node: Node) {
        let index = index.min(self.nodes.len());
        self.nodes.insert(index, node);
    }

    pub(crate) fn remove_node(&mut self, id: NodeId) -> Option<(usize, Node)> {
        let index = self.node_position(id)?;
        Some((index, self.nodes.remove(index)))
    }

    pub(crate) fn insert_connection(&mut self, index: usize, connection: Connection) {
        let index = index.min(self.connections.len());
        self.connections.insert(index, connection);
    }

    pub(crate) fn remove_connection(&mut self, id: ConnectionId) -> Option<(usize, Connection)> {
        let index = self.connection_position(id)?;
        Some((index, self.connections.remove(index)))
    }
}
