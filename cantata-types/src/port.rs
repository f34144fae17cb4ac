//! Typed signal endpoints on nodes.

use serde::{Deserialize, Serialize};

use crate::{NodeId, PortId};

/// What kind of signal a port carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignalKind {
    Audio,
    Midi,
}

impl std::fmt::Display for SignalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SignalKind::Audio => write!(f, "audio"),
            SignalKind::Midi => write!(f, "midi"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PortDirection {
    Input,
    Output,
}

/// A typed endpoint belonging to exactly one node. Ports are owned by
/// their node; connections reference them through [`PortRef`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    pub name: String,
    pub direction: PortDirection,
    pub signal: SignalKind,
    pub channels: u16,
}

impl Port {
    pub fn new(
        id: PortId,
        name: impl Into<String>,
        direction: PortDirection,
        signal: SignalKind,
        channels: u16,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            direction,
            signal,
            channels,
        }
    }
}

/// Reference to a port: owning node plus the port's id within it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PortRef {
    pub node: NodeId,
    pub port: PortId,
}

impl PortRef {
    pub fn new(node: NodeId, port: PortId) -> Self {
        Self { node, port }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.node, self.port)
    }
}
