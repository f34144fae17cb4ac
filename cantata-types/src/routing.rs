//! Connections: directed edges between ports.

use serde::{Deserialize, Serialize};

use crate::{ConnectionId, PortRef};

/// Where a send connection taps its source signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SendTap {
    /// After the source node's fader (the default for ordinary routing).
    PostFader,
    /// Before the source node's fader.
    PreFader,
}

impl Default for SendTap {
    fn default() -> Self {
        Self::PostFader
    }
}

/// A directed edge from a source port to a destination port.
///
/// The connection set of a project never contains a cycle; that
/// invariant is enforced at insertion time by the router.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    pub source: PortRef,
    pub dest: PortRef,
    pub tap: SendTap,
}

impl Connection {
    pub fn new(id: ConnectionId, source: PortRef, dest: PortRef, tap: SendTap) -> Self {
        Self {
            id,
            source,
            dest,
            tap,
        }
    }
}
