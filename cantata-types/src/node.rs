//! Nodes: processing units in the routing graph.

use serde::{Deserialize, Serialize};

use crate::clip::Clip;
use crate::param::{ParamValue, Parameter};
use crate::port::{Port, PortDirection, SignalKind};
use crate::{ClipId, NodeId, PortId};

/// Closed set of node kinds. Kind-specific payload rides on the
/// variant; structural fields (ports, params, clips) live on [`Node`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// MIDI in, audio out; clips hold notes.
    InstrumentTrack,
    /// Audio in and out; clips reference audio sources.
    AudioTrack,
    /// Summing node for sends and submixes.
    Bus,
    /// A hosted processor, identified by its registry uid.
    Plugin { uid: String },
    /// The final mix destination.
    Master,
}

impl NodeKind {
    pub fn is_track(&self) -> bool {
        matches!(self, NodeKind::InstrumentTrack | NodeKind::AudioTrack)
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::InstrumentTrack => "instrument-track",
            NodeKind::AudioTrack => "audio-track",
            NodeKind::Bus => "bus",
            NodeKind::Plugin { .. } => "plugin",
            NodeKind::Master => "master",
        }
    }
}

/// A processing unit: track, bus, plugin instance or master.
///
/// Owned exclusively by the project; everything else refers to nodes
/// by id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub ports: Vec<Port>,
    pub params: Vec<Parameter>,
    /// Clips, meaningful only for track kinds; empty otherwise.
    pub clips: Vec<Clip>,
}

impl Node {
    /// Build a node with the standard ports and parameters for its
    /// kind. Plugin parameter sets are supplied by the caller via
    /// [`Node::with_param`].
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        let ports = default_ports(id, &kind);
        let params = default_params(&kind);
        Self {
            id,
            name: name.into(),
            kind,
            ports,
            params,
            clips: Vec::new(),
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: ParamValue) -> Self {
        self.params.push(Parameter::new(name, value));
        self
    }

    pub fn is_track(&self) -> bool {
        self.kind.is_track()
    }

    pub fn port(&self, id: PortId) -> Option<&Port> {
        self.ports.iter().find(|p| p.id == id)
    }

    pub fn param(&self, name: &str) -> Option<&Parameter> {
        self.params.iter().find(|p| p.name == name)
    }

    pub fn param_mut(&mut self, name: &str) -> Option<&mut Parameter> {
        self.params.iter_mut().find(|p| p.name == name)
    }

    pub fn clip(&self, id: ClipId) -> Option<&Clip> {
        self.clips.iter().find(|c| c.id == id)
    }

    pub fn clip_mut(&mut self, id: ClipId) -> Option<&mut Clip> {
        self.clips.iter_mut().find(|c| c.id == id)
    }

    /// First port matching direction and signal kind; the common
    /// lookup when callers route "the audio output" of a node.
    pub fn port_by_role(&self, direction: PortDirection, signal: SignalKind) -> Option<&Port> {
        self.ports
            .iter()
            .find(|p| p.direction == direction && p.signal == signal)
    }
}

fn default_ports(node: NodeId, kind: &NodeKind) -> Vec<Port> {
    let _ = node;
    let mut ports = Vec::new();
    let mut next = 0u32;
    let mut push = |name: &str, direction, signal, channels| {
        ports.push(Port::new(PortId::new(next), name, direction, signal, channels));
        next += 1;
    };
    match kind {
        NodeKind::InstrumentTrack => {
            push("midi in", PortDirection::Input, SignalKind::Midi, 1);
            push("out", PortDirection::Output, SignalKind::Audio, 2);
        }
        NodeKind::AudioTrack | NodeKind::Bus | NodeKind::Plugin { .. } => {
            push("in", PortDirection::Input, SignalKind::Audio, 2);
            push("out", PortDirection::Output, SignalKind::Audio, 2);
        }
        NodeKind::Master => {
            push("in", PortDirection::Input, SignalKind::Audio, 2);
        }
    }
    ports
}

fn default_params(kind: &NodeKind) -> Vec<Parameter> {
    match kind {
        NodeKind::InstrumentTrack | NodeKind::AudioTrack | NodeKind::Bus | NodeKind::Master => {
            vec![
                Parameter::new("volume", ParamValue::Float(-6.0)),
                Parameter::new("pan", ParamValue::Float(0.0)),
                Parameter::new("mute", ParamValue::Bool(false)),
            ]
        }
        NodeKind::Plugin { .. } => vec![Parameter::new("bypass", ParamValue::Bool(false))],
    }
}
