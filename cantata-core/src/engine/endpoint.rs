//! The engine side of the queue: a shadow of the project state.

use std::collections::HashMap;

use crossbeam_channel::Receiver;

use cantata_types::{AutomationLane, Clip, ClipId, Connection, NodeId};

use super::update::EngineUpdate;

/// Engine-side view of one node: numeric parameter values, automation
/// lanes and clips. Names and ports stay on the control side.
#[derive(Debug, Default)]
struct ShadowNode {
    params: HashMap<String, f64>,
    lanes: HashMap<String, AutomationLane>,
    clips: Vec<Clip>,
}

/// Shadow of the project as the engine sees it. Built exclusively from
/// applied [`EngineUpdate`]s, so it converges to the domain state once
/// the queue drains.
#[derive(Debug)]
pub struct EngineState {
    nodes: HashMap<NodeId, ShadowNode>,
    connections: Vec<Connection>,
    render_order: Vec<NodeId>,
    bpm: f64,
    time_signature: (u8, u8),
}

impl EngineState {
    fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            connections: Vec::new(),
            render_order: Vec::new(),
            bpm: 120.0,
            time_signature: (4, 4),
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn param(&self, node: NodeId, name: &str) -> Option<f64> {
        self.nodes.get(&node)?.params.get(name).copied()
    }

    /// The parameter's automated value at a beat, falling back to the
    /// plain value when no lane exists.
    pub fn param_at(&self, node: NodeId, name: &str, beat: f64) -> Option<f64> {
        let shadow = self.nodes.get(&node)?;
        shadow
            .lanes
            .get(name)
            .and_then(|lane| lane.value_at(beat))
            .or_else(|| shadow.params.get(name).copied())
    }

    pub fn clips(&self, node: NodeId) -> Option<&[Clip]> {
        self.nodes.get(&node).map(|n| n.clips.as_slice())
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn render_order(&self) -> &[NodeId] {
        &self.render_order
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn time_signature(&self) -> (u8, u8) {
        self.time_signature
    }

    fn apply(&mut self, update: EngineUpdate) {
        match update {
            EngineUpdate::AddNode { node } => {
                let mut shadow = ShadowNode::default();
                for param in &node.params {
                    if let Some(value) = param.value.as_f64() {
                        shadow.params.insert(param.name.clone(), value);
                    }
                    if let Some(lane) = &param.lane {
                        shadow.lanes.insert(param.name.clone(), lane.clone());
                    }
                }
                shadow.clips = node.clips.clone();
                self.nodes.insert(node.id, shadow);
            }
            EngineUpdate::RemoveNode { node_id } => {
                if self.nodes.remove(&node_id).is_none() {
                    log::warn!(target: "engine", "remove of unknown node {}", node_id);
                }
            }
            EngineUpdate::AddConnection { connection } => {
                self.connections.push(connection);
            }
            EngineUpdate::RemoveConnection { connection_id } => {
                let before = self.connections.len();
                self.connections.retain(|c| c.id != connection_id);
                if self.connections.len() == before {
                    log::warn!(target: "engine", "remove of unknown connection {}", connection_id);
                }
            }
            EngineUpdate::SetRenderOrder { order } => {
                self.render_order = order;
            }
            EngineUpdate::SetParam {
                node_id,
                param,
                value,
            } => match self.nodes.get_mut(&node_id) {
                Some(shadow) => {
                    shadow.params.insert(param, value);
                }
                None => log::warn!(target: "engine", "param for unknown node {}", node_id),
            },
            EngineUpdate::AddClip { track_id, clip } => match self.nodes.get_mut(&track_id) {
                Some(shadow) => shadow.clips.push(clip),
                None => log::warn!(target: "engine", "clip for unknown node {}", track_id),
            },
            EngineUpdate::RemoveClip { track_id, clip_id } => {
                match self.nodes.get_mut(&track_id) {
                    Some(shadow) => shadow.clips.retain(|c| c.id != clip_id),
                    None => log::warn!(target: "engine", "clip for unknown node {}", track_id),
                }
            }
            EngineUpdate::MoveClip {
                track_id,
                clip_id,
                start_beat,
            } => match self.clip_mut(track_id, clip_id) {
                Some(clip) => clip.start_beat = start_beat,
                None => {
                    log::warn!(target: "engine", "move of unknown clip {} on {}", clip_id, track_id)
                }
            },
            EngineUpdate::AddNotes {
                track_id,
                clip_id,
                notes,
            } => match self.clip_mut(track_id, clip_id) {
                Some(clip) => {
                    for note in notes {
                        clip.insert_note(note);
                    }
                }
                None => {
                    log::warn!(target: "engine", "notes for unknown clip {} on {}", clip_id, track_id)
                }
            },
            EngineUpdate::RemoveNotes {
                track_id,
                clip_id,
                notes,
            } => match self.clip_mut(track_id, clip_id) {
                Some(clip) => {
                    for note in &notes {
                        clip.remove_note(note);
                    }
                }
                None => {
                    log::warn!(target: "engine", "notes for unknown clip {} on {}", clip_id, track_id)
                }
            },
            EngineUpdate::SetAutomationPoint {
                node_id,
                param,
                point,
            } => match self.nodes.get_mut(&node_id) {
                Some(shadow) => {
                    shadow
                        .lanes
                        .entry(param)
                        .or_insert_with(AutomationLane::new)
                        .insert_point(point);
                }
                None => log::warn!(target: "engine", "automation for unknown node {}", node_id),
            },
            EngineUpdate::RemoveAutomationPoint {
                node_id,
                param,
                beat,
            } => match self.nodes.get_mut(&node_id) {
                Some(shadow) => {
                    if let Some(lane) = shadow.lanes.get_mut(&param) {
                        lane.remove_point(beat);
                        if lane.is_empty() {
                            shadow.lanes.remove(&param);
                        }
                    }
                }
                None => log::warn!(target: "engine", "automation for unknown node {}", node_id),
            },
            EngineUpdate::SetTempo { bpm } => {
                self.bpm = bpm;
            }
            EngineUpdate::SetTimeSignature {
                numerator,
                denominator,
            } => {
                self.time_signature = (numerator, denominator);
            }
        }
    }

    fn clip_mut(&mut self, track_id: NodeId, clip_id: ClipId) -> Option<&mut Clip> {
        self.nodes
            .get_mut(&track_id)?
            .clips
            .iter_mut()
            .find(|c| c.id == clip_id)
    }
}

/// The engine's receiving end. Owned by the audio side; the domain
/// never touches it after attach.
pub struct EngineEndpoint {
    rx: Receiver<EngineUpdate>,
    state: EngineState,
}

impl EngineEndpoint {
    pub(super) fn new(rx: Receiver<EngineUpdate>) -> Self {
        Self {
            rx,
            state: EngineState::new(),
        }
    }

    /// Drain every queued update into the shadow state. Called at
    /// block boundaries, so a render block sees all of them or none.
    /// Returns the number of updates applied.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(update) = self.rx.try_recv() {
            self.state.apply(update);
            applied += 1;
        }
        applied
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }
}
