//! Concrete, reversible change records.
//!
//! `resolve` validates a command against the current project and turns
//! it into a [`Change`] with every id allocated and every undo payload
//! captured — nothing is mutated until validation has fully passed.
//! `apply_change` then performs the mutation and reports the events it
//! caused. Every change inverts to another change, which is how undo
//! and redo replay history in either direction.

use cantata_types::{
    AutomationPoint, Clip, ClipContent, ClipId, Connection, Event, Node, NodeId, Note, ParamValue,
};

use super::Command;
use crate::error::DomainError;
use crate::project::Project;
use crate::router;
use crate::timeline;

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Change {
    AddNode {
        index: usize,
        node: Node,
        /// Connections restored along with the node (populated when
        /// this change is the inverse of a node removal).
        connections: Vec<(usize, Connection)>,
    },
    RemoveNode {
        index: usize,
        node: Node,
        connections: Vec<(usize, Connection)>,
    },
    AddConnection {
        index: usize,
        connection: Connection,
    },
    RemoveConnection {
        index: usize,
        connection: Connection,
    },
    SetName {
        node: NodeId,
        old: String,
        new: String,
    },
    SetParam {
        node: NodeId,
        param: String,
        old: ParamValue,
        new: ParamValue,
    },
    SetTempo {
        old: f64,
        new: f64,
    },
    SetTimeSignature {
        old: (u8, u8),
        new: (u8, u8),
    },
    AddClip {
        track: NodeId,
        clip: Clip,
    },
    RemoveClip {
        track: NodeId,
        clip: Clip,
    },
    MoveClip {
        track: NodeId,
        clip: ClipId,
        old_start: f64,
        new_start: f64,
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
        replaced: Option<AutomationPoint>,
    },
    RemoveAutomationPoint {
        node: NodeId,
        param: String,
        point: AutomationPoint,
    },
}

impl Change {
    /// The change that exactly reverses this one.
    pub(crate) fn invert(&self) -> Change {
        match self.clone() {
            Change::AddNode {
                index,
                node,
                connections,
            } => Change::RemoveNode {
                index,
                node,
                connections,
            },
            Change::RemoveNode {
                index,
                node,
                connections,
            } => Change::AddNode {
                index,
                node,
                connections,
            },
            Change::AddConnection { index, connection } => {
                Change::RemoveConnection { index, connection }
            }
            Change::RemoveConnection { index, connection } => {
                Change::AddConnection { index, connection }
            }
            Change::SetName { node, old, new } => Change::SetName {
                node,
                old: new,
                new: old,
            },
            Change::SetParam {
                node,
                param,
                old,
                new,
            } => Change::SetParam {
                node,
                param,
                old: new,
                new: old,
            },
            Change::SetTempo { old, new } => Change::SetTempo { old: new, new: old },
            Change::SetTimeSignature { old, new } => Change::SetTimeSignature { old: new, new: old },
            Change::AddClip { track, clip } => Change::RemoveClip { track, clip },
            Change::RemoveClip { track, clip } => Change::AddClip { track, clip },
            Change::MoveClip {
                track,
                clip,
                old_start,
                new_start,
            } => Change::MoveClip {
                track,
                clip,
                old_start: new_start,
                new_start: old_start,
            },
            Change::AddNotes { track, clip, notes } => Change::RemoveNotes { track, clip, notes },
            Change::RemoveNotes { track, clip, notes } => Change::AddNotes { track, clip, notes },
            Change::AddAutomationPoint {
                node,
                param,
                point,
                replaced,
            } => match replaced {
                // Re-adding the replaced point pushes this one back out.
                Some(previous) => Change::AddAutomationPoint {
                    node,
                    param,
                    point: previous,
                    replaced: Some(point),
                },
                None => Change::RemoveAutomationPoint { node, param, point },
            },
            Change::RemoveAutomationPoint { node, param, point } => Change::AddAutomationPoint {
                node,
                param,
                point,
                replaced: None,
            },
        }
    }
}

/// Validate a command and capture it as a concrete change. Ids for new
/// objects are allocated only after every check has passed, so a
/// failed command leaves the project untouched, counters included.
pub(crate) fn resolve(project: &mut Project, command: &Command) -> Result<Change, DomainError> {
    match command {
        Command::AddNode { name, kind, params } => {
            if name.is_empty() {
                return Err(DomainError::validation("node name is empty"));
            }
            let mut node = Node::new(NodeId::new(0), name.clone(), kind.clone());
            for param in params {
                if param.name.is_empty() {
                    return Err(DomainError::validation("parameter name is empty"));
                }
                if node.param(&param.name).is_some() {
                    return Err(DomainError::validation(format!(
                        "duplicate parameter '{}'",
                        param.name
                    )));
                }
                node.params.push(param.clone());
            }
            node.id = project.allocate_node_id();
            Ok(Change::AddNode {
                index: project.nodes().len(),
                node,
                connections: Vec::new(),
            })
        }
        Command::RemoveNode { node } => {
            let index = project
                .node_position(*node)
                .ok_or_else(|| DomainError::not_found(format!("node {}", node)))?;
            let captured = project.nodes()[index].clone();
            Ok(Change::RemoveNode {
                index,
                node: captured,
                connections: router::connections_touching(project, *node),
            })
        }
        Command::RenameNode { node, name } => {
            if name.is_empty() {
                return Err(DomainError::validation("node name is empty"));
            }
            let old = project
                .node(*node)
                .ok_or_else(|| DomainError::not_found(format!("node {}", node)))?
                .name
                .clone();
            Ok(Change::SetName {
                node: *node,
                old,
                new: name.clone(),
            })
        }
        Command::Connect { source, dest, tap } => {
            router::validate_connect(project, *source, *dest)?;
            let id = project.allocate_connection_id();
            Ok(Change::AddConnection {
                index: project.connections().len(),
                connection: Connection::new(id, *source, *dest, *tap),
            })
        }
        Command::Disconnect { connection } => {
            let index = project
                .connection_position(*connection)
                .ok_or_else(|| DomainError::not_found(format!("connection {}", connection)))?;
            Ok(Change::RemoveConnection {
                index,
                connection: project.connections()[index].clone(),
            })
        }
        Command::SetParam { node, param, value } => {
            let target = project
                .node(*node)
                .ok_or_else(|| DomainError::not_found(format!("node {}", node)))?
                .param(param)
                .ok_or_else(|| DomainError::not_found(format!("parameter {}.{}", node, param)))?;
            if std::mem::discriminant(&target.value) != std::mem::discriminant(value) {
                return Err(DomainError::validation(format!(
                    "parameter {}.{} cannot change type",
                    node, param
                )));
            }
            if let ParamValue::Float(v) = value {
                if !v.is_finite() {
                    return Err(DomainError::validation("parameter value is not finite"));
                }
            }
            Ok(Change::SetParam {
                node: *node,
                param: param.clone(),
                old: target.value.clone(),
                new: value.clone(),
            })
        }
        Command::SetTempo { bpm } => {
            if !bpm.is_finite() || *bpm <= 0.0 {
                return Err(DomainError::validation(format!("bpm {} is invalid", bpm)));
            }
            Ok(Change::SetTempo {
                old: project.bpm(),
                new: *bpm,
            })
        }
        Command::SetTimeSignature {
            numerator,
            denominator,
        } => {
            if *numerator == 0 || !matches!(*denominator, 1 | 2 | 4 | 8 | 16 | 32) {
                return Err(DomainError::validation(format!(
                    "time signature {}/{} is invalid",
                    numerator, denominator
                )));
            }
            Ok(Change::SetTimeSignature {
                old: project.time_signature(),
                new: (*numerator, *denominator),
            })
        }
        Command::AddClip {
            track,
            name,
            start_beat,
            duration_beats,
            content,
        } => {
            if name.is_empty() {
                return Err(DomainError::validation("clip name is empty"));
            }
            if let ClipContent::Midi { notes } = content {
                if !notes.is_empty() {
                    timeline::validate_notes(notes)?;
                }
            }
            if let ClipContent::Audio { gain_db, .. } = content {
                if !gain_db.is_finite() {
                    return Err(DomainError::validation("clip gain is not finite"));
                }
            }
            let mut clip = Clip::midi(ClipId::new(0), name.clone(), *start_beat, *duration_beats);
            // Notes arrive in caller order; insert_note keeps the
            // clip's canonical order.
            match content {
                ClipContent::Midi { notes } => {
                    for note in notes {
                        clip.insert_note(*note);
                    }
                }
                audio => clip.content = audio.clone(),
            }
            timeline::validate_clip(project, *track, &clip, None)?;
            clip.id = project.allocate_clip_id();
            Ok(Change::AddClip {
                track: *track,
                clip,
            })
        }
        Command::RemoveClip { track, clip } => {
            let node = timeline::track(project, *track)?;
            let captured = node
                .clip(*clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?
                .clone();
            Ok(Change::RemoveClip {
                track: *track,
                clip: captured,
            })
        }
        Command::MoveClip {
            track,
            clip,
            new_start_beat,
        } => {
            let node = timeline::track(project, *track)?;
            let current = node
                .clip(*clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?;
            let mut moved = current.clone();
            moved.start_beat = *new_start_beat;
            let old_start = current.start_beat;
            timeline::validate_clip(project, *track, &moved, Some(*clip))?;
            Ok(Change::MoveClip {
                track: *track,
                clip: *clip,
                old_start,
                new_start: *new_start_beat,
            })
        }
        Command::AddNotes { track, clip, notes } => {
            timeline::validate_notes(notes)?;
            let node = timeline::track(project, *track)?;
            let target = node
                .clip(*clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?;
            if !target.is_midi() {
                return Err(DomainError::validation(format!(
                    "clip {} is not a MIDI clip",
                    clip
                )));
            }
            Ok(Change::AddNotes {
                track: *track,
                clip: *clip,
                notes: notes.clone(),
            })
        }
        Command::RemoveNotes { track, clip, notes } => {
            timeline::validate_notes(notes)?;
            let node = timeline::track(project, *track)?;
            let target = node
                .clip(*clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?;
            // Every listed note must exist, respecting multiplicity.
            let mut remaining = target
                .notes()
                .ok_or_else(|| {
                    DomainError::validation(format!("clip {} is not a MIDI clip", clip))
                })?
                .to_vec();
            for note in notes {
                match remaining.iter().position(|n| n == note) {
                    Some(idx) => {
                        remaining.remove(idx);
                    }
                    None => {
                        return Err(DomainError::not_found(format!(
                            "note {} at beat {} in clip {}",
                            note.pitch, note.start_beat, clip
                        )))
                    }
                }
            }
            Ok(Change::RemoveNotes {
                track: *track,
                clip: *clip,
                notes: notes.clone(),
            })
        }
        Command::AddAutomationPoint { node, param, point } => {
            if !point.beat.is_finite() || point.beat < 0.0 {
                return Err(DomainError::validation(format!(
                    "automation beat {} is invalid",
                    point.beat
                )));
            }
            if !point.value.is_finite() {
                return Err(DomainError::validation("automation value is not finite"));
            }
            let target = project
                .node(*node)
                .ok_or_else(|| DomainError::not_found(format!("node {}", node)))?
                .param(param)
                .ok_or_else(|| DomainError::not_found(format!("parameter {}.{}", node, param)))?;
            let replaced = target
                .lane
                .as_ref()
                .and_then(|lane| lane.point_at(point.beat))
                .copied();
            Ok(Change::AddAutomationPoint {
                node: *node,
                param: param.clone(),
                point: *point,
                replaced,
            })
        }
        Command::RemoveAutomationPoint { node, param, beat } => {
            let target = project
                .node(*node)
                .ok_or_else(|| DomainError::not_found(format!("node {}", node)))?
                .param(param)
                .ok_or_else(|| DomainError::not_found(format!("parameter {}.{}", node, param)))?;
            let point = target
                .lane
                .as_ref()
                .and_then(|lane| lane.point_at(*beat))
                .copied()
                .ok_or_else(|| {
                    DomainError::not_found(format!(
                        "automation point on {}.{} at beat {}",
                        node, param, beat
                    ))
                })?;
            Ok(Change::RemoveAutomationPoint {
                node: *node,
                param: param.clone(),
                point,
            })
        }
    }
}

fn node_mut<'a>(project: &'a mut Project, id: NodeId) -> Result<&'a mut Node, DomainError> {
    project
        .node_mut(id)
        .ok_or_else(|| DomainError::not_found(format!("node {}", id)))
}

/// Apply a resolved change and report the events it caused. A change
/// is pre-validated, so failures here indicate a corrupted history and
/// surface as `NotFound`.
pub(crate) fn apply_change(
    project: &mut Project,
    change: &Change,
) -> Result<Vec<Event>, DomainError> {
    let mut events = Vec::new();
    match change {
        Change::AddNode {
            index,
            node,
            connections,
        } => {
            project.insert_node(*index, node.clone());
            events.push(Event::NodeAdded { node: node.clone() });
            for (conn_index, connection) in connections {
                project.insert_connection(*conn_index, connection.clone());
                events.push(Event::ConnectionAdded {
                    connection: connection.clone(),
                });
            }
        }
        Change::RemoveNode {
            node, connections, ..
        } => {
            for (_, connection) in connections.iter().rev() {
                project
                    .remove_connection(connection.id)
                    .ok_or_else(|| DomainError::not_found(format!("connection {}", connection.id)))?;
                events.push(Event::ConnectionRemoved {
                    connection: connection.clone(),
                });
            }
            project
                .remove_node(node.id)
                .ok_or_else(|| DomainError::not_found(format!("node {}", node.id)))?;
            events.push(Event::NodeRemoved { node_id: node.id });
        }
        Change::AddConnection { index, connection } => {
            project.insert_connection(*index, connection.clone());
            events.push(Event::ConnectionAdded {
                connection: connection.clone(),
            });
        }
        Change::RemoveConnection { connection, .. } => {
            project
                .remove_connection(connection.id)
                .ok_or_else(|| DomainError::not_found(format!("connection {}", connection.id)))?;
            events.push(Event::ConnectionRemoved {
                connection: connection.clone(),
            });
        }
        Change::SetName { node, old, new } => {
            node_mut(project, *node)?.name = new.clone();
            events.push(Event::NodeRenamed {
                node_id: *node,
                old_name: old.clone(),
                new_name: new.clone(),
            });
        }
        Change::SetParam {
            node, param, new, ..
        } => {
            let target = node_mut(project, *node)?
                .param_mut(param)
                .ok_or_else(|| DomainError::not_found(format!("parameter {}.{}", node, param)))?;
            target.value = new.clone();
            events.push(Event::ParamChanged {
                node_id: *node,
                param: param.clone(),
                value: new.clone(),
            });
        }
        Change::SetTempo { new, .. } => {
            project.set_bpm(*new);
            events.push(Event::TempoChanged { bpm: *new });
        }
        Change::SetTimeSignature { new, .. } => {
            project.set_time_signature(new.0, new.1);
            events.push(Event::TimeSignatureChanged {
                numerator: new.0,
                denominator: new.1,
            });
        }
        Change::AddClip { track, clip } => {
            timeline::insert_clip_sorted(node_mut(project, *track)?, clip.clone());
            events.push(Event::ClipAdded {
                track_id: *track,
                clip: clip.clone(),
            });
        }
        Change::RemoveClip { track, clip } => {
            timeline::remove_clip(node_mut(project, *track)?, clip.id)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip.id)))?;
            events.push(Event::ClipRemoved {
                track_id: *track,
                clip_id: clip.id,
            });
        }
        Change::MoveClip {
            track,
            clip,
            old_start,
            new_start,
        } => {
            let node = node_mut(project, *track)?;
            let mut moved = timeline::remove_clip(node, *clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?;
            moved.start_beat = *new_start;
            timeline::insert_clip_sorted(node, moved);
            events.push(Event::ClipMoved {
                track_id: *track,
                clip_id: *clip,
                old_start_beat: *old_start,
                new_start_beat: *new_start,
            });
        }
        Change::AddNotes { track, clip, notes } => {
            let target = node_mut(project, *track)?
                .clip_mut(*clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?;
            for note in notes {
                target.insert_note(*note);
            }
            events.push(Event::NotesAdded {
                track_id: *track,
                clip_id: *clip,
                notes: notes.clone(),
            });
        }
        Change::RemoveNotes { track, clip, notes } => {
            let target = node_mut(project, *track)?
                .clip_mut(*clip)
                .ok_or_else(|| DomainError::not_found(format!("clip {}", clip)))?;
            for note in notes {
                if !target.remove_note(note) {
                    return Err(DomainError::not_found(format!(
                        "note {} at beat {} in clip {}",
                        note.pitch, note.start_beat, clip
                    )));
                }
            }
            events.push(Event::NotesRemoved {
                track_id: *track,
                clip_id: *clip,
                notes: notes.clone(),
            });
        }
        Change::AddAutomationPoint {
            node,
            param,
            point,
            replaced,
        } => {
            let target = node_mut(project, *node)?
                .param_mut(param)
                .ok_or_else(|| DomainError::not_found(format!("parameter {}.{}", node, param)))?;
            target.lane_mut().insert_point(*point);
            events.push(Event::AutomationPointAdded {
                node_id: *node,
                param: param.clone(),
                point: *point,
                replaced: *replaced,
            });
        }
        Change::RemoveAutomationPoint { node, param, point } => {
            let target = node_mut(project, *node)?
                .param_mut(param)
                .ok_or_else(|| DomainError::not_found(format!("parameter {}.{}", node, param)))?;
            let lane = target.lane.as_mut().ok_or_else(|| {
                DomainError::not_found(format!("automation lane on {}.{}", node, param))
            })?;
            lane.remove_point(point.beat).ok_or_else(|| {
                DomainError::not_found(format!(
                    "automation point on {}.{} at beat {}",
                    node, param, point.beat
                ))
            })?;
            // A lane exists exactly while it has points; dropping the
            // empty lane keeps undo round trips byte-identical.
            if lane.is_empty() {
                target.lane = None;
            }
            events.push(Event::AutomationPointRemoved {
                node_id: *node,
                param: param.clone(),
                point: *point,
            });
        }
    }
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantata_types::{CurveKind, NodeKind, PortDirection, SendTap, SignalKind};

    fn execute(project: &mut Project, command: Command) -> Change {
        let change = resolve(project, &command).expect("resolve");
        apply_change(project, &change).expect("apply");
        change
    }

    fn add_track(project: &mut Project, name: &str) -> NodeId {
        let change = execute(
            project,
            Command::AddNode {
                name: name.into(),
                kind: NodeKind::InstrumentTrack,
                params: Vec::new(),
            },
        );
        match change {
            Change::AddNode { node, .. } => node.id,
            other => panic!("unexpected change {:?}", other),
        }
    }

    fn port(project: &Project, node: NodeId, direction: PortDirection) -> cantata_types::PortRef {
        let p = project
            .node(node)
            .and_then(|n| n.port_by_role(direction, SignalKind::Audio))
            .expect("audio port");
        cantata_types::PortRef::new(node, p.id)
    }

    #[test]
    fn add_node_allocates_fresh_ids() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let a = add_track(&mut p, "a");
        let b = add_track(&mut p, "b");
        assert_ne!(a, b);
        assert_eq!(p.nodes().len(), 2);
    }

    #[test]
    fn remove_node_captures_its_connections() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let bus = match execute(
            &mut p,
            Command::AddNode {
                name: "bus".into(),
                kind: NodeKind::Bus,
                params: Vec::new(),
            },
        ) {
            Change::AddNode { node, .. } => node.id,
            other => panic!("unexpected change {:?}", other),
        };
        let source = port(&p, track, PortDirection::Output);
        let dest = port(&p, bus, PortDirection::Input);
        execute(
            &mut p,
            Command::Connect {
                source,
                dest,
                tap: SendTap::PostFader,
            },
        );

        let before = p.clone();
        let change = execute(&mut p, Command::RemoveNode { node: bus });
        match &change {
            Change::RemoveNode { connections, .. } => assert_eq!(connections.len(), 1),
            other => panic!("unexpected change {:?}", other),
        }
        assert!(p.connections().is_empty());

        // Undo restores the node and its edges at their old positions.
        apply_change(&mut p, &change.invert()).expect("undo");
        assert_eq!(p, before);
    }

    #[test]
    fn set_param_rejects_type_change() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let err = resolve(
            &mut p,
            &Command::SetParam {
                node: track,
                param: "volume".into(),
                value: ParamValue::Bool(true),
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn failed_resolve_leaves_state_untouched() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        execute(
            &mut p,
            Command::AddClip {
                track,
                name: "a".into(),
                start_beat: 0.0,
                duration_beats: 4.0,
                content: ClipContent::Midi { notes: Vec::new() },
            },
        );
        let before = p.clone();
        let err = resolve(
            &mut p,
            &Command::AddClip {
                track,
                name: "b".into(),
                start_beat: 2.0,
                duration_beats: 4.0,
                content: ClipContent::Midi { notes: Vec::new() },
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Overlap { .. }));
        assert_eq!(p, before);
    }

    #[test]
    fn empty_names_are_rejected() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let before = p.clone();
        assert!(matches!(
            resolve(
                &mut p,
                &Command::AddNode {
                    name: String::new(),
                    kind: NodeKind::Bus,
                    params: Vec::new(),
                },
            ),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            resolve(
                &mut p,
                &Command::RenameNode {
                    node: track,
                    name: String::new(),
                },
            ),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            resolve(
                &mut p,
                &Command::AddClip {
                    track,
                    name: String::new(),
                    start_beat: 0.0,
                    duration_beats: 4.0,
                    content: ClipContent::Midi { notes: Vec::new() },
                },
            ),
            Err(DomainError::Validation(_))
        ));
        assert_eq!(p, before);
    }

    #[test]
    fn remove_notes_respects_multiplicity() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let note = Note::new(60, 100, 0.0, 1.0);
        let clip = match execute(
            &mut p,
            Command::AddClip {
                track,
                name: "a".into(),
                start_beat: 0.0,
                duration_beats: 4.0,
                content: ClipContent::Midi {
                    notes: vec![note],
                },
            },
        ) {
            Change::AddClip { clip, .. } => clip.id,
            other => panic!("unexpected change {:?}", other),
        };
        // Asking for two copies when only one exists fails.
        let err = resolve(
            &mut p,
            &Command::RemoveNotes {
                track,
                clip,
                notes: vec![note, note],
            },
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::NotFound(_)));
        // One copy is fine.
        assert!(resolve(
            &mut p,
            &Command::RemoveNotes {
                track,
                clip,
                notes: vec![note],
            },
        )
        .is_ok());
    }

    #[test]
    fn automation_replacement_round_trips() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let first = AutomationPoint::new(1.0, -6.0, CurveKind::Linear);
        let second = AutomationPoint::new(1.0, 0.0, CurveKind::Step);
        execute(
            &mut p,
            Command::AddAutomationPoint {
                node: track,
                param: "volume".into(),
                point: first,
            },
        );
        let after_first = p.clone();

        let change = execute(
            &mut p,
            Command::AddAutomationPoint {
                node: track,
                param: "volume".into(),
                point: second,
            },
        );
        match &change {
            Change::AddAutomationPoint { replaced, .. } => assert_eq!(*replaced, Some(first)),
            other => panic!("unexpected change {:?}", other),
        }

        apply_change(&mut p, &change.invert()).expect("undo");
        assert_eq!(p, after_first);
    }

    #[test]
    fn removing_last_point_drops_the_lane() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let before = p.clone();
        let point = AutomationPoint::new(0.0, -3.0, CurveKind::Linear);
        let change = execute(
            &mut p,
            Command::AddAutomationPoint {
                node: track,
                param: "volume".into(),
                point,
            },
        );
        apply_change(&mut p, &change.invert()).expect("undo");
        assert_eq!(p, before);
        assert!(p
            .node(track)
            .and_then(|n| n.param("volume"))
            .map(|param| param.lane.is_none())
            .unwrap_or(false));
    }

    #[test]
    fn move_clip_inverts_cleanly() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let track = add_track(&mut p, "t");
        let clip = match execute(
            &mut p,
            Command::AddClip {
                track,
                name: "a".into(),
                start_beat: 0.0,
                duration_beats: 4.0,
                content: ClipContent::Midi { notes: Vec::new() },
            },
        ) {
            Change::AddClip { clip, .. } => clip.id,
            other => panic!("unexpected change {:?}", other),
        };
        let before = p.clone();
        let change = execute(
            &mut p,
            Command::MoveClip {
                track,
                clip,
                new_start_beat: 8.0,
            },
        );
        apply_change(&mut p, &change.invert()).expect("undo");
        assert_eq!(p, before);
    }

    #[test]
    fn tempo_validation() {
        let mut p = Project::new("test", 120.0, (4, 4));
        assert!(resolve(&mut p, &Command::SetTempo { bpm: 0.0 }).is_err());
        assert!(resolve(&mut p, &Command::SetTempo { bpm: f64::NAN }).is_err());
        assert!(resolve(&mut p, &Command::SetTempo { bpm: 174.0 }).is_ok());
        assert!(resolve(
            &mut p,
            &Command::SetTimeSignature {
                numerator: 7,
                denominator: 8
            }
        )
        .is_ok());
        assert!(resolve(
            &mut p,
            &Command::SetTimeSignature {
                numerator: 4,
                denominator: 3
            }
        )
        .is_err());
    }
}
