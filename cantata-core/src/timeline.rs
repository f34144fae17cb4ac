//! Timeline editing rules: clips on tracks, notes in clips.
//!
//! Policy (fixed, see DESIGN.md): clips on one track may never overlap
//! in time — layered lanes are not supported. An edit that would
//! overlap fails with `Overlap` and changes nothing.

use cantata_types::{Clip, ClipId, Node, NodeId, Note};

use crate::error::DomainError;
use crate::project::Project;

pub(crate) fn track<'a>(project: &'a Project, id: NodeId) -> Result<&'a Node, DomainError> {
    let node = project
        .node(id)
        .ok_or_else(|| DomainError::not_found(format!("node {}", id)))?;
    if !node.is_track() {
        return Err(DomainError::validation(format!(
            "node {} ({}) is not a track",
            id,
            node.kind.name()
        )));
    }
    Ok(node)
}

/// Validate a clip's own shape and the overlap invariant against every
/// other clip on the track. `ignore` skips the clip itself when
/// validating a move.
pub fn validate_clip(
    project: &Project,
    track_id: NodeId,
    clip: &Clip,
    ignore: Option<ClipId>,
) -> Result<(), DomainError> {
    let node = track(project, track_id)?;
    if !clip.start_beat.is_finite() || clip.start_beat < 0.0 {
        return Err(DomainError::validation(format!(
            "clip start beat {} is invalid",
            clip.start_beat
        )));
    }
    if !clip.duration_beats.is_finite() || clip.duration_beats <= 0.0 {
        return Err(DomainError::validation(format!(
            "clip duration {} must be positive",
            clip.duration_beats
        )));
    }
    for other in &node.clips {
        if Some(other.id) == ignore {
            continue;
        }
        if clip.overlaps(other) {
            return Err(DomainError::Overlap {
                track: track_id,
                clip: other.name.clone(),
            });
        }
    }
    Ok(())
}

pub fn validate_notes(notes: &[Note]) -> Result<(), DomainError> {
    if notes.is_empty() {
        return Err(DomainError::validation("no notes given"));
    }
    for note in notes {
        if note.pitch > 127 {
            return Err(DomainError::validation(format!(
                "pitch {} out of range 0..=127",
                note.pitch
            )));
        }
        if note.velocity > 127 {
            return Err(DomainError::validation(format!(
                "velocity {} out of range 0..=127",
                note.velocity
            )));
        }
        if !note.start_beat.is_finite() || note.start_beat < 0.0 {
            return Err(DomainError::validation(format!(
                "note start beat {} is invalid",
                note.start_beat
            )));
        }
        if !note.duration_beats.is_finite() || note.duration_beats <= 0.0 {
            return Err(DomainError::validation(format!(
                "note duration {} must be positive",
                note.duration_beats
            )));
        }
    }
    Ok(())
}

/// Insert a clip keeping the track's clips ordered by start beat.
/// Starts are unique per track (overlap rejection), so the order is
/// canonical.
pub(crate) fn insert_clip_sorted(node: &mut Node, clip: Clip) {
    let idx = node
        .clips
        .partition_point(|c| c.start_beat < clip.start_beat);
    node.clips.insert(idx, clip);
}

pub(crate) fn remove_clip(node: &mut Node, id: ClipId) -> Option<Clip> {
    let idx = node.clips.iter().position(|c| c.id == id)?;
    Some(node.clips.remove(idx))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cantata_types::{Node, NodeKind};

    fn project_with_track() -> (Project, NodeId) {
        let mut p = Project::new("test", 120.0, (4, 4));
        let id = p.allocate_node_id();
        p.insert_node(0, Node::new(id, "t", NodeKind::InstrumentTrack));
        (p, id)
    }

    #[test]
    fn overlapping_clip_is_rejected() {
        let (mut p, track_id) = project_with_track();
        let id = p.allocate_clip_id();
        let existing = Clip::midi(id, "a", 0.0, 4.0);
        insert_clip_sorted(p.node_mut(track_id).expect("track"), existing);

        let id = p.allocate_clip_id();
        let incoming = Clip::midi(id, "b", 2.0, 4.0);
        let err = validate_clip(&p, track_id, &incoming, None).unwrap_err();
        assert!(matches!(err, DomainError::Overlap { .. }));

        // Adjacent is fine: spans are half-open.
        let adjacent = Clip::midi(id, "b", 4.0, 4.0);
        assert!(validate_clip(&p, track_id, &adjacent, None).is_ok());
    }

    #[test]
    fn move_ignores_the_clip_itself() {
        let (mut p, track_id) = project_with_track();
        let id = p.allocate_clip_id();
        insert_clip_sorted(
            p.node_mut(track_id).expect("track"),
            Clip::midi(id, "a", 0.0, 4.0),
        );
        let moved = Clip::midi(id, "a", 1.0, 4.0);
        assert!(validate_clip(&p, track_id, &moved, Some(id)).is_ok());
    }

    #[test]
    fn clips_only_live_on_tracks() {
        let mut p = Project::new("test", 120.0, (4, 4));
        let id = p.allocate_node_id();
        p.insert_node(0, Node::new(id, "bus", NodeKind::Bus));
        let clip = Clip::midi(ClipId::new(0), "a", 0.0, 4.0);
        let err = validate_clip(&p, id, &clip, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn bad_notes_are_rejected() {
        let ok = Note::new(60, 100, 0.0, 1.0);
        assert!(validate_notes(&[ok]).is_ok());
        assert!(validate_notes(&[Note::new(128, 100, 0.0, 1.0)]).is_err());
        assert!(validate_notes(&[Note::new(60, 200, 0.0, 1.0)]).is_err());
        assert!(validate_notes(&[Note::new(60, 100, -1.0, 1.0)]).is_err());
        assert!(validate_notes(&[Note::new(60, 100, 0.0, 0.0)]).is_err());
        assert!(validate_notes(&[Note::new(60, 100, 0.0, f64::NAN)]).is_err());
        assert!(validate_notes(&[]).is_err());
    }

    #[test]
    fn clips_stay_sorted_by_start() {
        let (mut p, track_id) = project_with_track();
        for start in [8.0, 0.0, 4.0] {
            let id = p.allocate_clip_id();
            insert_clip_sorted(
                p.node_mut(track_id).expect("track"),
                Clip::midi(id, "c", start, 2.0),
            );
        }
        let starts: Vec<f64> = p
            .node(track_id)
            .expect("track")
            .clips
            .iter()
            .map(|c| c.start_beat)
            .collect();
        assert_eq!(starts, vec![0.0, 4.0, 8.0]);
    }
}
