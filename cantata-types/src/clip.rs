//! Clips: time-bounded musical content on a track.

use serde::{Deserialize, Serialize};

use crate::ClipId;

/// A single MIDI note inside a clip. Beats are relative to the clip
/// start.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub pitch: u8,
    pub velocity: u8,
    pub start_beat: f64,
    pub duration_beats: f64,
}

impl Note {
    pub fn new(pitch: u8, velocity: u8, start_beat: f64, duration_beats: f64) -> Self {
        Self {
            pitch,
            velocity,
            start_beat,
            duration_beats,
        }
    }
}

/// Canonical note ordering: start beat, then pitch, then velocity,
/// then duration. Keeping notes sorted this way makes clip contents
/// reproducible across undo/redo round trips.
fn note_order(a: &Note, b: &Note) -> std::cmp::Ordering {
    a.start_beat
        .total_cmp(&b.start_beat)
        .then(a.pitch.cmp(&b.pitch))
        .then(a.velocity.cmp(&b.velocity))
        .then(a.duration_beats.total_cmp(&b.duration_beats))
}

/// What a clip contains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ClipContent {
    Midi { notes: Vec<Note> },
    Audio { source: String, gain_db: f64 },
}

/// Time-bounded content attached to exactly one track node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: ClipId,
    pub name: String,
    pub start_beat: f64,
    pub duration_beats: f64,
    pub content: ClipContent,
    pub looped: bool,
    /// Loop region, relative to the clip start. A zero duration loops
    /// the whole clip.
    pub loop_start_beat: f64,
    pub loop_duration_beats: f64,
}

impl Clip {
    pub fn midi(id: ClipId, name: impl Into<String>, start_beat: f64, duration_beats: f64) -> Self {
        Self {
            id,
            name: name.into(),
            start_beat,
            duration_beats,
            content: ClipContent::Midi { notes: Vec::new() },
            looped: false,
            loop_start_beat: 0.0,
            loop_duration_beats: 0.0,
        }
    }

    pub fn audio(
        id: ClipId,
        name: impl Into<String>,
        start_beat: f64,
        duration_beats: f64,
        source: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            start_beat,
            duration_beats,
            content: ClipContent::Audio {
                source: source.into(),
                gain_db: 0.0,
            },
            looped: false,
            loop_start_beat: 0.0,
            loop_duration_beats: 0.0,
        }
    }

    pub fn end_beat(&self) -> f64 {
        self.start_beat + self.duration_beats
    }

    /// Whether the half-open spans `[start, end)` of the two clips
    /// intersect.
    pub fn overlaps(&self, other: &Clip) -> bool {
        self.start_beat < other.end_beat() && other.start_beat < self.end_beat()
    }

    pub fn is_midi(&self) -> bool {
        matches!(self.content, ClipContent::Midi { .. })
    }

    pub fn notes(&self) -> Option<&[Note]> {
        match &self.content {
            ClipContent::Midi { notes } => Some(notes),
            ClipContent::Audio { .. } => None,
        }
    }

    /// Insert a note in canonical order. MIDI clips only.
    pub fn insert_note(&mut self, note: Note) -> bool {
        match &mut self.content {
            ClipContent::Midi { notes } => {
                let idx = notes.partition_point(|n| note_order(n, &note).is_le());
                notes.insert(idx, note);
                true
            }
            ClipContent::Audio { .. } => false,
        }
    }

    /// Remove one instance of an exactly-matching note. Returns true
    /// if a note was removed.
    pub fn remove_note(&mut self, note: &Note) -> bool {
        match &mut self.content {
            ClipContent::Midi { notes } => match notes.iter().position(|n| n == note) {
                Some(idx) => {
                    notes.remove(idx);
                    true
                }
                None => false,
            },
            ClipContent::Audio { .. } => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overlap_is_half_open() {
        let a = Clip::midi(ClipId::new(0), "a", 0.0, 4.0);
        let b = Clip::midi(ClipId::new(1), "b", 4.0, 4.0);
        let c = Clip::midi(ClipId::new(2), "c", 3.5, 1.0);
        assert!(!a.overlaps(&b));
        assert!(a.overlaps(&c));
        assert!(b.overlaps(&c));
    }

    #[test]
    fn notes_keep_canonical_order() {
        let mut clip = Clip::midi(ClipId::new(0), "a", 0.0, 4.0);
        clip.insert_note(Note::new(64, 100, 2.0, 1.0));
        clip.insert_note(Note::new(60, 100, 0.0, 1.0));
        clip.insert_note(Note::new(67, 100, 0.0, 1.0));
        let pitches: Vec<u8> = clip.notes().unwrap().iter().map(|n| n.pitch).collect();
        assert_eq!(pitches, vec![60, 67, 64]);
    }

    #[test]
    fn remove_note_takes_one_instance() {
        let mut clip = Clip::midi(ClipId::new(0), "a", 0.0, 4.0);
        let note = Note::new(60, 100, 0.0, 1.0);
        clip.insert_note(note);
        clip.insert_note(note);
        assert!(clip.remove_note(&note));
        assert_eq!(clip.notes().unwrap().len(), 1);
        assert!(clip.remove_note(&note));
        assert!(!clip.remove_note(&note));
    }

    #[test]
    fn audio_clips_take_no_notes() {
        let mut clip = Clip::audio(ClipId::new(0), "a", 0.0, 4.0, "take1.wav");
        assert!(!clip.insert_note(Note::new(60, 100, 0.0, 1.0)));
        assert_eq!(clip.notes(), None);
    }
}
