//! Note events on a beat grid.

/// Smallest timeline length, in beats.
pub const MIN_BEATS: u32 = 4;

/// Highest MIDI note number.
pub const MAX_PITCH: u8 = 127;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum TimelineError {
    #[error("Tempo must be a positive number of beats per minute, got {0}")]
    InvalidTempo(f64),
    #[error("Invalid note: {0}")]
    InvalidNote(String),
    #[error("No note with id {0}")]
    NoteNotFound(NoteId),
}

/// Identifier of a note, unique within its timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoteId(pub u64);

impl std::fmt::Display for NoteId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One sung note.
#[derive(Debug, Clone, PartialEq)]
pub struct NoteEvent {
    pub id: NoteId,
    pub start_beat: f64,
    pub length_beats: f64,
    /// MIDI note number, `0..=MAX_PITCH`. Shown to the user; playback is not
    /// pitch-shifted.
    pub pitch: u8,
    /// Alias to sing. Notes whose lyric is not in the voicebank stay silent.
    pub lyric: String,
}

/// Notes in insertion order, with tempo and length.
#[derive(Debug, Clone)]
pub struct Timeline {
    notes: Vec<NoteEvent>,
    bpm: f64,
    beats: u32,
    next_id: u64,
}

impl Default for Timeline {
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            bpm: 120.0,
            beats: 16,
            next_id: 1,
        }
    }
}

impl Timeline {
    /// Create an empty timeline. `beats` is raised to at least [`MIN_BEATS`].
    pub fn new(bpm: f64, beats: u32) -> Result<Self, TimelineError> {
        let mut timeline = Self::default();
        timeline.set_bpm(bpm)?;
        timeline.set_beats(beats);
        Ok(timeline)
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn set_bpm(&mut self, bpm: f64) -> Result<(), TimelineError> {
        if !bpm.is_finite() || bpm <= 0.0 {
            return Err(TimelineError::InvalidTempo(bpm));
        }
        self.bpm = bpm;
        Ok(())
    }

    pub fn beats(&self) -> u32 {
        self.beats
    }

    pub fn set_beats(&mut self, beats: u32) {
        self.beats = beats.max(MIN_BEATS);
    }

    pub fn notes(&self) -> &[NoteEvent] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Append a note and return its generated id.
    pub fn add_note(
        &mut self,
        start_beat: f64,
        length_beats: f64,
        pitch: u8,
        lyric: &str,
    ) -> Result<NoteId, TimelineError> {
        validate(start_beat, length_beats)?;
        if pitch > MAX_PITCH {
            return Err(TimelineError::InvalidNote(format!(
                "pitch must be a MIDI note number 0-{MAX_PITCH}, got {pitch}"
            )));
        }

        let id = NoteId(self.next_id);
        self.next_id += 1;
        self.notes.push(NoteEvent {
            id,
            start_beat,
            length_beats,
            pitch,
            lyric: lyric.to_string(),
        });
        Ok(id)
    }

    pub fn note(&self, id: NoteId) -> Option<&NoteEvent> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// Move or resize a note. The note keeps its id and position in the list.
    pub fn update_note(
        &mut self,
        id: NoteId,
        start_beat: f64,
        length_beats: f64,
    ) -> Result<(), TimelineError> {
        validate(start_beat, length_beats)?;
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(TimelineError::NoteNotFound(id))?;
        note.start_beat = start_beat;
        note.length_beats = length_beats;
        Ok(())
    }

    pub fn set_lyric(&mut self, id: NoteId, lyric: &str) -> Result<(), TimelineError> {
        let note = self
            .notes
            .iter_mut()
            .find(|n| n.id == id)
            .ok_or(TimelineError::NoteNotFound(id))?;
        note.lyric = lyric.to_string();
        Ok(())
    }

    pub fn remove_note(&mut self, id: NoteId) -> Option<NoteEvent> {
        let idx = self.notes.iter().position(|n| n.id == id)?;
        Some(self.notes.remove(idx))
    }

    pub fn clear(&mut self) {
        self.notes.clear();
    }

    /// Convert a beat position to seconds at the current tempo.
    pub fn beat_to_secs(&self, beat: f64) -> f64 {
        beat * 60.0 / self.bpm
    }

    /// Time at which the timeline's last beat ends.
    pub fn schedule_end_secs(&self) -> f64 {
        self.beat_to_secs(self.beats as f64)
    }
}

fn validate(start_beat: f64, length_beats: f64) -> Result<(), TimelineError> {
    if !start_beat.is_finite() || start_beat < 0.0 {
        return Err(TimelineError::InvalidNote(format!(
            "start beat must be >= 0, got {start_beat}"
        )));
    }
    if !length_beats.is_finite() || length_beats <= 0.0 {
        return Err(TimelineError::InvalidNote(format!(
            "length must be > 0 beats, got {length_beats}"
        )));
    }
    Ok(())
}
