use std::sync::Arc;

use crate::timeline::{NoteId, Timeline};
use crate::voicebank::{AliasIndex, SampleStore};
use crate::SampleBuffer;

/// Shortest time a note is scheduled for, in seconds.
pub const MIN_NOTE_SECS: f64 = 0.05;

/// Where and how long one sample buffer plays.
#[derive(Debug, Clone)]
pub struct PlaybackInstruction {
    pub note_id: NoteId,
    pub asset_path: String,
    pub buffer: Arc<SampleBuffer>,
    /// Start time relative to the beginning of the timeline.
    pub start_time_secs: f64,
    /// Position in the buffer to start reading from.
    pub trim_in_secs: f64,
    /// Time to play. May be zero or negative when the trim runs past the end
    /// of the buffer; such instructions produce no sound.
    pub duration_secs: f64,
}

impl PlaybackInstruction {
    pub fn is_audible(&self) -> bool {
        self.duration_secs > 0.0
    }

    pub fn end_time_secs(&self) -> f64 {
        self.start_time_secs + self.duration_secs.max(0.0)
    }
}

/// Plan playback for every note of a timeline.
///
/// Each note resolves its lyric to the first timing record of that alias and
/// then to the decoded sample. Notes with an unknown lyric or an undecoded
/// sample are skipped. The note's length is floored at [`MIN_NOTE_SECS`] and
/// then clipped to what is left of the sample after the offset.
pub fn schedule(
    timeline: &Timeline,
    aliases: &AliasIndex,
    samples: &SampleStore,
) -> Vec<PlaybackInstruction> {
    let mut plan = Vec::with_capacity(timeline.len());

    for note in timeline.notes() {
        let Some(record) = aliases.first(&note.lyric) else {
            log::debug!("Note {}: no alias {:?}", note.id, note.lyric);
            continue;
        };
        let Some(buffer) = samples.get(&record.asset_path) else {
            log::debug!("Note {}: sample {} not loaded", note.id, record.asset_path);
            continue;
        };

        let start_time_secs = timeline.beat_to_secs(note.start_beat);
        let trim_in_secs = (record.offset_ms / 1000.0).max(0.0);
        let requested = timeline.beat_to_secs(note.length_beats).max(MIN_NOTE_SECS);
        let duration_secs = requested.min(buffer.duration_secs() - trim_in_secs);

        plan.push(PlaybackInstruction {
            note_id: note.id,
            asset_path: record.asset_path.clone(),
            buffer: Arc::clone(buffer),
            start_time_secs,
            trim_in_secs,
            duration_secs,
        });
    }

    plan
}
