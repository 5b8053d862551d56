use super::scheduler::{schedule, PlaybackInstruction};
use super::voice::Voice;
use crate::timeline::Timeline;
use crate::voicebank::{AliasIndex, SampleStore};
use crate::SampleBuffer;

/// Silence appended after the last beat so releases are not cut off.
pub const TAIL_SECS: f64 = 4.0;

/// Number of channels in an offline render.
pub const CHANNELS: usize = 2;

/// Renders a whole timeline into a stereo buffer, faster than real time.
///
/// The output depends only on the inputs, so rendering the same timeline and
/// voicebank twice gives bit-identical buffers.
#[derive(Debug, Clone)]
pub struct OfflineRenderer {
    sample_rate: u32,
    tail_secs: f64,
}

impl OfflineRenderer {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate,
            tail_secs: TAIL_SECS,
        }
    }

    pub fn with_tail_secs(mut self, tail_secs: f64) -> Self {
        self.tail_secs = tail_secs.max(0.0);
        self
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Output length for a timeline: its full beat grid plus the tail.
    pub fn frames_for(&self, timeline: &Timeline) -> usize {
        ((timeline.schedule_end_secs() + self.tail_secs) * self.sample_rate as f64).ceil() as usize
    }

    pub fn render(
        &self,
        timeline: &Timeline,
        aliases: &AliasIndex,
        samples: &SampleStore,
    ) -> SampleBuffer {
        let plan = schedule(timeline, aliases, samples);
        self.render_instructions(&plan, self.frames_for(timeline))
    }

    /// Mix instructions into a zeroed buffer of `frames` frames, starting at
    /// time zero. Anything past the end of the buffer is dropped.
    pub fn render_instructions(
        &self,
        instructions: &[PlaybackInstruction],
        frames: usize,
    ) -> SampleBuffer {
        let mut output = SampleBuffer::silent(CHANNELS, frames, self.sample_rate);
        let total = frames as u64;

        let mut mixed = 0usize;
        for instruction in instructions {
            let Some(voice) = Voice::new(
                instruction.buffer.clone(),
                instruction.start_time_secs,
                instruction.trim_in_secs,
                instruction.duration_secs,
                1.0,
                self.sample_rate,
            ) else {
                continue;
            };

            let start = voice.start_frame();
            let end = voice.end_frame().min(total);
            for (c, channel) in output.channels_mut().iter_mut().enumerate() {
                for frame in start..end {
                    channel[frame as usize] += voice.sample(frame - start, c);
                }
            }
            mixed += 1;
        }

        log::debug!(
            "Rendered {} of {} instructions into {} frames",
            mixed,
            instructions.len(),
            frames
        );
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voicebank::TimingRecord;

    const RATE: u32 = 8000;

    fn voicebank(offset_ms: f64, buffer: SampleBuffer) -> (AliasIndex, SampleStore) {
        let aliases = AliasIndex::from_records(vec![TimingRecord {
            asset_path: "la.wav".to_string(),
            alias: "la".to_string(),
            offset_ms,
            ..Default::default()
        }]);
        let mut samples = SampleStore::new();
        samples.insert("la.wav", buffer);
        (aliases, samples)
    }

    fn ramp(frames: usize) -> SampleBuffer {
        let data = (0..frames).map(|i| i as f32 / frames as f32).collect();
        SampleBuffer::new(RATE, vec![data])
    }

    #[test]
    fn length_covers_beats_plus_tail() {
        let timeline = Timeline::new(120.0, 8).unwrap();
        let renderer = OfflineRenderer::new(44100);
        let output = renderer.render(&timeline, &AliasIndex::new(), &SampleStore::new());

        let expected = ((8.0 * 60.0 / 120.0 + 4.0) * 44100.0f64).ceil() as usize;
        assert_eq!(output.frames(), expected);
        assert_eq!(output.channel_count(), 2);
        assert_eq!(output.sample_rate(), 44100);
        assert!(output.channels().iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn places_trimmed_sample_at_note_start() {
        let (aliases, samples) = voicebank(100.0, ramp(RATE as usize));
        let mut timeline = Timeline::new(120.0, 4).unwrap();
        timeline.add_note(1.0, 1.0, 60, "la").unwrap();

        let output = OfflineRenderer::new(RATE).render(&timeline, &aliases, &samples);
        let source = samples.get("la.wav").unwrap().channel(0);
        let start = RATE as usize / 2;
        let offset = RATE as usize / 10;
        let length = RATE as usize / 2;

        for channel in output.channels() {
            assert!(channel[..start].iter().all(|&s| s == 0.0));
            assert_eq!(&channel[start..start + length], &source[offset..offset + length]);
            assert!(channel[start + length..].iter().all(|&s| s == 0.0));
        }
    }

    #[test]
    fn overlapping_notes_are_summed() {
        let constant = SampleBuffer::new(RATE, vec![vec![0.25; RATE as usize]]);
        let (aliases, samples) = voicebank(0.0, constant);
        let mut timeline = Timeline::new(60.0, 4).unwrap();
        timeline.add_note(0.0, 0.5, 60, "la").unwrap();
        timeline.add_note(0.25, 0.5, 60, "la").unwrap();

        let output = OfflineRenderer::new(RATE).render(&timeline, &aliases, &samples);
        let left = output.channel(0);
        assert_eq!(left[100], 0.25);
        assert_eq!(left[RATE as usize / 3], 0.5);
        assert_eq!(left[RATE as usize * 2 / 3], 0.25);
        assert_eq!(left[RATE as usize], 0.0);
    }

    #[test]
    fn renders_are_deterministic() {
        let (aliases, samples) = voicebank(37.0, ramp(3000));
        let mut timeline = Timeline::new(97.0, 8).unwrap();
        for i in 0..6 {
            timeline.add_note(i as f64 * 0.75, 1.3, 60, "la").unwrap();
        }
        timeline.add_note(1.0, 1.0, 60, "unknown").unwrap();

        let renderer = OfflineRenderer::new(44100);
        let first = renderer.render(&timeline, &aliases, &samples);
        let second = renderer.render(&timeline, &aliases, &samples);
        assert_eq!(first, second);
        assert!(first.channel(0).iter().any(|&s| s != 0.0));
    }

    #[test]
    fn notes_far_past_the_end_render_silence() {
        let (aliases, samples) = voicebank(0.0, ramp(RATE as usize));
        let mut timeline = Timeline::new(60.0, 4).unwrap();
        timeline.add_note(1e16, 1.0, 60, "la").unwrap();

        let output = OfflineRenderer::new(44100).render(&timeline, &aliases, &samples);
        assert_eq!(output.frames(), 44100 * 8);
        assert!(output.channels().iter().flatten().all(|&s| s == 0.0));
    }

    #[test]
    fn sound_past_the_end_is_dropped() {
        let (aliases, samples) = voicebank(0.0, ramp(RATE as usize * 2));
        let mut timeline = Timeline::new(60.0, 4).unwrap();
        timeline.add_note(3.5, 2.0, 60, "la").unwrap();

        let renderer = OfflineRenderer::new(RATE).with_tail_secs(0.0);
        let output = renderer.render(&timeline, &aliases, &samples);
        assert_eq!(output.frames(), RATE as usize * 4);
        assert_ne!(output.channel(1)[output.frames() - 1], 0.0);
    }
}
