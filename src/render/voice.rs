use std::sync::Arc;

use crate::SampleBuffer;

/// One trimmed buffer playing at a fixed position on an output timeline.
///
/// Positions are in output frames. The source is read with linear
/// interpolation so buffers at other sample rates play at their natural speed.
#[derive(Debug, Clone)]
pub(crate) struct Voice {
    buffer: Arc<SampleBuffer>,
    start_frame: u64,
    frames: u64,
    read_start: f64,
    step: f64,
    gain: f32,
}

impl Voice {
    /// Returns `None` when nothing would be heard.
    pub fn new(
        buffer: Arc<SampleBuffer>,
        start_secs: f64,
        offset_secs: f64,
        duration_secs: f64,
        gain: f32,
        output_rate: u32,
    ) -> Option<Self> {
        if !(duration_secs > 0.0) || buffer.frames() == 0 || buffer.sample_rate() == 0 {
            return None;
        }
        let rate = output_rate as f64;
        let frames = (duration_secs * rate).round() as u64;
        if frames == 0 {
            return None;
        }

        Some(Self {
            start_frame: (start_secs.max(0.0) * rate).round() as u64,
            frames,
            read_start: offset_secs.max(0.0) * buffer.sample_rate() as f64,
            step: buffer.sample_rate() as f64 / rate,
            gain,
            buffer,
        })
    }

    pub fn start_frame(&self) -> u64 {
        self.start_frame
    }

    /// First output frame after the voice has finished.
    pub fn end_frame(&self) -> u64 {
        self.start_frame.saturating_add(self.frames)
    }

    /// The voice's contribution to output `channel` at `index` frames after
    /// its start.
    pub fn sample(&self, index: u64, channel: usize) -> f32 {
        if index >= self.frames {
            return 0.0;
        }
        let source = self
            .buffer
            .channel(channel.min(self.buffer.channel_count() - 1));

        let pos = self.read_start + index as f64 * self.step;
        let i = pos.floor() as usize;
        let Some(&a) = source.get(i) else {
            return 0.0;
        };
        let frac = (pos - i as f64) as f32;
        let b = source.get(i + 1).copied().unwrap_or(a);
        (a + (b - a) * frac) * self.gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(frames: usize, rate: u32) -> Arc<SampleBuffer> {
        let data = (0..frames).map(|i| i as f32).collect();
        Arc::new(SampleBuffer::new(rate, vec![data]))
    }

    #[test]
    fn reads_from_offset_at_matching_rate() {
        let voice = Voice::new(ramp(100, 100), 0.5, 0.2, 0.3, 1.0, 100).unwrap();
        assert_eq!(voice.start_frame(), 50);
        assert_eq!(voice.end_frame(), 80);
        assert_eq!(voice.sample(0, 0), 20.0);
        assert_eq!(voice.sample(29, 0), 49.0);
        assert_eq!(voice.sample(30, 0), 0.0);
    }

    #[test]
    fn interpolates_lower_rate_sources() {
        let voice = Voice::new(ramp(10, 50), 0.0, 0.0, 0.1, 1.0, 100).unwrap();
        assert_eq!(voice.sample(0, 0), 0.0);
        assert_eq!(voice.sample(1, 0), 0.5);
        assert_eq!(voice.sample(2, 0), 1.0);
    }

    #[test]
    fn mono_feeds_every_channel() {
        let voice = Voice::new(ramp(10, 10), 0.0, 0.0, 1.0, 0.5, 10).unwrap();
        assert_eq!(voice.sample(4, 0), 2.0);
        assert_eq!(voice.sample(4, 1), 2.0);
    }

    #[test]
    fn silent_voices_are_not_created() {
        assert!(Voice::new(ramp(10, 10), 0.0, 0.0, 0.0, 1.0, 10).is_none());
        assert!(Voice::new(ramp(10, 10), 0.0, 0.0, -1.0, 1.0, 10).is_none());
        assert!(Voice::new(ramp(0, 10), 0.0, 0.0, 1.0, 1.0, 10).is_none());
    }

    #[test]
    fn far_away_voices_saturate_instead_of_overflowing() {
        let voice = Voice::new(ramp(10, 10), 1e30, 0.0, 1.0, 1.0, 44100).unwrap();
        assert_eq!(voice.start_frame(), u64::MAX);
        assert_eq!(voice.end_frame(), u64::MAX);
    }

    #[test]
    fn reading_past_the_end_is_silent() {
        let voice = Voice::new(ramp(10, 10), 0.0, 0.5, 1.0, 1.0, 10).unwrap();
        assert_eq!(voice.sample(4, 0), 9.0);
        assert_eq!(voice.sample(5, 0), 0.0);
    }
}
