//! Playback through the system's default audio device.

use std::sync::{Arc, Mutex, MutexGuard};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample;

use super::live::{AudioOutput, OutputError, ScheduledSource};
use super::voice::Voice;

/// An [`AudioOutput`] backed by a cpal output stream.
///
/// The clock counts frames handed to the device, so it only advances while
/// the stream runs. Started sources are mixed in the audio callback until
/// they finish.
pub struct DeviceOutput {
    sample_rate: u32,
    mixer: Arc<Mutex<Mixer>>,
    _stream: cpal::Stream,
}

#[derive(Default)]
struct Mixer {
    voices: Vec<Voice>,
    frame: u64,
}

impl DeviceOutput {
    /// Open the default output device and start its stream.
    pub fn open() -> Result<Self, OutputError> {
        let host = cpal::default_host();
        log::info!("Audio host: {:?}", host.id());

        let device = host.default_output_device().ok_or(OutputError::NoDevice)?;
        if let Ok(name) = device.name() {
            log::info!("Audio device: {name}");
        }

        let config = device
            .default_output_config()
            .map_err(|e| OutputError::Device(e.to_string()))?;
        let sample_rate = config.sample_rate().0;
        let channels = config.channels() as usize;
        let mixer = Arc::new(Mutex::new(Mixer::default()));

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => {
                build_stream::<f32>(&device, &config.into(), mixer.clone(), channels)
            }
            cpal::SampleFormat::I16 => {
                build_stream::<i16>(&device, &config.into(), mixer.clone(), channels)
            }
            cpal::SampleFormat::U16 => {
                build_stream::<u16>(&device, &config.into(), mixer.clone(), channels)
            }
            other => {
                return Err(OutputError::Device(format!(
                    "unsupported sample format {other:?}"
                )))
            }
        }?;

        stream
            .play()
            .map_err(|e| OutputError::Stream(e.to_string()))?;
        log::info!("Audio stream started at {} Hz, {} channels", sample_rate, channels);

        Ok(Self {
            sample_rate,
            mixer,
            _stream: stream,
        })
    }

    /// Number of sources still playing or waiting to start.
    pub fn active_sources(&self) -> usize {
        lock(&self.mixer).voices.len()
    }
}

impl AudioOutput for DeviceOutput {
    fn now(&self) -> f64 {
        lock(&self.mixer).frame as f64 / self.sample_rate as f64
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn start(&self, source: ScheduledSource) -> Result<(), OutputError> {
        let voice = Voice::new(
            source.buffer,
            source.when,
            source.offset,
            source.duration,
            source.gain,
            self.sample_rate,
        );
        if let Some(voice) = voice {
            lock(&self.mixer).voices.push(voice);
        }
        Ok(())
    }
}

fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mixer: Arc<Mutex<Mixer>>,
    channels: usize,
) -> Result<cpal::Stream, OutputError>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    device
        .build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                lock(&mixer).process(data, channels);
            },
            |err| log::error!("Audio stream error: {err}"),
            None,
        )
        .map_err(|e| OutputError::Stream(e.to_string()))
}

impl Mixer {
    fn process<T>(&mut self, output: &mut [T], channels: usize)
    where
        T: cpal::SizedSample + cpal::FromSample<f32>,
    {
        for frame in output.chunks_mut(channels) {
            let now = self.frame;
            for (c, out) in frame.iter_mut().enumerate() {
                let value: f32 = self
                    .voices
                    .iter()
                    .filter(|v| v.start_frame() <= now && now < v.end_frame())
                    .map(|v| v.sample(now - v.start_frame(), c))
                    .sum();
                *out = T::from_sample(value.clamp(-1.0, 1.0));
            }
            self.frame += 1;
        }

        let now = self.frame;
        self.voices.retain(|v| v.end_frame() > now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SampleBuffer;

    const RATE: u32 = 1000;

    fn constant(value: f32, start: f64, duration: f64) -> Voice {
        let buffer = Arc::new(SampleBuffer::new(RATE, vec![vec![value; 100]]));
        Voice::new(buffer, start, 0.0, duration, 1.0, RATE).unwrap()
    }

    #[test]
    fn mixes_voices_from_their_start_frame() {
        let mut mixer = Mixer::default();
        mixer.voices.push(constant(0.5, 0.002, 0.003));

        let mut output = vec![0.0f32; 16];
        mixer.process(&mut output, 2);

        let left: Vec<f32> = output.chunks(2).map(|f| f[0]).collect();
        assert_eq!(left, vec![0.0, 0.0, 0.5, 0.5, 0.5, 0.0, 0.0, 0.0]);
        assert!(output.chunks(2).all(|f| f[0] == f[1]));
        assert_eq!(mixer.frame, 8);
        assert!(mixer.voices.is_empty());
    }

    #[test]
    fn keeps_unfinished_voices_across_callbacks() {
        let mut mixer = Mixer::default();
        mixer.voices.push(constant(0.25, 0.006, 0.004));

        let mut output = vec![0.0f32; 8];
        mixer.process(&mut output, 1);
        assert_eq!(&output[6..], &[0.25, 0.25]);
        assert_eq!(mixer.voices.len(), 1);

        mixer.process(&mut output, 1);
        assert_eq!(&output[..3], &[0.25, 0.25, 0.0]);
        assert_eq!(mixer.frame, 16);
        assert!(mixer.voices.is_empty());
    }

    #[test]
    fn overlapping_voices_are_clamped() {
        let mut mixer = Mixer::default();
        mixer.voices.push(constant(0.75, 0.0, 0.004));
        mixer.voices.push(constant(0.75, 0.0, 0.004));

        let mut output = vec![0.0f32; 4];
        mixer.process(&mut output, 1);
        assert_eq!(output, vec![1.0; 4]);
    }
}
