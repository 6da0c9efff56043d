//! # Audio Capture Module
//!
//! Real-time microphone capture using CPAL (Cross-Platform Audio Library).
//! Incoming samples are downmixed to mono and cut into non-overlapping frames
//! of a fixed size, which are streamed to the analysis side over a channel.

use cpal::SupportedStreamConfigRange;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::Sender;
use anyhow::{Context, Result, anyhow};

/// Accumulates interleaved input into mono frames of `frame_size` samples.
#[derive(Debug)]
pub struct FrameAssembler {
    channels: usize,
    frame_size: usize,
    pending: Vec<f32>,
}

impl FrameAssembler {
    pub fn new(channels: usize, frame_size: usize) -> Self {
        Self {
            channels: channels.max(1),
            frame_size,
            pending: Vec::with_capacity(frame_size * 2),
        }
    }

    /// Appends interleaved samples and returns every frame completed by them.
    ///
    /// Channels are averaged into one signal. A trailing partial sample group
    /// is ignored.
    pub fn push(&mut self, interleaved: &[f32]) -> Vec<Vec<f32>> {
        let channels = self.channels;
        self.pending.extend(
            interleaved
                .chunks_exact(channels)
                .map(|group| group.iter().sum::<f32>() / channels as f32),
        );

        let mut frames = Vec::new();
        while self.pending.len() >= self.frame_size {
            frames.push(self.pending[..self.frame_size].to_vec());
            self.pending.drain(..self.frame_size);
        }
        frames
    }
}

/// Starts audio capture from the default input device.
///
/// # Arguments
/// * `sender` - Channel for completed mono frames
/// * `frame_size` - Samples per frame (the FFT size)
/// * `preferred_rate` - Sample rate to ask the device for, in Hz
///
/// # Returns
/// * `Ok((stream, sample_rate))` - Running stream handle and its actual rate
/// * `Err(e)` - No device, no usable f32 format, or the stream failed to start
pub fn start_audio_capture(
    sender: Sender<Vec<f32>>,
    frame_size: usize,
    preferred_rate: u32,
) -> Result<(cpal::Stream, u32)> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow!("No input device available"))?;

    log::info!("[AUDIO] Using input device: {}", device.name()?);

    let configs = device.supported_input_configs()?.collect::<Vec<_>>();
    let supported_config = find_supported_config(configs, preferred_rate)
        .ok_or_else(|| anyhow!("No suitable f32 input format found"))?;

    let sample_rate = preferred_rate.clamp(
        supported_config.min_sample_rate().0,
        supported_config.max_sample_rate().0,
    );
    let config = supported_config.with_sample_rate(cpal::SampleRate(sample_rate));
    let channels = config.channels() as usize;
    let config: cpal::StreamConfig = config.into();

    log::info!("[AUDIO] Capturing {channels} channel(s) at {sample_rate} Hz");

    let err_fn = |err| log::error!("[AUDIO] Stream error: {err}");

    let mut assembler = FrameAssembler::new(channels, frame_size);

    let stream = device
        .build_input_stream(
            &config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                for frame in assembler.push(data) {
                    // Drop frames if the analysis side is not keeping up.
                    let _ = sender.try_send(frame);
                }
            },
            err_fn,
            None,
        )
        .context("Failed to build input stream")?;

    stream.play().context("Failed to start input stream")?;

    Ok((stream, sample_rate))
}

/// Picks the f32 input configuration whose rate range is closest to
/// `target_rate`, preferring fewer channels on ties.
fn find_supported_config(
    configs: Vec<SupportedStreamConfigRange>,
    target_rate: u32,
) -> Option<SupportedStreamConfigRange> {
    configs
        .into_iter()
        .filter(|c| c.sample_format() == cpal::SampleFormat::F32)
        .min_by_key(|c| {
            let min = c.min_sample_rate().0;
            let max = c.max_sample_rate().0;
            let distance = if target_rate < min {
                min - target_rate
            } else {
                target_rate.saturating_sub(max)
            };
            (distance, c.channels())
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mono_input_is_cut_into_frames() {
        let mut assembler = FrameAssembler::new(1, 4);
        assert!(assembler.push(&[1.0, 2.0, 3.0]).is_empty());

        let frames = assembler.push(&[4.0, 5.0, 6.0, 7.0, 8.0, 9.0]);
        assert_eq!(frames, vec![vec![1.0, 2.0, 3.0, 4.0], vec![5.0, 6.0, 7.0, 8.0]]);

        let frames = assembler.push(&[10.0, 11.0, 12.0]);
        assert_eq!(frames, vec![vec![9.0, 10.0, 11.0, 12.0]]);
    }

    #[test]
    fn stereo_input_is_averaged() {
        let mut assembler = FrameAssembler::new(2, 2);
        let frames = assembler.push(&[1.0, 3.0, -1.0, 1.0, 0.5]);
        assert_eq!(frames, vec![vec![2.0, 0.0]]);
    }
}
