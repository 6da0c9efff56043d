//! # Frame Pipeline Module
//!
//! Runs one analysis tick per spectrum frame: peak extraction, then pitch and
//! note mapping. A [`Session`] couples the pipeline with the scrolling
//! spectrogram so that the scroll cursor lives and dies with one recording.

use anyhow::Result;

use crate::{
    AnalysisResult,
    note,
    peak,
    spectrogram::{SpectrogramBuffer, SpectrogramColumn},
};

/// Analyses a single spectrum frame.
///
/// Returns `None` when there is no usable pitch: an empty spectrum, or a peak
/// that resolves to a non-positive or non-finite frequency (e.g. silence,
/// where every bin is `-inf` and the peak sits at bin 0).
pub fn process_frame(spectrum: &[f32], sample_rate: u32) -> Option<AnalysisResult> {
    let estimate = peak::locate_peak(spectrum)?;
    let frequency_hz = estimate.frequency(spectrum.len(), sample_rate);

    if !frequency_hz.is_finite() || frequency_hz <= 0.0 {
        log::debug!("[PIPELINE] No pitch: peak resolved to {frequency_hz} Hz");
        return None;
    }

    let pitch = note::frequency_to_pitch(frequency_hz);
    Some(AnalysisResult {
        frequency_hz,
        pitch,
        note: note::pitch_to_label(pitch),
        peak_bin_fractional: estimate.fractional_bin(),
    })
}

/// Everything produced by one tick of a [`Session`].
#[derive(Debug, Clone)]
pub struct TickOutput {
    /// Pitch analysis; `None` when the frame carried no usable pitch.
    pub analysis: Option<AnalysisResult>,
    /// Spectrogram column written for this frame.
    pub column: SpectrogramColumn,
}

/// State of one capture session.
///
/// Owns the spectrogram scroll state; every frame of the session goes through
/// [`Session::tick`], and [`Session::restart`] begins a new recording.
#[derive(Debug, Clone)]
pub struct Session {
    sample_rate: u32,
    spectrogram: SpectrogramBuffer,
    frames: u64,
}

impl Session {
    pub fn new(sample_rate: u32, columns: usize, bins: usize) -> Result<Self> {
        anyhow::ensure!(sample_rate > 0, "Sample rate must be positive");
        Ok(Self {
            sample_rate,
            spectrogram: SpectrogramBuffer::new(columns, bins)?,
            frames: 0,
        })
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn spectrogram(&self) -> &SpectrogramBuffer {
        &self.spectrogram
    }

    /// Number of frames processed since the last restart.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Starts a new recording, possibly at a different sample rate.
    pub fn restart(&mut self, sample_rate: u32) {
        log::info!(
            "[SESSION] Restarting at {} Hz after {} frames",
            sample_rate,
            self.frames
        );
        self.sample_rate = sample_rate;
        self.frames = 0;
        self.spectrogram.reset();
    }

    /// Processes one spectrum frame.
    ///
    /// Frames without a pitch still scroll the spectrogram; their marker row
    /// is left empty.
    pub fn tick(&mut self, spectrum: &[f32]) -> Result<TickOutput> {
        let analysis = process_frame(spectrum, self.sample_rate);
        let frequency_hz = analysis.as_ref().map_or(f32::NAN, |a| a.frequency_hz);
        let column = self
            .spectrogram
            .push_frame(spectrum, self.sample_rate, frequency_hz)?;
        self.frames += 1;

        if let Some(a) = &analysis {
            log::debug!("[SESSION] Frame {}: {:.2} Hz, {}", self.frames, a.frequency_hz, a.note);
        }

        Ok(TickOutput { analysis, column })
    }
}
