// whistler-core/src/lib.rs

//! The core logic for the Whistler pitch display.
//! This crate is responsible for audio capture, spectrum computation,
//! peak and pitch detection, and the scrolling spectrogram model. It is
//! completely headless and contains no GUI code.

pub mod audio;
pub mod config;
pub mod fft;
pub mod note;
pub mod peak;
pub mod pipeline;
pub mod spectrogram;

use note::NoteLabel;

/// Represents the result of analysing a single spectrum frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnalysisResult {
    /// The dominant frequency in Hz.
    pub frequency_hz: f32,
    /// Continuous pitch number (49.0 = A4).
    pub pitch: f32,
    /// The nearest note and the deviation from it.
    pub note: NoteLabel,
    /// Sub-bin position of the spectral peak.
    pub peak_bin_fractional: f32,
}
