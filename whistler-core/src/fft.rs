//! # Spectrum Analysis Module
//!
//! Turns raw audio frames into decibel magnitude spectra, the way a browser
//! analyser node does with smoothing disabled:
//! 1. Blackman window
//! 2. Forward FFT (RustFFT)
//! 3. Magnitude scaled by `1 / fft_size`, converted to dB
//!
//! Only the first `fft_size / 2` bins are returned. A bin with zero magnitude
//! comes out as `-inf` dB.

use std::sync::Arc;

use anyhow::{Result, ensure};
use rustfft::{Fft, FftPlanner, num_complex::Complex};

/// Blackman window coefficient (alpha = 0.16).
const BLACKMAN_ALPHA: f32 = 0.16;

/// Builds a Blackman window of length `n`.
fn blackman_window(n: usize) -> Vec<f32> {
    let a0 = 0.5 * (1.0 - BLACKMAN_ALPHA);
    let a1 = 0.5;
    let a2 = 0.5 * BLACKMAN_ALPHA;
    let two_pi = 2.0 * std::f32::consts::PI;
    (0..n)
        .map(|i| {
            let x = i as f32 / n as f32;
            a0 - a1 * (two_pi * x).cos() + a2 * (2.0 * two_pi * x).cos()
        })
        .collect()
}

/// Reusable FFT plan and window for a fixed frame size.
pub struct SpectrumAnalyser {
    fft_size: usize,
    fft: Arc<dyn Fft<f32>>,
    window: Vec<f32>,
}

impl std::fmt::Debug for SpectrumAnalyser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpectrumAnalyser")
            .field("fft_size", &self.fft_size)
            .finish()
    }
}

impl SpectrumAnalyser {
    /// Plans a forward FFT of `fft_size` points (a power of two, at least 4).
    pub fn new(fft_size: usize) -> Result<Self> {
        ensure!(
            fft_size >= 4 && fft_size.is_power_of_two(),
            "FFT size must be a power of two of at least 4, got {fft_size}"
        );
        let mut planner = FftPlanner::new();
        Ok(Self {
            fft_size,
            fft: planner.plan_fft_forward(fft_size),
            window: blackman_window(fft_size),
        })
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Number of bins in each produced spectrum.
    pub fn bin_count(&self) -> usize {
        self.fft_size / 2
    }

    /// Computes the dB magnitude spectrum of one audio frame.
    pub fn spectrum(&self, frame: &[f32]) -> Result<Vec<f32>> {
        ensure!(
            frame.len() == self.fft_size,
            "Input frame has {} samples, expected {}",
            frame.len(),
            self.fft_size
        );

        let mut buffer: Vec<Complex<f32>> = frame
            .iter()
            .zip(&self.window)
            .map(|(&sample, &w)| Complex { re: sample * w, im: 0.0 })
            .collect();

        self.fft.process(&mut buffer);

        let scale = 1.0 / self.fft_size as f32;
        Ok(buffer
            .iter()
            .take(self.bin_count())
            .map(|c| 20.0 * (c.norm() * scale).log10())
            .collect())
    }
}
