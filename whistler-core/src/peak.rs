//! # Peak Extraction Module
//!
//! Finds the dominant frequency of a magnitude spectrum.
//!
//! The search is a coarse scan for the loudest bin followed by parabolic
//! interpolation over its two neighbours for sub-bin accuracy. Magnitudes may
//! be decibel values, so the three samples are compared by absolute value.

/// Location of the dominant peak inside a spectrum frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakEstimate {
    /// Index of the loudest bin (first occurrence on ties).
    pub bin: usize,
    /// Sub-bin offset from parabolic interpolation; 0 at the edges.
    pub adjustment: f32,
}

impl PeakEstimate {
    /// Fractional bin position of the peak.
    pub fn fractional_bin(&self) -> f32 {
        self.bin as f32 + self.adjustment
    }

    /// Converts the peak position to Hz for a spectrum of `bins` entries.
    pub fn frequency(&self, bins: usize, sample_rate: u32) -> f32 {
        self.fractional_bin() * sample_rate as f32 / bins as f32
    }
}

/// Index of the first strict maximum, or `None` for an empty spectrum.
///
/// Bins that are NaN never win, and a spectrum made entirely of `-inf`
/// (digital silence) resolves to bin 0.
pub fn find_peak_bin(spectrum: &[f32]) -> Option<usize> {
    if spectrum.is_empty() {
        return None;
    }

    let mut peak_bin = 0;
    let mut peak = f32::NEG_INFINITY;
    for (i, &magnitude) in spectrum.iter().enumerate() {
        if magnitude > peak {
            peak = magnitude;
            peak_bin = i;
        }
    }
    Some(peak_bin)
}

/// Parabolic sub-bin offset for the peak at `peak_bin`.
///
/// Returns 0 at either edge of the spectrum, and whenever the parabola is
/// degenerate (zero denominator or non-finite result).
pub fn interpolate_adjustment(spectrum: &[f32], peak_bin: usize) -> f32 {
    let n = spectrum.len();
    if peak_bin == 0 || peak_bin + 1 >= n {
        return 0.0;
    }

    let left = spectrum[peak_bin - 1].abs();
    let middle = spectrum[peak_bin].abs();
    let right = spectrum[peak_bin + 1].abs();

    let denominator = 4.0 * middle - 2.0 * left - 2.0 * right;
    if denominator == 0.0 {
        return 0.0;
    }

    let adjustment = (right - left) / denominator;
    if adjustment.is_finite() {
        adjustment
    } else {
        log::debug!("[PEAK] Non-finite interpolation at bin {peak_bin}, using bin centre");
        0.0
    }
}

/// Locates the dominant peak of a spectrum with sub-bin precision.
pub fn locate_peak(spectrum: &[f32]) -> Option<PeakEstimate> {
    let bin = find_peak_bin(spectrum)?;
    Some(PeakEstimate {
        bin,
        adjustment: interpolate_adjustment(spectrum, bin),
    })
}

/// Estimates the dominant frequency of a spectrum frame in Hz.
///
/// The frequency is `peak * sample_rate / N`, where `N` is the spectrum
/// length. Returns `None` only for an empty spectrum.
pub fn extract_frequency(spectrum: &[f32], sample_rate: u32) -> Option<f32> {
    locate_peak(spectrum).map(|peak| peak.frequency(spectrum.len(), sample_rate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_resolves_to_3300_hz() {
        let spectrum = [-100.0, -100.0, -100.0, -20.0, -40.0, -100.0, -100.0, -100.0];
        let peak = locate_peak(&spectrum).unwrap();
        assert_eq!(peak.bin, 3);
        assert!((peak.adjustment - 0.3).abs() < 1e-6);

        let frequency = extract_frequency(&spectrum, 8000).unwrap();
        assert!((frequency - 3300.0).abs() < 1e-2, "got {frequency}");
    }

    #[test]
    fn symmetric_neighbours_have_no_adjustment() {
        let spectrum = [-90.0, -90.0, -50.0, -10.0, -50.0, -90.0, -90.0, -90.0];
        let peak = locate_peak(&spectrum).unwrap();
        assert_eq!(peak.bin, 3);
        assert_eq!(peak.adjustment, 0.0);
        assert_eq!(extract_frequency(&spectrum, 8000).unwrap(), 3000.0);
    }

    #[test]
    fn sharp_peak_is_within_one_bin() {
        let n = 1024;
        let sample_rate = 44_100;
        let bin_width = sample_rate as f32 / n as f32;
        for k in [1, 17, 300, 1022] {
            let mut spectrum = vec![-120.0_f32; n];
            spectrum[k] = -10.0;
            spectrum[k + 1] = -60.0;
            let frequency = extract_frequency(&spectrum, sample_rate).unwrap();
            let expected = k as f32 * bin_width;
            assert!(
                (frequency - expected).abs() <= bin_width,
                "bin {k}: {frequency} vs {expected}"
            );
        }
    }

    #[test]
    fn first_maximum_wins_ties() {
        let spectrum = [-80.0, -30.0, -70.0, -30.0, -80.0];
        assert_eq!(find_peak_bin(&spectrum), Some(1));
    }

    #[test]
    fn edge_peaks_are_not_interpolated() {
        let low = [-5.0, -20.0, -40.0, -60.0];
        assert_eq!(locate_peak(&low).unwrap().adjustment, 0.0);
        assert_eq!(extract_frequency(&low, 8000).unwrap(), 0.0);

        let high = [-60.0, -40.0, -20.0, -5.0];
        let peak = locate_peak(&high).unwrap();
        assert_eq!(peak.bin, 3);
        assert_eq!(peak.adjustment, 0.0);
    }

    #[test]
    fn short_spectra_skip_interpolation() {
        assert_eq!(locate_peak(&[-3.0]).unwrap(), PeakEstimate { bin: 0, adjustment: 0.0 });
        assert_eq!(locate_peak(&[-9.0, -3.0]).unwrap(), PeakEstimate { bin: 1, adjustment: 0.0 });
        assert_eq!(extract_frequency(&[], 8000), None);
    }

    #[test]
    fn degenerate_parabola_falls_back_to_bin_centre() {
        // 4*20 - 2*20 - 2*20 == 0
        let flat = [-20.0, -20.0, -20.0, -20.0];
        assert_eq!(locate_peak(&flat).unwrap().bin, 0);
        assert_eq!(interpolate_adjustment(&flat, 1), 0.0);
        assert_eq!(interpolate_adjustment(&flat, 2), 0.0);
    }

    #[test]
    fn silence_resolves_to_bin_zero() {
        let silence = vec![f32::NEG_INFINITY; 16];
        let peak = locate_peak(&silence).unwrap();
        assert_eq!(peak.bin, 0);
        assert_eq!(peak.adjustment, 0.0);
    }

    #[test]
    fn infinite_neighbour_does_not_poison_the_estimate() {
        let spectrum = [f32::NEG_INFINITY, -10.0, -30.0, -50.0];
        let peak = locate_peak(&spectrum).unwrap();
        assert_eq!(peak.bin, 1);
        assert_eq!(peak.adjustment, 0.0);
    }
}
