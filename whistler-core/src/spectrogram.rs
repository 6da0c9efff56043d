//! # Scrolling Spectrogram Module
//!
//! A fixed-width circular buffer of intensity columns. Each frame is written at
//! the current scroll position, which then advances and wraps around, so old
//! columns stay visible until the cursor comes back over them.

use anyhow::{Result, bail};

/// Intensity used for cleared cells.
pub const BACKGROUND: u8 = 0;

/// Maps a magnitude (dB) to an 8-bit intensity.
///
/// Linear map `256 + 2 * m`, rounded and clamped: -128 dB and below is black,
/// anything at or above -0.5 dB is white.
pub fn intensity_of(magnitude: f32) -> u8 {
    let c = (256.0 + 2.0 * magnitude + 0.5).floor();
    if c.is_nan() {
        return BACKGROUND;
    }
    c.clamp(0.0, 255.0) as u8
}

/// Bin row at which `frequency_hz` falls for a spectrum of `bins` entries.
///
/// Returns `None` when the frequency lies outside the spectrum or is not finite.
pub fn marker_row(frequency_hz: f32, bins: usize, sample_rate: u32) -> Option<usize> {
    if sample_rate == 0 {
        return None;
    }
    let peak = frequency_hz * bins as f32 / sample_rate as f32;
    let row = (peak + 0.5).floor();
    if !row.is_finite() || row < 0.0 || row >= bins as f32 {
        return None;
    }
    Some(row as usize)
}

/// One column as written by [`SpectrogramBuffer::push_frame`].
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrogramColumn {
    /// Column index the data was written to.
    pub position: usize,
    /// One intensity per frequency bin, lowest bin first.
    pub intensities: Vec<u8>,
    /// Bin row of the detected frequency, for the overlay marker.
    pub marker_row: Option<usize>,
    /// Next write position, drawn as the "now" cursor.
    pub cursor: usize,
}

/// Circular column store backing the scrolling spectrogram display.
#[derive(Debug, Clone)]
pub struct SpectrogramBuffer {
    width: usize,
    bins: usize,
    write_index: usize,
    cells: Vec<u8>,
    markers: Vec<Option<usize>>,
}

impl SpectrogramBuffer {
    /// Creates an empty buffer of `width` columns, each `bins` tall.
    pub fn new(width: usize, bins: usize) -> Result<Self> {
        if width == 0 {
            bail!("Spectrogram width must be at least one column");
        }
        if bins == 0 {
            bail!("Spectrogram columns must have at least one bin");
        }
        Ok(Self {
            width,
            bins,
            write_index: 0,
            cells: vec![BACKGROUND; width * bins],
            markers: vec![None; width],
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn bins(&self) -> usize {
        self.bins
    }

    /// Column that the next frame will overwrite.
    pub fn write_index(&self) -> usize {
        self.write_index
    }

    /// Clears every column and moves the cursor back to the first column.
    pub fn reset(&mut self) {
        self.cells.fill(BACKGROUND);
        self.markers.fill(None);
        self.write_index = 0;
        log::debug!("[SPECTROGRAM] Reset {} columns", self.width);
    }

    /// Writes one frame at the cursor and advances it.
    ///
    /// Fails without touching the buffer if the frame length differs from the
    /// configured bin count.
    pub fn push_frame(
        &mut self,
        spectrum: &[f32],
        sample_rate: u32,
        frequency_hz: f32,
    ) -> Result<SpectrogramColumn> {
        if spectrum.len() != self.bins {
            bail!(
                "Spectrum has {} bins but the spectrogram expects {}",
                spectrum.len(),
                self.bins
            );
        }

        let position = self.write_index;
        let intensities: Vec<u8> = spectrum.iter().map(|&m| intensity_of(m)).collect();
        let marker = marker_row(frequency_hz, self.bins, sample_rate);

        let start = position * self.bins;
        self.cells[start..start + self.bins].copy_from_slice(&intensities);
        self.markers[position] = marker;

        self.write_index = (position + 1) % self.width;

        Ok(SpectrogramColumn {
            position,
            intensities,
            marker_row: marker,
            cursor: self.write_index,
        })
    }

    /// Stored intensities of column `index`, lowest bin first.
    pub fn column(&self, index: usize) -> Option<&[u8]> {
        if index >= self.width {
            return None;
        }
        let start = index * self.bins;
        Some(&self.cells[start..start + self.bins])
    }

    /// Stored marker row of column `index`.
    pub fn marker(&self, index: usize) -> Option<usize> {
        self.markers.get(index).copied().flatten()
    }
}
