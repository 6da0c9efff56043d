//! # Spectrogram View
//!
//! Turns the core's circular column buffer into an RGBA image: one pixel per
//! cell, scaled up on screen with nearest-neighbour filtering so each column
//! is `column_width` pixels wide and each bin `bin_height` pixels tall.

use iced::widget::{image, image::FilterMethod};
use iced::{ContentFit, Element, Length};
use whistler_core::spectrogram::SpectrogramBuffer;

const MARKER_COLOR: [u8; 4] = [0xFF, 0x00, 0x00, 0xFF];
const CURSOR_COLOR: [u8; 4] = [0x00, 0x00, 0x88, 0xFF];

/// Builds the RGBA pixels for the lowest `visible_bins` bins of `buffer`.
///
/// Row 0 of the image is the highest visible bin. Returns
/// `(width, height, pixels)`.
pub fn rgba_pixels(buffer: &SpectrogramBuffer, visible_bins: usize) -> (u32, u32, Vec<u8>) {
    let width = buffer.width();
    let height = visible_bins.min(buffer.bins());
    let cursor = buffer.write_index();
    let mut pixels = vec![0u8; width * height * 4];

    for x in 0..width {
        let Some(column) = buffer.column(x) else {
            continue;
        };
        let marker = buffer.marker(x);

        for (bin, &c) in column.iter().take(height).enumerate() {
            let color = if x == cursor {
                CURSOR_COLOR
            } else if marker == Some(bin) {
                MARKER_COLOR
            } else {
                [c, c, c, 0xFF]
            };
            let y = height - 1 - bin;
            let offset = (y * width + x) * 4;
            pixels[offset..offset + 4].copy_from_slice(&color);
        }
    }

    (width as u32, height as u32, pixels)
}

/// A rendered snapshot of the spectrogram, ready for display.
#[derive(Debug, Clone)]
pub struct SpectrogramImage {
    handle: image::Handle,
    width: f32,
    height: f32,
}

impl SpectrogramImage {
    pub fn render(
        buffer: &SpectrogramBuffer,
        visible_bins: usize,
        column_width: f32,
        bin_height: f32,
    ) -> Self {
        let (width, height, pixels) = rgba_pixels(buffer, visible_bins);
        Self {
            handle: image::Handle::from_rgba(width, height, pixels),
            width: width as f32 * column_width,
            height: height as f32 * bin_height,
        }
    }

    pub fn view(&self) -> Element<'static, crate::Message> {
        image::<image::Handle>(self.handle.clone())
            .width(Length::Fixed(self.width))
            .height(Length::Fixed(self.height))
            .content_fit(ContentFit::Fill)
            .filter_method(FilterMethod::Nearest)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pixel(pixels: &[u8], width: u32, x: usize, y: usize) -> [u8; 4] {
        let offset = (y * width as usize + x) * 4;
        [pixels[offset], pixels[offset + 1], pixels[offset + 2], pixels[offset + 3]]
    }

    #[test]
    fn columns_are_drawn_bottom_up_with_marker_and_cursor() {
        let mut buffer = SpectrogramBuffer::new(3, 4).unwrap();
        // 1000 Hz over 4 bins at 4000 Hz lands on bin 1.
        buffer.push_frame(&[-128.0, -64.0, 0.0, -100.0], 4000, 1000.0).unwrap();

        let (width, height, pixels) = rgba_pixels(&buffer, 3);
        assert_eq!((width, height), (3, 3));
        assert_eq!(pixels.len(), 3 * 3 * 4);

        // Column 0: bin 0 at the bottom, bin 1 is the marker, bin 2 at the top.
        assert_eq!(pixel(&pixels, width, 0, 2), [0, 0, 0, 0xFF]);
        assert_eq!(pixel(&pixels, width, 0, 1), MARKER_COLOR);
        assert_eq!(pixel(&pixels, width, 0, 0), [255, 255, 255, 0xFF]);

        // The cursor sits on the next column to be written.
        for y in 0..3 {
            assert_eq!(pixel(&pixels, width, 1, y), CURSOR_COLOR);
        }
        assert_eq!(pixel(&pixels, width, 2, 0), [0, 0, 0, 0xFF]);
    }

    #[test]
    fn visible_bins_are_capped_by_the_buffer() {
        let buffer = SpectrogramBuffer::new(2, 4).unwrap();
        let (width, height, _) = rgba_pixels(&buffer, 100);
        assert_eq!((width, height), (2, 4));
    }
}
