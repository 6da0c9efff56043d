//! # Spectrum View
//!
//! Bar chart of the latest dB spectrum with a red line at the detected peak.
//! Each bin is `bar_width` pixels wide; bars that fall past the right edge are
//! not drawn.

use iced::widget::canvas::{self, Geometry, Path, Stroke};
use iced::widget::container;
use iced::{mouse, Color, Element, Point, Rectangle, Renderer, Size, Theme};

/// dB value drawn as an empty bar; 0 dB fills the full height.
const FLOOR_DB: f32 = -128.0;

/// Height of a bar as a fraction of the view, for a magnitude in dB.
pub fn bar_fraction(db: f32) -> f32 {
    let fraction = (db - FLOOR_DB) / -FLOOR_DB;
    if fraction.is_nan() {
        0.0
    } else {
        fraction.clamp(0.0, 1.0)
    }
}

pub struct SpectrumView {
    spectrum: Vec<f32>,
    /// Fractional bin of the detected peak
    peak_bin: Option<f32>,
    bar_width: f32,
}

impl SpectrumView {
    pub fn new(spectrum: Vec<f32>, peak_bin: Option<f32>, bar_width: f32) -> Self {
        Self { spectrum, peak_bin, bar_width }
    }

    pub fn view(self) -> Element<'static, crate::Message> {
        container(
            canvas::Canvas::new(self)
                .width(iced::Length::Fill)
                .height(iced::Length::Fixed(200.0)),
        )
        .into()
    }
}

impl<Message> canvas::Program<Message> for SpectrumView {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if !bounds.width.is_finite() || !bounds.height.is_finite() || self.spectrum.is_empty() {
            return vec![frame.into_geometry()];
        }

        let w = self.bar_width;
        for (i, &db) in self.spectrum.iter().enumerate() {
            let x = i as f32 * w;
            if x >= bounds.width {
                break;
            }
            let h = bar_fraction(db) * bounds.height;
            if h > 0.0 {
                let bar = Path::rectangle(Point::new(x, bounds.height - h), Size::new(w, h));
                frame.fill(&bar, Color::from_rgb8(0xDD, 0xDD, 0xDD));
            }
        }

        if let Some(peak) = self.peak_bin {
            let x = (peak + 0.5) * w;
            let line = Path::line(Point::new(x, 0.0), Point::new(x, bounds.height));
            frame.stroke(
                &line,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color::from_rgb8(0xFF, 0x00, 0x00)),
            );
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_heights_follow_decibels() {
        assert_eq!(bar_fraction(-128.0), 0.0);
        assert_eq!(bar_fraction(-64.0), 0.5);
        assert_eq!(bar_fraction(0.0), 1.0);
        assert_eq!(bar_fraction(12.0), 1.0);
        assert_eq!(bar_fraction(f32::NEG_INFINITY), 0.0);
    }
}
