//! # Main Display Module
//!
//! Layout of the Whistler window: record/stop control, frequency and note
//! readout, spectrum and spectrogram.

use iced::widget::{button, column, container, row, text, Space};
use iced::{Alignment, Element, Length};

use super::spectrum_view::SpectrumView;
use crate::{AppDisplayData, Message};

/// Frequency readout, `"--"` when there is no pitch.
fn frequency_text(data: &AppDisplayData) -> String {
    data.last_analysis
        .as_ref()
        .map(|a| format!("{:.2} Hz", a.frequency_hz))
        .unwrap_or_else(|| "-- Hz".to_string())
}

fn note_text(data: &AppDisplayData) -> String {
    data.last_analysis
        .as_ref()
        .map(|a| a.note.to_string())
        .unwrap_or_else(|| "--".to_string())
}

/// Creates the complete main application view
pub fn create_main_view(data: &AppDisplayData) -> Element<'static, Message> {
    let record_button = if data.recording {
        button(text("Stop")).on_press(Message::Stop)
    } else {
        button(text("Record")).on_press(Message::Record)
    };

    let mut header = row![text("Whistler").size(28), Space::with_width(20), record_button]
        .align_y(Alignment::Center);
    if let Some(status) = &data.status {
        header = header.push(Space::with_width(20)).push(text(status.clone()).size(16));
    }

    let readout = row![
        text(frequency_text(data)).size(32),
        Space::with_width(40),
        text(note_text(data)).size(32),
    ]
    .align_y(Alignment::Center);

    let spectrum = SpectrumView::new(
        data.last_spectrum.clone(),
        data.last_analysis.as_ref().map(|a| a.peak_bin_fractional),
        data.spectrum_bar_width,
    )
    .view();

    let spectrogram: Element<'static, Message> = match &data.spectrogram {
        Some(image) => image.view(),
        None => Space::with_height(0).into(),
    };

    let content = column![
        header,
        readout,
        text("Spectrum").size(18),
        spectrum,
        text("Spectrogram").size(18),
        spectrogram,
    ]
    .spacing(10)
    .padding(20);

    container(content)
        .width(Length::Fill)
        .height(Length::Fill)
        .into()
}
