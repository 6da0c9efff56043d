// tests/pipeline_test.rs

// Drives the public API end to end: synthetic audio -> spectrum -> session tick.

use whistler_core::{
    audio::FrameAssembler,
    config::WhistlerConfig,
    fft::SpectrumAnalyser,
    note,
    pipeline::Session,
};

const SAMPLE_RATE: u32 = 44_100;

fn sine(frequency: f32, len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            0.5 * (2.0 * std::f32::consts::PI * frequency * t).sin()
        })
        .collect()
}

#[test]
fn sine_frame_runs_through_a_session() {
    let config = WhistlerConfig::default();
    let analyser = SpectrumAnalyser::new(config.fft_size).unwrap();
    let mut session = Session::new(SAMPLE_RATE, config.spectrogram_columns, config.bin_count()).unwrap();

    // Centred on bin 20 of a 2048-point FFT.
    let frequency = 20.0 * SAMPLE_RATE as f32 / config.fft_size as f32;
    let spectrum = analyser.spectrum(&sine(frequency, config.fft_size)).unwrap();
    let output = session.tick(&spectrum).unwrap();

    let analysis = output.analysis.expect("a pure tone has a pitch");
    assert!((analysis.peak_bin_fractional - 20.0).abs() < 0.05, "{analysis:?}");

    // Frequencies are scaled by the spectrum length, i.e. `bin * rate / bins`.
    let expected = 20.0 * SAMPLE_RATE as f32 / config.bin_count() as f32;
    assert!((analysis.frequency_hz - expected).abs() < 5.0, "{analysis:?}");
    assert_eq!(analysis.note, note::pitch_to_label(analysis.pitch));

    assert_eq!(output.column.position, 0);
    assert_eq!(output.column.marker_row, Some(20));
    assert_eq!(output.column.intensities.len(), config.bin_count());
    assert_eq!(output.column.cursor, 1);
}

#[test]
fn captured_stereo_audio_is_analysed_frame_by_frame() {
    let fft_size = 1024;
    let analyser = SpectrumAnalyser::new(fft_size).unwrap();
    let mut session = Session::new(SAMPLE_RATE, 2, fft_size / 2).unwrap();
    let mut assembler = FrameAssembler::new(2, fft_size);

    let tone = sine(1000.0, fft_size * 3);
    let interleaved: Vec<f32> = tone.iter().flat_map(|&s| [s, s]).collect();
    let frames = assembler.push(&interleaved);
    assert_eq!(frames.len(), 3);

    let mut positions = Vec::new();
    for frame in &frames {
        let spectrum = analyser.spectrum(frame).unwrap();
        let output = session.tick(&spectrum).unwrap();
        assert!(output.analysis.is_some());
        positions.push(output.column.position);
    }

    assert_eq!(positions, vec![0, 1, 0]);
    assert_eq!(session.spectrogram().write_index(), 1);
    assert_eq!(session.frames(), 3);
}

#[test]
fn silence_scrolls_without_a_pitch() {
    let analyser = SpectrumAnalyser::new(256).unwrap();
    let mut session = Session::new(SAMPLE_RATE, 4, 128).unwrap();

    let spectrum = analyser.spectrum(&[0.0; 256]).unwrap();
    let output = session.tick(&spectrum).unwrap();

    assert!(output.analysis.is_none());
    assert_eq!(output.column.marker_row, None);
    assert!(output.column.intensities.iter().all(|&c| c == 0));
    assert_eq!(session.spectrogram().write_index(), 1);
}
