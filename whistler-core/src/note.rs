//! # Note Mapping Module
//!
//! Converts between frequencies, continuous pitch numbers and note labels.
//!
//! Pitch numbers follow the 88-key piano numbering extended to the real line:
//! integer values are equal-tempered semitones and 49.0 is A4 (440 Hz).
//!
//! The label formula (note index, octave, cents) is a frozen display contract.
//! Octaves are derived from the raw pitch rather than the rounded note, so a
//! pitch that rounds up across an octave boundary keeps the lower octave.

use std::fmt;

/// Reference frequency of A4 in Hz.
pub const A4_FREQUENCY: f32 = 440.0;

/// Pitch number assigned to A4.
pub const A4_PITCH: f32 = 49.0;

const SEMITONES_PER_OCTAVE: i64 = 12;

/// The twelve pitch classes, starting at A.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    A,
    ASharp,
    B,
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
}

impl PitchClass {
    /// Table order used by the label formula (index 0 = A).
    pub const ALL: [PitchClass; 12] = [
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PitchClass::A => "A",
            PitchClass::ASharp => "A#",
            PitchClass::B => "B",
            PitchClass::C => "C",
            PitchClass::CSharp => "C#",
            PitchClass::D => "D",
            PitchClass::DSharp => "D#",
            PitchClass::E => "E",
            PitchClass::F => "F",
            PitchClass::FSharp => "F#",
            PitchClass::G => "G",
            PitchClass::GSharp => "G#",
        }
    }
}

impl fmt::Display for PitchClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A note name with its octave and deviation in cents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteLabel {
    pub name: PitchClass,
    pub octave: i32,
    pub cents: i32,
}

impl fmt::Display for NoteLabel {
    /// Renders as `"A 4 (+0%)"`; the sign is always explicit.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.cents >= 0 { "+" } else { "" };
        write!(f, "{} {} ({}{}%)", self.name, self.octave, sign, self.cents)
    }
}

/// Rounds half-way values towards positive infinity.
fn round_half_up(x: f32) -> f32 {
    (x + 0.5).floor()
}

/// Converts a frequency to a continuous pitch number.
///
/// `hz` must be positive. Callers are expected to filter out silent or
/// degenerate frequencies before converting.
pub fn frequency_to_pitch(hz: f32) -> f32 {
    debug_assert!(hz > 0.0, "frequency_to_pitch requires a positive frequency, got {hz}");
    12.0 * (hz / A4_FREQUENCY).log2() + A4_PITCH
}

/// Converts a pitch number back to its frequency in Hz.
pub fn pitch_to_frequency(pitch: f32) -> f32 {
    A4_FREQUENCY * 2.0_f32.powf((pitch - A4_PITCH) / 12.0)
}

/// Derives the display label for a pitch number.
pub fn pitch_to_label(pitch: f32) -> NoteLabel {
    let rounded = round_half_up(pitch);
    let cents = round_half_up((pitch - rounded) * 100.0) as i32;

    let r = rounded as i64;
    let note_index = ((r - 1) % SEMITONES_PER_OCTAVE + SEMITONES_PER_OCTAVE) % SEMITONES_PER_OCTAVE;
    let octave = ((pitch + 8.0) / 12.0).floor() as i32;

    NoteLabel {
        name: PitchClass::ALL[note_index as usize],
        octave,
        cents,
    }
}
