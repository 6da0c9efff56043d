//! # UI Module
//!
//! This module contains all UI components for the Whistler application.

pub mod main_display;
pub mod spectrogram_view;
pub mod spectrum_view;
