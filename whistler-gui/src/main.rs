//! # Whistler - Live Pitch Display
//!
//! Desktop front end for the Whistler core: shows the dominant frequency, its
//! note name, the instantaneous spectrum and a scrolling spectrogram.
//!
//! ## Architecture
//! - **Main Thread**: Iced GUI application; sole owner of the analysis session
//! - **Audio Thread**: Capture and spectrum computation for one recording
//! - **Communication**: Crossbeam channels carrying spectra to the GUI thread
//! - **Updates**: 60 FPS polling via the subscription system

mod ui;

use crossbeam_channel::{Receiver, Sender};
use cpal::traits::StreamTrait;
use iced::{self, Element, Subscription, Theme};
use std::thread::{self, JoinHandle};
use whistler_core::{
    AnalysisResult, audio,
    config::{self, WhistlerConfig},
    fft::SpectrumAnalyser,
    pipeline::Session,
};
use ui::main_display::create_main_view;

/// Main entry point for the Whistler application.
pub fn main() -> iced::Result {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("[MAIN] Starting Whistler...");
    let result = iced::application("Whistler", WhistlerApp::update, WhistlerApp::view)
        .subscription(WhistlerApp::subscription)
        .theme(WhistlerApp::theme)
        .run();
    log::info!("[MAIN] Application finished with result: {:?}", result);
    result
}

/// Application message types.
#[derive(Debug, Clone)]
pub enum Message {
    /// Start a new recording session
    Record,
    /// Stop the current recording session
    Stop,
    /// Timer tick for polling the audio thread
    Tick,
}

/// Events sent from the audio thread to the GUI thread.
#[derive(Debug)]
enum WorkerEvent {
    /// Capture is running at the given sample rate
    Started(u32),
    /// One dB magnitude spectrum
    Spectrum(Vec<f32>),
    /// Capture could not be started
    Failed(String),
}

/// UI-specific data needed for rendering the interface.
#[derive(Debug, Clone, Default)]
pub struct AppDisplayData {
    pub recording: bool,
    pub status: Option<String>,
    pub last_analysis: Option<AnalysisResult>,
    pub last_spectrum: Vec<f32>,
    pub spectrum_bar_width: f32,
    pub spectrogram: Option<ui::spectrogram_view::SpectrogramImage>,
}

/// Audio worker thread management structure.
#[derive(Debug)]
struct AudioWorker {
    shutdown_tx: Sender<()>,
    thread_handle: Option<JoinHandle<()>>,
}

#[derive(Debug)]
struct WhistlerApp {
    config: WhistlerConfig,
    audio_worker: Option<AudioWorker>,
    event_receiver: Option<Receiver<WorkerEvent>>,
    session: Option<Session>,
    display_data: AppDisplayData,
}

impl Default for WhistlerApp {
    /// Loads the config and starts recording right away.
    fn default() -> Self {
        let config = config::load_or_default();
        let mut app = Self {
            display_data: AppDisplayData {
                spectrum_bar_width: config.spectrum_bar_width,
                ..AppDisplayData::default()
            },
            config,
            audio_worker: None,
            event_receiver: None,
            session: None,
        };
        app.start_recording();
        app
    }
}

impl WhistlerApp {
    /// Spawns the audio thread for a new recording session.
    fn start_recording(&mut self) {
        if self.audio_worker.is_some() {
            return;
        }

        let (event_tx, event_rx) = crossbeam_channel::unbounded();
        let (shutdown_tx, shutdown_rx) = crossbeam_channel::bounded(1);
        let fft_size = self.config.fft_size;
        let preferred_rate = self.config.preferred_sample_rate;

        let thread_handle = thread::spawn(move || {
            run_audio_thread(event_tx, shutdown_rx, fft_size, preferred_rate);
        });

        self.audio_worker = Some(AudioWorker {
            shutdown_tx,
            thread_handle: Some(thread_handle),
        });
        self.event_receiver = Some(event_rx);
        self.display_data.recording = true;
        self.display_data.status = None;
    }

    /// Stops the audio thread; frames still in flight are discarded.
    fn stop_recording(&mut self) {
        self.event_receiver = None;
        if let Some(mut worker) = self.audio_worker.take() {
            let _ = worker.shutdown_tx.send(());
            if let Some(handle) = worker.thread_handle.take() {
                if handle.join().is_err() {
                    log::error!("[MAIN] Audio thread panicked");
                }
            }
        }
        self.display_data.recording = false;
    }

    fn update(&mut self, message: Message) {
        match message {
            Message::Record => {
                log::info!("[MAIN] Record clicked");
                self.start_recording();
            }
            Message::Stop => {
                log::info!("[MAIN] Stop clicked");
                self.stop_recording();
            }
            Message::Tick => {
                let events: Vec<WorkerEvent> = match &self.event_receiver {
                    Some(receiver) => receiver.try_iter().collect(),
                    None => Vec::new(),
                };
                for event in events {
                    self.handle_worker_event(event);
                }
            }
        }
    }

    fn handle_worker_event(&mut self, event: WorkerEvent) {
        match event {
            WorkerEvent::Started(sample_rate) => self.begin_session(sample_rate),
            WorkerEvent::Spectrum(spectrum) => self.process_spectrum(spectrum),
            WorkerEvent::Failed(reason) => {
                self.display_data.status = Some(reason);
                self.stop_recording();
            }
        }
    }

    /// Resets the scroll state for a new recording, creating it on first use.
    fn begin_session(&mut self, sample_rate: u32) {
        if let Some(session) = self.session.as_mut() {
            session.restart(sample_rate);
        } else {
            match Session::new(
                sample_rate,
                self.config.spectrogram_columns,
                self.config.bin_count(),
            ) {
                Ok(session) => self.session = Some(session),
                Err(e) => {
                    log::error!("[MAIN] Could not create session: {e:#}");
                    self.display_data.status = Some(e.to_string());
                    self.stop_recording();
                    return;
                }
            }
        }
        self.display_data.last_analysis = None;
        self.display_data.last_spectrum.clear();
        self.refresh_spectrogram();
    }

    /// Runs one analysis tick and updates the display data.
    fn process_spectrum(&mut self, spectrum: Vec<f32>) {
        let Some(session) = self.session.as_mut() else {
            log::warn!("[MAIN] Spectrum received before the session started");
            return;
        };

        match session.tick(&spectrum) {
            Ok(output) => {
                self.display_data.last_analysis = output.analysis;
                self.display_data.last_spectrum = spectrum;
                self.refresh_spectrogram();
            }
            Err(e) => log::warn!("[MAIN] Dropping frame: {e:#}"),
        }
    }

    fn refresh_spectrogram(&mut self) {
        self.display_data.spectrogram = self.session.as_ref().map(|session| {
            ui::spectrogram_view::SpectrogramImage::render(
                session.spectrogram(),
                self.config.spectrogram_visible_bins,
                self.config.spectrogram_column_width,
                self.config.spectrogram_bin_height,
            )
        });
    }

    fn view(&self) -> Element<'_, Message> {
        create_main_view(&self.display_data)
    }

    fn subscription(&self) -> Subscription<Message> {
        iced::time::every(std::time::Duration::from_millis(16)).map(|_| Message::Tick)
    }

    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Body of the audio thread for one recording session.
///
/// Captures audio, turns each frame into a spectrum and forwards it until a
/// shutdown signal arrives or the GUI side hangs up.
fn run_audio_thread(
    events: Sender<WorkerEvent>,
    shutdown_rx: Receiver<()>,
    fft_size: usize,
    preferred_rate: u32,
) {
    log::info!("[AUDIO-THREAD] Starting audio thread...");

    let analyser = match SpectrumAnalyser::new(fft_size) {
        Ok(analyser) => analyser,
        Err(e) => {
            log::error!("[AUDIO-THREAD] {e:#}");
            let _ = events.send(WorkerEvent::Failed(e.to_string()));
            return;
        }
    };

    let (raw_audio_tx, raw_audio_rx) = crossbeam_channel::bounded::<Vec<f32>>(16);
    let (stream, sample_rate) =
        match audio::start_audio_capture(raw_audio_tx, fft_size, preferred_rate) {
            Ok(tuple) => tuple,
            Err(e) => {
                log::error!("[AUDIO-THREAD] Fatal error starting audio: {e:#}");
                let _ = events.send(WorkerEvent::Failed(format!("Could not open microphone: {e}")));
                return;
            }
        };

    if events.send(WorkerEvent::Started(sample_rate)).is_err() {
        return;
    }

    loop {
        crossbeam_channel::select! {
            recv(raw_audio_rx) -> msg => match msg {
                Ok(frame) => match analyser.spectrum(&frame) {
                    Ok(spectrum) => {
                        if events.send(WorkerEvent::Spectrum(spectrum)).is_err() {
                            log::info!("[AUDIO-THREAD] GUI stopped listening");
                            break;
                        }
                    }
                    Err(e) => log::warn!("[AUDIO-THREAD] Skipping frame: {e:#}"),
                },
                Err(_) => {
                    log::warn!("[AUDIO-THREAD] Audio channel closed");
                    break;
                }
            },
            recv(shutdown_rx) -> _ => {
                log::info!("[AUDIO-THREAD] Received shutdown signal");
                break;
            },
        }
    }

    if let Err(e) = stream.pause() {
        log::warn!("[AUDIO-THREAD] Error pausing stream: {e}");
    }
    drop(stream);
    log::info!("[AUDIO-THREAD] Audio thread finished");
}
