//! The `rodio`-backed audio device implementation.
//!
//! Decoding happens on short-lived loader threads so the audio thread never
//! blocks on I/O; completions come back through the preview thread's channel
//! tagged with their load generation. Seeking rebuilds the sink with
//! `Source::skip_duration`, which works for the common formats.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use rodio::{Decoder, OutputStream, Sink, Source};

use super::controller::Backend;
use super::thread::Msg;

pub(super) struct LoadedSource {
    pub(super) source: Decoder<BufReader<File>>,
    pub(super) duration: Option<Duration>,
}

pub(super) fn open_source(path: &Path) -> Result<LoadedSource, String> {
    let file = File::open(path).map_err(|e| format!("open {}: {e}", path.display()))?;
    let source = Decoder::new(BufReader::new(file))
        .map_err(|e| format!("decode {}: {e}", path.display()))?;
    let duration = source.total_duration();
    Ok(LoadedSource { source, duration })
}

pub(super) struct RodioBackend<'a> {
    stream: &'a OutputStream,
    tx: Sender<Msg>,
    sink: Option<Sink>,
    path: Option<PathBuf>,

    // Elapsed time is tracked from the wall clock: start instant plus the
    // time accumulated across pauses and seeks.
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl<'a> RodioBackend<'a> {
    pub(super) fn new(stream: &'a OutputStream, tx: Sender<Msg>) -> Self {
        Self {
            stream,
            tx,
            sink: None,
            path: None,
            started_at: None,
            accumulated: Duration::ZERO,
        }
    }

    /// Attach a decoded source as a fresh paused sink at position zero with
    /// full volume.
    pub(super) fn attach(&mut self, loaded: LoadedSource) {
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        let sink = Sink::connect_new(self.stream.mixer());
        sink.append(loaded.source);
        sink.pause();
        sink.set_volume(1.0);
        self.sink = Some(sink);
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }
}

impl Backend for RodioBackend<'_> {
    fn load(&mut self, path: &Path, generation: u64) {
        self.path = Some(path.to_path_buf());
        let path = path.to_path_buf();
        let tx = self.tx.clone();
        thread::spawn(move || {
            let result = open_source(&path);
            let _ = tx.send(Msg::Loaded { generation, result });
        });
    }

    fn play(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.play();
            if self.started_at.is_none() {
                self.started_at = Some(Instant::now());
            }
        }
    }

    fn pause(&mut self) {
        if let Some(sink) = self.sink.as_ref() {
            sink.pause();
        }
        if let Some(started) = self.started_at.take() {
            self.accumulated += started.elapsed();
        }
    }

    fn stop(&mut self) {
        if let Some(sink) = self.sink.take() {
            sink.stop();
        }
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    fn set_volume(&mut self, volume: f32) {
        if let Some(sink) = self.sink.as_ref() {
            sink.set_volume(volume);
        }
    }

    fn seek_to(&mut self, position: Duration) {
        let Some(path) = self.path.clone() else {
            return;
        };
        let was_paused = self.sink.as_ref().map(|s| s.is_paused()).unwrap_or(true);
        let volume = self.sink.as_ref().map(|s| s.volume()).unwrap_or(1.0);
        if let Some(old) = self.sink.take() {
            old.stop();
        }
        match open_source(&path) {
            Ok(loaded) => {
                let sink = Sink::connect_new(self.stream.mixer());
                // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
                sink.append(loaded.source.skip_duration(position));
                sink.set_volume(volume);
                if was_paused {
                    sink.pause();
                    self.started_at = None;
                } else {
                    sink.play();
                    self.started_at = Some(Instant::now());
                }
                self.sink = Some(sink);
                self.accumulated = position;
            }
            Err(message) => {
                self.started_at = None;
                let _ = self.tx.send(Msg::Fault { message });
            }
        }
    }

    fn position(&self) -> Duration {
        self.accumulated + self.started_at.map_or(Duration::ZERO, |s| s.elapsed())
    }

    fn finished(&self) -> bool {
        self.sink.as_ref().map(|s| s.empty()).unwrap_or(false)
    }

    fn shutdown(&mut self, fade_out: Duration) {
        if let Some(sink) = self.sink.take() {
            if !sink.is_paused() {
                fade_out_sink(&sink, fade_out);
            }
            sink.stop();
        }
        self.started_at = None;
    }
}

/// Fade a sink down from its current volume in a short blocking loop. This is
/// simple and good enough for shutdown; audio continues in rodio's mixer
/// thread while we step the volume.
fn fade_out_sink(sink: &Sink, fade_out: Duration) {
    let fade_out_ms = fade_out.as_millis() as u64;
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    let start = sink.volume();
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(start * (1.0 - t));
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}
