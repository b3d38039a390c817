//! The playback controller: a deterministic state machine over an audio
//! backend.
//!
//! The controller owns all preview-window bookkeeping (ceiling, fade,
//! seek clamping, load generations) and talks to the audio device through
//! the [`Backend`] trait, so the whole state machine runs under test with a
//! scripted backend.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, warn};

use crate::library::Track;

use super::types::{PreviewCmd, PreviewError, SnapshotHandle};
use super::window::{self, PREVIEW_CEILING};

/// Operations the controller issues against the audio device.
///
/// `load` is asynchronous: it starts a new load generation and the outcome
/// arrives later as a [`BackendEvent`] carrying that generation.
pub(super) trait Backend {
    fn load(&mut self, path: &Path, generation: u64);
    fn play(&mut self);
    fn pause(&mut self);
    fn stop(&mut self);
    fn set_volume(&mut self, volume: f32);
    fn seek_to(&mut self, position: Duration);
    fn position(&self) -> Duration;
    /// The attached source ran dry (the file was shorter than the ceiling).
    fn finished(&self) -> bool;
    fn shutdown(&mut self, fade_out: Duration);
}

#[derive(Debug)]
pub(super) enum BackendEvent {
    /// A load generation completed and the resource is ready to play.
    Loaded {
        generation: u64,
        duration: Option<Duration>,
    },
    /// A load generation failed before the resource became ready.
    LoadFailed { generation: u64, message: String },
    /// The device reported an error during an already-started session.
    Fault { message: String },
}

pub(super) struct Controller<B: Backend> {
    backend: B,
    snapshot: SnapshotHandle,
    track: Option<Arc<Track>>,
    playing: bool,
    /// The backend currently holds a ready-to-play resource.
    loaded: bool,
    position: Duration,
    duration: Duration,
    /// Monotonic load counter; events carrying an older value are stale.
    generation: u64,
    /// Play as soon as the in-flight load completes.
    pending_play: bool,
    /// The in-flight load is `resume`'s single reload attempt.
    retrying: bool,
    last_error: Option<PreviewError>,
}

impl<B: Backend> Controller<B> {
    pub(super) fn new(backend: B, snapshot: SnapshotHandle) -> Self {
        let controller = Self {
            backend,
            snapshot,
            track: None,
            playing: false,
            loaded: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            generation: 0,
            pending_play: false,
            retrying: false,
            last_error: None,
        };
        controller.publish();
        controller
    }

    pub(super) fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub(super) fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    pub(super) fn handle_cmd(&mut self, cmd: PreviewCmd) {
        match cmd {
            PreviewCmd::Play(track) => self.play(track),
            PreviewCmd::Pause => self.pause(),
            PreviewCmd::Resume => self.resume(),
            PreviewCmd::Toggle => self.toggle(),
            PreviewCmd::Seek(seconds) => self.seek(seconds),
            PreviewCmd::Stop => self.stop(),
            // Quit is a thread-lifecycle concern; the event loop in
            // `thread.rs` intercepts it before commands reach us.
            PreviewCmd::Quit { .. } => {}
        }
    }

    pub(super) fn handle_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Loaded {
                generation,
                duration,
            } => {
                if !self.is_current(generation) {
                    debug!("discarding stale load completion (generation {generation})");
                    return;
                }
                self.loaded = true;
                self.retrying = false;
                let native = duration.or(self.track.as_ref().and_then(|t| t.duration));
                self.duration = native.unwrap_or(PREVIEW_CEILING).min(PREVIEW_CEILING);
                self.backend.set_volume(window::volume_at(self.position));
                if self.position > Duration::ZERO {
                    // A seek was issued while the resource was still loading.
                    self.backend.seek_to(self.position);
                }
                if self.pending_play {
                    self.pending_play = false;
                    self.backend.play();
                    self.playing = true;
                }
                self.publish();
            }
            BackendEvent::LoadFailed {
                generation,
                message,
            } => {
                if !self.is_current(generation) {
                    debug!("discarding stale load failure (generation {generation})");
                    return;
                }
                warn!("audio load failed: {message}");
                self.loaded = false;
                self.pending_play = false;
                self.playing = false;
                self.last_error = Some(if self.retrying {
                    PreviewError::PlaybackRejected(message)
                } else {
                    PreviewError::LoadFailure(message)
                });
                self.retrying = false;
                self.publish();
            }
            BackendEvent::Fault { message } => {
                warn!("audio backend fault: {message}");
                self.backend.stop();
                self.loaded = false;
                self.pending_play = false;
                self.playing = false;
                self.last_error = Some(PreviewError::ResourceError(message));
                self.publish();
            }
        }
    }

    /// Periodic time advance while the thread is idle: applies the fade and
    /// enforces the ceiling.
    pub(super) fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let position = self.backend.position();
        if position >= PREVIEW_CEILING || self.backend.finished() {
            self.finish_session();
            return;
        }
        self.backend.set_volume(window::volume_at(position));
        self.position = position;
        self.publish();
    }

    pub(super) fn quit(&mut self, fade_out: Duration) {
        self.backend.shutdown(fade_out);
        self.playing = false;
        self.publish();
    }

    fn play(&mut self, track: Arc<Track>) {
        if track.path.as_os_str().is_empty() {
            warn!("no audio source for track '{}'", track.title);
            self.last_error = Some(PreviewError::NoAudioSource);
            self.publish();
            return;
        }
        if self.track.as_ref().is_some_and(|t| t.id == track.id) {
            // Same track: toggle in place instead of reloading the resource.
            self.toggle();
            return;
        }

        // Replace the current session wholesale.
        self.backend.stop();
        self.generation += 1;
        self.loaded = false;
        self.playing = false;
        self.pending_play = true;
        self.retrying = false;
        self.position = Duration::ZERO;
        self.duration = track.duration.unwrap_or(PREVIEW_CEILING).min(PREVIEW_CEILING);
        self.last_error = None;
        let path = track.path.clone();
        self.track = Some(track);
        self.publish();
        self.backend.load(&path, self.generation);
    }

    fn pause(&mut self) {
        // Pausing while a load is in flight cancels its play-on-ready intent.
        self.pending_play = false;
        if !self.playing {
            return;
        }
        self.backend.pause();
        self.playing = false;
        self.position = self.backend.position().min(PREVIEW_CEILING);
        self.publish();
    }

    fn resume(&mut self) {
        if self.loaded {
            self.backend.play();
            self.playing = true;
            self.publish();
            return;
        }
        let Some(track) = self.track.as_ref() else {
            return;
        };
        if self.pending_play {
            // A load is already in flight and will start playback when it
            // completes.
            return;
        }
        // Not ready: spend one reload attempt. The load latency stands in
        // for the original fixed retry delay.
        warn!("audio source not ready, reloading {}", track.path.display());
        let path = track.path.clone();
        self.generation += 1;
        self.retrying = true;
        self.pending_play = true;
        self.backend.load(&path, self.generation);
    }

    fn toggle(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.resume();
        }
    }

    fn seek(&mut self, seconds: f64) {
        if self.track.is_none() {
            return;
        }
        let position = window::clamp_seek(seconds);
        self.position = position;
        if self.loaded {
            self.backend.seek_to(position);
            self.backend.set_volume(window::volume_at(position));
        }
        self.publish();
    }

    fn stop(&mut self) {
        self.backend.stop();
        self.track = None;
        self.loaded = false;
        self.playing = false;
        self.pending_play = false;
        self.retrying = false;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.publish();
    }

    /// The preview window closed: either the ceiling was reached or the
    /// source ran dry. The track stays associated so `resume` restarts the
    /// preview from the top.
    fn finish_session(&mut self) {
        self.backend.stop();
        self.loaded = false;
        self.playing = false;
        self.pending_play = false;
        self.position = Duration::ZERO;
        self.publish();
        debug!("preview window completed");
    }

    fn publish(&self) {
        if let Ok(mut state) = self.snapshot.lock() {
            state.track = self.track.clone();
            state.playing = self.playing;
            state.position = self.position;
            state.duration = self.duration;
            state.last_error = self.last_error.clone();
        }
    }
}
