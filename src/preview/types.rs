//! Preview-player small types and handles.
//!
//! This module defines the command enum, the shared playback snapshot and
//! the error conditions the controller reports instead of panicking.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

use crate::library::Track;

#[derive(Debug, Clone)]
pub enum PreviewCmd {
    /// Load and play the given track. Requesting the track that is already
    /// loaded toggles playback in place instead of reloading it.
    Play(Arc<Track>),
    /// Halt playback; a no-op when already paused.
    Pause,
    /// Continue the loaded track, reloading it once if it is not ready.
    Resume,
    /// Pause when playing, resume otherwise.
    Toggle,
    /// Seek to an absolute position in seconds; clamped into the preview window.
    Seek(f64),
    /// Tear down the session and clear the associated track.
    Stop,
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// Conditions the controller recovers from locally; none of these propagate
/// into the UI as anything other than a snapshot field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PreviewError {
    #[error("track has no audio source")]
    NoAudioSource,
    #[error("failed to load audio source: {0}")]
    LoadFailure(String),
    #[error("playback rejected: {0}")]
    PlaybackRejected(String),
    #[error("audio backend error: {0}")]
    ResourceError(String),
}

/// Runtime playback information shared with the UI.
///
/// Written only by the preview thread; everyone else gets a read-only clone.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    /// The currently associated track, if any was ever loaded.
    pub track: Option<Arc<Track>>,
    /// Whether playback is currently active.
    pub playing: bool,
    /// Elapsed position inside the preview window.
    pub position: Duration,
    /// Effective playable duration, never above the preview ceiling.
    pub duration: Duration,
    /// The most recent recovered error, for diagnostics display.
    pub last_error: Option<PreviewError>,
}

pub type SnapshotHandle = Arc<Mutex<PlaybackState>>;
