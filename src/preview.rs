//! Preview playback engine: the 30-second window policy, the playback
//! controller and the audio thread.
//!
//! `PreviewPlayer` owns the audio thread; commands go in over a channel and
//! playback state comes back through a shared snapshot handle.

mod controller;
mod player;
mod sink;
mod thread;
mod types;
mod window;

pub use player::PreviewPlayer;
pub use types::{PlaybackState, PreviewCmd, PreviewError, SnapshotHandle};
pub use window::{PREVIEW_CEILING, Phase, phase_at};

#[cfg(test)]
mod tests;
