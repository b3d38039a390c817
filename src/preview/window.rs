//! Preview-window policy: the 30-second ceiling and the closing fade.
//!
//! Everything here is pure arithmetic over playback positions so the rules
//! can be exercised without an audio device.

use std::time::Duration;

/// Hard ceiling on how much of any track is playable.
pub const PREVIEW_CEILING: Duration = Duration::from_secs(30);

/// Position at which the closing fade begins.
pub const FADE_START: Duration = Duration::from_secs(27);

/// Where a playback position sits inside the preview window.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Before the fade window; full volume.
    BelowFade,
    /// Inside the fade window; volume ramps down to silence.
    Fading,
    /// At or past the ceiling; the session is over.
    Ended,
}

pub fn phase_at(position: Duration) -> Phase {
    if position >= PREVIEW_CEILING {
        Phase::Ended
    } else if position >= FADE_START {
        Phase::Fading
    } else {
        Phase::BelowFade
    }
}

/// Volume for `position`: full below the fade window, interpolated linearly
/// down to silence at the ceiling, clamped to `[0, 1]`.
pub fn volume_at(position: Duration) -> f32 {
    let t = position.as_secs_f32();
    let fade_start = FADE_START.as_secs_f32();
    let span = (PREVIEW_CEILING - FADE_START).as_secs_f32();
    (1.0 - (t - fade_start) / span).clamp(0.0, 1.0)
}

/// Map a requested seek position (any real number) into the preview window.
/// Out-of-range and non-finite input is corrected, never rejected.
pub fn clamp_seek(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_secs_f64(seconds.min(PREVIEW_CEILING.as_secs_f64()))
}
