use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::library::{ArtSource, Track};

use super::controller::{Backend, BackendEvent, Controller};
use super::types::{PlaybackState, PreviewCmd, PreviewError, SnapshotHandle};
use super::window::{self, FADE_START, PREVIEW_CEILING, Phase};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(PathBuf, u64),
    Play,
    Pause,
    Stop,
    SetVolume(f32),
    SeekTo(Duration),
    Shutdown,
}

/// Scripted backend: records every call and reports whatever position and
/// end-of-source state the test sets.
#[derive(Default)]
struct FakeBackend {
    calls: Vec<Call>,
    position: Duration,
    finished: bool,
}

impl Backend for FakeBackend {
    fn load(&mut self, path: &Path, generation: u64) {
        self.calls.push(Call::Load(path.to_path_buf(), generation));
    }
    fn play(&mut self) {
        self.calls.push(Call::Play);
    }
    fn pause(&mut self) {
        self.calls.push(Call::Pause);
    }
    fn stop(&mut self) {
        self.calls.push(Call::Stop);
    }
    fn set_volume(&mut self, volume: f32) {
        self.calls.push(Call::SetVolume(volume));
    }
    fn seek_to(&mut self, position: Duration) {
        self.calls.push(Call::SeekTo(position));
    }
    fn position(&self) -> Duration {
        self.position
    }
    fn finished(&self) -> bool {
        self.finished
    }
    fn shutdown(&mut self, _fade_out: Duration) {
        self.calls.push(Call::Shutdown);
    }
}

fn track(id: &str, path: &str) -> Arc<Track> {
    Arc::new(Track {
        id: id.to_string(),
        path: PathBuf::from(path),
        title: id.to_string(),
        artist: "RB MUSIC".to_string(),
        album: None,
        genre: None,
        year: None,
        duration: None,
        art: ArtSource::Placeholder(PathBuf::from("/covers/rb-music-logo.png")),
        display: id.to_string(),
    })
}

fn setup() -> (Controller<FakeBackend>, SnapshotHandle) {
    let snapshot: SnapshotHandle = Arc::new(Mutex::new(PlaybackState::default()));
    let controller = Controller::new(FakeBackend::default(), snapshot.clone());
    (controller, snapshot)
}

fn snap(handle: &SnapshotHandle) -> PlaybackState {
    handle.lock().unwrap().clone()
}

fn loads(controller: &mut Controller<FakeBackend>) -> Vec<Call> {
    controller
        .backend_mut()
        .calls
        .iter()
        .filter(|c| matches!(c, Call::Load(..)))
        .cloned()
        .collect()
}

// ---- window policy -------------------------------------------------------

#[test]
fn volume_follows_linear_fade_inside_window() {
    assert_eq!(window::volume_at(Duration::ZERO), 1.0);
    assert_eq!(window::volume_at(Duration::from_secs(26)), 1.0);
    assert!((window::volume_at(FADE_START) - 1.0).abs() < 1e-6);
    assert!((window::volume_at(Duration::from_secs_f64(28.5)) - 0.5).abs() < 1e-6);
    assert!(window::volume_at(Duration::from_secs_f64(29.97)) < 0.02);
    assert_eq!(window::volume_at(PREVIEW_CEILING), 0.0);
    assert_eq!(window::volume_at(Duration::from_secs(40)), 0.0);
}

#[test]
fn phase_partitions_the_window() {
    assert_eq!(window::phase_at(Duration::ZERO), Phase::BelowFade);
    assert_eq!(window::phase_at(Duration::from_secs_f64(26.999)), Phase::BelowFade);
    assert_eq!(window::phase_at(FADE_START), Phase::Fading);
    assert_eq!(window::phase_at(Duration::from_secs(29)), Phase::Fading);
    assert_eq!(window::phase_at(PREVIEW_CEILING), Phase::Ended);
    assert_eq!(window::phase_at(Duration::from_secs(99)), Phase::Ended);
}

#[test]
fn clamp_seek_corrects_any_real_input() {
    assert_eq!(window::clamp_seek(-3.0), Duration::ZERO);
    assert_eq!(window::clamp_seek(0.0), Duration::ZERO);
    assert_eq!(window::clamp_seek(12.5), Duration::from_secs_f64(12.5));
    assert_eq!(window::clamp_seek(30.0), PREVIEW_CEILING);
    assert_eq!(window::clamp_seek(45.0), PREVIEW_CEILING);
    assert_eq!(window::clamp_seek(f64::NAN), Duration::ZERO);
    assert_eq!(window::clamp_seek(f64::INFINITY), PREVIEW_CEILING);
    assert_eq!(window::clamp_seek(f64::NEG_INFINITY), Duration::ZERO);
}

// ---- controller ----------------------------------------------------------

#[test]
fn play_loads_then_plays_on_ready() {
    let (mut c, handle) = setup();
    let t1 = track("t1", "/music/a.mp3");

    c.handle_cmd(PreviewCmd::Play(t1.clone()));
    let s = snap(&handle);
    assert_eq!(s.track.as_ref().map(|t| t.id.as_str()), Some("t1"));
    assert!(!s.playing);
    assert_eq!(s.position, Duration::ZERO);
    assert_eq!(loads(&mut c), vec![Call::Load(PathBuf::from("/music/a.mp3"), 1)]);

    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: Some(Duration::from_secs(200)),
    });
    let s = snap(&handle);
    assert!(s.playing);
    assert_eq!(s.position, Duration::ZERO);
    // Effective duration is clamped to the preview ceiling.
    assert_eq!(s.duration, PREVIEW_CEILING);
    assert!(c.backend_mut().calls.contains(&Call::Play));
}

#[test]
fn short_native_duration_is_kept_as_is() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: Some(Duration::from_secs(12)),
    });
    assert_eq!(snap(&handle).duration, Duration::from_secs(12));
}

#[test]
fn replaying_the_loaded_track_toggles_instead_of_reloading() {
    let (mut c, handle) = setup();
    let t1 = track("t1", "/music/a.mp3");

    c.handle_cmd(PreviewCmd::Play(t1.clone()));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    assert!(snap(&handle).playing);

    // Second play with the same id pauses in place.
    c.handle_cmd(PreviewCmd::Play(t1.clone()));
    assert!(!snap(&handle).playing);
    assert_eq!(loads(&mut c).len(), 1);

    // And a third resumes.
    c.handle_cmd(PreviewCmd::Play(t1));
    assert!(snap(&handle).playing);
    assert_eq!(loads(&mut c).len(), 1);
}

#[test]
fn stale_readiness_cannot_resurrect_a_superseded_track() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("a", "/music/a.mp3")));
    c.handle_cmd(PreviewCmd::Play(track("b", "/music/b.mp3")));
    assert_eq!(
        loads(&mut c),
        vec![
            Call::Load(PathBuf::from("/music/a.mp3"), 1),
            Call::Load(PathBuf::from("/music/b.mp3"), 2),
        ]
    );
    assert!(!c.is_current(1));
    assert!(c.is_current(2));

    // Track a's readiness arrives late; it must not start playback.
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    let s = snap(&handle);
    assert_eq!(s.track.as_ref().map(|t| t.id.as_str()), Some("b"));
    assert!(!s.playing);

    c.handle_event(BackendEvent::Loaded {
        generation: 2,
        duration: None,
    });
    let s = snap(&handle);
    assert_eq!(s.track.as_ref().map(|t| t.id.as_str()), Some("b"));
    assert!(s.playing);
}

#[test]
fn ceiling_stops_playback_and_is_idempotent() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });

    c.backend_mut().position = Duration::from_secs_f64(30.1);
    c.tick();
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(s.position, Duration::ZERO);
    // The track stays associated; only the session ended.
    assert_eq!(s.track.as_ref().map(|t| t.id.as_str()), Some("t1"));
    assert!(c.backend_mut().calls.contains(&Call::Stop));

    // Running the handler again changes nothing.
    let before = c.backend_mut().calls.len();
    c.tick();
    assert_eq!(c.backend_mut().calls.len(), before);
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(s.position, Duration::ZERO);
}

#[test]
fn native_end_of_source_behaves_like_the_ceiling() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/short.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: Some(Duration::from_secs(8)),
    });

    c.backend_mut().position = Duration::from_secs(8);
    c.backend_mut().finished = true;
    c.tick();
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(s.position, Duration::ZERO);
    assert!(s.track.is_some());
}

#[test]
fn fade_volume_is_applied_while_time_advances() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });

    c.backend_mut().position = Duration::from_secs(29);
    c.tick();
    let s = snap(&handle);
    assert!(s.playing);
    assert_eq!(s.position, Duration::from_secs(29));
    let last_volume = c
        .backend_mut()
        .calls
        .iter()
        .rev()
        .find_map(|call| match call {
            Call::SetVolume(v) => Some(*v),
            _ => None,
        })
        .unwrap();
    assert!((last_volume - 1.0 / 3.0).abs() < 1e-6);

    // Back below the fade window the volume is restored to full.
    c.backend_mut().position = Duration::from_secs(5);
    c.tick();
    let last_volume = c
        .backend_mut()
        .calls
        .iter()
        .rev()
        .find_map(|call| match call {
            Call::SetVolume(v) => Some(*v),
            _ => None,
        })
        .unwrap();
    assert_eq!(last_volume, 1.0);
}

#[test]
fn seek_clamps_and_round_trips() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });

    c.handle_cmd(PreviewCmd::Seek(45.0));
    assert_eq!(snap(&handle).position, PREVIEW_CEILING);
    assert!(c.backend_mut().calls.contains(&Call::SeekTo(PREVIEW_CEILING)));

    c.handle_cmd(PreviewCmd::Seek(-2.0));
    assert_eq!(snap(&handle).position, Duration::ZERO);

    // seek(5) followed by seek(position) is idempotent.
    c.handle_cmd(PreviewCmd::Seek(5.0));
    let first = snap(&handle).position;
    c.handle_cmd(PreviewCmd::Seek(first.as_secs_f64()));
    assert_eq!(snap(&handle).position, first);
}

#[test]
fn seek_without_a_track_is_a_no_op() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Seek(10.0));
    assert_eq!(snap(&handle).position, Duration::ZERO);
    assert!(c.backend_mut().calls.is_empty());
}

#[test]
fn toggle_preserves_the_pause_point() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });

    c.backend_mut().position = Duration::from_secs(10);
    c.handle_cmd(PreviewCmd::Toggle);
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(s.position, Duration::from_secs(10));

    c.handle_cmd(PreviewCmd::Toggle);
    let s = snap(&handle);
    assert!(s.playing);
    assert_eq!(s.position, Duration::from_secs(10));
}

#[test]
fn pause_is_idempotent() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });

    c.handle_cmd(PreviewCmd::Pause);
    let calls = c.backend_mut().calls.len();
    c.handle_cmd(PreviewCmd::Pause);
    assert_eq!(c.backend_mut().calls.len(), calls);
    assert!(!snap(&handle).playing);
}

#[test]
fn pause_while_loading_cancels_the_play_on_ready_intent() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_cmd(PreviewCmd::Pause);

    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    let s = snap(&handle);
    assert!(!s.playing);
    assert!(!c.backend_mut().calls.contains(&Call::Play));

    // The resource is ready, so a later resume starts it directly.
    c.handle_cmd(PreviewCmd::Resume);
    assert!(snap(&handle).playing);
    assert_eq!(loads(&mut c).len(), 1);
}

#[test]
fn play_without_a_source_reports_no_audio_source() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "")));
    let s = snap(&handle);
    assert!(s.track.is_none());
    assert!(!s.playing);
    assert_eq!(s.last_error, Some(PreviewError::NoAudioSource));
    assert!(loads(&mut c).is_empty());
}

#[test]
fn load_failure_reverts_to_not_playing() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/broken.mp3")));
    c.handle_event(BackendEvent::LoadFailed {
        generation: 1,
        message: "decode failed".to_string(),
    });
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(
        s.last_error,
        Some(PreviewError::LoadFailure("decode failed".to_string()))
    );
    // The track stays associated for a later retry.
    assert!(s.track.is_some());
}

#[test]
fn resume_after_session_end_retries_with_a_fresh_load() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    c.backend_mut().position = PREVIEW_CEILING;
    c.tick();
    assert!(!snap(&handle).playing);

    // The resource was torn down; resume spends its single reload attempt.
    c.handle_cmd(PreviewCmd::Resume);
    assert_eq!(loads(&mut c).len(), 2);
    c.handle_event(BackendEvent::Loaded {
        generation: 2,
        duration: None,
    });
    let s = snap(&handle);
    assert!(s.playing);
    assert_eq!(s.position, Duration::ZERO);
}

#[test]
fn failed_resume_retry_reports_playback_rejected() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    c.backend_mut().position = PREVIEW_CEILING;
    c.tick();

    c.handle_cmd(PreviewCmd::Resume);
    c.handle_event(BackendEvent::LoadFailed {
        generation: 2,
        message: "device busy".to_string(),
    });
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(
        s.last_error,
        Some(PreviewError::PlaybackRejected("device busy".to_string()))
    );
}

#[test]
fn backend_fault_stops_the_session() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    assert!(snap(&handle).playing);

    c.handle_event(BackendEvent::Fault {
        message: "stream died".to_string(),
    });
    let s = snap(&handle);
    assert!(!s.playing);
    assert_eq!(
        s.last_error,
        Some(PreviewError::ResourceError("stream died".to_string()))
    );
    assert!(c.backend_mut().calls.contains(&Call::Stop));
}

#[test]
fn stop_clears_the_associated_track() {
    let (mut c, handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });

    c.handle_cmd(PreviewCmd::Stop);
    let s = snap(&handle);
    assert!(s.track.is_none());
    assert!(!s.playing);
    assert_eq!(s.position, Duration::ZERO);
    assert_eq!(s.duration, Duration::ZERO);
}

#[test]
fn full_preview_cycle_matches_the_contract() {
    let (mut c, handle) = setup();
    let t1 = track("t1", "/music/a.mp3");

    c.handle_cmd(PreviewCmd::Play(t1));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    let s = snap(&handle);
    assert!(s.playing);
    assert_eq!(s.position, Duration::ZERO);

    // At 29s the preview is still running, inside the fade.
    c.backend_mut().position = Duration::from_secs(29);
    c.tick();
    let s = snap(&handle);
    assert!(s.playing);
    assert_eq!(window::phase_at(s.position), Phase::Fading);

    // At 30s the session ends and the state resets.
    c.backend_mut().position = Duration::from_secs(30);
    c.tick();
    let s = snap(&handle);
    assert_eq!(s.track.as_ref().map(|t| t.id.as_str()), Some("t1"));
    assert!(!s.playing);
    assert_eq!(s.position, Duration::ZERO);
}

#[test]
fn seek_while_loading_is_applied_on_readiness() {
    let (mut c, _handle) = setup();
    c.handle_cmd(PreviewCmd::Play(track("t1", "/music/a.mp3")));
    c.handle_cmd(PreviewCmd::Seek(12.0));
    c.handle_event(BackendEvent::Loaded {
        generation: 1,
        duration: None,
    });
    assert!(
        c.backend_mut()
            .calls
            .contains(&Call::SeekTo(Duration::from_secs(12)))
    );
}
