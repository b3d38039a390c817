use std::sync::mpsc;
use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, PlaybackStatus, Section};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::preview::{PreviewCmd, PreviewPlayer};
use crate::runtime::mpris_sync::update_mpris;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Last-known track id as emitted to MPRIS.
    pub last_mpris_track: Option<String>,
    /// Last-known playback status as emitted to MPRIS.
    pub last_mpris_status: PlaybackStatus,
}

impl EventLoopState {
    /// Construct a new `EventLoopState` seeded from `app`.
    pub fn new(app: &App) -> Self {
        Self {
            last_mpris_track: None,
            last_mpris_status: app.status,
        }
    }
}

/// Main terminal event loop: handles input, UI drawing, sync with the preview
/// thread and MPRIS. Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    player: &PreviewPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        // Mirror the playback snapshot into the app model.
        let mut snapshot_track: Option<String> = None;
        let snapshot = app
            .snapshot
            .as_ref()
            .and_then(|h| h.lock().ok().map(|s| s.clone()));
        if let Some(snapshot) = snapshot {
            snapshot_track = snapshot.track.as_ref().map(|t| t.id.clone());
            app.apply_snapshot(&snapshot);
        }

        // Keep MPRIS in sync even when playback changes come from the preview
        // thread itself (ceiling reached, load failures).
        if snapshot_track != state.last_mpris_track || app.status != state.last_mpris_status {
            update_mpris(mpris, app);
            state.last_mpris_track = snapshot_track;
            state.last_mpris_status = app.status;
        }

        terminal.draw(|f| ui::draw(f, app, &settings.ui, &settings.controls))?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, settings, app, player, mpris)? {
                return Ok(());
            }
        }

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, player, mpris, control_tx)? {
                    break;
                }
            }
        }
    }

    Ok(())
}

fn handle_control_cmd(
    cmd: ControlCmd,
    settings: &config::Settings,
    app: &mut App,
    player: &PreviewPlayer,
    mpris: &MprisHandle,
) -> Result<bool, Box<dyn std::error::Error>> {
    match cmd {
        ControlCmd::Quit => {
            player.quit_softly(Duration::from_millis(settings.preview.quit_fade_out_ms));
            return Ok(true);
        }
        ControlCmd::Play => match app.status {
            PlaybackStatus::Paused => {
                let _ = player.send(PreviewCmd::Resume);
                app.status = PlaybackStatus::Playing;
                update_mpris(mpris, app);
            }
            PlaybackStatus::Stopped | PlaybackStatus::Playing => {
                if let Some(track) = app.selected_track().cloned() {
                    let _ = player.send(PreviewCmd::Play(track));
                    app.status = PlaybackStatus::Playing;
                    update_mpris(mpris, app);
                }
            }
        },
        ControlCmd::Pause => {
            if app.status == PlaybackStatus::Playing {
                let _ = player.send(PreviewCmd::Pause);
                app.status = PlaybackStatus::Paused;
                update_mpris(mpris, app);
            }
        }
        ControlCmd::PlayPause => {
            match app.status {
                PlaybackStatus::Stopped => {
                    if let Some(track) = app.selected_track().cloned() {
                        let _ = player.send(PreviewCmd::Play(track));
                        app.status = PlaybackStatus::Playing;
                    }
                }
                PlaybackStatus::Playing => {
                    let _ = player.send(PreviewCmd::Toggle);
                    app.status = PlaybackStatus::Paused;
                }
                PlaybackStatus::Paused => {
                    let _ = player.send(PreviewCmd::Toggle);
                    app.status = PlaybackStatus::Playing;
                }
            }
            update_mpris(mpris, app);
        }
        ControlCmd::Stop => {
            let _ = player.send(PreviewCmd::Stop);
            app.status = PlaybackStatus::Stopped;
            update_mpris(mpris, app);
        }
    }

    Ok(false)
}

fn handle_key_event(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App,
    player: &PreviewPlayer,
    mpris: &MprisHandle,
    control_tx: &mpsc::Sender<ControlCmd>,
) -> Result<bool, Box<dyn std::error::Error>> {
    match key.code {
        KeyCode::Char('q') => {
            player.quit_softly(Duration::from_millis(settings.preview.quit_fade_out_ms));
            return Ok(true);
        }
        KeyCode::Tab => {
            app.next_section();
        }
        KeyCode::Char('1') => app.jump_to_section(Section::Home),
        KeyCode::Char('2') => app.jump_to_section(Section::About),
        KeyCode::Char('3') => app.jump_to_section(Section::Music),
        KeyCode::Char('j') => app.scroll_down(),
        KeyCode::Char('k') => app.scroll_up(),
        KeyCode::Down => {
            app.next();
        }
        KeyCode::Up => {
            app.prev();
        }
        KeyCode::Enter => {
            // Same-track requests toggle inside the controller, so this is
            // safe to send unconditionally.
            if let Some(track) = app.selected_track().cloned() {
                let _ = player.send(PreviewCmd::Play(track));
                app.status = PlaybackStatus::Playing;
                update_mpris(mpris, app);
            }
        }
        KeyCode::Char('p') | KeyCode::Char(' ') => {
            let _ = control_tx.send(ControlCmd::PlayPause);
        }
        KeyCode::Char('s') => {
            let _ = control_tx.send(ControlCmd::Stop);
        }
        KeyCode::Char('L') => {
            let target =
                app.playback_position().as_secs_f64() + settings.controls.seek_seconds as f64;
            let _ = player.send(PreviewCmd::Seek(target));
        }
        KeyCode::Char('H') => {
            let target =
                app.playback_position().as_secs_f64() - settings.controls.seek_seconds as f64;
            let _ = player.send(PreviewCmd::Seek(target));
        }
        KeyCode::Char('K') => {
            app.toggle_album_window();
        }
        _ => {}
    }

    Ok(false)
}
