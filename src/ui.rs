//! UI rendering helpers for the terminal user interface.
//!
//! This module renders the single-page layout (header with section tabs,
//! now-playing status, the scrollable hero/about/music page and the key
//! help footer) using `ratatui`. All playback data comes from the preview
//! snapshot; nothing here touches the audio layer.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, Padding, Paragraph, Wrap},
};
use std::time::Duration;

use crate::app::{ABOUT_ROWS, App, HERO_ROWS, PlaybackStatus, Section};
use crate::catalog::Album;
use crate::config::{ControlsSettings, TimeField, TrackDisplayField, UiSettings};
use crate::library::Track;
use crate::preview::{PREVIEW_CEILING, Phase, PlaybackState, phase_at};

const ABOUT_TEXT: [&str; 7] = [
    "RB MUSIC is an electronic music project exploring the seam between",
    "handcrafted sound design and AI-assisted composition. Every release",
    "pairs analog synthesis with generative textures, mastered for both",
    "headphones and warehouse walls.",
    "",
    "Every track on this page can be previewed for thirty seconds,",
    "fading out gently before the window closes.",
];

/// Render the controls help text, incorporating seek seconds.
fn controls_text(seek_seconds: u64) -> String {
    [
        "[tab/1-3] section".to_string(),
        "[j/k] scroll".to_string(),
        "[up/down] select".to_string(),
        "[enter] preview".to_string(),
        "[space/p] play/pause".to_string(),
        format!("[H/L] seek -/+{}s", seek_seconds),
        "[K] album".to_string(),
        "[s] stop".to_string(),
        "[q] quit".to_string(),
    ]
    .join(" | ")
}

/// Format a `Duration` as `MM:SS`.
fn format_mmss(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

/// Build the "now playing" track text according to `ui` settings.
fn now_playing_track_text(track: &Track, ui: &UiSettings) -> String {
    let mut parts: Vec<String> = Vec::new();

    for f in &ui.now_playing_track_fields {
        match f {
            TrackDisplayField::Display => {
                if !track.display.trim().is_empty() {
                    parts.push(track.display.clone());
                }
            }
            TrackDisplayField::Title => {
                if !track.title.trim().is_empty() {
                    parts.push(track.title.clone());
                }
            }
            TrackDisplayField::Artist => {
                if !track.artist.trim().is_empty() {
                    parts.push(track.artist.clone());
                }
            }
            TrackDisplayField::Album => {
                if let Some(a) = track
                    .album
                    .as_deref()
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                {
                    parts.push(a.to_string());
                }
            }
            TrackDisplayField::Filename => {
                if let Some(stem) = track.path.file_stem().and_then(|s| s.to_str()) {
                    if !stem.trim().is_empty() {
                        parts.push(stem.to_string());
                    }
                }
            }
            TrackDisplayField::Path => {
                parts.push(track.path.display().to_string());
            }
        }
    }

    if parts.is_empty() {
        track.display.clone()
    } else {
        parts.join(&ui.now_playing_track_separator)
    }
}

/// Build the now-playing time text (elapsed/total/remaining) per `UiSettings`.
fn now_playing_time_text(elapsed: Duration, total: Duration, ui: &UiSettings) -> Option<String> {
    if ui.now_playing_time_fields.is_empty() {
        return None;
    }

    let mut parts: Vec<String> = Vec::new();
    for f in &ui.now_playing_time_fields {
        match f {
            TimeField::Elapsed => parts.push(format_mmss(elapsed)),
            TimeField::Total => parts.push(format_mmss(total)),
            TimeField::Remaining => {
                let rem = total.saturating_sub(elapsed);
                parts.push(format!("-{}", format_mmss(rem)));
            }
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(&ui.now_playing_time_separator))
    }
}

/// Compute a centered rectangle with given size constrained to `r`.
fn centered_rect_sized(mut width: u16, mut height: u16, r: Rect) -> Rect {
    // Keep the popup smaller and avoid covering the entire UI.
    width = width.min(r.width.saturating_sub(2)).max(10);
    height = height.min(r.height.saturating_sub(2)).max(5);

    let x = r.x + (r.width.saturating_sub(width) / 2);
    let y = r.y + (r.height.saturating_sub(height) / 2);
    Rect {
        x,
        y,
        width,
        height,
    }
}

/// Pad or truncate a section to its fixed row count so the virtual-page
/// boundaries stay aligned with `App::section_bounds`.
fn padded(mut lines: Vec<Line<'static>>, rows: u16) -> Vec<Line<'static>> {
    lines.truncate(rows as usize);
    while lines.len() < rows as usize {
        lines.push(Line::from(""));
    }
    lines
}

fn hero_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = vec![
        Line::from(Span::styled(
            "R B   M U S I C",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from("Electronic music, thirty seconds at a time."),
        Line::from(""),
    ];

    if let Some(track) = app.featured_track() {
        lines.push(Line::from(format!("Latest release: {}", track.display)));
        lines.push(Line::from("Press Enter on a track to hear a preview."));
    } else {
        lines.push(Line::from("No tracks found. Point the catalog at your audio files."));
    }

    padded(lines, HERO_ROWS)
}

fn about_lines() -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "About",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    lines.extend(ABOUT_TEXT.iter().map(|s| Line::from(*s)));
    padded(lines, ABOUT_ROWS)
}

fn album_summary(album: &Album) -> String {
    format!(
        "{} ({}) · {} · {} tracks · {} streams · ★{:.1}",
        album.title, album.year, album.genre, album.tracks, album.streams, album.rating
    )
}

fn music_lines(app: &App, playing_id: Option<&str>) -> Vec<Line<'static>> {
    let mut lines = vec![Line::from(Span::styled(
        "Albums",
        Style::default().add_modifier(Modifier::BOLD),
    ))];

    for album in app.albums.all() {
        lines.push(Line::from(album_summary(album)));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "Previews",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for (i, track) in app.tracks.iter().enumerate() {
        let marker = if Some(track.id.as_str()) == playing_id {
            "♪ "
        } else if i == app.selected {
            "> "
        } else {
            "  "
        };
        let duration = track
            .duration
            .map(format_mmss)
            .unwrap_or_else(|| "--:--".to_string());
        let line = format!("{marker}{} [{duration}]", track.display);
        if i == app.selected {
            lines.push(Line::from(Span::styled(
                line,
                Style::default().add_modifier(Modifier::REVERSED),
            )));
        } else {
            lines.push(Line::from(line));
        }
    }

    if app.tracks.is_empty() {
        lines.push(Line::from("  (no previews available)"));
    }

    lines
}

fn header_tabs(app: &App) -> Line<'static> {
    let active = app.active_section();
    let mut spans: Vec<Span<'static>> = Vec::new();
    for (i, section) in Section::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  •  "));
        }
        if *section == active {
            spans.push(Span::styled(
                section.label(),
                Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            ));
        } else {
            spans.push(Span::raw(section.label()));
        }
    }
    Line::from(spans)
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw(
    frame: &mut Frame,
    app: &App,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Length(5),
            Constraint::Min(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    // Header: brand text plus section tabs driven by the scroll offset.
    let header = Paragraph::new(vec![
        Line::from(ui_settings.header_text.clone()),
        header_tabs(app),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" anteprima ")
            .title_alignment(Alignment::Center),
    );
    frame.render_widget(header, chunks[0]);

    // Now-playing status and preview progress.
    let snapshot: Option<PlaybackState> = app
        .snapshot
        .as_ref()
        .and_then(|h| h.lock().ok().map(|s| s.clone()));

    let status_text = {
        let mut parts: Vec<String> = Vec::new();

        match app.status {
            PlaybackStatus::Stopped => parts.push("Stopped".to_string()),
            PlaybackStatus::Playing => parts.push("Playing".to_string()),
            PlaybackStatus::Paused => parts.push("Paused".to_string()),
        }

        if let Some(state) = snapshot.as_ref() {
            if let Some(track) = state.track.as_ref() {
                let song = now_playing_track_text(track, ui_settings);
                match now_playing_time_text(state.position, state.duration, ui_settings) {
                    Some(time) => parts.push(format!("Song: {song} [{time}]")),
                    None => parts.push(format!("Song: {song}")),
                }
                if phase_at(state.position) == Phase::Fading {
                    parts.push("fading out".to_string());
                }
            }
        }

        if let Some(err) = &app.last_error {
            parts.push(format!("Last error: {err}"));
        }

        if let Some(source) = &app.catalog_source {
            parts.push(format!("Catalog: {source}"));
        }

        parts.join(" • ")
    };

    let status_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(2)])
        .split(chunks[1]);

    let status_par = Paragraph::new(status_text)
        .block(
            Block::bordered()
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                })
                .title(" status "),
        )
        .wrap(Wrap { trim: true });
    frame.render_widget(status_par, status_chunks[0]);

    // Progress across the fixed preview window, not the native track length.
    let (ratio, label) = match snapshot.as_ref().filter(|s| s.track.is_some()) {
        Some(state) => {
            let ratio = (state.position.as_secs_f64() / PREVIEW_CEILING.as_secs_f64()).clamp(0.0, 1.0);
            (
                ratio,
                format!(
                    "{} / {}",
                    format_mmss(state.position),
                    format_mmss(PREVIEW_CEILING)
                ),
            )
        }
        None => (0.0, "no preview".to_string()),
    };
    let gauge = Gauge::default()
        .ratio(ratio)
        .label(label)
        .gauge_style(Style::default().reversed());
    frame.render_widget(gauge, status_chunks[1]);

    // The scrollable page: hero, about, music.
    let playing_id = snapshot
        .as_ref()
        .filter(|s| s.playing)
        .and_then(|s| s.track.as_ref())
        .map(|t| t.id.clone());

    let mut page: Vec<Line<'static>> = Vec::new();
    page.extend(hero_lines(app));
    page.extend(about_lines());
    page.extend(music_lines(app, playing_id.as_deref()));

    let body = Paragraph::new(page)
        .scroll((app.scroll, 0))
        .block(Block::default().borders(Borders::ALL).title(" page "));
    frame.render_widget(body, chunks[2]);

    // Overlay album popup (keeps the page visible under it).
    if app.album_window {
        let popup_area = centered_rect_sized(72, 16, chunks[2]);
        frame.render_widget(Clear, popup_area);

        let detail = match app.album_for_selected() {
            Some(album) => {
                let mut text = format!(
                    "{}\nYear: {}\nGenre: {}\nStatus: {}\nStreams: {}\nRating: {:.1}\n",
                    album.title, album.year, album.genre, album.status, album.streams, album.rating
                );
                if !album.ai_features.is_empty() {
                    text.push_str(&format!("AI features: {}\n", album.ai_features.join(", ")));
                }
                text.push('\n');
                for (i, t) in album.track_list.iter().enumerate() {
                    let mut badges = String::new();
                    if t.featured {
                        badges.push_str(" [featured]");
                    }
                    if t.ai_generated {
                        badges.push_str(" [AI]");
                    }
                    text.push_str(&format!("{}. {} ({}){}\n", i + 1, t.title, t.duration, badges));
                }
                text
            }
            None => "No albums in the catalog".to_string(),
        };

        let popup = Paragraph::new(detail)
            .block(
                Block::default()
                    .padding(Padding {
                        left: 1,
                        right: 0,
                        top: 0,
                        bottom: 0,
                    })
                    .borders(Borders::ALL)
                    .title(" album (K closes) "),
            )
            .wrap(Wrap { trim: true });
        frame.render_widget(popup, popup_area);
    }

    let footer = Paragraph::new(controls_text(controls_settings.seek_seconds))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[3]);
}
