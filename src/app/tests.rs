use super::*;
use std::path::PathBuf;
use std::sync::Arc;

use crate::catalog::AlbumStore;
use crate::library::{ArtSource, Track};
use crate::preview::{PlaybackState, PreviewError};

fn t(title: &str) -> Arc<Track> {
    Arc::new(Track {
        id: title.to_string(),
        path: PathBuf::from(format!("/music/{title}.mp3")),
        title: title.to_string(),
        artist: "RB MUSIC".to_string(),
        album: None,
        genre: None,
        year: None,
        duration: None,
        art: ArtSource::Placeholder(PathBuf::new()),
        display: title.to_string(),
    })
}

fn app() -> App {
    App::new(
        vec![t("Alpha"), t("Beta"), t("Gamma")],
        AlbumStore::builtin(),
    )
}

#[test]
fn selection_wraps_both_ways() {
    let mut app = app();
    assert_eq!(app.selected, 0);
    app.prev();
    assert_eq!(app.selected, 2);
    app.next();
    assert_eq!(app.selected, 0);
    app.next();
    assert_eq!(app.selected, 1);
}

#[test]
fn selection_is_safe_with_no_tracks() {
    let mut app = App::new(Vec::new(), AlbumStore::builtin());
    app.next();
    app.prev();
    assert_eq!(app.selected, 0);
    assert!(!app.has_tracks());
    assert!(app.selected_track().is_none());
}

#[test]
fn active_section_follows_scroll_offset() {
    let mut app = app();
    assert_eq!(app.active_section(), Section::Home);

    app.jump_to_section(Section::About);
    assert_eq!(app.active_section(), Section::About);

    app.jump_to_section(Section::Music);
    assert_eq!(app.active_section(), Section::Music);

    app.jump_to_section(Section::Home);
    assert_eq!(app.active_section(), Section::Home);
}

#[test]
fn probe_offset_activates_a_section_slightly_early() {
    let mut app = app();
    let about_top = app.section_bounds()[1].top;

    // Two rows short of the boundary the probe already crosses it.
    app.scroll = about_top - SECTION_PROBE;
    assert_eq!(app.active_section(), Section::About);

    app.scroll = about_top - SECTION_PROBE - 1;
    assert_eq!(app.active_section(), Section::Home);
}

#[test]
fn active_section_handles_empty_bounds() {
    assert_eq!(active_section(10, 2, &[]), Section::Home);
}

#[test]
fn section_cycling_wraps() {
    let mut app = app();
    app.next_section();
    assert_eq!(app.active_section(), Section::About);
    app.next_section();
    assert_eq!(app.active_section(), Section::Music);
    app.next_section();
    assert_eq!(app.active_section(), Section::Home);
}

#[test]
fn scroll_is_clamped_to_the_page() {
    let mut app = app();
    for _ in 0..1000 {
        app.scroll_down();
    }
    assert_eq!(app.scroll, app.page_rows() - 1);
    for _ in 0..1000 {
        app.scroll_up();
    }
    assert_eq!(app.scroll, 0);
}

#[test]
fn apply_snapshot_maps_status_and_error() {
    let mut app = app();

    let mut state = PlaybackState::default();
    app.apply_snapshot(&state);
    assert_eq!(app.status, PlaybackStatus::Stopped);
    assert!(app.last_error.is_none());

    state.track = Some(t("Alpha"));
    state.playing = true;
    app.apply_snapshot(&state);
    assert_eq!(app.status, PlaybackStatus::Playing);

    state.playing = false;
    state.last_error = Some(PreviewError::NoAudioSource);
    app.apply_snapshot(&state);
    assert_eq!(app.status, PlaybackStatus::Paused);
    assert_eq!(app.last_error.as_deref(), Some("track has no audio source"));
}

#[test]
fn album_popup_prefers_the_selected_tracks_album() {
    let mut app = app();

    // No album tags: falls back to the featured album.
    let album = app.album_for_selected().unwrap();
    assert!(album.featured);

    // Tag the selected track with a known album title.
    let mut tagged = (*app.tracks[0]).clone();
    tagged.album = Some("Midnight Circuit".to_string());
    app.tracks[0] = Arc::new(tagged);
    app.selected = 0;
    assert_eq!(app.album_for_selected().unwrap().id, "midnight-circuit");
}

#[test]
fn featured_track_is_first_in_catalog_order() {
    let app = app();
    assert_eq!(app.featured_track().unwrap().title, "Alpha");
}
