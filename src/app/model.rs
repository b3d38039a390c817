//! Application model: catalog, selection and mirrored playback state.
//!
//! The `App` struct holds what the UI renders; all media logic lives behind
//! the preview snapshot handle.

use std::sync::Arc;
use std::time::Duration;

use crate::catalog::{Album, AlbumStore};
use crate::library::Track;
use crate::preview::{PlaybackState, SnapshotHandle};

use super::sections::{Section, SectionBoundary, active_section};

/// Rows each fixed section occupies on the virtual page.
pub const HERO_ROWS: u16 = 8;
pub const ABOUT_ROWS: u16 = 10;

/// Probe offset for active-section detection (the header-height analog).
pub const SECTION_PROBE: u16 = 2;

/// Coarse playback status mirrored from the snapshot for display and MPRIS.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
    Paused,
}

/// The main application model.
pub struct App {
    pub tracks: Vec<Arc<Track>>,
    pub albums: AlbumStore,
    pub selected: usize,
    pub status: PlaybackStatus,
    pub snapshot: Option<SnapshotHandle>,

    /// Scroll offset into the virtual page.
    pub scroll: u16,
    /// Whether the album-detail popup is open.
    pub album_window: bool,
    /// Human-readable description of where the catalog came from.
    pub catalog_source: Option<String>,
    /// Last recovered playback error, for the status line.
    pub last_error: Option<String>,
}

impl App {
    pub fn new(tracks: Vec<Arc<Track>>, albums: AlbumStore) -> Self {
        Self {
            tracks,
            albums,
            selected: 0,
            status: PlaybackStatus::default(),
            snapshot: None,
            scroll: 0,
            album_window: false,
            catalog_source: None,
            last_error: None,
        }
    }

    /// Attach the snapshot handle used to observe playback progress.
    pub fn set_snapshot_handle(&mut self, handle: SnapshotHandle) {
        self.snapshot = Some(handle);
    }

    pub fn set_catalog_source(&mut self, source: String) {
        self.catalog_source = Some(source);
    }

    pub fn has_tracks(&self) -> bool {
        !self.tracks.is_empty()
    }

    pub fn selected_track(&self) -> Option<&Arc<Track>> {
        self.tracks.get(self.selected)
    }

    /// The featured track: first in catalog order by convention.
    pub fn featured_track(&self) -> Option<&Arc<Track>> {
        self.tracks.first()
    }

    /// Move selection to the next track, wrapping around.
    pub fn next(&mut self) {
        if !self.tracks.is_empty() {
            self.selected = (self.selected + 1) % self.tracks.len();
        }
    }

    /// Move selection to the previous track, wrapping around.
    pub fn prev(&mut self) {
        if !self.tracks.is_empty() {
            self.selected = (self.selected + self.tracks.len() - 1) % self.tracks.len();
        }
    }

    pub fn toggle_album_window(&mut self) {
        self.album_window = !self.album_window;
    }

    /// The album shown in the detail popup: the one matching the selected
    /// track's album tag, else the first featured album, else the first.
    pub fn album_for_selected(&self) -> Option<&Album> {
        if let Some(track) = self.selected_track() {
            if let Some(album) = self
                .albums
                .all()
                .iter()
                .find(|a| track.album.as_deref() == Some(a.title.as_str()))
            {
                return Some(album);
            }
        }
        self.albums
            .featured()
            .into_iter()
            .next()
            .or_else(|| self.albums.all().first())
    }

    /// Section start rows on the virtual page.
    pub fn section_bounds(&self) -> [SectionBoundary; 3] {
        [
            SectionBoundary {
                section: Section::Home,
                top: 0,
            },
            SectionBoundary {
                section: Section::About,
                top: HERO_ROWS,
            },
            SectionBoundary {
                section: Section::Music,
                top: HERO_ROWS + ABOUT_ROWS,
            },
        ]
    }

    /// Total rows on the virtual page.
    pub fn page_rows(&self) -> u16 {
        // Music: one row per album summary, one per track, plus headings.
        let music_rows = self.albums.all().len() as u16 + self.tracks.len() as u16 + 4;
        HERO_ROWS + ABOUT_ROWS + music_rows
    }

    pub fn active_section(&self) -> Section {
        active_section(self.scroll, SECTION_PROBE, &self.section_bounds())
    }

    /// Jump the scroll position to a section's start (the scroll-to-section
    /// behavior of the header tabs).
    pub fn jump_to_section(&mut self, section: Section) {
        let bounds = self.section_bounds();
        if let Some(boundary) = bounds.iter().find(|b| b.section == section) {
            self.scroll = boundary.top;
        }
    }

    pub fn next_section(&mut self) {
        let current = self.active_section();
        let idx = Section::ALL.iter().position(|s| *s == current).unwrap_or(0);
        self.jump_to_section(Section::ALL[(idx + 1) % Section::ALL.len()]);
    }

    pub fn scroll_down(&mut self) {
        let max = self.page_rows().saturating_sub(1);
        self.scroll = (self.scroll + 1).min(max);
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    /// Mirror the coarse status and error line from a playback snapshot.
    pub fn apply_snapshot(&mut self, state: &PlaybackState) {
        self.status = if state.track.is_none() {
            PlaybackStatus::Stopped
        } else if state.playing {
            PlaybackStatus::Playing
        } else {
            PlaybackStatus::Paused
        };
        self.last_error = state.last_error.as_ref().map(|e| e.to_string());
    }

    /// Current playback position, for relative seeks.
    pub fn playback_position(&self) -> Duration {
        self.snapshot
            .as_ref()
            .and_then(|h| h.lock().ok().map(|s| s.position))
            .unwrap_or(Duration::ZERO)
    }
}
