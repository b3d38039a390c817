//! Metadata resolution: locator → displayable `Track`.
//!
//! Embedded tags are read with `lofty`; every field falls back to something
//! derived from the locator or the configured catalog defaults, so resolution
//! never fails outright. Results are cached per locator, first resolution
//! wins, and later calls return the same `Arc` without touching the file
//! again — including for locators that failed to parse.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lofty::prelude::{AudioFile, ItemKey, TaggedFileExt};
use log::warn;

use crate::config::CatalogSettings;
use crate::preview::PREVIEW_CEILING;

use super::display::display_from_fields;
use super::model::{ArtSource, Track};

pub struct Resolver {
    settings: CatalogSettings,
    cache: HashMap<PathBuf, Arc<Track>>,
}

impl Resolver {
    pub fn new(settings: CatalogSettings) -> Self {
        Self {
            settings,
            cache: HashMap::new(),
        }
    }

    /// Resolve a locator into a track, serving repeated lookups from the cache.
    pub fn resolve(&mut self, path: &Path) -> Arc<Track> {
        if let Some(track) = self.cache.get(path) {
            return track.clone();
        }

        let track = match self.extract(path) {
            Ok(track) => track,
            Err(message) => {
                warn!("metadata extraction failed for {}: {message}", path.display());
                self.fallback(path)
            }
        };

        let track = Arc::new(track);
        self.cache.insert(path.to_path_buf(), track.clone());
        track
    }

    /// Resolve every locator, preserving the given order. The first entry is
    /// treated as the latest/featured track by convention.
    pub fn resolve_all(&mut self, paths: &[PathBuf]) -> Vec<Arc<Track>> {
        paths.iter().map(|p| self.resolve(p)).collect()
    }

    pub fn latest(&mut self, paths: &[PathBuf]) -> Option<Arc<Track>> {
        paths.first().map(|p| self.resolve(p))
    }

    /// Case-insensitive substring search over title, artist and album.
    pub fn search(&mut self, paths: &[PathBuf], query: &str) -> Vec<Arc<Track>> {
        let query = query.to_lowercase();
        self.resolve_all(paths)
            .into_iter()
            .filter(|t| {
                t.title.to_lowercase().contains(&query)
                    || t.artist.to_lowercase().contains(&query)
                    || t.album
                        .as_deref()
                        .is_some_and(|a| a.to_lowercase().contains(&query))
            })
            .collect()
    }

    pub fn tracks_by_artist(&mut self, paths: &[PathBuf], artist: &str) -> Vec<Arc<Track>> {
        let artist = artist.to_lowercase();
        self.resolve_all(paths)
            .into_iter()
            .filter(|t| t.artist.to_lowercase().contains(&artist))
            .collect()
    }

    fn extract(&self, path: &Path) -> Result<Track, String> {
        let tagged = lofty::read_from_path(path).map_err(|e| e.to_string())?;
        let native = tagged.properties().duration();
        let stem = file_stem(path);

        let mut title = stem.clone();
        let mut artist = self.settings.default_artist.clone();
        let mut album = Some(stem.clone());
        let mut genre = Some(self.settings.default_genre.clone());
        let mut year = Some(self.settings.default_year.clone());
        let mut art = ArtSource::Placeholder(PathBuf::from(&self.settings.placeholder_cover));

        if let Some(tag) = tagged.primary_tag().or_else(|| tagged.first_tag()) {
            if let Some(v) = tag.get_string(&ItemKey::TrackTitle) {
                if !v.trim().is_empty() {
                    title = v.trim().to_string();
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::TrackArtist) {
                let v = v.trim();
                if !v.is_empty() {
                    artist = v.to_string();
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::AlbumTitle) {
                let v = v.trim();
                if !v.is_empty() {
                    album = Some(v.to_string());
                }
            }
            if let Some(v) = tag.get_string(&ItemKey::Genre) {
                let v = v.trim();
                if !v.is_empty() {
                    genre = Some(v.to_string());
                }
            }
            if let Some(v) = tag
                .get_string(&ItemKey::Year)
                .or_else(|| tag.get_string(&ItemKey::RecordingDate))
            {
                let v = v.trim();
                if !v.is_empty() {
                    year = Some(v.to_string());
                }
            }
            if let Some(picture) = tag.pictures().first() {
                art = ArtSource::Embedded {
                    mime: picture.mime_type().map(|m| m.as_str().to_string()),
                    data: picture.data().to_vec(),
                };
            }
        }

        let display = display_from_fields(
            path,
            &title,
            Some(&artist),
            album.as_deref(),
            &self.settings.display_fields,
            &self.settings.display_separator,
        );

        Ok(Track {
            id: path.to_string_lossy().into_owned(),
            path: path.to_path_buf(),
            title,
            artist,
            album,
            genre,
            year,
            duration: Some(native.min(PREVIEW_CEILING)),
            art,
            display,
        })
    }

    /// Minimal track built purely from the locator when fetch/parse failed.
    fn fallback(&self, path: &Path) -> Track {
        let stem = file_stem(path);
        let display = display_from_fields(
            path,
            &stem,
            Some(&self.settings.default_artist),
            Some(&stem),
            &self.settings.display_fields,
            &self.settings.display_separator,
        );

        Track {
            id: path.to_string_lossy().into_owned(),
            path: path.to_path_buf(),
            title: stem.clone(),
            artist: self.settings.default_artist.clone(),
            album: Some(stem),
            genre: Some(self.settings.default_genre.clone()),
            year: Some(self.settings.default_year.clone()),
            duration: Some(PREVIEW_CEILING),
            art: ArtSource::Placeholder(PathBuf::from(&self.settings.placeholder_cover)),
            display,
        }
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}
