use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{LevelFilter, warn};
use simplelog::{Config as LogConfig, WriteLogger};

use crate::catalog::AlbumStore;
use crate::config::{LoggingSettings, Settings};
use crate::library::{Resolver, Track, scan_locators};

/// Set up file logging when configured. The terminal belongs to the TUI, so
/// without a file there is nowhere to log and the facade stays disabled.
pub fn init_logging(settings: &LoggingSettings) {
    let Some(path) = settings.file.as_ref() else {
        return;
    };
    let level = match settings.level.as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };
    match File::create(path) {
        Ok(file) => {
            let _ = WriteLogger::init(level, LogConfig::default(), file);
        }
        Err(e) => eprintln!("anteprima: failed to open log file {path}: {e}"),
    }
}

/// Resolve the preview catalog and the album data.
///
/// Locators come from the configured track list when present; otherwise the
/// catalog directory (first CLI argument wins) is scanned. Returns the
/// resolved tracks, the albums and a human-readable source description.
pub fn load_catalog(settings: &Settings) -> (Vec<Arc<Track>>, AlbumStore, String) {
    let mut resolver = Resolver::new(settings.catalog.clone());

    let (locators, source): (Vec<PathBuf>, String) = if !settings.catalog.tracks.is_empty() {
        (
            settings.catalog.tracks.iter().map(PathBuf::from).collect(),
            format!("{} configured tracks", settings.catalog.tracks.len()),
        )
    } else {
        let dir = env::args()
            .nth(1)
            .unwrap_or_else(|| settings.catalog.dir.clone());
        let locators = scan_locators(Path::new(&dir), &settings.catalog);
        (locators, dir)
    };

    let tracks = resolver.resolve_all(&locators);

    let albums = match settings.catalog.albums_file.as_deref() {
        Some(path) => match AlbumStore::load(Path::new(path)) {
            Ok(store) => store,
            Err(e) => {
                warn!("failed to load albums from {path}: {e}");
                AlbumStore::builtin()
            }
        },
        None => AlbumStore::builtin(),
    };

    (tracks, albums, source)
}
