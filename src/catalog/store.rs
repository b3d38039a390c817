use std::cmp::Ordering;
use std::fs;
use std::path::Path;

use super::model::{Album, AlbumData};

/// The demo catalog compiled into the binary; used when no albums file is
/// configured.
const BUILTIN_ALBUMS: &str = include_str!("../../assets/albums.json");

/// Read-only album catalog with the query surface the UI consumes.
pub struct AlbumStore {
    albums: Vec<Album>,
}

impl AlbumStore {
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let data: AlbumData = serde_json::from_str(json)?;
        Ok(Self {
            albums: data.albums,
        })
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let raw = fs::read_to_string(path)?;
        Ok(Self::from_json_str(&raw)?)
    }

    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_ALBUMS).expect("built-in albums.json is valid")
    }

    pub fn all(&self) -> &[Album] {
        &self.albums
    }

    pub fn by_id(&self, id: &str) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    pub fn featured(&self) -> Vec<&Album> {
        self.albums.iter().filter(|a| a.featured).collect()
    }

    pub fn by_status(&self, status: &str) -> Vec<&Album> {
        self.albums.iter().filter(|a| a.status == status).collect()
    }

    pub fn by_year(&self, year: &str) -> Vec<&Album> {
        self.albums.iter().filter(|a| a.year == year).collect()
    }

    /// Case-insensitive substring search over title and genre.
    pub fn search(&self, query: &str) -> Vec<&Album> {
        let query = query.to_lowercase();
        self.albums
            .iter()
            .filter(|a| {
                a.title.to_lowercase().contains(&query) || a.genre.to_lowercase().contains(&query)
            })
            .collect()
    }

    pub fn total_tracks(&self) -> u32 {
        self.albums.iter().map(|a| a.tracks).sum()
    }

    /// Albums sorted by rating, highest first.
    pub fn by_rating(&self) -> Vec<&Album> {
        let mut sorted: Vec<&Album> = self.albums.iter().collect();
        sorted.sort_by(|a, b| {
            b.rating
                .partial_cmp(&a.rating)
                .unwrap_or(Ordering::Equal)
        });
        sorted
    }

    /// Albums sorted by stream count, highest first.
    pub fn by_streams(&self) -> Vec<&Album> {
        let mut sorted: Vec<&Album> = self.albums.iter().collect();
        sorted.sort_by_key(|a| std::cmp::Reverse(parse_streams(&a.streams)));
        sorted
    }
}

/// Parse a display stream count like "2.4M" or "890K" into a comparable
/// number. Unknown suffixes fall back to the bare digits.
fn parse_streams(streams: &str) -> u64 {
    let digits: String = streams.chars().filter(|c| c.is_ascii_digit() || *c == '.').collect();
    let value: f64 = digits.parse().unwrap_or(0.0);
    let multiplier = match streams.trim().chars().last() {
        Some('K') | Some('k') => 1_000.0,
        Some('M') | Some('m') => 1_000_000.0,
        Some('B') | Some('b') => 1_000_000_000.0,
        _ => 1.0,
    };
    (value * multiplier) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALBUMS: &str = r##"{
        "albums": [
            {
                "id": "one", "title": "Neon Horizons", "year": "2024",
                "genre": "Electronic", "tracks": 8, "image": "/covers/one.png",
                "featured": true, "color": "#7C4DFF", "streams": "2.4M",
                "rating": 4.8, "status": "released",
                "aiFeatures": ["Neural mastering"],
                "trackList": [
                    {"title": "Breath of Dawn", "duration": "3:42", "featured": true, "aiGenerated": false}
                ]
            },
            {
                "id": "two", "title": "Midnight Circuit", "year": "2023",
                "genre": "Synthwave", "tracks": 10, "image": "/covers/two.png",
                "featured": false, "color": "#00E5FF", "streams": "890K",
                "rating": 4.5, "status": "released",
                "aiFeatures": [], "trackList": []
            },
            {
                "id": "three", "title": "First Light", "year": "2024",
                "genre": "Ambient", "tracks": 6, "image": "/covers/three.png",
                "featured": false, "color": "#FF6E40", "streams": "120K",
                "rating": 4.9, "status": "upcoming",
                "aiFeatures": [], "trackList": []
            }
        ]
    }"##;

    fn store() -> AlbumStore {
        AlbumStore::from_json_str(ALBUMS).unwrap()
    }

    #[test]
    fn builtin_catalog_parses() {
        let store = AlbumStore::builtin();
        assert!(!store.all().is_empty());
        assert!(store.total_tracks() > 0);
    }

    #[test]
    fn lookups_by_id_status_and_year() {
        let store = store();
        assert_eq!(store.by_id("two").unwrap().title, "Midnight Circuit");
        assert!(store.by_id("nope").is_none());

        let released = store.by_status("released");
        assert_eq!(released.len(), 2);

        let recent = store.by_year("2024");
        assert_eq!(recent.len(), 2);
    }

    #[test]
    fn featured_and_totals() {
        let store = store();
        let featured = store.featured();
        assert_eq!(featured.len(), 1);
        assert_eq!(featured[0].id, "one");
        assert_eq!(store.total_tracks(), 24);
    }

    #[test]
    fn search_matches_title_or_genre() {
        let store = store();
        assert_eq!(store.search("neon").len(), 1);
        assert_eq!(store.search("SYNTH").len(), 1);
        assert!(store.search("jazz").is_empty());
    }

    #[test]
    fn rating_sort_is_descending() {
        let store = store();
        let ids: Vec<&str> = store.by_rating().iter().map(|a| a.id.as_str()).collect();
        assert_eq!(ids, vec!["three", "one", "two"]);
    }

    #[test]
    fn stream_sort_understands_magnitude_suffixes() {
        let store = store();
        let ids: Vec<&str> = store.by_streams().iter().map(|a| a.id.as_str()).collect();
        // 2.4M > 890K > 120K
        assert_eq!(ids, vec!["one", "two", "three"]);
    }

    #[test]
    fn parse_streams_handles_suffixes_and_garbage() {
        assert_eq!(parse_streams("2.4M"), 2_400_000);
        assert_eq!(parse_streams("890K"), 890_000);
        assert_eq!(parse_streams("1234"), 1234);
        assert_eq!(parse_streams(""), 0);
        assert_eq!(parse_streams("n/a"), 0);
    }
}
