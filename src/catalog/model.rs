use serde::Deserialize;

/// One entry in an album's track list.
#[derive(Debug, Clone, Deserialize)]
pub struct AlbumTrack {
    pub title: String,
    pub duration: String,
    #[serde(default)]
    pub featured: bool,
    #[serde(default, rename = "aiGenerated")]
    pub ai_generated: bool,
}

/// An album record as shipped in `albums.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    pub year: String,
    pub genre: String,
    /// Number of tracks on the album.
    pub tracks: u32,
    pub image: String,
    #[serde(default)]
    pub featured: bool,
    /// Accent color used by presentation layers.
    pub color: String,
    /// Stream count as a display string, e.g. "2.4M".
    pub streams: String,
    pub rating: f32,
    pub status: String,
    #[serde(default, rename = "aiFeatures")]
    pub ai_features: Vec<String>,
    #[serde(default, rename = "trackList")]
    pub track_list: Vec<AlbumTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AlbumData {
    pub albums: Vec<Album>,
}
