use serde::{Deserialize, Serialize};

/// A `(title, artist)` pair identifying one song across the dataset
pub type SongKey = (String, String);

/// One ranked entry on a weekly Hot 100 chart
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartEntry {
    pub rank: u32,
    pub title: String,
    pub artist: String,
}

impl ChartEntry {
    pub fn key(&self) -> SongKey {
        (self.title.clone(), self.artist.clone())
    }
}

/// One weekly chart snapshot as scraped from Billboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartWeek {
    /// Week-start date in `YYYY-MM-DD` form
    pub date: String,
    /// Ranked entries, rank 1 first
    pub entries: Vec<ChartEntry>,
}

/// A raw harvested lyric triple: title, artist, and the lyric body
/// (`None` when the upstream lookup failed)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLyric {
    pub title: String,
    pub artist: String,
    pub lyrics: Option<String>,
}

impl RawLyric {
    pub fn key(&self) -> SongKey {
        (self.title.clone(), self.artist.clone())
    }
}

/// Response structure for the Genius /search API call
#[derive(Debug, Deserialize)]
pub struct GeniusSearchResponse {
    pub response: GeniusHits,
}

#[derive(Debug, Deserialize)]
pub struct GeniusHits {
    pub hits: Vec<GeniusHit>,
}

#[derive(Debug, Deserialize)]
pub struct GeniusHit {
    pub result: GeniusResult,
}

#[derive(Debug, Deserialize)]
pub struct GeniusResult {
    pub api_path: String,
    pub primary_artist: GeniusArtist,
}

#[derive(Debug, Deserialize)]
pub struct GeniusArtist {
    pub name: String,
}

/// Response structure for the Genius /songs/<id> API call
#[derive(Debug, Deserialize)]
pub struct GeniusSongResponse {
    pub response: GeniusSongContainer,
}

#[derive(Debug, Deserialize)]
pub struct GeniusSongContainer {
    pub song: GeniusSong,
}

#[derive(Debug, Deserialize)]
pub struct GeniusSong {
    /// Path of the public lyrics page on genius.com
    pub path: String,
}
