use crate::models::{ChartWeek, RawLyric, SongKey};
use anyhow::{Context, Result};
use std::collections::HashSet;
use std::path::Path;

/// Load scraped chart weeks from a JSON file
pub fn load_weeks(path: &str) -> Result<Vec<ChartWeek>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read chart data from '{path}'"))?;
    let weeks: Vec<ChartWeek> = serde_json::from_str(&content)
        .with_context(|| format!("'{path}' is not a valid chart data file"))?;
    Ok(weeks)
}

pub fn save_weeks(path: &str, weeks: &[ChartWeek]) -> Result<()> {
    let content = serde_json::to_string(weeks)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write chart data to '{path}'"))
}

/// Load harvested lyric triples from a JSON file. A missing file is an
/// empty harvest, so a fresh run can start without one.
pub fn load_lyrics(path: &str) -> Result<Vec<RawLyric>> {
    if !Path::new(path).exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read lyric data from '{path}'"))?;
    let lyrics: Vec<RawLyric> = serde_json::from_str(&content)
        .with_context(|| format!("'{path}' is not a valid lyric data file"))?;
    Ok(lyrics)
}

pub fn save_lyrics(path: &str, lyrics: &[RawLyric]) -> Result<()> {
    let content = serde_json::to_string(lyrics)?;
    std::fs::write(path, content)
        .with_context(|| format!("failed to write lyric data to '{path}'"))
}

/// Keys already harvested (hits and misses alike), used to resume an
/// interrupted lyric fetch without re-querying
pub fn harvested_keys(lyrics: &[RawLyric]) -> HashSet<SongKey> {
    lyrics.iter().map(RawLyric::key).collect()
}
