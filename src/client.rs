use crate::config::Config;
use crate::models::{
    ChartEntry, ChartWeek, GeniusResult, GeniusSearchResponse, GeniusSongResponse,
};
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDate, Utc};
use lazy_static::lazy_static;
use regex::Regex;
use ureq::Agent;
use urlencoding::encode;

lazy_static! {
    static ref TITLE_RE: Regex =
        Regex::new(r#"(?s)<span class="chart-list-item__title-text"[^>]*>(.*?)</span>"#).unwrap();
    static ref ARTIST_RE: Regex =
        Regex::new(r#"(?s)<div class="chart-list-item__artist"[^>]*>(.*?)</div>"#).unwrap();
    static ref DATE_RE: Regex = Regex::new(
        r#"(?s)<button class="chart-detail-header__date-selector-button"[^>]*>(.*?)</button>"#
    )
    .unwrap();
    static ref LYRICS_DIV_RE: Regex =
        Regex::new(r#"(?s)<div class="lyrics"[^>]*>(.*?)</div>"#).unwrap();
    static ref TAG_RE: Regex = Regex::new(r"<[^>]+>").unwrap();
    static ref SONG_PARENS_RE: Regex = Regex::new(r"\([^)]*\)").unwrap();
}

/// Strip markup from an HTML fragment and decode the common entities
fn html_text(fragment: &str) -> String {
    TAG_RE
        .replace_all(fragment, "")
        .replace("&amp;", "&")
        .replace("&#039;", "'")
        .replace("&quot;", "\"")
        .trim()
        .to_string()
}

/// Scraper for weekly Billboard Hot 100 chart pages
pub struct BillboardClient {
    agent: Agent,
    base_url: String,
}

impl BillboardClient {
    pub fn new(config: &Config) -> Self {
        BillboardClient {
            agent: Agent::new(),
            base_url: config.billboard_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch and parse the chart page for one week-start date
    pub fn fetch_week(&self, date: &str) -> Result<ChartWeek> {
        let url = format!("{}/{}", self.base_url, date);
        let response = self
            .agent
            .get(&url)
            .call()
            .map_err(|e| anyhow::anyhow!("chart request for {} failed: {}", date, e))?;
        let html = response.into_string()?;

        let titles: Vec<String> = TITLE_RE
            .captures_iter(&html)
            .map(|c| html_text(&c[1]))
            .collect();
        let artists: Vec<String> = ARTIST_RE
            .captures_iter(&html)
            .map(|c| html_text(&c[1]))
            .collect();

        // The page carries its own date, which can differ from the
        // requested one when Billboard realigns week boundaries
        let page_date = DATE_RE
            .captures(&html)
            .map(|c| html_text(&c[1]))
            .and_then(|text| NaiveDate::parse_from_str(&text, "%B %d, %Y").ok())
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| date.to_string());

        let entries = titles
            .into_iter()
            .zip(artists)
            .enumerate()
            .map(|(i, (title, artist))| ChartEntry {
                rank: i as u32 + 1,
                title,
                artist,
            })
            .collect();

        Ok(ChartWeek {
            date: page_date,
            entries,
        })
    }

    /// Walk weekly chart pages from `start` up to the present, advancing the
    /// cursor by seven days and realigning it whenever the page reports a
    /// different week than the one requested.
    pub fn fetch_weeks_from(&self, start: NaiveDate) -> Result<Vec<ChartWeek>> {
        let mut weeks = Vec::new();
        let mut cursor = start;
        let today = Utc::now().date_naive();
        let mut consecutive_failures = 0u32;
        let mut total_retries = 0u32;
        let mut date_changes = 0u32;

        while cursor < today + Duration::days(7) {
            let date = cursor.format("%Y-%m-%d").to_string();
            println!("Getting songs for {date}...");

            let week = match self.fetch_week(&date) {
                Ok(week) => week,
                Err(e) => {
                    consecutive_failures += 1;
                    total_retries += 1;
                    if consecutive_failures > 3 {
                        return Err(e).context("too many failed chart requests in a row");
                    }
                    println!("  Request failed ({e}). Retrying...");
                    continue;
                }
            };
            consecutive_failures = 0;

            if week.date != date {
                println!("  Date mismatch. Changing date to {}...", week.date);
                date_changes += 1;
                cursor = NaiveDate::parse_from_str(&week.date, "%Y-%m-%d")
                    .with_context(|| format!("bad date '{}' on chart page", week.date))?;
            }

            if week.entries.is_empty() {
                println!("  Warning: no chart entries found for {}", week.date);
            }

            weeks.push(week);
            cursor += Duration::days(7);
        }

        println!(
            "Chart scrape done: {} weeks, {} retries, {} date mismatches.",
            weeks.len(),
            total_retries,
            date_changes
        );
        Ok(weeks)
    }
}

/// Client for the Genius search API and its public lyric pages
pub struct GeniusClient {
    agent: Agent,
    api_url: String,
    page_url: String,
    token: String,
}

impl GeniusClient {
    pub fn new(config: &Config, token: String) -> Self {
        GeniusClient {
            agent: Agent::new(),
            api_url: config.genius_api_url.trim_end_matches('/').to_string(),
            page_url: config.genius_page_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    /// Look up the lyrics for one song, trying progressively looser search
    /// queries. `Ok(None)` means no acceptable hit was found.
    pub fn fetch_lyrics(&self, title: &str, artist: &str) -> Result<Option<String>> {
        match self.find_song(title, artist)? {
            Some(result) => {
                let lyrics = self.lyrics_for_api_path(&result.api_path)?;
                Ok(Some(lyrics))
            }
            None => Ok(None),
        }
    }

    /// The original search fallback chain: plain title, title plus artist,
    /// title without parentheticals, then title and artist each truncated
    /// before joining words ("and", "&", "with").
    fn find_song(&self, title: &str, artist: &str) -> Result<Option<GeniusResult>> {
        if let Some(hit) = self.search_match(title, artist)? {
            return Ok(Some(hit));
        }
        if let Some(hit) = self.search_match(&format!("{title} {artist}"), artist)? {
            return Ok(Some(hit));
        }

        if title.contains('(') {
            let stripped = SONG_PARENS_RE.replace_all(title, "").trim().to_string();
            if let Some(hit) = self.search_match(&format!("{stripped} {artist}"), artist)? {
                return Ok(Some(hit));
            }
        }

        for joiner in ["and", "&", "with"] {
            if let Some(prefix) = split_before(title, joiner) {
                if let Some(hit) = self.search_match(&format!("{prefix} {artist}"), artist)? {
                    return Ok(Some(hit));
                }
            }
        }
        for joiner in ["and", "&", "with"] {
            if let Some(prefix) = split_before(artist, joiner) {
                if let Some(hit) = self.search_match(&format!("{title} {prefix}"), &prefix)? {
                    return Ok(Some(hit));
                }
            }
        }

        println!("Unable to find '{title}' by {artist}");
        Ok(None)
    }

    /// Run one search query and pick the first hit whose primary artist
    /// matches: exact, or contained in the chart artist (or vice versa)
    fn search_match(&self, query: &str, artist: &str) -> Result<Option<GeniusResult>> {
        let query = clean_query(query);
        let url = format!("{}/search?q={}", self.api_url, encode(&query));
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .call()
            .map_err(|e| anyhow::anyhow!("Genius search failed: {}", e))?;
        let parsed: GeniusSearchResponse = serde_json::from_str(&response.into_string()?)
            .context("failed to parse Genius search response")?;

        for hit in parsed.response.hits {
            let hit_artist = &hit.result.primary_artist.name;
            let matched = hit_artist == artist
                || (hit_artist.len() <= artist.len() && artist.contains(hit_artist.as_str()))
                || hit_artist.contains(artist);
            if matched {
                return Ok(Some(hit.result));
            }
        }
        Ok(None)
    }

    /// Resolve a song's public page path through the API, then scrape the
    /// lyrics div from the page itself
    fn lyrics_for_api_path(&self, api_path: &str) -> Result<String> {
        let url = format!("{}{}", self.api_url, api_path);
        let response = self
            .agent
            .get(&url)
            .set("Authorization", &format!("Bearer {}", self.token))
            .call()
            .map_err(|e| anyhow::anyhow!("Genius song request failed: {}", e))?;
        let parsed: GeniusSongResponse = serde_json::from_str(&response.into_string()?)
            .context("failed to parse Genius song response")?;

        let page_url = format!("{}{}", self.page_url, parsed.response.song.path);
        let page = self
            .agent
            .get(&page_url)
            .call()
            .map_err(|e| anyhow::anyhow!("lyrics page request failed: {}", e))?;
        let html = page.into_string()?;

        let fragment = LYRICS_DIV_RE
            .captures(&html)
            .map(|c| c[1].to_string())
            .with_context(|| format!("no lyrics div on {page_url}"))?;
        Ok(html_text(&fragment))
    }
}

/// Everything before the first occurrence of a joining word, lowercased,
/// or `None` when the joiner does not appear
fn split_before(text: &str, joiner: &str) -> Option<String> {
    let lowered = text.to_lowercase();
    let prefix = lowered.split(joiner).next()?;
    if prefix.len() < lowered.len() {
        Some(prefix.trim().to_string())
    } else {
        None
    }
}

/// Keep only letters, spaces and apostrophes in a search query
fn clean_query(query: &str) -> String {
    query
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || *c == ' ' || *c == '\'')
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_query_keeps_letters_spaces_apostrophes() {
        assert_eq!(clean_query("Ain't 2 Proud 2 Beg!"), "Ain't  Proud  Beg");
    }

    #[test]
    fn split_before_cuts_at_joining_word() {
        assert_eq!(
            split_before("Sonny and Cher", "and"),
            Some("sonny".to_string())
        );
        assert_eq!(split_before("Cher", "and"), None);
    }

    #[test]
    fn html_text_strips_tags_and_entities() {
        assert_eq!(
            html_text(" <b>Tom &amp; Jerry</b> "),
            "Tom & Jerry"
        );
    }
}
