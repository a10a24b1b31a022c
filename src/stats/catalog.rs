use crate::models::{RawLyric, SongKey};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};

lazy_static! {
    static ref PARENS_RE: Regex = Regex::new(r"\((.*?)\)").unwrap();
    static ref BRACKETS_RE: Regex = Regex::new(r"\[(.*?)\]").unwrap();
}

/// A normalized lyric entry for one distinct song
#[derive(Debug, Clone)]
pub struct LyricRecord {
    /// Combined `"title, artist"` display label
    pub label: String,
    /// Lyric body with all parenthetical and bracketed content removed
    pub text: String,
    /// Parenthetical fragments in order of appearance
    pub parens: Vec<String>,
    /// Bracketed fragments in order of appearance
    pub brackets: Vec<String>,
}

/// Deduplicated lyric lookup keyed by `(title, artist)`
#[derive(Debug, Clone, Default)]
pub struct LyricCatalog {
    records: HashMap<SongKey, LyricRecord>,
    /// Songs whose lyric lookup failed upstream
    missing: HashSet<SongKey>,
}

impl LyricCatalog {
    /// Build the catalog from raw harvested triples.
    ///
    /// Triples with a lyric body become records; triples with a `None` body
    /// land in the missing set. A later duplicate `(title, artist)` key
    /// overwrites the earlier record.
    pub fn from_raw(raw: &[RawLyric]) -> Self {
        let mut records = HashMap::new();
        let mut missing = HashSet::new();

        for song in raw {
            match &song.lyrics {
                Some(body) => {
                    let parens: Vec<String> = PARENS_RE
                        .captures_iter(body)
                        .map(|c| c[1].to_string())
                        .collect();
                    let brackets: Vec<String> = BRACKETS_RE
                        .captures_iter(body)
                        .map(|c| c[1].to_string())
                        .collect();
                    let text = BRACKETS_RE
                        .replace_all(&PARENS_RE.replace_all(body, ""), "")
                        .into_owned();
                    records.insert(
                        song.key(),
                        LyricRecord {
                            label: format!("{}, {}", song.title, song.artist),
                            text,
                            parens,
                            brackets,
                        },
                    );
                }
                None => {
                    missing.insert(song.key());
                }
            }
        }

        LyricCatalog { records, missing }
    }

    pub fn get(&self, key: &SongKey) -> Option<&LyricRecord> {
        self.records.get(key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn missing(&self) -> &HashSet<SongKey> {
        &self.missing
    }
}
