use crate::models::{ChartWeek, SongKey};
use crate::stats::catalog::LyricCatalog;
use clap::ValueEnum;

/// Period granularity used to group chart snapshots
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Timeframe {
    /// One bin per chart snapshot, labeled by the full date
    Week,
    /// Bins labeled `YYYY-MM`
    Month,
    /// Bins labeled `YYYY`
    Year,
    /// Bins labeled by the first three characters of the year plus `0s`
    Decade,
}

impl Timeframe {
    /// Number of dash-separated date components kept in the bin label
    fn date_components(self) -> usize {
        match self {
            Timeframe::Year | Timeframe::Decade => 1,
            Timeframe::Month => 2,
            Timeframe::Week => 3,
        }
    }

    /// Derive the bin label for a `YYYY-MM-DD` date string.
    ///
    /// Decade labels keep the first three characters of the year label and
    /// append `0s`. That only makes sense for 4-digit years; anything else
    /// produces a nonsense label, which matches the behavior this tool has
    /// always had for its 1958-onward dataset.
    pub fn label_for(self, date: &str) -> String {
        let label = date
            .split('-')
            .take(self.date_components())
            .collect::<Vec<_>>()
            .join("-");
        if self == Timeframe::Decade {
            let prefix: String = label.chars().take(3).collect();
            format!("{prefix}0s")
        } else {
            label
        }
    }
}

/// Aggregate record for one timeframe period
#[derive(Debug, Clone, Default)]
pub struct TimeframeBin {
    /// Derived period label, e.g. `1967-03`
    pub label: String,
    /// Number of chart entries with a matching lyric record
    pub num_songs: usize,
    /// `(title, artist)` pairs in chart order
    pub titles_artists: Vec<SongKey>,
    /// All matched lyric bodies concatenated in chart order
    pub lyrics: String,
    /// Lowercased, punctuation-stripped tokens in concatenation order
    pub words: Vec<String>,
    /// Per-song distinct-word counts, one per matched song
    pub unique_words: Vec<usize>,
    /// Parenthetical fragments accumulated across the bin's songs
    pub parens: Vec<String>,
    /// Bracketed fragments accumulated across the bin's songs
    pub brackets: Vec<String>,
}

impl TimeframeBin {
    fn new(label: String) -> Self {
        TimeframeBin {
            label,
            ..TimeframeBin::default()
        }
    }
}

/// Chart snapshots grouped into timeframe bins, in first-seen label order.
///
/// Bins are kept as a sequence rather than a map: a new bin opens whenever
/// the derived label changes between consecutive snapshots, so an input that
/// revisits an earlier label produces a second bin with the same label
/// instead of merging into the first.
#[derive(Debug, Clone, Default)]
pub struct BinnedLyrics {
    bins: Vec<TimeframeBin>,
}

impl BinnedLyrics {
    pub fn bins(&self) -> &[TimeframeBin] {
        &self.bins
    }

    /// Bin labels in construction order
    pub fn labels(&self) -> Vec<String> {
        self.bins.iter().map(|b| b.label.clone()).collect()
    }

    pub fn has_label(&self, label: &str) -> bool {
        self.bins.iter().any(|b| b.label == label)
    }
}

/// Split a lyric body into lowercase words with ASCII punctuation stripped
/// and newlines treated as spaces
pub fn tokenize(text: &str) -> Vec<String> {
    text.chars()
        .filter(|c| !c.is_ascii_punctuation())
        .collect::<String>()
        .to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Group chronological chart snapshots into timeframe bins, joining each
/// ranked entry against the lyric catalog.
///
/// Entries without a catalog record are skipped; they are expected misses,
/// not errors. Bins close exactly when the derived label changes from the
/// previous snapshot's label.
pub fn bin_by_timeframe(
    weeks: &[ChartWeek],
    catalog: &LyricCatalog,
    timeframe: Timeframe,
) -> BinnedLyrics {
    let mut bins: Vec<TimeframeBin> = Vec::new();

    for week in weeks {
        let label = timeframe.label_for(&week.date);
        let open_new = match bins.last() {
            Some(bin) => bin.label != label,
            None => true,
        };
        if open_new {
            bins.push(TimeframeBin::new(label));
        }
        // Unwrap is safe, a bin was just pushed if none was open
        let bin = bins.last_mut().unwrap();

        for entry in &week.entries {
            let Some(record) = catalog.get(&entry.key()) else {
                continue;
            };
            bin.num_songs += 1;
            bin.titles_artists.push(entry.key());
            bin.lyrics.push_str(&record.text);
            let song_words = tokenize(&record.text);
            bin.unique_words.push(distinct_count(&song_words));
            bin.words.extend(song_words);
            bin.parens.extend(record.parens.iter().cloned());
            bin.brackets.extend(record.brackets.iter().cloned());
        }
    }

    BinnedLyrics { bins }
}

fn distinct_count(words: &[String]) -> usize {
    words
        .iter()
        .collect::<std::collections::HashSet<_>>()
        .len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChartEntry, RawLyric};

    fn week(date: &str, songs: &[(&str, &str)]) -> ChartWeek {
        ChartWeek {
            date: date.to_string(),
            entries: songs
                .iter()
                .enumerate()
                .map(|(i, (title, artist))| ChartEntry {
                    rank: i as u32 + 1,
                    title: title.to_string(),
                    artist: artist.to_string(),
                })
                .collect(),
        }
    }

    fn catalog(songs: &[(&str, &str, &str)]) -> LyricCatalog {
        let raw: Vec<RawLyric> = songs
            .iter()
            .map(|(title, artist, lyrics)| RawLyric {
                title: title.to_string(),
                artist: artist.to_string(),
                lyrics: Some(lyrics.to_string()),
            })
            .collect();
        LyricCatalog::from_raw(&raw)
    }

    #[test]
    fn label_derivation_per_granularity() {
        assert_eq!(Timeframe::Week.label_for("1967-03-11"), "1967-03-11");
        assert_eq!(Timeframe::Month.label_for("1967-03-11"), "1967-03");
        assert_eq!(Timeframe::Year.label_for("1967-03-11"), "1967");
        assert_eq!(Timeframe::Decade.label_for("1967-03-11"), "1960s");
    }

    #[test]
    fn year_labels_follow_first_occurrence_order() {
        let weeks = vec![
            week("1967-12-25", &[]),
            week("1968-01-01", &[]),
            week("1968-01-08", &[]),
            week("1969-02-01", &[]),
        ];
        let binned = bin_by_timeframe(&weeks, &LyricCatalog::default(), Timeframe::Year);
        assert_eq!(binned.labels(), vec!["1967", "1968", "1969"]);
    }

    #[test]
    fn month_binning_splits_on_label_change() {
        let cat = catalog(&[("La Song", "Band", "la la (yeah) [chorus]")]);
        let weeks = vec![
            week("1967-01-01", &[("La Song", "Band")]),
            week("1967-02-05", &[("La Song", "Band")]),
        ];
        let binned = bin_by_timeframe(&weeks, &cat, Timeframe::Month);

        assert_eq!(binned.labels(), vec!["1967-01", "1967-02"]);
        for bin in binned.bins() {
            assert_eq!(bin.num_songs, 1);
            assert_eq!(bin.words, vec!["la", "la"]);
            assert_eq!(bin.unique_words, vec![1]);
            assert_eq!(bin.parens, vec!["yeah"]);
            assert_eq!(bin.brackets, vec!["chorus"]);
        }
    }

    #[test]
    fn revisited_label_opens_a_duplicate_bin() {
        let weeks = vec![
            week("1967-01-01", &[]),
            week("1968-01-01", &[]),
            week("1967-06-01", &[]),
        ];
        let binned = bin_by_timeframe(&weeks, &LyricCatalog::default(), Timeframe::Year);
        assert_eq!(binned.labels(), vec!["1967", "1968", "1967"]);
    }

    #[test]
    fn uncataloged_songs_are_skipped_silently() {
        let cat = catalog(&[("Known", "Band", "hello world")]);
        let weeks = vec![week(
            "1967-01-01",
            &[("Known", "Band"), ("Unknown", "Nobody")],
        )];
        let binned = bin_by_timeframe(&weeks, &cat, Timeframe::Year);

        let bin = &binned.bins()[0];
        assert_eq!(bin.num_songs, 1);
        assert_eq!(
            bin.titles_artists,
            vec![("Known".to_string(), "Band".to_string())]
        );
    }

    #[test]
    fn lyric_text_concatenates_in_chart_order() {
        let cat = catalog(&[("A", "X", "first "), ("B", "Y", "second")]);
        let weeks = vec![week("1967-01-01", &[("A", "X"), ("B", "Y")])];
        let binned = bin_by_timeframe(&weeks, &cat, Timeframe::Year);
        assert_eq!(binned.bins()[0].lyrics, "first second");
    }

    #[test]
    fn tokenize_strips_punctuation_and_lowercases() {
        assert_eq!(
            tokenize("Don't stop\nBelievin'!"),
            vec!["dont", "stop", "believin"]
        );
    }
}
