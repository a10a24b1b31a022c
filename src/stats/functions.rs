use crate::models::ChartWeek;
use crate::stats::binning::{bin_by_timeframe, BinnedLyrics, Timeframe, TimeframeBin};
use crate::stats::catalog::LyricCatalog;
use crate::stats::table::{Cell, StatsTable};
use anyhow::{ensure, Result};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};

/// The ASCII punctuation characters counted by [`count_punctuation`],
/// one table row each
pub const PUNCTUATION: &str = r##"!"#$%&'()*+,-./:;<=>?@[\]^_`{|}~"##;

/// Words excluded from the top-N ranking when the caller does not supply
/// an omit list of their own
pub const DEFAULT_OMIT_WORDS: [&str; 9] =
    ["i", "and", "she", "he", "that", "this", "a", "they", "you"];

/// Input to a statistic function. Raw mode runs the binner first; binned
/// mode reuses an existing [`BinnedLyrics`], which is the cheap path when
/// several statistics are computed over the same bins.
pub enum StatsSource<'a> {
    Binned(&'a BinnedLyrics),
    Raw {
        weeks: &'a [ChartWeek],
        catalog: &'a LyricCatalog,
        timeframe: Timeframe,
    },
}

/// Resolve the input mode once: obtain the bin sequence, create the result
/// table from the bin labels when none was supplied, and check that every
/// column of a supplied table matches a bin label. The column check is a
/// usage precondition and fails before any row is appended.
fn resolve<'a>(
    source: StatsSource<'a>,
    table: Option<StatsTable>,
) -> Result<(Cow<'a, BinnedLyrics>, StatsTable)> {
    let binned = match source {
        StatsSource::Binned(binned) => Cow::Borrowed(binned),
        StatsSource::Raw {
            weeks,
            catalog,
            timeframe,
        } => Cow::Owned(bin_by_timeframe(weeks, catalog, timeframe)),
    };
    let table = table.unwrap_or_else(|| StatsTable::with_columns(binned.labels()));
    for column in table.columns() {
        ensure!(
            binned.has_label(column),
            "table column '{column}' has no matching timeframe bin"
        );
    }
    Ok((binned, table))
}

/// Bins backing each table column. When the columns are exactly the bin
/// labels in order (the fresh-table case) the bins are used positionally,
/// which keeps duplicate labels distinct; otherwise each column resolves to
/// the first bin carrying its label.
fn column_bins<'b>(binned: &'b BinnedLyrics, table: &StatsTable) -> Vec<&'b TimeframeBin> {
    let labels = binned.labels();
    if table.columns() == labels.as_slice() {
        return binned.bins().iter().collect();
    }
    table
        .columns()
        .iter()
        .map(|column| {
            binned
                .bins()
                .iter()
                .find(|bin| bin.label == *column)
                .unwrap_or_else(|| unreachable!("column checked against bin labels in resolve"))
        })
        .collect()
}

/// Append a `Num_Newlines` row: `\n` count in each bin's lyric text
pub fn count_newlines(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Count(bin.lyrics.matches('\n').count()))
        .collect();
    table.push_row("Num_Newlines", cells)?;
    Ok(table)
}

/// Append a `Num_Brackets` row: bracketed fragments per bin
pub fn count_brackets(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Count(bin.brackets.len()))
        .collect();
    table.push_row("Num_Brackets", cells)?;
    Ok(table)
}

/// Append a `Num_Parentheticals` row: parenthetical fragments per bin
pub fn count_parens(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Count(bin.parens.len()))
        .collect();
    table.push_row("Num_Parentheticals", cells)?;
    Ok(table)
}

/// Append one `Counted_<c>` row per ASCII punctuation character with its
/// occurrence count in each bin's lyric text
pub fn count_punctuation(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let histograms: Vec<HashMap<char, usize>> = column_bins(&binned, &table)
        .iter()
        .map(|bin| {
            let mut counts = HashMap::new();
            for c in bin.lyrics.chars().filter(char::is_ascii_punctuation) {
                *counts.entry(c).or_insert(0) += 1;
            }
            counts
        })
        .collect();
    for punct in PUNCTUATION.chars() {
        let cells = histograms
            .iter()
            .map(|counts| Cell::Count(counts.get(&punct).copied().unwrap_or(0)))
            .collect();
        table.push_row(format!("Counted_{punct}"), cells)?;
    }
    Ok(table)
}

/// Word lengths for one bin, over the distinct-word set or all occurrences
fn word_lengths(bin: &TimeframeBin, unique: bool) -> Vec<usize> {
    if unique {
        bin.words
            .iter()
            .collect::<HashSet<_>>()
            .iter()
            .map(|word| word.chars().count())
            .collect()
    } else {
        bin.words.iter().map(|word| word.chars().count()).collect()
    }
}

fn mean(values: &[usize]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<usize>() as f64 / values.len() as f64
}

fn median(values: &[usize]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) as f64 / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Population variance, matching the aggregate's mathematical meaning:
/// no data, no variance (NaN)
fn variance(values: &[usize]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let avg = mean(values);
    values
        .iter()
        .map(|&v| {
            let diff = v as f64 - avg;
            diff * diff
        })
        .sum::<f64>()
        / values.len() as f64
}

/// Append an `Avg_Word_Len` row: mean word length per bin, over distinct
/// words when `unique` is set. NaN for bins with no words.
pub fn avg_wrd_len(
    source: StatsSource,
    table: Option<StatsTable>,
    unique: bool,
) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Number(mean(&word_lengths(bin, unique))))
        .collect();
    table.push_row("Avg_Word_Len", cells)?;
    Ok(table)
}

/// Append a `Median_Word_Len` row, NaN for bins with no words
pub fn median_wrd_len(
    source: StatsSource,
    table: Option<StatsTable>,
    unique: bool,
) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Number(median(&word_lengths(bin, unique))))
        .collect();
    table.push_row("Median_Word_Len", cells)?;
    Ok(table)
}

/// Append a `Variance_word_length` row, NaN for bins with no words
pub fn variance_words(
    source: StatsSource,
    table: Option<StatsTable>,
    unique: bool,
) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Number(variance(&word_lengths(bin, unique))))
        .collect();
    table.push_row("Variance_word_length", cells)?;
    Ok(table)
}

/// Append a `Num_unique_words` row: distinct-token count per bin (0 for an
/// empty bin, never an error)
pub fn num_unique_words(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| Cell::Count(bin.words.iter().collect::<HashSet<_>>().len()))
        .collect();
    table.push_row("Num_unique_words", cells)?;
    Ok(table)
}

/// Occurrence counts in first-encounter order. The stable sort keeps ties
/// resolved to the word seen first in the bin's word list.
fn ranked_counts<'w>(words: &'w [String], omit: &HashSet<&str>) -> Vec<(&'w str, usize)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for word in words {
        let word = word.as_str();
        if omit.contains(word) {
            continue;
        }
        let count = counts.entry(word).or_insert(0);
        if *count == 0 {
            order.push(word);
        }
        *count += 1;
    }
    let mut ranked: Vec<(&str, usize)> = order
        .into_iter()
        .map(|word| (word, counts[word]))
        .collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Append top-N repeated-word rows, or exact counts for tracked words.
///
/// Tracked-word mode takes precedence: when `track_words` is non-empty, one
/// `tracked_words: <w>` row is appended per tracked word (count 0 where the
/// word never occurs) and `num_words`/`omit_words` are ignored. Otherwise
/// `num_words` rows `<i>_most_repeated_words` are appended with
/// `(word, count)` cells, after removing the omit list. Every bin must
/// retain at least `num_words` distinct words, anything less is a usage
/// error.
pub fn sort_word_len(
    source: StatsSource,
    table: Option<StatsTable>,
    num_words: usize,
    track_words: &[String],
    omit_words: &[String],
) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let bins = column_bins(&binned, &table);

    if !track_words.is_empty() {
        let counted: Vec<HashMap<&str, usize>> = bins
            .iter()
            .map(|bin| {
                let mut counts = HashMap::new();
                for word in &bin.words {
                    *counts.entry(word.as_str()).or_insert(0) += 1;
                }
                counts
            })
            .collect();
        for word in track_words {
            let cells = counted
                .iter()
                .map(|counts| Cell::Count(counts.get(word.as_str()).copied().unwrap_or(0)))
                .collect();
            table.push_row(format!("tracked_words: {word}"), cells)?;
        }
        return Ok(table);
    }

    let omit: HashSet<&str> = omit_words.iter().map(String::as_str).collect();
    let mut ranked_per_bin = Vec::with_capacity(bins.len());
    for bin in &bins {
        let ranked = ranked_counts(&bin.words, &omit);
        ensure!(
            ranked.len() >= num_words,
            "bin '{}' has only {} distinct words after omission, {} requested",
            bin.label,
            ranked.len(),
            num_words
        );
        ranked_per_bin.push(ranked);
    }
    for i in 0..num_words {
        let cells = ranked_per_bin
            .iter()
            .map(|ranked| {
                let (word, count) = ranked[i];
                Cell::Entry(word.to_string(), count)
            })
            .collect();
        table.push_row(format!("{}_most_repeated_words", i + 1), cells)?;
    }
    Ok(table)
}

/// Append `num_songs` rows `<i>_most_repeated_songs` ranking
/// `"title, artist"` strings by chart appearances within each bin
pub fn num_song_repeats(
    source: StatsSource,
    table: Option<StatsTable>,
    num_songs: usize,
) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let bins = column_bins(&binned, &table);

    let mut ranked_per_bin = Vec::with_capacity(bins.len());
    for bin in &bins {
        let flattened: Vec<String> = bin
            .titles_artists
            .iter()
            .map(|(title, artist)| format!("{title}, {artist}"))
            .collect();
        let ranked: Vec<(String, usize)> = ranked_counts(&flattened, &HashSet::new())
            .into_iter()
            .map(|(song, count)| (song.to_string(), count))
            .collect();
        ensure!(
            ranked.len() >= num_songs,
            "bin '{}' has only {} distinct songs, {} requested",
            bin.label,
            ranked.len(),
            num_songs
        );
        ranked_per_bin.push(ranked);
    }
    for i in 0..num_songs {
        let cells = ranked_per_bin
            .iter()
            .map(|ranked| {
                let (song, count) = &ranked[i];
                Cell::Entry(song.clone(), *count)
            })
            .collect();
        table.push_row(format!("{}_most_repeated_songs", i + 1), cells)?;
    }
    Ok(table)
}

/// Append an `Avg_title_length` row: mean title character length per bin,
/// NaN for bins with no matched songs
pub fn avg_title_len(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| {
            let lengths: Vec<usize> = bin
                .titles_artists
                .iter()
                .map(|(title, _)| title.chars().count())
                .collect();
            Cell::Number(mean(&lengths))
        })
        .collect();
    table.push_row("Avg_title_length", cells)?;
    Ok(table)
}

/// Append an `Avg_artist_name_length` row: mean artist-name character
/// length per bin, NaN for bins with no matched songs
pub fn avg_artist_len(source: StatsSource, table: Option<StatsTable>) -> Result<StatsTable> {
    let (binned, mut table) = resolve(source, table)?;
    let cells = column_bins(&binned, &table)
        .iter()
        .map(|bin| {
            let lengths: Vec<usize> = bin
                .titles_artists
                .iter()
                .map(|(_, artist)| artist.chars().count())
                .collect();
            Cell::Number(mean(&lengths))
        })
        .collect();
    table.push_row("Avg_artist_name_length", cells)?;
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn mean_median_variance_basics() {
        let values = [1usize, 2, 3, 4];
        assert_relative_eq!(mean(&values), 2.5);
        assert_relative_eq!(median(&values), 2.5);
        assert_relative_eq!(variance(&values), 1.25);
        assert_relative_eq!(median(&[1, 2, 3]), 2.0);
    }

    #[test]
    fn empty_inputs_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
        assert!(variance(&[]).is_nan());
    }

    #[test]
    fn ranked_counts_break_ties_by_first_encounter() {
        let words: Vec<String> = ["b", "a", "a", "b", "c"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        let ranked = ranked_counts(&words, &HashSet::new());
        // a and b both occur twice, b was seen first
        assert_eq!(ranked[0], ("b", 2));
        assert_eq!(ranked[1], ("a", 2));
        assert_eq!(ranked[2], ("c", 1));
    }

    #[test]
    fn ranked_counts_skip_omitted_words() {
        let words: Vec<String> = ["the", "the", "love"].iter().map(|w| w.to_string()).collect();
        let omit: HashSet<&str> = ["the"].into_iter().collect();
        assert_eq!(ranked_counts(&words, &omit), vec![("love", 1)]);
    }
}
