use anyhow::Result;
use chrono::NaiveDate;
use clap::Parser;

mod client;
mod config;
mod models;
mod stats;
mod store;


use crate::client::{BillboardClient, GeniusClient};
use crate::config::load_config;
use crate::models::RawLyric;
use crate::stats::{
    avg_artist_len, avg_title_len, avg_wrd_len, bin_by_timeframe, count_brackets,
    count_newlines, count_parens, count_punctuation, median_wrd_len, num_song_repeats,
    num_unique_words, sort_word_len, variance_words, LyricCatalog, StatsSource, Timeframe,
    DEFAULT_OMIT_WORDS,
};

#[derive(Parser)]
#[command(name = "chart-lyrics")]
#[command(about = "Billboard Hot 100 lyric statistics over time bins")]
#[command(version)]
struct Args {
    /// Path to the scraped chart data JSON file
    #[arg(long = "songs-file", default_value = "songs.json")]
    songs_file: String,

    /// Path to the harvested lyrics JSON file
    #[arg(long = "lyrics-file", default_value = "lyrics.json")]
    lyrics_file: String,

    /// Timeframe granularity for binning
    #[arg(short = 't', long = "timeframe", value_enum, default_value_t = Timeframe::Year)]
    timeframe: Timeframe,

    /// Scrape Billboard chart pages before computing statistics
    #[arg(long = "fetch-charts")]
    fetch_charts: bool,

    /// Fetch missing lyrics from the Genius API before computing statistics
    #[arg(long = "fetch-lyrics")]
    fetch_lyrics: bool,

    /// First chart week to scrape (the Hot 100 starts at 1958-08-04)
    #[arg(long = "start-date", default_value = "1958-08-04")]
    start_date: String,

    /// Number of most-repeated words to report per bin
    #[arg(long = "top-words", default_value_t = 3)]
    top_words: usize,

    /// Number of most-repeated songs to report per bin
    #[arg(long = "top-songs", default_value_t = 3)]
    top_songs: usize,

    /// Report exact counts for these words instead of the top-N ranking
    #[arg(long = "track-word")]
    track_words: Vec<String>,

    /// Words to exclude from the top-N ranking (defaults to common stop words)
    #[arg(long = "omit-word")]
    omit_words: Option<Vec<String>>,

    /// Compute word-length statistics over all occurrences instead of the
    /// distinct-word set
    #[arg(long = "all-occurrences")]
    all_occurrences: bool,

    /// Write the result table to this CSV file in addition to stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config()?;

    if args.fetch_charts {
        println!("Scraping Billboard Hot 100 charts from {}...", args.start_date);
        let start = NaiveDate::parse_from_str(&args.start_date, "%Y-%m-%d")
            .map_err(|e| anyhow::anyhow!("invalid start date '{}': {}", args.start_date, e))?;
        let client = BillboardClient::new(&config);
        let weeks = client.fetch_weeks_from(start)?;
        store::save_weeks(&args.songs_file, &weeks)?;
        println!("Saved {} chart weeks to {}", weeks.len(), args.songs_file);
    }

    // Chart data must exist by now, whether scraped or brought along
    if !std::path::Path::new(&args.songs_file).exists() {
        eprintln!("Error: chart data file '{}' not found.", args.songs_file);
        eprintln!("Run with --fetch-charts or point --songs-file at an existing file.");
        return Err(anyhow::anyhow!(
            "chart data file '{}' not found",
            args.songs_file
        ));
    }
    let weeks = store::load_weeks(&args.songs_file)?;
    println!("Loaded {} chart weeks from {}", weeks.len(), args.songs_file);

    if args.fetch_lyrics {
        let token = config.genius_token.clone().ok_or_else(|| {
            anyhow::anyhow!("GENIUS_TOKEN must be set in the environment to fetch lyrics")
        })?;
        let client = GeniusClient::new(&config, token);
        fetch_missing_lyrics(&client, &weeks, &args.lyrics_file)?;
    }

    let raw_lyrics = store::load_lyrics(&args.lyrics_file)?;
    let catalog = LyricCatalog::from_raw(&raw_lyrics);
    println!(
        "Lyric catalog: {} songs with lyrics, {} failed lookups",
        catalog.len(),
        catalog.missing().len()
    );

    // Bin once, reuse the result for every statistic
    let binned = bin_by_timeframe(&weeks, &catalog, args.timeframe);
    println!("Grouped into {} timeframe bins", binned.bins().len());

    let omit_words: Vec<String> = args.omit_words.unwrap_or_else(|| {
        DEFAULT_OMIT_WORDS.iter().map(|w| w.to_string()).collect()
    });
    let unique = !args.all_occurrences;

    let source = || StatsSource::Binned(&binned);
    let mut table = count_newlines(source(), None)?;
    table = count_brackets(source(), Some(table))?;
    table = count_parens(source(), Some(table))?;
    table = count_punctuation(source(), Some(table))?;
    table = avg_wrd_len(source(), Some(table), unique)?;
    table = median_wrd_len(source(), Some(table), unique)?;
    table = variance_words(source(), Some(table), unique)?;
    table = num_unique_words(source(), Some(table))?;
    if !args.track_words.is_empty() || args.top_words > 0 {
        table = sort_word_len(
            source(),
            Some(table),
            args.top_words,
            &args.track_words,
            &omit_words,
        )?;
    }
    if args.top_songs > 0 {
        table = num_song_repeats(source(), Some(table), args.top_songs)?;
    }
    table = avg_title_len(source(), Some(table))?;
    table = avg_artist_len(source(), Some(table))?;

    println!("\n=== LYRIC STATISTICS ({:?} bins) ===", args.timeframe);
    print!("{}", table.render());

    if let Some(path) = &args.output {
        std::fs::write(path, table.to_csv())?;
        println!("\nWrote CSV to {path}");
    }

    Ok(())
}

/// Fetch lyrics for every chart entry not yet in the harvest file, saving
/// progress after each week so an interrupted run can resume
fn fetch_missing_lyrics(
    client: &GeniusClient,
    weeks: &[crate::models::ChartWeek],
    lyrics_file: &str,
) -> Result<()> {
    let mut harvest = store::load_lyrics(lyrics_file)?;
    let mut seen = store::harvested_keys(&harvest);
    println!(
        "Fetching lyrics ({} songs already harvested)...",
        seen.len()
    );

    let mut hits = 0u32;
    let mut misses = 0u32;

    for (i, week) in weeks.iter().enumerate() {
        for entry in &week.entries {
            if seen.contains(&entry.key()) {
                continue;
            }
            seen.insert(entry.key());

            let lyrics = match client.fetch_lyrics(&entry.title, &entry.artist) {
                Ok(lyrics) => lyrics,
                Err(e) => {
                    eprintln!("  '{}' by {}: {}", entry.title, entry.artist, e);
                    None
                }
            };
            match &lyrics {
                Some(_) => hits += 1,
                None => misses += 1,
            }
            harvest.push(RawLyric {
                title: entry.title.clone(),
                artist: entry.artist.clone(),
                lyrics,
            });
        }

        store::save_lyrics(lyrics_file, &harvest)?;
        println!("{} / {} weeks harvested", i + 1, weeks.len());
    }

    println!("Lyric fetch done: {hits} found, {misses} missing.");
    Ok(())
}
