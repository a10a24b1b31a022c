use anyhow::Result;

/// Configuration loaded from environment variables
#[derive(Debug)]
pub struct Config {
    /// Genius API bearer token, required only when fetching lyrics
    pub genius_token: Option<String>,
    pub genius_api_url: String,
    pub genius_page_url: String,
    pub billboard_url: String,
}

/// Load configuration from `.env` and environment
pub fn load_config() -> Result<Config> {
    // Load `.env` file if present
    dotenv::dotenv().ok();
    // The URLs have sane defaults
    let genius_token = std::env::var("GENIUS_TOKEN").ok();
    let genius_api_url = std::env::var("GENIUS_API_URL")
        .unwrap_or_else(|_| "https://api.genius.com".to_string());
    let genius_page_url = std::env::var("GENIUS_PAGE_URL")
        .unwrap_or_else(|_| "https://genius.com".to_string());
    let billboard_url = std::env::var("BILLBOARD_URL")
        .unwrap_or_else(|_| "https://www.billboard.com/charts/hot-100".to_string());
    Ok(Config {
        genius_token,
        genius_api_url,
        genius_page_url,
        billboard_url,
    })
}
