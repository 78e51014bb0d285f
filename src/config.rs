// Run configuration: command-line flags (with environment fallbacks) are
// parsed by clap, then resolved into a `Config` the rest of the crate uses.

use anyhow::Result;
use clap::Parser;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ScraperError;

pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/youtube/v3";
pub const DEFAULT_CAPTION_BASE_URL: &str = "https://www.youtube.com";

/// File in the home directory that may hold the API key.
pub const KEY_FILE_NAME: &str = ".yt_genre_scraper_key";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "yt-genre-scraper",
    version,
    about = "Collect metadata for the most viewed videos of a genre into a CSV file"
)]
pub struct Args {
    /// Search term used as the genre
    #[arg(long, default_value = "gaming")]
    pub genre: String,

    /// Maximum number of videos to collect
    #[arg(long, default_value_t = 500)]
    pub max_results: usize,

    /// Data API developer key
    #[arg(long, env = "YOUTUBE_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Region used for the category name lookup
    #[arg(long, default_value = "US")]
    pub region: String,

    /// Directory the CSV file is written to
    #[arg(long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Fixed pause between API requests, in milliseconds
    #[arg(long, default_value_t = 500)]
    pub delay_ms: u64,

    /// Caption language to request
    #[arg(long, default_value = "en")]
    pub caption_lang: String,

    /// Skip caption download
    #[arg(long)]
    pub no_captions: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_base_url: String,
    pub caption_base_url: String,
    pub caption_lang: String,
    pub genre: String,
    pub max_results: usize,
    pub region_code: String,
    pub output_dir: PathBuf,
    pub request_delay: Duration,
    pub fetch_captions: bool,
}

impl Config {
    /// Build the config from parsed arguments. `api_key` is the key already
    /// resolved by the caller (see `resolve_api_key`). Endpoints come from
    /// `YOUTUBE_API_BASE_URL` / `YOUTUBE_CAPTION_BASE_URL` when set.
    pub fn from_args(args: &Args, api_key: String) -> Self {
        let api_base_url =
            env::var("YOUTUBE_API_BASE_URL").unwrap_or_else(|_| DEFAULT_API_BASE_URL.into());
        let caption_base_url = env::var("YOUTUBE_CAPTION_BASE_URL")
            .unwrap_or_else(|_| DEFAULT_CAPTION_BASE_URL.into());

        Config {
            api_key,
            api_base_url,
            caption_base_url,
            caption_lang: args.caption_lang.clone(),
            genre: args.genre.clone(),
            max_results: args.max_results,
            region_code: args.region.clone(),
            output_dir: args.output_dir.clone(),
            request_delay: Duration::from_millis(args.delay_ms),
            fetch_captions: !args.no_captions,
        }
    }
}

/// Look for a key given on the command line / environment, then in the
/// key file under `home` (normally `dirs::home_dir()`). Falls back to
/// `prompt` (which may decline by returning `Ok(None)`) before giving up.
pub fn resolve_api_key<F>(args: &Args, home: Option<&Path>, prompt: F) -> Result<String>
where
    F: FnOnce() -> Result<Option<String>>,
{
    if let Some(key) = args.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) {
        return Ok(key.to_string());
    }
    if let Some(key) = home.and_then(load_key_file) {
        return Ok(key);
    }
    match prompt()? {
        Some(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
        _ => Err(ScraperError::MissingApiKey(KEY_FILE_NAME).into()),
    }
}

pub fn key_file_path(home: &Path) -> PathBuf {
    home.join(KEY_FILE_NAME)
}

fn load_key_file(home: &Path) -> Option<String> {
    let data = std::fs::read_to_string(key_file_path(home)).ok()?;
    let key = data.trim();
    (!key.is_empty()).then(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_reproduce_plain_gaming_run() {
        let args = Args::parse_from(["yt-genre-scraper"]);
        assert_eq!(args.genre, "gaming");
        assert_eq!(args.max_results, 500);
        assert_eq!(args.region, "US");
        assert_eq!(args.delay_ms, 500);
        assert!(!args.no_captions);

        let config = Config::from_args(&args, "k".into());
        assert_eq!(config.request_delay, Duration::from_millis(500));
        assert!(config.fetch_captions);
        assert_eq!(config.output_dir, PathBuf::from("."));
    }

    #[test]
    fn flags_override_defaults() {
        let args = Args::parse_from([
            "yt-genre-scraper",
            "--genre",
            "lo-fi beats",
            "--max-results",
            "120",
            "--no-captions",
            "--delay-ms",
            "0",
        ]);
        let config = Config::from_args(&args, "k".into());
        assert_eq!(config.genre, "lo-fi beats");
        assert_eq!(config.max_results, 120);
        assert!(!config.fetch_captions);
        assert_eq!(config.request_delay, Duration::ZERO);
    }

    fn args_with_key(key: Option<&str>) -> Args {
        let mut args = Args::parse_from(["yt-genre-scraper"]);
        args.api_key = key.map(String::from);
        args
    }

    #[test]
    fn explicit_key_wins_over_prompt() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(key_file_path(home.path()), "from-file\n").unwrap();
        let args = args_with_key(Some("  from-flag "));
        let key = resolve_api_key(&args, Some(home.path()), || panic!("prompt should not run"))
            .unwrap();
        assert_eq!(key, "from-flag");
    }

    #[test]
    fn key_file_is_used_before_prompt() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(key_file_path(home.path()), "  from-file\n").unwrap();
        let args = args_with_key(None);
        let key = resolve_api_key(&args, Some(home.path()), || panic!("prompt should not run"))
            .unwrap();
        assert_eq!(key, "from-file");
    }

    #[test]
    fn blank_flag_and_empty_key_file_fall_through_to_prompt() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(key_file_path(home.path()), "   \n").unwrap();
        let args = args_with_key(Some("   "));
        let key = resolve_api_key(&args, Some(home.path()), || Ok(Some(" typed ".into()))).unwrap();
        assert_eq!(key, "typed");
    }

    #[test]
    fn declined_or_empty_prompt_is_missing_key() {
        let home = tempfile::tempdir().unwrap();
        let args = args_with_key(None);

        for answer in [None, Some("  ".to_string())] {
            let err = resolve_api_key(&args, Some(home.path()), || Ok(answer)).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<ScraperError>(),
                Some(ScraperError::MissingApiKey(_))
            ));
        }

        let err = resolve_api_key(&args, None, || Ok(None)).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ScraperError>(),
            Some(ScraperError::MissingApiKey(_))
        ));
    }
}
