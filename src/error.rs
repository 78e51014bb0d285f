// Error types owned by this crate. Everything else (I/O, HTTP transport,
// JSON decoding) travels as `anyhow::Error` with context attached.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    /// The Data API answered with a non-success status.
    #[error("API request failed: {status} - {message}")]
    Api { status: u16, message: String },

    /// `save_to_csv` was called before any search recorded a genre.
    #[error("genre not set, run search_videos() first")]
    GenreNotSet,

    #[error("no API key: pass --api-key, set YOUTUBE_API_KEY or store one in ~/{0}")]
    MissingApiKey(&'static str),

    #[error("invalid ISO 8601 duration: {0}")]
    InvalidDuration(String),
}
