// Library root
// -----------
// The binary (`main.rs`) only parses flags, sets up logging and hands a
// configured client to `scraper::run`.
//
// Module responsibilities:
// - `api`: blocking HTTP client for the Data API endpoints and captions,
//   behind the `YouTubeApi` trait so the run can be driven by a fake.
// - `captions`: timed-text XML to plain caption text.
// - `record`: one detail item flattened into a CSV row.
// - `output`: file naming and CSV writing.
// - `scraper`: the search / detail / save flow.
// - `config`, `ui`, `error`: flags, terminal output, error types.
pub mod api;
pub mod captions;
pub mod config;
pub mod error;
pub mod output;
pub mod record;
pub mod scraper;
pub mod ui;

pub use api::{ApiClient, YouTubeApi};
pub use config::Config;
pub use error::ScraperError;
pub use record::VideoRecord;
pub use scraper::{ScrapeSettings, Scraper};
