// The collection run: category mapping, paginated search, batched detail
// fetch, CSV save. Everything is sequential with a fixed pause between
// requests; a failing request is logged and skipped, never retried.

use anyhow::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::api::YouTubeApi;
use crate::config::Config;
use crate::error::ScraperError;
use crate::output;
use crate::record::VideoRecord;
use crate::ui;

/// Largest page the search endpoint serves.
pub const SEARCH_PAGE_SIZE: usize = 50;
/// Largest id list the videos endpoint accepts.
pub const DETAIL_BATCH_SIZE: usize = 50;

/// Knobs the scraper needs from the run configuration.
#[derive(Debug, Clone)]
pub struct ScrapeSettings {
    pub region_code: String,
    pub request_delay: Duration,
    pub fetch_captions: bool,
    pub output_dir: PathBuf,
    pub show_progress: bool,
}

impl ScrapeSettings {
    pub fn from_config(config: &Config, show_progress: bool) -> Self {
        ScrapeSettings {
            region_code: config.region_code.clone(),
            request_delay: config.request_delay,
            fetch_captions: config.fetch_captions,
            output_dir: config.output_dir.clone(),
            show_progress,
        }
    }
}

pub struct Scraper<A: YouTubeApi> {
    api: A,
    settings: ScrapeSettings,
    category_mapping: HashMap<String, String>,
    genre: Option<String>,
    videos: Vec<VideoRecord>,
}

impl<A: YouTubeApi> Scraper<A> {
    /// Create a scraper and fetch the category mapping once. A failed
    /// lookup leaves the mapping empty; every row then reports
    /// "Unknown Category".
    pub fn new(api: A, settings: ScrapeSettings) -> Self {
        let category_mapping = fetch_video_categories(&api, &settings);
        Scraper {
            api,
            settings,
            category_mapping,
            genre: None,
            videos: Vec::new(),
        }
    }

    pub fn category_mapping(&self) -> &HashMap<String, String> {
        &self.category_mapping
    }

    /// Genre of the last search, if any.
    pub fn genre(&self) -> Option<&str> {
        self.genre.as_deref()
    }

    pub fn records(&self) -> &[VideoRecord] {
        &self.videos
    }

    /// Collect up to `max_results` video ids for `genre`, most viewed first.
    /// Stops early when the results run out or a request fails.
    pub fn search_videos(&mut self, genre: &str, max_results: usize) -> Vec<String> {
        self.genre = Some(genre.to_string());
        let mut videos: Vec<String> = Vec::new();
        let mut page_token: Option<String> = None;

        info!(genre, max_results, "Searching for videos");
        let pb = ui::search_bar(max_results as u64, self.settings.show_progress);

        while videos.len() < max_results {
            let page_size = SEARCH_PAGE_SIZE.min(max_results - videos.len());
            let page = match self.api.search_page(genre, page_size, page_token.as_deref()) {
                Ok(page) => page,
                Err(e) => {
                    warn!("Search request failed: {:#}", e);
                    break;
                }
            };

            videos.extend(page.video_ids);
            pb.set_position(videos.len().min(max_results) as u64);
            debug!(found = videos.len(), "Search page received");

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
            self.pause();
        }

        pb.finish_and_clear();
        videos.truncate(max_results);
        info!(found = videos.len(), "Completed video search");
        videos
    }

    /// Fetch details for `ids` in batches and append one row per returned
    /// video. Returns how many videos were processed by this call.
    pub fn get_video_details(&mut self, ids: &[String]) -> usize {
        let total = ids.len();
        let mut processed = 0;

        info!(total, "Collecting detailed information for each video");
        let pb = ui::detail_bar(total as u64, self.settings.show_progress);

        for batch in ids.chunks(DETAIL_BATCH_SIZE) {
            let items = match self.api.videos(batch) {
                Ok(items) => items,
                Err(e) => {
                    warn!(batch_size = batch.len(), "Video detail request failed: {:#}", e);
                    continue;
                }
            };

            for item in &items {
                let captions = self.fetch_captions(&item.id);
                self.videos
                    .push(VideoRecord::from_item(item, &self.category_mapping, captions));
                processed += 1;
                pb.inc(1);
            }
            self.pause();
        }

        pb.finish_and_clear();
        info!(processed, "Completed collecting detailed information");
        processed
    }

    /// Write every collected row to `<output_dir>/<genre>_videos_data.csv`.
    pub fn save_to_csv(&self) -> Result<PathBuf> {
        let genre = self.genre.as_deref().ok_or(ScraperError::GenreNotSet)?;
        let path = output::output_path(&self.settings.output_dir, genre);
        output::save_csv(&path, &self.videos)?;
        info!(path = %path.display(), records = self.videos.len(), "Data saved");
        Ok(path)
    }

    fn fetch_captions(&self, video_id: &str) -> Option<String> {
        if !self.settings.fetch_captions {
            return None;
        }
        match self.api.captions(video_id) {
            Ok(captions) => captions,
            Err(e) => {
                debug!(video_id, "Captions unavailable: {:#}", e);
                None
            }
        }
    }

    fn pause(&self) {
        if !self.settings.request_delay.is_zero() {
            thread::sleep(self.settings.request_delay);
        }
    }
}

fn fetch_video_categories<A: YouTubeApi>(api: &A, settings: &ScrapeSettings) -> HashMap<String, String> {
    let spinner = ui::spinner("Fetching video category mappings...", settings.show_progress);
    let mapping = match api.video_categories(&settings.region_code) {
        Ok(items) => {
            let mapping: HashMap<String, String> = items
                .into_iter()
                .map(|item| (item.id, item.snippet.title))
                .collect();
            info!(categories = mapping.len(), region = %settings.region_code, "Video category mappings fetched");
            mapping
        }
        Err(e) => {
            warn!("Fetching video categories failed: {:#}", e);
            HashMap::new()
        }
    };
    spinner.finish_and_clear();
    mapping
}

/// What a finished run produced.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub path: PathBuf,
    pub records: usize,
    pub elapsed: Duration,
}

/// One full collection: search the configured genre, fetch details, save.
pub fn run<A: YouTubeApi>(api: A, config: &Config, show_progress: bool) -> Result<RunSummary> {
    let started = Instant::now();
    let mut scraper = Scraper::new(api, ScrapeSettings::from_config(config, show_progress));

    let ids = scraper.search_videos(&config.genre, config.max_results);
    scraper.get_video_details(&ids);
    let path = scraper.save_to_csv()?;

    Ok(RunSummary {
        path,
        records: scraper.records().len(),
        elapsed: started.elapsed(),
    })
}
