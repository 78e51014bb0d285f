// API client module: a small blocking HTTP client for the video platform's
// public Data API (v3) plus the timed-text caption endpoint. Requests are
// issued one at a time; pacing between them is the scraper's job.

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;

use crate::captions;
use crate::config::Config;
use crate::error::ScraperError;

/// Parts requested for every video in a detail batch.
pub const VIDEO_PARTS: &str = "snippet,contentDetails,statistics,recordingDetails,topicDetails";

const USER_AGENT: &str = concat!("yt-genre-scraper/", env!("CARGO_PKG_VERSION"));

/// The developer key travels in this header, never in the URL, so that
/// transport errors (which print the URL) cannot leak it.
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Generic list envelope returned by every Data API list endpoint.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase", bound(deserialize = "T: Deserialize<'de>"))]
pub struct ListResponse<T> {
    #[serde(default)]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
}

#[derive(Deserialize, Debug)]
pub struct SearchItem {
    pub id: SearchItemId,
}

/// `search` results carry a resource id; with `type=video` it is always a
/// video id, but the field is optional on the wire.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SearchItemId {
    pub video_id: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CategoryItem {
    pub id: String,
    pub snippet: CategorySnippet,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CategorySnippet {
    pub title: String,
}

/// One entry from the `videos` endpoint. Only the parts we flatten into a
/// row are modelled; statistics, recording and topic details may be
/// missing for some videos.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoItem {
    pub id: String,
    pub snippet: VideoSnippet,
    pub content_details: ContentDetails,
    #[serde(default)]
    pub statistics: Option<Statistics>,
    #[serde(default)]
    pub recording_details: Option<RecordingDetails>,
    #[serde(default)]
    pub topic_details: Option<TopicDetails>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VideoSnippet {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub channel_title: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub category_id: String,
    pub published_at: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ContentDetails {
    pub duration: String,
}

/// Counters arrive as decimal strings.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub view_count: Option<String>,
    pub comment_count: Option<String>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct RecordingDetails {
    pub location_description: Option<String>,
    pub location: Option<GeoPoint>,
}

/// Coordinates are kept as JSON numbers so they print exactly as received.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct GeoPoint {
    pub latitude: Option<serde_json::Number>,
    pub longitude: Option<serde_json::Number>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopicDetails {
    #[serde(default)]
    pub topic_categories: Vec<String>,
}

/// Video ids from one page of search results.
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub video_ids: Vec<String>,
    pub next_page_token: Option<String>,
}

/// The calls the scraper needs. `ApiClient` is the real implementation;
/// tests substitute an in-memory one.
pub trait YouTubeApi {
    fn video_categories(&self, region_code: &str) -> Result<Vec<CategoryItem>>;

    fn search_page(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<SearchPage>;

    fn videos(&self, ids: &[String]) -> Result<Vec<VideoItem>>;

    /// Caption text for a video, or `None` when it has no caption track.
    fn captions(&self, video_id: &str) -> Result<Option<String>>;
}

/// Blocking client holding the reqwest client, the endpoints and the
/// developer key sent with every Data API call.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    api_key: String,
    base_url: String,
    caption_base_url: String,
    caption_lang: String,
}

impl ApiClient {
    pub fn from_config(config: &Config) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(ApiClient {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            caption_base_url: config.caption_base_url.trim_end_matches('/').to_string(),
            caption_lang: config.caption_lang.clone(),
        })
    }

    /// GET `<base>/<endpoint>` with the given query, authenticated with the
    /// API key header, and decode the JSON body.
    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, &str)]) -> Result<T> {
        let url = format!("{}/{}", &self.base_url, endpoint);
        let res = self
            .client
            .get(&url)
            .query(query)
            .header(API_KEY_HEADER, self.api_key.as_str())
            .send()
            .map_err(|e| e.without_url())
            .with_context(|| format!("Failed to send {} request", endpoint))?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let txt = res.text().unwrap_or_default();
            return Err(api_error(status, &txt).into());
        }
        res.json()
            .map_err(|e| e.without_url())
            .with_context(|| format!("Parsing {} response json", endpoint))
    }
}

impl YouTubeApi for ApiClient {
    fn video_categories(&self, region_code: &str) -> Result<Vec<CategoryItem>> {
        let resp: ListResponse<CategoryItem> = self.get_json(
            "videoCategories",
            &[("part", "snippet"), ("regionCode", region_code)],
        )?;
        Ok(resp.items)
    }

    fn search_page(
        &self,
        query: &str,
        max_results: usize,
        page_token: Option<&str>,
    ) -> Result<SearchPage> {
        let max_results = max_results.to_string();
        let mut params = vec![
            ("part", "id"),
            ("q", query),
            ("type", "video"),
            ("maxResults", max_results.as_str()),
            ("order", "viewCount"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }
        let resp: ListResponse<SearchItem> = self.get_json("search", &params)?;
        Ok(SearchPage {
            video_ids: resp
                .items
                .into_iter()
                .filter_map(|item| item.id.video_id)
                .collect(),
            next_page_token: resp.next_page_token,
        })
    }

    fn videos(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        let joined = ids.join(",");
        let resp: ListResponse<VideoItem> =
            self.get_json("videos", &[("part", VIDEO_PARTS), ("id", joined.as_str())])?;
        Ok(resp.items)
    }

    fn captions(&self, video_id: &str) -> Result<Option<String>> {
        let url = format!("{}/api/timedtext", &self.caption_base_url);
        let res = self
            .client
            .get(&url)
            .query(&[("v", video_id), ("lang", self.caption_lang.as_str())])
            .send()
            .map_err(|e| e.without_url())
            .context("Failed to send caption request")?;
        if !res.status().is_success() {
            let status = res.status().as_u16();
            let txt = res.text().unwrap_or_default();
            return Err(api_error(status, &txt).into());
        }
        let body = res.text().context("Reading caption response body")?;
        captions::parse_transcript(&body)
    }
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Build an `Api` error, preferring the `error.message` field of the
/// platform's JSON error body over the raw text.
pub fn api_error(status: u16, body: &str) -> ScraperError {
    let message = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|env| env.error.message)
        .unwrap_or_else(|_| body.trim().to_string());
    ScraperError::Api { status, message }
}
