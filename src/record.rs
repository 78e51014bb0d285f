// Row mapping: turns one `videos` item into the flat record written to CSV.
// Column names are part of the output format and must not change.

use regex::Regex;
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::sync::LazyLock;
use std::time::Duration;
use tracing::warn;

use crate::api::{GeoPoint, RecordingDetails, VideoItem};
use crate::error::ScraperError;

pub const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
pub const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// One CSV row. Field order is column order.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct VideoRecord {
    #[serde(rename = "Video URL")]
    pub video_url: String,
    #[serde(rename = "Title")]
    pub title: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "Channel Title")]
    pub channel_title: String,
    #[serde(rename = "Keyword Tags")]
    pub keyword_tags: String,
    #[serde(rename = "YouTube Video Category")]
    pub category: String,
    #[serde(rename = "Topic Details")]
    pub topic_details: String,
    #[serde(rename = "Video Published at")]
    pub published_at: String,
    #[serde(rename = "Video Duration")]
    pub duration: String,
    #[serde(rename = "View Count")]
    pub view_count: String,
    #[serde(rename = "Comment Count")]
    pub comment_count: String,
    #[serde(rename = "Location of Recording")]
    pub location: String,
    #[serde(rename = "Captions Available", serialize_with = "capitalized_bool")]
    pub captions_available: bool,
    #[serde(rename = "Caption Text")]
    pub caption_text: String,
}

impl VideoRecord {
    /// Flatten a detail item. `captions` is the already-fetched caption
    /// text, `None` when the video has none (or fetching failed).
    pub fn from_item(
        item: &VideoItem,
        categories: &HashMap<String, String>,
        captions: Option<String>,
    ) -> Self {
        let snippet = &item.snippet;
        let stats = item.statistics.clone().unwrap_or_default();

        let duration = match parse_iso8601_duration(&item.content_details.duration) {
            Ok(d) => format_duration(d),
            Err(e) => {
                warn!(video_id = %item.id, "{}", e);
                item.content_details.duration.clone()
            }
        };

        VideoRecord {
            video_url: format!("{}{}", WATCH_URL, item.id),
            title: snippet.title.clone(),
            description: snippet.description.clone(),
            channel_title: snippet.channel_title.clone(),
            keyword_tags: snippet.tags.join(","),
            category: categories
                .get(&snippet.category_id)
                .cloned()
                .unwrap_or_else(|| UNKNOWN_CATEGORY.to_string()),
            topic_details: item
                .topic_details
                .as_ref()
                .map(|t| t.topic_categories.join(","))
                .unwrap_or_default(),
            published_at: snippet.published_at.clone(),
            duration,
            view_count: stats.view_count.unwrap_or_else(|| "0".into()),
            comment_count: stats.comment_count.unwrap_or_else(|| "0".into()),
            location: format_location(item.recording_details.as_ref()),
            captions_available: captions.is_some(),
            caption_text: captions.unwrap_or_default(),
        }
    }
}

fn capitalized_bool<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(if *value { "True" } else { "False" })
}

/// Description and coordinates, joined with " - ". Coordinates are only
/// used when both latitude and longitude are present.
pub fn format_location(details: Option<&RecordingDetails>) -> String {
    let Some(details) = details else {
        return String::new();
    };

    let mut parts = Vec::new();
    if let Some(desc) = &details.location_description {
        parts.push(desc.clone());
    }
    if let Some(GeoPoint {
        latitude: Some(lat),
        longitude: Some(lon),
    }) = &details.location
    {
        parts.push(format!("{}, {}", lat, lon));
    }
    parts.join(" - ")
}

const SECS_PER_DAY: u64 = 86_400;

/// `P[nW][nD][T[nH][nM][n[.n]S]]`, the shape `contentDetails.duration` uses.
/// Only the seconds component may carry a fraction.
static ISO8601_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^P(?:([0-9]+)W)?(?:([0-9]+)D)?(?:(T)(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)(?:\.([0-9]+))?S)?)?$",
    )
    .unwrap()
});

/// Parse an ISO 8601 duration such as `PT4M13S` or `P1DT2H`. A bare `P`,
/// or a `T` with nothing after it, is rejected.
pub fn parse_iso8601_duration(raw: &str) -> Result<Duration, ScraperError> {
    let invalid = || ScraperError::InvalidDuration(raw.to_string());
    let caps = ISO8601_DURATION.captures(raw).ok_or_else(invalid)?;

    let number = |i: usize| -> Result<Option<u64>, ScraperError> {
        caps.get(i)
            .map(|m| m.as_str().parse::<u64>().map_err(|_| invalid()))
            .transpose()
    };

    let date_units = [(1, 7 * SECS_PER_DAY), (2, SECS_PER_DAY)];
    let time_units = [(4, 3_600), (5, 60), (6, 1)];

    let mut total: u64 = 0;
    let mut date_seen = false;
    let mut time_seen = false;
    for (group, secs) in date_units {
        if let Some(n) = number(group)? {
            total = n.checked_mul(secs).and_then(|v| v.checked_add(total)).ok_or_else(invalid)?;
            date_seen = true;
        }
    }
    for (group, secs) in time_units {
        if let Some(n) = number(group)? {
            total = n.checked_mul(secs).and_then(|v| v.checked_add(total)).ok_or_else(invalid)?;
            time_seen = true;
        }
    }

    if caps.get(3).is_some() && !time_seen {
        return Err(invalid());
    }
    if !date_seen && !time_seen {
        return Err(invalid());
    }

    let nanos = caps.get(7).map_or(0, |m| fraction_to_nanos(m.as_str()));
    Ok(Duration::new(total, nanos))
}

/// First nine fractional digits as nanoseconds.
fn fraction_to_nanos(digits: &str) -> u32 {
    digits
        .bytes()
        .take(9)
        .enumerate()
        .map(|(i, b)| u32::from(b - b'0') * 10u32.pow(8 - i as u32))
        .sum()
}

/// Render like a Python `timedelta`: `H:MM:SS`, prefixed with
/// `N day(s), ` when at least a day long, suffixed with `.ffffff` when
/// there are sub-second microseconds.
pub fn format_duration(d: Duration) -> String {
    let total = d.as_secs();
    let days = total / SECS_PER_DAY;
    let rem = total % SECS_PER_DAY;
    let (hours, minutes, seconds) = (rem / 3_600, (rem % 3_600) / 60, rem % 60);

    let mut out = String::new();
    if days > 0 {
        let plural = if days == 1 { "" } else { "s" };
        out.push_str(&format!("{} day{}, ", days, plural));
    }
    out.push_str(&format!("{}:{:02}:{:02}", hours, minutes, seconds));

    let micros = d.subsec_micros();
    if micros > 0 {
        out.push_str(&format!(".{:06}", micros));
    }
    out
}
