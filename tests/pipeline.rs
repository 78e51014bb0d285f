use anyhow::{anyhow, Result};
use serde_json::json;
use std::path::PathBuf;
use std::time::Duration;
use yt_genre_scraper::api::{CategoryItem, CategorySnippet, SearchPage, VideoItem};
use yt_genre_scraper::scraper;
use yt_genre_scraper::{Config, YouTubeApi};

/// Two search pages of one video each; details carry every optional part
/// for the first video and none for the second.
struct TwoVideoApi;

impl YouTubeApi for TwoVideoApi {
    fn video_categories(&self, region_code: &str) -> Result<Vec<CategoryItem>> {
        assert_eq!(region_code, "GB");
        Ok(vec![CategoryItem {
            id: "10".into(),
            snippet: CategorySnippet { title: "Music".into() },
        }])
    }

    fn search_page(&self, query: &str, _max: usize, token: Option<&str>) -> Result<SearchPage> {
        assert_eq!(query, "Synth & Wave");
        Ok(match token {
            None => SearchPage {
                video_ids: vec!["aaa".into()],
                next_page_token: Some("next".into()),
            },
            Some(_) => SearchPage {
                video_ids: vec!["bbb".into()],
                next_page_token: None,
            },
        })
    }

    fn videos(&self, ids: &[String]) -> Result<Vec<VideoItem>> {
        assert_eq!(ids, ["aaa".to_string(), "bbb".to_string()]);
        let full = json!({
            "id": "aaa",
            "snippet": {
                "title": "Night Drive",
                "description": "Retro mix\nfull album",
                "channelTitle": "Neon",
                "tags": ["synthwave", "retro"],
                "categoryId": "10",
                "publishedAt": "2022-08-01T18:00:00Z"
            },
            "contentDetails": { "duration": "P1DT1H" },
            "statistics": { "viewCount": "123456", "commentCount": "789" },
            "recordingDetails": { "locationDescription": "Miami" },
            "topicDetails": { "topicCategories": ["https://en.wikipedia.org/wiki/Music"] }
        });
        let bare = json!({
            "id": "bbb",
            "snippet": {
                "title": "Short",
                "channelTitle": "Someone",
                "categoryId": "99",
                "publishedAt": "2021-01-01T00:00:00Z"
            },
            "contentDetails": { "duration": "PT42S" }
        });
        Ok(vec![
            serde_json::from_value(full)?,
            serde_json::from_value(bare)?,
        ])
    }

    fn captions(&self, video_id: &str) -> Result<Option<String>> {
        match video_id {
            "aaa" => Ok(Some("we ride tonight".into())),
            _ => Err(anyhow!("404 no track")),
        }
    }
}

fn config(dir: PathBuf) -> Config {
    Config {
        api_key: "test".into(),
        api_base_url: "http://unused".into(),
        caption_base_url: "http://unused".into(),
        caption_lang: "en".into(),
        genre: "Synth & Wave".into(),
        max_results: 10,
        region_code: "GB".into(),
        output_dir: dir,
        request_delay: Duration::ZERO,
        fetch_captions: true,
    }
}

#[test]
fn full_run_writes_expected_csv() {
    let dir = tempfile::tempdir().unwrap();
    let summary = scraper::run(TwoVideoApi, &config(dir.path().to_path_buf()), false).unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(summary.path, dir.path().join("synth_and_wave_videos_data.csv"));

    let mut rdr = csv::Reader::from_path(&summary.path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(&headers[0], "Video URL");
    assert_eq!(&headers[13], "Caption Text");

    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 2);

    let first = &rows[0];
    assert_eq!(&first[0], "https://www.youtube.com/watch?v=aaa");
    assert_eq!(&first[2], "Retro mix\nfull album");
    assert_eq!(&first[4], "synthwave,retro");
    assert_eq!(&first[5], "Music");
    assert_eq!(&first[6], "https://en.wikipedia.org/wiki/Music");
    assert_eq!(&first[8], "1 day, 1:00:00");
    assert_eq!(&first[9], "123456");
    assert_eq!(&first[10], "789");
    assert_eq!(&first[11], "Miami");
    assert_eq!(&first[12], "True");
    assert_eq!(&first[13], "we ride tonight");

    let second = &rows[1];
    assert_eq!(&second[4], "");
    assert_eq!(&second[5], "Unknown Category");
    assert_eq!(&second[8], "0:00:42");
    assert_eq!(&second[9], "0");
    assert_eq!(&second[11], "");
    assert_eq!(&second[12], "False");
    assert_eq!(&second[13], "");
}
