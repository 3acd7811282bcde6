//! Video catalog client backed by the YouTube Data API v3.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use tscore_models::SampledVideo;

use crate::clients::{env_retries, env_timeout, with_retry, VideoCatalog, VideoPage};
use crate::error::{TrainerError, TrainerResult};

/// Configuration for the catalog client.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the Data API.
    pub base_url: String,
    /// API key.
    pub api_key: String,
    /// Region the popularity chart is scoped to.
    pub region_code: String,
    /// Request timeout.
    pub timeout: Duration,
    /// Max retries.
    pub max_retries: u32,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.googleapis.com/youtube/v3".to_string(),
            api_key: String::new(),
            region_code: "US".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
        }
    }
}

impl CatalogConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("YOUTUBE_API_URL")
                .unwrap_or_else(|_| "https://www.googleapis.com/youtube/v3".to_string()),
            api_key: std::env::var("YOUTUBE_API_KEY").unwrap_or_default(),
            region_code: std::env::var("YOUTUBE_REGION_CODE").unwrap_or_else(|_| "US".to_string()),
            timeout: env_timeout("YOUTUBE_API_TIMEOUT_SECS", 30),
            max_retries: env_retries("YOUTUBE_API_RETRIES", 2),
        }
    }
}

/// Catalog client listing the popularity chart per category.
pub struct YouTubeCatalog {
    http: Client,
    config: CatalogConfig,
}

impl YouTubeCatalog {
    /// Create a new catalog client.
    pub fn new(config: CatalogConfig) -> TrainerResult<Self> {
        if config.api_key.is_empty() {
            return Err(TrainerError::config("YOUTUBE_API_KEY not set"));
        }
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TrainerError::catalog_failed(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> TrainerResult<Self> {
        Self::new(CatalogConfig::from_env())
    }

    async fn fetch_page(
        &self,
        category_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> TrainerResult<VideoListResponse> {
        let url = format!("{}/videos", self.config.base_url);

        let max_results = max_results.to_string();
        let mut query: Vec<(&str, &str)> = vec![
            ("part", "snippet,statistics,contentDetails"),
            ("chart", "mostPopular"),
            ("videoCategoryId", category_id),
            ("maxResults", &max_results),
            ("regionCode", &self.config.region_code),
            ("key", &self.config.api_key),
        ];
        if let Some(token) = page_token {
            query.push(("pageToken", token));
        }

        debug!(category_id = %category_id, "Fetching popularity chart page");

        let response = with_retry(self.config.max_retries, || async {
            self.http
                .get(&url)
                .query(&query)
                .send()
                .await
                .map_err(|e| TrainerError::catalog_failed(e.to_string()))
        })
        .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(TrainerError::catalog_failed(format!(
                "catalog returned {}: {}",
                status, body
            )));
        }

        response
            .json::<VideoListResponse>()
            .await
            .map_err(|e| TrainerError::catalog_failed(format!("decoding video list: {e}")))
    }
}

impl VideoCatalog for YouTubeCatalog {
    async fn list_popular(
        &self,
        category_id: &str,
        max_results: u32,
        page_token: Option<&str>,
    ) -> TrainerResult<VideoPage> {
        let response = self.fetch_page(category_id, max_results, page_token).await?;

        let videos = response
            .items
            .into_iter()
            .filter_map(|item| item.into_sampled_video(category_id))
            .collect();

        Ok(VideoPage {
            videos,
            next_page_token: response.next_page_token,
        })
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
    #[serde(rename = "nextPageToken")]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    id: String,
    snippet: Snippet,
    #[serde(default)]
    statistics: Statistics,
    #[serde(rename = "contentDetails")]
    content_details: Option<ContentDetails>,
}

impl VideoItem {
    /// Convert into a trainer-side record, keyed to the requested category.
    ///
    /// Items without any thumbnail URL are dropped; there is nothing to
    /// analyze for them.
    fn into_sampled_video(self, category_id: &str) -> Option<SampledVideo> {
        let thumbnail_url = self.snippet.thumbnails.best_url()?;
        let duration_secs = self
            .content_details
            .map(|d| parse_iso8601_duration(&d.duration))
            .unwrap_or(0);

        Some(SampledVideo {
            id: self.id,
            title: self.snippet.title,
            description: self.snippet.description,
            category_id: category_id.to_string(),
            thumbnail_url,
            views: parse_count(self.statistics.view_count.as_deref()),
            likes: parse_count(self.statistics.like_count.as_deref()),
            comments: parse_count(self.statistics.comment_count.as_deref()),
            duration_secs,
        })
    }
}

#[derive(Debug, Deserialize)]
struct Snippet {
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
struct Thumbnails {
    maxres: Option<Thumb>,
    high: Option<Thumb>,
    medium: Option<Thumb>,
    #[serde(rename = "default")]
    fallback: Option<Thumb>,
}

impl Thumbnails {
    /// Highest-resolution thumbnail URL available.
    fn best_url(self) -> Option<String> {
        self.maxres
            .or(self.high)
            .or(self.medium)
            .or(self.fallback)
            .map(|t| t.url)
    }
}

#[derive(Debug, Deserialize)]
struct Thumb {
    url: String,
}

#[derive(Debug, Default, Deserialize)]
struct Statistics {
    #[serde(rename = "viewCount")]
    view_count: Option<String>,
    #[serde(rename = "likeCount")]
    like_count: Option<String>,
    #[serde(rename = "commentCount")]
    comment_count: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentDetails {
    duration: String,
}

/// The API serializes counts as decimal strings; absent or malformed
/// counts read as zero.
fn parse_count(raw: Option<&str>) -> u64 {
    raw.and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Parse an ISO 8601 duration like `PT4M13S` into whole seconds.
///
/// Only day/hour/minute/second designators appear in video durations;
/// anything else resets the pending value and is otherwise ignored.
fn parse_iso8601_duration(raw: &str) -> u64 {
    let mut secs = 0u64;
    let mut value = 0u64;
    let mut in_time = false;
    for ch in raw.chars() {
        match ch {
            'P' => {}
            'T' => in_time = true,
            '0'..='9' => value = value * 10 + u64::from(ch as u8 - b'0'),
            'W' => {
                secs += value * 604_800;
                value = 0;
            }
            'D' => {
                secs += value * 86_400;
                value = 0;
            }
            'H' => {
                secs += value * 3_600;
                value = 0;
            }
            'M' if in_time => {
                secs += value * 60;
                value = 0;
            }
            'S' => {
                secs += value;
                value = 0;
            }
            _ => value = 0,
        }
    }
    secs
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> CatalogConfig {
        CatalogConfig {
            base_url: server.uri(),
            api_key: "test-key".to_string(),
            ..CatalogConfig::default()
        }
    }

    fn video_item(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "snippet": {
                "title": format!("Video {id}"),
                "description": "",
                "thumbnails": {
                    "high": {"url": format!("https://img.example.com/{id}/hq.jpg")},
                    "maxres": {"url": format!("https://img.example.com/{id}/maxres.jpg")}
                }
            },
            "statistics": {
                "viewCount": "150000",
                "likeCount": "4200",
                "commentCount": "310"
            },
            "contentDetails": {"duration": "PT12M30S"}
        })
    }

    #[test]
    fn test_parse_iso8601_duration() {
        assert_eq!(parse_iso8601_duration("PT4M13S"), 253);
        assert_eq!(parse_iso8601_duration("PT1H"), 3600);
        assert_eq!(parse_iso8601_duration("PT45S"), 45);
        assert_eq!(parse_iso8601_duration("P1DT2H"), 93_600);
        assert_eq!(parse_iso8601_duration("PT1H2M3S"), 3723);
        assert_eq!(parse_iso8601_duration(""), 0);
        assert_eq!(parse_iso8601_duration("garbage"), 0);
    }

    #[test]
    fn test_parse_count() {
        assert_eq!(parse_count(Some("12345")), 12345);
        assert_eq!(parse_count(Some("not a number")), 0);
        assert_eq!(parse_count(None), 0);
    }

    #[test]
    fn test_new_requires_api_key() {
        let config = CatalogConfig::default();
        assert!(matches!(
            YouTubeCatalog::new(config),
            Err(TrainerError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_list_popular_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("chart", "mostPopular"))
            .and(query_param("videoCategoryId", "20"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [video_item("abc"), video_item("def")],
                "nextPageToken": "CAUQAA"
            })))
            .mount(&server)
            .await;

        let catalog = YouTubeCatalog::new(test_config(&server)).unwrap();
        let page = catalog.list_popular("20", 50, None).await.unwrap();

        assert_eq!(page.videos.len(), 2);
        assert_eq!(page.next_page_token.as_deref(), Some("CAUQAA"));

        let video = &page.videos[0];
        assert_eq!(video.id, "abc");
        assert_eq!(video.category_id, "20");
        assert_eq!(video.views, 150_000);
        assert_eq!(video.likes, 4_200);
        assert_eq!(video.comments, 310);
        assert_eq!(video.duration_secs, 750);
        // Highest resolution wins
        assert!(video.thumbnail_url.ends_with("maxres.jpg"));
    }

    #[tokio::test]
    async fn test_list_popular_drops_items_without_thumbnails() {
        let server = MockServer::start().await;
        let mut bare = video_item("bare");
        bare["snippet"]["thumbnails"] = json!({});
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [bare, video_item("ok")]
            })))
            .mount(&server)
            .await;

        let catalog = YouTubeCatalog::new(test_config(&server)).unwrap();
        let page = catalog.list_popular("20", 50, None).await.unwrap();

        assert_eq!(page.videos.len(), 1);
        assert_eq!(page.videos[0].id, "ok");
        assert!(page.next_page_token.is_none());
    }

    #[tokio::test]
    async fn test_list_popular_surfaces_api_errors() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .respond_with(ResponseTemplate::new(403).set_body_string("quota exceeded"))
            .mount(&server)
            .await;

        let catalog = YouTubeCatalog::new(test_config(&server)).unwrap();
        let err = catalog.list_popular("20", 50, None).await.unwrap_err();

        match err {
            TrainerError::CatalogFailed(msg) => assert!(msg.contains("403")),
            other => panic!("expected CatalogFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_list_popular_passes_page_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/videos"))
            .and(query_param("pageToken", "CAUQAA"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let catalog = YouTubeCatalog::new(test_config(&server)).unwrap();
        let page = catalog.list_popular("20", 50, Some("CAUQAA")).await.unwrap();
        assert!(page.videos.is_empty());
    }
}
