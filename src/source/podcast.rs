//! Podcast search source.

use reqwest::Url;
use serde::Deserialize;
use uuid::Uuid;

use super::endpoint;
use super::DataSource;
use crate::error::FetchError;

/// Public search endpoint used when no other base is configured.
pub const DEFAULT_SEARCH_URL: &str = "https://itunes.apple.com/search";

/// A single podcast from the search API.
///
/// The API has no stable identifier for search hits, so every decoded podcast
/// gets a fresh random [`id`](Podcast::id).  Two decodes of the same payload
/// therefore never compare equal by id.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Podcast {
    #[serde(skip_deserializing, default = "Uuid::new_v4")]
    pub id: Uuid,
    pub wrapper_type: String,
    pub artist_name: String,
    pub collection_name: String,
    pub primary_genre_name: String,
    pub genres: Vec<String>,
    #[serde(default, rename = "artworkUrl100")]
    pub artwork_url_100: Option<String>,
    #[serde(default, rename = "artworkUrl60")]
    pub artwork_url_60: Option<String>,
    #[serde(default, rename = "artworkUrl30")]
    pub artwork_url_30: Option<String>,
}

impl Podcast {
    /// The highest-resolution artwork the API returned, if any.
    pub fn best_artwork_url(&self) -> Option<&str> {
        self.artwork_url_100
            .as_deref()
            .or(self.artwork_url_60.as_deref())
            .or(self.artwork_url_30.as_deref())
    }
}

/// Search response envelope.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchResults {
    result_count: u64,
    results: Vec<Podcast>,
}

/// Pages through podcast search results for a fixed term.
pub struct PodcastSource {
    pub base_url: String,
    pub term: String,
    pub limit: i64,
}

impl PodcastSource {
    pub fn new(base_url: impl Into<String>, term: impl Into<String>, limit: i64) -> Self {
        Self {
            base_url: base_url.into(),
            term: term.into(),
            limit,
        }
    }
}

impl DataSource for PodcastSource {
    type Record = Podcast;

    fn name(&self) -> &str {
        "Podcasts"
    }

    fn initial_cursor(&self) -> u32 {
        0
    }

    fn endpoint(&self, cursor: u32) -> Result<Url, FetchError> {
        endpoint::podcast_search_url(&self.base_url, &self.term, self.limit, i64::from(cursor))
    }

    fn decode(&self, body: &[u8]) -> Result<Vec<Podcast>, FetchError> {
        let page: SearchResults = serde_json::from_slice(body)?;
        tracing::debug!(
            result_count = page.result_count,
            decoded = page.results.len(),
            "decoded podcast search page"
        );
        Ok(page.results)
    }
}
