//! Coin market listing source.

use reqwest::Url;
use serde::Deserialize;

use super::endpoint::{self, DEFAULT_COINS_PER_PAGE};
use super::DataSource;
use crate::error::FetchError;

/// Public markets endpoint used when no other base is configured.
pub const DEFAULT_MARKETS_URL: &str = "https://api.coingecko.com/api/v3/coins/markets";

/// One row of the market listing.
///
/// Unlike podcasts, coins carry a natural key (`id`, e.g. `"bitcoin"`).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub image: String,
    pub current_price: f64,
    pub market_cap_rank: u32,
    pub price_change_24h: f64,
    pub price_change_percentage_24h: f64,
}

impl Coin {
    /// The coin's logo URL, if the API gave a well-formed one.
    pub fn image_url(&self) -> Option<Url> {
        Url::parse(&self.image).ok()
    }
}

/// Pages through the market listing, largest market cap first.
pub struct CoinSource {
    pub base_url: String,
    pub per_page: i64,
}

impl CoinSource {
    pub fn new(base_url: impl Into<String>, per_page: i64) -> Self {
        Self {
            base_url: base_url.into(),
            per_page,
        }
    }
}

impl Default for CoinSource {
    fn default() -> Self {
        Self::new(DEFAULT_MARKETS_URL, DEFAULT_COINS_PER_PAGE)
    }
}

impl DataSource for CoinSource {
    type Record = Coin;

    fn name(&self) -> &str {
        "Live Prices"
    }

    // The markets API numbers its pages from 1.
    fn initial_cursor(&self) -> u32 {
        1
    }

    fn endpoint(&self, cursor: u32) -> Result<Url, FetchError> {
        endpoint::coin_markets_url(&self.base_url, self.per_page, i64::from(cursor))
    }

    fn decode(&self, body: &[u8]) -> Result<Vec<Coin>, FetchError> {
        Ok(serde_json::from_slice(body)?)
    }
}
