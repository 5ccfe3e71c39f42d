//! Request URL construction for paginated endpoints.
//!
//! Pure functions only: no I/O, no state.  Sources call these from
//! [`DataSource::endpoint`](super::DataSource::endpoint) with their current
//! cursor.

use reqwest::Url;

use crate::error::FetchError;

/// Default number of podcasts requested per page.
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Default number of coins requested per page.
pub const DEFAULT_COINS_PER_PAGE: i64 = 50;

/// Parse `base` and append `params` as percent-encoded query pairs.
///
/// Fails with [`FetchError::InvalidUrl`] if `base` is not an absolute
/// `http`/`https` URL.
pub fn build_url(base: &str, params: &[(&str, String)]) -> Result<Url, FetchError> {
    let mut url = Url::parse(base).map_err(|e| FetchError::InvalidUrl(format!("{base}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(FetchError::InvalidUrl(format!(
            "{base}: unsupported scheme `{}`",
            url.scheme()
        )));
    }

    url.query_pairs_mut()
        .extend_pairs(params.iter().map(|(k, v)| (*k, v.as_str())));
    Ok(url)
}

/// Podcast search URL for a zero-based `page` of `limit` results.
///
/// `limit` is clamped to at least 1 and `page` to at least 0; the API takes
/// an item offset, so the page is sent as `limit * page`.
pub fn podcast_search_url(base: &str, term: &str, limit: i64, page: i64) -> Result<Url, FetchError> {
    let limit = limit.max(1);
    let offset = limit.saturating_mul(page.max(0));

    build_url(
        base,
        &[
            ("term", term.to_string()),
            ("media", "podcast".to_string()),
            ("limit", limit.to_string()),
            ("offset", offset.to_string()),
        ],
    )
}

/// Coin market listing URL, ordered by market cap, priced in USD.
pub fn coin_markets_url(base: &str, per_page: i64, page: i64) -> Result<Url, FetchError> {
    build_url(
        base,
        &[
            ("vs_currency", "usd".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", per_page.max(1).to_string()),
            ("page", page.max(0).to_string()),
            ("price_change_percentage", "24h".to_string()),
        ],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    const SEARCH: &str = "https://itunes.apple.com/search";
    const MARKETS: &str = "https://api.coingecko.com/api/v3/coins/markets";

    fn param(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    #[test]
    fn podcast_query_decodes_back_to_inputs() {
        for (term, limit, page) in [
            ("javascript", 20, 0),
            ("rust & friends", 10, 3),
            ("café ünïcode?", 1, 7),
            ("a=b&c=d#frag", 50, 2),
        ] {
            let url = podcast_search_url(SEARCH, term, limit, page).unwrap();
            let got_limit: i64 = param(&url, "limit").unwrap().parse().unwrap();
            let got_offset: i64 = param(&url, "offset").unwrap().parse().unwrap();

            assert_eq!(param(&url, "term").as_deref(), Some(term));
            assert_eq!(param(&url, "media").as_deref(), Some("podcast"));
            assert_eq!(got_limit, limit);
            assert_eq!(got_offset / got_limit, page);
        }
    }

    #[test]
    fn podcast_term_is_encoded_once() {
        let url = podcast_search_url(SEARCH, "two words", 20, 0).unwrap();
        assert!(url.as_str().contains("term=two+words"), "{url}");
    }

    #[test]
    fn limit_and_page_are_clamped() {
        let url = podcast_search_url(SEARCH, "x", 0, -4).unwrap();
        assert_eq!(param(&url, "limit").as_deref(), Some("1"));
        assert_eq!(param(&url, "offset").as_deref(), Some("0"));

        let url = podcast_search_url(SEARCH, "x", -20, 2).unwrap();
        assert_eq!(param(&url, "limit").as_deref(), Some("1"));
        assert_eq!(param(&url, "offset").as_deref(), Some("2"));

        let url = coin_markets_url(MARKETS, 0, -1).unwrap();
        assert_eq!(param(&url, "per_page").as_deref(), Some("1"));
        assert_eq!(param(&url, "page").as_deref(), Some("0"));
    }

    #[test]
    fn coin_url_carries_fixed_filters() {
        let url = coin_markets_url(MARKETS, DEFAULT_COINS_PER_PAGE, 1).unwrap();
        assert_eq!(
            url.as_str(),
            "https://api.coingecko.com/api/v3/coins/markets?vs_currency=usd&order=market_cap_desc&per_page=50&page=1&price_change_percentage=24h"
        );
    }

    #[test]
    fn malformed_base_is_invalid_url() {
        let err = podcast_search_url("not a url", "x", 20, 0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);

        let err = coin_markets_url("ftp://example.com/markets", 50, 1).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidUrl);
    }

    #[test]
    fn existing_query_on_base_is_kept() {
        let url = build_url("https://example.com/search?country=us", &[("term", "x".into())]).unwrap();
        assert_eq!(param(&url, "country").as_deref(), Some("us"));
        assert_eq!(param(&url, "term").as_deref(), Some("x"));
    }
}
