//! Data source abstraction layer.
//!
//! A [`DataSource`] knows three things about one upstream API: how to build
//! the URL for a given page cursor, where the cursor starts, and how to turn
//! a response body into records.  Everything else (issuing the request,
//! status checks, accumulating results) is shared and lives in
//! [`crate::paginator`].
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `episodes.rs`) with the record
//!    type and a source struct.
//! 2. Implement [`DataSource`] for it, building URLs with the helpers in
//!    [`endpoint`].
//! 3. Add `mod episodes;` below and re-export the public types.
//! 4. Give [`crate::app::App`] a new [`Feed`](crate::app::Feed) for it.

mod coin;
pub mod endpoint;
mod podcast;

pub use coin::{Coin, CoinSource, DEFAULT_MARKETS_URL};
pub use podcast::{Podcast, PodcastSource, DEFAULT_SEARCH_URL};

use reqwest::Url;

use crate::error::FetchError;

/// One paginated upstream API.
///
/// Sources are shared with the background fetch task, so they must be
/// [`Send`] + [`Sync`] and own all of their configuration.
pub trait DataSource: Send + Sync + 'static {
    /// The decoded record type.
    type Record: Send + 'static;

    /// Human-readable label used in logs and the UI.
    fn name(&self) -> &str;

    /// Cursor value for the first page (and after a refresh).
    fn initial_cursor(&self) -> u32;

    /// Request URL for the page at `cursor`.
    fn endpoint(&self, cursor: u32) -> Result<Url, FetchError>;

    /// Decode a successful response body into records, in arrival order.
    fn decode(&self, body: &[u8]) -> Result<Vec<Self::Record>, FetchError>;
}
