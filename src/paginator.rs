//! Incremental page loading.
//!
//! A [`Paginator`] owns one [`ResultStore`] and a page cursor for a single
//! [`DataSource`].  Loading a page is split in two halves:
//!
//! * [`load_next_page`](Paginator::load_next_page) builds the URL and spawns
//!   the request on the tokio runtime.  It returns immediately.
//! * The spawned task sends a [`Completion`] back over a channel, and
//!   [`drain`](Paginator::drain), called from the UI loop every tick,
//!   applies it to the store.
//!
//! Applying completions on the caller's thread means the store is only ever
//! touched from one place.
//!
//! ## Overlap and refresh
//!
//! At most one load is in flight; a second `load_next_page` while one is
//! outstanding is coalesced into the first.  [`refresh`](Paginator::refresh)
//! aborts the outstanding task and bumps a generation counter.  Every
//! completion carries the generation it was started under, and completions
//! from an older generation are dropped, so a slow response can never land
//! in a store that was cleared after it was requested.

use std::sync::Arc;

use reqwest::{StatusCode, Url};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::FetchError;
use crate::http::HttpClient;
use crate::source::DataSource;
use crate::store::ResultStore;

/// What a call to [`Paginator::load_next_page`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Load {
    /// A request for this cursor is now in flight.
    Started(u32),
    /// A load was already in flight; no new request was made.
    Coalesced,
    /// The URL could not be built; the error is in the store.
    Rejected,
}

/// Result of one spawned page request, tagged with the generation and cursor
/// it was issued for.
pub struct Completion<R> {
    generation: u64,
    cursor: u32,
    result: Result<Vec<R>, FetchError>,
}

struct InFlight {
    generation: u64,
    handle: JoinHandle<()>,
}

pub struct Paginator<S: DataSource> {
    source: Arc<S>,
    client: Arc<dyn HttpClient>,
    runtime: Handle,
    store: ResultStore<S::Record>,
    cursor: u32,
    generation: u64,
    in_flight: Option<InFlight>,
    tx: mpsc::UnboundedSender<Completion<S::Record>>,
    rx: mpsc::UnboundedReceiver<Completion<S::Record>>,
}

impl<S: DataSource> Paginator<S> {
    /// Create a paginator that spawns its requests onto `runtime`.
    pub fn new(source: S, client: Arc<dyn HttpClient>, runtime: Handle) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cursor = source.initial_cursor();
        Self {
            source: Arc::new(source),
            client,
            runtime,
            store: ResultStore::new(),
            cursor,
            generation: 0,
            in_flight: None,
            tx,
            rx,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn store(&self) -> &ResultStore<S::Record> {
        &self.store
    }

    /// Cursor of the next page to load.
    pub fn cursor(&self) -> u32 {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Start loading the page at the current cursor.
    pub fn load_next_page(&mut self) -> Load {
        if self.in_flight.is_some() {
            debug!(source = self.source.name(), cursor = self.cursor, "load already in flight");
            return Load::Coalesced;
        }

        let url = match self.source.endpoint(self.cursor) {
            Ok(url) => url,
            Err(e) => {
                warn!(source = self.source.name(), error = %e, "could not build endpoint");
                self.store.set_error(e);
                return Load::Rejected;
            }
        };

        info!(source = self.source.name(), cursor = self.cursor, %url, "fetching page");

        let source = Arc::clone(&self.source);
        let client = Arc::clone(&self.client);
        let tx = self.tx.clone();
        let generation = self.generation;
        let cursor = self.cursor;

        let handle = self.runtime.spawn(async move {
            let result = fetch_page(source.as_ref(), client.as_ref(), url).await;
            // The paginator holds the receiver; if it is gone nobody cares.
            let _ = tx.send(Completion {
                generation,
                cursor,
                result,
            });
        });

        self.in_flight = Some(InFlight { generation, handle });
        Load::Started(cursor)
    }

    /// Reset to the first page and load it again.
    ///
    /// Any outstanding request is aborted and its result, should it still
    /// arrive, is ignored.  The store is empty when this returns.
    pub fn refresh(&mut self) -> Load {
        if let Some(stale) = self.in_flight.take() {
            debug!(source = self.source.name(), generation = stale.generation, "aborting in-flight load");
            stale.handle.abort();
        }

        self.generation += 1;
        self.cursor = self.source.initial_cursor();
        self.store.clear();
        info!(source = self.source.name(), generation = self.generation, "refreshing");

        self.load_next_page()
    }

    /// Apply every completion that has already arrived.
    ///
    /// Non-blocking; returns `true` if the store changed.
    pub fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(completion) = self.rx.try_recv() {
            changed |= self.apply(completion);
        }
        changed
    }

    /// Wait for the in-flight load (if any) to finish and apply it.
    #[cfg(test)]
    pub async fn settle(&mut self) {
        while self.in_flight.is_some() {
            match self.rx.recv().await {
                Some(completion) => {
                    self.apply(completion);
                }
                None => break,
            }
        }
    }

    fn apply(&mut self, completion: Completion<S::Record>) -> bool {
        if completion.generation != self.generation {
            debug!(
                source = self.source.name(),
                stale = completion.generation,
                current = self.generation,
                "discarding stale page"
            );
            return false;
        }

        self.in_flight = None;

        match completion.result {
            Ok(records) => {
                info!(
                    source = self.source.name(),
                    cursor = completion.cursor,
                    count = records.len(),
                    "page loaded"
                );
                self.store.append_page(records);
                self.cursor = completion.cursor + 1;
            }
            Err(e) => {
                warn!(
                    source = self.source.name(),
                    cursor = completion.cursor,
                    kind = ?e.kind(),
                    error = %e,
                    "page load failed"
                );
                self.store.set_error(e);
            }
        }
        true
    }
}

/// Perform one request and decode it.
///
/// Status other than `200 OK` is a [`FetchError::ServerError`]; an
/// undecodable body is [`FetchError::InvalidData`].
pub async fn fetch_page<S: DataSource>(
    source: &S,
    client: &dyn HttpClient,
    url: Url,
) -> Result<Vec<S::Record>, FetchError> {
    let response = client.get(url).await?;
    if response.status != StatusCode::OK {
        return Err(FetchError::ServerError(response.status));
    }
    source.decode(&response.body)
}
