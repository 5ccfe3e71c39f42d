//! Observable accumulation of fetched records.
//!
//! A [`ResultStore`] holds the records loaded so far (in arrival order) and
//! the error from the most recent failed load, if any.  Every mutation bumps
//! a revision number published on a [`watch`] channel, so observers can tell
//! when to re-read without polling the contents.
//!
//! Only the owning [`Paginator`](crate::paginator::Paginator) mutates a store;
//! the mutators are crate-private.

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use crate::error::FetchError;

pub struct ResultStore<R> {
    records: Vec<R>,
    error: Option<FetchError>,
    last_updated: Option<DateTime<Utc>>,
    revision: watch::Sender<u64>,
}

impl<R> ResultStore<R> {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            records: Vec::new(),
            error: None,
            last_updated: None,
            revision,
        }
    }

    /// Records in the order their pages arrived.
    pub fn records(&self) -> &[R] {
        &self.records
    }

    pub fn error(&self) -> Option<&FetchError> {
        self.error.as_ref()
    }

    /// When records were last appended.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }

    /// Subscribe to change notifications.
    ///
    /// The receiver yields the revision after each mutation.  Notifications
    /// are sent synchronously from the mutating call.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    // -- mutation (paginator only) -------------------------------------------

    /// Append a successful page and clear any previous error.
    pub(crate) fn append_page(&mut self, records: Vec<R>) {
        self.records.extend(records);
        self.error = None;
        self.last_updated = Some(Utc::now());
        self.bump();
    }

    pub(crate) fn set_error(&mut self, error: FetchError) {
        self.error = Some(error);
        self.bump();
    }

    /// Drop all records and the current error.
    pub(crate) fn clear(&mut self) {
        self.records.clear();
        self.error = None;
        self.bump();
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}

impl<R> Default for ResultStore<R> {
    fn default() -> Self {
        Self::new()
    }
}
