use ratatui::widgets::ListState;
use tokio::sync::watch;

use crate::error::FetchError;
use crate::paginator::{Load, Paginator};
use crate::source::{CoinSource, DataSource, PodcastSource};

/// Which list is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Podcasts,
    Coins,
}

impl Tab {
    pub fn index(self) -> usize {
        match self {
            Tab::Podcasts => 0,
            Tab::Coins => 1,
        }
    }
}

/// A fetch error waiting to be acknowledged by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub source: String,
    pub message: String,
    /// Whether reloading could help.
    pub transient: bool,
}

/// What changed in a feed's store since the last [`Feed::sync`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    Loaded(usize),
    Failed(Alert),
}

/// One scrollable list backed by a [`Paginator`].
pub struct Feed<S: DataSource> {
    pub paginator: Paginator<S>,
    pub list_state: ListState,
    changes: watch::Receiver<u64>,
    mounted: bool,
}

impl<S: DataSource> Feed<S> {
    pub fn new(paginator: Paginator<S>) -> Self {
        let changes = paginator.store().subscribe();
        Self {
            paginator,
            list_state: ListState::default(),
            changes,
            mounted: false,
        }
    }

    pub fn records(&self) -> &[S::Record] {
        self.paginator.store().records()
    }

    pub fn selected(&self) -> Option<&S::Record> {
        self.list_state.selected().and_then(|i| self.records().get(i))
    }

    /// Apply arrived pages and report what changed, if anything.
    pub fn sync(&mut self) -> Option<Update> {
        self.paginator.drain();

        if !self.changes.has_changed().unwrap_or(false) {
            return None;
        }
        let _ = self.changes.borrow_and_update();

        let store = self.paginator.store();
        if let Some(i) = self.list_state.selected() {
            if i >= store.len() {
                self.list_state.select(store.len().checked_sub(1));
            }
        }

        Some(match store.error() {
            Some(e) => Update::Failed(alert_for(self.paginator.source().name(), e)),
            None => Update::Loaded(store.len()),
        })
    }

    /// Load the first page the first time the list is shown.
    pub fn mount(&mut self) {
        if !self.mounted {
            self.mounted = true;
            self.paginator.load_next_page();
        }
    }

    pub fn refresh(&mut self) -> Load {
        self.mounted = true;
        self.list_state.select(None);
        self.paginator.refresh()
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        let len = self.records().len();
        if len == 0 {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(len - 1),
            None => 0,
        };
        self.select(i);
    }

    pub fn select_previous(&mut self) {
        if self.records().is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.select(i);
    }

    pub fn select_first(&mut self) {
        if !self.records().is_empty() {
            self.select(0);
        }
    }

    pub fn select_last(&mut self) {
        let len = self.records().len();
        if len > 0 {
            self.select(len - 1);
        }
    }

    /// Move the selection; reaching the last loaded record asks for more.
    fn select(&mut self, i: usize) {
        self.list_state.select(Some(i));
        if i + 1 == self.records().len() {
            self.paginator.load_next_page();
        }
    }
}

fn alert_for(source: &str, error: &FetchError) -> Alert {
    Alert {
        source: source.to_string(),
        message: error.user_message(),
        transient: error.is_transient(),
    }
}

pub struct App {
    pub podcasts: Feed<PodcastSource>,
    pub coins: Feed<CoinSource>,
    pub tab: Tab,
    /// Error shown as a modal until dismissed.
    pub alert: Option<Alert>,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Last fetch status message.
    pub status: String,
}

impl App {
    pub fn new(podcasts: Paginator<PodcastSource>, coins: Paginator<CoinSource>) -> Self {
        Self {
            podcasts: Feed::new(podcasts),
            coins: Feed::new(coins),
            tab: Tab::Podcasts,
            alert: None,
            quit: false,
            status: "Starting…".into(),
        }
    }

    /// Show the current tab, loading its first page if needed.
    pub fn mount(&mut self) {
        match self.tab {
            Tab::Podcasts => self.podcasts.mount(),
            Tab::Coins => self.coins.mount(),
        }
    }

    pub fn next_tab(&mut self) {
        self.tab = match self.tab {
            Tab::Podcasts => Tab::Coins,
            Tab::Coins => Tab::Podcasts,
        };
        self.mount();
    }

    /// Pull in finished fetches from both feeds.
    pub fn tick(&mut self) {
        let updates = [
            (self.podcasts.paginator.source().name().to_string(), self.podcasts.sync()),
            (self.coins.paginator.source().name().to_string(), self.coins.sync()),
        ];

        for (name, update) in updates {
            match update {
                Some(Update::Loaded(count)) => {
                    self.status = format!("{name}: {count} loaded");
                }
                Some(Update::Failed(alert)) => {
                    self.status = format!("{name}: {}", alert.message);
                    self.alert = Some(alert);
                }
                None => {}
            }
        }
    }

    pub fn is_loading(&self) -> bool {
        match self.tab {
            Tab::Podcasts => self.podcasts.paginator.is_loading(),
            Tab::Coins => self.coins.paginator.is_loading(),
        }
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    pub fn refresh(&mut self) {
        self.alert = None;
        let load = match self.tab {
            Tab::Podcasts => self.podcasts.refresh(),
            Tab::Coins => self.coins.refresh(),
        };
        self.status = match load {
            Load::Started(cursor) => format!("Refreshing from page {cursor}…"),
            Load::Coalesced => "Refresh already in progress…".into(),
            Load::Rejected => "Refresh failed".into(),
        };
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        match self.tab {
            Tab::Podcasts => self.podcasts.select_next(),
            Tab::Coins => self.coins.select_next(),
        }
    }

    pub fn select_previous(&mut self) {
        match self.tab {
            Tab::Podcasts => self.podcasts.select_previous(),
            Tab::Coins => self.coins.select_previous(),
        }
    }

    pub fn select_first(&mut self) {
        match self.tab {
            Tab::Podcasts => self.podcasts.select_first(),
            Tab::Coins => self.coins.select_first(),
        }
    }

    pub fn select_last(&mut self) {
        match self.tab {
            Tab::Podcasts => self.podcasts.select_last(),
            Tab::Coins => self.coins.select_last(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::Arc;

    use reqwest::StatusCode;
    use tokio::runtime::Handle;

    use super::*;
    use crate::http::fake::FakeClient;
    use crate::http::{HttpClient, HttpResponse};
    use crate::source::{fixtures, DEFAULT_SEARCH_URL};

    /// Serves podcast and coin fixtures, routed by URL path.
    pub(crate) fn fixture_client() -> Arc<FakeClient> {
        Arc::new(FakeClient::new(|url| {
            let body = if url.path().ends_with("/search") {
                fixtures::PODCASTS
            } else {
                fixtures::COINS
            };
            Ok(HttpResponse::ok(body))
        }))
    }

    pub(crate) fn make_app(client: Arc<dyn HttpClient>) -> App {
        let podcasts = Paginator::new(
            PodcastSource::new(DEFAULT_SEARCH_URL, "javascript", 20),
            Arc::clone(&client),
            Handle::current(),
        );
        let coins = Paginator::new(CoinSource::default(), client, Handle::current());
        App::new(podcasts, coins)
    }

    async fn settle(app: &mut App) {
        app.podcasts.paginator.settle().await;
        app.coins.paginator.settle().await;
        app.tick();
    }

    // -- construction --------------------------------------------------------

    #[tokio::test]
    async fn new_app_starts_empty_and_idle() {
        let client = fixture_client();
        let app = make_app(client.clone());

        assert_eq!(app.tab, Tab::Podcasts);
        assert!(app.podcasts.records().is_empty());
        assert!(app.coins.records().is_empty());
        assert!(app.alert.is_none());
        assert!(!app.quit);
        assert!(client.requests().is_empty(), "nothing loads before mount");
    }

    // -- mounting and tabs ---------------------------------------------------

    #[tokio::test]
    async fn mount_loads_only_the_visible_tab() {
        let client = fixture_client();
        let mut app = make_app(client.clone());

        app.mount();
        settle(&mut app).await;

        assert_eq!(app.podcasts.records().len(), 2);
        assert!(app.coins.records().is_empty());
        assert_eq!(app.status, "Podcasts: 2 loaded");
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn mount_is_idempotent() {
        let client = fixture_client();
        let mut app = make_app(client.clone());

        app.mount();
        settle(&mut app).await;
        app.mount();
        settle(&mut app).await;

        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn switching_tab_mounts_coins() {
        let client = fixture_client();
        let mut app = make_app(client);

        app.mount();
        app.next_tab();
        assert_eq!(app.tab, Tab::Coins);
        settle(&mut app).await;

        assert_eq!(app.coins.records().len(), 2);
        assert_eq!(app.coins.paginator.cursor(), 2);

        app.next_tab();
        assert_eq!(app.tab, Tab::Podcasts);
    }

    // -- pagination trigger --------------------------------------------------

    #[tokio::test]
    async fn reaching_last_record_loads_next_page() {
        let client = fixture_client();
        let mut app = make_app(client.clone());
        app.mount();
        settle(&mut app).await;

        app.select_next(); // index 0 of 2
        assert_eq!(client.requests().len(), 1);

        app.select_next(); // last record
        assert!(app.is_loading());
        settle(&mut app).await;

        assert_eq!(app.podcasts.records().len(), 4);
        assert_eq!(app.podcasts.paginator.cursor(), 2);
        assert_eq!(app.podcasts.list_state.selected(), Some(1));
    }

    #[tokio::test]
    async fn select_last_triggers_load() {
        let client = fixture_client();
        let mut app = make_app(client.clone());
        app.tab = Tab::Coins;
        app.mount();
        settle(&mut app).await;

        app.select_last();
        settle(&mut app).await;

        assert_eq!(app.coins.records().len(), 4);
        assert_eq!(client.requests().len(), 2);
    }

    // -- navigation ----------------------------------------------------------

    #[tokio::test]
    async fn navigation_on_empty_is_noop() {
        let mut app = make_app(fixture_client());

        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();

        assert!(app.podcasts.list_state.selected().is_none());
    }

    #[tokio::test]
    async fn select_previous_clamps_at_zero() {
        let mut app = make_app(fixture_client());
        app.mount();
        settle(&mut app).await;

        app.select_first();
        app.select_previous();
        assert_eq!(app.podcasts.list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn selected_returns_record_under_cursor() {
        let mut app = make_app(fixture_client());
        app.mount();
        settle(&mut app).await;

        assert!(app.podcasts.selected().is_none());
        app.select_first();
        assert_eq!(app.podcasts.selected().map(|p| p.artist_name.as_str()), Some("JS Party"));
    }

    // -- errors and refresh --------------------------------------------------

    #[tokio::test]
    async fn failed_load_raises_alert() {
        let client = Arc::new(FakeClient::status(StatusCode::INTERNAL_SERVER_ERROR));
        let mut app = make_app(client);
        app.tab = Tab::Coins;
        app.mount();
        settle(&mut app).await;

        let alert = app.alert.clone().expect("alert raised");
        assert_eq!(alert.source, "Live Prices");
        assert_eq!(alert.message, "There was an error with the server. Please try again later");
        assert!(alert.transient);
        assert!(app.coins.records().is_empty());

        app.dismiss_alert();
        assert!(app.alert.is_none());
    }

    #[tokio::test]
    async fn refresh_resets_selection_and_reloads_first_page() {
        let client = fixture_client();
        let mut app = make_app(client.clone());
        app.tab = Tab::Coins;
        app.mount();
        settle(&mut app).await;
        app.select_last();
        settle(&mut app).await;
        assert_eq!(app.coins.records().len(), 4);

        app.refresh();
        assert!(app.coins.records().is_empty());
        assert!(app.coins.list_state.selected().is_none());
        settle(&mut app).await;

        assert_eq!(app.coins.records().len(), 2);
        assert_eq!(app.coins.paginator.cursor(), 2);
        let last = client.requests().pop().unwrap();
        assert!(last.as_str().contains("&page=1&"), "{last}");
    }

    #[tokio::test]
    async fn tick_without_changes_keeps_status() {
        let mut app = make_app(fixture_client());
        app.status = "idle".into();
        app.tick();
        assert_eq!(app.status, "idle");
    }
}
