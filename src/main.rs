//! caster: browse podcast search results and live coin prices in the terminal.
//!
//! ## Architecture overview
//!
//! ```text
//! ┌─────────────┐ Completion ┌──────────────┐  draw()  ┌──────────┐
//! │ fetch task  │ ─────────► │ paginator.rs │ ───────► │  ui.rs   │
//! │  (tokio)    │ (channel)  │  store.rs    │          │ (render) │
//! └─────────────┘            │  app.rs      │          └──────────┘
//!        ▲                   └──────────────┘
//!        │ load_next_page()          ▲
//!        └───────────────────────────┤ handle_key_event()
//!                              ┌──────────┐
//!                              │ input.rs │
//!                              └──────────┘
//! ```
//!
//! * **`source/`**: the `DataSource` trait, URL builders, and the podcast and
//!   coin sources with their record types.
//! * **`http`**: the `HttpClient` seam and its reqwest implementation.
//! * **`paginator`**: one page request at a time, cursor bookkeeping,
//!   stale-response protection.
//! * **`store`**: observable records + last error.
//! * **`app`**: per-tab feeds, selection, alerts.
//! * **`ui`** / **`input`**: rendering and key bindings.
//! * **`main`**: config, logging, runtime, terminal, event loop.

mod app;
mod config;
mod error;
mod http;
mod input;
mod paginator;
mod source;
mod store;
mod ui;

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use app::App;
use config::Config;
use http::{HttpClient, ReqwestClient};
use paginator::Paginator;
use source::{CoinSource, PodcastSource};

// ---------------------------------------------------------------------------
// RAII terminal guard
// ---------------------------------------------------------------------------

/// Enters raw mode + alternate screen on construction and restores the
/// terminal when dropped, including during unwinding.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl TerminalGuard {
    fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(Self { terminal })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Restore the terminal before the default hook prints the panic.
fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        tracing::error!(%info, "panic");
        original_hook(info);
    }));
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Send `tracing` output to the configured log file.
///
/// RUST_LOG wins over `--log-level`; an unparsable level falls back to
/// `info`.  The returned guard flushes the writer when dropped.
fn init_tracing(cfg: &Config) -> Result<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        cfg.log_level
            .parse::<EnvFilter>()
            .unwrap_or_else(|_| EnvFilter::new("info"))
    });

    let path = cfg.log_path();
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| ".".into());
    let file = path
        .file_name()
        .context("log file path has no file name")?;
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("creating log directory {}", dir.display()))?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(dir, file));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .init();

    Ok(guard)
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cfg = Config::parse();
    let _log_guard = init_tracing(&cfg)?;
    info!(version = env!("CARGO_PKG_VERSION"), term = %cfg.term, "caster starting");

    install_panic_hook();

    // -- async runtime for network requests -----------------------------------
    // The UI loop stays on this thread; fetches run on the runtime's workers
    // and report back through each paginator's channel.
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    // -- configure data sources -----------------------------------------------
    let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::new(cfg.http_timeout())?);
    let podcasts = Paginator::new(
        PodcastSource::new(&cfg.podcast_url, &cfg.term, cfg.page_limit),
        Arc::clone(&client),
        runtime.handle().clone(),
    );
    let coins = Paginator::new(
        CoinSource::new(&cfg.coin_url, cfg.coins_per_page),
        client,
        runtime.handle().clone(),
    );

    // -- terminal setup (RAII: Drop restores on exit or panic) ---------------
    let mut guard = TerminalGuard::new()?;
    let mut app = App::new(podcasts, coins);
    app.mount();

    // -- main event loop ------------------------------------------------------
    // ~10 fps.  Each iteration applies finished fetches, renders, then waits
    // up to one tick for a key.
    let tick_rate = Duration::from_millis(100);

    loop {
        app.tick();

        guard.terminal.draw(|f| ui::draw(&mut app, f))?;

        if event::poll(tick_rate)? {
            if let Event::Key(key) = event::read()? {
                input::handle_key_event(&mut app, key);
            }
        }

        if app.quit {
            break;
        }
    }

    info!("caster exiting");
    // `guard` is dropped here, restoring the terminal.
    Ok(())
}
