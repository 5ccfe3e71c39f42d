//! Terminal UI rendering.
//!
//! All drawing logic lives here, separated from application state ([`App`])
//! and input handling ([`crate::input`]).
//!
//! ## For contributors
//!
//! * The layout is a tab bar, a list with a detail pane beside it, and a
//!   one-line status bar at the bottom.
//! * An unacknowledged fetch error is drawn last, as a centred modal.
//! * Images are not rendered; the detail pane shows their URLs.

use chrono::Local;
use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Tabs, Wrap},
    Frame,
};

use crate::app::{Alert, App, Tab};
use crate::paginator::Paginator;
use crate::source::{Coin, DataSource, Podcast};

/// Draw the complete UI for one frame.
pub fn draw(app: &mut App, frame: &mut Frame) {
    let [tabs_area, main_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(1),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    let [list_area, detail_area] =
        Layout::horizontal([Constraint::Percentage(62), Constraint::Percentage(38)]).areas(main_area);

    draw_tabs(app, frame, tabs_area);

    let loading = app.is_loading();
    match app.tab {
        Tab::Podcasts => {
            let items = app.podcasts.records().iter().map(podcast_line).collect();
            let source = app.podcasts.paginator.source();
            let title = format!(" {} · \"{}\" ", source.name(), source.term);
            draw_list(frame, list_area, &title, items, loading, &mut app.podcasts.list_state);
            draw_detail(frame, detail_area, app.podcasts.selected().map(podcast_detail));
        }
        Tab::Coins => {
            let items = app.coins.records().iter().map(coin_line).collect();
            let title = format!(" {} ", app.coins.paginator.source().name());
            draw_list(frame, list_area, &title, items, loading, &mut app.coins.list_state);
            draw_detail(frame, detail_area, app.coins.selected().map(coin_detail));
        }
    }

    draw_status_bar(app, frame, status_area);

    if let Some(alert) = &app.alert {
        draw_alert(alert, frame);
    }
}

fn draw_tabs(app: &App, frame: &mut Frame, area: Rect) {
    let tabs = Tabs::new(vec![" Podcasts ", " Live Prices "])
        .block(Block::default().borders(Borders::ALL).title(" caster "))
        .select(app.tab.index())
        .highlight_style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, area);
}

/// Render a scrollable record list, with a trailing marker while loading.
fn draw_list(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    mut items: Vec<ListItem<'static>>,
    loading: bool,
    state: &mut ListState,
) {
    if loading {
        items.push(ListItem::new(Line::styled(
            "  loading more…",
            Style::default().fg(Color::DarkGray),
        )));
    }

    let list = List::new(items)
        .block(Block::default().title(title.to_string()).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray),
        )
        .highlight_symbol("▸ ");

    frame.render_stateful_widget(list, area, state);
}

fn podcast_line(podcast: &Podcast) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(podcast.collection_name.clone(), Style::default().fg(Color::White)),
        Span::raw("  "),
        Span::styled(
            podcast.primary_genre_name.clone(),
            Style::default().fg(Color::DarkGray),
        ),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", podcast.artist_name),
            Style::default().fg(Color::Cyan),
        ),
    ]))
}

fn coin_line(coin: &Coin) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            format!("{:>4} ", coin.market_cap_rank),
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(format!("{:<20}", coin.name), Style::default().fg(Color::White)),
        Span::styled(
            format!("{:<6}", coin.symbol.to_uppercase()),
            Style::default().fg(Color::Cyan),
        ),
        Span::raw(format!("{:>14.2}", coin.current_price)),
        Span::raw("  "),
        Span::styled(
            format!("{:>+7.2}%", coin.price_change_percentage_24h),
            change_style(coin.price_change_percentage_24h),
        ),
    ]))
}

fn change_style(change: f64) -> Style {
    if change < 0.0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    }
}

fn podcast_detail(podcast: &Podcast) -> Vec<Line<'static>> {
    let genres = if podcast.genres.is_empty() {
        "none".to_string()
    } else {
        podcast.genres.join(", ")
    };
    vec![
        Line::styled(
            podcast.collection_name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!("by {}", podcast.artist_name)),
        Line::raw(""),
        Line::raw(format!("Kind:    {}", podcast.wrapper_type)),
        Line::raw(format!("Genre:   {}", podcast.primary_genre_name)),
        Line::raw(format!("Tags:    {genres}")),
        Line::raw(format!(
            "Artwork: {}",
            podcast.best_artwork_url().unwrap_or("none")
        )),
    ]
}

fn coin_detail(coin: &Coin) -> Vec<Line<'static>> {
    let image = coin
        .image_url()
        .map(|u| u.to_string())
        .unwrap_or_else(|| "none".into());
    vec![
        Line::styled(
            format!("{} ({})", coin.name, coin.symbol.to_uppercase()),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Line::raw(format!("Rank #{}  ·  id {}", coin.market_cap_rank, coin.id)),
        Line::raw(""),
        Line::raw(format!("Price:   ${:.2}", coin.current_price)),
        Line::from(vec![
            Span::raw("24h:     "),
            Span::styled(
                format!(
                    "{:+.2} ({:+.2}%)",
                    coin.price_change_24h, coin.price_change_percentage_24h
                ),
                change_style(coin.price_change_24h),
            ),
        ]),
        Line::raw(format!("Image:   {image}")),
    ]
}

fn draw_detail(frame: &mut Frame, area: Rect, lines: Option<Vec<Line<'static>>>) {
    let lines = lines.unwrap_or_else(|| {
        vec![Line::styled(
            "Select an entry to see details",
            Style::default().fg(Color::DarkGray),
        )]
    });
    let detail = Paragraph::new(lines)
        .block(Block::default().title(" Details ").borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    frame.render_widget(detail, area);
}

/// Render the bottom status bar.
fn draw_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let (count, page, updated) = match app.tab {
        Tab::Podcasts => store_summary(&app.podcasts.paginator),
        Tab::Coins => store_summary(&app.coins.paginator),
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(&app.status, Style::default().fg(Color::Yellow)),
        Span::raw("  "),
        Span::styled(format!("{count} items"), Style::default().fg(Color::Green)),
        Span::raw(format!("  next page {page}  ")),
        Span::styled(updated, Style::default().fg(Color::DarkGray)),
        Span::raw("  q: quit  tab: switch  r: refresh  ↑/↓: scroll"),
    ]));
    frame.render_widget(status, area);
}

fn store_summary<S: DataSource>(paginator: &Paginator<S>) -> (usize, u32, String) {
    let store = paginator.store();
    let updated = store
        .last_updated()
        .map(|t| format!("updated {}", t.with_timezone(&Local).format("%H:%M:%S")))
        .unwrap_or_else(|| "not loaded".into());
    (store.len(), paginator.cursor(), updated)
}

fn draw_alert(alert: &Alert, frame: &mut Frame) {
    let area = centered(frame.area(), 60, 7);
    let hint = if alert.transient {
        "Enter: dismiss  r: reload"
    } else {
        "Enter: dismiss"
    };

    let body = Paragraph::new(vec![
        Line::raw(alert.message.clone()),
        Line::raw(""),
        Line::styled(hint, Style::default().fg(Color::DarkGray)),
    ])
    .wrap(Wrap { trim: true })
    .block(
        Block::default()
            .title(format!(" Error · {} ", alert.source))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Red)),
    );

    frame.render_widget(Clear, area);
    frame.render_widget(body, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [area] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(area);
    let [area] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    area
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use reqwest::StatusCode;
    use std::sync::Arc;

    use super::*;
    use crate::app::tests::{fixture_client, make_app};
    use crate::http::fake::FakeClient;

    fn render(app: &mut App) -> String {
        let backend = TestBackend::new(120, 30);
        let mut terminal = Terminal::new(backend).unwrap();
        terminal.draw(|f| draw(app, f)).unwrap();

        let buf = terminal.backend().buffer().clone();
        buf.content()
            .iter()
            .map(|c| c.symbol().chars().next().unwrap_or(' '))
            .collect()
    }

    async fn loaded(app: &mut App) {
        app.podcasts.paginator.settle().await;
        app.coins.paginator.settle().await;
        app.tick();
    }

    #[tokio::test]
    async fn draw_does_not_panic_with_no_items() {
        let mut app = make_app(fixture_client());
        let text = render(&mut app);
        assert!(text.contains("0 items"));
        assert!(text.contains("not loaded"));
    }

    #[tokio::test]
    async fn draw_podcasts_shows_rows_and_count() {
        let mut app = make_app(fixture_client());
        app.mount();
        loaded(&mut app).await;
        app.select_first();

        let text = render(&mut app);
        assert!(text.contains("JS Party"));
        assert!(text.contains("2 items"), "status bar should show item count");
        assert!(text.contains("https://example.com/100.jpg"), "detail pane shows artwork");
    }

    #[tokio::test]
    async fn draw_coins_shows_symbol_uppercased() {
        let mut app = make_app(fixture_client());
        app.next_tab();
        loaded(&mut app).await;

        let text = render(&mut app);
        assert!(text.contains("Bitcoin"));
        assert!(text.contains("BTC"));
        assert!(text.contains("-1.25%"));
    }

    #[tokio::test]
    async fn draw_shows_loading_marker_while_in_flight() {
        let mut app = make_app(fixture_client());
        app.mount();

        let text = render(&mut app);
        assert!(text.contains("loading more"));
    }

    #[tokio::test]
    async fn draw_alert_modal() {
        let mut app = make_app(Arc::new(FakeClient::status(StatusCode::BAD_GATEWAY)));
        app.mount();
        loaded(&mut app).await;

        let text = render(&mut app);
        assert!(text.contains("Error · Podcasts"));
        assert!(text.contains("r: reload"));
    }
}
