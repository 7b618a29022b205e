use std::borrow::Cow;

use super::state::{AppState, View, ViewState};
use crate::feed::fallback::BatchOrigin;
use crate::feed::types::{Article, Sentiment};
use crate::filter::Period;
use crate::i18n::{source_label, t, time_ago};
use crate::notify::NoticeLevel;
use crate::prefs::Theme;
use crate::ticker::{format_change, format_price};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};

struct Palette {
    bg: Color,
    fg: Color,
    dim: Color,
    accent: Color,
    key: Color,
    selected_bg: Color,
}

fn palette(theme: Theme) -> Palette {
    match theme {
        Theme::Dark => Palette {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            key: Color::Yellow,
            selected_bg: Color::DarkGray,
        },
        Theme::Light => Palette {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            key: Color::Magenta,
            selected_bg: Color::Gray,
        },
    }
}

pub fn draw(f: &mut Frame, state: &AppState, view: &ViewState) {
    let pal = palette(state.theme);
    f.render_widget(
        Block::default().style(Style::default().bg(pal.bg).fg(pal.fg)),
        f.area(),
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(6),
            Constraint::Length(5),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    draw_header(f, state, view, &pal, chunks[0]);
    draw_ticker(f, state, &pal, chunks[1]);
    draw_filter_bar(f, state, view, &pal, chunks[2]);
    draw_articles(f, state, view, &pal, chunks[3]);
    draw_detail(f, state, view, &pal, chunks[4]);
    draw_notices(f, state, &pal, chunks[5]);
    draw_footer(f, state, view, &pal, chunks[6]);
}

fn draw_header(f: &mut Frame, state: &AppState, view: &ViewState, pal: &Palette, area: Rect) {
    let lang = state.language;
    let (title, subtitle) = match view.view {
        View::Feed => (t(lang, "index.title"), t(lang, "index.subtitle")),
        View::Bookmarks => (t(lang, "bookmarks.title"), t(lang, "bookmarks.subtitle")),
    };

    let mut spans = vec![
        Span::styled(
            format!(" {} ", t(lang, "app.name")),
            Style::default().fg(pal.accent).add_modifier(Modifier::BOLD),
        ),
        Span::styled("| ", Style::default().fg(pal.dim)),
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(format!("  {}", subtitle), Style::default().fg(pal.dim)),
    ];

    if view.view == View::Feed {
        match &state.origin {
            Some(BatchOrigin::Samples) => spans.push(Span::styled(
                format!("  [{}]", t(lang, "status.samples")),
                Style::default().fg(Color::Yellow),
            )),
            Some(origin) => spans.push(Span::styled(
                format!("  {}: {}", t(lang, "status.source"), origin.label()),
                Style::default().fg(pal.dim),
            )),
            None => {}
        }
        if state.loading {
            spans.push(Span::styled(
                format!("  {}", t(lang, "loading.news")),
                Style::default().fg(pal.accent),
            ));
        } else if let Some(at) = state.last_updated {
            spans.push(Span::styled(
                format!("  {}", at.with_timezone(&chrono::Local).format("%H:%M")),
                Style::default().fg(pal.dim),
            ));
        }
    } else {
        spans.push(Span::styled(
            format!("  ({})", state.bookmarks.len()),
            Style::default().fg(pal.dim),
        ));
    }

    let block = Block::default().borders(Borders::ALL);
    let para = Paragraph::new(Line::from(spans)).block(block);
    f.render_widget(para, area);
}

fn draw_ticker(f: &mut Frame, state: &AppState, pal: &Palette, area: Rect) {
    if state.coins.is_empty() {
        let line = Line::from(Span::styled(
            format!(" {}", t(state.language, "crypto.loading")),
            Style::default().fg(pal.dim),
        ));
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    let mut spans: Vec<Span> = vec![Span::raw(" ")];
    for coin in &state.coins {
        let change = coin.price_change_percentage_24h;
        let color = if change >= 0.0 { Color::Green } else { Color::Red };
        spans.push(Span::styled(
            coin.symbol.to_uppercase(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(format!(" {} ", format_price(coin.current_price))));
        spans.push(Span::styled(format_change(change), Style::default().fg(color)));
        spans.push(Span::styled("  \u{00b7}  ", Style::default().fg(pal.dim)));
    }
    spans.pop();
    if !state.ticker_live {
        spans.push(Span::styled("  *", Style::default().fg(Color::Yellow)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn draw_filter_bar(f: &mut Frame, state: &AppState, view: &ViewState, pal: &Palette, area: Rect) {
    let lang = state.language;

    if let Some(input) = &view.search_input {
        let line = Line::from(vec![
            Span::styled(format!(" {} ", t(lang, "search.button")), Style::default().fg(pal.key)),
            Span::styled(format!("{}_", input), Style::default().add_modifier(Modifier::BOLD)),
        ]);
        f.render_widget(Paragraph::new(line), area);
        return;
    }

    if view.view == View::Bookmarks {
        f.render_widget(Paragraph::new(""), area);
        return;
    }

    let filters = &state.filters;
    let source = filters
        .source()
        .map(source_label)
        .unwrap_or_else(|| t(lang, "source.all"));
    let period = match filters.period() {
        Some(Period::Day) => t(lang, "time.24h"),
        Some(Period::Week) => t(lang, "time.week"),
        None => t(lang, "time.latest"),
    };
    let sentiment = filters
        .sentiment()
        .map(|s| t(lang, sentiment_key(s)))
        .unwrap_or_else(|| t(lang, "sentiment.all"));

    let label = Style::default().fg(pal.dim);
    let mut spans = vec![
        Span::styled(format!(" {}: ", t(lang, "filter.source")), label),
        Span::raw(source),
        Span::styled(format!("  {}: ", t(lang, "filter.time")), label),
        Span::raw(period),
        Span::styled(format!("  {}: ", t(lang, "filter.sentiment")), label),
        Span::raw(sentiment),
    ];
    if let Some(term) = filters.search() {
        spans.push(Span::styled("  / ", label));
        spans.push(Span::styled(term.to_string(), Style::default().fg(pal.accent)));
    }
    f.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn sentiment_key(sentiment: Sentiment) -> &'static str {
    match sentiment {
        Sentiment::Positive => "sentiment.positive",
        Sentiment::Neutral => "sentiment.neutral",
        Sentiment::Negative => "sentiment.negative",
    }
}

fn sentiment_color(sentiment: Option<Sentiment>, pal: &Palette) -> Color {
    match sentiment {
        Some(Sentiment::Positive) => Color::Green,
        Some(Sentiment::Negative) => Color::Red,
        _ => pal.dim,
    }
}

fn draw_articles(f: &mut Frame, state: &AppState, view: &ViewState, pal: &Palette, area: Rect) {
    let lang = state.language;
    let articles = view.rows(state);

    if articles.is_empty() {
        let (title_key, desc_key) = match view.view {
            View::Feed if state.loading => ("loading.news", ""),
            View::Feed => ("empty.news.title", "empty.news.description"),
            View::Bookmarks => ("empty.bookmarks.title", "empty.bookmarks.description"),
        };
        let mut lines = vec![
            Line::from(""),
            Line::from(Span::styled(
                t(lang, title_key),
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            )),
        ];
        if !desc_key.is_empty() {
            lines.push(Line::from(Span::styled(t(lang, desc_key), Style::default().fg(pal.dim))));
        }
        let para = Paragraph::new(lines)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().borders(Borders::ALL));
        f.render_widget(para, area);
        return;
    }

    let inner_width = area.width.saturating_sub(2) as usize;
    let fixed = 16 + 18 + 3 + 3;
    let title_w = inner_width.saturating_sub(fixed).max(10);
    let now = chrono::Utc::now();

    let visible_lines = area.height.saturating_sub(2) as usize; // borders
    let offset = view.selected.saturating_sub(visible_lines.saturating_sub(1));

    let rows: Vec<Row> = articles
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible_lines)
        .map(|(i, a)| article_row(a, i == view.selected, state, pal, title_w, now))
        .collect();

    let title = format!(
        " {} [{}/{}] ",
        match view.view {
            View::Feed => t(lang, "nav.dashboard"),
            View::Bookmarks => t(lang, "nav.bookmarks"),
        },
        view.selected + 1,
        articles.len()
    );

    let table = Table::new(
        rows,
        [
            Constraint::Length(3),
            Constraint::Length(16),
            Constraint::Length(18),
            Constraint::Min(10),
        ],
    )
    .block(Block::default().title(title).borders(Borders::ALL));

    f.render_widget(table, area);
}

fn article_row<'a>(
    article: &'a Article,
    selected: bool,
    state: &AppState,
    pal: &Palette,
    title_w: usize,
    now: chrono::DateTime<chrono::Utc>,
) -> Row<'a> {
    let mark = if state.is_bookmarked(&article.id) { "\u{2605}" } else { " " };
    let age = article
        .published()
        .map(|ts| time_ago(state.language, ts, now))
        .unwrap_or_default();
    let cells = vec![
        Cell::from(mark).style(Style::default().fg(pal.key)),
        Cell::from(age).style(Style::default().fg(pal.dim)),
        Cell::from(source_label(&article.domain).to_string())
            .style(Style::default().fg(sentiment_color(article.sentiment, pal))),
        Cell::from(truncate_with_ellipsis(&article.title, title_w).into_owned()),
    ];
    let row = Row::new(cells);
    if selected {
        row.style(Style::default().bg(pal.selected_bg).add_modifier(Modifier::BOLD))
    } else {
        row
    }
}

fn draw_detail(f: &mut Frame, state: &AppState, view: &ViewState, pal: &Palette, area: Rect) {
    let block = Block::default().borders(Borders::ALL);
    let Some(article) = view.selected_article(state) else {
        f.render_widget(block, area);
        return;
    };

    let lang = state.language;
    let mut head = vec![Span::styled(
        article.source_name.clone(),
        Style::default().fg(pal.accent),
    )];
    if let Some(s) = article.sentiment {
        head.push(Span::styled(
            format!("  {}", t(lang, sentiment_key(s))),
            Style::default().fg(sentiment_color(Some(s), pal)),
        ));
    }
    if let Some(votes) = &article.votes {
        head.push(Span::styled(
            format!("  +{} -{}", votes.positive, votes.negative),
            Style::default().fg(pal.dim),
        ));
    }
    if !article.currencies.is_empty() {
        head.push(Span::styled(
            format!("  {}", article.currencies.join(" ")),
            Style::default().fg(pal.dim),
        ));
    }

    let lines = vec![
        Line::from(head),
        Line::from(Span::styled(article.url.clone(), Style::default().fg(pal.dim))),
        Line::from(article.description.clone().unwrap_or_default()),
    ];
    let para = Paragraph::new(lines).wrap(Wrap { trim: true }).block(block);
    f.render_widget(para, area);
}

fn draw_notices(f: &mut Frame, state: &AppState, pal: &Palette, area: Rect) {
    let max_width = area.width.saturating_sub(2) as usize; // borders
    let visible_lines = area.height.saturating_sub(2) as usize;

    let lines: Vec<Line> = state
        .notices
        .iter()
        .rev()
        .take(visible_lines)
        .map(|n| {
            let color = match n.level {
                NoticeLevel::Warning => Color::Yellow,
                NoticeLevel::Success => Color::Green,
                NoticeLevel::Info => pal.dim,
            };
            let prefix = format!(" {} [{}] ", n.time, n.level.label());
            let msg = match &n.detail {
                Some(detail) => format!("{} ({})", t(state.language, n.key), detail),
                None => t(state.language, n.key).to_string(),
            };
            let msg = truncate_with_ellipsis(&msg, max_width.saturating_sub(prefix.len()));
            Line::from(vec![
                Span::styled(prefix, Style::default().fg(color)),
                Span::raw(msg.into_owned()),
            ])
        })
        .collect();

    let block = Block::default().borders(Borders::ALL);
    f.render_widget(Paragraph::new(lines).block(block), area);
}

fn draw_footer(f: &mut Frame, state: &AppState, view: &ViewState, pal: &Palette, area: Rect) {
    let lang = state.language;
    let key = Style::default().fg(pal.key);

    let line = if view.search_input.is_some() {
        Line::from(vec![
            Span::styled("  [Enter]", key),
            Span::raw(format!(" {}  ", t(lang, "search.button"))),
            Span::styled("[Esc]", key),
            Span::raw(" \u{2715}  "),
        ])
    } else {
        let mut spans = vec![
            Span::styled("  [q]", key),
            Span::raw(format!(" {}  ", t(lang, "button.quit"))),
            Span::styled("[Tab]", key),
            Span::raw(format!(
                " {}  ",
                match view.view {
                    View::Feed => t(lang, "nav.bookmarks"),
                    View::Bookmarks => t(lang, "nav.dashboard"),
                }
            )),
            Span::styled("[j/k]", key),
            Span::raw(" \u{2195}  "),
            Span::styled("[Space]", key),
            Span::raw(format!(" {}  ", t(lang, "button.bookmark"))),
        ];
        match view.view {
            View::Feed => spans.extend([
                Span::styled("[/]", key),
                Span::raw(format!(" {}  ", t(lang, "search.button"))),
                Span::styled("[s/p/e]", key),
                Span::raw(format!(" {}  ", t(lang, "filter.filters"))),
                Span::styled("[x]", key),
                Span::raw(format!(" {}  ", t(lang, "filter.reset"))),
                Span::styled("[r]", key),
                Span::raw(format!(" {}  ", t(lang, "button.refresh"))),
            ]),
            View::Bookmarks => spans.extend([
                Span::styled("[c]", key),
                Span::raw(format!(" {}  ", t(lang, "button.clear"))),
            ]),
        }
        spans.extend([
            Span::styled("[t]", key),
            Span::raw(format!(" {}  ", t(lang, "button.theme"))),
            Span::styled("[l]", key),
            Span::raw(format!(" {} ({})  ", t(lang, "button.language"), lang.code())),
        ]);
        Line::from(spans)
    };
    f.render_widget(Paragraph::new(line), area);
}

fn truncate_with_ellipsis(s: &str, max_width: usize) -> Cow<'_, str> {
    let char_count = s.chars().count();
    if char_count <= max_width {
        Cow::Borrowed(s)
    } else if max_width <= 3 {
        Cow::Owned(".".repeat(max_width))
    } else {
        let end = s
            .char_indices()
            .nth(max_width - 3)
            .map(|(i, _)| i)
            .unwrap_or(s.len());
        Cow::Owned(format!("{}...", &s[..end]))
    }
}
