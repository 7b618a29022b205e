pub mod render;
pub mod state;

use crate::feed::types::{Article, Sentiment};
use crate::filter::{FilterState, Period};
use crate::i18n::NEWS_SOURCES;
use crate::prefs::Language;
use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use state::{AppState, View, ViewState};
use std::io::stdout;
use std::time::Duration;
use tokio::sync::watch;

/// Commands the TUI can send back to the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum TuiCommand {
    Quit,
    Refresh,
    SetFilters(FilterState),
    ToggleBookmark(Article),
    ClearBookmarks,
    SetLanguage(Language),
    ToggleTheme,
}

/// Run the TUI. Reads state from `state_rx`, sends commands on `cmd_tx`.
pub async fn run_tui(
    state_rx: watch::Receiver<AppState>,
    cmd_tx: tokio::sync::mpsc::Sender<TuiCommand>,
) -> Result<()> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = tui_loop(&mut terminal, state_rx, cmd_tx).await;

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn tui_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut state_rx: watch::Receiver<AppState>,
    cmd_tx: tokio::sync::mpsc::Sender<TuiCommand>,
) -> Result<()> {
    let mut view = ViewState::default();
    loop {
        let state = state_rx.borrow_and_update().clone();
        view.clamp(&state);
        terminal.draw(|f| render::draw(f, &state, &view))?;

        // Poll for keyboard events with 100ms timeout; redraw either way so
        // relative timestamps and incoming batches stay current.
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(cmd) = handle_key(&mut view, &state, key) {
                        let quit = cmd == TuiCommand::Quit;
                        let _ = cmd_tx.send(cmd).await;
                        if quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

/// Map one key press to a view change and/or an engine command.
pub fn handle_key(view: &mut ViewState, state: &AppState, key: KeyEvent) -> Option<TuiCommand> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(TuiCommand::Quit);
    }

    if let Some(input) = view.search_input.as_mut() {
        match key.code {
            KeyCode::Char(c) => input.push(c),
            KeyCode::Backspace => {
                input.pop();
            }
            KeyCode::Esc => view.search_input = None,
            KeyCode::Enter => {
                let term = std::mem::take(input);
                view.search_input = None;
                view.selected = 0;
                let filters = FilterState {
                    search: (!term.trim().is_empty()).then_some(term),
                    ..state.filters.clone()
                };
                return set_filters(state, filters);
            }
            _ => {}
        }
        return None;
    }

    match key.code {
        KeyCode::Char('q') => Some(TuiCommand::Quit),
        KeyCode::Tab | KeyCode::Char('b') => {
            view.view = match view.view {
                View::Feed => View::Bookmarks,
                View::Bookmarks => View::Feed,
            };
            view.selected = 0;
            None
        }
        KeyCode::Char('j') | KeyCode::Down => {
            if view.selected + 1 < view.rows(state).len() {
                view.selected += 1;
            }
            None
        }
        KeyCode::Char('k') | KeyCode::Up => {
            view.selected = view.selected.saturating_sub(1);
            None
        }
        KeyCode::Char('g') => {
            view.selected = 0;
            None
        }
        KeyCode::Char('G') => {
            view.selected = view.rows(state).len().saturating_sub(1);
            None
        }
        KeyCode::Enter | KeyCode::Char(' ') => view
            .selected_article(state)
            .map(|a| TuiCommand::ToggleBookmark(a.clone())),
        KeyCode::Char('c') if view.view == View::Bookmarks && !state.bookmarks.is_empty() => {
            Some(TuiCommand::ClearBookmarks)
        }
        KeyCode::Char('r') => Some(TuiCommand::Refresh),
        KeyCode::Char('t') => Some(TuiCommand::ToggleTheme),
        KeyCode::Char('l') => Some(TuiCommand::SetLanguage(state.language.toggled())),
        KeyCode::Char('/') if view.view == View::Feed => {
            view.search_input = Some(state.filters.search().unwrap_or_default().to_string());
            None
        }
        KeyCode::Char('s') if view.view == View::Feed => {
            view.selected = 0;
            let filters = FilterState {
                source: next_source(state.filters.source()),
                ..state.filters.clone()
            };
            set_filters(state, filters)
        }
        KeyCode::Char('p') if view.view == View::Feed => {
            view.selected = 0;
            let filters = FilterState {
                period: next_period(state.filters.period()).map(|p| p.as_str().to_string()),
                ..state.filters.clone()
            };
            set_filters(state, filters)
        }
        KeyCode::Char('e') if view.view == View::Feed => {
            view.selected = 0;
            let filters = FilterState {
                sentiment: next_sentiment(state.filters.sentiment()).map(|s| s.as_str().to_string()),
                ..state.filters.clone()
            };
            set_filters(state, filters)
        }
        KeyCode::Char('x') if view.view == View::Feed => {
            view.selected = 0;
            set_filters(state, FilterState::default())
        }
        _ => None,
    }
}

fn set_filters(state: &AppState, filters: FilterState) -> Option<TuiCommand> {
    (filters != state.filters).then_some(TuiCommand::SetFilters(filters))
}

/// All sources, then each known domain in turn, then back to all.
fn next_source(current: Option<&str>) -> Option<String> {
    let next = match current {
        None => NEWS_SOURCES.first(),
        Some(domain) => NEWS_SOURCES
            .iter()
            .position(|(d, _)| *d == domain)
            .and_then(|i| NEWS_SOURCES.get(i + 1)),
    };
    next.map(|(domain, _)| domain.to_string())
}

fn next_period(current: Option<Period>) -> Option<Period> {
    match current {
        None => Some(Period::Day),
        Some(Period::Day) => Some(Period::Week),
        Some(Period::Week) => None,
    }
}

fn next_sentiment(current: Option<Sentiment>) -> Option<Sentiment> {
    match current {
        None => Some(Sentiment::ALL[0]),
        Some(s) => {
            let i = Sentiment::ALL.iter().position(|x| *x == s)?;
            Sentiment::ALL.get(i + 1).copied()
        }
    }
}
