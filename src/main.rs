//! A terminal gallery of a student organization's projects and activities.
//!
//! Run the binary with a catalog file to browse it.  Each page remembers its
//! filter and scroll position for the rest of the terminal session.

mod app;
mod config;
mod core;
mod ui;

use std::fs::File;
use std::io::{self, stderr};
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame, Terminal,
};
use tracing_subscriber::EnvFilter;

use crate::app::{
    event::{spawn_event_reader, AppEvent},
    handler,
    page::PageId,
    state::{ActiveView, AppState},
};
use crate::core::catalog::Catalog;
use crate::core::storage::SessionStore;
use crate::ui::{
    detail::DetailWidget, layout::AppLayout, popup, spinner::LoadingIndicator, theme::Theme,
};

// ───────────────────────────────────────── CLI ───────────────

#[derive(Parser, Debug)]
#[command(name = env!("CARGO_PKG_NAME"), about = "Browse club projects and activities")]
struct Cli {
    /// Catalog JSON file.
    #[arg(default_value = "catalog.json")]
    catalog: PathBuf,

    /// Page to open first.
    #[arg(long, value_enum, default_value_t = PageId::Projects)]
    page: PageId,

    /// Session name for saved positions (defaults to the parent shell's pid).
    #[arg(long)]
    session: Option<String>,

    /// Items per "load more" step, overriding the config file.
    #[arg(long)]
    page_size: Option<usize>,

    /// Also restore how many items were loaded, not just the filter.
    #[arg(long)]
    full_restore: bool,

    /// Write logs here instead of stderr.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_tracing(log_file: Option<&PathBuf>) -> Result<()> {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        // Never pollute stdout.
        None => builder.with_writer(io::stderr).init(),
    }
    Ok(())
}

// ───────────────────────────────────────── drawing ───────────

fn draw(frame: &mut Frame, state: &mut AppState) {
    let now = Instant::now();
    state.terminal_area = frame.area();
    state.layout(now);
    let layout = AppLayout::from_area(frame.area());

    let page_block = Block::default()
        .title(format!(" {} ", state.page.title()))
        .title_style(Theme::title_style())
        .borders(Borders::ALL)
        .border_style(Theme::border_style());
    frame.render_widget(page_block, layout.page_area);

    match (&state.catalog, &state.load_error) {
        (Some(catalog), _) => {
            let stagger = state.config.reveal_stagger();
            state
                .page
                .render(catalog, stagger, now, layout.page_inner, frame.buffer_mut());
        }
        (None, Some(error)) => {
            let message = Paragraph::new(vec![
                Line::styled("Could not load the catalog", Theme::error_style()),
                Line::raw(""),
                Line::styled(error.as_str(), Theme::dim_style()),
            ])
            .wrap(Wrap { trim: false });
            frame.render_widget(message, layout.page_inner);
        }
        (None, None) => {}
    }

    frame.render_widget(
        LoadingIndicator {
            visible: state.catalog.is_none() && state.load_error.is_none(),
            tick: state.tick,
            label: "loading catalog",
        },
        layout.page_area,
    );

    let status_text = match (&state.status_message, &state.catalog) {
        (Some(message), _) => message.clone(),
        (None, Some(catalog)) => format!(
            "{}  {}",
            state.page.status(catalog),
            state.config.status_bar_hint()
        ),
        (None, None) => state.config.status_bar_hint(),
    };
    let status = Paragraph::new(status_text).style(Theme::status_bar_style());
    frame.render_widget(status, layout.status_area);

    match state.active_view {
        ActiveView::SettingsMenu => {
            frame.render_widget(popup::SettingsPopup { state: &*state }, frame.area());
        }
        ActiveView::ControlsSubmenu => {
            frame.render_widget(
                popup::ControlsPopup {
                    config: &state.config,
                    selected: state.controls_selected,
                    awaiting_rebind: state.awaiting_rebind,
                },
                frame.area(),
            );
        }
        ActiveView::Detail => {
            if let Some(detail) = &state.detail {
                let area = frame.area();
                let zones = DetailWidget {
                    view: &detail.view,
                    media_index: detail.media_index,
                    preview: state.preview(),
                }
                .render_and_hit(area, frame.buffer_mut());
                state.detail_hit_zones = Some(zones);
            }
        }
        ActiveView::Gallery => {}
    }
}

// ───────────────────────────────────────── main ──────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_file.as_ref())?;

    // ── configuration ─────────────────────────────────────────
    let config_file = config::config_path();
    let mut user_config = config::AppConfig::load_from(&config_file);
    if let Some(page_size) = cli.page_size {
        user_config.page_size = page_size.max(1);
    }
    if cli.full_restore {
        user_config.restore_visible_count = true;
    }

    let store = SessionStore::for_session(cli.session.as_deref());
    tracing::info!(
        catalog = %cli.catalog.display(),
        session = %store.dir().display(),
        "starting"
    );

    let (tx, mut events) = tokio::sync::mpsc::unbounded_channel::<AppEvent>();
    let mut state = AppState::new(
        &cli.catalog,
        cli.page,
        store,
        tx.clone(),
        user_config,
        config_file,
    );

    // ── background catalog load ───────────────────────────────
    {
        let tx = tx.clone();
        let path = cli.catalog.clone();
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(AppEvent::CatalogLoaded(Catalog::load(&path)));
        });
    }

    // ── terminal setup ────────────────────────────────────────
    enable_raw_mode()?;
    let mut stderr_handle = stderr();
    execute!(stderr_handle, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stderr());
    let mut terminal = Terminal::new(backend)?;

    spawn_event_reader(tx, Duration::from_millis(50));

    // ── event loop ────────────────────────────────────────────
    loop {
        terminal.draw(|frame| draw(frame, &mut state))?;

        let Some(event) = events.recv().await else {
            break;
        };
        match event {
            AppEvent::Key(k) => {
                state.status_message = None;
                handler::handle_key(&mut state, k);
            }
            AppEvent::Mouse(m) => handler::handle_mouse(&mut state, m),
            AppEvent::Resize(width, height) => {
                tracing::debug!(width, height, "terminal resized");
            }
            AppEvent::Tick => state.tick = state.tick.wrapping_add(1),
            AppEvent::Timer(id, timer) => {
                tracing::trace!(?id, ?timer, "timer fired");
                state.on_timer(id);
            }
            AppEvent::CatalogLoaded(result) => state.catalog_loaded(result),
            AppEvent::MediaDecoded { path, result } => state.media_decoded(path, result),
        }

        if state.should_quit {
            break;
        }
    }

    state.shutdown();

    // ── teardown ──────────────────────────────────────────────
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    Ok(())
}
