use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{
        disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, SetTitle,
    },
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    Frame, Terminal,
};

use tekstitv_core::{
    page::HttpPageSource, settings::JsonSettingsStore, AppConfig, NavigationController, PageCache,
    SettingsService,
};
use tekstitv_tui::{
    app::App,
    event::{AppEvent, EventHandler},
    input::handle_key_event,
    widgets::{HeaderWidget, LinksBarWidget, PageViewWidget},
};

/// Terminal width at which the link bar moves to a side column
/// (the landscape layout of the original app)
const WIDE_LAYOUT_COLS: u16 = 72;

const HEADER_ROWS: u16 = 1;
const LINK_BAR_ROWS: u16 = 2;
const LINK_BAR_COLS: u16 = 16;

pub async fn run(config: Arc<AppConfig>) -> Result<()> {
    // Wire the engine: source -> cache -> controller, settings on the side
    let source = Arc::new(HttpPageSource::new(&config)?);
    let cache = PageCache::new(source);
    let store = JsonSettingsStore::open(config.settings_path())?;
    let settings = Arc::new(SettingsService::load(Box::new(store)));
    let settings_rx = settings.subscribe();
    let controller = Arc::new(NavigationController::new(cache, settings));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableMouseCapture,
        SetTitle("Teksti-TV")
    )?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    tracing::debug!("Terminal UI started");

    let mut app = App::new(controller, settings_rx, &config);
    app.load_initial_page();

    let event_handler = EventHandler::new(config.ui.tick_rate_ms);

    let result = event_loop(&mut terminal, &mut app, &event_handler);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &EventHandler,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        match event_handler.next()? {
            Some(AppEvent::Key(key)) => {
                let action = handle_key_event(key, app.entry_active());
                app.handle_action(action);
            }
            Some(AppEvent::Mouse(mouse)) => app.on_mouse(mouse),
            Some(AppEvent::FocusGained) => app.on_focus_gained(),
            Some(AppEvent::Resize(_, _)) => {}
            Some(AppEvent::Tick) => app.tick(),
            None => {}
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let show_links = app.settings().show_links;
    let wide = area.width >= WIDE_LAYOUT_COLS;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(HEADER_ROWS), Constraint::Min(0)])
        .split(area);

    HeaderWidget::render(frame, rows[0], app);

    let body = rows[1];
    if !show_links {
        PageViewWidget::render(frame, body, app);
        return;
    }

    if wide {
        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(LINK_BAR_COLS)])
            .split(body);
        PageViewWidget::render(frame, columns[0], app);
        LinksBarWidget::render(frame, columns[1], app, true);
    } else {
        let stacked = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(LINK_BAR_ROWS)])
            .split(body);
        PageViewWidget::render(frame, stacked[0], app);
        LinksBarWidget::render(frame, stacked[1], app, false);
    }
}
