// TUI event loop and terminal management
use std::io;
use std::time::Duration;

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use repofinder_cache::KeyValueStore;
use repofinder_core::{SortKey, UiEvent, ViewController};
use tokio::sync::{mpsc, watch};
use tracing::{debug, warn};

use crate::{
    app::{App, FilterField, InputMode},
    surface::{Snapshot, WatchSurface},
};

const TICK: Duration = Duration::from_millis(100);

/// Run the page until the user quits
///
/// The controller lives on its own task for the whole session; this loop
/// only turns keys into `UiEvent`s and draws the newest frame.
pub async fn run_tui<S>(
    mut app: App,
    controller: ViewController<S>,
    mouse_enabled: bool,
) -> anyhow::Result<()>
where
    S: KeyValueStore + 'static,
{
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (surface, frames) = WatchSurface::channel();
    let controller_task = tokio::spawn(controller.run(events_rx, surface));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    if mouse_enabled {
        execute!(stdout, EnableMouseCapture)?;
    }
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, &mut app, &frames, &events_tx);

    // Restore terminal even when the loop bailed out
    disable_raw_mode()?;
    if mouse_enabled {
        execute!(terminal.backend_mut(), DisableMouseCapture)?;
    }
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Dropping the sender ends the controller's subscription
    drop(events_tx);
    controller_task.await?;

    result
}

fn event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    frames: &watch::Receiver<Snapshot>,
    events: &mpsc::UnboundedSender<UiEvent>,
) -> anyhow::Result<()> {
    loop {
        app.sync(&frames.borrow());
        terminal.draw(|f| crate::ui::render(f, app))?;

        if !event::poll(TICK)? {
            continue;
        }

        let outgoing = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
            Event::Mouse(mouse) => {
                match mouse.kind {
                    MouseEventKind::ScrollDown => app.next_row(),
                    MouseEventKind::ScrollUp => app.previous_row(),
                    _ => {}
                }
                None
            }
            _ => None,
        };

        if let Some(ui_event) = outgoing {
            debug!("UI event: {:?}", ui_event);
            events.send(ui_event)?;
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Translate one key press into app state changes and, maybe, a controller event
fn handle_key(app: &mut App, key: KeyEvent) -> Option<UiEvent> {
    match app.input_mode {
        InputMode::Searching => match key.code {
            KeyCode::Enter => app.submit_search(),
            KeyCode::Char(c) => {
                app.search_input.push(c);
                None
            }
            KeyCode::Backspace => {
                app.search_input.pop();
                None
            }
            KeyCode::Esc => {
                app.enter_normal_mode();
                None
            }
            _ => None,
        },
        InputMode::Filtering => match key.code {
            KeyCode::Esc => {
                app.status_message = None;
                app.enter_normal_mode();
                None
            }
            KeyCode::Tab | KeyCode::Down | KeyCode::Char('j') => {
                app.next_filter_field();
                None
            }
            KeyCode::BackTab | KeyCode::Up | KeyCode::Char('k') => {
                app.previous_filter_field();
                None
            }
            KeyCode::Enter | KeyCode::Char(' ') => match app.filter_field {
                FilterField::MinStars => {
                    app.input_mode = InputMode::EditingStars;
                    None
                }
                FilterField::Type => {
                    app.cycle_type();
                    None
                }
                FilterField::Apply => app.submit_filter(),
            },
            _ => None,
        },
        InputMode::EditingStars => {
            match key.code {
                KeyCode::Char(c) if c.is_ascii_digit() || c == '.' => app.stars_input.push(c),
                KeyCode::Backspace => {
                    app.stars_input.pop();
                }
                KeyCode::Enter | KeyCode::Tab => {
                    app.input_mode = InputMode::Filtering;
                    app.next_filter_field();
                }
                KeyCode::Esc => app.input_mode = InputMode::Filtering,
                _ => {}
            }
            None
        }
        InputMode::Normal => match key.code {
            KeyCode::Char('q') => {
                app.quit();
                None
            }
            KeyCode::Char('/') => {
                app.enter_search_mode();
                None
            }
            KeyCode::Char('f') | KeyCode::Char('F') => {
                app.enter_filter_mode();
                None
            }
            KeyCode::Char('n') => app.sort(SortKey::Name),
            KeyCode::Char('s') => app.sort(SortKey::Stars),
            KeyCode::Char('m') => app.load_more(),
            KeyCode::Char('j') | KeyCode::Down => {
                app.next_row();
                None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.previous_row();
                None
            }
            KeyCode::Enter => {
                if app.load_more_selected() {
                    return app.load_more();
                }
                if let Some(url) = app.selected_url() {
                    let url = url.to_string();
                    if let Err(e) = open::that(&url) {
                        warn!("Failed to open {}: {}", url, e);
                        app.status_message = Some(format!("Failed to open browser: {}", e));
                    }
                }
                None
            }
            _ => None,
        },
    }
}
