//! Back-office console entry point.

use backoffice_tui::clients::Clients;
use backoffice_tui::config::TuiConfig;
use backoffice_tui::error::TuiError;
use backoffice_tui::events::TuiEvent;
use backoffice_tui::logging;
use backoffice_tui::persistence;
use backoffice_tui::state::App;
use backoffice_tui::views::render_view;
use crossterm::{
    event::{self, Event as CrosstermEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::time::Duration;
use tokio::sync::mpsc;

const TICK_RATE: Duration = Duration::from_millis(250);

#[tokio::main]
async fn main() -> Result<(), TuiError> {
    let config = TuiConfig::load()?;
    logging::init(&config.log_path)?;
    let clients = Clients::rest(&config)?;

    let (event_tx, mut event_rx) = mpsc::channel::<TuiEvent>(256);
    let mut app = App::new(config, clients, event_tx.clone());
    let start_view = match persistence::load(&app.config.persistence_path) {
        Ok(Some(state)) => state.active_view,
        Ok(None) => app.active_view,
        Err(err) => {
            tracing::warn!(error = %err, "Ignoring unreadable UI state");
            app.active_view
        }
    };

    let mut terminal = setup_terminal()?;
    let _guard = TerminalGuard;

    spawn_input_reader(event_tx.clone());
    app.switch_to(start_view);

    let mut ticker = tokio::time::interval(TICK_RATE);

    loop {
        terminal.draw(|f| render_view(f, &app))?;

        tokio::select! {
            _ = ticker.tick() => {
                app.handle_event(TuiEvent::Tick);
            }
            Some(event) = event_rx.recv() => {
                if app.handle_event(event) {
                    break;
                }
            }
        }
    }

    if let Err(err) = persistence::save(&app.config.persistence_path, &app.persisted_state()) {
        tracing::warn!(error = %err, "Failed to save UI state");
    }
    tracing::info!("Console closed");

    Ok(())
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, TuiError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = io::stdout();
        let _ = execute!(stdout, LeaveAlternateScreen);
    }
}

fn spawn_input_reader(sender: mpsc::Sender<TuiEvent>) {
    std::thread::spawn(move || loop {
        if let Ok(true) = event::poll(Duration::from_millis(200)) {
            if let Ok(evt) = event::read() {
                let sent = match evt {
                    CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => {
                        sender.blocking_send(TuiEvent::Input(key))
                    }
                    CrosstermEvent::Resize(width, height) => {
                        sender.blocking_send(TuiEvent::Resize { width, height })
                    }
                    _ => Ok(()),
                };
                if sent.is_err() {
                    break;
                }
            }
        }
    });
}
