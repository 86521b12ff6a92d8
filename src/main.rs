//! regdesk - Terminal User Registration
//!
//! A terminal form that registers users by name and email, stores them in
//! a local key-value store, lists them and clears them.

use std::io;
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use tracing::{error, info};

use regdesk::application::App;
use regdesk::infrastructure::{init_logging, Config, RecordRepository};
use regdesk::presentation::{render_ui, InputHandler};

/// Entry point for the registration desk.
///
/// Reads the configuration, sets up logging and the terminal, loads the
/// stored users and runs the event loop until the user quits.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened or if terminal setup
/// fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::parse();
    init_logging(&config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        data_dir = %config.data_dir.display(),
        ephemeral = config.ephemeral,
        "starting regdesk"
    );

    let repository = RecordRepository::new(config.open_store());

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(repository);
    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        error!(error = %err, "event loop failed");
        println!("{err:?}");
    }
    info!("regdesk stopped");

    Ok(())
}

/// Main application event loop.
///
/// Each key press runs its action to completion before the next key is
/// read, so storage calls never overlap.
fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| render_ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                if InputHandler::is_quit(key.code, key.modifiers) {
                    return Ok(());
                }
                InputHandler::handle_key_event(app, key.code, key.modifiers);
            }
        }
    }
}
