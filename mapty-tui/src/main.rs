// mapty-tui/src/main.rs
use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mapty_lib::AppService;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{fs::OpenOptions, io, path::PathBuf, sync::Mutex, time::Duration};

mod app; // Application state
mod ui; // UI rendering logic

use crate::app::{App, CanvasMap, TuiView};

const LOG_FILE_NAME: &str = "mapty-tui.log";

fn main() -> Result<()> {
    let log_path = init_logging().context("Failed to set up logging")?;

    let app_service =
        AppService::initialize(None).context("Failed to initialize application service")?;
    let mut controller = app_service
        .build_controller(TuiView::new(), CanvasMap::new())
        .context("Failed to open workout storage")?;
    // The position arrives through the controller's event queue.
    let _locator = controller.start(app_service.geolocation());

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(controller);
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("Error: {err:?}");
        eprintln!("See {} for details.", log_path.display());
    }

    Ok(())
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        app.tick();

        terminal.draw(|f| ui::render_ui(f, app))?;

        // Short poll so the position event is picked up promptly
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => app.handle_key_event(key),
                Event::Mouse(mouse) => app.handle_mouse_event(mouse),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Logs go to a file in the data directory; the terminal belongs to the UI.
/// `RUST_LOG` overrides the default filter.
fn init_logging() -> Result<PathBuf> {
    let log_dir = dirs::data_dir()
        .context("Failed to get application data directory")?
        .join("mapty");
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join(LOG_FILE_NAME);
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn,mapty_tui=info,mapty_lib=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .with_target(true)
        .init();

    tracing::info!("mapty-tui starting");
    Ok(log_path)
}
