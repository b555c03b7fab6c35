// Rolodex TUI - Terminal-based contact book
mod app;
mod config;
mod directory;
mod event;
mod logger;
mod platform;
mod storage;
mod ui;

use app::App;
use crossterm::{
    event::{
        DisableMouseCapture, EnableMouseCapture, DisableBracketedPaste, EnableBracketedPaste,
        KeyboardEnhancementFlags, PushKeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use event::EventHandler;
use platform::SystemPlatform;
use ratatui::{
    backend::CrosstermBackend,
    Terminal,
};
use std::io;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize storage directories
    if let Err(e) = storage::init_storage() {
        eprintln!("Failed to initialize storage: {}", e);
        std::process::exit(1);
    }

    // Initialize logger (no console output)
    logger::init_logger()?;
    logger::log_to_file(&format!("{} {} starting", config::APP_NAME, config::APP_VERSION));

    // Load or create config
    let app_config = match storage::load_config() {
        Ok(cfg) => cfg,
        Err(_) => {
            let cfg = storage::Config {
                server_url: config::DEFAULT_SERVER_URL.to_string(),
                opener_command: config::DEFAULT_OPENER_COMMAND.to_string(),
            };
            if let Err(e) = storage::save_config(&cfg) {
                logger::log_to_file(&format!("Failed to save default config: {}", e));
            }
            cfg
        }
    };

    // Setup event handler
    let mut event_handler = EventHandler::new();
    event_handler.spawn_keyboard_listener();
    event_handler.spawn_tick_timer(Duration::from_millis(250));

    // Initialize application state
    let platform = SystemPlatform::new(app_config.opener_command.clone());
    let mut app = App::initialize(app_config, Box::new(platform), event_handler.sender());

    // Load the contact list right away
    app.refresh_contacts();

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();

    // Basic terminal setup (works everywhere)
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture, EnableBracketedPaste)?;

    // Try keyboard enhancements (modern terminals only - gracefully fail on old Windows)
    let keyboard_enhancements_supported = execute!(
        stdout,
        PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
        )
    ).is_ok();

    if !keyboard_enhancements_supported {
        logger::log_to_file("Keyboard enhancements not supported, using fallback keys");
    }

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main event loop
    let result = run_app(&mut terminal, &mut app, &mut event_handler).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture,
        DisableBracketedPaste,
        PopKeyboardEnhancementFlags
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        logger::log_to_file(&format!("Error: {:?}", err));
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    event_handler: &mut EventHandler,
) -> io::Result<()> {
    loop {
        // Draw UI
        terminal.draw(|f| {
            render_ui(f, app);
        })?;

        // Handle events
        if let Some(event) = event_handler.next().await {
            app.handle_event(event);
        }

        // Check if should quit
        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn render_ui(f: &mut ratatui::Frame, app: &App) {
    use ratatui::layout::{Constraint, Direction, Layout};

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Main content (fills remaining space)
            Constraint::Length(2), // Hints (2 lines of text)
        ])
        .split(f.area());

    // Render different views based on state
    match app.menu_state {
        app::MenuState::Contacts => {
            ui::render_contacts_view(f, app, chunks[0]);
        }
        app::MenuState::Detail => {
            ui::render_detail_view(f, app, chunks[0]);
        }
        app::MenuState::EditContact => {
            ui::render_edit_view(f, app, chunks[0]);
        }
    }

    // Hints (always at bottom)
    ui::render_hints(f, app, chunks[1]);

    // Popups draw over everything; the alert wins
    ui::render_composer_popup(f, app);
    ui::render_alert_popup(f, app);
}
