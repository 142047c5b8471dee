mod app;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use place_globe::config::{SceneConfig, DEFAULT_CONFIG_PATH};
use place_globe::places;
use place_globe::scene::assets::FsAssetSource;
use ratatui::DefaultTerminal;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing::info;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "place-globe")]
#[command(about = "Terminal globe of visited places")]
struct Args {
    /// JSON array of places ({id, title, date, lat, lng}); built-in route if omitted
    #[arg(long)]
    places: Option<PathBuf>,

    /// Directory that asset paths in the config are relative to
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Scene configuration (TOML)
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Log file; the terminal belongs to the UI
    #[arg(long, default_value = "place-globe.log")]
    log_file: PathBuf,
}

fn init_logging(path: &Path) -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
    let file = File::create(path).with_context(|| format!("failed to create log file {}", path.display()))?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_file)?;

    let config = SceneConfig::load_or_default(&args.config);
    let places = match &args.places {
        Some(path) => places::load_places(path)?,
        None => places::sample_places(),
    };
    info!(places = places.len(), assets = %args.assets.display(), "starting");
    let assets = Arc::new(FsAssetSource::new(&args.assets));
    let mut app = App::new(places, config, assets);

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, &mut app);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    // Release every scene resource before exit
    app.scene.unmount();
    result
}

/// Handle mouse events for orbiting, zooming and picking
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for cursor marker and hover
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        MouseEventKind::ScrollUp => app.zoom(1),
        MouseEventKind::ScrollDown => app.zoom(-1),
        MouseEventKind::Down(MouseButton::Left) => app.press(mouse.column, mouse.row),
        MouseEventKind::Drag(MouseButton::Left) => app.handle_drag(mouse.column, mouse.row),
        MouseEventKind::Up(MouseButton::Left) => app.release(mouse.column, mouse.row),
        _ => {}
    }
}

fn run(terminal: &mut DefaultTerminal, app: &mut App) -> Result<()> {
    let size = terminal.size()?;
    app.resize(size.width, size.height);
    let mut last_frame = Instant::now();

    // Main loop
    loop {
        let now = Instant::now();
        app.tick(now - last_frame);
        last_frame = now;

        // Draw
        terminal.draw(|frame| ui::render(frame, app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        match key.code {
                            KeyCode::Char('q') => app.quit(),
                            KeyCode::Esc => app.clear_selection(),

                            // Orbit with hjkl or arrow keys
                            KeyCode::Left | KeyCode::Char('h') => app.orbit(-10, 0),
                            KeyCode::Right | KeyCode::Char('l') => app.orbit(10, 0),
                            KeyCode::Up | KeyCode::Char('k') => app.orbit(0, -8),
                            KeyCode::Down | KeyCode::Char('j') => app.orbit(0, 8),

                            // Zoom
                            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom(1),
                            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom(-1),

                            // Places panel
                            KeyCode::Tab => app.move_cursor(1),
                            KeyCode::BackTab => app.move_cursor(-1),
                            KeyCode::Enter => app.activate_cursor(),

                            _ => {}
                        }
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width, height);
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
