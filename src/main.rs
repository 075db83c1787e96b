mod app;
mod config;
mod event;
mod form;
mod sim;
mod ui;

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::info;
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::Terminal;

use app::App;
use config::Config;
use event::{Event, EventHandler};

/// Animate a charged particle in a cyclotron.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML file overriding defaults, canvas and integrator
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log destination; the terminal is owned by the UI
    #[arg(long, default_value = "cyclotron.log")]
    log_file: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = match &args.config {
        Some(path) => Config::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    info!("starting with {:?}", config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut app = App::new(&config);
    let result = run(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

fn init_logging(args: &Args) -> Result<()> {
    let file = File::create(&args.log_file)
        .with_context(|| format!("failed to create log file {}", args.log_file.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    let events = EventHandler::new(50);

    terminal.draw(|frame| ui::render(frame, app))?;
    while !app.should_quit {
        match events.next(app.deadline())? {
            Event::Tick => {
                let started = Instant::now();
                app.on_tick();
                terminal.draw(|frame| ui::render(frame, app))?;
                app.frame_done(started.elapsed());
            }
            Event::Key(key) => {
                app.on_key(key);
                terminal.draw(|frame| ui::render(frame, app))?;
            }
            Event::Resize => {
                terminal.draw(|frame| ui::render(frame, app))?;
            }
        }
    }
    Ok(())
}
