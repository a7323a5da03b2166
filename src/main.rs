use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use clap::{Parser, Subcommand};
use crossterm::event::KeyEventKind;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;

mod actions;
mod app;
mod commands;
mod config;
mod db;
mod editor;
mod error;
mod models;
mod store;
mod tui;

use app::App;
use commands::ListOrder;
use config::Config;
use db::Repository;
use error::Result;
use tui::{draw, handle_key_event};

#[derive(Debug, Parser)]
#[command(name = "blog-cms", version, about = "Write and browse blog articles from the terminal")]
struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the config
    #[arg(long, global = true)]
    db: Option<String>,

    /// Enable creating, editing and deleting articles
    #[arg(long)]
    admin: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create every article in a JSON array file
    Import { path: PathBuf },
    /// Write every article to a JSON file
    Export { path: PathBuf },
    /// Print articles to stdout
    List {
        #[arg(long, value_enum, default_value_t = ListOrder::Latest)]
        order: ListOrder,
        #[arg(long)]
        tag: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }

    init_logging(&config)?;

    if let Some(command) = cli.command {
        return run_command(&config, command).await;
    }

    // Initialize app
    let mut app = App::new(&config, cli.admin).await?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    Ok(())
}

/// Only warnings and errors by default; `RUST_LOG` overrides.
fn init_logging(config: &Config) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    match &config.log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

async fn run_command(config: &Config, command: Command) -> Result<()> {
    let repository = Repository::new(&config.db_path).await?;

    match command {
        Command::Import { path } => {
            let created = commands::import_articles(&repository, &path).await?;
            println!("Imported {} articles from {:?}", created, path);
        }
        Command::Export { path } => {
            let written = commands::export_articles(&repository, &path).await?;
            println!("Exported {} articles to {:?}", written, path);
        }
        Command::List { order, tag } => {
            for article in commands::list_articles(&repository, order, tag.as_deref()).await? {
                println!("{}", commands::format_article_line(&article));
            }
        }
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Advance spinner animation and expire flash messages
        app.tick();

        // Apply finished store requests
        app.poll_results().await;

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.input_mode()) {
                        let should_quit = app.handle_action(action).await?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn list_subcommand_parses_order_and_tag() {
        let cli = Cli::parse_from(["blog-cms", "--db", "x.db", "list", "--order", "popular", "--tag", "rust"]);
        assert_eq!(cli.db.as_deref(), Some("x.db"));
        match cli.command {
            Some(Command::List { order, tag }) => {
                assert_eq!(order, ListOrder::Popular);
                assert_eq!(tag.as_deref(), Some("rust"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
