//! keg-tui - keg tracker terminal UI
//!
//! Logs go to a file so they never tear through the alternate screen.

use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use keg_core::config::DEFAULT_BASE_URL;
use keg_core::{ClientConfig, Command, HttpKegApi, KegApi, MemoryBackend, Stations, SyncGuard};
use keg_tui::app::{App, Effect};
use keg_tui::data::{DataClient, apply_data_event};
use keg_tui::events::{AppEvent, EventHandler, handle_key};
use keg_tui::ui;

const TICK_RATE: Duration = Duration::from_millis(200);

#[derive(Parser, Debug)]
#[command(name = "keg-tui")]
#[command(about = "Keg tracker terminal UI")]
#[command(version)]
struct Cli {
    /// Keg tracker server URL
    #[arg(short, long, env = "KEG_TRACKER_URL", default_value = DEFAULT_BASE_URL)]
    server: String,

    /// Board station, in column order; the first is the default station
    #[arg(long = "station", value_name = "NAME", env = "KEG_TRACKER_STATIONS", value_delimiter = ',')]
    stations: Vec<String>,

    /// Per-request timeout in seconds
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Log file
    #[arg(long, default_value = "keg-tui.log")]
    log_file: PathBuf,

    /// Run against an in-memory tracker seeded with demo kegs
    #[arg(long)]
    demo: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.server)?;
        if !self.stations.is_empty() {
            config = config.with_stations(Stations::new(self.stations.iter().cloned())?);
        }
        if let Some(secs) = self.timeout {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;

    // Initialize logging (to file, not terminal)
    let log = File::create(&cli.log_file)
        .with_context(|| format!("cannot open log file {}", cli.log_file.display()))?;
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(Mutex::new(log)).with_ansi(false))
        .with(
            EnvFilter::from_default_env()
                .add_directive("keg_tui=info".parse()?)
                .add_directive("keg_core=info".parse()?),
        )
        .init();

    if cli.demo {
        info!("Starting in demo mode");
        session(MemoryBackend::demo(), &config).await
    } else {
        info!(server = %config.base_url, "Starting");
        session(HttpKegApi::new(&config)?, &config).await
    }
}

async fn session<A: KegApi + 'static>(api: A, config: &ClientConfig) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, api, config).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app<A: KegApi + 'static>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    api: A,
    config: &ClientConfig,
) -> anyhow::Result<()> {
    let mut app = App::new(config.stations.clone(), SyncGuard::new(config.sync_cooldown));
    let mut event_handler = EventHandler::new(TICK_RATE);

    let client = DataClient::new(api, event_handler.sender());
    client.load_brewery();
    client.dispatch(Effect::Run(Command::Refresh));

    while app.running {
        app.tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, &app))?;

        let Some(event) = event_handler.next().await else {
            break;
        };
        let effect = match event {
            AppEvent::Key(key) => handle_key(&mut app, key),
            // Terminal will redraw on the next pass
            AppEvent::Resize(_, _) => None,
            AppEvent::Tick => {
                app.tick(Instant::now());
                None
            }
            AppEvent::Data(data_event) => apply_data_event(&mut app, data_event),
        };
        if let Some(effect) = effect {
            client.dispatch(effect);
        }
    }

    info!("Exiting");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["keg-tui"]);
        assert_eq!(cli.log_file, PathBuf::from("keg-tui.log"));
        assert!(!cli.demo);

        let config = cli.config().unwrap();
        assert_eq!(config.stations, Stations::default());
        assert_eq!(config.sync_cooldown, Duration::from_millis(2000));
    }

    #[test]
    fn stations_from_flags() {
        let cli = Cli::parse_from(["keg-tui", "--station", "Cellar", "--station", "Bar", "--demo"]);
        let config = cli.config().unwrap();
        assert_eq!(config.stations.names(), ["Cellar", "Bar"]);
        assert_eq!(config.stations.default_station(), "Cellar");
        assert!(cli.demo);
    }

    #[test]
    fn rejects_bad_server() {
        let cli = Cli::parse_from(["keg-tui", "--server", "localhost:8000"]);
        assert!(cli.config().is_err());
    }
}
