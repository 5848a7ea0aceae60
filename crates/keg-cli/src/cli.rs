//! Command-line argument parsing with clap.

use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use keg_core::config::DEFAULT_BASE_URL;
use keg_core::{ClientConfig, KegId, KegStatus, KegUpdate, Stations};

use crate::error::CliError;

/// Keg tracker CLI.
#[derive(Parser, Debug, Clone)]
#[command(name = "keg")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Keg tracker server URL.
    #[arg(short, long, env = "KEG_TRACKER_URL", default_value = DEFAULT_BASE_URL)]
    pub server: String,

    /// Board station, in column order; the first is the default station.
    /// Repeat for each station.
    #[arg(long = "station", value_name = "NAME", env = "KEG_TRACKER_STATIONS", value_delimiter = ',')]
    pub stations: Vec<String>,

    /// Per-request timeout in seconds.
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = Format::Table)]
    pub format: Format,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Client configuration from the global flags.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed server URL or station list.
    pub fn config(&self) -> Result<ClientConfig, CliError> {
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

/// Output format options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// Human-readable table format.
    #[default]
    Table,
    /// JSON output for scripting.
    Json,
    /// HTML keg cards (`list` only).
    Html,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show server health and a summary of the tracker.
    Status,

    /// List kegs as cards.
    List,

    /// Show kegs grouped by station.
    Board,

    /// Show usage statistics.
    Stats,

    /// Show recent keg activity.
    Events,

    /// List batches available for assignment.
    Batches,

    /// Add a blank keg.
    Add,

    /// Change fields of a keg.
    Edit(EditArgs),

    /// Move a keg to a station.
    Move {
        /// Keg ID.
        id: KegId,

        /// Target station name.
        station: String,
    },

    /// Reset a keg to empty, clearing batch, location and notes.
    Reset {
        /// Keg ID.
        id: KegId,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Permanently delete a keg that has no batch.
    Delete {
        /// Keg ID.
        id: KegId,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Pull batches from Brewfather.
    Sync,
}

/// Arguments for the edit command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct EditArgs {
    /// Keg ID.
    pub id: KegId,

    /// New label.
    #[arg(long)]
    pub label: Option<String>,

    /// New status (`empty`, `full` or `on_tap`).
    #[arg(long)]
    pub status: Option<KegStatus>,

    /// New location; an empty string moves it to the default station.
    #[arg(long)]
    pub location: Option<String>,

    /// Purchase date.
    #[arg(long, value_name = "DATE")]
    pub date_purchased: Option<String>,

    /// Keg notes.
    #[arg(long)]
    pub notes: Option<String>,

    /// Assign a batch by ID.
    #[arg(long, value_name = "ID", conflicts_with = "clear_batch")]
    pub batch: Option<String>,

    /// Remove the batch assignment.
    #[arg(long)]
    pub clear_batch: bool,
}

impl EditArgs {
    /// Update body for the given flags.
    ///
    /// # Errors
    ///
    /// Returns an error when no field is set.
    pub fn to_update(&self) -> Result<KegUpdate, CliError> {
        let mut update = KegUpdate {
            label: self.label.clone(),
            status: self.status,
            location: self.location.clone(),
            date_purchased: self.date_purchased.clone(),
            notes: self.notes.clone(),
            ..KegUpdate::default()
        };
        if let Some(batch) = &self.batch {
            update = update.with_batch(batch.clone());
        } else if self.clear_batch {
            update = update.with_cleared_batch();
        }
        if update.is_noop() {
            return Err(CliError::InvalidArgument("nothing to update".into()));
        }
        Ok(update)
    }
}
