//! Keg commands.
//!
//! Provides:
//! - Listing kegs as grid cards or station columns
//! - Adding, editing and moving kegs
//! - Resetting and deleting kegs, after confirmation

use std::io::Write;

use chrono::Utc;
use keg_core::views::board::{Relocate, render_board};
use keg_core::views::grid::render_grid;
use keg_core::{Command, KegApi, KegError, KegId, Stations, Tracker};
use tracing::debug;

use crate::cli::EditArgs;
use crate::confirm::Confirm;
use crate::error::CliError;
use crate::output::{Message, OutputFormat};

/// Keg command executor.
pub struct KegsCommand<A> {
    tracker: Tracker<A>,
}

impl<A: KegApi> KegsCommand<A> {
    /// Create a new keg command.
    pub fn new(api: A, stations: Stations) -> Self {
        Self {
            tracker: Tracker::new(api, stations),
        }
    }

    /// Print the grid.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or output fails.
    pub async fn list<W: Write>(&mut self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        self.tracker.refresh().await?;
        format.write(writer, &render_grid(self.tracker.store(), Utc::now()))
    }

    /// Print the board.
    ///
    /// # Errors
    ///
    /// Returns an error if loading or output fails.
    pub async fn board<W: Write>(&mut self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        self.tracker.refresh().await?;
        let board = render_board(self.tracker.store(), self.tracker.stations(), Utc::now());
        format.write(writer, &board)
    }

    /// Create a blank keg.
    ///
    /// # Errors
    ///
    /// Returns `Failed to add keg: ...` if the server refuses.
    pub async fn add<W: Write>(&mut self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let outcome = self.run(Command::CreateKeg).await?;
        let label = outcome
            .created
            .and_then(|id| self.tracker.store().keg(id))
            .map_or_else(|| "keg".to_string(), |k| k.label.clone());
        format.write(writer, &Message::success(format!("Created {label}")))
    }

    /// Apply a partial update.
    ///
    /// # Errors
    ///
    /// Returns an error if no field is set, the keg does not exist or the
    /// update fails.
    pub async fn edit<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        args: &EditArgs,
    ) -> Result<(), CliError> {
        let update = args.to_update()?;
        let label = self.load(args.id).await?;
        self.run(Command::SaveKeg { id: args.id, update }).await?;
        format.write(writer, &Message::success(format!("Updated {label}")))
    }

    /// Move a keg to a station.
    ///
    /// # Errors
    ///
    /// Returns an error if the station is unknown, the keg does not exist or
    /// the update fails.
    pub async fn relocate<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        id: KegId,
        station: &str,
    ) -> Result<(), CliError> {
        let stations = self.tracker.stations();
        if stations.index_of(station).is_none() {
            return Err(CliError::InvalidArgument(format!(
                "unknown station '{station}'; expected one of: {}",
                stations.names().join(", ")
            )));
        }
        let label = self.load(id).await?;
        let store = self.tracker.store();
        let stations = self.tracker.stations();
        let current = store
            .keg(id)
            .map(|keg| stations.column_for(keg).to_string())
            .unwrap_or_default();
        if current == station {
            return format.write(writer, &Message::info(format!("{label} is already at {station}")));
        }

        let relocate = Relocate::to_station(id, station, stations);
        debug!(keg = id, location = %relocate.location, "Relocating");
        self.run(Command::Relocate(relocate)).await?;
        format.write(writer, &Message::success(format!("Moved {label} to {station}")))
    }

    /// Reset a keg after confirmation.
    ///
    /// # Errors
    ///
    /// Returns an error if the keg does not exist or the reset fails.
    pub async fn reset<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        id: KegId,
        confirm: &mut dyn Confirm,
    ) -> Result<(), CliError> {
        let label = self.load(id).await?;
        if !self.confirm(&Command::ResetKeg { id }, confirm)? {
            return format.write(writer, &Message::info("Cancelled"));
        }
        self.run(Command::ResetKeg { id }).await?;
        format.write(writer, &Message::success(format!("Reset {label}")))
    }

    /// Delete an empty keg after confirmation.
    ///
    /// A keg with a batch is refused before anything is asked or sent.
    ///
    /// # Errors
    ///
    /// Returns an error if the keg does not exist, has a batch or the
    /// delete fails.
    pub async fn delete<W: Write>(
        &mut self,
        writer: &mut W,
        format: &OutputFormat,
        id: KegId,
        confirm: &mut dyn Confirm,
    ) -> Result<(), CliError> {
        let label = self.load(id).await?;
        let command = Command::DeleteKeg { id };
        command.check(self.tracker.store(), self.tracker.stations())?;
        if !self.confirm(&command, confirm)? {
            return format.write(writer, &Message::info("Cancelled"));
        }
        self.run(command).await?;
        format.write(writer, &Message::success(format!("Deleted {label}")))
    }

    /// Underlying tracker.
    pub const fn tracker(&self) -> &Tracker<A> {
        &self.tracker
    }

    /// Load state and return the keg's label.
    async fn load(&mut self, id: KegId) -> Result<String, CliError> {
        self.tracker.refresh().await?;
        self.tracker
            .store()
            .keg(id)
            .map(|k| k.label.clone())
            .ok_or(CliError::KegNotFound(id))
    }

    fn confirm(&self, command: &Command, confirm: &mut dyn Confirm) -> Result<bool, CliError> {
        match command.confirmation(self.tracker.store()) {
            Some(prompt) => confirm.confirm(&prompt),
            None => Ok(true),
        }
    }

    async fn run(&mut self, command: Command) -> Result<keg_core::reconcile::Outcome, CliError> {
        let failed = command.clone();
        self.tracker.run(command).await.map_err(|err| match err {
            KegError::Refused(_) => CliError::Keg(err),
            other => CliError::Command(failed.failure_message(&other)),
        })
    }
}
