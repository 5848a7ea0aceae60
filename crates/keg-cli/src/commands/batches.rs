//! Batch listing and Brewfather sync.

use std::io::Write;
use std::time::Instant;

use keg_core::views::modal::BatchOption;
use keg_core::{Command, KegApi, Stations, SyncGuard, Tracker};
use tracing::error;

use crate::error::CliError;
use crate::output::{BatchList, Message, OutputFormat};

/// Batch command executor.
pub struct BatchesCommand<A> {
    tracker: Tracker<A>,
    guard: SyncGuard,
}

impl<A: KegApi> BatchesCommand<A> {
    /// Create a new batch command.
    pub fn new(api: A, stations: Stations) -> Self {
        Self {
            tracker: Tracker::new(api, stations),
            guard: SyncGuard::default(),
        }
    }

    /// Print the batches, labelled as in the edit form.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or output fails.
    pub async fn list<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let batches = self.tracker.api().list_batches().await?;
        let list = BatchList {
            batches: batches.iter().map(BatchOption::from_batch).collect(),
        };
        format.write(writer, &list)
    }

    /// Sync batches and reload.
    ///
    /// # Errors
    ///
    /// Returns `Sync failed!` if the sync or the reload fails; the cause is
    /// logged.
    pub async fn sync<W: Write>(&mut self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        if !self.guard.begin() {
            return format.write(writer, &Message::info(self.guard.label()));
        }
        let result = self.tracker.run(Command::SyncBatches).await;
        let synced = result.as_ref().map(|o| o.synced.unwrap_or(0));
        self.guard.settle(&synced, Instant::now());

        match result {
            Ok(_) => format.write(writer, &Message::success(self.guard.label())),
            Err(err) => {
                error!(error = %err, "Batch sync failed");
                Err(CliError::Command(self.guard.label().to_string()))
            }
        }
    }
}
