//! Stats and activity commands.

use std::io::Write;

use keg_core::KegApi;
use keg_core::views::stats::{EventRow, FAILED_MESSAGE, StatsPanel, load_stats};

use crate::error::CliError;
use crate::output::{EventList, OutputFormat};

/// Stats command executor.
pub struct StatsCommand<A> {
    api: A,
}

impl<A: KegApi> StatsCommand<A> {
    /// Create a new stats command.
    pub const fn new(api: A) -> Self {
        Self { api }
    }

    /// Print the stats view.
    ///
    /// # Errors
    ///
    /// Returns `Failed to load stats` when the payload cannot be loaded; the
    /// cause is logged.
    pub async fn stats<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        match load_stats(&self.api).await {
            StatsPanel::Failed => Err(CliError::Command(FAILED_MESSAGE.to_string())),
            panel => format.write(writer, &panel),
        }
    }

    /// Print recent keg events.
    ///
    /// # Errors
    ///
    /// Returns an error if the request or output fails.
    pub async fn events<W: Write>(&self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let events = self.api.recent_events().await?;
        let list = EventList {
            events: events.iter().map(EventRow::from).collect(),
        };
        format.write(writer, &list)
    }
}
