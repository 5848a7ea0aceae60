//! Tracker status command.
//!
//! Shows server health, the brewery name and keg and batch counts.

use std::io::Write;

use keg_core::{KegApi, Stations, Tracker};
use tracing::warn;

use crate::error::CliError;
use crate::output::{OutputFormat, StatusReport};

/// Status command executor.
pub struct StatusCommand<A> {
    server: String,
    tracker: Tracker<A>,
}

impl<A: KegApi> StatusCommand<A> {
    /// Create a new status command.
    pub fn new(server: impl Into<String>, api: A, stations: Stations) -> Self {
        Self {
            server: server.into(),
            tracker: Tracker::new(api, stations),
        }
    }

    /// Execute the status command.
    ///
    /// # Errors
    ///
    /// Returns an error if the server is unreachable or output fails.
    pub async fn execute<W: Write>(&mut self, writer: &mut W, format: &OutputFormat) -> Result<(), CliError> {
        let status = self.fetch_status().await?;
        format.write(writer, &status)
    }

    /// Gather the status report.
    ///
    /// # Errors
    ///
    /// Returns an error if the health check or the state load fails. A
    /// missing brewery name is only logged.
    pub async fn fetch_status(&mut self) -> Result<StatusReport, CliError> {
        let health = self.tracker.api().health().await?;
        let brewery = match self.tracker.api().brewery().await {
            Ok(info) => info.name,
            Err(err) => {
                warn!(error = %err, "Brewery settings unavailable");
                "—".to_string()
            }
        };
        self.tracker.refresh().await?;
        let store = self.tracker.store();

        Ok(StatusReport {
            server: self.server.clone(),
            health: health.status,
            brewery,
            kegs: store.kegs().len(),
            filled: store.kegs().iter().filter(|k| !k.is_empty()).count(),
            batches: store.batches().len(),
        })
    }
}
