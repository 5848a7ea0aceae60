//! Mutation → reload → re-render.
//!
//! Every user action that changes server state is a [`Command`]. Executing it
//! performs the call and then reloads, in full, every collection the call can
//! affect. Callers apply the resulting [`Reloaded`] snapshot to the
//! [`Store`] and redraw. Nothing is patched locally, so the visible state
//! after an action always includes that action's effect.

use tracing::{debug, info};

use crate::api::KegApi;
use crate::config::Stations;
use crate::error::{KegError, KegResult};
use crate::store::Store;
use crate::types::{Batch, Keg, KegId, KegUpdate};
use crate::views::board::Relocate;

/// A user action against the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Load batches then kegs without changing anything.
    Refresh,
    /// Create a blank keg.
    CreateKeg,
    /// Save the edit form.
    SaveKeg {
        /// Keg being edited.
        id: KegId,
        /// Fields to change.
        update: KegUpdate,
    },
    /// Clear batch, location and notes.
    ResetKeg {
        /// Keg to reset.
        id: KegId,
    },
    /// Remove a keg that has no batch.
    DeleteKeg {
        /// Keg to delete.
        id: KegId,
    },
    /// Move a keg to another station.
    Relocate(Relocate),
    /// Pull batches from the brewing-data service.
    SyncBatches,
}

/// Which collections a command reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReloadSet {
    /// Reload batches (first).
    pub batches: bool,
    /// Reload kegs (second).
    pub kegs: bool,
}

impl Command {
    /// Short name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::CreateKeg => "create_keg",
            Self::SaveKeg { .. } => "save_keg",
            Self::ResetKeg { .. } => "reset_keg",
            Self::DeleteKeg { .. } => "delete_keg",
            Self::Relocate(_) => "relocate",
            Self::SyncBatches => "sync_batches",
        }
    }

    /// Collections to reload once the call succeeds.
    #[must_use]
    pub const fn reload(&self) -> ReloadSet {
        match self {
            Self::Refresh | Self::SyncBatches => ReloadSet {
                batches: true,
                kegs: true,
            },
            Self::CreateKeg
            | Self::SaveKeg { .. }
            | Self::ResetKeg { .. }
            | Self::DeleteKeg { .. }
            | Self::Relocate(_) => ReloadSet {
                batches: false,
                kegs: true,
            },
        }
    }

    /// Whether the command needs an explicit confirmation first.
    #[must_use]
    pub const fn is_destructive(&self) -> bool {
        matches!(self, Self::ResetKeg { .. } | Self::DeleteKeg { .. })
    }

    /// Confirmation prompt for destructive commands.
    #[must_use]
    pub fn confirmation(&self, store: &Store) -> Option<String> {
        let label = |id: KegId| {
            store
                .keg(id)
                .map_or_else(|| format!("keg {id}"), |k| k.label.clone())
        };
        match self {
            Self::ResetKeg { id } => Some(format!(
                "Reset {} to empty? This will clear the batch, location, and notes.",
                label(*id)
            )),
            Self::DeleteKeg { id } => Some(format!(
                "Permanently delete {}? This cannot be undone.",
                label(*id)
            )),
            _ => None,
        }
    }

    /// Message shown when the command fails.
    #[must_use]
    pub fn failure_message(&self, err: &KegError) -> String {
        match self {
            Self::CreateKeg => format!("Failed to add keg: {err}"),
            Self::SyncBatches => "Sync failed!".to_string(),
            _ => err.to_string(),
        }
    }

    /// Client-side guards checked against the loaded state.
    ///
    /// # Errors
    ///
    /// Returns [`KegError::Refused`] when the keg is not loaded, when a keg
    /// with a batch would be deleted, or when the target station is unknown.
    pub fn check(&self, store: &Store, stations: &Stations) -> KegResult<()> {
        let loaded = |id: KegId| {
            store
                .keg(id)
                .ok_or_else(|| KegError::Refused(format!("keg {id} is not loaded")))
        };
        match self {
            Self::SaveKeg { id, .. } | Self::ResetKeg { id } => loaded(*id).map(|_| ()),
            Self::DeleteKeg { id } => {
                let keg = loaded(*id)?;
                if keg.is_empty() {
                    Ok(())
                } else {
                    Err(KegError::Refused(format!(
                        "{} has a batch assigned; reset it before deleting",
                        keg.label
                    )))
                }
            }
            Self::Relocate(relocate) => {
                loaded(relocate.keg_id)?;
                let known = relocate.location.is_empty()
                    || stations.index_of(&relocate.location).is_some();
                if known {
                    Ok(())
                } else {
                    Err(KegError::Refused(format!("unknown station: {}", relocate.location)))
                }
            }
            Self::Refresh | Self::CreateKeg | Self::SyncBatches => Ok(()),
        }
    }
}

/// Collections reloaded after a command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reloaded {
    /// Fresh kegs, if reloaded.
    pub kegs: Option<Vec<Keg>>,
    /// Fresh batches, if reloaded.
    pub batches: Option<Vec<Batch>>,
    /// Batches synced, for [`Command::SyncBatches`].
    pub synced: Option<u64>,
    /// New keg, for [`Command::CreateKeg`].
    pub created: Option<KegId>,
}

/// Run a command and reload what it touched.
///
/// # Errors
///
/// Returns the first failing call. The caller's state is left untouched in
/// that case, since nothing is applied until the caller applies the result.
pub async fn execute<A: KegApi>(api: &A, command: &Command) -> KegResult<Reloaded> {
    debug!(command = command.name(), "Executing");
    let mut reloaded = Reloaded::default();

    match command {
        Command::Refresh => {}
        Command::CreateKeg => {
            reloaded.created = Some(api.create_keg().await?.id);
        }
        Command::SaveKeg { id, update } => {
            api.update_keg(*id, update).await?;
        }
        Command::ResetKeg { id } => {
            api.reset_keg(*id).await?;
        }
        Command::DeleteKeg { id } => {
            api.delete_keg(*id).await?;
        }
        Command::Relocate(relocate) => {
            api.update_keg(relocate.keg_id, &relocate.to_update()).await?;
        }
        Command::SyncBatches => {
            let report = api.sync_batches().await?;
            info!(synced = report.synced, "Batches synced");
            reloaded.synced = Some(report.synced);
        }
    }

    let reload = command.reload();
    if reload.batches {
        reloaded.batches = Some(api.list_batches().await?);
    }
    if reload.kegs {
        reloaded.kegs = Some(api.list_kegs().await?);
    }
    Ok(reloaded)
}

/// Result of [`Tracker::run`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    /// The kegs collection was replaced.
    pub rerender: bool,
    /// Batches synced.
    pub synced: Option<u64>,
    /// New keg.
    pub created: Option<KegId>,
}

/// Store plus API, running commands one at a time.
#[derive(Debug)]
pub struct Tracker<A> {
    api: A,
    store: Store,
    stations: Stations,
}

impl<A: KegApi> Tracker<A> {
    /// Wrap an API with an empty store.
    pub fn new(api: A, stations: Stations) -> Self {
        Self {
            api,
            store: Store::new(),
            stations,
        }
    }

    /// Loaded state.
    pub const fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable state, for view switching.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Underlying API.
    pub const fn api(&self) -> &A {
        &self.api
    }

    /// Board columns.
    pub const fn stations(&self) -> &Stations {
        &self.stations
    }

    /// Load batches, then kegs.
    pub async fn refresh(&mut self) -> KegResult<Outcome> {
        self.run(Command::Refresh).await
    }

    /// Check, execute and apply a command.
    ///
    /// # Errors
    ///
    /// Returns a guard refusal or the failing call; the store is unchanged.
    pub async fn run(&mut self, command: Command) -> KegResult<Outcome> {
        command.check(&self.store, &self.stations)?;
        let reloaded = execute(&self.api, &command).await?;
        let synced = reloaded.synced;
        let created = reloaded.created;
        let rerender = self.store.apply(reloaded);
        Ok(Outcome {
            rerender,
            synced,
            created,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{MemoryBackend, Request};

    async fn tracker() -> Tracker<MemoryBackend> {
        let mut tracker = Tracker::new(MemoryBackend::demo(), Stations::default());
        tracker.refresh().await.unwrap();
        tracker.api().take_requests();
        tracker
    }

    #[tokio::test]
    async fn refresh_loads_batches_then_kegs() {
        let mut tracker = Tracker::new(MemoryBackend::demo(), Stations::default());
        let outcome = tracker.refresh().await.unwrap();

        assert!(outcome.rerender);
        assert_eq!(
            tracker.api().take_requests(),
            vec![Request::get("/api/batches"), Request::get("/api/kegs")]
        );
        assert_eq!(tracker.store().kegs().len(), 16);
        assert!(!tracker.store().batches().is_empty());
    }

    #[tokio::test]
    async fn mutation_is_followed_by_kegs_reload() {
        let mut tracker = tracker().await;
        tracker.run(Command::ResetKeg { id: 1 }).await.unwrap();

        let requests = tracker.api().take_requests();
        assert_eq!(
            requests,
            vec![Request::post("/api/kegs/1/reset"), Request::get("/api/kegs")]
        );
        let keg = tracker.store().keg(1).unwrap();
        assert!(keg.batch_id.is_none());
        assert!(keg.location.is_empty());
        assert!(keg.notes.is_empty());
    }

    #[tokio::test]
    async fn sync_reloads_batches_then_kegs() {
        let mut tracker = tracker().await;
        let outcome = tracker.run(Command::SyncBatches).await.unwrap();

        assert!(outcome.synced.is_some());
        assert_eq!(
            tracker.api().take_requests(),
            vec![
                Request::post("/api/batches/sync"),
                Request::get("/api/batches"),
                Request::get("/api/kegs"),
            ]
        );
    }

    #[tokio::test]
    async fn create_reports_new_keg() {
        let mut tracker = tracker().await;
        let outcome = tracker.run(Command::CreateKeg).await.unwrap();

        assert_eq!(outcome.created, Some(17));
        let keg = tracker.store().keg(17).unwrap();
        assert_eq!(keg.label, "Keg #17");
    }

    #[tokio::test]
    async fn delete_with_batch_refused_locally() {
        let mut tracker = tracker().await;
        let filled = tracker
            .store()
            .kegs()
            .iter()
            .find(|k| !k.is_empty())
            .map(|k| k.id)
            .unwrap();

        let err = tracker.run(Command::DeleteKeg { id: filled }).await.unwrap_err();

        assert!(matches!(err, KegError::Refused(_)));
        assert!(tracker.api().take_requests().is_empty());
    }

    #[tokio::test]
    async fn failed_mutation_leaves_store_unchanged() {
        let mut tracker = tracker().await;
        let before = tracker.store().kegs().to_vec();
        let generation = tracker.store().generation();
        tracker.api().fail_next(KegError::api(500, "500 Internal Server Error"));

        let err = tracker.run(Command::ResetKeg { id: 1 }).await.unwrap_err();

        assert_eq!(err.to_string(), "500 Internal Server Error");
        assert_eq!(tracker.store().kegs(), before.as_slice());
        assert_eq!(tracker.store().generation(), generation);
    }

    #[tokio::test]
    async fn relocate_to_unknown_station_refused() {
        let mut tracker = tracker().await;
        let err = tracker
            .run(Command::Relocate(Relocate {
                keg_id: 1,
                location: "Moon".into(),
            }))
            .await
            .unwrap_err();
        assert!(matches!(err, KegError::Refused(_)));
    }

    #[test]
    fn confirmation_only_for_destructive() {
        let mut store = Store::new();
        store.replace_kegs(vec![Keg {
            id: 4,
            label: "Keg #4".into(),
            ..Keg::default()
        }]);

        assert_eq!(
            Command::ResetKeg { id: 4 }.confirmation(&store).as_deref(),
            Some("Reset Keg #4 to empty? This will clear the batch, location, and notes.")
        );
        assert_eq!(
            Command::DeleteKeg { id: 4 }.confirmation(&store).as_deref(),
            Some("Permanently delete Keg #4? This cannot be undone.")
        );
        assert!(Command::CreateKeg.confirmation(&store).is_none());
        assert!(Command::ResetKeg { id: 4 }.is_destructive());
        assert!(!Command::SyncBatches.is_destructive());
    }

    #[test]
    fn failure_messages() {
        let err = KegError::api(502, "Brewfather API error: timeout");
        assert_eq!(
            Command::CreateKeg.failure_message(&err),
            "Failed to add keg: Brewfather API error: timeout"
        );
        assert_eq!(Command::SyncBatches.failure_message(&err), "Sync failed!");
        assert_eq!(
            Command::ResetKeg { id: 1 }.failure_message(&err),
            "Brewfather API error: timeout"
        );
    }
}
