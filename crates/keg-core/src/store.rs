//! Client state store.
//!
//! Holds the two collections loaded from the server and the active view.
//! Collections are only ever replaced wholesale from a fresh server
//! response; there is no local mutation path.

use tracing::{debug, warn};

use crate::reconcile::Reloaded;
use crate::types::{Batch, Keg, KegId};
use crate::views::View;

/// Application state shared by every view.
#[derive(Debug, Clone, Default)]
pub struct Store {
    kegs: Vec<Keg>,
    batches: Vec<Batch>,
    view: View,
    /// Number of keg reloads applied; front ends use it to notice changes.
    generation: u64,
}

impl Store {
    /// Create an empty store showing the grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Kegs in server order.
    #[must_use]
    pub fn kegs(&self) -> &[Keg] {
        &self.kegs
    }

    /// Batches in server order.
    #[must_use]
    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    /// Active view.
    #[must_use]
    pub const fn view(&self) -> View {
        self.view
    }

    /// Number of keg reloads applied so far.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Switch views. Returns false when the view was already active.
    pub fn set_view(&mut self, view: View) -> bool {
        if self.view == view {
            return false;
        }
        self.view = view;
        true
    }

    /// Look up a loaded keg.
    #[must_use]
    pub fn keg(&self, id: KegId) -> Option<&Keg> {
        self.kegs.iter().find(|k| k.id == id)
    }

    /// Look up a loaded batch.
    #[must_use]
    pub fn batch(&self, id: &str) -> Option<&Batch> {
        self.batches.iter().find(|b| b.id == id)
    }

    /// Replace the kegs collection.
    pub fn replace_kegs(&mut self, kegs: Vec<Keg>) {
        for keg in kegs.iter().filter(|k| !k.batch_consistent()) {
            warn!(
                keg_id = keg.id,
                batch_id = ?keg.batch_id,
                snapshot = ?keg.batch.as_ref().map(|b| &b.id),
                "Keg batch snapshot disagrees with batch_id"
            );
        }
        debug!(count = kegs.len(), "Kegs replaced");
        self.kegs = kegs;
        self.generation += 1;
    }

    /// Replace the batches collection.
    pub fn replace_batches(&mut self, batches: Vec<Batch>) {
        debug!(count = batches.len(), "Batches replaced");
        self.batches = batches;
    }

    /// Apply a reload snapshot. Batches are applied before kegs.
    ///
    /// Returns true when the kegs collection changed, which means the active
    /// view must be redrawn.
    pub fn apply(&mut self, reloaded: Reloaded) -> bool {
        if let Some(batches) = reloaded.batches {
            self.replace_batches(batches);
        }
        match reloaded.kegs {
            Some(kegs) => {
                self.replace_kegs(kegs);
                true
            }
            None => false,
        }
    }
}
