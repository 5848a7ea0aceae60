//! View-models.
//!
//! Each view is a pure function from the [`Store`] (plus the current time)
//! to a serializable tree that a front end draws as-is.

pub mod board;
pub mod grid;
pub mod modal;
pub mod stats;

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::Stations;
use crate::store::Store;

pub use board::{BoardView, DragState, Relocate};
pub use grid::GridView;
pub use modal::KegForm;
pub use stats::{StatsPanel, StatsView};

/// The three alternate renderings of the keg collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    /// One card per keg.
    #[default]
    Grid,
    /// Kegs grouped by station.
    Board,
    /// Aggregate statistics.
    Stats,
}

impl View {
    /// All views in tab order.
    pub const ALL: [Self; 3] = [Self::Grid, Self::Board, Self::Stats];

    /// Tab title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Grid => "Grid",
            Self::Board => "Board",
            Self::Stats => "Stats",
        }
    }

    /// Position in tab order.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Grid => 0,
            Self::Board => 1,
            Self::Stats => 2,
        }
    }

    /// Next view, wrapping.
    #[must_use]
    pub const fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    /// Previous view, wrapping.
    #[must_use]
    pub const fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

/// Rendered content of the active view.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ViewModel {
    /// Grid cards.
    Grid(GridView),
    /// Board columns.
    Board(BoardView),
    /// Stats panel; loaded separately since it needs its own request.
    Stats(StatsPanel),
}

/// Render the active view.
///
/// The stats view cannot be derived from the store alone, so the caller
/// passes the last stats panel it loaded.
#[must_use]
pub fn render(store: &Store, stations: &Stations, stats: &StatsPanel, now: DateTime<Utc>) -> ViewModel {
    match store.view() {
        View::Grid => ViewModel::Grid(grid::render_grid(store, now)),
        View::Board => ViewModel::Board(board::render_board(store, stations, now)),
        View::Stats => ViewModel::Stats(stats.clone()),
    }
}
