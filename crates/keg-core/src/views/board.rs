//! Board view: kegs grouped into station columns, with relocation.
//!
//! Relocation is input-agnostic. A front end maps its gesture (mouse drag,
//! keyboard pick-up and move) onto [`DragState`], whose `drop` yields the
//! [`Relocate`] command to run.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::Stations;
use crate::format::{CardContent, CardOptions, format_card};
use crate::store::Store;
use crate::types::{KegId, KegUpdate};

/// Move a keg to a station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Relocate {
    /// Keg to move.
    pub keg_id: KegId,
    /// Location to store; empty for the default station.
    pub location: String,
}

impl Relocate {
    /// Build the command for dropping `keg_id` on `station`.
    #[must_use]
    pub fn to_station(keg_id: KegId, station: &str, stations: &Stations) -> Self {
        Self {
            keg_id,
            location: stations.target_location(station),
        }
    }

    /// Update body carrying only the location.
    #[must_use]
    pub fn to_update(&self) -> KegUpdate {
        KegUpdate::relocate(self.location.clone())
    }
}

/// A card on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardCard {
    /// Keg shown.
    pub keg_id: KegId,
    /// Card body, without the location line.
    pub content: CardContent,
}

/// One station column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardColumn {
    /// Station name.
    pub name: String,
    /// Kegs currently in the column.
    pub count: usize,
    /// Cards in store order.
    pub cards: Vec<BoardCard>,
}

/// Board of station columns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardView {
    /// Columns in station order.
    pub columns: Vec<BoardColumn>,
    /// Kegs whose location matches no station.
    pub unplaced: Vec<BoardCard>,
}

impl BoardView {
    /// Number of columns a cursor can visit. Unplaced kegs form one extra
    /// column after the stations when there are any.
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.columns.len() + usize::from(!self.unplaced.is_empty())
    }

    /// Cards in a column; the index past the last station is the unplaced
    /// column.
    #[must_use]
    pub fn cards(&self, column: usize) -> &[BoardCard] {
        match self.columns.get(column) {
            Some(col) => &col.cards,
            None if column == self.columns.len() => &self.unplaced,
            None => &[],
        }
    }

    /// Column index holding a keg.
    #[must_use]
    pub fn column_of(&self, keg_id: KegId) -> Option<usize> {
        (0..self.column_count()).find(|&idx| self.cards(idx).iter().any(|c| c.keg_id == keg_id))
    }
}

/// Render the board.
#[must_use]
pub fn render_board(store: &Store, stations: &Stations, now: DateTime<Utc>) -> BoardView {
    let options = CardOptions {
        show_location: false,
    };
    let mut columns: Vec<BoardColumn> = stations
        .names()
        .iter()
        .map(|name| BoardColumn {
            name: name.clone(),
            count: 0,
            cards: Vec::new(),
        })
        .collect();
    let mut unplaced = Vec::new();

    for keg in store.kegs() {
        let card = BoardCard {
            keg_id: keg.id,
            content: format_card(keg, options, now),
        };
        match stations.index_of(stations.column_for(keg)) {
            Some(idx) => columns[idx].cards.push(card),
            None => unplaced.push(card),
        }
    }
    for column in &mut columns {
        column.count = column.cards.len();
    }

    BoardView { columns, unplaced }
}

/// Visual drag state.
///
/// Purely presentational: it never changes the store. [`DragState::end`]
/// must be called when the gesture finishes, whether or not the drop
/// produced a command.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DragState {
    dragging: Option<KegId>,
    origin: Option<usize>,
    over: Option<usize>,
}

impl DragState {
    /// Pick up a keg from column `origin`.
    pub fn start(&mut self, keg_id: KegId, origin: usize) {
        self.dragging = Some(keg_id);
        self.origin = Some(origin);
        self.over = Some(origin);
    }

    /// Hover over a column, highlighting it as the drop target.
    pub fn enter(&mut self, column: usize) {
        if self.dragging.is_some() {
            self.over = Some(column);
        }
    }

    /// Leave a column, removing its highlight.
    pub fn leave(&mut self, column: usize) {
        if self.over == Some(column) {
            self.over = None;
        }
    }

    /// Drop on a column.
    ///
    /// Returns the relocation to run, or `None` when nothing is being dragged,
    /// the column does not exist, or the keg is already there. The drop-target
    /// highlight is cleared either way.
    pub fn drop_on(&mut self, column: usize, stations: &Stations) -> Option<Relocate> {
        self.over = None;
        let keg_id = self.dragging?;
        if self.origin == Some(column) {
            return None;
        }
        let station = stations.names().get(column)?;
        Some(Relocate::to_station(keg_id, station, stations))
    }

    /// Finish the gesture, clearing all drag styling.
    pub fn end(&mut self) {
        *self = Self::default();
    }

    /// Keg being dragged.
    #[must_use]
    pub const fn dragging(&self) -> Option<KegId> {
        self.dragging
    }

    /// Highlighted drop target.
    #[must_use]
    pub const fn over(&self) -> Option<usize> {
        self.over
    }

    /// Whether a gesture is in progress.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.dragging.is_some()
    }
}
