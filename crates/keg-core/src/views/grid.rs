//! Grid view: one card per keg, in store order.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::format::{CardContent, CardOptions, format_card};
use crate::reconcile::Command;
use crate::store::Store;
use crate::types::KegId;

/// Label of the reset control in a card footer.
pub const RESET_LABEL: &str = "Reset Keg";

/// One grid card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GridCard {
    /// Keg the card shows; clicking the body opens the editor for it.
    pub keg_id: KegId,
    /// Card body.
    pub content: CardContent,
    /// Footer control label.
    pub reset_label: &'static str,
}

impl GridCard {
    /// Command issued by the footer control, after confirmation.
    #[must_use]
    pub const fn reset(&self) -> Command {
        Command::ResetKeg { id: self.keg_id }
    }
}

/// Grid of keg cards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GridView {
    /// Cards in store order.
    pub cards: Vec<GridCard>,
}

/// Render the grid.
#[must_use]
pub fn render_grid(store: &Store, now: DateTime<Utc>) -> GridView {
    let cards = store
        .kegs()
        .iter()
        .map(|keg| GridCard {
            keg_id: keg.id,
            content: format_card(keg, CardOptions::default(), now),
            reset_label: RESET_LABEL,
        })
        .collect();
    GridView { cards }
}
