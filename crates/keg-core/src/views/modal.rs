//! Keg edit form.
//!
//! One form is bound to one keg at a time. The batch list is built fresh
//! from the batches loaded when the form opens.

use serde::Serialize;

use crate::format::sanitize;
use crate::reconcile::Command;
use crate::types::{Batch, Keg, KegId, KegStatus, KegUpdate};

/// Label of the "no batch" option.
pub const NO_BATCH_LABEL: &str = "-- None --";

/// An entry in the batch list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchOption {
    /// Batch id; `None` for the "no batch" entry.
    pub id: Option<String>,
    /// Display text.
    pub label: String,
}

impl BatchOption {
    /// Option for a batch: `#N ` prefix, display name and style.
    #[must_use]
    pub fn from_batch(batch: &Batch) -> Self {
        let style = if batch.style.is_empty() {
            "no style"
        } else {
            batch.style.as_str()
        };
        Self {
            id: Some(batch.id.clone()),
            label: sanitize(&format!(
                "{}{} ({style})",
                batch.number_prefix(),
                batch.display_name()
            )),
        }
    }
}

/// Editable fields in focus order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum FormField {
    /// Keg label.
    #[default]
    Label,
    /// Fill status.
    Status,
    /// Location.
    Location,
    /// Assigned batch.
    Batch,
    /// Purchase date.
    DatePurchased,
    /// Keg notes.
    Notes,
}

impl FormField {
    /// Fields in focus order.
    pub const ALL: [Self; 6] = [
        Self::Label,
        Self::Status,
        Self::Location,
        Self::Batch,
        Self::DatePurchased,
        Self::Notes,
    ];

    /// Field caption.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Label => "Label",
            Self::Status => "Status",
            Self::Location => "Location",
            Self::Batch => "Batch",
            Self::DatePurchased => "Date Purchased",
            Self::Notes => "Notes",
        }
    }

    /// Whether the field takes free text.
    #[must_use]
    pub const fn is_text(self) -> bool {
        matches!(
            self,
            Self::Label | Self::Location | Self::DatePurchased | Self::Notes
        )
    }

    /// Next field, wrapping.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous field, wrapping.
    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|f| *f == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Edit form for one keg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KegForm {
    /// Keg being edited.
    pub keg_id: KegId,
    /// Form title, the keg label.
    pub title: String,
    /// Label field.
    pub label: String,
    /// Status field.
    pub status: KegStatus,
    /// Location field.
    pub location: String,
    /// Purchase date field.
    pub date_purchased: String,
    /// Notes field.
    pub notes: String,
    options: Vec<BatchOption>,
    batch_notes: Vec<String>,
    selected: usize,
    notes_panel: Option<String>,
    can_delete: bool,
}

impl KegForm {
    /// Populate the form from a keg and the loaded batches.
    ///
    /// The batch matching the keg's `batch_id` is preselected; without a
    /// match, "no batch" is selected. The notes panel starts from the keg's
    /// own batch snapshot.
    #[must_use]
    pub fn open(keg: &Keg, batches: &[Batch]) -> Self {
        let mut options = vec![BatchOption {
            id: None,
            label: NO_BATCH_LABEL.to_string(),
        }];
        options.extend(batches.iter().map(BatchOption::from_batch));

        let mut batch_notes = vec![String::new()];
        batch_notes.extend(batches.iter().map(|b| b.batch_notes.clone()));

        let selected = keg
            .batch_id
            .as_deref()
            .and_then(|id| batches.iter().position(|b| b.id == id))
            .map_or(0, |idx| idx + 1);

        let notes_panel = keg
            .batch
            .as_ref()
            .filter(|b| !b.batch_notes.is_empty())
            .map(|b| sanitize(&b.batch_notes));

        Self {
            keg_id: keg.id,
            title: sanitize(&keg.label),
            label: keg.label.clone(),
            status: keg.status,
            location: keg.location.clone(),
            date_purchased: keg.date_purchased.clone(),
            notes: keg.notes.clone(),
            options,
            batch_notes,
            selected,
            notes_panel,
            can_delete: keg.is_empty(),
        }
    }

    /// Batch list, "no batch" first.
    #[must_use]
    pub fn batch_options(&self) -> &[BatchOption] {
        &self.options
    }

    /// Index of the selected batch option.
    #[must_use]
    pub const fn selected(&self) -> usize {
        self.selected
    }

    /// Selected batch id, if any.
    #[must_use]
    pub fn selected_batch(&self) -> Option<&str> {
        self.options.get(self.selected).and_then(|o| o.id.as_deref())
    }

    /// Select a batch option and refresh the notes panel. Out-of-range
    /// indexes are ignored.
    pub fn select_batch(&mut self, index: usize) {
        if index >= self.options.len() {
            return;
        }
        self.selected = index;
        self.notes_panel = self
            .batch_notes
            .get(index)
            .filter(|n| !n.is_empty())
            .map(|n| sanitize(n));
    }

    /// Step the batch selection by `delta`, wrapping.
    pub fn cycle_batch(&mut self, delta: isize) {
        let len = self.options.len() as isize;
        let next = (self.selected as isize + delta).rem_euclid(len);
        self.select_batch(next as usize);
    }

    /// Notes of the selected batch; `None` hides the panel.
    #[must_use]
    pub fn notes_panel(&self) -> Option<&str> {
        self.notes_panel.as_deref()
    }

    /// Whether the delete control is offered.
    #[must_use]
    pub const fn can_delete(&self) -> bool {
        self.can_delete
    }

    /// Text of a free-text field.
    #[must_use]
    pub fn text(&self, field: FormField) -> Option<&str> {
        match field {
            FormField::Label => Some(&self.label),
            FormField::Location => Some(&self.location),
            FormField::DatePurchased => Some(&self.date_purchased),
            FormField::Notes => Some(&self.notes),
            FormField::Status | FormField::Batch => None,
        }
    }

    /// Mutable text of a free-text field.
    pub fn text_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Label => Some(&mut self.label),
            FormField::Location => Some(&mut self.location),
            FormField::DatePurchased => Some(&mut self.date_purchased),
            FormField::Notes => Some(&mut self.notes),
            FormField::Status | FormField::Batch => None,
        }
    }

    /// Update carrying every editable field. A selected batch is sent as
    /// `batch_id`; no selection explicitly clears the batch.
    #[must_use]
    pub fn to_update(&self) -> KegUpdate {
        let update = KegUpdate {
            label: Some(self.label.clone()),
            status: Some(self.status),
            location: Some(self.location.clone()),
            date_purchased: Some(self.date_purchased.clone()),
            notes: Some(self.notes.clone()),
            ..KegUpdate::default()
        };
        match self.selected_batch() {
            Some(id) => update.with_batch(id),
            None => update.with_cleared_batch(),
        }
    }

    /// Command for submitting the form.
    #[must_use]
    pub fn save_command(&self) -> Command {
        Command::SaveKeg {
            id: self.keg_id,
            update: self.to_update(),
        }
    }

    /// Command for the delete control, when offered.
    #[must_use]
    pub const fn delete_command(&self) -> Option<Command> {
        if self.can_delete {
            Some(Command::DeleteKeg { id: self.keg_id })
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn batches() -> Vec<Batch> {
        vec![
            Batch {
                id: "b1".into(),
                batch_no: Some(12),
                name: "Batch 12".into(),
                style: "IPA".into(),
                recipe_name: "Hop Bomb".into(),
                batch_notes: "Dry hopped twice".into(),
                ..Batch::default()
            },
            Batch {
                id: "b2".into(),
                name: "Table Beer".into(),
                ..Batch::default()
            },
        ]
    }

    fn assigned_keg() -> Keg {
        let batch = batches().remove(0);
        Keg {
            id: 3,
            label: "Keg #3".into(),
            status: KegStatus::Full,
            location: "Troy".into(),
            batch_id: Some(batch.id.clone()),
            batch: Some(batch),
            notes: "dented".into(),
            ..Keg::default()
        }
    }

    #[test]
    fn options_list_none_first() {
        let form = KegForm::open(&assigned_keg(), &batches());
        let labels: Vec<&str> = form.batch_options().iter().map(|o| o.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["-- None --", "#12 Hop Bomb (IPA)", "Table Beer (no style)"]
        );
    }

    #[test]
    fn current_batch_preselected_with_notes() {
        let form = KegForm::open(&assigned_keg(), &batches());
        assert_eq!(form.selected(), 1);
        assert_eq!(form.selected_batch(), Some("b1"));
        assert_eq!(form.notes_panel(), Some("Dry hopped twice"));
        assert_eq!(form.title, "Keg #3");
    }

    #[test]
    fn selecting_batch_without_notes_hides_panel() {
        let mut form = KegForm::open(&assigned_keg(), &batches());
        form.select_batch(2);
        assert_eq!(form.notes_panel(), None);
        form.cycle_batch(-1);
        assert_eq!(form.notes_panel(), Some("Dry hopped twice"));
        form.cycle_batch(2);
        assert_eq!(form.selected(), 0);
        assert_eq!(form.notes_panel(), None);
    }

    #[test]
    fn submit_with_batch_sends_all_fields() {
        let mut form = KegForm::open(&assigned_keg(), &batches());
        form.select_batch(2);
        form.status = KegStatus::OnTap;

        let body = serde_json::to_value(form.to_update()).unwrap();
        assert_eq!(
            body,
            json!({
                "label": "Keg #3",
                "status": "on_tap",
                "location": "Troy",
                "batch_id": "b2",
                "date_purchased": "",
                "notes": "dented",
            })
        );
    }

    #[test]
    fn submit_without_batch_clears() {
        let mut form = KegForm::open(&assigned_keg(), &batches());
        form.select_batch(0);
        let update = form.to_update();
        assert!(update.clear_batch);
        assert!(update.batch_id.is_none());
        assert_eq!(
            form.save_command(),
            Command::SaveKeg { id: 3, update }
        );
    }

    #[test]
    fn unknown_batch_id_selects_none() {
        let mut keg = assigned_keg();
        keg.batch_id = Some("gone".into());
        let form = KegForm::open(&keg, &batches());
        assert_eq!(form.selected(), 0);
    }

    #[test]
    fn text_fields_editable() {
        let mut form = KegForm::open(&assigned_keg(), &batches());
        if let Some(text) = form.text_mut(FormField::Location) {
            text.clear();
        }
        assert_eq!(form.text(FormField::Location), Some(""));
        assert!(form.text_mut(FormField::Status).is_none());
        assert_eq!(FormField::Notes.next(), FormField::Label);
        assert_eq!(FormField::Label.prev(), FormField::Notes);
    }

    proptest! {
        #[test]
        fn delete_offered_iff_no_batch(has_batch in any::<bool>(), id in 1u64..1000) {
            let keg = Keg {
                id,
                label: format!("Keg #{id}"),
                batch_id: has_batch.then(|| "b1".to_string()),
                ..Keg::default()
            };
            let form = KegForm::open(&keg, &batches());
            prop_assert_eq!(form.can_delete(), !has_batch);
            prop_assert_eq!(
                form.delete_command(),
                (!has_batch).then_some(Command::DeleteKeg { id })
            );
        }
    }
}
