//! Application state for the keg tracker TUI

use std::time::Instant;

use chrono::Utc;
use keg_core::views::board::render_board;
use keg_core::views::modal::FormField;
use keg_core::views::{BoardView, DragState, KegForm, StatsPanel, View};
use keg_core::{Command, KegId, KegResult, Reloaded, Stations, Store, SyncGuard};
use tracing::{debug, error};

/// Work handed from the event loop to the data client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Execute a command and reload what it touched.
    Run(Command),
    /// Request the stats payload and recent events.
    LoadStats,
}

/// The open edit form and its focused field.
#[derive(Debug, Clone)]
pub struct Editor {
    /// Form contents.
    pub form: KegForm,
    /// Field receiving input.
    pub field: FormField,
}

impl Editor {
    fn new(form: KegForm) -> Self {
        Self {
            form,
            field: FormField::Label,
        }
    }

    /// Focus the next field.
    pub fn next_field(&mut self) {
        self.field = self.field.next();
    }

    /// Focus the previous field.
    pub fn prev_field(&mut self) {
        self.field = self.field.prev();
    }

    /// Append to the focused text field.
    pub fn type_char(&mut self, c: char) {
        if let Some(text) = self.form.text_mut(self.field) {
            text.push(c);
        }
    }

    /// Remove the last character of the focused text field.
    pub fn backspace(&mut self) {
        if let Some(text) = self.form.text_mut(self.field) {
            text.pop();
        }
    }

    /// Step the status or batch selector.
    pub fn cycle(&mut self, delta: isize) {
        match self.field {
            FormField::Status => {
                self.form.status = if delta < 0 {
                    self.form.status.prev()
                } else {
                    self.form.status.next()
                };
            }
            FormField::Batch => self.form.cycle_batch(delta),
            _ => {}
        }
    }
}

/// A destructive command waiting for a yes/no answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// Question shown to the user.
    pub prompt: String,
    /// Command run on yes.
    pub command: Command,
}

/// Main application state
#[derive(Debug)]
pub struct App {
    /// Is the app running
    pub running: bool,

    /// Kegs, batches and the active view
    pub store: Store,

    /// Board columns
    pub stations: Stations,

    /// Sync control
    pub sync: SyncGuard,

    /// Last stats load
    pub stats: StatsPanel,

    /// Keyboard relocation on the board
    pub drag: DragState,

    /// Keg under the cursor
    pub selected: Option<KegId>,

    /// Board column under the cursor
    pub column: usize,

    /// Open edit form
    pub editor: Option<Editor>,

    /// Pending destructive command
    pub confirmation: Option<Confirmation>,

    /// Error shown until the next key press
    pub alert: Option<String>,

    /// Brewery name for the header
    pub brewery: Option<String>,

    /// Set once the first load has landed
    pub loaded: bool,
}

impl App {
    pub fn new(stations: Stations, sync: SyncGuard) -> Self {
        Self {
            running: true,
            store: Store::new(),
            stations,
            sync,
            stats: StatsPanel::Loading,
            drag: DragState::default(),
            selected: None,
            column: 0,
            editor: None,
            confirmation: None,
            alert: None,
            brewery: None,
            loaded: false,
        }
    }

    pub const fn view(&self) -> View {
        self.store.view()
    }

    /// Switch views. Activating the stats view requests a fresh payload.
    pub fn switch_view(&mut self, view: View) -> Option<Effect> {
        if !self.store.set_view(view) {
            return None;
        }
        self.drag.end();
        match view {
            View::Grid => {
                self.keep_selection();
                None
            }
            View::Board => {
                self.follow_selection();
                None
            }
            View::Stats => {
                self.stats = StatsPanel::Loading;
                Some(Effect::LoadStats)
            }
        }
    }

    pub fn next_view(&mut self) -> Option<Effect> {
        self.switch_view(self.view().next())
    }

    pub fn prev_view(&mut self) -> Option<Effect> {
        self.switch_view(self.view().prev())
    }

    pub fn board(&self) -> BoardView {
        render_board(&self.store, &self.stations, Utc::now())
    }

    fn column_ids(&self, column: usize) -> Vec<KegId> {
        self.board().cards(column).iter().map(|c| c.keg_id).collect()
    }

    /// Move the cursor through the grid, or within the current board column.
    pub fn select_step(&mut self, delta: isize) {
        let ids: Vec<KegId> = match self.view() {
            View::Grid => self.store.kegs().iter().map(|k| k.id).collect(),
            View::Board => self.column_ids(self.column),
            View::Stats => return,
        };
        self.selected = step(&ids, self.selected, delta);
    }

    /// Move the board cursor one column. A picked-up keg travels with it and
    /// the column under it becomes the drop target.
    ///
    /// Kegs at an unknown location sit in a trailing column the cursor can
    /// reach but a carried keg cannot be dropped on.
    pub fn move_column(&mut self, delta: isize) {
        let last = self.board().column_count().saturating_sub(1) as isize;
        let mut next = (self.column as isize + delta).clamp(0, last) as usize;
        if self.drag.is_active() {
            if next >= self.stations.len() {
                next = self.column;
            }
            self.drag.leave(self.column);
            self.drag.enter(next);
            self.column = next;
            return;
        }
        self.column = next;
        self.selected = self.column_ids(next).first().copied();
    }

    /// Pick up the selected keg on the board.
    pub fn pick_up(&mut self) {
        if self.view() != View::Board {
            return;
        }
        let Some(id) = self.selected else { return };
        if let Some(origin) = self.board().column_of(id) {
            self.column = origin;
            self.drag.start(id, origin);
        }
    }

    /// Drop the picked-up keg on the column under the cursor.
    pub fn drop_keg(&mut self) -> Option<Effect> {
        let relocate = self.drag.drop_on(self.column, &self.stations);
        self.drag.end();
        match relocate {
            Some(relocate) => self.request(Command::Relocate(relocate)),
            None => {
                self.follow_selection();
                None
            }
        }
    }

    pub fn cancel_drag(&mut self) {
        self.drag.end();
        self.follow_selection();
    }

    /// Open the edit form for the selected keg.
    pub fn open_editor(&mut self) {
        let Some(keg) = self.selected.and_then(|id| self.store.keg(id)) else {
            return;
        };
        self.editor = Some(Editor::new(KegForm::open(keg, self.store.batches())));
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    /// Save the form. It stays open until the save lands.
    pub fn submit_editor(&mut self) -> Option<Effect> {
        let command = self.editor.as_ref()?.form.save_command();
        self.request(command)
    }

    /// Delete the keg being edited, if the form offers it.
    pub fn delete_from_editor(&mut self) -> Option<Effect> {
        let command = self.editor.as_ref()?.form.delete_command()?;
        self.request(command)
    }

    pub fn reset_selected(&mut self) -> Option<Effect> {
        let id = self.selected?;
        self.request(Command::ResetKeg { id })
    }

    pub fn add_keg(&mut self) -> Option<Effect> {
        self.request(Command::CreateKeg)
    }

    /// Press the sync control. Ignored while a sync is in flight or cooling
    /// down.
    pub fn request_sync(&mut self) -> Option<Effect> {
        self.sync.poll(Instant::now());
        if self.sync.begin() {
            Some(Effect::Run(Command::SyncBatches))
        } else {
            debug!(label = self.sync.label(), "Sync press ignored");
            None
        }
    }

    /// Check a command against the loaded state, then either hold it for
    /// confirmation or hand it on.
    pub fn request(&mut self, command: Command) -> Option<Effect> {
        if let Err(err) = command.check(&self.store, &self.stations) {
            self.alert = Some(err.to_string());
            return None;
        }
        if let Some(prompt) = command.confirmation(&self.store) {
            self.confirmation = Some(Confirmation { prompt, command });
            return None;
        }
        Some(Effect::Run(command))
    }

    /// Answer the pending confirmation.
    pub fn answer(&mut self, yes: bool) -> Option<Effect> {
        let pending = self.confirmation.take()?;
        yes.then_some(Effect::Run(pending.command))
    }

    /// Re-arm the sync control once its cooldown has passed.
    pub fn tick(&mut self, now: Instant) -> bool {
        self.sync.poll(now)
    }

    /// Apply a finished command.
    ///
    /// Returns a stats reload when the kegs changed under the stats view.
    pub fn finish(&mut self, command: &Command, result: KegResult<Reloaded>) -> Option<Effect> {
        if *command == Command::SyncBatches {
            let synced = result.as_ref().map(|r| r.synced.unwrap_or(0));
            self.sync.settle(&synced, Instant::now());
        }

        let reloaded = match result {
            Ok(reloaded) => reloaded,
            Err(err) => {
                error!(command = command.name(), error = %err, "Command failed");
                if *command != Command::SyncBatches {
                    self.alert = Some(command.failure_message(&err));
                }
                return None;
            }
        };

        let created = reloaded.created;
        let rerender = self.store.apply(reloaded);
        self.loaded = true;

        let edited = match command {
            Command::SaveKeg { id, .. } | Command::DeleteKeg { id } => Some(*id),
            _ => None,
        };
        if edited.is_some() && self.editor.as_ref().map(|e| e.form.keg_id) == edited {
            self.editor = None;
        }
        if created.is_some() {
            self.selected = created;
        }
        self.keep_selection();
        self.follow_selection();

        (rerender && self.view() == View::Stats).then_some(Effect::LoadStats)
    }

    fn keep_selection(&mut self) {
        let present = self.selected.is_some_and(|id| self.store.keg(id).is_some());
        if !present {
            self.selected = self.store.kegs().first().map(|k| k.id);
        }
    }

    fn follow_selection(&mut self) {
        if let Some(column) = self.selected.and_then(|id| self.board().column_of(id)) {
            self.column = column;
        }
    }
}

fn step(ids: &[KegId], current: Option<KegId>, delta: isize) -> Option<KegId> {
    let last = ids.len().checked_sub(1)? as isize;
    let next = match current.and_then(|id| ids.iter().position(|k| *k == id)) {
        Some(idx) => (idx as isize + delta).clamp(0, last) as usize,
        None => 0,
    };
    ids.get(next).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use keg_core::views::Relocate;
    use keg_core::{Batch, KegError, Keg};

    fn keg(id: KegId, location: &str, batch: Option<&str>) -> Keg {
        Keg {
            id,
            label: format!("Keg #{id}"),
            location: location.to_string(),
            batch_id: batch.map(str::to_string),
            ..Keg::default()
        }
    }

    fn app() -> App {
        let mut app = App::new(Stations::default(), SyncGuard::default());
        app.store.replace_batches(vec![Batch {
            id: "b1".into(),
            name: "Citra Haze".into(),
            ..Batch::default()
        }]);
        app.store.replace_kegs(vec![
            keg(1, "", Some("b1")),
            keg(2, "Troy", None),
            keg(3, "", None),
        ]);
        app.selected = Some(1);
        app
    }

    #[test]
    fn activating_stats_requests_payload() {
        let mut app = app();
        app.stats = StatsPanel::Failed;

        assert_eq!(app.switch_view(View::Stats), Some(Effect::LoadStats));
        assert_eq!(app.stats, StatsPanel::Loading);
        assert_eq!(app.switch_view(View::Stats), None);
    }

    #[test]
    fn reset_waits_for_confirmation() {
        let mut app = app();
        assert_eq!(app.reset_selected(), None);
        let pending = app.confirmation.clone().unwrap();
        assert!(pending.prompt.starts_with("Reset Keg #1 to empty?"));

        assert_eq!(app.answer(true), Some(Effect::Run(Command::ResetKeg { id: 1 })));
        assert!(app.confirmation.is_none());
    }

    #[test]
    fn declined_confirmation_runs_nothing() {
        let mut app = app();
        app.reset_selected();
        assert_eq!(app.answer(false), None);
        assert!(app.confirmation.is_none());
    }

    #[test]
    fn delete_with_batch_is_refused_locally() {
        let mut app = app();
        let effect = app.request(Command::DeleteKeg { id: 1 });
        assert_eq!(effect, None);
        assert!(app.confirmation.is_none());
        assert!(app.alert.unwrap().contains("reset it before deleting"));
    }

    #[test]
    fn editor_offers_delete_only_for_empty_kegs() {
        let mut app = app();
        app.open_editor();
        assert_eq!(app.delete_from_editor(), None);
        assert!(app.confirmation.is_none());

        app.selected = Some(3);
        app.open_editor();
        app.delete_from_editor();
        assert_eq!(
            app.confirmation.map(|c| c.command),
            Some(Command::DeleteKeg { id: 3 })
        );
    }

    #[test]
    fn sync_presses_are_debounced() {
        let mut app = app();
        assert_eq!(app.request_sync(), Some(Effect::Run(Command::SyncBatches)));
        assert_eq!(app.request_sync(), None);

        app.finish(&Command::SyncBatches, Ok(Reloaded {
            synced: Some(3),
            ..Reloaded::default()
        }));
        assert_eq!(app.sync.label(), "Synced 3 batches");
        assert_eq!(app.request_sync(), None);
        assert!(app.alert.is_none());
    }

    #[test]
    fn sync_press_after_cooldown_needs_no_tick() {
        let mut app = app();
        app.sync.begin();
        let settled = Instant::now().checked_sub(Duration::from_secs(3)).unwrap();
        app.sync.settle::<KegError>(&Ok(3), settled);
        assert_eq!(app.sync.label(), "Synced 3 batches");

        assert_eq!(app.request_sync(), Some(Effect::Run(Command::SyncBatches)));
        assert_eq!(app.sync.label(), "Syncing…");
    }

    #[test]
    fn failed_sync_changes_label_without_alert() {
        let mut app = app();
        app.request_sync();
        app.finish(&Command::SyncBatches, Err(KegError::api(502, "upstream")));
        assert_eq!(app.sync.label(), "Sync failed!");
        assert!(app.alert.is_none());
    }

    #[test]
    fn drop_on_other_column_relocates() {
        let mut app = app();
        app.switch_view(View::Board);
        assert_eq!(app.column, 0);

        app.pick_up();
        app.move_column(1);
        assert_eq!(app.drag.over(), Some(1));
        assert_eq!(
            app.drop_keg(),
            Some(Effect::Run(Command::Relocate(Relocate {
                keg_id: 1,
                location: "Conditioning Fridge".into(),
            })))
        );
        assert!(!app.drag.is_active());
    }

    #[test]
    fn drop_on_default_station_clears_location() {
        let mut app = app();
        app.selected = Some(2);
        app.switch_view(View::Board);
        assert_eq!(app.column, 3);

        app.pick_up();
        app.move_column(-3);
        let effect = app.drop_keg();
        assert_eq!(
            effect,
            Some(Effect::Run(Command::Relocate(Relocate {
                keg_id: 2,
                location: String::new(),
            })))
        );
    }

    #[test]
    fn drop_on_origin_is_noop() {
        let mut app = app();
        app.switch_view(View::Board);
        app.pick_up();
        app.move_column(1);
        app.move_column(-1);
        assert_eq!(app.drop_keg(), None);
        assert!(!app.drag.is_active());
        assert_eq!(app.drag.over(), None);
    }

    #[test]
    fn column_cursor_clamps_and_selects_first_card() {
        let mut app = app();
        app.switch_view(View::Board);
        app.move_column(-1);
        assert_eq!(app.column, 0);

        app.move_column(3);
        assert_eq!(app.column, 3);
        assert_eq!(app.selected, Some(2));

        app.move_column(10);
        assert_eq!(app.column, 4);
        assert_eq!(app.selected, None);
    }

    #[test]
    fn unplaced_column_is_reachable_and_draggable() {
        let mut app = app();
        let mut kegs = app.store.kegs().to_vec();
        kegs.push(keg(4, "Garage", None));
        app.store.replace_kegs(kegs);
        app.switch_view(View::Board);

        for _ in 0..10 {
            app.move_column(1);
        }
        assert_eq!(app.column, 5);
        assert_eq!(app.selected, Some(4));
        app.select_step(1);
        assert_eq!(app.selected, Some(4));

        app.open_editor();
        assert_eq!(app.editor.as_ref().map(|e| e.form.keg_id), Some(4));
        app.close_editor();

        app.pick_up();
        assert_eq!(app.drag.dragging(), Some(4));
        app.move_column(1);
        assert_eq!(app.column, 5);
        app.move_column(-1);
        assert_eq!(app.drag.over(), Some(4));
        app.move_column(1);
        assert_eq!(app.column, 4);
        assert_eq!(
            app.drop_keg(),
            Some(Effect::Run(Command::Relocate(Relocate {
                keg_id: 4,
                location: "Brent".into(),
            })))
        );
    }

    #[test]
    fn grid_selection_clamps() {
        let mut app = app();
        app.select_step(-1);
        assert_eq!(app.selected, Some(1));
        app.select_step(5);
        assert_eq!(app.selected, Some(3));
    }

    #[test]
    fn save_closes_editor_once_it_lands() {
        let mut app = app();
        app.open_editor();
        let Some(Effect::Run(command)) = app.submit_editor() else {
            panic!("expected save command");
        };
        assert!(app.editor.is_some());

        app.finish(&command, Ok(Reloaded {
            kegs: Some(vec![keg(1, "Brent", None)]),
            ..Reloaded::default()
        }));
        assert!(app.editor.is_none());
        assert_eq!(app.store.kegs().len(), 1);
    }

    #[test]
    fn failed_save_keeps_editor_and_alerts() {
        let mut app = app();
        app.open_editor();
        let Some(Effect::Run(command)) = app.submit_editor() else {
            panic!("expected save command");
        };

        app.finish(&command, Err(KegError::api(404, "Keg not found")));
        assert!(app.editor.is_some());
        assert_eq!(app.alert.as_deref(), Some("Keg not found"));
    }

    #[test]
    fn failed_add_uses_add_message() {
        let mut app = app();
        app.finish(&Command::CreateKeg, Err(KegError::Transport("connection refused".into())));
        assert_eq!(app.alert.as_deref(), Some("Failed to add keg: connection refused"));
    }

    #[test]
    fn created_keg_is_selected() {
        let mut app = app();
        let mut kegs = app.store.kegs().to_vec();
        kegs.push(keg(4, "", None));
        app.finish(&Command::CreateKeg, Ok(Reloaded {
            kegs: Some(kegs),
            created: Some(4),
            ..Reloaded::default()
        }));
        assert_eq!(app.selected, Some(4));
    }

    #[test]
    fn kegs_reload_under_stats_refetches_stats() {
        let mut app = app();
        app.switch_view(View::Stats);
        let effect = app.finish(&Command::ResetKeg { id: 1 }, Ok(Reloaded {
            kegs: Some(vec![keg(1, "", None)]),
            ..Reloaded::default()
        }));
        assert_eq!(effect, Some(Effect::LoadStats));

        app.switch_view(View::Grid);
        let effect = app.finish(&Command::ResetKeg { id: 1 }, Ok(Reloaded {
            kegs: Some(vec![keg(1, "", None)]),
            ..Reloaded::default()
        }));
        assert_eq!(effect, None);
    }

    #[test]
    fn selection_falls_back_when_keg_disappears() {
        let mut app = app();
        app.selected = Some(3);
        app.finish(&Command::DeleteKeg { id: 3 }, Ok(Reloaded {
            kegs: Some(vec![keg(1, "", Some("b1")), keg(2, "Troy", None)]),
            ..Reloaded::default()
        }));
        assert_eq!(app.selected, Some(1));
    }

    #[test]
    fn editor_edits_text_and_selectors() {
        let mut app = app();
        app.open_editor();
        let editor = app.editor.as_mut().unwrap();

        editor.backspace();
        editor.type_char('9');
        assert_eq!(editor.form.label, "Keg #9");

        editor.next_field();
        assert_eq!(editor.field, FormField::Status);
        editor.cycle(1);
        assert_eq!(editor.form.status, keg_core::KegStatus::Full);
        editor.type_char('x');

        editor.next_field();
        editor.next_field();
        assert_eq!(editor.field, FormField::Batch);
        editor.cycle(-1);
        assert_eq!(editor.form.selected_batch(), None);
    }
}
