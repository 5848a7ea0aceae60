//! Event handling for the keg tracker TUI

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use keg_core::views::{StatsPanel, View};
use keg_core::{Command, KegResult, Reloaded};
use tokio::sync::mpsc;

use crate::app::{App, Effect};

/// Application events
#[derive(Debug)]
pub enum AppEvent {
    /// Terminal key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Tick for the sync cooldown
    Tick,
    /// Result from the data client
    Data(DataEvent),
}

/// Results reported by the data client
#[derive(Debug)]
pub enum DataEvent {
    /// A command ran, and on success reloaded what it touched.
    Finished {
        /// Command that ran.
        command: Command,
        /// Reload snapshot or the failing call.
        result: KegResult<Reloaded>,
    },
    /// Stats view content.
    Stats(StatsPanel),
    /// Brewery name from the settings endpoint.
    Brewery(String),
}

/// Event handler that polls for terminal events
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<AppEvent>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let event_tx = tx.clone();

        // Terminal polling blocks, so it gets its own thread
        tokio::task::spawn_blocking(move || {
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key)) => AppEvent::Key(key),
                        Ok(Event::Resize(w, h)) => AppEvent::Resize(w, h),
                        _ => continue,
                    }
                } else {
                    AppEvent::Tick
                };
                if event_tx.send(event).is_err() {
                    break;
                }
            }
        });

        Self { rx, tx }
    }

    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }

    pub fn sender(&self) -> mpsc::UnboundedSender<AppEvent> {
        self.tx.clone()
    }
}

/// Handle keyboard input
///
/// Layers are checked top-down: an alert swallows the next key, then the
/// confirmation prompt, the edit form and a board pick-up each take all
/// input while open.
pub fn handle_key(app: &mut App, key: KeyEvent) -> Option<Effect> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.running = false;
        return None;
    }
    if app.alert.take().is_some() {
        return None;
    }
    if app.confirmation.is_some() {
        return confirm_key(app, key);
    }
    if app.editor.is_some() {
        return editor_key(app, key);
    }
    if app.drag.is_active() {
        return drag_key(app, key);
    }

    let board = app.view() == View::Board;
    match key.code {
        KeyCode::Char('q' | 'Q') => {
            app.running = false;
        }
        KeyCode::Tab => return app.next_view(),
        KeyCode::BackTab => return app.prev_view(),
        KeyCode::Char('1') => return app.switch_view(View::Grid),
        KeyCode::Char('2') => return app.switch_view(View::Board),
        KeyCode::Char('3') => return app.switch_view(View::Stats),
        KeyCode::Up | KeyCode::Char('k') => app.select_step(-1),
        KeyCode::Down | KeyCode::Char('j') => app.select_step(1),
        KeyCode::Left | KeyCode::Char('h') if board => app.move_column(-1),
        KeyCode::Right | KeyCode::Char('l') if board => app.move_column(1),
        KeyCode::Left | KeyCode::Char('h') => app.select_step(-1),
        KeyCode::Right | KeyCode::Char('l') => app.select_step(1),
        KeyCode::Enter if app.view() != View::Stats => app.open_editor(),
        KeyCode::Char('r') if app.view() != View::Stats => return app.reset_selected(),
        KeyCode::Char('m') if board => app.pick_up(),
        KeyCode::Char('a') => return app.add_keg(),
        KeyCode::Char('s') => return app.request_sync(),
        _ => {}
    }
    None
}

fn confirm_key(app: &mut App, key: KeyEvent) -> Option<Effect> {
    match key.code {
        KeyCode::Char('y' | 'Y') | KeyCode::Enter => app.answer(true),
        KeyCode::Char('n' | 'N') | KeyCode::Esc => app.answer(false),
        _ => None,
    }
}

fn editor_key(app: &mut App, key: KeyEvent) -> Option<Effect> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.close_editor(),
        KeyCode::Enter => return app.submit_editor(),
        KeyCode::Char('d') if ctrl => return app.delete_from_editor(),
        _ => {
            let editor = app.editor.as_mut()?;
            match key.code {
                KeyCode::Tab | KeyCode::Down => editor.next_field(),
                KeyCode::BackTab | KeyCode::Up => editor.prev_field(),
                KeyCode::Left => editor.cycle(-1),
                KeyCode::Right => editor.cycle(1),
                KeyCode::Backspace => editor.backspace(),
                KeyCode::Char(c) if !ctrl => editor.type_char(c),
                _ => {}
            }
        }
    }
    None
}

fn drag_key(app: &mut App, key: KeyEvent) -> Option<Effect> {
    match key.code {
        KeyCode::Left | KeyCode::Char('h') => app.move_column(-1),
        KeyCode::Right | KeyCode::Char('l') => app.move_column(1),
        KeyCode::Enter | KeyCode::Char('m') => return app.drop_keg(),
        KeyCode::Esc => app.cancel_drag(),
        _ => {}
    }
    None
}
