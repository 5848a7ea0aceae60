//! Data client for the keg tracker API
//!
//! Effects from the event loop run as independent tasks and report back
//! through the event channel. Nothing is serialized: two commands in flight
//! race, and whichever reload lands last is what the store shows.

use std::sync::Arc;

use keg_core::views::stats::load_stats;
use keg_core::{Command, KegApi, execute};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::app::{App, Effect};
use crate::events::{AppEvent, DataEvent};

/// Runs effects against the API on the tokio runtime
pub struct DataClient<A> {
    api: Arc<A>,
    tx: mpsc::UnboundedSender<AppEvent>,
}

impl<A: KegApi + 'static> DataClient<A> {
    pub fn new(api: A, tx: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self {
            api: Arc::new(api),
            tx,
        }
    }

    pub fn dispatch(&self, effect: Effect) {
        match effect {
            Effect::Run(command) => self.run(command),
            Effect::LoadStats => self.load_stats(),
        }
    }

    fn run(&self, command: Command) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = execute(api.as_ref(), &command).await;
            send(&tx, DataEvent::Finished { command, result });
        });
    }

    fn load_stats(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let panel = load_stats(api.as_ref()).await;
            send(&tx, DataEvent::Stats(panel));
        });
    }

    /// Fetch the brewery name for the header. Failures keep the default title.
    pub fn load_brewery(&self) {
        let api = Arc::clone(&self.api);
        let tx = self.tx.clone();
        tokio::spawn(async move {
            match api.brewery().await {
                Ok(info) => send(&tx, DataEvent::Brewery(info.name)),
                Err(err) => warn!(error = %err, "Brewery settings unavailable"),
            }
        });
    }
}

fn send(tx: &mpsc::UnboundedSender<AppEvent>, event: DataEvent) {
    if tx.send(AppEvent::Data(event)).is_err() {
        debug!("Event loop closed; dropping data event");
    }
}

/// Fold a data event into the app state, returning any follow-up effect.
pub fn apply_data_event(app: &mut App, event: DataEvent) -> Option<Effect> {
    match event {
        DataEvent::Finished { command, result } => app.finish(&command, result),
        DataEvent::Stats(panel) => {
            app.stats = panel;
            None
        }
        DataEvent::Brewery(name) => {
            if !name.is_empty() {
                app.brewery = Some(name);
            }
            None
        }
    }
}
