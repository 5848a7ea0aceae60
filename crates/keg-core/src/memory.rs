//! In-memory keg tracker.
//!
//! [`MemoryBackend`] serves the same contract as the real server: ids are
//! assigned sequentially, updates honor `clear_batch`, resets clear the keg
//! and a keg with a batch cannot be deleted. Every call is recorded so tests
//! can assert on the exact request sequence, and a single failure can be
//! injected with [`MemoryBackend::fail_next`].

use chrono::Utc;
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::api::KegApi;
use crate::error::{KegError, KegResult};
use crate::types::{
    Batch, BreweryInfo, Health, HistoryEntry, Keg, KegEvent, KegId, KegStatus, KegUpdate,
    MonthlyCount, NamedCount, OverallStats, PersonStats, StatsPayload, SyncReport,
};

/// Locations that count as a person when logging events.
const PEOPLE: [&str; 3] = ["Michael", "Troy", "Brent"];

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// HTTP method.
    pub method: &'static str,
    /// Request path.
    pub path: String,
    /// JSON body, if any.
    pub body: Option<Value>,
}

impl Request {
    /// `GET path`.
    pub fn get(path: impl Into<String>) -> Self {
        Self {
            method: "GET",
            path: path.into(),
            body: None,
        }
    }

    /// `POST path` without a body.
    pub fn post(path: impl Into<String>) -> Self {
        Self {
            method: "POST",
            path: path.into(),
            body: None,
        }
    }

    /// `PUT path` with a JSON body.
    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self {
            method: "PUT",
            path: path.into(),
            body: Some(body),
        }
    }

    /// `DELETE path`.
    pub fn delete(path: impl Into<String>) -> Self {
        Self {
            method: "DELETE",
            path: path.into(),
            body: None,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    kegs: Vec<Keg>,
    batches: Vec<Batch>,
    events: Vec<KegEvent>,
    stats: StatsPayload,
    brewery: BreweryInfo,
    requests: Vec<Request>,
    fail_next: Option<KegError>,
}

impl State {
    fn record(&mut self, request: Request) -> KegResult<()> {
        debug!(method = request.method, path = %request.path, "Memory request");
        self.requests.push(request);
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn keg_mut(&mut self, id: KegId) -> KegResult<&mut Keg> {
        self.kegs
            .iter_mut()
            .find(|k| k.id == id)
            .ok_or_else(|| KegError::api(404, "Keg not found"))
    }

    fn snapshot(&self, batch_id: Option<&str>) -> Option<Batch> {
        let batch = self.batches.iter().find(|b| Some(b.id.as_str()) == batch_id)?;
        Some(Batch {
            brew_date: String::new(),
            status: String::new(),
            last_synced: None,
            ..batch.clone()
        })
    }

    fn batch_info(&self, batch_id: Option<&str>) -> (String, String) {
        self.batches
            .iter()
            .find(|b| Some(b.id.as_str()) == batch_id)
            .map(|b| (b.display_name().to_string(), b.style.clone()))
            .unwrap_or_default()
    }

    fn log_event(&mut self, keg_id: KegId, event_type: &str, person: &str, batch_id: Option<&str>) {
        let (batch_name, style) = self.batch_info(batch_id);
        let id = self.events.last().map_or(1, |e| e.id + 1);
        self.events.push(KegEvent {
            id,
            keg_id,
            event_type: event_type.to_string(),
            person: person.to_string(),
            batch_name,
            style,
            timestamp: Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string(),
        });
        self.stats.event_count = Some(self.events.len() as u64);
    }
}

/// Keg tracker held in memory.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// Empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sixteen kegs, four batches, a few events and a stats payload.
    #[must_use]
    pub fn demo() -> Self {
        let batches = demo_batches();
        let backend = Self::new().with_batches(batches).with_brewery(BreweryInfo {
            name: "Backyard Brewing".into(),
            logo_url: String::new(),
        });
        {
            let mut state = backend.state.lock();
            let placements: [(KegStatus, &str, Option<&str>); 5] = [
                (KegStatus::OnTap, "Troy", Some("bf-031")),
                (KegStatus::Full, "Conditioning Fridge", Some("bf-031")),
                (KegStatus::Full, "Michael", Some("bf-030")),
                (KegStatus::OnTap, "Brent", Some("bf-028")),
                (KegStatus::Full, "", Some("bf-028")),
            ];
            for id in 1..=16u64 {
                let (status, location, batch_id) = placements
                    .get(id as usize - 1)
                    .copied()
                    .unwrap_or((KegStatus::Empty, if id == 7 { "Conditioning Fridge" } else { "" }, None));
                let keg = Keg {
                    id,
                    label: format!("Keg #{id}"),
                    status,
                    location: location.to_string(),
                    batch_id: batch_id.map(String::from),
                    date_purchased: if id <= 8 { "2023-11-04".into() } else { String::new() },
                    notes: if id == 1 { "Dented rim".into() } else { String::new() },
                    batch: state.snapshot(batch_id),
                };
                state.kegs.push(keg);
            }
            state.log_event(1, "filled", "", Some("bf-031"));
            state.log_event(1, "assigned", "Troy", Some("bf-031"));
            state.log_event(1, "tapped", "Troy", Some("bf-031"));
            state.log_event(4, "assigned", "Brent", Some("bf-028"));
            state.stats = demo_stats(state.events.len() as u64);
        }
        backend
    }

    /// Replace the kegs.
    #[must_use]
    pub fn with_kegs(self, kegs: Vec<Keg>) -> Self {
        self.state.lock().kegs = kegs;
        self
    }

    /// Replace the batches.
    #[must_use]
    pub fn with_batches(self, batches: Vec<Batch>) -> Self {
        self.state.lock().batches = batches;
        self
    }

    /// Replace the stats payload.
    #[must_use]
    pub fn with_stats(self, stats: StatsPayload) -> Self {
        self.state.lock().stats = stats;
        self
    }

    /// Replace the brewery settings.
    #[must_use]
    pub fn with_brewery(self, brewery: BreweryInfo) -> Self {
        self.state.lock().brewery = brewery;
        self
    }

    /// Fail the next call with `err`. The call is still recorded.
    pub fn fail_next(&self, err: KegError) {
        self.state.lock().fail_next = Some(err);
    }

    /// Drain the recorded calls.
    pub fn take_requests(&self) -> Vec<Request> {
        std::mem::take(&mut self.state.lock().requests)
    }

    /// Current kegs, bypassing the request log.
    pub fn kegs(&self) -> Vec<Keg> {
        self.state.lock().kegs.clone()
    }
}

fn to_value<T: Serialize>(value: &T) -> KegResult<Value> {
    Ok(serde_json::to_value(value)?)
}

impl KegApi for MemoryBackend {
    async fn list_kegs(&self) -> KegResult<Vec<Keg>> {
        let mut state = self.state.lock();
        state.record(Request::get("/api/kegs"))?;
        Ok(state.kegs.clone())
    }

    async fn list_batches(&self) -> KegResult<Vec<Batch>> {
        let mut state = self.state.lock();
        state.record(Request::get("/api/batches"))?;
        Ok(state.batches.clone())
    }

    async fn stats(&self) -> KegResult<StatsPayload> {
        let mut state = self.state.lock();
        state.record(Request::get("/api/stats"))?;
        Ok(state.stats.clone())
    }

    async fn recent_events(&self) -> KegResult<Vec<KegEvent>> {
        let mut state = self.state.lock();
        state.record(Request::get("/api/stats/events"))?;
        Ok(state.events.iter().rev().cloned().collect())
    }

    async fn brewery(&self) -> KegResult<BreweryInfo> {
        let mut state = self.state.lock();
        state.record(Request::get("/api/settings/brewery"))?;
        Ok(state.brewery.clone())
    }

    async fn health(&self) -> KegResult<Health> {
        let mut state = self.state.lock();
        state.record(Request::get("/health"))?;
        Ok(Health {
            status: "ok".into(),
        })
    }

    async fn create_keg(&self) -> KegResult<Keg> {
        let mut state = self.state.lock();
        state.record(Request::post("/api/kegs"))?;
        let id = state.kegs.iter().map(|k| k.id).max().unwrap_or(0) + 1;
        let keg = Keg {
            id,
            label: format!("Keg #{id}"),
            ..Keg::default()
        };
        state.kegs.push(keg.clone());
        Ok(keg)
    }

    async fn update_keg(&self, id: KegId, update: &KegUpdate) -> KegResult<Keg> {
        let mut state = self.state.lock();
        state.record(Request::put(format!("/api/kegs/{id}"), to_value(update)?))?;

        let keg = state.keg_mut(id)?;
        let old_location = keg.location.clone();
        let old_batch = keg.batch_id.clone();
        let old_status = keg.status;

        if let Some(label) = &update.label {
            keg.label.clone_from(label);
        }
        if let Some(status) = update.status {
            keg.status = status;
        }
        if let Some(location) = &update.location {
            keg.location.clone_from(location);
        }
        if update.clear_batch {
            keg.batch_id = None;
        } else if let Some(batch_id) = &update.batch_id {
            keg.batch_id = Some(batch_id.clone());
        }
        if let Some(date) = &update.date_purchased {
            keg.date_purchased.clone_from(date);
        }
        if let Some(notes) = &update.notes {
            keg.notes.clone_from(notes);
        }
        let location = keg.location.clone();
        let batch_id = keg.batch_id.clone();
        let status = keg.status;

        let snapshot = state.snapshot(batch_id.as_deref());
        let keg = state.keg_mut(id)?;
        keg.batch = snapshot;
        let updated = keg.clone();

        if batch_id.is_some() && batch_id != old_batch {
            state.log_event(id, "filled", "", batch_id.as_deref());
        }
        if PEOPLE.contains(&location.as_str()) && location != old_location {
            state.log_event(id, "assigned", &location, batch_id.as_deref());
        }
        if status == KegStatus::OnTap && old_status != KegStatus::OnTap {
            state.log_event(id, "tapped", &location, batch_id.as_deref());
        }
        Ok(updated)
    }

    async fn reset_keg(&self, id: KegId) -> KegResult<Keg> {
        let mut state = self.state.lock();
        state.record(Request::post(format!("/api/kegs/{id}/reset")))?;

        let keg = state.keg_mut(id)?;
        let person = if PEOPLE.contains(&keg.location.as_str()) {
            keg.location.clone()
        } else {
            String::new()
        };
        let batch_id = keg.batch_id.take();
        keg.status = KegStatus::Empty;
        keg.location.clear();
        keg.date_purchased.clear();
        keg.notes.clear();
        keg.batch = None;
        let reset = keg.clone();

        if !person.is_empty() || batch_id.is_some() {
            state.log_event(id, "returned", &person, batch_id.as_deref());
        }
        Ok(reset)
    }

    async fn delete_keg(&self, id: KegId) -> KegResult<()> {
        let mut state = self.state.lock();
        state.record(Request::delete(format!("/api/kegs/{id}")))?;

        if !state.keg_mut(id)?.is_empty() {
            return Err(KegError::api(
                400,
                "Cannot delete a keg with a batch assigned. Reset it first.",
            ));
        }
        state.log_event(id, "deleted", "", None);
        state.kegs.retain(|k| k.id != id);
        Ok(())
    }

    async fn sync_batches(&self) -> KegResult<SyncReport> {
        let mut state = self.state.lock();
        state.record(Request::post("/api/batches/sync"))?;
        let now = Utc::now().to_rfc3339();
        for batch in &mut state.batches {
            batch.last_synced = Some(now.clone());
        }
        Ok(SyncReport {
            synced: state.batches.len() as u64,
        })
    }
}

fn demo_batches() -> Vec<Batch> {
    let batch = |id: &str, no: i64, name: &str, recipe: &str, style: &str, abv: Option<f64>| Batch {
        id: id.into(),
        batch_no: Some(no),
        name: name.into(),
        style: style.into(),
        abv,
        recipe_name: recipe.into(),
        status: "Completed".into(),
        ..Batch::default()
    };
    vec![
        Batch {
            brew_date: "2024-04-20".into(),
            bottling_date: "2024-05-05".into(),
            batch_notes: "Double dry hopped".into(),
            ..batch("bf-031", 31, "Batch 31", "Citra Haze", "NEIPA", Some(6.2))
        },
        Batch {
            brew_date: "2024-04-02".into(),
            bottling_date: "2024-04-30".into(),
            ..batch("bf-030", 30, "Batch 30", "Dark Matter", "Imperial Stout", Some(9.1))
        },
        Batch {
            brew_date: "2024-03-10".into(),
            bottling_date: "2024-04-07".into(),
            batch_notes: "Lagered four weeks".into(),
            ..batch("bf-028", 28, "Batch 28", "Sunday Pils", "German Pils", Some(4.8))
        },
        Batch {
            brew_date: "2024-02-25".into(),
            status: "Fermenting".into(),
            ..batch("bf-027", 27, "Batch 27", "", "", None)
        },
    ]
}

fn demo_stats(event_count: u64) -> StatsPayload {
    let named = |name: &str, count| NamedCount {
        name: name.into(),
        count,
    };
    let history = |batch: &str, days| HistoryEntry {
        batch_name: batch.into(),
        days,
        ..HistoryEntry::default()
    };
    StatsPayload {
        people: vec![
            PersonStats {
                name: "Troy".into(),
                kegs_consumed: 3,
                litres_consumed: 57.0,
                avg_days_per_keg: 14.3,
                litres_per_month: 39.9,
                top_styles: vec![named("NEIPA", 2), named("German Pils", 1)],
                top_batches: vec![named("Citra Haze", 2)],
                history: vec![
                    history("Sunday Pils", 12.0),
                    history("Citra Haze", 16.5),
                    history("Citra Haze", 14.4),
                ],
            },
            PersonStats {
                name: "Brent".into(),
                kegs_consumed: 1,
                litres_consumed: 19.0,
                avg_days_per_keg: 21.0,
                litres_per_month: 27.1,
                top_styles: vec![named("Imperial Stout", 1)],
                top_batches: vec![named("Dark Matter", 1)],
                history: vec![history("Dark Matter", 21.0)],
            },
        ],
        overall: OverallStats {
            total_kegs_consumed: 4,
            total_litres: 76.0,
            total_filled: 9,
            total_returned: 4,
            monthly: vec![
                MonthlyCount {
                    month: "2024-03".into(),
                    kegs: 1,
                },
                MonthlyCount {
                    month: "2024-04".into(),
                    kegs: 2,
                },
                MonthlyCount {
                    month: "2024-05".into(),
                    kegs: 1,
                },
            ],
            popular_styles: vec![
                named("NEIPA", 2),
                named("Imperial Stout", 1),
                named("German Pils", 1),
            ],
        },
        event_count: Some(event_count),
    }
}
