//! Wire types for the keg tracker API.
//!
//! Field names match the JSON served by the keg tracker backend. Text fields
//! the server stores as empty strings are kept as `String` and treated as
//! unset when empty.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Keg identifier.
pub type KegId = u64;

/// Fill status of a keg.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KegStatus {
    /// Nothing in it.
    #[default]
    Empty,
    /// Filled and waiting.
    Full,
    /// Currently being poured.
    OnTap,
}

impl KegStatus {
    /// All statuses in form order.
    pub const ALL: [Self; 3] = [Self::Empty, Self::Full, Self::OnTap];

    /// Wire representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Full => "full",
            Self::OnTap => "on_tap",
        }
    }

    /// Badge label: the wire name with its first underscore replaced by a space.
    #[must_use]
    pub fn label(self) -> String {
        self.as_str().replacen('_', " ", 1)
    }

    /// Badge style class.
    #[must_use]
    pub fn badge_class(self) -> String {
        format!("badge-{}", self.as_str())
    }

    /// Next status in form order, wrapping.
    #[must_use]
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous status in form order, wrapping.
    #[must_use]
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|s| *s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for KegStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for KegStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "empty" => Ok(Self::Empty),
            "full" => Ok(Self::Full),
            "on_tap" | "on tap" => Ok(Self::OnTap),
            other => Err(format!("unknown keg status: {other}")),
        }
    }
}

/// A brewed batch that can be assigned to a keg.
///
/// Also used for the denormalized `batch` snapshot embedded in a [`Keg`];
/// the snapshot omits the sync bookkeeping fields, which then default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Batch {
    /// Batch identifier from the brewing-data service.
    pub id: String,
    /// Sequential batch number.
    #[serde(default)]
    pub batch_no: Option<i64>,
    /// Batch name.
    #[serde(default)]
    pub name: String,
    /// Beer style.
    #[serde(default)]
    pub style: String,
    /// Alcohol by volume, percent.
    #[serde(default)]
    pub abv: Option<f64>,
    /// Brew date.
    #[serde(default)]
    pub brew_date: String,
    /// Status in the brewing-data service.
    #[serde(default)]
    pub status: String,
    /// Recipe name, preferred over `name` for display.
    #[serde(default)]
    pub recipe_name: String,
    /// Bottling date, `YYYY-MM-DD`.
    #[serde(default)]
    pub bottling_date: String,
    /// Free-form batch notes.
    #[serde(default)]
    pub batch_notes: String,
    /// Last sync time.
    #[serde(default)]
    pub last_synced: Option<String>,
}

impl Batch {
    /// Recipe name if set, otherwise the batch name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        if self.recipe_name.is_empty() {
            &self.name
        } else {
            &self.recipe_name
        }
    }

    /// `#N ` prefix for a present, non-zero batch number.
    #[must_use]
    pub fn number_prefix(&self) -> String {
        match self.batch_no {
            Some(n) if n != 0 => format!("#{n} "),
            _ => String::new(),
        }
    }
}

/// A physical keg.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Keg {
    /// Stable identifier.
    pub id: KegId,
    /// Display name.
    #[serde(default)]
    pub label: String,
    /// Fill status.
    #[serde(default)]
    pub status: KegStatus,
    /// Station name; empty means the default station.
    #[serde(default)]
    pub location: String,
    /// Assigned batch.
    #[serde(default)]
    pub batch_id: Option<String>,
    /// Purchase date.
    #[serde(default)]
    pub date_purchased: String,
    /// Keg notes.
    #[serde(default)]
    pub notes: String,
    /// Snapshot of the assigned batch.
    #[serde(default)]
    pub batch: Option<Batch>,
}

impl Keg {
    /// A keg without a batch is empty and may be deleted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.batch_id.is_none()
    }

    /// Location, or `None` when unset.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        (!self.location.is_empty()).then_some(self.location.as_str())
    }

    /// Whether the `batch` snapshot agrees with `batch_id`.
    #[must_use]
    pub fn batch_consistent(&self) -> bool {
        match (&self.batch_id, &self.batch) {
            (Some(id), Some(batch)) => *id == batch.id,
            (None, None) => true,
            _ => false,
        }
    }
}

/// Partial keg update sent with `PUT /api/kegs/{id}`.
///
/// Unset fields are omitted from the body. `clear_batch` is only emitted
/// when true.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KegUpdate {
    /// New label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<KegStatus>,
    /// New location; empty string moves to the default station.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Batch to assign.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub batch_id: Option<String>,
    /// New purchase date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_purchased: Option<String>,
    /// New notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Remove the batch assignment.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub clear_batch: bool,
}

impl KegUpdate {
    /// Update that only moves the keg.
    #[must_use]
    pub fn relocate(location: impl Into<String>) -> Self {
        Self {
            location: Some(location.into()),
            ..Self::default()
        }
    }

    /// Assign a batch, dropping any pending clear.
    #[must_use]
    pub fn with_batch(mut self, batch_id: impl Into<String>) -> Self {
        self.batch_id = Some(batch_id.into());
        self.clear_batch = false;
        self
    }

    /// Clear the batch, dropping any pending assignment.
    #[must_use]
    pub fn with_cleared_batch(mut self) -> Self {
        self.batch_id = None;
        self.clear_batch = true;
        self
    }

    /// Whether the update carries no changes.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        *self == Self::default()
    }
}

/// Result of `POST /api/batches/sync`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Number of batches pulled from the brewing-data service.
    pub synced: u64,
}

/// A named count (style or batch popularity).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedCount {
    /// Style or batch name.
    #[serde(default)]
    pub name: String,
    /// Occurrences.
    #[serde(default)]
    pub count: u64,
}

/// Kegs consumed in one month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyCount {
    /// `YYYY-MM`.
    #[serde(default)]
    pub month: String,
    /// Kegs returned that month.
    #[serde(default)]
    pub kegs: u64,
}

/// One completed keg assignment in a person's history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// Person the keg was assigned to.
    #[serde(default)]
    pub person: String,
    /// Batch name at the time.
    #[serde(default)]
    pub batch_name: String,
    /// Style at the time.
    #[serde(default)]
    pub style: String,
    /// Days between assignment and return.
    #[serde(default)]
    pub days: f64,
    /// Assignment time.
    #[serde(default)]
    pub assigned_at: String,
    /// Return time.
    #[serde(default)]
    pub returned_at: String,
}

/// Per-person aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersonStats {
    /// Person name.
    #[serde(default)]
    pub name: String,
    /// Kegs consumed.
    #[serde(default)]
    pub kegs_consumed: u64,
    /// Litres consumed.
    #[serde(default)]
    pub litres_consumed: f64,
    /// Average days per keg.
    #[serde(default)]
    pub avg_days_per_keg: f64,
    /// Consumption rate.
    #[serde(default)]
    pub litres_per_month: f64,
    /// Most consumed styles, ranked.
    #[serde(default)]
    pub top_styles: Vec<NamedCount>,
    /// Most consumed batches, ranked.
    #[serde(default)]
    pub top_batches: Vec<NamedCount>,
    /// Assignments, oldest first.
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

/// Brewery-wide aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallStats {
    /// Kegs consumed.
    #[serde(default)]
    pub total_kegs_consumed: u64,
    /// Litres consumed.
    #[serde(default)]
    pub total_litres: f64,
    /// Fill events.
    #[serde(default)]
    pub total_filled: u64,
    /// Return events.
    #[serde(default)]
    pub total_returned: u64,
    /// Consumption per month, oldest first.
    #[serde(default)]
    pub monthly: Vec<MonthlyCount>,
    /// Popular styles, most popular first.
    #[serde(default)]
    pub popular_styles: Vec<NamedCount>,
}

/// Payload of `GET /api/stats`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsPayload {
    /// Per-person aggregates.
    #[serde(default)]
    pub people: Vec<PersonStats>,
    /// Brewery-wide aggregate.
    #[serde(default)]
    pub overall: OverallStats,
    /// Number of recorded keg events; zero means nothing to show yet.
    /// Absent when the server does not report it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_count: Option<u64>,
}

/// A recorded keg event from `GET /api/stats/events`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KegEvent {
    /// Event identifier.
    pub id: u64,
    /// Keg the event belongs to.
    pub keg_id: KegId,
    /// `filled`, `assigned`, `tapped`, `returned` or `deleted`.
    pub event_type: String,
    /// Person involved, if any.
    #[serde(default)]
    pub person: String,
    /// Batch name at the time.
    #[serde(default)]
    pub batch_name: String,
    /// Style at the time.
    #[serde(default)]
    pub style: String,
    /// ISO-8601 timestamp.
    #[serde(default)]
    pub timestamp: String,
}

/// Brewery branding from `GET /api/settings/brewery`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreweryInfo {
    /// Brewery name.
    pub name: String,
    /// Logo location.
    #[serde(default)]
    pub logo_url: String,
}

/// Payload of `GET /health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    /// `ok` when the server is up.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use test_case::test_case;

    #[test_case(KegStatus::Empty, "empty", "badge-empty" ; "empty")]
    #[test_case(KegStatus::Full, "full", "badge-full" ; "full")]
    #[test_case(KegStatus::OnTap, "on tap", "badge-on_tap" ; "on tap")]
    fn status_badge(status: KegStatus, label: &str, class: &str) {
        assert_eq!(status.label(), label);
        assert_eq!(status.badge_class(), class);
    }

    #[test]
    fn status_cycles_both_ways() {
        assert_eq!(KegStatus::OnTap.next(), KegStatus::Empty);
        assert_eq!(KegStatus::Empty.prev(), KegStatus::OnTap);
        assert_eq!(KegStatus::Empty.next().prev(), KegStatus::Empty);
    }

    #[test]
    fn keg_deserializes_server_shape() {
        let keg: Keg = serde_json::from_value(json!({
            "id": 3,
            "label": "Keg #3",
            "status": "on_tap",
            "location": "Troy",
            "batch_id": "b1",
            "date_purchased": "",
            "notes": "",
            "batch": {
                "id": "b1",
                "batch_no": 12,
                "name": "Batch 12",
                "style": "IPA",
                "abv": 6.4,
                "recipe_name": "Hop Bomb",
                "bottling_date": "2024-05-01",
                "batch_notes": "dry hopped"
            }
        }))
        .unwrap();

        assert_eq!(keg.status, KegStatus::OnTap);
        assert_eq!(keg.location(), Some("Troy"));
        assert!(!keg.is_empty());
        assert!(keg.batch_consistent());
        assert_eq!(keg.batch.as_ref().unwrap().display_name(), "Hop Bomb");
    }

    #[test]
    fn inconsistent_snapshot_detected() {
        let keg = Keg {
            id: 1,
            batch_id: Some("b1".into()),
            batch: Some(Batch {
                id: "b2".into(),
                ..Batch::default()
            }),
            ..Keg::default()
        };
        assert!(!keg.batch_consistent());

        let dangling = Keg {
            id: 2,
            batch_id: Some("b1".into()),
            ..Keg::default()
        };
        assert!(!dangling.batch_consistent());
    }

    #[test_case(Some(7), "#7 " ; "numbered")]
    #[test_case(Some(0), "" ; "zero is hidden")]
    #[test_case(None, "" ; "absent")]
    fn batch_number_prefix(batch_no: Option<i64>, expected: &str) {
        let batch = Batch {
            id: "b".into(),
            batch_no,
            ..Batch::default()
        };
        assert_eq!(batch.number_prefix(), expected);
    }

    #[test]
    fn display_name_falls_back_to_name() {
        let batch = Batch {
            id: "b".into(),
            name: "Batch 4".into(),
            ..Batch::default()
        };
        assert_eq!(batch.display_name(), "Batch 4");
    }

    #[test]
    fn update_omits_unset_fields() {
        let body = serde_json::to_value(KegUpdate::relocate("")).unwrap();
        assert_eq!(body, json!({ "location": "" }));
    }

    #[test]
    fn update_clear_batch_excludes_batch_id() {
        let update = KegUpdate::default().with_batch("b1").with_cleared_batch();
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({ "clear_batch": true }));

        let update = KegUpdate::default().with_cleared_batch().with_batch("b1");
        let body = serde_json::to_value(&update).unwrap();
        assert_eq!(body, json!({ "batch_id": "b1" }));
    }

    #[test]
    fn stats_payload_tolerates_missing_fields() {
        let stats: StatsPayload = serde_json::from_value(json!({ "event_count": 0 })).unwrap();
        assert_eq!(stats.event_count, Some(0));
        assert!(stats.people.is_empty());
        assert!(stats.overall.popular_styles.is_empty());
    }

    #[test]
    fn stats_payload_without_event_count() {
        let stats: StatsPayload = serde_json::from_value(json!({ "people": [] })).unwrap();
        assert_eq!(stats.event_count, None);
    }
}
