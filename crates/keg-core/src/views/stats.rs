//! Stats view: counters, bar charts and per-person cards.

use serde::Serialize;
use tracing::{error, warn};

use crate::api::KegApi;
use crate::format::sanitize;
use crate::types::{KegEvent, NamedCount, PersonStats, StatsPayload};

/// Shown while the payload is requested.
pub const LOADING_MESSAGE: &str = "Loading stats…";

/// Shown when the payload could not be loaded.
pub const FAILED_MESSAGE: &str = "Failed to load stats";

/// Empty-state headline.
pub const EMPTY_MESSAGE: &str = "No usage data yet";

/// Empty-state hint.
pub const EMPTY_HINT: &str = "Stats will appear here as kegs are assigned and returned.";

/// Fallback for a missing top style or batch.
pub const NONE_PLACEHOLDER: &str = "—";

const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A labelled number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Counter {
    /// Caption.
    pub label: &'static str,
    /// Formatted value.
    pub value: String,
    /// Unit suffix.
    pub unit: Option<&'static str>,
}

impl Counter {
    fn new(label: &'static str, value: impl ToString, unit: Option<&'static str>) -> Self {
        Self {
            label,
            value: value.to_string(),
            unit,
        }
    }
}

/// Horizontal bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Bar {
    /// Style name.
    pub label: String,
    /// Raw count.
    pub count: u64,
    /// Width relative to the top entry, 0–100.
    pub percent: u32,
}

/// Vertical monthly bar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthBar {
    /// `Mon 'YY`.
    pub label: String,
    /// Kegs that month.
    pub kegs: u64,
    /// Height relative to the busiest month, 0–100.
    pub percent: u32,
}

/// One row of a person's recent history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HistoryRow {
    /// Batch name, `Unknown` when missing.
    pub batch: String,
    /// Duration, `<days>d`.
    pub days: String,
}

/// Per-person card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersonCard {
    /// Person name.
    pub name: String,
    /// Avatar letter.
    pub initial: String,
    /// Kegs, litres, litres per month, average days.
    pub counters: Vec<Counter>,
    /// Favourite style.
    pub top_style: String,
    /// Most consumed batch.
    pub top_batch: String,
    /// History, newest first.
    pub recent: Vec<HistoryRow>,
}

/// A line of the recent activity list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventRow {
    /// `YYYY-MM-DD HH:MM`.
    pub when: String,
    /// What happened.
    pub text: String,
}

/// Empty-state notice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyState {
    /// Headline.
    pub message: &'static str,
    /// Hint.
    pub hint: &'static str,
}

/// Rendered stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsView {
    /// Kegs consumed, total litres, kegs filled, kegs returned.
    pub summary: Vec<Counter>,
    /// Popular styles chart; empty hides the section.
    pub styles: Vec<Bar>,
    /// Monthly consumption chart; empty hides the section.
    pub monthly: Vec<MonthBar>,
    /// Per-person cards; empty hides the section.
    pub people: Vec<PersonCard>,
    /// Recent keg events, newest first.
    pub recent_events: Vec<EventRow>,
    /// Present when no events were recorded at all.
    pub empty: Option<EmptyState>,
}

/// State of the stats view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum StatsPanel {
    /// Request in flight.
    #[default]
    Loading,
    /// Payload rendered.
    Loaded(StatsView),
    /// Request failed; the cause was logged.
    Failed,
}

impl StatsPanel {
    /// Message for the loading and failed states.
    #[must_use]
    pub const fn message(&self) -> Option<&'static str> {
        match self {
            Self::Loading => Some(LOADING_MESSAGE),
            Self::Loaded(_) => None,
            Self::Failed => Some(FAILED_MESSAGE),
        }
    }
}

/// Request the stats payload and recent events and render them.
///
/// Never fails: a stats failure is logged and yields
/// [`StatsPanel::Failed`]; an events failure is logged and leaves the
/// activity list empty.
pub async fn load_stats<A: KegApi>(api: &A) -> StatsPanel {
    let payload = match api.stats().await {
        Ok(payload) => payload,
        Err(err) => {
            error!(error = %err, "Failed to load stats");
            return StatsPanel::Failed;
        }
    };
    let events = api.recent_events().await.unwrap_or_else(|err| {
        warn!(error = %err, "Failed to load recent events");
        Vec::new()
    });
    StatsPanel::Loaded(render_stats(&payload, &events))
}

/// Render a stats payload.
#[must_use]
pub fn render_stats(payload: &StatsPayload, events: &[KegEvent]) -> StatsView {
    let overall = &payload.overall;
    let summary = vec![
        Counter::new("Kegs Consumed", overall.total_kegs_consumed, None),
        Counter::new("Total Litres", overall.total_litres, Some("L")),
        Counter::new("Kegs Filled", overall.total_filled, None),
        Counter::new("Kegs Returned", overall.total_returned, None),
    ];

    let top = overall.popular_styles.first().map_or(0, |s| s.count);
    let styles = overall
        .popular_styles
        .iter()
        .map(|s| Bar {
            label: sanitize(&s.name),
            count: s.count,
            percent: scale(s.count, top),
        })
        .collect();

    let busiest = overall.monthly.iter().map(|m| m.kegs).max().unwrap_or(0);
    let monthly = overall
        .monthly
        .iter()
        .map(|m| MonthBar {
            label: format_month(&m.month),
            kegs: m.kegs,
            percent: scale(m.kegs, busiest),
        })
        .collect();

    StatsView {
        summary,
        styles,
        monthly,
        people: payload.people.iter().map(person_card).collect(),
        recent_events: events.iter().map(EventRow::from).collect(),
        empty: (payload.event_count == Some(0)).then_some(EmptyState {
            message: EMPTY_MESSAGE,
            hint: EMPTY_HINT,
        }),
    }
}

fn person_card(person: &PersonStats) -> PersonCard {
    let first_name = |ranked: &[NamedCount]| {
        ranked
            .first()
            .map_or_else(|| NONE_PLACEHOLDER.to_string(), |n| sanitize(&n.name))
    };
    PersonCard {
        name: sanitize(&person.name),
        initial: person.name.chars().next().map(String::from).unwrap_or_default(),
        counters: vec![
            Counter::new("Kegs", person.kegs_consumed, None),
            Counter::new("Litres", person.litres_consumed, Some("L")),
            Counter::new("Per Month", person.litres_per_month, Some("L")),
            Counter::new("Avg per Keg", person.avg_days_per_keg, Some("d")),
        ],
        top_style: first_name(&person.top_styles),
        top_batch: first_name(&person.top_batches),
        recent: person
            .history
            .iter()
            .rev()
            .map(|h| HistoryRow {
                batch: if h.batch_name.is_empty() {
                    "Unknown".to_string()
                } else {
                    sanitize(&h.batch_name)
                },
                days: format!("{}d", h.days),
            })
            .collect(),
    }
}

impl From<&KegEvent> for EventRow {
    fn from(event: &KegEvent) -> Self {
        let mut text = format!("Keg {} {}", event.keg_id, sanitize(&event.event_type));
        if !event.person.is_empty() {
            text.push_str(&format!(" · {}", sanitize(&event.person)));
        }
        if !event.batch_name.is_empty() {
            text.push_str(&format!(" · {}", sanitize(&event.batch_name)));
        }
        let when = event.timestamp.replacen('T', " ", 1).chars().take(16).collect();
        Self { when, text }
    }
}

/// Percentage of `value` relative to `max`, rounded. Zero when `max` is zero.
#[must_use]
pub fn scale(value: u64, max: u64) -> u32 {
    if max == 0 {
        return 0;
    }
    ((value as f64 / max as f64) * 100.0).round() as u32
}

/// `YYYY-MM` → `Mon 'YY`. Unrecognized input is returned unchanged.
#[must_use]
pub fn format_month(month: &str) -> String {
    let Some((year, mon)) = month.split_once('-') else {
        return month.to_string();
    };
    let name = mon
        .parse::<usize>()
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|idx| MONTHS.get(idx));
    match (name, year.get(2..)) {
        (Some(name), Some(yy)) if year.len() == 4 => format!("{name} '{yy}"),
        _ => month.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryBackend;
    use crate::error::KegError;
    use crate::types::{HistoryEntry, MonthlyCount, OverallStats};
    use proptest::prelude::*;
    use test_case::test_case;

    fn named(name: &str, count: u64) -> NamedCount {
        NamedCount {
            name: name.into(),
            count,
        }
    }

    fn payload() -> StatsPayload {
        StatsPayload {
            people: vec![PersonStats {
                name: "Troy".into(),
                kegs_consumed: 2,
                litres_consumed: 38.0,
                avg_days_per_keg: 12.5,
                litres_per_month: 45.6,
                top_styles: vec![named("IPA", 2)],
                top_batches: vec![],
                history: vec![
                    HistoryEntry {
                        batch_name: "Hop Bomb".into(),
                        days: 10.0,
                        ..HistoryEntry::default()
                    },
                    HistoryEntry {
                        batch_name: String::new(),
                        days: 15.0,
                        ..HistoryEntry::default()
                    },
                ],
            }],
            overall: OverallStats {
                total_kegs_consumed: 2,
                total_litres: 38.0,
                total_filled: 3,
                total_returned: 2,
                monthly: vec![
                    MonthlyCount {
                        month: "2024-03".into(),
                        kegs: 1,
                    },
                    MonthlyCount {
                        month: "2024-04".into(),
                        kegs: 4,
                    },
                ],
                popular_styles: vec![named("IPA", 8), named("Stout", 4)],
            },
            event_count: Some(9),
        }
    }

    #[test]
    fn style_bars_scale_to_top_entry() {
        let view = render_stats(&payload(), &[]);
        let widths: Vec<u32> = view.styles.iter().map(|b| b.percent).collect();
        assert_eq!(widths, vec![100, 50]);
    }

    #[test]
    fn monthly_bars_scale_to_busiest_month() {
        let view = render_stats(&payload(), &[]);
        assert_eq!(view.monthly[0].label, "Mar '24");
        assert_eq!(view.monthly[0].percent, 25);
        assert_eq!(view.monthly[1].percent, 100);
    }

    #[test]
    fn summary_counters_in_order() {
        let view = render_stats(&payload(), &[]);
        let labels: Vec<&str> = view.summary.iter().map(|c| c.label).collect();
        assert_eq!(labels, ["Kegs Consumed", "Total Litres", "Kegs Filled", "Kegs Returned"]);
        assert_eq!(view.summary[1].value, "38");
        assert_eq!(view.summary[1].unit, Some("L"));
        assert!(view.empty.is_none());
    }

    #[test]
    fn person_card_history_is_newest_first() {
        let view = render_stats(&payload(), &[]);
        let card = &view.people[0];

        assert_eq!(card.initial, "T");
        assert_eq!(card.top_style, "IPA");
        assert_eq!(card.top_batch, "—");
        assert_eq!(card.counters[2].value, "45.6");
        assert_eq!(card.counters[3].value, "12.5");
        assert_eq!(
            card.recent,
            vec![
                HistoryRow {
                    batch: "Unknown".into(),
                    days: "15d".into()
                },
                HistoryRow {
                    batch: "Hop Bomb".into(),
                    days: "10d".into()
                },
            ]
        );
    }

    #[test]
    fn zero_events_shows_empty_state_even_with_data() {
        let mut payload = payload();
        payload.event_count = Some(0);
        let view = render_stats(&payload, &[]);

        let empty = view.empty.unwrap();
        assert_eq!(empty.message, "No usage data yet");
        assert!(!view.styles.is_empty());
    }

    #[test]
    fn missing_event_count_is_not_empty() {
        let mut payload = payload();
        payload.event_count = None;
        assert!(render_stats(&payload, &[]).empty.is_none());
    }

    #[test]
    fn event_rows() {
        let event = KegEvent {
            id: 1,
            keg_id: 4,
            event_type: "assigned".into(),
            person: "Brent".into(),
            batch_name: "Hop Bomb".into(),
            style: "IPA".into(),
            timestamp: "2024-05-01T18:22:05.123".into(),
        };
        let view = render_stats(&StatsPayload::default(), &[event]);
        assert_eq!(view.recent_events[0].when, "2024-05-01 18:22");
        assert_eq!(view.recent_events[0].text, "Keg 4 assigned · Brent · Hop Bomb");
    }

    #[test_case("2024-01", "Jan '24" ; "january")]
    #[test_case("1999-12", "Dec '99" ; "december")]
    #[test_case("2024-13", "2024-13" ; "bad month")]
    #[test_case("24-01", "24-01" ; "short year")]
    #[test_case("garbage", "garbage" ; "no dash")]
    fn month_labels(input: &str, expected: &str) {
        assert_eq!(format_month(input), expected);
    }

    #[test]
    fn scale_handles_zero_max() {
        assert_eq!(scale(0, 0), 0);
        assert_eq!(scale(1, 3), 33);
        assert_eq!(scale(2, 3), 67);
    }

    #[tokio::test]
    async fn load_failure_degrades_to_failed_panel() {
        let api = MemoryBackend::demo();
        api.fail_next(KegError::Transport("connection refused".into()));

        let panel = load_stats(&api).await;

        assert_eq!(panel, StatsPanel::Failed);
        assert_eq!(panel.message(), Some("Failed to load stats"));
    }

    #[tokio::test]
    async fn load_success_renders_payload() {
        let api = MemoryBackend::demo().with_stats(payload());
        let panel = load_stats(&api).await;
        match panel {
            StatsPanel::Loaded(view) => assert_eq!(view.people.len(), 1),
            other => panic!("expected loaded panel, got {other:?}"),
        }
    }

    proptest! {
        #[test]
        fn bars_never_exceed_full_width(counts in prop::collection::vec(1u64..1000, 1..10)) {
            let mut counts = counts;
            counts.sort_unstable_by(|a, b| b.cmp(a));
            let payload = StatsPayload {
                overall: OverallStats {
                    popular_styles: counts.iter().map(|&c| named("S", c)).collect(),
                    ..OverallStats::default()
                },
                ..StatsPayload::default()
            };
            let view = render_stats(&payload, &[]);
            prop_assert_eq!(view.styles[0].percent, 100);
            prop_assert!(view.styles.iter().all(|b| b.percent <= 100));
        }
    }
}
