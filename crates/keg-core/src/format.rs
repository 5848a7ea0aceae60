//! Card content shared by the grid and board views.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;

use crate::types::Keg;

const MS_PER_DAY: i64 = 86_400_000;

/// Placeholder shown on a keg without a batch.
pub const EMPTY_MESSAGE: &str = "No batch assigned";

/// Options for [`format_card`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CardOptions {
    /// Include the location line. The board hides it since the column
    /// already says where the keg is.
    pub show_location: bool,
}

impl Default for CardOptions {
    fn default() -> Self {
        Self {
            show_location: true,
        }
    }
}

/// Status badge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    /// Style class, `badge-<status>`.
    pub class: String,
    /// Human label.
    pub label: String,
}

/// Body of a keg card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CardBody {
    /// A batch is assigned.
    Assigned {
        /// `#N ` prefix plus display name.
        name: String,
        /// Style with an optional ` · N.N%` suffix.
        style: String,
        /// `Bottled <date> (<days>d)`.
        bottled: Option<String>,
        /// Location line.
        location: Option<String>,
        /// Batch notes preview.
        notes: Option<String>,
    },
    /// No batch.
    Empty {
        /// Placeholder text.
        message: String,
        /// Location line.
        location: Option<String>,
    },
}

/// Displayable fields of one keg.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CardContent {
    /// Keg label.
    pub label: String,
    /// Status badge.
    pub badge: Badge,
    /// Batch details or placeholder.
    pub body: CardBody,
}

impl CardContent {
    /// Body as plain lines, in display order.
    #[must_use]
    pub fn lines(&self) -> Vec<&str> {
        match &self.body {
            CardBody::Assigned {
                name,
                style,
                bottled,
                location,
                notes,
            } => [Some(name), Some(style), bottled.as_ref(), location.as_ref(), notes.as_ref()]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect(),
            CardBody::Empty { message, location } => [Some(message), location.as_ref()]
                .into_iter()
                .flatten()
                .map(String::as_str)
                .collect(),
        }
    }
}

/// Map a keg to its card content as of `now`.
#[must_use]
pub fn format_card(keg: &Keg, options: CardOptions, now: DateTime<Utc>) -> CardContent {
    let badge = Badge {
        class: keg.status.badge_class(),
        label: keg.status.label(),
    };
    let location = keg
        .location()
        .filter(|_| options.show_location)
        .map(sanitize);

    let body = match &keg.batch {
        Some(batch) => {
            let name = format!("{}{}", batch.number_prefix(), sanitize(batch.display_name()));
            let style = match batch.abv {
                Some(abv) => format!("{} · {abv:.1}%", sanitize(&batch.style)),
                None => sanitize(&batch.style),
            };
            let bottled = (!batch.bottling_date.is_empty()).then(|| {
                let date = sanitize(&batch.bottling_date);
                match days_since(&batch.bottling_date, now) {
                    Some(days) => format!("Bottled {date} ({days}d)"),
                    None => format!("Bottled {date}"),
                }
            });
            let notes = (!batch.batch_notes.is_empty()).then(|| sanitize(&batch.batch_notes));
            CardBody::Assigned {
                name,
                style,
                bottled,
                location,
                notes,
            }
        }
        None => CardBody::Empty {
            message: EMPTY_MESSAGE.to_string(),
            location,
        },
    };

    CardContent {
        label: sanitize(&keg.label),
        badge,
        body,
    }
}

/// Whole days elapsed since `date`, truncated toward negative infinity.
///
/// Accepts `YYYY-MM-DD` (midnight UTC), RFC 3339, or a naive
/// `YYYY-MM-DDTHH:MM:SS` taken as UTC. Returns `None` when unparseable.
#[must_use]
pub fn days_since(date: &str, now: DateTime<Utc>) -> Option<i64> {
    let date = date.trim();
    let then = if let Ok(day) = NaiveDate::parse_from_str(date, "%Y-%m-%d") {
        day.and_hms_opt(0, 0, 0)?.and_utc()
    } else if let Ok(ts) = DateTime::parse_from_rfc3339(date) {
        ts.with_timezone(&Utc)
    } else {
        NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%S%.f").ok()?.and_utc()
    };
    Some((now - then).num_milliseconds().div_euclid(MS_PER_DAY))
}

/// Neutralize terminal control characters in user-supplied text.
///
/// Every control character except newline and tab becomes U+FFFD, so text
/// drawn to a terminal cannot carry escape sequences.
#[must_use]
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() && c != '\n' && c != '\t' {
                char::REPLACEMENT_CHARACTER
            } else {
                c
            }
        })
        .collect()
}

/// Escape text for inclusion in HTML.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
