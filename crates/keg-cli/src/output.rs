//! Output formatting for CLI commands.
//!
//! Supports table (human-readable) and JSON output for every command, and
//! HTML for the keg list.

use std::io::Write;

use keg_core::format::{CardBody, CardContent, escape_html};
use keg_core::views::board::BoardView;
use keg_core::views::grid::GridView;
use keg_core::views::modal::BatchOption;
use keg_core::views::stats::{StatsPanel, StatsView};
use keg_core::KegId;
use serde::Serialize;

use crate::cli::Format;
use crate::error::CliError;

/// Output formatter for all formats.
#[derive(Debug, Clone)]
pub struct OutputFormat {
    format: Format,
}

impl OutputFormat {
    /// Create a new output formatter.
    #[must_use]
    pub const fn new(format: Format) -> Self {
        Self { format }
    }

    /// Get the current format.
    #[must_use]
    pub const fn format(&self) -> Format {
        self.format
    }

    /// Check if JSON format is selected.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self.format, Format::Json)
    }

    /// Write a serializable value to the output.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails, or if the value
    /// has no HTML rendering.
    pub fn write<W, T>(&self, writer: &mut W, value: &T) -> Result<(), CliError>
    where
        W: Write,
        T: Serialize + TableDisplay,
    {
        match self.format {
            Format::Json => {
                serde_json::to_writer_pretty(&mut *writer, value)
                    .map_err(|e| CliError::Format(format!("JSON serialization failed: {e}")))?;
                writeln!(writer)?;
            }
            Format::Table => value.write_table(writer)?,
            Format::Html => value.write_html(writer)?,
        }
        Ok(())
    }

    /// Write a serializable value to a string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_string<T>(&self, value: &T) -> Result<String, CliError>
    where
        T: Serialize + TableDisplay,
    {
        let mut buf = Vec::new();
        self.write(&mut buf, value)?;
        String::from_utf8(buf).map_err(|e| CliError::Format(format!("UTF-8 error: {e}")))
    }
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::new(Format::Table)
    }
}

/// Trait for types that can be displayed as a table.
pub trait TableDisplay {
    /// Write the value as a human-readable table.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError>;

    /// Write the value as HTML. Only the keg list supports it.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails or HTML is unsupported.
    fn write_html<W: Write>(&self, _writer: &mut W) -> Result<(), CliError> {
        Err(CliError::InvalidArgument(
            "--format html is only supported by `list`".into(),
        ))
    }
}

fn write_card<W: Write>(writer: &mut W, id: KegId, card: &CardContent) -> Result<(), CliError> {
    writeln!(writer, "{:>3}  {}  [{}]", id, card.label, card.badge.label)?;
    for line in card.lines() {
        writeln!(writer, "       {line}")?;
    }
    Ok(())
}

impl TableDisplay for GridView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.cards.is_empty() {
            writeln!(writer, "No kegs")?;
            return Ok(());
        }
        for card in &self.cards {
            write_card(writer, card.keg_id, &card.content)?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} keg(s)", self.cards.len())?;
        Ok(())
    }

    fn write_html<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, r#"<div class="keg-grid">"#)?;
        for card in &self.cards {
            let content = &card.content;
            writeln!(writer, r#"  <div class="keg-card">"#)?;
            writeln!(writer, r#"    <div class="keg-card-body" data-keg-id="{}">"#, card.keg_id)?;
            writeln!(writer, r#"      <div class="keg-header">"#)?;
            writeln!(writer, r#"        <span class="keg-number">{}</span>"#, escape_html(&content.label))?;
            writeln!(
                writer,
                r#"        <span class="keg-status-badge {}">{}</span>"#,
                escape_html(&content.badge.class),
                escape_html(&content.badge.label)
            )?;
            writeln!(writer, "      </div>")?;
            write_html_body(writer, &content.body)?;
            writeln!(writer, "    </div>")?;
            writeln!(writer, r#"    <div class="keg-card-footer">"#)?;
            writeln!(
                writer,
                r#"      <button class="keg-reset-btn" data-reset-id="{}">{}</button>"#,
                card.keg_id, card.reset_label
            )?;
            writeln!(writer, "    </div>")?;
            writeln!(writer, "  </div>")?;
        }
        writeln!(writer, "</div>")?;
        Ok(())
    }
}

fn write_html_body<W: Write>(writer: &mut W, body: &CardBody) -> Result<(), CliError> {
    let div = |class: &str, text: &str| format!(r#"      <div class="{class}">{}</div>"#, escape_html(text));
    match body {
        CardBody::Assigned {
            name,
            style,
            bottled,
            location,
            notes,
        } => {
            writeln!(writer, "{}", div("keg-batch-name", name))?;
            writeln!(writer, "{}", div("keg-style", style))?;
            for line in [bottled, location].into_iter().flatten() {
                writeln!(writer, "{}", div("keg-detail", line))?;
            }
            if let Some(notes) = notes {
                writeln!(writer, "{}", div("keg-notes-preview", notes))?;
            }
        }
        CardBody::Empty { message, location } => {
            writeln!(writer, "{}", div("keg-empty-msg", message))?;
            if let Some(location) = location {
                writeln!(writer, "{}", div("keg-detail", location))?;
            }
        }
    }
    Ok(())
}

impl TableDisplay for BoardView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        for column in &self.columns {
            writeln!(writer, "{} ({})", column.name, column.count)?;
            writeln!(writer, "{}", "─".repeat(40))?;
            for card in &column.cards {
                write_card(writer, card.keg_id, &card.content)?;
            }
            writeln!(writer)?;
        }
        if !self.unplaced.is_empty() {
            writeln!(writer, "Elsewhere ({})", self.unplaced.len())?;
            writeln!(writer, "{}", "─".repeat(40))?;
            for card in &self.unplaced {
                write_card(writer, card.keg_id, &card.content)?;
            }
        }
        Ok(())
    }
}

impl TableDisplay for StatsPanel {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        match self {
            Self::Loaded(view) => view.write_table(writer),
            other => {
                writeln!(writer, "{}", other.message().unwrap_or_default())?;
                Ok(())
            }
        }
    }
}

impl TableDisplay for StatsView {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Keg Stats")?;
        writeln!(writer, "══════════════════════════════════")?;
        for counter in &self.summary {
            let unit = counter.unit.map(|u| format!(" {u}")).unwrap_or_default();
            writeln!(writer, "  {:<16}{}{unit}", format!("{}:", counter.label), counter.value)?;
        }

        if let Some(empty) = &self.empty {
            writeln!(writer)?;
            writeln!(writer, "{}", empty.message)?;
            writeln!(writer, "{}", empty.hint)?;
        }

        if !self.styles.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Popular Styles")?;
            for bar in &self.styles {
                writeln!(
                    writer,
                    "  {:<20} {:<20} {}",
                    truncate(&bar.label, 20),
                    bar_cells(bar.percent, 20),
                    bar.count
                )?;
            }
        }

        if !self.monthly.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Monthly Consumption")?;
            for month in &self.monthly {
                writeln!(
                    writer,
                    "  {:<8} {:<20} {}",
                    month.label,
                    bar_cells(month.percent, 20),
                    month.kegs
                )?;
            }
        }

        for person in &self.people {
            writeln!(writer)?;
            writeln!(writer, "[{}] {}", person.initial, person.name)?;
            let counters: Vec<String> = person
                .counters
                .iter()
                .map(|c| format!("{} {}{}", c.label, c.value, c.unit.unwrap_or_default()))
                .collect();
            writeln!(writer, "  {}", counters.join("  ·  "))?;
            writeln!(writer, "  Top style: {}", person.top_style)?;
            writeln!(writer, "  Top batch: {}", person.top_batch)?;
            for row in &person.recent {
                writeln!(writer, "    {:<24} {}", truncate(&row.batch, 24), row.days)?;
            }
        }

        if !self.recent_events.is_empty() {
            writeln!(writer)?;
            writeln!(writer, "Recent Activity")?;
            for event in &self.recent_events {
                writeln!(writer, "  {}  {}", event.when, event.text)?;
            }
        }
        Ok(())
    }
}

fn bar_cells(percent: u32, width: usize) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    "█".repeat(filled)
}

/// Recent activity.
#[derive(Debug, Clone, Serialize)]
pub struct EventList {
    /// Events, newest first.
    pub events: Vec<keg_core::views::stats::EventRow>,
}

impl TableDisplay for EventList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.events.is_empty() {
            writeln!(writer, "No activity yet")?;
            return Ok(());
        }
        writeln!(writer, "{:<16}  {}", "WHEN", "EVENT")?;
        writeln!(writer, "{}", "─".repeat(60))?;
        for event in &self.events {
            writeln!(writer, "{:<16}  {}", event.when, event.text)?;
        }
        Ok(())
    }
}

/// Batch listing.
#[derive(Debug, Clone, Serialize)]
pub struct BatchList {
    /// Batches as offered in the edit form, without the "no batch" entry.
    pub batches: Vec<BatchOption>,
}

impl TableDisplay for BatchList {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.batches.is_empty() {
            writeln!(writer, "No batches; run `keg sync` first")?;
            return Ok(());
        }
        writeln!(writer, "{:<24}  {}", "ID", "BATCH")?;
        writeln!(writer, "{}", "─".repeat(60))?;
        for batch in &self.batches {
            writeln!(
                writer,
                "{:<24}  {}",
                truncate(batch.id.as_deref().unwrap_or_default(), 24),
                batch.label
            )?;
        }
        writeln!(writer)?;
        writeln!(writer, "Total: {} batch(es)", self.batches.len())?;
        Ok(())
    }
}

/// Server and tracker summary.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    /// Server address.
    pub server: String,
    /// Health status.
    pub health: String,
    /// Brewery name.
    pub brewery: String,
    /// Kegs tracked.
    pub kegs: usize,
    /// Kegs with a batch.
    pub filled: usize,
    /// Batches known.
    pub batches: usize,
}

impl TableDisplay for StatusReport {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        writeln!(writer, "Keg Tracker Status")?;
        writeln!(writer, "══════════════════════════════════")?;
        writeln!(writer, "Server:           {}", self.server)?;
        writeln!(writer, "Health:           {}", self.health)?;
        writeln!(writer, "Brewery:          {}", self.brewery)?;
        writeln!(writer)?;
        writeln!(writer, "Kegs")?;
        writeln!(writer, "  Total:          {}", self.kegs)?;
        writeln!(writer, "  Filled:         {}", self.filled)?;
        writeln!(writer, "  Empty:          {}", self.kegs - self.filled)?;
        writeln!(writer)?;
        writeln!(writer, "Batches:          {}", self.batches)?;
        Ok(())
    }
}

/// Simple message output.
#[derive(Debug, Clone, Serialize)]
pub struct Message {
    /// Message text.
    pub message: String,
    /// Whether this is a success message.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub success: bool,
}

impl Message {
    /// Create a success message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: true,
        }
    }

    /// Create an informational message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            success: false,
        }
    }
}

impl TableDisplay for Message {
    fn write_table<W: Write>(&self, writer: &mut W) -> Result<(), CliError> {
        if self.success {
            writeln!(writer, "✓ {}", self.message)?;
        } else {
            writeln!(writer, "{}", self.message)?;
        }
        Ok(())
    }
}

/// Truncate a string to at most `max_len` characters.
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len > 3 {
        let head: String = s.chars().take(max_len - 3).collect();
        format!("{head}...")
    } else {
        s.chars().take(max_len).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use keg_core::views::grid::render_grid;
    use keg_core::{Keg, Store};

    fn grid() -> GridView {
        let mut store = Store::new();
        store.replace_kegs(vec![Keg {
            id: 1,
            label: "<Keg #1>".into(),
            location: "Troy & Co".into(),
            ..Keg::default()
        }]);
        render_grid(&store, Utc::now())
    }

    #[test]
    fn output_format_default_is_table() {
        assert_eq!(OutputFormat::default().format(), Format::Table);
        assert!(!OutputFormat::default().is_json());
    }

    #[test]
    fn grid_table_lists_cards() {
        let output = OutputFormat::new(Format::Table).to_string(&grid()).unwrap();
        assert!(output.contains("<Keg #1>  [empty]"));
        assert!(output.contains("No batch assigned"));
        assert!(output.contains("Total: 1 keg(s)"));
    }

    #[test]
    fn grid_html_escapes_user_text() {
        let output = OutputFormat::new(Format::Html).to_string(&grid()).unwrap();
        assert!(output.contains("&lt;Keg #1&gt;"));
        assert!(output.contains("Troy &amp; Co"));
        assert!(output.contains(r#"class="keg-status-badge badge-empty""#));
        assert!(output.contains("Reset Keg"));
        assert!(!output.contains("<Keg #1>"));
    }

    #[test]
    fn html_only_for_grid() {
        let err = OutputFormat::new(Format::Html)
            .to_string(&Message::info("hi"))
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument(_)));
    }

    #[test]
    fn json_output_parses() {
        let output = OutputFormat::new(Format::Json).to_string(&grid()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["cards"][0]["keg_id"], 1);
        assert_eq!(parsed["cards"][0]["content"]["body"]["kind"], "empty");
    }

    #[test]
    fn stats_failure_prints_message() {
        let output = OutputFormat::new(Format::Table)
            .to_string(&StatsPanel::Failed)
            .unwrap();
        assert_eq!(output, "Failed to load stats\n");
    }

    #[test]
    fn message_success() {
        let output = OutputFormat::new(Format::Table)
            .to_string(&Message::success("Created Keg #17"))
            .unwrap();
        assert_eq!(output, "✓ Created Keg #17\n");
    }

    #[test]
    fn bars_scale_to_width() {
        assert_eq!(bar_cells(100, 20).chars().count(), 20);
        assert_eq!(bar_cells(50, 20).chars().count(), 10);
        assert_eq!(bar_cells(0, 20), "");
    }

    #[test]
    fn truncate_counts_chars() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
        assert_eq!(truncate("Kölsch Kölsch", 9), "Kölsch...");
        assert_eq!(truncate("hello", 3), "hel");
    }
}
