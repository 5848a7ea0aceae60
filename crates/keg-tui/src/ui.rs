//! UI rendering for the keg tracker TUI

use std::time::Instant;

use chrono::Utc;
use keg_core::format::{CardBody, CardContent};
use keg_core::sync::{FAILED_LABEL, IDLE_LABEL};
use keg_core::views::grid::render_grid;
use keg_core::views::modal::FormField;
use keg_core::views::stats::{Bar, Counter, EventRow, MonthBar, PersonCard, StatsView};
use keg_core::views::{StatsPanel, View};
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Tabs, Wrap},
};

use crate::app::{App, Editor};

const CARD_WIDTH: u16 = 34;
const CARD_HEIGHT: u16 = 9;
const DEFAULT_TITLE: &str = "Keg Tracker";

/// Main UI rendering function
pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Main content
            Constraint::Length(3), // Footer
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    match app.view() {
        View::Grid => draw_grid(frame, app, chunks[1]),
        View::Board => draw_board(frame, app, chunks[1]),
        View::Stats => draw_stats(frame, app, chunks[1]),
    }
    draw_footer(frame, app, chunks[2]);

    if let Some(editor) = &app.editor {
        draw_editor(frame, editor);
    }
    if let Some(confirmation) = &app.confirmation {
        draw_dialog(frame, " Confirm ", &confirmation.prompt, "[y] Yes  [n] No", Color::Yellow);
    }
    if let Some(alert) = &app.alert {
        draw_dialog(frame, " Error ", alert, "Press any key", Color::Red);
    }
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let label = app.sync.label_at(Instant::now());
    let sync_width = label.chars().count() as u16 + 6;
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(0), Constraint::Length(sync_width)])
        .split(area);

    let title = format!(" 🍺 {} ", app.brewery.as_deref().unwrap_or(DEFAULT_TITLE));
    let tabs = Tabs::new(View::ALL.iter().map(|v| v.title()))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .title_style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
        )
        .select(app.view().index())
        .style(Style::default().fg(Color::White))
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD));
    frame.render_widget(tabs, chunks[0]);

    let sync_style = if label == FAILED_LABEL {
        Style::default().fg(Color::Red)
    } else if label == IDLE_LABEL {
        Style::default().fg(Color::Green)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let sync = Paragraph::new(Line::from(vec![
        Span::styled("[s] ", Style::default().fg(Color::DarkGray)),
        Span::styled(label, sync_style),
    ]))
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(sync, chunks[1]);
}

fn draw_grid(frame: &mut Frame, app: &App, area: Rect) {
    let grid = render_grid(&app.store, Utc::now());
    if grid.cards.is_empty() {
        let message = if app.loaded {
            "No kegs yet. Press [a] to add one."
        } else {
            "Loading kegs…"
        };
        draw_placeholder(frame, message, area);
        return;
    }

    let per_row = usize::from((area.width / CARD_WIDTH).max(1));
    let rows = usize::from((area.height / CARD_HEIGHT).max(1));
    let selected = grid
        .cards
        .iter()
        .position(|c| Some(c.keg_id) == app.selected)
        .unwrap_or(0);
    let first = (selected / per_row).saturating_sub(rows - 1) * per_row;

    for (slot, card) in grid.cards.iter().skip(first).take(per_row * rows).enumerate() {
        let rect = Rect::new(
            area.x + (slot % per_row) as u16 * CARD_WIDTH,
            area.y + (slot / per_row) as u16 * CARD_HEIGHT,
            CARD_WIDTH,
            CARD_HEIGHT,
        )
        .intersection(area);
        let is_selected = Some(card.keg_id) == app.selected;
        let footer = is_selected.then(|| format!("[r] {}", card.reset_label));
        draw_card(frame, &card.content, footer, is_selected, rect);
    }
}

fn draw_card(frame: &mut Frame, content: &CardContent, footer: Option<String>, selected: bool, area: Rect) {
    let border = if selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut lines = vec![Line::from(Span::styled(
        content.badge.label.clone(),
        badge_style(&content.badge.class),
    ))];
    let empty = matches!(content.body, CardBody::Empty { .. });
    for (idx, text) in content.lines().into_iter().enumerate() {
        let style = match (empty, idx) {
            (true, 0) => Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
            (false, 0) => Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
            _ => Style::default().fg(Color::Gray),
        };
        lines.push(Line::from(Span::styled(text.to_string(), style)));
    }
    if let Some(footer) = footer {
        lines.push(Line::from(Span::styled(footer, Style::default().fg(Color::Red))));
    }

    let card = Paragraph::new(lines).wrap(Wrap { trim: true }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(format!(" {} ", content.label)),
    );
    frame.render_widget(card, area);
}

fn badge_style(class: &str) -> Style {
    let color = match class.strip_prefix("badge-") {
        Some("full") => Color::Green,
        Some("on_tap") => Color::Yellow,
        _ => Color::DarkGray,
    };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}

fn draw_board(frame: &mut Frame, app: &App, area: Rect) {
    let board = app.board();
    let count = board.column_count();
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints(vec![Constraint::Ratio(1, count.max(1) as u32); count])
        .split(area);

    for (idx, column) in board.columns.iter().enumerate() {
        let target = app.drag.over() == Some(idx);
        let (border, title_style) = if target {
            let style = Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD);
            (style, style)
        } else if app.column == idx {
            (Style::default().fg(Color::Yellow), Style::default().fg(Color::Yellow))
        } else {
            (Style::default().fg(Color::DarkGray), Style::default().fg(Color::White))
        };
        let title = if target {
            format!(" ⇣ {} ({}) ", column.name, column.count)
        } else {
            format!(" {} ({}) ", column.name, column.count)
        };
        let items = column
            .cards
            .iter()
            .map(|card| board_item(app, card.keg_id, &card.content))
            .collect::<Vec<_>>();
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(Span::styled(title, title_style)),
        );
        frame.render_widget(list, chunks[idx]);
    }

    if !board.unplaced.is_empty() {
        let items = board
            .unplaced
            .iter()
            .map(|card| board_item(app, card.keg_id, &card.content))
            .collect::<Vec<_>>();
        let border = if app.column == board.columns.len() {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let list = List::new(items).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border)
                .title(format!(" Elsewhere ({}) ", board.unplaced.len())),
        );
        frame.render_widget(list, chunks[board.columns.len()]);
    }
}

fn board_item<'a>(app: &App, keg_id: keg_core::KegId, content: &'a CardContent) -> ListItem<'a> {
    let (marker, label_style) = if app.drag.dragging() == Some(keg_id) {
        ("⇢ ", Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD))
    } else if app.selected == Some(keg_id) {
        ("▸ ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
    } else {
        ("  ", Style::default().fg(Color::White))
    };

    let mut lines = vec![Line::from(vec![
        Span::styled(marker, label_style),
        Span::styled(content.label.as_str(), label_style),
        Span::raw(" "),
        Span::styled(content.badge.label.as_str(), badge_style(&content.badge.class)),
    ])];
    if let Some(first) = content.lines().first() {
        lines.push(Line::from(Span::styled(
            format!("  {first}"),
            Style::default().fg(Color::Gray),
        )));
    }
    ListItem::new(lines)
}

fn draw_stats(frame: &mut Frame, app: &App, area: Rect) {
    match &app.stats {
        StatsPanel::Loaded(view) => draw_stats_view(frame, view, area),
        panel => draw_placeholder(frame, panel.message().unwrap_or_default(), area),
    }
}

fn draw_stats_view(frame: &mut Frame, view: &StatsView, area: Rect) {
    let empty_height = if view.empty.is_some() { 4 } else { 0 };
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(empty_height),
            Constraint::Min(0),
        ])
        .split(area);

    let summary = Paragraph::new(Line::from(
        view.summary
            .iter()
            .flat_map(|c| {
                [
                    Span::styled(format!("  {}: ", c.label), Style::default().fg(Color::DarkGray)),
                    Span::styled(counter_value(c), Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)),
                ]
            })
            .collect::<Vec<_>>(),
    ))
    .block(Block::default().borders(Borders::ALL).title(" Summary "));
    frame.render_widget(summary, rows[0]);

    if let Some(empty) = &view.empty {
        let notice = Paragraph::new(vec![
            Line::from(Span::styled(empty.message, Style::default().add_modifier(Modifier::BOLD))),
            Line::from(Span::styled(empty.hint, Style::default().fg(Color::DarkGray))),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
        frame.render_widget(notice, rows[1]);
    }

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[2]);
    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(columns[0]);
    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(columns[1]);

    if !view.styles.is_empty() {
        draw_bars(frame, " Popular Styles ", &style_bars(&view.styles), left[0]);
    }
    if !view.monthly.is_empty() {
        draw_bars(frame, " Monthly Consumption ", &month_bars(&view.monthly), left[1]);
    }
    if !view.people.is_empty() {
        draw_people(frame, &view.people, right[0]);
    }
    draw_events(frame, &view.recent_events, right[1]);
}

fn counter_value(counter: &Counter) -> String {
    match counter.unit {
        Some(unit) => format!("{} {unit}", counter.value),
        None => counter.value.clone(),
    }
}

fn style_bars(bars: &[Bar]) -> Vec<(String, u32, String)> {
    bars.iter()
        .map(|b| (b.label.clone(), b.percent, b.count.to_string()))
        .collect()
}

fn month_bars(bars: &[MonthBar]) -> Vec<(String, u32, String)> {
    bars.iter()
        .map(|b| (b.label.clone(), b.percent, b.kegs.to_string()))
        .collect()
}

fn draw_bars(frame: &mut Frame, title: &str, bars: &[(String, u32, String)], area: Rect) {
    let label_width = 14;
    let track = usize::from(area.width.saturating_sub(label_width as u16 + 10));
    let lines: Vec<Line> = bars
        .iter()
        .map(|(label, percent, value)| {
            let filled = track * (*percent as usize) / 100;
            let label: String = label.chars().take(label_width).collect();
            Line::from(vec![
                Span::raw(format!(" {label:<label_width$} ")),
                Span::styled("█".repeat(filled), Style::default().fg(Color::Yellow)),
                Span::styled(format!(" {value}"), Style::default().fg(Color::DarkGray)),
            ])
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(title)
            .title_style(Style::default().fg(Color::Magenta)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_people(frame: &mut Frame, people: &[PersonCard], area: Rect) {
    let mut lines = Vec::new();
    for person in people {
        lines.push(Line::from(vec![
            Span::styled(
                format!(" {} ", person.initial),
                Style::default().fg(Color::Black).bg(Color::Cyan),
            ),
            Span::styled(format!(" {}", person.name), Style::default().add_modifier(Modifier::BOLD)),
        ]));
        let counters = person
            .counters
            .iter()
            .map(|c| format!("{}: {}", c.label, counter_value(c)))
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(Line::from(format!("   {counters}")));
        lines.push(Line::from(Span::styled(
            format!("   Top style: {} · Top batch: {}", person.top_style, person.top_batch),
            Style::default().fg(Color::Gray),
        )));
        for row in &person.recent {
            lines.push(Line::from(Span::styled(
                format!("     {} ({})", row.batch, row.days),
                Style::default().fg(Color::DarkGray),
            )));
        }
        lines.push(Line::default());
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" People ")
            .title_style(Style::default().fg(Color::Green)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_events(frame: &mut Frame, events: &[EventRow], area: Rect) {
    let items: Vec<ListItem> = events
        .iter()
        .take(usize::from(area.height.saturating_sub(2)))
        .map(|event| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", event.when), Style::default().fg(Color::DarkGray)),
                Span::styled(event.text.as_str(), Style::default().fg(Color::White)),
            ]))
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Recent Activity ")
            .title_style(Style::default().fg(Color::Yellow)),
    );
    frame.render_widget(list, area);
}

fn draw_editor(frame: &mut Frame, editor: &Editor) {
    let form = &editor.form;
    let mut lines = Vec::new();
    for field in FormField::ALL {
        let focused = field == editor.field;
        let value = match field {
            FormField::Status => format!("◀ {} ▶", form.status.label()),
            FormField::Batch => {
                let label = form
                    .batch_options()
                    .get(form.selected())
                    .map_or("", |o| o.label.as_str());
                format!("◀ {label} ▶")
            }
            _ => {
                let text = form.text(field).unwrap_or_default();
                if focused { format!("{text}▏") } else { text.to_string() }
            }
        };
        let style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {:>14}  ", field.title()), Style::default().fg(Color::DarkGray)),
            Span::styled(value, style),
        ]));
    }

    if let Some(notes) = form.notes_panel() {
        lines.push(Line::default());
        lines.push(Line::from(Span::styled(" Batch notes", Style::default().fg(Color::Cyan))));
        lines.extend(notes.lines().map(|l| Line::from(format!("   {l}"))));
    }

    lines.push(Line::default());
    let mut help = String::from(" [Enter] Save  [Esc] Cancel  [Tab] Next  [←/→] Change");
    if form.can_delete() {
        help.push_str("  [Ctrl-D] Delete");
    }
    lines.push(Line::from(Span::styled(help, Style::default().fg(Color::DarkGray))));

    let height = lines.len() as u16 + 2;
    let area = centered(frame.area(), 78, height);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(format!(" Edit {} ", form.title)),
    );
    frame.render_widget(paragraph, area);
}

fn draw_dialog(frame: &mut Frame, title: &str, message: &str, help: &str, color: Color) {
    let area = centered(frame.area(), 64, 7);
    frame.render_widget(Clear, area);
    let paragraph = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::default(),
        Line::from(Span::styled(help.to_string(), Style::default().fg(Color::DarkGray))),
    ])
    .wrap(Wrap { trim: true })
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(color))
            .title(title.to_string()),
    );
    frame.render_widget(paragraph, area);
}

fn draw_placeholder(frame: &mut Frame, message: &str, area: Rect) {
    let paragraph = Paragraph::new(message.to_string())
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(paragraph, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let help = if app.drag.is_active() {
        "[←/→] Choose station  [Enter] Drop  [Esc] Cancel"
    } else {
        match app.view() {
            View::Grid => "[Tab/1-3] View  [↑↓←→] Select  [Enter] Edit  [r] Reset  [a] Add  [q] Quit",
            View::Board => "[Tab/1-3] View  [←/→] Column  [↑↓] Select  [m] Move  [Enter] Edit  [r] Reset  [q] Quit",
            View::Stats => "[Tab/1-3] View  [s] Sync  [q] Quit",
        }
    };
    let kegs = app.store.kegs().len();
    let filled = app.store.kegs().iter().filter(|k| !k.is_empty()).count();

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(format!("  {kegs} kegs, {filled} filled"), Style::default().fg(Color::Cyan)),
        Span::raw("  │  "),
        Span::styled(help, Style::default().fg(Color::DarkGray)),
    ]))
    .block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}
