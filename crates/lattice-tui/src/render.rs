//! Pure view functions for the TUI.
//!
//! Functions here take `&AppState`, draw to a ratatui `Frame`, and never
//! mutate state. The page is pre-rendered into one line per row and then
//! sliced at the scroll offset.

use lattice_core::engine::VISIBLE_CLASS;
use lattice_core::format::format_number;
use lattice_core::intercept::InterceptStatus;
use lattice_core::live::{SLOT_BYTES_SAVED, SLOT_STORAGE_RECLAIMED, SLOT_TX_COMPRESSED};
use lattice_core::page::{BlockKind, ElementRole, LaidOutElement};
use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::state::{AppState, px_to_rows};

const GUTTER: &str = "│ ";

/// Columns kept free to the right of a bar for its percentage.
const BAR_LABEL_RESERVE: usize = 7;

pub fn render(app: &AppState, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    render_page(app, frame, chunks[1]);
    render_intercept(app, frame, chunks[2]);
    render_status(app, frame, chunks[3]);
}

fn render_header(app: &AppState, frame: &mut Frame, area: Rect) {
    let max = app.max_scroll();
    let percent = if max > 0.0 {
        (app.scroll.offset_px / max * 100.0).round()
    } else {
        100.0
    };
    let line = Line::from(vec![
        Span::styled(
            app.layout().title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(format!("  {percent:.0}%"), Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_page(app: &AppState, frame: &mut Frame, area: Rect) {
    let lines: Vec<Line<'static>> = page_lines(app, usize::from(area.width))
        .into_iter()
        .skip(app.scroll.offset_rows())
        .take(usize::from(area.height))
        .collect();
    frame.render_widget(Paragraph::new(lines), area);
}

/// Renders the whole page, one line per terminal row.
pub fn page_lines(app: &AppState, width: usize) -> Vec<Line<'static>> {
    let row_px = app.scroll.row_px;
    let layout = app.layout();
    let total = px_to_rows(layout.height, row_px);
    let mut lines = vec![Line::default(); total];

    for element in &layout.elements {
        let start = px_to_rows(element.rect.y, row_px);
        let end = px_to_rows(element.rect.bottom(), row_px).min(total);
        if start >= end {
            continue;
        }
        let gutter = Span::styled(GUTTER, gutter_style(&element.role));
        let content = element_lines(app, element, width.saturating_sub(GUTTER.chars().count()));
        let mut content = content.into_iter();
        for line in &mut lines[start..end] {
            let mut spans = vec![gutter.clone()];
            if let Some(body) = content.next() {
                spans.extend(body.spans);
            }
            *line = Line::from(spans);
        }
    }
    lines
}

fn gutter_style(role: &ElementRole) -> Style {
    let color = match role {
        ElementRole::Static => Color::DarkGray,
        ElementRole::Animated(_) => Color::Cyan,
        ElementRole::Live { .. } => Color::Green,
    };
    Style::default().fg(color)
}

fn element_lines(app: &AppState, element: &LaidOutElement, width: usize) -> Vec<Line<'static>> {
    let display = app.page.display();
    match &element.block.kind {
        BlockKind::Text { text } => wrap(text, width)
            .into_iter()
            .map(Line::from)
            .collect(),
        BlockKind::Reveal { text } => {
            if display.has_class(element.id, VISIBLE_CLASS) {
                wrap(text, width).into_iter().map(Line::from).collect()
            } else {
                Vec::new()
            }
        }
        BlockKind::Counter { label, suffix, .. } => {
            let value = display.element_text(element.id).unwrap_or("0");
            vec![
                Line::from(Span::styled(
                    label.clone(),
                    Style::default().fg(Color::DarkGray),
                )),
                Line::from(Span::styled(
                    format!("{value}{}", suffix.as_deref().unwrap_or("")),
                    Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
                )),
            ]
        }
        BlockKind::BarGroup { title, bars } => {
            let mut lines = Vec::new();
            if let Some(title) = title {
                lines.push(Line::from(Span::styled(
                    title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            let label_width = bars.iter().map(|b| b.label.chars().count()).max().unwrap_or(0);
            let track = width.saturating_sub(label_width + 1 + BAR_LABEL_RESERVE);
            // Indices match the layout, which drops non-finite widths.
            for (index, bar) in bars.iter().filter(|b| b.width.is_finite()).enumerate() {
                let state = display.bar(element.id, index);
                let drawn = state.map_or(0.0, |s| app.bar_width(s));
                let filled = ((track as f64) * drawn / 100.0).round() as usize;
                let mut spans = vec![
                    Span::raw(format!("{:<label_width$} ", bar.label)),
                    Span::styled("█".repeat(filled.min(track)), Style::default().fg(Color::Cyan)),
                ];
                if let Some(state) = state {
                    spans.push(Span::styled(
                        format!(" {:.0}%", state.width_percent),
                        Style::default().fg(Color::DarkGray),
                    ));
                }
                lines.push(Line::from(spans));
            }
            lines
        }
        BlockKind::Live { title, slots } => {
            let mut lines = Vec::new();
            if let Some(title) = title {
                lines.push(Line::from(Span::styled(
                    title.clone(),
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                )));
            }
            for slot in slots {
                let Some((name, label)) = slot_label(slot) else {
                    continue;
                };
                let value = display.slot(name).unwrap_or("0");
                lines.push(Line::from(vec![
                    Span::styled(format!("{label:<26}"), Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        value.to_string(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]));
            }
            lines
        }
    }
}

fn slot_label(slot: &str) -> Option<(&'static str, &'static str)> {
    [
        (SLOT_BYTES_SAVED, "Bytes saved"),
        (SLOT_TX_COMPRESSED, "Transactions compressed"),
        (SLOT_STORAGE_RECLAIMED, "Storage reclaimed"),
    ]
    .into_iter()
    .find(|(name, _)| *name == slot)
}

/// Greedy word wrap.
fn wrap(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn render_intercept(app: &AppState, frame: &mut Frame, area: Rect) {
    let intercept = &app.intercept;
    let mut spans = vec![Span::styled(
        "Intercept demo: ",
        Style::default().fg(Color::DarkGray),
    )];
    match intercept.status {
        None => spans.push(Span::styled(
            "press i to send the demo payload",
            Style::default().fg(Color::DarkGray),
        )),
        Some(status) => {
            let color = if status.is_error() {
                Color::Red
            } else if status == InterceptStatus::Sending {
                Color::Yellow
            } else {
                Color::Green
            };
            spans.push(Span::styled(status.text(), Style::default().fg(color)));
        }
    }
    if let Some(report) = &intercept.report {
        spans.push(Span::raw(format!(
            "  original {} B | packed {} B | gas {} | {} ms | {}",
            report.original_size,
            report.packed_size,
            report.gas_used,
            report.compression_time_text(),
            report.short_hash(),
        )));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_status(app: &AppState, frame: &mut Frame, area: Rect) {
    let live = app.page.engine().live().state();
    let mut spans = vec![Span::styled(
        "j/k scroll  PgUp/PgDn page  g/G top/bottom  i intercept  q quit",
        Style::default().fg(Color::DarkGray),
    )];
    if live.started {
        spans.push(Span::styled(
            format!("  live: {} ticks", format_number(live.ticks)),
            Style::default().fg(Color::Green),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
