//! Terminal rendering for daybook view models.
//!
//! Category colors are `#rrggbb` strings and are drawn with truecolor escapes.

use daybook_core::view::{DAY_NAMES, MAX_EVENTS_PER_CELL};
use daybook_core::{Category, Event, MiniDay, MonthGrid, ViewSink};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;

/// Width of one day column in the month grid, including the separator.
const CELL_WIDTH: usize = 15;

const FALLBACK_RGB: (u8, u8, u8) = (0x61, 0x61, 0x61);

/// Parse `#rrggbb` (or `#rgb`).
pub fn hex_rgb(color: &str) -> Option<(u8, u8, u8)> {
    let hex = color.trim().strip_prefix('#').filter(|h| h.is_ascii())?;
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        6 => Some((channel(&hex[0..2])?, channel(&hex[2..4])?, channel(&hex[4..6])?)),
        3 => {
            let (r, g, b) = (channel(&hex[0..1])?, channel(&hex[1..2])?, channel(&hex[2..3])?);
            Some((r * 17, g * 17, b * 17))
        }
        _ => None,
    }
}

/// Paint `text` in a category color.
pub fn paint(text: &str, color: Option<&str>) -> String {
    let (r, g, b) = color.and_then(hex_rgb).unwrap_or(FALLBACK_RGB);
    text.truecolor(r, g, b).to_string()
}

pub fn swatch(color: &str) -> String {
    paint("●", Some(color))
}

/// Cut `text` to `width` characters, marking the cut with `…`.
pub fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

fn pad(text: &str, width: usize) -> String {
    let len = text.chars().count();
    format!("{}{}", text, " ".repeat(width.saturating_sub(len)))
}

pub fn render_month(grid: &MonthGrid) -> String {
    let inner = CELL_WIDTH - 1;
    let mut lines = vec![grid.title().bold().to_string()];

    let header: String = DAY_NAMES
        .iter()
        .map(|d| pad(d, CELL_WIDTH))
        .collect();
    lines.push(header.dimmed().to_string());

    for (i, week) in grid.weeks().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        let numbers: String = week
            .iter()
            .map(|cell| {
                let text = pad(&cell.date.format("%-d").to_string(), inner);
                let styled = if cell.is_today {
                    text.reversed().bold().to_string()
                } else if cell.in_month {
                    text.bold().to_string()
                } else {
                    text.dimmed().to_string()
                };
                format!("{} ", styled)
            })
            .collect();
        lines.push(numbers);

        for slot in 0..MAX_EVENTS_PER_CELL {
            if week.iter().all(|cell| cell.events.len() <= slot) {
                break;
            }
            let row: String = week
                .iter()
                .map(|cell| match cell.events.get(slot) {
                    Some(event) => {
                        let title = pad(&truncate(&event.title, inner - 2), inner - 2);
                        format!("{} {} ", paint("●", event.color.as_deref()), title)
                    }
                    None => " ".repeat(CELL_WIDTH),
                })
                .collect();
            lines.push(row);
        }

        if week.iter().any(|cell| cell.overflow > 0) {
            let row: String = week
                .iter()
                .map(|cell| {
                    if cell.overflow > 0 {
                        format!("{} ", pad(&format!("+{} more", cell.overflow), inner).dimmed())
                    } else {
                        " ".repeat(CELL_WIDTH)
                    }
                })
                .collect();
            lines.push(row);
        }
    }

    lines.join("\n")
}

pub fn render_mini_month(title: &str, days: &[MiniDay]) -> String {
    let mut lines = vec![title.bold().to_string()];
    lines.push(
        DAY_NAMES
            .iter()
            .map(|d| format!("{:>3}", &d[..2]))
            .collect::<String>()
            .dimmed()
            .to_string(),
    );
    for week in days.chunks(7) {
        let row: String = week
            .iter()
            .map(|day| {
                let text = format!("{:>3}", day.day());
                if day.is_today {
                    text.reversed().to_string()
                } else if day.is_selected {
                    text.underline().to_string()
                } else if day.in_month {
                    text
                } else {
                    text.dimmed().to_string()
                }
            })
            .collect();
        lines.push(row);
    }
    lines.join("\n")
}

pub fn render_categories(categories: &[Category]) -> String {
    categories
        .iter()
        .map(|c| {
            let mut line = format!("{} {} {}", swatch(&c.color), c.name, c.id.dimmed());
            if c.is_default {
                line.push_str(&format!(" {}", "(built-in)".dimmed()));
            }
            if !c.is_visible {
                line.push_str(&format!(" {}", "hidden".yellow()));
            }
            line
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_event(event: &Event) -> String {
    let mut line = format!(
        "  {}-{} {} {}",
        event.start_time.format("%H:%M"),
        event.end_time.format("%H:%M"),
        paint("●", event.color.as_deref()),
        event.title
    );
    if let Some(name) = &event.category_name {
        line.push_str(&format!(" {}", format!("[{}]", name).dimmed()));
    }
    if event.ai_generated {
        line.push_str(&format!(" {}", "✦".cyan()));
    }
    line.push_str(&format!(" {}", event.id.dimmed()));
    line
}

/// Spinner on stderr while the planner waits for the model.
pub fn planning_spinner(task_count: usize, model: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
        spinner.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
    }
    let noun = if task_count == 1 { "task" } else { "tasks" };
    spinner.set_message(format!("Planning {} {} with {}", task_count, noun, model));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

/// Draws to stdout.
pub struct TerminalSink;

impl ViewSink for TerminalSink {
    fn render_month(&mut self, grid: &MonthGrid) {
        println!("{}", render_month(grid));
    }

    fn render_categories(&mut self, categories: &[Category]) {
        println!("{}", render_categories(categories));
    }
}
