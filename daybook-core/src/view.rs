//! Month view model.
//!
//! Turns the displayed month, the event list and the category set into plain
//! data: a 6×7 grid of day-cells for the main calendar and a compact
//! mini-month for the sidebar. Rendering is left to the caller.

use std::collections::{HashMap, HashSet};

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::category::Category;
use crate::event::Event;

/// 6 weeks × 7 days.
pub const GRID_CELLS: usize = 42;

/// Events listed per cell before the rest collapse into an overflow count.
pub const MAX_EVENTS_PER_CELL: usize = 3;

const SHORT_MONTH_CELLS: usize = 35;

pub const DAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

#[derive(Debug, Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    /// False for the padding days of the previous and next month.
    pub in_month: bool,
    pub is_today: bool,
    /// At most `MAX_EVENTS_PER_CELL` visible events, earliest first.
    pub events: Vec<Event>,
    /// Visible events that did not fit.
    pub overflow: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGrid {
    /// First day of the displayed month.
    pub month: NaiveDate,
    pub cells: Vec<DayCell>,
}

impl MonthGrid {
    pub fn weeks(&self) -> impl Iterator<Item = &[DayCell]> {
        self.cells.chunks(7)
    }

    pub fn cell(&self, date: NaiveDate) -> Option<&DayCell> {
        self.cells.iter().find(|c| c.date == date)
    }

    /// e.g. "February 2026"
    pub fn title(&self) -> String {
        self.month.format("%B %Y").to_string()
    }
}

pub fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

pub fn days_in_month(date: NaiveDate) -> u32 {
    let first = first_of_month(date);
    first
        .checked_add_months(Months::new(1))
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31)
}

/// Sunday-first weekday index of the month's first day.
fn leading_days(first: NaiveDate) -> u32 {
    first.weekday().num_days_from_sunday()
}

/// `count` consecutive days starting on the Sunday before `first`. At the
/// ends of the representable calendar the window is shifted to fit.
fn grid_days(first: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let start = first
        .checked_sub_days(Days::new(u64::from(leading_days(first))))
        .unwrap_or(NaiveDate::MIN);
    let start = NaiveDate::MAX
        .checked_sub_days(Days::new(count.saturating_sub(1) as u64))
        .map_or(start, |latest| start.min(latest));
    start.iter_days().take(count).collect()
}

/// Build the 42-cell grid for the month containing `current`.
///
/// An event is shown when its date matches the cell and it either has no
/// category (legacy events) or its category is visible.
pub fn month_grid(
    current: NaiveDate,
    today: NaiveDate,
    events: &[Event],
    categories: &[Category],
) -> MonthGrid {
    let first = first_of_month(current);

    let visible: HashSet<&str> = categories
        .iter()
        .filter(|c| c.is_visible)
        .map(|c| c.id.as_str())
        .collect();

    let mut by_day: HashMap<NaiveDate, Vec<&Event>> = HashMap::new();
    for event in events {
        let shown = event
            .category_id
            .as_deref()
            .is_none_or(|id| visible.contains(id));
        if shown {
            by_day.entry(event.date).or_default().push(event);
        }
    }

    let cells = grid_days(first, GRID_CELLS)
        .into_iter()
        .map(|date| {
            let mut day_events = by_day.remove(&date).unwrap_or_default();
            day_events.sort_by(|a, b| (a.start_time, &a.title).cmp(&(b.start_time, &b.title)));
            let overflow = day_events.len().saturating_sub(MAX_EVENTS_PER_CELL);
            DayCell {
                date,
                in_month: date.year() == first.year() && date.month() == first.month(),
                is_today: date == today,
                events: day_events
                    .into_iter()
                    .take(MAX_EVENTS_PER_CELL)
                    .cloned()
                    .collect(),
                overflow,
            }
        })
        .collect();

    MonthGrid {
        month: first,
        cells,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MiniDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
    pub is_selected: bool,
}

impl MiniDay {
    pub fn day(&self) -> u32 {
        self.date.day()
    }
}

/// Sidebar month: 35 cells when the month fits in five weeks, 42 otherwise.
/// Today and the selection are only marked inside the displayed month.
pub fn mini_month(current: NaiveDate, selected: NaiveDate, today: NaiveDate) -> Vec<MiniDay> {
    let first = first_of_month(current);
    let leading = leading_days(first);
    let used = (leading + days_in_month(first)) as usize;
    let total = if used <= SHORT_MONTH_CELLS {
        SHORT_MONTH_CELLS
    } else {
        GRID_CELLS
    };

    grid_days(first, total)
        .into_iter()
        .map(|date| {
            let in_month = date.year() == first.year() && date.month() == first.month();
            MiniDay {
                date,
                in_month,
                is_today: in_month && date == today,
                is_selected: in_month && date == selected,
            }
        })
        .collect()
}

/// The displayed month, the selected day and the last event snapshot.
///
/// Holds no other state between recomputations: the grid is rebuilt from
/// scratch every time.
#[derive(Debug, Clone)]
pub struct CalendarView {
    current: NaiveDate,
    selected: NaiveDate,
    events: Vec<Event>,
    grid: Option<MonthGrid>,
}

impl CalendarView {
    pub fn new(today: NaiveDate) -> Self {
        CalendarView {
            current: first_of_month(today),
            selected: today,
            events: Vec::new(),
            grid: None,
        }
    }

    /// First day of the displayed month.
    pub fn current_month(&self) -> NaiveDate {
        self.current
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn grid(&self) -> Option<&MonthGrid> {
        self.grid.as_ref()
    }

    /// Move by whole months. Out-of-range dates leave the view unchanged.
    pub fn navigate(&mut self, months: i32) {
        let step = Months::new(months.unsigned_abs());
        let moved = if months >= 0 {
            self.current.checked_add_months(step)
        } else {
            self.current.checked_sub_months(step)
        };
        if let Some(month) = moved {
            self.current = month;
        }
    }

    pub fn show_month_of(&mut self, date: NaiveDate) {
        self.current = first_of_month(date);
    }

    pub fn go_to_today(&mut self, today: NaiveDate) {
        self.current = first_of_month(today);
        self.selected = today;
    }

    pub fn select(&mut self, date: NaiveDate) {
        self.selected = date;
    }

    /// Replace the cached events with a new snapshot. Never merges.
    pub fn replace_events(&mut self, events: Vec<Event>) {
        self.events = events;
    }

    pub fn recompute(&mut self, today: NaiveDate, categories: &[Category]) -> &MonthGrid {
        self.grid.insert(month_grid(self.current, today, &self.events, categories))
    }

    pub fn mini_month(&self, today: NaiveDate) -> Vec<MiniDay> {
        mini_month(self.current, self.selected, today)
    }
}
