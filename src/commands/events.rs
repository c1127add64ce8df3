use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use daybook_core::DocumentStore;
use daybook_core::view::{days_in_month, first_of_month};
use owo_colors::OwoColorize;

use super::Context;
use crate::render::render_event;

/// List events between `from` and `to` (inclusive), defaulting to the
/// current month. Hidden categories are listed too.
pub async fn run<S: DocumentStore>(
    ctx: &Context<S>,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<()> {
    let session = ctx.session().await?;
    let from = from.unwrap_or_else(|| first_of_month(ctx.today));
    let to = to.unwrap_or_else(|| {
        let first = first_of_month(from);
        first.with_day(days_in_month(first)).unwrap_or(first)
    });
    if to < from {
        anyhow::bail!("--to must not be before --from");
    }

    let events = session.event_store().list_in_range(from, to).await?;
    if events.is_empty() {
        println!("{}", "No events found".dimmed());
        return Ok(());
    }

    let mut current_date: Option<NaiveDate> = None;
    for event in &events {
        if current_date != Some(event.date) {
            if current_date.is_some() {
                println!();
            }
            println!("{}", format_date_label(event.date, ctx.today).bold());
            current_date = Some(event.date);
        }
        println!("{}", render_event(event));
    }

    Ok(())
}

/// e.g. "Today", "Tomorrow", "Wed Feb 25"
fn format_date_label(date: NaiveDate, today: NaiveDate) -> String {
    match (date - today).num_days() {
        0 => "Today".to_string(),
        1 => "Tomorrow".to_string(),
        _ => date.format("%a %b %-d").to_string(),
    }
}
