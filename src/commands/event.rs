use anyhow::{Context as _, Result};
use daybook_core::event::{parse_date, parse_time_of_day};
use daybook_core::{DocumentStore, EventInput};
use owo_colors::OwoColorize;

use super::{Context, resolve_category};
use crate::render::render_event;

/// Fields given on the command line. Anything left out keeps its current
/// value when editing.
#[derive(Debug, Default)]
pub struct EventArgs {
    pub title: Option<String>,
    pub date: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl EventArgs {
    /// Apply these arguments on top of `base`.
    fn apply(self, mut base: EventInput, categories: &[daybook_core::Category]) -> Result<EventInput> {
        if let Some(title) = self.title {
            base.title = title;
        }
        if let Some(date) = self.date {
            base.date = Some(parse_date(&date)?);
        }
        if let Some(start) = self.start {
            base.start_time = Some(parse_time_of_day(&start)?);
        }
        if let Some(end) = self.end {
            base.end_time = Some(parse_time_of_day(&end)?);
        }
        if let Some(key) = self.category {
            base.category_id = Some(resolve_category(categories, &key)?.id.clone());
        }
        if let Some(description) = self.description {
            base.description = description;
        }
        Ok(base)
    }
}

pub async fn add<S: DocumentStore>(ctx: &Context<S>, args: EventArgs) -> Result<()> {
    let mut session = ctx.session().await?;
    let input = args.apply(EventInput::default(), session.categories())?;
    let event = session.create_event(input).await?;

    println!("{} Created event", "✓".green());
    println!("{}", event.date.format("%a %b %-d").to_string().bold());
    println!("{}", render_event(&event));
    Ok(())
}

pub async fn edit<S: DocumentStore>(ctx: &Context<S>, id: &str, args: EventArgs) -> Result<()> {
    let mut session = ctx.session().await?;
    let existing = session
        .event_store()
        .get(id)
        .await?
        .with_context(|| format!("Event '{}' not found", id))?;

    let base = EventInput {
        title: existing.title,
        description: existing.description,
        date: Some(existing.date),
        start_time: Some(existing.start_time),
        end_time: Some(existing.end_time),
        category_id: existing.category_id,
        is_holiday: existing.is_holiday,
        ai_generated: existing.ai_generated,
    };
    let input = args.apply(base, session.categories())?;
    let event = session.update_event(id, input).await?;

    println!("{} Updated event", "✓".green());
    println!("{}", render_event(&event));
    Ok(())
}

pub async fn remove<S: DocumentStore>(ctx: &Context<S>, id: &str) -> Result<()> {
    let mut session = ctx.session().await?;
    session.delete_event(id).await?;
    println!("{} Deleted event {}", "✓".green(), id.dimmed());
    Ok(())
}
