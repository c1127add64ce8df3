use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use daybook_core::event::{parse_date, parse_time_of_day};
use daybook_core::schedule::{Flexibility, Task, TaskType};
use daybook_core::{Category, DocumentStore};
use daybook_gemini::GeminiScheduler;
use owo_colors::OwoColorize;

use super::{Context, resolve_category};
use crate::render::{planning_spinner, render_event};

pub async fn run<S: DocumentStore>(
    ctx: &Context<S>,
    from: NaiveDate,
    to: NaiveDate,
    specs: &[String],
) -> Result<()> {
    let api_key = ctx.config.gemini_api_key.clone().context(
        "No Gemini API key configured.\n\n\
        Set gemini_api_key in the daybook config file, or export DAYBOOK_GEMINI_API_KEY.",
    )?;
    let mut scheduler = GeminiScheduler::new(api_key);
    if let Some(model) = &ctx.config.gemini_model {
        scheduler = scheduler.with_model(model);
    }

    let mut session = ctx.session().await?;
    let tasks = specs
        .iter()
        .enumerate()
        .map(|(i, spec)| parse_task(spec, &format!("task_{}", i + 1), session.categories()))
        .collect::<Result<Vec<_>>>()?;

    let spinner = planning_spinner(tasks.len(), scheduler.model());
    let result = session.plan(tasks, from, to, &scheduler).await;
    spinner.finish_and_clear();
    let created = result?;

    if created.is_empty() {
        println!("{}", "The planner did not propose any events".dimmed());
        return Ok(());
    }

    println!("{} Added {} events", "✓".green(), created.len());
    let mut current_date: Option<NaiveDate> = None;
    for event in &created {
        if current_date != Some(event.date) {
            println!("{}", event.date.format("%a %b %-d").to_string().bold());
            current_date = Some(event.date);
        }
        println!("{}", render_event(event));
    }
    Ok(())
}

/// Parse `name:hours[:deadline[:type[:category[:HH:MM]]]]`.
///
/// Empty fields take their defaults: no deadline, `deadline` type when a
/// deadline is given and `daily` otherwise, and the first category that is
/// not the built-in holidays one. A preferred time makes the task fixed.
pub fn parse_task(spec: &str, id: &str, categories: &[Category]) -> Result<Task> {
    let mut fields = spec.splitn(6, ':').map(str::trim);
    let name = fields.next().filter(|n| !n.is_empty()).context("Task name is required")?;
    let hours: f64 = fields
        .next()
        .context("Task duration is required (name:hours)")?
        .parse()
        .with_context(|| format!("Invalid duration in task '{}'", spec))?;

    let deadline = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_date(s)?),
        None => None,
    };
    let task_type = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => s.parse::<TaskType>()?,
        None if deadline.is_some() => TaskType::Deadline,
        None => TaskType::Daily,
    };
    let category = match fields.next().filter(|s| !s.is_empty()) {
        Some(key) => resolve_category(categories, key)?,
        None => categories
            .iter()
            .find(|c| !c.is_default)
            .or_else(|| categories.first())
            .context("No categories available")?,
    };
    let preferred_time = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => Some(parse_time_of_day(s)?.format("%H:%M").to_string()),
        None => None,
    };

    let task = Task {
        id: id.to_string(),
        name: name.to_string(),
        duration_hours: hours,
        deadline,
        task_type,
        flexibility: if preferred_time.is_some() {
            Flexibility::Fixed
        } else {
            Flexibility::Flexible
        },
        preferred_time,
        category_id: category.id.clone(),
        category_name: category.name.clone(),
        category_color: category.color.clone(),
    };
    task.validate()?;
    Ok(task)
}
