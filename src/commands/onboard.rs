use anyhow::Result;
use daybook_core::preferences::{BREAK_LENGTHS, DAY_PERIODS, SESSION_LENGTHS};
use daybook_core::{DocumentStore, Preferences};
use dialoguer::{MultiSelect, Select};
use owo_colors::OwoColorize;

use super::Context;

pub async fn run<S: DocumentStore>(ctx: &Context<S>, skip: bool) -> Result<()> {
    let session = ctx.session().await?;

    if skip {
        session.skip_onboarding().await?;
        println!("{}", "Skipped. Run `daybook onboard` any time to set preferences.".dimmed());
        return Ok(());
    }

    let current = session.load_preferences().await?.unwrap_or_default();
    println!("{}", "Tell daybook when you work best. It uses this to plan tasks.".bold());
    println!();

    let productive = pick_periods(
        "When are you most productive? (space to toggle, enter to confirm)",
        &current.productive_hours,
    )?;
    let unproductive = pick_periods(
        "When should planning avoid? (space to toggle, enter to confirm)",
        &current.unproductive_hours,
    )?;
    let session_length = pick_minutes("Preferred focus session length", &SESSION_LENGTHS, current.session_length)?;
    let break_length = pick_minutes("Break between sessions", &BREAK_LENGTHS, current.break_length)?;

    let preferences = Preferences {
        productive_hours: productive,
        unproductive_hours: unproductive,
        session_length,
        break_length,
    };
    session.save_preferences(&preferences).await?;

    println!();
    println!("{} Preferences saved", "✓".green());
    Ok(())
}

fn pick_periods(prompt: &str, selected: &[String]) -> Result<Vec<String>> {
    let defaults: Vec<bool> = DAY_PERIODS
        .iter()
        .map(|p| selected.iter().any(|s| s.as_str() == *p))
        .collect();
    let chosen = MultiSelect::new()
        .with_prompt(prompt)
        .items(&DAY_PERIODS[..])
        .defaults(&defaults)
        .interact()?;
    Ok(chosen.into_iter().map(|i| DAY_PERIODS[i].to_string()).collect())
}

fn pick_minutes(prompt: &str, options: &[u32], current: u32) -> Result<u32> {
    let labels: Vec<String> = options.iter().map(|m| format!("{} minutes", m)).collect();
    let default = options.iter().position(|m| *m == current).unwrap_or(0);
    let index = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()?;
    Ok(options[index])
}
