use anyhow::Result;
use daybook_core::{CategoryPatch, DocumentStore};
use owo_colors::OwoColorize;

use super::{Context, resolve_category};
use crate::render::{TerminalSink, render_categories, swatch};

pub async fn list<S: DocumentStore>(ctx: &Context<S>) -> Result<()> {
    let session = ctx.session().await?;
    println!("{}", render_categories(session.categories()));
    Ok(())
}

pub async fn add<S: DocumentStore>(ctx: &Context<S>, name: &str, color: &str) -> Result<()> {
    let mut session = ctx.session().await?;
    let category = session.add_category(name, color).await?;
    println!(
        "{} Added {} {} {}",
        "✓".green(),
        swatch(&category.color),
        category.name.bold(),
        category.id.dimmed()
    );
    Ok(())
}

pub async fn edit<S: DocumentStore>(
    ctx: &Context<S>,
    key: &str,
    name: Option<String>,
    color: Option<String>,
) -> Result<()> {
    let mut session = ctx.session().await?;
    let id = resolve_category(session.categories(), key)?.id.clone();
    let patch = CategoryPatch {
        name,
        color,
        ..Default::default()
    };
    let category = session.update_category(&id, patch).await?;
    println!(
        "{} Updated {} {}",
        "✓".green(),
        swatch(&category.color),
        category.name.bold()
    );
    Ok(())
}

pub async fn remove<S: DocumentStore>(ctx: &Context<S>, key: &str) -> Result<()> {
    let mut session = ctx.session().await?;
    let category = resolve_category(session.categories(), key)?.clone();
    session.delete_category(&category.id).await?;
    println!("{} Deleted {}", "✓".green(), category.name.bold());
    println!(
        "{}",
        "Existing events keep the category name and color they were created with.".dimmed()
    );
    Ok(())
}

/// Flip visibility and redraw the month with the category list.
pub async fn toggle<S: DocumentStore>(ctx: &Context<S>, key: &str) -> Result<()> {
    let mut session = ctx.session().await?;
    let id = resolve_category(session.categories(), key)?.id.clone();
    let category = session.toggle_visibility(&id, &mut TerminalSink).await?;

    let state = if category.is_visible { "shown" } else { "hidden" };
    println!("{} {} is now {}", "✓".green(), category.name.bold(), state);
    Ok(())
}
