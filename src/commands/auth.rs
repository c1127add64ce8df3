use anyhow::Result;
use daybook_core::{Accounts, DocumentStore};
use owo_colors::OwoColorize;

use super::Context;

pub async fn signup<S: DocumentStore>(ctx: &mut Context<S>, username: &str) -> Result<()> {
    let record = Accounts::new(ctx.store.clone()).sign_up(username).await?;
    ctx.remember_user(Some(&record.username))?;

    println!("{} Created account {}", "✓".green(), record.username.bold());
    println!(
        "{}",
        "Next: `daybook holidays` to add public holidays, `daybook onboard` to set planning preferences."
            .dimmed()
    );
    Ok(())
}

pub async fn login<S: DocumentStore>(ctx: &mut Context<S>, username: &str) -> Result<()> {
    let record = Accounts::new(ctx.store.clone()).sign_in(username).await?;
    ctx.remember_user(Some(&record.username))?;

    println!("{} Signed in as {}", "✓".green(), record.username.bold());
    Ok(())
}

pub fn logout<S: DocumentStore>(ctx: &mut Context<S>) -> Result<()> {
    match ctx.user.clone() {
        Some(user) => {
            ctx.remember_user(None)?;
            println!("Signed out {}", user.bold());
        }
        None => println!("{}", "Not signed in".dimmed()),
    }
    Ok(())
}

pub async fn whoami<S: DocumentStore>(ctx: &Context<S>) -> Result<()> {
    let Some(user) = ctx.user.as_deref() else {
        println!("{}", "Not signed in".dimmed());
        return Ok(());
    };

    match Accounts::new(ctx.store.clone()).find(user).await? {
        Some(record) => println!(
            "{} {}",
            record.username.bold(),
            format!("(since {})", record.created_at.format("%Y-%m-%d")).dimmed()
        ),
        None => println!(
            "{} {}",
            user,
            "(account not found, run `daybook signup` to recreate it)".yellow()
        ),
    }
    Ok(())
}
