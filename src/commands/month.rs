use anyhow::Result;
use chrono::NaiveDate;
use daybook_core::DocumentStore;

use super::Context;
use crate::render::{render_categories, render_mini_month, render_month};

pub async fn run<S: DocumentStore>(ctx: &Context<S>, month: Option<NaiveDate>, mini: bool) -> Result<()> {
    let mut session = ctx.session().await?;
    if let Some(date) = month {
        session.show_month_of(date);
    }

    if mini {
        let title = session.view().current_month().format("%B %Y").to_string();
        println!("{}", render_mini_month(&title, &session.mini_month()));
        return Ok(());
    }

    println!("{}", render_month(session.grid()));
    println!();
    println!("{}", render_categories(session.categories()));
    Ok(())
}
