use anyhow::Result;
use daybook_core::DocumentStore;
use daybook_core::holidays::HOLIDAY_YEAR;
use owo_colors::OwoColorize;

use super::Context;

pub async fn run<S: DocumentStore>(ctx: &Context<S>, force: bool) -> Result<()> {
    let mut session = ctx.session().await?;
    let count = session.import_holidays(force).await?;

    if count == 0 {
        println!(
            "{}",
            "Holidays already imported (use --force to import them again)".dimmed()
        );
    } else {
        println!(
            "{} Imported {} public holidays for {}",
            "✓".green(),
            count,
            HOLIDAY_YEAR
        );
    }
    Ok(())
}
