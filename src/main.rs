mod commands;
mod render;

use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use clap::{Parser, Subcommand};
use daybook_core::event::parse_date;
use daybook_core::{Accounts, DaybookConfig, DocumentStore, FsStore, MemoryStore};
use owo_colors::OwoColorize;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use commands::Context;
use commands::event::EventArgs;

/// Account used by `--ephemeral` when nobody is signed in.
const GUEST_USER: &str = "guest";

#[derive(Parser)]
#[command(name = "daybook")]
#[command(about = "A personal calendar with categories, holidays and AI-assisted planning")]
struct Cli {
    /// Keep everything in memory for this run (nothing is written to disk)
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Show more log output (-v for info, -vv for debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account and sign in
    Signup { username: String },
    /// Sign in to an existing account
    Login { username: String },
    /// Sign out
    Logout,
    /// Show the signed-in user
    Whoami,
    /// Show the month grid
    Month {
        /// Month to show (YYYY-MM), defaults to the current month
        #[arg(long)]
        date: Option<String>,

        /// Show the compact mini-month instead
        #[arg(long)]
        mini: bool,
    },
    /// List events in a date range
    Events {
        /// First day (YYYY-MM-DD), defaults to the start of this month
        #[arg(long)]
        from: Option<String>,

        /// Last day (YYYY-MM-DD), defaults to the end of the --from month
        #[arg(long)]
        to: Option<String>,
    },
    /// Create, edit or delete an event
    Event {
        #[command(subcommand)]
        action: EventCommand,
    },
    /// Manage event categories
    Category {
        #[command(subcommand)]
        action: CategoryCommand,
    },
    /// Import the built-in public holidays
    Holidays {
        /// Replace previously imported holidays
        #[arg(long)]
        force: bool,
    },
    /// Set the preferences used for planning
    Onboard {
        /// Skip the questions and mark onboarding as done
        #[arg(long)]
        skip: bool,
    },
    /// Let the AI planner schedule tasks into your calendar
    Plan {
        /// First day to plan (YYYY-MM-DD)
        #[arg(long)]
        from: String,

        /// Last day to plan (YYYY-MM-DD)
        #[arg(long)]
        to: String,

        /// Task as name:hours[:deadline[:type[:category[:HH:MM]]]], repeatable
        #[arg(long = "task", required = true)]
        tasks: Vec<String>,
    },
}

#[derive(Subcommand)]
enum EventCommand {
    /// Create an event
    Add {
        title: String,

        /// Day of the event (YYYY-MM-DD)
        #[arg(short, long)]
        date: String,

        /// Start time (HH:MM)
        #[arg(short, long)]
        start: String,

        /// End time (HH:MM)
        #[arg(short, long)]
        end: String,

        /// Category id or name
        #[arg(short, long)]
        category: String,

        #[arg(long)]
        description: Option<String>,
    },
    /// Change an event (fields left out stay as they are)
    Edit {
        id: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short, long)]
        date: Option<String>,

        #[arg(short, long)]
        start: Option<String>,

        #[arg(short, long)]
        end: Option<String>,

        #[arg(short, long)]
        category: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },
    /// Delete an event
    Rm { id: String },
}

#[derive(Subcommand)]
enum CategoryCommand {
    /// List categories
    List,
    /// Add a category
    Add {
        name: String,

        /// Color as #rrggbb
        color: String,
    },
    /// Rename or recolor a category
    Edit {
        /// Category id or name
        category: String,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        color: Option<String>,
    },
    /// Delete a category
    Rm {
        /// Category id or name
        category: String,
    },
    /// Show or hide a category's events
    Toggle {
        /// Category id or name
        category: String,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = DaybookConfig::config_path()?;
    let config = DaybookConfig::load()?;
    let today = Local::now().date_naive();

    if cli.ephemeral {
        let store = Arc::new(MemoryStore::new());
        let user = config.current_user.clone().unwrap_or_else(|| GUEST_USER.to_string());
        Accounts::new(store.clone()).sign_up(&user).await?;
        debug!(user = %user, "using in-memory store");

        let mut ctx = Context {
            store,
            config,
            config_path: None,
            user: Some(user),
            today,
        };
        dispatch(cli.command, &mut ctx).await
    } else {
        let data_path = config.data_path();
        debug!(path = %data_path.display(), "using file store");

        let mut ctx = Context {
            store: Arc::new(FsStore::new(data_path)),
            user: config.current_user.clone(),
            config,
            config_path: Some(config_path),
            today,
        };
        dispatch(cli.command, &mut ctx).await
    }
}

async fn dispatch<S: DocumentStore>(command: Commands, ctx: &mut Context<S>) -> Result<()> {
    match command {
        Commands::Signup { username } => commands::auth::signup(ctx, &username).await,
        Commands::Login { username } => commands::auth::login(ctx, &username).await,
        Commands::Logout => commands::auth::logout(ctx),
        Commands::Whoami => commands::auth::whoami(ctx).await,
        Commands::Month { date, mini } => {
            let month = date.as_deref().map(commands::parse_month).transpose()?;
            commands::month::run(ctx, month, mini).await
        }
        Commands::Events { from, to } => {
            let from = from.as_deref().map(parse_date).transpose()?;
            let to = to.as_deref().map(parse_date).transpose()?;
            commands::events::run(ctx, from, to).await
        }
        Commands::Event { action } => match action {
            EventCommand::Add {
                title,
                date,
                start,
                end,
                category,
                description,
            } => {
                let args = EventArgs {
                    title: Some(title),
                    date: Some(date),
                    start: Some(start),
                    end: Some(end),
                    category: Some(category),
                    description,
                };
                commands::event::add(ctx, args).await
            }
            EventCommand::Edit {
                id,
                title,
                date,
                start,
                end,
                category,
                description,
            } => {
                let args = EventArgs {
                    title,
                    date,
                    start,
                    end,
                    category,
                    description,
                };
                commands::event::edit(ctx, &id, args).await
            }
            EventCommand::Rm { id } => commands::event::remove(ctx, &id).await,
        },
        Commands::Category { action } => match action {
            CategoryCommand::List => commands::category::list(ctx).await,
            CategoryCommand::Add { name, color } => commands::category::add(ctx, &name, &color).await,
            CategoryCommand::Edit {
                category,
                name,
                color,
            } => commands::category::edit(ctx, &category, name, color).await,
            CategoryCommand::Rm { category } => commands::category::remove(ctx, &category).await,
            CategoryCommand::Toggle { category } => commands::category::toggle(ctx, &category).await,
        },
        Commands::Holidays { force } => commands::holidays::run(ctx, force).await,
        Commands::Onboard { skip } => commands::onboard::run(ctx, skip).await,
        Commands::Plan { from, to, tasks } => {
            let from = parse_date(&from)?;
            let to = parse_date(&to)?;
            commands::plan::run(ctx, from, to, &tasks).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_plan_requires_a_task() {
        let parsed = Cli::try_parse_from(["daybook", "plan", "--from", "2026-02-10", "--to", "2026-02-17"]);
        assert!(parsed.is_err());

        let parsed = Cli::try_parse_from([
            "daybook", "plan", "--from", "2026-02-10", "--to", "2026-02-17", "--task", "Gym:1", "--task",
            "Thesis:4:2026-02-14",
        ])
        .unwrap();
        match parsed.command {
            Commands::Plan { tasks, .. } => assert_eq!(tasks.len(), 2),
            _ => panic!("expected plan"),
        }
    }
}
