pub mod auth;
pub mod category;
pub mod event;
pub mod events;
pub mod holidays;
pub mod month;
pub mod onboard;
pub mod plan;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::NaiveDate;
use daybook_core::event::parse_date;
use daybook_core::{Category, DaybookConfig, DaybookError, DocumentStore, Session};

/// Everything a command needs besides its own arguments.
pub struct Context<S> {
    pub store: Arc<S>,
    pub config: DaybookConfig,
    /// Where `login` and `logout` record the current user. `None` keeps the
    /// sign-in for this run only.
    pub config_path: Option<PathBuf>,
    pub user: Option<String>,
    pub today: NaiveDate,
}

impl<S: DocumentStore> Context<S> {
    /// Open the signed-in user's session, pointing at sign-in when there is
    /// none.
    pub async fn session(&self) -> Result<Session<S>> {
        match Session::open(self.store.clone(), self.user.as_deref(), self.today).await {
            Ok(session) => Ok(session),
            Err(DaybookError::NotFound { entity: "User", .. }) => anyhow::bail!(
                "Not signed in.\n\n\
                Sign in with:\n  \
                daybook login <username>\n\n\
                Or create an account:\n  \
                daybook signup <username>"
            ),
            Err(e) => Err(e).context("Failed to open calendar"),
        }
    }

    pub fn remember_user(&mut self, user: Option<&str>) -> Result<()> {
        self.user = user.map(String::from);
        if let Some(path) = &self.config_path {
            DaybookConfig::set_current_user(path, user)?;
        }
        Ok(())
    }
}

/// Find a category by id or, case-insensitively, by name.
pub fn resolve_category<'a>(categories: &'a [Category], key: &str) -> Result<&'a Category> {
    let key = key.trim();
    categories
        .iter()
        .find(|c| c.id == key)
        .or_else(|| categories.iter().find(|c| c.name.eq_ignore_ascii_case(key)))
        .ok_or_else(|| {
            let available: Vec<_> = categories.iter().map(|c| c.name.as_str()).collect();
            anyhow::anyhow!(
                "Category '{}' not found. Available: {}",
                key,
                available.join(", ")
            )
        })
}

/// Parse `YYYY-MM` (or a full date) into the first day of that month.
pub fn parse_month(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = parse_date(s) {
        return Ok(date);
    }
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d")
        .with_context(|| format!("Invalid month '{}'. Expected YYYY-MM", s))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use daybook_core::category::default_categories;

    #[test]
    fn test_parse_month() {
        assert_eq!(parse_month("2026-02").unwrap(), NaiveDate::from_ymd_opt(2026, 2, 1).unwrap());
        assert_eq!(parse_month("2026-02-17").unwrap(), NaiveDate::from_ymd_opt(2026, 2, 17).unwrap());
        assert!(parse_month("2026-13").is_err());
        assert!(parse_month("february").is_err());
    }

    #[test]
    fn test_resolve_category_by_id_or_name() {
        let categories = default_categories(Utc::now());
        assert_eq!(resolve_category(&categories, "cat_work").unwrap().name, "Work");
        assert_eq!(resolve_category(&categories, "personal").unwrap().id, "cat_personal");
        assert!(resolve_category(&categories, "Gym").is_err());
    }
}
