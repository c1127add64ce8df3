//! Scheduling preferences collected by the onboarding wizard.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::error::DaybookResult;
use crate::store::{DocPath, DocumentStore};

pub const SESSION_LENGTHS: [u32; 4] = [60, 90, 120, 180];
pub const BREAK_LENGTHS: [u32; 4] = [5, 10, 15, 30];

/// Time-of-day slots offered by the wizard.
pub const DAY_PERIODS: [&str; 5] = [
    "early-morning",
    "morning",
    "afternoon",
    "evening",
    "night",
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default)]
    pub productive_hours: Vec<String>,
    #[serde(default)]
    pub unproductive_hours: Vec<String>,
    /// Minutes.
    #[serde(default = "default_session_length")]
    pub session_length: u32,
    /// Minutes.
    #[serde(default = "default_break_length")]
    pub break_length: u32,
}

fn default_session_length() -> u32 {
    120
}

fn default_break_length() -> u32 {
    15
}

impl Default for Preferences {
    fn default() -> Self {
        Preferences {
            productive_hours: Vec::new(),
            unproductive_hours: Vec::new(),
            session_length: default_session_length(),
            break_length: default_break_length(),
        }
    }
}

impl Preferences {
    pub fn has_productive_hours(&self) -> bool {
        !self.productive_hours.is_empty()
    }
}

pub struct PreferenceStore<S> {
    store: Arc<S>,
    user_path: DocPath,
}

impl<S: DocumentStore> PreferenceStore<S> {
    pub fn new(store: Arc<S>, user_id: &str) -> DaybookResult<Self> {
        Ok(PreferenceStore {
            store,
            user_path: DocPath::user(user_id)?,
        })
    }

    pub async fn needs_onboarding(&self) -> DaybookResult<bool> {
        let doc = self.store.get_document(&self.user_path).await?;
        let completed = doc
            .as_ref()
            .and_then(|d| d.get("onboardingCompleted"))
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        Ok(!completed)
    }

    pub async fn load(&self) -> DaybookResult<Option<Preferences>> {
        let doc = self.store.get_document(&self.user_path).await?;
        match doc.and_then(|mut d| d.get_mut("preferences").map(|v| v.take())) {
            Some(value) if !value.is_null() => Ok(Some(serde_json::from_value(value)?)),
            _ => Ok(None),
        }
    }

    pub async fn save(&self, preferences: &Preferences) -> DaybookResult<()> {
        let data = json!({
            "preferences": preferences,
            "onboardingCompleted": true,
            "onboardingCompletedAt": Utc::now(),
        });
        self.store.set_document(&self.user_path, data, true).await?;
        info!(user = %self.user_path.id(), "saved preferences");
        Ok(())
    }

    pub async fn skip(&self) -> DaybookResult<()> {
        let data = json!({
            "onboardingCompleted": true,
            "onboardingSkipped": true,
            "onboardingCompletedAt": Utc::now(),
        });
        self.store.set_document(&self.user_path, data, true).await?;
        info!(user = %self.user_path.id(), "skipped onboarding");
        Ok(())
    }
}
