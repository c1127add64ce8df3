//! Event categories and the per-user category store.
//!
//! The whole category set is stored as one array field on the user document
//! and rewritten on every change.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::error::{DaybookError, DaybookResult};
use crate::store::{DocPath, DocumentStore};

/// Field on the user document holding the category array.
pub const CATEGORIES_FIELD: &str = "eventCategories";

pub const HOLIDAYS_CATEGORY_ID: &str = "cat_holidays";
pub const HOLIDAYS_CATEGORY_NAME: &str = "Official Holidays";

/// Color reserved for the built-in holidays category.
pub const RESERVED_COLOR: &str = "#d50000";

const CHANGE_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default = "visible_by_default")]
    pub is_visible: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

fn visible_by_default() -> bool {
    true
}

impl Category {
    fn seeded(id: &str, name: &str, color: &str, is_default: bool, now: DateTime<Utc>) -> Self {
        Category {
            id: id.to_string(),
            name: name.to_string(),
            color: color.to_string(),
            is_default,
            is_visible: true,
            created_at: now,
        }
    }
}

/// The four categories every account starts with.
pub fn default_categories(now: DateTime<Utc>) -> Vec<Category> {
    vec![
        Category::seeded(HOLIDAYS_CATEGORY_ID, HOLIDAYS_CATEGORY_NAME, RESERVED_COLOR, true, now),
        Category::seeded("cat_personal", "Personal", "#1a73e8", false, now),
        Category::seeded("cat_work", "Work", "#33b679", false, now),
        Category::seeded("cat_other", "Other", "#616161", false, now),
    ]
}

pub fn is_reserved_color(color: &str) -> bool {
    color.trim().eq_ignore_ascii_case(RESERVED_COLOR)
}

/// Repair a stored set so it has exactly one default category and unique
/// names and ids. Later duplicates are dropped. Returns whether anything
/// changed.
fn normalize(stored: Vec<Category>, now: DateTime<Utc>) -> (Vec<Category>, bool) {
    let default_index = stored
        .iter()
        .position(|c| c.is_default && c.id == HOLIDAYS_CATEGORY_ID)
        .or_else(|| stored.iter().position(|c| c.is_default));

    let mut categories = Vec::with_capacity(stored.len() + 1);
    let mut repaired = false;
    if default_index.is_none() {
        categories.push(Category::seeded(
            HOLIDAYS_CATEGORY_ID,
            HOLIDAYS_CATEGORY_NAME,
            RESERVED_COLOR,
            true,
            now,
        ));
        repaired = true;
    }

    // The default claims its name and id before anything else does.
    let (default_name, default_id) = match default_index {
        Some(i) => (stored[i].name.to_lowercase(), stored[i].id.clone()),
        None => (HOLIDAYS_CATEGORY_NAME.to_lowercase(), HOLIDAYS_CATEGORY_ID.to_string()),
    };
    let mut names = HashSet::from([default_name]);
    let mut ids = HashSet::from([default_id]);

    for (i, mut category) in stored.into_iter().enumerate() {
        if Some(i) == default_index {
            categories.push(category);
            continue;
        }
        if !ids.insert(category.id.clone()) || !names.insert(category.name.to_lowercase()) {
            warn!(id = %category.id, name = %category.name, "dropping duplicate category");
            repaired = true;
            continue;
        }
        if category.is_default {
            category.is_default = false;
            repaired = true;
        }
        categories.push(category);
    }

    (categories, repaired)
}

/// Fields that `CategoryStore::update` may change.
#[derive(Debug, Clone, Default)]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub color: Option<String>,
    pub is_visible: Option<bool>,
}

/// Cached category set for one user.
///
/// Mutations persist the complete new set first and only replace the cache
/// when the write succeeded, so a failed write leaves the previous state.
pub struct CategoryStore<S> {
    store: Arc<S>,
    user_path: DocPath,
    categories: Vec<Category>,
    loaded: bool,
    changes: broadcast::Sender<Vec<Category>>,
}

impl<S: DocumentStore> CategoryStore<S> {
    pub fn new(store: Arc<S>, user_id: &str) -> DaybookResult<Self> {
        Ok(CategoryStore {
            store,
            user_path: DocPath::user(user_id)?,
            categories: Vec::new(),
            loaded: false,
            changes: broadcast::channel(CHANGE_CAPACITY).0,
        })
    }

    /// Read the category set, seeding the defaults when the user has none.
    pub async fn load(&mut self) -> DaybookResult<&[Category]> {
        let doc = self.store.get_document(&self.user_path).await?;
        let stored: Vec<Category> = match doc.as_ref().and_then(|d| d.get(CATEGORIES_FIELD)) {
            Some(value) => serde_json::from_value(value.clone())?,
            None => Vec::new(),
        };

        let categories = if stored.is_empty() {
            let seeded = default_categories(Utc::now());
            self.persist(&seeded).await?;
            info!(user = %self.user_path.id(), "seeded default categories");
            seeded
        } else {
            let (categories, repaired) = normalize(stored, Utc::now());
            if repaired {
                warn!(user = %self.user_path.id(), "stored category set was inconsistent, repairing it");
                self.persist(&categories).await?;
            }
            categories
        };

        self.commit(categories);
        Ok(&self.categories)
    }

    async fn ensure_loaded(&mut self) -> DaybookResult<()> {
        if !self.loaded {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn add(&mut self, name: &str, color: &str) -> DaybookResult<Category> {
        self.ensure_loaded().await?;

        let name = name.trim();
        if name.is_empty() {
            return Err(DaybookError::validation("Category name is required"));
        }
        if is_reserved_color(color) {
            return Err(DaybookError::validation(format!(
                "{} is reserved for {}",
                RESERVED_COLOR, HOLIDAYS_CATEGORY_NAME
            )));
        }
        if self.name_taken(name, None) {
            return Err(DaybookError::validation("Category with this name already exists"));
        }

        let category = Category {
            id: format!("cat_{}", uuid::Uuid::new_v4().simple()),
            name: name.to_string(),
            color: color.trim().to_string(),
            is_default: false,
            is_visible: true,
            created_at: Utc::now(),
        };

        let mut next = self.categories.clone();
        next.push(category.clone());
        self.persist(&next).await?;
        self.commit(next);

        info!(id = %category.id, name = %category.name, "added category");
        Ok(category)
    }

    pub async fn update(&mut self, category_id: &str, patch: CategoryPatch) -> DaybookResult<Category> {
        self.ensure_loaded().await?;
        let index = self.position(category_id)?;
        let current = &self.categories[index];

        if let Some(color) = &patch.color {
            if current.is_default && !color.trim().eq_ignore_ascii_case(&current.color) {
                return Err(DaybookError::validation(format!(
                    "Cannot change color of {} category",
                    HOLIDAYS_CATEGORY_NAME
                )));
            }
            if !current.is_default && is_reserved_color(color) {
                return Err(DaybookError::validation(format!(
                    "{} is reserved for {}",
                    RESERVED_COLOR, HOLIDAYS_CATEGORY_NAME
                )));
            }
        }

        let mut updated = current.clone();
        if let Some(name) = &patch.name {
            let name = name.trim();
            if name.is_empty() {
                return Err(DaybookError::validation("Category name is required"));
            }
            if self.name_taken(name, Some(category_id)) {
                return Err(DaybookError::validation("Category with this name already exists"));
            }
            updated.name = name.to_string();
        }
        if let Some(color) = patch.color {
            updated.color = color.trim().to_string();
        }
        if let Some(is_visible) = patch.is_visible {
            updated.is_visible = is_visible;
        }

        let mut next = self.categories.clone();
        next[index] = updated.clone();
        self.persist(&next).await?;
        self.commit(next);

        info!(id = %updated.id, "updated category");
        Ok(updated)
    }

    /// Remove a category. Events that reference it keep their snapshot of its
    /// name and color.
    pub async fn delete(&mut self, category_id: &str) -> DaybookResult<()> {
        self.ensure_loaded().await?;
        let index = self.position(category_id)?;
        if self.categories[index].is_default {
            return Err(DaybookError::ProtectedEntity(format!(
                "Cannot delete {} category",
                HOLIDAYS_CATEGORY_NAME
            )));
        }

        let mut next = self.categories.clone();
        next.remove(index);
        self.persist(&next).await?;
        self.commit(next);

        info!(id = %category_id, "deleted category");
        Ok(())
    }

    pub async fn toggle_visibility(&mut self, category_id: &str) -> DaybookResult<Category> {
        self.ensure_loaded().await?;
        let index = self.position(category_id)?;

        let mut next = self.categories.clone();
        next[index].is_visible = !next[index].is_visible;
        let toggled = next[index].clone();
        self.persist(&next).await?;
        self.commit(next);

        info!(id = %toggled.id, visible = toggled.is_visible, "toggled category visibility");
        Ok(toggled)
    }

    pub fn get_by_id(&self, category_id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == category_id)
    }

    pub fn list_all(&self) -> &[Category] {
        &self.categories
    }

    pub fn list_visible(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter().filter(|c| c.is_visible)
    }

    /// Receive the full category set after every committed change.
    pub fn subscribe(&self) -> broadcast::Receiver<Vec<Category>> {
        self.changes.subscribe()
    }

    fn position(&self, category_id: &str) -> DaybookResult<usize> {
        self.categories
            .iter()
            .position(|c| c.id == category_id)
            .ok_or_else(|| DaybookError::not_found("Category", category_id))
    }

    fn name_taken(&self, name: &str, except_id: Option<&str>) -> bool {
        self.categories
            .iter()
            .filter(|c| Some(c.id.as_str()) != except_id)
            .any(|c| c.name.to_lowercase() == name.to_lowercase())
    }

    async fn persist(&self, categories: &[Category]) -> DaybookResult<()> {
        let data = json!({ CATEGORIES_FIELD: categories });
        self.store.set_document(&self.user_path, data, true).await
    }

    fn commit(&mut self, categories: Vec<Category>) {
        let changed = self.loaded && self.categories != categories;
        self.categories = categories;
        self.loaded = true;
        if changed {
            let _ = self.changes.send(self.categories.clone());
        }
    }
}
