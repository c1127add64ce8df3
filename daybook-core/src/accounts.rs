//! Username-only accounts.
//!
//! There are no passwords: signing in only checks that the user record
//! exists. Signing up creates the record together with the default category
//! set.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::category::{CATEGORIES_FIELD, default_categories};
use crate::error::{DaybookError, DaybookResult};
use crate::store::{DocPath, DocumentStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub username: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

pub struct Accounts<S> {
    store: Arc<S>,
}

impl<S: DocumentStore> Accounts<S> {
    pub fn new(store: Arc<S>) -> Self {
        Accounts { store }
    }

    pub async fn sign_up(&self, username: &str) -> DaybookResult<UserRecord> {
        let username = validate_username(username)?;
        let path = DocPath::user(username)?;
        if self.store.get_document(&path).await?.is_some() {
            return Err(DaybookError::validation(
                "Username already exists. Please choose a different one or sign in.",
            ));
        }

        let now = Utc::now();
        let record = UserRecord {
            username: username.to_string(),
            created_at: now,
        };
        let mut data = serde_json::to_value(&record)?;
        data[CATEGORIES_FIELD] = serde_json::to_value(default_categories(now))?;
        self.store.set_document(&path, data, false).await?;

        info!(user = %username, "created account");
        Ok(record)
    }

    pub async fn sign_in(&self, username: &str) -> DaybookResult<UserRecord> {
        let username = validate_username(username)?;
        self.find(username)
            .await?
            .ok_or_else(|| DaybookError::not_found("User", username))
    }

    pub async fn find(&self, username: &str) -> DaybookResult<Option<UserRecord>> {
        let path = DocPath::user(username)?;
        let Some(mut data) = self.store.get_document(&path).await? else {
            return Ok(None);
        };
        if data.get("username").is_none() {
            data["username"] = json!(username);
        }
        Ok(Some(serde_json::from_value(data)?))
    }
}

/// Usernames are non-empty and limited to ASCII letters, digits and `_`.
pub fn validate_username(username: &str) -> DaybookResult<&str> {
    let username = username.trim();
    if username.is_empty() {
        return Err(DaybookError::validation("Please enter a username"));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(DaybookError::validation(
            "Username can only contain letters, numbers, and underscores",
        ));
    }
    Ok(username)
}

/// Recreate `users/{userId}` if it is missing. Returns whether it was.
pub(crate) async fn restore_missing_user_record<S: DocumentStore>(
    store: &S,
    user_id: &str,
) -> DaybookResult<bool> {
    let path = DocPath::user(user_id)?;
    if store.get_document(&path).await?.is_some() {
        return Ok(false);
    }

    warn!(user = %user_id, "user record missing, recreating it");
    let record = UserRecord {
        username: user_id.to_string(),
        created_at: Utc::now(),
    };
    store
        .set_document(&path, serde_json::to_value(record)?, false)
        .await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{Category, HOLIDAYS_CATEGORY_ID};
    use crate::store::MemoryStore;

    #[test]
    fn test_validate_username() {
        assert_eq!(validate_username(" alice_01 ").unwrap(), "alice_01");
        assert!(validate_username("").is_err());
        assert!(validate_username("al ice").is_err());
        assert!(validate_username("alice!").is_err());
        assert!(validate_username("../etc").is_err());
        assert!(validate_username("élise").is_err());
    }

    #[tokio::test]
    async fn test_sign_up_seeds_categories() {
        let store = Arc::new(MemoryStore::new());
        let accounts = Accounts::new(store.clone());
        let record = accounts.sign_up("alice").await.unwrap();
        assert_eq!(record.username, "alice");

        let doc = store
            .get_document(&DocPath::user("alice").unwrap())
            .await
            .unwrap()
            .unwrap();
        let categories: Vec<Category> =
            serde_json::from_value(doc[CATEGORIES_FIELD].clone()).unwrap();
        assert_eq!(categories.len(), 4);
        assert_eq!(categories[0].id, HOLIDAYS_CATEGORY_ID);
    }

    #[tokio::test]
    async fn test_sign_up_twice_fails() {
        let accounts = Accounts::new(Arc::new(MemoryStore::new()));
        accounts.sign_up("alice").await.unwrap();
        let err = accounts.sign_up("alice").await.unwrap_err();
        assert!(matches!(err, DaybookError::Validation(_)));
    }

    #[tokio::test]
    async fn test_sign_in_requires_existing_user() {
        let accounts = Accounts::new(Arc::new(MemoryStore::new()));
        let err = accounts.sign_in("bob").await.unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));

        accounts.sign_up("bob").await.unwrap();
        assert_eq!(accounts.sign_in("bob").await.unwrap().username, "bob");
    }

    #[tokio::test]
    async fn test_restore_recreates_only_missing_record() {
        let store = MemoryStore::new();
        assert!(restore_missing_user_record(&store, "carol").await.unwrap());
        let doc = store
            .get_document(&DocPath::user("carol").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc["username"], "carol");

        assert!(!restore_missing_user_record(&store, "carol").await.unwrap());
        let again = store
            .get_document(&DocPath::user("carol").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(again, doc);
    }
}
