//! Calendar events and the per-user event store.
//!
//! Each event is its own document under `users/{userId}/events`. At write
//! time the event copies its category's name and color; later edits to the
//! category are not propagated to existing events.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};
use tracing::{debug, info, warn};

use crate::accounts;
use crate::category::CategoryStore;
use crate::error::{DaybookError, DaybookResult};
use crate::store::{DocPath, Document, DocumentStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Document id, not stored inside the document.
    #[serde(skip)]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    #[serde(with = "time_of_day")]
    pub start_time: NaiveTime,
    #[serde(with = "time_of_day")]
    pub end_time: NaiveTime,
    /// Absent on legacy events, which are always shown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_holiday: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub ai_generated: bool,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Event {
    pub fn from_document(doc: Document) -> DaybookResult<Self> {
        let mut event: Event = serde_json::from_value(doc.data)?;
        event.id = doc.id;
        Ok(event)
    }
}

/// `HH:MM` serialization for local times of day.
mod time_of_day {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let s = String::deserialize(deserializer)?;
        super::parse_time_of_day(&s).map_err(serde::de::Error::custom)
    }
}

/// Parse `HH:MM` (or `HH:MM:SS`) into a time of day.
pub fn parse_time_of_day(s: &str) -> DaybookResult<NaiveTime> {
    let s = s.trim();
    NaiveTime::parse_from_str(s, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M:%S"))
        .map_err(|_| DaybookError::validation(format!("Invalid time '{}'. Expected HH:MM", s)))
}

/// Drop seconds, since times are stored as `HH:MM`.
fn whole_minutes(time: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(time.hour(), time.minute(), 0).unwrap_or(time)
}

/// Parse `YYYY-MM-DD`.
pub fn parse_date(s: &str) -> DaybookResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| DaybookError::validation(format!("Invalid date '{}'. Expected YYYY-MM-DD", s)))
}

/// What a caller supplies to create or update an event.
#[derive(Debug, Clone, Default)]
pub struct EventInput {
    pub title: String,
    pub description: String,
    pub date: Option<NaiveDate>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub category_id: Option<String>,
    pub is_holiday: bool,
    pub ai_generated: bool,
}

impl EventInput {
    pub fn new(
        title: impl Into<String>,
        date: NaiveDate,
        start_time: NaiveTime,
        end_time: NaiveTime,
        category_id: impl Into<String>,
    ) -> Self {
        EventInput {
            title: title.into(),
            date: Some(date),
            start_time: Some(start_time),
            end_time: Some(end_time),
            category_id: Some(category_id.into()),
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// An input that passed validation, with the category snapshot taken.
#[derive(Debug, Clone)]
pub struct ValidEvent {
    title: String,
    description: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    category_id: String,
    category_name: String,
    color: String,
    is_holiday: bool,
    ai_generated: bool,
}

impl ValidEvent {
    fn into_event(self, id: String, created_at: DateTime<Utc>, updated_at: DateTime<Utc>) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            category_id: Some(self.category_id),
            category_name: Some(self.category_name),
            color: Some(self.color),
            is_holiday: self.is_holiday,
            ai_generated: self.ai_generated,
            created_at,
            updated_at,
        }
    }
}

pub struct EventStore<S> {
    store: Arc<S>,
    user_id: String,
    events_path: DocPath,
}

impl<S: DocumentStore> EventStore<S> {
    pub fn new(store: Arc<S>, user_id: &str) -> DaybookResult<Self> {
        Ok(EventStore {
            store,
            user_id: user_id.to_string(),
            events_path: DocPath::events(user_id)?,
        })
    }

    /// Check required fields, the time range and the category reference, and
    /// snapshot the category's current name and color.
    pub fn validate(
        &self,
        input: &EventInput,
        categories: &CategoryStore<S>,
    ) -> DaybookResult<ValidEvent> {
        let title = input.title.trim();
        let (Some(date), Some(start_time), Some(end_time)) =
            (input.date, input.start_time, input.end_time)
        else {
            return Err(DaybookError::validation("Please fill in all required fields"));
        };
        let (start_time, end_time) = (whole_minutes(start_time), whole_minutes(end_time));
        if title.is_empty() {
            return Err(DaybookError::validation("Please fill in all required fields"));
        }
        if start_time >= end_time {
            return Err(DaybookError::validation("End time must be after start time"));
        }

        let category_id = input
            .category_id
            .as_deref()
            .ok_or_else(|| DaybookError::validation("A category is required"))?;
        let category = categories.get_by_id(category_id).ok_or_else(|| {
            DaybookError::validation(format!("Unknown category '{}'", category_id))
        })?;

        Ok(ValidEvent {
            title: title.to_string(),
            description: input.description.trim().to_string(),
            date,
            start_time,
            end_time,
            category_id: category.id.clone(),
            category_name: category.name.clone(),
            color: category.color.clone(),
            is_holiday: input.is_holiday,
            ai_generated: input.ai_generated,
        })
    }

    pub async fn create(
        &self,
        input: EventInput,
        categories: &CategoryStore<S>,
    ) -> DaybookResult<Event> {
        let valid = self.validate(&input, categories)?;
        self.insert(valid).await
    }

    /// Write an already validated event. A failed write is retried once, and
    /// only when the parent user record turned out to be missing.
    pub async fn insert(&self, valid: ValidEvent) -> DaybookResult<Event> {
        let now = Utc::now();
        let id = uuid::Uuid::new_v4().simple().to_string();
        let event = valid.into_event(id, now, now);
        let path = self.events_path.child(&event.id)?;
        let data = serde_json::to_value(&event)?;

        match self.store.set_document(&path, data.clone(), false).await {
            Ok(()) => {}
            Err(err) if err.is_store_failure() => {
                if !accounts::restore_missing_user_record(self.store.as_ref(), &self.user_id).await? {
                    return Err(err);
                }
                warn!(error = %err, "retrying event write after recreating the user record");
                self.store.set_document(&path, data, false).await?;
            }
            Err(err) => return Err(err),
        }

        info!(id = %event.id, date = %event.date, title = %event.title, "created event");
        Ok(event)
    }

    /// Replace an event's fields, taking a fresh snapshot of the category.
    pub async fn update(
        &self,
        event_id: &str,
        input: EventInput,
        categories: &CategoryStore<S>,
    ) -> DaybookResult<Event> {
        let existing = self
            .get(event_id)
            .await?
            .ok_or_else(|| DaybookError::not_found("Event", event_id))?;
        let mut valid = self.validate(&input, categories)?;
        valid.is_holiday |= existing.is_holiday;
        valid.ai_generated |= existing.ai_generated;

        let event = valid.into_event(existing.id, existing.created_at, Utc::now());
        let path = self.events_path.child(&event.id)?;
        self.store
            .update_document(&path, serde_json::to_value(&event)?)
            .await?;

        info!(id = %event.id, "updated event");
        Ok(event)
    }

    pub async fn delete(&self, event_id: &str) -> DaybookResult<()> {
        let path = self.events_path.child(event_id)?;
        if self.store.get_document(&path).await?.is_none() {
            return Err(DaybookError::not_found("Event", event_id));
        }
        self.store.delete_document(&path).await?;
        info!(id = %event_id, "deleted event");
        Ok(())
    }

    pub async fn get(&self, event_id: &str) -> DaybookResult<Option<Event>> {
        let path = self.events_path.child(event_id)?;
        match self.store.get_document(&path).await? {
            Some(data) => Ok(Some(Event::from_document(Document {
                id: event_id.to_string(),
                data,
            })?)),
            None => Ok(None),
        }
    }

    /// Every event of the user, ordered by date and start time.
    pub async fn list_all(&self) -> DaybookResult<Vec<Event>> {
        let docs = self.store.list_collection(&self.events_path).await?;
        Ok(decode_events(docs))
    }

    /// Events dated within `[start, end]`, regardless of category visibility.
    pub async fn list_in_range(&self, start: NaiveDate, end: NaiveDate) -> DaybookResult<Vec<Event>> {
        let events = self.list_all().await?;
        Ok(events
            .into_iter()
            .filter(|e| e.date >= start && e.date <= end)
            .collect())
    }

    /// Follow the event collection. Every item is the complete current list.
    pub fn subscribe(&self) -> EventFeed {
        EventFeed {
            rx: self.store.subscribe_collection(&self.events_path),
        }
    }
}

fn decode_events(docs: Vec<Document>) -> Vec<Event> {
    let mut events: Vec<Event> = docs
        .into_iter()
        .filter_map(|doc| {
            let id = doc.id.clone();
            Event::from_document(doc)
                .inspect_err(|e| warn!(id = %id, error = %e, "skipping malformed event"))
                .ok()
        })
        .collect();
    events.sort_by(|a, b| {
        (a.date, a.start_time, &a.title).cmp(&(b.date, b.start_time, &b.title))
    });
    events
}

/// Stream of full event snapshots.
///
/// Snapshots are authoritative: a consumer replaces its list with each one.
/// When several arrive before the consumer gets to them only the newest is
/// returned.
pub struct EventFeed {
    rx: broadcast::Receiver<Vec<Document>>,
}

impl EventFeed {
    /// Wait for the next snapshot. `None` once the store is gone.
    pub async fn next(&mut self) -> Option<Vec<Event>> {
        let mut latest = loop {
            match self.rx.recv().await {
                Ok(docs) => break docs,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(skipped, "event feed lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        };
        loop {
            match self.rx.try_recv() {
                Ok(newer) => latest = newer,
                Err(TryRecvError::Lagged(_)) => continue,
                Err(_) => break,
            }
        }
        Some(decode_events(latest))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::{CategoryPatch, HOLIDAYS_CATEGORY_ID};
    use crate::store::MemoryStore;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    async fn setup() -> (Arc<MemoryStore>, CategoryStore<MemoryStore>, EventStore<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut categories = CategoryStore::new(store.clone(), "alice").unwrap();
        categories.load().await.unwrap();
        let events = EventStore::new(store.clone(), "alice").unwrap();
        (store, categories, events)
    }

    fn standup() -> EventInput {
        EventInput::new("Standup", date(2026, 2, 10), time(9, 0), time(9, 30), "cat_work")
            .with_description("daily sync")
    }

    #[tokio::test]
    async fn test_create_snapshots_category() {
        let (_, categories, events) = setup().await;
        let event = events.create(standup(), &categories).await.unwrap();

        assert!(!event.id.is_empty());
        assert_eq!(event.category_id.as_deref(), Some("cat_work"));
        assert_eq!(event.category_name.as_deref(), Some("Work"));
        assert_eq!(event.color.as_deref(), Some("#33b679"));
        assert_eq!(event.created_at, event.updated_at);

        let stored = events.get(&event.id).await.unwrap().unwrap();
        assert_eq!(stored, event);
    }

    #[tokio::test]
    async fn test_snapshot_survives_category_edit() {
        let (_, mut categories, events) = setup().await;
        let event = events.create(standup(), &categories).await.unwrap();

        categories
            .update(
                "cat_work",
                CategoryPatch {
                    name: Some("Office".into()),
                    color: Some("#000000".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let stored = events.get(&event.id).await.unwrap().unwrap();
        assert_eq!(stored.category_name.as_deref(), Some("Work"));
        assert_eq!(stored.color.as_deref(), Some("#33b679"));
    }

    #[tokio::test]
    async fn test_snapshot_survives_category_delete() {
        let (_, mut categories, events) = setup().await;
        let mut input = standup();
        input.category_id = Some("cat_other".into());
        let event = events.create(input, &categories).await.unwrap();

        categories.delete("cat_other").await.unwrap();

        let stored = events.get(&event.id).await.unwrap().unwrap();
        assert_eq!(stored.category_id.as_deref(), Some("cat_other"));
        assert_eq!(stored.category_name.as_deref(), Some("Other"));
    }

    #[tokio::test]
    async fn test_update_takes_fresh_snapshot() {
        let (_, mut categories, events) = setup().await;
        let event = events.create(standup(), &categories).await.unwrap();

        categories
            .update(
                "cat_work",
                CategoryPatch {
                    color: Some("#111111".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let mut input = standup();
        input.title = "Standup (moved)".into();
        input.start_time = Some(time(10, 0));
        input.end_time = Some(time(10, 15));
        let updated = events.update(&event.id, input, &categories).await.unwrap();

        assert_eq!(updated.id, event.id);
        assert_eq!(updated.color.as_deref(), Some("#111111"));
        assert_eq!(updated.created_at, event.created_at);
        assert_eq!(events.get(&event.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_validation_failures() {
        let (_, categories, events) = setup().await;

        let mut inverted = standup();
        inverted.end_time = Some(time(8, 0));
        let err = events.create(inverted, &categories).await.unwrap_err();
        assert!(matches!(err, DaybookError::Validation(ref m) if m.contains("after start")));

        let mut same = standup();
        same.end_time = same.start_time;
        assert!(events.create(same, &categories).await.is_err());

        let mut untitled = standup();
        untitled.title = "  ".into();
        assert!(events.create(untitled, &categories).await.is_err());

        let mut undated = standup();
        undated.date = None;
        assert!(events.create(undated, &categories).await.is_err());

        let mut unknown = standup();
        unknown.category_id = Some("cat_missing".into());
        assert!(matches!(
            events.create(unknown, &categories).await.unwrap_err(),
            DaybookError::Validation(_)
        ));

        assert!(events.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_and_delete_unknown_event() {
        let (_, categories, events) = setup().await;
        let err = events.update("nope", standup(), &categories).await.unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
        let err = events.delete("nope").await.unwrap_err();
        assert!(matches!(err, DaybookError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_delete_removes_event() {
        let (_, categories, events) = setup().await;
        let event = events.create(standup(), &categories).await.unwrap();
        events.delete(&event.id).await.unwrap();
        assert!(events.get(&event.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_in_range_is_inclusive_and_ignores_visibility() {
        let (_, mut categories, events) = setup().await;
        for day in [9, 10, 14, 15] {
            let mut input = standup();
            input.date = Some(date(2026, 2, day));
            events.create(input, &categories).await.unwrap();
        }
        categories.toggle_visibility("cat_work").await.unwrap();

        let in_range = events
            .list_in_range(date(2026, 2, 10), date(2026, 2, 14))
            .await
            .unwrap();
        let days: Vec<_> = in_range.iter().map(|e| e.date).collect();
        assert_eq!(days, vec![date(2026, 2, 10), date(2026, 2, 14)]);
    }

    #[tokio::test]
    async fn test_legacy_documents_decode() {
        let (store, _, events) = setup().await;
        let path = DocPath::event("alice", "legacy").unwrap();
        store
            .set_document(
                &path,
                json!({
                    "title": "Old event",
                    "date": "2026-02-10",
                    "startTime": "09:00",
                    "endTime": "10:00"
                }),
                false,
            )
            .await
            .unwrap();
        store
            .set_document(&DocPath::event("alice", "junk").unwrap(), json!({"x": 1}), false)
            .await
            .unwrap();

        let all = events.list_all().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id, "legacy");
        assert!(all[0].category_id.is_none());
    }

    #[tokio::test]
    async fn test_feed_delivers_full_snapshots() {
        let (_, categories, events) = setup().await;
        let mut feed = events.subscribe();

        let first = events.create(standup(), &categories).await.unwrap();
        let snapshot = feed.next().await.unwrap();
        assert_eq!(snapshot, vec![first.clone()]);

        events.delete(&first.id).await.unwrap();
        assert!(feed.next().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_feed_skips_to_latest_snapshot() {
        let (_, categories, events) = setup().await;
        let mut feed = events.subscribe();
        for _ in 0..3 {
            events.create(standup(), &categories).await.unwrap();
        }
        assert_eq!(feed.next().await.unwrap().len(), 3);
    }

    /// Rejects event writes while `users/alice` is absent, and fails a set
    /// number of further event writes with an IO error.
    struct FlakyStore {
        inner: MemoryStore,
        failures_left: AtomicUsize,
    }

    impl DocumentStore for FlakyStore {
        async fn get_document(&self, path: &DocPath) -> DaybookResult<Option<Value>> {
            self.inner.get_document(path).await
        }

        async fn set_document(&self, path: &DocPath, data: Value, merge: bool) -> DaybookResult<()> {
            if path.as_str().contains("/events/") {
                let user = DocPath::user("alice")?;
                if self.inner.get_document(&user).await?.is_none() {
                    return Err(DaybookError::RemoteUnavailable("parent missing".into()));
                }
                if self
                    .failures_left
                    .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                    .is_ok()
                {
                    return Err(DaybookError::Io(std::io::Error::other("disk full")));
                }
            }
            self.inner.set_document(path, data, merge).await
        }

        async fn update_document(&self, path: &DocPath, partial: Value) -> DaybookResult<()> {
            self.inner.update_document(path, partial).await
        }

        async fn delete_document(&self, path: &DocPath) -> DaybookResult<()> {
            self.inner.delete_document(path).await
        }

        async fn list_collection(&self, path: &DocPath) -> DaybookResult<Vec<Document>> {
            self.inner.list_collection(path).await
        }

        fn subscribe_collection(&self, path: &DocPath) -> broadcast::Receiver<Vec<Document>> {
            self.inner.subscribe_collection(path)
        }
    }

    async fn flaky_setup(
        failures: usize,
        drop_user_record: bool,
    ) -> (Arc<FlakyStore>, CategoryStore<FlakyStore>, EventStore<FlakyStore>) {
        let store = Arc::new(FlakyStore {
            inner: MemoryStore::new(),
            failures_left: AtomicUsize::new(failures),
        });
        let mut categories = CategoryStore::new(store.clone(), "alice").unwrap();
        categories.load().await.unwrap();
        if drop_user_record {
            store
                .delete_document(&DocPath::user("alice").unwrap())
                .await
                .unwrap();
        }
        let events = EventStore::new(store.clone(), "alice").unwrap();
        (store, categories, events)
    }

    #[tokio::test]
    async fn test_create_retries_once_when_user_record_missing() {
        let (store, categories, events) = flaky_setup(0, true).await;
        let event = events.create(standup(), &categories).await.unwrap();

        assert!(events.get(&event.id).await.unwrap().is_some());
        let user = store
            .get_document(&DocPath::user("alice").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user["username"], "alice");
    }

    #[tokio::test]
    async fn test_create_does_not_retry_unrelated_failure() {
        let (store, categories, events) = flaky_setup(1, false).await;
        let user_path = DocPath::user("alice").unwrap();
        let before = store.get_document(&user_path).await.unwrap();

        let err = events.create(standup(), &categories).await.unwrap_err();
        assert!(matches!(err, DaybookError::Io(_)));
        assert_eq!(store.get_document(&user_path).await.unwrap(), before);
        assert!(events.list_all().await.unwrap().is_empty());

        // The single failure was not spent on a hidden retry.
        events.create(standup(), &categories).await.unwrap();
        assert_eq!(events.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_create_gives_up_after_second_failure() {
        let (_, categories, events) = flaky_setup(1, true).await;
        let err = events.create(standup(), &categories).await.unwrap_err();
        assert!(matches!(err, DaybookError::Io(_)));
        assert!(events.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_times_are_stored_to_the_minute() {
        let (_, categories, events) = setup().await;
        let mut input = standup();
        input.start_time = NaiveTime::from_hms_opt(9, 0, 10);
        input.end_time = NaiveTime::from_hms_opt(9, 45, 50);

        let event = events.create(input, &categories).await.unwrap();
        assert_eq!(event.start_time, time(9, 0));
        assert_eq!(event.end_time, time(9, 45));
        assert_eq!(events.get(&event.id).await.unwrap().unwrap(), event);

        let mut same_minute = standup();
        same_minute.start_time = NaiveTime::from_hms_opt(9, 0, 10);
        same_minute.end_time = NaiveTime::from_hms_opt(9, 0, 50);
        let err = events.create(same_minute, &categories).await.unwrap_err();
        assert!(matches!(err, DaybookError::Validation(ref m) if m.contains("after start")));
        assert_eq!(events.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_holiday_flag_is_kept_on_update() {
        let (_, categories, events) = setup().await;
        let mut input = EventInput::new(
            "Republic Day",
            date(2026, 1, 26),
            time(0, 0),
            time(23, 59),
            HOLIDAYS_CATEGORY_ID,
        );
        input.is_holiday = true;
        let holiday = events.create(input, &categories).await.unwrap();

        let edit = EventInput::new(
            "Republic Day",
            date(2026, 1, 26),
            time(0, 0),
            time(23, 59),
            HOLIDAYS_CATEGORY_ID,
        );
        let updated = events.update(&holiday.id, edit, &categories).await.unwrap();
        assert!(updated.is_holiday);
    }

    #[test]
    fn test_parse_time_of_day() {
        assert_eq!(parse_time_of_day("09:30").unwrap(), time(9, 30));
        assert_eq!(parse_time_of_day(" 7:05 ").unwrap(), time(7, 5));
        assert_eq!(parse_time_of_day("23:59:00").unwrap(), time(23, 59));
        assert!(parse_time_of_day("25:00").is_err());
        assert!(parse_time_of_day("noon").is_err());
    }

    #[test]
    fn test_event_document_shape() {
        let event = Event {
            id: "abc".into(),
            title: "Standup".into(),
            description: String::new(),
            date: date(2026, 2, 10),
            start_time: time(9, 0),
            end_time: time(9, 30),
            category_id: Some("cat_work".into()),
            category_name: Some("Work".into()),
            color: Some("#33b679".into()),
            is_holiday: false,
            ai_generated: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["date"], "2026-02-10");
        assert_eq!(value["startTime"], "09:00");
        assert_eq!(value["categoryName"], "Work");
        assert_eq!(value["aiGenerated"], true);
        assert!(value.get("id").is_none());
        assert!(value.get("isHoliday").is_none());
    }
}
