//! Built-in public holiday calendar.

use chrono::{NaiveDate, NaiveTime, Utc};
use serde_json::json;
use tracing::{debug, info};

use crate::category::{CategoryStore, HOLIDAYS_CATEGORY_ID};
use crate::error::DaybookResult;
use crate::event::{EventInput, EventStore};
use crate::store::{DocPath, DocumentStore};

pub const HOLIDAY_YEAR: i32 = 2026;

const IMPORTED_FIELD: &str = "holidaysImported";

/// Indian public holidays. Dates marked tentative depend on moon sighting.
const HOLIDAYS: [(u32, u32, &str, &str); 21] = [
    (1, 1, "New Year's Day", "First day of the year"),
    (1, 14, "Makar Sankranti / Pongal", "Harvest festival celebrated across India"),
    (1, 23, "Parakram Divas / Vasant Panchami", "Birth anniversary of Netaji Subhas Chandra Bose"),
    (1, 26, "Republic Day", "National holiday celebrating the Constitution of India"),
    (3, 4, "Holi", "Festival of colors"),
    (3, 21, "Eid-ul-Fitr", "Festival marking the end of Ramadan (Tentative)"),
    (3, 26, "Ram Navami", "Birth of Lord Rama"),
    (3, 31, "Mahavir Jayanti", "Birth anniversary of Lord Mahavir"),
    (4, 3, "Good Friday", "Crucifixion of Jesus Christ"),
    (4, 14, "Dr. Ambedkar Jayanti", "Birth anniversary of Dr. B.R. Ambedkar"),
    (5, 1, "Buddha Purnima", "Birth anniversary of Gautama Buddha"),
    (5, 27, "Eid al-Adha (Bakrid)", "Festival of sacrifice (Tentative)"),
    (6, 26, "Muharram", "Islamic New Year (Tentative)"),
    (8, 15, "Independence Day", "National holiday celebrating India's independence"),
    (8, 25, "Eid-e-Milad", "Birth of Prophet Muhammad (Tentative)"),
    (9, 4, "Janmashtami", "Birth of Lord Krishna"),
    (10, 2, "Gandhi Jayanti", "Birth anniversary of Mahatma Gandhi"),
    (10, 20, "Dussehra (Vijaya Dashami)", "Victory of good over evil"),
    (11, 8, "Diwali (Deepavali)", "Festival of lights"),
    (11, 24, "Guru Nanak Jayanti", "Birth anniversary of Guru Nanak Dev"),
    (12, 25, "Christmas", "Birth of Jesus Christ"),
];

#[derive(Debug, Clone, PartialEq)]
pub struct Holiday {
    pub date: NaiveDate,
    pub title: &'static str,
    pub description: &'static str,
}

pub fn holidays() -> Vec<Holiday> {
    HOLIDAYS
        .iter()
        .filter_map(|&(month, day, title, description)| {
            Some(Holiday {
                date: NaiveDate::from_ymd_opt(HOLIDAY_YEAR, month, day)?,
                title,
                description,
            })
        })
        .collect()
}

impl Holiday {
    /// All-day entry in the holidays category.
    pub fn to_input(&self) -> EventInput {
        let mut input = EventInput::new(
            self.title,
            self.date,
            NaiveTime::MIN,
            NaiveTime::from_hms_opt(23, 59, 0).unwrap_or(NaiveTime::MIN),
            HOLIDAYS_CATEGORY_ID,
        )
        .with_description(self.description);
        input.is_holiday = true;
        input
    }
}

/// Replace the user's holiday events with the built-in list.
///
/// Runs once per user unless `force` is set. Returns how many holidays were
/// written, 0 when the import was skipped.
pub async fn import_holidays<S: DocumentStore>(
    store: &S,
    user_id: &str,
    categories: &CategoryStore<S>,
    events: &EventStore<S>,
    force: bool,
) -> DaybookResult<usize> {
    let user_path = DocPath::user(user_id)?;
    let already = store
        .get_document(&user_path)
        .await?
        .and_then(|doc| doc.get(IMPORTED_FIELD).and_then(|v| v.as_bool()))
        .unwrap_or(false);
    if already && !force {
        debug!(user = %user_id, "holidays already imported");
        return Ok(0);
    }

    // Validate everything up front so a bad category leaves old holidays intact.
    let valid = holidays()
        .iter()
        .map(|h| events.validate(&h.to_input(), categories))
        .collect::<DaybookResult<Vec<_>>>()?;

    let stale: Vec<_> = events
        .list_all()
        .await?
        .into_iter()
        .filter(|e| e.is_holiday)
        .collect();
    for event in &stale {
        events.delete(&event.id).await?;
    }
    if !stale.is_empty() {
        info!(count = stale.len(), "removed old holiday entries");
    }

    let count = valid.len();
    for holiday in valid {
        events.insert(holiday).await?;
    }

    store
        .set_document(
            &user_path,
            json!({ IMPORTED_FIELD: true, "holidaysImportedAt": Utc::now() }),
            true,
        )
        .await?;

    info!(user = %user_id, count, "imported holidays");
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    async fn setup() -> (Arc<MemoryStore>, CategoryStore<MemoryStore>, EventStore<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let mut categories = CategoryStore::new(store.clone(), "alice").unwrap();
        categories.load().await.unwrap();
        let events = EventStore::new(store.clone(), "alice").unwrap();
        (store, categories, events)
    }

    #[test]
    fn test_holiday_list() {
        let list = holidays();
        assert_eq!(list.len(), 21);
        assert!(list.windows(2).all(|w| w[0].date < w[1].date));
        assert_eq!(list[3].title, "Republic Day");
        assert_eq!(list[3].date, NaiveDate::from_ymd_opt(2026, 1, 26).unwrap());
    }

    #[tokio::test]
    async fn test_import_creates_holiday_events() {
        let (store, categories, events) = setup().await;
        let count = import_holidays(store.as_ref(), "alice", &categories, &events, false)
            .await
            .unwrap();
        assert_eq!(count, 21);

        let all = events.list_all().await.unwrap();
        assert_eq!(all.len(), 21);
        let diwali = all.iter().find(|e| e.title.starts_with("Diwali")).unwrap();
        assert!(diwali.is_holiday);
        assert_eq!(diwali.category_id.as_deref(), Some(HOLIDAYS_CATEGORY_ID));
        assert_eq!(diwali.color.as_deref(), Some("#d50000"));
        assert_eq!(diwali.start_time, NaiveTime::MIN);
        assert_eq!(diwali.end_time.format("%H:%M").to_string(), "23:59");
    }

    #[tokio::test]
    async fn test_import_runs_once_unless_forced() {
        let (store, categories, events) = setup().await;
        import_holidays(store.as_ref(), "alice", &categories, &events, false)
            .await
            .unwrap();
        let skipped = import_holidays(store.as_ref(), "alice", &categories, &events, false)
            .await
            .unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(events.list_all().await.unwrap().len(), 21);

        let forced = import_holidays(store.as_ref(), "alice", &categories, &events, true)
            .await
            .unwrap();
        assert_eq!(forced, 21);
        assert_eq!(events.list_all().await.unwrap().len(), 21);
    }

    #[tokio::test]
    async fn test_forced_import_keeps_regular_events() {
        let (store, categories, events) = setup().await;
        let day = NaiveDate::from_ymd_opt(2026, 1, 26).unwrap();
        events
            .create(
                EventInput::new(
                    "Parade",
                    day,
                    NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                    NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
                    "cat_personal",
                ),
                &categories,
            )
            .await
            .unwrap();

        import_holidays(store.as_ref(), "alice", &categories, &events, true)
            .await
            .unwrap();
        let on_day = events.list_in_range(day, day).await.unwrap();
        assert_eq!(on_day.len(), 2);
        assert_eq!(on_day.iter().filter(|e| e.is_holiday).count(), 1);
    }
}
