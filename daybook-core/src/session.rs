//! A signed-in user's calendar session.
//!
//! Owns the category and event stores for one user together with the view
//! state, and keeps the month grid in step with every change made through it.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::accounts::Accounts;
use crate::category::{Category, CategoryPatch, CategoryStore};
use crate::error::{DaybookError, DaybookResult};
use crate::event::{Event, EventFeed, EventInput, EventStore, parse_date, parse_time_of_day};
use crate::holidays;
use crate::preferences::{PreferenceStore, Preferences};
use crate::schedule::{self, ExistingEvent, ScheduleRequest, Scheduler, Task};
use crate::store::DocumentStore;
use crate::view::{CalendarView, MiniDay, MonthGrid};
use crate::visibility::{self, ViewSink};

pub struct Session<S> {
    store: Arc<S>,
    user_id: String,
    categories: CategoryStore<S>,
    events: EventStore<S>,
    preferences: PreferenceStore<S>,
    view: CalendarView,
    today: NaiveDate,
}

impl<S: DocumentStore> Session<S> {
    /// Open the session for `user`. Fails with `NotFound` when nobody is
    /// signed in or the user record does not exist.
    pub async fn open(store: Arc<S>, user: Option<&str>, today: NaiveDate) -> DaybookResult<Self> {
        let user_id = user.ok_or_else(|| DaybookError::not_found("User", "(not signed in)"))?;
        Accounts::new(store.clone())
            .find(user_id)
            .await?
            .ok_or_else(|| DaybookError::not_found("User", user_id))?;

        let mut categories = CategoryStore::new(store.clone(), user_id)?;
        categories.load().await?;

        let mut session = Session {
            events: EventStore::new(store.clone(), user_id)?,
            preferences: PreferenceStore::new(store.clone(), user_id)?,
            store,
            user_id: user_id.to_string(),
            categories,
            view: CalendarView::new(today),
            today,
        };
        session.refresh().await?;
        debug!(user = %session.user_id, "opened session");
        Ok(session)
    }

    pub fn categories(&self) -> &[Category] {
        self.categories.list_all()
    }

    pub fn event_store(&self) -> &EventStore<S> {
        &self.events
    }

    pub fn view(&self) -> &CalendarView {
        &self.view
    }

    /// Follow the event collection. Feed each snapshot to `apply_snapshot`.
    pub fn subscribe_events(&self) -> EventFeed {
        self.events.subscribe()
    }

    /// Grid for the displayed month, rebuilt from the cached events.
    pub fn grid(&mut self) -> &MonthGrid {
        self.recompute()
    }

    pub fn mini_month(&self) -> Vec<MiniDay> {
        self.view.mini_month(self.today)
    }

    fn recompute(&mut self) -> &MonthGrid {
        self.view.recompute(self.today, self.categories.list_all())
    }

    /// Re-read every event and rebuild the grid.
    pub async fn refresh(&mut self) -> DaybookResult<&MonthGrid> {
        let events = self.events.list_all().await?;
        Ok(self.apply_snapshot(events))
    }

    /// Replace the cached events with a snapshot from the event feed.
    pub fn apply_snapshot(&mut self, events: Vec<Event>) -> &MonthGrid {
        self.view.replace_events(events);
        self.recompute()
    }

    pub fn navigate(&mut self, months: i32) -> &MonthGrid {
        self.view.navigate(months);
        self.recompute()
    }

    pub fn go_to_today(&mut self) -> &MonthGrid {
        self.view.go_to_today(self.today);
        self.recompute()
    }

    pub fn show_month_of(&mut self, date: NaiveDate) -> &MonthGrid {
        self.view.show_month_of(date);
        self.view.select(date);
        self.recompute()
    }

    pub async fn toggle_visibility<V: ViewSink + ?Sized>(
        &mut self,
        category_id: &str,
        sink: &mut V,
    ) -> DaybookResult<Category> {
        visibility::toggle(&mut self.categories, &mut self.view, self.today, sink, category_id).await
    }

    pub async fn add_category(&mut self, name: &str, color: &str) -> DaybookResult<Category> {
        let category = self.categories.add(name, color).await?;
        self.recompute();
        Ok(category)
    }

    pub async fn update_category(&mut self, category_id: &str, patch: CategoryPatch) -> DaybookResult<Category> {
        let category = self.categories.update(category_id, patch).await?;
        self.recompute();
        Ok(category)
    }

    pub async fn delete_category(&mut self, category_id: &str) -> DaybookResult<()> {
        self.categories.delete(category_id).await?;
        self.recompute();
        Ok(())
    }

    pub async fn create_event(&mut self, input: EventInput) -> DaybookResult<Event> {
        let event = self.events.create(input, &self.categories).await?;
        self.refresh().await?;
        Ok(event)
    }

    pub async fn update_event(&mut self, event_id: &str, input: EventInput) -> DaybookResult<Event> {
        let event = self.events.update(event_id, input, &self.categories).await?;
        self.refresh().await?;
        Ok(event)
    }

    pub async fn delete_event(&mut self, event_id: &str) -> DaybookResult<()> {
        self.events.delete(event_id).await?;
        self.refresh().await?;
        Ok(())
    }

    pub async fn import_holidays(&mut self, force: bool) -> DaybookResult<usize> {
        let count = holidays::import_holidays(
            self.store.as_ref(),
            &self.user_id,
            &self.categories,
            &self.events,
            force,
        )
        .await?;
        if count > 0 {
            self.refresh().await?;
        }
        Ok(count)
    }

    pub async fn needs_onboarding(&self) -> DaybookResult<bool> {
        self.preferences.needs_onboarding().await
    }

    pub async fn load_preferences(&self) -> DaybookResult<Option<Preferences>> {
        self.preferences.load().await
    }

    pub async fn save_preferences(&self, preferences: &Preferences) -> DaybookResult<()> {
        self.preferences.save(preferences).await
    }

    pub async fn skip_onboarding(&self) -> DaybookResult<()> {
        self.preferences.skip().await
    }

    /// Ask `scheduler` to place `tasks` between `start` and `end` and write
    /// the proposals as events.
    ///
    /// Every proposal is checked before the first one is written, so a bad
    /// reply adds nothing to the calendar.
    pub async fn plan<P: Scheduler>(
        &mut self,
        tasks: Vec<Task>,
        start: NaiveDate,
        end: NaiveDate,
        scheduler: &P,
    ) -> DaybookResult<Vec<Event>> {
        schedule::validate_request(&tasks, start, end)?;

        let existing_events = self
            .events
            .list_in_range(start, end)
            .await?
            .iter()
            .map(ExistingEvent::from)
            .collect();
        let request = ScheduleRequest {
            tasks,
            start_date: start,
            end_date: end,
            preferences: self.preferences.load().await?,
            existing_events,
        };

        let proposals = scheduler.schedule(&request).await?;
        info!(count = proposals.len(), "scheduler proposed events");

        let mut valid = Vec::with_capacity(proposals.len());
        for proposal in &proposals {
            let task = schedule::match_task(proposal, &request.tasks)
                .ok_or_else(|| DaybookError::Scheduler("No task to attach the proposal to".into()))?;
            let invalid = |e: DaybookError| {
                DaybookError::Scheduler(format!("Proposed event '{}' is invalid: {}", proposal.title, e))
            };
            let mut input = EventInput::new(
                &proposal.title,
                parse_date(&proposal.date).map_err(invalid)?,
                parse_time_of_day(&proposal.start_time).map_err(invalid)?,
                parse_time_of_day(&proposal.end_time).map_err(invalid)?,
                &task.category_id,
            )
            .with_description(&proposal.description);
            input.ai_generated = true;
            valid.push(self.events.validate(&input, &self.categories).map_err(invalid)?);
        }

        let mut created = Vec::with_capacity(valid.len());
        for event in valid {
            created.push(self.events.insert(event).await?);
        }
        if !created.is_empty() {
            self.refresh().await?;
        }
        info!(count = created.len(), "added planned events");
        Ok(created)
    }
}
