//! Core of the daybook calendar.
//!
//! This crate provides everything except the terminal front end:
//! - `CategoryStore` and `EventStore` over a pluggable `DocumentStore`
//! - the month grid view model and category visibility toggling
//! - accounts, onboarding preferences, holidays and task scheduling

pub mod accounts;
pub mod category;
pub mod config;
pub mod error;
pub mod event;
pub mod holidays;
pub mod preferences;
pub mod schedule;
pub mod session;
pub mod store;
pub mod view;
pub mod visibility;

pub use accounts::{Accounts, UserRecord};
pub use category::{Category, CategoryPatch, CategoryStore};
pub use config::DaybookConfig;
pub use error::{DaybookError, DaybookResult};
pub use event::{Event, EventFeed, EventInput, EventStore};
pub use preferences::Preferences;
pub use schedule::{ProposedEvent, ScheduleRequest, Scheduler, Task};
pub use session::Session;
pub use store::{DocumentStore, FsStore, MemoryStore};
pub use view::{CalendarView, DayCell, MiniDay, MonthGrid};
pub use visibility::ViewSink;
