//! Task scheduling.
//!
//! A [`Scheduler`] turns a list of tasks into proposed events. The core only
//! validates the request, attaches categories to the proposals and writes
//! them through the event store.

use std::fmt;
use std::future::Future;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{DaybookError, DaybookResult};
use crate::event::Event;
use crate::preferences::Preferences;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    /// Spread work before the deadline.
    Deadline,
    /// Same slot every day.
    Daily,
    /// Only on the deadline date.
    Oneday,
}

impl TaskType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Deadline => "deadline",
            TaskType::Daily => "daily",
            TaskType::Oneday => "oneday",
        }
    }

    pub fn needs_deadline(&self) -> bool {
        !matches!(self, TaskType::Daily)
    }
}

impl fmt::Display for TaskType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for TaskType {
    type Err = DaybookError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "deadline" => Ok(TaskType::Deadline),
            "daily" => Ok(TaskType::Daily),
            "oneday" | "one-day" => Ok(TaskType::Oneday),
            other => Err(DaybookError::validation(format!(
                "Unknown task type '{}'. Expected deadline, daily or oneday",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Flexibility {
    #[default]
    Flexible,
    Fixed,
}

impl Flexibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Flexibility::Flexible => "flexible",
            Flexibility::Fixed => "fixed",
        }
    }
}

impl fmt::Display for Flexibility {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub name: String,
    pub duration_hours: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline: Option<NaiveDate>,
    pub task_type: TaskType,
    #[serde(default)]
    pub flexibility: Flexibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_time: Option<String>,
    pub category_id: String,
    pub category_name: String,
    pub category_color: String,
}

impl Task {
    pub fn validate(&self) -> DaybookResult<()> {
        if self.name.trim().is_empty() {
            return Err(DaybookError::validation("Task name is required"));
        }
        if self.duration_hours.is_nan() || self.duration_hours <= 0.0 {
            return Err(DaybookError::validation(format!(
                "Task '{}' needs a positive duration",
                self.name
            )));
        }
        if self.task_type.needs_deadline() && self.deadline.is_none() {
            return Err(DaybookError::validation(format!(
                "Task '{}' needs a {}",
                self.name,
                if self.task_type == TaskType::Oneday { "date" } else { "deadline" }
            )));
        }
        Ok(())
    }
}

/// Already booked time the scheduler must avoid.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExistingEvent {
    pub title: String,
    pub date: NaiveDate,
    #[serde(serialize_with = "hh_mm")]
    pub start_time: NaiveTime,
    #[serde(serialize_with = "hh_mm")]
    pub end_time: NaiveTime,
}

fn hh_mm<S: serde::Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&time.format("%H:%M").to_string())
}

impl From<&Event> for ExistingEvent {
    fn from(event: &Event) -> Self {
        ExistingEvent {
            title: event.title.clone(),
            date: event.date,
            start_time: event.start_time,
            end_time: event.end_time,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleRequest {
    pub tasks: Vec<Task>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub preferences: Option<Preferences>,
    pub existing_events: Vec<ExistingEvent>,
}

/// One event suggested by a scheduler. Times stay as text until the event
/// store validates them.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposedEvent {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub task_id: Option<String>,
}

/// Models reply with ids as either strings or numbers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

pub trait Scheduler: Send + Sync {
    fn schedule(
        &self,
        request: &ScheduleRequest,
    ) -> impl Future<Output = DaybookResult<Vec<ProposedEvent>>> + Send;
}

pub fn validate_request(tasks: &[Task], start: NaiveDate, end: NaiveDate) -> DaybookResult<()> {
    if tasks.is_empty() {
        return Err(DaybookError::validation(
            "Please add at least one task to generate a schedule.",
        ));
    }
    if end < start {
        return Err(DaybookError::validation("End date must be after start date."));
    }
    tasks.iter().try_for_each(Task::validate)
}

/// Pick the task a proposal belongs to: by id, then by the title text before
/// the first `-` appearing in the task name, then the first task.
pub fn match_task<'a>(proposal: &ProposedEvent, tasks: &'a [Task]) -> Option<&'a Task> {
    let prefix = proposal.title.split('-').next().unwrap_or("").trim();
    tasks
        .iter()
        .find(|t| proposal.task_id.as_deref() == Some(t.id.as_str()))
        .or_else(|| {
            tasks
                .iter()
                .find(|t| !prefix.is_empty() && t.name.contains(prefix))
        })
        .or_else(|| tasks.first())
}
