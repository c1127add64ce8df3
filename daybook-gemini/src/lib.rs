//! Gemini-backed task scheduling for daybook.
//!
//! Builds a planning prompt from a `ScheduleRequest`, sends it to the
//! `generateContent` endpoint and reads the proposed events back out of the
//! model's reply.

pub mod api;
pub mod prompt;
mod scheduler;

pub use scheduler::{DEFAULT_BASE_URL, DEFAULT_MODEL, GeminiScheduler};
