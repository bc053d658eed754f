//! The daily engine: one run-to-completion pass through generation →
//! recovery → pool merge → persistence → best-effort publish.

pub mod engine;
pub mod prompts;
pub mod render;
pub mod runstate;

pub use engine::{DailyEngine, RunSummary};
pub use runstate::RunState;

/// Blob key for the persisted opportunity pool.
pub const POOL_KEY: &str = "opportunities.json";

/// Blob key for the run-state (last processed date, failure counter).
pub const RUNSTATE_KEY: &str = "runstate.json";

/// Blob key for one day's rendered combined log.
pub fn daily_log_key(date: chrono::NaiveDate) -> String {
    format!("daily/{date}.md")
}
