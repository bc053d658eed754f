//! Prompt assembly for the daily generation call.
//!
//! The system prompt comes from `<prompt_dir>/<name>_system.md` when present.
//! The user prompt embeds the cycle date, the review-gate flags, an excerpt
//! of yesterday's log, a compact summary of the current pool, and the exact
//! output shape.

use chrono::NaiveDate;
use daybook_pool::OpportunityPool;
use daybook_recover::REPORT_SHAPE;
use serde_json::json;
use std::path::Path;

const DEFAULT_SYSTEM_PROMPT: &str = "You are a disciplined daily operations agent. \
You write one structured daily report. You never fabricate events as facts, never \
leak secrets or environment details, and treat market topics strictly as frameworks, \
not predictions.";

/// Load `<name>_system.md` from the prompt directory, or the built-in default
/// when the file is missing or empty.
pub fn load_system_prompt(prompt_dir: &str, name: &str) -> String {
    let path = Path::new(prompt_dir).join(format!("{name}_system.md"));
    match std::fs::read_to_string(&path) {
        Ok(text) if !text.trim().is_empty() => text.trim().to_string(),
        _ => {
            tracing::debug!(
                "No system prompt at {}, using built-in default",
                path.display()
            );
            DEFAULT_SYSTEM_PROMPT.to_string()
        }
    }
}

/// Compact pool summary embedded in the prompt: enough for the model to
/// progress existing items, small enough to leave room for the report.
fn pool_summary(pool: &OpportunityPool) -> String {
    let compact: Vec<_> = pool
        .opportunities
        .iter()
        .map(|o| {
            json!({
                "id": o.id,
                "title": o.title,
                "status": o.status.as_str(),
                "next_actions": o.next_actions,
                "last_update": o.last_update,
                "notes": o.notes,
            })
        })
        .collect();
    serde_json::to_string_pretty(&compact).unwrap_or_else(|_| "[]".to_string())
}

fn truncate_chars(text: &str, budget: usize) -> String {
    text.chars().take(budget).collect()
}

pub fn build_user_prompt(
    today: NaiveDate,
    yesterday_log: &str,
    pool: &OpportunityPool,
    review_day: bool,
    allow_new: bool,
    context_budget_chars: usize,
) -> String {
    format!(
        "Today's date: {today}\n\
         Review day: {review_day}\n\
         Allowed to add new opportunities: {allow_new} (only if true; otherwise only progress existing ids)\n\n\
         Yesterday's log (may be empty):\n{yesterday}\n\n\
         Current opportunity pool (JSON summary):\n{pool}\n\n\
         Produce today's report as a single JSON object with exactly this shape:\n{shape}\n\n\
         Rules:\n\
         - status must be one of backlog/active/blocked/done/killed\n\
         - at most 2 opportunities active at once\n\
         - if allowed-to-add is false: do not introduce any new opportunity id\n\
         - never drop an existing opportunity; move it to done or killed instead\n\
         - every active opportunity needs next_actions (at most 3), progress_today, and risk\n\
         - all fixed-size lists have exactly 3 entries\n\
         - output only the JSON object, no prose, no markdown fencing",
        today = today,
        review_day = review_day,
        allow_new = allow_new,
        yesterday = truncate_chars(yesterday_log, context_budget_chars),
        pool = pool_summary(pool),
        shape = REPORT_SHAPE,
    )
}
