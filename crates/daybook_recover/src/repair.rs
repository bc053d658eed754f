//! Bounded self-repair escalation.
//!
//! On a first recovery failure, exactly one follow-up completion is issued at
//! low temperature asking for the same content as strict JSON, and the
//! pipeline runs once more. A second failure is terminal; both raw texts are
//! returned so they can be persisted for inspection.

use crate::error::RecoverError;
use crate::recover_once;
use daybook_core::StructuredReport;
use daybook_llm::{ChatMessage, CompletionParams, LlmClient};

/// Shape definition embedded in prompts. `opportunities` is the optional
/// pool-proposal section.
pub const REPORT_SHAPE: &str = r#"{
  "post": {"submolt": "...", "title": "...", "body": "...", "tags": ["...", "...", "..."]},
  "memory": {"worldview": "...", "key_insights": ["...", "...", "..."], "next_actions": ["...", "...", "..."]},
  "ops": {
    "ab_ratio": {"A": 0.0, "B": 0.0},
    "why_ratio_changed": "...",
    "metrics_to_watch": ["...", "...", "..."],
    "rollback_rule": "...",
    "backup_note": "..."
  },
  "opportunities": [
    {"id": "...", "title": "...", "status": "backlog|active|blocked|done|killed",
     "next_actions": ["..."], "risk": "...", "notes": "...", "progress_today": "...",
     "history": [{"date": "YYYY-MM-DD", "event": "...", "note": "..."}]}
  ]
}"#;

const REPAIR_SYSTEM_PROMPT: &str =
    "You are a JSON repair module. Return only valid JSON. No prose, no markdown fencing.";

const REPAIR_TEMPERATURE: f32 = 0.1;

/// A successfully recovered report, with the raw texts that produced it.
#[derive(Debug)]
pub struct Recovered {
    pub report: StructuredReport,
    pub raw: String,
    pub repair_raw: Option<String>,
    pub repaired: bool,
}

/// Terminal recovery failure. Carries every raw text the model produced so a
/// human can reconstruct exactly what happened.
#[derive(Debug)]
pub struct RecoverFailure {
    pub error: RecoverError,
    pub raw: String,
    pub repair_raw: Option<String>,
}

fn repair_prompt(failing_text: &str, reason: &RecoverError) -> String {
    format!(
        "The following output was rejected ({reason}).\n\
         Return only valid JSON conforming to this exact shape, no prose, no fencing:\n\
         {REPORT_SHAPE}\n\n\
         Original output:\n{failing_text}"
    )
}

/// Run extract → normalize → validate over `raw`, escalating through exactly
/// one repair completion on failure.
pub async fn recover_report(
    client: &dyn LlmClient,
    raw: &str,
    max_tokens: u32,
) -> Result<Recovered, RecoverFailure> {
    let first_error = match recover_once(raw) {
        Ok(report) => {
            return Ok(Recovered {
                report,
                raw: raw.to_string(),
                repair_raw: None,
                repaired: false,
            })
        }
        Err(e) => e,
    };

    tracing::warn!("First recovery pass failed ({}), escalating once", first_error);

    let params = CompletionParams {
        max_tokens,
        temperature: REPAIR_TEMPERATURE,
    };
    let messages = vec![ChatMessage::user(repair_prompt(raw, &first_error))];

    let repair_raw = match client.complete(REPAIR_SYSTEM_PROMPT, messages, params).await {
        Ok(text) => text,
        Err(e) => {
            return Err(RecoverFailure {
                error: RecoverError::Generation(e.to_string()),
                raw: raw.to_string(),
                repair_raw: None,
            })
        }
    };

    match recover_once(&repair_raw) {
        Ok(report) => {
            tracing::info!("Repair pass produced a valid report");
            Ok(Recovered {
                report,
                raw: raw.to_string(),
                repair_raw: Some(repair_raw),
                repaired: true,
            })
        }
        Err(second_error) => {
            tracing::error!("Repair pass also failed ({}), giving up", second_error);
            Err(RecoverFailure {
                error: second_error,
                raw: raw.to_string(),
                repair_raw: Some(repair_raw),
            })
        }
    }
}
