//! Reconciles an untrusted proposed pool state against the previous trusted
//! pool. The proposal is never applied verbatim: known ids are preserved,
//! creations are gated by the review cycle, history only grows, and the
//! active-count ceiling is clamped unconditionally as the final step.

use crate::gate::review_allowed;
use crate::model::{HistoryEntry, Opportunity, OpportunityPool, OpportunityStatus};
use crate::{MAX_ACTIVE, MAX_NEXT_ACTIONS};
use chrono::NaiveDate;
use std::collections::HashMap;

/// What the merge did, for logging and the rendered daily log.
#[derive(Debug, Clone, Default)]
pub struct MergeOutcome {
    pub review_allowed: bool,
    /// Known ids whose fields or history changed.
    pub updated: Vec<String>,
    /// New ids admitted this cycle.
    pub created: Vec<String>,
    /// Proposed new ids dropped outside a review cycle.
    pub rejected: Vec<String>,
    /// Ids force-downgraded to backlog by the active-count clamp.
    pub downgraded: Vec<String>,
}

/// Merge `proposal` into `previous`, producing the new trusted pool.
pub fn merge(
    previous: &OpportunityPool,
    proposal: &[Opportunity],
    today: NaiveDate,
) -> (OpportunityPool, MergeOutcome) {
    let allow_new = review_allowed(previous, today);
    let mut outcome = MergeOutcome {
        review_allowed: allow_new,
        ..MergeOutcome::default()
    };

    // First occurrence wins on duplicate proposed ids.
    let mut proposed: HashMap<&str, &Opportunity> = HashMap::new();
    for record in proposal {
        proposed.entry(record.id.as_str()).or_insert(record);
    }

    let mut next = previous.clone();

    // Known ids: carried over unconditionally, updated where mentioned.
    for record in &mut next.opportunities {
        let Some(update) = proposed.get(record.id.as_str()) else {
            continue;
        };
        if apply_update(record, update, today) {
            outcome.updated.push(record.id.clone());
        }
    }

    // Unknown ids are creations, admitted only on a review cycle.
    for record in proposal {
        if previous.contains(&record.id) || outcome.created.contains(&record.id) {
            continue;
        }
        if outcome.rejected.contains(&record.id) {
            continue;
        }
        if allow_new {
            next.opportunities.push(admit(record, today));
            outcome.created.push(record.id.clone());
        } else {
            tracing::warn!(
                "Rejected new opportunity '{}': not a review cycle (last review {:?}, interval {}d)",
                record.id,
                previous.last_review_date,
                previous.review_interval_days
            );
            outcome.rejected.push(record.id.clone());
        }
    }

    // Final safety net, applied unconditionally: clamp concurrent actives.
    let mut active_seen = 0;
    for record in &mut next.opportunities {
        if record.status != OpportunityStatus::Active {
            continue;
        }
        active_seen += 1;
        if active_seen > MAX_ACTIVE {
            record.status = OpportunityStatus::Backlog;
            record.history.push(HistoryEntry {
                date: today,
                event: "auto-downgrade-to-backlog".to_string(),
                note: "active > 2 clamp".to_string(),
            });
            record.last_update = Some(today);
            outcome.downgraded.push(record.id.clone());
        }
    }

    if allow_new {
        next.last_review_date = Some(today);
    }

    (next, outcome)
}

/// Apply a proposed update to a known record. Returns true when the record
/// actually changed. History is append-only: the proposal may only extend
/// the trusted prefix; anything shorter or rewritten is ignored.
fn apply_update(record: &mut Opportunity, update: &Opportunity, today: NaiveDate) -> bool {
    let mut tail: Vec<HistoryEntry> = if update.history.len() > record.history.len() {
        update.history[record.history.len()..].to_vec()
    } else {
        Vec::new()
    };

    let mut normalized = update.clone();
    normalized.next_actions.truncate(MAX_NEXT_ACTIONS);

    let changed = record.fields_differ(&normalized);
    if !changed && tail.is_empty() {
        return false;
    }

    if changed {
        record.title = normalized.title;
        record.status = normalized.status;
        record.next_actions = normalized.next_actions;
        record.risk = normalized.risk;
        record.notes = normalized.notes;
        record.progress_today = normalized.progress_today;
        if tail.is_empty() {
            // The proposal described no change of its own; leave a minimal
            // marker so accepted changes are always visible in history.
            tail.push(HistoryEntry {
                date: today,
                event: "update".to_string(),
                note: String::new(),
            });
        }
    }

    record.history.append(&mut tail);
    record.last_update = Some(today);
    true
}

/// Normalize a newly admitted record.
fn admit(record: &Opportunity, today: NaiveDate) -> Opportunity {
    let mut admitted = record.clone();
    admitted.next_actions.truncate(MAX_NEXT_ACTIONS);
    admitted.last_update = Some(today);
    if admitted.history.is_empty() {
        admitted.history.push(HistoryEntry {
            date: today,
            event: "created".to_string(),
            note: String::new(),
        });
    }
    admitted
}
