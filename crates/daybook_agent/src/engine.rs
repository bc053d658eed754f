//! One daily cycle, run to completion.
//!
//! Order matters: nothing durable is written until recovery and merge have
//! both succeeded, so a failure at any stage leaves the previous pool and
//! logs untouched. Diagnostics and the failure counter are the deliberate
//! exceptions: they exist so a human can reconstruct what the model
//! produced and so dormancy can engage.

use crate::prompts;
use crate::render::render_daily_log;
use crate::runstate::RunState;
use crate::{daily_log_key, POOL_KEY};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use daybook_core::dates::day_before;
use daybook_core::{DaybookConfig, FileStore};
use daybook_llm::{ChatMessage, CompletionParams, LlmClient};
use daybook_moltbook::MoltbookClient;
use daybook_pool::{merge, review_allowed, review_due, MergeOutcome, Opportunity, OpportunityPool};
use daybook_recover::{recover_report, RecoverFailure};
use std::sync::Arc;

pub struct DailyEngine {
    config: DaybookConfig,
    store: FileStore,
    llm: Arc<dyn LlmClient>,
    publisher: Option<MoltbookClient>,
}

/// What one completed cycle did.
#[derive(Debug)]
pub struct RunSummary {
    pub date: NaiveDate,
    pub repaired: bool,
    pub outcome: MergeOutcome,
    pub published: bool,
    pub post_title: String,
}

impl DailyEngine {
    pub fn new(
        config: DaybookConfig,
        store: FileStore,
        llm: Arc<dyn LlmClient>,
        publisher: Option<MoltbookClient>,
    ) -> Self {
        Self {
            config,
            store,
            llm,
            publisher,
        }
    }

    /// Run one cycle for `today`. Serialized daily invocations are assumed;
    /// the persisted state is the only hand-off between runs.
    pub async fn run(&self, today: NaiveDate) -> Result<RunSummary> {
        let mut runstate = RunState::load(&self.store);
        if runstate.is_dormant(self.config.run.dormancy_threshold) {
            anyhow::bail!(
                "Agent is dormant after {} consecutive failures; clear {} to resume",
                runstate.consecutive_failures,
                crate::RUNSTATE_KEY
            );
        }

        match self.attempt(today).await {
            Ok(summary) => {
                runstate.record_success(today);
                runstate.save(&self.store)?;
                Ok(summary)
            }
            Err(e) => {
                runstate.record_failure();
                if let Err(save_err) = runstate.save(&self.store) {
                    tracing::warn!("Failed to persist run-state after failure: {}", save_err);
                }
                Err(e)
            }
        }
    }

    async fn attempt(&self, today: NaiveDate) -> Result<RunSummary> {
        let pool: OpportunityPool = self.store.read_json(
            POOL_KEY,
            OpportunityPool::new(self.config.pool.review_interval_days),
        );
        // The review-day flag is the pure interval check; admission is wider
        // (a pool with zero actives may seed mid-interval).
        let review_day = review_due(&pool, today);
        let allow_new = review_allowed(&pool, today);
        tracing::info!(
            "Starting cycle {} (pool: {} records, {} active, review day: {}, creations allowed: {})",
            today,
            pool.opportunities.len(),
            pool.active_count(),
            review_day,
            allow_new
        );

        let yesterday_log = self.store.read_text(&daily_log_key(day_before(today)))?;
        let system = prompts::load_system_prompt(&self.config.run.prompt_dir, "daily");
        let user = prompts::build_user_prompt(
            today,
            &yesterday_log,
            &pool,
            review_day,
            allow_new,
            self.config.llm.context_budget_chars,
        );

        let params = CompletionParams {
            max_tokens: self.config.llm.max_tokens,
            temperature: self.config.llm.temperature,
        };
        let raw = self
            .llm
            .complete(&system, vec![ChatMessage::user(user)], params)
            .await
            .context("Daily generation call failed")?;

        let recovered = match recover_report(self.llm.as_ref(), &raw, self.config.llm.max_tokens)
            .await
        {
            Ok(recovered) => recovered,
            Err(failure) => {
                self.persist_diagnostics(today, &failure);
                return Err(anyhow::Error::new(failure.error)
                    .context("Report recovery failed after one repair attempt"));
            }
        };
        let report = recovered.report;

        let proposal = parse_proposal(&report.opportunities);
        let (new_pool, outcome) = merge(&pool, &proposal, today);

        let log_md = render_daily_log(today, &report, &new_pool, &outcome, recovered.repaired);

        // The pipeline is done; only now does anything durable change.
        self.store
            .write_json(POOL_KEY, &new_pool)
            .context("Failed to persist opportunity pool")?;
        self.store
            .write_text(&daily_log_key(today), &log_md)
            .context("Failed to persist daily log")?;

        let mut published = false;
        if let Some(publisher) = &self.publisher {
            match publisher.post(&report.post.title, &report.post.body).await {
                Ok(_) => published = true,
                Err(e) => {
                    tracing::warn!("Publish failed (state already persisted): {}", e);
                }
            }
        }

        Ok(RunSummary {
            date: today,
            repaired: recovered.repaired,
            outcome,
            published,
            post_title: report.post.title,
        })
    }

    /// Leave the offending texts where a human can find them. Best-effort:
    /// the run is already failing.
    fn persist_diagnostics(&self, today: NaiveDate, failure: &RecoverFailure) {
        tracing::error!("Recovery failed: {}", failure.error);
        let raw_key = format!("diagnostics/{today}-raw.txt");
        if let Err(e) = self.store.write_text(&raw_key, &failure.raw) {
            tracing::warn!("Could not persist {}: {}", raw_key, e);
        }
        if let Some(repair_raw) = &failure.repair_raw {
            let repair_key = format!("diagnostics/{today}-repair.txt");
            if let Err(e) = self.store.write_text(&repair_key, repair_raw) {
                tracing::warn!("Could not persist {}: {}", repair_key, e);
            }
        }
    }
}

/// Deserialize proposed records, skipping entries that do not fit the record
/// shape. The schema validator already guaranteed ids and statuses; anything
/// else malformed degrades to a logged skip rather than a failed run.
fn parse_proposal(values: &[serde_json::Value]) -> Vec<Opportunity> {
    values
        .iter()
        .filter_map(|value| match serde_json::from_value(value.clone()) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed proposed opportunity: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use daybook_llm::providers::MockProvider;

    fn valid_response(opportunities: &str) -> String {
        format!(
            r#"Here you go:
```json
{{
  "post": {{"submolt": "general", "title": "Day note", "body": "Body.", "tags": ["a", "b", "c"]}},
  "memory": {{"worldview": "w", "key_insights": ["1", "2", "3"], "next_actions": ["x", "y", "z"]}},
  "ops": {{
    "ab_ratio": {{"A": 0.7, "B": 0.3}},
    "why_ratio_changed": "no change",
    "metrics_to_watch": ["m1", "m2", "m3"],
    "rollback_rule": "revert",
    "backup_note": "ok"
  }},
  "opportunities": {opportunities}
}}
```"#
        )
    }

    fn engine_with(store: FileStore, responses: Vec<String>) -> DailyEngine {
        DailyEngine::new(
            DaybookConfig::default(),
            store,
            Arc::new(MockProvider::new(responses)),
            None,
        )
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[tokio::test]
    async fn test_happy_path_persists_pool_log_and_runstate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let response =
            valid_response(r#"[{"id": "opp-1", "title": "First", "status": "active"}]"#);
        let engine = engine_with(store.clone(), vec![response]);

        let summary = engine.run(date("2026-08-24")).await.unwrap();
        assert!(!summary.repaired);
        assert!(!summary.published);
        assert_eq!(summary.outcome.created, vec!["opp-1"]);

        let pool: OpportunityPool = store.read_json(POOL_KEY, OpportunityPool::new(7));
        assert!(pool.contains("opp-1"));
        assert_eq!(pool.last_review_date, Some(date("2026-08-24")));

        let log = store.read_text(&daily_log_key(date("2026-08-24"))).unwrap();
        assert!(log.contains("Day note"));

        let runstate = RunState::load(&store);
        assert_eq!(runstate.consecutive_failures, 0);
        assert_eq!(runstate.last_run_date, Some(date("2026-08-24")));
    }

    #[tokio::test]
    async fn test_fatal_recovery_writes_diagnostics_and_counts_failure() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        // First call: garbage. Repair call: still garbage.
        let engine = engine_with(
            store.clone(),
            vec!["not json at all".into(), "still not json".into()],
        );

        let err = engine.run(date("2026-08-24")).await.unwrap_err();
        assert!(format!("{err:#}").contains("recovery failed"));

        assert!(store.exists("diagnostics/2026-08-24-raw.txt"));
        assert!(store.exists("diagnostics/2026-08-24-repair.txt"));
        assert_eq!(
            store.read_text("diagnostics/2026-08-24-raw.txt").unwrap(),
            "not json at all"
        );

        // Nothing else persisted: all-or-nothing.
        assert!(!store.exists(POOL_KEY));
        assert!(!store.exists(&daily_log_key(date("2026-08-24"))));

        let runstate = RunState::load(&store);
        assert_eq!(runstate.consecutive_failures, 1);
    }

    #[tokio::test]
    async fn test_generation_failure_is_fatal_without_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let engine = engine_with(store.clone(), vec![]);

        assert!(engine.run(date("2026-08-24")).await.is_err());
        assert!(!store.exists(POOL_KEY));
        assert_eq!(RunState::load(&store).consecutive_failures, 1);
    }

    #[tokio::test]
    async fn test_dormancy_blocks_before_any_generation() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let mut runstate = RunState::default();
        runstate.consecutive_failures = 5;
        runstate.save(&store).unwrap();

        let response = valid_response("[]");
        let engine = engine_with(store.clone(), vec![response]);
        let err = engine.run(date("2026-08-24")).await.unwrap_err();
        assert!(err.to_string().contains("dormant"));
        // No state advanced, no pool created.
        assert!(!store.exists(POOL_KEY));
    }

    #[tokio::test]
    async fn test_repaired_run_completes_and_merges() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());
        let good = valid_response(r#"[{"id": "opp-1", "title": "First", "status": "backlog"}]"#);
        let engine = engine_with(store.clone(), vec!["garbage first".into(), good]);

        let summary = engine.run(date("2026-08-24")).await.unwrap();
        assert!(summary.repaired);
        let pool: OpportunityPool = store.read_json(POOL_KEY, OpportunityPool::new(7));
        assert!(pool.contains("opp-1"));
    }

    #[tokio::test]
    async fn test_second_cycle_respects_review_gate() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        // Day 1 seeds two records, one active.
        let day1 = valid_response(
            r#"[{"id": "opp-1", "title": "One", "status": "active"},
                {"id": "opp-2", "title": "Two", "status": "backlog"}]"#,
        );
        let engine = engine_with(store.clone(), vec![day1]);
        engine.run(date("2026-08-24")).await.unwrap();

        // Day 2 (inside the 7-day interval) proposes a brand-new id.
        let day2 = valid_response(
            r#"[{"id": "opp-3", "title": "Three", "status": "backlog"}]"#,
        );
        let engine = engine_with(store.clone(), vec![day2]);
        let summary = engine.run(date("2026-08-25")).await.unwrap();

        assert_eq!(summary.outcome.rejected, vec!["opp-3"]);
        let pool: OpportunityPool = store.read_json(POOL_KEY, OpportunityPool::new(7));
        assert!(!pool.contains("opp-3"));
        assert!(pool.contains("opp-1"));
        assert!(pool.contains("opp-2"));
    }
}
