//! Run-state: the last processed date and a rolling failure counter.
//!
//! The counter drives dormancy: after enough consecutive fatal runs the
//! engine refuses to start until the counter is cleared by hand. This is the
//! one blob that IS written on failure, otherwise dormancy could never
//! engage.

use crate::RUNSTATE_KEY;
use chrono::NaiveDate;
use daybook_core::FileStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunState {
    pub last_run_date: Option<NaiveDate>,
    pub consecutive_failures: u32,
}

impl RunState {
    pub fn load(store: &FileStore) -> Self {
        store.read_json(RUNSTATE_KEY, Self::default())
    }

    pub fn save(&self, store: &FileStore) -> anyhow::Result<()> {
        store.write_json(RUNSTATE_KEY, self)
    }

    pub fn record_success(&mut self, date: NaiveDate) {
        self.last_run_date = Some(date);
        self.consecutive_failures = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_failures += 1;
    }

    /// True when the failure streak has reached the threshold. A threshold of
    /// zero disables dormancy entirely.
    pub fn is_dormant(&self, threshold: u32) -> bool {
        threshold > 0 && self.consecutive_failures >= threshold
    }
}
