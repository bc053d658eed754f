//! The validated output of one daily run.
//!
//! The generator's reply is untrusted text; a value only becomes a
//! `StructuredReport` after the recovery pipeline has validated its shape.
//! Every fixed-length array below is a hard contract: wrong cardinality is a
//! schema error, not a warning.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredReport {
    pub post: PostSection,
    pub memory: MemorySection,
    pub ops: OpsSection,
    /// Proposed opportunity records for the pool merge. Optional: an absent or
    /// empty list means the pool is carried over unchanged this cycle.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub opportunities: Vec<Value>,
}

/// Public-facing excerpt forwarded to the posting surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostSection {
    pub submolt: String,
    pub title: String,
    pub body: String,
    /// Exactly 3.
    pub tags: Vec<String>,
}

/// Private memory carried day to day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemorySection {
    pub worldview: String,
    /// Exactly 3.
    pub key_insights: Vec<String>,
    /// Exactly 3.
    pub next_actions: Vec<String>,
}

/// Operational bookkeeping for the run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpsSection {
    pub ab_ratio: AbRatio,
    pub why_ratio_changed: String,
    /// Exactly 3.
    pub metrics_to_watch: Vec<String>,
    pub rollback_rule: String,
    pub backup_note: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbRatio {
    #[serde(rename = "A")]
    pub a: f64,
    #[serde(rename = "B")]
    pub b: f64,
}
