//! Pool data model. The serialized shape is stable: existing persisted pools
//! (`version`, `review_interval_days`, `last_review_date`, `opportunities`)
//! must keep loading across versions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpportunityStatus {
    #[default]
    Backlog,
    Active,
    Blocked,
    Done,
    Killed,
}

impl OpportunityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpportunityStatus::Backlog => "backlog",
            OpportunityStatus::Active => "active",
            OpportunityStatus::Blocked => "blocked",
            OpportunityStatus::Done => "done",
            OpportunityStatus::Killed => "killed",
        }
    }
}

/// One append-only audit record. Entries are never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub date: NaiveDate,
    pub event: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opportunity {
    /// Unique within the pool, immutable once assigned.
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub status: OpportunityStatus,
    /// At most 3, ordered.
    #[serde(default)]
    pub next_actions: Vec<String>,
    #[serde(default)]
    pub risk: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub progress_today: String,
    /// Stamped whenever any field of the record changes.
    #[serde(default)]
    pub last_update: Option<NaiveDate>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl Opportunity {
    /// True when the trackable fields differ (history and stamps aside).
    pub fn fields_differ(&self, other: &Opportunity) -> bool {
        self.title != other.title
            || self.status != other.status
            || self.next_actions != other.next_actions
            || self.risk != other.risk
            || self.notes != other.notes
            || self.progress_today != other.progress_today
    }
}

/// The persisted aggregate. Opportunities keep insertion order for display;
/// lookup is by id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpportunityPool {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default = "default_interval")]
    pub review_interval_days: u32,
    #[serde(default)]
    pub last_review_date: Option<NaiveDate>,
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
}

fn default_version() -> u32 {
    1
}

fn default_interval() -> u32 {
    7
}

impl Default for OpportunityPool {
    fn default() -> Self {
        Self::new(default_interval())
    }
}

impl OpportunityPool {
    pub fn new(review_interval_days: u32) -> Self {
        Self {
            version: default_version(),
            review_interval_days: review_interval_days.max(1),
            last_review_date: None,
            opportunities: Vec::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Opportunity> {
        self.opportunities.iter().find(|o| o.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    pub fn active_count(&self) -> usize {
        self.opportunities
            .iter()
            .filter(|o| o.status == OpportunityStatus::Active)
            .count()
    }
}
