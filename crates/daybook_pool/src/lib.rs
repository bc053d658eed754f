//! Opportunity lifecycle state machine.
//!
//! A small persisted pool of tracked opportunities. The generator proposes
//! updates every cycle; the pool never trusts a proposal verbatim. Hard
//! invariants, enforced on every merge:
//!
//! - at most 2 opportunities are `active` at once;
//! - no opportunity is ever deleted (terminal states are kept);
//! - per-record history only grows;
//! - new ids are only admitted on a review cycle.

pub mod gate;
pub mod merge;
pub mod model;

pub use gate::{review_allowed, review_due};
pub use merge::{merge, MergeOutcome};
pub use model::{HistoryEntry, Opportunity, OpportunityPool, OpportunityStatus};

/// Hard ceiling on concurrently active opportunities.
pub const MAX_ACTIVE: usize = 2;

/// Cap on `next_actions` entries per record.
pub const MAX_NEXT_ACTIONS: usize = 3;
