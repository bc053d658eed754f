//! Structured-output recovery pipeline.
//!
//! The generator's reply is untrusted free text. Recovery runs it through
//! extract → normalize → validate; on the first failure a single repair
//! completion is requested and the pipeline runs exactly once more. A second
//! failure is terminal; the caller gets both raw texts for diagnostics.

pub mod error;
pub mod extract;
pub mod normalize;
pub mod repair;
pub mod validate;

pub use error::RecoverError;
pub use repair::{recover_report, RecoverFailure, Recovered, REPORT_SHAPE};

use daybook_core::StructuredReport;
use serde_json::Value;

/// One pass of extract → normalize → validate → deserialize.
pub fn recover_once(raw: &str) -> Result<StructuredReport, RecoverError> {
    let candidate = extract::extract_object(raw)?;
    let normalized = normalize::strip_trailing_commas(&candidate);
    let value: Value =
        serde_json::from_str(&normalized).map_err(|e| RecoverError::Parse(e.to_string()))?;
    validate::validate_report(&value).map_err(RecoverError::Schema)?;
    serde_json::from_value(value).map_err(|e| RecoverError::Schema(e.to_string()))
}
