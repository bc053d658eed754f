use thiserror::Error;

/// Failure taxonomy for the recovery pipeline. Each stage has its own
/// variant so diagnostics always name where the text went wrong.
#[derive(Debug, Clone, Error)]
pub enum RecoverError {
    /// The generation capability could not be reached or returned an error.
    #[error("generation failed: {0}")]
    Generation(String),

    /// No balanced object literal found in the text.
    #[error("no balanced object literal found in model output")]
    Extraction,

    /// Candidate text is not well-formed JSON even after normalization.
    #[error("candidate is not well-formed JSON: {0}")]
    Parse(String),

    /// Parses but violates the fixed report shape. The reason names the
    /// offending field and is preserved all the way into diagnostics.
    #[error("schema violation: {0}")]
    Schema(String),
}
