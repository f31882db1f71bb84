/// Error types for building the claim-analysis engine.
///
/// Evaluating a claim never fails: malformed field values become findings.
/// These errors only surface while assembling validators from configuration,
/// which happens once at startup.

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("invalid thresholds: {0}")]
    Thresholds(String),

    #[error("pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("compatibility table error: {0}")]
    CompatibilityTable(String),
}
