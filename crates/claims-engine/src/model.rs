use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider name used when the upload carries none.
pub const DEFAULT_PROVIDER_NAME: &str = "N/A";

/// One row of an uploaded claims batch.
///
/// Every field is raw text as supplied by the caller; nothing is trimmed or
/// normalized before evaluation. Claim IDs are not required to be unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    pub claim_id: String,
    pub patient_id: String,
    /// Opaque; never parsed as a calendar date.
    pub service_date: String,
    pub cpt_code: String,
    pub icd10_code: String,
    pub provider_npi: String,
    /// "in" or "out", any case.
    pub network_status: String,
    pub prior_auth_required: String,
    pub prior_auth_provided: String,
    #[serde(default)]
    pub amount: f64,
    #[serde(default = "default_provider_name")]
    pub provider_name: String,
}

fn default_provider_name() -> String {
    DEFAULT_PROVIDER_NAME.to_string()
}

/// A single violated rule, rendered for humans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Finding(String);

impl Finding {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Denial-risk tier derived from the number of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-claim outcome: the key claim fields echoed back with its findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub claim_id: String,
    pub patient_id: String,
    pub service_date: String,
    pub cpt_code: String,
    pub icd10_code: String,
    /// Findings in rule order.
    pub denial_risks: Vec<Finding>,
    pub risk_level: RiskLevel,
}

/// Aggregate counts over one batch. Never carried across batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_claims: usize,
    pub high_risk_claims: usize,
    pub processed_at: DateTime<Utc>,
}

/// Everything one analysis run hands back to the caller.
///
/// Serializes flat: `results` alongside the summary fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<AnalysisResult>,
    #[serde(flatten)]
    pub summary: BatchSummary,
}
