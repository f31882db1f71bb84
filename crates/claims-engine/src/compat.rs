/// Procedure/diagnosis compatibility checks.
///
/// The rule evaluator can be handed one [`CompatibilityLookup`]; its finding,
/// if any, is appended after the fixed rules. Lookups must be deterministic
/// and must not mutate shared state.
use std::collections::HashMap;

use serde::Deserialize;

use crate::error::EngineError;
use crate::model::{ClaimRecord, Finding};

pub trait CompatibilityLookup: Send + Sync {
    fn check(&self, claim: &ClaimRecord) -> Option<Finding>;
}

/// One known-incompatible pairing as it appears in the table file.
#[derive(Debug, Clone, Deserialize)]
pub struct IncompatiblePair {
    pub cpt_code: String,
    /// Matches any diagnosis code starting with this prefix.
    pub icd10_prefix: String,
}

/// Static table of procedure codes and the diagnosis prefixes they may not
/// be billed with.
#[derive(Debug, Clone, Default)]
pub struct PairTable {
    by_cpt: HashMap<String, Vec<String>>,
}

impl PairTable {
    pub fn new(pairs: impl IntoIterator<Item = IncompatiblePair>) -> Self {
        let mut by_cpt: HashMap<String, Vec<String>> = HashMap::new();
        for pair in pairs {
            by_cpt
                .entry(normalize_cpt(&pair.cpt_code))
                .or_default()
                .push(pair.icd10_prefix.to_uppercase());
        }
        Self { by_cpt }
    }

    /// Parse a JSON array of `{"cpt_code": ..., "icd10_prefix": ...}` objects.
    pub fn from_json(content: &str) -> Result<Self, EngineError> {
        let pairs: Vec<IncompatiblePair> = serde_json::from_str(content)
            .map_err(|e| EngineError::CompatibilityTable(e.to_string()))?;
        if let Some(bad) = pairs
            .iter()
            .find(|p| p.cpt_code.trim().is_empty() || p.icd10_prefix.trim().is_empty())
        {
            return Err(EngineError::CompatibilityTable(format!(
                "empty code in entry {bad:?}"
            )));
        }
        Ok(Self::new(pairs))
    }

    pub fn len(&self) -> usize {
        self.by_cpt.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_cpt.is_empty()
    }
}

impl CompatibilityLookup for PairTable {
    fn check(&self, claim: &ClaimRecord) -> Option<Finding> {
        let cpt = normalize_cpt(&claim.cpt_code);
        let prefixes = self.by_cpt.get(&cpt)?;
        let icd10 = claim.icd10_code.to_uppercase();
        prefixes
            .iter()
            .any(|prefix| icd10.starts_with(prefix.as_str()))
            .then(|| {
                Finding::new(format!(
                    "Procedure {} incompatible with diagnosis {}",
                    claim.cpt_code, claim.icd10_code
                ))
            })
    }
}

fn normalize_cpt(code: &str) -> String {
    code.chars().filter(|&c| c != '-').collect()
}
