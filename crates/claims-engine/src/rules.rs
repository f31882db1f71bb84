use std::fmt;
use std::sync::Arc;

use crate::compat::CompatibilityLookup;
use crate::model::{ClaimRecord, Finding};
use crate::validate::Validators;

/// Applies the denial-risk rules to a single claim.
///
/// Rules run in a fixed order and never short-circuit each other:
/// procedure code, diagnosis code, prior authorization, provider NPI,
/// network status, then the optional compatibility lookup.
#[derive(Clone, Default)]
pub struct RuleEvaluator {
    validators: Validators,
    compatibility: Option<Arc<dyn CompatibilityLookup>>,
}

impl RuleEvaluator {
    pub fn new(validators: Validators) -> Self {
        Self {
            validators,
            compatibility: None,
        }
    }

    pub fn with_compatibility(mut self, lookup: Arc<dyn CompatibilityLookup>) -> Self {
        self.compatibility = Some(lookup);
        self
    }

    pub fn validators(&self) -> &Validators {
        &self.validators
    }

    pub fn evaluate(&self, claim: &ClaimRecord) -> Vec<Finding> {
        let mut findings = Vec::new();

        if !self.validators.is_valid_cpt(&claim.cpt_code) {
            findings.push(Finding::new(format!("Invalid CPT code: {}", claim.cpt_code)));
        }
        if !self.validators.is_valid_icd10(&claim.icd10_code) {
            findings.push(Finding::new(format!(
                "Invalid ICD10 code: {}",
                claim.icd10_code
            )));
        }
        if is_yes(&claim.prior_auth_required) && !is_yes(&claim.prior_auth_provided) {
            findings.push(Finding::new("Missing prior authorization"));
        }
        if !self.validators.is_valid_npi(&claim.provider_npi) {
            findings.push(Finding::new(format!("Invalid NPI: {}", claim.provider_npi)));
        }
        if claim.network_status.eq_ignore_ascii_case("out") {
            findings.push(Finding::new("Out-of-network service"));
        }
        if let Some(finding) = self
            .compatibility
            .as_ref()
            .and_then(|lookup| lookup.check(claim))
        {
            findings.push(finding);
        }

        findings
    }
}

impl fmt::Debug for RuleEvaluator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleEvaluator")
            .field("validators", &self.validators)
            .field("compatibility", &self.compatibility.is_some())
            .finish()
    }
}

fn is_yes(flag: &str) -> bool {
    flag.eq_ignore_ascii_case("yes")
}
