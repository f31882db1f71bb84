/// Batch analysis: runs every claim through the rule evaluator and risk
/// classifier, in input order, and totals the results.
///
/// The analyzer is immutable once built and keeps no state between calls, so
/// one instance can serve concurrent batches.
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::model::{AnalysisResult, BatchReport, BatchSummary, ClaimRecord, RiskLevel};
use crate::risk;
use crate::rules::RuleEvaluator;

#[derive(Debug, Clone, Default)]
pub struct BatchAnalyzer {
    evaluator: RuleEvaluator,
}

impl BatchAnalyzer {
    pub fn new(evaluator: RuleEvaluator) -> Self {
        Self { evaluator }
    }

    pub fn evaluator(&self) -> &RuleEvaluator {
        &self.evaluator
    }

    pub fn analyze_claim(&self, claim: &ClaimRecord) -> AnalysisResult {
        let denial_risks = self.evaluator.evaluate(claim);
        let risk_level = risk::classify(&denial_risks);
        debug!(
            claim_id = %claim.claim_id,
            findings = denial_risks.len(),
            risk_level = %risk_level,
            "claim analyzed"
        );
        AnalysisResult {
            claim_id: claim.claim_id.clone(),
            patient_id: claim.patient_id.clone(),
            service_date: claim.service_date.clone(),
            cpt_code: claim.cpt_code.clone(),
            icd10_code: claim.icd10_code.clone(),
            denial_risks,
            risk_level,
        }
    }

    /// Analyze a batch, stamping the summary with the current time.
    pub fn analyze(&self, claims: &[ClaimRecord]) -> BatchReport {
        let results: Vec<AnalysisResult> =
            claims.iter().map(|claim| self.analyze_claim(claim)).collect();
        let report = summarize(results, Utc::now());
        info!(
            total_claims = report.summary.total_claims,
            high_risk_claims = report.summary.high_risk_claims,
            "batch analyzed"
        );
        report
    }
}

/// Build the report for already-analyzed results.
pub fn summarize(results: Vec<AnalysisResult>, processed_at: DateTime<Utc>) -> BatchReport {
    let high_risk_claims = results
        .iter()
        .filter(|r| r.risk_level == RiskLevel::High)
        .count();
    BatchReport {
        summary: BatchSummary {
            total_claims: results.len(),
            high_risk_claims,
            processed_at,
        },
        results,
    }
}
