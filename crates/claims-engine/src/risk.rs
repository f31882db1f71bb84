use crate::model::{Finding, RiskLevel};

/// Map a findings count to a risk tier: none is low, one is medium, more
/// than one is high.
pub fn classify_count(count: usize) -> RiskLevel {
    match count {
        0 => RiskLevel::Low,
        1 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

pub fn classify(findings: &[Finding]) -> RiskLevel {
    classify_count(findings.len())
}
