use licenzia_core::{Finding, OverallStatus, Recommendation, Severity};

/// Reduce findings to a verdict. The most severe finding decides; there is
/// no weighting between findings.
pub fn aggregate(findings: &[Finding]) -> (OverallStatus, Recommendation) {
    let has = |severity| findings.iter().any(|f| f.severity() == severity);
    let status = if has(Severity::Critical) {
        OverallStatus::Failure
    } else if has(Severity::Warning) {
        OverallStatus::Warning
    } else {
        OverallStatus::Success
    };
    (status, status.recommendation())
}
