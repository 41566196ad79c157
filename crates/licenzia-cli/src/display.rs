//! Plain-text cards for the terminal.

use std::fmt::Write;

use chrono::{DateTime, TimeZone};
use licenzia_core::{AddressResolution, ExpertiseResult, Severity};
use licenzia_engine::DocumentOutcome;

const LABEL_WIDTH: usize = 16;

/// The verdict with every finding, in the order the rules produced them.
///
/// The evaluation time is shown here only; the result itself carries none.
pub fn verdict_card<Tz: TimeZone>(result: &ExpertiseResult, evaluated_at: DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    let _ = writeln!(out, "=== Case {} ===", result.case_id);
    let _ = writeln!(out, "{}", evaluated_at.format("%Y-%m-%d %H:%M:%S %Z"));
    let _ = writeln!(out);

    if !result.findings.is_empty() {
        let _ = writeln!(out, "Findings");
        for finding in &result.findings {
            let _ = writeln!(out, "  {} {}", marker(finding.severity()), finding.message());
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(out, "Verdict");
    row(&mut out, "status", result.overall_status.as_str());
    row(&mut out, "recommendation", result.recommendation.as_str());
    row(
        &mut out,
        "findings",
        &format!(
            "{} critical, {} warning, {} info",
            result.count(Severity::Critical),
            result.count(Severity::Warning),
            result.count(Severity::Info)
        ),
    );
    out
}

/// Classification and extracted fields of one document.
pub fn document_card(outcome: &DocumentOutcome) -> anyhow::Result<String> {
    let mut out = String::new();
    let _ = writeln!(out, "=== {} ===", outcome.filename);
    row(&mut out, "classification", &outcome.classification.to_string());
    if let Some((stage, message)) = &outcome.failure {
        row(&mut out, "error", &format!("{stage:?}: {message}"));
    }
    match &outcome.record {
        Some(record) => {
            let json = serde_json::to_string_pretty(record)?;
            for line in json.lines() {
                let _ = writeln!(out, "  {line}");
            }
        }
        None if outcome.failure.is_none() && outcome.classification.is_known() => {
            row(&mut out, "record", "(no fields extracted for this kind)");
        }
        None => {}
    }
    let _ = writeln!(out);
    Ok(out)
}

pub fn address_card(query: &str, resolution: &AddressResolution, code: Option<&str>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "=== {query} ===");
    row(&mut out, "status", &format!("{:?}", resolution.status));
    if let Some(normalized) = &resolution.normalized_address {
        row(&mut out, "normalized", normalized);
    }
    if let Some(id) = &resolution.location_id {
        row(&mut out, "location id", id);
    }
    if let Some(code) = code {
        row(&mut out, "subdivision code", code);
    }
    out
}

fn row(out: &mut String, label: &str, value: &str) {
    let _ = writeln!(out, "  {label:<LABEL_WIDTH$} {value}");
}

fn marker(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[x]",
        Severity::Warning => "[!]",
        Severity::Info => "[+]",
    }
}
