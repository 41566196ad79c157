//! Submitted documents and their classification.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single file of a license submission, exactly as uploaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocument {
    pub filename: String,
    pub content: Vec<u8>,
}

impl RawDocument {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// The closed set of registry documents a license request can carry.
///
/// Adding a kind is a deliberate enumeration change: every `match` over
/// this type (classifier, extractor, case slots) must then be revisited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentKind {
    /// The applicant's own license application form.
    Application,
    PowerOfAttorney,
    /// Tax-service notice on debts above the statutory threshold.
    TaxDebt,
    /// Extract from the legal-entity registry.
    CompanyRegistry,
    FinesRecord,
    /// Payment-registry confirmation of the license duty.
    DutyPayment,
    /// Real-estate registry extract for the licensed premises.
    CadastralExtract,
    /// Tax-service record of registered subdivisions.
    SubdivisionTax,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 8] = [
        Self::Application,
        Self::PowerOfAttorney,
        Self::TaxDebt,
        Self::CompanyRegistry,
        Self::FinesRecord,
        Self::DutyPayment,
        Self::CadastralExtract,
        Self::SubdivisionTax,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Application => "APPLICATION",
            Self::PowerOfAttorney => "POWER_OF_ATTORNEY",
            Self::TaxDebt => "TAX_DEBT",
            Self::CompanyRegistry => "COMPANY_REGISTRY",
            Self::FinesRecord => "FINES_RECORD",
            Self::DutyPayment => "DUTY_PAYMENT",
            Self::CadastralExtract => "CADASTRAL_EXTRACT",
            Self::SubdivisionTax => "SUBDIVISION_TAX",
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which heuristic produced a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceSource {
    Filename,
    Content,
}

impl ConfidenceSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Filename => "filename",
            Self::Content => "content",
        }
    }
}

/// Outcome of classifying one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClassificationResult {
    Known {
        kind: DocumentKind,
        source: ConfidenceSource,
    },
    Unknown,
}

impl ClassificationResult {
    pub fn kind(&self) -> Option<DocumentKind> {
        match self {
            Self::Known { kind, .. } => Some(*kind),
            Self::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Self::Known { .. })
    }
}

impl fmt::Display for ClassificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Known { kind, source } => write!(f, "{kind} (by {})", source.as_str()),
            Self::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_names_match_serde() {
        for kind in DocumentKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }

    #[test]
    fn unknown_has_no_kind() {
        assert_eq!(ClassificationResult::Unknown.kind(), None);
        let known = ClassificationResult::Known {
            kind: DocumentKind::TaxDebt,
            source: ConfidenceSource::Content,
        };
        assert_eq!(known.kind(), Some(DocumentKind::TaxDebt));
        assert_eq!(known.to_string(), "TAX_DEBT (by content)");
    }
}
