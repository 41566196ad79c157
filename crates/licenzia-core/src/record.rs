//! Typed field records extracted from registry documents, and the per-case
//! record that merges them.

use serde::Serialize;

use crate::document::{ClassificationResult, DocumentKind};
use crate::money::Amount;

/// One premises declared in the application form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredObject {
    pub address: Option<String>,
    pub cadastral_number: Option<String>,
    pub unit_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationRecord {
    pub tax_id: Option<String>,
    pub subdivision_code: Option<String>,
    pub company_name: Option<String>,
    /// In document order; rules only look at the first entry.
    pub declared_objects: Vec<DeclaredObject>,
}

impl ApplicationRecord {
    pub fn first_object(&self) -> Option<&DeclaredObject> {
        self.declared_objects.first()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompanyStatus {
    Active,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyRegistryRecord {
    pub tax_id: Option<String>,
    pub subdivision_code: Option<String>,
    pub company_name: Option<String>,
    pub status: CompanyStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxDebtRecord {
    pub has_debt_over_threshold: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DutyPaymentRecord {
    pub amount: Option<Amount>,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CadastralRecord {
    pub cadastral_number: String,
    pub area: Option<String>,
    pub purpose: Option<String>,
}

/// A record produced by the extractor for one classified document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ExtractedRecord {
    Application(ApplicationRecord),
    CompanyRegistry(CompanyRegistryRecord),
    TaxDebt(TaxDebtRecord),
    DutyPayment(DutyPaymentRecord),
    CadastralExtract(CadastralRecord),
}

impl ExtractedRecord {
    pub fn kind(&self) -> DocumentKind {
        match self {
            Self::Application(_) => DocumentKind::Application,
            Self::CompanyRegistry(_) => DocumentKind::CompanyRegistry,
            Self::TaxDebt(_) => DocumentKind::TaxDebt,
            Self::DutyPayment(_) => DocumentKind::DutyPayment,
            Self::CadastralExtract(_) => DocumentKind::CadastralExtract,
        }
    }
}

/// Pipeline stage at which a document failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CaseStage {
    Parse,
    Classification,
    Extraction,
}

/// A non-fatal, per-document failure recorded while building a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CaseError {
    pub filename: String,
    pub stage: CaseStage,
    pub message: String,
}

/// How one submitted document was classified, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentTrace {
    pub filename: String,
    pub classification: ClassificationResult,
}

/// A record slot together with the file it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Slot<T> {
    source: String,
    record: T,
}

/// Everything known about one submission once all documents are processed.
///
/// Holds at most one record per document kind. Built once through
/// [`CaseRecordBuilder`] and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CaseRecord {
    application: Option<Slot<ApplicationRecord>>,
    company_registry: Option<Slot<CompanyRegistryRecord>>,
    tax_debt: Option<Slot<TaxDebtRecord>>,
    duty_payment: Option<Slot<DutyPaymentRecord>>,
    cadastral: Option<Slot<CadastralRecord>>,
    documents: Vec<DocumentTrace>,
    errors: Vec<CaseError>,
    superseded: Vec<Superseded>,
}

/// A document whose record was replaced by a later one of the same kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Superseded {
    pub kind: DocumentKind,
    pub replaced: String,
    pub by: String,
}

impl CaseRecord {
    pub fn builder() -> CaseRecordBuilder {
        CaseRecordBuilder::default()
    }

    pub fn application(&self) -> Option<&ApplicationRecord> {
        self.application.as_ref().map(|s| &s.record)
    }

    pub fn company_registry(&self) -> Option<&CompanyRegistryRecord> {
        self.company_registry.as_ref().map(|s| &s.record)
    }

    pub fn tax_debt(&self) -> Option<&TaxDebtRecord> {
        self.tax_debt.as_ref().map(|s| &s.record)
    }

    pub fn duty_payment(&self) -> Option<&DutyPaymentRecord> {
        self.duty_payment.as_ref().map(|s| &s.record)
    }

    pub fn cadastral(&self) -> Option<&CadastralRecord> {
        self.cadastral.as_ref().map(|s| &s.record)
    }

    /// Filename the record for `kind` was extracted from.
    pub fn source_of(&self, kind: DocumentKind) -> Option<&str> {
        let source = match kind {
            DocumentKind::Application => self.application.as_ref().map(|s| &s.source),
            DocumentKind::CompanyRegistry => self.company_registry.as_ref().map(|s| &s.source),
            DocumentKind::TaxDebt => self.tax_debt.as_ref().map(|s| &s.source),
            DocumentKind::DutyPayment => self.duty_payment.as_ref().map(|s| &s.source),
            DocumentKind::CadastralExtract => self.cadastral.as_ref().map(|s| &s.source),
            DocumentKind::PowerOfAttorney
            | DocumentKind::FinesRecord
            | DocumentKind::SubdivisionTax => None,
        };
        source.map(String::as_str)
    }

    pub fn documents(&self) -> &[DocumentTrace] {
        &self.documents
    }

    pub fn errors(&self) -> &[CaseError] {
        &self.errors
    }

    pub fn superseded(&self) -> &[Superseded] {
        &self.superseded
    }

    /// Number of record slots filled.
    pub fn record_count(&self) -> usize {
        [
            self.application.is_some(),
            self.company_registry.is_some(),
            self.tax_debt.is_some(),
            self.duty_payment.is_some(),
            self.cadastral.is_some(),
        ]
        .into_iter()
        .filter(|filled| *filled)
        .count()
    }
}

/// Accumulates per-document results in submission order.
#[derive(Debug, Default)]
pub struct CaseRecordBuilder {
    case: CaseRecord,
}

impl CaseRecordBuilder {
    pub fn trace(&mut self, filename: &str, classification: ClassificationResult) -> &mut Self {
        self.case.documents.push(DocumentTrace {
            filename: filename.to_string(),
            classification,
        });
        self
    }

    pub fn error(&mut self, filename: &str, stage: CaseStage, message: impl Into<String>) -> &mut Self {
        self.case.errors.push(CaseError {
            filename: filename.to_string(),
            stage,
            message: message.into(),
        });
        self
    }

    /// Store a record in its kind's slot. A later record of the same kind
    /// replaces the earlier one; the replaced filename is returned.
    pub fn insert(&mut self, filename: &str, record: ExtractedRecord) -> Option<String> {
        let kind = record.kind();
        let source = filename.to_string();
        let replaced = match record {
            ExtractedRecord::Application(record) => {
                replace(&mut self.case.application, Slot { source, record })
            }
            ExtractedRecord::CompanyRegistry(record) => {
                replace(&mut self.case.company_registry, Slot { source, record })
            }
            ExtractedRecord::TaxDebt(record) => {
                replace(&mut self.case.tax_debt, Slot { source, record })
            }
            ExtractedRecord::DutyPayment(record) => {
                replace(&mut self.case.duty_payment, Slot { source, record })
            }
            ExtractedRecord::CadastralExtract(record) => {
                replace(&mut self.case.cadastral, Slot { source, record })
            }
        };
        if let Some(previous) = &replaced {
            self.case.superseded.push(Superseded {
                kind,
                replaced: previous.clone(),
                by: filename.to_string(),
            });
        }
        replaced
    }

    pub fn build(self) -> CaseRecord {
        self.case
    }
}

fn replace<T>(slot: &mut Option<Slot<T>>, next: Slot<T>) -> Option<String> {
    slot.replace(next).map(|previous| previous.source)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::ConfidenceSource;

    fn registry(tax_id: &str) -> ExtractedRecord {
        ExtractedRecord::CompanyRegistry(CompanyRegistryRecord {
            tax_id: Some(tax_id.into()),
            subdivision_code: None,
            company_name: None,
            status: CompanyStatus::Active,
        })
    }

    #[test]
    fn later_record_of_same_kind_wins() {
        let mut builder = CaseRecord::builder();
        assert_eq!(builder.insert("first.xml", registry("1111111111")), None);
        assert_eq!(
            builder.insert("second.xml", registry("2222222222")),
            Some("first.xml".to_string())
        );
        let case = builder.build();

        assert_eq!(case.record_count(), 1);
        assert_eq!(
            case.company_registry().and_then(|r| r.tax_id.as_deref()),
            Some("2222222222")
        );
        assert_eq!(case.source_of(DocumentKind::CompanyRegistry), Some("second.xml"));
        assert_eq!(case.superseded().len(), 1);
        assert_eq!(case.superseded()[0].replaced, "first.xml");
    }

    #[test]
    fn kinds_fill_separate_slots() {
        let mut builder = CaseRecord::builder();
        builder.insert("egrul.xml", registry("7701234567"));
        builder.insert(
            "duty.xml",
            ExtractedRecord::DutyPayment(DutyPaymentRecord {
                amount: Some(Amount::from_major(65000)),
                currency: "RUB".into(),
            }),
        );
        let case = builder.build();

        assert_eq!(case.record_count(), 2);
        assert!(case.application().is_none());
        assert!(case.duty_payment().is_some());
        assert!(case.superseded().is_empty());
    }

    #[test]
    fn traces_and_errors_keep_submission_order() {
        let mut builder = CaseRecord::builder();
        builder
            .trace("a.xml", ClassificationResult::Unknown)
            .error("a.xml", CaseStage::Classification, "no match")
            .trace(
                "b.xml",
                ClassificationResult::Known {
                    kind: DocumentKind::FinesRecord,
                    source: ConfidenceSource::Filename,
                },
            );
        let case = builder.build();

        let names: Vec<_> = case.documents().iter().map(|d| d.filename.as_str()).collect();
        assert_eq!(names, ["a.xml", "b.xml"]);
        assert_eq!(case.errors()[0].stage, CaseStage::Classification);
    }
}
