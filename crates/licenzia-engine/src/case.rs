//! Case building: classify and extract every document of a submission and
//! merge the results into one [`CaseRecord`].
//!
//! Documents are independent, so each runs on the blocking pool. Results
//! are merged strictly in submission order, which makes the duplicate-kind
//! tie-break deterministic: the later document wins.

use futures::future::join_all;
use licenzia_core::{
    CaseRecord, CaseStage, ClassificationResult, ExtractedRecord, Finding, RawDocument,
};
use tracing::{debug, info, warn};

use crate::classifier;
use crate::error::ExpertiseError;
use crate::extract;
use crate::xml;

/// Everything learned from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentOutcome {
    pub filename: String,
    pub classification: ClassificationResult,
    pub record: Option<ExtractedRecord>,
    pub failure: Option<(CaseStage, String)>,
}

impl DocumentOutcome {
    fn failed(filename: &str, stage: CaseStage, message: String) -> Self {
        Self {
            filename: filename.to_string(),
            classification: ClassificationResult::Unknown,
            record: None,
            failure: Some((stage, message)),
        }
    }
}

/// Parse, classify and extract a single document.
pub fn process_document(doc: &RawDocument) -> DocumentOutcome {
    let text = match xml::decode(&doc.content) {
        Ok(text) => text,
        Err(e) => {
            return DocumentOutcome::failed(&doc.filename, CaseStage::Parse, e.to_string());
        }
    };
    let tree = match xml::parse(&text) {
        Ok(tree) => tree,
        Err(e) => {
            return DocumentOutcome::failed(&doc.filename, CaseStage::Parse, e.to_string());
        }
    };

    let classification = classifier::classify_parsed(&doc.filename, &tree);
    let Some(kind) = classification.kind() else {
        return DocumentOutcome::failed(
            &doc.filename,
            CaseStage::Classification,
            "could not determine document type".to_string(),
        );
    };

    let (record, failure) = match extract::extract(kind, &tree) {
        Ok(record) => (record, None),
        Err(e) => (None, Some((CaseStage::Extraction, e.to_string()))),
    };

    DocumentOutcome {
        filename: doc.filename.clone(),
        classification,
        record,
        failure,
    }
}

/// Merge outcomes in the order given.
pub fn merge(outcomes: impl IntoIterator<Item = DocumentOutcome>) -> CaseRecord {
    let mut builder = CaseRecord::builder();
    for outcome in outcomes {
        builder.trace(&outcome.filename, outcome.classification);
        if let Some((stage, message)) = outcome.failure {
            warn!(filename = %outcome.filename, ?stage, %message, "document failed");
            builder.error(&outcome.filename, stage, message);
        }
        if let Some(record) = outcome.record {
            let kind = record.kind();
            if let Some(replaced) = builder.insert(&outcome.filename, record) {
                warn!(%kind, %replaced, by = %outcome.filename, "duplicate document kind, later one kept");
            }
        }
    }
    builder.build()
}

/// Process all documents concurrently and merge in submission order.
pub async fn build_case(documents: Vec<RawDocument>) -> Result<CaseRecord, ExpertiseError> {
    let filenames: Vec<String> = documents.iter().map(|d| d.filename.clone()).collect();
    let handles = documents
        .into_iter()
        .map(|doc| tokio::task::spawn_blocking(move || process_document(&doc)));

    let mut outcomes = Vec::with_capacity(filenames.len());
    for (filename, joined) in filenames.into_iter().zip(join_all(handles).await) {
        let outcome = joined.map_err(|source| ExpertiseError::Worker { filename, source })?;
        debug!(filename = %outcome.filename, classification = %outcome.classification, "document processed");
        outcomes.push(outcome);
    }

    let case = merge(outcomes);
    info!(
        documents = case.documents().len(),
        records = case.record_count(),
        errors = case.errors().len(),
        "case built"
    );
    Ok(case)
}

/// Findings describing degraded evidence, in submission order.
///
/// Per-document failures are warnings. Superseded duplicates are
/// informational only.
pub fn case_findings(case: &CaseRecord) -> Vec<Finding> {
    let errors = case
        .errors()
        .iter()
        .map(|e| Finding::warning(format!("Document '{}': {}", e.filename, e.message)));
    let superseded = case.superseded().iter().map(|s| {
        Finding::info(format!(
            "Document '{}' superseded by '{}' for {}",
            s.replaced, s.by, s.kind
        ))
    });
    errors.chain(superseded).collect()
}
