//! The evaluation facade: one submission in, one verdict out.

use std::sync::Arc;

use licenzia_core::{AddressValidator, ExpertiseResult, RawDocument, RulesConfig};
use tracing::info;

use crate::aggregate::aggregate;
use crate::case::{build_case, case_findings};
use crate::error::ExpertiseError;
use crate::rules::ConsistencyEngine;

/// Evaluates submissions against the consistency rules.
///
/// Holds no per-case state, so one instance can serve concurrent cases.
#[derive(Clone)]
pub struct Expertise {
    engine: ConsistencyEngine,
    validator: Arc<dyn AddressValidator>,
}

impl Expertise {
    pub fn new(config: RulesConfig, validator: Arc<dyn AddressValidator>) -> Self {
        Self {
            engine: ConsistencyEngine::new(config),
            validator,
        }
    }

    /// Runs every stage in order. Data problems end up as findings; only an
    /// internal failure returns `Err`.
    pub async fn evaluate(
        &self,
        case_id: &str,
        documents: Vec<RawDocument>,
    ) -> Result<ExpertiseResult, ExpertiseError> {
        info!(case_id, documents = documents.len(), "evaluating case");
        let case = build_case(documents).await?;

        let mut findings = case_findings(&case);
        findings.extend(self.engine.run_local(&case));
        findings.extend(self.engine.run_address(&case, self.validator.as_ref()).await);

        let (overall_status, recommendation) = aggregate(&findings);
        info!(case_id, findings = findings.len(), %overall_status, "case evaluated");

        Ok(ExpertiseResult {
            case_id: case_id.to_string(),
            findings,
            overall_status,
            recommendation,
        })
    }
}
