//! Cross-document consistency rules.
//!
//! Each rule looks at the merged [`CaseRecord`] and emits at most one
//! finding. A rule whose inputs are absent (document not submitted, or the
//! compared field empty) abstains instead of failing. Evaluation order is
//! fixed and is the order findings appear in the verdict.

use licenzia_core::{AddressValidator, CaseRecord, Finding, RulesConfig};
use tracing::debug;

use crate::address;

/// A local rule: pure function of the case and the thresholds.
pub type Rule = fn(&CaseRecord, &RulesConfig) -> Option<Finding>;

/// Rules that need nothing beyond the case record, in evaluation order.
pub const LOCAL_RULES: [(&str, Rule); 3] = [
    ("tax_id_match", tax_id_match),
    ("duty_threshold", duty_threshold),
    ("cadastral_match", cadastral_match),
];

/// Runs the local rules, then the address cross-check.
#[derive(Debug, Clone, Default)]
pub struct ConsistencyEngine {
    config: RulesConfig,
}

impl ConsistencyEngine {
    pub fn new(config: RulesConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    pub fn run_local(&self, case: &CaseRecord) -> Vec<Finding> {
        LOCAL_RULES
            .iter()
            .filter_map(|(name, rule)| {
                let finding = rule(case, &self.config);
                match &finding {
                    Some(f) => debug!(rule = name, severity = %f.severity(), "rule fired"),
                    None => debug!(rule = name, "rule abstained"),
                }
                finding
            })
            .collect()
    }

    /// The address/subdivision cross-check against the external registry.
    pub async fn run_address(
        &self,
        case: &CaseRecord,
        validator: &dyn AddressValidator,
    ) -> Vec<Finding> {
        address::check(case, validator, self.config.address_timeout()).await
    }
}

/// Application and company registry must name the same taxpayer.
pub fn tax_id_match(case: &CaseRecord, _: &RulesConfig) -> Option<Finding> {
    let declared = case.application()?.tax_id.as_deref()?;
    let registered = case.company_registry()?.tax_id.as_deref()?;

    Some(if declared == registered {
        Finding::info(format!(
            "Tax ID {declared} in the application matches the company registry"
        ))
    } else {
        Finding::critical(format!(
            "Tax ID mismatch: application states {declared}, company registry states {registered}"
        ))
    })
}

/// The paid license duty must reach the statutory minimum.
pub fn duty_threshold(case: &CaseRecord, config: &RulesConfig) -> Option<Finding> {
    let duty = case.duty_payment()?;
    let paid = duty.amount?;
    let required = config.duty_minimum();
    let currency = &duty.currency;

    Some(if paid < required {
        Finding::critical(format!(
            "Insufficient state duty: paid {paid} {currency}, required {required} {currency}, short by {} {currency}",
            paid.shortfall_to(required)
        ))
    } else {
        Finding::info(format!("State duty of {paid} {currency} confirmed"))
    })
}

/// The first declared premises must be the one in the cadastral extract.
///
/// A mismatch needs clarification rather than rejection: applicants often
/// declare the building while the extract covers a unit inside it.
pub fn cadastral_match(case: &CaseRecord, _: &RulesConfig) -> Option<Finding> {
    let declared = case
        .application()?
        .first_object()?
        .cadastral_number
        .as_deref()?;
    let registered = case.cadastral()?.cadastral_number.as_str();

    Some(if declared == registered {
        Finding::info(format!(
            "Cadastral number {declared} confirmed by the real-estate registry"
        ))
    } else {
        Finding::warning(format!(
            "Cadastral number mismatch: declared {declared}, real-estate registry states {registered}"
        ))
    })
}
