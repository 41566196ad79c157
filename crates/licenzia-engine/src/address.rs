//! Address and subdivision-code cross-check against the external registry.
//!
//! The only stage that waits on I/O. Every call is bounded by a timeout and
//! every failure is downgraded to a warning, so the case always reaches the
//! aggregator.

use std::future::Future;
use std::time::Duration;

use licenzia_core::{
    AddressResolution, AddressStatus, AddressValidator, CaseRecord, Finding, ValidatorError,
};
use tracing::{debug, warn};

pub async fn check(
    case: &CaseRecord,
    validator: &dyn AddressValidator,
    timeout: Duration,
) -> Vec<Finding> {
    let Some(application) = case.application() else {
        return Vec::new();
    };
    let Some(address) = application
        .declared_objects
        .iter()
        .find_map(|o| o.address.as_deref())
    else {
        debug!("no declared address, skipping registry check");
        return Vec::new();
    };

    let resolution = match bounded(timeout, validator.resolve_address(address)).await {
        Ok(resolution) => resolution,
        Err(e) => return vec![unavailable(&e)],
    };

    let mut findings = Vec::with_capacity(2);
    match resolution.status {
        AddressStatus::Valid | AddressStatus::ValidFallback => {
            findings.push(address_confirmed(address, &resolution));
        }
        AddressStatus::NotFound => {
            return vec![Finding::warning(format!(
                "Address not found in registry: {address}"
            ))];
        }
        AddressStatus::Error => {
            return vec![unavailable(&ValidatorError::Response(
                "registry reported an error status".to_string(),
            ))];
        }
    }

    let (Some(location_id), Some(declared)) = (
        resolution.location_id.as_deref(),
        application.subdivision_code.as_deref(),
    ) else {
        return findings;
    };

    match bounded(timeout, validator.resolve_subdivision_code(location_id)).await {
        Ok(Some(registered)) if registered == declared => findings.push(Finding::info(format!(
            "Subdivision code {declared} matches the registered address"
        ))),
        Ok(Some(registered)) => findings.push(Finding::critical(format!(
            "Subdivision code mismatch: application states {declared}, registry states {registered} for this address"
        ))),
        Ok(None) => debug!(location_id, "registry has no subdivision code for location"),
        Err(e) => findings.push(unavailable(&e)),
    }
    findings
}

async fn bounded<T>(
    limit: Duration,
    call: impl Future<Output = Result<T, ValidatorError>>,
) -> Result<T, ValidatorError> {
    tokio::time::timeout(limit, call)
        .await
        .unwrap_or_else(|_| Err(ValidatorError::Timeout(limit.as_millis() as u64)))
}

fn address_confirmed(address: &str, resolution: &AddressResolution) -> Finding {
    let normalized = resolution.normalized_address.as_deref().unwrap_or(address);
    let suffix = match resolution.status {
        AddressStatus::ValidFallback => " (reference table)",
        _ => "",
    };
    Finding::info(format!("Address confirmed in registry{suffix}: {normalized}"))
}

fn unavailable(error: &ValidatorError) -> Finding {
    warn!(%error, "address validation failed");
    Finding::warning(format!("Address validation service unavailable: {error}"))
}
